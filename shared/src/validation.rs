//! Signup form validation rules
//!
//! Pure and synchronous: no I/O, no clock reads. Safe to run on every
//! keystroke and again in full before submit. Every rule runs on its own
//! field regardless of what the other rules found.
//!
//! Two rule sets exist:
//! - [`validate_signup`]: the church signup form (canonical, also re-checked
//!   server-side through [`missing_required`])
//! - [`validate_membership`]: the standalone membership form with password,
//!   minimum age and terms acknowledgment

use chrono::{Datelike, NaiveDate};
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::collections::BTreeMap;
use std::fmt;

use crate::models::{MembershipForm, SignupRequest};

// ── Limits ──────────────────────────────────────────────────────────

/// Minimum password length for the membership form
pub const MIN_PASSWORD_LEN: usize = 8;

/// Minimum age in whole years for the membership form
pub const MIN_MEMBERSHIP_AGE: i32 = 18;

/// Minimum digit count of a phone number once separators are removed
pub const MIN_PHONE_DIGITS: usize = 10;

/// Birth dates travel as ISO calendar dates
pub const BIRTH_DATE_FORMAT: &str = "%Y-%m-%d";

// ── Field names ─────────────────────────────────────────────────────

pub mod field {
    pub const FIRST_NAME: &str = "firstName";
    pub const LAST_NAME: &str = "lastName";
    pub const EMAIL: &str = "email";
    pub const PHONE: &str = "phone";
    pub const BIRTH_DATE: &str = "birthDate";
    pub const PASSWORD: &str = "password";
    pub const CONFIRM_PASSWORD: &str = "confirmPassword";
    pub const AGREE_TO_TERMS: &str = "agreeToTerms";
}

/// Fields the signup API refuses to proceed without
pub const REQUIRED_SIGNUP_FIELDS: [&str; 5] = [
    field::FIRST_NAME,
    field::LAST_NAME,
    field::EMAIL,
    field::PHONE,
    field::BIRTH_DATE,
];

// ── Problems ────────────────────────────────────────────────────────

/// What is wrong with a single field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldProblem {
    Required,
    InvalidFormat,
    TooShort,
    Mismatch,
    UnderMinimumAge,
    MustAgree,
}

impl FieldProblem {
    /// Message shown next to `field` on the form
    pub fn message_for(&self, field: &str) -> String {
        match (self, field) {
            (Self::Required, _) => format!("{} is required", label(field)),
            (Self::InvalidFormat, field::EMAIL) => "Please enter a valid email address".into(),
            (Self::InvalidFormat, field::PHONE) => "Please enter a valid phone number".into(),
            (Self::InvalidFormat, field::BIRTH_DATE) => {
                "Please enter a valid date (YYYY-MM-DD)".into()
            }
            (Self::InvalidFormat, _) => format!("{} has an invalid format", label(field)),
            (Self::TooShort, _) => format!(
                "{} must be at least {MIN_PASSWORD_LEN} characters",
                label(field)
            ),
            (Self::Mismatch, _) => "Passwords do not match".into(),
            (Self::UnderMinimumAge, _) => {
                format!("You must be at least {MIN_MEMBERSHIP_AGE} years old")
            }
            (Self::MustAgree, _) => "You must agree to the terms and conditions".into(),
        }
    }
}

fn label(field: &str) -> &str {
    match field {
        field::FIRST_NAME => "First name",
        field::LAST_NAME => "Last name",
        field::EMAIL => "Email",
        field::PHONE => "Phone number",
        field::BIRTH_DATE => "Birth date",
        field::PASSWORD => "Password",
        field::CONFIRM_PASSWORD => "Password confirmation",
        other => other,
    }
}

/// Field-level problems keyed by wire name; empty means "ok to submit"
///
/// Serializes as `{ "<field>": "<message>" }`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(BTreeMap<&'static str, FieldProblem>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn get(&self, field: &str) -> Option<FieldProblem> {
        self.0.get(field).copied()
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    /// Human-readable messages, one per failing field
    pub fn messages(&self) -> BTreeMap<&'static str, String> {
        self.0
            .iter()
            .map(|(field, problem)| (*field, problem.message_for(field)))
            .collect()
    }

    /// A copy with one field's error cleared (the field being edited)
    pub fn without(&self, field: &str) -> Self {
        let mut next = self.clone();
        next.0.remove(field);
        next
    }

    fn check(&mut self, field: &'static str, problem: Option<FieldProblem>) {
        if let Some(problem) = problem {
            self.0.insert(field, problem);
        }
    }
}

impl Serialize for FieldErrors {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (field, problem) in &self.0 {
            map.serialize_entry(field, &problem.message_for(field))?;
        }
        map.end()
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let messages: Vec<String> = self.messages().into_values().collect();
        f.write_str(&messages.join("; "))
    }
}

// ── Single-field rules ──────────────────────────────────────────────

fn present(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// `local@domain.tld`: exactly one `@`, no whitespace, and a dot inside the
/// domain with characters on both sides.
pub fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    domain
        .char_indices()
        .any(|(i, c)| c == '.' && i > 0 && i + 1 < domain.len())
}

/// At least ten digits once spaces, hyphens, parentheses and one leading `+`
/// are removed; nothing else may remain.
pub fn is_valid_phone(phone: &str) -> bool {
    let trimmed = phone.trim();
    let body = trimmed.strip_prefix('+').unwrap_or(trimmed);
    let digits: Vec<char> = body
        .chars()
        .filter(|c| !matches!(c, ' ' | '-' | '(' | ')'))
        .collect();
    digits.len() >= MIN_PHONE_DIGITS && digits.iter().all(char::is_ascii_digit)
}

/// Parse a `YYYY-MM-DD` birth date
pub fn parse_birth_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), BIRTH_DATE_FORMAT).ok()
}

/// Age in whole years on `today`
pub fn age_on(birth_date: NaiveDate, today: NaiveDate) -> i32 {
    let mut age = today.year() - birth_date.year();
    if (today.month(), today.day()) < (birth_date.month(), birth_date.day()) {
        age -= 1;
    }
    age
}

fn check_name(value: Option<&str>) -> Option<FieldProblem> {
    present(value).is_none().then_some(FieldProblem::Required)
}

fn check_email(value: Option<&str>) -> Option<FieldProblem> {
    match present(value) {
        None => Some(FieldProblem::Required),
        Some(email) if !is_valid_email(email) => Some(FieldProblem::InvalidFormat),
        Some(_) => None,
    }
}

fn check_phone(value: Option<&str>) -> Option<FieldProblem> {
    match present(value) {
        None => Some(FieldProblem::Required),
        Some(phone) if !is_valid_phone(phone) => Some(FieldProblem::InvalidFormat),
        Some(_) => None,
    }
}

// ── Rule sets ───────────────────────────────────────────────────────

/// Church signup rules. Birth date is required but has no age floor.
pub fn validate_signup(form: &SignupRequest) -> FieldErrors {
    let mut errors = FieldErrors::new();
    errors.check(field::FIRST_NAME, check_name(form.first_name.as_deref()));
    errors.check(field::LAST_NAME, check_name(form.last_name.as_deref()));
    errors.check(field::EMAIL, check_email(form.email.as_deref()));
    errors.check(field::PHONE, check_phone(form.phone.as_deref()));
    errors.check(
        field::BIRTH_DATE,
        present(form.birth_date.as_deref())
            .is_none()
            .then_some(FieldProblem::Required),
    );
    errors
}

/// Membership form rules, evaluated as of `today`
pub fn validate_membership(form: &MembershipForm, today: NaiveDate) -> FieldErrors {
    let mut errors = FieldErrors::new();
    errors.check(field::FIRST_NAME, check_name(form.first_name.as_deref()));
    errors.check(field::LAST_NAME, check_name(form.last_name.as_deref()));
    errors.check(field::EMAIL, check_email(form.email.as_deref()));
    errors.check(field::PHONE, check_phone(form.phone.as_deref()));

    let password = form.password.as_deref().unwrap_or_default();
    errors.check(
        field::PASSWORD,
        if password.is_empty() {
            Some(FieldProblem::Required)
        } else if password.chars().count() < MIN_PASSWORD_LEN {
            Some(FieldProblem::TooShort)
        } else {
            None
        },
    );
    errors.check(
        field::CONFIRM_PASSWORD,
        (form.confirm_password.as_deref().unwrap_or_default() != password)
            .then_some(FieldProblem::Mismatch),
    );

    errors.check(
        field::BIRTH_DATE,
        match present(form.birth_date.as_deref()) {
            None => Some(FieldProblem::Required),
            Some(raw) => match parse_birth_date(raw) {
                None => Some(FieldProblem::InvalidFormat),
                Some(date) if age_on(date, today) < MIN_MEMBERSHIP_AGE => {
                    Some(FieldProblem::UnderMinimumAge)
                }
                Some(_) => None,
            },
        },
    );

    errors.check(
        field::AGREE_TO_TERMS,
        (!form.agree_to_terms).then_some(FieldProblem::MustAgree),
    );
    errors
}

/// Required signup fields that are absent or blank, in canonical order
pub fn missing_required(form: &SignupRequest) -> Vec<&'static str> {
    let values = [
        &form.first_name,
        &form.last_name,
        &form.email,
        &form.phone,
        &form.birth_date,
    ];
    REQUIRED_SIGNUP_FIELDS
        .iter()
        .zip(values)
        .filter(|(_, value)| present(value.as_deref()).is_none())
        .map(|(name, _)| *name)
        .collect()
}
