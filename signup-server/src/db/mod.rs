//! Database access layer
//!
//! [`MemberStore`] hands out [`UnitOfWork`]s (one transaction each) and
//! serves the read-side member queries. Two implementations:
//! - [`postgres::PgStore`]: the real thing, backed by a `PgPool`
//! - `memory::MemoryStore`: in-process, same contract, built only for tests
//!   or with the `test-util` feature

pub mod members;
#[cfg(any(test, feature = "test-util"))]
pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use chrono::NaiveDate;
use shared::models::{MemberWithMinistries, MembershipType, SignupRequest};
use shared::validation::parse_birth_date;
use thiserror::Error;

/// Name of the unique constraint on `members.email`
pub const EMAIL_UNIQUE_CONSTRAINT: &str = "members_email_key";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("unique constraint violated: {}", .constraint.as_deref().unwrap_or("<unnamed>"))]
    UniqueViolation { constraint: Option<String> },

    #[error("timed out waiting for the database")]
    Timeout,

    #[error("database error: {0}")]
    Database(sqlx::Error),

    #[error("{0}")]
    Other(String),
}

impl StoreError {
    /// True when the email uniqueness constraint rejected the write
    pub fn is_duplicate_email(&self) -> bool {
        matches!(
            self,
            Self::UniqueViolation { constraint: Some(name) } if name == EMAIL_UNIQUE_CONSTRAINT
        )
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Database(db) if db.is_unique_violation() => Self::UniqueViolation {
                constraint: db.constraint().map(str::to_string),
            },
            sqlx::Error::PoolTimedOut => Self::Timeout,
            _ => Self::Database(err),
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// A member ready to be written: trimmed, typed, optional text blanks dropped
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMember {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub birth_date: NaiveDate,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,
    pub membership_type: MembershipType,
    pub attendance: Option<String>,
    pub baptized: Option<String>,
    pub salvation: Option<String>,
    pub emergency_contact_name: Option<String>,
    pub emergency_contact_phone: Option<String>,
    pub prayer_request: Option<String>,
    pub how_heard: Option<String>,
}

impl NewMember {
    /// Convert a signup payload into a writable record
    ///
    /// Required fields must already be known to be present. Fails with
    /// [`StoreError::Other`] for values the members table would reject.
    pub fn from_request(req: &SignupRequest) -> StoreResult<Self> {
        let required = |value: &Option<String>, name: &str| {
            text(value).ok_or_else(|| StoreError::Other(format!("{name} is required")))
        };

        let raw_birth_date = required(&req.birth_date, "birthDate")?;
        let birth_date = parse_birth_date(&raw_birth_date)
            .ok_or_else(|| StoreError::Other(format!("invalid birth date: {raw_birth_date:?}")))?;

        let membership_type = match text(&req.membership_type) {
            None => MembershipType::default(),
            Some(raw) => raw
                .parse::<MembershipType>()
                .map_err(|e| StoreError::Other(e.to_string()))?,
        };

        Ok(Self {
            first_name: required(&req.first_name, "firstName")?,
            last_name: required(&req.last_name, "lastName")?,
            email: required(&req.email, "email")?,
            phone: required(&req.phone, "phone")?,
            birth_date,
            address: text(&req.address),
            city: text(&req.city),
            state: text(&req.state),
            zip_code: text(&req.zip_code),
            membership_type,
            attendance: text(&req.attendance),
            baptized: text(&req.baptized),
            salvation: text(&req.salvation),
            emergency_contact_name: text(&req.emergency_contact_name),
            emergency_contact_phone: text(&req.emergency_contact_phone),
            prayer_request: text(&req.prayer_request),
            how_heard: text(&req.how_heard),
        })
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

fn text(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// One open transaction against the store
///
/// Dropping an uncommitted unit of work rolls it back and releases its
/// connection.
#[async_trait]
pub trait UnitOfWork: Send {
    /// Insert the member row and return its generated id
    async fn insert_member(&mut self, member: &NewMember, now: i64) -> StoreResult<i64>;

    /// Insert one interest row per name, in order, as a single statement
    async fn insert_ministries(&mut self, member_id: i64, names: &[String], now: i64) -> StoreResult<()>;

    async fn commit(self: Box<Self>) -> StoreResult<()>;

    async fn rollback(self: Box<Self>) -> StoreResult<()>;
}

#[async_trait]
pub trait MemberStore: Send + Sync {
    /// Acquire a connection and open a transaction on it
    async fn begin(&self) -> StoreResult<Box<dyn UnitOfWork>>;

    /// All members with their ministries, newest first
    async fn list_members(&self) -> StoreResult<Vec<MemberWithMinistries>>;

    async fn find_member(&self, id: i64) -> StoreResult<Option<MemberWithMinistries>>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::SignupField;

    fn john() -> SignupRequest {
        SignupRequest::default()
            .with_field(SignupField::FirstName, " John ")
            .with_field(SignupField::LastName, "Doe")
            .with_field(SignupField::Email, "john@example.com")
            .with_field(SignupField::Phone, "555-123-4567")
            .with_field(SignupField::BirthDate, "1985-05-15")
    }

    #[test]
    fn test_new_member_from_request() {
        let member = NewMember::from_request(
            &john()
                .with_field(SignupField::City, "  ")
                .with_field(SignupField::MembershipType, "Volunteer"),
        )
        .unwrap();

        assert_eq!(member.first_name, "John");
        assert_eq!(member.birth_date, NaiveDate::from_ymd_opt(1985, 5, 15).unwrap());
        assert_eq!(member.membership_type, MembershipType::Volunteer);
        assert!(member.city.is_none());
        assert_eq!(member.full_name(), "John Doe");
    }

    #[test]
    fn test_new_member_defaults_membership_type() {
        let member = NewMember::from_request(&john()).unwrap();
        assert_eq!(member.membership_type, MembershipType::Member);
    }

    #[test]
    fn test_new_member_rejects_unstorable_values() {
        let bad_date = john().with_field(SignupField::BirthDate, "May 15th");
        assert!(matches!(
            NewMember::from_request(&bad_date),
            Err(StoreError::Other(_))
        ));

        let bad_type = john().with_field(SignupField::MembershipType, "elder");
        assert!(matches!(
            NewMember::from_request(&bad_type),
            Err(StoreError::Other(_))
        ));
    }

    #[test]
    fn test_duplicate_email_classification() {
        let dup = StoreError::UniqueViolation {
            constraint: Some(EMAIL_UNIQUE_CONSTRAINT.into()),
        };
        assert!(dup.is_duplicate_email());

        let other = StoreError::UniqueViolation {
            constraint: Some("ministry_interests_pkey".into()),
        };
        assert!(!other.is_duplicate_email());
        assert!(!StoreError::UniqueViolation { constraint: None }.is_duplicate_email());
        assert!(!StoreError::Timeout.is_duplicate_email());
    }

    #[test]
    fn test_pool_timeout_maps_to_timeout() {
        assert!(matches!(
            StoreError::from(sqlx::Error::PoolTimedOut),
            StoreError::Timeout
        ));
        assert!(matches!(
            StoreError::from(sqlx::Error::RowNotFound),
            StoreError::Database(_)
        ));
    }
}
