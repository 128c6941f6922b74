//! Signup payloads
//!
//! Every text field is optional on the wire: absence is reported by the
//! validation rules, not by the JSON decoder.

use serde::{Deserialize, Deserializer, Serialize};

/// Church signup payload (`POST /api/signup`)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub birth_date: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,
    pub membership_type: Option<String>,
    pub attendance: Option<String>,
    pub baptized: Option<String>,
    pub salvation: Option<String>,
    pub emergency_contact_name: Option<String>,
    pub emergency_contact_phone: Option<String>,
    pub prayer_request: Option<String>,
    pub how_heard: Option<String>,
    /// Checked ministries; a lone checkbox may arrive as a bare string
    #[serde(default, alias = "ministries", deserialize_with = "one_or_many")]
    pub ministry: Vec<String>,
}

/// Text fields of [`SignupRequest`], addressed by the form while editing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SignupField {
    FirstName,
    LastName,
    Email,
    Phone,
    BirthDate,
    Address,
    City,
    State,
    ZipCode,
    MembershipType,
    Attendance,
    Baptized,
    Salvation,
    EmergencyContactName,
    EmergencyContactPhone,
    PrayerRequest,
    HowHeard,
}

impl SignupField {
    /// camelCase key used on the wire and in validation errors
    pub const fn wire_name(&self) -> &'static str {
        match self {
            Self::FirstName => "firstName",
            Self::LastName => "lastName",
            Self::Email => "email",
            Self::Phone => "phone",
            Self::BirthDate => "birthDate",
            Self::Address => "address",
            Self::City => "city",
            Self::State => "state",
            Self::ZipCode => "zipCode",
            Self::MembershipType => "membershipType",
            Self::Attendance => "attendance",
            Self::Baptized => "baptized",
            Self::Salvation => "salvation",
            Self::EmergencyContactName => "emergencyContactName",
            Self::EmergencyContactPhone => "emergencyContactPhone",
            Self::PrayerRequest => "prayerRequest",
            Self::HowHeard => "howHeard",
        }
    }
}

impl SignupRequest {
    fn slot(&mut self, field: SignupField) -> &mut Option<String> {
        match field {
            SignupField::FirstName => &mut self.first_name,
            SignupField::LastName => &mut self.last_name,
            SignupField::Email => &mut self.email,
            SignupField::Phone => &mut self.phone,
            SignupField::BirthDate => &mut self.birth_date,
            SignupField::Address => &mut self.address,
            SignupField::City => &mut self.city,
            SignupField::State => &mut self.state,
            SignupField::ZipCode => &mut self.zip_code,
            SignupField::MembershipType => &mut self.membership_type,
            SignupField::Attendance => &mut self.attendance,
            SignupField::Baptized => &mut self.baptized,
            SignupField::Salvation => &mut self.salvation,
            SignupField::EmergencyContactName => &mut self.emergency_contact_name,
            SignupField::EmergencyContactPhone => &mut self.emergency_contact_phone,
            SignupField::PrayerRequest => &mut self.prayer_request,
            SignupField::HowHeard => &mut self.how_heard,
        }
    }

    /// Return a copy of this payload with one field replaced
    pub fn with_field(mut self, field: SignupField, value: impl Into<String>) -> Self {
        *self.slot(field) = Some(value.into());
        self
    }

    /// Return a copy of this payload with one field cleared
    pub fn without_field(mut self, field: SignupField) -> Self {
        *self.slot(field) = None;
        self
    }

    /// Return a copy of this payload with the ministry list replaced
    pub fn with_ministries<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ministry = names.into_iter().map(Into::into).collect();
        self
    }

    /// Checked ministry names, trimmed, blanks dropped, order kept
    pub fn ministry_names(&self) -> Vec<String> {
        self.ministry
            .iter()
            .map(|name| name.trim())
            .filter(|name| !name.is_empty())
            .map(str::to_string)
            .collect()
    }
}

/// Standalone membership form (account-style signup with password)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MembershipForm {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub password: Option<String>,
    pub confirm_password: Option<String>,
    pub birth_date: Option<String>,
    #[serde(default)]
    pub agree_to_terms: bool,
}

fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
        Null(()),
    }

    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(name) => vec![name],
        OneOrMany::Many(names) => names,
        OneOrMany::Null(()) => Vec::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_camel_case() {
        let json = r#"{
            "firstName": "John",
            "lastName": "Doe",
            "email": "john@example.com",
            "phone": "555-123-4567",
            "birthDate": "1985-05-15",
            "zipCode": "12345",
            "membershipType": "volunteer",
            "emergencyContactPhone": "555-000-1111",
            "ministry": ["Worship Team", "Youth Ministry"]
        }"#;
        let req: SignupRequest = serde_json::from_str(json).unwrap();

        assert_eq!(req.first_name.as_deref(), Some("John"));
        assert_eq!(req.birth_date.as_deref(), Some("1985-05-15"));
        assert_eq!(req.zip_code.as_deref(), Some("12345"));
        assert_eq!(req.membership_type.as_deref(), Some("volunteer"));
        assert_eq!(req.emergency_contact_phone.as_deref(), Some("555-000-1111"));
        assert_eq!(req.ministry, vec!["Worship Team", "Youth Ministry"]);
        assert!(req.address.is_none());
    }

    #[test]
    fn test_ministry_accepts_single_string_null_and_alias() {
        let req: SignupRequest = serde_json::from_str(r#"{"ministry":"Choir"}"#).unwrap();
        assert_eq!(req.ministry, vec!["Choir"]);

        let req: SignupRequest = serde_json::from_str(r#"{"ministry":null}"#).unwrap();
        assert!(req.ministry.is_empty());

        let req: SignupRequest = serde_json::from_str(r#"{"ministries":["Choir"]}"#).unwrap();
        assert_eq!(req.ministry, vec!["Choir"]);

        let req: SignupRequest = serde_json::from_str("{}").unwrap();
        assert!(req.ministry.is_empty());
    }

    #[test]
    fn test_with_field_builds_new_value() {
        let original = SignupRequest::default().with_field(SignupField::FirstName, "John");
        let edited = original.clone().with_field(SignupField::Email, "john@example.com");

        assert!(original.email.is_none());
        assert_eq!(edited.first_name.as_deref(), Some("John"));
        assert_eq!(edited.email.as_deref(), Some("john@example.com"));

        let cleared = edited.without_field(SignupField::FirstName);
        assert!(cleared.first_name.is_none());
    }

    #[test]
    fn test_ministry_names_trims_and_drops_blanks() {
        let req = SignupRequest::default().with_ministries([" Worship Team ", "", "   ", "Youth Ministry"]);
        assert_eq!(req.ministry_names(), vec!["Worship Team", "Youth Ministry"]);
    }

    #[test]
    fn test_wire_names() {
        assert_eq!(SignupField::FirstName.wire_name(), "firstName");
        assert_eq!(SignupField::ZipCode.wire_name(), "zipCode");
        assert_eq!(SignupField::HowHeard.wire_name(), "howHeard");
    }

    #[test]
    fn test_membership_form_defaults_terms_to_unchecked() {
        let form: MembershipForm =
            serde_json::from_str(r#"{"password":"secret123","confirmPassword":"secret123"}"#)
                .unwrap();
        assert!(!form.agree_to_terms);
        assert_eq!(form.confirm_password.as_deref(), Some("secret123"));
    }
}
