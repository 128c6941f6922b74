//! Member Model

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Membership category chosen on the signup form
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MembershipType {
    Visitor,
    #[default]
    Member,
    Volunteer,
}

impl MembershipType {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Visitor => "visitor",
            Self::Member => "member",
            Self::Volunteer => "volunteer",
        }
    }
}

impl fmt::Display for MembershipType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown membership type: {0}")]
pub struct InvalidMembershipType(pub String);

impl FromStr for MembershipType {
    type Err = InvalidMembershipType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "visitor" => Ok(Self::Visitor),
            "member" => Ok(Self::Member),
            "volunteer" => Ok(Self::Volunteer),
            _ => Err(InvalidMembershipType(s.to_string())),
        }
    }
}

impl TryFrom<String> for MembershipType {
    type Error = InvalidMembershipType;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Member entity (one row per registrant)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct Member {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub birth_date: NaiveDate,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,
    #[cfg_attr(feature = "db", sqlx(try_from = "String"))]
    pub membership_type: MembershipType,
    pub attendance: Option<String>,
    pub baptized: Option<String>,
    pub salvation: Option<String>,
    pub emergency_contact_name: Option<String>,
    pub emergency_contact_phone: Option<String>,
    pub prayer_request: Option<String>,
    pub how_heard: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Member with ministry interests (for list/detail views)
///
/// `ministries` holds the comma-joined ministry names in insertion order,
/// or `None` when the member picked none.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct MemberWithMinistries {
    #[serde(flatten)]
    #[cfg_attr(feature = "db", sqlx(flatten))]
    pub member: Member,
    pub ministries: Option<String>,
}

impl MemberWithMinistries {
    /// Ministry names split back out of the joined column
    pub fn ministry_names(&self) -> Vec<&str> {
        self.ministries
            .as_deref()
            .map(|joined| joined.split(',').collect())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_member() -> Member {
        Member {
            id: 1,
            first_name: "John".into(),
            last_name: "Doe".into(),
            email: "john@example.com".into(),
            phone: "555-123-4567".into(),
            birth_date: NaiveDate::from_ymd_opt(1985, 5, 15).unwrap(),
            address: None,
            city: Some("Springfield".into()),
            state: None,
            zip_code: None,
            membership_type: MembershipType::Volunteer,
            attendance: None,
            baptized: Some("yes".into()),
            salvation: None,
            emergency_contact_name: None,
            emergency_contact_phone: None,
            prayer_request: None,
            how_heard: None,
            created_at: 1_700_000_000_000,
            updated_at: 1_700_000_000_000,
        }
    }

    #[test]
    fn test_membership_type_parse() {
        assert_eq!("visitor".parse::<MembershipType>(), Ok(MembershipType::Visitor));
        assert_eq!(" Volunteer ".parse::<MembershipType>(), Ok(MembershipType::Volunteer));
        assert_eq!(
            "elder".parse::<MembershipType>(),
            Err(InvalidMembershipType("elder".into()))
        );
        assert_eq!(MembershipType::default(), MembershipType::Member);
    }

    #[test]
    fn test_membership_type_serde() {
        let json = serde_json::to_string(&MembershipType::Visitor).unwrap();
        assert_eq!(json, "\"visitor\"");
        assert_eq!(MembershipType::Volunteer.to_string(), "volunteer");
    }

    #[test]
    fn test_member_with_ministries_wire_shape() {
        let row = MemberWithMinistries {
            member: sample_member(),
            ministries: Some("Worship Team,Youth Ministry".into()),
        };
        let json = serde_json::to_value(&row).unwrap();

        assert_eq!(json["firstName"], "John");
        assert_eq!(json["birthDate"], "1985-05-15");
        assert_eq!(json["membershipType"], "volunteer");
        assert_eq!(json["ministries"], "Worship Team,Youth Ministry");
        assert!(json.get("member").is_none());
    }

    #[test]
    fn test_ministry_names() {
        let mut row = MemberWithMinistries {
            member: sample_member(),
            ministries: Some("Worship Team,Youth Ministry".into()),
        };
        assert_eq!(row.ministry_names(), vec!["Worship Team", "Youth Ministry"]);

        row.ministries = None;
        assert!(row.ministry_names().is_empty());
    }
}
