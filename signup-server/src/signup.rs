//! Signup transaction
//!
//! One call writes one member and its ministry interests atomically:
//! `Idle -> TransactionOpen -> {Committed, RolledBack}`. There are no
//! retries; a failed signup has to be resubmitted.

use shared::error::{AppError, ErrorCode};
use shared::models::SignupRequest;
use shared::util::now_millis;
use shared::validation::{REQUIRED_SIGNUP_FIELDS, missing_required};
use std::time::Duration;
use thiserror::Error;

use crate::db::{MemberStore, NewMember, StoreError, StoreResult};

#[derive(Debug, Error)]
pub enum SignupError {
    #[error("missing required fields: {}", .missing.join(", "))]
    MissingRequiredFields { missing: Vec<&'static str> },

    #[error("email already registered")]
    DuplicateEmail,

    #[error("signup failed: {0}")]
    SignupFailed(StoreError),
}

impl From<StoreError> for SignupError {
    fn from(err: StoreError) -> Self {
        if err.is_duplicate_email() {
            Self::DuplicateEmail
        } else {
            Self::SignupFailed(err)
        }
    }
}

impl From<SignupError> for AppError {
    fn from(err: SignupError) -> Self {
        match err {
            SignupError::MissingRequiredFields { missing } => {
                AppError::new(ErrorCode::MissingRequiredFields)
                    .with_detail("required", REQUIRED_SIGNUP_FIELDS.to_vec())
                    .with_detail("missing", missing)
            }
            SignupError::DuplicateEmail => AppError::with_message(
                ErrorCode::EmailAlreadyRegistered,
                "This email address is already registered. Please use a different email.",
            ),
            SignupError::SignupFailed(_) => AppError::with_message(
                ErrorCode::SignupFailed,
                "An error occurred during signup. Please try again later.",
            ),
        }
    }
}

/// A committed signup
#[derive(Debug, Clone)]
pub struct SignupOutcome {
    pub member_id: i64,
    pub member: NewMember,
    pub ministries: Vec<String>,
}

/// Run the signup transaction
///
/// Required fields are checked before the store is touched. The write
/// (begin through commit) runs under `timeout`; expiry drops the unit of
/// work, which rolls it back.
pub async fn register(
    store: &dyn MemberStore,
    request: &SignupRequest,
    timeout: Duration,
) -> Result<SignupOutcome, SignupError> {
    let missing = missing_required(request);
    if !missing.is_empty() {
        return Err(SignupError::MissingRequiredFields { missing });
    }

    let member = NewMember::from_request(request).map_err(|e| {
        tracing::warn!(error = %e, "Signup rejected before write");
        SignupError::SignupFailed(e)
    })?;
    let ministries = request.ministry_names();

    let result = match tokio::time::timeout(timeout, write_member(store, &member, &ministries)).await {
        Ok(result) => result,
        Err(_) => Err(StoreError::Timeout),
    };

    match result {
        Ok(member_id) => {
            tracing::info!(
                member_id = member_id,
                email = %member.email,
                ministries = ministries.len(),
                "Member signed up"
            );
            Ok(SignupOutcome {
                member_id,
                member,
                ministries,
            })
        }
        Err(e) => {
            let err = SignupError::from(e);
            match &err {
                SignupError::DuplicateEmail => {
                    tracing::info!(email = %member.email, "Signup rejected: email already registered");
                }
                _ => tracing::error!(email = %member.email, error = %err, "Signup failed"),
            }
            Err(err)
        }
    }
}

async fn write_member(
    store: &dyn MemberStore,
    member: &NewMember,
    ministries: &[String],
) -> StoreResult<i64> {
    let mut unit = store.begin().await?;
    let now = now_millis();

    let staged = async {
        let member_id = unit.insert_member(member, now).await?;
        if !ministries.is_empty() {
            unit.insert_ministries(member_id, ministries, now).await?;
        }
        Ok::<_, StoreError>(member_id)
    }
    .await;

    match staged {
        Ok(member_id) => {
            unit.commit().await?;
            Ok(member_id)
        }
        Err(e) => {
            if let Err(rollback_err) = unit.rollback().await {
                tracing::warn!(error = %rollback_err, "Rollback failed");
            }
            Err(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::memory::MemoryStore;
    use shared::models::SignupField;

    const TIMEOUT: Duration = Duration::from_secs(10);

    fn john() -> SignupRequest {
        SignupRequest::default()
            .with_field(SignupField::FirstName, "John")
            .with_field(SignupField::LastName, "Doe")
            .with_field(SignupField::Email, "john@example.com")
            .with_field(SignupField::Phone, "555-123-4567")
            .with_field(SignupField::BirthDate, "1985-05-15")
    }

    #[tokio::test]
    async fn test_missing_fields_never_touch_the_store() {
        let store = MemoryStore::new();
        store.set_begin_delay(Some(Duration::from_secs(3600)));

        let request = john()
            .without_field(SignupField::Email)
            .with_field(SignupField::LastName, "   ");
        let err = register(&store, &request, TIMEOUT).await.unwrap_err();

        match err {
            SignupError::MissingRequiredFields { missing } => {
                assert_eq!(missing, vec!["lastName", "email"]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(store.member_count(), 0);
        assert_eq!(store.open_units(), 0);
    }

    #[tokio::test]
    async fn test_member_and_ministries_written_together() {
        let store = MemoryStore::new();
        let request = john().with_ministries(["Worship Team", " ", "Youth Ministry"]);

        let outcome = register(&store, &request, TIMEOUT).await.unwrap();

        assert_eq!(outcome.member_id, 1);
        assert_eq!(outcome.ministries, vec!["Worship Team", "Youth Ministry"]);
        assert_eq!(store.member_count(), 1);
        assert_eq!(store.ministry_count(), 2);
        assert_eq!(store.open_units(), 0);

        let row = store.find_member(1).await.unwrap().unwrap();
        assert_eq!(row.ministries.as_deref(), Some("Worship Team,Youth Ministry"));
    }

    #[tokio::test]
    async fn test_no_ministries_means_no_interest_rows() {
        let store = MemoryStore::new();
        register(&store, &john(), TIMEOUT).await.unwrap();

        assert_eq!(store.member_count(), 1);
        assert_eq!(store.ministry_count(), 0);
    }

    #[tokio::test]
    async fn test_duplicate_email_is_distinguished() {
        let store = MemoryStore::new();
        register(&store, &john(), TIMEOUT).await.unwrap();

        let again = john().with_field(SignupField::FirstName, "Johnny");
        let err = register(&store, &again, TIMEOUT).await.unwrap_err();

        assert!(matches!(err, SignupError::DuplicateEmail));
        assert_eq!(store.members_with_email("john@example.com"), 1);
        assert_eq!(store.open_units(), 0);
    }

    #[tokio::test]
    async fn test_ministry_failure_rolls_back_member() {
        let store = MemoryStore::new();
        store.fail_next_ministry_insert();

        let request = john().with_ministries(["Worship Team"]);
        let err = register(&store, &request, TIMEOUT).await.unwrap_err();

        assert!(matches!(err, SignupError::SignupFailed(_)));
        assert_eq!(store.member_count(), 0);
        assert_eq!(store.ministry_count(), 0);
        assert_eq!(store.open_units(), 0);
    }

    #[tokio::test]
    async fn test_unparseable_birth_date_is_signup_failed() {
        let store = MemoryStore::new();
        let request = john().with_field(SignupField::BirthDate, "15/05/1985");

        let err = register(&store, &request, TIMEOUT).await.unwrap_err();
        assert!(matches!(err, SignupError::SignupFailed(StoreError::Other(_))));
        assert_eq!(store.member_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_is_signup_failed() {
        let store = MemoryStore::new();
        store.set_begin_delay(Some(Duration::from_secs(60)));

        let err = register(&store, &john(), Duration::from_secs(1))
            .await
            .unwrap_err();

        assert!(matches!(err, SignupError::SignupFailed(StoreError::Timeout)));
        assert_eq!(store.member_count(), 0);
        assert_eq!(store.open_units(), 0);
    }

    #[tokio::test]
    async fn test_listing_after_k_signups() {
        let store = MemoryStore::new();
        for i in 0..5 {
            let request = john().with_field(SignupField::Email, format!("member{i}@example.com"));
            register(&store, &request, TIMEOUT).await.unwrap();
        }

        let rows = store.list_members().await.unwrap();
        assert_eq!(rows.len(), 5);
        assert_eq!(rows[0].member.email, "member4@example.com");
        assert!(
            rows.windows(2)
                .all(|w| w[0].member.created_at >= w[1].member.created_at)
        );
    }

    #[test]
    fn test_app_error_mapping() {
        let err = AppError::from(SignupError::MissingRequiredFields {
            missing: vec!["phone"],
        });
        assert_eq!(err.code, ErrorCode::MissingRequiredFields);
        let details = err.details.unwrap();
        assert_eq!(
            details["required"],
            serde_json::json!(["firstName", "lastName", "email", "phone", "birthDate"])
        );
        assert_eq!(details["missing"], serde_json::json!(["phone"]));

        let err = AppError::from(SignupError::DuplicateEmail);
        assert_eq!(err.code, ErrorCode::EmailAlreadyRegistered);
        assert!(err.message.is_some());

        let err = AppError::from(SignupError::SignupFailed(StoreError::Timeout));
        assert_eq!(err.code, ErrorCode::SignupFailed);
        assert!(!err.to_string().contains("timed out"));
    }
}
