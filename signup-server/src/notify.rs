//! Signup notifications
//!
//! Best-effort only: a failed send is logged and forgotten. Nothing here can
//! change the outcome of a committed signup.

use async_trait::async_trait;
use aws_sdk_sesv2::Client as SesClient;
use aws_sdk_sesv2::types::{Body, Content, Destination, EmailContent, Message};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

use crate::db::NewMember;
use crate::signup::SignupOutcome;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[async_trait]
pub trait Notifier: Send + Sync {
    /// Confirmation to the new member
    async fn send_welcome(&self, member: &NewMember, member_id: i64) -> Result<(), BoxError>;

    /// Heads-up to church staff
    async fn send_staff_notice(&self, member: &NewMember, member_id: i64) -> Result<(), BoxError>;
}

/// Plain-text email
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailMessage {
    pub subject: String,
    pub body: String,
}

pub fn welcome_message(member: &NewMember) -> EmailMessage {
    EmailMessage {
        subject: "Welcome to our church family!".into(),
        body: format!(
            "Dear {},\n\n\
             Thank you for signing up with our church. We have received your \
             information and someone from our team will be in touch soon.\n\n\
             Blessings,\n\
             The Church Office",
            member.first_name
        ),
    }
}

pub fn staff_notice_message(member: &NewMember, member_id: i64) -> EmailMessage {
    let mut body = format!(
        "A new member has signed up.\n\n\
         Member ID: {member_id}\n\
         Name: {}\n\
         Email: {}\n\
         Phone: {}\n\
         Membership type: {}\n",
        member.full_name(),
        member.email,
        member.phone,
        member.membership_type,
    );
    if let Some(prayer) = &member.prayer_request {
        body.push_str(&format!("\nPrayer request:\n{prayer}\n"));
    }
    EmailMessage {
        subject: format!("New member signup: {}", member.full_name()),
        body,
    }
}

/// AWS SES v2 sender
pub struct SesNotifier {
    ses: SesClient,
    from: String,
    staff_email: Option<String>,
}

impl SesNotifier {
    pub fn new(ses: SesClient, from: impl Into<String>, staff_email: Option<String>) -> Self {
        Self {
            ses,
            from: from.into(),
            staff_email,
        }
    }

    async fn send(&self, to: &str, message: EmailMessage) -> Result<(), BoxError> {
        let subject = Content::builder().data(message.subject).build()?;
        let body = Body::builder()
            .text(Content::builder().data(message.body).build()?)
            .build();
        let message = Message::builder().subject(subject).body(body).build();

        self.ses
            .send_email()
            .from_email_address(&self.from)
            .destination(Destination::builder().to_addresses(to).build())
            .content(EmailContent::builder().simple(message).build())
            .send()
            .await?;
        Ok(())
    }
}

#[async_trait]
impl Notifier for SesNotifier {
    async fn send_welcome(&self, member: &NewMember, member_id: i64) -> Result<(), BoxError> {
        self.send(&member.email, welcome_message(member)).await?;
        tracing::info!(member_id = member_id, to = %member.email, "Welcome email sent");
        Ok(())
    }

    async fn send_staff_notice(&self, member: &NewMember, member_id: i64) -> Result<(), BoxError> {
        let Some(staff) = &self.staff_email else {
            tracing::debug!(member_id = member_id, "STAFF_EMAIL not set, staff notice skipped");
            return Ok(());
        };
        self.send(staff, staff_notice_message(member, member_id)).await?;
        tracing::info!(member_id = member_id, to = %staff, "Staff notice sent");
        Ok(())
    }
}

/// Used when no sender address is configured
pub struct DisabledNotifier;

#[async_trait]
impl Notifier for DisabledNotifier {
    async fn send_welcome(&self, member: &NewMember, member_id: i64) -> Result<(), BoxError> {
        tracing::debug!(member_id = member_id, to = %member.email, "Notifications disabled, welcome email skipped");
        Ok(())
    }

    async fn send_staff_notice(&self, _member: &NewMember, member_id: i64) -> Result<(), BoxError> {
        tracing::debug!(member_id = member_id, "Notifications disabled, staff notice skipped");
        Ok(())
    }
}

/// Which notifications went out
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NotifyReport {
    pub welcome_sent: bool,
    pub staff_notified: bool,
}

/// Send both post-signup notifications; failures are logged, never returned
pub async fn after_signup(notifier: &dyn Notifier, outcome: &SignupOutcome) -> NotifyReport {
    let member_id = outcome.member_id;

    let welcome_sent = match notifier.send_welcome(&outcome.member, member_id).await {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(member_id = member_id, error = %e, "Failed to send welcome email");
            false
        }
    };
    let staff_notified = match notifier.send_staff_notice(&outcome.member, member_id).await {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(member_id = member_id, error = %e, "Failed to send staff notice");
            false
        }
    };

    NotifyReport {
        welcome_sent,
        staff_notified,
    }
}

/// Run [`after_signup`] in the background, bounded by `budget`
///
/// The caller does not wait for delivery. The handle resolves to `None` when
/// the budget ran out before both sends finished.
pub fn spawn_after_signup(
    notifier: Arc<dyn Notifier>,
    outcome: SignupOutcome,
    budget: Duration,
) -> JoinHandle<Option<NotifyReport>> {
    tokio::spawn(async move {
        match tokio::time::timeout(budget, after_signup(notifier.as_ref(), &outcome)).await {
            Ok(report) => Some(report),
            Err(_) => {
                tracing::warn!(
                    member_id = outcome.member_id,
                    budget_secs = budget.as_secs(),
                    "Signup notifications abandoned after timeout"
                );
                None
            }
        }
    })
}
