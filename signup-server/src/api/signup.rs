//! Signup endpoint

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use http::StatusCode;
use serde::Serialize;
use shared::error::{AppError, AppResult};
use shared::models::SignupRequest;

use crate::notify;
use crate::signup;
use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupResponse {
    pub success: bool,
    pub message: String,
    pub member_id: i64,
}

/// POST /api/signup
pub async fn signup(
    State(state): State<AppState>,
    payload: Result<Json<SignupRequest>, JsonRejection>,
) -> AppResult<(StatusCode, Json<SignupResponse>)> {
    let Json(request) = payload.map_err(|rejection| {
        tracing::debug!(error = %rejection, "Rejected signup body");
        AppError::invalid_request(rejection.body_text())
    })?;

    let outcome = signup::register(state.store.as_ref(), &request, state.signup_timeout).await?;

    let response = SignupResponse {
        success: true,
        message: format!(
            "Welcome, {}! Your signup was successful.",
            outcome.member.first_name
        ),
        member_id: outcome.member_id,
    };

    // Delivery runs detached; the response never waits on it
    notify::spawn_after_signup(state.notifier.clone(), outcome, state.notify_timeout);

    Ok((StatusCode::CREATED, Json(response)))
}
