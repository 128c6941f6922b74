//! Member listing endpoints

use axum::Json;
use axum::extract::rejection::PathRejection;
use axum::extract::{Path, State};
use serde::Serialize;
use shared::error::{AppError, AppResult, ErrorCode};
use shared::models::MemberWithMinistries;

use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct MembersResponse {
    pub success: bool,
    pub count: usize,
    pub members: Vec<MemberWithMinistries>,
}

#[derive(Debug, Serialize)]
pub struct MemberResponse {
    pub success: bool,
    pub member: MemberWithMinistries,
}

/// GET /api/members
pub async fn list_members(State(state): State<AppState>) -> AppResult<Json<MembersResponse>> {
    let members = state.store.list_members().await.map_err(|e| {
        tracing::error!(error = %e, "Failed to list members");
        AppError::with_message(
            ErrorCode::MemberFetchFailed,
            "An error occurred while retrieving members.",
        )
    })?;

    Ok(Json(MembersResponse {
        success: true,
        count: members.len(),
        members,
    }))
}

/// GET /api/members/{id}
pub async fn get_member(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> AppResult<Json<MemberResponse>> {
    // Ids that are not integers cannot name a member
    let Ok(Path(id)) = id else {
        return Err(AppError::new(ErrorCode::MemberNotFound));
    };

    let member = state
        .store
        .find_member(id)
        .await
        .map_err(|e| {
            tracing::error!(member_id = id, error = %e, "Failed to fetch member");
            AppError::with_message(
                ErrorCode::MemberFetchFailed,
                "An error occurred while retrieving the member.",
            )
        })?
        .ok_or_else(|| AppError::new(ErrorCode::MemberNotFound))?;

    Ok(Json(MemberResponse {
        success: true,
        member,
    }))
}
