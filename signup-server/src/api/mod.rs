//! API routes for signup-server

pub mod health;
pub mod members;
pub mod signup;

use axum::Router;
use axum::routing::{get, post};
use http::{HeaderName, HeaderValue};
use shared::error::AppError;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{
    MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer,
};
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::state::AppState;

const REQUEST_ID_HEADER: &str = "x-request-id";

/// Request ID generator (UUID v4)
#[derive(Clone)]
struct XRequestId;

impl MakeRequestId for XRequestId {
    fn make_request_id<B>(&mut self, _request: &http::Request<B>) -> Option<RequestId> {
        let id = Uuid::new_v4().to_string();
        HeaderValue::from_str(&id).ok().map(RequestId::new)
    }
}

async fn fallback() -> AppError {
    AppError::not_found()
}

/// Build the full application router
pub fn create_router(state: AppState) -> Router {
    let members = Router::new()
        .route("/api/members", get(members::list_members))
        .route("/api/members/{id}", get(members::get_member));

    Router::new()
        .route("/api/health", get(health::health_check))
        .route("/api/signup", post(signup::signup))
        .merge(members)
        .fallback(fallback)
        .with_state(state)
        // Browser form may be served from another origin
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        // Last added runs first: the id must be set before it is propagated
        .layer(PropagateRequestIdLayer::new(HeaderName::from_static(
            REQUEST_ID_HEADER,
        )))
        .layer(SetRequestIdLayer::new(
            HeaderName::from_static(REQUEST_ID_HEADER),
            XRequestId,
        ))
}
