//! Actor identity middleware.
//!
//! Authentication itself is an external collaborator: the edge layer in front
//! of this service verifies credentials and forwards the caller's identity in
//! `x-actor-id` and `x-actor-role` headers. This middleware turns those into
//! an [`Actor`] request extension and rejects requests without one.

use axum::{
    body::Body,
    extract::Request,
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::error::ErrorResponse;

/// Role of an authenticated caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ActorRole {
    Student,
    Staff,
    Coordinator,
    Admin,
}

impl ActorRole {
    fn parse(s: &str) -> Option<Self> {
        match s {
            "student" => Some(Self::Student),
            "staff" => Some(Self::Staff),
            "coordinator" => Some(Self::Coordinator),
            "admin" => Some(Self::Admin),
            _ => None,
        }
    }
}

/// An already-authenticated caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    pub id: i64,
    pub role: ActorRole,
}

fn unauthorized(message: &str) -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(ErrorResponse {
            error: "unauthorized".to_string(),
            message: message.to_string(),
        }),
    )
        .into_response()
}

/// Extracts the actor identity headers and inserts an [`Actor`] extension.
pub async fn actor_middleware(
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, Response> {
    let actor_id = request
        .headers()
        .get("x-actor-id")
        .and_then(|h| h.to_str().ok())
        .and_then(|s| s.parse::<i64>().ok())
        .ok_or_else(|| unauthorized("Missing or invalid x-actor-id header"))?;

    let role = request
        .headers()
        .get("x-actor-role")
        .and_then(|h| h.to_str().ok())
        .and_then(ActorRole::parse)
        .ok_or_else(|| unauthorized("Missing or invalid x-actor-role header"))?;

    request.extensions_mut().insert(Actor {
        id: actor_id,
        role,
    });

    Ok(next.run(request).await)
}
