use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::Json,
};
use serde::{Deserialize, Serialize};

use crate::auth::{bearer_token, Role};
use crate::server::app::AppState;
use crate::server::error::ApiError;

#[derive(Deserialize)]
pub struct LoginRequest {
    pub key: String,
}

#[derive(Serialize)]
pub struct SessionResponse {
    pub token: String,
    pub role: &'static str,
    pub issued_at: chrono::DateTime<chrono::Utc>,
}

pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<SessionResponse>, ApiError> {
    let session = state.auth.login(&payload.key)?;

    Ok(Json(SessionResponse {
        token: session.token,
        role: match session.role {
            Role::Admin => "admin",
            Role::Reader => "reader",
        },
        issued_at: session.issued_at,
    }))
}

pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> StatusCode {
    if let Some(token) = bearer_token(&headers) {
        state.auth.logout(token);
    }
    StatusCode::NO_CONTENT
}
