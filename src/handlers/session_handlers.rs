//! Demo session endpoints. There is no real authentication: any non-empty
//! credential pair is accepted and `/me` simply echoes its query params.

use axum::{Json, extract::Query, http::StatusCode, response::IntoResponse};
use serde::Deserialize;
use serde_json::json;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct MeQuery {
    pub email: Option<String>,
    pub name: Option<String>,
}

/// `POST /login` — accepts any non-empty email/password pair.
pub async fn login(Json(req): Json<LoginRequest>) -> impl IntoResponse {
    if !req.email.is_empty() && !req.password.is_empty() {
        (StatusCode::OK, Json(json!({ "token": "sample-token" })))
    } else {
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "message": "Invalid credentials" })),
        )
    }
}

/// `GET /me` — echoes the caller-supplied identity.
pub async fn me(Query(q): Query<MeQuery>) -> impl IntoResponse {
    Json(json!({
        "email": q.email.unwrap_or_else(|| "test@test.com".to_string()),
        "name": q.name.unwrap_or_else(|| "Test User".to_string()),
    }))
}
