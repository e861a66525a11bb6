//! Legacy trash/lock endpoints kept for wire compatibility.
//!
//! None of these perform a real state transition: the catalog's delete path
//! is a hard delete and nothing ever flips `is_trashed` or checks a stored
//! PIN through these routes. They answer with static acknowledgments so
//! older clients keep working. `/lock` still validates the PIN shape at the
//! boundary.

use crate::{errors::AppError, services::catalog_service::is_valid_pin};
use axum::{Json, extract::Path, response::IntoResponse};
use bytes::Bytes;
use serde::Deserialize;
use serde_json::json;

#[derive(Debug, Deserialize)]
struct PinBody {
    pin: Option<String>,
}

fn pin_from_body(body: &Bytes) -> Option<String> {
    serde_json::from_slice::<PinBody>(body).ok().and_then(|b| b.pin)
}

/// `GET /trash` — always empty; trash is not a real state here.
pub async fn list_trash() -> impl IntoResponse {
    Json(json!({
        "files": [],
        "message": "Trash functionality is not available",
    }))
}

/// `POST /restore/{*key}` — static acknowledgment.
pub async fn restore_document(Path(key): Path<String>) -> impl IntoResponse {
    Json(json!({
        "message": format!("{key} restore functionality is not available"),
    }))
}

/// `DELETE /permanent-delete/{*key}` — static acknowledgment.
pub async fn permanent_delete_document(Path(key): Path<String>) -> impl IntoResponse {
    Json(json!({
        "message": format!("{key} permanent delete functionality is not available"),
    }))
}

/// `POST /lock/{*key}` — validates the PIN shape, then acknowledges without
/// storing anything.
pub async fn lock_document(
    Path(key): Path<String>,
    body: Bytes,
) -> Result<impl IntoResponse, AppError> {
    let pin = pin_from_body(&body);
    match pin {
        Some(pin) if is_valid_pin(&pin) => Ok(Json(json!({
            "message": format!("{key} lock functionality is not available"),
        }))),
        _ => Err(AppError::bad_request("PIN must be 4 or 6 digits")),
    }
}

/// `POST /unlock/{*key}` — static acknowledgment.
pub async fn unlock_document(
    Path(_key): Path<String>,
    _body: Bytes,
) -> impl IntoResponse {
    Json(json!({
        "message": "PIN unlock functionality is not available",
    }))
}
