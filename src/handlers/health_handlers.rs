//! Health & readiness handlers.
//!
//! - GET /status   -> human-facing liveness message
//! - GET /healthz  -> simple liveness ("ok")
//! - GET /readyz   -> readiness that reports the availability gate and a
//!   cheap store round trip

use crate::services::catalog_service::CatalogService;
use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use serde_json::json;
use std::collections::HashMap;

/// `GET /status`
pub async fn status() -> impl IntoResponse {
    Json(json!({ "message": "Document Locker API is running" }))
}

/// `GET /healthz`
///
/// Very small liveness probe — always returns 200 OK with a plain JSON body.
/// This endpoint should be cheap and never perform I/O.
pub async fn healthz() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "ok".into(),
        }),
    )
}

/// `GET /readyz`
///
/// Readiness probe that:
/// 1. Reports whether the store client was constructed at startup.
/// 2. If it was, issues one HEAD against the store as a connectivity check.
///
/// A closed availability gate is degraded-by-design, not a failure: the
/// service still answers read paths, so the probe reports 200 with status
/// "degraded". A configured store that cannot be reached returns 503.
pub async fn readyz(State(catalog): State<CatalogService>) -> impl IntoResponse {
    let gate_open = catalog.is_available();
    let gate_check = CheckStatus {
        ok: gate_open,
        error: (!gate_open).then(|| "store client not configured".to_string()),
    };

    let store_check = if gate_open {
        match catalog.probe_store().await {
            Ok(()) => CheckStatus {
                ok: true,
                error: None,
            },
            Err(err) => CheckStatus {
                ok: false,
                error: Some(err.to_string()),
            },
        }
    } else {
        CheckStatus {
            ok: false,
            error: Some("skipped: store client not configured".to_string()),
        }
    };

    let reachable = !gate_open || store_check.ok;
    let status = if reachable {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let mut checks = HashMap::new();
    checks.insert("gate", gate_check);
    checks.insert("store", store_check);

    let body = ReadyResponse {
        status: if gate_open && reachable {
            "ok".into()
        } else if reachable {
            "degraded".into()
        } else {
            "error".into()
        },
        checks,
    };

    (status, Json(body))
}

#[derive(Serialize)]
struct HealthResponse {
    status: String,
}

#[derive(Serialize)]
struct ReadyResponse {
    status: String,
    checks: HashMap<&'static str, CheckStatus>,
}

#[derive(Serialize)]
struct CheckStatus {
    ok: bool,
    error: Option<String>,
}
