//! Defines routes for all document-locker operations.
//!
//! ## Structure
//! - **Catalog endpoints**
//!   - `POST   /upload` — multipart create (file + sidecar fields)
//!   - `GET    /files` — filtered listing (folder, trashed)
//!   - `GET    /download/{*key}` — full body download
//!   - `DELETE /delete/{*key}` — hard delete
//!   - `GET    /storage` — aggregate usage
//!
//! - **Legacy endpoints** (static acknowledgments, no state transitions)
//!   - `GET    /trash`, `POST /restore/{*key}`,
//!     `DELETE /permanent-delete/{*key}`,
//!     `POST   /lock/{*key}`, `POST /unlock/{*key}`
//!
//! - **Session & health**: `/login`, `/me`, `/status`, `/healthz`, `/readyz`
//!
//! The wildcard `*key` allows nested keys like `docs/2025/report.pdf`.

use crate::{
    handlers::{
        document_handlers::{
            delete_document, download_document, list_documents, storage_usage, upload_document,
        },
        health_handlers::{healthz, readyz, status},
        legacy_handlers::{
            list_trash, lock_document, permanent_delete_document, restore_document,
            unlock_document,
        },
        session_handlers::{login, me},
    },
    services::catalog_service::CatalogService,
};
use axum::{
    Router,
    routing::{delete, get, post},
};

/// Build and return the router for the full HTTP surface.
///
/// The router carries shared state (`CatalogService`) to all handlers.
pub fn routes() -> Router<CatalogService> {
    Router::new()
        // health endpoints (mounted at root)
        .route("/status", get(status))
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        // catalog endpoints
        .route("/upload", post(upload_document))
        .route("/files", get(list_documents))
        .route("/download/{*key}", get(download_document))
        .route("/delete/{*key}", delete(delete_document))
        .route("/storage", get(storage_usage))
        // legacy acknowledgments
        .route("/trash", get(list_trash))
        .route("/restore/{*key}", post(restore_document))
        .route("/permanent-delete/{*key}", delete(permanent_delete_document))
        .route("/lock/{*key}", post(lock_document))
        .route("/unlock/{*key}", post(unlock_document))
        // demo session
        .route("/login", post(login))
        .route("/me", get(me))
}
