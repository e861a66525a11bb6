//! HTTP handlers for the document catalog operations.
//! Request parsing and response shaping live here; all storage concerns are
//! delegated to `CatalogService`.

use crate::{
    errors::AppError,
    services::catalog_service::{CatalogService, ListFilter, UploadRequest},
};
use axum::{
    Json,
    body::Body,
    extract::{Multipart, Path, Query, State},
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use bytes::Bytes;
use serde::Deserialize;
use serde_json::json;

/// Query params accepted by `GET /files`.
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub folder: Option<String>,
    /// Trash flag to match; omitted means `"false"` (non-trashed only).
    pub trashed: Option<String>,
}

/// `POST /upload` — multipart create: `file` plus the sidecar form fields.
pub async fn upload_document(
    State(catalog): State<CatalogService>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let mut file: Option<(String, String, Bytes)> = None;
    let mut folder = String::new();
    let mut pin = String::new();
    let mut owner_email = String::new();
    let mut owner_name = String::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|err| AppError::bad_request(format!("malformed multipart body: {err}")))?
    {
        let read_text = |err| AppError::bad_request(format!("unreadable form field: {err}"));
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" => {
                let filename = field.file_name().unwrap_or_default().to_string();
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let data = field
                    .bytes()
                    .await
                    .map_err(|err| AppError::bad_request(format!("unreadable file: {err}")))?;
                file = Some((filename, content_type, data));
            }
            "folder" => folder = field.text().await.map_err(read_text)?,
            "pin" => pin = field.text().await.map_err(read_text)?,
            "owner_email" => owner_email = field.text().await.map_err(read_text)?,
            "owner_name" => owner_name = field.text().await.map_err(read_text)?,
            _ => {}
        }
    }

    let Some((filename, content_type, data)) = file else {
        return Err(AppError::bad_request("No file provided"));
    };

    let outcome = catalog
        .upload(UploadRequest {
            filename,
            folder,
            pin,
            owner_email,
            owner_name,
            content_type,
            data,
        })
        .await?;

    Ok(Json(json!({
        "message": format!("{} uploaded", outcome.key),
        "metadata": outcome.metadata,
    })))
}

/// `GET /files` — list documents, filtered by folder and trash flag.
pub async fn list_documents(
    State(catalog): State<CatalogService>,
    Query(q): Query<ListQuery>,
) -> Result<impl IntoResponse, AppError> {
    let files = catalog
        .list_documents(ListFilter {
            folder: q.folder,
            trashed: q.trashed,
        })
        .await?;

    Ok(Json(json!({ "files": files })))
}

/// `GET /download/{*key}` — full document body as an attachment, with the
/// content type recorded at upload time.
pub async fn download_document(
    State(catalog): State<CatalogService>,
    Path(key): Path<String>,
) -> Result<Response, AppError> {
    let doc = catalog.download(&key).await?;

    let mut response = Response::new(Body::from(doc.data));
    *response.status_mut() = StatusCode::OK;
    let headers = response.headers_mut();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_str(&doc.content_type)
            .unwrap_or_else(|_| HeaderValue::from_static("application/octet-stream")),
    );
    let disposition = format!("attachment; filename=\"{}\"", doc.filename.replace('"', ""));
    if let Ok(value) = HeaderValue::from_str(&disposition) {
        headers.insert(header::CONTENT_DISPOSITION, value);
    }

    Ok(response)
}

/// `DELETE /delete/{*key}` — hard delete.
pub async fn delete_document(
    State(catalog): State<CatalogService>,
    Path(key): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    catalog.delete(&key).await?;
    Ok(Json(json!({ "message": format!("{key} deleted") })))
}

/// `GET /storage` — aggregate size across every document, trash included.
pub async fn storage_usage(
    State(catalog): State<CatalogService>,
) -> Result<impl IntoResponse, AppError> {
    let usage = catalog.storage_usage().await?;
    Ok(Json(usage))
}
