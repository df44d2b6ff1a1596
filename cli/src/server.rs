//! HTTP front end: upload a zipped shapefile, fetch the ranked GeoJSON.

use std::{path::{Component, Path as FsPath}, sync::Arc};

use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, Multipart, Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde::Serialize;
use serde_json::json;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, warn};
use uuid::Uuid;

use facility_siting::{validate_upload_name, Pipeline, SitingError, ARTIFACT_NAME};

/// Multipart field carrying the archive.
const FILE_FIELD: &str = "file";

pub fn router(pipeline: Arc<Pipeline>, max_upload_bytes: usize) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/upload", post(upload_handler))
        .route("/uploads/{id}/{filename}", get(download_handler))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(pipeline)
}

#[derive(Serialize)]
struct UploadResponse {
    message: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    geojson: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl UploadResponse {
    fn success(geojson: String) -> Self {
        Self { message: "Success", geojson: Some(geojson), error: None }
    }

    fn error(error: String) -> Self {
        Self { message: "Error", geojson: None, error: Some(error) }
    }
}

fn error_response(status: StatusCode, message: String) -> Response {
    (status, Json(UploadResponse::error(message))).into_response()
}

fn siting_error_response(err: &SitingError) -> Response {
    let status = StatusCode::from_u16(err.status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    if err.is_client_error() {
        warn!("upload rejected: {err}");
    } else {
        error!("upload failed: {err}");
    }
    error_response(status, err.to_string())
}

/// Pull the named file out of the multipart body.
async fn read_upload(multipart: &mut Multipart) -> Result<(String, Bytes), Response> {
    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => return Err(siting_error_response(&SitingError::MissingFile)),
            Err(err) => return Err(error_response(err.status(), err.body_text())),
        };
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let name = field.file_name().unwrap_or_default().to_string();
        validate_upload_name(&name).map_err(|err| siting_error_response(&err))?;

        let bytes = field.bytes().await
            .map_err(|err| error_response(err.status(), err.body_text()))?;
        return Ok((name, bytes));
    }
}

async fn upload_handler(State(pipeline): State<Arc<Pipeline>>, mut multipart: Multipart) -> Response {
    let (name, bytes) = match read_upload(&mut multipart).await {
        Ok(upload) => upload,
        Err(response) => return response,
    };

    let result = tokio::task::spawn_blocking(move || pipeline.handle_upload(&name, &bytes)).await;
    match result {
        Ok(Ok(artifact)) => {
            let url = format!("uploads/{}/{}", artifact.request_id, ARTIFACT_NAME);
            (StatusCode::OK, Json(UploadResponse::success(url))).into_response()
        }
        Ok(Err(err)) => siting_error_response(&err),
        Err(err) => siting_error_response(&SitingError::Unexpected(err.into())),
    }
}

/// A bare file name: one normal path component, nothing that walks out of the directory.
fn is_plain_file_name(name: &str) -> bool {
    let mut components = FsPath::new(name).components();
    matches!((components.next(), components.next()), (Some(Component::Normal(_)), None))
        && !name.contains(['/', '\\'])
}

async fn download_handler(
    State(pipeline): State<Arc<Pipeline>>,
    Path((id, filename)): Path<(String, String)>,
) -> Response {
    let Ok(id) = Uuid::parse_str(&id) else {
        return (StatusCode::BAD_REQUEST, "invalid request id").into_response();
    };
    if !is_plain_file_name(&filename) {
        return (StatusCode::BAD_REQUEST, "invalid file name").into_response();
    }

    let path = pipeline.upload_dir().join(id.to_string()).join(&filename);
    match tokio::fs::read(&path).await {
        Ok(contents) => {
            let content_type = if filename.ends_with(".geojson") { "application/geo+json" } else { "application/octet-stream" };
            ([(header::CONTENT_TYPE, content_type)], contents).into_response()
        }
        Err(_) => (StatusCode::NOT_FOUND, "not found").into_response(),
    }
}

async fn health_handler() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}
