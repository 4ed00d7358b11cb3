use crate::config::ApiConfig;
use axum::{
    extract::{
        multipart::{MultipartError, MultipartRejection},
        DefaultBodyLimit, Json, Multipart, Path, State,
    },
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use docshrink::{validate_filename, DocumentFormat, OptimizeError, Storage, ALLOWED_EXTENSIONS};
use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::path::Path as FsPath;
use std::sync::Arc;
use thiserror::Error;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

/// Room left above the upload ceiling for multipart framing, so an
/// oversized file still reaches the handler's own size check.
const MULTIPART_OVERHEAD: usize = 64 * 1024;

/// Successful optimization of an upload
#[derive(Debug, Serialize, Deserialize)]
pub struct CompressResponse {
    /// Confirmation message
    pub message: String,
    /// Filename as uploaded
    pub original_file: String,
    /// Path to fetch the optimized copy from
    pub download_url: String,
}

/// Standard error response structure
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Human-readable error message describing what went wrong
    pub detail: String,
}

/// Application-specific error types for the API
#[derive(Debug, Error)]
pub enum AppError {
    /// Upload extension outside the allow-list
    #[error("Unsupported file type. Allowed: {}", ALLOWED_EXTENSIONS.join(", "))]
    UnsupportedType,
    /// Upload larger than the configured ceiling
    #[error("File too large (max {})", describe_size(.0))]
    TooLarge(usize),
    /// No usable `file` part in the form
    #[error("No file provided in upload")]
    MissingFile,
    /// Filename that is not a single plain path component
    #[error("Invalid filename: {0:?}")]
    InvalidFilename(String),
    /// Request that is not a `multipart/form-data` upload at all
    #[error("{0}")]
    InvalidRequest(String),
    /// Malformed multipart body
    #[error("Failed to read upload: {0}")]
    Multipart(String),
    /// Requested output does not exist
    #[error("File not found")]
    NotFound,
    /// Failure reported by the optimizer
    #[error(transparent)]
    Optimize(#[from] OptimizeError),
    /// I/O errors outside the optimizer
    #[error(transparent)]
    Io(#[from] std::io::Error),
    /// Worker task panicked or was cancelled
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::UnsupportedType
            | AppError::TooLarge(_)
            | AppError::MissingFile
            | AppError::InvalidFilename(_)
            | AppError::InvalidRequest(_)
            | AppError::Multipart(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::Optimize(e) if e.is_client_error() => StatusCode::BAD_REQUEST,
            AppError::Optimize(_) | AppError::Io(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn from_multipart(err: MultipartError, limit: usize) -> Self {
        if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
            AppError::TooLarge(limit)
        } else {
            AppError::Multipart(err.body_text())
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error = %self, "Request failed");
        } else {
            warn!(status = status.as_u16(), error = %self, "Request rejected");
        }

        let error_response = ErrorResponse {
            detail: self.to_string(),
        };

        (status, Json(error_response)).into_response()
    }
}

/// Shared, read-only state handed to every handler
#[derive(Debug, Clone)]
pub struct AppState {
    storage: Arc<Storage>,
    max_upload_size: usize,
}

impl AppState {
    pub fn new(config: &ApiConfig) -> Self {
        Self {
            storage: Arc::new(config.storage()),
            max_upload_size: config.max_upload_size,
        }
    }

    pub fn storage(&self) -> &Storage {
        &self.storage
    }
}

/// Build the application router with all routes configured
///
/// Storage directories are expected to exist; call [`Storage::init`] first.
pub fn app(config: ApiConfig) -> Router {
    let state = AppState::new(&config);
    let body_limit = config.max_upload_size.saturating_add(MULTIPART_OVERHEAD);

    Router::new()
        .route("/compress/", post(compress_file))
        .route("/compress", post(compress_file))
        .route("/download/{filename}", get(download_file))
        .route("/health", get(health_check))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Health check endpoint for monitoring and load balancing
pub async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "docshrink API",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// An uploaded file that passed validation
struct Upload {
    filename: String,
    bytes: Vec<u8>,
}

/// Pull the `file` part out of the form, validating its name and type
/// before reading the body and its size while reading.
async fn read_upload(multipart: &mut Multipart, max_size: usize) -> Result<Upload, AppError> {
    while let Some(mut field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::from_multipart(e, max_size))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let filename = field
            .file_name()
            .filter(|name| !name.is_empty())
            .map(str::to_string)
            .ok_or(AppError::MissingFile)?;

        if DocumentFormat::from_path(&filename).is_err() {
            return Err(AppError::UnsupportedType);
        }
        validate_filename(&filename).map_err(|_| AppError::InvalidFilename(filename.clone()))?;

        let mut bytes = Vec::new();
        while let Some(chunk) = field
            .chunk()
            .await
            .map_err(|e| AppError::from_multipart(e, max_size))?
        {
            if bytes.len() + chunk.len() > max_size {
                return Err(AppError::TooLarge(max_size));
            }
            bytes.extend_from_slice(&chunk);
        }

        return Ok(Upload { filename, bytes });
    }

    Err(AppError::MissingFile)
}

/// Validate an upload, store it, optimize it and point at the result
pub async fn compress_file(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<CompressResponse>, AppError> {
    let mut multipart =
        multipart.map_err(|rejection| AppError::InvalidRequest(rejection.body_text()))?;
    let Upload { filename, bytes } = read_upload(&mut multipart, state.max_upload_size).await?;
    info!(file = %filename, size = bytes.len(), "Received upload");

    let storage = Arc::clone(&state.storage);
    let name = filename.clone();
    let report = tokio::task::spawn_blocking(move || {
        let input = storage.save_upload(&name, &bytes)?;
        storage.optimizer().optimize(input)
    })
    .await
    .map_err(|e| AppError::Internal(format!("Optimization task failed: {e}")))??;

    let optimized_filename = report.output_filename().unwrap_or(&filename);

    Ok(Json(CompressResponse {
        message: "File optimized successfully".to_string(),
        download_url: format!("/download/{optimized_filename}"),
        original_file: filename,
    }))
}

/// Serve a previously optimized file as an attachment
pub async fn download_file(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> Result<Response, AppError> {
    // Names that could escape the output directory are never joined into a path.
    let path = state
        .storage
        .output_path(&filename)
        .map_err(|_| AppError::NotFound)?;

    let bytes = match tokio::fs::read(&path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == ErrorKind::NotFound => return Err(AppError::NotFound),
        Err(e) => return Err(e.into()),
    };

    let content_type = DocumentFormat::from_path(FsPath::new(&filename))
        .map(|format| format.content_type())
        .unwrap_or("application/octet-stream");

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, HeaderValue::from_static(content_type)),
            (header::CONTENT_DISPOSITION, content_disposition(&filename)),
        ],
        bytes,
    )
        .into_response())
}

/// `attachment` disposition carrying the filename, RFC 6266 style.
fn content_disposition(filename: &str) -> HeaderValue {
    let plain = filename
        .bytes()
        .all(|b| (b.is_ascii_graphic() && b != b'"') || b == b' ');

    let value = if plain {
        format!("attachment; filename=\"{filename}\"")
    } else {
        format!("attachment; filename*=utf-8''{}", percent_encode(filename))
    };

    HeaderValue::from_str(&value).unwrap_or_else(|_| HeaderValue::from_static("attachment"))
}

fn percent_encode(value: &str) -> String {
    let mut encoded = String::with_capacity(value.len() * 3);
    for byte in value.bytes() {
        if byte.is_ascii_alphanumeric() || b"-._~".contains(&byte) {
            encoded.push(byte as char);
        } else {
            encoded.push_str(&format!("%{byte:02X}"));
        }
    }
    encoded
}

fn describe_size(bytes: &usize) -> String {
    const MIB: usize = 1024 * 1024;
    let bytes = *bytes;
    if bytes >= MIB && bytes % MIB == 0 {
        format!("{}MB", bytes / MIB)
    } else {
        format!("{bytes} bytes")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe_size() {
        assert_eq!(describe_size(&(10 * 1024 * 1024)), "10MB");
        assert_eq!(describe_size(&1500), "1500 bytes");
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(
            AppError::UnsupportedType.to_string(),
            "Unsupported file type. Allowed: .pdf, .docx, .txt"
        );
        assert_eq!(
            AppError::TooLarge(10 * 1024 * 1024).to_string(),
            "File too large (max 10MB)"
        );
        assert_eq!(AppError::NotFound.to_string(), "File not found");

        let rejected = AppError::InvalidRequest("Invalid `boundary`".into());
        assert_eq!(rejected.status(), StatusCode::BAD_REQUEST);
        assert_eq!(rejected.to_string(), "Invalid `boundary`");
    }

    #[test]
    fn test_optimize_error_status() {
        let unsupported = AppError::from(OptimizeError::UnsupportedType(".exe".into()));
        assert_eq!(unsupported.status(), StatusCode::BAD_REQUEST);

        let utf8 = String::from_utf8(vec![0xff]).unwrap_err();
        let format = AppError::from(OptimizeError::from(utf8));
        assert_eq!(format.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(format.to_string().starts_with("Invalid text:"));
    }

    #[test]
    fn test_content_disposition() {
        assert_eq!(
            content_disposition("report final.pdf"),
            "attachment; filename=\"report final.pdf\""
        );
        assert_eq!(
            content_disposition("résumé.docx"),
            "attachment; filename*=utf-8''r%C3%A9sum%C3%A9.docx"
        );
        assert_eq!(
            content_disposition("say \"hi\".txt"),
            "attachment; filename*=utf-8''say%20%22hi%22.txt"
        );
    }
}
