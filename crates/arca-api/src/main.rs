//! arca-api - HTTP API server for arca

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::{DefaultBodyLimit, Multipart, Path, Request, State},
    http::{header, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tower_http::{
    cors::CorsLayer,
    request_id::{MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer},
    services::ServeDir,
    trace::TraceLayer,
};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

use arca_core::{
    content_excerpt, Config, CreateDocumentRequest, Document, DocumentCreatedNotice,
    DocumentLifecycleManager, NoOpNotifier, Notifier, StorageConfig, UpdateDocumentRequest,
    UploadFile,
};
use arca_db::Database;
use arca_notify::MailRelayNotifier;
use arca_store::{FilesystemStore, HttpObjectStore};

/// Maximum accepted request body (multipart uploads included).
const MAX_UPLOAD_BYTES: usize = 25 * 1024 * 1024;

// =============================================================================
// REQUEST ID (UUIDv7)
// =============================================================================

/// Generates time-ordered UUIDv7 request correlation IDs.
#[derive(Clone, Default)]
struct MakeRequestUuidV7;

impl MakeRequestId for MakeRequestUuidV7 {
    fn make_request_id<B>(&mut self, _request: &axum::http::Request<B>) -> Option<RequestId> {
        let id = Uuid::now_v7().to_string().parse().ok()?;
        Some(RequestId::new(id))
    }
}

// =============================================================================
// APPLICATION STATE
// =============================================================================

/// Application state shared across handlers.
#[derive(Clone)]
struct AppState {
    manager: Arc<DocumentLifecycleManager>,
    /// Direct notifier handle for the send-notification wire endpoint.
    notifier: Arc<dyn Notifier>,
    /// Shared-secret bearer token. `None` disables the auth gate.
    api_token: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing with configurable output
    //
    // Environment variables:
    //   LOG_FORMAT  - "json" or "text" (default: "text")
    //   LOG_FILE    - path to log file (optional, enables file logging)
    //   RUST_LOG    - standard env filter (default: "arca_api=debug,tower_http=debug")
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let log_file = std::env::var("LOG_FILE").ok();

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "arca_api=debug,tower_http=debug".into());
    let registry = tracing_subscriber::registry().with(env_filter);

    let _file_guard = if let Some(ref path) = log_file {
        let file_dir = std::path::Path::new(path)
            .parent()
            .unwrap_or(std::path::Path::new("."));
        let file_name = std::path::Path::new(path)
            .file_name()
            .and_then(|f| f.to_str())
            .unwrap_or("arca-api.log");
        let file_appender = tracing_appender::rolling::daily(file_dir, file_name);
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

        if log_format == "json" {
            registry
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_writer(non_blocking),
                )
                .init();
        } else {
            registry
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_writer(non_blocking)
                        .with_ansi(false),
                )
                .init();
        }
        Some(guard)
    } else {
        if log_format == "json" {
            registry
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        } else {
            registry.with(tracing_subscriber::fmt::layer()).init();
        }
        None
    };

    // Load configuration once; everything downstream receives it explicitly.
    let config = Config::from_env()?;
    info!(
        host = %config.host,
        port = config.port,
        auth_gate = config.api_token.is_some(),
        "Configuration loaded"
    );

    // Connect to database and run migrations
    info!("Connecting to database...");
    let db = Database::connect(&config.database_url).await?;
    db.migrate().await?;
    info!("Database connected, migrations complete");

    // Attachment store backend
    let (store, served_files): (Arc<dyn arca_core::AttachmentStore>, Option<std::path::PathBuf>) =
        match &config.storage {
            StorageConfig::Filesystem {
                root,
                public_base_url,
            } => {
                let store = FilesystemStore::new(root.clone(), public_base_url.clone());
                if let Err(e) = store.validate().await {
                    anyhow::bail!("attachment store validation failed: {}", e);
                }
                info!(root = %root.display(), "Filesystem attachment store initialized");
                (Arc::new(store), Some(root.clone()))
            }
            StorageConfig::Http {
                base_url,
                bucket,
                api_key,
            } => {
                info!(base_url = %base_url, bucket = %bucket, "Remote attachment store initialized");
                (
                    Arc::new(HttpObjectStore::new(
                        base_url.clone(),
                        bucket.clone(),
                        api_key.clone(),
                    )),
                    None,
                )
            }
        };

    // Notification transport (best-effort; absence is not an error)
    let notifier: Arc<dyn Notifier> = match MailRelayNotifier::from_config(&config.notify) {
        Some(n) => {
            info!(
                recipients = config.notify.recipients.len(),
                "Mail relay notifier initialized"
            );
            Arc::new(n)
        }
        None => {
            info!("No mail relay configured; notifications disabled");
            Arc::new(NoOpNotifier)
        }
    };

    let manager = Arc::new(DocumentLifecycleManager::new(
        db.document_repository(),
        store,
        notifier.clone(),
    ));

    let state = AppState {
        manager,
        notifier,
        api_token: config.api_token.clone(),
    };

    let app = build_router(state, served_files);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    info!(%addr, "Starting arca-api");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Assemble the application router.
fn build_router(state: AppState, served_files: Option<std::path::PathBuf>) -> Router {
    let api = Router::new()
        .route(
            "/api/v1/documents",
            get(list_documents).post(create_document),
        )
        .route(
            "/api/v1/documents/:id",
            get(get_document)
                .put(update_document)
                .delete(delete_document),
        )
        .route("/api/v1/notifications/send", post(send_notification))
        .layer(middleware::from_fn_with_state(state.clone(), auth_gate));

    let mut app = Router::new().route("/health", get(health_check)).merge(api);

    // In filesystem mode the API serves the object directory itself.
    if let Some(root) = served_files {
        app = app.nest_service("/files", ServeDir::new(root));
    }

    app.layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuidV7))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(CorsLayer::permissive())
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .with_state(state)
}

// =============================================================================
// AUTH GATE
// =============================================================================

/// Opaque credential check: a shared-secret bearer token from configuration.
async fn auth_gate(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let Some(expected) = &state.api_token else {
        return Ok(next.run(request).await);
    };

    let provided = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "));

    match provided {
        Some(token) if token == expected => Ok(next.run(request).await),
        _ => Err(ApiError::Unauthorized(
            "invalid or missing bearer token".to_string(),
        )),
    }
}

// =============================================================================
// HANDLERS
// =============================================================================

async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

#[derive(Debug, Serialize)]
struct ListDocumentsResponse {
    documents: Vec<Document>,
    total: usize,
}

async fn list_documents(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let documents = state.manager.list().await?;
    let total = documents.len();
    Ok(Json(ListDocumentsResponse { documents, total }))
}

async fn get_document(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let doc = state.manager.get(id).await?;
    Ok(Json(doc))
}

async fn create_document(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    let form = parse_document_form(multipart).await?;

    if let Some(file) = &form.file {
        tracing::debug!(
            file_name = %file.file_name,
            size = %format_size(file.bytes.len() as u64),
            "create request carries upload"
        );
    }

    let doc = state
        .manager
        .create(CreateDocumentRequest {
            title: form.title,
            content: form.content,
            file: form.file,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(doc)))
}

async fn update_document(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    let form = parse_document_form(multipart).await?;

    let doc = state
        .manager
        .update(
            id,
            UpdateDocumentRequest {
                title: form.title,
                content: form.content,
                file: form.file,
            },
        )
        .await?;

    Ok(Json(doc))
}

async fn delete_document(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    state.manager.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
// NOTIFICATION WIRE ENDPOINT
// =============================================================================

/// Wire request for the send-notification endpoint.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SendNotificationRequest {
    title: Option<String>,
    content: Option<String>,
    file_name: Option<String>,
    file_url: Option<String>,
}

async fn send_notification(
    State(state): State<AppState>,
    Json(req): Json<SendNotificationRequest>,
) -> Result<Response, ApiError> {
    let title = match req.title {
        Some(t) if !t.trim().is_empty() => t,
        _ => return Err(ApiError::BadRequest("Title is required".to_string())),
    };

    let notice = DocumentCreatedNotice {
        title,
        content_excerpt: content_excerpt(req.content.as_deref().unwrap_or_default()),
        file_name: req.file_name,
        file_url: req.file_url,
    };

    let outcome = state.notifier.notify(notice).await;
    if outcome.delivered {
        Ok(Json(serde_json::json!({ "message": "Notification sent" })).into_response())
    } else {
        Ok((
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({
                "error": "Failed to send notification",
                "details": outcome.error_detail,
            })),
        )
            .into_response())
    }
}

// =============================================================================
// MULTIPART PARSING
// =============================================================================

struct DocumentForm {
    title: String,
    content: String,
    file: Option<UploadFile>,
}

/// Extract `title`, `content`, and an optional `file` part.
///
/// An empty file part (no name or no bytes, which is what browsers send
/// when no file was picked) counts as absent.
async fn parse_document_form(mut multipart: Multipart) -> Result<DocumentForm, ApiError> {
    let mut title = None;
    let mut content = None;
    let mut file = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("malformed multipart body: {}", e)))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "title" => {
                title = Some(field.text().await.map_err(|e| {
                    ApiError::BadRequest(format!("unreadable title field: {}", e))
                })?);
            }
            "content" => {
                content = Some(field.text().await.map_err(|e| {
                    ApiError::BadRequest(format!("unreadable content field: {}", e))
                })?);
            }
            "file" => {
                let file_name = field.file_name().map(str::to_string).unwrap_or_default();
                let mime_type = field
                    .content_type()
                    .map(str::to_string)
                    .unwrap_or_else(|| "application/octet-stream".to_string());
                let bytes = field.bytes().await.map_err(|e| {
                    ApiError::BadRequest(format!("unreadable file field: {}", e))
                })?;
                if !file_name.is_empty() && !bytes.is_empty() {
                    file = Some(UploadFile {
                        file_name,
                        mime_type,
                        bytes: bytes.to_vec(),
                    });
                }
            }
            _ => {}
        }
    }

    Ok(DocumentForm {
        title: title.unwrap_or_default(),
        content: content.unwrap_or_default(),
        file,
    })
}

// =============================================================================
// ERROR HANDLING
// =============================================================================

#[derive(Debug)]
enum ApiError {
    BadRequest(String),
    Unauthorized(String),
    NotFound(String),
    Internal(arca_core::Error),
}

impl From<arca_core::Error> for ApiError {
    fn from(err: arca_core::Error) -> Self {
        match &err {
            arca_core::Error::Validation(msg) => ApiError::BadRequest(msg.clone()),
            arca_core::Error::DocumentNotFound(id) => {
                ApiError::NotFound(format!("Document {} not found", id))
            }
            arca_core::Error::NotFound(msg) => ApiError::NotFound(msg.clone()),
            _ => ApiError::Internal(err),
        }
    }
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match self {
            ApiError::BadRequest(msg)
            | ApiError::Unauthorized(msg)
            | ApiError::NotFound(msg) => msg,
            ApiError::Internal(err) => err.to_string(),
        };

        let body = Json(serde_json::json!({
            "error": message,
        }));

        (status, body).into_response()
    }
}

// =============================================================================
// HELPERS
// =============================================================================

fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_maps_to_bad_request() {
        let err: ApiError = arca_core::Error::Validation("title is required".to_string()).into();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_document_not_found_maps_to_not_found() {
        let err: ApiError = arca_core::Error::DocumentNotFound(Uuid::nil()).into();
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_storage_error_maps_to_internal() {
        let err: ApiError = arca_core::Error::Storage("bucket unreachable".to_string()).into();
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_persistence_error_maps_to_internal() {
        let err: ApiError = arca_core::Error::Persistence("connection reset".to_string()).into();
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_send_notification_request_uses_camel_case() {
        let req: SendNotificationRequest = serde_json::from_str(
            r#"{"title": "Spec v1", "content": "body", "fileName": "a.pdf", "fileUrl": "https://files.test/a.pdf"}"#,
        )
        .unwrap();
        assert_eq!(req.title.as_deref(), Some("Spec v1"));
        assert_eq!(req.file_name.as_deref(), Some("a.pdf"));
        assert_eq!(req.file_url.as_deref(), Some("https://files.test/a.pdf"));
    }

    #[test]
    fn test_send_notification_request_fields_optional() {
        let req: SendNotificationRequest = serde_json::from_str(r#"{"title": "T"}"#).unwrap();
        assert!(req.content.is_none());
        assert!(req.file_name.is_none());
    }

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(512), "512 B");
        assert_eq!(format_size(2048), "2.00 KB");
        assert_eq!(format_size(5 * 1024 * 1024), "5.00 MB");
    }
}
