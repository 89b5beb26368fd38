//! HTTP surface: listing, thumbnails, batch delete/trash and raw file serving.

use axum::body::{Body, Bytes};
use axum::extract::{Path as UrlPath, Request, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Json, Response};
use axum::routing::{get, post};
use axum::Router;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::services::ServeFile;
use tracing::{info, warn};

use crate::config::Config;
use crate::errors::api_error::{ApiError, ApiResult};
use crate::errors::domain::map_api_result;
use crate::media::{self, MediaItem};
use crate::mutation::FileMutator;
use crate::path_guard::guard_path;
use crate::thumbnails::ThumbnailCache;

pub struct AppState {
    pub config: Arc<Config>,
    pub thumbnails: Arc<ThumbnailCache>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let thumbnails = ThumbnailCache::new(&config);
        Self {
            config: Arc::new(config),
            thumbnails: Arc::new(thumbnails),
        }
    }
}

type SharedState = Arc<AppState>;

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.is_concealed_not_found() {
            return (StatusCode::NOT_FOUND, "not found").into_response();
        }
        (StatusCode::BAD_REQUEST, self.message).into_response()
    }
}

pub fn router(state: SharedState) -> Router {
    Router::new()
        .route("/get", get(list_media))
        .route("/t/{*path}", get(thumbnail))
        .route("/", get(not_found).delete(delete_items))
        .route("/trash", post(trash_items))
        .route("/o/{*path}", get(raw_file))
        .fallback(not_found)
        .with_state(state)
}

/// Start the HTTP server on `bind`.
///
/// Returns the bound address (useful with port 0) and a handle that resolves
/// once `shutdown_rx` flips to `true` and in-flight requests finish.
pub async fn start_http_server(
    state: SharedState,
    bind: SocketAddr,
    shutdown_rx: tokio::sync::watch::Receiver<bool>,
) -> anyhow::Result<(SocketAddr, tokio::task::JoinHandle<()>)> {
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(bind).await?;
    let local = listener.local_addr()?;
    info!(%local, "HTTP server listening");

    let handle = tokio::spawn(async move {
        let mut shutdown = shutdown_rx;
        if let Err(e) = axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.wait_for(|v| *v).await;
            })
            .await
        {
            warn!(error = %e, "HTTP server stopped with error");
        }
    });

    Ok((local, handle))
}

async fn blocking<T, F>(f: F) -> ApiResult<T>
where
    T: Send + 'static,
    F: FnOnce() -> ApiResult<T> + Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| ApiError::new("task_failed", format!("Worker task failed: {e}")))?
}

async fn list_media(State(state): State<SharedState>) -> ApiResult<Json<Vec<MediaItem>>> {
    let root = state.config.root.clone();
    let items = blocking(move || map_api_result(media::scan(&root))).await?;
    info!(items = items.len(), "listed media");
    Ok(Json(items))
}

async fn thumbnail(
    State(state): State<SharedState>,
    UrlPath(path): UrlPath<String>,
) -> ApiResult<Response> {
    let cache = state.thumbnails.clone();
    let thumb = blocking(move || map_api_result(cache.get_thumbnail(&path))).await?;
    let bytes = tokio::fs::read(&thumb).await.map_err(|e| {
        warn!(thumb = %thumb.display(), error = %e, "cached thumbnail unreadable");
        ApiError::new("not_found", e.to_string())
    })?;
    Ok(([(header::CONTENT_TYPE, "image/jpeg")], bytes).into_response())
}

/// Serves a file below the root by its absolute path, e.g. `/o/srv/media/a.jpg`.
async fn raw_file(
    State(state): State<SharedState>,
    UrlPath(path): UrlPath<String>,
    request: Request,
) -> ApiResult<Response> {
    let file = map_api_result(guard_path(&state.config.root, &path))?;
    let is_file = tokio::fs::metadata(&file)
        .await
        .map(|meta| meta.is_file())
        .unwrap_or(false);
    if !is_file {
        return Err(ApiError::new(
            "not_found",
            format!("{} is not a file", file.display()),
        ));
    }
    let response = ServeFile::new(&file)
        .try_call(request)
        .await
        .map_err(|e| ApiError::new("not_found", format!("{}: {e}", file.display())))?;
    Ok(response.map(Body::new))
}

async fn delete_items(
    State(state): State<SharedState>,
    body: Bytes,
) -> ApiResult<Json<Vec<MediaItem>>> {
    mutate(state, body, Op::Delete).await
}

async fn trash_items(
    State(state): State<SharedState>,
    body: Bytes,
) -> ApiResult<Json<Vec<MediaItem>>> {
    mutate(state, body, Op::Trash).await
}

#[derive(Clone, Copy)]
enum Op {
    Delete,
    Trash,
}

async fn mutate(state: SharedState, body: Bytes, op: Op) -> ApiResult<Json<Vec<MediaItem>>> {
    let items: Vec<MediaItem> = serde_json::from_slice(&body)
        .map_err(|e| ApiError::new("invalid_input", format!("Invalid request body: {e}")))?;
    blocking(move || {
        let mutator = FileMutator::new(&state.config, Some(state.thumbnails.as_ref()));
        let report = match op {
            Op::Delete => mutator.delete(&items, state.config.batch_mode),
            Op::Trash => mutator.trash(&items, state.config.batch_mode),
        };
        map_api_result(report.into_result())?;
        Ok(Json(items))
    })
    .await
}

async fn not_found() -> StatusCode {
    StatusCode::NOT_FOUND
}
