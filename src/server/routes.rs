use std::io;

use axum::body::{Body, Bytes};
use axum::extract::{DefaultBodyLimit, Multipart, Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post};
use axum::{middleware, Json, Router};
use futures::stream;
use serde_json::{json, Value};
use tokio::io::AsyncReadExt;
use tokio::sync::mpsc;
use tokio::task::{self, JoinHandle};
use tracing::{error, info, warn};

use crate::core::errors::{Error, Result};
use crate::server::auth::require_basic_auth;
use crate::server::dto::{BrowseResponse, FileEntryDto, MkdirRequest, PathQuery, UploadResponse};
use crate::server::error::ApiError;
use crate::server::upload::{join_relative, sanitize_filename, ChunkReader};
use crate::server::AppState;
use crate::services::fs::PathScopedFileStore;

/// Builds the application. Everything except `/health` sits behind basic auth
/// and is mounted under `base_url` (empty mounts at `/`).
pub fn router(state: AppState, base_url: &str, max_upload_bytes: usize) -> Router {
    let api = Router::new()
        .route("/api/browse", get(browse))
        .route("/api/upload", post(upload))
        .route("/api/mkdir", post(make_directory))
        .route("/api/items/*path", delete(delete_item))
        .route("/static/*path", get(download))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_basic_auth));

    let base_url = base_url.trim_end_matches('/');
    let app = Router::new().route("/health", get(health));
    let app = if base_url.is_empty() {
        app.merge(api)
    } else {
        app.nest(base_url, api.route("/health", get(health)))
    };

    app.with_state(state)
}

const DOWNLOAD_CHUNK_BYTES: usize = 64 * 1024;
const UPLOAD_CHANNEL_DEPTH: usize = 8;

// Store calls block on filesystem IO; keep them off the async workers.
async fn run_blocking<T, F>(job: F) -> std::result::Result<T, ApiError>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    join_blocking(task::spawn_blocking(job)).await
}

async fn join_blocking<T>(handle: JoinHandle<Result<T>>) -> std::result::Result<T, ApiError> {
    handle
        .await
        .map_err(|err| {
            error!(error = %err, "blocking filesystem task failed");
            ApiError::internal("filesystem task failed")
        })?
        .map_err(ApiError::from)
}

fn ensure_accessible(store: &PathScopedFileStore) -> Result<()> {
    if store.check_accessible() {
        Ok(())
    } else {
        Err(Error::RootUnavailable(store.root().to_path_buf()))
    }
}

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "healthy" }))
}

pub async fn browse(
    State(state): State<AppState>,
    Query(query): Query<PathQuery>,
) -> std::result::Result<Json<BrowseResponse>, ApiError> {
    let store = state.store.clone();
    let response = run_blocking(move || {
        ensure_accessible(&store)?;
        let entries = store
            .list(&query.path)?
            .iter()
            .map(|entry| FileEntryDto::from_entry(entry, &store))
            .collect();
        Ok(BrowseResponse {
            breadcrumbs: store.breadcrumbs(&query.path),
            path: query.path,
            entries,
        })
    })
    .await?;

    Ok(Json(response))
}

pub async fn download(
    State(state): State<AppState>,
    Path(path): Path<String>,
) -> std::result::Result<Response, ApiError> {
    let store = state.store.clone();
    let (file_path, mime) = run_blocking(move || {
        ensure_accessible(&store)?;
        store.get_file(&path)
    })
    .await?;

    let file = tokio::fs::File::open(&file_path)
        .await
        .map_err(|err| ApiError::from(Error::Io(err)))?;
    let length = file
        .metadata()
        .await
        .map_err(|err| ApiError::from(Error::Io(err)))?
        .len();
    let filename: String = file_path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("download")
        .chars()
        .filter(|c| c.is_ascii() && !c.is_ascii_control() && *c != '"')
        .collect();

    Ok((
        [
            (header::CONTENT_TYPE, mime.to_string()),
            (header::CONTENT_LENGTH, length.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        file_body(file),
    )
        .into_response())
}

/// Streams a file in fixed-size chunks instead of loading it whole.
fn file_body(file: tokio::fs::File) -> Body {
    let chunks = stream::try_unfold(file, |mut file| async move {
        let mut buf = vec![0; DOWNLOAD_CHUNK_BYTES];
        let read = file.read(&mut buf).await?;
        if read == 0 {
            return Ok::<_, io::Error>(None);
        }
        buf.truncate(read);
        Ok(Some((Bytes::from(buf), file)))
    });
    Body::from_stream(chunks)
}

pub async fn upload(
    State(state): State<AppState>,
    Query(query): Query<PathQuery>,
    mut multipart: Multipart,
) -> std::result::Result<(StatusCode, Json<UploadResponse>), ApiError> {
    while let Some(mut field) = multipart
        .next_field()
        .await
        .map_err(|err| ApiError::bad_request(format!("malformed upload: {err}")))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let raw_name = field.file_name().unwrap_or_default().to_string();
        let filename = sanitize_filename(&raw_name)
            .ok_or_else(|| ApiError::bad_request(format!("invalid filename '{raw_name}'")))?;

        let relative = join_relative(&query.path, &filename);
        let store = state.store.clone();
        let target = relative.clone();
        let (chunks, receiver) = mpsc::channel(UPLOAD_CHANNEL_DEPTH);
        let writer = task::spawn_blocking(move || {
            ensure_accessible(&store)?;
            store.save_upload(&target, ChunkReader::new(receiver))
        });

        let mut body_error = None;
        loop {
            match field.chunk().await {
                Ok(Some(chunk)) => {
                    // A closed channel means the writer already failed; its error is reported below.
                    if chunks.send(Ok(chunk)).await.is_err() {
                        break;
                    }
                }
                Ok(None) => break,
                Err(err) => {
                    let aborted = io::Error::new(io::ErrorKind::UnexpectedEof, err.to_string());
                    let _ = chunks.send(Err(aborted)).await;
                    body_error = Some(err);
                    break;
                }
            }
        }
        drop(chunks);

        let written = join_blocking(writer).await;
        if let Some(err) = body_error {
            return Err(ApiError::new(err.status(), format!("malformed upload: {err}")));
        }
        let written = written?;

        return Ok((
            StatusCode::CREATED,
            Json(UploadResponse {
                download_url: state.store.download_url(&relative),
                path: relative,
                bytes: written,
            }),
        ));
    }

    Err(ApiError::bad_request("no file part in request"))
}

pub async fn make_directory(
    State(state): State<AppState>,
    Json(request): Json<MkdirRequest>,
) -> std::result::Result<(StatusCode, Json<Value>), ApiError> {
    let store = state.store.clone();
    let path = request.path.clone();
    run_blocking(move || {
        ensure_accessible(&store)?;
        store.create_directory(&path)
    })
    .await?;

    info!(path = %request.path, "directory created via web interface");
    Ok((StatusCode::CREATED, Json(json!({ "path": request.path }))))
}

/// Deletion is switched off for the web interface; the store is never asked.
pub async fn delete_item(Path(path): Path<String>) -> ApiError {
    warn!(path = %path, "refused delete request");
    ApiError::from(Error::Forbidden(
        "deleting files is disabled on this server".to_string(),
    ))
}
