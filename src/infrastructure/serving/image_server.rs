use std::net::Ipv4Addr;
use std::ops::RangeInclusive;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::Router;
use axum::extract::State;
use axum::http::{StatusCode, Uri, header};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use tokio::net::TcpListener;
use tokio::sync::OnceCell;

use crate::application::ports::{ImageHost, ImageHostError};
use crate::domain::mime_type_for_path;

/// Folders searched when a request carries a bare filename. Some callers
/// strip directories when they build links.
const KNOWN_IMAGE_DIRS: [&str; 3] = ["IOS_Instruction", "Android_Instruction", "extracted_images"];

const READ_TIMEOUT: Duration = Duration::from_secs(5);

/// Local sidecar serving extracted screenshots over plain HTTP.
///
/// The server is started lazily by the first `ensure_started` call, which
/// binds the first free port in the configured range and spawns one
/// background task. The handle is owned by the composition root; there is
/// no process-global state.
pub struct ImageFileServer {
    content_root: PathBuf,
    port_range: RangeInclusive<u16>,
    bound_port: OnceCell<u16>,
}

impl ImageFileServer {
    pub fn new(content_root: PathBuf, port_range: RangeInclusive<u16>) -> Self {
        Self {
            content_root,
            port_range,
            bound_port: OnceCell::new(),
        }
    }

    async fn bind_first_free(&self) -> Result<(TcpListener, u16), ImageHostError> {
        for port in self.port_range.clone() {
            if let Ok(listener) = TcpListener::bind((Ipv4Addr::LOCALHOST, port)).await {
                return Ok((listener, port));
            }
        }
        Err(ImageHostError::NoFreePort(
            *self.port_range.start(),
            *self.port_range.end(),
        ))
    }
}

#[async_trait]
impl ImageHost for ImageFileServer {
    async fn ensure_started(&self) -> Result<u16, ImageHostError> {
        self.bound_port
            .get_or_try_init(|| async {
                let (listener, port) = self.bind_first_free().await?;
                let router = image_router(self.content_root.clone());

                tokio::spawn(async move {
                    if let Err(e) = axum::serve(listener, router).await {
                        tracing::error!(error = %e, "Image file server terminated");
                    }
                });

                tracing::info!(port, "Image file server started");
                Ok(port)
            })
            .await
            .copied()
    }

    async fn url_for(&self, relative_path: &str) -> Result<String, ImageHostError> {
        let port = self.ensure_started().await?;
        Ok(format!(
            "http://127.0.0.1:{}/{}",
            port,
            relative_path.trim_start_matches('/')
        ))
    }
}

/// Router serving `GET /<relative-or-bare-filename>` from the content root.
pub fn image_router(content_root: PathBuf) -> Router {
    Router::new()
        .fallback(get(serve_image))
        .with_state(Arc::new(content_root))
}

async fn serve_image(State(root): State<Arc<PathBuf>>, uri: Uri) -> Response {
    let requested = uri.path().trim_start_matches('/');
    if requested.is_empty() {
        return (StatusCode::NOT_FOUND, "file not found").into_response();
    }

    // Traversal is rejected before any filesystem access.
    if Path::new(requested)
        .components()
        .any(|c| matches!(c, Component::ParentDir))
    {
        return (StatusCode::FORBIDDEN, "path not allowed").into_response();
    }

    let Some(resolved) = resolve_request_path(&root, requested) else {
        return (StatusCode::NOT_FOUND, "file not found").into_response();
    };

    match tokio::time::timeout(READ_TIMEOUT, tokio::fs::read(&resolved)).await {
        Ok(Ok(bytes)) => (
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, mime_type_for_path(requested)),
                (header::ACCESS_CONTROL_ALLOW_ORIGIN, "*"),
                (header::CACHE_CONTROL, "public, max-age=3600"),
            ],
            bytes,
        )
            .into_response(),
        Ok(Err(e)) if e.kind() == std::io::ErrorKind::NotFound => {
            (StatusCode::NOT_FOUND, "file not found").into_response()
        }
        Ok(Err(e)) => {
            tracing::error!(path = %resolved.display(), error = %e, "Image read failed");
            (StatusCode::INTERNAL_SERVER_ERROR, "read failed").into_response()
        }
        Err(_) => {
            tracing::error!(path = %resolved.display(), "Image read timed out");
            (StatusCode::INTERNAL_SERVER_ERROR, "read timed out").into_response()
        }
    }
}

/// Resolves a request path under the root, falling back to a basename
/// search across the known image folders.
fn resolve_request_path(root: &Path, requested: &str) -> Option<PathBuf> {
    let direct = root.join(requested);
    if direct.is_file() {
        return Some(direct);
    }

    let basename = Path::new(requested).file_name()?;
    KNOWN_IMAGE_DIRS
        .iter()
        .map(|dir| root.join(dir).join(basename))
        .find(|candidate| candidate.is_file())
}
