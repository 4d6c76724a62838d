//! Web front end for [`heicly`]: a single upload form that hands back a JPEG.
//!
//! `GET /` serves the form, `POST /upload` takes a multipart field named `file`
//! holding a `.heic` image and answers with the converted file as an attachment.

pub mod config;
pub mod errors;
pub mod handlers;
pub mod telemetry;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use heicly::Converter;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use std::future::Future;
use std::sync::Arc;

pub use config::ServerConfig;
pub use errors::{Error, Result};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
    pub converter: Converter,
}

impl AppState {
    pub fn new(config: ServerConfig, converter: Converter) -> Self {
        Self {
            config: Arc::new(config),
            converter,
        }
    }
}

pub fn build_router(state: AppState) -> Router {
    let upload_limit = state.config.max_upload_bytes;

    Router::new()
        .route("/", get(handlers::home))
        .route(
            "/upload",
            post(handlers::upload).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Create the scratch directories, bind and serve until `shutdown` resolves
pub async fn serve<F>(config: ServerConfig, shutdown: F) -> anyhow::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    config.ensure_dirs()?;

    let converter = Converter::new(config.quality)?;
    let bind_addr = config.bind_addr();
    let listener = TcpListener::bind(&bind_addr).await?;

    tracing::info!(
        upload_dir = %config.upload_dir.display(),
        converted_dir = %config.converted_dir.display(),
        quality = config.quality,
        "Listening on http://{}",
        listener.local_addr()?
    );

    let router = build_router(AppState::new(config, converter));
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown)
        .await?;

    Ok(())
}
