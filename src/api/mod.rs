//! HTTP API server for Katha

mod error;
pub mod health;
pub mod narration;
pub mod playback;
pub mod stories;

pub use error::ApiError;

use std::sync::Arc;

use axum::Router;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::audio::PlaybackHandle;
use crate::catalog::{Catalog, Language};
use crate::narration::{Analyzer, Synthesizer};
use crate::Result;

/// Shared state for API handlers
#[derive(Clone)]
pub struct ApiState {
    pub catalog: Arc<Catalog>,
    /// Absent when no API key is configured
    pub analyzer: Option<Arc<dyn Analyzer>>,
    /// Absent when no API key is configured
    pub synthesizer: Option<Arc<dyn Synthesizer>>,
    pub playback: PlaybackHandle,
    /// Language used when a request names none
    pub language: Language,
}

/// Build the router with all routes
pub fn router(state: Arc<ApiState>) -> Router {
    // CORS layer for cross-origin requests from the browser UI
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .nest(
            "/api",
            stories::router(state.clone())
                .merge(narration::router(state.clone()))
                .merge(playback::router(state)),
        )
        .merge(health::router())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

/// API server
pub struct ApiServer {
    state: Arc<ApiState>,
    port: u16,
}

impl ApiServer {
    #[must_use]
    pub fn new(state: ApiState, port: u16) -> Self {
        Self {
            state: Arc::new(state),
            port,
        }
    }

    /// Run the API server
    ///
    /// # Errors
    ///
    /// Returns error if server fails to bind or run
    pub async fn run(self) -> Result<()> {
        let addr = format!("0.0.0.0:{}", self.port);
        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|e| crate::Error::Config(format!("failed to bind API server: {e}")))?;

        tracing::info!(
            port = self.port,
            narration = self.state.analyzer.is_some(),
            stories = self.state.catalog.stories().len(),
            "API server listening"
        );

        axum::serve(listener, router(self.state))
            .await
            .map_err(|e| crate::Error::Config(format!("API server error: {e}")))?;

        Ok(())
    }
}
