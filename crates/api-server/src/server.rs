//! API server: serves the popup footer block over HTTP.

use crate::rest::{self, AppState};
use axum::routing::get;
use axum::Router;
use popup_core::config::AppConfig;
use popup_eligibility::EligibilityEngine;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

pub struct ApiServer {
    config: AppConfig,
    engine: Arc<EligibilityEngine>,
}

impl ApiServer {
    pub fn new(config: AppConfig, engine: Arc<EligibilityEngine>) -> Self {
        Self { config, engine }
    }

    pub fn router(&self) -> Router {
        let state = AppState {
            engine: self.engine.clone(),
            default_locale: self.config.site.default_locale.clone(),
            start_time: Instant::now(),
        };

        Router::new()
            .route("/v1/popups/render", get(rest::render_popups))
            .route("/v1/popups/eligible", get(rest::eligible_popups))
            // Operational endpoints
            .route("/health", get(rest::health_check))
            .route("/live", get(rest::liveness))
            // Middleware
            .layer(CompressionLayer::new())
            .layer(CorsLayer::permissive())
            .layer(TraceLayer::new_for_http())
            .with_state(state)
    }

    /// Start the HTTP server.
    pub async fn start_http(&self) -> anyhow::Result<()> {
        let app = self.router();

        let addr = SocketAddr::new(self.config.api.host.parse()?, self.config.api.http_port);

        info!(addr = %addr, "Starting HTTP server");

        let listener = tokio::net::TcpListener::bind(addr).await?;
        axum::serve(listener, app).await?;

        Ok(())
    }
}
