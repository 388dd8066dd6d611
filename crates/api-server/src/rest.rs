//! REST handlers for popup rendering and operational endpoints.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::Json;
use chrono::Utc;
use popup_core::types::{DeviceClass, PageContext};
use popup_eligibility::{EligibilityEngine, PopupDescriptor};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

/// Maximum accepted locale length.
const MAX_LOCALE_LEN: usize = 35;

/// Shared application state for REST handlers.
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<EligibilityEngine>,
    pub default_locale: String,
    pub start_time: Instant,
}

/// Page context as supplied by the host page on each request.
#[derive(Debug, Deserialize)]
pub struct PageQuery {
    pub page_id: Option<u64>,
    #[serde(default)]
    pub homepage: bool,
    pub device: Option<DeviceClass>,
    pub locale: Option<String>,
}

impl PageQuery {
    fn into_context(self, default_locale: &str) -> Result<PageContext, &'static str> {
        let locale = self
            .locale
            .map(|l| l.trim().to_string())
            .filter(|l| !l.is_empty())
            .unwrap_or_else(|| default_locale.to_string());
        if locale.len() > MAX_LOCALE_LEN {
            return Err("locale exceeds maximum length");
        }
        Ok(PageContext {
            page_id: self.page_id,
            is_homepage: self.homepage,
            device_class: self.device.unwrap_or(DeviceClass::Desktop),
            locale,
            now: Utc::now(),
        })
    }
}

fn bad_request(msg: &'static str) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse {
            error: "invalid_page_context".to_string(),
            message: msg.to_string(),
        }),
    )
        .into_response()
}

/// GET /v1/popups/render: footer markup for the page view.
pub async fn render_popups(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> Response {
    let ctx = match query.into_context(&state.default_locale) {
        Ok(ctx) => ctx,
        Err(msg) => {
            warn!(error = msg, "Render request rejected");
            return bad_request(msg);
        }
    };
    let html = state.engine.render(&ctx);
    info!(
        page_id = ?ctx.page_id,
        device = %ctx.device_class,
        bytes = html.len(),
        "Rendered popup block"
    );
    Html(html).into_response()
}

/// GET /v1/popups/eligible: the eligible popups as descriptors.
pub async fn eligible_popups(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> Result<Json<Vec<PopupDescriptor>>, Response> {
    let ctx = query
        .into_context(&state.default_locale)
        .map_err(bad_request)?;
    Ok(Json(state.engine.descriptors(&ctx)))
}

/// GET /health: Health check endpoint.
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        uptime_secs: state.start_time.elapsed().as_secs(),
    })
}

/// GET /live: Liveness probe.
pub async fn liveness() -> StatusCode {
    StatusCode::OK
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub uptime_secs: u64,
}
