//! HTTP request handlers

use super::types::{
    AnalyticsResponse, ClearResponse, ErrorResponse, HealthResponse, InboundMessage,
    SetupResponse,
};
use super::AppState;
use crate::journey::Scene;
use axum::{
    extract::{FromRequest, Request, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Form, Json, Router,
};
use chrono::Utc;

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health and registered templates
        .route("/", get(health))
        // Inbound messages from the provider
        .route("/webhook", post(webhook))
        // Operations
        .route("/analytics", get(analytics))
        .route("/setup-templates", post(setup_templates))
        .route("/clear-sessions", post(clear_sessions))
        // Version
        .route("/version", get(get_version))
        .with_state(state)
}

// ============================================================
// Health
// ============================================================

async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "TwiliTransit RCS Demo Server Running",
        timestamp: Utc::now(),
        content_sids: state.runtime.templates().snapshot().await,
    })
}

// ============================================================
// Webhook
// ============================================================

/// Parse the callback as JSON or as a form, whichever the content type says
async fn parse_inbound(request: Request) -> Result<InboundMessage, String> {
    let is_json = request
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.starts_with("application/json"));

    if is_json {
        Json::<InboundMessage>::from_request(request, &())
            .await
            .map(|Json(message)| message)
            .map_err(|e| e.body_text())
    } else {
        Form::<InboundMessage>::from_request(request, &())
            .await
            .map(|Form(message)| message)
            .map_err(|e| e.body_text())
    }
}

/// Always acknowledges; the provider must never see a failure
async fn webhook(State(state): State<AppState>, request: Request) -> &'static str {
    let message = match parse_inbound(request).await {
        Ok(message) => message,
        Err(e) => {
            tracing::warn!(error = %e, "Unparseable webhook payload");
            return "OK";
        }
    };

    let Some(from) = message.from.filter(|f| !f.trim().is_empty()) else {
        tracing::warn!(message_sid = ?message.message_sid, "Webhook payload without sender");
        return "OK";
    };
    let Some(body) = message.body else {
        tracing::error!(from = %from, message_sid = ?message.message_sid, "Webhook payload without body");
        send_fallback(&state, &from).await;
        return "OK";
    };

    tracing::info!(
        from = %from,
        body = %body,
        message_sid = message.message_sid.as_deref().unwrap_or(""),
        "Inbound message"
    );

    match state.runtime.handle_inbound(&from, &body).await {
        Ok(step) => tracing::debug!(from = %from, step = %step, "Inbound handled"),
        Err(e) => {
            tracing::error!(from = %from, error = %e, "Error handling message");
            send_fallback(&state, &from).await;
        }
    }

    "OK"
}

async fn send_fallback(state: &AppState, to: &str) {
    if !state.runtime.send_fallback(to).await.is_delivered() {
        tracing::warn!(to = %to, "Fallback reply not delivered");
    }
}

// ============================================================
// Operations
// ============================================================

async fn analytics(State(state): State<AppState>) -> Result<Json<AnalyticsResponse>, AppError> {
    let total_users = state
        .runtime
        .user_count()
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?;
    let journey_steps = state
        .runtime
        .step_counts()
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?;

    Ok(Json(AnalyticsResponse {
        total_users,
        journey_steps,
        content_templates: state.runtime.templates().snapshot().await,
        timestamp: Utc::now(),
    }))
}

async fn setup_templates(State(state): State<AppState>) -> Result<Json<SetupResponse>, AppError> {
    let templates = state.runtime.templates();
    let report = templates.provision(state.messenger.as_ref()).await;

    if report.all_failed() {
        return Err(AppError::Internal(
            "Failed to create any content templates".to_string(),
        ));
    }

    Ok(Json(SetupResponse {
        message: format!(
            "Created {} of {} content templates",
            report.created.len(),
            Scene::ALL.len()
        ),
        content_sids: templates.snapshot().await,
        failed: report.failed.iter().map(|scene| scene.key()).collect(),
    }))
}

async fn clear_sessions(State(state): State<AppState>) -> Result<Json<ClearResponse>, AppError> {
    let cleared = state
        .runtime
        .clear_sessions()
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?;

    Ok(Json(ClearResponse {
        message: "All sessions cleared".to_string(),
        cleared,
    }))
}

// ============================================================
// Version
// ============================================================

async fn get_version() -> &'static str {
    concat!("twilitransit ", env!("CARGO_PKG_VERSION"))
}

// ============================================================
// Error Handling
// ============================================================

#[derive(Debug)]
enum AppError {
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        let body = Json(ErrorResponse::new(message));
        (status, body).into_response()
    }
}
