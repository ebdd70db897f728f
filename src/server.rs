#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use std::{any::Any, sync::Arc};

use anyhow::{Context, Result};
use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::{HeaderValue, Method, StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

use crate::{
    config::ServerConfig,
    evaluator::{CodeEvaluator, EvaluationRequest, EvaluationResult},
};

/// Shared handler state.
type AppState = Arc<CodeEvaluator>;

/// Body of `GET /health`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthStatus {
    /// Always `ok` while the process serves requests.
    pub status:  String,
    /// Human readable status.
    pub message: String,
}

/// Builds the application router.
///
/// `/evaluate` sits behind the CORS policy and a panic guard; `/health` is
/// open.
pub fn router(evaluator: CodeEvaluator, config: &ServerConfig) -> Result<Router> {
    let evaluate_routes = Router::new()
        .route("/evaluate", post(evaluate).options(preflight))
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(cors_layer(config.allowed_origins())?);

    Ok(Router::new()
        .merge(evaluate_routes)
        .route("/health", get(health))
        .with_state(Arc::new(evaluator))
        .layer(TraceLayer::new_for_http()))
}

/// Binds the configured address and serves until Ctrl-C.
pub async fn serve(config: ServerConfig, evaluator: CodeEvaluator) -> Result<()> {
    let addr = config.socket_addr()?;
    let app = router(evaluator, &config)?;

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Could not bind {addr}"))?;
    tracing::info!("Starting CodeArena backend on http://{addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server stopped unexpectedly")?;

    tracing::info!("Server shut down");
    Ok(())
}

/// CORS policy for `/evaluate`: listed origins, POST/OPTIONS, `Content-Type`.
fn cors_layer(origins: &[String]) -> Result<CorsLayer> {
    let origins = origins
        .iter()
        .map(|origin| {
            HeaderValue::from_str(origin).with_context(|| format!("Invalid CORS origin `{origin}`"))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]))
}

/// `POST /evaluate`
async fn evaluate(
    State(evaluator): State<AppState>,
    payload: Result<Json<EvaluationRequest>, JsonRejection>,
) -> (StatusCode, Json<EvaluationResult>) {
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => {
            tracing::warn!("Rejected evaluation request: {rejection}");
            return (StatusCode::BAD_REQUEST, Json(EvaluationResult::invalid_request()));
        }
    };

    let Some(code) = request.code() else {
        tracing::warn!("Evaluation request received with no code");
        return (StatusCode::BAD_REQUEST, Json(EvaluationResult::missing_code()));
    };

    tracing::info!(
        language = request.language.as_deref().unwrap_or("<detect>"),
        has_question = request.question.is_some(),
        code_bytes = code.len(),
        "Received evaluation request"
    );

    let result = evaluator
        .evaluate(code, request.language.as_deref(), request.question.as_deref())
        .await;
    tracing::info!(
        success = result.success,
        grade = result.grade,
        "Evaluation completed"
    );

    (StatusCode::OK, Json(result))
}

/// `OPTIONS /evaluate`
async fn preflight() -> StatusCode {
    StatusCode::OK
}

/// `GET /health`
async fn health() -> Json<HealthStatus> {
    Json(HealthStatus {
        status:  "ok".to_string(),
        message: "API is running".to_string(),
    })
}

/// Answers a panicked evaluation with the generic failure shape.
fn panic_response(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.as_str()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s
    } else {
        "unknown panic payload"
    };
    tracing::error!("Evaluation handler panicked: {detail}");

    (StatusCode::OK, Json(EvaluationResult::unexpected())).into_response()
}

/// Resolves on Ctrl-C.
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn panics_become_failure_results() {
        let response = panic_response(Box::new("boom"));
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("read body");
        let result: EvaluationResult = serde_json::from_slice(&bytes).expect("parse body");

        assert_eq!(result, EvaluationResult::unexpected());
    }

    #[test]
    fn invalid_origin_is_rejected() {
        assert!(cors_layer(&["bad\norigin".to_string()]).is_err());
    }
}
