use crate::agent::Agent;
use crate::models::{internal_error_message, Language, RunOutcome};
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use lettre::Address;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::error;

#[derive(Clone)]
pub struct AppState {
    pub agent: Arc<Agent>,
}

#[derive(Debug, Deserialize)]
pub struct RunRequest {
    pub email: String,
    #[serde(default)]
    pub language: Language,
}

#[derive(Debug, Serialize)]
struct StatusMessage {
    message: &'static str,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub detail: String,
}

fn error_response(status: StatusCode, detail: impl Into<String>) -> Response {
    (
        status,
        Json(ErrorDetail {
            detail: detail.into(),
        }),
    )
        .into_response()
}

async fn root() -> Json<StatusMessage> {
    Json(StatusMessage {
        message: "AI Agent API is running",
    })
}

/// Request addresses are taken verbatim and need a dotted domain
fn parse_recipient(raw: &str) -> Result<Address, String> {
    if raw.trim() != raw {
        return Err("surrounding whitespace".to_string());
    }
    let address: Address = raw.parse().map_err(|e| format!("{}", e))?;
    if !address.domain().contains('.') {
        return Err(format!("domain '{}' is not fully qualified", address.domain()));
    }
    Ok(address)
}

async fn run_agent(
    State(state): State<AppState>,
    payload: Result<Json<RunRequest>, JsonRejection>,
) -> Response {
    let Json(request) = match payload {
        Ok(request) => request,
        Err(rejection) => {
            return error_response(StatusCode::UNPROCESSABLE_ENTITY, rejection.body_text())
        }
    };

    let email = match parse_recipient(&request.email) {
        Ok(address) => address,
        Err(reason) => {
            return error_response(
                StatusCode::UNPROCESSABLE_ENTITY,
                format!("Invalid email address '{}': {}", request.email, reason),
            )
        }
    };
    let language = request.language;
    let recipient = email.to_string();

    // A panic anywhere in the pipeline surfaces as a JoinError instead of a dropped connection
    let agent = state.agent.clone();
    let run = tokio::spawn(async move { agent.run_for_recipient(&recipient, language).await });

    match run.await {
        Ok(outcome) if outcome.success => (StatusCode::OK, Json(outcome)).into_response(),
        Ok(RunOutcome { message, .. }) => error_response(StatusCode::BAD_REQUEST, message),
        Err(e) => {
            error!("Agent run aborted: {}", e);
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                internal_error_message(language),
            )
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/run", post(run_agent))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
