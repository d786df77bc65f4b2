use reqwest::StatusCode;
use thiserror::Error;

/// Failures reported by the services the agent talks to
#[derive(Error, Debug)]
pub enum UpstreamError {
    #[error("{service} returned error status: {status}")]
    Status {
        service: &'static str,
        status: StatusCode,
    },

    #[error("Completion service returned no message content")]
    EmptyCompletion,

    #[error("Malformed fixture payload: {0}")]
    MalformedFixture(String),

    #[error("Invalid kickoff timestamp: {0}")]
    InvalidKickoff(String),
}

impl UpstreamError {
    pub fn is_transient(&self) -> bool {
        match self {
            UpstreamError::Status { status, .. } => {
                *status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
            }
            _ => false,
        }
    }
}

/// Decide whether an error is worth another attempt.
///
/// Walks the whole context chain so errors wrapped with `.context(..)` are
/// still classified by their root cause.
pub fn is_transient(err: &anyhow::Error) -> bool {
    err.chain().any(|cause| {
        if let Some(upstream) = cause.downcast_ref::<UpstreamError>() {
            return upstream.is_transient();
        }
        if let Some(http) = cause.downcast_ref::<reqwest::Error>() {
            return http.is_timeout() || http.is_connect();
        }
        if let Some(smtp) = cause.downcast_ref::<lettre::transport::smtp::Error>() {
            return smtp.is_transient();
        }
        false
    })
}
