use thiserror::Error;

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("failed to encode payload: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("webhook transport: {0}")]
    Transport(#[from] vigil_http::HttpError),

    #[error("webhook answered {status}: {body}")]
    Status { status: u16, body: String },
}
