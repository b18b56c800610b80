use thiserror::Error;

/// Errors from the completion client transport layer.
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("completion request failed: {0}")]
    Transport(String),

    #[error("completion API returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("unexpected reply shape: {0}")]
    Shape(String),
}

/// Errors inside the analysis pipeline. These are captured as message strings
/// on batch and reconciliation results rather than propagated; only the
/// completion client and parser surface them as values.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("client error: {0}")]
    Client(#[from] ClientError),

    #[error("reply parse error: {0}")]
    Parse(String),
}
