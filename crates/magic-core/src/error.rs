use std::io;

use thiserror::Error;

/// Coarse classification of a failed submission, used to pick how a host reacts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad or missing local input, or a local write that failed.
    UserInput,
    /// The request never produced an HTTP response.
    Transport,
    /// The service answered with a non-2xx status.
    Protocol,
    /// The response body could not be turned into artifacts.
    Decode,
}

/// Errors raised by the conversion flow.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("no source image selected")]
    MissingFile,
    #[error("a conversion is already in progress")]
    Busy,
    #[error("failed to read source image: {0}")]
    Io(#[from] io::Error),
    #[error("{0}")]
    Transport(#[from] reqwest::Error),
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },
    #[error("invalid response body: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid base64 payload: {0}")]
    Decode(#[from] base64::DecodeError),
    #[error("download of {file_name} failed: {reason}")]
    Download { file_name: String, reason: String },
}

impl ClientError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ClientError::MissingFile
            | ClientError::Busy
            | ClientError::Io(_)
            | ClientError::Download { .. } => ErrorKind::UserInput,
            ClientError::Transport(_) => ErrorKind::Transport,
            ClientError::Http { .. } => ErrorKind::Protocol,
            ClientError::Json(_) | ClientError::Decode(_) => ErrorKind::Decode,
        }
    }

    pub fn download<N: Into<String>, R: ToString>(file_name: N, reason: R) -> Self {
        ClientError::Download {
            file_name: file_name.into(),
            reason: reason.to_string(),
        }
    }
}
