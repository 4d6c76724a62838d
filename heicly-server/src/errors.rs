use axum::{
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use heicly::FilenameError;
use thiserror::Error as ThisError;

#[derive(ThisError, Debug)]
pub enum Error {
    /// No multipart part named `file` carried a filename
    #[error("No file part")]
    MissingFilePart,

    /// Empty or disallowed filename
    #[error(transparent)]
    Filename(#[from] FilenameError),

    /// Body could not be read as multipart, or exceeded the size limit
    #[error("{message}")]
    Multipart { status: StatusCode, message: String },

    /// The upload was accepted but could not be decoded or encoded
    #[error("Failed to convert {filename}")]
    Conversion {
        filename: String,
        #[source]
        source: anyhow::Error,
    },

    /// Unexpected error with full context chain
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl From<MultipartError> for Error {
    fn from(err: MultipartError) -> Self {
        Error::Multipart {
            status: err.status(),
            message: err.body_text(),
        }
    }
}

impl Error {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::MissingFilePart | Error::Filename(_) => StatusCode::BAD_REQUEST,
            Error::Multipart { status, .. } => *status,
            Error::Conversion { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            Error::Other(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Returns a user-safe error message, without leaking internal implementation details
    pub fn user_message(&self) -> String {
        match self {
            Error::Other(_) => "Internal server error".to_string(),
            _ => self.to_string(),
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match &self {
            Error::Other(_) => {
                tracing::error!("Internal service error: {:#}", self);
            }
            Error::Conversion { source, .. } => {
                tracing::warn!("{}: {:#}", self, source);
            }
            Error::MissingFilePart | Error::Filename(_) | Error::Multipart { .. } => {
                tracing::debug!("Client error: {}", self);
            }
        }

        (self.status_code(), self.user_message()).into_response()
    }
}
