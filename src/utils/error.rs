use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::time::Duration;
use thiserror::Error;

/// 解碼器呼叫失敗的原因
#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("Decoder exited abnormally: {stderr}")]
    Failed { stderr: String },

    #[error("Decoder timed out after {}s", .0.as_secs())]
    TimedOut(Duration),

    #[error("Decoder output is not valid JSON")]
    Malformed { stdout: String },
}

impl DecodeError {
    /// Diagnostic text reported to the client under `stderr`.
    pub fn stderr(&self) -> String {
        match self {
            DecodeError::Failed { stderr } => stderr.clone(),
            DecodeError::TimedOut(after) => {
                format!("decoder timed out after {}s", after.as_secs())
            }
            DecodeError::Malformed { .. } => String::new(),
        }
    }
}

#[derive(Error, Debug)]
pub enum VerifyError {
    #[error("No file uploaded")]
    MissingFile,

    #[error("Malformed upload: {message}")]
    MalformedUpload { message: String },

    #[error("Upload too large")]
    UploadTooLarge,

    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value for {field}: '{value}' ({reason})")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),
}

impl VerifyError {
    pub fn status(&self) -> StatusCode {
        match self {
            VerifyError::MissingFile | VerifyError::MalformedUpload { .. } => {
                StatusCode::BAD_REQUEST
            }
            VerifyError::UploadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for VerifyError {
    fn into_response(self) -> Response {
        let status = self.status();

        let body = match &self {
            VerifyError::MissingFile => json!({ "error": "No file uploaded" }),
            VerifyError::MalformedUpload { message } => {
                json!({ "error": "Malformed upload", "detail": message })
            }
            VerifyError::UploadTooLarge => json!({ "error": "Upload too large" }),
            VerifyError::Decode(DecodeError::Malformed { stdout }) => {
                json!({ "error": "Failed to parse Python response", "stdout": stdout })
            }
            VerifyError::Decode(e) => {
                json!({ "error": "QR verification failed", "stderr": e.stderr() })
            }
            other => {
                tracing::error!("Request failed: {}", other);
                json!({ "error": "Internal server error" })
            }
        };

        (status, Json(body)).into_response()
    }
}

pub type Result<T> = std::result::Result<T, VerifyError>;
