use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Browser launch failed: {0}")]
    LaunchError(String),

    #[error("Navigation failed: {0}")]
    NavigationError(String),

    #[error("No form fields found matching `{0}`")]
    FieldsNotFound(String),

    #[error("Element not found: {0}")]
    ElementNotFound(String),

    #[error("Timeout waiting for: {0}")]
    Timeout(String),

    #[error("JavaScript error: {0}")]
    JsError(String),

    #[error("Invalid date literal: {0}")]
    InvalidDate(String),

    #[error("Ambiguous field role: ordinals {0:?} all resolve to a date field")]
    AmbiguousRole(Vec<usize>),

    #[error("Input record has {values} values but the form has {fields} fields")]
    InputMismatch { values: usize, fields: usize },

    #[error("Submission failed: {0}")]
    Submission(String),

    #[error("Screenshot failed: {0}")]
    ScreenshotError(String),

    #[error("Could not write artifact {path}: {source}")]
    Capture {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Email credentials not found")]
    MissingCredentials,

    #[error("{kind} not found at {path}")]
    AttachmentNotFound { kind: &'static str, path: PathBuf },

    #[error("SMTP Authentication failed. Check your email credentials.")]
    SmtpAuth,

    #[error("Error sending email: {0}")]
    Delivery(String),

    #[error("CDP error: {0}")]
    CdpError(#[from] chromiumoxide::error::CdpError),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
