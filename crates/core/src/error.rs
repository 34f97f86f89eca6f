//! Error types for the ai-studio-core library.
//!
//! Every failure of a generation action maps to exactly one of these variants,
//! and each action surfaces a single user-visible message through
//! [`AppError::user_message`].

use thiserror::Error;

/// Message shown for every failure that is not a validation error.
pub const GENERIC_FAILURE: &str = "Something went wrong while generating your image. Please try again.";

/// Errors that can occur within the ai-studio-core library.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration-related errors (missing keys, invalid values).
    #[error("Configuration error: {0}")]
    Config(String),

    /// Required prompt text or image is missing for the selected function.
    ///
    /// Raised before any outbound call; the message is shown to the user as-is.
    #[error("{0}")]
    Validation(String),

    /// A source could not be read or decoded as binary image content.
    #[error("Decode error: {0}")]
    Decode(String),

    /// The remote service call failed (network, auth, quota).
    #[error("Gemini API error: {0}")]
    Transport(String),

    /// The remote call succeeded but carried no usable image.
    #[error("No image returned: {0}")]
    EmptyResult(String),

    /// A generation action is already pending.
    #[error("A generation is already in progress")]
    Busy,

    /// A generation was completed without being started.
    #[error("No generation is in progress")]
    NotPending,

    /// There is no generated image to act on.
    #[error("No generated image available")]
    NoResult,

    /// Standard I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl AppError {
    /// Creates a configuration error with the given message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Creates a validation error with the given message.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Creates a decode error with the given message.
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    /// Creates a transport error with the given message.
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    /// Creates an empty-result error with the given message.
    pub fn empty_result(msg: impl Into<String>) -> Self {
        Self::EmptyResult(msg.into())
    }

    /// Returns true for errors raised before dispatch by a precondition check.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// The message shown to the user for this failure.
    ///
    /// Validation and session errors are shown verbatim; decode, transport and
    /// empty-result failures collapse into [`GENERIC_FAILURE`].
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation(msg) => msg.clone(),
            Self::Busy | Self::NotPending | Self::NoResult => self.to_string(),
            _ => GENERIC_FAILURE.to_string(),
        }
    }
}

/// A convenient alias for Result with [`AppError`].
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_message_is_verbatim() {
        let err = AppError::validation("Please describe your idea.");
        assert!(err.is_validation());
        assert_eq!(err.user_message(), "Please describe your idea.");
    }

    #[test]
    fn remote_failures_are_generic() {
        for err in [
            AppError::transport("401 Unauthorized"),
            AppError::empty_result("no inline image"),
            AppError::decode("bad file"),
        ] {
            assert!(!err.is_validation());
            assert_eq!(err.user_message(), GENERIC_FAILURE);
        }
    }

    #[test]
    fn session_protocol_errors_are_verbatim() {
        for err in [AppError::Busy, AppError::NotPending, AppError::NoResult] {
            assert!(!err.is_validation());
            assert_eq!(err.user_message(), err.to_string());
        }
        assert_eq!(AppError::config("bad").user_message(), GENERIC_FAILURE);
    }
}
