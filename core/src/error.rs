use thiserror::Error;

/// Type-erased error used for body streams and collaborator failures.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Result of a raw or application handler.
pub type HandlerResult = Result<(), HandlerError>;

/// Rejection reasons of the `body` deferred computation.
#[derive(Error, Debug)]
pub enum BodyError {
    #[error("invalid JSON body: {0}")]
    Json(#[from] serde_json::Error),
    #[error("request body exceeds the limit of {limit} bytes")]
    TooLarge { limit: usize },
    #[error("failed to read request body: {0}")]
    Stream(BoxError),
    #[error("request body was already consumed")]
    Consumed,
}

/// Failure reported by a handler future.
///
/// The dispatcher converts it into a 500 response; the adapter never writes
/// error responses itself.
#[derive(Error, Debug)]
pub enum HandlerError {
    #[error(transparent)]
    Body(#[from] BodyError),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("handler failed: {0}")]
    Internal(String),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl HandlerError {
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }
}

/// Configuration loading and validation errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid config: {0}")]
    Validation(String),
    #[error("invalid environment variable {name}: {reason}")]
    EnvVar { name: &'static str, reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn body_error_converts_into_handler_error() {
        let err: HandlerError = BodyError::TooLarge { limit: 16 }.into();
        assert!(matches!(err, HandlerError::Body(BodyError::TooLarge { limit: 16 })));
        assert_eq!(err.to_string(), "request body exceeds the limit of 16 bytes");
    }

    #[test]
    fn json_errors_convert_from_either_direction() {
        let decode = serde_json::from_str::<u8>("\"x\"").unwrap_err();
        let err: HandlerError = decode.into();
        assert!(matches!(err, HandlerError::Json(_)));
        assert!(err.to_string().starts_with("JSON error:"));
    }

    #[test]
    fn anyhow_errors_are_accepted() {
        let err: HandlerError = anyhow::anyhow!("boom").into();
        assert_eq!(err.to_string(), "boom");
    }
}
