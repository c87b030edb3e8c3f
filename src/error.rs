use thiserror::Error;

/// Shown when a failure carries no usable message.
pub const UNKNOWN_ERROR_MESSAGE: &str = "An unknown error occurred.";

#[derive(Debug, Error)]
pub enum GenieError {
    #[error("{0}")]
    Validation(String),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Request error: {0}")]
    Request(String),
    #[error("Response error: {0}")]
    Response(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("HTTP error: {0}")]
    Http(String),
    #[error("API error: {0}")]
    Api(String),
    #[error("AWS error: {0}")]
    AwsError(String),
    #[error("AWS service error: {0}")]
    AwsServiceError(String),
    #[error("I/O error: {0}")]
    Io(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl GenieError {
    /// The message without its category prefix.
    pub fn detail(&self) -> &str {
        match self {
            GenieError::Validation(msg)
            | GenieError::Config(msg)
            | GenieError::Request(msg)
            | GenieError::Response(msg)
            | GenieError::Serialization(msg)
            | GenieError::Http(msg)
            | GenieError::Api(msg)
            | GenieError::AwsError(msg)
            | GenieError::AwsServiceError(msg)
            | GenieError::Io(msg)
            | GenieError::Internal(msg) => msg,
        }
    }

    /// Text suitable for the error banner.
    pub fn user_message(&self) -> String {
        if self.detail().trim().is_empty() {
            UNKNOWN_ERROR_MESSAGE.to_string()
        } else {
            self.to_string()
        }
    }
}

impl From<reqwest::Error> for GenieError {
    fn from(e: reqwest::Error) -> Self {
        GenieError::Http(e.to_string())
    }
}

impl From<serde_json::Error> for GenieError {
    fn from(e: serde_json::Error) -> Self {
        GenieError::Serialization(e.to_string())
    }
}

impl From<std::io::Error> for GenieError {
    fn from(e: std::io::Error) -> Self {
        GenieError::Io(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, GenieError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_message_has_no_prefix() {
        let err = GenieError::Validation("Please enter a prompt.".into());
        assert_eq!(err.user_message(), "Please enter a prompt.");
    }

    #[test]
    fn remote_failures_keep_their_category() {
        let err = GenieError::Api("quota exceeded".into());
        assert_eq!(err.user_message(), "API error: quota exceeded");
        assert_eq!(err.detail(), "quota exceeded");
    }

    #[test]
    fn blank_failures_fall_back_to_unknown() {
        assert_eq!(
            GenieError::Response(String::new()).user_message(),
            UNKNOWN_ERROR_MESSAGE
        );
        assert_eq!(
            GenieError::Internal("   ".into()).user_message(),
            UNKNOWN_ERROR_MESSAGE
        );
    }
}
