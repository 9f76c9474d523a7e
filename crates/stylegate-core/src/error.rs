//! Unified error types for stylegate

use thiserror::Error;

/// Unified error type for all stylegate operations
#[derive(Error, Debug)]
pub enum StyleGateError {
    // Configuration errors
    #[error("Failed to load style rules: {0}")]
    ConfigLoad(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // Browser errors
    #[error("Browser error: {0}")]
    Browser(String),

    /// The page, context or browser went away while it was being inspected.
    #[error("Browser unavailable: {0}")]
    CollaboratorUnavailable(String),

    #[error("Navigation to {url} failed: {reason}")]
    Navigation { url: String, reason: String },

    #[error("Text not visible: {0}")]
    TextNotVisible(String),

    // I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    // Generic
    #[error("{0}")]
    Other(String),
}

impl StyleGateError {
    /// Whether the browser side is gone and no further element can be read
    pub fn is_collaborator_unavailable(&self) -> bool {
        matches!(self, Self::CollaboratorUnavailable(_))
    }
}

/// Result type alias using StyleGateError
pub type Result<T> = std::result::Result<T, StyleGateError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collaborator_unavailable_classification() {
        let gone = StyleGateError::CollaboratorUnavailable("tab closed".to_string());
        assert!(gone.is_collaborator_unavailable());

        let other = StyleGateError::Browser("evaluation failed".to_string());
        assert!(!other.is_collaborator_unavailable());
    }

    #[test]
    fn test_navigation_message() {
        let err = StyleGateError::Navigation {
            url: "https://example.com".to_string(),
            reason: "timeout".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Navigation to https://example.com failed: timeout"
        );
    }
}
