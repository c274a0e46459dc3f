//! 统一错误类型定义

use serde::Serialize;
use thiserror::Error;

/// 工具箱错误类型
///
/// A probe that simply finds a port closed or unreachable is *not* an error;
/// see [`ProbeResult::open`](crate::ProbeResult::open).
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "code", content = "details")]
pub enum ToolboxError {
    /// Malformed or missing input field.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Domain was empty after normalisation.
    #[error("Domain name is required")]
    DomainRequired,

    /// Record type outside of A / MX / NS.
    #[error("Unsupported record type: {0} (expected A, MX or NS)")]
    InvalidRecordType(String),

    /// The resolver answered NXDOMAIN: the name does not exist.
    #[error("Domain not found: {0}")]
    DomainNotFound(String),

    /// Transient resolver / network failure, including resolver timeouts.
    #[error("Resolution error: {0}")]
    ResolutionError(String),

    /// Unexpected fault inside the toolbox (e.g. an isolated task died).
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ToolboxError {
    /// Whether the error is caused by the caller's input or by a confirmed
    /// absence rather than by infrastructure.
    ///
    /// Callers log `true` at `warn` and `false` at `error`.
    #[must_use]
    pub fn is_expected(&self) -> bool {
        match self {
            Self::InvalidInput(_)
            | Self::DomainRequired
            | Self::InvalidRecordType(_)
            | Self::DomainNotFound(_) => true,
            Self::ResolutionError(_) | Self::Internal(_) => false,
        }
    }

    /// Whether the request was malformed (never worth retrying).
    #[must_use]
    pub fn is_invalid_input(&self) -> bool {
        matches!(
            self,
            Self::InvalidInput(_) | Self::DomainRequired | Self::InvalidRecordType(_)
        )
    }

    /// Whether retrying later (with backoff) may succeed. The toolbox itself never retries.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::ResolutionError(_))
    }
}

/// 工具箱 Result 类型别名
pub type ToolboxResult<T> = std::result::Result<T, ToolboxError>;

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_expected_classification() {
        assert!(ToolboxError::DomainRequired.is_expected());
        assert!(ToolboxError::InvalidRecordType("TXT".to_string()).is_expected());
        assert!(ToolboxError::DomainNotFound("x.invalid".to_string()).is_expected());
        assert!(!ToolboxError::ResolutionError("timeout".to_string()).is_expected());
        assert!(!ToolboxError::Internal("join".to_string()).is_expected());
    }

    #[test]
    fn test_only_resolution_errors_are_retryable() {
        assert!(ToolboxError::ResolutionError("servfail".to_string()).is_retryable());
        assert!(!ToolboxError::DomainNotFound("x".to_string()).is_retryable());
        assert!(!ToolboxError::InvalidInput("port".to_string()).is_retryable());
    }

    #[test]
    fn test_invalid_input_family() {
        assert!(ToolboxError::DomainRequired.is_invalid_input());
        assert!(ToolboxError::InvalidRecordType("SOA".to_string()).is_invalid_input());
        assert!(!ToolboxError::DomainNotFound("x".to_string()).is_invalid_input());
    }

    #[test]
    fn test_serialize_tagged() {
        let json = serde_json::to_value(ToolboxError::DomainNotFound("a.invalid".into())).unwrap();
        assert_eq!(json["code"], "DomainNotFound");
        assert_eq!(json["details"], "a.invalid");

        let json = serde_json::to_value(ToolboxError::DomainRequired).unwrap();
        assert_eq!(json["code"], "DomainRequired");
    }
}
