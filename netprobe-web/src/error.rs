//! HTTP error mapping for toolbox failures.

use std::fmt;

use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use netprobe_toolbox::ToolboxError;
use serde::Serialize;

/// Operation an error came from; selects the user-facing message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Lookup,
    Resolve,
    PortScan,
}

impl Operation {
    fn failure_message(self) -> &'static str {
        match self {
            Self::Lookup => "Failed to perform DNS lookup",
            Self::Resolve => "Failed to resolve domain",
            Self::PortScan => "Failed to scan port",
        }
    }

    fn not_found_message(self) -> &'static str {
        match self {
            Self::Lookup => "Domain not found or no records of the requested type",
            Self::Resolve | Self::PortScan => "Domain not found",
        }
    }
}

/// API 错误: a toolbox error tagged with the operation that produced it,
/// or a request body / query string that could not be parsed.
#[derive(Debug)]
pub enum ApiError {
    Toolbox {
        operation: Operation,
        source: ToolboxError,
    },
    MalformedRequest(String),
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    /// Wrap a toolbox error; expected errors are logged at `warn`, the rest at `error`.
    pub fn new(operation: Operation, source: ToolboxError) -> Self {
        if source.is_expected() {
            tracing::warn!(?operation, "ApiError: {source}");
        } else {
            tracing::error!(?operation, "ApiError: {source}");
        }
        Self::Toolbox { operation, source }
    }

    pub fn lookup(source: ToolboxError) -> Self {
        Self::new(Operation::Lookup, source)
    }

    pub fn resolve(source: ToolboxError) -> Self {
        Self::new(Operation::Resolve, source)
    }

    pub fn port_scan(source: ToolboxError) -> Self {
        Self::new(Operation::PortScan, source)
    }

    pub fn malformed(reason: impl fmt::Display) -> Self {
        let reason = reason.to_string();
        tracing::warn!("ApiError: malformed request: {reason}");
        Self::MalformedRequest(reason)
    }

    fn body(&self) -> ErrorBody {
        match self {
            Self::MalformedRequest(reason) => ErrorBody {
                error: "Invalid input",
                details: Some(reason.clone()),
            },
            Self::Toolbox { operation, source } => match source {
                ToolboxError::DomainRequired if *operation == Operation::Lookup => ErrorBody {
                    error: "Domain is required",
                    details: None,
                },
                ToolboxError::InvalidRecordType(_) => ErrorBody {
                    error: "Valid record type (A, MX, NS) is required",
                    details: None,
                },
                ToolboxError::InvalidInput(_) | ToolboxError::DomainRequired => ErrorBody {
                    error: "Invalid input",
                    details: Some(source.to_string()),
                },
                ToolboxError::DomainNotFound(_) => ErrorBody {
                    error: operation.not_found_message(),
                    details: None,
                },
                ToolboxError::ResolutionError(_) | ToolboxError::Internal(_) => ErrorBody {
                    error: operation.failure_message(),
                    details: None,
                },
            },
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Toolbox { source, .. } => source.fmt(f),
            Self::MalformedRequest(reason) => write!(f, "Malformed request: {reason}"),
        }
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::MalformedRequest(_) => StatusCode::BAD_REQUEST,
            Self::Toolbox { source, .. } => {
                if source.is_invalid_input() {
                    StatusCode::BAD_REQUEST
                } else if matches!(source, ToolboxError::DomainNotFound(_)) {
                    StatusCode::NOT_FOUND
                } else {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(self.body())
    }
}
