use std::fmt;

use tonic::{Code, Status};

/// The closed set of failure categories this library classifies transport
/// errors into. Every raw failure maps to exactly one category; codes with
/// no dedicated category collapse into [`ErrorCategory::Unknown`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    InvalidArgument,
    NotFound,
    PermissionDenied,
    Unauthenticated,
    Unknown,
}

impl ErrorCategory {
    /// Classify a transport failure code.
    pub const fn from_code(code: Code) -> Self {
        match code {
            Code::InvalidArgument => Self::InvalidArgument,
            Code::NotFound => Self::NotFound,
            Code::PermissionDenied => Self::PermissionDenied,
            Code::Unauthenticated => Self::Unauthenticated,
            _ => Self::Unknown,
        }
    }

    /// The transport code this category corresponds to.
    pub const fn code(self) -> Code {
        match self {
            Self::InvalidArgument => Code::InvalidArgument,
            Self::NotFound => Code::NotFound,
            Self::PermissionDenied => Code::PermissionDenied,
            Self::Unauthenticated => Code::Unauthenticated,
            Self::Unknown => Code::Unknown,
        }
    }

    /// Default human-readable label, used when no message was supplied.
    pub const fn default_message(self) -> &'static str {
        match self {
            Self::InvalidArgument => "Invalid Argument",
            Self::NotFound => "Not Found",
            Self::PermissionDenied => "Permission denied",
            Self::Unauthenticated => "Unauthenticated",
            Self::Unknown => "Unknown",
        }
    }

    /// HTTP-style status for this category. Unknown maps to 404, not 500.
    pub const fn http_status(self) -> u16 {
        match self {
            Self::InvalidArgument => 406,
            Self::NotFound => 404,
            Self::PermissionDenied => 403,
            Self::Unauthenticated => 401,
            Self::Unknown => 404,
        }
    }
}

/// A classified transport failure: a category plus an optional message.
/// Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrpcError {
    category: ErrorCategory,
    message: Option<String>,
}

impl GrpcError {
    /// A bare error carrying only the category's default message.
    pub fn new(category: ErrorCategory) -> Self {
        Self {
            category,
            message: None,
        }
    }

    pub fn with_message(category: ErrorCategory, message: impl Into<String>) -> Self {
        Self {
            category,
            message: Some(message.into()),
        }
    }

    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::with_message(ErrorCategory::InvalidArgument, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::with_message(ErrorCategory::NotFound, message)
    }

    pub fn permission_denied(message: impl Into<String>) -> Self {
        Self::with_message(ErrorCategory::PermissionDenied, message)
    }

    pub fn unauthenticated(message: impl Into<String>) -> Self {
        Self::with_message(ErrorCategory::Unauthenticated, message)
    }

    pub fn unknown(message: impl Into<String>) -> Self {
        Self::with_message(ErrorCategory::Unknown, message)
    }

    pub fn category(&self) -> ErrorCategory {
        self.category
    }

    pub fn code(&self) -> Code {
        self.category.code()
    }

    /// The explicit message, or the category default when none was given.
    pub fn message(&self) -> &str {
        self.message
            .as_deref()
            .unwrap_or_else(|| self.category.default_message())
    }
}

impl fmt::Display for GrpcError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = self.category.default_message();
        match self.message.as_deref() {
            // Avoid "Not Found: Not Found" when the message is the label.
            None => f.write_str(label),
            Some(message) if message == label => f.write_str(label),
            Some(message) => write!(f, "{label}: {message}"),
        }
    }
}

impl std::error::Error for GrpcError {}

impl From<Status> for GrpcError {
    /// Classify a raw transport failure. The status message (the server-sent
    /// detail text) becomes the error message when non-empty.
    fn from(status: Status) -> Self {
        let category = ErrorCategory::from_code(status.code());
        if status.message().is_empty() {
            Self::new(category)
        } else {
            Self::with_message(category, status.message())
        }
    }
}

impl From<GrpcError> for Status {
    fn from(err: GrpcError) -> Self {
        Status::new(err.code(), err.message())
    }
}
