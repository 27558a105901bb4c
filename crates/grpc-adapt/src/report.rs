use serde::Serialize;
use thiserror::Error;
use tonic::Status;
use tracing::error;

use crate::error::GrpcError;

/// One failed field check from request validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldIssue {
    pub field: String,
    pub message: String,
}

impl FieldIssue {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Request validation failure. `report` recognizes this shape and downgrades
/// it to an InvalidArgument reply carrying the serialized issue list.
#[derive(Debug, Error)]
#[error("validation failed for {} field(s)", .issues.len())]
pub struct ValidationError {
    pub issues: Vec<FieldIssue>,
}

impl ValidationError {
    pub fn new(issues: Vec<FieldIssue>) -> Self {
        Self { issues }
    }
}

/// Server-side failure handler: classify the caught error, log it, then
/// forward it to the reply sink. The log line is always emitted before the
/// reply and never changes its outcome.
pub fn report<F>(error: anyhow::Error, reply: F)
where
    F: FnOnce(Status),
{
    let status = if let Some(validation) = error.downcast_ref::<ValidationError>() {
        let message = serde_json::to_string(&validation.issues)
            .unwrap_or_else(|_| validation.to_string());
        let wrapped = GrpcError::invalid_argument(message);
        error!(error = %wrapped, "request failed validation");
        Status::from(wrapped)
    } else if let Some(classified) = error.downcast_ref::<GrpcError>() {
        // An already-classified error keeps its own code on the wire.
        error!(error = %classified, "request failed");
        Status::new(classified.code(), classified.message())
    } else {
        error!(error = %error, "request failed");
        Status::unknown(error.to_string())
    };
    reply(status);
}
