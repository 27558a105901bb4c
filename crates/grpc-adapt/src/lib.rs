//! Awaitable adapters over callback-style gRPC unary calls.
//!
//! This crate wraps callback-style unary calls into futures, classifies raw
//! transport failures into a small typed error set, and provides the
//! server-side `report` handler that logs a failure and forwards it as a
//! `tonic::Status` reply. Protocol concerns (framing, retries, pooling,
//! streaming) stay with `tonic`.

mod call;
mod error;
mod report;

pub use call::{ContextCall, UnaryCall, UnaryCallback, adapt, adapt_all, http_status, pick};
pub use error::{ErrorCategory, GrpcError};
pub use report::{FieldIssue, ValidationError, report};
