//! Engine error kinds.
//!
//! Every operation returns `Result<T, EngineError>`; nothing propagates
//! uncaught across the engine boundary. Absent, expired, and scrubbed secrets
//! all collapse into `NotFound` so the existence of a consumed link is never
//! confirmable. Unexpected collaborator failures are logged in full at the
//! operation boundary and surface only as the opaque `Internal` kind.

use thiserror::Error;

use crate::validate::{format_violations, Violation};

/// Message shared by every `NotFound` outcome.
pub const MSG_NOT_FOUND: &str =
    "Secret not found. It either expired or you have an invalid link.";

/// Message for a failed password gate.
pub const MSG_INVALID_PASSWORD: &str = "Invalid password.";

/// Message for an exhausted view limit.
pub const MSG_VIEW_LIMIT_EXCEEDED: &str =
    "The maximum number of views for this secret has been exceeded.";

/// Failure kinds surfaced by the lifecycle operations.
#[derive(Debug, Error)]
pub enum EngineError {
    /// One or more creation rules were violated; all are reported together.
    #[error("Validation Failed. {}", format_violations(.0))]
    Validation(Vec<Violation>),

    /// The secret is absent, expired, or already scrubbed.
    #[error("{MSG_NOT_FOUND}")]
    NotFound,

    /// The request was rejected by a policy gate (wrong password or view
    /// limit exhausted). Callers must branch on the kind, never the message.
    #[error("{0}")]
    InvalidRequest(String),

    /// An unexpected collaborator or crypto failure. Details are logged
    /// server-side; this message is deliberately opaque.
    #[error("An internal error occurred.")]
    Internal,
}
