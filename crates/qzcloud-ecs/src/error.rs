//! Ecs client error types.

use std::time::Duration;

use thiserror::Error;

/// Errors talking to the Ecs API.
#[derive(Debug, Error)]
pub enum EcsError {
    #[error("cannot connect to ecs at {address}: {reason}")]
    Connect { address: String, reason: String },

    #[error("http error: {0}")]
    Http(String),

    #[error("ecs returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("ecs call timed out after {0:?}")]
    Timeout(Duration),

    #[error("cannot encode ecs request: {0}")]
    Encode(String),

    #[error("cannot decode ecs response: {0}")]
    Decode(String),

    #[error("ecs rejected the request: {0}")]
    Rejected(String),

    #[error("invalid ecs configuration: {0}")]
    Config(String),
}

pub type EcsResult<T> = Result<T, EcsError>;
