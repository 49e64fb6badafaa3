//! Inventory store errors.
//!
//! redb and serde_json failures are flattened to their message; the store
//! never needs to branch on them. Missing records the caller must act on get
//! their own typed variant.

use thiserror::Error;

use crate::types::HostId;

#[derive(Debug, Error)]
pub enum StateError {
    #[error("cannot open inventory database: {0}")]
    Open(String),

    #[error("inventory transaction failed: {0}")]
    Transaction(String),

    #[error("cannot open inventory table: {0}")]
    Table(String),

    #[error("inventory read failed: {0}")]
    Read(String),

    #[error("inventory write failed: {0}")]
    Write(String),

    #[error("cannot encode record: {0}")]
    Serialize(String),

    #[error("corrupt record: {0}")]
    Deserialize(String),

    #[error("host {0} does not exist")]
    HostNotFound(HostId),
}

pub type StateResult<T> = Result<T, StateError>;
