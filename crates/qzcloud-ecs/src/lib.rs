//! qzcloud-ecs: client for the external Ecs automation API.
//!
//! Ecs performs the actual VPS provisioning and, when configured as the
//! scheduler, picks nodes for new hosts. This crate provides:
//!
//! - **`EcsApi`**: the async interface the rest of qzcloud depends on
//! - **`HttpEcsClient`**: HTTP/1.1 implementation (hyper, one connection
//!   per call, `apikey` header, per-call timeout)
//! - **`types`**: request/response bodies and the `{code, msg, data}`
//!   envelope Ecs wraps every answer in

pub mod client;
pub mod error;
pub mod types;

pub use client::{EcsApi, HttpEcsClient};
pub use error::{EcsError, EcsResult};
pub use types::{CreatedVps, Envelope, NodeChoice, ProvisionRequest};
