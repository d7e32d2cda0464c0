//! # computest-id
//!
//! Identifier types for the resources the compute API hands out.
//!
//! ## Design Principles
//!
//! - IDs are assigned by the service under test and treated as opaque strings
//! - Parsing only rejects values that could never be a valid path segment
//! - IDs are typed so a server id can't be passed where an image id is expected
//!
//! ## ID Format
//!
//! Compute resources use hyphenated UUIDs, identity resources (projects,
//! users) use the 32-character simple form:
//!
//! - `5f7a0c1e-1c38-4f0e-9d0b-2b8f3c1a9e44`
//! - `8d1f52b6c0aa4e8f9b3e7f1c2d4a6b8e`
//!
//! Neither is enforced when parsing: a deployment is free to use other
//! schemes as long as the value is a single non-empty token.

mod error;
mod macros;
mod types;

pub use error::{IdError, MAX_ID_LEN};
pub use types::*;

/// Re-export uuid for consumers that mint ids of their own.
pub use uuid::Uuid;
