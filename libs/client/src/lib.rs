//! # computest-client
//!
//! Client for the compute servers API as seen by one set of credentials.
//!
//! - [`ServersClient`] issues the calls, negotiates the microversion and
//!   checks success codes
//! - [`schemas`] validates every response body against the schema for the
//!   negotiated microversion
//! - [`waiters`] polls a server until it reaches a status or goes away

mod client;
mod error;
pub mod operation;
pub mod schemas;
pub mod waiters;

pub use client::{Credentials, Role, ServersClient};
pub use error::ClientError;
pub use operation::Operation;
pub use waiters::{wait_for_server_status, wait_for_server_termination, WaitError, WaitPolicy};
