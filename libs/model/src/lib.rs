//! # computest-model
//!
//! Request and response types for the compute servers API, shared by the
//! client and the simulated service.
//!
//! Field names follow the wire format (`imageRef`, `OS-EXT-STS:vm_state`,
//! ...) through serde renames; Rust-side names are snake_case.

mod error;
pub mod fault;
pub mod flavor;
pub mod microversion;
pub mod query;
pub mod request;
pub mod server;
pub mod status;

pub use error::ModelError;
pub use fault::{Fault, FaultKind};
pub use flavor::Flavor;
pub use microversion::{Microversion, MicroversionRange, RequestedVersion, VersionBound};
pub use query::ListServersQuery;
pub use request::{
    CreateServerBody, CreateServerRequest, Networks, RebuildRequest, ResetState, SchedulerHints,
    ServerAction, UpdateServerBody, UpdateServerRequest,
};
pub use server::{
    CreatedServer, EmbeddedFlavor, ExtendedAttributes, ExtendedStatus, FlavorLink, ImageRef,
    Link, Server, ServerFlavor, ServerImage, ServerSummary,
};
pub use status::ServerStatus;
