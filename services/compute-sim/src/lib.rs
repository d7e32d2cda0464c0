//! # computest-sim
//!
//! An in-memory compute service speaking the servers API: create, list and
//! filter, show, update, delete, and the os-resetState, rebuild and
//! injectNetworkInfo actions, with microversion negotiation up to a
//! configurable maximum.
//!
//! Lifecycle transitions (BUILD to ACTIVE, REBUILD to ACTIVE, deletion) are
//! timed and applied lazily when servers are read.

pub mod api;
pub mod config;
pub mod placement;
pub mod state;
pub mod store;
pub mod view;

pub use config::{Faults, SimConfig};
pub use state::AppState;
