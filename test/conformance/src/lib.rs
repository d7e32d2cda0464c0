//! # computest-conformance
//!
//! Conformance checks for the admin surface of the compute servers API:
//! listing and filtering across projects, os-resetState, rebuild from
//! ERROR, injectNetworkInfo, scheduler hints and the 2.75 update/rebuild
//! response schemas.
//!
//! Cases run one after another. The fixture group shares two servers
//! created at group start and deleted at group end; each case registers
//! compensating cleanups that run whatever its outcome.

pub mod case;
pub mod cleanup;
pub mod naming;
pub mod suite;

pub use case::{CaseError, CaseInfo, ConformanceCase};
pub use config::ConformanceConfig;
pub use report::{Outcome, OutputFormat, SuiteReport};
pub use suite::{registry, Selection, SuiteRunner};
