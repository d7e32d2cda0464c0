//! Conformance case definitions and assertion helpers.

use std::fmt::Debug;

use async_trait::async_trait;
use computest_client::{ClientError, WaitError};
use serde::Serialize;
use thiserror::Error;

use crate::env::CaseContext;

/// Why a case did not pass.
#[derive(Debug, Error)]
pub enum CaseError {
    /// The service answered, but not as the contract says.
    #[error("assertion failed: {0}")]
    Assertion(String),

    #[error(transparent)]
    Client(#[from] ClientError),

    #[error(transparent)]
    Wait(#[from] WaitError),

    /// Group fixtures could not be prepared.
    #[error("setup failed: {0}")]
    Setup(String),
}

impl CaseError {
    /// Assertion failures count as `failed`; everything else as `error`.
    pub fn is_assertion(&self) -> bool {
        matches!(self, Self::Assertion(_))
    }
}

/// Static description of a case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CaseInfo {
    pub name: &'static str,
    /// Stable check id; survives renames.
    pub idempotent_id: &'static str,
    pub description: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub related_bug: Option<&'static str>,
}

#[async_trait]
pub trait ConformanceCase: Send + Sync {
    fn info(&self) -> CaseInfo;

    async fn run(&self, ctx: &mut CaseContext<'_>) -> Result<(), CaseError>;
}

pub fn ensure(condition: bool, message: impl FnOnce() -> String) -> Result<(), CaseError> {
    if condition {
        Ok(())
    } else {
        Err(CaseError::Assertion(message()))
    }
}

pub fn ensure_eq<T>(what: &str, actual: &T, expected: &T) -> Result<(), CaseError>
where
    T: PartialEq + Debug + ?Sized,
{
    ensure(actual == expected, || {
        format!("{what}: expected {expected:?}, got {actual:?}")
    })
}

/// Checks that `names` contains `name` (or not, if `present` is false).
pub fn ensure_listed(
    listing: &str,
    names: &[String],
    name: &str,
    present: bool,
) -> Result<(), CaseError> {
    let found = names.iter().any(|n| n == name);
    ensure(found == present, || {
        if present {
            format!("{listing}: expected {name} in {names:?}")
        } else {
            format!("{listing}: did not expect {name} in {names:?}")
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ensure_eq_reports_both_values() {
        let err = ensure_eq("status", &"ERROR", &"ACTIVE").unwrap_err();
        assert!(err.is_assertion());
        let message = err.to_string();
        assert!(message.contains("\"ACTIVE\""));
        assert!(message.contains("\"ERROR\""));
    }

    #[test]
    fn test_ensure_listed() {
        let names = vec!["a".to_string(), "b".to_string()];
        ensure_listed("list", &names, "a", true).unwrap();
        ensure_listed("list", &names, "c", false).unwrap();
        assert!(ensure_listed("list", &names, "c", true).is_err());
        assert!(ensure_listed("list", &names, "b", false).is_err());
    }

    #[test]
    fn test_client_errors_are_not_assertions() {
        let err = CaseError::from(ClientError::Config("x".to_string()));
        assert!(!err.is_assertion());
    }
}
