//! Compute fault bodies: `{"badRequest": {"code": 400, "message": "..."}}`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fault {
    pub code: u16,
    pub message: String,
}

/// The fault names the compute API wraps error bodies in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaultKind {
    BadRequest,
    Unauthorized,
    Forbidden,
    ItemNotFound,
    NotAcceptable,
    ConflictingRequest,
    ComputeFault,
}

impl FaultKind {
    pub const fn key(&self) -> &'static str {
        match self {
            Self::BadRequest => "badRequest",
            Self::Unauthorized => "unauthorized",
            Self::Forbidden => "forbidden",
            Self::ItemNotFound => "itemNotFound",
            Self::NotAcceptable => "notAcceptable",
            Self::ConflictingRequest => "conflictingRequest",
            Self::ComputeFault => "computeFault",
        }
    }

    pub const fn code(&self) -> u16 {
        match self {
            Self::BadRequest => 400,
            Self::Unauthorized => 401,
            Self::Forbidden => 403,
            Self::ItemNotFound => 404,
            Self::NotAcceptable => 406,
            Self::ConflictingRequest => 409,
            Self::ComputeFault => 500,
        }
    }
}

/// Wraps a message in the fault envelope for `kind`.
pub fn fault_body(kind: FaultKind, message: impl Into<String>) -> BTreeMap<String, Fault> {
    BTreeMap::from([(
        kind.key().to_string(),
        Fault {
            code: kind.code(),
            message: message.into(),
        },
    )])
}

/// Extracts the single fault from an error body, if it has one.
pub fn parse_fault(body: &str) -> Option<Fault> {
    let faults: BTreeMap<String, Fault> = serde_json::from_str(body).ok()?;
    faults.into_values().next()
}
