//! Request bodies for server calls.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use computest_id::{FlavorId, ImageId, ServerId};
use serde::{Deserialize, Deserializer, Serialize};

use crate::ModelError;

/// Network selection for a new server. Required from 2.37.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Networks {
    #[serde(rename = "auto")]
    Auto,
    #[serde(rename = "none")]
    None,
    #[serde(untagged)]
    Explicit(Vec<NetworkRequest>),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkRequest {
    pub uuid: String,
}

/// `server` member of a create request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateServerRequest {
    pub name: String,
    #[serde(rename = "imageRef")]
    pub image_ref: ImageId,
    #[serde(rename = "flavorRef")]
    pub flavor_ref: FlavorId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub networks: Option<Networks>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, String>,
}

impl CreateServerRequest {
    pub fn new(name: impl Into<String>, image_ref: ImageId, flavor_ref: FlavorId) -> Self {
        Self {
            name: name.into(),
            image_ref,
            flavor_ref,
            networks: None,
            metadata: BTreeMap::new(),
        }
    }

    pub fn with_networks(mut self, networks: Networks) -> Self {
        self.networks = Some(networks);
        self
    }
}

/// Placement hints passed as `os:scheduler_hints`.
///
/// The service accepts either a single id or a list for each hint; both are
/// read into a list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulerHints {
    #[serde(
        default,
        skip_serializing_if = "Vec::is_empty",
        deserialize_with = "one_or_many"
    )]
    pub same_host: Vec<ServerId>,
    #[serde(
        default,
        skip_serializing_if = "Vec::is_empty",
        deserialize_with = "one_or_many"
    )]
    pub different_host: Vec<ServerId>,
}

impl SchedulerHints {
    pub fn same_host(server_id: ServerId) -> Self {
        Self {
            same_host: vec![server_id],
            ..Self::default()
        }
    }

    pub fn different_host(server_id: ServerId) -> Self {
        Self {
            different_host: vec![server_id],
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.same_host.is_empty() && self.different_host.is_empty()
    }
}

fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<ServerId>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(ServerId),
        Many(Vec<ServerId>),
    }

    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(id) => vec![id],
        OneOrMany::Many(ids) => ids,
    })
}

/// Full `POST /servers` body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateServerBody {
    pub server: CreateServerRequest,
    #[serde(
        rename = "os:scheduler_hints",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub scheduler_hints: Option<SchedulerHints>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateServerRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateServerBody {
    pub server: UpdateServerRequest,
}

/// Target of an `os-resetState` action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResetState {
    Active,
    Error,
}

impl ResetState {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for ResetState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResetState {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(Self::Active),
            "error" => Ok(Self::Error),
            other => Err(ModelError::InvalidResetState(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RebuildRequest {
    #[serde(rename = "imageRef")]
    pub image_ref: ImageId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "adminPass", default, skip_serializing_if = "Option::is_none")]
    pub admin_pass: Option<String>,
}

impl RebuildRequest {
    pub fn new(image_ref: ImageId) -> Self {
        Self {
            image_ref,
            name: None,
            admin_pass: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResetStateRequest {
    pub state: ResetState,
}

/// Body of `POST /servers/{id}/action`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ServerAction {
    #[serde(rename = "os-resetState")]
    ResetState(ResetStateRequest),
    #[serde(rename = "rebuild")]
    Rebuild(RebuildRequest),
    #[serde(rename = "injectNetworkInfo")]
    InjectNetworkInfo(()),
}

impl ServerAction {
    pub fn reset_state(state: ResetState) -> Self {
        Self::ResetState(ResetStateRequest { state })
    }

    pub fn rebuild(image_ref: ImageId) -> Self {
        Self::Rebuild(RebuildRequest::new(image_ref))
    }

    pub fn inject_network_info() -> Self {
        Self::InjectNetworkInfo(())
    }

    /// Action name as it appears on the wire.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::ResetState(_) => "os-resetState",
            Self::Rebuild(_) => "rebuild",
            Self::InjectNetworkInfo(_) => "injectNetworkInfo",
        }
    }
}
