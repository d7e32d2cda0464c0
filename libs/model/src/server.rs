//! Server representations.
//!
//! The same server is rendered differently depending on the call, the
//! caller's role and the microversion:
//!
//! - list (brief): [`ServerSummary`]
//! - show, list (detail), and update/rebuild from 2.75: [`Server`] with the
//!   `OS-EXT-*` attributes (`OS-EXT-SRV-ATTR:*` only for admins)
//! - update/rebuild before 2.75: [`Server`] without `OS-EXT-*` attributes
//! - create: [`CreatedServer`]

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use computest_id::{FlavorId, ImageId, ProjectId, ServerId, UserId};
use serde::{Deserialize, Serialize};

use crate::ServerStatus;

/// A hypermedia link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    pub href: String,
    pub rel: String,
}

impl Link {
    pub fn new(href: impl Into<String>, rel: impl Into<String>) -> Self {
        Self {
            href: href.into(),
            rel: rel.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRef {
    pub id: ImageId,
    #[serde(default)]
    pub links: Vec<Link>,
}

/// `image` is an object for image-backed servers and `""` for
/// volume-backed ones.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ServerImage {
    Image(ImageRef),
    VolumeBacked(String),
}

impl ServerImage {
    pub fn id(&self) -> Option<&ImageId> {
        match self {
            Self::Image(image) => Some(&image.id),
            Self::VolumeBacked(_) => None,
        }
    }
}

/// Flavor as embedded in server bodies from 2.47.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbeddedFlavor {
    pub original_name: String,
    pub vcpus: u32,
    pub ram: u64,
    pub disk: u64,
    pub ephemeral: u64,
    pub swap: u64,
    #[serde(default)]
    pub extra_specs: BTreeMap<String, String>,
}

/// Flavor reference used before 2.47.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlavorLink {
    pub id: FlavorId,
    #[serde(default)]
    pub links: Vec<Link>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ServerFlavor {
    Embedded(EmbeddedFlavor),
    Reference(FlavorLink),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub addr: String,
    pub version: u8,
}

/// `OS-EXT-STS:*` attributes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtendedStatus {
    #[serde(rename = "OS-EXT-STS:task_state")]
    pub task_state: Option<String>,
    #[serde(rename = "OS-EXT-STS:vm_state")]
    pub vm_state: String,
    #[serde(rename = "OS-EXT-STS:power_state")]
    pub power_state: u8,
}

/// Admin-only `OS-EXT-SRV-ATTR:*` attributes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtendedAttributes {
    #[serde(rename = "OS-EXT-SRV-ATTR:host")]
    pub host: Option<String>,
    #[serde(rename = "OS-EXT-SRV-ATTR:hypervisor_hostname")]
    pub hypervisor_hostname: Option<String>,
    #[serde(rename = "OS-EXT-SRV-ATTR:instance_name")]
    pub instance_name: String,
}

/// Detailed server representation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Server {
    pub id: ServerId,
    pub name: String,
    pub status: ServerStatus,
    pub tenant_id: ProjectId,
    pub user_id: UserId,
    pub image: ServerImage,
    pub flavor: ServerFlavor,
    #[serde(rename = "hostId", default)]
    pub host_id: String,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
    #[serde(default)]
    pub addresses: BTreeMap<String, Vec<Address>>,
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
    #[serde(default)]
    pub links: Vec<Link>,
    #[serde(
        rename = "OS-EXT-AZ:availability_zone",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub availability_zone: Option<String>,
    #[serde(flatten)]
    pub extended_status: Option<ExtendedStatus>,
    #[serde(flatten)]
    pub extended_attributes: Option<ExtendedAttributes>,
    #[serde(rename = "adminPass", default, skip_serializing_if = "Option::is_none")]
    pub admin_pass: Option<String>,
}

impl Server {
    pub fn image_id(&self) -> Option<&ImageId> {
        self.image.id()
    }

    /// `OS-EXT-SRV-ATTR:host`, only present for admin callers.
    pub fn host(&self) -> Option<&str> {
        self.extended_attributes
            .as_ref()
            .and_then(|attrs| attrs.host.as_deref())
    }

    /// `OS-EXT-STS:task_state`; `None` both when no task is running and
    /// when the attribute isn't rendered.
    pub fn task_state(&self) -> Option<&str> {
        self.extended_status
            .as_ref()
            .and_then(|sts| sts.task_state.as_deref())
    }
}

/// Brief server representation returned by `GET /servers`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerSummary {
    pub id: ServerId,
    pub name: String,
    #[serde(default)]
    pub links: Vec<Link>,
}

/// Body of a `202 Accepted` create response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedServer {
    pub id: ServerId,
    #[serde(default)]
    pub links: Vec<Link>,
    #[serde(rename = "adminPass", default, skip_serializing_if = "Option::is_none")]
    pub admin_pass: Option<String>,
}

/// `{"server": ...}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerEnvelope<T> {
    pub server: T,
}

/// `{"servers": [...]}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServersEnvelope<T> {
    pub servers: Vec<T>,
    #[serde(rename = "servers_links", default, skip_serializing_if = "Vec::is_empty")]
    pub links: Vec<Link>,
}
