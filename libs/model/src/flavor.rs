//! Flavor representation returned by `GET /flavors/{id}`.

use computest_id::FlavorId;
use serde::{Deserialize, Deserializer, Serialize};

use crate::server::Link;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flavor {
    pub id: FlavorId,
    pub name: String,
    pub vcpus: u32,
    pub ram: u64,
    pub disk: u64,
    #[serde(rename = "OS-FLV-EXT-DATA:ephemeral", default)]
    pub ephemeral: u64,
    /// Rendered as `""` for "no swap" before 2.75 and as `0` after.
    #[serde(default, deserialize_with = "swap_from_wire")]
    pub swap: u64,
    #[serde(default)]
    pub links: Vec<Link>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlavorEnvelope {
    pub flavor: Flavor,
}

fn swap_from_wire<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Swap {
        Size(u64),
        Text(String),
    }

    match Swap::deserialize(deserializer)? {
        Swap::Size(size) => Ok(size),
        Swap::Text(text) if text.is_empty() => Ok(0),
        Swap::Text(text) => text.parse().map_err(serde::de::Error::custom),
    }
}
