//! Server status values.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ModelError;

/// Externally visible server status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ServerStatus {
    Active,
    Build,
    Deleted,
    Error,
    HardReboot,
    Migrating,
    Password,
    Paused,
    Reboot,
    Rebuild,
    Rescue,
    Resize,
    RevertResize,
    Shelved,
    ShelvedOffloaded,
    Shutoff,
    SoftDeleted,
    Suspended,
    Unknown,
    VerifyResize,
}

impl ServerStatus {
    pub const ALL: [ServerStatus; 20] = [
        Self::Active,
        Self::Build,
        Self::Deleted,
        Self::Error,
        Self::HardReboot,
        Self::Migrating,
        Self::Password,
        Self::Paused,
        Self::Reboot,
        Self::Rebuild,
        Self::Rescue,
        Self::Resize,
        Self::RevertResize,
        Self::Shelved,
        Self::ShelvedOffloaded,
        Self::Shutoff,
        Self::SoftDeleted,
        Self::Suspended,
        Self::Unknown,
        Self::VerifyResize,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "ACTIVE",
            Self::Build => "BUILD",
            Self::Deleted => "DELETED",
            Self::Error => "ERROR",
            Self::HardReboot => "HARD_REBOOT",
            Self::Migrating => "MIGRATING",
            Self::Password => "PASSWORD",
            Self::Paused => "PAUSED",
            Self::Reboot => "REBOOT",
            Self::Rebuild => "REBUILD",
            Self::Rescue => "RESCUE",
            Self::Resize => "RESIZE",
            Self::RevertResize => "REVERT_RESIZE",
            Self::Shelved => "SHELVED",
            Self::ShelvedOffloaded => "SHELVED_OFFLOADED",
            Self::Shutoff => "SHUTOFF",
            Self::SoftDeleted => "SOFT_DELETED",
            Self::Suspended => "SUSPENDED",
            Self::Unknown => "UNKNOWN",
            Self::VerifyResize => "VERIFY_RESIZE",
        }
    }

    /// The `OS-EXT-STS:vm_state` backing this status.
    pub const fn vm_state(&self) -> &'static str {
        match self {
            Self::Active
            | Self::HardReboot
            | Self::Migrating
            | Self::Password
            | Self::Reboot
            | Self::Rebuild
            | Self::Resize
            | Self::RevertResize => "active",
            Self::Build => "building",
            Self::Deleted => "deleted",
            Self::Error => "error",
            Self::Paused => "paused",
            Self::Rescue => "rescued",
            Self::Shelved => "shelved",
            Self::ShelvedOffloaded => "shelved_offloaded",
            Self::Shutoff => "stopped",
            Self::SoftDeleted => "soft-delete",
            Self::Suspended => "suspended",
            Self::Unknown => "unknown",
            Self::VerifyResize => "resized",
        }
    }

    /// The `OS-EXT-STS:power_state` code reported alongside this status.
    pub const fn power_state(&self) -> u8 {
        match self {
            Self::Active
            | Self::HardReboot
            | Self::Migrating
            | Self::Password
            | Self::Reboot
            | Self::Rescue
            | Self::Resize
            | Self::RevertResize
            | Self::VerifyResize => 1,
            Self::Paused => 3,
            Self::Shutoff | Self::Shelved | Self::Deleted | Self::SoftDeleted => 4,
            Self::Suspended => 7,
            Self::Build | Self::Error | Self::Rebuild | Self::ShelvedOffloaded | Self::Unknown => {
                0
            }
        }
    }
}

impl fmt::Display for ServerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ServerStatus {
    type Err = ModelError;

    /// Case-insensitive, as list filters accept `status=error`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ModelError::InvalidStatus(s.to_string()))
    }
}
