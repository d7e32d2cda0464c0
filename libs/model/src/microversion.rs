//! Microversion negotiation.
//!
//! The compute API versions individual behaviors with `major.minor`
//! microversions. Callers request one through the `OpenStack-API-Version`
//! header (or the legacy `X-OpenStack-Nova-API-Version`); without a header
//! the service answers at its minimum, 2.1.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::ModelError;

/// Header carrying the requested microversion, e.g. `compute 2.75`.
pub const API_VERSION_HEADER: &str = "OpenStack-API-Version";

/// Legacy header carrying only the version number.
pub const LEGACY_VERSION_HEADER: &str = "X-OpenStack-Nova-API-Version";

/// Service type prefix used in [`API_VERSION_HEADER`].
pub const SERVICE_TYPE: &str = "compute";

/// A `major.minor` API microversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Microversion {
    major: u16,
    minor: u16,
}

impl Microversion {
    /// Base version served when no header is sent.
    pub const V2_1: Self = Self::new(2, 1);
    /// Last version where an unknown status filter yields an empty list.
    pub const V2_37: Self = Self::new(2, 37);
    /// First version where an unknown status filter is a bad request.
    pub const V2_38: Self = Self::new(2, 38);
    /// First version embedding the flavor description in server bodies.
    pub const V2_47: Self = Self::new(2, 47);
    /// First version returning the full server representation from update
    /// and rebuild.
    pub const V2_75: Self = Self::new(2, 75);

    pub const fn new(major: u16, minor: u16) -> Self {
        Self { major, minor }
    }

    pub const fn major(&self) -> u16 {
        self.major
    }

    pub const fn minor(&self) -> u16 {
        self.minor
    }

    /// Parses `"2.75"`.
    pub fn parse(s: &str) -> Result<Self, ModelError> {
        let invalid = || ModelError::InvalidMicroversion(s.to_string());
        let (major, minor) = s.trim().split_once('.').ok_or_else(invalid)?;
        let major = major.parse().map_err(|_| invalid())?;
        let minor = minor.parse().map_err(|_| invalid())?;
        if major == 0 {
            return Err(invalid());
        }
        Ok(Self { major, minor })
    }

    /// Value for [`API_VERSION_HEADER`].
    pub fn header_value(&self) -> String {
        format!("{SERVICE_TYPE} {self}")
    }

    /// True when a request at `self` still gets the behavior that was
    /// current up to and including `max_version`.
    pub fn is_compatible_with(&self, max_version: Microversion) -> bool {
        *self <= max_version
    }
}

impl fmt::Display for Microversion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

impl FromStr for Microversion {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for Microversion {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Microversion {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}

/// What a caller asked for in a version header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestedVersion {
    Exact(Microversion),
    Latest,
}

impl RequestedVersion {
    /// Parses the value of [`API_VERSION_HEADER`] (`compute 2.75`,
    /// `compute latest`). Headers naming other services yield `None`.
    pub fn from_api_version_header(value: &str) -> Result<Option<Self>, ModelError> {
        let mut parts = value.split_whitespace();
        let (Some(service), Some(version), None) = (parts.next(), parts.next(), parts.next())
        else {
            return Err(ModelError::InvalidVersionHeader(value.to_string()));
        };
        if !service.eq_ignore_ascii_case(SERVICE_TYPE) {
            return Ok(None);
        }
        Self::parse_version(version).map(Some)
    }

    /// Parses the value of [`LEGACY_VERSION_HEADER`] (`2.75`, `latest`).
    pub fn from_legacy_header(value: &str) -> Result<Self, ModelError> {
        Self::parse_version(value.trim())
    }

    fn parse_version(version: &str) -> Result<Self, ModelError> {
        if version.eq_ignore_ascii_case("latest") {
            Ok(Self::Latest)
        } else {
            Microversion::parse(version).map(Self::Exact)
        }
    }
}

/// Upper bound of a configured microversion range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VersionBound {
    Version(Microversion),
    #[default]
    Latest,
}

impl VersionBound {
    /// True if `version` does not exceed this bound.
    pub fn admits(&self, version: Microversion) -> bool {
        match self {
            Self::Version(max) => version <= *max,
            Self::Latest => true,
        }
    }
}

impl fmt::Display for VersionBound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Version(v) => v.fmt(f),
            Self::Latest => f.write_str("latest"),
        }
    }
}

impl FromStr for VersionBound {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("latest") {
            Ok(Self::Latest)
        } else {
            Microversion::parse(s).map(Self::Version)
        }
    }
}

impl Serialize for VersionBound {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for VersionBound {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// A microversion range, as configured for a deployment or declared by a
/// group of checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MicroversionRange {
    pub min: Option<Microversion>,
    pub max: VersionBound,
}

impl MicroversionRange {
    pub fn new(min: Option<Microversion>, max: VersionBound) -> Self {
        Self { min, max }
    }

    /// Range starting at `min` with no upper bound.
    pub fn at_least(min: Microversion) -> Self {
        Self {
            min: Some(min),
            max: VersionBound::Latest,
        }
    }

    /// True if both ranges share at least one version.
    pub fn overlaps(&self, other: &MicroversionRange) -> bool {
        let lower = self.min.max(other.min).unwrap_or(Microversion::V2_1);
        self.max.admits(lower) && other.max.admits(lower)
    }

    /// The version a group of checks declaring `self` should request from a
    /// deployment configured with `deployment`: the higher of the two
    /// minimums, or `None` (no header) when neither has one.
    pub fn select_request(&self, deployment: &MicroversionRange) -> Option<Microversion> {
        self.min.max(deployment.min)
    }
}
