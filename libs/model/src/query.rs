//! Query-string filters for `GET /servers` and `GET /servers/detail`.

use serde::{Deserialize, Serialize};

use crate::ModelError;

/// List filters. Unset keys are left out of the query string.
///
/// `tenant_id` and `host` are admin filters; the service only honors
/// `tenant_id` together with `all_tenants`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListServersQuery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tenant_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub all_tenants: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flavor: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl ListServersQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }

    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    pub fn tenant_id(mut self, tenant_id: impl Into<String>) -> Self {
        self.tenant_id = Some(tenant_id.into());
        self
    }

    /// Sets `all_tenants`. The service reads an empty value as true.
    pub fn all_tenants(mut self, value: impl Into<String>) -> Self {
        self.all_tenants = Some(value.into());
        self
    }

    pub fn image(mut self, image: impl Into<String>) -> Self {
        self.image = Some(image.into());
        self
    }

    pub fn flavor(mut self, flavor: impl Into<String>) -> Self {
        self.flavor = Some(flavor.into());
        self
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Interprets `all_tenants`: absent is false, present-but-empty is true.
    pub fn all_tenants_flag(&self) -> Result<bool, ModelError> {
        match &self.all_tenants {
            None => Ok(false),
            Some(value) => parse_flag(value),
        }
    }
}

/// Boolean query values: empty, `1/t/true/on/y/yes` are true and
/// `0/f/false/off/n/no` are false, case-insensitively.
pub fn parse_flag(value: &str) -> Result<bool, ModelError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "" | "1" | "t" | "true" | "on" | "y" | "yes" => Ok(true),
        "0" | "f" | "false" | "off" | "n" | "no" => Ok(false),
        _ => Err(ModelError::InvalidBool(value.to_string())),
    }
}
