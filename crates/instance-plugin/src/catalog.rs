//! Catalog validation
//!
//! Resolves the human-friendly appliance, datacenter and size selectors of a
//! provisioning request into the provider's canonical ids.

use crate::error::{InstanceError, Result};
use crate::provider::ServerApi;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Appliance used when the request names none
pub const DEFAULT_APPLIANCE: &str = "ubuntu1404-64std";

/// Datacenter used when the request names none
pub const DEFAULT_DATACENTER: &str = "US";

/// Fixed-instance size used when the request names none
pub const DEFAULT_FIXED_SIZE: &str = "M";

/// Unvalidated provisioning request payload
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProvisioningRequest {
    #[serde(rename = "Appliance")]
    pub appliance: Option<String>,

    #[serde(rename = "Datacenter")]
    pub datacenter: Option<String>,

    #[serde(rename = "FixedServerSize")]
    pub fixed_server_size: Option<String>,

    #[serde(rename = "Password")]
    pub password: Option<String>,

    #[serde(rename = "SSHKey")]
    pub ssh_key: Option<String>,

    #[serde(rename = "SSHKeyPath")]
    pub ssh_key_path: Option<PathBuf>,

    #[serde(rename = "FirewallID")]
    pub firewall_id: Option<String>,

    #[serde(rename = "LoadBalancerID")]
    pub load_balancer_id: Option<String>,

    #[serde(rename = "MonitorPolicyID")]
    pub monitor_policy_id: Option<String>,
}

impl ProvisioningRequest {
    pub fn from_json(payload: &str) -> Result<Self> {
        Ok(serde_json::from_str(payload)?)
    }

    pub fn from_value(payload: serde_json::Value) -> Result<Self> {
        Ok(serde_json::from_value(payload)?)
    }
}

/// Validated, provider-canonical provisioning properties
#[derive(Clone, PartialEq, Eq)]
pub struct ResolvedProperties {
    pub appliance_id: String,
    pub datacenter_id: String,
    pub fixed_size_id: String,
    pub password: Option<String>,
    pub ssh_key: Option<String>,
    pub firewall_id: Option<String>,
    pub load_balancer_id: Option<String>,
    pub monitor_policy_id: Option<String>,
}

const REDACTED: &str = "<redacted>";

fn redact(secret: &Option<impl AsRef<str>>) -> Option<&'static str> {
    secret
        .as_ref()
        .filter(|s| !s.as_ref().is_empty())
        .map(|_| REDACTED)
}

// Credentials never reach the logs.
impl fmt::Debug for ProvisioningRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProvisioningRequest")
            .field("appliance", &self.appliance)
            .field("datacenter", &self.datacenter)
            .field("fixed_server_size", &self.fixed_server_size)
            .field("password", &redact(&self.password))
            .field("ssh_key", &redact(&self.ssh_key))
            .field("ssh_key_path", &self.ssh_key_path)
            .field("firewall_id", &self.firewall_id)
            .field("load_balancer_id", &self.load_balancer_id)
            .field("monitor_policy_id", &self.monitor_policy_id)
            .finish()
    }
}

impl fmt::Debug for ResolvedProperties {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolvedProperties")
            .field("appliance_id", &self.appliance_id)
            .field("datacenter_id", &self.datacenter_id)
            .field("fixed_size_id", &self.fixed_size_id)
            .field("password", &redact(&self.password))
            .field("ssh_key", &redact(&self.ssh_key))
            .field("firewall_id", &self.firewall_id)
            .field("load_balancer_id", &self.load_balancer_id)
            .field("monitor_policy_id", &self.monitor_policy_id)
            .finish()
    }
}

/// Resolves request selectors against the remote catalogs
pub struct CatalogValidator<'a> {
    api: &'a dyn ServerApi,
}

impl<'a> CatalogValidator<'a> {
    pub fn new(api: &'a dyn ServerApi) -> Self {
        Self { api }
    }

    /// Resolve appliance, datacenter and size in that order, stopping at the
    /// first failure.
    pub async fn validate(&self, request: &ProvisioningRequest) -> Result<ResolvedProperties> {
        let appliance_id = self.resolve_appliance(request.appliance.as_deref()).await?;
        let datacenter_id = self.resolve_datacenter(request.datacenter.as_deref()).await?;
        let fixed_size_id = self
            .resolve_fixed_size(request.fixed_server_size.as_deref())
            .await?;

        let resolved = ResolvedProperties {
            appliance_id,
            datacenter_id,
            fixed_size_id,
            password: non_blank(request.password.as_deref()),
            ssh_key: resolve_ssh_key(request).await,
            firewall_id: non_blank(request.firewall_id.as_deref()),
            load_balancer_id: non_blank(request.load_balancer_id.as_deref()),
            monitor_policy_id: non_blank(request.monitor_policy_id.as_deref()),
        };

        tracing::debug!(
            appliance = %resolved.appliance_id,
            datacenter = %resolved.datacenter_id,
            size = %resolved.fixed_size_id,
            "Validated instance properties"
        );
        Ok(resolved)
    }

    async fn resolve_appliance(&self, selector: Option<&str>) -> Result<String> {
        let selector = selector_or(selector, DEFAULT_APPLIANCE).to_lowercase();

        let appliances = self
            .api
            .list_appliances(&selector)
            .await
            .map_err(|source| InstanceError::CatalogUnavailable {
                catalog: "server appliance",
                selector: selector.clone(),
                source,
            })?;

        appliances
            .into_iter()
            .filter(|a| !a.id.is_empty())
            .find(|a| same(&selector, &a.name) || same(&selector, &a.id))
            .map(|a| a.id)
            .ok_or(InstanceError::NotFound {
                catalog: "server appliance",
                selector,
            })
    }

    async fn resolve_datacenter(&self, selector: Option<&str>) -> Result<String> {
        let selector = selector_or(selector, DEFAULT_DATACENTER).to_uppercase();

        let datacenters =
            self.api
                .list_datacenters()
                .await
                .map_err(|source| InstanceError::CatalogUnavailable {
                    catalog: "data center",
                    selector: selector.clone(),
                    source,
                })?;

        datacenters
            .into_iter()
            .filter(|d| !d.id.is_empty())
            .find(|d| same(&selector, &d.country_code) || same(&selector, &d.id))
            .map(|d| d.id)
            .ok_or(InstanceError::NotFound {
                catalog: "data center",
                selector,
            })
    }

    async fn resolve_fixed_size(&self, selector: Option<&str>) -> Result<String> {
        let selector = selector_or(selector, DEFAULT_FIXED_SIZE).to_uppercase();

        let sizes =
            self.api
                .list_fixed_sizes()
                .await
                .map_err(|source| InstanceError::CatalogUnavailable {
                    catalog: "fixed-instance size",
                    selector: selector.clone(),
                    source,
                })?;

        sizes
            .into_iter()
            .filter(|s| !s.id.is_empty())
            .find(|s| same(&selector, &s.name) || same(&selector, &s.id))
            .map(|s| s.id)
            .ok_or(InstanceError::NotFound {
                catalog: "fixed-instance size",
                selector,
            })
    }
}

/// Inline key wins; otherwise the key file is read. A failed read or an empty
/// file is logged and leaves the instance without a key.
async fn resolve_ssh_key(request: &ProvisioningRequest) -> Option<String> {
    if let Some(key) = non_blank(request.ssh_key.as_deref()) {
        return Some(key);
    }

    let path = request
        .ssh_key_path
        .as_ref()
        .filter(|p| !p.as_os_str().is_empty())?;

    match tokio::fs::read_to_string(path).await {
        Ok(key) if key.trim().is_empty() => {
            tracing::warn!("SSH key file '{}' is empty, ignoring", path.display());
            None
        }
        Ok(key) => Some(key),
        Err(e) => {
            tracing::error!("Cannot read SSH key from file '{}': {}", path.display(), e);
            None
        }
    }
}

fn selector_or<'s>(selector: Option<&'s str>, default: &'s str) -> &'s str {
    selector.map(str::trim).filter(|s| !s.is_empty()).unwrap_or(default)
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value.filter(|v| !v.is_empty()).map(str::to_string)
}

fn same(a: &str, b: &str) -> bool {
    a.to_lowercase() == b.to_lowercase()
}
