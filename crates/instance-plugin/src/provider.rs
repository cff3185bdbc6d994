//! Remote provider capability
//!
//! The provider owns every remote server resource. The core only asks it to
//! list catalogs and to create, read, list or delete servers.

use crate::error::ProviderError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub type ProviderResult<T> = std::result::Result<T, ProviderError>;

/// Cloud server API abstraction
///
/// Implemented by the concrete REST client and by test fakes.
#[async_trait]
pub trait ServerApi: Send + Sync {
    /// List server appliances (OS images) whose name or id contains `filter`
    async fn list_appliances(&self, filter: &str) -> ProviderResult<Vec<Appliance>>;

    /// List all datacenters
    async fn list_datacenters(&self) -> ProviderResult<Vec<Datacenter>>;

    /// List the fixed-instance sizes
    async fn list_fixed_sizes(&self) -> ProviderResult<Vec<FixedSize>>;

    /// Create a server, returning the provider request id and the new server
    async fn create_server(&self, request: &ServerRequest) -> ProviderResult<(String, Server)>;

    /// Fetch a server by its provider id
    async fn get_server(&self, id: &str) -> ProviderResult<Server>;

    /// List servers matching a free-text filter
    async fn list_servers(&self, filter: &str) -> ProviderResult<Vec<Server>>;

    /// Delete a server, optionally keeping its IP addresses
    async fn delete_server(&self, id: &str, keep_ips: bool) -> ProviderResult<Server>;

    /// Poll a server until it reports `state`
    ///
    /// Fails with [`ProviderError::Timeout`] once `max_attempts` polls are used up.
    async fn wait_for_state(
        &self,
        server: &Server,
        state: &str,
        interval: Duration,
        max_attempts: u32,
    ) -> ProviderResult<()> {
        for attempt in 1..=max_attempts {
            let current = self.get_server(&server.id).await?;
            if current.is_in_state(state) {
                tracing::debug!(server_id = %server.id, attempt, "server reached {}", state);
                return Ok(());
            }
            tracing::debug!(
                server_id = %server.id,
                attempt,
                current = current.state().unwrap_or("unknown"),
                "waiting for {}",
                state
            );
            if attempt < max_attempts {
                tokio::time::sleep(interval).await;
            }
        }

        Err(ProviderError::Timeout(format!(
            "server '{}' did not reach {} after {} attempts",
            server.id, state, max_attempts
        )))
    }
}

/// Server appliance catalog entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Appliance {
    pub id: String,
    pub name: String,
}

/// Datacenter catalog entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Datacenter {
    pub id: String,
    pub country_code: String,
}

/// Fixed-instance size catalog entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixedSize {
    pub id: String,
    pub name: String,
}

/// Remote server resource
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Server {
    pub id: String,

    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub status: Option<ServerStatus>,

    #[serde(default)]
    pub ips: Option<Vec<ServerIp>>,
}

impl Server {
    /// The first assigned IP address
    pub fn primary_ip(&self) -> Option<&str> {
        self.ips
            .as_ref()?
            .first()
            .map(|ip| ip.ip.as_str())
            .filter(|ip| !ip.is_empty())
    }

    pub fn state(&self) -> Option<&str> {
        self.status.as_ref().map(|s| s.state.as_str())
    }

    pub fn is_in_state(&self, state: &str) -> bool {
        self.state() == Some(state)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerStatus {
    pub state: String,

    #[serde(default)]
    pub percent: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerIp {
    #[serde(default)]
    pub id: String,
    pub ip: String,
}

/// Server creation request
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerRequest {
    pub name: String,

    pub appliance_id: String,

    pub datacenter_id: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,

    #[serde(rename = "rsa_key", skip_serializing_if = "Option::is_none")]
    pub ssh_key: Option<String>,

    pub power_on: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub firewall_policy_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub load_balancer_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub monitoring_policy_id: Option<String>,

    pub hardware: Hardware,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hardware {
    pub fixed_instance_size_id: String,
}
