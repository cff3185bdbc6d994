//! Instance lifecycle management
//!
//! A provisioning call moves through
//! `Requested -> Creating -> (WaitingReady) -> Persisted`, or ends in `Failed`
//! without writing a descriptor.
//!
//! Known gaps, deliberately left unreconciled:
//! - a descriptor write failing after a successful create leaves the remote
//!   server untracked locally;
//! - destroy and provision racing on the same id are not guarded.

use crate::catalog::{CatalogValidator, ProvisioningRequest, ResolvedProperties};
use crate::config::{PluginConfig, READY_STATE};
use crate::error::{InstanceError, Result, StoreError};
use crate::instance::{InstanceDescription, InstanceId, InstanceSpec, LogicalId, SERVER_ID_TAG};
use crate::provider::{Hardware, ServerApi, ServerRequest};
use crate::store::{StateStore, descriptor_key, descriptor_pattern};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Provisioning progress of a single instance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProvisionState {
    Requested,
    Creating,
    WaitingReady,
    Persisted,
    Failed,
}

impl fmt::Display for ProvisionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProvisionState::Requested => write!(f, "requested"),
            ProvisionState::Creating => write!(f, "creating"),
            ProvisionState::WaitingReady => write!(f, "waiting-ready"),
            ProvisionState::Persisted => write!(f, "persisted"),
            ProvisionState::Failed => write!(f, "failed"),
        }
    }
}

fn transition(id: &InstanceId, state: ProvisionState) {
    tracing::debug!(instance = %id, state = %state, "provision state");
}

/// Cloud server instance provisioner
pub struct Provisioner {
    api: Arc<dyn ServerApi>,
    store: Arc<dyn StateStore>,
    config: PluginConfig,
}

impl Provisioner {
    pub fn new(api: Arc<dyn ServerApi>, store: Arc<dyn StateStore>, config: PluginConfig) -> Self {
        tracing::info!("instance plugin, dir={}", config.state_dir.display());
        Self { api, store, config }
    }

    pub fn config(&self) -> &PluginConfig {
        &self.config
    }

    /// Validate a raw provisioning payload against the remote catalogs
    pub async fn validate(&self, payload: &serde_json::Value) -> Result<ResolvedProperties> {
        if !self.config.has_credentials() {
            return Err(InstanceError::Unconfigured);
        }

        let request = ProvisioningRequest::from_value(payload.clone())?;
        tracing::debug!(?request, "Validate");

        self.validate_request(&request).await
    }

    /// Validate an already parsed provisioning request
    pub async fn validate_request(
        &self,
        request: &ProvisioningRequest,
    ) -> Result<ResolvedProperties> {
        if !self.config.has_credentials() {
            return Err(InstanceError::Unconfigured);
        }

        CatalogValidator::new(self.api.as_ref())
            .validate(request)
            .await
    }

    /// Create a server and record its descriptor, returning the new instance id
    pub async fn provision(
        &self,
        properties: &ResolvedProperties,
        spec: &InstanceSpec,
    ) -> Result<InstanceId> {
        let id = InstanceId::generate();
        transition(&id, ProvisionState::Requested);

        let request = server_request(&id, properties);

        transition(&id, ProvisionState::Creating);
        let (request_id, mut server) = match self.api.create_server(&request).await {
            Ok(created) => created,
            Err(source) => {
                tracing::error!(instance = %id, "Creating server failed");
                transition(&id, ProvisionState::Failed);
                return Err(InstanceError::CreateFailed {
                    name: id.to_string(),
                    source,
                });
            }
        };
        tracing::info!(
            instance = %id,
            server_id = %server.id,
            request_id = %request_id,
            "Server created"
        );

        if self.config.wait.enabled {
            transition(&id, ProvisionState::WaitingReady);
            let wait = &self.config.wait;
            if let Err(e) = self
                .api
                .wait_for_state(&server, READY_STATE, wait.interval, wait.max_attempts)
                .await
            {
                tracing::warn!(instance = %id, "Server is not ready yet, continuing: {}", e);
            }
        }

        if self.config.wait.enabled || server.primary_ip().is_none() {
            server = match self.api.get_server(&server.id).await {
                Ok(server) => server,
                Err(source) => {
                    transition(&id, ProvisionState::Failed);
                    return Err(InstanceError::Remote {
                        operation: "reading created server",
                        target: id.to_string(),
                        source,
                    });
                }
            };
        }

        let mut tags = spec.tags.clone();
        tags.insert(SERVER_ID_TAG.to_string(), server.id.clone());

        let description = InstanceDescription {
            id: id.clone(),
            logical_id: server.primary_ip().map(|ip| LogicalId(ip.to_string())),
            tags,
        };

        if let Err(source) = self.persist(&description).await {
            transition(&id, ProvisionState::Failed);
            return Err(InstanceError::PersistFailed {
                id: id.to_string(),
                source,
            });
        }

        transition(&id, ProvisionState::Persisted);
        Ok(id)
    }

    async fn persist(
        &self,
        description: &InstanceDescription,
    ) -> std::result::Result<(), StoreError> {
        let bytes = serde_json::to_vec_pretty(description).map_err(std::io::Error::other)?;
        self.store
            .write(&descriptor_key(&description.id), &bytes)
            .await
    }

    /// Delete the server named `id` and drop its descriptor
    ///
    /// A server that no longer exists remotely counts as already deleted.
    /// When the remote delete fails the descriptor is kept so the call can be
    /// retried.
    pub async fn destroy(&self, id: &InstanceId) -> Result<()> {
        let servers = self
            .api
            .list_servers(id.as_str())
            .await
            .map_err(|source| InstanceError::Remote {
                operation: "looking up server",
                target: id.to_string(),
                source,
            })?;

        match servers.iter().find(|s| s.name == id.as_str()) {
            Some(server) => {
                if let Err(source) = self.api.delete_server(&server.id, false).await {
                    tracing::error!(instance = %id, "Cannot delete server");
                    return Err(InstanceError::DeleteFailed {
                        id: id.to_string(),
                        source,
                    });
                }
                tracing::info!(instance = %id, server_id = %server.id, "Server deleted");
            }
            None => {
                tracing::warn!(
                    "Server '{}' could not be found, assuming it is already deleted",
                    id
                );
            }
        }

        match self.store.remove(&descriptor_key(id)).await {
            Ok(()) => Ok(()),
            Err(StoreError::NotFound(key)) => {
                tracing::debug!("No descriptor {} to remove", key);
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// List every recorded instance
    ///
    /// `tags` is not applied here; matching descriptors against it is left to
    /// the orchestrator. One unreadable descriptor fails the whole listing.
    pub async fn describe_instances(
        &self,
        tags: &BTreeMap<String, String>,
    ) -> Result<Vec<InstanceDescription>> {
        tracing::debug!("describe-instances {:?}", tags);

        let entries = self.store.list_matching(descriptor_pattern()).await?;

        entries
            .into_iter()
            .map(|(name, bytes)| {
                serde_json::from_slice(&bytes).map_err(|source| {
                    tracing::error!("Instance description unmarshal error in {}", name);
                    InstanceError::CorruptState { name, source }
                })
            })
            .collect()
    }
}

fn server_request(id: &InstanceId, properties: &ResolvedProperties) -> ServerRequest {
    ServerRequest {
        name: id.to_string(),
        appliance_id: properties.appliance_id.clone(),
        datacenter_id: properties.datacenter_id.clone(),
        password: properties.password.clone(),
        ssh_key: properties.ssh_key.clone(),
        power_on: true,
        firewall_policy_id: properties.firewall_id.clone(),
        load_balancer_id: properties.load_balancer_id.clone(),
        monitoring_policy_id: properties.monitor_policy_id.clone(),
        hardware: Hardware {
            fixed_instance_size_id: properties.fixed_size_id.clone(),
        },
    }
}
