//! Cloud server instance plugin
//!
//! Manages the lifecycle of cloud server instances on behalf of an external
//! orchestrator: validates provisioning requests against the provider's
//! catalogs, creates servers, and records one descriptor file per instance so
//! that instances can be found again after a restart.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────┐
//! │                  Orchestrator                   │
//! │     validate / provision / destroy / describe   │
//! └─────────────────┬───────────────────────────────┘
//!                   │
//! ┌─────────────────▼───────────────────────────────┐
//! │               instance-plugin                   │
//! │  ┌──────────────────────────────────────────┐   │
//! │  │              Provisioner                 │   │
//! │  └──────────────────────────────────────────┘   │
//! │  ┌──────────────────┐  ┌──────────────────┐     │
//! │  │ CatalogValidator │  │   StateStore     │     │
//! │  └──────────────────┘  └──────────────────┘     │
//! └───────┬──────────────────────────┬──────────────┘
//!         │                          │
//! ┌───────▼───────┐          ┌───────▼───────┐
//! │  ServerApi    │          │ <id>.1and1    │
//! │ (1&1 client)  │          │   .spec files │
//! └───────────────┘          └───────────────┘
//! ```

pub mod catalog;
pub mod config;
pub mod error;
pub mod instance;
pub mod provider;
pub mod provisioner;
pub mod store;

// Re-exports
pub use catalog::{CatalogValidator, ProvisioningRequest, ResolvedProperties};
pub use config::{PluginConfig, WaitConfig};
pub use error::{InstanceError, ProviderError, Result, StoreError};
pub use instance::{InstanceDescription, InstanceId, InstanceSpec, LogicalId, SERVER_ID_TAG};
pub use provider::{
    Appliance, Datacenter, FixedSize, Hardware, ProviderResult, Server, ServerApi, ServerIp,
    ServerRequest, ServerStatus,
};
pub use provisioner::{ProvisionState, Provisioner};
pub use store::{FsStore, MemoryStore, StateStore};
