//! 1&1 Cloud Server provider for the instance plugin
//!
//! Implements [`instance_plugin::ServerApi`] on top of the 1&1 Cloud Server
//! REST API.
//!
//! # Example
//!
//! ```ignore
//! use instance_plugin::{FsStore, PluginConfig, Provisioner};
//! use instance_plugin_oneandone::OneAndOneProvider;
//! use std::sync::Arc;
//!
//! let config = PluginConfig::default();
//! let api_key = config.api_key.clone().unwrap_or_default();
//! let provisioner = Provisioner::new(
//!     Arc::new(OneAndOneProvider::new(api_key)),
//!     Arc::new(FsStore::new(&config.state_dir)),
//!     config,
//! );
//!
//! let properties = provisioner.validate(&serde_json::json!({"Datacenter": "DE"})).await?;
//! ```

pub mod client;
pub mod error;
pub mod provider;

pub use client::{BASE_URL, OneAndOneClient};
pub use error::{OneAndOneError, Result};
pub use provider::OneAndOneProvider;
