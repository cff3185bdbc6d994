//! Instance identity, spec and descriptor types

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Tag carrying the provider's own server id
pub const SERVER_ID_TAG: &str = "serverID";

/// Prefix of every generated instance id
pub const INSTANCE_PREFIX: &str = "instance-";

/// Locally generated instance identifier, also used as the remote server name
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InstanceId(pub String);

impl InstanceId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate `instance-<n>` with a random non-negative 63-bit `n`
    pub fn generate() -> Self {
        let n: i64 = rand::thread_rng().gen_range(0..=i64::MAX);
        Self(format!("{INSTANCE_PREFIX}{n}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for InstanceId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Caller-facing address of an instance (its primary IP)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LogicalId(pub String);

impl fmt::Display for LogicalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// What the orchestrator asks to provision
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InstanceSpec {
    /// Raw provisioning request payload
    #[serde(rename = "Properties", default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<serde_json::Value>,

    /// Caller-supplied tags copied onto the descriptor
    #[serde(rename = "Tags", default)]
    pub tags: BTreeMap<String, String>,
}

impl InstanceSpec {
    pub fn with_tags(tags: BTreeMap<String, String>) -> Self {
        Self {
            properties: None,
            tags,
        }
    }
}

/// Persisted record of one provisioned instance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstanceDescription {
    #[serde(rename = "ID")]
    pub id: InstanceId,

    #[serde(rename = "LogicalID", default, skip_serializing_if = "Option::is_none")]
    pub logical_id: Option<LogicalId>,

    #[serde(rename = "Tags", default)]
    pub tags: BTreeMap<String, String>,
}

impl InstanceDescription {
    /// Provider server id recorded at provisioning time
    pub fn server_id(&self) -> Option<&str> {
        self.tags.get(SERVER_ID_TAG).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_ids() {
        let a = InstanceId::generate();
        let b = InstanceId::generate();

        assert_ne!(a, b);
        let digits = a.as_str().strip_prefix(INSTANCE_PREFIX).unwrap();
        assert!(!digits.is_empty());
        assert!(digits.chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn test_description_json_fields() {
        let desc = InstanceDescription {
            id: InstanceId::new("instance-42"),
            logical_id: Some(LogicalId("11.22.33.44".to_string())),
            tags: BTreeMap::from([
                ("group".to_string(), "test".to_string()),
                (SERVER_ID_TAG.to_string(), "A0B0".to_string()),
            ]),
        };

        let json = serde_json::to_value(&desc).unwrap();
        assert_eq!(json["ID"], "instance-42");
        assert_eq!(json["LogicalID"], "11.22.33.44");
        assert_eq!(json["Tags"]["serverID"], "A0B0");
        assert_eq!(desc.server_id(), Some("A0B0"));
    }

    #[test]
    fn test_description_null_logical_id() {
        let desc: InstanceDescription =
            serde_json::from_str(r#"{"ID": "instance-1", "LogicalID": null, "Tags": {}}"#).unwrap();
        assert_eq!(desc.logical_id, None);
        assert!(desc.tags.is_empty());
    }
}
