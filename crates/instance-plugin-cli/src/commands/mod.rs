pub mod describe;
pub mod destroy;
pub mod provision;
pub mod validate;
pub mod version;

use std::collections::BTreeMap;

/// Parse a `key=value` tag argument
pub fn parse_tag(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("invalid tag '{s}': expected key=value"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("invalid tag '{s}': empty key"));
    }
    Ok((key.to_string(), value.trim().to_string()))
}

pub fn tag_map(tags: &[(String, String)]) -> BTreeMap<String, String> {
    tags.iter().cloned().collect()
}

/// Read properties given inline or as `@path`
pub fn load_properties(arg: &str) -> anyhow::Result<serde_json::Value> {
    let raw = match arg.strip_prefix('@') {
        Some(path) => std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("cannot read properties file '{}': {}", path, e))?,
        None => arg.to_string(),
    };
    serde_json::from_str(&raw).map_err(|e| anyhow::anyhow!("invalid instance properties: {}", e))
}
