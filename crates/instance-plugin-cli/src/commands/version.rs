/// Print name, version and source revision as JSON
pub fn handle(name: &str) -> anyhow::Result<()> {
    let info = serde_json::json!({
        "name": name,
        "version": env!("CARGO_PKG_VERSION"),
        "revision": option_env!("GIT_REVISION").unwrap_or("Unspecified"),
    });
    println!("{}", serde_json::to_string_pretty(&info)?);
    Ok(())
}
