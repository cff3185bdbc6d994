use super::tag_map;
use instance_plugin::Provisioner;

pub async fn handle(provisioner: &Provisioner, tags: &[(String, String)]) -> anyhow::Result<()> {
    let instances = provisioner.describe_instances(&tag_map(tags)).await?;
    println!("{}", serde_json::to_string_pretty(&instances)?);
    Ok(())
}
