use super::{load_properties, tag_map};
use colored::Colorize;
use instance_plugin::{InstanceSpec, Provisioner};

pub async fn handle(
    provisioner: &Provisioner,
    properties: &str,
    tags: &[(String, String)],
) -> anyhow::Result<()> {
    let payload = load_properties(properties)?;

    eprintln!("{}", "Validating instance properties...".blue());
    let resolved = provisioner.validate(&payload).await?;

    let spec = InstanceSpec {
        properties: Some(payload),
        tags: tag_map(tags),
    };

    eprintln!("{}", "Provisioning server...".yellow());
    let id = provisioner.provision(&resolved, &spec).await?;

    eprintln!("{} {}", "✓ Provisioned".green(), id.to_string().cyan());
    println!("{id}");
    Ok(())
}
