use colored::Colorize;
use instance_plugin::{InstanceId, Provisioner};

pub async fn handle(provisioner: &Provisioner, id: &str) -> anyhow::Result<()> {
    let id = InstanceId::new(id);

    eprintln!("{} {}", "Destroying".yellow(), id.to_string().cyan());
    provisioner.destroy(&id).await?;

    eprintln!("{}", "✓ Destroyed".green());
    Ok(())
}
