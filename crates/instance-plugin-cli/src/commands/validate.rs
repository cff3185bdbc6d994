use super::load_properties;
use colored::Colorize;
use instance_plugin::Provisioner;

pub async fn handle(provisioner: &Provisioner, properties: &str) -> anyhow::Result<()> {
    let payload = load_properties(properties)?;
    let resolved = provisioner.validate(&payload).await?;

    eprintln!("{}", "✓ Instance properties are valid".green());
    println!("Appliance:       {}", resolved.appliance_id.cyan());
    println!("Datacenter:      {}", resolved.datacenter_id.cyan());
    println!("FixedServerSize: {}", resolved.fixed_size_id.cyan());
    if resolved.ssh_key.is_some() {
        println!("SSHKey:          set");
    }
    Ok(())
}
