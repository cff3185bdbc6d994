mod commands;

use clap::{Parser, Subcommand};
use instance_plugin::config::{API_KEY_ENV, default_state_dir, resolve_api_key};
use instance_plugin::{FsStore, PluginConfig, Provisioner, WaitConfig};
use instance_plugin_oneandone::{BASE_URL, OneAndOneProvider};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "instance-1and1")]
#[command(about = "1&1 Cloud Server instance plugin", long_about = None)]
struct Cli {
    /// 1&1 API access key
    #[arg(long, env = API_KEY_ENV, hide_env_values = true, global = true)]
    api_key: Option<String>,

    /// Existing directory for storing the plugin files
    #[arg(long, default_value_os_t = default_state_dir(), global = true)]
    dir: PathBuf,

    /// 1&1 API endpoint
    #[arg(long, default_value = BASE_URL, global = true, hide = true)]
    endpoint: String,

    /// Do not wait for created servers to power on
    #[arg(long, global = true)]
    no_wait: bool,

    /// Logging level. 0 is least verbose. Max is 5
    #[arg(long, default_value_t = 4, global = true)]
    log: u8,

    /// Plugin name to advertise for discovery
    #[arg(long, default_value = "instance-1and1", global = true)]
    name: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate instance properties against the 1&1 catalogs
    Validate {
        /// Properties as inline JSON, or @path to a JSON file
        properties: String,
    },
    /// Provision a new server instance
    Provision {
        /// Properties as inline JSON, or @path to a JSON file
        #[arg(short, long, default_value = "{}")]
        properties: String,
        /// Instance tag (key=value), repeatable
        #[arg(short, long = "tag", value_parser = commands::parse_tag)]
        tags: Vec<(String, String)>,
    },
    /// Destroy a server instance
    Destroy {
        /// Instance id (instance-<n>)
        id: String,
    },
    /// Describe all recorded instances
    Describe {
        /// Tag filter (key=value), handed to the orchestrator untouched
        #[arg(short, long = "tag", value_parser = commands::parse_tag)]
        tags: Vec<(String, String)>,
    },
    /// Print build version information
    Version,
}

fn log_filter(level: u8) -> &'static str {
    match level {
        0..=2 => "error",
        3 => "warn",
        4 => "info",
        _ => "debug",
    }
}

fn build_provisioner(cli: &Cli) -> Provisioner {
    let api_key = resolve_api_key(cli.api_key.as_deref());
    let wait = if cli.no_wait {
        WaitConfig::disabled()
    } else {
        WaitConfig::default()
    };
    let config = PluginConfig::new(api_key.clone(), &cli.dir).with_wait(wait);

    Provisioner::new(
        Arc::new(OneAndOneProvider::with_base_url(
            api_key.unwrap_or_default(),
            cli.endpoint.clone(),
        )),
        Arc::new(FsStore::new(&cli.dir)),
        config,
    )
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_filter(cli.log))),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Version => commands::version::handle(&cli.name)?,
        Commands::Validate { ref properties } => {
            commands::validate::handle(&build_provisioner(&cli), properties).await?;
        }
        Commands::Provision {
            ref properties,
            ref tags,
        } => {
            commands::provision::handle(&build_provisioner(&cli), properties, tags).await?;
        }
        Commands::Destroy { ref id } => {
            commands::destroy::handle(&build_provisioner(&cli), id).await?;
        }
        Commands::Describe { ref tags } => {
            commands::describe::handle(&build_provisioner(&cli), tags).await?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_log_levels() {
        assert_eq!(log_filter(0), "error");
        assert_eq!(log_filter(3), "warn");
        assert_eq!(log_filter(4), "info");
        assert_eq!(log_filter(5), "debug");
        assert_eq!(log_filter(9), "debug");
    }
}
