//! qzctl: operator CLI for qzcloud node placement.
//!
//! ```text
//! qzctl --config qzcloud.toml seed inventory.toml
//! qzctl select --line 3
//! qzctl provision --line 3 --cpu 2 --memory 2048 --disk 40 --bandwidth 5 --os debian-12
//! ```

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "qzctl",
    about = "qzcloud: capacity-aware VPS node placement",
    version,
    propagate_version = true,
)]
struct Cli {
    /// Path to qzcloud.toml. Defaults apply when the file does not exist.
    #[arg(short, long, global = true, default_value = "qzcloud.toml")]
    config: PathBuf,

    /// Override `store.path` from the config file.
    #[arg(long, global = true)]
    store: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load areas, lines, nodes and hosts from an inventory TOML file
    Seed {
        /// Inventory file with [[areas]], [[lines]], [[nodes]], [[hosts]]
        file: PathBuf,
    },
    /// List the lines open for provisioning
    Lines {
        /// Include inactive lines
        #[arg(long)]
        all: bool,
    },
    /// List the nodes of a line with their current load
    Nodes {
        #[arg(short, long)]
        line: u64,
    },
    /// Run node selection for a line without creating anything
    Select {
        #[arg(short, long)]
        line: u64,
        /// Print the selected node as JSON
        #[arg(long)]
        json: bool,
    },
    /// Place a host and create it through the Ecs API
    Provision(commands::provision::ProvisionArgs),
    /// Mark a host removed, freeing its slot
    Release {
        #[arg(long)]
        host: u64,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,qzctl=debug,qzcloud=debug".into()),
        )
        .init();

    let cli = Cli::parse();
    let config = commands::load_config(&cli.config, cli.store.as_deref())?;

    match cli.command {
        Commands::Seed { file } => commands::inventory::seed(&config, &file),
        Commands::Lines { all } => commands::query::lines(&config, all),
        Commands::Nodes { line } => commands::query::nodes(&config, line),
        Commands::Select { line, json } => commands::query::select(&config, line, json).await,
        Commands::Provision(args) => commands::provision::provision(&config, args).await,
        Commands::Release { host } => commands::provision::release(&config, host),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn config_flag_is_global() {
        let cli = Cli::try_parse_from(["qzctl", "lines", "--config", "/etc/qz.toml"]).unwrap();
        assert_eq!(cli.config, PathBuf::from("/etc/qz.toml"));
        assert!(matches!(cli.command, Commands::Lines { all: false }));
    }

    #[test]
    fn lines_all_flag() {
        let cli = Cli::try_parse_from(["qzctl", "lines", "--all"]).unwrap();
        assert!(matches!(cli.command, Commands::Lines { all: true }));
    }

    #[test]
    fn select_requires_line() {
        assert!(Cli::try_parse_from(["qzctl", "select"]).is_err());
        let cli = Cli::try_parse_from(["qzctl", "select", "--line", "3", "--json"]).unwrap();
        assert!(matches!(cli.command, Commands::Select { line: 3, json: true }));
    }

    #[test]
    fn provision_parses_shape() {
        let cli = Cli::try_parse_from([
            "qzctl", "provision", "--line", "3", "--node", "9", "--cpu", "2", "--memory", "2048",
            "--disk", "40", "--bandwidth", "5", "--os", "debian-12", "--ipnum", "0",
        ])
        .unwrap();
        let Commands::Provision(args) = cli.command else {
            panic!("expected provision");
        };
        assert_eq!(args.line, 3);
        assert_eq!(args.node, Some(9));
        assert_eq!(args.ipnum, 0);
    }

    #[test]
    fn provision_defaults_to_nat() {
        let cli = Cli::try_parse_from([
            "qzctl", "provision", "--line", "3", "--cpu", "1", "--memory", "1024", "--disk", "20",
            "--bandwidth", "1", "--os", "debian-12",
        ])
        .unwrap();
        let Commands::Provision(args) = cli.command else {
            panic!("expected provision");
        };
        assert_eq!(args.ipnum, 0);
        assert_eq!(args.into_order().ipnum, 0);
    }
}
