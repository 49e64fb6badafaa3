//! `qzctl provision` and `qzctl release`.

use anyhow::Result;
use clap::Args;

use qz_core::QzConfig;
use qzcloud_ecs::HttpEcsClient;
use qzcloud_provision::{ProvisionOrder, Provisioner, release_host};

use super::{open_store, selector};

#[derive(Debug, Args)]
pub struct ProvisionArgs {
    #[arg(short, long)]
    pub line: u64,
    /// Place on this node instead of running selection
    #[arg(long)]
    pub node: Option<u64>,
    #[arg(long)]
    pub cpu: u32,
    /// Memory in MiB
    #[arg(long)]
    pub memory: u64,
    /// System disk in GiB
    #[arg(long)]
    pub disk: u64,
    /// Bandwidth in Mbit/s
    #[arg(long)]
    pub bandwidth: u32,
    /// OS image name
    #[arg(long)]
    pub os: String,
    /// Public IPv4 count; 0 (the default) creates a NAT host
    #[arg(long, default_value = "0")]
    pub ipnum: u32,
    #[arg(long)]
    pub host_name: Option<String>,
    #[arg(long, default_value = "")]
    pub password: String,
    /// Expiry timestamp forwarded to Ecs
    #[arg(long, default_value = "")]
    pub expire: String,
}

impl ProvisionArgs {
    pub fn into_order(self) -> ProvisionOrder {
        let host_name = self
            .host_name
            .unwrap_or_else(|| format!("vps-l{}", self.line));
        ProvisionOrder {
            node_id: self.node,
            host_name,
            cpu: self.cpu,
            memory: self.memory,
            hard_disks: self.disk,
            bandwidth: self.bandwidth,
            ipnum: self.ipnum,
            os_name: self.os,
            os_password: self.password.clone(),
            vnc_password: self.password,
            end_time: self.expire,
            ..ProvisionOrder::on_line(self.line)
        }
    }
}

pub async fn provision(config: &QzConfig, args: ProvisionArgs) -> Result<()> {
    let ecs = HttpEcsClient::from_config(config.require_ecs("provision")?)?;
    let store = open_store(config)?;
    let selector = selector(config, &store, Some(ecs.clone()))?;
    let provisioner = Provisioner::new(store, selector, ecs, config.selector.reserve);

    match provisioner.provision(&args.into_order()).await {
        Ok(outcome) => {
            println!(
                "Provisioned host {} on node {} ({}), ecs id {}",
                outcome.host.id, outcome.node.id, outcome.node.name, outcome.ecs_host_id
            );
            Ok(())
        }
        Err(e) if e.is_no_capacity() => {
            println!("No nodes available");
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}

pub fn release(config: &QzConfig, host_id: u64) -> Result<()> {
    let store = open_store(config)?;
    let host = release_host(&store, host_id)?;
    println!("Released host {} on node {}", host.id, host.node_id);
    Ok(())
}
