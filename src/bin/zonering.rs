use std::path::PathBuf;

use clap::{Parser, Subcommand};
use serde_json::json;
use zonering::{config::RingConfig, telemetry::initialize_subscriber, Ring};

#[derive(Debug, Parser)]
#[command(name = "zonering")]
#[command(about = "builds a zone-aware partition ring and inspects key placement", long_about = None)]
struct Cli {
    #[arg(long, default_value = "false")]
    json_logs: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Prints the replica nodes of every provided key
    #[command()]
    Lookup {
        #[arg(long)]
        config_path: PathBuf,
        #[arg(required = true)]
        keys: Vec<String>,
    },
    /// Prints the ring shape and how evenly partitions and nodes are spread
    #[command()]
    Describe {
        #[arg(long)]
        config_path: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    let args = Cli::parse();
    initialize_subscriber(args.json_logs);

    match args.command {
        Commands::Lookup { config_path, keys } => {
            let ring = Ring::from_config(&RingConfig::from_path(config_path)?)?;
            for key in keys {
                let output = json!({
                    "key": key,
                    "partition": ring.primary_partition(&key),
                    "nodes": ring.get_nodes(&key),
                });
                println!("{}", output);
            }
        }
        Commands::Describe { config_path } => {
            let ring = Ring::from_config(&RingConfig::from_path(config_path)?)?;
            let partitions_per_node = ring.partitions_per_node();
            let output = json!({
                "node_count": ring.node_count(),
                "zone_count": ring.zone_count(),
                "partition_count": ring.partition_count(),
                "replica_count": ring.replica_count(),
                "min_partitions_per_node": partitions_per_node.iter().min(),
                "max_partitions_per_node": partitions_per_node.iter().max(),
                "nodes_per_zone": ring.nodes_per_zone(),
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }

    Ok(())
}
