//! gangmemd — the gangmem driver binary.
//!
//! Plays the host scheduler around the plugin:
//! - State store (redb) holding units and node snapshots
//! - Plugin construction from `gangmem.toml`
//! - Admission, parallel scoring, normalization and ranking per unit
//!
//! # Usage
//!
//! ```text
//! gangmemd cycle --config gangmem.toml --cluster cluster.toml --unit web-0
//! gangmemd check-config --config gangmem.toml
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use gangmem_core::GangmemConfig;
use gangmem_core::config::LoggingConfig;
use gangmem_plugin::{GangMemPlugin, Handle, PluginArgs};
use gangmem_state::StateStore;
use gangmemd::{ClusterSpec, CycleOutcome, run_cycle};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "gangmemd", about = "gangmem scheduling cycle driver", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run scheduling cycles against a cluster description.
    Cycle {
        /// Plugin and scoring config (defaults apply when omitted).
        #[arg(long)]
        config: Option<PathBuf>,

        /// Cluster description with nodes and units.
        #[arg(long)]
        cluster: PathBuf,

        /// Only schedule this unit (default: every unit in the file).
        #[arg(long)]
        unit: Option<String>,

        /// Persist the store under this directory instead of in memory.
        #[arg(long)]
        data_dir: Option<PathBuf>,
    },
    /// Build the plugin from a config file and report the selected mode.
    CheckConfig {
        #[arg(long)]
        config: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Cycle {
            config,
            cluster,
            unit,
            data_dir,
        } => {
            let config = load_config(config.as_deref())?;
            init_tracing(&config.logging)?;
            run(config, &cluster, unit.as_deref(), data_dir).await
        }
        Command::CheckConfig { config } => {
            let config = load_config(Some(&config))?;
            init_tracing(&config.logging)?;
            let store = StateStore::open_in_memory()?;
            let plugin = build_plugin(&config, &store)?;
            println!("{} mode={}", plugin.name(), plugin.mode());
            Ok(())
        }
    }
}

fn load_config(path: Option<&Path>) -> anyhow::Result<GangmemConfig> {
    match path {
        Some(path) => GangmemConfig::from_file(path)
            .with_context(|| format!("loading config {}", path.display())),
        None => Ok(GangmemConfig::default()),
    }
}

fn init_tracing(logging: &LoggingConfig) -> anyhow::Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&logging.filter)
            .with_context(|| format!("invalid log filter {:?}", logging.filter))?,
    };
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if logging.json {
        builder.json().init();
    } else {
        builder.init();
    }
    Ok(())
}

fn build_plugin(config: &GangmemConfig, store: &StateStore) -> anyhow::Result<GangMemPlugin> {
    let args = config.plugin.as_ref().map(PluginArgs::from);
    let handle = Handle::new(Arc::new(store.clone()), Arc::new(store.clone()));
    Ok(GangMemPlugin::new(args.as_ref(), handle)?)
}

async fn run(
    config: GangmemConfig,
    cluster_path: &Path,
    only_unit: Option<&str>,
    data_dir: Option<PathBuf>,
) -> anyhow::Result<()> {
    let store = match data_dir {
        Some(dir) => {
            std::fs::create_dir_all(&dir)?;
            let db_path = dir.join("gangmem.redb");
            let store = StateStore::open(&db_path)?;
            info!(path = ?db_path, "state store opened");
            store
        }
        None => StateStore::open_in_memory()?,
    };

    let cluster = ClusterSpec::from_file(cluster_path)?;
    cluster.load_into(&store)?;

    let plugin = Arc::new(build_plugin(&config, &store)?);
    let nodes: Vec<String> = store
        .list_nodes()?
        .into_iter()
        .map(|n| n.node_id)
        .collect();

    let units = match only_unit {
        Some(name) => vec![
            store
                .get_unit(name)?
                .with_context(|| format!("unit {name} not found in cluster"))?,
        ],
        None => store.list_units()?,
    };

    let mut outcomes: Vec<CycleOutcome> = Vec::with_capacity(units.len());
    for unit in units {
        outcomes.push(run_cycle(plugin.clone(), unit, nodes.clone(), config.scoring).await);
    }

    println!("{}", serde_json::to_string_pretty(&outcomes)?);
    Ok(())
}
