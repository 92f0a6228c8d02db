use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "runm-metadata",
    about = "runm metadata service: partitions, object types, objects and property definitions",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Start the metadata server
    Serve(ServeArgs),
    /// Print the effective configuration
    Config(ConfigArgs),
}

/// Where configuration comes from. Flags and environment variables
/// override values read from the file.
#[derive(Args, Clone, Debug, Default)]
pub struct ConfigSource {
    /// TOML configuration file
    #[arg(short, long, env = "RUNM_METADATA_CONFIG")]
    pub config: Option<PathBuf>,
    #[arg(long, env = "RUNM_METADATA_BIND_ADDR")]
    pub bind_addr: Option<SocketAddr>,
    #[arg(long, env = "RUNM_METADATA_SERVICE_NAME")]
    pub service_name: Option<String>,
    #[arg(long, env = "RUNM_METADATA_STORAGE_KEY_PREFIX")]
    pub key_prefix: Option<String>,
    /// Per-request storage deadline; 0 disables it
    #[arg(long, env = "RUNM_METADATA_REQUEST_TIMEOUT_SECS")]
    pub request_timeout_secs: Option<u64>,
    /// Partition to create at startup (repeatable)
    #[arg(long = "bootstrap-partition", env = "RUNM_METADATA_BOOTSTRAP_PARTITIONS", value_delimiter = ',')]
    pub bootstrap_partitions: Vec<String>,
}

#[derive(Args)]
pub struct ServeArgs {
    #[command(flatten)]
    pub source: ConfigSource,
}

#[derive(Args)]
pub struct ConfigArgs {
    #[command(flatten)]
    pub source: ConfigSource,
}
