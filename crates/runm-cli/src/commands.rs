use anyhow::Context;
use colored::Colorize;

use runm_server::{MetadataServer, ServerConfig};

use crate::cli::*;

pub async fn run_command(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Command::Serve(args) => cmd_serve(args).await,
        Command::Config(args) => cmd_config(args, &cli.format),
    }
}

/// Reads the configuration file, if any, and applies overrides on top.
pub fn effective_config(source: &ConfigSource) -> anyhow::Result<ServerConfig> {
    let mut config = match &source.config {
        Some(path) => ServerConfig::load(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => ServerConfig::default(),
    };
    if let Some(addr) = source.bind_addr {
        config.bind_addr = addr;
    }
    if let Some(name) = &source.service_name {
        config.service_name = name.clone();
    }
    if let Some(prefix) = &source.key_prefix {
        config.storage.key_prefix = prefix.clone();
    }
    if let Some(secs) = source.request_timeout_secs {
        config.request_timeout_secs = secs;
    }
    for name in &source.bootstrap_partitions {
        if !config.bootstrap.partitions.contains(name) {
            config.bootstrap.partitions.push(name.clone());
        }
    }
    Ok(config)
}

async fn cmd_serve(args: ServeArgs) -> anyhow::Result<()> {
    let config = effective_config(&args.source)?;
    println!(
        "{} {} on {}",
        "✓".green().bold(),
        config.service_name.bold(),
        config.bind_addr.to_string().cyan()
    );
    MetadataServer::new(config)
        .serve()
        .await
        .context("metadata server stopped")
}

fn cmd_config(args: ConfigArgs, format: &OutputFormat) -> anyhow::Result<()> {
    let config = effective_config(&args.source)?;
    match format {
        OutputFormat::Text => print!("{}", config.to_toml()?),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&config)?),
    }
    Ok(())
}
