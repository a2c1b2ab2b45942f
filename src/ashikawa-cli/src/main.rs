use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

use ashikawa_rs::Config;

mod commands;
mod telemetry;

use commands::Commands;

#[derive(Parser)]
#[command(name = "ashikawa", version, about = "ArangoDB command line client")]
struct Cli {
    #[arg(long, global = true, help = "JSON config file, environment is used otherwise")]
    config: Option<PathBuf>,

    #[arg(long, global = true, help = "Also write JSON logs to this directory")]
    log_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

fn load_config(path: Option<&PathBuf>) -> Config {
    match path {
        Some(path) => Config::load(&path.to_string_lossy()).unwrap_or_else(|e| {
            tracing::warn!("Failed to load {:?} ({}), using defaults", path, e);
            Config::default()
        }),
        None => Config::from_env(),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let _guard = telemetry::init_telemetry(cli.log_dir.as_deref())?;

    let config = load_config(cli.config.as_ref());
    tracing::debug!("Server: {}", config.url);

    let db = ashikawa_rs::connect(config)?;
    commands::run(&db, cli.command).await
}
