use anyhow::{anyhow, Context, Result};
use clap::Subcommand;
use futures::TryStreamExt;
use serde_json::{json, Value};

use ashikawa_rs::{Database, Figure, QueryOptions};

#[derive(Subcommand)]
pub enum Commands {
    /// Run an AQL query and print each row as a JSON line
    Query {
        /// AQL query text
        aql: String,

        #[arg(long, help = "Rows per round trip")]
        batch_size: Option<u32>,

        #[arg(long, help = "Ask the server for the total row count")]
        count: bool,

        #[arg(
            long = "bind",
            value_name = "NAME=JSON",
            value_parser = parse_bind,
            help = "Bind parameter, the value is parsed as JSON and falls back to a string"
        )]
        binds: Vec<(String, Value)>,
    },
    /// List collections with id, name and status
    Collections,
    /// Show status, document count and figures of a collection
    Info { name: String },
    /// Remove every document from a collection
    Truncate { name: String },
}

pub fn parse_bind(raw: &str) -> Result<(String, Value)> {
    let (name, value) = raw
        .split_once('=')
        .ok_or_else(|| anyhow!("expected NAME=JSON, got {:?}", raw))?;
    if name.is_empty() {
        return Err(anyhow!("bind parameter name is empty"));
    }

    let value = serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_string()));
    Ok((name.to_string(), value))
}

/// Options for `query`, leaving out the settings not given on the command line
pub fn query_options(
    batch_size: Option<u32>,
    count: bool,
    binds: Vec<(String, Value)>,
) -> QueryOptions {
    let mut options = QueryOptions::new();
    if let Some(batch_size) = batch_size {
        options = options.batch_size(batch_size);
    }
    if count {
        options = options.count(true);
    }
    for (name, value) in binds {
        options = options.bind(name, value);
    }
    options
}

pub async fn run(db: &Database, command: Commands) -> Result<()> {
    match command {
        Commands::Query {
            aql,
            batch_size,
            count,
            binds,
        } => {
            let options = query_options(batch_size, count, binds);
            let cursor = db.query(&aql, options).await.context("query failed")?;
            if count {
                eprintln!("count: {}", cursor.length()?);
            }

            let rows = cursor.into_stream();
            futures::pin_mut!(rows);
            let mut printed = 0usize;
            while let Some(row) = rows.try_next().await? {
                println!("{}", row);
                printed += 1;
            }
            tracing::debug!(rows = printed, "Query finished");
        }
        Commands::Collections => {
            for collection in db.collections().await? {
                println!(
                    "{}\t{}\t{}",
                    collection.id(),
                    collection.name(),
                    collection.status()
                );
            }
        }
        Commands::Info { name } => {
            let collection = db.collection(&name).await?;
            let figures = collection.figures().await?;
            let info = json!({
                "id": collection.id(),
                "name": collection.name(),
                "status": collection.status().to_string(),
                "count": collection.length().await?,
                "waitForSync": collection.wait_for_sync().await?,
                "figures": {
                    "datafiles_count": figures.get(Figure::DatafilesCount),
                    "alive_count": figures.get(Figure::AliveCount),
                    "alive_size": figures.get(Figure::AliveSize),
                    "dead_count": figures.get(Figure::DeadCount),
                    "dead_size": figures.get(Figure::DeadSize),
                },
            });
            println!("{}", serde_json::to_string_pretty(&info)?);
        }
        Commands::Truncate { name } => {
            let collection = db.collection(&name).await?;
            collection.truncate().await?;
            tracing::info!(collection = %name, "Truncated");
        }
    }

    Ok(())
}
