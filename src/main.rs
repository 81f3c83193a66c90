mod cli;

use std::sync::Arc;

use clap::Parser;
use color_eyre::eyre::{Result, eyre};
use tracing_subscriber::EnvFilter;

use cli::{Cli, Command, StoreArgs};
use tfinv::config::{Config, ConfigField};
use tfinv::pipeline::{ExtractInput, present};
use tfinv::{HttpStore, InventoryStore, MemoryStore, Pipeline, output};

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = Config::load(cli.store.config.as_deref())?;

    let inputs: Vec<ExtractInput> = match cli.command {
        Command::Extract(args) => vec![args.into()],
        Command::Batch(args) => {
            let content = std::fs::read_to_string(&args.jobs)?;
            serde_json::from_str(&content)
                .map_err(|e| eyre!("invalid jobs file {}: {}", args.jobs.display(), e))?
        }
    };

    let configs = inputs
        .into_iter()
        .map(|mut input| {
            input.provider = config.or_default(present(input.provider), ConfigField::Provider);
            input.cluster = config.or_default(present(input.cluster), ConfigField::Cluster);
            input.into_config()
        })
        .collect::<Vec<_>>();

    let (store, memory) = open_store(&cli.store, &config)?;
    let pipeline = Pipeline::new(store);

    let mut reports = Vec::new();
    let mut failures = 0usize;
    for result in pipeline.run_batch(configs).await {
        match result {
            Ok(report) => reports.push(report),
            Err(e) => {
                tracing::error!(error = %e, "extraction failed");
                failures += 1;
            }
        }
    }

    if let Some(memory) = memory {
        let records = memory.added();
        println!("{}", output::records_table(&records));
        print!("{}", output::lineage_tree(&records));
    }
    println!("{}", output::reports_table(&reports));

    if failures > 0 {
        return Err(eyre!("{} extraction(s) failed", failures));
    }
    Ok(())
}

/// The in-memory store is also handed back so its records can be printed.
fn open_store(
    args: &StoreArgs,
    config: &Config,
) -> Result<(Arc<dyn InventoryStore>, Option<Arc<MemoryStore>>)> {
    if let Some(path) = &args.inventory_file {
        let memory = Arc::new(MemoryStore::from_file(path)?);
        tracing::info!(path = %path.display(), "using inventory file");
        let store: Arc<dyn InventoryStore> = memory.clone();
        return Ok((store, Some(memory)));
    }

    let url = config
        .or_default(args.store_url.clone(), ConfigField::StoreUrl)
        .ok_or_else(|| {
            eyre!("No inventory store configured. Set TFINV_STORE_URL, use --store-url, or --inventory-file")
        })?;
    let store: Arc<dyn InventoryStore> = Arc::new(HttpStore::new(url, args.token.clone())?);
    Ok((store, None))
}
