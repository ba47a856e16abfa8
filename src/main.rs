use clap::Parser;
use homelend::application::engine::LendingEngine;
use homelend::config::{LendingConfig, LogConfig};
use homelend::domain::ports::KeyValueStoreBox;
use homelend::infrastructure::in_memory::InMemoryLedger;
use homelend::infrastructure::oracles::{SalaryBandScorer, StaticGovernmentRegistry};
use homelend::interfaces::csv::invocation_reader::InvocationReader;
use homelend::interfaces::csv::response_writer::{Response, ResponseWriter};
use homelend::interfaces::dispatch::Dispatcher;
use miette::{IntoDiagnostic, Result};
use std::fs::File;
use std::io;
use std::path::PathBuf;
use tracing::error;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Input invocation script (CSV: role,identity,operation,args...)
    input: PathBuf,

    /// Path to persistent database (optional). If provided, uses RocksDB.
    #[arg(long)]
    db_path: Option<PathBuf>,

    /// TOML configuration file (optional).
    #[arg(long)]
    config: Option<PathBuf>,
}

fn init_tracing(log: &LogConfig) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&log.filter))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

#[cfg(feature = "storage-rocksdb")]
fn open_store(db_path: Option<PathBuf>) -> Result<KeyValueStoreBox> {
    use homelend::infrastructure::rocksdb::RocksDBLedger;

    match db_path {
        Some(path) => {
            tracing::info!(path = %path.display(), "using RocksDB ledger");
            Ok(Box::new(RocksDBLedger::open(path).into_diagnostic()?))
        }
        None => Ok(Box::new(InMemoryLedger::new())),
    }
}

#[cfg(not(feature = "storage-rocksdb"))]
fn open_store(db_path: Option<PathBuf>) -> Result<KeyValueStoreBox> {
    if db_path.is_some() {
        tracing::warn!(
            "Persistent storage requested via --db-path, but 'storage-rocksdb' feature is not enabled. Falling back to in-memory storage."
        );
    }
    Ok(Box::new(InMemoryLedger::new()))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => LendingConfig::from_file(path).into_diagnostic()?,
        None => LendingConfig::default(),
    };
    init_tracing(&config.log);

    let store = open_store(cli.db_path.or(config.storage.db_path))?;
    let engine = LendingEngine::new(
        store,
        Box::new(SalaryBandScorer),
        Box::new(StaticGovernmentRegistry::from(&config.government)),
        config.engine,
    );
    let dispatcher = Dispatcher::new(engine);
    tracing::debug!(operations = ?dispatcher.registry().operations(), "registered operations");

    let file = File::open(&cli.input).into_diagnostic()?;
    let reader = InvocationReader::new(file);
    let stdout = io::stdout();
    let mut writer = ResponseWriter::new(stdout.lock());

    for (index, invocation) in reader.invocations().enumerate() {
        let line = index as u64 + 1;
        let response = match invocation {
            Ok(invocation) => {
                match dispatcher
                    .invoke(&invocation.caller, &invocation.operation, &invocation.args)
                    .await
                {
                    Ok(payload) => Response::ok(line, &invocation.operation, payload),
                    Err(e) => {
                        error!(line, operation = %invocation.operation, kind = ?e.kind(), "{e}");
                        Response::error(line, &invocation.operation, e)
                    }
                }
            }
            Err(e) => {
                error!(line, "Error reading invocation: {e}");
                Response::error(line, "", e)
            }
        };
        writer.write(&response).into_diagnostic()?;
    }

    writer.flush().into_diagnostic()?;
    Ok(())
}
