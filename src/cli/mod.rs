//! CLI interface for arb-signal-engine
//!
//! Provides subcommands for:
//! - `run`: Run detection passes on an interval
//! - `scan`: Run a single pass and print its report
//! - `signals`: Show the persisted signal set
//! - `config`: Show the effective configuration

mod run;
mod scan;
mod signals;

pub use run::RunArgs;
pub use scan::ScanArgs;
pub use signals::SignalsArgs;

use crate::config::{Config, StoreKind};
use crate::engine::{ArbitrageEngine, EngineSettings};
use crate::feed::{BackoffPolicy, LiveMarket, SnapshotRefresher};
use crate::risk::{FeeBudgetRiskGate, RiskLimits, VolumeLiquidityGate};
use crate::store::{JsonFileStore, MemorySignalStore, SignalStore};
use anyhow::Context;
use clap::{Parser, Subcommand};
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(name = "arb-signal-engine")]
#[command(about = "Cross-exchange crypto arbitrage signal detection")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    pub config: String,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run detection passes until Ctrl-C
    Run(RunArgs),
    /// Run one pass and print the report as JSON
    Scan(ScanArgs),
    /// Show persisted signals
    Signals(SignalsArgs),
    /// Show configuration
    Config,
}

/// Engine wired to the configured market snapshot and store
pub struct Runtime {
    pub engine: Arc<ArbitrageEngine>,
    pub refresher: Arc<SnapshotRefresher>,
}

impl Runtime {
    pub async fn build(config: &Config) -> anyhow::Result<Self> {
        let market = Arc::new(LiveMarket::default());
        let refresher = Arc::new(SnapshotRefresher::new(
            Arc::clone(&market),
            &config.feed.snapshot_path,
            config.feed.book_depth,
            config.liquidity.depth,
            BackoffPolicy::from(&config.feed.backoff),
        ));

        let engine = ArbitrageEngine::new(
            EngineSettings::from(&config.engine),
            market.clone(),
            market.clone(),
            Arc::new(VolumeLiquidityGate::from_config(market, &config.liquidity)),
            Arc::new(FeeBudgetRiskGate::new(RiskLimits::from(&config.risk))),
            open_store(config).await?,
        );

        Ok(Self {
            engine: Arc::new(engine),
            refresher,
        })
    }
}

/// Open the configured signal store
pub async fn open_store(config: &Config) -> anyhow::Result<Arc<dyn SignalStore>> {
    let store: Arc<dyn SignalStore> = match config.store.kind {
        StoreKind::Memory => Arc::new(MemorySignalStore::new()),
        StoreKind::File => Arc::new(
            JsonFileStore::open(&config.store.path)
                .await
                .with_context(|| {
                    format!("Failed to open signal store {}", config.store.path.display())
                })?,
        ),
    };
    Ok(store)
}
