//! Signals command implementation

use super::open_store;
use crate::config::Config;
use crate::signal::ArbitrageSignal;
use clap::Args;

#[derive(Args, Debug)]
pub struct SignalsArgs {
    /// Only signals for this asset
    #[arg(short, long)]
    pub asset: Option<String>,
}

impl SignalsArgs {
    pub async fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let store = open_store(config).await?;
        let mut signals: Vec<ArbitrageSignal> = store
            .snapshot()
            .await?
            .into_values()
            .filter(|s| self.asset.as_ref().map_or(true, |a| &s.asset == a))
            .collect();
        signals.sort_by(|a, b| {
            b.spread_pct
                .cmp(&a.spread_pct)
                .then_with(|| a.key().cmp(&b.key()))
        });

        println!("{}", serde_json::to_string_pretty(&signals)?);
        Ok(())
    }
}
