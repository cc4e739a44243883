//! Scan command implementation

use super::Runtime;
use crate::config::Config;
use clap::Args;

#[derive(Args, Debug)]
pub struct ScanArgs {
    /// Print compact JSON
    #[arg(long)]
    pub compact: bool,
}

impl ScanArgs {
    pub async fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let runtime = Runtime::build(config).await?;
        runtime.refresher.refresh().await?;

        let report = runtime.engine.run_pass().await?;
        let json = if self.compact {
            serde_json::to_string(&report)?
        } else {
            serde_json::to_string_pretty(&report)?
        };
        println!("{}", json);
        Ok(())
    }
}
