//! Run command implementation

use super::Runtime;
use crate::config::Config;
use crate::engine::Scheduler;
use clap::Args;
use tokio::sync::watch;

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Stop after this many passes
    #[arg(long)]
    pub max_passes: Option<u64>,
}

impl RunArgs {
    pub async fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let runtime = Runtime::build(config).await?;
        let scheduler = Scheduler::new(runtime.engine, config.engine.pass_interval())
            .with_refresher(runtime.refresher)
            .with_max_passes(self.max_passes);

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        tokio::spawn(async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => tracing::info!("Ctrl-C received, shutting down"),
                Err(e) => tracing::warn!(error = %e, "Failed to listen for Ctrl-C"),
            }
            let _ = shutdown_tx.send(true);
        });

        let passes = scheduler.run(shutdown_rx).await;
        tracing::info!(passes, "Run finished");
        Ok(())
    }
}
