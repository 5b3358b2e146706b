//! `kiln watch`: run the watch coordinator until Ctrl+C.

use std::sync::Arc;

use anyhow::{Context, Result};

use crate::actor::Coordinator;
use crate::config::Config;
use crate::core::take_shutdown_receiver;
use crate::log;

pub fn watch(config: Config) -> Result<()> {
    let config = Arc::new(config);
    let shutdown_rx = take_shutdown_receiver();

    log!("watch"; "{} mode, press Ctrl+C to stop", config.mode.label());

    let rt = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()
        .context("failed to create tokio runtime")?;

    rt.block_on(async {
        let mut coordinator = Coordinator::with_config(config);
        if let Some(rx) = shutdown_rx {
            coordinator = coordinator.with_shutdown_signal(rx);
        }
        coordinator.run().await
    })
}
