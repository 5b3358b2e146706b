//! Actor Coordinator - wires up watch mode
//!
//! - Selects the mappings covered by the watch scope
//! - Starts one watch actor per mapping and the shared reporter
//! - Runs them until Ctrl+C

mod runtime;

use std::sync::Arc;

use anyhow::{Result, anyhow};
use crossbeam::channel::Receiver;
use tokio::sync::mpsc;

use super::messages::BuildEvent;
use super::reporter::Reporter;
use super::watch::WatchActor;
use crate::config::{Config, MappingId, MappingKind};
use crate::core::WatchScope;

const CHANNEL_BUFFER: usize = 32;

/// Coordinator - wires up and runs the actor system.
pub struct Coordinator {
    config: Arc<Config>,
    shutdown_rx: Option<Receiver<()>>,
}

impl Coordinator {
    pub fn with_config(config: Arc<Config>) -> Self {
        Self {
            config,
            shutdown_rx: None,
        }
    }

    /// Set shutdown signal receiver.
    pub fn with_shutdown_signal(mut self, rx: Receiver<()>) -> Self {
        self.shutdown_rx = Some(rx);
        self
    }

    /// Run the actor system.
    pub async fn run(mut self) -> Result<()> {
        let selected = selected_mappings(&self.config);
        if selected.is_empty() {
            crate::log!("watch"; "nothing to watch");
            return Ok(());
        }

        let (events_tx, events_rx) = mpsc::channel::<BuildEvent>(CHANNEL_BUFFER);
        let mut actors = Vec::with_capacity(selected.len());
        for id in selected {
            let Some(mapping) = self.config.manifest.get(id).cloned() else {
                continue;
            };
            crate::log!("watch"; "{}", self.config.display(&mapping.input));
            let actor = WatchActor::new(id, mapping, Arc::clone(&self.config), events_tx.clone())
                .map_err(|e| anyhow!("watcher failed for {}: {}", id, e))?;
            actors.push(actor);
        }
        drop(events_tx);

        let reporter = Reporter::new(events_rx, Arc::clone(&self.config));

        crate::debug!("actor"; "start");
        runtime::run_actors(actors, reporter, self.shutdown_rx.take()).await;
        crate::debug!("actor"; "stopped");
        Ok(())
    }
}

/// Style and script mappings covered by the watch scope, in manifest order.
fn selected_mappings(config: &Config) -> Vec<MappingId> {
    config
        .manifest
        .entries()
        .map(|(id, _)| id)
        .filter(|id| covers(config.watch_scope, id.kind))
        .collect()
}

fn covers(scope: WatchScope, kind: MappingKind) -> bool {
    match kind {
        MappingKind::Style => scope.styles(),
        MappingKind::Script => scope.scripts(),
        MappingKind::Minify => false,
    }
}
