//! Per-mapping watch actor.
//!
//! Watches the mapping's roots and rebuilds that mapping alone:
//!
//! ```text
//! Watcher → Debouncer (timing) → Classifier (relevance) → compile → BuildEvent
//! ```
//!
//! Compiles run on the blocking pool and are awaited before more events are
//! read, so builds of one mapping never overlap while different mappings
//! build in parallel.

use std::path::PathBuf;
use std::sync::Arc;

use notify::RecommendedWatcher;
use tokio::sync::mpsc;

use super::messages::BuildEvent;
use crate::compiler::{ScriptBundler, compile_mapping};
use crate::config::{AssetMapping, Config, MappingId, MappingKind};

mod classifier;
mod debouncer;
mod types;
mod watch_roots;


use classifier::EventClassifier;
use debouncer::Debouncer;
use watch_roots::WatchRoots;

pub use types::{ChangeKind, WatchTarget};

/// Watches and rebuilds one mapping.
pub struct WatchActor {
    id: MappingId,
    mapping: Arc<AssetMapping>,
    config: Arc<Config>,
    target: WatchTarget,
    /// Channel to receive notify events (sync -> async bridge)
    notify_rx: std::sync::mpsc::Receiver<notify::Result<notify::Event>>,
    /// Watcher handle (must be kept alive)
    watcher: RecommendedWatcher,
    watch_roots: WatchRoots,
    events_tx: mpsc::Sender<BuildEvent>,
}

impl WatchActor {
    /// Start watching immediately; events buffer until [`run`](Self::run).
    pub fn new(
        id: MappingId,
        mapping: AssetMapping,
        config: Arc<Config>,
        events_tx: mpsc::Sender<BuildEvent>,
    ) -> notify::Result<Self> {
        let (notify_tx, notify_rx) = std::sync::mpsc::channel();
        let mut watcher = notify::recommended_watcher(move |res| {
            let _ = notify_tx.send(res);
        })?;

        let target = WatchTarget::new(id.kind, &mapping);
        let mut watch_roots = WatchRoots::new(target.roots.clone());
        watch_roots.attach_existing(&mut watcher)?;
        crate::debug!("watch"; "{}: {} roots attached", id, watch_roots.attached());

        Ok(Self {
            id,
            mapping: Arc::new(mapping),
            config,
            target,
            notify_rx,
            watcher,
            watch_roots,
            events_tx,
        })
    }

    /// Initial build, then rebuild on every relevant change.
    ///
    /// Returns when the reporter is gone.
    pub async fn run(self) {
        let Self {
            id,
            mapping,
            config,
            mut target,
            notify_rx,
            mut watcher,
            mut watch_roots,
            events_tx,
        } = self;

        let (async_tx, mut async_rx) = mpsc::channel::<notify::Event>(64);
        std::thread::spawn(move || {
            while let Ok(result) = notify_rx.recv() {
                match result {
                    Ok(event) => {
                        if async_tx.blocking_send(event).is_err() {
                            break;
                        }
                    }
                    Err(e) => crate::log!("watch"; "notify error: {}", e),
                }
            }
        });

        let mut builder = Builder::new(id, mapping, config);
        let Ok(inputs) = builder.build(&events_tx).await else {
            return;
        };
        if let Some(inputs) = inputs {
            watch_roots.set_dependency_dirs(&mut watcher, target.track_inputs(&inputs));
        }

        let mut debouncer = Debouncer::new();
        loop {
            tokio::select! {
                biased;
                Some(event) = async_rx.recv() => debouncer.add_event(&event),
                _ = tokio::time::sleep(debouncer.sleep_duration()) => {
                    watch_roots.maintain(&mut watcher);
                    let Some(raw) = debouncer.take_if_ready() else {
                        continue;
                    };
                    let Some(files) = EventClassifier::classify(raw, &target) else {
                        continue;
                    };
                    if events_tx.send(BuildEvent::Update { mapping: id, files }).await.is_err() {
                        break;
                    }
                    let Ok(inputs) = builder.build(&events_tx).await else {
                        break;
                    };
                    if let Some(inputs) = inputs {
                        watch_roots.set_dependency_dirs(&mut watcher, target.track_inputs(&inputs));
                    }
                }
            }
        }
    }
}

/// Compile state of one actor: `Idle → Compiling → Idle`.
struct Builder {
    id: MappingId,
    mapping: Arc<AssetMapping>,
    config: Arc<Config>,
    /// Taken while a compile is in flight
    bundler: Option<ScriptBundler>,
}

impl Builder {
    fn new(id: MappingId, mapping: Arc<AssetMapping>, config: Arc<Config>) -> Self {
        let bundler = (id.kind == MappingKind::Script).then(|| ScriptBundler::new(true));
        Self {
            id,
            mapping,
            config,
            bundler,
        }
    }

    /// Compile on the blocking pool and publish the outcome.
    ///
    /// Yields the files the compile read when it succeeded. `Err` means the
    /// receiving end is closed.
    async fn build(
        &mut self,
        events_tx: &mpsc::Sender<BuildEvent>,
    ) -> Result<Option<Vec<PathBuf>>, ()> {
        let (id, mapping, config) = (self.id, Arc::clone(&self.mapping), Arc::clone(&self.config));
        let mut bundler = self.bundler.take();

        let joined = tokio::task::spawn_blocking(move || {
            let result = compile_mapping(&config, id, &mapping, bundler.as_mut());
            (bundler, result)
        })
        .await;

        let (event, inputs) = match joined {
            Ok((bundler, result)) => {
                self.bundler = bundler;
                match result {
                    Ok(asset) => (
                        BuildEvent::Log {
                            mapping: id,
                            output: asset.output.clone(),
                            entry: asset.log_entry(),
                        },
                        Some(asset.inputs),
                    ),
                    Err(err) => (
                        BuildEvent::Error {
                            mapping: id,
                            message: err.to_string(),
                        },
                        None,
                    ),
                }
            }
            Err(join_error) => {
                self.bundler = (id.kind == MappingKind::Script).then(|| ScriptBundler::new(true));
                let event = BuildEvent::Error {
                    mapping: id,
                    message: format!("compile task failed: {join_error}"),
                };
                (event, None)
            }
        };

        events_tx.send(event).await.map_err(|_| ())?;
        Ok(inputs)
    }
}
