use std::time::Duration;

use crossbeam::channel::Receiver;

use crate::actor::reporter::Reporter;
use crate::actor::watch::WatchActor;

/// Run all actors concurrently until shutdown.
///
/// Without a shutdown signal, runs until every watch actor has stopped.
pub(super) async fn run_actors(
    actors: Vec<WatchActor>,
    reporter: Reporter,
    shutdown_rx: Option<Receiver<()>>,
) {
    let reporter_handle = tokio::spawn(reporter.run());
    let handles: Vec<_> = actors
        .into_iter()
        .map(|actor| tokio::spawn(actor.run()))
        .collect();

    if let Some(rx) = shutdown_rx {
        loop {
            if rx.try_recv().is_ok() {
                crate::debug!("actor"; "shutdown signal received");
                break;
            }
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
        for handle in &handles {
            handle.abort();
        }
    }

    for handle in handles {
        let _ = handle.await;
    }

    // Senders are gone once the actors stopped; let the reporter drain.
    let _ = tokio::time::timeout(Duration::from_millis(500), reporter_handle).await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::sync::Arc;

    use tempfile::TempDir;
    use tokio::sync::mpsc;

    use crate::config::{Config, Manifest, MappingId, MappingKind};
    use crate::core::{BuildMode, WatchScope};

    #[tokio::test]
    async fn test_shutdown_signal_stops_actors() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("scss")).unwrap();
        fs::write(dir.path().join("scss/a.scss"), "a { b: c }\n").unwrap();
        let manifest = Manifest::from_str("[[styles]]\nin = \"scss/a.scss\"\nout = \"css/a.css\"\n").unwrap();
        let config = Arc::new(
            Config::new(dir.path().to_path_buf(), manifest, BuildMode::Production, WatchScope::All)
                .unwrap(),
        );

        let (events_tx, events_rx) = mpsc::channel(8);
        let actor = WatchActor::new(
            MappingId::new(MappingKind::Style, 0),
            config.manifest.styles[0].clone(),
            Arc::clone(&config),
            events_tx,
        )
        .unwrap();
        let reporter = Reporter::new(events_rx, config);

        let (shutdown_tx, shutdown_rx) = crossbeam::channel::bounded(1);
        shutdown_tx.send(()).unwrap();
        tokio::time::timeout(
            Duration::from_secs(5),
            run_actors(vec![actor], reporter, Some(shutdown_rx)),
        )
        .await
        .unwrap();
    }
}
