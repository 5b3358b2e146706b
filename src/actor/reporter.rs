//! Terminal output for watch mode.

use std::sync::Arc;

use tokio::sync::mpsc;

use super::messages::BuildEvent;
use crate::config::Config;
use crate::logger::{status_change, status_error, status_success};
use crate::utils::format_bytes;

/// Prints every [`BuildEvent`] as a timestamped status line.
pub struct Reporter {
    rx: mpsc::Receiver<BuildEvent>,
    config: Arc<Config>,
}

impl Reporter {
    pub fn new(rx: mpsc::Receiver<BuildEvent>, config: Arc<Config>) -> Self {
        Self { rx, config }
    }

    /// Runs until every watch actor has dropped its sender.
    pub async fn run(mut self) {
        while let Some(event) = self.rx.recv().await {
            for line in self.render(&event) {
                match line {
                    Line::Change(text) => status_change(&text),
                    Line::Success(text) => status_success(&text),
                    Line::Error(summary, detail) => status_error(&summary, &detail),
                }
            }
        }
    }

    fn render(&self, event: &BuildEvent) -> Vec<Line> {
        let id = event.mapping();
        let label = id.kind.label();
        match event {
            BuildEvent::Update { files, .. } => files
                .iter()
                .map(|(path, kind)| {
                    Line::Change(format!("{label} {}: {}", kind.label(), self.config.display(path)))
                })
                .collect(),
            BuildEvent::Log { output, entry, .. } => vec![Line::Success(format!(
                "{label} {} ({} in {:.0?})",
                self.config.display(output),
                format_bytes(entry.bytes),
                entry.elapsed
            ))],
            BuildEvent::Error { message, .. } => {
                let source = self
                    .config
                    .manifest
                    .get(id)
                    .map(|m| self.config.display(&m.input))
                    .unwrap_or_else(|| id.to_string());
                vec![Line::Error(format!("{label} {source}"), message.clone())]
            }
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
enum Line {
    Change(String),
    Success(String),
    Error(String, String),
}
