//! Keeps the matrix fed with the current selection.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;

use crate::service::DepartureService;
use crate::source::SourceError;

use super::{DisplayError, MatrixSink};

/// Shown when nothing qualifies.
pub const IDLE_MESSAGE: &str = "Inga avgångar";

/// Polls the service and scrolls each selected line in turn.
///
/// Upstream failures are logged and the last good lines stay on the
/// matrix. Sink failures end the loop.
pub struct DisplayLoop<S> {
    service: Arc<DepartureService>,
    sink: S,
    refresh_interval: Duration,
    lines: Vec<String>,
}

impl<S: MatrixSink> DisplayLoop<S> {
    pub fn new(service: Arc<DepartureService>, sink: S, refresh_interval: Duration) -> Self {
        Self {
            service,
            sink,
            refresh_interval,
            lines: Vec::new(),
        }
    }

    /// Lines currently being shown.
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Run until `shutdown` completes, then blank the matrix and hand the
    /// sink back.
    pub async fn run(mut self, shutdown: impl Future<Output = ()>) -> Result<S, DisplayError> {
        tokio::pin!(shutdown);
        let mut next_refresh = Instant::now();

        loop {
            if Instant::now() >= next_refresh {
                self.refresh().await;
                next_refresh = Instant::now() + self.refresh_interval;
            }

            tokio::select! {
                biased;
                _ = &mut shutdown => break,
                result = self.show_current() => result?,
            }
        }

        tracing::info!("display loop stopping");
        self.sink.clear().await?;
        Ok(self.sink)
    }

    /// Refresh once and scroll every current line once.
    pub async fn cycle(&mut self) -> Result<(), DisplayError> {
        self.refresh().await;
        self.show_current().await
    }

    /// Poll the service. Returns whether the lines changed.
    pub async fn refresh(&mut self) -> bool {
        let result = self.service.summaries().await;
        self.apply_update(result)
    }

    fn apply_update(&mut self, result: Result<Vec<String>, SourceError>) -> bool {
        match result {
            Ok(lines) if lines != self.lines => {
                tracing::info!(count = lines.len(), ?lines, "departures changed");
                self.lines = lines;
                true
            }
            Ok(_) => false,
            Err(e) => {
                tracing::warn!(error = %e, "failed to refresh departures, keeping last lines");
                false
            }
        }
    }

    async fn show_current(&mut self) -> Result<(), DisplayError> {
        if self.lines.is_empty() {
            return self.sink.show(IDLE_MESSAGE).await;
        }
        for line in &self.lines {
            self.sink.show(line).await?;
        }
        Ok(())
    }
}
