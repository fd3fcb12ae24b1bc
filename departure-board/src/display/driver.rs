//! Hardware matrix driver subprocess.
//!
//! The driver reads one message per line on stdin and scrolls it on the
//! physical matrix, blocking until the scroll is done. It has no way to
//! report completion, so the time a message takes is estimated from its
//! length and the matrix geometry.

use std::process::Stdio;
use std::time::Duration;

use futures::future::BoxFuture;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWriteExt, BufReader};
use tokio::process::{Child, ChildStdin, Command};

use super::{DisplayError, MatrixGeometry, MatrixSink};

/// How long to wait for the driver to exit after closing its input.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(2);

/// A running matrix driver.
pub struct DriverProcess {
    child: Child,
    stdin: Option<ChildStdin>,
    geometry: MatrixGeometry,
}

impl DriverProcess {
    /// Start the driver from a whitespace-separated command line.
    pub fn spawn(command: &str, geometry: MatrixGeometry) -> Result<Self, DisplayError> {
        let mut parts = command.split_whitespace();
        let program = parts.next().ok_or(DisplayError::EmptyCommand)?;

        let mut child = Command::new(program)
            .args(parts)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| DisplayError::Spawn {
                command: command.to_string(),
                source,
            })?;

        if let Some(stdout) = child.stdout.take() {
            tokio::spawn(forward_output(stdout, false));
        }
        if let Some(stderr) = child.stderr.take() {
            tokio::spawn(forward_output(stderr, true));
        }

        tracing::info!(command = %command, pid = ?child.id(), "matrix driver started");

        Ok(Self {
            stdin: child.stdin.take(),
            child,
            geometry,
        })
    }

    /// Close the driver's input and wait for it to exit, killing it if it
    /// does not.
    pub async fn shutdown(mut self) -> Result<(), DisplayError> {
        drop(self.stdin.take());

        match tokio::time::timeout(SHUTDOWN_GRACE, self.child.wait()).await {
            Ok(status) => {
                let status = status?;
                tracing::info!(%status, "matrix driver exited");
            }
            Err(_) => {
                tracing::warn!("matrix driver did not exit, killing it");
                self.child.kill().await?;
            }
        }
        Ok(())
    }

    async fn send(&mut self, message: &str) -> Result<(), DisplayError> {
        if let Some(status) = self.child.try_wait()? {
            tracing::error!(%status, "matrix driver has exited");
            return Err(DisplayError::DriverGone);
        }

        let stdin = self.stdin.as_mut().ok_or(DisplayError::DriverGone)?;
        let line = format!("{message}\n");
        match stdin.write_all(line.as_bytes()).await {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::BrokenPipe => {
                return Err(DisplayError::DriverGone);
            }
            Err(e) => return Err(e.into()),
        }
        stdin.flush().await?;
        Ok(())
    }
}

/// Driver messages must fit on one line.
fn single_line(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

async fn forward_output<R: AsyncRead + Unpin>(stream: R, is_stderr: bool) {
    let mut lines = BufReader::new(stream).lines();
    while let Ok(Some(line)) = lines.next_line().await {
        if is_stderr {
            tracing::warn!(target: "matrix_driver", "{line}");
        } else {
            tracing::debug!(target: "matrix_driver", "{line}");
        }
    }
}

impl MatrixSink for DriverProcess {
    fn show<'a>(&'a mut self, text: &'a str) -> BoxFuture<'a, Result<(), DisplayError>> {
        Box::pin(async move {
            let message = single_line(text);
            // The driver skips empty lines
            if message.is_empty() {
                return Ok(());
            }

            self.send(&message).await?;
            tokio::time::sleep(self.geometry.scroll_duration(&message)).await;
            Ok(())
        })
    }

    fn clear(&mut self) -> BoxFuture<'_, Result<(), DisplayError>> {
        // The driver blanks the matrix after every message
        Box::pin(async { Ok(()) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn instant_geometry() -> MatrixGeometry {
        MatrixGeometry {
            cascaded: 4,
            scroll_delay: Duration::ZERO,
        }
    }

    #[test]
    fn messages_are_flattened() {
        assert_eq!(single_line("134  Östberghöjden\n3 min "), "134 Östberghöjden 3 min");
        assert_eq!(single_line(" \n "), "");
    }

    #[tokio::test]
    async fn empty_command_rejected() {
        let err = DriverProcess::spawn("   ", instant_geometry()).err();
        assert!(matches!(err, Some(DisplayError::EmptyCommand)));
    }

    #[tokio::test]
    async fn missing_program_rejected() {
        let err = DriverProcess::spawn("/nonexistent/matrix-driver --flag", instant_geometry()).err();
        assert!(matches!(err, Some(DisplayError::Spawn { .. })));
    }

    #[tokio::test]
    async fn writes_lines_to_driver() {
        let mut driver = DriverProcess::spawn("cat", instant_geometry()).unwrap();
        driver.show("134 Östberghöjden 3 min").await.unwrap();
        driver.show("").await.unwrap();
        driver.clear().await.unwrap();
        driver.shutdown().await.unwrap();
    }
}
