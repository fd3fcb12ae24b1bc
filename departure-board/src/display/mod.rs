//! LED matrix display.
//!
//! The matrix is a chain of 8×8 MAX7219 blocks that scrolls one message at
//! a time. A [`MatrixSink`] shows a message and resolves once it has
//! scrolled past; [`DisplayLoop`] keeps it fed with the current selection.

mod console;
mod driver;
mod runner;

use std::time::Duration;

use futures::future::BoxFuture;

pub use console::{ConsoleMatrix, scroll_frames};
pub use driver::DriverProcess;
pub use runner::{DisplayLoop, IDLE_MESSAGE};

/// Pixel columns per cascaded block.
pub const PIXELS_PER_BLOCK: usize = 8;

/// Approximate pixel columns per character in the proportional font.
pub const PIXELS_PER_CHAR: usize = 6;

/// Errors from driving the display.
#[derive(Debug, thiserror::Error)]
pub enum DisplayError {
    /// Driver command line is empty
    #[error("matrix driver command is empty")]
    EmptyCommand,

    /// Driver process could not be started
    #[error("failed to start matrix driver `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// Driver exited or closed its input
    #[error("matrix driver is not running")]
    DriverGone,

    /// Writing to the terminal or the driver failed
    #[error("display I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Something that can scroll a message.
pub trait MatrixSink: Send {
    /// Show a message, resolving once it has scrolled past.
    fn show<'a>(&'a mut self, text: &'a str) -> BoxFuture<'a, Result<(), DisplayError>>;

    /// Blank the display.
    fn clear(&mut self) -> BoxFuture<'_, Result<(), DisplayError>>;
}

/// Physical size and scroll speed of the matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatrixGeometry {
    /// Number of 8×8 blocks in the chain.
    pub cascaded: usize,
    /// Delay per pixel column of scroll.
    pub scroll_delay: Duration,
}

impl Default for MatrixGeometry {
    fn default() -> Self {
        Self {
            cascaded: 4,
            scroll_delay: Duration::from_millis(100),
        }
    }
}

impl MatrixGeometry {
    pub fn width_px(&self) -> usize {
        self.cascaded * PIXELS_PER_BLOCK
    }

    /// Characters that fit on the matrix at once (at least one).
    pub fn width_chars(&self) -> usize {
        (self.width_px() / PIXELS_PER_CHAR).max(1)
    }

    /// Estimated time for `text` to scroll fully across and off the matrix.
    pub fn scroll_duration(&self, text: &str) -> Duration {
        let text_px = text.chars().count() * PIXELS_PER_CHAR;
        let columns = u32::try_from(text_px + self.width_px()).unwrap_or(u32::MAX);
        self.scroll_delay.saturating_mul(columns)
    }
}

/// Settings for the display loop and its sinks.
#[derive(Debug, Clone)]
pub struct DisplayConfig {
    pub geometry: MatrixGeometry,
    /// How often to poll for new departures.
    pub refresh_interval: Duration,
    /// Command line of the hardware driver.
    pub driver_command: String,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            geometry: MatrixGeometry::default(),
            refresh_interval: Duration::from_secs(60),
            driver_command: "python3 python_matrix_driver.py".to_string(),
        }
    }
}
