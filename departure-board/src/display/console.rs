//! Terminal stand-in for the LED matrix.

use std::io::Write;

use futures::future::BoxFuture;

use super::{DisplayError, MatrixGeometry, MatrixSink, PIXELS_PER_CHAR};

/// Frames of `text` scrolling right-to-left through a `width`-character
/// window, one character per frame.
///
/// The first frame shows the first character at the right edge; the last
/// frame is blank.
///
/// ```
/// use departure_board::display::scroll_frames;
///
/// assert_eq!(scroll_frames("AB", 3), ["  A", " AB", "AB ", "B  ", "   "]);
/// ```
pub fn scroll_frames(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let padded: Vec<char> = std::iter::repeat_n(' ', width)
        .chain(text.chars())
        .chain(std::iter::repeat_n(' ', width))
        .collect();

    padded
        .windows(width)
        .skip(1)
        .map(|window| window.iter().collect())
        .collect()
}

/// Simulated matrix that scrolls messages on a single terminal line.
pub struct ConsoleMatrix<W = std::io::Stdout> {
    out: W,
    geometry: MatrixGeometry,
}

impl ConsoleMatrix {
    /// Console matrix on standard output.
    pub fn stdout(geometry: MatrixGeometry) -> Self {
        Self::new(std::io::stdout(), geometry)
    }
}

impl<W: Write + Send> ConsoleMatrix<W> {
    pub fn new(out: W, geometry: MatrixGeometry) -> Self {
        Self { out, geometry }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn draw(&mut self, frame: &str) -> Result<(), DisplayError> {
        write!(self.out, "\r|{frame}|")?;
        self.out.flush()?;
        Ok(())
    }
}

impl<W: Write + Send> MatrixSink for ConsoleMatrix<W> {
    fn show<'a>(&'a mut self, text: &'a str) -> BoxFuture<'a, Result<(), DisplayError>> {
        Box::pin(async move {
            // One character per frame, so each frame covers a character's worth of columns
            let frame_delay = self.geometry.scroll_delay * PIXELS_PER_CHAR as u32;
            for frame in scroll_frames(text, self.geometry.width_chars()) {
                self.draw(&frame)?;
                tokio::time::sleep(frame_delay).await;
            }
            writeln!(self.out)?;
            Ok(())
        })
    }

    fn clear(&mut self) -> BoxFuture<'_, Result<(), DisplayError>> {
        Box::pin(async move {
            let blank = " ".repeat(self.geometry.width_chars());
            self.draw(&blank)?;
            writeln!(self.out)?;
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn instant_geometry() -> MatrixGeometry {
        MatrixGeometry {
            cascaded: 4,
            scroll_delay: Duration::ZERO,
        }
    }

    #[test]
    fn frames_scroll_in_and_out() {
        let frames = scroll_frames("Nu", 5);
        assert_eq!(frames.len(), 2 + 5);
        assert_eq!(frames.first().map(String::as_str), Some("    N"));
        assert_eq!(frames.get(1).map(String::as_str), Some("   Nu"));
        assert_eq!(frames.last().map(String::as_str), Some("     "));
        assert!(frames.iter().all(|f| f.chars().count() == 5));
    }

    #[test]
    fn frames_handle_multibyte_text() {
        let frames = scroll_frames("Ö", 2);
        assert_eq!(frames, [" Ö", "Ö ", "  "]);
    }

    #[test]
    fn empty_text_is_a_blank_frame_sequence() {
        let frames = scroll_frames("", 3);
        assert_eq!(frames, ["   ", "   ", "   "]);
    }

    #[test]
    fn zero_width_treated_as_one() {
        assert_eq!(scroll_frames("A", 0), ["A", " "]);
    }

    #[tokio::test]
    async fn show_writes_every_frame() {
        let mut matrix = ConsoleMatrix::new(Vec::new(), instant_geometry());
        matrix.show("134 Fruängen 3 min").await.unwrap();
        matrix.clear().await.unwrap();

        let out = String::from_utf8(matrix.into_inner()).unwrap();
        assert!(out.contains("|    1|"));
        assert!(out.contains("|134 F|"));
        assert!(out.ends_with("|     |\n"));
    }
}
