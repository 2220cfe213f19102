// Terminal Render Target
// One line per frame: "{days}d {hh}:{mm}:{ss}"

use colored::Colorize;
use promo_countdown_core::domain::Frame;
use promo_countdown_core::port::{RenderError, RenderTarget};
use std::io::{self, Write};
use std::sync::Mutex;

/// How consecutive frames are laid out
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LineMode {
    /// Each frame on its own line
    #[default]
    Newline,
    /// Redraw a single line with a carriage return
    Overwrite,
}

/// RenderTarget writing frames to any `Write` sink
pub struct TerminalRenderTarget<W: Write + Send> {
    out: Mutex<W>,
    label: Option<String>,
    color: bool,
    mode: LineMode,
}

impl TerminalRenderTarget<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write + Send> TerminalRenderTarget<W> {
    pub fn new(out: W) -> Self {
        Self {
            out: Mutex::new(out),
            label: None,
            color: false,
            mode: LineMode::default(),
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    pub fn with_mode(mut self, mode: LineMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn into_inner(self) -> W {
        self.out
            .into_inner()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn format_line(&self, frame: &Frame) -> String {
        let clock = if self.color {
            format!(
                "{}{} {}:{}:{}",
                frame.days.bold().yellow(),
                "d".yellow(),
                frame.hours.bold(),
                frame.minutes.bold(),
                frame.seconds.bold()
            )
        } else {
            frame.to_string()
        };

        match &self.label {
            Some(label) if self.color => format!("{} {}", label.cyan().bold(), clock),
            Some(label) => format!("{} {}", label, clock),
            None => clock,
        }
    }
}

impl<W: Write + Send> RenderTarget for TerminalRenderTarget<W> {
    fn render(&self, frame: &Frame) -> Result<(), RenderError> {
        let line = self.format_line(frame);
        let mut out = self
            .out
            .lock()
            .map_err(|_| RenderError::Detached("terminal writer poisoned".to_string()))?;

        match self.mode {
            LineMode::Newline => writeln!(out, "{}", line)?,
            LineMode::Overwrite => write!(out, "\r{}", line)?,
        }
        out.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use promo_countdown_core::domain::TimeRemaining;

    fn frame(total_millis: i64) -> Frame {
        Frame::from(&TimeRemaining::from_millis(total_millis))
    }

    struct BrokenPipe;

    impl Write for BrokenPipe {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_plain_lines() {
        let target = TerminalRenderTarget::new(Vec::new());
        target.render(&frame(90_061_000)).unwrap();
        target.render(&frame(90_060_000)).unwrap();

        let output = String::from_utf8(target.into_inner()).unwrap();
        assert_eq!(output, "1d 01:01:01\n1d 01:01:00\n");
    }

    #[test]
    fn test_label_prefix() {
        let target = TerminalRenderTarget::new(Vec::new()).with_label("Sale ends in");
        target.render(&frame(5_000)).unwrap();

        let output = String::from_utf8(target.into_inner()).unwrap();
        assert_eq!(output, "Sale ends in 0d 00:00:05\n");
    }

    #[test]
    fn test_overwrite_mode_uses_carriage_return() {
        let target = TerminalRenderTarget::new(Vec::new()).with_mode(LineMode::Overwrite);
        target.render(&frame(2_000)).unwrap();
        target.render(&frame(1_000)).unwrap();

        let output = String::from_utf8(target.into_inner()).unwrap();
        assert_eq!(output, "\r0d 00:00:02\r0d 00:00:01");
    }

    #[test]
    fn test_colored_line_keeps_frame_text() {
        colored::control::set_override(true);
        let target = TerminalRenderTarget::new(Vec::new())
            .with_label("Sale ends in")
            .with_color(true);
        target.render(&frame(3_661_000)).unwrap();
        colored::control::unset_override();

        let output = String::from_utf8(target.into_inner()).unwrap();
        assert!(output.contains("\u{1b}["), "expected ANSI escapes in {output:?}");
        assert!(output.contains("Sale ends in"));
        assert!(output.contains("01"));
        assert!(output.ends_with('\n'));
        assert_ne!(output, "Sale ends in 0d 01:01:01\n");
    }

    #[test]
    fn test_write_failure_is_io_error() {
        let target = TerminalRenderTarget::new(BrokenPipe);
        let result = target.render(&frame(1_000));
        assert!(matches!(result, Err(RenderError::Io(_))));
    }
}
