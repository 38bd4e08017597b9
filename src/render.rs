//! Output rendering for the terminal chat.
//!
//! The binary drives a [`Renderer`] with revealed reply text, failure notices
//! and informational lines. [`PlainTextRenderer`] writes to stdout (or any
//! writer) with optional ANSI styling.

use std::io::{self, Write};

use crate::chat::FailureNotice;

/// ANSI escape code for dim text (used for the pending-reply indicator).
const ANSI_DIM: &str = "\x1b[2m";

/// ANSI escape code for bold text (used for speaker labels).
const ANSI_BOLD: &str = "\x1b[1m";

/// ANSI escape code to reset all styling.
const ANSI_RESET: &str = "\x1b[0m";

/// ANSI escape code for cyan text (used for cold-start notices).
const ANSI_CYAN: &str = "\x1b[36m";

/// ANSI escape code for yellow text (used for rate-limit notices).
const ANSI_YELLOW: &str = "\x1b[33m";

/// ANSI escape code for red text (used for errors).
const ANSI_RED: &str = "\x1b[31m";

/// Trait for rendering chat output.
///
/// This abstraction allows for different rendering strategies:
/// - Plain text with ANSI styling
/// - Plain text without styling (for piping/redirecting)
pub trait Renderer: Send {
    /// Called while a reply is pending.
    fn print_waiting(&mut self) {}

    /// Called before the first frame of a reply.
    fn start_reply(&mut self);

    /// Print newly revealed reply text.
    ///
    /// This is called once per animation frame with only the new characters.
    fn print_text(&mut self, text: &str);

    /// Called when a reply is fully revealed.
    fn finish_reply(&mut self);

    /// Print a failure notice.
    fn print_failure(&mut self, notice: &FailureNotice);

    /// Print an error message.
    fn print_error(&mut self, error: &str);

    /// Print an informational message.
    fn print_info(&mut self, info: &str);

    /// Called when a reply or reveal is interrupted by the user.
    fn print_interrupted(&mut self) {}
}

/// Plain text renderer with optional ANSI styling.
pub struct PlainTextRenderer {
    out: Box<dyn Write + Send>,
    use_color: bool,
    line_start: bool,
    waiting: bool,
}

impl PlainTextRenderer {
    /// Creates a new PlainTextRenderer with ANSI colors enabled.
    pub fn new() -> Self {
        Self::with_color(true)
    }

    /// Creates a new PlainTextRenderer with specified color setting.
    pub fn with_color(use_color: bool) -> Self {
        Self::with_writer(Box::new(io::stdout()), use_color)
    }

    /// Creates a renderer that writes to `out`.
    pub fn with_writer(out: Box<dyn Write + Send>, use_color: bool) -> Self {
        Self {
            out,
            use_color,
            line_start: true,
            waiting: false,
        }
    }

    fn write(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        let _ = self.out.write_all(text.as_bytes());
        let _ = self.out.flush();
        self.line_start = text.ends_with('\n');
    }

    fn styled(&self, style: &str, text: &str) -> String {
        if self.use_color {
            format!("{style}{text}{ANSI_RESET}")
        } else {
            text.to_string()
        }
    }

    fn ensure_line_start(&mut self) {
        if !self.line_start {
            self.write("\n");
        }
    }

    fn clear_waiting(&mut self) {
        if self.waiting {
            self.waiting = false;
            self.ensure_line_start();
        }
    }
}

impl Default for PlainTextRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer for PlainTextRenderer {
    fn print_waiting(&mut self) {
        if self.waiting {
            return;
        }
        self.ensure_line_start();
        let indicator = self.styled(ANSI_DIM, "…");
        self.write(&indicator);
        self.waiting = true;
    }

    fn start_reply(&mut self) {
        self.clear_waiting();
        self.ensure_line_start();
        let label = self.styled(ANSI_BOLD, "assistant>");
        self.write(&format!("{label} "));
    }

    fn print_text(&mut self, text: &str) {
        self.write(text);
    }

    fn finish_reply(&mut self) {
        self.write("\n");
    }

    fn print_failure(&mut self, notice: &FailureNotice) {
        self.clear_waiting();
        self.ensure_line_start();
        let line = if notice.is_rate_limit {
            self.styled(ANSI_YELLOW, &format!("[rate limited] {}", notice.message))
        } else if notice.is_waking_up {
            self.styled(ANSI_CYAN, &format!("[waking up] {}", notice.message))
        } else {
            self.styled(ANSI_RED, &format!("Error: {}", notice.message))
        };
        self.write(&format!("{line}\n"));
    }

    fn print_error(&mut self, error: &str) {
        self.clear_waiting();
        self.ensure_line_start();
        let line = self.styled(ANSI_RED, &format!("Error: {error}"));
        self.write(&format!("{line}\n"));
    }

    fn print_info(&mut self, info: &str) {
        self.clear_waiting();
        self.ensure_line_start();
        self.write(&format!("{info}\n"));
    }

    fn print_interrupted(&mut self) {
        self.clear_waiting();
        self.ensure_line_start();
        self.write("[interrupted]\n");
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl Captured {
        fn text(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    fn renderer(use_color: bool) -> (Captured, PlainTextRenderer) {
        let captured = Captured::default();
        let renderer = PlainTextRenderer::with_writer(Box::new(captured.clone()), use_color);
        (captured, renderer)
    }

    #[test]
    fn renderer_default_has_color() {
        let renderer = PlainTextRenderer::new();
        assert!(renderer.use_color);
    }

    #[test]
    fn reply_frames_concatenate() {
        let (captured, mut renderer) = renderer(false);
        renderer.print_waiting();
        renderer.start_reply();
        renderer.print_text("O");
        renderer.print_text("K");
        renderer.finish_reply();
        assert_eq!(captured.text(), "…\nassistant> OK\n");
    }

    #[test]
    fn failure_notices_are_labeled() {
        let (captured, mut renderer) = renderer(false);
        renderer.print_failure(&FailureNotice {
            message: "Too many messages. Please wait 5 seconds.".to_string(),
            is_rate_limit: true,
            is_waking_up: false,
        });
        renderer.print_failure(&FailureNotice {
            message: "later".to_string(),
            is_rate_limit: false,
            is_waking_up: true,
        });
        renderer.print_failure(&FailureNotice {
            message: "boom".to_string(),
            is_rate_limit: false,
            is_waking_up: false,
        });
        assert_eq!(
            captured.text(),
            "[rate limited] Too many messages. Please wait 5 seconds.\n\
             [waking up] later\n\
             Error: boom\n"
        );
    }

    #[test]
    fn color_wraps_styles() {
        let (captured, mut renderer) = renderer(true);
        renderer.print_error("boom");
        assert_eq!(captured.text(), format!("{ANSI_RED}Error: boom{ANSI_RESET}\n"));
    }

    #[test]
    fn info_starts_on_a_fresh_line() {
        let (captured, mut renderer) = renderer(false);
        renderer.start_reply();
        renderer.print_text("partial");
        renderer.print_interrupted();
        renderer.print_info("cleared");
        assert_eq!(
            captured.text(),
            "assistant> partial\n[interrupted]\ncleared\n"
        );
    }
}
