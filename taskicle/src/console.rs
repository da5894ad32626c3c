use std::io::Write;

use taskicle_core::ErrorSink;

/// Shows presented errors on stderr
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleSink;

impl ErrorSink for ConsoleSink {
    fn notify_error(&self, message: &str) {
        let mut stderr = std::io::stderr().lock();
        // Nothing sensible to do if stderr is gone.
        let _ = writeln!(stderr, "{message}");
    }
}
