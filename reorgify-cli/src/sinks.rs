use reorgify_core::{LogSink, ProgressSink};

/// Progress and log lines on stderr, one line each, silenced by --quiet.
/// Invoked synchronously from worker threads, so it only ever writes.
pub struct ConsoleSink {
    quiet: bool,
}

impl ConsoleSink {
    pub fn new(quiet: bool) -> Self {
        Self { quiet }
    }
}

impl ProgressSink for ConsoleSink {
    fn on_progress(&self, percent: u8, message: &str) {
        if !self.quiet {
            eprintln!("[{percent:>3}%] {message}");
        }
    }
}

impl LogSink for ConsoleSink {
    fn on_log(&self, line: &str) {
        if !self.quiet {
            eprintln!("{line}");
        }
    }
}
