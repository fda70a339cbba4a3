use std::sync::mpsc::Sender;
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Percent-complete observer. Invoked synchronously from whichever worker
/// performed the mutation; implementations must not block.
pub trait ProgressSink: Send + Sync {
    fn on_progress(&self, percent: u8, message: &str);
}

/// Log-line observer. Same invocation rules as [`ProgressSink`].
pub trait LogSink: Send + Sync {
    fn on_log(&self, line: &str);
}

/// Discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl ProgressSink for NullSink {
    fn on_progress(&self, _percent: u8, _message: &str) {}
}

impl LogSink for NullSink {
    fn on_log(&self, _line: &str) {}
}

/// A shared null sink for callers that don't observe the run.
pub static NULL_SINK: NullSink = NullSink;

/// Forwards log lines into an mpsc channel so a slow consumer drains at its
/// own pace instead of stalling the worker pool.
pub struct ChannelLogSink {
    tx: Mutex<Sender<String>>,
}

impl ChannelLogSink {
    pub fn new(tx: Sender<String>) -> Self {
        Self { tx: Mutex::new(tx) }
    }
}

impl LogSink for ChannelLogSink {
    fn on_log(&self, line: &str) {
        if let Ok(tx) = self.tx.lock() {
            // A closed receiver just means nobody is listening anymore.
            let _ = tx.send(line.to_string());
        }
    }
}

/// Progress throttle: 0% and 100% always go out; intermediate updates only
/// after a minimum percentage step or a minimum interval. A pending unsent
/// update is flushed before the run reports completion, so the final state
/// is never dropped.
pub struct ProgressThrottle {
    step: u8,
    min_interval: Duration,
    last_sent: Option<u8>,
    last_instant: Option<Instant>,
    pending: Option<(u8, String)>,
}

pub const DEFAULT_PROGRESS_STEP: u8 = 5;
pub const DEFAULT_PROGRESS_INTERVAL: Duration = Duration::from_millis(150);

impl Default for ProgressThrottle {
    fn default() -> Self {
        Self::new(DEFAULT_PROGRESS_STEP, DEFAULT_PROGRESS_INTERVAL)
    }
}

impl ProgressThrottle {
    pub fn new(step: u8, min_interval: Duration) -> Self {
        Self {
            step,
            min_interval,
            last_sent: None,
            last_instant: None,
            pending: None,
        }
    }

    pub fn update(&mut self, sink: &dyn ProgressSink, percent: u8, message: &str) {
        let percent = percent.min(100);
        let due = match (self.last_sent, self.last_instant) {
            (None, _) => true,
            (Some(_), _) if percent == 100 => true,
            (Some(last), instant) => {
                percent.saturating_sub(last) >= self.step
                    || instant.is_some_and(|at| at.elapsed() >= self.min_interval)
            },
        };
        if due {
            self.send(sink, percent, message);
        } else {
            self.pending = Some((percent, message.to_string()));
        }
    }

    pub fn last_sent(&self) -> Option<u8> {
        self.last_sent
    }

    /// Flush the pending unsent update, if any.
    pub fn finish(&mut self, sink: &dyn ProgressSink) {
        if let Some((percent, message)) = self.pending.take() {
            if self.last_sent != Some(percent) {
                self.send(sink, percent, &message);
            }
        }
    }

    fn send(&mut self, sink: &dyn ProgressSink, percent: u8, message: &str) {
        sink.on_progress(percent, message);
        self.last_sent = Some(percent);
        self.last_instant = Some(Instant::now());
        self.pending = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;

    #[derive(Default)]
    struct Recorder {
        sent: Mutex<Vec<u8>>,
    }

    impl ProgressSink for Recorder {
        fn on_progress(&self, percent: u8, _message: &str) {
            self.sent.lock().unwrap().push(percent);
        }
    }

    #[test]
    fn test_first_and_final_always_sent() {
        let recorder = Recorder::default();
        let mut throttle = ProgressThrottle::new(5, Duration::from_secs(3600));
        throttle.update(&recorder, 0, "start");
        throttle.update(&recorder, 1, "one");
        throttle.update(&recorder, 2, "two");
        throttle.finish(&recorder);
        throttle.update(&recorder, 100, "done");
        assert_eq!(*recorder.sent.lock().unwrap(), vec![0, 2, 100]);
    }

    #[test]
    fn test_step_threshold() {
        let recorder = Recorder::default();
        let mut throttle = ProgressThrottle::new(5, Duration::from_secs(3600));
        throttle.update(&recorder, 0, "");
        throttle.update(&recorder, 3, "");
        throttle.update(&recorder, 5, "");
        throttle.update(&recorder, 9, "");
        throttle.update(&recorder, 10, "");
        assert_eq!(*recorder.sent.lock().unwrap(), vec![0, 5, 10]);
    }

    #[test]
    fn test_finish_skips_duplicate() {
        let recorder = Recorder::default();
        let mut throttle = ProgressThrottle::new(5, Duration::from_secs(3600));
        throttle.update(&recorder, 0, "");
        throttle.update(&recorder, 50, "");
        // Pending update at the same percent as the last one sent.
        throttle.update(&recorder, 50, "");
        throttle.finish(&recorder);
        assert_eq!(*recorder.sent.lock().unwrap(), vec![0, 50]);
    }

    #[test]
    fn test_channel_log_sink() {
        let (tx, rx) = mpsc::channel();
        let sink = ChannelLogSink::new(tx);
        sink.on_log("hello");
        sink.on_log("world");
        assert_eq!(rx.recv().unwrap(), "hello");
        assert_eq!(rx.recv().unwrap(), "world");
    }
}
