//! Structured progress reporting for summarization runs.
//!
//! One event when the document has been chunked, then one per completed
//! chunk summary.

use std::sync::Arc;
use std::time::Instant;

/// Progress event emitted during a summarization run.
#[derive(Debug, Clone)]
pub struct ProgressEvent {
    /// Phase of the operation: "chunk" or "summarize"
    pub phase: String,

    /// Current progress (chunks summarized so far)
    pub current: u64,

    /// Total expected work (if known)
    pub total: Option<u64>,

    /// Percentage complete (0.0 - 100.0)
    pub percentage: Option<f64>,

    /// Human-readable message
    pub message: String,

    /// Elapsed time since the reporter was created
    pub elapsed_secs: Option<f64>,
}

impl ProgressEvent {
    /// Create a new progress event.
    pub fn new(
        phase: impl Into<String>,
        current: u64,
        total: Option<u64>,
        message: impl Into<String>,
    ) -> Self {
        let percentage = total.map(|t| {
            if t > 0 {
                (current as f64 / t as f64) * 100.0
            } else {
                0.0
            }
        });

        Self {
            phase: phase.into(),
            current,
            total,
            percentage,
            message: message.into(),
            elapsed_secs: None,
        }
    }

    /// Set elapsed time.
    pub fn with_elapsed(mut self, elapsed_secs: f64) -> Self {
        self.elapsed_secs = Some(elapsed_secs);
        self
    }

    /// Format as a simple user-facing line.
    pub fn format_simple(&self) -> String {
        let progress = if let Some(total) = self.total {
            format!("{}/{}", self.current, total)
        } else {
            format!("{}", self.current)
        };

        let pct = if let Some(p) = self.percentage {
            format!(" ({:.0}%)", p)
        } else {
            String::new()
        };

        format!("[{}] {}{} - {}", self.phase, progress, pct, self.message)
    }
}

/// Callback for progress events.
pub type ProgressCallback = Arc<dyn Fn(ProgressEvent) + Send + Sync>;

/// Progress reporter that emits events through a callback.
#[derive(Clone)]
pub struct ProgressReporter {
    callback: Option<ProgressCallback>,
    start_time: Instant,
}

impl ProgressReporter {
    /// Create a new reporter with a callback.
    pub fn new(callback: ProgressCallback) -> Self {
        Self {
            callback: Some(callback),
            start_time: Instant::now(),
        }
    }

    /// Create a no-op reporter (no events emitted).
    pub fn noop() -> Self {
        Self {
            callback: None,
            start_time: Instant::now(),
        }
    }

    /// Emit a progress event.
    pub fn emit(&self, event: ProgressEvent) {
        if let Some(callback) = &self.callback {
            let elapsed = self.start_time.elapsed().as_secs_f64();
            let event_with_time = event.with_elapsed(elapsed);

            tracing::trace!(
                phase = %event_with_time.phase,
                current = event_with_time.current,
                total = ?event_with_time.total,
                message = %event_with_time.message,
                elapsed_secs = elapsed,
                "Progress event"
            );

            callback(event_with_time);
        }
    }

    /// Emit chunking phase event.
    pub fn chunked(&self, chunks: usize, chunk_size: usize) {
        self.emit(ProgressEvent::new(
            "chunk",
            chunks as u64,
            None,
            format!("{} chunks at {} tokens", chunks, chunk_size),
        ));
    }

    /// Emit summarization phase event for a completed chunk.
    pub fn summarized(&self, current: usize, total: usize, chunk_tokens: usize) {
        self.emit(ProgressEvent::new(
            "summarize",
            current as u64,
            Some(total as u64),
            format!("chunk of {} tokens", chunk_tokens),
        ));
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::noop()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn test_progress_event_format() {
        let event = ProgressEvent::new("summarize", 2, Some(4), "chunk of 480 tokens");
        let formatted = event.format_simple();
        assert_eq!(formatted, "[summarize] 2/4 (50%) - chunk of 480 tokens");
    }

    #[test]
    fn test_progress_event_zero_total() {
        let event = ProgressEvent::new("summarize", 0, Some(0), "nothing");
        assert_eq!(event.percentage, Some(0.0));
    }

    #[test]
    fn test_progress_reporter_emit() {
        let events = Arc::new(Mutex::new(Vec::new()));
        let events_clone = events.clone();

        let reporter = ProgressReporter::new(Arc::new(move |event| {
            events_clone.lock().unwrap().push(event);
        }));

        reporter.chunked(3, 500);
        reporter.summarized(1, 3, 420);

        let captured = events.lock().unwrap();
        assert_eq!(captured.len(), 2);
        assert_eq!(captured[0].phase, "chunk");
        assert_eq!(captured[1].phase, "summarize");
        assert_eq!(captured[1].current, 1);
        assert_eq!(captured[1].total, Some(3));
        assert!(captured[1].elapsed_secs.is_some());
    }

    #[test]
    fn test_noop_reporter() {
        let reporter = ProgressReporter::noop();
        reporter.summarized(1, 1, 10);
    }
}
