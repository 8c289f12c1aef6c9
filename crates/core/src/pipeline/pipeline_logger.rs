use std::collections::HashMap;
use std::time::Instant;

/// Observer for batch-level pipeline events.
///
/// The directory use case reports through this on the coordinating thread,
/// so implementations need no internal locking.
pub trait PipelineLogger: Send {
    /// A file finished (successfully or not): `current` of `total` done.
    fn progress(&mut self, current: usize, total: usize);

    /// Record how long a named stage took for one file.
    fn timing(&mut self, stage: &str, duration_ms: f64);

    /// Log a human-readable status message.
    fn info(&mut self, message: &str);

    /// Emit an end-of-run summary. Default: no-op.
    fn summary(&self) {}
}

/// Discards all events. Used by tests and embedders with their own reporting.
pub struct NullPipelineLogger;

impl PipelineLogger for NullPipelineLogger {
    fn progress(&mut self, _current: usize, _total: usize) {}
    fn timing(&mut self, _stage: &str, _duration_ms: f64) {}
    fn info(&mut self, _message: &str) {}
}

/// Logs progress through the `log` facade and keeps per-stage timings for
/// a closing summary.
pub struct StdoutPipelineLogger {
    timings: HashMap<String, Vec<f64>>,
    start_time: Instant,
    files_done: usize,
}

impl StdoutPipelineLogger {
    pub fn new() -> Self {
        Self {
            timings: HashMap::new(),
            start_time: Instant::now(),
            files_done: 0,
        }
    }

    /// Returns the formatted summary, or `None` if no file was processed.
    pub fn summary_string(&self) -> Option<String> {
        if self.files_done == 0 && self.timings.is_empty() {
            return None;
        }

        let elapsed_s = self.start_time.elapsed().as_secs_f64();
        let mut lines = vec![format!(
            "Transcription summary ({} files, {elapsed_s:.1}s total):",
            self.files_done
        )];

        let mut stages: Vec<_> = self.timings.keys().collect();
        stages.sort();
        for stage in stages {
            let durations = &self.timings[stage];
            let total_ms: f64 = durations.iter().sum();
            let avg_ms = total_ms / durations.len().max(1) as f64;
            let max_ms = durations.iter().copied().fold(0.0, f64::max);
            lines.push(format!(
                "  {stage:12}: avg {:7.1}s  max {:7.1}s  total {:8.1}s",
                avg_ms / 1000.0,
                max_ms / 1000.0,
                total_ms / 1000.0
            ));
        }

        if self.files_done > 0 && elapsed_s > 0.0 {
            let per_minute = self.files_done as f64 / (elapsed_s / 60.0);
            lines.push(format!("  Throughput: {per_minute:.1} files/min"));
        }

        Some(lines.join("\n"))
    }

    pub fn timings_for(&self, stage: &str) -> Option<&[f64]> {
        self.timings.get(stage).map(|v| v.as_slice())
    }
}

impl Default for StdoutPipelineLogger {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineLogger for StdoutPipelineLogger {
    fn progress(&mut self, current: usize, total: usize) {
        self.files_done = current;
        if total > 0 {
            let pct = current as f64 / total as f64 * 100.0;
            log::info!("Transcribed files: {current}/{total} ({pct:.1}%)");
        }
    }

    fn timing(&mut self, stage: &str, duration_ms: f64) {
        self.timings
            .entry(stage.to_string())
            .or_default()
            .push(duration_ms);
    }

    fn info(&mut self, message: &str) {
        log::info!("{message}");
    }

    fn summary(&self) {
        if let Some(text) = self.summary_string() {
            log::info!("\n\n{text}");
        }
    }
}
