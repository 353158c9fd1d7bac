use log::{Level, log_enabled};
use std::time::{Duration, Instant};

/// Scoped timer for the phases of a detection cycle.
///
/// Emits `trace!` lines on entry and exit and, when given a sink, adds the
/// elapsed time to it on drop.
pub struct ScopedTimer<'a> {
    label: &'a str,
    start: Instant,
    sink: Option<&'a mut Duration>,
}

impl<'a> ScopedTimer<'a> {
    pub fn new(label: &'a str) -> Self {
        if log_enabled!(Level::Trace) {
            log::trace!("start {label}");
        }
        Self {
            label,
            start: Instant::now(),
            sink: None,
        }
    }

    /// Same as [`ScopedTimer::new`] but accumulates into `sink`.
    pub fn accumulate(label: &'a str, sink: &'a mut Duration) -> Self {
        let mut timer = Self::new(label);
        timer.sink = Some(sink);
        timer
    }
}

impl<'a> Drop for ScopedTimer<'a> {
    fn drop(&mut self) {
        let elapsed = self.start.elapsed();
        if let Some(sink) = self.sink.as_mut() {
            **sink += elapsed;
        }
        if log_enabled!(Level::Trace) {
            log::trace!("end {} ({} µs)", self.label, elapsed.as_micros());
        }
    }
}
