//! Playback statistics
//!
//! Counts frames presented by GStreamer, frames the UI never got to draw and
//! frame records the log queue had to drop.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

pub struct PlaybackStats {
    /// Frames delivered by the AppSink (one log record each)
    frames_presented: Arc<AtomicU64>,

    /// Frames replaced before the UI drew them
    frames_skipped: Arc<AtomicU64>,

    /// Last time stats were logged
    last_stats_log: Instant,
}

impl PlaybackStats {
    pub fn new() -> Self {
        Self {
            frames_presented: Arc::new(AtomicU64::new(0)),
            frames_skipped: Arc::new(AtomicU64::new(0)),
            last_stats_log: Instant::now(),
        }
    }

    /// Get clone of frames_presented counter for GStreamer callback
    pub fn frames_presented_handle(&self) -> Arc<AtomicU64> {
        Arc::clone(&self.frames_presented)
    }

    /// Get clone of frames_skipped counter for GStreamer callback
    pub fn frames_skipped_handle(&self) -> Arc<AtomicU64> {
        Arc::clone(&self.frames_skipped)
    }

    pub fn frames_presented(&self) -> u64 {
        self.frames_presented.load(Ordering::Relaxed)
    }

    /// Percentage of presented frames that never reached the screen
    pub fn skip_rate(&self) -> f64 {
        let presented = self.frames_presented();
        if presented == 0 {
            0.0
        } else {
            self.frames_skipped.load(Ordering::Relaxed) as f64 / presented as f64 * 100.0
        }
    }

    /// Log statistics if interval has elapsed
    pub fn maybe_log_stats(&mut self, interval: Duration, records_dropped: u64) {
        if self.last_stats_log.elapsed() < interval {
            return;
        }

        log::info!(
            "Playback stats: {} frames presented, {:.1}% not drawn, {} log records dropped",
            self.frames_presented(),
            self.skip_rate(),
            records_dropped
        );

        self.last_stats_log = Instant::now();
    }
}

impl Default for PlaybackStats {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_skip_rate() {
        let stats = PlaybackStats::new();
        assert_eq!(stats.skip_rate(), 0.0);

        stats.frames_presented_handle().fetch_add(8, Ordering::Relaxed);
        stats.frames_skipped_handle().fetch_add(2, Ordering::Relaxed);
        assert_eq!(stats.frames_presented(), 8);
        assert_eq!(stats.skip_rate(), 25.0);
    }
}
