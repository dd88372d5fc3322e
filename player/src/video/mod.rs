//! Media playback for the player
//!
//! Decoding, timing and audio output are handled by GStreamer. This module
//! wraps a `playbin` whose video sink is an RGBA `AppSink`:
//!
//! - `pipeline`: GStreamer pipeline setup and the per-frame callback
//! - `frames`: latest-frame slot shared between the callback and the UI
//! - `stats`: presented/dropped counters
//! - `playback`: the [`Playback`] transport controller
//!
//! # Frame timing
//!
//! The AppSink runs with `sync=true`, so each sample is handed over when it
//! is due for presentation. The callback stamps it with
//! [`common::clock::precise_time`] before doing anything else and queues a
//! [`common::FrameRecord`]; the log file itself is written on another thread.

#[cfg(feature = "video")]
mod frames;
#[cfg(feature = "video")]
mod pipeline;
#[cfg(feature = "video")]
mod playback;
#[cfg(feature = "video")]
mod stats;

#[cfg(feature = "video")]
pub use pipeline::initialize;
#[cfg(feature = "video")]
pub use playback::Playback;

#[cfg(not(feature = "video"))]
pub use playback_stub::{Playback, initialize};

use std::sync::Arc;
use thiserror::Error;

/// Called from the streaming thread whenever a new frame is ready to draw.
pub type RepaintNotifier = Arc<dyn Fn() + Send + Sync>;

/// Playback errors
#[derive(Error, Debug)]
pub enum PlaybackError {
    #[error("Failed to initialize GStreamer: {0}")]
    Init(String),

    #[error("Pipeline error: {0}")]
    Pipeline(String),

    #[error("Failed to change playback state: {0}")]
    StateChange(String),

    #[error("No media loaded")]
    NoMedia,

    #[error("Invalid media path: {0}")]
    Uri(String),

    #[error("Video support not compiled in")]
    Unsupported,
}

/// Decoded RGBA frame, rows tightly packed
#[derive(Debug, Clone)]
pub struct VideoFrame {
    pub width: usize,
    pub height: usize,
    pub pixels: Vec<u8>,
}

/// Playback position as a fraction of the duration.
///
/// `None` when the duration is unknown or zero.
pub fn normalized_position(position_ns: u64, duration_ns: u64) -> Option<f64> {
    if duration_ns == 0 {
        return None;
    }
    Some((position_ns as f64 / duration_ns as f64).clamp(0.0, 1.0))
}

#[cfg(not(feature = "video"))]
mod playback_stub {
    use super::{PlaybackError, RepaintNotifier, VideoFrame};
    use common::FrameLogHandle;
    use std::path::Path;

    pub fn initialize() -> Result<(), PlaybackError> {
        log::info!("Video support not compiled (build with --features video to enable)");
        Ok(())
    }

    /// Stub Playback when video feature is disabled
    pub struct Playback;

    impl Playback {
        pub fn load(
            _path: &Path,
            _movie: String,
            _log: FrameLogHandle,
            _notify: RepaintNotifier,
        ) -> Result<Self, PlaybackError> {
            Err(PlaybackError::Unsupported)
        }

        pub fn play(&mut self) -> Result<(), PlaybackError> {
            Err(PlaybackError::Unsupported)
        }

        pub fn pause(&mut self) -> Result<(), PlaybackError> {
            Ok(())
        }

        pub fn stop(&mut self) -> Result<(), PlaybackError> {
            Ok(())
        }

        pub fn is_playing(&self) -> bool {
            false
        }

        pub fn position(&self) -> Option<f64> {
            None
        }

        pub fn set_position(&mut self, _position: f64) -> Result<(), PlaybackError> {
            Ok(())
        }

        pub fn title(&self) -> Option<&str> {
            None
        }

        pub fn take_frame(&self) -> Option<VideoFrame> {
            None
        }

        pub fn update(&mut self) {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalized_position() {
        assert_eq!(normalized_position(0, 10_000), Some(0.0));
        assert_eq!(normalized_position(2_500, 10_000), Some(0.25));
        assert_eq!(normalized_position(10_000, 10_000), Some(1.0));
    }

    #[test]
    fn test_normalized_position_edge_cases() {
        assert_eq!(normalized_position(5, 0), None);
        // Last frame timestamps can overshoot the reported duration
        assert_eq!(normalized_position(10_040, 10_000), Some(1.0));
    }
}
