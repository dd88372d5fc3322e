//! Frame data handling
//!
//! The streaming thread stores the most recent decoded frame here; the UI
//! thread takes it when it repaints. Frames that are replaced before the UI
//! gets to them are simply skipped on screen (they are still logged).

use super::VideoFrame;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

/// Latest-frame slot shared with the GStreamer callback
pub struct FrameHandler {
    /// Most recent frame (RGBA from GStreamer)
    current_frame: Arc<Mutex<Option<VideoFrame>>>,

    /// Flag indicating a frame the UI has not taken yet
    new_frame_available: Arc<AtomicBool>,
}

impl FrameHandler {
    pub fn new() -> Self {
        Self {
            current_frame: Arc::new(Mutex::new(None)),
            new_frame_available: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Get clone of current_frame for GStreamer callback
    pub fn current_frame_handle(&self) -> Arc<Mutex<Option<VideoFrame>>> {
        Arc::clone(&self.current_frame)
    }

    /// Get clone of new_frame_available for GStreamer callback
    pub fn new_frame_flag_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.new_frame_available)
    }

    /// Take the pending frame, if any
    pub fn take_frame(&self) -> Option<VideoFrame> {
        if !self.new_frame_available.swap(false, Ordering::AcqRel) {
            return None;
        }
        self.current_frame.lock().ok()?.take()
    }

    /// Drop any pending frame
    pub fn clear(&self) {
        self.new_frame_available.store(false, Ordering::Release);
        if let Ok(mut frame) = self.current_frame.lock() {
            *frame = None;
        }
    }
}

impl Default for FrameHandler {
    fn default() -> Self {
        Self::new()
    }
}

/// Store `frame` as the latest one. Returns `true` if an untaken frame was replaced.
pub fn store_frame(
    slot: &Mutex<Option<VideoFrame>>,
    new_frame_flag: &AtomicBool,
    frame: VideoFrame,
) -> bool {
    let Ok(mut current) = slot.lock() else {
        return false;
    };
    let replaced = new_frame_flag.load(Ordering::Acquire) && current.is_some();
    *current = Some(frame);
    new_frame_flag.store(true, Ordering::Release);
    replaced
}

/// Copy `height` rows of `width` RGBA pixels out of a strided buffer.
pub fn pack_rows(data: &[u8], width: usize, height: usize, stride: usize) -> Option<Vec<u8>> {
    let row_bytes = width * 4;
    if stride < row_bytes {
        return None;
    }
    if height > 0 && data.len() < stride * (height - 1) + row_bytes {
        return None;
    }

    if stride == row_bytes {
        return Some(data[..row_bytes * height].to_vec());
    }

    let mut pixels = Vec::with_capacity(row_bytes * height);
    for row in 0..height {
        let start = row * stride;
        pixels.extend_from_slice(&data[start..start + row_bytes]);
    }
    Some(pixels)
}
