//! GStreamer pipeline setup and the per-frame callback

use super::{PlaybackError, RepaintNotifier, VideoFrame, frames, normalized_position};
use common::{FrameLogHandle, FrameRecord, clock};
use gstreamer as gst;
use gstreamer::prelude::*;
use gstreamer_app as gst_app;
use gstreamer_video as gst_video;
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

/// Initialize GStreamer (idempotent, safe to call multiple times)
pub fn initialize() -> Result<(), PlaybackError> {
    static GSTREAMER_INITIALIZED: std::sync::OnceLock<Result<(), String>> =
        std::sync::OnceLock::new();

    GSTREAMER_INITIALIZED
        .get_or_init(|| {
            gst::init().map_err(|e| e.to_string())?;
            log::info!("GStreamer {} initialized", gst::version_string());
            Ok(())
        })
        .clone()
        .map_err(PlaybackError::Init)
}

/// Build a `playbin` for `path` that renders video into an RGBA AppSink
///
/// Audio goes to the default audio sink chosen by `playbin`.
///
/// # Returns
///
/// Tuple of (pipeline, app_sink) where app_sink can receive decoded frames
pub fn build_pipeline(path: &Path) -> Result<(gst::Pipeline, gst_app::AppSink), PlaybackError> {
    let absolute = path
        .canonicalize()
        .map_err(|e| PlaybackError::Uri(format!("{}: {}", path.display(), e)))?;
    let uri = gst::glib::filename_to_uri(&absolute, None)
        .map_err(|e| PlaybackError::Uri(format!("{}: {}", absolute.display(), e)))?;

    log::info!("Creating GStreamer pipeline for: {}", uri);

    let app_sink = gst::ElementFactory::make("appsink")
        .name("sink")
        .build()
        .map_err(|e| PlaybackError::Pipeline(format!("Failed to create appsink: {}", e)))?
        .dynamic_cast::<gst_app::AppSink>()
        .map_err(|_| PlaybackError::Pipeline("sink is not an AppSink".to_string()))?;

    configure_app_sink(&app_sink);

    let playbin = gst::ElementFactory::make("playbin")
        .name("player")
        .property("uri", uri.as_str())
        .build()
        .map_err(|e| PlaybackError::Pipeline(format!("Failed to create playbin: {}", e)))?;
    playbin.set_property("video-sink", &app_sink);

    let pipeline = playbin
        .dynamic_cast::<gst::Pipeline>()
        .map_err(|_| PlaybackError::Pipeline("playbin is not a gst::Pipeline".to_string()))?;

    Ok((pipeline, app_sink))
}

/// Configure AppSink for presentation-timed delivery
///
/// - `sync=true`: samples arrive when they are due on screen
/// - `max-buffers=1`, `drop=true`: never queue stale frames
/// - RGBA caps so frames upload straight into a texture
pub fn configure_app_sink(app_sink: &gst_app::AppSink) {
    let caps = gst_video::VideoCapsBuilder::new()
        .format(gst_video::VideoFormat::Rgba)
        .build();
    app_sink.set_caps(Some(&caps));
    app_sink.set_property("emit-signals", false);
    app_sink.set_property("sync", true);
    app_sink.set_property("max-buffers", 1u32);
    app_sink.set_property("drop", true);
}

/// Everything the frame callback owns; passed in instead of shared globals
pub struct FrameCallbackContext {
    pub movie: String,
    pub log: FrameLogHandle,
    pub notify: RepaintNotifier,
    pub current_frame: Arc<Mutex<Option<VideoFrame>>>,
    pub new_frame_flag: Arc<AtomicBool>,
    pub frames_presented: Arc<AtomicU64>,
    pub frames_skipped: Arc<AtomicU64>,
}

/// Setup frame callback for AppSink
///
/// Each sample is a position-change event: it is timestamped, queued for the
/// frame log, then stored for the UI to draw.
pub fn setup_frame_callback(app_sink: &gst_app::AppSink, ctx: FrameCallbackContext) {
    app_sink.set_callbacks(
        gst_app::AppSinkCallbacks::builder()
            .new_sample(move |sink| {
                let frame_time = clock::precise_time();

                let sample = sink.pull_sample().map_err(|_| gst::FlowError::Eos)?;
                let buffer = sample.buffer().ok_or(gst::FlowError::Error)?;
                ctx.frames_presented.fetch_add(1, Ordering::Relaxed);

                let position = buffer
                    .pts()
                    .or_else(|| sink.query_position::<gst::ClockTime>())
                    .zip(sink.query_duration::<gst::ClockTime>())
                    .and_then(|(pos, dur)| normalized_position(pos.nseconds(), dur.nseconds()));

                match position {
                    Some(position) => {
                        ctx.log
                            .submit(FrameRecord::new(ctx.movie.as_str(), position, frame_time));
                    }
                    None => log::trace!("Frame without known position, not logged"),
                }

                let caps = sample.caps().ok_or(gst::FlowError::Error)?;
                let info =
                    gst_video::VideoInfo::from_caps(caps).map_err(|_| gst::FlowError::Error)?;
                let map = buffer.map_readable().map_err(|_| gst::FlowError::Error)?;

                let width = info.width() as usize;
                let height = info.height() as usize;
                let stride = info.stride()[0] as usize;
                let pixels = frames::pack_rows(map.as_slice(), width, height, stride)
                    .ok_or(gst::FlowError::Error)?;

                let replaced = frames::store_frame(
                    &ctx.current_frame,
                    &ctx.new_frame_flag,
                    VideoFrame {
                        width,
                        height,
                        pixels,
                    },
                );
                if replaced {
                    ctx.frames_skipped.fetch_add(1, Ordering::Relaxed);
                    log::trace!("Video frame replaced before it was drawn");
                }

                (ctx.notify)();
                Ok(gst::FlowSuccess::Ok)
            })
            .build(),
    );
}
