//! Transport controller for one media file

use super::frames::FrameHandler;
use super::pipeline::{self, FrameCallbackContext};
use super::stats::PlaybackStats;
use super::{PlaybackError, RepaintNotifier, VideoFrame, normalized_position};
use common::FrameLogHandle;
use gstreamer as gst;
use gstreamer::prelude::*;
use gstreamer_app as gst_app;
use std::path::Path;
use std::time::Duration;

/// How long `load` waits for the media to preroll
const PREROLL_TIMEOUT_SECS: u64 = 10;

pub struct Playback {
    /// GStreamer pipeline (`playbin`)
    pipeline: gst::Pipeline,

    /// App sink receiving decoded frames
    app_sink: gst_app::AppSink,

    /// Latest-frame slot
    frames: FrameHandler,

    /// Statistics tracker
    stats: PlaybackStats,

    /// Producer side of the frame log, for drop counts
    log: FrameLogHandle,

    /// Title tag, when the container carries one
    title: Option<String>,

    is_playing: bool,

    /// End of stream reached; the next play restarts from the beginning
    at_end: bool,
}

impl Playback {
    /// Load a media file, parse its metadata and leave it paused on the first frame
    ///
    /// # Arguments
    ///
    /// * `path` - Media file
    /// * `movie` - Name written in the frame log, see [`common::movie_name`]
    /// * `log` - Frame log queue fed by the streaming thread
    /// * `notify` - Called when a new frame is ready to draw
    pub fn load(
        path: &Path,
        movie: String,
        log: FrameLogHandle,
        notify: RepaintNotifier,
    ) -> Result<Self, PlaybackError> {
        pipeline::initialize()?;
        log::info!("Loading media: {}", path.display());

        let (pipeline, app_sink) = pipeline::build_pipeline(path)?;

        let frames = FrameHandler::new();
        let stats = PlaybackStats::new();

        pipeline::setup_frame_callback(
            &app_sink,
            FrameCallbackContext {
                movie,
                log: log.clone(),
                notify,
                current_frame: frames.current_frame_handle(),
                new_frame_flag: frames.new_frame_flag_handle(),
                frames_presented: stats.frames_presented_handle(),
                frames_skipped: stats.frames_skipped_handle(),
            },
        );

        let mut playback = Self {
            pipeline,
            app_sink,
            frames,
            stats,
            log,
            title: None,
            is_playing: false,
            at_end: false,
        };

        playback.preroll()?;
        Ok(playback)
    }

    /// Pause the pipeline and wait until tags and duration are known
    fn preroll(&mut self) -> Result<(), PlaybackError> {
        self.pipeline
            .set_state(gst::State::Paused)
            .map_err(|e| PlaybackError::StateChange(e.to_string()))?;

        let (result, _, _) = self
            .pipeline
            .state(Some(gst::ClockTime::from_seconds(PREROLL_TIMEOUT_SECS)));

        // Tags and errors posted during preroll
        let error = self.drain_bus();

        if let Err(e) = result {
            return Err(PlaybackError::Pipeline(
                error.unwrap_or_else(|| format!("Preroll failed: {}", e)),
            ));
        }

        if let Some(duration) = self.pipeline.query_duration::<gst::ClockTime>() {
            log::info!(
                "Media ready: duration {:.1}s, title {:?}",
                Duration::from_nanos(duration.nseconds()).as_secs_f64(),
                self.title
            );
        }
        Ok(())
    }

    /// Start or resume playback
    pub fn play(&mut self) -> Result<(), PlaybackError> {
        if self.at_end {
            self.seek_to_start();
            self.at_end = false;
        }

        log::info!("Starting playback");
        self.pipeline
            .set_state(gst::State::Playing)
            .map_err(|e| PlaybackError::StateChange(e.to_string()))?;
        self.is_playing = true;
        Ok(())
    }

    pub fn pause(&mut self) -> Result<(), PlaybackError> {
        log::info!("Pausing playback");
        self.pipeline
            .set_state(gst::State::Paused)
            .map_err(|e| PlaybackError::StateChange(e.to_string()))?;
        self.is_playing = false;
        Ok(())
    }

    /// Stop playback; the next `play` starts from the beginning
    pub fn stop(&mut self) -> Result<(), PlaybackError> {
        log::info!("Stopping playback");
        self.pipeline
            .set_state(gst::State::Ready)
            .map_err(|e| PlaybackError::StateChange(e.to_string()))?;
        self.is_playing = false;
        self.at_end = false;
        self.frames.clear();
        Ok(())
    }

    pub fn is_playing(&self) -> bool {
        self.is_playing
    }

    /// Normalized playback position
    pub fn position(&self) -> Option<f64> {
        let position = self.pipeline.query_position::<gst::ClockTime>()?;
        let duration = self.pipeline.query_duration::<gst::ClockTime>()?;
        normalized_position(position.nseconds(), duration.nseconds())
    }

    /// Seek to a normalized position
    pub fn set_position(&mut self, position: f64) -> Result<(), PlaybackError> {
        let duration = self
            .pipeline
            .query_duration::<gst::ClockTime>()
            .ok_or_else(|| PlaybackError::Pipeline("Duration unknown".to_string()))?;
        let target = (duration.nseconds() as f64 * position.clamp(0.0, 1.0)) as u64;

        log::debug!("Seeking to {:.3} ({}ns)", position, target);
        self.pipeline
            .seek_simple(
                gst::SeekFlags::FLUSH | gst::SeekFlags::KEY_UNIT,
                gst::ClockTime::from_nseconds(target),
            )
            .map_err(|e| PlaybackError::Pipeline(format!("Seek failed: {}", e)))
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    /// Take the newest decoded frame, if one arrived since the last call
    pub fn take_frame(&self) -> Option<VideoFrame> {
        self.frames.take_frame()
    }

    /// Process pending bus messages; call once per UI frame
    pub fn update(&mut self) {
        if let Some(error) = self.drain_bus() {
            log::error!("Playback stopped: {}", error);
        }
        self.stats
            .maybe_log_stats(Duration::from_secs(10), self.log.dropped());
    }

    /// Drain ALL bus messages. Returns the last error message, if any.
    fn drain_bus(&mut self) -> Option<String> {
        let bus = self.pipeline.bus()?;
        let mut last_error = None;

        while let Some(msg) = bus.pop() {
            match msg.view() {
                gst::MessageView::Eos(_) => {
                    log::info!(
                        "Playback finished after {} frames",
                        self.stats.frames_presented()
                    );
                    self.is_playing = false;
                    self.at_end = true;
                }

                gst::MessageView::Error(err) => {
                    log::error!(
                        "GStreamer error: {} (debug: {:?})",
                        err.error(),
                        err.debug()
                    );
                    self.is_playing = false;
                    last_error = Some(err.error().to_string());
                }

                gst::MessageView::Tag(tag) => {
                    let tags = tag.tags();
                    if self.title.is_none()
                        && let Some(title) = tags.get::<gst::tags::Title>()
                    {
                        let title = title.get().trim();
                        if !title.is_empty() {
                            log::debug!("Title tag: {}", title);
                            self.title = Some(title.to_string());
                        }
                    }
                }

                _ => {
                    // Drain other messages to prevent memory leak
                }
            }
        }

        last_error
    }

    fn seek_to_start(&self) {
        if let Err(e) = self.pipeline.seek_simple(
            gst::SeekFlags::FLUSH | gst::SeekFlags::KEY_UNIT,
            gst::ClockTime::ZERO,
        ) {
            log::warn!("Failed to rewind: {}", e);
        }
    }
}

impl Drop for Playback {
    fn drop(&mut self) {
        log::info!("Playback::drop - Stopping pipeline and cleaning up resources");

        // Clear callbacks first so the frame log stops receiving records
        self.app_sink
            .set_callbacks(gst_app::AppSinkCallbacks::builder().build());

        match self.pipeline.set_state(gst::State::Null) {
            Ok(_) => {
                let (result, current, pending) =
                    self.pipeline.state(Some(gst::ClockTime::from_seconds(2)));
                if let Err(e) = result {
                    log::warn!("Failed to get pipeline final state: {:?}", e);
                } else {
                    log::debug!(
                        "Pipeline final state: current={:?}, pending={:?}",
                        current,
                        pending
                    );
                }
            }
            Err(e) => {
                log::warn!("Failed to set pipeline state to Null: {}", e);
            }
        }

        if let Some(bus) = self.pipeline.bus() {
            let mut drained = 0;
            while bus.pop().is_some() {
                drained += 1;
            }
            if drained > 0 {
                log::debug!("Drained {} pending messages from bus", drained);
            }
        }

        self.frames.clear();

        log::info!(
            "Playback::drop - Pipeline stopped ({} frames presented, {} log records dropped)",
            self.stats.frames_presented(),
            self.log.dropped()
        );
    }
}
