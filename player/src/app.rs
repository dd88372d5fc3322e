//! The player window: controls, video surface and the periodic UI tick.

use crate::autohide::AutoHide;
use crate::config::UiSettings;
use crate::log_and_continue;
use crate::video::{Playback, PlaybackError, RepaintNotifier};
use common::FrameLogHandle;
use eframe::egui;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Slider resolution; positions are mapped onto `0..=SLIDER_MAX`
pub const SLIDER_MAX: u32 = 1000;

const BUTTON_TEXT_SIZE: f32 = 20.0;
const BUTTON_SIZE: egui::Vec2 = egui::vec2(130.0, 60.0);

pub fn slider_value(position: f64) -> u32 {
    (position.clamp(0.0, 1.0) * SLIDER_MAX as f64).round() as u32
}

pub fn slider_position(value: u32) -> f64 {
    value.min(SLIDER_MAX) as f64 / SLIDER_MAX as f64
}

/// Largest rect with the aspect ratio of `size` centered in `area`
pub fn fit_rect(area: egui::Rect, size: egui::Vec2) -> egui::Rect {
    if size.x <= 0.0 || size.y <= 0.0 {
        return area;
    }
    let scale = (area.width() / size.x).min(area.height() / size.y);
    egui::Rect::from_center_size(area.center(), size * scale)
}

/// Source of media paths for the Open action
pub trait FilePicker {
    fn pick_media(&self, start_dir: &Path) -> Option<PathBuf>;
}

/// Native open-file dialog
pub struct NativeFileDialog;

impl FilePicker for NativeFileDialog {
    fn pick_media(&self, start_dir: &Path) -> Option<PathBuf> {
        rfd::FileDialog::new()
            .set_title("Open File")
            .set_directory(start_dir)
            .pick_file()
    }
}

enum Action {
    PlayPause,
    Stop,
    Open,
    Seek(f64),
    Exit,
}

pub struct PlayerApp {
    playback: Option<Playback>,
    log: FrameLogHandle,
    picker: Box<dyn FilePicker>,
    media_dir: PathBuf,

    autohide: AutoHide,
    tick_interval: Duration,
    last_tick: Instant,
    /// The UI tick only runs while something is playing
    timer_active: bool,
    is_paused: bool,

    slider_value: u32,
    slider_dragging: bool,
    /// Horizontal pointer position over the video surface
    video_hover_x: Option<f32>,

    texture: Option<egui::TextureHandle>,
    status: Option<String>,
}

impl PlayerApp {
    pub fn new(ui: &UiSettings, log: FrameLogHandle, picker: Box<dyn FilePicker>) -> Self {
        let now = Instant::now();
        Self {
            playback: None,
            log,
            picker,
            media_dir: ui.media_dir_path(),
            autohide: AutoHide::new(ui.hide_delay(), ui.min_hide(), now),
            tick_interval: ui.tick_interval(),
            last_tick: now,
            timer_active: false,
            is_paused: false,
            slider_value: 0,
            slider_dragging: false,
            video_hover_x: None,
            texture: None,
            status: None,
        }
    }

    fn is_playing(&self) -> bool {
        self.playback.as_ref().is_some_and(|p| p.is_playing())
    }

    /// Pause when playing, otherwise start playback.
    ///
    /// If playback cannot start (nothing loaded, broken media) the user is
    /// asked for a file instead.
    pub fn play_pause(&mut self, ctx: &egui::Context) {
        if let Some(playback) = self.playback.as_mut().filter(|p| p.is_playing()) {
            log_and_continue!(playback.pause(), "pause playback");
            self.is_paused = true;
            return;
        }

        let started = match self.playback.as_mut() {
            Some(playback) => playback.play(),
            None => Err(PlaybackError::NoMedia),
        };

        match started {
            Ok(()) => {
                self.timer_active = true;
                self.last_tick = Instant::now();
                self.is_paused = false;
                self.status = None;
            }
            Err(e) => {
                log::warn!("Cannot start playback ({}), asking for a file", e);
                self.open_file(ctx);
            }
        }
    }

    pub fn stop(&mut self, ctx: &egui::Context) {
        if self.is_playing() {
            self.play_pause(ctx);
        }
        if let Some(playback) = self.playback.as_mut() {
            log_and_continue!(playback.stop(), "stop playback");
        }
        self.texture = None;
        self.slider_value = 0;
    }

    pub fn open_file(&mut self, ctx: &egui::Context) {
        match self.picker.pick_media(&self.media_dir) {
            Some(path) => self.open_path(ctx, path),
            None => log::info!("No file selected"),
        }
    }

    /// Load `path`, title the window after it and start playing
    pub fn open_path(&mut self, ctx: &egui::Context, path: PathBuf) {
        // Release the previous pipeline before building a new one
        self.playback = None;
        self.texture = None;
        self.slider_value = 0;

        let repaint_ctx = ctx.clone();
        let notify: RepaintNotifier = Arc::new(move || repaint_ctx.request_repaint());

        match Playback::load(&path, common::movie_name(&path), self.log.clone(), notify) {
            Ok(playback) => {
                let title = playback
                    .title()
                    .map(str::to_string)
                    .unwrap_or_else(|| display_name(&path));
                ctx.send_viewport_cmd(egui::ViewportCommand::Title(title));

                self.playback = Some(playback);
                self.status = None;
                self.play_pause(ctx);
            }
            Err(e) => {
                log::error!("Failed to open {}: {}", path.display(), e);
                self.status = Some(format!("Cannot open {}: {}", display_name(&path), e));
                // Same recovery as a failed start: ask for another file
                self.open_file(ctx);
            }
        }
    }

    /// Seek from the slider; ignored unless playing
    pub fn set_position(&mut self, position: f64) {
        if let Some(playback) = self.playback.as_mut().filter(|p| p.is_playing()) {
            log_and_continue!(playback.set_position(position), "seek");
        }
    }

    /// Periodic tick: slider sync and auto-hide
    fn update_ui(&mut self, ctx: &egui::Context, now: Instant) {
        if !self.slider_dragging
            && let Some(position) = self.playback.as_ref().and_then(|p| p.position())
        {
            self.slider_value = slider_value(position);
        }

        self.autohide.tick(now);
        if let Some(x) = self.video_hover_x {
            self.autohide.on_cursor_x(x, now);
        }

        if !self.is_playing() {
            log::debug!("Nothing playing, stopping UI timer");
            self.timer_active = false;
            if !self.is_paused {
                // Finished on its own: reset transport and button
                self.stop(ctx);
            }
            self.autohide.show(now);
        }
    }

    pub fn exit(&mut self, ctx: &egui::Context) {
        if let Some(playback) = self.playback.as_mut().filter(|p| p.is_playing()) {
            log_and_continue!(playback.stop(), "stop playback");
        }
        ctx.send_viewport_cmd(egui::ViewportCommand::Close);
    }

    fn upload_frame(&mut self, ctx: &egui::Context) {
        let Some(frame) = self.playback.as_ref().and_then(|p| p.take_frame()) else {
            return;
        };

        let image =
            egui::ColorImage::from_rgba_unmultiplied([frame.width, frame.height], &frame.pixels);
        match self.texture.as_mut() {
            Some(texture) => texture.set(image, egui::TextureOptions::LINEAR),
            None => {
                self.texture = Some(ctx.load_texture("video", image, egui::TextureOptions::LINEAR));
            }
        }
    }

    fn show_controls(&mut self, ctx: &egui::Context, now: Instant) -> Option<Action> {
        let mut action = None;
        let playing = self.is_playing();

        egui::TopBottomPanel::top("controls").show(ctx, |ui| {
            if ui.rect_contains_pointer(ui.max_rect()) && ui.input(|i| i.pointer.is_moving()) {
                self.autohide.on_mouse_move(now);
            }

            ui.horizontal(|ui| {
                let play = if playing {
                    control_button("⏸ Pause")
                } else {
                    control_button("▶ Play").fill(egui::Color32::DARK_GREEN)
                };
                if ui.add(play).clicked() {
                    action = Some(Action::PlayPause);
                }
                if ui.add(control_button("⏹ Stop")).clicked() {
                    action = Some(Action::Stop);
                }
                if ui.add(control_button("🗁 Open")).clicked() {
                    action = Some(Action::Open);
                }

                ui.spacing_mut().slider_width =
                    (ui.available_width() - BUTTON_SIZE.x - 20.0).max(100.0);
                let slider = ui
                    .add(egui::Slider::new(&mut self.slider_value, 0..=SLIDER_MAX).show_value(false))
                    .on_hover_text("Position");
                self.slider_dragging = slider.dragged();
                if slider.changed() {
                    action = Some(Action::Seek(slider_position(self.slider_value)));
                }

                if ui.add(control_button("✖ Exit")).clicked() {
                    action = Some(Action::Exit);
                }
            });

            if let Some(status) = &self.status {
                ui.colored_label(egui::Color32::LIGHT_RED, status);
            }
        });

        action
    }

    fn show_video(&mut self, ctx: &egui::Context) {
        egui::CentralPanel::default()
            .frame(egui::Frame::none().fill(egui::Color32::BLACK))
            .show(ctx, |ui| {
                let area = ui.max_rect();
                let response = ui.allocate_rect(area, egui::Sense::hover());
                self.video_hover_x = response.hover_pos().map(|p| p.x);

                if let Some(texture) = &self.texture {
                    ui.painter().image(
                        texture.id(),
                        fit_rect(area, texture.size_vec2()),
                        egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
                        egui::Color32::WHITE,
                    );
                }
            });
    }
}

impl eframe::App for PlayerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let now = Instant::now();

        if let Some(playback) = self.playback.as_mut() {
            playback.update();
        }

        if self.timer_active && now.duration_since(self.last_tick) >= self.tick_interval {
            self.last_tick = now;
            self.update_ui(ctx, now);
        }

        self.upload_frame(ctx);

        let action = if self.autohide.is_hidden() {
            None
        } else {
            self.show_controls(ctx, now)
        };
        self.show_video(ctx);

        match action {
            Some(Action::PlayPause) => self.play_pause(ctx),
            Some(Action::Stop) => self.stop(ctx),
            Some(Action::Open) => self.open_file(ctx),
            Some(Action::Seek(position)) => self.set_position(position),
            Some(Action::Exit) => self.exit(ctx),
            None => {}
        }

        ctx.request_repaint_after(self.tick_interval);
    }
}

fn control_button(text: &str) -> egui::Button<'_> {
    egui::Button::new(egui::RichText::new(text).size(BUTTON_TEXT_SIZE)).min_size(BUTTON_SIZE)
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}
