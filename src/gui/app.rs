use eframe::egui;
use std::cell::Cell;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::time::Instant;
use crate::core::{
    resolve_dropped, resolve_picked, FileChooser, IntakeError, MediaError, PlayerSettings, Preferences,
    SystemFileChooser, UNSUPPORTED_FORMAT_MESSAGE,
};
use crate::gui::autohide::AutoHidePresenter;
use crate::gui::control_bar::{ControlBar, ControlEvent};
use crate::gui::settings::{SettingsOutcome, SettingsPanel};
use crate::gui::theme::apply_theme;
use crate::gui::transport::TransportController;
use crate::video::{FfmpegSession, MediaSession, VideoFrame};

pub const APP_TITLE: &str = "DogPlayer";
pub const NO_FILE_LABEL: &str = "No file opened";

/// Opens a media file into a playable session.
pub type SessionOpener = Box<dyn Fn(&Path) -> Result<Box<dyn MediaSession>, MediaError>>;

fn open_ffmpeg_session(path: &Path) -> Result<Box<dyn MediaSession>, MediaError> {
    let session = FfmpegSession::open(path)?;
    Ok(Box::new(session))
}

pub struct PlayerApp {
    pub preferences: Preferences,
    pub settings: PlayerSettings,
    pub controller: TransportController,
    pub control_bar: ControlBar,
    pub control_presenter: AutoHidePresenter,
    pub menu_presenter: AutoHidePresenter,
    pub settings_panel: Option<SettingsPanel>,
    pub error_message: Option<String>,
    pub file_name: String,
    pub video_texture: Option<egui::TextureHandle>,
    /// Set by the session's end-of-media callback, consumed on the next tick.
    pub end_of_media: Rc<Cell<bool>>,
    /// Theme still to be pushed into the egui context.
    pub pending_theme: bool,
    open_session: SessionOpener,
    chooser: Box<dyn FileChooser>,
}

impl PlayerApp {
    pub fn new(cc: &eframe::CreationContext<'_>) -> Self {
        let preferences = Preferences::load();
        let app = Self::with_parts(
            preferences,
            Box::new(open_ffmpeg_session),
            Box::new(SystemFileChooser),
            Instant::now(),
        );
        apply_theme(&cc.egui_ctx, app.settings.theme);
        app
    }

    pub fn with_parts(
        preferences: Preferences,
        open_session: SessionOpener,
        chooser: Box<dyn FileChooser>,
        now: Instant,
    ) -> Self {
        let settings = PlayerSettings::from_preferences(&preferences);
        log::info!("Starting {} with settings: {:?}", APP_TITLE, settings);

        let mut controller = TransportController::new();
        controller.attach(None);

        Self {
            control_presenter: AutoHidePresenter::with_idle_threshold(now, settings.hide_delay()),
            menu_presenter: AutoHidePresenter::with_idle_threshold(now, settings.hide_delay()),
            preferences,
            settings,
            controller,
            control_bar: ControlBar::new(),
            settings_panel: None,
            error_message: None,
            file_name: NO_FILE_LABEL.to_string(),
            video_texture: None,
            end_of_media: Rc::new(Cell::new(false)),
            pending_theme: false,
            open_session,
            chooser,
        }
    }

    pub fn has_video(&self) -> bool {
        self.controller.has_session()
    }

    // ============================================================================
    // LOADING
    // ============================================================================

    /// Replaces the current video. The old session is released before the new one opens.
    pub fn load_video(&mut self, path: &Path, now: Instant) {
        log::info!("Loading video: {}", path.display());

        self.controller.attach(None);
        self.video_texture = None;
        self.end_of_media.set(false);

        match (self.open_session)(path) {
            Ok(mut session) => {
                let finished = Rc::clone(&self.end_of_media);
                session.on_end_of_media(Box::new(move || finished.set(true)));
                session.set_volume(self.settings.default_volume);

                self.controller.attach(Some(session));
                if self.settings.auto_play {
                    self.controller.play();
                }

                self.file_name = path
                    .file_name()
                    .map(|name| name.to_string_lossy().into_owned())
                    .unwrap_or_else(|| path.display().to_string());
                self.control_presenter.on_activity(now);
                self.menu_presenter.on_activity(now);
            }
            Err(e) => {
                log::error!("Failed to open {}: {}", path.display(), e);
                self.file_name = NO_FILE_LABEL.to_string();
                self.error_message = Some(format!("Could not open {}: {}", path.display(), e));
            }
        }
    }

    pub fn open_dropped(&mut self, paths: &[PathBuf], now: Instant) {
        match resolve_dropped(paths) {
            Ok(path) => self.load_video(&path, now),
            Err(IntakeError::EmptyDrop) => {}
            Err(e) => self.reject(e),
        }
    }

    pub fn open_with_chooser(&mut self, now: Instant) {
        match resolve_picked(self.chooser.as_ref()) {
            Ok(Some(path)) => self.load_video(&path, now),
            Ok(None) => log::debug!("File selection cancelled"),
            Err(e) => self.reject(e),
        }
    }

    fn reject(&mut self, error: IntakeError) {
        log::debug!("Rejected file: {}", error);
        self.error_message = Some(UNSUPPORTED_FORMAT_MESSAGE.to_string());
    }

    // ============================================================================
    // PER-FRAME UPDATE
    // ============================================================================

    /// Advances playback-driven state and returns the newest decoded frame, if any.
    pub fn tick(&mut self, now: Instant) -> Option<VideoFrame> {
        let frame = self.controller.session_mut().and_then(|session| session.poll_frame());

        if self.end_of_media.replace(false) {
            log::info!("Playback reached the end, rewinding");
            self.controller.restart_from_beginning();
        }

        self.controller.periodic_update();

        let playing = self.controller.is_playing();
        let loaded = self.has_video();
        self.control_presenter.tick(now, playing);
        self.menu_presenter.tick(now, loaded);

        frame
    }

    pub fn handle_control_event(&mut self, event: ControlEvent) {
        match event {
            ControlEvent::TogglePlayPause => self.controller.toggle_play_pause(),
            ControlEvent::SeekPressed => self.controller.on_pointer_down(),
            ControlEvent::SeekDragged(fraction) => self.controller.on_pointer_drag(fraction),
            ControlEvent::SeekReleased(fraction) => self.controller.on_pointer_up(fraction),
            ControlEvent::VolumeChanged(volume) => self.controller.set_volume(volume),
            // Needs the egui context; handled in `update`
            ControlEvent::ToggleFullscreen => {}
        }
    }

    /// Re-reads the stored settings after the panel wrote to them.
    pub fn reload_settings(&mut self) {
        let settings = PlayerSettings::from_preferences(&self.preferences);
        if settings.theme != self.settings.theme {
            self.pending_theme = true;
        }
        self.control_presenter.set_idle_threshold(settings.hide_delay());
        self.menu_presenter.set_idle_threshold(settings.hide_delay());
        self.settings = settings;
    }

    pub fn open_settings(&mut self) {
        self.settings_panel = Some(SettingsPanel::open(&self.preferences));
    }

    /// Releases the session and writes preferences out.
    pub fn shutdown(&mut self) {
        log::info!("Shutting down");
        self.controller.dispose();
        if let Err(e) = self.preferences.flush() {
            log::error!("Failed to save preferences on exit: {}", e);
        }
    }

    fn upload_frame(&mut self, ctx: &egui::Context, frame: VideoFrame) {
        let size = [frame.width as usize, frame.height as usize];
        if frame.image_data.len() != size[0] * size[1] * 4 {
            log::warn!("Dropping malformed frame {}x{}", frame.width, frame.height);
            return;
        }
        let image = egui::ColorImage::from_rgba_unmultiplied(size, &frame.image_data);

        match &mut self.video_texture {
            Some(texture) => texture.set(image, egui::TextureOptions::LINEAR),
            None => {
                self.video_texture = Some(ctx.load_texture("video_frame", image, egui::TextureOptions::LINEAR));
            }
        }
    }

    fn handle_input(&mut self, ctx: &egui::Context, now: Instant) {
        let (pointer_moved, space, f11, escape, dropped) = ctx.input(|i| {
            (
                i.pointer.delta() != egui::Vec2::ZERO || i.pointer.any_pressed(),
                i.key_pressed(egui::Key::Space),
                i.key_pressed(egui::Key::F11),
                i.key_pressed(egui::Key::Escape),
                i.raw
                    .dropped_files
                    .iter()
                    .filter_map(|file| file.path.clone())
                    .collect::<Vec<_>>(),
            )
        });

        if pointer_moved {
            self.control_presenter.on_activity(now);
        }

        let typing = ctx.wants_keyboard_input();
        let dialog_open = self.settings_panel.is_some() || self.error_message.is_some();
        if space && !typing && !dialog_open {
            self.controller.toggle_play_pause();
        }
        if f11 {
            toggle_fullscreen(ctx);
        }
        if escape && is_fullscreen(ctx) {
            ctx.send_viewport_cmd(egui::ViewportCommand::Fullscreen(false));
        }

        if !dropped.is_empty() {
            self.open_dropped(&dropped, now);
        }
    }

    // ============================================================================
    // RENDERING
    // ============================================================================

    fn show_menu_bar(&mut self, ctx: &egui::Context, now: Instant) {
        let opacity = self.menu_presenter.opacity(now);
        let response = egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
            ui.set_opacity(opacity);
            egui::menu::bar(ui, |ui| {
                ui.menu_button(APP_TITLE, |ui| {
                    if ui.button("Open…").clicked() {
                        ui.close_menu();
                        self.open_with_chooser(now);
                    }
                    if ui.button("Settings").clicked() {
                        ui.close_menu();
                        self.open_settings();
                    }
                    ui.separator();
                    if ui.button("Exit").clicked() {
                        ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                    }
                });

                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    ui.label(&self.file_name);
                });
            });
        });

        // Hovering the bar holds it in view
        let hovered = ctx
            .pointer_hover_pos()
            .map_or(false, |pos| response.response.rect.contains(pos));
        if hovered {
            self.menu_presenter.on_activity(now);
        }
    }

    fn show_control_bar(&mut self, ctx: &egui::Context, now: Instant) {
        if !self.control_presenter.is_shown() {
            return;
        }
        let opacity = self.control_presenter.opacity(now);

        let events = egui::TopBottomPanel::bottom("control_bar")
            .show(ctx, |ui| self.control_bar.show(ui, self.controller.view(), opacity))
            .inner;

        for event in events {
            if event == ControlEvent::ToggleFullscreen {
                toggle_fullscreen(ctx);
            } else {
                self.handle_control_event(event);
            }
        }
    }

    fn show_video_surface(&mut self, ctx: &egui::Context) {
        let hovering_files = ctx.input(|i| !i.raw.hovered_files.is_empty());

        egui::CentralPanel::default()
            .frame(egui::Frame::none().fill(egui::Color32::BLACK))
            .show(ctx, |ui| {
                ui.centered_and_justified(|ui| {
                    if hovering_files {
                        ui.label(egui::RichText::new("Drop to open").size(32.0).color(egui::Color32::WHITE));
                    } else if let Some(texture) = &self.video_texture {
                        ui.add(egui::Image::new(texture).maintain_aspect_ratio(true).shrink_to_fit());
                    } else {
                        ui.label(
                            egui::RichText::new(APP_TITLE)
                                .size(48.0)
                                .color(egui::Color32::from_white_alpha(77)),
                        );
                    }
                });
            });
    }

    fn show_settings(&mut self, ctx: &egui::Context) {
        let Some(panel) = self.settings_panel.as_mut() else {
            return;
        };
        match panel.show(ctx, &mut self.preferences) {
            SettingsOutcome::Open => {}
            SettingsOutcome::Changed => self.reload_settings(),
            SettingsOutcome::Closed => {
                self.settings_panel = None;
                self.reload_settings();
            }
        }
    }

    fn show_error_dialog(&mut self, ctx: &egui::Context) {
        let Some(message) = self.error_message.clone() else {
            return;
        };
        egui::Window::new("Error")
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, egui::Vec2::ZERO)
            .show(ctx, |ui| {
                ui.label(message);
                ui.add_space(8.0);
                ui.vertical_centered(|ui| {
                    if ui.button("OK").clicked() {
                        self.error_message = None;
                    }
                });
            });
    }
}

impl eframe::App for PlayerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let now = Instant::now();

        if self.pending_theme {
            apply_theme(ctx, self.settings.theme);
            self.pending_theme = false;
        }

        self.handle_input(ctx, now);

        if let Some(frame) = self.tick(now) {
            self.upload_frame(ctx, frame);
        }
        if !self.has_video() {
            self.video_texture = None;
        }

        self.show_menu_bar(ctx, now);
        self.show_control_bar(ctx, now);
        self.show_video_surface(ctx);
        self.show_settings(ctx);
        self.show_error_dialog(ctx);

        if self.has_video() && !self.control_presenter.is_fully_visible() {
            ctx.set_cursor_icon(egui::CursorIcon::None);
        }

        if self.controller.is_ticking() {
            ctx.request_repaint();
        }
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        self.shutdown();
    }
}

fn is_fullscreen(ctx: &egui::Context) -> bool {
    ctx.input(|i| i.viewport().fullscreen.unwrap_or(false))
}

fn toggle_fullscreen(ctx: &egui::Context) {
    let fullscreen = !is_fullscreen(ctx);
    log::debug!("Fullscreen: {}", fullscreen);
    ctx.send_viewport_cmd(egui::ViewportCommand::Fullscreen(fullscreen));
}
