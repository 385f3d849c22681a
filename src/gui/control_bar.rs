use eframe::egui;
use crate::gui::transport::TransportView;

const SEEK_BAR_HEIGHT: f32 = 14.0;
const TRACK_HEIGHT: f32 = 4.0;
const KNOB_RADIUS: f32 = 6.0;
const VOLUME_WIDTH: f32 = 100.0;
const FULLSCREEN_ICON: &str = "⛶";

/// What the user did to the control bar this frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ControlEvent {
    TogglePlayPause,
    SeekPressed,
    SeekDragged(f64),
    SeekReleased(f64),
    VolumeChanged(f64),
    ToggleFullscreen,
}

/// Turns per-frame pointer samples on the seek bar into press, drag and
/// release events. The press fires on the first frame the button is down.
#[derive(Debug, Default)]
pub struct SeekGesture {
    held: bool,
}

impl SeekGesture {
    pub fn update(&mut self, pointer_down: bool, dragged: bool, released: bool, fraction: f64) -> Vec<ControlEvent> {
        let mut events = Vec::new();

        // A tap can press and release within one frame
        if (pointer_down || released) && !self.held {
            events.push(ControlEvent::SeekPressed);
            self.held = true;
        }
        if dragged && self.held {
            events.push(ControlEvent::SeekDragged(fraction));
        }
        if self.held && (released || !pointer_down) {
            events.push(ControlEvent::SeekReleased(fraction));
            self.held = false;
        }

        events
    }
}

/// Renders a [`TransportView`] and reports interactions as [`ControlEvent`]s.
pub struct ControlBar {
    last_fraction: f64,
    gesture: SeekGesture,
}

impl ControlBar {
    pub fn new() -> Self {
        Self {
            last_fraction: 0.0,
            gesture: SeekGesture::default(),
        }
    }

    pub fn show(&mut self, ui: &mut egui::Ui, view: &TransportView, opacity: f32) -> Vec<ControlEvent> {
        let mut events = Vec::new();
        ui.set_opacity(opacity);

        self.seek_bar(ui, view.seek_bar.value(), &mut events);

        ui.horizontal(|ui| {
            let play_button = egui::Button::new(egui::RichText::new(view.play_pause.icon()).size(18.0)).frame(false);
            if ui.add_enabled(view.play_pause.is_enabled(), play_button).clicked() {
                events.push(ControlEvent::TogglePlayPause);
            }

            ui.label(egui::RichText::new(view.time_label.text()).monospace());

            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if ui.add(egui::Button::new(FULLSCREEN_ICON).frame(false)).on_hover_text("Fullscreen").clicked() {
                    events.push(ControlEvent::ToggleFullscreen);
                }

                let mut volume = view.volume_bar.value();
                ui.spacing_mut().slider_width = VOLUME_WIDTH;
                if ui.add(egui::Slider::new(&mut volume, 0.0..=1.0).show_value(false)).changed() {
                    events.push(ControlEvent::VolumeChanged(volume));
                }
                ui.label("🔊");
            });
        });

        events
    }

    fn seek_bar(&mut self, ui: &mut egui::Ui, value: f64, events: &mut Vec<ControlEvent>) {
        let width = ui.available_width();
        let (rect, response) = ui.allocate_exact_size(
            egui::Vec2::new(width, SEEK_BAR_HEIGHT),
            egui::Sense::click_and_drag(),
        );

        let track_rect = egui::Rect::from_center_size(
            rect.center(),
            egui::Vec2::new(rect.width() - 2.0 * KNOB_RADIUS, TRACK_HEIGHT),
        );

        let pointer = response
            .interact_pointer_pos()
            .or_else(|| ui.input(|i| i.pointer.latest_pos()));
        if let Some(pos) = pointer {
            self.last_fraction = fraction_at(track_rect, pos.x);
        }

        events.extend(self.gesture.update(
            response.is_pointer_button_down_on(),
            response.dragged(),
            response.drag_stopped() || response.clicked(),
            self.last_fraction,
        ));

        if ui.is_rect_visible(rect) {
            let painter = ui.painter();
            let visuals = ui.visuals();

            painter.rect_filled(track_rect, egui::Rounding::same(2.0), visuals.extreme_bg_color);

            let played_x = track_rect.min.x + track_rect.width() * value as f32;
            let played_rect = egui::Rect::from_min_max(track_rect.min, egui::Pos2::new(played_x, track_rect.max.y));
            painter.rect_filled(played_rect, egui::Rounding::same(2.0), visuals.selection.bg_fill);

            let knob_color = if response.hovered() || response.dragged() {
                visuals.strong_text_color()
            } else {
                visuals.text_color()
            };
            painter.circle_filled(egui::Pos2::new(played_x, track_rect.center().y), KNOB_RADIUS, knob_color);
        }
    }
}

impl Default for ControlBar {
    fn default() -> Self {
        Self::new()
    }
}

/// Horizontal pointer position as a [0, 1] fraction of the track.
pub fn fraction_at(track: egui::Rect, x: f32) -> f64 {
    if track.width() <= 0.0 {
        return 0.0;
    }
    ((x - track.min.x) / track.width()).clamp(0.0, 1.0) as f64
}
