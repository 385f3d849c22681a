use eframe::egui;
use crate::core::{keys, PlayerSettings, Preferences, Theme};

const PROJECT_URL: &str = "https://github.com/ooooyasumi/Dogplayer";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingsSection {
    General,
    Player,
    About,
}

impl SettingsSection {
    const ALL: [SettingsSection; 3] = [SettingsSection::General, SettingsSection::Player, SettingsSection::About];

    fn label(self) -> &'static str {
        match self {
            SettingsSection::General => "General",
            SettingsSection::Player => "Player",
            SettingsSection::About => "About",
        }
    }
}

/// One edited control. Each change is written to the store right away.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SettingChange {
    AutoPlay(bool),
    DefaultVolume(f64),
    SeekSensitivity(i64),
    HideDelay(i64),
    Theme(Theme),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingsOutcome {
    Open,
    /// Still open; at least one preference was written this frame.
    Changed,
    Closed,
}

/// The settings window. Values are read once on open; the store is the
/// source of truth from then on.
pub struct SettingsPanel {
    section: SettingsSection,
    values: PlayerSettings,
}

impl SettingsPanel {
    pub fn open(prefs: &Preferences) -> Self {
        Self {
            section: SettingsSection::General,
            values: PlayerSettings::from_preferences(prefs),
        }
    }

    pub fn values(&self) -> &PlayerSettings {
        &self.values
    }

    /// Clamps the change, stores it in `prefs` and mirrors it locally.
    pub fn apply(&mut self, change: SettingChange, prefs: &mut Preferences) {
        match change {
            SettingChange::AutoPlay(enabled) => {
                self.values.auto_play = enabled;
                prefs.put_bool(keys::AUTO_PLAY, enabled);
            }
            SettingChange::DefaultVolume(volume) => {
                self.values.default_volume = volume.clamp(0.0, 1.0);
                prefs.put_double(keys::DEFAULT_VOLUME, self.values.default_volume);
            }
            SettingChange::SeekSensitivity(sensitivity) => {
                let range = PlayerSettings::SEEK_SENSITIVITY_RANGE;
                self.values.seek_sensitivity = sensitivity.clamp(*range.start(), *range.end());
                prefs.put_int(keys::SEEK_SENSITIVITY, self.values.seek_sensitivity);
            }
            SettingChange::HideDelay(secs) => {
                let range = PlayerSettings::HIDE_DELAY_RANGE;
                self.values.hide_delay_secs = secs.clamp(*range.start(), *range.end());
                prefs.put_int(keys::HIDE_DELAY, self.values.hide_delay_secs);
            }
            SettingChange::Theme(theme) => {
                self.values.theme = theme;
                prefs.put_value(keys::THEME, &theme);
            }
        }
    }

    /// Flushes the store. A failed flush is logged and the panel closes anyway.
    pub fn save(&self, prefs: &Preferences) -> SettingsOutcome {
        if let Err(e) = prefs.flush() {
            log::error!("Failed to save settings: {}", e);
        }
        SettingsOutcome::Closed
    }

    pub fn show(&mut self, ctx: &egui::Context, prefs: &mut Preferences) -> SettingsOutcome {
        let mut changes = Vec::new();
        let mut outcome = SettingsOutcome::Open;

        egui::Window::new("Settings")
            .collapsible(false)
            .resizable(false)
            .default_width(600.0)
            .anchor(egui::Align2::CENTER_CENTER, egui::Vec2::ZERO)
            .show(ctx, |ui| {
                ui.horizontal_top(|ui| {
                    ui.vertical(|ui| {
                        ui.set_width(150.0);
                        for section in SettingsSection::ALL {
                            ui.selectable_value(&mut self.section, section, section.label());
                        }
                    });

                    ui.separator();

                    ui.vertical(|ui| {
                        ui.set_min_height(260.0);
                        match self.section {
                            SettingsSection::General => self.show_general(ui, &mut changes),
                            SettingsSection::Player => self.show_player(ui, &mut changes),
                            SettingsSection::About => Self::show_about(ui),
                        }
                    });
                });

                ui.separator();

                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if ui.button("Back").clicked() {
                        outcome = SettingsOutcome::Closed;
                    }
                    if ui.button("Save").clicked() {
                        outcome = self.save(prefs);
                    }
                });
            });

        let changed = !changes.is_empty();
        for change in changes {
            self.apply(change, prefs);
        }

        match outcome {
            SettingsOutcome::Open if changed => SettingsOutcome::Changed,
            other => other,
        }
    }

    fn show_general(&self, ui: &mut egui::Ui, changes: &mut Vec<SettingChange>) {
        ui.heading("General");
        ui.separator();

        let mut auto_play = self.values.auto_play;
        if ui.checkbox(&mut auto_play, "Auto-play on open").changed() {
            changes.push(SettingChange::AutoPlay(auto_play));
        }

        ui.add_space(8.0);
        ui.label("Default volume:");
        let mut volume = self.values.default_volume;
        if ui.add(egui::Slider::new(&mut volume, 0.0..=1.0)).changed() {
            changes.push(SettingChange::DefaultVolume(volume));
        }

        ui.add_space(8.0);
        ui.label("Theme:");
        let mut theme = self.values.theme;
        egui::ComboBox::from_id_source("theme_combo")
            .selected_text(theme.label())
            .show_ui(ui, |ui| {
                for option in Theme::ALL {
                    ui.selectable_value(&mut theme, option, option.label());
                }
            });
        if theme != self.values.theme {
            changes.push(SettingChange::Theme(theme));
        }
    }

    fn show_player(&self, ui: &mut egui::Ui, changes: &mut Vec<SettingChange>) {
        ui.heading("Player");
        ui.separator();

        ui.label("Seek bar sensitivity:");
        let mut sensitivity = self.values.seek_sensitivity;
        if ui
            .add(egui::Slider::new(&mut sensitivity, PlayerSettings::SEEK_SENSITIVITY_RANGE).step_by(1.0))
            .changed()
        {
            changes.push(SettingChange::SeekSensitivity(sensitivity));
        }

        ui.add_space(8.0);
        ui.label("Control bar hide delay:");
        let mut delay = self.values.hide_delay_secs;
        if ui
            .add(egui::Slider::new(&mut delay, PlayerSettings::HIDE_DELAY_RANGE).suffix(" s"))
            .changed()
        {
            changes.push(SettingChange::HideDelay(delay));
        }
    }

    fn show_about(ui: &mut egui::Ui) {
        ui.heading("DogPlayer - a minimal video player");
        ui.separator();
        ui.label(format!("Version: v{}", env!("CARGO_PKG_VERSION")));
        ui.hyperlink(PROJECT_URL);
    }
}
