use eframe::egui;
use crate::core::Theme;

pub fn visuals_for(theme: Theme) -> egui::Visuals {
    match theme {
        Theme::Dark => {
            let mut visuals = egui::Visuals::dark();
            visuals.override_text_color = Some(egui::Color32::WHITE);
            visuals.panel_fill = egui::Color32::from_rgb(0x2B, 0x2B, 0x2B);
            visuals.window_fill = egui::Color32::from_rgb(0x2B, 0x2B, 0x2B);
            visuals
        }
        Theme::Light => egui::Visuals::light(),
        Theme::EyeCare => {
            let mut visuals = egui::Visuals::dark();
            visuals.override_text_color = Some(egui::Color32::from_rgb(0xDC, 0xEB, 0xDC));
            visuals.panel_fill = egui::Color32::from_rgb(0x1E, 0x2D, 0x22);
            visuals.window_fill = egui::Color32::from_rgb(0x1E, 0x2D, 0x22);
            visuals.selection.bg_fill = egui::Color32::from_rgb(0x3C, 0x78, 0x50);
            visuals
        }
    }
}

pub fn apply_theme(ctx: &egui::Context, theme: Theme) {
    ctx.set_visuals(visuals_for(theme));
}
