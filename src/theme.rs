use eframe::egui;
use egui::{Color32, CornerRadius, Stroke};

pub struct AppTheme {
    is_dark: bool,
    pub background: Color32,
    pub card_background: Color32,
    pub text: Color32,
    pub secondary_text: Color32,
    pub highlight: Color32,
    pub separator: Color32,
    pub error: Color32,
    score_high: Color32,
    score_medium: Color32,
    score_low: Color32,
    button_background: Color32,
    button_foreground: Color32,
    button_active_background: Color32,
    button_hover_background: Color32,
}

impl AppTheme {
    pub fn dark() -> Self {
        Self {
            is_dark: true,
            background: Color32::from_rgb(18, 18, 18),
            card_background: Color32::from_rgb(30, 30, 30),
            text: Color32::from_rgb(240, 240, 240),
            secondary_text: Color32::from_rgb(180, 180, 180),
            highlight: Color32::from_rgb(255, 102, 0), // HN orange
            separator: Color32::from_rgb(60, 60, 60),
            error: Color32::from_rgb(239, 83, 80),
            score_high: Color32::from_rgb(76, 175, 80),
            score_medium: Color32::from_rgb(255, 193, 7),
            score_low: Color32::from_rgb(158, 158, 158),
            button_background: Color32::from_rgb(66, 66, 66),
            button_foreground: Color32::from_rgb(240, 240, 240),
            button_active_background: Color32::from_rgb(255, 102, 0),
            button_hover_background: Color32::from_rgb(80, 80, 80),
        }
    }

    pub fn light() -> Self {
        Self {
            is_dark: false,
            background: Color32::from_rgb(245, 245, 245),
            card_background: Color32::from_rgb(255, 255, 255),
            text: Color32::from_rgb(20, 20, 20),
            secondary_text: Color32::from_rgb(90, 90, 90),
            highlight: Color32::from_rgb(235, 92, 0),
            separator: Color32::from_rgb(200, 200, 200),
            error: Color32::from_rgb(198, 40, 40),
            score_high: Color32::from_rgb(30, 110, 40),
            score_medium: Color32::from_rgb(190, 130, 0),
            score_low: Color32::from_rgb(80, 80, 80),
            button_background: Color32::from_rgb(235, 235, 235),
            button_foreground: Color32::from_rgb(20, 20, 20),
            button_active_background: Color32::from_rgb(235, 92, 0),
            button_hover_background: Color32::from_rgb(210, 210, 210),
        }
    }

    pub fn for_mode(is_dark_mode: bool) -> Self {
        if is_dark_mode {
            Self::dark()
        } else {
            Self::light()
        }
    }

    pub fn is_dark(&self) -> bool {
        self.is_dark
    }

    pub fn apply_to_ctx(&self, ctx: &egui::Context) {
        let mut style = (*ctx.style()).clone();

        style.visuals.panel_fill = self.background;
        style.visuals.window_fill = self.card_background;
        style.visuals.window_stroke = Stroke::new(1.0, self.separator);
        style.visuals.widgets.noninteractive.bg_fill = self.card_background;
        style.visuals.widgets.noninteractive.fg_stroke = Stroke::new(1.0, self.text);

        style.visuals.widgets.inactive.bg_fill = self.button_background;
        style.visuals.widgets.inactive.fg_stroke = Stroke::new(1.0, self.button_foreground);
        style.visuals.widgets.active.bg_fill = self.button_active_background;
        style.visuals.widgets.active.fg_stroke = Stroke::new(1.0, self.button_foreground);
        style.visuals.widgets.hovered.bg_fill = self.button_hover_background;
        style.visuals.widgets.hovered.fg_stroke = Stroke::new(1.0, self.button_foreground);

        style.visuals.selection.bg_fill = self.highlight;
        style.visuals.selection.stroke = Stroke::new(1.0, self.highlight);
        style.visuals.hyperlink_color = self.highlight;

        style.visuals.window_corner_radius = CornerRadius::same(8);
        style.visuals.widgets.noninteractive.corner_radius = CornerRadius::same(4);
        style.visuals.widgets.inactive.corner_radius = CornerRadius::same(4);
        style.visuals.widgets.hovered.corner_radius = CornerRadius::same(4);
        style.visuals.widgets.active.corner_radius = CornerRadius::same(4);

        // Light backgrounds need a stronger shadow to separate the cards
        style.visuals.window_shadow = if !self.is_dark {
            egui::epaint::Shadow {
                offset: [3, 3],
                blur: 12,
                spread: 2,
                color: Color32::from_rgba_premultiplied(0, 0, 0, 20),
            }
        } else {
            egui::epaint::Shadow {
                offset: [2, 2],
                blur: 10,
                spread: 1,
                color: Color32::from_rgba_premultiplied(0, 0, 0, 40),
            }
        };

        ctx.set_style(style);
    }

    pub fn score_color(&self, score: i64) -> Color32 {
        if score >= 500 {
            if !self.is_dark {
                Color32::from_rgb(
                    self.score_high.r().saturating_sub(10),
                    self.score_high.g().saturating_sub(10),
                    self.score_high.b(),
                )
            } else {
                Color32::from_rgb(
                    self.score_high.r().saturating_add(20),
                    self.score_high.g().saturating_add(20),
                    self.score_high.b().saturating_add(5),
                )
            }
        } else if score >= 100 {
            self.score_high
        } else if score >= 50 {
            self.score_medium
        } else {
            self.score_low
        }
    }
}
