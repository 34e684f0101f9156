use eframe::egui;
use egui::{RichText, ScrollArea};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::config::Config;
use crate::hn_client::HackerNewsClient;
use crate::models::Category;
use crate::query::Notify;
use crate::state::{AppState, ListView};
use crate::theme::AppTheme;
use crate::views;

const IS_DARK_MODE_KEY: &str = "is_dark_mode";

/// What one frame draws for a given [`ListView`].
#[derive(Debug, PartialEq)]
struct Screen<'a> {
    error: Option<&'a str>,
    // Header (with its fetch spinner) and category tabs.
    chrome: bool,
    rows: &'a [u64],
}

fn screen(list: &ListView) -> Screen<'_> {
    match list {
        ListView::Error(message) => Screen {
            error: Some(message.as_str()),
            chrome: false,
            rows: &[],
        },
        ListView::Loading => Screen {
            error: None,
            chrome: true,
            rows: &[],
        },
        ListView::Loaded(ids) => Screen {
            error: None,
            chrome: true,
            rows: ids,
        },
    }
}

pub struct HackerNewsReaderApp {
    state: AppState,
    theme: AppTheme,
}

impl HackerNewsReaderApp {
    pub fn new(cc: &eframe::CreationContext<'_>, client: HackerNewsClient, config: &Config) -> Self {
        let ctx = cc.egui_ctx.clone();
        let notify: Notify = Arc::new(move || ctx.request_repaint());

        let is_dark_mode = if config.light {
            false
        } else {
            cc.storage
                .and_then(|storage| storage.get_string(IS_DARK_MODE_KEY))
                .and_then(|value| value.parse::<bool>().ok())
                .unwrap_or(true)
        };

        Self {
            state: AppState::new(Arc::new(client), config.category, notify),
            theme: AppTheme::for_mode(is_dark_mode),
        }
    }

    fn toggle_theme(&mut self) {
        self.theme = AppTheme::for_mode(!self.theme.is_dark());
    }

    fn open_link(&self, url: &str) {
        debug!(%url, "opening link");
        if let Err(e) = open::that(url) {
            warn!(%url, error = %e, "failed to open URL");
        }
    }

    fn process_keyboard_shortcuts(&mut self, ctx: &egui::Context) {
        let input = ctx.input(|i| {
            (
                i.key_pressed(egui::Key::Num1),
                i.key_pressed(egui::Key::Num2),
                i.key_pressed(egui::Key::Num3),
                i.key_pressed(egui::Key::Num4),
                i.key_pressed(egui::Key::F5),
                i.key_pressed(egui::Key::R) && i.modifiers.command,
                i.key_pressed(egui::Key::T) && !i.modifiers.command,
            )
        });

        let tab_keys = [input.0, input.1, input.2, input.3];
        if let Some(index) = tab_keys.iter().position(|&pressed| pressed) {
            self.state.select_category(Category::ALL[index]);
            ctx.request_repaint();
            return;
        }

        if input.4 || input.5 {
            self.state.refresh();
            ctx.request_repaint();
            return;
        }

        if input.6 {
            self.toggle_theme();
            ctx.request_repaint();
        }
    }

    fn render_header(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.label(
                RichText::new("Hacker News")
                    .color(self.theme.highlight)
                    .size(24.0)
                    .strong(),
            );

            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                let theme_label = if self.theme.is_dark() { "☀" } else { "🌙" };
                if ui
                    .button(RichText::new(theme_label).size(16.0))
                    .on_hover_text("Toggle theme (T)")
                    .clicked()
                {
                    self.toggle_theme();
                }

                if self.state.is_list_fetching() {
                    ui.spinner();
                } else if ui
                    .button(RichText::new("⟳").size(16.0))
                    .on_hover_text("Refresh (F5)")
                    .clicked()
                {
                    self.state.refresh();
                }
            });
        });
        ui.add_space(8.0);
    }
}

impl eframe::App for HackerNewsReaderApp {
    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        storage.set_string(IS_DARK_MODE_KEY, self.theme.is_dark().to_string());
    }

    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.theme.apply_to_ctx(ctx);
        self.state.poll();
        self.process_keyboard_shortcuts(ctx);

        let mut link_to_open = None;

        egui::CentralPanel::default().show(ctx, |ui| {
            let list = self.state.list_view();
            let screen = screen(&list);

            if let Some(message) = screen.error {
                views::error_text(ui, message, &self.theme);
            }
            if !screen.chrome {
                return;
            }

            self.render_header(ui);

            if let Some(category) = views::category_tabs(ui, self.state.category(), &self.theme) {
                if self.state.select_category(category) {
                    ctx.request_repaint();
                }
            }
            ui.add_space(8.0);

            if screen.rows.is_empty() {
                return;
            }

            ScrollArea::vertical().auto_shrink([false, false]).show(ui, |ui| {
                for &id in screen.rows {
                    ui.push_id(id, |ui| {
                        let state = self.state.story_state(id);
                        if let Some(url) = views::story_row(ui, state, &self.theme) {
                            link_to_open = Some(url);
                        }
                    });
                }
            });
        });

        if let Some(url) = link_to_open {
            self.open_link(&url);
        }
    }
}
