use eframe::egui;
use egui::{Color32, CornerRadius, RichText, Stroke, Ui};

use crate::models::{Category, Story};
use crate::query::QueryState;
use crate::theme::AppTheme;

/// How a loaded story's title is presented.
#[derive(Debug, PartialEq, Eq)]
pub enum TitleView<'a> {
    Link { text: &'a str, href: &'a str },
    Plain(&'a str),
}

pub fn title_view(story: &Story) -> TitleView<'_> {
    match story.url.as_deref() {
        Some(href) => TitleView::Link {
            text: &story.title,
            href,
        },
        None => TitleView::Plain(&story.title),
    }
}

pub struct TabStyle {
    pub text: RichText,
    pub fill: Color32,
    pub stroke: Stroke,
}

/// Look of one tab. Only the active tab gets the highlight stroke.
pub fn tab_style(category: Category, active: bool, theme: &AppTheme) -> TabStyle {
    let text = RichText::new(category.label()).size(16.0);
    if active {
        TabStyle {
            text: text.color(theme.highlight).strong(),
            fill: theme.card_background,
            stroke: Stroke::new(2.0, theme.highlight),
        }
    } else {
        TabStyle {
            text: text.color(theme.secondary_text),
            fill: Color32::TRANSPARENT,
            stroke: Stroke::NONE,
        }
    }
}

/// The four category tabs. Returns the tab the user clicked this frame.
pub fn category_tabs(ui: &mut Ui, selected: Category, theme: &AppTheme) -> Option<Category> {
    let button_size = [80.0, 32.0];
    let mut clicked = None;

    ui.horizontal(|ui| {
        for category in Category::ALL {
            let style = tab_style(category, category == selected, theme);
            let button = ui.add_sized(
                button_size,
                egui::Button::new(style.text).fill(style.fill).stroke(style.stroke),
            );

            if button.clicked() {
                clicked = Some(category);
            }
        }
    });

    clicked
}

pub fn error_text(ui: &mut Ui, message: &str, theme: &AppTheme) {
    ui.label(RichText::new(format!("Error: {message}")).color(theme.error));
}

/// One story card. Returns the story's URL when its link was clicked.
pub fn story_row(ui: &mut Ui, state: &QueryState<Story>, theme: &AppTheme) -> Option<String> {
    let story = match state {
        QueryState::Error(message) => {
            error_text(ui, message, theme);
            return None;
        }
        QueryState::Loading => None,
        QueryState::Loaded(story) => Some(story),
    };

    let mut link_clicked = None;
    egui::Frame::new()
        .fill(theme.card_background)
        .corner_radius(CornerRadius::same(8))
        .stroke(Stroke::new(1.0, theme.separator))
        .inner_margin(12.0)
        .outer_margin(egui::vec2(8.0, 6.0))
        .show(ui, |ui| {
            ui.set_width(ui.available_width());

            let Some(story) = story else {
                ui.vertical_centered(|ui| {
                    ui.add_space(10.0);
                    ui.spinner();
                    ui.add_space(10.0);
                });
                return;
            };

            ui.horizontal(|ui| {
                ui.label(
                    RichText::new(format!("{} pts", story.score))
                        .color(theme.score_color(story.score))
                        .size(16.0)
                        .strong(),
                );
                ui.add_space(12.0);

                match title_view(story) {
                    TitleView::Link { text, href } => {
                        let link = ui
                            .add(
                                egui::Label::new(
                                    RichText::new(text)
                                        .color(theme.text)
                                        .size(16.0)
                                        .strong()
                                        .underline(),
                                )
                                .sense(egui::Sense::click()),
                            )
                            .on_hover_text(href);

                        if link.hovered() {
                            ui.output_mut(|o| o.cursor_icon = egui::CursorIcon::PointingHand);
                        }
                        if link.clicked() {
                            link_clicked = Some(href.to_string());
                        }
                    }
                    TitleView::Plain(text) => {
                        ui.label(RichText::new(text).color(theme.text).size(16.0).strong());
                    }
                }

                if let Some(domain) = story.domain() {
                    ui.add_space(8.0);
                    ui.label(
                        RichText::new(format!("({domain})"))
                            .color(theme.secondary_text)
                            .italics(),
                    );
                }
            });

            if let Some(by) = &story.by {
                ui.label(
                    RichText::new(format!("by {by}"))
                        .color(theme.secondary_text)
                        .size(14.0),
                );
            }
        });

    link_clicked
}

#[cfg(test)]
mod tests {
    use super::*;

    fn story(url: Option<&str>) -> Story {
        Story {
            id: 1,
            title: "Show HN: A tiny HN client".to_string(),
            url: url.map(str::to_string),
            score: 64,
            by: Some("pg".to_string()),
        }
    }

    #[test]
    fn title_links_to_exact_url() {
        let story = story(Some("https://example.com/post?id=1"));
        assert_eq!(
            title_view(&story),
            TitleView::Link {
                text: "Show HN: A tiny HN client",
                href: "https://example.com/post?id=1",
            }
        );
    }

    #[test]
    fn title_without_url_is_plain() {
        let story = story(None);
        assert_eq!(title_view(&story), TitleView::Plain("Show HN: A tiny HN client"));
    }

    #[test]
    fn only_the_selected_tab_is_highlighted() {
        let theme = AppTheme::light();
        let highlight = Stroke::new(2.0, theme.highlight);

        for selected in Category::ALL {
            let highlighted: Vec<Category> = Category::ALL
                .into_iter()
                .filter(|&category| tab_style(category, category == selected, &theme).stroke == highlight)
                .collect();
            assert_eq!(highlighted, vec![selected]);
        }
    }

    #[test]
    fn inactive_tabs_have_no_fill_or_stroke() {
        let theme = AppTheme::dark();
        let style = tab_style(Category::Job, false, &theme);
        assert_eq!(style.fill, Color32::TRANSPARENT);
        assert_eq!(style.stroke, Stroke::NONE);
        assert_eq!(style.text.text(), "Job");
    }

    #[test]
    fn renders_every_state_without_input() {
        let ctx = egui::Context::default();
        let theme = AppTheme::dark();
        let states = [
            QueryState::Loading,
            QueryState::Error("Not Found".to_string()),
            QueryState::Loaded(story(Some("https://example.com"))),
            QueryState::Loaded(story(None)),
        ];

        let _ = ctx.run(egui::RawInput::default(), |ctx| {
            egui::CentralPanel::default().show(ctx, |ui| {
                assert_eq!(category_tabs(ui, Category::Best, &theme), None);
                for (i, state) in states.iter().enumerate() {
                    ui.push_id(i, |ui| {
                        assert_eq!(story_row(ui, state, &theme), None);
                    });
                }
            });
        });
    }
}
