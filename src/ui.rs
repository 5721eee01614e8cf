//! egui overlay: heading, viewer status and the newsletter form.

use crate::newsletter::{MessageKind, NewsletterForm};
use crate::params::LaunchParams;
use crate::viewer::ViewerStatus;

pub const DEFAULT_TITLE: &str = "Model Showcase";
pub const DEFAULT_SUBTITLE: &str = "Drag to rotate · scroll to zoom";

const ACCENT: egui::Color32 = egui::Color32::from_rgb(255, 214, 64);
const ERROR: egui::Color32 = egui::Color32::from_rgb(255, 110, 100);
const SUCCESS: egui::Color32 = egui::Color32::from_rgb(120, 220, 140);

/// Heading and sub-heading text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageText {
    pub title: String,
    pub subtitle: String,
}

impl PageText {
    /// A parameter that is present wins even when empty
    pub fn from_params(params: &LaunchParams) -> Self {
        let defaults = Self::default();
        Self {
            title: params.title.clone().unwrap_or(defaults.title),
            subtitle: params.subtitle.clone().unwrap_or(defaults.subtitle),
        }
    }
}

impl Default for PageText {
    fn default() -> Self {
        Self {
            title: DEFAULT_TITLE.to_string(),
            subtitle: DEFAULT_SUBTITLE.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiAction {
    Subscribe,
}

/// Draw the overlay for one frame: header and load status always, the form
/// when one is given. Returns the action the user triggered.
pub fn draw_overlay(
    ctx: &egui::Context,
    page: &PageText,
    status: &ViewerStatus,
    form: Option<&mut NewsletterForm>,
) -> Option<UiAction> {
    egui::Area::new(egui::Id::new("page_header"))
        .fixed_pos(egui::pos2(16.0, 16.0))
        .show(ctx, |ui| {
            ui.label(egui::RichText::new(&page.title).size(28.0).color(egui::Color32::WHITE));
            ui.label(egui::RichText::new(&page.subtitle).size(14.0).color(egui::Color32::GRAY));

            ui.add_space(8.0);
            if status.is_loading() {
                ui.horizontal(|ui| {
                    ui.spinner();
                    ui.label(egui::RichText::new("Loading model…").color(ACCENT));
                });
            }
            if let Some(error) = status.error() {
                ui.label(egui::RichText::new(error).color(ERROR));
            }
        });

    let form = form?;
    let mut action = None;

    egui::Window::new("Newsletter")
        .title_bar(true)
        .resizable(false)
        .anchor(egui::Align2::RIGHT_BOTTOM, egui::vec2(-16.0, -16.0))
        .default_width(300.0)
        .show(ctx, |ui| {
            ui.label("Get updates when new models land.");
            ui.add_space(5.0);

            ui.horizontal(|ui| {
                let field = ui.add(
                    egui::TextEdit::singleline(form.input_mut())
                        .hint_text("you@example.com")
                        .desired_width(180.0),
                );
                let pressed_enter =
                    field.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));

                let button = ui.add_enabled(form.submit_enabled(), egui::Button::new("Subscribe"));
                if button.clicked() || (pressed_enter && form.submit_enabled()) {
                    action = Some(UiAction::Subscribe);
                }
            });

            if let Some(message) = form.message() {
                ui.add_space(5.0);
                let color = match message.kind {
                    MessageKind::Success => SUCCESS,
                    MessageKind::Error => ERROR,
                };
                ui.label(egui::RichText::new(&message.text).color(color));
            }
        });

    action
}
