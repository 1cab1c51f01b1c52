use eframe::egui;

use crate::chat::display::{self, LineStyle};
use crate::common::{Message, Session};

const LINE_MARGIN: f32 = 20.0;

fn color(style: LineStyle) -> egui::Color32 {
    match style {
        LineStyle::First => egui::Color32::BLUE,
        LineStyle::Second => egui::Color32::GREEN,
    }
}

/// Draws the merged transcript. Nothing is drawn before it has loaded.
pub fn render(ui: &mut egui::Ui, transcript: Option<&[Message]>, session: &Session) {
    let Some(messages) = transcript else {
        return;
    };

    egui::ScrollArea::vertical()
        .stick_to_bottom(true)
        .show(ui, |ui| {
            for line in display::project(messages, session) {
                ui.add_space(LINE_MARGIN);
                ui.colored_label(color(line.style), line.text);
            }
        });
}
