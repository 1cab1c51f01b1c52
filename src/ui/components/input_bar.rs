use eframe::egui;

/// Single-line message form. Returns the submitted text and clears the
/// buffer; empty submissions are allowed.
pub fn render(ui: &mut egui::Ui, input_text: &mut String) -> Option<String> {
    let mut send = false;
    ui.label("Your message:");
    ui.horizontal(|ui| {
        let response = ui.text_edit_singleline(input_text);
        if ui.button("Send").clicked() {
            send = true;
        }

        if response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
            send = true;
            response.request_focus();
        }
    });

    if send {
        return Some(std::mem::take(input_text));
    }

    None
}
