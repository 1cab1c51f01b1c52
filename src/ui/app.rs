use eframe::egui;
use tokio::runtime::Handle;
use tokio::sync::mpsc;

use crate::chat::Transcript;
use crate::common::{ChatCommand, Participant, Session};

use super::components::{chat_area, input_bar};
use super::state::AppState;

pub struct DuoChatApp {
    session: Session,
    state: AppState,
    command_sender: mpsc::Sender<ChatCommand>,
    transcript: Transcript,
}

impl DuoChatApp {
    pub fn new(
        cc: &eframe::CreationContext<'_>,
        runtime: &Handle,
        session: Session,
        command_sender: mpsc::Sender<ChatCommand>,
        transcript: Transcript,
    ) -> Self {
        // repaint whenever the transcript changes instead of polling every frame
        let ctx = cc.egui_ctx.clone();
        let mut updates = transcript.updates();
        runtime.spawn(async move {
            while updates.changed().await.is_ok() {
                ctx.request_repaint();
            }
        });

        Self {
            session,
            state: AppState::new(),
            command_sender,
            transcript,
        }
    }

    fn participant_form(&mut self, ui: &mut egui::Ui, participant: Participant) {
        let label = match participant {
            Participant::First => "Player 1",
            Participant::Second => "Player 2",
        };
        ui.heading(label);
        ui.label(egui::RichText::new(self.session.user(participant).as_str()).weak());
        ui.separator();

        if let Some(text) = input_bar::render(ui, self.state.input_mut(participant)) {
            self.submit(participant, text);
        }
    }

    fn submit(&mut self, participant: Participant, text: String) {
        let command = ChatCommand::Submit {
            user: self.session.user(participant).clone(),
            text,
        };
        if let Err(err) = self.command_sender.try_send(command) {
            log::warn!("Failed to send command to chat service: {err}");
        }
    }
}

impl eframe::App for DuoChatApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        egui::SidePanel::left("first_participant")
            .resizable(true)
            .default_width(260.0)
            .show(ctx, |ui| {
                self.participant_form(ui, Participant::First);
            });

        egui::SidePanel::right("second_participant")
            .resizable(true)
            .default_width(260.0)
            .show(ctx, |ui| {
                self.participant_form(ui, Participant::Second);
            });

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.heading("Chat");
            ui.separator();
            let transcript = self.transcript.latest();
            let messages = transcript.messages().map(|list| &list[..]);
            chat_area::render(ui, messages, &self.session);
        });
    }
}
