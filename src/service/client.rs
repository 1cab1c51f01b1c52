use tokio::sync::mpsc;

use crate::chat::Submitter;
use crate::common::ChatCommand;
use crate::store::SharedStore;

/// Background task that turns UI commands into store writes.
pub struct ChatService {
    submitter: Submitter,
    command_receiver: mpsc::Receiver<ChatCommand>,
}

impl ChatService {
    pub fn new(store: SharedStore, command_receiver: mpsc::Receiver<ChatCommand>) -> Self {
        Self {
            submitter: Submitter::new(store),
            command_receiver,
        }
    }

    /// Runs until every command sender is dropped.
    pub async fn run(mut self) {
        log::info!("Chat service started");

        while let Some(command) = self.command_receiver.recv().await {
            self.handle_command(command);
        }

        log::info!("Chat service stopped");
    }

    fn handle_command(&mut self, command: ChatCommand) {
        match command {
            ChatCommand::Submit { user, text } => {
                // completion is not awaited; failures are logged by the submitter
                let _ = self.submitter.submit(user, text);
            }
        }
    }
}
