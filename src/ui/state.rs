use crate::common::Participant;

/// Local UI state: the two participants' unsent input.
#[derive(Debug, Default)]
pub struct AppState {
    pub first_input: String,
    pub second_input: String,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn input_mut(&mut self, participant: Participant) -> &mut String {
        match participant {
            Participant::First => &mut self.first_input,
            Participant::Second => &mut self.second_input,
        }
    }
}
