use crate::common::{Message, Session};

/// Visual style of a transcript line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineStyle {
    First,
    Second,
}

impl LineStyle {
    pub fn for_message(message: &Message, session: &Session) -> Self {
        if message.user == session.first {
            LineStyle::First
        } else {
            LineStyle::Second
        }
    }

    /// Short tag used by the plain-text renderer.
    pub fn tag(self) -> &'static str {
        match self {
            LineStyle::First => "[1]",
            LineStyle::Second => "[2]",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptLine<'a> {
    pub style: LineStyle,
    pub text: &'a str,
}

pub fn project<'a>(messages: &'a [Message], session: &Session) -> Vec<TranscriptLine<'a>> {
    messages
        .iter()
        .map(|message| TranscriptLine {
            style: LineStyle::for_message(message, session),
            text: &message.text,
        })
        .collect()
}

pub fn render_plain(messages: &[Message], session: &Session) -> String {
    project(messages, session)
        .iter()
        .map(|line| format!("{} {}\n", line.style.tag(), line.text))
        .collect()
}
