//! Terminal colouring for command output.

use std::io::IsTerminal;

use owo_colors::{AnsiColors, OwoColorize};

/// What a line of output reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Done,
    Warn,
    Failed,
    /// Ids, tags and addresses.
    Name,
    /// Secondary detail.
    Quiet,
}

impl Tone {
    const fn color(self) -> Option<AnsiColors> {
        match self {
            Self::Done => Some(AnsiColors::Green),
            Self::Warn => Some(AnsiColors::Yellow),
            Self::Failed => Some(AnsiColors::Red),
            Self::Name => Some(AnsiColors::Cyan),
            Self::Quiet => None,
        }
    }
}

/// `text` coloured for `tone`, or unchanged when stdout is not a terminal.
pub fn paint(text: impl AsRef<str>, tone: Tone) -> String {
    let text = text.as_ref();
    if !std::io::stdout().is_terminal() {
        return text.to_string();
    }
    match tone.color() {
        Some(color) => text.color(color).to_string(),
        None => text.dimmed().to_string(),
    }
}
