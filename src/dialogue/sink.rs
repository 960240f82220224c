//! Presentation sinks

use std::io::{self, Write};
use tracing::warn;

use super::speaker::Speaker;

/// Receives messages in the order they should be shown
pub trait PresentationSink: Send {
    fn emit(&mut self, speaker: Speaker, text: &str);
}

/// Writes `"<label>: <text>"` blocks to a terminal or any writer
pub struct TerminalSink<W: Write + Send> {
    writer: W,
    color: bool,
    echo_user: bool,
}

impl TerminalSink<io::Stdout> {
    /// Coloured output on stdout; user lines are not repeated since the
    /// terminal already shows what was typed
    pub fn stdout() -> Self {
        Self::new(io::stdout()).with_user_echo(false)
    }
}

impl<W: Write + Send> TerminalSink<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            color: true,
            echo_user: true,
        }
    }

    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    pub fn with_user_echo(mut self, echo_user: bool) -> Self {
        self.echo_user = echo_user;
        self
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    fn render(&self, speaker: Speaker, text: &str) -> String {
        let style = speaker.style();
        if self.color {
            let weight = if style.bold { "1;" } else { "" };
            format!(
                "\x1b[{}38;2;{};{};{}m{}:\x1b[0m {}\n\n",
                weight, style.color.0, style.color.1, style.color.2, style.label, text
            )
        } else {
            format!("{}: {}\n\n", style.label, text)
        }
    }
}

impl<W: Write + Send> PresentationSink for TerminalSink<W> {
    fn emit(&mut self, speaker: Speaker, text: &str) {
        if speaker == Speaker::User && !self.echo_user {
            return;
        }

        let rendered = self.render(speaker, text);
        if let Err(e) = self
            .writer
            .write_all(rendered.as_bytes())
            .and_then(|_| self.writer.flush())
        {
            warn!("Failed to write {} message: {}", speaker, e);
        }
    }
}

/// Keeps every emitted message in memory
#[derive(Debug, Default, Clone)]
pub struct RecordingSink {
    messages: Vec<(Speaker, String)>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> &[(Speaker, String)] {
        &self.messages
    }

    pub fn last(&self) -> Option<&(Speaker, String)> {
        self.messages.last()
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }
}

impl PresentationSink for RecordingSink {
    fn emit(&mut self, speaker: Speaker, text: &str) {
        self.messages.push((speaker, text.to_string()));
    }
}
