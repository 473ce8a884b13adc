use std::io::{self, Write};

use anyhow::Context;
use controller::{Bar, Frame, QueueHandle};
use shared::{domain::Visibility, event::Event};

/// Prints one markup line per update. A hidden bar prints empty lines.
pub struct TextBar {
    out: Box<dyn Write + Send>,
    separator: String,
    visible: bool,
}

impl TextBar {
    pub fn new(out: Box<dyn Write + Send>, separator: impl Into<String>) -> Self {
        Self {
            out,
            separator: separator.into(),
            visible: true,
        }
    }

    pub fn stdout(separator: impl Into<String>) -> Self {
        Self::new(Box::new(io::stdout()), separator)
    }

    fn write_line(&mut self, line: &str) -> anyhow::Result<()> {
        writeln!(self.out, "{line}").context("failed to write bar output")?;
        self.out.flush().context("failed to flush bar output")
    }
}

impl Bar for TextBar {
    fn render(&mut self, frame: &Frame, _force: bool) -> anyhow::Result<()> {
        if !self.visible {
            return Ok(());
        }
        let line = frame.to_markup(&self.separator);
        self.write_line(&line)
    }

    fn set_visibility(&mut self, visibility: Visibility) -> anyhow::Result<()> {
        let visible = visibility.apply(self.visible);
        if visible == self.visible {
            return Ok(());
        }
        self.visible = visible;
        tracing::debug!(visible, "bar visibility changed");
        if !visible {
            self.write_line("")?;
        }
        Ok(())
    }

    fn attach(&mut self, events: QueueHandle) {
        // Nothing to map; the terminal is ready as soon as we have it.
        events.enqueue(Event::UiReady);
    }

    fn waits_for_ready(&self) -> bool {
        true
    }
}
