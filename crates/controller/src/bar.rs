//! Interface to the rendering surface.

use std::collections::BTreeMap;

use shared::domain::{Alignment, Visibility};

use crate::queue::QueueHandle;

/// Module output for one update, grouped by alignment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Frame {
    blocks: BTreeMap<Alignment, Vec<String>>,
}

impl Frame {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, alignment: Alignment, contents: impl Into<String>) {
        self.blocks.entry(alignment).or_default().push(contents.into());
    }

    pub fn block(&self, alignment: Alignment) -> &[String] {
        self.blocks
            .get(&alignment)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.values().all(Vec::is_empty)
    }

    /// Joins one block with `separator`.
    pub fn join(&self, alignment: Alignment, separator: &str) -> String {
        self.block(alignment).join(separator)
    }

    /// Single-line form with `%{l}`, `%{c}`, `%{r}` alignment tags, as
    /// written in writeback mode. Empty blocks are omitted.
    pub fn to_markup(&self, separator: &str) -> String {
        let mut line = String::new();
        for alignment in Alignment::ALL {
            let block = self.block(alignment);
            if block.is_empty() {
                continue;
            }
            let tag = match alignment {
                Alignment::Left => 'l',
                Alignment::Center => 'c',
                Alignment::Right => 'r',
            };
            line.push_str(&format!("%{{{tag}}}"));
            line.push_str(&block.join(separator));
        }
        line
    }
}

pub trait Bar: Send {
    /// Draws `frame`. `force` is set when the caller wants a redraw even if
    /// the surface thinks nothing changed.
    fn render(&mut self, frame: &Frame, force: bool) -> anyhow::Result<()>;

    fn set_visibility(&mut self, visibility: Visibility) -> anyhow::Result<()>;

    /// Gives the bar a way to push UI events. Called once by the controller.
    fn attach(&mut self, _events: QueueHandle) {}

    /// Whether updates must wait for a `UiReady` signal before drawing.
    fn waits_for_ready(&self) -> bool {
        false
    }
}
