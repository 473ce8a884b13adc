use shared::{error::ActionError, event::SignalKind};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("no module named '{0}'")]
    UnknownModule(String),
}

/// Fatal failures on the event thread. Any of these ends the run loop.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("receiver '{receiver}' failed while handling {kind}")]
    Handler {
        receiver: String,
        kind: SignalKind,
        #[source]
        source: anyhow::Error,
    },
    #[error("failed to process input data")]
    Input {
        #[source]
        source: anyhow::Error,
    },
}

#[derive(Debug, Error)]
pub enum CommandError {
    #[error("unresolvable command '{0}'")]
    Unresolved(String),
    #[error(transparent)]
    Parse(#[from] ActionError),
    #[error(transparent)]
    Registry(#[from] RegistryError),
    #[error("no module of type '{0}' accepted the legacy action")]
    LegacyRejected(String),
    #[error("module '{module}' rejected action '{action}'")]
    Rejected { module: String, action: String },
    #[error("failed to update the bar")]
    Render(#[source] anyhow::Error),
}

impl CommandError {
    /// Only render failures are fatal; everything else is logged and dropped.
    pub fn is_fatal(&self) -> bool {
        matches!(self, CommandError::Render(_))
    }
}
