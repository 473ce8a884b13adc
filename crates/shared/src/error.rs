use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    #[error("unknown alignment '{0}'")]
    UnknownAlignment(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ActionError {
    #[error("action string must start with '#': {0}")]
    MissingPrefix(String),
    #[error("action string has no module name: {0}")]
    MissingModule(String),
    #[error("action string has no action name: {0}")]
    MissingAction(String),
    #[error("empty command")]
    EmptyCommand,
    #[error("unknown command '{0}'")]
    UnknownCommand(String),
    #[error("command '{verb}' requires a module name")]
    MissingModuleArgument { verb: String },
    #[error("malformed hook '{0}', expected 'module/NAME INDEX'")]
    MalformedHook(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolError {
    #[error("empty ipc message")]
    Empty,
    #[error("unknown ipc message type '{0}'")]
    UnknownType(String),
    #[error("ipc message '{kind}' has an empty payload")]
    EmptyPayload { kind: String },
}
