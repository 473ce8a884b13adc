//! Line protocol spoken over the IPC socket.
//!
//! A client writes one message per line, `cmd:PAYLOAD`, `action:PAYLOAD` or
//! `hook:PAYLOAD`, and reads back one [`IpcReply`] line per message.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{error::ProtocolError, event::Event};

pub const COMMAND_PREFIX: &str = "cmd";
pub const ACTION_PREFIX: &str = "action";
pub const HOOK_PREFIX: &str = "hook";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum IpcMessage {
    Command(String),
    Action(String),
    Hook(String),
}

impl IpcMessage {
    pub fn payload(&self) -> &str {
        match self {
            IpcMessage::Command(payload)
            | IpcMessage::Action(payload)
            | IpcMessage::Hook(payload) => payload,
        }
    }

    pub fn into_event(self) -> Event {
        match self {
            IpcMessage::Command(payload) => Event::IpcCommand(payload),
            IpcMessage::Action(payload) => Event::IpcAction(payload),
            IpcMessage::Hook(payload) => Event::IpcHook(payload),
        }
    }

    fn prefix(&self) -> &'static str {
        match self {
            IpcMessage::Command(_) => COMMAND_PREFIX,
            IpcMessage::Action(_) => ACTION_PREFIX,
            IpcMessage::Hook(_) => HOOK_PREFIX,
        }
    }
}

impl FromStr for IpcMessage {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let line = s.trim();
        if line.is_empty() {
            return Err(ProtocolError::Empty);
        }
        let Some((kind, payload)) = line.split_once(':') else {
            return Err(ProtocolError::UnknownType(line.to_string()));
        };
        let payload = payload.trim();
        if payload.is_empty() {
            return Err(ProtocolError::EmptyPayload {
                kind: kind.to_string(),
            });
        }

        match kind.trim() {
            COMMAND_PREFIX => Ok(IpcMessage::Command(payload.to_string())),
            ACTION_PREFIX => Ok(IpcMessage::Action(payload.to_string())),
            HOOK_PREFIX => Ok(IpcMessage::Hook(payload.to_string())),
            other => Err(ProtocolError::UnknownType(other.to_string())),
        }
    }
}

impl fmt::Display for IpcMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.prefix(), self.payload())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IpcReply {
    Ok,
    Error(String),
}

impl FromStr for IpcReply {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let line = s.trim();
        if line == "ok" {
            return Ok(IpcReply::Ok);
        }
        match line.strip_prefix("error:") {
            Some(reason) => Ok(IpcReply::Error(reason.trim().to_string())),
            None if line.is_empty() => Err(ProtocolError::Empty),
            None => Err(ProtocolError::UnknownType(line.to_string())),
        }
    }
}

impl fmt::Display for IpcReply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IpcReply::Ok => f.write_str("ok"),
            IpcReply::Error(reason) => write!(f, "error: {reason}"),
        }
    }
}
