//! Types shared by the controller core, its event sources and the IPC client.

pub mod action;
pub mod domain;
pub mod error;
pub mod event;
pub mod protocol;
