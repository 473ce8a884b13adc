//! Event producers that live outside the controller: the config file
//! watcher, the ipc socket, OS signals and the raw input reader.
//!
//! Every bridge only talks to the controller through a
//! [`controller::QueueHandle`].

#[cfg(unix)]
pub mod ipc;
#[cfg(unix)]
pub mod signals;
pub mod stdin;
pub mod watch;
mod worker;
