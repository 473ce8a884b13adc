//! Unix socket listener for `cmd:`, `action:` and `hook:` messages.
//!
//! Every running instance listens on `<dir>/statusbar_ipc.<pid>.sock`. Each
//! line a client writes is parsed, queued for the controller, and answered
//! with one reply line.

use std::{
    fs, io,
    os::unix::net::UnixListener as StdUnixListener,
    path::{Path, PathBuf},
};

use anyhow::Context;
use controller::{EventSource, QueueHandle};
use shared::protocol::{IpcMessage, IpcReply};
use tokio::{
    io::{AsyncBufReadExt, AsyncWriteExt, BufReader},
    net::{UnixListener, UnixStream},
    sync::oneshot,
};

use crate::worker::{self, Worker};

const SOCKET_PREFIX: &str = "statusbar_ipc.";
const SOCKET_SUFFIX: &str = ".sock";

pub fn socket_path(dir: &Path, pid: u32) -> PathBuf {
    dir.join(format!("{SOCKET_PREFIX}{pid}{SOCKET_SUFFIX}"))
}

/// Socket of the current process in the system temp dir.
pub fn default_socket_path() -> PathBuf {
    socket_path(&std::env::temp_dir(), std::process::id())
}

/// Lists `(pid, path)` for every socket in `dir` that follows the naming
/// scheme, sorted by pid.
pub fn find_sockets(dir: &Path) -> io::Result<Vec<(u32, PathBuf)>> {
    let mut found = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let name = entry.file_name();
        let Some(pid) = name
            .to_str()
            .and_then(|name| name.strip_prefix(SOCKET_PREFIX))
            .and_then(|rest| rest.strip_suffix(SOCKET_SUFFIX))
            .and_then(|pid| pid.parse::<u32>().ok())
        else {
            continue;
        };
        found.push((pid, entry.path()));
    }
    found.sort();
    Ok(found)
}

pub struct IpcServer {
    path: PathBuf,
    worker: Worker,
}

impl IpcServer {
    /// Binds `path` and starts serving on a background thread. A stale socket
    /// file at `path` is replaced.
    pub fn spawn(path: PathBuf, events: QueueHandle) -> anyhow::Result<Self> {
        if path.exists() {
            tracing::warn!(path = %path.display(), "removing stale ipc socket");
            fs::remove_file(&path)
                .with_context(|| format!("failed to remove stale socket '{}'", path.display()))?;
        }

        let listener = StdUnixListener::bind(&path)
            .with_context(|| format!("failed to bind ipc socket '{}'", path.display()))?;
        listener
            .set_nonblocking(true)
            .context("failed to make ipc socket non-blocking")?;

        let runtime = worker::runtime()?;
        let listener = {
            let _guard = runtime.enter();
            UnixListener::from_std(listener).context("failed to register ipc socket")?
        };

        tracing::info!(path = %path.display(), "listening for ipc messages");
        let worker = Worker::spawn("ipc", runtime, move |shutdown| {
            serve(listener, events, shutdown)
        })?;

        Ok(Self { path, worker })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl EventSource for IpcServer {
    fn name(&self) -> &str {
        self.worker.name()
    }

    fn stop(&mut self) {
        self.worker.stop();
        match fs::remove_file(&self.path) {
            Ok(()) => tracing::debug!(path = %self.path.display(), "removed ipc socket"),
            Err(err) if err.kind() == io::ErrorKind::NotFound => {}
            Err(err) => tracing::warn!(path = %self.path.display(), error = %err, "failed to remove ipc socket"),
        }
    }
}

impl Drop for IpcServer {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn serve(listener: UnixListener, events: QueueHandle, mut shutdown: oneshot::Receiver<()>) {
    loop {
        tokio::select! {
            _ = &mut shutdown => break,
            accepted = listener.accept() => match accepted {
                Ok((stream, _)) => {
                    tokio::spawn(handle_connection(stream, events.clone()));
                }
                Err(err) => tracing::warn!(error = %err, "failed to accept ipc connection"),
            },
        }
    }
    tracing::debug!("ipc listener stopped");
}

async fn handle_connection(stream: UnixStream, events: QueueHandle) {
    let (reader, mut writer) = stream.into_split();
    let mut lines = BufReader::new(reader).lines();

    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(err) => {
                tracing::debug!(error = %err, "ipc connection read failed");
                break;
            }
        };
        if line.trim().is_empty() {
            continue;
        }

        let reply = accept_message(&line, &events);
        if let Err(err) = writer.write_all(format!("{reply}\n").as_bytes()).await {
            tracing::debug!(error = %err, "ipc connection write failed");
            break;
        }
    }
}

/// Parses one line and queues it for the controller.
pub fn accept_message(line: &str, events: &QueueHandle) -> IpcReply {
    let message = match line.parse::<IpcMessage>() {
        Ok(message) => message,
        Err(err) => {
            tracing::warn!(line, error = %err, "rejecting ipc message");
            return IpcReply::Error(err.to_string());
        }
    };

    tracing::debug!(%message, "received ipc message");
    if events.enqueue(message.into_event()) {
        IpcReply::Ok
    } else {
        IpcReply::Error("controller is not accepting messages".into())
    }
}

/// Sends one message and waits for its reply.
pub async fn send(path: &Path, message: &IpcMessage) -> anyhow::Result<IpcReply> {
    let stream = UnixStream::connect(path)
        .await
        .with_context(|| format!("failed to connect to '{}'", path.display()))?;
    let (reader, mut writer) = stream.into_split();

    writer
        .write_all(format!("{message}\n").as_bytes())
        .await
        .context("failed to send ipc message")?;

    let mut lines = BufReader::new(reader).lines();
    let reply = lines
        .next_line()
        .await
        .context("failed to read ipc reply")?
        .context("connection closed before a reply arrived")?;
    reply
        .parse()
        .with_context(|| format!("malformed ipc reply '{reply}'"))
}

#[cfg(test)]
#[path = "tests/ipc_tests.rs"]
mod tests;
