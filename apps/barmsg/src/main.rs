use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use bridges::ipc;
use clap::{Parser, Subcommand};
use shared::protocol::{IpcMessage, IpcReply};

/// Sends a message to running status bars.
#[derive(Parser, Debug)]
#[command(name = "barmsg")]
struct Cli {
    /// Only message the bar with this pid
    #[arg(short, long)]
    pid: Option<u32>,
    /// Directory holding the bar sockets; defaults to the system temp dir
    #[arg(long)]
    socket_dir: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Bar command such as `quit`, `restart`, `toggle` or `module-hide NAME`
    Cmd {
        #[arg(required = true, num_args = 1..)]
        words: Vec<String>,
    },
    /// Module action, `#NAME.ACTION[.DATA]`
    Action { action: String },
    /// Select hook INDEX of a text module
    Hook { module: String, index: u32 },
}

impl Command {
    fn into_message(self) -> IpcMessage {
        match self {
            Command::Cmd { words } => IpcMessage::Command(words.join(" ")),
            Command::Action { action } => IpcMessage::Action(action),
            Command::Hook { module, index } => IpcMessage::Hook(format!("module/{module} {index}")),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let dir = cli.socket_dir.unwrap_or_else(std::env::temp_dir);
    let targets = targets(&dir, cli.pid)?;
    let message = cli.command.into_message();

    let mut failures = 0;
    for (pid, path) in targets {
        match ipc::send(&path, &message).await {
            Ok(IpcReply::Ok) => println!("{pid}: ok"),
            Ok(IpcReply::Error(reason)) => {
                failures += 1;
                eprintln!("{pid}: error: {reason}");
            }
            Err(err) => {
                failures += 1;
                eprintln!("{pid}: {err:#}");
            }
        }
    }

    if failures > 0 {
        bail!("{failures} bar(s) did not accept '{message}'");
    }
    Ok(())
}

fn targets(dir: &Path, pid: Option<u32>) -> Result<Vec<(u32, PathBuf)>> {
    if let Some(pid) = pid {
        let path = ipc::socket_path(dir, pid);
        if !path.exists() {
            bail!("no bar with pid {pid} ('{}' does not exist)", path.display());
        }
        return Ok(vec![(pid, path)]);
    }

    let found = ipc::find_sockets(dir)
        .with_context(|| format!("failed to scan '{}' for bar sockets", dir.display()))?;
    if found.is_empty() {
        bail!("no running bars found in '{}'", dir.display());
    }
    Ok(found)
}
