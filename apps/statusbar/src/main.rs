use std::path::PathBuf;

use anyhow::{bail, Result};
use bridges::{
    ipc::{self, IpcServer},
    signals::SignalBridge,
    stdin::spawn_stdin_reader,
    watch::{ConfigWatcher, WatchMode},
};
use clap::Parser;
use controller::{Controller, RunOutcome};
use crossbeam_channel::Receiver;
use tracing::{error, info, warn};

mod bar;
mod modules;
mod settings;

use bar::TextBar;
use settings::Settings;

#[derive(Parser, Debug)]
#[command(name = "statusbar", about = "Event-driven status bar")]
struct Args {
    /// Config file; defaults to $XDG_CONFIG_HOME/statusbar/config.toml
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Read actions and shell commands from stdin, one per line
    #[arg(long)]
    stdin: bool,
    /// Print the composed bar contents instead of drawing the bar
    #[arg(short, long)]
    writeback: bool,
    /// With --writeback, write each frame to this file instead of stdout
    #[arg(long, value_name = "PATH", requires = "writeback")]
    snapshot: Option<PathBuf>,
    /// Restart the bar when the config file changes instead of redrawing
    #[arg(short, long)]
    reload: bool,
    /// Log filter, e.g. `debug` or `controller=trace`; overrides RUST_LOG
    #[arg(long)]
    log: Option<String>,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.log.as_deref());

    let input = if args.stdin {
        Some(spawn_stdin_reader()?)
    } else {
        None
    };

    loop {
        let settings = settings::load_settings(args.config.as_deref())?;
        match run_once(&args, &settings, input.clone())? {
            RunOutcome::Terminate => {
                info!("bar terminated");
                return Ok(());
            }
            RunOutcome::Reload => info!("reloading bar"),
            RunOutcome::Fault(reason) => {
                error!(reason, "bar stopped on an unrecoverable fault");
                bail!("controller fault: {reason}");
            }
        }
    }
}

fn init_logging(filter: Option<&str>) {
    let filter = filter
        .map(str::to_string)
        .or_else(|| std::env::var("RUST_LOG").ok())
        .unwrap_or_else(|| "info".to_string());
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Builds a fresh controller from `settings` and runs it to completion.
fn run_once(args: &Args, settings: &Settings, input: Option<Receiver<String>>) -> Result<RunOutcome> {
    let config = settings.controller_config();
    let bar = TextBar::stdout(config.separator.clone());
    let mut controller = Controller::new(config, Box::new(bar));

    for (module, alignment) in modules::build_modules(settings)? {
        controller.register_module(module, alignment);
    }
    if controller.modules().is_empty() {
        warn!("no modules configured");
    }

    let queue = controller.queue();
    controller.attach_source(Box::new(SignalBridge::spawn(queue.clone())?));

    if let Some(path) = &settings.source {
        let mode = if args.reload {
            WatchMode::Reload
        } else {
            WatchMode::Redraw
        };
        match ConfigWatcher::spawn(path, mode, queue.clone()) {
            Ok(watcher) => controller.attach_source(Box::new(watcher)),
            Err(err) => warn!(error = format!("{err:#}"), "config changes will not be picked up"),
        }
    }

    if settings.ipc.enabled {
        let socket = settings
            .ipc
            .socket
            .clone()
            .unwrap_or_else(ipc::default_socket_path);
        match IpcServer::spawn(socket, queue) {
            Ok(server) => controller.attach_source(Box::new(server)),
            Err(err) => warn!(error = format!("{err:#}"), "ipc disabled"),
        }
    }

    if let Some(lines) = input {
        controller.attach_input(lines);
    }

    Ok(controller.run(args.writeback, args.snapshot.clone()))
}
