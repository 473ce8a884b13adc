//! Config file watcher.
//!
//! The parent directory is watched rather than the file, so editors that
//! save by writing a new file and renaming it over the old one still
//! trigger.

use std::{
    ffi::OsString,
    path::{Path, PathBuf},
};

use anyhow::Context;
use controller::{EventSource, QueueHandle};
use notify::{Event as FsEvent, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use serde::Deserialize;
use shared::event::Event;

/// What a config change turns into.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WatchMode {
    /// Redraw with the current modules.
    #[default]
    Redraw,
    /// Tear the controller down and start over with the new config.
    Reload,
}

impl WatchMode {
    pub fn event(self) -> Event {
        match self {
            WatchMode::Redraw => Event::NotifyChange,
            WatchMode::Reload => Event::ExitReload,
        }
    }
}

pub struct ConfigWatcher {
    path: PathBuf,
    watcher: Option<RecommendedWatcher>,
}

impl ConfigWatcher {
    pub fn spawn(path: &Path, mode: WatchMode, events: QueueHandle) -> anyhow::Result<Self> {
        let path = path
            .canonicalize()
            .with_context(|| format!("failed to resolve config path '{}'", path.display()))?;
        let dir = path
            .parent()
            .map(Path::to_path_buf)
            .with_context(|| format!("config path '{}' has no parent", path.display()))?;
        let file_name = path
            .file_name()
            .map(OsString::from)
            .with_context(|| format!("config path '{}' has no file name", path.display()))?;

        let mut watcher = notify::recommended_watcher(move |result: notify::Result<FsEvent>| {
            match result {
                Ok(event) if touches(&event, &file_name) => {
                    tracing::info!(kind = ?event.kind, ?mode, "config file changed");
                    events.enqueue(mode.event());
                }
                Ok(_) => {}
                Err(err) => tracing::warn!(error = %err, "config watcher error"),
            }
        })
        .context("failed to create config watcher")?;

        watcher
            .watch(&dir, RecursiveMode::NonRecursive)
            .with_context(|| format!("failed to watch '{}'", dir.display()))?;
        tracing::debug!(path = %path.display(), ?mode, "watching config file");

        Ok(Self {
            path,
            watcher: Some(watcher),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn touches(event: &FsEvent, file_name: &OsString) -> bool {
    let relevant = matches!(
        event.kind,
        EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_)
    );
    relevant
        && event
            .paths
            .iter()
            .any(|path| path.file_name() == Some(file_name.as_os_str()))
}

impl EventSource for ConfigWatcher {
    fn name(&self) -> &str {
        "config-watcher"
    }

    fn stop(&mut self) {
        if self.watcher.take().is_some() {
            tracing::debug!(path = %self.path.display(), "stopped watching config file");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::{
        fs,
        time::{Duration, Instant, SystemTime, UNIX_EPOCH},
    };

    use controller::{EventQueue, QueueItem};
    use notify::event::{CreateKind, ModifyKind};

    fn temp_dir() -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock")
            .as_nanos();
        let dir = std::env::temp_dir().join(format!("statusbar-watch-{nanos}"));
        fs::create_dir_all(&dir).expect("temp dir");
        dir
    }

    #[test]
    fn only_events_for_the_config_file_count() {
        let name = OsString::from("config.toml");
        let ours = FsEvent::new(EventKind::Modify(ModifyKind::Any))
            .add_path(PathBuf::from("/home/user/.config/statusbar/config.toml"));
        let other = FsEvent::new(EventKind::Create(CreateKind::File))
            .add_path(PathBuf::from("/home/user/.config/statusbar/config.toml.swp"));
        let access = FsEvent::new(EventKind::Access(notify::event::AccessKind::Any))
            .add_path(PathBuf::from("/home/user/.config/statusbar/config.toml"));

        assert!(touches(&ours, &name));
        assert!(!touches(&other, &name));
        assert!(!touches(&access, &name));
    }

    #[test]
    fn modes_map_to_events() {
        assert_eq!(WatchMode::default(), WatchMode::Redraw);
        assert_eq!(WatchMode::Redraw.event(), Event::NotifyChange);
        assert_eq!(WatchMode::Reload.event(), Event::ExitReload);
    }

    #[test]
    fn writing_the_file_queues_an_event() {
        let dir = temp_dir();
        let path = dir.join("config.toml");
        fs::write(&path, "[bar]\n").expect("write");

        let queue = EventQueue::new();
        let mut watcher =
            ConfigWatcher::spawn(&path, WatchMode::Reload, queue.handle()).expect("watcher");

        fs::write(&path, "[bar]\nseparator = \"|\"\n").expect("rewrite");
        let item = queue.pop_deadline(Instant::now() + Duration::from_secs(5));
        assert_eq!(item, Some(QueueItem::Signal(Event::ExitReload)));

        watcher.stop();
        let _ = fs::remove_dir_all(dir);
    }
}
