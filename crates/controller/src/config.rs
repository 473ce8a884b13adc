use std::time::Duration;

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ControllerConfig {
    /// Maximum number of consecutive change notifications swallowed before
    /// an update is forced through.
    pub swallow_limit: usize,
    /// Time to wait for a follow-up change notification.
    pub swallow_window_ms: u64,
    /// Placed between modules of the same alignment.
    pub separator: String,
    /// Hand input that is neither an action nor a legacy action to the shell.
    pub exec_unmatched_input: bool,
    pub shell: String,
}

impl ControllerConfig {
    pub fn swallow_window(&self) -> Duration {
        Duration::from_millis(self.swallow_window_ms)
    }
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            swallow_limit: 5,
            swallow_window_ms: 10,
            separator: " ".into(),
            exec_unmatched_input: true,
            shell: "/bin/sh".into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = ControllerConfig::default();
        assert_eq!(config.swallow_limit, 5);
        assert_eq!(config.swallow_window(), Duration::from_millis(10));
    }

    #[test]
    fn partial_tables_fall_back_to_defaults() {
        let config: ControllerConfig =
            toml::from_str("swallow_limit = 2\nseparator = \" | \"").expect("parse");
        assert_eq!(config.swallow_limit, 2);
        assert_eq!(config.separator, " | ");
        assert_eq!(config.swallow_window_ms, 10);
        assert!(config.exec_unmatched_input);
    }
}
