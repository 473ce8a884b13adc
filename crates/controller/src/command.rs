//! Resolution of control strings from ipc and raw input.

use std::{
    process::{Command as Process, Stdio},
    thread,
};

use shared::{
    action::{parse_legacy_action, ActionString, Command, Hook, ACTION_PREFIX},
    domain::Visibility,
};

use crate::{
    error::{CommandError, RegistryError},
    state::ControllerState,
    RunOutcome,
};

impl ControllerState {
    pub(crate) fn on_ipc_action(&mut self, raw: &str) -> anyhow::Result<()> {
        tracing::debug!(action = raw, "ipc action");
        let result = self.resolve_action(raw);
        absorb(raw, result)
    }

    pub(crate) fn on_ipc_command(&mut self, raw: &str) -> anyhow::Result<()> {
        tracing::debug!(command = raw, "ipc command");
        let result = match raw.parse::<Command>() {
            Ok(command) => self.run_command(command),
            Err(err) => Err(CommandError::from(err)),
        };
        absorb(raw, result)
    }

    pub(crate) fn on_ipc_hook(&mut self, raw: &str) -> anyhow::Result<()> {
        tracing::debug!(hook = raw, "ipc hook");
        let result = match raw.parse::<Hook>() {
            Ok(hook) => self.forward_action(&hook.into_action()),
            Err(err) => Err(CommandError::from(err)),
        };
        absorb(raw, result)
    }

    /// Handles raw text from click areas and the input channel.
    pub fn process_input(&mut self, input: &str) -> anyhow::Result<()> {
        let input = input.trim();
        if input.is_empty() {
            return Ok(());
        }
        tracing::debug!(input, "processing input data");

        match self.resolve_action(input) {
            Err(CommandError::Unresolved(_)) if self.config.exec_unmatched_input => {
                self.spawn_shell(input);
                Ok(())
            }
            result => absorb(input, result),
        }
    }

    /// Tries the current action syntax first, then the legacy table.
    pub fn resolve_action(&mut self, raw: &str) -> Result<(), CommandError> {
        let raw = raw.trim();
        if raw.starts_with(ACTION_PREFIX) {
            let action: ActionString = raw.parse()?;
            return self.forward_action(&action);
        }
        if self.try_forward_legacy_action(raw)? {
            return Ok(());
        }
        Err(CommandError::Unresolved(raw.to_string()))
    }

    pub fn forward_action(&mut self, action: &ActionString) -> Result<(), CommandError> {
        if let Some(visibility) = action.visibility() {
            return self.switch_module_visibility(&action.module, visibility);
        }

        let module = self
            .registry
            .find(&action.module)
            .ok_or_else(|| RegistryError::UnknownModule(action.module.clone()))?;

        tracing::debug!(
            module = %action.module,
            action = %action.action,
            data = action.data(),
            "forwarding action to module"
        );
        if module.input(&action.action, action.data()) {
            Ok(())
        } else {
            Err(CommandError::Rejected {
                module: action.module.clone(),
                action: action.action.clone(),
            })
        }
    }

    /// Returns `Ok(false)` when `raw` is not a legacy action name or no
    /// module of the addressed type is registered.
    pub fn try_forward_legacy_action(&mut self, raw: &str) -> Result<bool, CommandError> {
        let Some(legacy) = parse_legacy_action(raw) else {
            return Ok(false);
        };

        let data = legacy.data.as_deref().unwrap_or_default();
        let mut targets = 0;
        let mut accepted = 0;
        for module in self.registry.of_type(legacy.module_type) {
            targets += 1;
            if module.input(legacy.action, data) {
                accepted += 1;
                tracing::warn!(
                    legacy = raw,
                    replacement = %ActionString::new(module.name(), legacy.action),
                    "legacy action names are deprecated"
                );
            }
        }

        match (targets, accepted) {
            (0, _) => Ok(false),
            (_, 0) => Err(CommandError::LegacyRejected(legacy.module_type.to_string())),
            _ => Ok(true),
        }
    }

    /// Changes a module's visibility and forces a redraw if it changed.
    pub fn switch_module_visibility(
        &mut self,
        name: &str,
        visibility: Visibility,
    ) -> Result<(), CommandError> {
        if self.registry.set_visibility(name, visibility)? {
            self.process_update(true).map_err(CommandError::Render)?;
        }
        Ok(())
    }

    fn run_command(&mut self, command: Command) -> Result<(), CommandError> {
        match command {
            Command::Quit => self.stop(RunOutcome::Terminate),
            Command::Restart => self.stop(RunOutcome::Reload),
            Command::Hide => self.set_bar_visibility(Visibility::Hide)?,
            Command::Show => self.set_bar_visibility(Visibility::Show)?,
            Command::Toggle => self.set_bar_visibility(Visibility::Toggle)?,
            Command::Module { name, visibility } => {
                self.switch_module_visibility(&name, visibility)?
            }
        }
        Ok(())
    }

    fn set_bar_visibility(&mut self, visibility: Visibility) -> Result<(), CommandError> {
        self.bar
            .set_visibility(visibility)
            .map_err(CommandError::Render)
    }

    fn spawn_shell(&self, command: &str) {
        let spawned = Process::new(&self.config.shell)
            .arg("-c")
            .arg(command)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn();

        match spawned {
            Ok(mut child) => {
                tracing::debug!(pid = child.id(), command, "executing shell command");
                // Reap in the background so finished commands don't linger.
                thread::spawn(move || {
                    if let Err(err) = child.wait() {
                        tracing::debug!(error = %err, "failed to reap shell command");
                    }
                });
            }
            Err(err) => tracing::warn!(command, error = %err, "failed to execute shell command"),
        }
    }
}

/// Logs and drops non-fatal resolution errors; fatal ones become faults.
fn absorb(raw: &str, result: Result<(), CommandError>) -> anyhow::Result<()> {
    match result {
        Ok(()) => Ok(()),
        Err(err) if err.is_fatal() => Err(err.into()),
        Err(err) => {
            tracing::warn!(input = raw, error = %err, "dropping unresolvable command");
            Ok(())
        }
    }
}
