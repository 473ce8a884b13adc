use std::collections::BTreeMap;

use shared::domain::{Alignment, Visibility};

use crate::{error::RegistryError, module::ModuleHandle};

/// Modules grouped by alignment, in registration order within each group.
#[derive(Default)]
pub struct ModuleRegistry {
    blocks: BTreeMap<Alignment, Vec<ModuleHandle>>,
}

impl ModuleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, module: ModuleHandle, alignment: Alignment) {
        if let Some(existing) = self.alignment_of(module.name()) {
            tracing::warn!(
                module = module.name(),
                %existing,
                "module name registered twice; actions reach the first one only"
            );
        }
        tracing::debug!(
            module = module.name(),
            module_type = module.module_type(),
            %alignment,
            "registered module"
        );
        self.blocks.entry(alignment).or_default().push(module);
    }

    pub fn iter(&self, alignment: Alignment) -> impl Iterator<Item = &ModuleHandle> {
        self.blocks.get(&alignment).into_iter().flatten()
    }

    /// Every module, left block first.
    pub fn all(&self) -> impl Iterator<Item = &ModuleHandle> {
        self.blocks.values().flatten()
    }

    pub fn find(&self, name: &str) -> Option<&ModuleHandle> {
        self.all().find(|module| module.name() == name)
    }

    pub fn of_type<'a>(&'a self, module_type: &'a str) -> impl Iterator<Item = &'a ModuleHandle> {
        self.all()
            .filter(move |module| module.module_type() == module_type)
    }

    pub fn alignment_of(&self, name: &str) -> Option<Alignment> {
        self.blocks.iter().find_map(|(alignment, modules)| {
            modules
                .iter()
                .any(|module| module.name() == name)
                .then_some(*alignment)
        })
    }

    /// Applies `visibility` to the module called `name`. Returns whether its
    /// visibility actually changed.
    pub fn set_visibility(
        &mut self,
        name: &str,
        visibility: Visibility,
    ) -> Result<bool, RegistryError> {
        let module = self
            .find(name)
            .ok_or_else(|| RegistryError::UnknownModule(name.to_string()))?;

        let current = module.visible();
        let next = visibility.apply(current);
        if next != current {
            module.set_visible(next);
            tracing::debug!(module = name, visible = next, "module visibility changed");
        }
        Ok(next != current)
    }

    pub fn len(&self) -> usize {
        self.blocks.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
#[path = "tests/registry_tests.rs"]
mod tests;
