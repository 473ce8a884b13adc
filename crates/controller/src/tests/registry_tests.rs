use super::*;

use std::sync::Arc;

use crate::{
    module::{Module, ModuleFlags},
    queue::QueueHandle,
};

struct Stub {
    name: &'static str,
    module_type: &'static str,
    flags: ModuleFlags,
}

impl Stub {
    fn handle(name: &'static str, module_type: &'static str) -> ModuleHandle {
        Arc::new(Self {
            name,
            module_type,
            flags: ModuleFlags::new(),
        })
    }
}

impl Module for Stub {
    fn name(&self) -> &str {
        self.name
    }

    fn module_type(&self) -> &str {
        self.module_type
    }

    fn start(&self, _events: QueueHandle) -> anyhow::Result<()> {
        self.flags.set_running(true);
        Ok(())
    }

    fn stop(&self) {
        self.flags.set_running(false);
    }

    fn running(&self) -> bool {
        self.flags.running()
    }

    fn visible(&self) -> bool {
        self.flags.visible()
    }

    fn set_visible(&self, visible: bool) {
        self.flags.set_visible(visible);
    }

    fn contents(&self) -> String {
        self.name.to_string()
    }

    fn input(&self, _action: &str, _data: &str) -> bool {
        false
    }
}

fn names<'a>(modules: impl Iterator<Item = &'a ModuleHandle>) -> Vec<String> {
    modules.map(|module| module.name().to_string()).collect()
}

fn sample() -> ModuleRegistry {
    let mut registry = ModuleRegistry::new();
    registry.register(Stub::handle("clock", "internal/date"), Alignment::Right);
    registry.register(Stub::handle("workspaces", "internal/i3"), Alignment::Left);
    registry.register(Stub::handle("title", "internal/xwindow"), Alignment::Center);
    registry.register(Stub::handle("menu", "custom/menu"), Alignment::Left);
    registry.register(Stub::handle("date", "internal/date"), Alignment::Right);
    registry
}

#[test]
fn iterates_in_registration_order_per_alignment() {
    let registry = sample();
    assert_eq!(names(registry.iter(Alignment::Left)), vec!["workspaces", "menu"]);
    assert_eq!(names(registry.iter(Alignment::Right)), vec!["clock", "date"]);
    assert_eq!(
        names(registry.all()),
        vec!["workspaces", "menu", "title", "clock", "date"]
    );
    assert_eq!(registry.len(), 5);
}

#[test]
fn empty_alignment_yields_nothing() {
    let mut registry = ModuleRegistry::new();
    assert!(registry.is_empty());
    registry.register(Stub::handle("only", "custom/text"), Alignment::Left);
    assert_eq!(registry.iter(Alignment::Center).count(), 0);
}

#[test]
fn finds_modules_by_name_and_type() {
    let registry = sample();
    assert_eq!(
        registry.find("title").map(|m| m.module_type().to_string()),
        Some("internal/xwindow".to_string())
    );
    assert!(registry.find("missing").is_none());
    assert_eq!(
        names(registry.of_type("internal/date")),
        vec!["clock", "date"]
    );
    assert_eq!(registry.alignment_of("menu"), Some(Alignment::Left));
}

#[test]
fn toggles_visibility_by_name() {
    let mut registry = sample();

    assert_eq!(registry.set_visibility("menu", Visibility::Toggle), Ok(true));
    assert!(!registry.find("menu").expect("menu").visible());

    assert_eq!(registry.set_visibility("menu", Visibility::Hide), Ok(false));
    assert_eq!(registry.set_visibility("menu", Visibility::Show), Ok(true));
    assert!(registry.find("menu").expect("menu").visible());
}

#[test]
fn unknown_module_leaves_registry_untouched() {
    let mut registry = sample();

    assert_eq!(
        registry.set_visibility("missing-module", Visibility::Hide),
        Err(RegistryError::UnknownModule("missing-module".into()))
    );
    assert_eq!(registry.len(), 5);
    assert!(registry.all().all(|module| module.visible()));
}

#[test]
fn duplicate_names_are_kept() {
    let mut registry = ModuleRegistry::new();
    registry.register(Stub::handle("twin", "custom/text"), Alignment::Left);
    registry.register(Stub::handle("twin", "custom/text"), Alignment::Right);
    assert_eq!(registry.len(), 2);
    assert_eq!(registry.alignment_of("twin"), Some(Alignment::Left));
}
