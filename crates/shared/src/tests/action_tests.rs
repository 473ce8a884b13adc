use super::*;

#[test]
fn parses_action_with_dotted_data() {
    let action: ActionString = "#menu.open.1.2".parse().expect("action");
    assert_eq!(action.module, "menu");
    assert_eq!(action.action, "open");
    assert_eq!(action.data(), "1.2");
    assert_eq!(action.to_string(), "#menu.open.1.2");
}

#[test]
fn parses_action_without_data() {
    let action: ActionString = "  #date.toggle ".parse().expect("action");
    assert_eq!(action, ActionString::new("date", "toggle"));
    assert_eq!(action.data(), "");
}

#[test]
fn rejects_malformed_action_strings() {
    assert_eq!(
        "date.toggle".parse::<ActionString>(),
        Err(ActionError::MissingPrefix("date.toggle".into()))
    );
    assert!(matches!(
        "#.toggle".parse::<ActionString>(),
        Err(ActionError::MissingModule(_))
    ));
    assert!(matches!(
        "#date".parse::<ActionString>(),
        Err(ActionError::MissingAction(_))
    ));
    assert!(matches!(
        "#date.".parse::<ActionString>(),
        Err(ActionError::MissingAction(_))
    ));
}

#[test]
fn recognizes_builtin_visibility_actions() {
    let hide: ActionString = "#cpu.module_hide".parse().expect("action");
    assert_eq!(hide.visibility(), Some(Visibility::Hide));
    let other: ActionString = "#cpu.refresh".parse().expect("action");
    assert_eq!(other.visibility(), None);
}

#[test]
fn legacy_exact_names_resolve_without_data() {
    let resolved = parse_legacy_action("datetoggle").expect("legacy");
    assert_eq!(resolved.module_type, "internal/date");
    assert_eq!(resolved.action, "toggle");
    assert_eq!(resolved.data, None);

    assert!(parse_legacy_action("datetoggle2").is_none());
}

#[test]
fn legacy_prefixes_carry_suffix_as_data() {
    let resolved = parse_legacy_action("menu-open-3").expect("legacy");
    assert_eq!(resolved.module_type, "custom/menu");
    assert_eq!(resolved.action, "open");
    assert_eq!(resolved.data.as_deref(), Some("3"));

    assert!(parse_legacy_action("menu-open-").is_none());
}

#[test]
fn backlight_names_do_not_shadow_each_other() {
    assert_eq!(
        parse_legacy_action("xbacklight+").map(|a| a.module_type),
        Some("internal/xbacklight")
    );
    assert_eq!(
        parse_legacy_action("backlight-").map(|a| a.module_type),
        Some("internal/backlight")
    );
}

#[test]
fn parses_command_verbs() {
    assert_eq!("quit".parse::<Command>(), Ok(Command::Quit));
    assert_eq!("RESTART".parse::<Command>(), Ok(Command::Restart));
    assert_eq!(
        "module-toggle date".parse::<Command>(),
        Ok(Command::Module {
            name: "date".into(),
            visibility: Visibility::Toggle,
        })
    );
    assert_eq!(
        "module_hide  cpu".parse::<Command>(),
        Ok(Command::Module {
            name: "cpu".into(),
            visibility: Visibility::Hide,
        })
    );
}

#[test]
fn rejects_bad_commands() {
    assert_eq!("   ".parse::<Command>(), Err(ActionError::EmptyCommand));
    assert_eq!(
        "explode".parse::<Command>(),
        Err(ActionError::UnknownCommand("explode".into()))
    );
    assert_eq!(
        "module-show".parse::<Command>(),
        Err(ActionError::MissingModuleArgument {
            verb: "module-show".into()
        })
    );
}

#[test]
fn parses_both_hook_spellings() {
    let spaced: Hook = "module/demo 2".parse().expect("hook");
    assert_eq!(spaced.module, "demo");
    assert_eq!(spaced.index, "2");

    let packed: Hook = "module/demo12".parse().expect("hook");
    assert_eq!(packed.module, "demo");
    assert_eq!(packed.index, "12");

    let bare: Hook = "demo 0".parse().expect("hook");
    assert_eq!(bare.into_action().to_string(), "#demo.hook.0");
}

#[test]
fn rejects_hooks_without_index() {
    assert!("module/demo".parse::<Hook>().is_err());
    assert!("module/demo x".parse::<Hook>().is_err());
    assert!("module/ 1".parse::<Hook>().is_err());
}
