use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Placement bucket of a module on the bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Alignment {
    Left,
    Center,
    Right,
}

impl Alignment {
    pub const ALL: [Alignment; 3] = [Alignment::Left, Alignment::Center, Alignment::Right];

    pub fn as_str(self) -> &'static str {
        match self {
            Alignment::Left => "left",
            Alignment::Center => "center",
            Alignment::Right => "right",
        }
    }
}

impl fmt::Display for Alignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Alignment {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "left" => Ok(Alignment::Left),
            "center" | "centre" => Ok(Alignment::Center),
            "right" => Ok(Alignment::Right),
            other => Err(DomainError::UnknownAlignment(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MouseButton {
    Left,
    Middle,
    Right,
    ScrollUp,
    ScrollDown,
    DoubleLeft,
    DoubleMiddle,
    DoubleRight,
}

impl MouseButton {
    /// Maps an X11-style button number (1-5) to a button.
    pub fn from_index(index: u8) -> Option<Self> {
        match index {
            1 => Some(MouseButton::Left),
            2 => Some(MouseButton::Middle),
            3 => Some(MouseButton::Right),
            4 => Some(MouseButton::ScrollUp),
            5 => Some(MouseButton::ScrollDown),
            _ => None,
        }
    }
}

/// A click on the bar surface. `command` is whatever the bar resolved the
/// click position to, if anything.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ButtonPress {
    pub x: i32,
    pub y: i32,
    pub button: MouseButton,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    Show,
    Hide,
    Toggle,
}

impl Visibility {
    /// Resolves the requested state against the current one.
    pub fn apply(self, currently_visible: bool) -> bool {
        match self {
            Visibility::Show => true,
            Visibility::Hide => false,
            Visibility::Toggle => !currently_visible,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_alignment_case_insensitively() {
        assert_eq!("Left".parse::<Alignment>().expect("left"), Alignment::Left);
        assert_eq!(" centre ".parse::<Alignment>().expect("center"), Alignment::Center);
        assert!("middle".parse::<Alignment>().is_err());
    }

    #[test]
    fn alignment_orders_left_to_right() {
        let mut aligns = vec![Alignment::Right, Alignment::Left, Alignment::Center];
        aligns.sort();
        assert_eq!(aligns, Alignment::ALL.to_vec());
    }

    #[test]
    fn button_press_serializes_without_missing_command() {
        let press = ButtonPress {
            x: 10,
            y: 2,
            button: MouseButton::ScrollUp,
            command: None,
        };
        let json = serde_json::to_string(&press).expect("serialize");
        assert_eq!(json, r#"{"x":10,"y":2,"button":"scroll_up"}"#);
    }

    #[test]
    fn toggle_flips_current_visibility() {
        assert!(Visibility::Toggle.apply(false));
        assert!(!Visibility::Toggle.apply(true));
        assert!(Visibility::Show.apply(false));
        assert!(!Visibility::Hide.apply(true));
    }
}
