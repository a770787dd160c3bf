//! Key binding table mapping key names to visualizer actions.
//!
//! Key names are the `Debug` names of winit key codes (`KeyR`, `Digit1`,
//! `Space`, ...), so the table stays independent of the windowing layer.
//! A TOML file can override or replace the defaults:
//!
//! ```toml
//! replace_defaults = false
//!
//! [keys]
//! KeyO = "color:#ff8800"
//! Digit5 = "shape:circles"
//! KeyF = "trail"
//! ```

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::Deserialize;

use crate::error::ConfigError;

/// Something a key press asks the frame loop to do
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Quit,
    TogglePause,
    ToggleTrail,
    NextColor,
    NextShape,
    /// Color name or `#rrggbb`, validated by the color setter
    Color(String),
    /// Shape name, validated by the shape setter
    Shape(String),
}

impl FromStr for Action {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Some(name) = s.strip_prefix("color:") {
            return Ok(Action::Color(name.to_string()));
        }
        if let Some(name) = s.strip_prefix("shape:") {
            return Ok(Action::Shape(name.to_string()));
        }
        match s {
            "quit" => Ok(Action::Quit),
            "pause" => Ok(Action::TogglePause),
            "trail" => Ok(Action::ToggleTrail),
            "next-color" => Ok(Action::NextColor),
            "next-shape" => Ok(Action::NextShape),
            other => Err(ConfigError::UnknownAction(other.to_string())),
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Quit => write!(f, "quit"),
            Action::TogglePause => write!(f, "pause"),
            Action::ToggleTrail => write!(f, "trail"),
            Action::NextColor => write!(f, "next-color"),
            Action::NextShape => write!(f, "next-shape"),
            Action::Color(name) => write!(f, "color:{}", name),
            Action::Shape(name) => write!(f, "shape:{}", name),
        }
    }
}

#[derive(Debug, Deserialize)]
struct BindingsFile {
    #[serde(default)]
    replace_defaults: bool,
    #[serde(default)]
    keys: BTreeMap<String, String>,
}

/// Reconfigurable key → action table
#[derive(Debug, Clone)]
pub struct KeyBindings {
    table: HashMap<String, Action>,
}

impl Default for KeyBindings {
    fn default() -> Self {
        let defaults = [
            ("KeyR", "color:red"),
            ("KeyG", "color:green"),
            ("KeyB", "color:blue"),
            ("KeyW", "color:white"),
            ("KeyC", "next-color"),
            ("Digit1", "shape:bars"),
            ("Digit2", "shape:circles"),
            ("Digit3", "shape:diamonds"),
            ("Digit4", "shape:octagons"),
            ("KeyS", "next-shape"),
            ("KeyT", "trail"),
            ("Space", "pause"),
            ("KeyP", "pause"),
            ("Escape", "quit"),
            ("KeyQ", "quit"),
        ];

        let mut bindings = Self::empty();
        for (key, action) in defaults {
            if let Ok(action) = action.parse() {
                bindings.bind(key, action);
            }
        }
        bindings
    }
}

impl KeyBindings {
    pub fn empty() -> Self {
        Self {
            table: HashMap::new(),
        }
    }

    /// Bind (or rebind) a key
    pub fn bind(&mut self, key: &str, action: Action) {
        self.table.insert(key.to_string(), action);
    }

    pub fn unbind(&mut self, key: &str) -> Option<Action> {
        self.table.remove(key)
    }

    pub fn lookup(&self, key: &str) -> Option<&Action> {
        self.table.get(key)
    }

    /// Parse a TOML binding table layered over the defaults
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let file: BindingsFile = toml::from_str(text)?;
        let mut bindings = if file.replace_defaults {
            Self::empty()
        } else {
            Self::default()
        };
        for (key, action) in file.keys {
            bindings.bind(&key, action.parse()?);
        }
        Ok(bindings)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::BindingsIo {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Sorted `key = action` lines for the help banner
    pub fn describe(&self) -> Vec<String> {
        let mut lines: Vec<String> = self
            .table
            .iter()
            .map(|(key, action)| format!("{:>8} - {}", key, action))
            .collect();
        lines.sort();
        lines
    }
}
