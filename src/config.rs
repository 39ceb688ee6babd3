//! Process-wide configuration: defaults plus a user TOML file,
//! replaced atomically on reload (spec ss3, ss6).
//!
//! Generalized from the teacher's `config.rs`, which already does
//! TOML-via-serde loading for a narrower option set (`windows`,
//! `borders`, `bindings`, `commands`, `colour`). Every section below
//! corresponds 1:1 to a row of the option table in spec ss6.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::binding::BindingSpec;
use crate::error::{FensterchefError, Result};
use crate::geometry::EdgeDelta;

fn default_config_path() -> PathBuf {
    dirs_fallback().join("fensterchef/config.toml")
}

/// XDG-lite fallback: `$XDG_CONFIG_HOME` or `$HOME/.config`. The
/// teacher hardcodes a single absolute path; this generalizes it
/// without reaching for a whole `xdg` crate, since this is still just
/// string-joining and not a capability the corpus brings in a crate
/// for.
fn dirs_fallback() -> PathBuf {
    if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
        return PathBuf::from(xdg);
    }
    let home = std::env::var("HOME").unwrap_or_else(|_| "/".into());
    PathBuf::from(home).join(".config")
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GeneralSettings {
    /// Threshold for popup-to-frame association (0-100).
    pub overlap_percentage: u8,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        GeneralSettings {
            overlap_percentage: 50,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TilingSettings {
    pub auto_remove_void: bool,
    pub auto_fill_void: bool,
}

impl Default for TilingSettings {
    fn default() -> Self {
        TilingSettings {
            auto_remove_void: true,
            auto_fill_void: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct FontSettings {
    pub name: String,
}

impl Default for FontSettings {
    fn default() -> Self {
        FontSettings {
            name: "monospace:size=10".into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct BorderSettings {
    pub size: u32,
}

impl Default for BorderSettings {
    fn default() -> Self {
        BorderSettings { size: 2 }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
pub struct Quad {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl Quad {
    /// As an inward `EdgeDelta`: each side moves in by the matching
    /// quad component, for `Rectangle::adjusted` to apply a gap.
    pub fn to_edge_delta(self) -> EdgeDelta {
        EdgeDelta {
            left: self.left,
            top: self.top,
            right: -self.right,
            bottom: -self.bottom,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct GapsSettings {
    pub inner: Quad,
    pub outer: Quad,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct NotificationSettings {
    pub duration_seconds: f32,
    pub padding: u32,
    pub border_color: String,
    pub border_size: u32,
    pub foreground: String,
    pub background: String,
}

impl Default for NotificationSettings {
    fn default() -> Self {
        NotificationSettings {
            duration_seconds: 2.0,
            padding: 6,
            border_color: "#5f316d".into(),
            border_size: 1,
            foreground: "#ffffff".into(),
            background: "#222222".into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MouseSettings {
    pub resize_tolerance: u32,
    pub modifiers: u32,
    pub ignore_modifiers: u32,
    pub buttons: Vec<BindingSpec>,
}

impl Default for MouseSettings {
    fn default() -> Self {
        MouseSettings {
            resize_tolerance: 8,
            modifiers: 0,
            ignore_modifiers: 0,
            buttons: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct KeyboardSettings {
    pub modifiers: u32,
    pub ignore_modifiers: u32,
    pub keys: Vec<BindingSpec>,
}

impl Default for KeyboardSettings {
    fn default() -> Self {
        KeyboardSettings {
            modifiers: 0,
            ignore_modifiers: 0,
            keys: Vec::new(),
        }
    }
}

/// Flat configuration record, created from defaults plus a user file,
/// and replaced atomically by reload (spec ss3). Never mutated in
/// place by the event loop: `Context::reload_configuration` builds a
/// fresh value and swaps it in.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Configuration {
    pub general: GeneralSettings,
    pub tiling: TilingSettings,
    pub font: FontSettings,
    pub border: BorderSettings,
    pub gaps: GapsSettings,
    pub notification: NotificationSettings,
    pub mouse: MouseSettings,
    pub keyboard: KeyboardSettings,
}

impl Configuration {
    /// Loads from the XDG config path if present, else returns
    /// built-in defaults — the crate always has a usable
    /// configuration, even with no file on disk at all.
    pub fn load_default_path() -> Result<Self> {
        Self::load(&default_config_path())
    }

    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::info!(
                "no configuration file at {}, using built-in defaults",
                path.display()
            );
            return Ok(Configuration::default());
        }
        let contents = std::fs::read_to_string(path).map_err(|e| {
            FensterchefError::InvalidConfiguration(format!(
                "could not read {}: {e}",
                path.display()
            ))
        })?;
        Self::parse(&contents)
    }

    pub fn parse(contents: &str) -> Result<Self> {
        toml::from_str(contents).map_err(|e| FensterchefError::InvalidConfiguration(e.to_string()))
    }

    pub fn to_toml_string(&self) -> String {
        toml::to_string_pretty(self).expect("Configuration always serializes")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_yields_defaults() {
        let config = Configuration::parse("").unwrap();
        assert_eq!(config, Configuration::default());
    }

    #[test]
    fn malformed_toml_is_rejected_without_panicking() {
        let result = Configuration::parse("this is not = [valid");
        assert!(result.is_err());
    }

    #[test]
    fn round_trip_through_toml_is_lossless() {
        let mut config = Configuration::default();
        config.tiling.auto_fill_void = true;
        config.border.size = 4;
        config.general.overlap_percentage = 75;
        let serialized = config.to_toml_string();
        let reloaded = Configuration::parse(&serialized).unwrap();
        assert_eq!(config, reloaded);
    }

    #[test]
    fn partial_file_fills_remaining_sections_with_defaults() {
        let config = Configuration::parse("[border]\nsize = 10\n").unwrap();
        assert_eq!(config.border.size, 10);
        assert_eq!(config.tiling, TilingSettings::default());
    }
}
