use crate::navigator::{Alignment, DisplayOptions, ScrollTuning};
use serde::Deserialize;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub popup: PopupConfig,

    #[serde(default)]
    pub scroll: ScrollConfig,

    #[serde(default)]
    pub watch: WatchConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PopupConfig {
    #[serde(default = "default_popup_width")]
    pub width: u16,

    /// Popup height cap as a fraction of the terminal height
    #[serde(default = "default_max_height_ratio")]
    pub max_height_ratio: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScrollConfig {
    /// Rows of drift tolerated before a scroll correction is issued
    #[serde(default = "default_tolerance")]
    pub tolerance: f64,

    /// Delay in milliseconds before each verification attempt; the number
    /// of entries is the attempt budget
    #[serde(default = "default_attempt_delays_ms")]
    pub attempt_delays_ms: Vec<u64>,

    /// Extra verification cycles after alignment is reached
    #[serde(default = "default_watch_cycles")]
    pub watch_cycles: u8,

    /// Where a previewed heading lands in the viewport: "top" or "center"
    #[serde(default = "default_preview_alignment")]
    pub preview_alignment: String,

    /// Where a confirmed jump lands in the viewport
    #[serde(default = "default_confirm_alignment")]
    pub confirm_alignment: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WatchConfig {
    /// Reload the document when it changes on disk (default: true)
    #[serde(default = "default_watch_enabled")]
    pub enabled: bool,
}

impl Default for PopupConfig {
    fn default() -> Self {
        Self {
            width: default_popup_width(),
            max_height_ratio: default_max_height_ratio(),
        }
    }
}

impl Default for ScrollConfig {
    fn default() -> Self {
        Self {
            tolerance: default_tolerance(),
            attempt_delays_ms: default_attempt_delays_ms(),
            watch_cycles: default_watch_cycles(),
            preview_alignment: default_preview_alignment(),
            confirm_alignment: default_confirm_alignment(),
        }
    }
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            enabled: default_watch_enabled(),
        }
    }
}

fn default_popup_width() -> u16 {
    56
}

fn default_max_height_ratio() -> f64 {
    0.6
}

fn default_tolerance() -> f64 {
    1.0
}

fn default_attempt_delays_ms() -> Vec<u64> {
    vec![50, 150, 400]
}

fn default_watch_cycles() -> u8 {
    1
}

fn default_preview_alignment() -> String {
    "top".to_string()
}

fn default_confirm_alignment() -> String {
    "center".to_string()
}

fn default_watch_enabled() -> bool {
    true
}

impl Config {
    /// Get the platform-specific config file path
    /// - macOS: ~/Library/Application Support/mdhop/config.toml
    /// - Linux: ~/.config/mdhop/config.toml
    /// - Windows: %APPDATA%/mdhop/config.toml
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("mdhop").join("config.toml"))
    }

    /// Load config from file, or return default if file doesn't exist
    pub fn load() -> Self {
        Self::config_path()
            .and_then(|path| {
                fs::read_to_string(&path)
                    .ok()
                    .and_then(|contents| toml::from_str(&contents).ok())
            })
            .unwrap_or_default()
    }

    /// Verification tuning for the scroll synchronizer
    pub fn scroll_tuning(&self) -> ScrollTuning {
        ScrollTuning {
            tolerance: self.scroll.tolerance,
            attempt_delays: self
                .scroll
                .attempt_delays_ms
                .iter()
                .map(|&ms| Duration::from_millis(ms))
                .collect(),
            watch_cycles: self.scroll.watch_cycles,
        }
    }

    /// Parse the preview alignment, falling back to top
    pub fn preview_alignment(&self) -> Alignment {
        parse_alignment(&self.scroll.preview_alignment, Alignment::Top)
    }

    /// Parse the confirm alignment, falling back to center
    pub fn confirm_alignment(&self) -> Alignment {
        parse_alignment(&self.scroll.confirm_alignment, Alignment::Center)
    }

    /// Popup sizing with out-of-range values clamped
    pub fn popup_display(&self) -> DisplayOptions {
        DisplayOptions::new(self.popup.width, self.popup.max_height_ratio)
    }
}

fn parse_alignment(value: &str, fallback: Alignment) -> Alignment {
    match value.to_lowercase().as_str() {
        "top" => Alignment::Top,
        "center" | "centre" => Alignment::Center,
        _ => fallback,
    }
}
