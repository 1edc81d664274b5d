//! Rune animator configuration
//!
//! Settings are loaded from `rune.toml` and can be overridden by environment
//! variables.
//!
//! ```toml
//! [animation]
//! default_handoff = "compose"
//! strict_invariants = true
//! max_queued_events = 256
//!
//! [demo]
//! frame_ms = 16.67
//! frames = 120
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct RuneConfig {
    /// Scheduler settings
    pub animation: AnimationConfig,
    /// Headless demo settings
    pub demo: DemoConfig,
}

/// Animation scheduler configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimationConfig {
    /// Handoff used when a caller does not pick one
    /// (`compose`, `temporary_replace`, `snapshot_and_replace`).
    pub default_handoff: String,
    /// Panic on wait-graph and active-set invariant violations.
    pub strict_invariants: bool,
    /// Bound on queued lifecycle events; oldest events are dropped beyond it.
    pub max_queued_events: Option<usize>,
    /// Emit per-tick trace logs.
    pub trace_ticks: bool,
}

/// Demo binary configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DemoConfig {
    /// Simulated frame duration in milliseconds
    pub frame_ms: f32,
    /// Number of ticks to run
    pub frames: u32,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            default_handoff: "snapshot_and_replace".to_string(),
            strict_invariants: cfg!(debug_assertions),
            max_queued_events: None,
            trace_ticks: false,
        }
    }
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            frame_ms: 16.67,
            frames: 120,
        }
    }
}

fn parse_flag(val: &str) -> bool {
    val == "1" || val.eq_ignore_ascii_case("true")
}

impl RuneConfig {
    /// Load configuration from a TOML file
    ///
    /// # Returns
    /// * `Ok(RuneConfig)` - Successfully loaded configuration
    /// * `Err(String)` - Error message if loading failed
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, String> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| format!("Failed to read config file: {}", e))?;

        toml::from_str(&content).map_err(|e| format!("Failed to parse config file: {}", e))
    }

    /// Load configuration from `rune.toml` in the current directory, or the
    /// defaults if it is missing or invalid.
    pub fn load_or_default() -> Self {
        Self::load_from_file("rune.toml").unwrap_or_default()
    }

    /// Merge configuration with environment variables
    ///
    /// Environment variables take precedence over configuration file values.
    pub fn merge_with_env(&mut self) {
        self.merge_with_vars(|name| std::env::var(name).ok());
    }

    /// Apply overrides from `lookup`, keyed by environment variable name.
    /// Values that fail to parse are ignored.
    pub fn merge_with_vars<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        // Animation settings
        if let Some(handoff) = lookup("RUNE_ANIM_HANDOFF") {
            self.animation.default_handoff = handoff;
        }
        if let Some(val) = lookup("RUNE_ANIM_STRICT") {
            self.animation.strict_invariants = parse_flag(&val);
        }
        if let Some(val) = lookup("RUNE_ANIM_MAX_EVENTS") {
            if let Ok(max) = val.parse::<usize>() {
                self.animation.max_queued_events = Some(max);
            }
        }
        if let Some(val) = lookup("RUNE_ANIM_TRACE_TICKS") {
            self.animation.trace_ticks = parse_flag(&val);
        }

        // Demo settings
        if let Some(val) = lookup("RUNE_DEMO_FRAME_MS") {
            if let Ok(frame_ms) = val.parse::<f32>() {
                self.demo.frame_ms = frame_ms;
            }
        }
        if let Some(val) = lookup("RUNE_DEMO_FRAMES") {
            if let Ok(frames) = val.parse::<u32>() {
                self.demo.frames = frames;
            }
        }
    }

    /// Load configuration with environment variable overrides
    ///
    /// 1. Load from rune.toml (or use defaults if not found)
    /// 2. Override with environment variables if present
    pub fn load() -> Self {
        let mut config = Self::load_or_default();
        config.merge_with_env();
        config
    }
}
