/// Centralized configuration for the simulation core
///
/// This module provides a single source of truth for tuning constants used
/// across the crate, plus the small runtime settings struct that callers can
/// load from disk and hand to `GameContext` at construction.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Spawn orchestration constants
pub mod spawn {
    /// Maximum radius searched when resolving physical overlap between a
    /// freshly spawned actor and its neighbours (world units)
    pub const RESOLVE_RADIUS: f32 = 50.0;

    /// Candidate directions probed per ring during overlap resolution
    pub const RESOLVE_RING_CANDIDATES: usize = 8;

    /// Vertical clearance left between stacked actors when overlap is
    /// resolved upwards (no-player-actor case)
    pub const STACK_CLEARANCE: f32 = 0.2;

    /// Facing offset applied when spawning relative to the player actor
    pub const ACTOR_FACING_DEG: f32 = 270.0;

    /// Facing offset applied when spawning relative to the on-foot character
    pub const CHARACTER_FACING_DEG: f32 = 180.0;
}

/// Sleep/idle scheduling constants
pub mod sleep {
    /// Seconds an actor must sit below the motion threshold before it is
    /// put to sleep
    pub const IDLE_TIMEOUT_SEC: f32 = 10.0;

    /// Speed (units/sec) below which an actor counts as motionless
    pub const SPEED_EPSILON: f32 = 0.1;
}

/// On-foot character constants
pub mod character {
    /// Lateral probe distance multiplier applied to the camera-roll vector
    /// when picking a dismount point next to a cinecam-equipped actor
    pub const EXIT_PROBE_SCALE: f32 = 2.0;

    /// Bias favouring the right-hand dismount candidate; the right point
    /// wins when its height error times this factor still beats the left
    pub const EXIT_HEIGHT_BIAS: f32 = 1.2;
}

/// Runtime settings, loadable from a JSON file
///
/// Only knobs that change orchestration behavior live here; geometry and
/// timing constants stay in the const modules above.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimSettings {
    /// Diagnostic auto-enter: seat the player in drivable vehicles spawned
    /// from config files (mirrors the preset-vehicle debugging workflow)
    pub preset_vehicle_enter: bool,
}

impl Default for SimSettings {
    fn default() -> Self {
        Self {
            preset_vehicle_enter: false,
        }
    }
}

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read settings file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse settings file: {0}")]
    Parse(#[from] serde_json::Error),
}

impl SimSettings {
    /// Load settings from a JSON file; missing keys fall back to defaults
    pub fn from_json_file(path: &Path) -> Result<Self, SettingsError> {
        let raw = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }
}
