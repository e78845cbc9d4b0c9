// Spawn and modify request values consumed by the game context

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::actor::{ActorId, DebugViewMode, NetStream};

/// Why a spawn was requested; drives origin-specific follow-up
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SpawnOrigin {
    /// Direct user action (spawn menu, respawn key)
    User,
    /// Preselected vehicle from the app config/command line
    ConfigFile,
    /// Placed by the terrain definition
    TerrainDef,
    /// Replicated from a remote peer
    Network,
    /// Restored from a save game
    Savegame,
    /// Scripted or otherwise untagged callers
    #[default]
    Unknown,
}

/// One pending actor spawn; constructed by a caller and consumed exactly
/// once by `GameContext::spawn_actor`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActorSpawnRequest {
    pub filename: String,
    /// Resolved filename of a selector cache entry; overrides `filename`
    pub cache_entry: Option<String>,

    pub position: Vec3,
    /// Heading about +Y, radians
    pub yaw: f32,
    /// Named spawn box constraining placement, when the caller has one
    pub spawn_box: Option<String>,

    pub skin: Option<String>,
    pub section_config: Option<String>,
    pub debug_view: DebugViewMode,

    pub origin: SpawnOrigin,
    /// Terrain entry wants the actor classified as a machine
    pub terrain_machine: bool,

    pub net_stream: Option<NetStream>,
    pub net_username: Option<String>,
    pub net_color: Option<i32>,
}

impl ActorSpawnRequest {
    pub fn new(filename: impl Into<String>, origin: SpawnOrigin) -> Self {
        Self {
            filename: filename.into(),
            cache_entry: None,
            position: Vec3::ZERO,
            yaw: 0.0,
            spawn_box: None,
            skin: None,
            section_config: None,
            debug_view: DebugViewMode::None,
            origin,
            terrain_machine: false,
            net_stream: None,
            net_username: None,
            net_color: None,
        }
    }
}

impl Default for ActorSpawnRequest {
    fn default() -> Self {
        Self::new(String::new(), SpawnOrigin::Unknown)
    }
}

/// Reset/reload modification kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModifyKind {
    /// Restore last-known-good internal state in place
    SoftReset,
    /// Full physical reset at the current location
    ResetOnSpot,
    /// Full physical reset back at the original spawn transform
    ResetOnInitPos,
    /// Tear down and respawn from a re-read definition
    Reload,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActorModifyRequest {
    pub actor: ActorId,
    pub kind: ModifyKind,
}

impl ActorModifyRequest {
    pub fn new(actor: ActorId, kind: ModifyKind) -> Self {
        Self { actor, kind }
    }
}
