// rigsim - vehicle-physics game/simulation core
//
// The crate orchestrates the lifecycle of physics actors (vehicles and
// machines): spawn, reset/reload, deletion, and player-vehicle switching,
// arbitrating between user input, network replication, terrain/config
// spawns, and save-game restoration. Rendering, physics integration, and
// audio mixing live elsewhere; they appear here only as notified sinks.

pub mod actors;
pub mod character;
pub mod config;
pub mod context;
pub mod messages;
pub mod terrain;

pub use actors::{
    Actor, ActorDefinition, ActorId, ActorManager, ActorModifyRequest, ActorSpawnRequest,
    ContentCache, DriveableKind, ModifyKind, SkinDef, SpawnOrigin,
};
pub use config::SimSettings;
pub use context::{GameContext, Peripherals};
pub use messages::{GameEvent, Message, MessageQueue};
pub use terrain::Terrain;
