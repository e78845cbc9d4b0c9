// Actor domain: live vehicle instances, their definitions, and the manager
// that owns both

pub mod actor;
pub mod definition;
pub mod manager;
pub mod requests;

pub use actor::{
    Actor, ActorFlags, ActorId, Dashboard, DebugViewMode, DriveableKind, NetStream, SimState,
    VideoCamState,
};
pub use definition::{
    ActorDefinition, ContentCache, DefinitionError, DefinitionSource, JsonDirSource,
    MemoryDefinitionSource, SkinDef,
};
pub use manager::ActorManager;
pub use requests::{ActorModifyRequest, ActorSpawnRequest, ModifyKind, SpawnOrigin};
