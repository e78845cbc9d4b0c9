// Message and event type definitions for the simulation core
//
// Inbound `Message`s are deferred commands consumed by the game context on
// the simulation thread; outbound `GameEvent`s are fire-and-forget
// notifications for telemetry/scripting listeners.

use crate::actors::requests::{ActorModifyRequest, ActorSpawnRequest, SpawnOrigin};
use crate::actors::ActorId;

/// Deferred commands processed by the game context
///
/// Each kind carries its payload directly; ownership of the payload moves
/// into the queue on push and back out on pop.
#[derive(Debug, Clone)]
pub enum Message {
    /// Spawn an actor on the next message pump
    SpawnActorRequested(ActorSpawnRequest),
    /// Apply a reset/reload to a live actor
    ModifyActorRequested(ActorModifyRequest),
    /// Remove a live actor
    DeleteActorRequested(ActorId),
    /// Seat the player in a live, drivable actor
    SeatPlayerRequested(ActorId),
}

/// All game events emitted from the context to listeners
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    ActorSpawned {
        actor: ActorId,
        instance_id: i32,
        origin: SpawnOrigin,
    },
    ActorRemoved {
        actor: ActorId,
        instance_id: i32,
    },
    /// Player entered a vehicle
    VehicleEntered {
        instance_id: i32,
    },
    /// Player left their vehicle; -1 when there was none
    VehicleExited {
        instance_id: i32,
    },
}

pub type EventSender = crossbeam_channel::Sender<GameEvent>;
pub type EventReceiver = crossbeam_channel::Receiver<GameEvent>;
