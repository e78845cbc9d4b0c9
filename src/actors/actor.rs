// Live actor (vehicle/machine) instance state
//
// Actors are exclusively owned by the manager's registry; everything else
// refers to them by `ActorId` and resolves through the registry on use.

use bitflags::bitflags;
use glam::Vec3;
use serde::{Deserialize, Serialize};
use ulid::Ulid;

use super::definition::ActorDefinition;
use super::requests::{ActorSpawnRequest, SpawnOrigin};
use crate::terrain::TerrainQuery;

/// Stable actor identifier; registry key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ActorId(pub Ulid);

impl ActorId {
    pub fn generate() -> Self {
        Self(Ulid::new())
    }
}

impl std::fmt::Display for ActorId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Driveable classification from the actor definition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DriveableKind {
    #[default]
    NotDriveable,
    Truck,
    Airplane,
    Boat,
    /// Stationary machinery (cranes, pumps); drivable controls, no seat-swap
    Machine,
}

/// Per-actor video camera state (mirrors the render layer's three states)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VideoCamState {
    Disabled,
    EnabledOffline,
    EnabledOnline,
}

/// Debug visualization requested for the actor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DebugViewMode {
    #[default]
    None,
    Skeleton,
    Nodes,
    Beams,
    Wheels,
}

/// Scheduling state maintained by the manager
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimState {
    /// Simulated locally every tick
    Simulated,
    /// Parked and skipped by the physics scheduler
    Sleeping,
    /// Replicated from a remote peer; never sleep-managed locally
    Networked,
}

bitflags! {
    /// Compact actor state flags
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ActorFlags: u8 {
        /// Player (or a remote character) is inside the vehicle
        const OCCUPIED = 1 << 0;
        /// Slide nodes are locked to their rails
        const SLIDE_NODES_LOCKED = 1 << 1;
    }
}

/// Instrument dashboard attached to drivable actors
#[derive(Debug, Clone, Copy, Default)]
pub struct Dashboard {
    pub visible_3d: bool,
}

/// Network replication source of a remote actor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetStream {
    pub source_id: i32,
    pub stream_id: i32,
}

#[derive(Debug, Clone)]
pub struct Actor {
    pub id: ActorId,
    /// Small monotonically assigned id carried by enter/exit events
    pub instance_id: i32,
    pub filename: String,
    pub driveable: DriveableKind,
    pub num_nodes: usize,

    pub position: Vec3,
    /// Heading about +Y, radians
    pub yaw: f32,
    pub velocity: Vec3,
    /// Center of the node cloud; follows position shifts
    pub rotation_center: Vec3,
    spawn_position: Vec3,
    spawn_yaw: f32,

    /// Horizontal collision footprint
    pub bounding_radius: f32,
    /// Absolute world height of the lowest node
    pub min_height: f32,
    /// Absolute world height of the highest node
    pub max_height: f32,
    pub min_camera_radius: f32,
    /// Camera roll vector of the interior (cinecam) anchor, when present
    pub cinecam_roll: Option<Vec3>,

    pub dashboard: Option<Dashboard>,
    pub videocam_state: VideoCamState,

    /// Tie (tow strap) target, when deployed
    pub tied_to: Option<ActorId>,
    /// Actors attached through inter-actor beams (ties, hooks, ropes)
    pub links: Vec<ActorId>,

    pub net_stream: Option<NetStream>,
    pub net_username: Option<String>,
    pub net_color: Option<i32>,

    pub section_config: String,
    pub skin: Option<String>,
    pub debug_view: DebugViewMode,

    pub sim_state: SimState,
    /// Seconds spent below the motion threshold; drives sleep scheduling
    pub idle_time: f32,
    pub flags: ActorFlags,
}

impl Actor {
    /// Build a live instance from a consumed spawn request and its definition
    pub fn from_spawn(
        id: ActorId,
        instance_id: i32,
        request: &ActorSpawnRequest,
        def: &ActorDefinition,
    ) -> Self {
        let sim_state = if request.origin == SpawnOrigin::Network {
            SimState::Networked
        } else {
            SimState::Simulated
        };
        Self {
            id,
            instance_id,
            filename: request.filename.clone(),
            driveable: def.driveable,
            num_nodes: def.num_nodes,
            position: request.position,
            yaw: request.yaw,
            velocity: Vec3::ZERO,
            rotation_center: request.position,
            spawn_position: request.position,
            spawn_yaw: request.yaw,
            bounding_radius: def.bounding_radius,
            min_height: request.position.y,
            max_height: request.position.y + def.height,
            min_camera_radius: def.min_camera_radius,
            cinecam_roll: def.cinecam_roll,
            dashboard: def.has_dashboard.then(Dashboard::default),
            videocam_state: if def.has_video_camera {
                VideoCamState::EnabledOnline
            } else {
                VideoCamState::Disabled
            },
            tied_to: None,
            links: Vec::new(),
            // Stream identifiers are stamped by the network-origin follow-up
            net_stream: None,
            net_username: request.net_username.clone(),
            net_color: request.net_color,
            section_config: request
                .section_config
                .clone()
                .or_else(|| def.default_config.clone())
                .unwrap_or_default(),
            skin: request.skin.clone(),
            debug_view: request.debug_view,
            sim_state,
            idle_time: 0.0,
            flags: ActorFlags::empty(),
        }
    }

    pub fn is_drivable(&self) -> bool {
        self.driveable != DriveableKind::NotDriveable
    }

    pub fn is_tied(&self) -> bool {
        self.tied_to.is_some()
    }

    pub fn is_remote(&self) -> bool {
        self.sim_state == SimState::Networked
    }

    /// Move the whole actor, keeping derived heights and the rotation
    /// center consistent
    pub fn set_position(&mut self, position: Vec3) {
        let delta = position - self.position;
        self.position = position;
        self.rotation_center += delta;
        self.min_height += delta.y;
        self.max_height += delta.y;
    }

    /// Height of the lowest node above the ground directly below
    pub fn height_above_ground(&self, terrain: &dyn TerrainQuery) -> f32 {
        let ground =
            terrain.surface_height_below(self.position.x, self.position.z, self.max_height);
        self.min_height - ground
    }

    pub fn toggle_slide_node_lock(&mut self) {
        self.flags.toggle(ActorFlags::SLIDE_NODES_LOCKED);
    }

    /// Occupancy signal from the seat-change sequencing
    pub fn prepare_inside(&mut self, inside: bool) {
        self.flags.set(ActorFlags::OCCUPIED, inside);
    }

    /// Restore last-known-good internal state without repositioning
    pub fn soft_reset(&mut self) {
        self.velocity = Vec3::ZERO;
        self.idle_time = 0.0;
        if self.sim_state == SimState::Sleeping {
            self.sim_state = SimState::Simulated;
        }
    }

    /// Full physical reset; optionally back to the original spawn transform
    pub fn sync_reset(&mut self, restore_initial_position: bool) {
        self.velocity = Vec3::ZERO;
        self.idle_time = 0.0;
        if self.sim_state == SimState::Sleeping {
            self.sim_state = SimState::Simulated;
        }
        if restore_initial_position {
            self.set_position(self.spawn_position);
            self.yaw = self.spawn_yaw;
        }
    }

    /// Release a deployed tie; the matching link edge is removed by the
    /// manager, which owns both endpoints
    pub fn untie(&mut self) -> Option<ActorId> {
        self.tied_to.take()
    }
}
