// Game context: the actor lifecycle orchestrator
//
// Coordinates spawn/modify/delete flows and player-vehicle switching,
// delegating heavy lifting (definition loading, registration, sleep
// scheduling) to the actor manager and notifying peripheral sinks as an
// effect of each transition. Runs on the single simulation thread; the
// message queue is the only concurrent entry point.

use crossbeam_channel::unbounded;
use glam::Vec3;
use log::{info, warn};
use std::f32::consts::FRAC_PI_2;

use super::peripherals::{NetworkSession, Peripherals, SoundTrigger};
use crate::actors::{
    ActorId, ActorManager, ActorModifyRequest, ActorSpawnRequest, DriveableKind, ModifyKind,
    SpawnOrigin, VideoCamState,
};
use crate::character::{Character, CharacterRoster};
use crate::config::{self, SimSettings};
use crate::messages::{EventReceiver, EventSender, GameEvent, Message, MessageQueue};
use crate::terrain::Terrain;

/// Last user-requested spawn, kept for the "respawn last vehicle" binding
#[derive(Debug, Clone)]
pub struct LastSpawnInfo {
    pub filename: String,
    pub section_config: Option<String>,
    pub skin: Option<String>,
}

pub struct GameContext {
    queue: MessageQueue,
    manager: ActorManager,
    terrain: Terrain,
    characters: CharacterRoster,
    peripherals: Peripherals,
    network: Box<dyn NetworkSession>,
    settings: SimSettings,

    event_tx: EventSender,
    event_rx: EventReceiver,

    /// Invariant: empty, or a live registered actor; never a dangling id
    player_actor: Option<ActorId>,
    /// Soft reference for quick vehicle switching; cleared whenever the
    /// actor it names is deleted or displaced by a reload
    prev_player_actor: Option<ActorId>,

    last_spawn_info: Option<LastSpawnInfo>,
    hud_hidden: bool,
}

impl GameContext {
    pub fn new(
        manager: ActorManager,
        terrain: Terrain,
        peripherals: Peripherals,
        network: Box<dyn NetworkSession>,
        settings: SimSettings,
    ) -> Self {
        let (event_tx, event_rx) = unbounded();
        Self {
            queue: MessageQueue::new(),
            manager,
            terrain,
            characters: CharacterRoster::new(),
            peripherals,
            network,
            settings,
            event_tx,
            event_rx,
            player_actor: None,
            prev_player_actor: None,
            last_spawn_info: None,
            hud_hidden: false,
        }
    }

    // --------------------------------
    // Message queue

    /// Cloneable handle for producer threads
    pub fn queue(&self) -> MessageQueue {
        self.queue.clone()
    }

    pub fn push_message(&self, message: Message) {
        self.queue.push(message);
    }

    pub fn has_messages(&self) -> bool {
        self.queue.has_pending()
    }

    /// Outbound event stream; listeners may clone or drop the receiver
    pub fn events(&self) -> EventReceiver {
        self.event_rx.clone()
    }

    /// Drain and dispatch all pending messages on the simulation thread.
    /// Messages pushed by handlers (seat requests, reload respawns) are
    /// picked up by the same drain, after the pushing operation unwound.
    pub fn process_messages(&mut self) -> usize {
        let mut processed = 0;
        while self.queue.has_pending() {
            let Ok(message) = self.queue.pop() else { break };
            processed += 1;
            match message {
                Message::SpawnActorRequested(request) => {
                    self.spawn_actor(request);
                }
                Message::ModifyActorRequested(request) => self.modify_actor(request),
                Message::DeleteActorRequested(actor) => self.delete_actor(actor),
                Message::SeatPlayerRequested(actor) => {
                    let seatable = self
                        .manager
                        .actor(actor)
                        .map(|guard| guard.is_drivable())
                        .unwrap_or(false);
                    if seatable {
                        self.change_player_actor(Some(actor));
                    } else {
                        warn!("seat request for missing or undrivable actor {}", actor);
                    }
                }
            }
        }
        processed
    }

    // --------------------------------
    // Actors (physics and netcode)

    /// Spawn an actor from a consumed request. Returns None when the
    /// definition cannot be loaded; every other failure degrades to a
    /// default (skin dropped, overlap left unresolved).
    pub fn spawn_actor(&mut self, mut request: ActorSpawnRequest) -> Option<ActorId> {
        if request.origin == SpawnOrigin::User {
            self.last_spawn_info = Some(LastSpawnInfo {
                filename: request.filename.clone(),
                section_config: request.section_config.clone(),
                skin: request.skin.clone(),
            });

            if request.spawn_box.is_none() {
                match self.player_actor {
                    Some(player) => {
                        if let Some(player) = self.manager.actor(player) {
                            let probe = player.max_height;
                            request.yaw = config::spawn::ACTOR_FACING_DEG.to_radians() - player.yaw;
                            let center = player.rotation_center;
                            let ground =
                                self.terrain.surface_height_below(center.x, center.z, probe);
                            // Retain the player's apparent height above ground
                            let clearance = player.height_above_ground(self.terrain.query());
                            request.position = center;
                            request.position.y = ground + clearance;
                        }
                    }
                    None => {
                        let character = self.characters.local();
                        request.yaw =
                            config::spawn::CHARACTER_FACING_DEG.to_radians() - character.yaw;
                        request.position = character.position;
                    }
                }
            }
        }

        if let Some(resolved) = request.cache_entry.take() {
            request.filename = resolved;
        }
        info!("loading vehicle: {}", request.filename);

        let def = match self.manager.fetch_actor_def(
            &request.filename,
            request.origin == SpawnOrigin::TerrainDef,
        ) {
            Some(def) => def,
            // Error already reported by the content cache
            None => return None,
        };

        if let Some(skin) = request.skin.clone() {
            if self.manager.content().fetch_skin(&skin).is_none() {
                // Missing skins never fail the spawn
                request.skin = None;
            }
        }

        if request.origin != SpawnOrigin::Network && self.network.is_connected() {
            let user = self.network.local_user();
            request.net_username = Some(user.username);
            request.net_color = Some(user.color);
        }

        let actor = self.manager.create_actor_instance(&request, &def);

        if def.slide_nodes_connect_instantly {
            if let Some(mut guard) = self.manager.actor_mut(actor) {
                guard.toggle_slide_node_lock();
            }
        }

        match request.origin {
            SpawnOrigin::User => {
                let drivable = self
                    .manager
                    .actor(actor)
                    .map(|guard| guard.is_drivable())
                    .unwrap_or(false);
                if drivable {
                    self.queue.push(Message::SeatPlayerRequested(actor));
                }
                if request.spawn_box.is_none() {
                    self.manager.resolve_spawn_overlap(
                        actor,
                        config::spawn::RESOLVE_RADIUS,
                        self.player_actor.is_none(),
                        self.terrain.query(),
                    );
                }
            }
            SpawnOrigin::ConfigFile => {
                let seatable = self
                    .manager
                    .actor(actor)
                    .map(|guard| guard.is_drivable() && guard.num_nodes > 0)
                    .unwrap_or(false);
                if seatable && self.settings.preset_vehicle_enter {
                    self.queue.push(Message::SeatPlayerRequested(actor));
                }
            }
            SpawnOrigin::TerrainDef => {
                if request.terrain_machine {
                    if let Some(mut guard) = self.manager.actor_mut(actor) {
                        guard.driveable = DriveableKind::Machine;
                    }
                }
            }
            SpawnOrigin::Network => {
                if let Some(mut guard) = self.manager.actor_mut(actor) {
                    guard.net_stream = request.net_stream;
                }
            }
            SpawnOrigin::Savegame => {
                // Restored actors are never auto-seated; the save carries
                // the seating separately
            }
            SpawnOrigin::Unknown => {
                let drivable = self
                    .manager
                    .actor(actor)
                    .map(|guard| guard.is_drivable())
                    .unwrap_or(false);
                if drivable {
                    self.queue.push(Message::SeatPlayerRequested(actor));
                }
            }
        }

        let instance_id = self
            .manager
            .actor(actor)
            .map(|guard| guard.instance_id)
            .unwrap_or(-1);
        let _ = self.event_tx.send(GameEvent::ActorSpawned {
            actor,
            instance_id,
            origin: request.origin,
        });

        Some(actor)
    }

    /// Apply a reset or reload to a live actor
    pub fn modify_actor(&mut self, request: ActorModifyRequest) {
        if !self.manager.is_registered(request.actor) {
            warn!("modify request for unknown actor {}", request.actor);
            return;
        }

        match request.kind {
            ModifyKind::SoftReset => {
                if let Some(mut guard) = self.manager.actor_mut(request.actor) {
                    guard.soft_reset();
                }
            }
            ModifyKind::ResetOnSpot | ModifyKind::ResetOnInitPos => {
                if let Some(mut guard) = self.manager.actor_mut(request.actor) {
                    guard.sync_reset(request.kind == ModifyKind::ResetOnInitPos);
                }
            }
            ModifyKind::Reload => self.reload_actor(request.actor),
        }
    }

    /// Tear an actor down and respawn it from a re-read definition. The
    /// respawn goes through the message queue so teardown fully unwinds
    /// before the new instance is built.
    fn reload_actor(&mut self, actor: ActorId) {
        let Some((mut reload_pos, own_yaw, own_min, debug_view, section_config, skin, filename)) =
            self.manager.actor(actor).map(|guard| {
                (
                    guard.position,
                    guard.yaw,
                    guard.min_height,
                    guard.debug_view,
                    guard.section_config.clone(),
                    guard.skin.clone(),
                    guard.filename.clone(),
                )
            })
        else {
            return;
        };

        // Re-entry pose comes from the current player actor; reloading
        // without one falls back to the actor's own transform
        let (reference_yaw, reference_min) = self
            .player_actor
            .and_then(|player| {
                self.manager
                    .actor(player)
                    .map(|guard| (guard.yaw, guard.min_height))
            })
            .unwrap_or((own_yaw, own_min));
        let reload_yaw = config::spawn::ACTOR_FACING_DEG.to_radians() - reference_yaw;
        reload_pos.y = reference_min;

        if self.prev_player_actor == Some(actor) {
            self.prev_player_actor = None;
        }
        self.delete_actor(actor);
        // Force the next load to re-read the definition from storage
        self.manager.content().unload_definition(&filename);

        let mut respawn = ActorSpawnRequest::new(filename, SpawnOrigin::User);
        respawn.position = reload_pos;
        respawn.yaw = reload_yaw;
        respawn.section_config = Some(section_config);
        respawn.skin = skin;
        respawn.debug_view = debug_view;
        self.queue.push(Message::SpawnActorRequested(respawn));
    }

    /// Remove a live actor. Player-exit handling and tie cleanup run while
    /// the actor is still registered; deregistration is last.
    pub fn delete_actor(&mut self, actor: ActorId) {
        if !self.manager.is_registered(actor) {
            warn!("delete request for unknown actor {}", actor);
            return;
        }

        if self.player_actor == Some(actor) {
            let center = self.manager.actor(actor).map(|guard| guard.rotation_center);
            self.change_player_actor(None); // Get out of the vehicle
            if let Some(center) = center {
                self.characters.local_mut().set_position(center);
            }
        }

        if self.prev_player_actor == Some(actor) {
            self.prev_player_actor = None;
        }

        // Untie everything whose tie anchors into the doomed actor's link web
        let linked = self.manager.linked_actors(actor);
        for other in self.manager.get_local_actors() {
            if other == actor {
                continue;
            }
            let tie_target = self
                .manager
                .actor(other)
                .map(|guard| guard.tied_to)
                .flatten();
            let dangling = tie_target
                .map(|target| target == actor || linked.contains(&target))
                .unwrap_or(false);
            if dangling {
                self.manager.untie_actor(other);
            }
        }

        self.peripherals.gfx.remove_gfx_actor(actor);

        if self.network.is_connected() {
            self.characters.undo_remote_actor_coupling(actor);
        }

        let instance_id = self
            .manager
            .actor(actor)
            .map(|guard| guard.instance_id)
            .unwrap_or(-1);
        self.manager.delete_actor_internal(actor);
        let _ = self.event_tx.send(GameEvent::ActorRemoved { actor, instance_id });
    }

    /// The single player-actor transition. `None` exits to the on-foot
    /// character; `Some` seats the player. Re-seating the already-current
    /// actor re-runs the full hide/show cycle.
    pub fn change_player_actor(&mut self, actor: Option<ActorId>) {
        let requested = actor;
        let actor = actor.filter(|id| self.manager.is_registered(*id));
        if requested.is_some() && actor.is_none() {
            warn!("seat change into unregistered actor ignored");
        }

        let prev_player_actor = self.player_actor;
        self.player_actor = actor;
        if prev_player_actor.is_some() && prev_player_actor != self.player_actor {
            self.prev_player_actor = prev_player_actor;
        }

        // hide any old dashes
        if let Some(prev) = prev_player_actor {
            if let Some(mut guard) = self.manager.actor_mut(prev) {
                if let Some(dashboard) = guard.dashboard.as_mut() {
                    dashboard.visible_3d = false;
                }
            }
        }
        // show new
        if let Some(current) = self.player_actor {
            if let Some(mut guard) = self.manager.actor_mut(current) {
                if let Some(dashboard) = guard.dashboard.as_mut() {
                    dashboard.visible_3d = true;
                }
            }
        }

        if let Some(prev) = prev_player_actor {
            self.peripherals.overlay.show_dashboard_overlays(prev, false);
            self.peripherals.gfx.set_renderdash_active(prev, false);
            self.peripherals.sound.stop_trigger(prev, SoundTrigger::Air);
            self.peripherals.sound.stop_trigger(prev, SoundTrigger::Pump);
        }

        match self.player_actor {
            None => {
                // getting outside
                if let Some(prev) = prev_player_actor {
                    let dismount = self.manager.actor_mut(prev).map(|mut guard| {
                        if guard.videocam_state == VideoCamState::EnabledOnline {
                            guard.videocam_state = VideoCamState::EnabledOffline;
                        }
                        guard.prepare_inside(false);
                        (
                            guard.min_camera_radius,
                            guard.yaw,
                            guard.position,
                            guard.cinecam_roll,
                        )
                    });

                    if let Some((radius, yaw, position, cinecam_roll)) = dismount {
                        let pose = self.dismount_pose(radius, yaw, position, cinecam_roll);
                        let character = self.characters.local_mut();
                        character.set_actor_coupling(None);
                        character.set_yaw(pose.1);
                        character.set_position(pose.0);
                    }
                }

                self.peripherals.force_feedback.set_enabled(false);

                let instance_id = prev_player_actor
                    .and_then(|prev| self.manager.actor(prev).map(|guard| guard.instance_id))
                    .unwrap_or(-1);
                let _ = self.event_tx.send(GameEvent::VehicleExited { instance_id });
            }
            Some(current) => {
                // getting inside
                self.peripherals
                    .overlay
                    .show_dashboard_overlays(current, !self.hud_hidden);

                let (instance_id, driveable) = match self.manager.actor_mut(current) {
                    Some(mut guard) => {
                        if guard.videocam_state == VideoCamState::EnabledOffline {
                            guard.videocam_state = VideoCamState::EnabledOnline;
                        }
                        guard.prepare_inside(true);
                        (guard.instance_id, guard.driveable)
                    }
                    None => (-1, DriveableKind::NotDriveable),
                };

                self.peripherals.gfx.set_renderdash_active(current, true);

                // force feedback: only for trucks so far
                self.peripherals
                    .force_feedback
                    .set_enabled(driveable == DriveableKind::Truck);

                self.characters
                    .local_mut()
                    .set_actor_coupling(Some(current));

                let _ = self.event_tx.send(GameEvent::VehicleEntered { instance_id });
            }
        }

        if prev_player_actor.is_some() || self.player_actor.is_some() {
            self.peripherals
                .camera
                .notify_vehicle_changed(self.player_actor);
        }

        // Zero dt forces an immediate sleep re-evaluation
        self.manager
            .update_sleeping_state(self.player_actor, 0.0);
    }

    /// Where the character lands when leaving an actor: prefer the less
    /// steep of the two lateral cinecam candidates, else straight down from
    /// the actor's position
    fn dismount_pose(
        &self,
        min_camera_radius: f32,
        yaw: f32,
        position: Vec3,
        cinecam_roll: Option<Vec3>,
    ) -> (Vec3, f32) {
        let rotation = yaw - FRAC_PI_2;
        let mut position = position;

        if let Some(roll) = cinecam_roll {
            let left = position - config::character::EXIT_PROBE_SCALE * roll;
            let right = position + config::character::EXIT_PROBE_SCALE * roll;
            let left_ground = self.terrain.surface_height_below(
                left.x,
                left.z,
                left.y + min_camera_radius,
            );
            let right_ground = self.terrain.surface_height_below(
                right.x,
                right.z,
                right.y + min_camera_radius,
            );
            position = if (right.y - right_ground).abs() * config::character::EXIT_HEIGHT_BIAS
                < (left.y - left_ground).abs()
            {
                right
            } else {
                left
            };
        }

        position.y = self.terrain.surface_height_below(
            position.x,
            position.z,
            position.y + min_camera_radius,
        );
        (position, rotation)
    }

    // --------------------------------
    // Pass-throughs and accessors

    pub fn fetch_prev_vehicle_on_list(&self) -> Option<ActorId> {
        self.manager
            .fetch_previous_vehicle_on_list(self.player_actor, self.prev_player_actor)
    }

    pub fn fetch_next_vehicle_on_list(&self) -> Option<ActorId> {
        self.manager
            .fetch_next_vehicle_on_list(self.player_actor, self.prev_player_actor)
    }

    pub fn update_actors(&mut self, dt: f32) {
        self.manager.update_actors(self.player_actor, dt);
    }

    pub fn find_actor_by_collision_box(
        &self,
        instance_name: &str,
        box_name: &str,
    ) -> Option<ActorId> {
        self.manager
            .find_actor_inside_box(self.terrain.collisions(), instance_name, box_name)
    }

    pub fn manager(&self) -> &ActorManager {
        &self.manager
    }

    pub fn terrain(&self) -> &Terrain {
        &self.terrain
    }

    pub fn player_actor(&self) -> Option<ActorId> {
        self.player_actor
    }

    pub fn prev_player_actor(&self) -> Option<ActorId> {
        self.prev_player_actor
    }

    pub fn player_character(&self) -> &Character {
        self.characters.local()
    }

    pub fn player_character_mut(&mut self) -> &mut Character {
        self.characters.local_mut()
    }

    pub fn characters_mut(&mut self) -> &mut CharacterRoster {
        &mut self.characters
    }

    pub fn last_spawn_info(&self) -> Option<&LastSpawnInfo> {
        self.last_spawn_info.as_ref()
    }

    pub fn set_hud_hidden(&mut self, hidden: bool) {
        self.hud_hidden = hidden;
    }
}
