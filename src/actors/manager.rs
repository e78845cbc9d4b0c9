// Actor manager: the registry is the single source of truth for actor
// lifetime. The game context never frees an actor directly; everything
// funnels through `delete_actor_internal`, after which the id no longer
// resolves anywhere.
//
// Multi-entry operations snapshot ids/values first and then take one
// per-entry guard at a time, so shard locks cannot deadlock.

use dashmap::mapref::one::{Ref, RefMut};
use dashmap::DashMap;
use glam::Vec3;
use log::{debug, info, warn};
use parking_lot::Mutex;
use rand::seq::SliceRandom;
use std::collections::HashSet;
use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::Arc;

use super::actor::{Actor, ActorId, SimState};
use super::definition::{ActorDefinition, ContentCache};
use super::requests::ActorSpawnRequest;
use crate::config;
use crate::terrain::{CollisionContext, TerrainQuery};

pub struct ActorManager {
    content: Arc<ContentCache>,
    registry: DashMap<ActorId, Actor>,
    /// Spawn order; backs the cyclic vehicle-list navigation
    spawn_order: Mutex<Vec<ActorId>>,
    next_instance_id: AtomicI32,
}

impl ActorManager {
    pub fn new(content: Arc<ContentCache>) -> Self {
        Self {
            content,
            registry: DashMap::new(),
            spawn_order: Mutex::new(Vec::new()),
            next_instance_id: AtomicI32::new(0),
        }
    }

    pub fn content(&self) -> &Arc<ContentCache> {
        &self.content
    }

    /// Fetch the parsed definition for a spawn; terrain-default spawns get
    /// relaxed validation. Failure is logged by the cache and surfaces as
    /// None only.
    pub fn fetch_actor_def(
        &self,
        filename: &str,
        is_terrain_default: bool,
    ) -> Option<Arc<ActorDefinition>> {
        self.content.fetch_definition(filename, is_terrain_default)
    }

    /// Allocate and register a new live actor
    pub fn create_actor_instance(
        &self,
        request: &ActorSpawnRequest,
        def: &ActorDefinition,
    ) -> ActorId {
        let id = ActorId::generate();
        let instance_id = self.next_instance_id.fetch_add(1, Ordering::Relaxed);
        let actor = Actor::from_spawn(id, instance_id, request, def);
        info!(
            "registered actor '{}' (instance {})",
            actor.filename, instance_id
        );
        self.registry.insert(id, actor);
        self.spawn_order.lock().push(id);
        id
    }

    /// Deregister and drop an actor. Afterwards no link, tie, or list entry
    /// resolves to the removed id.
    pub fn delete_actor_internal(&self, id: ActorId) {
        let Some((_, actor)) = self.registry.remove(&id) else {
            warn!("delete requested for unknown actor {}", id);
            return;
        };
        info!(
            "deregistered actor '{}' (instance {})",
            actor.filename, actor.instance_id
        );
        self.spawn_order.lock().retain(|other| *other != id);

        let ids: Vec<ActorId> = self.registry.iter().map(|entry| *entry.key()).collect();
        for other in ids {
            if let Some(mut guard) = self.registry.get_mut(&other) {
                guard.links.retain(|link| *link != id);
                if guard.tied_to == Some(id) {
                    guard.tied_to = None;
                }
            }
        }
    }

    pub fn actor(&self, id: ActorId) -> Option<Ref<'_, ActorId, Actor>> {
        self.registry.get(&id)
    }

    pub fn actor_mut(&self, id: ActorId) -> Option<RefMut<'_, ActorId, Actor>> {
        self.registry.get_mut(&id)
    }

    pub fn is_registered(&self, id: ActorId) -> bool {
        self.registry.contains_key(&id)
    }

    pub fn actor_count(&self) -> usize {
        self.registry.len()
    }

    /// Locally simulated actors in spawn order (remote replicas excluded)
    pub fn get_local_actors(&self) -> Vec<ActorId> {
        self.spawn_order
            .lock()
            .iter()
            .copied()
            .filter(|id| {
                self.registry
                    .get(id)
                    .map(|actor| !actor.is_remote())
                    .unwrap_or(false)
            })
            .collect()
    }

    /// Attach two actors with an inter-actor link (hook, rope)
    pub fn link_actors(&self, a: ActorId, b: ActorId) {
        if let Some(mut guard) = self.registry.get_mut(&a) {
            if !guard.links.contains(&b) {
                guard.links.push(b);
            }
        }
        if let Some(mut guard) = self.registry.get_mut(&b) {
            if !guard.links.contains(&a) {
                guard.links.push(a);
            }
        }
    }

    /// Deploy a tie from `actor` to `anchor`
    pub fn tie_actors(&self, actor: ActorId, anchor: ActorId) {
        if let Some(mut guard) = self.registry.get_mut(&actor) {
            guard.tied_to = Some(anchor);
        }
        self.link_actors(actor, anchor);
    }

    /// Release a deployed tie and the link edge that backed it
    pub fn untie_actor(&self, id: ActorId) {
        let target = match self.registry.get_mut(&id) {
            Some(mut guard) => guard.untie(),
            None => None,
        };
        let Some(target) = target else { return };

        if let Some(mut guard) = self.registry.get_mut(&id) {
            guard.links.retain(|link| *link != target);
        }
        if let Some(mut guard) = self.registry.get_mut(&target) {
            guard.links.retain(|link| *link != id);
        }
    }

    /// Transitive closure of inter-actor links starting at `id`, excluding
    /// `id` itself
    pub fn linked_actors(&self, id: ActorId) -> Vec<ActorId> {
        let mut visited: HashSet<ActorId> = HashSet::from([id]);
        let mut stack = vec![id];
        let mut linked = Vec::new();

        while let Some(current) = stack.pop() {
            let neighbours: Vec<ActorId> = match self.registry.get(&current) {
                Some(guard) => guard.links.clone(),
                None => continue,
            };
            for neighbour in neighbours {
                if visited.insert(neighbour) {
                    linked.push(neighbour);
                    stack.push(neighbour);
                }
            }
        }
        linked
    }

    /// Advance local actors and refresh sleep scheduling
    pub fn update_actors(&self, current_player: Option<ActorId>, dt: f32) {
        if dt > 0.0 {
            for id in self.get_local_actors() {
                if let Some(mut guard) = self.registry.get_mut(&id) {
                    if guard.sim_state == SimState::Simulated
                        && guard.velocity.length_squared() > 0.0
                    {
                        let target = guard.position + guard.velocity * dt;
                        guard.set_position(target);
                    }
                }
            }
        }
        self.update_sleeping_state(current_player, dt);
    }

    /// Re-evaluate which actors may sleep, relative to the current player
    /// actor. A zero `dt` forces an immediate wake re-evaluation without
    /// advancing idle timers.
    pub fn update_sleeping_state(&self, current_player: Option<ActorId>, dt: f32) {
        let mut keep_awake: HashSet<ActorId> = HashSet::new();
        if let Some(current) = current_player {
            keep_awake.insert(current);
            keep_awake.extend(self.linked_actors(current));
        }

        for id in self.get_local_actors() {
            let Some(mut guard) = self.registry.get_mut(&id) else {
                continue;
            };

            let moving =
                guard.velocity.length_squared() > config::sleep::SPEED_EPSILON.powi(2);
            if keep_awake.contains(&id) || moving {
                guard.idle_time = 0.0;
                if guard.sim_state == SimState::Sleeping {
                    debug!("actor instance {} woke up", guard.instance_id);
                    guard.sim_state = SimState::Simulated;
                }
                continue;
            }

            if dt > 0.0 && guard.sim_state == SimState::Simulated {
                guard.idle_time += dt;
                if guard.idle_time >= config::sleep::IDLE_TIMEOUT_SEC {
                    debug!("actor instance {} put to sleep", guard.instance_id);
                    guard.sim_state = SimState::Sleeping;
                }
            }
        }
    }

    fn vehicle_candidates(&self) -> Vec<ActorId> {
        self.spawn_order
            .lock()
            .iter()
            .copied()
            .filter(|id| {
                self.registry
                    .get(id)
                    .map(|actor| actor.is_drivable() && !actor.is_remote())
                    .unwrap_or(false)
            })
            .collect()
    }

    /// Cyclic predecessor among drivable local actors; `current`/`previous`
    /// serve as the anchor, in that order
    pub fn fetch_previous_vehicle_on_list(
        &self,
        current: Option<ActorId>,
        previous: Option<ActorId>,
    ) -> Option<ActorId> {
        let candidates = self.vehicle_candidates();
        if candidates.is_empty() {
            return None;
        }
        match self.list_anchor(&candidates, current, previous) {
            Some(index) => Some(candidates[(index + candidates.len() - 1) % candidates.len()]),
            None => candidates.last().copied(),
        }
    }

    /// Cyclic successor among drivable local actors
    pub fn fetch_next_vehicle_on_list(
        &self,
        current: Option<ActorId>,
        previous: Option<ActorId>,
    ) -> Option<ActorId> {
        let candidates = self.vehicle_candidates();
        if candidates.is_empty() {
            return None;
        }
        match self.list_anchor(&candidates, current, previous) {
            Some(index) => Some(candidates[(index + 1) % candidates.len()]),
            None => candidates.first().copied(),
        }
    }

    fn list_anchor(
        &self,
        candidates: &[ActorId],
        current: Option<ActorId>,
        previous: Option<ActorId>,
    ) -> Option<usize> {
        current
            .and_then(|id| candidates.iter().position(|c| *c == id))
            .or_else(|| previous.and_then(|id| candidates.iter().position(|c| *c == id)))
    }

    /// First actor standing inside a named terrain event box
    pub fn find_actor_inside_box(
        &self,
        collisions: &CollisionContext,
        instance_name: &str,
        box_name: &str,
    ) -> Option<ActorId> {
        let event_box = collisions.lookup_box(instance_name, box_name)?;
        self.spawn_order
            .lock()
            .iter()
            .copied()
            .find(|id| {
                self.registry
                    .get(id)
                    .map(|actor| event_box.contains(actor.position))
                    .unwrap_or(false)
            })
    }

    /// Nudge a freshly spawned actor off of overlapping neighbours.
    ///
    /// `consider_up` (used when no player actor exists) first tries to
    /// stack the actor above the blockers; otherwise candidates are probed
    /// on expanding rings out to `max_radius`, in randomized direction
    /// order so repeated spawns spread out. Returns true when the actor was
    /// moved.
    pub fn resolve_spawn_overlap(
        &self,
        id: ActorId,
        max_radius: f32,
        consider_up: bool,
        terrain: &dyn TerrainQuery,
    ) -> bool {
        let (position, radius, min_height, max_height, clearance) = {
            let Some(guard) = self.registry.get(&id) else {
                return false;
            };
            (
                guard.position,
                guard.bounding_radius,
                guard.min_height,
                guard.max_height,
                guard.height_above_ground(terrain),
            )
        };

        // Snapshot of every other actor's footprint
        let others: Vec<(Vec3, f32, f32, f32)> = self
            .registry
            .iter()
            .filter(|entry| *entry.key() != id)
            .map(|entry| {
                let actor = entry.value();
                (
                    actor.position,
                    actor.bounding_radius,
                    actor.min_height,
                    actor.max_height,
                )
            })
            .collect();

        let overlaps = |pos: Vec3, min_h: f32, max_h: f32| {
            others.iter().any(|(o_pos, o_radius, o_min, o_max)| {
                let dx = pos.x - o_pos.x;
                let dz = pos.z - o_pos.z;
                let horizontal = (dx * dx + dz * dz).sqrt() < radius + o_radius;
                horizontal && min_h < *o_max && max_h > *o_min
            })
        };

        if !overlaps(position, min_height, max_height) {
            return false;
        }

        if consider_up {
            // Stack above the tallest horizontal blocker
            let top = others
                .iter()
                .filter(|(o_pos, o_radius, _, _)| {
                    let dx = position.x - o_pos.x;
                    let dz = position.z - o_pos.z;
                    (dx * dx + dz * dz).sqrt() < radius + o_radius
                })
                .map(|(_, _, _, o_max)| *o_max)
                .fold(f32::MIN, f32::max);
            let dy = (top + config::spawn::STACK_CLEARANCE) - min_height;
            if let Some(mut guard) = self.registry.get_mut(&id) {
                let target = position + Vec3::new(0.0, dy, 0.0);
                guard.set_position(target);
            }
            return true;
        }

        let step = (radius * 2.0).max(1.0);
        let mut rng = rand::rng();
        let mut ring = step;
        let height = max_height - min_height;

        while ring <= max_radius {
            let mut directions: Vec<usize> = (0..config::spawn::RESOLVE_RING_CANDIDATES).collect();
            directions.shuffle(&mut rng);

            for direction in directions {
                let theta = direction as f32 / config::spawn::RESOLVE_RING_CANDIDATES as f32
                    * std::f32::consts::TAU;
                let probe = position + Vec3::new(theta.cos() * ring, 0.0, theta.sin() * ring);

                // Keep the original clearance above whatever ground is there
                let ground =
                    terrain.surface_height_below(probe.x, probe.z, probe.y + height);
                let dy = (ground + clearance) - min_height;
                let candidate = probe + Vec3::new(0.0, dy, 0.0);

                if !overlaps(candidate, min_height + dy, max_height + dy) {
                    if let Some(mut guard) = self.registry.get_mut(&id) {
                        guard.set_position(candidate);
                    }
                    debug!("resolved spawn overlap at ring {}", ring);
                    return true;
                }
            }
            ring += step;
        }

        warn!("could not resolve spawn overlap within {} units", max_radius);
        false
    }
}
