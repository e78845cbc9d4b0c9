// On-foot characters: the local player avatar plus remote peers' avatars
//
// Characters are simple poses with an optional coupling to an actor they
// are riding in; the walking simulation itself lives elsewhere.

use glam::Vec3;

use crate::actors::ActorId;

#[derive(Debug, Clone)]
pub struct Character {
    pub position: Vec3,
    /// Heading about +Y, radians
    pub yaw: f32,
    /// Actor the character currently rides in
    pub coupled_actor: Option<ActorId>,
}

impl Default for Character {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            yaw: 0.0,
            coupled_actor: None,
        }
    }
}

impl Character {
    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
    }

    pub fn set_yaw(&mut self, yaw: f32) {
        self.yaw = yaw;
    }

    /// Attach to (or detach from) an actor; while coupled the character is
    /// hidden and follows the actor
    pub fn set_actor_coupling(&mut self, actor: Option<ActorId>) {
        self.coupled_actor = actor;
    }

    pub fn is_coupled(&self) -> bool {
        self.coupled_actor.is_some()
    }
}

/// Remote peer's avatar, keyed by its network source id
#[derive(Debug, Clone)]
pub struct RemoteCharacter {
    pub source_id: i32,
    pub character: Character,
}

/// The local character plus remote avatars replicated from peers
#[derive(Default)]
pub struct CharacterRoster {
    local: Character,
    remote: Vec<RemoteCharacter>,
}

impl CharacterRoster {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn local(&self) -> &Character {
        &self.local
    }

    pub fn local_mut(&mut self) -> &mut Character {
        &mut self.local
    }

    pub fn add_remote(&mut self, source_id: i32) {
        self.remote.push(RemoteCharacter {
            source_id,
            character: Character::default(),
        });
    }

    pub fn remote_mut(&mut self, source_id: i32) -> Option<&mut Character> {
        self.remote
            .iter_mut()
            .find(|remote| remote.source_id == source_id)
            .map(|remote| &mut remote.character)
    }

    /// Detach every remote avatar that rides in `actor`; called before the
    /// actor is deregistered so no coupling survives it
    pub fn undo_remote_actor_coupling(&mut self, actor: ActorId) {
        for remote in &mut self.remote {
            if remote.character.coupled_actor == Some(actor) {
                remote.character.set_actor_coupling(None);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_coupling_undo() {
        let mut roster = CharacterRoster::new();
        roster.add_remote(7);
        roster.add_remote(9);

        let actor = ActorId::generate();
        let other = ActorId::generate();
        roster.remote_mut(7).unwrap().set_actor_coupling(Some(actor));
        roster.remote_mut(9).unwrap().set_actor_coupling(Some(other));

        roster.undo_remote_actor_coupling(actor);

        assert!(!roster.remote_mut(7).unwrap().is_coupled());
        assert!(roster.remote_mut(9).unwrap().is_coupled());
    }
}
