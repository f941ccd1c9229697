use bevy::math::Vec3;
use serde::{Deserialize, Serialize};


/// Something zombies chase and bite. The survivor, in practice.
pub trait DamageTarget: Send + Sync {
    fn take_damage(&mut self, amount: f32);

    fn current_position(&self) -> Vec3;

    /// Dead targets are no longer pursued or attacked.
    fn is_alive(&self) -> bool {
        true
    }

    /// Advanced once per simulation tick before the zombies act.
    fn tick(&mut self, _delta: f32) {}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TargetId(pub usize);

/// Owns the damage targets; agents only keep a `TargetId`.
///
/// Removed targets leave a hole so stale ids resolve to nothing instead of
/// pointing at whoever registered next.
#[derive(Default)]
pub struct TargetRegistry {
    targets: Vec<Option<Box<dyn DamageTarget>>>,
}

impl TargetRegistry {
    pub fn add(&mut self, target: Box<dyn DamageTarget>) -> TargetId {
        self.targets.push(Some(target));
        TargetId(self.targets.len() - 1)
    }

    pub fn remove(&mut self, id: TargetId) -> Option<Box<dyn DamageTarget>> {
        self.targets.get_mut(id.0).and_then(Option::take)
    }

    pub fn get(&self, id: TargetId) -> Option<&dyn DamageTarget> {
        self.targets.get(id.0).and_then(|t| t.as_deref())
    }

    pub fn get_mut(&mut self, id: TargetId) -> Option<&mut (dyn DamageTarget + 'static)> {
        self.targets.get_mut(id.0).and_then(|t| t.as_deref_mut())
    }

    /// First registered target still alive, handed to freshly spawned zombies.
    pub fn primary(&self) -> Option<TargetId> {
        self.targets
            .iter()
            .position(|t| t.as_ref().is_some_and(|t| t.is_alive()))
            .map(TargetId)
    }

    pub fn is_empty(&self) -> bool {
        self.targets.iter().all(Option::is_none)
    }

    pub fn tick(&mut self, delta: f32) {
        for target in self.targets.iter_mut().flatten() {
            target.tick(delta);
        }
    }
}
