//! Collaborator doubles shared by the unit tests.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use bevy::math::Vec3;

use crate::character::player::target::DamageTarget;


/// Target standing still, logging every hit it receives. Clones share the
/// hit log and the death flag.
#[derive(Clone, Default)]
pub struct Dummy {
    pub position: Vec3,
    pub hits: Arc<Mutex<Vec<f32>>>,
    pub dead: Arc<AtomicBool>,
}

impl Dummy {
    pub fn at(position: Vec3) -> Self {
        Self { position, ..Default::default() }
    }

    pub fn kill(&self) {
        self.dead.store(true, Ordering::Relaxed);
    }

    pub fn hits(&self) -> Vec<f32> {
        self.hits.lock().map(|h| h.clone()).unwrap_or_default()
    }
}

impl DamageTarget for Dummy {
    fn take_damage(&mut self, amount: f32) {
        if let Ok(mut hits) = self.hits.lock() {
            hits.push(amount);
        }
    }

    fn current_position(&self) -> Vec3 {
        self.position
    }

    fn is_alive(&self) -> bool {
        !self.dead.load(Ordering::Relaxed)
    }
}
