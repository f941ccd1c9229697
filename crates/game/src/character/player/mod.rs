pub mod target;

use bevy::math::Vec3;
use serde::Deserialize;

use crate::character::health::{Health, HealthConfig};

use target::DamageTarget;


#[derive(Deserialize, Debug, Clone)]
pub struct PlayerConfig {
    pub health: HealthConfig,
    /// Health regained per second once regeneration kicks in.
    pub regen_rate: f32,
    /// Seconds without damage before regeneration starts.
    pub regen_delay: f32,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            health: HealthConfig { max: 100.0 },
            regen_rate: 5.0,
            regen_delay: 5.0,
        }
    }
}

/// The survivor: a damage target with regenerating health.
#[derive(Debug, Clone)]
pub struct Player {
    pub position: Vec3,
    health: Health,
    regen_rate: f32,
    regen_delay: f32,
    since_last_damage: f32,
}

impl Player {
    pub fn new(config: PlayerConfig, position: Vec3) -> Self {
        Self {
            position,
            health: config.health.into(),
            regen_rate: config.regen_rate,
            regen_delay: config.regen_delay,
            since_last_damage: config.regen_delay,
        }
    }

    pub fn health(&self) -> &Health {
        &self.health
    }
}

impl DamageTarget for Player {
    fn take_damage(&mut self, amount: f32) {
        if !self.is_alive() {
            return;
        }
        self.health.damage(amount);
        self.since_last_damage = 0.0;
    }

    fn current_position(&self) -> Vec3 {
        self.position
    }

    fn is_alive(&self) -> bool {
        !self.health.is_depleted()
    }

    fn tick(&mut self, delta: f32) {
        if !self.is_alive() {
            return;
        }
        if self.since_last_damage < self.regen_delay {
            self.since_last_damage += delta;
            return;
        }
        self.health.heal(self.regen_rate * delta);
    }
}
