use serde::{Deserialize, Serialize};


/// Index into `EncounterConfig::templates`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct TemplateId(pub usize);

/// One kind of zombie. The pool holds `pool_size_per_template` of each.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct EnemyTemplate {
    pub name: String,
    /// Relative chance of being picked for a spawn.
    pub weight: u32,
    pub max_health: f32,
    pub speed: f32,
    pub damage_amount: f32,
    pub damage_range: f32,
    /// Seconds between bites while the target stays in range.
    pub attack_delay: f32,
    /// Seconds spent climbing out of the ground, frozen and unhittable.
    pub spawn_delay: f32,
    /// Seconds the corpse stays before the instance goes back to the pool.
    pub death_delay: f32,
    pub kill_points: u32,
    pub stopping_distance: f32,
}

impl Default for EnemyTemplate {
    fn default() -> Self {
        Self {
            name: "zombie".to_string(),
            weight: 1,
            max_health: 100.0,
            speed: 1.0,
            damage_amount: 10.0,
            damage_range: 2.0,
            attack_delay: 2.0,
            spawn_delay: 1.4,
            death_delay: 3.0,
            kill_points: 60,
            stopping_distance: 1.0,
        }
    }
}

/// The part of a template that does not change between rounds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AttackStats {
    pub damage_amount: f32,
    pub damage_range: f32,
    pub attack_delay: f32,
    pub spawn_delay: f32,
    pub death_delay: f32,
    pub kill_points: u32,
}

impl From<&EnemyTemplate> for AttackStats {
    fn from(value: &EnemyTemplate) -> Self {
        Self {
            damage_amount: value.damage_amount,
            damage_range: value.damage_range,
            attack_delay: value.attack_delay,
            spawn_delay: value.spawn_delay,
            death_delay: value.death_delay,
            kill_points: value.kill_points,
        }
    }
}
