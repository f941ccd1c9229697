use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::character::enemy::config::EnemyTemplate;
use crate::character::enemy::spawning::SpawnPoint;
use crate::error::ConfigError;
use crate::round::DifficultyCurve;


/// Everything needed to build an encounter, usually read from a `.ron` file.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct EncounterConfig {
    /// Zombies pre-built per template. The pool never grows past this.
    pub pool_size_per_template: usize,
    /// Fixed seed for replayable runs, entropy when absent.
    pub seed: Option<u32>,
    pub templates: Vec<EnemyTemplate>,
    pub difficulty: DifficultyCurve,
    pub spawn_points: Vec<SpawnPoint>,
}

impl Default for EncounterConfig {
    fn default() -> Self {
        Self {
            pool_size_per_template: 24,
            seed: None,
            templates: vec![EnemyTemplate::default()],
            difficulty: DifficultyCurve::default(),
            spawn_points: Vec::new(),
        }
    }
}

impl EncounterConfig {
    pub fn from_ron(text: &str) -> Result<Self, ConfigError> {
        let config: Self = ron::de::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_ron(&text)
    }

    pub fn pool_capacity(&self) -> usize {
        self.pool_size_per_template * self.templates.len()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.templates.is_empty() {
            return invalid("at least one enemy template is required");
        }
        if self.pool_size_per_template == 0 {
            return invalid("pool_size_per_template must be at least 1");
        }
        if self.templates.iter().all(|t| t.weight == 0) {
            return invalid("at least one template needs a non-zero weight");
        }

        for template in &self.templates {
            let name = &template.name;
            if !(template.max_health > 0.0) {
                return invalid(format!("template {name}: max_health must be positive"));
            }
            if !(template.speed > 0.0) {
                return invalid(format!("template {name}: speed must be positive"));
            }
            if !(template.attack_delay > 0.0) {
                return invalid(format!("template {name}: attack_delay must be positive"));
            }
            if !(template.damage_amount >= 0.0) || !(template.damage_range >= 0.0) {
                return invalid(format!(
                    "template {name}: damage_amount and damage_range cannot be negative"
                ));
            }
            if !(template.spawn_delay >= 0.0) || !(template.death_delay >= 0.0) {
                return invalid(format!(
                    "template {name}: spawn_delay and death_delay cannot be negative"
                ));
            }
        }

        let curve = &self.difficulty;
        if curve.max_concurrent_cap < curve.base_max_concurrent || curve.base_max_concurrent == 0 {
            return invalid("max_concurrent_cap must be >= base_max_concurrent >= 1");
        }
        if curve.kills_cap < curve.base_kills || curve.base_kills == 0 {
            return invalid("kills_cap must be >= base_kills >= 1");
        }
        if !(curve.min_spawn_interval > 0.0)
            || curve.base_spawn_interval < curve.min_spawn_interval
        {
            return invalid("base_spawn_interval must be >= min_spawn_interval > 0");
        }
        if !(curve.spawn_interval_decay >= 0.0)
            || !(curve.health_step >= 0.0)
            || !(curve.speed_step >= 0.0)
            || !(curve.inter_round_pause >= 0.0)
        {
            return invalid("round steps, decay and pause cannot be negative");
        }
        Ok(())
    }
}

fn invalid(reason: impl Into<String>) -> Result<(), ConfigError> {
    Err(ConfigError::Invalid(reason.into()))
}
