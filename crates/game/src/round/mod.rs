//! Kill bookkeeping and difficulty escalation.
//!
//! Every growth curve saturates: past the caps, later rounds are exactly as
//! hard as the round that first hit them.

use bevy::ecs::system::Resource;
use bevy::log::info;
use derive_getters::Getters;
use bevy::time::Timer;
use serde::{Deserialize, Serialize};
use utils::timer::{once, tick_duration};

use crate::character::enemy::EnemyAgent;
use crate::pool::ObjectPool;


#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct DifficultyCurve {
    pub base_max_concurrent: u32,
    pub concurrent_step: u32,
    pub max_concurrent_cap: u32,

    pub base_kills: u32,
    pub kills_step: u32,
    pub kills_cap: u32,

    pub base_spawn_interval: f32,
    pub spawn_interval_decay: f32,
    pub min_spawn_interval: f32,

    /// Max health added to every pooled zombie per round.
    pub health_step: f32,
    pub health_cap: f32,
    /// Base speed added to every pooled zombie per round.
    pub speed_step: f32,
    pub speed_cap: f32,

    /// Seconds without spawns after a round is cleared.
    pub inter_round_pause: f32,
}

impl Default for DifficultyCurve {
    fn default() -> Self {
        Self {
            base_max_concurrent: 6,
            concurrent_step: 3,
            max_concurrent_cap: 24,

            base_kills: 10,
            kills_step: 6,
            kills_cap: 90,

            base_spawn_interval: 2.0,
            spawn_interval_decay: 0.1,
            min_spawn_interval: 0.7,

            health_step: 15.0,
            health_cap: 300.0,
            speed_step: 0.1,
            speed_cap: 2.5,

            inter_round_pause: 1.5,
        }
    }
}

impl DifficultyCurve {
    pub fn max_concurrent_for(&self, round: u32) -> u32 {
        let grown = self
            .base_max_concurrent
            .saturating_add(round.saturating_sub(1).saturating_mul(self.concurrent_step));
        grown.min(self.max_concurrent_cap)
    }

    pub fn kills_required_for(&self, round: u32) -> u32 {
        let grown = self
            .base_kills
            .saturating_add(round.saturating_sub(1).saturating_mul(self.kills_step));
        grown.min(self.kills_cap)
    }

    pub fn spawn_interval_for(&self, round: u32) -> f32 {
        let rounds_grown = round.saturating_sub(1) as f32;
        let decayed = self.base_spawn_interval - self.spawn_interval_decay * rounds_grown;
        decayed.max(self.min_spawn_interval)
    }

    pub fn growth(&self) -> RoundGrowth {
        RoundGrowth {
            health_step: self.health_step,
            health_cap: self.health_cap,
            speed_step: self.speed_step,
            speed_cap: self.speed_cap,
        }
    }
}

/// Per-round stat growth handed to every pooled zombie.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RoundGrowth {
    pub health_step: f32,
    pub health_cap: f32,
    pub speed_step: f32,
    pub speed_cap: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Getters)]
pub struct RoundState {
    /// Starts at 1, only ever goes up.
    round_number: u32,
    kills_this_round: u32,
    kills_required: u32,
    max_concurrent_enemies: u32,
    spawn_interval: f32,
    /// Max health granted by round growth so far to a zombie below the cap.
    health_bonus: f32,
    /// Base speed granted by round growth so far to a zombie below the cap.
    speed_bonus: f32,
    total_kills: u32,
}

impl RoundState {
    fn for_round(curve: &DifficultyCurve, round_number: u32, total_kills: u32) -> Self {
        let rounds_grown = round_number.saturating_sub(1) as f32;
        Self {
            round_number,
            kills_this_round: 0,
            kills_required: curve.kills_required_for(round_number),
            max_concurrent_enemies: curve.max_concurrent_for(round_number),
            spawn_interval: curve.spawn_interval_for(round_number),
            health_bonus: curve.health_step * rounds_grown,
            speed_bonus: curve.speed_step * rounds_grown,
            total_kills,
        }
    }
}

/// Read-only numbers for the HUD.
#[derive(Resource, Debug, Clone, Default, PartialEq, Serialize)]
pub struct RoundTelemetry {
    pub round_number: u32,
    pub zombies_alive: u32,
    pub zombies_killed: u32,
    pub kills_this_round: u32,
    pub kills_required: u32,
    pub paused: bool,
    /// Whole seconds until spawning resumes, rounded up.
    pub pause_seconds_left: f32,
    pub frame: u32,
}

pub struct RoundController {
    curve: DifficultyCurve,
    state: RoundState,
    /// Running only during the breather between rounds.
    pause: Option<Timer>,
}

impl RoundController {
    pub fn new(curve: DifficultyCurve) -> Self {
        let state = RoundState::for_round(&curve, 1, 0);
        Self { curve, state, pause: None }
    }

    pub fn state(&self) -> &RoundState {
        &self.state
    }

    /// True during the breather after a round is cleared.
    pub fn is_paused(&self) -> bool {
        self.pause.is_some()
    }

    pub fn pause_timer(&self) -> Option<&Timer> {
        self.pause.as_ref()
    }

    /// How many zombies may be alive at once right now. Never more than the
    /// kills still needed, so a round does not overshoot its quota.
    pub fn spawn_cap(&self) -> u32 {
        let remaining = self.state.kills_required.saturating_sub(self.state.kills_this_round);
        self.state.max_concurrent_enemies.min(remaining)
    }

    /// Called once per zombie entering `Dying`. Returns the new round number
    /// when this kill cleared the round.
    pub fn on_kill(&mut self, agents: &mut ObjectPool<EnemyAgent>) -> Option<u32> {
        self.state.kills_this_round += 1;
        self.state.total_kills += 1;

        if self.state.kills_this_round >= self.state.kills_required {
            Some(self.advance_round(agents))
        } else {
            None
        }
    }

    /// Moves to the next round, rescales spawning and every pooled zombie,
    /// then pauses spawning for `inter_round_pause`.
    pub fn advance_round(&mut self, agents: &mut ObjectPool<EnemyAgent>) -> u32 {
        let next = self.state.round_number.saturating_add(1);
        self.state = RoundState::for_round(&self.curve, next, self.state.total_kills);

        let growth = self.curve.growth();
        for (_, agent) in agents.iter_mut() {
            agent.apply_round_growth(&growth);
        }

        self.pause = Some(once(self.curve.inter_round_pause));
        info!(
            "round {} reached: {} kills needed, {} zombies at once, spawn every {:.2}s",
            next,
            self.state.kills_required,
            self.state.max_concurrent_enemies,
            self.state.spawn_interval
        );
        next
    }

    pub fn tick(&mut self, delta: f32) {
        let Some(pause) = self.pause.as_mut() else {
            return;
        };
        if pause.tick(tick_duration(delta)).finished() {
            self.pause = None;
            info!("round {} spawning resumed", self.state.round_number);
        }
    }
}
