use bevy::log::debug;
use bevy::math::{Quat, Vec3};
use bevy::time::Timer;
use serde::{Deserialize, Serialize};
use utils::rng::RollbackRng;
use utils::timer::{once, tick_duration};

use crate::character::player::target::TargetRegistry;
use crate::pool::ObjectPool;
use crate::presentation::EnemyPresentation;
use crate::round::RoundController;

use super::config::TemplateId;
use super::{AgentId, EnemyAgent};


/// Where a zombie can climb out. Toggled by the map (doors bought, areas
/// entered); the scheduler only reads it.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct SpawnPoint {
    pub position: Vec3,
    #[serde(default)]
    pub rotation: Quat,
    #[serde(default = "enabled_by_default")]
    pub enabled: bool,
    /// Area the point belongs to, switched as a group.
    #[serde(default)]
    pub zone: Option<String>,
}

fn enabled_by_default() -> bool {
    true
}

impl SpawnPoint {
    pub fn new(position: Vec3) -> Self {
        Self {
            position,
            rotation: Quat::IDENTITY,
            enabled: true,
            zone: None,
        }
    }

    pub fn in_zone(mut self, zone: impl Into<String>) -> Self {
        self.zone = Some(zone.into());
        self
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }
}

/// Why a tick did not spawn anything. Only used for logging and tests,
/// none of these is an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpawnSkip {
    Paused,
    AtCap,
    Waiting,
    NoSpawnPoint,
    PoolExhausted,
}

pub struct SpawnScheduler {
    spawn_points: Vec<SpawnPoint>,
    template_weights: Vec<u32>,
    timer: Timer,
    rng: RollbackRng,
    spawned_total: u32,
}

impl SpawnScheduler {
    /// The timer starts expired: the first zombie comes on the first tick.
    pub fn new(
        spawn_points: Vec<SpawnPoint>,
        template_weights: Vec<u32>,
        rng: RollbackRng,
    ) -> Self {
        Self {
            spawn_points,
            template_weights,
            timer: once(0.0),
            rng,
            spawned_total: 0,
        }
    }

    pub fn spawn_points(&self) -> &[SpawnPoint] {
        &self.spawn_points
    }

    pub fn set_spawn_point_enabled(&mut self, index: usize, enabled: bool) -> bool {
        match self.spawn_points.get_mut(index) {
            Some(point) => {
                point.enabled = enabled;
                true
            }
            None => false,
        }
    }

    /// Returns how many points belong to `zone`.
    pub fn set_zone_enabled(&mut self, zone: &str, enabled: bool) -> usize {
        let mut count = 0;
        for point in self.spawn_points.iter_mut().filter(|p| p.zone.as_deref() == Some(zone)) {
            point.enabled = enabled;
            count += 1;
        }
        count
    }

    pub fn add_spawn_point(&mut self, point: SpawnPoint) -> usize {
        self.spawn_points.push(point);
        self.spawn_points.len() - 1
    }

    pub fn spawned_total(&self) -> u32 {
        self.spawned_total
    }

    /// Zombies out of the pool and not dying.
    pub fn alive_count(agents: &ObjectPool<EnemyAgent>) -> u32 {
        agents.iter_active().filter(|(_, agent)| agent.is_alive()).count() as u32
    }

    fn pick_spawn_point(&mut self) -> Option<(Vec3, Quat)> {
        let enabled = self.spawn_points.iter().filter(|p| p.enabled).count();
        let pick = self.rng.next_index(enabled)?;
        self.spawn_points
            .iter()
            .filter(|p| p.enabled)
            .nth(pick)
            .map(|p| (p.position, p.rotation))
    }

    fn pick_template(&mut self) -> Option<TemplateId> {
        self.rng.next_weighted(&self.template_weights).map(TemplateId)
    }

    /// At most one spawn per tick, runs after every agent was updated.
    pub fn tick(
        &mut self,
        delta: f32,
        agents: &mut ObjectPool<EnemyAgent>,
        rounds: &RoundController,
        targets: &TargetRegistry,
        presentation: &mut dyn EnemyPresentation,
    ) -> Result<AgentId, SpawnSkip> {
        if rounds.is_paused() {
            return Err(SpawnSkip::Paused);
        }

        self.timer.tick(tick_duration(delta));

        if Self::alive_count(agents) >= rounds.spawn_cap() {
            return Err(SpawnSkip::AtCap);
        }
        if !self.timer.finished() {
            return Err(SpawnSkip::Waiting);
        }

        // A once timer stays finished, the next tick tries again.
        let Some((position, rotation)) = self.pick_spawn_point() else {
            return Err(SpawnSkip::NoSpawnPoint);
        };

        let interval = *rounds.state().spawn_interval();
        let template = self.pick_template();
        let acquired = template
            .and_then(|template| agents.acquire_by(|agent| agent.template_id() == template))
            .or_else(|| agents.acquire());
        let Some(id) = acquired else {
            debug!("zombie pool exhausted, spawn deferred");
            self.timer = once(interval);
            return Err(SpawnSkip::PoolExhausted);
        };

        if let Some(agent) = agents.get_mut(id) {
            agent.activate(id, position, rotation, targets, presentation);
        }
        self.timer = once(interval);
        self.spawned_total += 1;
        Ok(id)
    }
}
