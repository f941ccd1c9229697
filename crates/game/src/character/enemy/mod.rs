pub mod config;
pub mod navigation;
pub mod spawning;

use bevy::log::debug;
use bevy::math::{Quat, Vec3};
use bevy::time::Timer;
use serde::{Deserialize, Serialize};
use utils::timer::{once, tick_duration};

use crate::character::health::Health;
use crate::character::player::target::{TargetId, TargetRegistry};
use crate::pool::{PoolId, Poolable};
use crate::presentation::EnemyPresentation;
use crate::round::RoundGrowth;

use config::{AttackStats, EnemyTemplate, TemplateId};
use navigation::Navigation;


pub type AgentId = PoolId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum EnemyState {
    /// Parked in the pool.
    #[default]
    Inactive,
    /// Climbing out, frozen and unhittable until the spawn delay elapses.
    Spawning,
    Pursuing,
    /// In range of the target, biting every `attack_delay`.
    Attacking,
    /// Corpse on display until the death delay elapses.
    Dying,
}

/// What the owner has to do after a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgentTick {
    Continue,
    /// Death display is over, the instance goes back to the pool.
    Despawn,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DamageOutcome {
    /// Not hittable right now: parked, spawning or already dying.
    Ignored,
    Wounded,
    Killed { points: u32 },
}

/// Collaborators an agent needs during its tick.
pub struct AgentContext<'a> {
    pub targets: &'a mut TargetRegistry,
    pub presentation: &'a mut dyn EnemyPresentation,
}

pub struct EnemyAgent {
    template_id: TemplateId,
    health: Health,
    base_speed: f32,
    current_speed: f32,
    state: EnemyState,
    stats: AttackStats,
    // Spawn delay while spawning, death display while dying.
    phase: Option<Timer>,
    attack: Option<Timer>,
    target: Option<TargetId>,
    collision_enabled: bool,
    facing: Quat,
    navigation: Box<dyn Navigation>,
}

impl EnemyAgent {
    pub fn new(
        template_id: TemplateId,
        template: &EnemyTemplate,
        navigation: Box<dyn Navigation>,
    ) -> Self {
        let mut agent = Self {
            template_id,
            health: Health::new(template.max_health),
            base_speed: template.speed.max(0.0),
            current_speed: 0.0,
            state: EnemyState::Inactive,
            stats: template.into(),
            phase: None,
            attack: None,
            target: None,
            collision_enabled: true,
            facing: Quat::IDENTITY,
            navigation,
        };
        agent.navigation.set_speed(0.0);
        agent
    }

    pub fn template_id(&self) -> TemplateId {
        self.template_id
    }

    pub fn state(&self) -> EnemyState {
        self.state
    }

    pub fn health(&self) -> &Health {
        &self.health
    }

    /// Direct access for collaborators that heal or pre-wound; `Health` keeps
    /// the value inside `0..=max` whatever they do.
    pub fn health_mut(&mut self) -> &mut Health {
        &mut self.health
    }

    pub fn base_speed(&self) -> f32 {
        self.base_speed
    }

    pub fn current_speed(&self) -> f32 {
        self.current_speed
    }

    pub fn position(&self) -> Vec3 {
        self.navigation.position()
    }

    pub fn facing(&self) -> Quat {
        self.facing
    }

    pub fn collision_enabled(&self) -> bool {
        self.collision_enabled
    }

    pub fn current_target(&self) -> Option<TargetId> {
        self.target
    }

    /// Seconds until the next bite, zero when not attacking.
    pub fn attack_remaining(&self) -> f32 {
        self.attack.as_ref().map_or(0.0, Timer::remaining_secs)
    }

    /// Counts toward the concurrent cap: out of the pool and not dying.
    pub fn is_alive(&self) -> bool {
        matches!(self.state, EnemyState::Spawning | EnemyState::Pursuing | EnemyState::Attacking)
    }

    /// Can take damage.
    pub fn is_hittable(&self) -> bool {
        matches!(self.state, EnemyState::Pursuing | EnemyState::Attacking)
    }

    /// `Inactive -> Spawning`. Returns `false` if the agent was already out.
    pub fn activate(
        &mut self,
        id: AgentId,
        position: Vec3,
        facing: Quat,
        targets: &TargetRegistry,
        presentation: &mut dyn EnemyPresentation,
    ) -> bool {
        if self.state != EnemyState::Inactive {
            return false;
        }

        let stale = self
            .target
            .and_then(|target| targets.get(target))
            .map_or(true, |target| !target.is_alive());
        if stale {
            self.target = targets.primary();
        }

        self.state = EnemyState::Spawning;
        self.health.refill();
        self.current_speed = 0.0;
        self.collision_enabled = true;
        self.facing = facing;
        self.attack = None;
        self.phase = Some(once(self.stats.spawn_delay));
        self.navigation.warp(position);
        self.navigation.stop();
        self.navigation.set_speed(0.0);

        presentation.spawn(id, true);
        debug!("zombie {:?} spawning at {:?}", id, position);
        true
    }

    /// Ignored while parked in the pool. Returns whether the target was set.
    pub fn set_target(&mut self, target: Option<TargetId>) -> bool {
        if self.state == EnemyState::Inactive {
            return false;
        }
        self.target = target;
        true
    }

    pub fn take_damage(
        &mut self,
        id: AgentId,
        amount: f32,
        presentation: &mut dyn EnemyPresentation,
    ) -> DamageOutcome {
        if !self.is_hittable() {
            return DamageOutcome::Ignored;
        }

        self.health.damage(amount);
        if !self.health.is_depleted() {
            return DamageOutcome::Wounded;
        }

        self.die(id, presentation);
        DamageOutcome::Killed { points: self.stats.kill_points }
    }

    fn die(&mut self, id: AgentId, presentation: &mut dyn EnemyPresentation) {
        self.state = EnemyState::Dying;
        self.current_speed = 0.0;
        self.collision_enabled = false;
        self.attack = None;
        self.phase = Some(once(self.stats.death_delay));
        self.navigation.set_speed(0.0);
        self.navigation.stop();

        presentation.attack(id, false);
        presentation.die(id, true);
        debug!("zombie {:?} killed", id);
    }

    pub fn tick(&mut self, id: AgentId, delta: f32, ctx: &mut AgentContext) -> AgentTick {
        let outcome = match self.state {
            EnemyState::Inactive => return AgentTick::Continue,
            EnemyState::Spawning => {
                self.tick_spawning(id, delta, ctx);
                AgentTick::Continue
            }
            EnemyState::Pursuing | EnemyState::Attacking => {
                self.tick_hunting(id, delta, ctx);
                AgentTick::Continue
            }
            EnemyState::Dying => self.tick_dying(delta),
        };

        ctx.presentation.speed(id, self.navigation.velocity_magnitude());
        outcome
    }

    fn tick_spawning(&mut self, id: AgentId, delta: f32, ctx: &mut AgentContext) {
        self.navigation.set_speed(0.0);
        if !self.tick_phase(delta) {
            return;
        }

        self.phase = None;
        self.state = EnemyState::Pursuing;
        self.current_speed = self.base_speed;
        self.navigation.set_speed(self.current_speed);
        ctx.presentation.spawn(id, false);
    }

    fn tick_hunting(&mut self, id: AgentId, delta: f32, ctx: &mut AgentContext) {
        let target = self
            .target
            .and_then(|target| ctx.targets.get_mut(target))
            .filter(|target| target.is_alive());

        // No one to chase: hold position.
        let Some(target) = target else {
            self.navigation.stop();
            self.navigation.step(delta);
            if self.state == EnemyState::Attacking {
                self.leave_attack(id, ctx.presentation);
            }
            return;
        };

        let target_position = target.current_position();
        self.navigation.set_destination(target_position);
        self.navigation.step(delta);

        let distance = self.navigation.position().distance(target_position);
        let in_range = distance <= self.stats.damage_range;
        match (self.state, in_range) {
            (EnemyState::Pursuing, false) => return,
            (EnemyState::Attacking, false) => {
                self.leave_attack(id, ctx.presentation);
                return;
            }
            (EnemyState::Pursuing, true) => {
                self.state = EnemyState::Attacking;
                self.attack = Some(once(self.stats.attack_delay));
                ctx.presentation.attack(id, true);
            }
            _ => {}
        }

        let Some(attack) = self.attack.as_mut() else {
            return;
        };
        if attack.tick(tick_duration(delta)).finished() {
            target.take_damage(self.stats.damage_amount);
            *attack = once(self.stats.attack_delay);
        }
    }

    fn leave_attack(&mut self, id: AgentId, presentation: &mut dyn EnemyPresentation) {
        self.state = EnemyState::Pursuing;
        self.attack = None;
        presentation.attack(id, false);
    }

    fn tick_dying(&mut self, delta: f32) -> AgentTick {
        if self.tick_phase(delta) {
            AgentTick::Despawn
        } else {
            AgentTick::Continue
        }
    }

    /// Advances the spawn or death wait. A missing wait counts as over.
    fn tick_phase(&mut self, delta: f32) -> bool {
        self.phase
            .as_mut()
            .map_or(true, |phase| phase.tick(tick_duration(delta)).finished())
    }

    /// Grows max health and base speed by one round step, never past the caps
    /// and never shrinking. Parked agents come back at full health.
    pub fn apply_round_growth(&mut self, growth: &RoundGrowth) {
        let max = self.health.max();
        self.health.set_max(max.max((max + growth.health_step).min(growth.health_cap)));
        let speed = (self.base_speed + growth.speed_step).min(growth.speed_cap);
        self.base_speed = self.base_speed.max(speed);

        if self.state == EnemyState::Inactive {
            self.health.refill();
        }
    }
}

impl Poolable for EnemyAgent {
    fn on_release(&mut self) {
        self.state = EnemyState::Inactive;
        self.health.refill();
        self.current_speed = 0.0;
        self.collision_enabled = true;
        self.phase = None;
        self.attack = None;
        self.navigation.stop();
        self.navigation.set_speed(0.0);
    }
}
