//! The simulation context that owns one encounter: the zombie pool, the
//! spawn scheduler, the round controller, the damage targets and the
//! outbound hooks. One `tick` advances all of them in a fixed order.

use bevy::ecs::system::Resource;
use bevy::log::{debug, warn};
use utils::rng::RollbackRng;
use utils::timer::calculate_time_remaining_seconds;

use crate::character::enemy::config::{EnemyTemplate, TemplateId};
use crate::character::enemy::navigation::{DirectNavigation, Navigation};
use crate::character::enemy::spawning::{SpawnPoint, SpawnScheduler};
use crate::character::enemy::{
    AgentContext, AgentId, AgentTick, DamageOutcome, EnemyAgent, EnemyState,
};
use crate::character::player::target::{DamageTarget, TargetId, TargetRegistry};
use crate::config::EncounterConfig;
use crate::error::ConfigError;
use crate::frame::FrameCount;
use crate::pool::ObjectPool;
use crate::presentation::{EnemyPresentation, NoPresentation, PointTally, ScoreSink};
use crate::round::{RoundController, RoundTelemetry};


/// Builds the navigation capability of each pooled zombie.
pub type NavigationFactory =
    Box<dyn FnMut(TemplateId, &EnemyTemplate) -> Box<dyn Navigation> + Send + Sync>;

pub struct EncounterBuilder {
    config: EncounterConfig,
    navigation: Option<NavigationFactory>,
    score: Option<Box<dyn ScoreSink>>,
    presentation: Option<Box<dyn EnemyPresentation>>,
}

impl EncounterBuilder {
    pub fn new(config: EncounterConfig) -> Self {
        Self { config, navigation: None, score: None, presentation: None }
    }

    pub fn with_navigation(mut self, factory: NavigationFactory) -> Self {
        self.navigation = Some(factory);
        self
    }

    pub fn with_score(mut self, score: impl ScoreSink + 'static) -> Self {
        self.score = Some(Box::new(score));
        self
    }

    pub fn with_presentation(mut self, presentation: impl EnemyPresentation + 'static) -> Self {
        self.presentation = Some(Box::new(presentation));
        self
    }

    /// Validates the config and pre-builds every zombie. Pool slots are laid
    /// out template by template.
    pub fn build(self) -> Result<Encounter, ConfigError> {
        let config = self.config;
        config.validate()?;

        let mut navigation = self.navigation.unwrap_or_else(|| Box::new(direct_navigation));

        let per_template = config.pool_size_per_template;
        let agents = ObjectPool::from_factory(config.pool_capacity(), |index| {
            let template_id = TemplateId(index / per_template);
            let template = &config.templates[template_id.0];
            EnemyAgent::new(template_id, template, navigation(template_id, template))
        });

        let weights = config.templates.iter().map(|t| t.weight).collect();
        let rng = RollbackRng::from_seed_or_entropy(config.seed);
        debug!("encounter rng seed {}", rng.seed);

        let mut presentation = self.presentation.unwrap_or_else(|| Box::new(NoPresentation));
        let rounds = RoundController::new(config.difficulty.clone());
        presentation.round(*rounds.state().round_number());

        Ok(Encounter {
            agents,
            scheduler: SpawnScheduler::new(config.spawn_points.clone(), weights, rng),
            rounds,
            targets: TargetRegistry::default(),
            score: self.score.unwrap_or_else(|| Box::new(PointTally::default())),
            presentation,
            frame: FrameCount::default(),
            despawned: Vec::new(),
            warned_no_target: false,
        })
    }
}

fn direct_navigation(_: TemplateId, template: &EnemyTemplate) -> Box<dyn Navigation> {
    Box::new(DirectNavigation::new(template.stopping_distance))
}

#[derive(Resource)]
pub struct Encounter {
    agents: ObjectPool<EnemyAgent>,
    scheduler: SpawnScheduler,
    rounds: RoundController,
    targets: TargetRegistry,
    score: Box<dyn ScoreSink>,
    presentation: Box<dyn EnemyPresentation>,
    frame: FrameCount,
    despawned: Vec<AgentId>,
    warned_no_target: bool,
}

impl Encounter {
    pub fn builder(config: EncounterConfig) -> EncounterBuilder {
        EncounterBuilder::new(config)
    }

    /// Advances the whole encounter by `delta` seconds. Every agent is updated
    /// before the scheduler looks at the cap, so despawns of this tick free
    /// their slots for it.
    pub fn tick(&mut self, delta: f32) {
        if !delta.is_finite() || delta < 0.0 {
            return;
        }

        self.frame.advance();
        self.targets.tick(delta);
        self.check_targets();

        let mut ctx = AgentContext {
            targets: &mut self.targets,
            presentation: self.presentation.as_mut(),
        };
        for (id, agent) in self.agents.iter_active_mut() {
            if agent.tick(id, delta, &mut ctx) == AgentTick::Despawn {
                self.despawned.push(id);
            }
        }
        for id in self.despawned.drain(..) {
            self.presentation.die(id, false);
            self.agents.release(id);
            debug!("zombie {:?} back in the pool", id);
        }

        self.rounds.tick(delta);
        let _ = self.scheduler.tick(
            delta,
            &mut self.agents,
            &self.rounds,
            &self.targets,
            self.presentation.as_mut(),
        );
    }

    fn check_targets(&mut self) {
        if !self.targets.is_empty() {
            self.warned_no_target = false;
            return;
        }
        if !self.warned_no_target && self.agents.active_count() > 0 {
            warn!("no damage target registered, zombies will hold position");
            self.warned_no_target = true;
        }
    }

    /// Damage from outside (weapons). Awards points and counts the kill when
    /// it is lethal; stale or unhittable agents ignore it.
    pub fn take_damage(&mut self, agent: AgentId, amount: f32) -> DamageOutcome {
        if !self.agents.is_active(agent) {
            return DamageOutcome::Ignored;
        }
        let Some(zombie) = self.agents.get_mut(agent) else {
            return DamageOutcome::Ignored;
        };

        let outcome = zombie.take_damage(agent, amount, self.presentation.as_mut());
        if let DamageOutcome::Killed { points } = outcome {
            self.score.add_points(points);
            if let Some(round) = self.rounds.on_kill(&mut self.agents) {
                self.presentation.round(round);
            }
        }
        outcome
    }

    pub fn set_target(&mut self, agent: AgentId, target: Option<TargetId>) -> bool {
        if !self.agents.is_active(agent) {
            return false;
        }
        self.agents.get_mut(agent).is_some_and(|zombie| zombie.set_target(target))
    }

    /// `None` for parked agents, whatever they chased in their last life.
    pub fn current_target(&self, agent: AgentId) -> Option<TargetId> {
        if !self.agents.is_active(agent) {
            return None;
        }
        self.agents.get(agent).and_then(EnemyAgent::current_target)
    }

    /// Registers a target. Zombies already out with nobody alive to chase
    /// pick it up when it is the primary target.
    pub fn add_target(&mut self, target: Box<dyn DamageTarget>) -> TargetId {
        let id = self.targets.add(target);
        let primary = self.targets.primary();
        for (_, zombie) in self.agents.iter_active_mut() {
            let stale = zombie
                .current_target()
                .and_then(|t| self.targets.get(t))
                .map_or(true, |t| !t.is_alive());
            if stale {
                zombie.set_target(primary);
            }
        }
        id
    }

    pub fn remove_target(&mut self, id: TargetId) -> Option<Box<dyn DamageTarget>> {
        self.targets.remove(id)
    }

    pub fn target(&self, id: TargetId) -> Option<&dyn DamageTarget> {
        self.targets.get(id)
    }

    pub fn set_spawn_point_enabled(&mut self, index: usize, enabled: bool) -> bool {
        self.scheduler.set_spawn_point_enabled(index, enabled)
    }

    pub fn set_zone_enabled(&mut self, zone: &str, enabled: bool) -> usize {
        let count = self.scheduler.set_zone_enabled(zone, enabled);
        let change = if enabled { "opened" } else { "closed" };
        debug!("zone {} {}: {} spawn points", zone, change, count);
        count
    }

    pub fn add_spawn_point(&mut self, point: SpawnPoint) -> usize {
        self.scheduler.add_spawn_point(point)
    }

    pub fn spawn_points(&self) -> &[SpawnPoint] {
        self.scheduler.spawn_points()
    }

    pub fn agents(&self) -> &ObjectPool<EnemyAgent> {
        &self.agents
    }

    pub fn agent(&self, id: AgentId) -> Option<&EnemyAgent> {
        self.agents.get(id)
    }

    pub fn rounds(&self) -> &RoundController {
        &self.rounds
    }

    pub fn scheduler(&self) -> &SpawnScheduler {
        &self.scheduler
    }

    pub fn frame(&self) -> u32 {
        self.frame.frame
    }

    pub fn alive_count(&self) -> u32 {
        SpawnScheduler::alive_count(&self.agents)
    }

    pub fn telemetry(&self) -> RoundTelemetry {
        let state = self.rounds.state();
        RoundTelemetry {
            round_number: *state.round_number(),
            zombies_alive: self.alive_count(),
            zombies_killed: *state.total_kills(),
            kills_this_round: *state.kills_this_round(),
            kills_required: *state.kills_required(),
            paused: self.rounds.is_paused(),
            pause_seconds_left: self
                .rounds
                .pause_timer()
                .map_or(0.0, calculate_time_remaining_seconds),
            frame: self.frame.frame,
        }
    }

    /// Sends one zombie straight back to the pool, cancelling its timers.
    /// Not a kill: no points, no round progress. Presentation gets the same
    /// cues as a corpse leaving after its death display.
    pub fn deactivate(&mut self, agent: AgentId) -> bool {
        let attacking = self
            .agents
            .get(agent)
            .is_some_and(|zombie| zombie.state() == EnemyState::Attacking);
        if !self.agents.release(agent) {
            return false;
        }

        if attacking {
            self.presentation.attack(agent, false);
        }
        self.presentation.die(agent, false);
        true
    }

    /// Scene teardown. Returns how many zombies were out.
    pub fn deactivate_all(&mut self) -> usize {
        let out: Vec<AgentId> = self.agents.iter_active().map(|(id, _)| id).collect();
        let released = out.into_iter().filter(|id| self.deactivate(*id)).count();
        debug!("{} zombies sent back to the pool", released);
        released
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::PoolId;
    use crate::presentation::{EncounterSignal, SignalQueue};
    use crate::round::DifficultyCurve;
    use crate::test_support::Dummy;
    use bevy::math::Vec3;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    const DT: f32 = 1.0 / 60.0;

    fn config() -> EncounterConfig {
        EncounterConfig {
            seed: Some(7),
            spawn_points: vec![
                SpawnPoint::new(Vec3::new(30.0, 0.0, 0.0)),
                SpawnPoint::new(Vec3::new(-30.0, 0.0, 0.0)),
                SpawnPoint::new(Vec3::new(0.0, 0.0, 30.0)).in_zone("yard").disabled(),
            ],
            ..Default::default()
        }
    }

    /// One spawn point already in biting range of a player at the origin,
    /// and one zombie out at a time.
    fn close_quarters() -> EncounterConfig {
        EncounterConfig {
            spawn_points: vec![SpawnPoint::new(Vec3::new(1.5, 0.0, 0.0))],
            difficulty: DifficultyCurve {
                base_max_concurrent: 1,
                concurrent_step: 0,
                ..Default::default()
            },
            ..config()
        }
    }

    fn run(encounter: &mut Encounter, seconds: f32) {
        let ticks = (seconds / DT).round() as usize;
        for _ in 0..ticks {
            encounter.tick(DT);
        }
    }

    /// Kills every hittable zombie, returns how many died.
    fn kill_all(encounter: &mut Encounter) -> usize {
        let hittable: Vec<AgentId> = encounter
            .agents()
            .iter_active()
            .filter(|(_, z)| z.is_hittable())
            .map(|(id, _)| id)
            .collect();
        hittable
            .into_iter()
            .filter(|id| {
                matches!(encounter.take_damage(*id, 10_000.0), DamageOutcome::Killed { .. })
            })
            .count()
    }

    #[test]
    fn test_build_prefills_pool_per_template() {
        let mut config = config();
        config.templates.push(EnemyTemplate {
            name: "runner".into(),
            speed: 2.0,
            ..Default::default()
        });
        let encounter = Encounter::builder(config).build().expect("valid config");

        assert_eq!(encounter.agents().capacity(), 48);
        assert_eq!(encounter.agents().active_count(), 0);
        assert_eq!(encounter.agent(PoolId(23)).unwrap().template_id(), TemplateId(0));
        assert_eq!(encounter.agent(PoolId(24)).unwrap().template_id(), TemplateId(1));
        assert_eq!(encounter.agent(PoolId(24)).unwrap().base_speed(), 2.0);
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let config = EncounterConfig { pool_size_per_template: 0, ..config() };
        assert!(matches!(Encounter::builder(config).build(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_navigation_factory_is_used() {
        let built = Arc::new(AtomicUsize::new(0));
        let counter = built.clone();
        let factory: NavigationFactory =
            Box::new(move |_: TemplateId, template: &EnemyTemplate| -> Box<dyn Navigation> {
                counter.fetch_add(1, Ordering::Relaxed);
                Box::new(DirectNavigation::new(template.stopping_distance))
            });
        let encounter = Encounter::builder(config()).with_navigation(factory).build().unwrap();
        assert_eq!(built.load(Ordering::Relaxed), encounter.agents().capacity());
    }

    #[test]
    fn test_zombies_spawn_and_chase_the_player() {
        let mut encounter = Encounter::builder(config()).build().unwrap();
        let player = encounter.add_target(Box::new(Dummy::at(Vec3::ZERO)));

        encounter.tick(DT);
        let (id, zombie) = encounter.agents().iter_active().next().expect("first tick spawns");
        assert_eq!(zombie.state(), EnemyState::Spawning);
        assert_eq!(encounter.current_target(id), Some(player));
        let start = zombie.position();

        run(&mut encounter, 3.0);
        let zombie = encounter.agent(id).unwrap();
        assert_eq!(zombie.state(), EnemyState::Pursuing);
        assert!(
            zombie.position().length() < start.length(),
            "Zombie should close in on the player."
        );
    }

    // Ten kills reach round 2 and every pooled zombie grows.
    #[test]
    fn test_ten_kills_advance_round() {
        let queue = SignalQueue::new();
        let mut encounter = Encounter::builder(config())
            .with_presentation(queue.clone())
            .with_score(queue.clone())
            .build()
            .unwrap();
        encounter.add_target(Box::new(Dummy::at(Vec3::ZERO)));

        let mut kills = 0;
        while kills < 10 {
            run(&mut encounter, 1.0);
            kills += kill_all(&mut encounter);
            assert!(encounter.frame() < 60 * 120, "round 1 should be cleared within two minutes");
        }
        assert_eq!(kills, 10, "The cap never lets more than the quota spawn.");

        let telemetry = encounter.telemetry();
        assert_eq!(telemetry.round_number, 2);
        assert_eq!(telemetry.zombies_killed, 10);
        assert_eq!(telemetry.kills_required, 16);
        assert!(telemetry.paused);
        assert_eq!(telemetry.pause_seconds_left, 2.0, "1.5s pause shows as 2 whole seconds.");
        assert_eq!(*encounter.rounds().state().max_concurrent_enemies(), 9);
        assert!((encounter.rounds().state().spawn_interval() - 1.9).abs() < 1e-5);
        for (_, zombie) in encounter.agents().iter() {
            assert_eq!(zombie.health().max(), 115.0);
        }

        let signals = queue.drain();
        let points: u32 = signals
            .iter()
            .filter_map(|s| match s {
                EncounterSignal::Points { amount } => Some(*amount),
                _ => None,
            })
            .sum();
        assert_eq!(points, 600, "60 points per kill.");
        assert!(signals.contains(&EncounterSignal::Round { round: 1 }));
        assert!(signals.contains(&EncounterSignal::Round { round: 2 }));
    }

    #[test]
    fn test_pause_blocks_spawning_until_it_ends() {
        let mut encounter = Encounter::builder(config()).build().unwrap();
        encounter.add_target(Box::new(Dummy::at(Vec3::ZERO)));
        let mut kills = 0;
        while kills < 10 {
            run(&mut encounter, 1.0);
            kills += kill_all(&mut encounter);
        }

        let spawned = encounter.scheduler().spawned_total();
        run(&mut encounter, 1.0);
        assert_eq!(encounter.scheduler().spawned_total(), spawned, "No spawns during the pause.");
        // 0.5s of pause left, then at most one full 2.0s interval.
        run(&mut encounter, 3.0);
        assert!(
            encounter.scheduler().spawned_total() > spawned,
            "Spawning resumes after the pause."
        );
    }

    #[test]
    fn test_alive_zombies_never_exceed_cap() {
        let mut encounter = Encounter::builder(config()).build().unwrap();
        encounter.add_target(Box::new(Dummy::at(Vec3::ZERO)));

        for second in 0..240 {
            for _ in 0..60 {
                encounter.tick(DT);
                assert!(encounter.alive_count() <= encounter.rounds().spawn_cap());
                let pool = encounter.agents();
                assert_eq!(pool.active_count() + pool.inactive_count(), pool.capacity());
            }
            if second % 3 == 0 {
                kill_all(&mut encounter);
            }
        }
        let round = *encounter.rounds().state().round_number();
        assert!(round > 2, "Kills should have moved rounds along.");
    }

    #[test]
    fn test_disabled_points_stall_until_zone_opens() {
        let mut config = config();
        for point in &mut config.spawn_points {
            point.enabled = false;
        }
        let mut encounter = Encounter::builder(config).build().unwrap();
        encounter.add_target(Box::new(Dummy::at(Vec3::ZERO)));

        run(&mut encounter, 5.0);
        assert_eq!(encounter.agents().active_count(), 0);

        assert_eq!(encounter.set_zone_enabled("yard", true), 1);
        encounter.tick(DT);
        let (_, zombie) = encounter.agents().iter_active().next().expect("zone opened, zombie out");
        assert_eq!(zombie.position(), Vec3::new(0.0, 0.0, 30.0));
    }

    #[test]
    fn test_dead_zombie_returns_to_pool_after_display() {
        let queue = SignalQueue::new();
        let mut encounter =
            Encounter::builder(config()).with_presentation(queue.clone()).build().unwrap();
        encounter.add_target(Box::new(Dummy::at(Vec3::ZERO)));
        encounter.tick(DT);
        let (id, _) = encounter.agents().iter_active().next().unwrap();
        run(&mut encounter, 1.5);

        assert_eq!(encounter.take_damage(id, 500.0), DamageOutcome::Killed { points: 60 });
        assert_eq!(encounter.take_damage(id, 500.0), DamageOutcome::Ignored);
        assert_eq!(encounter.telemetry().zombies_killed, 1, "A corpse cannot be killed twice.");

        run(&mut encounter, 2.9);
        assert_eq!(encounter.agent(id).unwrap().state(), EnemyState::Dying);
        run(&mut encounter, 0.2);
        let reused = encounter.agent(id).is_some_and(|z| z.state() == EnemyState::Spawning);
        assert!(!encounter.agents().is_active(id) || reused);
        assert!(queue.drain().contains(&EncounterSignal::Die { agent: id, active: false }));
    }

    #[test]
    fn test_zombies_bite_the_player() {
        let mut config = config();
        config.spawn_points = vec![SpawnPoint::new(Vec3::new(3.0, 0.0, 0.0))];
        let mut encounter = Encounter::builder(config).build().unwrap();
        let player = Dummy::at(Vec3::ZERO);
        encounter.add_target(Box::new(player.clone()));

        // 1.4s out of the ground, 1s to walk in range, first bite 2s later.
        run(&mut encounter, 4.0);
        assert!(player.hits().is_empty(), "No bite before the attack delay.");
        run(&mut encounter, 2.0);
        assert_eq!(player.hits(), vec![10.0], "One bite per attack delay, not one per tick.");
    }

    #[test]
    fn test_no_target_warns_once_and_recovers() {
        let mut encounter = Encounter::builder(config()).build().unwrap();
        run(&mut encounter, 2.0);
        assert!(encounter.warned_no_target);
        let (id, zombie) = encounter.agents().iter_active().next().unwrap();
        let held = zombie.position();
        assert_eq!(encounter.current_target(id), None);

        run(&mut encounter, 1.0);
        assert_eq!(
            encounter.agent(id).unwrap().position(),
            held,
            "Nobody to chase, zombie holds position."
        );

        let player = encounter.add_target(Box::new(Dummy::at(Vec3::ZERO)));
        assert_eq!(
            encounter.current_target(id),
            Some(player),
            "Idle zombies pick up the new target."
        );
        encounter.tick(DT);
        assert!(!encounter.warned_no_target);
    }

    #[test]
    fn test_removed_target_is_dropped_until_a_new_one_arrives() {
        let mut encounter = Encounter::builder(config()).build().unwrap();
        let player = encounter.add_target(Box::new(Dummy::at(Vec3::ZERO)));
        run(&mut encounter, 2.0);
        let (id, _) = encounter.agents().iter_active().next().unwrap();

        assert!(encounter.remove_target(player).is_some());
        assert!(encounter.target(player).is_none());
        encounter.tick(DT);
        assert!(encounter.warned_no_target);
        let held = encounter.agent(id).unwrap().position();
        run(&mut encounter, 1.0);
        assert_eq!(encounter.agent(id).unwrap().position(), held);

        let survivor = encounter.add_target(Box::new(Dummy::at(Vec3::new(0.0, 0.0, 5.0))));
        assert_ne!(survivor, player, "Target ids are never reused.");
        assert_eq!(encounter.current_target(id), Some(survivor));
    }

    #[test]
    fn test_dead_target_is_replaced_when_a_live_one_is_added() {
        let mut encounter = Encounter::builder(config()).build().unwrap();
        let first = Dummy::at(Vec3::ZERO);
        let first_id = encounter.add_target(Box::new(first.clone()));
        encounter.tick(DT);
        let (id, _) = encounter.agents().iter_active().next().unwrap();
        assert_eq!(encounter.current_target(id), Some(first_id));

        first.kill();
        let second = encounter.add_target(Box::new(Dummy::at(Vec3::new(0.0, 0.0, 5.0))));
        assert_eq!(encounter.current_target(id), Some(second), "Nobody chases a dead target.");
    }

    #[test]
    fn test_stale_agent_ids_are_ignored() {
        let mut encounter = Encounter::builder(config()).build().unwrap();
        let parked = AgentId::default();
        assert_eq!(encounter.take_damage(parked, 50.0), DamageOutcome::Ignored);
        assert!(!encounter.set_target(parked, Some(TargetId(0))));
        assert_eq!(encounter.current_target(parked), None);
        assert!(!encounter.deactivate(parked));
        assert_eq!(encounter.take_damage(PoolId(9999), 50.0), DamageOutcome::Ignored);
        assert!(!encounter.deactivate(PoolId(9999)));
    }

    #[test]
    fn test_parked_agent_reports_no_target() {
        let mut encounter = Encounter::builder(config()).build().unwrap();
        let player = encounter.add_target(Box::new(Dummy::at(Vec3::ZERO)));
        encounter.tick(DT);
        let (id, _) = encounter.agents().iter_active().next().unwrap();
        assert_eq!(encounter.current_target(id), Some(player));

        assert!(encounter.deactivate(id));
        assert_eq!(
            encounter.agent(id).and_then(EnemyAgent::current_target),
            Some(player),
            "The parked instance still remembers its last target."
        );
        assert_eq!(encounter.current_target(id), None, "Parked zombies chase nobody.");
    }

    // A zombie pulled mid-attack, then another pulled while its corpse is on
    // display. The slot comes straight back out and nothing of the earlier
    // life may fire in the new one.
    #[test]
    fn test_deactivate_cancels_pending_bite_and_despawn() {
        let queue = SignalQueue::new();
        let mut encounter = Encounter::builder(close_quarters())
            .with_presentation(queue.clone())
            .build()
            .unwrap();
        let player = Dummy::at(Vec3::ZERO);
        let player_id = encounter.add_target(Box::new(player.clone()));

        // Out at 1.4s, attacking right away, first bite due at ~3.4s.
        run(&mut encounter, 1.5);
        let (id, zombie) = encounter.agents().iter_active().next().unwrap();
        assert_eq!(zombie.state(), EnemyState::Attacking);

        assert!(encounter.deactivate(id));
        assert!(!encounter.agents().is_active(id));
        assert!(!encounter.deactivate(id), "Second deactivate is a no-op.");

        // Spawn timer fires at 2.0s and hands the same slot back out.
        run(&mut encounter, 3.0);
        assert!(encounter.agents().is_active(id), "Lowest free slot is reused.");
        assert_eq!(encounter.agents().active_count(), 1);
        assert_eq!(encounter.agent(id).unwrap().state(), EnemyState::Attacking);
        assert_eq!(encounter.current_target(id), Some(player_id));
        assert!(player.hits().is_empty(), "The cancelled bite never lands.");

        // Corpse would leave at ~7.5s.
        assert_eq!(encounter.take_damage(id, 500.0), DamageOutcome::Killed { points: 60 });
        assert!(encounter.deactivate(id));
        run(&mut encounter, 4.0);

        assert!(encounter.agents().is_active(id), "The old despawn never releases the new zombie.");
        assert_eq!(encounter.agent(id).unwrap().state(), EnemyState::Attacking);
        assert_eq!(encounter.telemetry().zombies_killed, 1, "Deactivation is not a kill.");
        assert_eq!(player.hits(), vec![10.0], "Only the third zombie got a bite in.");

        let signals = queue.drain();
        let releases = signals
            .iter()
            .filter(|s| **s == EncounterSignal::Die { agent: id, active: false })
            .count();
        assert_eq!(releases, 2, "One release cue per deactivation, none from a stale timer.");
        assert!(signals.contains(&EncounterSignal::Attack { agent: id, active: false }));
    }

    #[test]
    fn test_deactivate_all_cancels_everything() {
        let mut encounter = Encounter::builder(config()).build().unwrap();
        encounter.add_target(Box::new(Dummy::at(Vec3::ZERO)));
        run(&mut encounter, 8.0);
        let out = encounter.agents().active_count();
        assert!(out > 0);

        assert_eq!(encounter.deactivate_all(), out);
        assert_eq!(encounter.agents().active_count(), 0);
        for (_, zombie) in encounter.agents().iter() {
            assert_eq!(zombie.state(), EnemyState::Inactive);
            assert_eq!(zombie.attack_remaining(), 0.0, "No timer survives teardown.");
        }
        assert_eq!(encounter.telemetry().zombies_killed, 0, "Teardown is not a kill.");
    }

    #[test]
    fn test_deactivate_all_clears_death_cues() {
        let queue = SignalQueue::new();
        let mut encounter = Encounter::builder(config())
            .with_presentation(queue.clone())
            .build()
            .unwrap();
        encounter.add_target(Box::new(Dummy::at(Vec3::ZERO)));
        run(&mut encounter, 5.0);
        assert!(kill_all(&mut encounter) > 0);
        let out: Vec<AgentId> = encounter.agents().iter_active().map(|(id, _)| id).collect();
        queue.drain();

        assert_eq!(encounter.deactivate_all(), out.len());
        let signals = queue.drain();
        for id in out {
            assert!(
                signals.contains(&EncounterSignal::Die { agent: id, active: false }),
                "zombie {:?} left without its release cue",
                id
            );
        }
    }

    #[test]
    fn test_bad_delta_is_ignored() {
        let mut encounter = Encounter::builder(config()).build().unwrap();
        encounter.tick(f32::NAN);
        encounter.tick(-1.0);
        assert_eq!(encounter.frame(), 0);
        assert_eq!(encounter.agents().active_count(), 0);
    }
}
