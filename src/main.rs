mod args;

use std::f32::consts::TAU;
use std::time::Duration;

use bevy::app::ScheduleRunnerPlugin;
use bevy::log::LogPlugin;
use bevy::prelude::*;
use clap::Parser;

use game::character::enemy::spawning::SpawnPoint;
use game::character::player::target::TargetId;
use game::character::player::{Player, PlayerConfig};
use game::config::EncounterConfig;
use game::encounter::Encounter;
use game::error::ConfigError;
use game::plugins::{encounter_tick_system, EncounterEvent, ZombieEncounterPlugin};
use game::presentation::EncounterSignal;
use game::round::RoundTelemetry;
use utils::timer::{once, tick_duration};

use args::Opt;


/// The gun of the lone survivor standing at the origin.
#[derive(Resource)]
struct Survivor {
    target: TargetId,
    cooldown: Timer,
    fire_delay: f32,
    damage: f32,
    reach: f32,
}

#[derive(Resource)]
struct RunLimits {
    rounds: u32,
}

fn main() -> AppExit {
    let opt = Opt::parse();

    let mut app = App::new();
    app.add_plugins(
        MinimalPlugins.set(ScheduleRunnerPlugin::run_loop(Duration::from_secs_f64(1.0 / 60.0))),
    )
    .add_plugins(LogPlugin { filter: opt.log_filter.clone(), ..default() });

    let mut config = match load_config(&opt) {
        Ok(config) => config,
        Err(err) => {
            error!("{}", err);
            return AppExit::error();
        }
    };
    if opt.seed.is_some() {
        config.seed = opt.seed;
    }

    let tick_hz = if opt.tick_hz > 0.0 { opt.tick_hz } else { 60.0 };
    app.add_plugins(ZombieEncounterPlugin::new(config).with_tick_hz(tick_hz));

    let Some(mut encounter) = app.world_mut().get_resource_mut::<Encounter>() else {
        return AppExit::error();
    };
    let player = Player::new(PlayerConfig::default(), Vec3::ZERO);
    let target = encounter.add_target(Box::new(player));

    app.world_mut()
        .resource_mut::<Time<Virtual>>()
        .set_relative_speed(opt.time_scale.max(0.0));
    app.insert_resource(Survivor {
        target,
        cooldown: once(0.0),
        fire_delay: 0.5,
        damage: 25.0,
        reach: 20.0,
    })
    .insert_resource(RunLimits { rounds: opt.rounds.max(1) })
    .add_systems(FixedUpdate, survivor_fire_system.before(encounter_tick_system))
    .add_systems(Update, (report_encounter_events, open_yard_system, stop_run_system));

    app.run()
}

fn load_config(opt: &Opt) -> Result<EncounterConfig, ConfigError> {
    match &opt.config {
        Some(path) => EncounterConfig::load(path),
        None => Ok(street_layout()),
    }
}

/// Eight points on a ring around the survivor: five on the street, three in
/// the yard that opens on round 3.
fn street_layout() -> EncounterConfig {
    let spawn_points = (0..8)
        .map(|i| {
            let angle = TAU * i as f32 / 8.0;
            let position = Vec3::new(angle.cos(), 0.0, angle.sin()) * 25.0;
            let point = SpawnPoint::new(position);
            if i < 5 {
                point.in_zone("street")
            } else {
                point.in_zone("yard").disabled()
            }
        })
        .collect();

    EncounterConfig { spawn_points, ..default() }
}

fn survivor_fire_system(
    time: Res<Time>,
    mut survivor: ResMut<Survivor>,
    encounter: Option<ResMut<Encounter>>,
) {
    let Some(mut encounter) = encounter else {
        return;
    };

    if !survivor.cooldown.tick(tick_duration(time.delta_secs())).finished() {
        return;
    }

    let Some(position) = encounter
        .target(survivor.target)
        .filter(|player| player.is_alive())
        .map(|player| player.current_position())
    else {
        return;
    };

    let nearest = encounter
        .agents()
        .iter_active()
        .filter(|(_, zombie)| zombie.is_hittable())
        .map(|(id, zombie)| (id, zombie.position().distance(position)))
        .filter(|(_, distance)| *distance <= survivor.reach)
        .min_by(|a, b| a.1.total_cmp(&b.1));

    if let Some((id, _)) = nearest {
        encounter.take_damage(id, survivor.damage);
        survivor.cooldown = once(survivor.fire_delay);
    }
}

fn report_encounter_events(
    mut events: EventReader<EncounterEvent>,
    telemetry: Res<RoundTelemetry>,
) {
    for EncounterEvent(signal) in events.read() {
        match signal {
            EncounterSignal::Round { round } => info!(
                "== round {} == {} kills needed, next wave in {}s",
                round, telemetry.kills_required, telemetry.pause_seconds_left
            ),
            EncounterSignal::Die { agent, active: true } => debug!(
                "zombie {:?} down, {} killed, {} alive",
                agent, telemetry.zombies_killed, telemetry.zombies_alive
            ),
            _ => {}
        }
    }
}

fn open_yard_system(
    telemetry: Res<RoundTelemetry>,
    encounter: Option<ResMut<Encounter>>,
    mut opened: Local<bool>,
) {
    let Some(mut encounter) = encounter else {
        return;
    };
    if !*opened && telemetry.round_number >= 3 {
        let count = encounter.set_zone_enabled("yard", true);
        info!("yard gate broken, {} more spawn points", count);
        *opened = true;
    }
}

fn stop_run_system(
    telemetry: Res<RoundTelemetry>,
    limits: Res<RunLimits>,
    survivor: Res<Survivor>,
    encounter: Option<Res<Encounter>>,
    mut exit: EventWriter<AppExit>,
) {
    let Some(encounter) = encounter else {
        exit.send(AppExit::error());
        return;
    };

    if encounter.target(survivor.target).map_or(true, |player| !player.is_alive()) {
        warn!(
            "survivor overrun on round {} after {} kills",
            telemetry.round_number, telemetry.zombies_killed
        );
        exit.send(AppExit::Success);
    } else if telemetry.round_number > limits.rounds {
        info!(
            "survived {} rounds, {} zombies killed in {} ticks",
            limits.rounds, telemetry.zombies_killed, telemetry.frame
        );
        exit.send(AppExit::Success);
    }
}
