use std::sync::Mutex;

use bevy::prelude::*;

use crate::config::EncounterConfig;
use crate::encounter::{Encounter, EncounterBuilder, NavigationFactory};
use crate::presentation::{EncounterSignal, SignalQueue};
use crate::round::RoundTelemetry;


/// Everything the encounter announced during the last fixed tick.
#[derive(Event, Debug, Clone, PartialEq)]
pub struct EncounterEvent(pub EncounterSignal);

pub struct ZombieEncounterPlugin {
    config: EncounterConfig,
    tick_hz: f64,
    speed_signals: bool,
    navigation: Mutex<Option<NavigationFactory>>,
}

impl ZombieEncounterPlugin {
    pub fn new(config: EncounterConfig) -> Self {
        Self {
            config,
            tick_hz: 60.0,
            speed_signals: false,
            navigation: Mutex::new(None),
        }
    }

    /// Rate of the fixed simulation tick, 60 Hz unless set.
    pub fn with_tick_hz(mut self, tick_hz: f64) -> Self {
        self.tick_hz = tick_hz;
        self
    }

    /// Also forward the per-tick speed cue of every zombie.
    pub fn with_speed_signals(mut self) -> Self {
        self.speed_signals = true;
        self
    }

    pub fn with_navigation(self, factory: NavigationFactory) -> Self {
        if let Ok(mut navigation) = self.navigation.lock() {
            *navigation = Some(factory);
        }
        self
    }
}

impl Plugin for ZombieEncounterPlugin {
    fn build(&self, app: &mut App) {
        let mut signals = SignalQueue::new();
        if self.speed_signals {
            signals = signals.with_speed_signals();
        }

        let mut builder = EncounterBuilder::new(self.config.clone())
            .with_score(signals.clone())
            .with_presentation(signals.clone());
        if let Some(navigation) = self.navigation.lock().ok().and_then(|mut n| n.take()) {
            builder = builder.with_navigation(navigation);
        }

        match builder.build() {
            Ok(encounter) => {
                info!(
                    "zombie encounter ready: {} pooled zombies, {} spawn points",
                    encounter.agents().capacity(),
                    encounter.spawn_points().len()
                );
                app.insert_resource(encounter);
            }
            Err(err) => error!("zombie encounter disabled: {}", err),
        }

        app.insert_resource(Time::<Fixed>::from_hz(self.tick_hz));
        app.insert_resource(signals);
        app.init_resource::<RoundTelemetry>();
        app.add_event::<EncounterEvent>();

        app.add_systems(
            FixedUpdate,
            (
                encounter_tick_system,
                forward_encounter_signals.after(encounter_tick_system),
                update_round_telemetry.after(forward_encounter_signals),
            ),
        );
    }
}

pub fn encounter_tick_system(time: Res<Time>, encounter: Option<ResMut<Encounter>>) {
    let Some(mut encounter) = encounter else {
        return;
    };
    encounter.tick(time.delta_secs());
}

pub fn forward_encounter_signals(
    signals: Res<SignalQueue>,
    mut events: EventWriter<EncounterEvent>,
) {
    for signal in signals.drain() {
        events.send(EncounterEvent(signal));
    }
}

pub fn update_round_telemetry(
    encounter: Option<Res<Encounter>>,
    mut telemetry: ResMut<RoundTelemetry>,
) {
    if let Some(encounter) = encounter {
        *telemetry = encounter.telemetry();
    }
}
