//! Outbound hooks: animation cues, round display and score.
//!
//! All of them are fire-and-forget. The engine never reads anything back.

use std::sync::{Arc, Mutex};

use bevy::ecs::system::Resource;
use serde::Serialize;

use crate::pool::PoolId;


/// Animation and display cues for the zombies. Every method defaults to
/// doing nothing so implementors only pick what they render.
pub trait EnemyPresentation: Send + Sync {
    fn spawn(&mut self, _agent: PoolId, _active: bool) {}

    fn attack(&mut self, _agent: PoolId, _active: bool) {}

    fn die(&mut self, _agent: PoolId, _active: bool) {}

    fn speed(&mut self, _agent: PoolId, _speed: f32) {}

    fn round(&mut self, _round: u32) {}
}

pub trait ScoreSink: Send + Sync {
    fn add_points(&mut self, amount: u32);
}

/// Used when nothing is rendering.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoPresentation;

impl EnemyPresentation for NoPresentation {}

/// Keeps a running total.
#[derive(Debug, Default, Clone, Copy)]
pub struct PointTally {
    pub total: u64,
}

impl ScoreSink for PointTally {
    fn add_points(&mut self, amount: u32) {
        self.total += amount as u64;
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum EncounterSignal {
    Spawn { agent: PoolId, active: bool },
    Attack { agent: PoolId, active: bool },
    Die { agent: PoolId, active: bool },
    Speed { agent: PoolId, speed: f32 },
    Round { round: u32 },
    Points { amount: u32 },
}

/// Shared queue of signals, cloned into the encounter and drained by whoever
/// renders. Speed cues are high frequency and only recorded when asked for.
#[derive(Resource, Debug, Clone, Default)]
pub struct SignalQueue {
    signals: Arc<Mutex<Vec<EncounterSignal>>>,
    record_speed: bool,
}

impl SignalQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_speed_signals(mut self) -> Self {
        self.record_speed = true;
        self
    }

    pub fn push(&self, signal: EncounterSignal) {
        if let Ok(mut signals) = self.signals.lock() {
            signals.push(signal);
        }
    }

    pub fn drain(&self) -> Vec<EncounterSignal> {
        match self.signals.lock() {
            Ok(mut signals) => std::mem::take(&mut *signals),
            Err(_) => Vec::new(),
        }
    }
}

impl EnemyPresentation for SignalQueue {
    fn spawn(&mut self, agent: PoolId, active: bool) {
        self.push(EncounterSignal::Spawn { agent, active });
    }

    fn attack(&mut self, agent: PoolId, active: bool) {
        self.push(EncounterSignal::Attack { agent, active });
    }

    fn die(&mut self, agent: PoolId, active: bool) {
        self.push(EncounterSignal::Die { agent, active });
    }

    fn speed(&mut self, agent: PoolId, speed: f32) {
        if self.record_speed {
            self.push(EncounterSignal::Speed { agent, speed });
        }
    }

    fn round(&mut self, round: u32) {
        self.push(EncounterSignal::Round { round });
    }
}

impl ScoreSink for SignalQueue {
    fn add_points(&mut self, amount: u32) {
        self.push(EncounterSignal::Points { amount });
    }
}
