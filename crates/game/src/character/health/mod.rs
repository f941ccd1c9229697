use serde::{Deserialize, Serialize};


#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HealthConfig {
    pub max: f32,
}

/// Hit points, always kept inside `0..=max`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Health {
    current: f32,
    max: f32,
}

impl From<HealthConfig> for Health {
    fn from(value: HealthConfig) -> Self {
       Self::new(value.max)
    }
}

impl Health {
    pub fn new(max: f32) -> Self {
        let max = max.max(0.0);
        Self { current: max, max }
    }

    pub fn current(&self) -> f32 {
        self.current
    }

    pub fn max(&self) -> f32 {
        self.max
    }

    pub fn is_depleted(&self) -> bool {
        self.current <= 0.0
    }

    /// Removes `amount`, never going below zero. Returns the damage actually taken.
    pub fn damage(&mut self, amount: f32) -> f32 {
        let before = self.current;
        self.current = (self.current - amount.max(0.0)).max(0.0);
        before - self.current
    }

    pub fn heal(&mut self, amount: f32) {
        self.current = (self.current + amount.max(0.0)).min(self.max);
    }

    pub fn refill(&mut self) {
        self.current = self.max;
    }

    /// Changes the maximum, clamping the current value into the new range.
    pub fn set_max(&mut self, max: f32) {
        self.max = max.max(0.0);
        self.current = self.current.min(self.max);
    }

    /// Only for setting up a wounded state, the value is clamped to `0..=max`.
    pub fn set_current(&mut self, current: f32) {
        self.current = current.clamp(0.0, self.max);
    }
}
