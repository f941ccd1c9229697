use std::time::Duration;

use bevy::time::{Timer, TimerMode};

/// Converts a simulation delta to a tick duration. Negative and non-finite
/// deltas advance nothing.
pub fn tick_duration(seconds: f32) -> Duration {
    Duration::try_from_secs_f32(seconds.max(0.0)).unwrap_or_default()
}

/// A one-shot wait of `seconds`, negative delays finish on the first tick.
pub fn once(seconds: f32) -> Timer {
    Timer::new(tick_duration(seconds), TimerMode::Once)
}

// UI FUNCTION

pub fn calculate_time_remaining_seconds(timer: &Timer) -> f32 {
    if timer.finished() || timer.paused() {
        return 0.0;
    }
    timer.remaining_secs().ceil()
}
