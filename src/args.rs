use std::path::PathBuf;

use clap::Parser;

#[derive(Parser)]
#[clap(about = "Headless zombie horde run: one survivor, rounds of zombies.")]
pub struct Opt {
    /// Encounter config in RON, the built-in street layout when absent.
    #[clap(short, long)]
    pub config: Option<PathBuf>,
    /// Overrides the config seed.
    #[clap(short, long)]
    pub seed: Option<u32>,
    /// Stop once this round is cleared.
    #[clap(short, long, default_value_t = 3)]
    pub rounds: u32,
    #[clap(short, long, default_value_t = 4.0)]
    pub time_scale: f32,
    /// Simulation ticks per second of game time.
    #[clap(long, default_value_t = 60.0)]
    pub tick_hz: f64,
    #[clap(long, default_value = "info,game=debug")]
    pub log_filter: String,
}
