pub mod rng;
pub mod timer;
