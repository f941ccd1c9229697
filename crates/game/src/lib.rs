pub mod character;
pub mod config;
pub mod encounter;
pub mod error;
pub mod frame;
pub mod plugins;
pub mod pool;
pub mod presentation;
pub mod round;

#[cfg(test)]
mod test_support;
