use serde::Serialize;

/// Simulation ticks since the encounter was built.
#[derive(Default, Hash, Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct FrameCount {
    pub frame: u32,
}

impl FrameCount {
    pub fn advance(&mut self) -> u32 {
        self.frame = self.frame.wrapping_add(1);
        self.frame
    }
}
