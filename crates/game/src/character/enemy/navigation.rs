use bevy::math::Vec3;


/// Moves one agent toward a destination.
///
/// How the path is found is up to the implementation; the enemy only hands
/// out destinations and speeds and reads back where it ended up.
pub trait Navigation: Send + Sync {
    fn set_destination(&mut self, destination: Vec3);

    /// Current speed, drives the walk/run animation blend.
    fn velocity_magnitude(&self) -> f32;

    fn position(&self) -> Vec3;

    /// Teleports without moving through the world, used when spawning.
    fn warp(&mut self, position: Vec3);

    /// Zero freezes the agent in place.
    fn set_speed(&mut self, speed: f32);

    /// Forgets the destination.
    fn stop(&mut self);

    fn step(&mut self, delta: f32);
}

/// Straight line toward the destination, stopping short of it.
#[derive(Debug, Clone)]
pub struct DirectNavigation {
    position: Vec3,
    destination: Option<Vec3>,
    speed: f32,
    velocity: Vec3,
    stopping_distance: f32,
}

impl DirectNavigation {
    pub fn new(stopping_distance: f32) -> Self {
        Self {
            position: Vec3::ZERO,
            destination: None,
            speed: 0.0,
            velocity: Vec3::ZERO,
            stopping_distance: stopping_distance.max(0.0),
        }
    }

    pub fn destination(&self) -> Option<Vec3> {
        self.destination
    }
}

impl Navigation for DirectNavigation {
    fn set_destination(&mut self, destination: Vec3) {
        self.destination = Some(destination);
    }

    fn velocity_magnitude(&self) -> f32 {
        self.velocity.length()
    }

    fn position(&self) -> Vec3 {
        self.position
    }

    fn warp(&mut self, position: Vec3) {
        self.position = position;
        self.velocity = Vec3::ZERO;
    }

    fn set_speed(&mut self, speed: f32) {
        self.speed = speed.max(0.0);
    }

    fn stop(&mut self) {
        self.destination = None;
        self.velocity = Vec3::ZERO;
    }

    fn step(&mut self, delta: f32) {
        self.velocity = Vec3::ZERO;
        let Some(destination) = self.destination else {
            return;
        };
        if delta <= 0.0 || self.speed <= 0.0 {
            return;
        }

        let offset = destination - self.position;
        let distance = offset.length();
        if distance <= self.stopping_distance {
            return;
        }

        let travel = (self.speed * delta).min(distance - self.stopping_distance);
        let direction = offset / distance;
        self.position += direction * travel;
        self.velocity = direction * (travel / delta);
    }
}
