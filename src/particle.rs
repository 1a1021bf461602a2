use ::rand as external_rand;
use external_rand::Rng;

use crate::config::SimulationConfig;
use crate::geometry::Point;

/// Spark thrown off a growing bolt. Flies along its spawn heading, slowing
/// every step, until its lifetime runs out.
#[derive(Clone, Debug)]
pub struct Particle {
    pub position: Point,
    pub angle: f32,
    pub speed: f32,
    pub remaining_ms: f32,
    pub alive: bool,
}

impl Particle {
    pub fn new(position: Point, angle: f32, speed: f32, lifetime_ms: f32) -> Self {
        Self {
            position,
            angle,
            speed,
            remaining_ms: lifetime_ms,
            alive: lifetime_ms > 0.0,
        }
    }

    pub fn spawn<R: Rng + ?Sized>(
        rng: &mut R,
        position: Point,
        angle: f32,
        config: &SimulationConfig,
    ) -> Self {
        let speed = config.particle_constant_speed + rng.gen::<f32>() * config.particle_variable_speed;
        let lifetime = config.particle_constant_lifetime_ms
            + rng.gen::<f32>() * config.particle_variable_lifetime_ms;
        Self::new(position, angle, speed, lifetime)
    }

    /// Advance one step of `dt_ms`; `deceleration` is applied per step and
    /// the speed bottoms out at zero instead of reversing.
    pub fn update(&mut self, dt_ms: f32, deceleration: f32) {
        if !self.alive {
            return;
        }
        self.remaining_ms -= dt_ms;
        if self.remaining_ms <= 0.0 {
            self.alive = false;
            return;
        }
        self.position = self
            .position
            .translate(self.speed * self.angle.cos(), self.speed * self.angle.sin());
        self.speed = (self.speed - deceleration).max(0.0);
    }
}
