use ::rand as external_rand;
use external_rand::Rng;
use std::f32::consts::TAU;

use crate::arena::{BoltArena, BoltId};
use crate::bolt::{Bolt, Heading};
use crate::clock::FixedStep;
use crate::config::{GrowthMode, SimulationConfig};
use crate::error::ConfigError;
use crate::geometry::Point;
use crate::particle::Particle;
use crate::render::{walk_storm, Frame, FrameRecorder, Renderer};

// Simulation state - every live entity plus the spawn budget
#[derive(Clone, Debug, Default)]
pub struct SimulationState {
    pub bolts: BoltArena,
    pub roots: Vec<BoltId>,
    pub particles: Vec<Particle>,
    pub spawn_accumulator: f32,
    pub frame_index: u64,
}

impl SimulationState {
    pub fn new() -> Self {
        Self::default()
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Stats {
    pub roots: usize,
    pub bolts: usize,
    pub segments: usize,
    pub particles: usize,
    pub deepest_generation: u32,
    pub frame_index: u64,
}

// Simulation - contains state, config, clock and control flags
#[derive(Clone, Debug)]
pub struct Simulation {
    pub state: SimulationState,
    pub config: SimulationConfig,
    pub clock: FixedStep,
    pub paused: bool,
    pub speed_multiplier: f32,
    pub speed_accumulator: f32,
}

// Implement Deref for convenience - allows sim.roots instead of sim.state.roots
impl std::ops::Deref for Simulation {
    type Target = SimulationState;
    fn deref(&self) -> &Self::Target {
        &self.state
    }
}

impl std::ops::DerefMut for Simulation {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.state
    }
}

impl Simulation {
    pub fn new() -> Self {
        Self::build(SimulationConfig::default())
    }

    pub fn with_config(config: SimulationConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::build(config))
    }

    fn build(config: SimulationConfig) -> Self {
        Self {
            state: SimulationState::new(),
            clock: FixedStep::new(config.timestep_ms, config.max_pending_steps),
            config,
            paused: false,
            speed_multiplier: 1.0,
            speed_accumulator: 0.0,
        }
    }

    pub fn toggle_pause(&mut self) {
        self.paused = !self.paused;
    }
    pub fn increase_speed(&mut self) {
        self.speed_multiplier = (self.speed_multiplier * 1.5).min(10.0);
    }
    pub fn decrease_speed(&mut self) {
        self.speed_multiplier = (self.speed_multiplier / 1.5).max(0.1);
    }
    pub fn reset_speed(&mut self) {
        self.speed_multiplier = 1.0;
    }

    pub fn reset(&mut self) {
        self.state = SimulationState::new();
        self.clock.reset();
        self.speed_accumulator = 0.0;
    }

    /// Feed a display-refresh timestamp and run the steps it pays for.
    /// Returns the number of fixed steps executed.
    pub fn advance<R: Rng + ?Sized>(&mut self, timestamp_ms: f64, rng: &mut R) -> usize {
        let due = self.clock.tick(timestamp_ms);
        if self.paused {
            return 0;
        }

        // Speed multiplier with accumulator for fractional speeds
        self.speed_accumulator += due as f32 * self.speed_multiplier;
        let mut steps = self.speed_accumulator.floor() as usize;
        self.speed_accumulator -= steps as f32;

        // The stall limit holds after speed-up too; surplus steps are dropped
        let limit = self.config.max_pending_steps as usize;
        if steps > limit {
            log::debug!("Dropping {} sped-up steps over the {} step limit", steps - limit, limit);
            steps = limit;
        }

        for _ in 0..steps {
            self.step(rng);
        }
        steps
    }

    /// One fixed simulation step: spawn, update every entity, then prune.
    pub fn step<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.state.frame_index = self.state.frame_index.wrapping_add(1);

        self.state.spawn_accumulator += self.config.spawn_per_step;
        while self.state.spawn_accumulator >= 1.0 {
            self.state.spawn_accumulator -= 1.0;
            self.spawn_root(rng);
        }

        let state = &mut self.state;
        for &root in &state.roots {
            state
                .bolts
                .update_tree(root, rng, &self.config, &mut state.particles);
        }
        for particle in &mut state.particles {
            particle.update(self.config.timestep_ms, self.config.particle_acceleration);
        }

        self.prune();
        log::trace!(
            "step {}: {} roots, {} bolts, {} particles",
            self.state.frame_index,
            self.state.roots.len(),
            self.state.bolts.len(),
            self.state.particles.len()
        );
    }

    fn prune(&mut self) {
        let state = &mut self.state;
        let bolts = &mut state.bolts;
        state.roots.retain(|&root| {
            let expired = bolts.get(root).map_or(true, Bolt::is_expired);
            if expired {
                bolts.remove_subtree(root);
            }
            !expired
        });
        state.particles.retain(|p| p.alive);
    }

    /// Spawn a root bolt from the origin using the configured growth mode.
    pub fn spawn_root<R: Rng + ?Sized>(&mut self, rng: &mut R) -> BoltId {
        let origin = self.config.origin;
        let angle = rng.gen_range(0.0..TAU);
        match self.config.mode {
            GrowthMode::Target => {
                let target = origin.project(angle, self.config.strike_distance);
                self.insert_root(rng, origin, Heading::Target(target))
            }
            GrowthMode::Directional => {
                self.insert_root(rng, origin, Heading::Directional { mean_angle: angle })
            }
        }
    }

    /// Pointer strike: a target-seeking bolt from the origin to `target`.
    pub fn strike<R: Rng + ?Sized>(&mut self, rng: &mut R, target: Point) -> BoltId {
        let origin = self.config.origin;
        self.strike_from(rng, origin, target)
    }

    pub fn strike_from<R: Rng + ?Sized>(&mut self, rng: &mut R, start: Point, target: Point) -> BoltId {
        log::debug!(
            "Strike from ({:.1}, {:.1}) to ({:.1}, {:.1})",
            start.x,
            start.y,
            target.x,
            target.y
        );
        self.insert_root(rng, start, Heading::Target(target))
    }

    pub fn spawn_directional<R: Rng + ?Sized>(&mut self, rng: &mut R, start: Point, mean_angle: f32) -> BoltId {
        self.insert_root(rng, start, Heading::Directional { mean_angle })
    }

    fn insert_root<R: Rng + ?Sized>(&mut self, rng: &mut R, start: Point, heading: Heading) -> BoltId {
        let bolt = Bolt::root(rng, start, heading, &self.config);
        let id = self.state.bolts.insert(bolt);
        self.state.roots.push(id);
        log::debug!("Spawned root bolt {} ({:?})", id.index(), heading);
        id
    }

    pub fn render<R: Renderer + ?Sized>(&self, renderer: &mut R) {
        walk_storm(
            &self.state.bolts,
            &self.state.roots,
            &self.state.particles,
            self.config.particle_radius,
            renderer,
        );
    }

    pub fn frame(&self) -> Frame {
        let mut recorder = FrameRecorder::new(self.state.frame_index);
        self.render(&mut recorder);
        recorder.finish()
    }

    pub fn stats(&self) -> Stats {
        let mut segments = 0;
        let mut deepest_generation = 0;
        for (_, bolt) in self.state.bolts.iter() {
            segments += bolt.segments.len();
            deepest_generation = deepest_generation.max(bolt.depth);
        }
        Stats {
            roots: self.state.roots.len(),
            bolts: self.state.bolts.len(),
            segments,
            particles: self.state.particles.len(),
            deepest_generation,
            frame_index: self.state.frame_index,
        }
    }
}

impl Default for Simulation {
    fn default() -> Self {
        Self::new()
    }
}
