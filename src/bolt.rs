// Lightning bolt node: growth frontier, owned segments and branch handles

use ::rand as external_rand;
use external_rand::Rng;

use crate::arena::BoltId;
use crate::config::SimulationConfig;
use crate::geometry::{Point, Segment};
use crate::particle::Particle;
use crate::random::{chance, gaussian, uniform};

/// What steers a bolt's growth.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Heading {
    /// Grow toward a fixed destination.
    Target(Point),
    /// Wander around a fixed mean angle.
    Directional { mean_angle: f32 },
}

/// Lifecycle of a bolt.
///
/// `Growing` bolts extend their frontier each step. `Settled` bolts no longer
/// grow but keep their segments and branches until those have all decayed.
/// A bolt whose lifetime runs out settles with its own segments cleared.
/// `Expired` bolts have no segments or branches left and are ready to drop.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Growing,
    Settled,
    Expired,
}

#[derive(Clone, Debug)]
pub struct Bolt {
    pub segments: Vec<Segment>,
    pub branches: Vec<BoltId>,
    pub previous_point: Point,
    pub heading: Heading,
    pub survival_probability: f32,
    pub growth_buffer: f32,
    pub phase: Phase,
    pub reached_target: bool,
    pub remaining_ms: Option<f32>,
    /// Generation: 0 for roots, parent + 1 for branches.
    pub depth: u32,
}

impl Bolt {
    fn new(start: Point, heading: Heading, survival_probability: f32, depth: u32) -> Self {
        Self {
            segments: Vec::new(),
            branches: Vec::new(),
            previous_point: start,
            heading,
            survival_probability,
            growth_buffer: 0.0,
            phase: Phase::Growing,
            reached_target: false,
            remaining_ms: None,
            depth,
        }
    }

    /// Root bolt heading for `target`.
    pub fn toward(start: Point, target: Point) -> Self {
        Self::new(start, Heading::Target(target), 1.0, 0)
    }

    /// Root bolt wandering around `mean_angle`.
    pub fn directional(start: Point, mean_angle: f32, survival_probability: f32) -> Self {
        Self::new(
            start,
            Heading::Directional { mean_angle },
            survival_probability,
            0,
        )
    }

    /// Root bolt for the configured growth mode, with its lifetime drawn.
    pub fn root<R: Rng + ?Sized>(
        rng: &mut R,
        start: Point,
        heading: Heading,
        config: &SimulationConfig,
    ) -> Self {
        let mut bolt = Self::new(start, heading, config.survival_probability, 0);
        bolt.remaining_ms = draw_lifetime(rng, config);
        bolt
    }

    pub fn is_growing(&self) -> bool {
        self.phase == Phase::Growing
    }

    pub fn is_expired(&self) -> bool {
        self.phase == Phase::Expired
    }

    pub fn target(&self) -> Option<Point> {
        match self.heading {
            Heading::Target(target) => Some(target),
            Heading::Directional { .. } => None,
        }
    }

    fn may_branch(&self, config: &SimulationConfig) -> bool {
        config.branching_chance > 0.0 && config.max_depth.map_or(true, |cap| self.depth < cap)
    }

    /// One fixed step of this bolt's own lifecycle. Branch subtrees must have
    /// been stepped (and expired ones pruned) before this is called.
    ///
    /// New branches are pushed to `spawned`; the caller files them under this
    /// bolt. Sparks go to `particles`.
    pub fn advance<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
        config: &SimulationConfig,
        spawned: &mut Vec<Bolt>,
        particles: &mut Vec<Particle>,
    ) {
        if self.is_expired() {
            return;
        }

        let dt = config.timestep_ms;
        for segment in &mut self.segments {
            segment.update(dt);
        }
        self.segments.retain(|s| s.alive);

        if let Some(remaining) = self.remaining_ms.as_mut() {
            *remaining -= dt;
            if *remaining <= 0.0 {
                // Own trail goes with the lifetime; branches drain on their own clocks
                self.segments.clear();
                self.phase = Phase::Settled;
            }
        }

        if self.phase == Phase::Settled {
            if self.segments.is_empty() && self.branches.is_empty() {
                self.phase = Phase::Expired;
            }
            return;
        }

        if let Heading::Directional { .. } = self.heading {
            if !chance(rng, self.survival_probability) {
                self.phase = Phase::Settled;
                return;
            }
        }

        self.growth_buffer += config.segments_per_step;
        while self.growth_buffer >= 1.0 {
            self.growth_buffer -= 1.0;
            if !self.emit_segment(rng, config, spawned, particles) {
                break;
            }
        }
    }

    /// Extend the frontier by one segment. Returns false once growth is over.
    fn emit_segment<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
        config: &SimulationConfig,
        spawned: &mut Vec<Bolt>,
        particles: &mut Vec<Particle>,
    ) -> bool {
        let from = self.previous_point;
        let (mean_angle, remaining_distance) = match self.heading {
            Heading::Target(target) => {
                let distance = from.distance_to(target);
                if distance <= config.max_length {
                    self.segments.push(Segment::between(
                        from,
                        target,
                        config.primitive,
                        config.segment_lifetime_ms,
                    ));
                    self.previous_point = target;
                    self.reached_target = true;
                    self.phase = Phase::Settled;
                    return false;
                }
                (from.angle_to(target), distance)
            }
            Heading::Directional { mean_angle } => (mean_angle, 0.0),
        };

        let heading = gaussian(rng, mean_angle, config.angular_stddev);
        let length = uniform(rng, config.min_length, config.max_length);
        let segment = Segment::grow(
            from,
            heading,
            length,
            config.primitive,
            config.segment_lifetime_ms,
        );
        let next = segment.to;
        self.segments.push(segment);

        if config.particles_active() && chance(rng, config.particle_chance) {
            particles.push(Particle::spawn(rng, next, heading, config));
        }

        if self.may_branch(config) {
            for side in [1.0f32, -1.0] {
                if chance(rng, config.branching_chance) {
                    let angle = mean_angle + side * config.branching_angle_mean;
                    spawned.push(self.branch(rng, from, angle, remaining_distance, config));
                }
            }
        }

        self.previous_point = next;
        true
    }

    fn branch<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        from: Point,
        angle: f32,
        remaining_distance: f32,
        config: &SimulationConfig,
    ) -> Bolt {
        let heading = match self.heading {
            Heading::Target(_) => Heading::Target(
                from.project(angle, remaining_distance * config.branching_length_modifier),
            ),
            Heading::Directional { .. } => Heading::Directional { mean_angle: angle },
        };
        let mut child = Bolt::new(
            from,
            heading,
            self.survival_probability * config.branching_survivability_modifier,
            self.depth + 1,
        );
        child.remaining_ms = draw_lifetime(rng, config);
        child
    }
}

fn draw_lifetime<R: Rng + ?Sized>(rng: &mut R, config: &SimulationConfig) -> Option<f32> {
    config
        .bolt_lifetime
        .map(|life| life.constant_ms + rng.gen::<f32>() * life.variable_ms)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{GrowthMode, Lifetime};
    use external_rand::rngs::StdRng;
    use external_rand::SeedableRng;

    fn quiet_config() -> SimulationConfig {
        SimulationConfig {
            branching_chance: 0.0,
            particles_enabled: false,
            ..Default::default()
        }
    }

    fn step(bolt: &mut Bolt, rng: &mut StdRng, config: &SimulationConfig) -> Vec<Bolt> {
        let mut spawned = Vec::new();
        let mut particles = Vec::new();
        bolt.advance(rng, config, &mut spawned, &mut particles);
        spawned
    }

    #[test]
    fn test_short_strike_finishes_in_one_segment() {
        let config = quiet_config();
        let mut rng = StdRng::seed_from_u64(1);
        let target = Point::new(4.0, 0.0);
        let mut bolt = Bolt::toward(Point::new(0.0, 0.0), target);
        step(&mut bolt, &mut rng, &config);
        assert_eq!(bolt.segments.len(), 1);
        assert_eq!(bolt.segments[0].to, target);
        assert!(bolt.reached_target);
        assert_eq!(bolt.phase, Phase::Settled);
    }

    #[test]
    fn test_growth_buffer_accumulates_fractions() {
        let config = SimulationConfig {
            segments_per_step: 0.5,
            ..quiet_config()
        };
        let mut rng = StdRng::seed_from_u64(2);
        let mut bolt = Bolt::toward(Point::new(0.0, 0.0), Point::new(1_000.0, 0.0));
        step(&mut bolt, &mut rng, &config);
        assert_eq!(bolt.segments.len(), 0);
        assert_eq!(bolt.growth_buffer, 0.5);
        step(&mut bolt, &mut rng, &config);
        assert_eq!(bolt.segments.len(), 1);
        assert_eq!(bolt.growth_buffer, 0.0);
    }

    #[test]
    fn test_target_distance_never_increases() {
        let config = SimulationConfig {
            max_length: 8.0,
            angular_stddev: 0.2,
            segment_lifetime_ms: Some(1.0e9),
            ..quiet_config()
        };
        let mut rng = StdRng::seed_from_u64(3);
        let target = Point::new(1_000.0, 0.0);
        let mut bolt = Bolt::toward(Point::new(0.0, 0.0), target);
        let mut last = bolt.previous_point.distance_to(target);
        let mut steps = 0;
        while bolt.is_growing() {
            step(&mut bolt, &mut rng, &config);
            let now = bolt.previous_point.distance_to(target);
            assert!(now <= last + 1e-3, "step {}: {} > {}", steps, now, last);
            last = now;
            steps += 1;
            assert!(steps < 10_000, "bolt never reached its target");
        }
        assert!(bolt.reached_target);
        assert_eq!(bolt.previous_point, target);
    }

    #[test]
    fn test_settled_bolt_expires_once_drained() {
        let config = quiet_config();
        let mut rng = StdRng::seed_from_u64(4);
        let mut bolt = Bolt::toward(Point::new(0.0, 0.0), Point::new(3.0, 0.0));
        step(&mut bolt, &mut rng, &config);
        assert_eq!(bolt.phase, Phase::Settled);
        // 100ms segment lifetime at 1000/60ms steps
        for _ in 0..10 {
            step(&mut bolt, &mut rng, &config);
        }
        assert!(bolt.segments.is_empty());
        assert_eq!(bolt.phase, Phase::Expired);
    }

    #[test]
    fn test_settled_bolt_waits_for_branches() {
        let config = quiet_config();
        let mut rng = StdRng::seed_from_u64(5);
        let mut bolt = Bolt::toward(Point::new(0.0, 0.0), Point::new(3.0, 0.0));
        bolt.branches.push(BoltId::from_raw(42));
        for _ in 0..20 {
            step(&mut bolt, &mut rng, &config);
        }
        assert!(bolt.segments.is_empty());
        assert_eq!(bolt.phase, Phase::Settled);
    }

    #[test]
    fn test_directional_bolt_dies_on_failed_survival() {
        let config = SimulationConfig {
            mode: GrowthMode::Directional,
            ..quiet_config()
        };
        let mut rng = StdRng::seed_from_u64(6);
        let mut bolt = Bolt::directional(Point::new(0.0, 0.0), 0.3, 0.0);
        step(&mut bolt, &mut rng, &config);
        assert!(bolt.segments.is_empty());
        assert_eq!(bolt.phase, Phase::Settled);
    }

    #[test]
    fn test_lifetime_countdown_expires_bolt() {
        let config = SimulationConfig {
            mode: GrowthMode::Directional,
            survival_probability: 1.0,
            segment_lifetime_ms: None,
            bolt_lifetime: Some(Lifetime {
                constant_ms: 40.0,
                variable_ms: 0.0,
            }),
            ..quiet_config()
        };
        let mut rng = StdRng::seed_from_u64(7);
        let mut bolt = Bolt::root(
            &mut rng,
            Point::new(0.0, 0.0),
            Heading::Directional { mean_angle: 0.0 },
            &config,
        );
        assert_eq!(bolt.remaining_ms, Some(40.0));
        let mut steps = 0;
        while !bolt.is_expired() {
            step(&mut bolt, &mut rng, &config);
            steps += 1;
        }
        assert_eq!(steps, 3);
        assert!(bolt.segments.is_empty());
    }

    #[test]
    fn test_lifetime_end_waits_for_branches() {
        let config = SimulationConfig {
            mode: GrowthMode::Directional,
            survival_probability: 1.0,
            segment_lifetime_ms: None,
            ..quiet_config()
        };
        let mut rng = StdRng::seed_from_u64(8);
        let mut bolt = Bolt::directional(Point::new(0.0, 0.0), 0.0, 1.0);
        bolt.remaining_ms = Some(20.0);
        bolt.branches.push(BoltId::from_raw(42));
        step(&mut bolt, &mut rng, &config);
        assert_eq!(bolt.segments.len(), 2);
        step(&mut bolt, &mut rng, &config);
        assert!(bolt.segments.is_empty());
        assert_eq!(bolt.phase, Phase::Settled);
        assert!(!bolt.is_growing());
        bolt.branches.clear();
        step(&mut bolt, &mut rng, &config);
        assert_eq!(bolt.phase, Phase::Expired);
    }

    #[test]
    fn test_branch_survival_decays_per_generation() {
        let config = SimulationConfig {
            mode: GrowthMode::Directional,
            survival_probability: 1.0,
            branching_chance: 1.0,
            branching_survivability_modifier: 0.5,
            segments_per_step: 1.0,
            bolt_lifetime: Some(Lifetime {
                constant_ms: 1_000.0,
                variable_ms: 0.0,
            }),
            particles_enabled: false,
            ..Default::default()
        };
        let mut rng = StdRng::seed_from_u64(8);
        let mut root = Bolt::root(
            &mut rng,
            Point::new(0.0, 0.0),
            Heading::Directional { mean_angle: 0.0 },
            &config,
        );
        let children = step(&mut root, &mut rng, &config);
        assert_eq!(children.len(), 2);
        for mut child in children {
            assert_eq!(child.survival_probability, 0.5);
            assert_eq!(child.depth, 1);
            assert_eq!(child.previous_point, Point::new(0.0, 0.0));
            // child may fail its own survival roll; grandchildren only exist if it grew
            for grandchild in step(&mut child, &mut rng, &config) {
                assert_eq!(grandchild.survival_probability, 0.25);
                assert_eq!(grandchild.depth, 2);
            }
        }
    }

    #[test]
    fn test_branches_split_around_mean_angle() {
        let config = SimulationConfig {
            mode: GrowthMode::Directional,
            branching_chance: 1.0,
            segments_per_step: 1.0,
            particles_enabled: false,
            ..Default::default()
        };
        let mut rng = StdRng::seed_from_u64(9);
        let mut root = Bolt::directional(Point::new(0.0, 0.0), 1.0, 1.0);
        let children = step(&mut root, &mut rng, &config);
        let angles: Vec<f32> = children
            .iter()
            .map(|c| match c.heading {
                Heading::Directional { mean_angle } => mean_angle,
                Heading::Target(_) => panic!("branch lost its mode"),
            })
            .collect();
        assert_eq!(angles.len(), 2);
        assert!((angles[0] - (1.0 + config.branching_angle_mean)).abs() < 1e-6);
        assert!((angles[1] - (1.0 - config.branching_angle_mean)).abs() < 1e-6);
    }

    #[test]
    fn test_target_branch_aims_at_scaled_sub_target() {
        let config = SimulationConfig {
            branching_chance: 1.0,
            segments_per_step: 1.0,
            particles_enabled: false,
            ..Default::default()
        };
        let mut rng = StdRng::seed_from_u64(10);
        let start = Point::new(0.0, 0.0);
        let mut root = Bolt::toward(start, Point::new(1_000.0, 0.0));
        let children = step(&mut root, &mut rng, &config);
        assert_eq!(children.len(), 2);
        for child in &children {
            let sub_target = child.target().unwrap();
            assert!((start.distance_to(sub_target) - 200.0).abs() < 1e-2);
            assert!((start.angle_to(sub_target).abs() - config.branching_angle_mean).abs() < 1e-4);
        }
    }

    #[test]
    fn test_particles_spawn_at_segment_end() {
        let config = SimulationConfig {
            branching_chance: 0.0,
            particle_chance: 1.0,
            segments_per_step: 1.0,
            ..Default::default()
        };
        let mut rng = StdRng::seed_from_u64(11);
        let mut bolt = Bolt::toward(Point::new(0.0, 0.0), Point::new(500.0, 0.0));
        let mut spawned = Vec::new();
        let mut particles = Vec::new();
        bolt.advance(&mut rng, &config, &mut spawned, &mut particles);
        assert_eq!(particles.len(), 1);
        assert_eq!(particles[0].position, bolt.segments[0].to);
    }
}
