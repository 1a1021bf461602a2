//! Procedural lightning: bolts that grow segment by segment along a
//! Gaussian-perturbed random walk, fork into branches, throw off sparks and
//! fade away.
//!
//! The crate owns the simulation only. A renderer walks the live storm through
//! [`render::Renderer`] and draws whatever [`geometry::Drawable`]s it is handed.
//!
//! ```no_run
//! use lightning::{Point, Simulation, SimulationConfig};
//! use rand::SeedableRng;
//!
//! let mut rng = rand::rngs::StdRng::seed_from_u64(7);
//! let mut sim = Simulation::with_config(SimulationConfig::default()).unwrap();
//! sim.strike(&mut rng, Point::new(800.0, 500.0));
//! for frame in 0..60 {
//!     sim.advance(frame as f64 * 1000.0 / 60.0, &mut rng);
//! }
//! let frame = sim.frame();
//! println!("{} drawables", frame.drawable_count());
//! ```

pub mod arena;
pub mod bolt;
pub mod clock;
pub mod config;
pub mod error;
pub mod geometry;
pub mod particle;
pub mod random;
pub mod render;
pub mod simulation;

pub use bolt::{Bolt, Heading, Phase};
pub use config::{GrowthMode, Lifetime, Primitive, SimulationConfig};
pub use error::ConfigError;
pub use geometry::{Drawable, Point, Segment};
pub use particle::Particle;
pub use render::{Frame, Renderer};
pub use simulation::{Simulation, Stats};
