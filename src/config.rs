// Global configuration and constants

use serde::{Deserialize, Serialize};
use std::f32::consts::PI;
use std::path::Path;

use crate::error::ConfigError;
use crate::geometry::Point;

/// How root bolts find their way.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GrowthMode {
    /// Roots head for a fixed destination and stop once they reach it.
    Target,
    /// Roots wander around a mean heading until a survival roll fails or
    /// their lifetime runs out.
    Directional,
}

/// Drawable shape emitted for each bolt segment.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Primitive {
    /// Stroked line between two points.
    Line,
    /// Filled rectangle of fixed perpendicular extent.
    Ribbon { width: f32 },
}

/// `constant_ms + variable_ms * U[0, 1)` lifetime.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Lifetime {
    pub constant_ms: f32,
    pub variable_ms: f32,
}

// Configuration struct for simulation parameters
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    // Canvas / spawn geometry
    pub canvas_width: f32,
    pub canvas_height: f32,
    pub origin: Point,
    pub strike_distance: f32,

    // Clock
    pub timestep_ms: f32,
    pub max_pending_steps: u32,
    pub spawn_per_step: f32,

    // Growth
    pub mode: GrowthMode,
    pub primitive: Primitive,
    pub min_length: f32,
    pub max_length: f32,
    pub segments_per_step: f32,
    pub angular_stddev: f32,
    pub segment_lifetime_ms: Option<f32>,

    // Branching
    pub branching_chance: f32,
    pub branching_angle_mean: f32,
    pub branching_length_modifier: f32,
    pub branching_survivability_modifier: f32,
    pub max_depth: Option<u32>,

    // Directional mode lifecycle
    pub survival_probability: f32,
    pub bolt_lifetime: Option<Lifetime>,

    // Particles
    pub particles_enabled: bool,
    pub particle_chance: f32,
    pub particle_constant_speed: f32,
    pub particle_variable_speed: f32,
    pub particle_acceleration: f32,
    pub particle_constant_lifetime_ms: f32,
    pub particle_variable_lifetime_ms: f32,
    pub particle_radius: f32,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            canvas_width: 1000.0,
            canvas_height: 1000.0,
            origin: Point::new(500.0, 500.0),
            strike_distance: 300.0,
            timestep_ms: 1000.0 / 60.0,
            max_pending_steps: 25,
            spawn_per_step: 1.0,
            mode: GrowthMode::Target,
            primitive: Primitive::Line,
            min_length: 3.0,
            max_length: 5.0,
            segments_per_step: 2.0,
            angular_stddev: PI / 7.0,
            segment_lifetime_ms: Some(100.0),
            branching_chance: 0.1,
            branching_angle_mean: PI / 6.0,
            branching_length_modifier: 0.2,
            branching_survivability_modifier: 0.9,
            max_depth: None,
            survival_probability: 0.97,
            bolt_lifetime: None,
            particles_enabled: true,
            particle_chance: 0.25,
            particle_constant_speed: 5.0,
            particle_variable_speed: 1.0,
            particle_acceleration: 0.1,
            particle_constant_lifetime_ms: 100.0,
            particle_variable_lifetime_ms: 300.0,
            particle_radius: 1.0,
        }
    }
}

const DEFAULT_PATHS: [&str; 3] = ["lightning.yaml", "lightning.yml", "lightning.json"];

impl SimulationConfig {
    /// Load a YAML or JSON config, picked by file extension, and validate it.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        let config: SimulationConfig = match ext.as_str() {
            "yaml" | "yml" => serde_yaml::from_str(&text)?,
            "json" => serde_json::from_str(&text)?,
            other => return Err(ConfigError::UnsupportedFormat(other.to_owned())),
        };
        config.validate()?;
        log::info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// First loadable config in the working directory, or the defaults.
    pub fn from_default_paths() -> Self {
        for candidate in DEFAULT_PATHS {
            if !Path::new(candidate).exists() {
                continue;
            }
            match Self::from_file(candidate) {
                Ok(config) => return config,
                Err(e) => log::warn!("Ignoring {}: {}", candidate, e),
            }
        }
        Self::default()
    }

    /// Reject parameter sets that would hang or degenerate the growth loop.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let finite = [
            ("canvas_width", self.canvas_width),
            ("canvas_height", self.canvas_height),
            ("origin.x", self.origin.x),
            ("origin.y", self.origin.y),
            ("strike_distance", self.strike_distance),
            ("timestep_ms", self.timestep_ms),
            ("spawn_per_step", self.spawn_per_step),
            ("min_length", self.min_length),
            ("max_length", self.max_length),
            ("segments_per_step", self.segments_per_step),
            ("angular_stddev", self.angular_stddev),
            ("branching_angle_mean", self.branching_angle_mean),
            ("branching_length_modifier", self.branching_length_modifier),
            ("particle_constant_speed", self.particle_constant_speed),
            ("particle_variable_speed", self.particle_variable_speed),
            ("particle_acceleration", self.particle_acceleration),
            ("particle_radius", self.particle_radius),
        ];
        for (field, value) in finite {
            if !value.is_finite() {
                return Err(ConfigError::invalid(field, "must be a finite number"));
            }
        }

        let non_negative = [
            ("strike_distance", self.strike_distance),
            ("spawn_per_step", self.spawn_per_step),
            ("segments_per_step", self.segments_per_step),
            ("angular_stddev", self.angular_stddev),
            ("branching_length_modifier", self.branching_length_modifier),
            ("particle_constant_speed", self.particle_constant_speed),
            ("particle_variable_speed", self.particle_variable_speed),
            ("particle_acceleration", self.particle_acceleration),
            (
                "particle_constant_lifetime_ms",
                self.particle_constant_lifetime_ms,
            ),
            (
                "particle_variable_lifetime_ms",
                self.particle_variable_lifetime_ms,
            ),
            ("particle_radius", self.particle_radius),
        ];
        for (field, value) in non_negative {
            if value < 0.0 {
                return Err(ConfigError::invalid(field, "must not be negative"));
            }
        }

        let probabilities = [
            ("branching_chance", self.branching_chance),
            (
                "branching_survivability_modifier",
                self.branching_survivability_modifier,
            ),
            ("survival_probability", self.survival_probability),
            ("particle_chance", self.particle_chance),
        ];
        for (field, value) in probabilities {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::invalid(field, "must lie in [0, 1]"));
            }
        }

        if self.timestep_ms <= 0.0 {
            return Err(ConfigError::invalid("timestep_ms", "must be positive"));
        }
        if self.max_pending_steps == 0 {
            return Err(ConfigError::invalid(
                "max_pending_steps",
                "must allow at least one step",
            ));
        }
        if self.min_length <= 0.0 {
            return Err(ConfigError::invalid("min_length", "must be positive"));
        }
        if self.min_length > self.max_length {
            return Err(ConfigError::invalid(
                "min_length",
                format!(
                    "{} exceeds max_length {}",
                    self.min_length, self.max_length
                ),
            ));
        }
        if let Primitive::Ribbon { width } = self.primitive {
            if !width.is_finite() || width <= 0.0 {
                return Err(ConfigError::invalid("primitive.width", "must be positive"));
            }
        }
        if let Some(life) = self.segment_lifetime_ms {
            if !life.is_finite() || life <= 0.0 {
                return Err(ConfigError::invalid(
                    "segment_lifetime_ms",
                    "must be positive when set",
                ));
            }
        }
        if let Some(life) = self.bolt_lifetime {
            if !life.constant_ms.is_finite()
                || !life.variable_ms.is_finite()
                || life.constant_ms < 0.0
                || life.variable_ms < 0.0
                || life.constant_ms + life.variable_ms <= 0.0
            {
                return Err(ConfigError::invalid(
                    "bolt_lifetime",
                    "bounds must be non-negative with a positive total",
                ));
            }
        }

        // Directional bolts can be spawned by hand in either mode
        if self.survival_probability >= 1.0 && self.bolt_lifetime.is_none() {
            return Err(ConfigError::invalid(
                "survival_probability",
                "directional bolts with survival 1 and no bolt_lifetime never stop growing",
            ));
        }
        if self.segment_lifetime_ms.is_none() && self.bolt_lifetime.is_none() {
            return Err(ConfigError::invalid(
                "segment_lifetime_ms",
                "without segment decay or a bolt_lifetime, bolts are never released",
            ));
        }
        Ok(())
    }

    pub fn particles_active(&self) -> bool {
        self.particles_enabled && self.particle_chance > 0.0
    }
}
