// Screen-space geometry: points, bolt segments and their drawable shapes
//
// Coordinates follow the canvas: x grows right, y grows down. An angle of 0
// points along +x and positive angles turn clockwise on screen. `angle_to` and
// `rotate` share that convention, so rotating `(len, 0)` about a pivot by
// `pivot.angle_to(target)` always lands on the pivot→target ray.

use serde::{Deserialize, Serialize};

use crate::config::Primitive;

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Rotate in place about `pivot` by `angle` radians.
    pub fn rotate(&mut self, pivot: Point, angle: f32) {
        let (sin, cos) = angle.sin_cos();
        let dx = self.x - pivot.x;
        let dy = self.y - pivot.y;
        // both coordinates from the pre-rotation offsets
        let x = pivot.x + dx * cos - dy * sin;
        let y = pivot.y + dx * sin + dy * cos;
        self.x = x;
        self.y = y;
    }

    pub fn rotated(mut self, pivot: Point, angle: f32) -> Point {
        self.rotate(pivot, angle);
        self
    }

    pub fn translate(&self, dx: f32, dy: f32) -> Point {
        Point::new(self.x + dx, self.y + dy)
    }

    pub fn angle_to(&self, other: Point) -> f32 {
        (other.y - self.y).atan2(other.x - self.x)
    }

    pub fn distance_to(&self, other: Point) -> f32 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        (dx * dx + dy * dy).sqrt()
    }

    /// Point `distance` away along `angle`.
    pub fn project(&self, angle: f32, distance: f32) -> Point {
        self.translate(distance, 0.0).rotated(*self, angle)
    }
}

/// One drawable unit handed to a renderer.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Drawable {
    Line { from: Point, to: Point },
    Quad { corners: [Point; 4] },
}

/// Rectangle of `width` centred on the growth line, laid out along +x from
/// `start` and then rotated as a rigid body about `start`.
pub fn oriented_rect(start: Point, length: f32, width: f32, angle: f32) -> [Point; 4] {
    let half = width / 2.0;
    [
        start.translate(0.0, -half),
        start.translate(length, -half),
        start.translate(length, half),
        start.translate(0.0, half),
    ]
    .map(|corner| corner.rotated(start, angle))
}

// Bolt segment with optional decay
#[derive(Clone, Debug)]
pub struct Segment {
    pub from: Point,
    pub to: Point,
    pub shape: Drawable,
    pub remaining_ms: Option<f32>,
    pub alive: bool,
}

impl Segment {
    /// Segment of `length` leaving `from` along `heading`.
    pub fn grow(
        from: Point,
        heading: f32,
        length: f32,
        primitive: Primitive,
        lifetime_ms: Option<f32>,
    ) -> Self {
        let to = from.project(heading, length);
        let shape = match primitive {
            Primitive::Line => Drawable::Line { from, to },
            Primitive::Ribbon { width } => Drawable::Quad {
                corners: oriented_rect(from, length, width, heading),
            },
        };
        Self {
            from,
            to,
            shape,
            remaining_ms: lifetime_ms,
            alive: true,
        }
    }

    /// Segment ending exactly on `to`.
    pub fn between(from: Point, to: Point, primitive: Primitive, lifetime_ms: Option<f32>) -> Self {
        let shape = match primitive {
            Primitive::Line => Drawable::Line { from, to },
            Primitive::Ribbon { width } => Drawable::Quad {
                corners: oriented_rect(from, from.distance_to(to), width, from.angle_to(to)),
            },
        };
        Self {
            from,
            to,
            shape,
            remaining_ms: lifetime_ms,
            alive: true,
        }
    }

    pub fn update(&mut self, dt_ms: f32) {
        if !self.alive {
            return;
        }
        if let Some(remaining) = self.remaining_ms.as_mut() {
            *remaining -= dt_ms;
            if *remaining <= 0.0 {
                self.alive = false;
            }
        }
    }
}
