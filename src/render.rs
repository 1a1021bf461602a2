// Renderer-facing traversal of the live storm

use serde::Serialize;

use crate::arena::{BoltArena, BoltId};
use crate::geometry::{Drawable, Point};
use crate::particle::Particle;

/// Anything that can draw the storm: a canvas, a GPU batch, a JSON dump.
///
/// Each root bolt arrives as one group between `begin_bolt` and `end_bolt`,
/// so a stroking backend can issue a single path per visible tree.
pub trait Renderer {
    fn begin_bolt(&mut self) {}
    fn draw(&mut self, drawable: &Drawable);
    fn end_bolt(&mut self) {}
    fn draw_particle(&mut self, position: Point, radius: f32);
}

/// Emit the tree rooted at `root`: every branch subtree first, then the
/// bolt's own segments, recursively.
pub fn walk_bolt<R: Renderer + ?Sized>(arena: &BoltArena, root: BoltId, renderer: &mut R) {
    let mut stack = vec![(root, false)];
    while let Some((id, branches_done)) = stack.pop() {
        let Some(bolt) = arena.get(id) else {
            continue;
        };
        if branches_done {
            for segment in &bolt.segments {
                renderer.draw(&segment.shape);
            }
        } else {
            stack.push((id, true));
            stack.extend(bolt.branches.iter().rev().map(|&child| (child, false)));
        }
    }
}

pub fn walk_storm<R: Renderer + ?Sized>(
    arena: &BoltArena,
    roots: &[BoltId],
    particles: &[Particle],
    particle_radius: f32,
    renderer: &mut R,
) {
    for &root in roots {
        renderer.begin_bolt();
        walk_bolt(arena, root, renderer);
        renderer.end_bolt();
    }
    for particle in particles.iter().filter(|p| p.alive) {
        renderer.draw_particle(particle.position, particle_radius);
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct ParticleSprite {
    pub position: Point,
    pub radius: f32,
}

/// Serializable snapshot of everything a renderer would draw this frame.
#[derive(Clone, Debug, Default, Serialize)]
pub struct Frame {
    pub frame_index: u64,
    /// One entry per root bolt, in draw order.
    pub strokes: Vec<Vec<Drawable>>,
    pub particles: Vec<ParticleSprite>,
}

impl Frame {
    pub fn drawable_count(&self) -> usize {
        self.strokes.iter().map(Vec::len).sum()
    }
}

/// Renderer that records a [`Frame`] instead of drawing it.
#[derive(Debug, Default)]
pub struct FrameRecorder {
    frame: Frame,
    open: Option<Vec<Drawable>>,
}

impl FrameRecorder {
    pub fn new(frame_index: u64) -> Self {
        Self {
            frame: Frame {
                frame_index,
                ..Default::default()
            },
            open: None,
        }
    }

    pub fn finish(mut self) -> Frame {
        if let Some(stroke) = self.open.take() {
            self.frame.strokes.push(stroke);
        }
        self.frame
    }
}

impl Renderer for FrameRecorder {
    fn begin_bolt(&mut self) {
        if let Some(stroke) = self.open.replace(Vec::new()) {
            self.frame.strokes.push(stroke);
        }
    }

    fn draw(&mut self, drawable: &Drawable) {
        self.open.get_or_insert_with(Vec::new).push(*drawable);
    }

    fn end_bolt(&mut self) {
        if let Some(stroke) = self.open.take() {
            self.frame.strokes.push(stroke);
        }
    }

    fn draw_particle(&mut self, position: Point, radius: f32) {
        self.frame.particles.push(ParticleSprite { position, radius });
    }
}
