use macroquad::prelude::*;

use lightning::geometry::{Drawable, Point};
use lightning::render::Renderer;
use lightning::Stats;

const BOLT_COLOR: Color = Color::new(1.0, 1.0, 1.0, 1.0);
const GLOW_COLOR: Color = Color::new(0.55, 0.65, 1.0, 0.25);
const SPARK_COLOR: Color = Color::new(1.0, 1.0, 1.0, 1.0);

// Draws the storm straight to the macroquad frame buffer
pub struct ScreenRenderer {
    pub line_width: f32,
    pub glow: bool,
}

impl ScreenRenderer {
    pub fn new(line_width: f32, glow: bool) -> Self {
        Self { line_width, glow }
    }
}

fn to_vec2(p: Point) -> Vec2 {
    vec2(p.x, p.y)
}

impl Renderer for ScreenRenderer {
    fn draw(&mut self, drawable: &Drawable) {
        match *drawable {
            Drawable::Line { from, to } => {
                if self.glow {
                    draw_line(from.x, from.y, to.x, to.y, self.line_width * 4.0, GLOW_COLOR);
                }
                draw_line(from.x, from.y, to.x, to.y, self.line_width, BOLT_COLOR);
            }
            Drawable::Quad { corners } => {
                let [a, b, c, d] = corners.map(to_vec2);
                draw_triangle(a, b, c, BOLT_COLOR);
                draw_triangle(a, c, d, BOLT_COLOR);
            }
        }
    }

    fn draw_particle(&mut self, position: Point, radius: f32) {
        draw_circle(position.x, position.y, radius, SPARK_COLOR);
    }
}

pub fn draw_stats_and_help(stats: &Stats, paused: bool, speed_multiplier: f32, fps: f64) {
    let stats_text = format!(
        "Bolts: {} ({} roots) | Segments: {} | Sparks: {} | Depth: {}",
        stats.bolts, stats.roots, stats.segments, stats.particles, stats.deepest_generation,
    );
    draw_text(&stats_text, 10.0, 20.0, 20.0, WHITE);
    let speed_text = format!("Speed: {:.1}x | FPS: {:.0}", speed_multiplier, fps);
    draw_text(&speed_text, 10.0, 40.0, 20.0, WHITE);
    if paused {
        draw_text("PAUSED - Press SPACE to resume", 10.0, 60.0, 20.0, YELLOW);
    }
    let controls_text = "LMB=Strike | D=Directional bolt | SPACE=Pause | R=Reset | G=Glow | P=Screenshot";
    draw_text(
        controls_text,
        10.0,
        screen_height() - 40.0,
        16.0,
        Color::new(1.0, 1.0, 1.0, 0.7),
    );
    let speed_help_text = "Speed Controls: <- = Slower | -> = Faster | 0 = Reset to 1x";
    draw_text(
        speed_help_text,
        10.0,
        screen_height() - 20.0,
        16.0,
        Color::new(1.0, 1.0, 1.0, 0.7),
    );
}
