use ::rand as external_rand;
use external_rand::Rng;
use macroquad::prelude::*;

use lightning::{Point, Simulation};

use crate::visualization::ScreenRenderer;

/// Requests the frame loop acts on after input has been handled.
#[derive(Default)]
pub struct ControlOutcome {
    pub take_screenshot: bool,
}

pub fn handle_controls<R: Rng>(
    sim: &mut Simulation,
    renderer: &mut ScreenRenderer,
    rng: &mut R,
) -> ControlOutcome {
    let mut outcome = ControlOutcome::default();
    let (mx, my) = mouse_position();
    let pointer = Point::new(mx, my);

    // Strike toward the pointer
    if is_mouse_button_pressed(MouseButton::Left) {
        sim.strike(rng, pointer);
    }

    // Free-running bolt heading for the pointer
    if is_key_pressed(KeyCode::D) {
        let origin = sim.config.origin;
        let angle = origin.angle_to(pointer);
        sim.spawn_directional(rng, origin, angle);
    }

    if is_key_pressed(KeyCode::Space) {
        sim.toggle_pause();
    }

    if is_key_pressed(KeyCode::R) {
        sim.reset();
    }

    if is_key_pressed(KeyCode::G) {
        renderer.glow = !renderer.glow;
    }

    if is_key_pressed(KeyCode::P) {
        outcome.take_screenshot = true;
    }

    // Speed controls
    if is_key_pressed(KeyCode::Right) {
        sim.increase_speed();
    }
    if is_key_pressed(KeyCode::Left) {
        sim.decrease_speed();
    }
    if is_key_pressed(KeyCode::Key0) {
        sim.reset_speed();
    }

    outcome
}
