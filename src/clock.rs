/// Fixed-timestep accumulator.
///
/// Converts the irregular timestamps of display refreshes into a whole number
/// of constant-length simulation steps. Leftover time carries over to the next
/// frame. When the backlog reaches `max_pending_steps` (a stalled tab, a
/// debugger pause) it is thrown away instead of being replayed.
#[derive(Clone, Debug)]
pub struct FixedStep {
    timestep_ms: f32,
    max_pending_steps: u32,
    accumulator_ms: f64,
    last_timestamp_ms: Option<f64>,
    last_frame_ms: f64,
}

impl FixedStep {
    pub fn new(timestep_ms: f32, max_pending_steps: u32) -> Self {
        Self {
            timestep_ms,
            max_pending_steps,
            accumulator_ms: 0.0,
            last_timestamp_ms: None,
            last_frame_ms: 0.0,
        }
    }

    /// Feed a frame timestamp and get back how many steps to run.
    ///
    /// The first timestamp only primes the clock. Timestamps going backwards
    /// count as zero elapsed time.
    pub fn tick(&mut self, timestamp_ms: f64) -> usize {
        let Some(last) = self.last_timestamp_ms.replace(timestamp_ms) else {
            return 0;
        };
        let elapsed = (timestamp_ms - last).max(0.0);
        self.last_frame_ms = elapsed;
        self.accumulator_ms += elapsed;

        let timestep = f64::from(self.timestep_ms);
        if self.accumulator_ms / timestep >= f64::from(self.max_pending_steps) {
            log::warn!(
                "Dropping {:.0}ms of simulation backlog ({} step limit)",
                self.accumulator_ms,
                self.max_pending_steps
            );
            self.accumulator_ms = 0.0;
            return 0;
        }

        let mut steps = 0;
        while self.accumulator_ms >= timestep {
            self.accumulator_ms -= timestep;
            steps += 1;
        }
        steps
    }

    /// Duration of the most recent frame, for an FPS readout.
    pub fn last_frame_ms(&self) -> f64 {
        self.last_frame_ms
    }

    pub fn fps(&self) -> f64 {
        if self.last_frame_ms > 0.0 {
            1000.0 / self.last_frame_ms
        } else {
            0.0
        }
    }

    pub fn timestep_ms(&self) -> f32 {
        self.timestep_ms
    }

    pub fn reset(&mut self) {
        self.accumulator_ms = 0.0;
        self.last_timestamp_ms = None;
        self.last_frame_ms = 0.0;
    }
}
