/// Turns variable frame durations into whole fixed-rate physics ticks.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedStep {
    fixed_dt: f64,
    max_steps: u32,
    accumulator: f64,
}

impl FixedStep {
    pub fn new(fixed_dt: f64, max_steps: u32) -> Self {
        Self {
            fixed_dt,
            max_steps: max_steps.max(1),
            accumulator: 0.0,
        }
    }

    pub fn fixed_dt(&self) -> f64 {
        self.fixed_dt
    }

    /// Adds `frame_dt` and returns how many ticks are due. Backlog beyond
    /// `max_steps` is dropped so a stalled frame cannot spiral.
    pub fn advance(&mut self, frame_dt: f64) -> u32 {
        if frame_dt.is_finite() && frame_dt > 0.0 {
            self.accumulator += frame_dt;
        }
        let mut steps = 0;
        while self.accumulator >= self.fixed_dt && steps < self.max_steps {
            self.accumulator -= self.fixed_dt;
            steps += 1;
        }
        if steps == self.max_steps && self.accumulator >= self.fixed_dt {
            self.accumulator %= self.fixed_dt;
        }
        steps
    }

    pub fn reset(&mut self) {
        self.accumulator = 0.0;
    }
}
