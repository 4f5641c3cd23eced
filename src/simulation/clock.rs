/// Turns host frame times into a whole number of fixed simulation steps.
/// Time that does not fill a step is carried over to the next frame.
#[derive(Clone, Debug)]
pub struct FixedStepClock {
    step: f64,
    max_frame_time: f64,
    accumulated: f64,
}

impl FixedStepClock {
    pub fn new(step: f64, max_frame_time: f64) -> Self {
        assert!(step > 0., "step must be positive");
        Self {
            step,
            max_frame_time: max_frame_time.max(step),
            accumulated: 0.,
        }
    }

    pub fn step(&self) -> f64 {
        self.step
    }

    /// Leftover time not yet simulated.
    pub fn pending(&self) -> f64 {
        self.accumulated
    }

    /// Adds `frame_time` (clamped to the configured maximum) and returns how
    /// many steps are due. Non-finite frame times count as zero.
    pub fn advance(&mut self, frame_time: f64) -> usize {
        let frame_time = if frame_time.is_finite() { frame_time } else { 0. };
        self.accumulated += frame_time.clamp(0., self.max_frame_time);
        let steps = (self.accumulated / self.step).floor();
        self.accumulated -= steps * self.step;
        steps as usize
    }

    pub fn clear(&mut self) {
        self.accumulated = 0.;
    }
}
