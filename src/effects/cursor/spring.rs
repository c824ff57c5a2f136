/// Largest integration step; longer frames are split
const MAX_STEP_SECS: f32 = 1.0 / 240.0;

/// Rest thresholds below which the spring snaps onto its target
const REST_DELTA: f32 = 0.01;
const REST_SPEED: f32 = 0.01;

/// A damped harmonic spring driving one scalar toward a target.
///
/// Same model as a UI motion spring with unit mass: `a = -k (x - target) - c v`.
/// Used for orb size and glow so state changes
/// overshoot slightly and settle instead of moving linearly.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Spring {
    pub value: f32,
    pub velocity: f32,
    pub target: f32,
    pub stiffness: f32,
    pub damping: f32,
}

impl Spring {
    pub fn new(value: f32, stiffness: f32, damping: f32) -> Self {
        Self {
            value,
            velocity: 0.0,
            target: value,
            stiffness,
            damping,
        }
    }

    pub fn set_target(&mut self, target: f32) {
        self.target = target;
    }

    pub fn is_at_rest(&self) -> bool {
        (self.value - self.target).abs() < REST_DELTA && self.velocity.abs() < REST_SPEED
    }

    /// Advance by `dt` seconds (semi-implicit Euler, sub-stepped)
    pub fn step(&mut self, dt: f32) {
        if self.is_at_rest() {
            self.value = self.target;
            self.velocity = 0.0;
            return;
        }

        let mut remaining = dt.max(0.0);
        while remaining > 0.0 {
            let h = remaining.min(MAX_STEP_SECS);
            let displacement = self.value - self.target;
            let accel = -self.stiffness * displacement - self.damping * self.velocity;
            self.velocity += accel * h;
            self.value += self.velocity * h;
            remaining -= h;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spring_settles_on_target() {
        let mut spring = Spring::new(22.0, 250.0, 25.0);
        spring.set_target(44.0);

        for _ in 0..240 {
            spring.step(1.0 / 60.0);
        }

        assert!(spring.is_at_rest());
        assert!((spring.value - 44.0).abs() < REST_DELTA);
    }

    #[test]
    fn test_spring_is_not_linear() {
        let mut spring = Spring::new(0.0, 250.0, 25.0);
        spring.set_target(1.0);

        let mut samples = Vec::new();
        for _ in 0..6 {
            spring.step(1.0 / 60.0);
            samples.push(spring.value);
        }

        // Starts from rest, so it accelerates: successive steps grow at first
        let first = samples[0];
        let second = samples[1] - samples[0];
        assert!(second > first);
    }

    #[test]
    fn test_underdamped_spring_overshoots() {
        let mut spring = Spring::new(0.0, 250.0, 25.0);
        spring.set_target(1.0);

        let mut peak = 0.0_f32;
        for _ in 0..120 {
            spring.step(1.0 / 60.0);
            peak = peak.max(spring.value);
        }
        assert!(peak > 1.0);
    }

    #[test]
    fn test_frame_rate_independent() {
        let mut coarse = Spring::new(0.0, 250.0, 25.0);
        let mut fine = coarse;
        coarse.set_target(10.0);
        fine.set_target(10.0);

        for _ in 0..30 {
            coarse.step(1.0 / 30.0);
        }
        for _ in 0..120 {
            fine.step(1.0 / 120.0);
        }

        assert!((coarse.value - fine.value).abs() < 0.05);
    }
}
