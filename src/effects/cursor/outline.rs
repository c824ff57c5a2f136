use bevy::prelude::*;

/// Cursor outline that trails the pointer.
///
/// Each frame it covers a fixed fraction of the remaining distance, so it
/// lags on fast moves and glides in when the pointer stops.
#[derive(Resource, Debug, Clone, Copy, PartialEq)]
pub struct OutlineFollower {
    pub target: Vec2,
    pub current: Vec2,
    pub ease: f32,
    /// Drawn as a ring over interactive targets
    pub outlined: bool,
}

impl OutlineFollower {
    /// Both ends start at `start` (the viewport center)
    pub fn new(start: Vec2, ease: f32) -> Self {
        Self {
            target: start,
            current: start,
            ease: ease.clamp(0.0, 1.0),
            outlined: false,
        }
    }

    pub fn set_target(&mut self, target: Vec2) {
        self.target = target;
    }

    /// One animation frame
    pub fn tick(&mut self) {
        self.current += (self.target - self.current) * self.ease;
    }
}
