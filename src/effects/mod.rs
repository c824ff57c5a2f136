pub mod cursor;
pub mod lifecycle;
pub mod magnetic;
pub mod node_canvas;
pub mod plugin;
pub mod progress;
pub mod tilt;
pub mod trail;
pub mod typewriter;
pub mod utils;
