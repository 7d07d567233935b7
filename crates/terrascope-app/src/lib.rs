//! The terrain debugger's window shell: winit event loop, orbit camera,
//! and the per-frame tick/upload/draw cycle.

mod bridge;
mod camera;
mod window;

pub use bridge::{parse_debug_mode, ui_state_from_config};
pub use camera::OrbitCamera;
pub use window::{AppState, DEFAULT_HEIGHT, DEFAULT_TITLE, DEFAULT_WIDTH, run_with_config};
