// CONTROLLER: Input, game logic, and update loop
pub mod frame_loop;
pub mod input;
pub mod physics;

pub use frame_loop::FrameLoop;
pub use input::{InputState, KeyBindings};
pub use physics::{BodyHandle, Physics, RapierPhysics};
