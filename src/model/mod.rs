// MODEL: Game state and data
pub mod arena;
pub mod camera;
pub mod match_state;

pub use arena::{Arena, Obstacle};
pub use camera::Camera;
pub use match_state::{MatchEvent, MatchState, PlayerId, PlayerState, Projectile, SceneSnapshot};
