use glam::Vec3;

// Arena dimensions (world units)
pub const GROUND_SIZE: f32 = 100.0;

// Player parameters
pub const PLAYER_HALF_EXTENT: f32 = 0.5;
pub const PLAYER_MASS: f32 = 1.0;
pub const MOVE_SPEED: f32 = 6.0; // units per second
pub const MAX_HEALTH: i32 = 100;

// Projectile parameters
pub const PROJECTILE_SPEED: f32 = 30.0; // units per second
pub const PROJECTILE_RADIUS: f32 = 0.2;
pub const HIT_RADIUS: f32 = 1.0;
pub const DESPAWN_RADIUS: f32 = 50.0;
pub const HIT_DAMAGE: i32 = 10;

// Obstacle parameters
pub const OBSTACLE_HALF_EXTENT: f32 = 1.0;

/// Fixed physics step (seconds); the loop advances once per frame by this.
pub const PHYSICS_DT: f32 = 1.0 / 60.0;

// Display colors
pub const PLAYER_COLORS: [[f32; 4]; 2] = [
    [0.9, 0.15, 0.15, 1.0], // player one: red
    [0.15, 0.25, 0.9, 1.0], // player two: blue
];
pub const OBSTACLE_COLOR: [f32; 4] = [0.1, 0.8, 0.2, 1.0];
pub const GROUND_COLOR: [f32; 4] = [0.25, 0.55, 0.2, 1.0];
pub const PROJECTILE_COLOR: [f32; 4] = [1.0, 1.0, 1.0, 1.0];

/// A static box placed on the ground plane. Created once at initialization,
/// never mutated or destroyed.
#[derive(Debug, Clone, Copy)]
pub struct Obstacle {
    pub position: Vec3,
    pub half_extents: Vec3,
}

/// Static arena layout: obstacle placements and player spawn points.
pub struct Arena {
    pub obstacles: Vec<Obstacle>,
    pub spawn_points: [Vec3; 2],
}

impl Arena {
    /// The standard layout: three obstacles around the center, players
    /// facing each other across the X axis.
    pub fn standard() -> Self {
        let half = Vec3::splat(OBSTACLE_HALF_EXTENT);
        Self {
            obstacles: vec![
                Obstacle { position: Vec3::new(0.0, 1.0, 0.0), half_extents: half },
                Obstacle { position: Vec3::new(-5.0, 1.0, -5.0), half_extents: half },
                Obstacle { position: Vec3::new(5.0, 1.0, -5.0), half_extents: half },
            ],
            spawn_points: [Vec3::new(-5.0, 1.0, 0.0), Vec3::new(5.0, 1.0, 0.0)],
        }
    }
}
