use glam::Vec3;
use tracing::{debug, info};

use crate::controller::input::{InputState, KeyBindings};
use crate::controller::physics::{BodyHandle, Physics};
use crate::model::arena::{
    Arena, DESPAWN_RADIUS, HIT_RADIUS, MOVE_SPEED, PLAYER_HALF_EXTENT, PLAYER_MASS,
    PROJECTILE_SPEED,
};
use crate::model::{MatchEvent, MatchState, PlayerId};

/// Main game loop state and update logic. Owns the mutable game-state
/// aggregate; the physics and render collaborators only ever see it through
/// borrows scoped to a single call.
pub struct FrameLoop {
    state: MatchState,
    bodies: [BodyHandle; 2],
    bindings: [KeyBindings; 2],
}

impl FrameLoop {
    /// Register the arena's ground plane, obstacles, and both player bodies
    /// with the physics collaborator.
    pub fn new(arena: &Arena, physics: &mut dyn Physics, bindings: [KeyBindings; 2]) -> Self {
        physics.add_ground_plane();
        for obstacle in &arena.obstacles {
            physics.add_static_box(obstacle.position, obstacle.half_extents);
        }
        let bodies = arena.spawn_points.map(|spawn| {
            physics.add_dynamic_box(spawn, Vec3::splat(PLAYER_HALF_EXTENT), PLAYER_MASS)
        });

        Self {
            state: MatchState::new(arena),
            bodies,
            bindings,
        }
    }

    pub fn state(&self) -> &MatchState {
        &self.state
    }

    /// Advance the match by one frame: physics step, position sync, fire
    /// requests, movement, projectile pass, termination check. Returns the
    /// events this frame produced, for the presentation layer.
    pub fn tick(
        &mut self,
        physics: &mut dyn Physics,
        input: &mut InputState,
        dt: f32,
    ) -> Vec<MatchEvent> {
        let mut events = Vec::new();

        physics.advance(dt);
        self.sync_positions(physics);

        for player in input.take_fire_requests() {
            debug!(?player, "fire");
            self.state.spawn_projectile(player);
        }

        self.apply_movement(physics, input, dt);
        self.advance_projectiles(dt, &mut events);
        self.check_termination(&mut events);

        events
    }

    /// Mirror physics-owned body positions into the player records the hit
    /// tests and the renderer read.
    fn sync_positions(&mut self, physics: &dyn Physics) {
        for (player, body) in self.state.players.iter_mut().zip(self.bodies) {
            player.position = physics.position(body);
        }
    }

    /// Translate held players directly on their physics bodies. The delta is
    /// time-step-normalized; gravity and resting contact stay with the
    /// physics collaborator.
    fn apply_movement(&mut self, physics: &mut dyn Physics, input: &InputState, dt: f32) {
        for (bindings, body) in self.bindings.iter().zip(self.bodies) {
            let axis = bindings.movement_axis(input);
            if axis == Vec3::ZERO {
                continue;
            }
            let position = physics.position(body) + axis * MOVE_SPEED * dt;
            physics.set_position(body, position);
        }
    }

    /// Advance every live projectile and resolve proximity hits. Removals
    /// are collected during the scan and applied back-to-front afterwards,
    /// so the forward iteration never skips an entry.
    fn advance_projectiles(&mut self, dt: f32, events: &mut Vec<MatchEvent>) {
        let MatchState {
            players,
            projectiles,
        } = &mut self.state;

        let mut removed = Vec::new();
        for (index, projectile) in projectiles.iter_mut().enumerate() {
            projectile.position += projectile.direction * PROJECTILE_SPEED * dt;

            // Player one is examined first; a projectile in range of both
            // players damages the first non-owner in that order.
            let hit = players.iter_mut().find(|player| {
                player.id != projectile.owner
                    && projectile.position.distance(player.position) < HIT_RADIUS
            });
            if let Some(player) = hit {
                let health = player.apply_hit();
                debug!(player = ?player.id, health, "projectile hit");
                events.push(MatchEvent::HealthChanged {
                    player: player.id,
                    health,
                });
                removed.push(index);
                continue;
            }

            // Out-of-bounds cleanup; the boundary is exclusive, a projectile
            // at exactly the despawn radius survives.
            if projectile.position.length() > DESPAWN_RADIUS {
                removed.push(index);
            }
        }

        for index in removed.into_iter().rev() {
            projectiles.remove(index);
        }
    }

    /// A depleted health pool ends the round: the other player wins, the
    /// match resets, and the loop keeps running. When both pools hit zero
    /// in the same frame, player one is examined first, so player two wins.
    fn check_termination(&mut self, events: &mut Vec<MatchEvent>) {
        let winner = if self.state.players[0].is_dead() {
            PlayerId::Two
        } else if self.state.players[1].is_dead() {
            PlayerId::One
        } else {
            return;
        };

        info!(?winner, "round over");
        self.state.reset();
        events.push(MatchEvent::RoundOver { winner });
        for player in &self.state.players {
            events.push(MatchEvent::HealthChanged {
                player: player.id,
                health: player.health,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::arena::{MAX_HEALTH, PHYSICS_DT};
    use crate::model::Projectile;

    /// Gravity-free stand-in for the rapier backend: bodies simply keep
    /// whatever position they were last given.
    struct StubPhysics {
        positions: Vec<Vec3>,
    }

    impl StubPhysics {
        fn new() -> Self {
            Self {
                positions: Vec::new(),
            }
        }

        fn add(&mut self, position: Vec3) -> BodyHandle {
            self.positions.push(position);
            BodyHandle(self.positions.len() - 1)
        }
    }

    impl Physics for StubPhysics {
        fn add_dynamic_box(&mut self, position: Vec3, _half: Vec3, _mass: f32) -> BodyHandle {
            self.add(position)
        }

        fn add_static_box(&mut self, position: Vec3, _half: Vec3) -> BodyHandle {
            self.add(position)
        }

        fn add_ground_plane(&mut self) -> BodyHandle {
            self.add(Vec3::ZERO)
        }

        fn advance(&mut self, _dt: f32) {}

        fn position(&self, body: BodyHandle) -> Vec3 {
            self.positions[body.0]
        }

        fn set_position(&mut self, body: BodyHandle, position: Vec3) {
            self.positions[body.0] = position;
        }
    }

    fn setup() -> (FrameLoop, StubPhysics, InputState) {
        let mut physics = StubPhysics::new();
        let frame_loop = FrameLoop::new(
            &Arena::standard(),
            &mut physics,
            [KeyBindings::player_one(), KeyBindings::player_two()],
        );
        (frame_loop, physics, InputState::new())
    }

    fn run_frames(
        frame_loop: &mut FrameLoop,
        physics: &mut StubPhysics,
        input: &mut InputState,
        frames: usize,
    ) -> Vec<MatchEvent> {
        let mut events = Vec::new();
        for _ in 0..frames {
            events.extend(frame_loop.tick(physics, input, PHYSICS_DT));
        }
        events
    }

    #[test]
    fn projectile_travels_speed_times_dt_per_frame() {
        let (mut frame_loop, mut physics, mut input) = setup();
        input.request_fire(PlayerId::One);

        let events = run_frames(&mut frame_loop, &mut physics, &mut input, 12);

        // 12 frames at 0.5 units per frame: x = -5 + 6 = 1; player two sits
        // at x = 5, four units away, so no hit yet.
        assert!(events.is_empty());
        let projectile = &frame_loop.state.projectiles[0];
        assert!((projectile.position.x - 1.0).abs() < 1e-4);
        assert_eq!(frame_loop.state.players[1].health, MAX_HEALTH);
    }

    #[test]
    fn projectile_hit_damages_and_removes_same_frame() {
        let (mut frame_loop, mut physics, mut input) = setup();
        input.request_fire(PlayerId::One);

        let events = run_frames(&mut frame_loop, &mut physics, &mut input, 30);

        assert!(events.contains(&MatchEvent::HealthChanged {
            player: PlayerId::Two,
            health: 90,
        }));
        assert_eq!(frame_loop.state.players[1].health, 90);
        assert_eq!(frame_loop.state.players[0].health, MAX_HEALTH);
        assert!(frame_loop.state.projectiles.is_empty());
    }

    #[test]
    fn own_projectile_never_damages_owner() {
        let (mut frame_loop, mut physics, mut input) = setup();
        input.request_fire(PlayerId::One);

        // The projectile spawns at player one's own position and stays
        // within their hit radius for the first frame.
        run_frames(&mut frame_loop, &mut physics, &mut input, 2);

        assert_eq!(frame_loop.state.players[0].health, MAX_HEALTH);
        assert_eq!(frame_loop.state.projectiles.len(), 1);
    }

    #[test]
    fn one_projectile_per_fire_edge() {
        let (mut frame_loop, mut physics, mut input) = setup();
        input.request_fire(PlayerId::One);
        input.request_fire(PlayerId::One);

        run_frames(&mut frame_loop, &mut physics, &mut input, 1);
        assert_eq!(frame_loop.state.projectiles.len(), 2);

        // No new edges: the count stays put.
        run_frames(&mut frame_loop, &mut physics, &mut input, 1);
        assert_eq!(frame_loop.state.projectiles.len(), 2);
    }

    #[test]
    fn despawn_boundary_is_exclusive() {
        let (mut frame_loop, mut physics, mut input) = setup();
        // Lands exactly on the boundary after one 0.5-unit step.
        frame_loop.state.projectiles.push(Projectile {
            position: Vec3::new(49.5, 0.0, 0.0),
            direction: Vec3::X,
            owner: PlayerId::One,
        });

        run_frames(&mut frame_loop, &mut physics, &mut input, 1);
        assert_eq!(frame_loop.state.projectiles[0].position.x, 50.0);
        assert_eq!(frame_loop.state.projectiles.len(), 1);

        // One more step crosses it and the projectile is removed.
        run_frames(&mut frame_loop, &mut physics, &mut input, 1);
        assert!(frame_loop.state.projectiles.is_empty());
    }

    #[test]
    fn three_hits_leave_seventy_health() {
        let (mut frame_loop, mut physics, mut input) = setup();
        for _ in 0..3 {
            input.request_fire(PlayerId::One);
            run_frames(&mut frame_loop, &mut physics, &mut input, 30);
        }
        assert_eq!(frame_loop.state.players[1].health, 70);
    }

    #[test]
    fn depleted_health_resets_match_same_frame() {
        let (mut frame_loop, mut physics, mut input) = setup();
        frame_loop.state.players[1].health = 10;
        input.request_fire(PlayerId::One);

        let events = run_frames(&mut frame_loop, &mut physics, &mut input, 30);

        assert!(events.contains(&MatchEvent::RoundOver {
            winner: PlayerId::One,
        }));
        assert_eq!(frame_loop.state.players[0].health, MAX_HEALTH);
        assert_eq!(frame_loop.state.players[1].health, MAX_HEALTH);
        assert!(frame_loop.state.projectiles.is_empty());
    }

    #[test]
    fn dual_zero_frame_goes_to_player_two() {
        let (mut frame_loop, mut physics, mut input) = setup();
        frame_loop.state.players[0].health = 10;
        frame_loop.state.players[1].health = 10;
        // One projectile about to reach each player in the same frame.
        frame_loop.state.projectiles.push(Projectile {
            position: Vec3::new(-6.0, 1.0, 0.0),
            direction: Vec3::X,
            owner: PlayerId::Two,
        });
        frame_loop.state.projectiles.push(Projectile {
            position: Vec3::new(6.0, 1.0, 0.0),
            direction: -Vec3::X,
            owner: PlayerId::One,
        });

        let events = run_frames(&mut frame_loop, &mut physics, &mut input, 1);

        assert!(events.contains(&MatchEvent::RoundOver {
            winner: PlayerId::Two,
        }));
    }

    #[test]
    fn held_key_translates_body_each_frame() {
        let (mut frame_loop, mut physics, mut input) = setup();
        input.set_key("a", true);
        run_frames(&mut frame_loop, &mut physics, &mut input, 10);

        // Release and run one more frame so the mirrored position catches
        // up with the body (sync happens before movement within a tick).
        input.set_key("a", false);
        run_frames(&mut frame_loop, &mut physics, &mut input, 1);

        let expected = -5.0 - MOVE_SPEED * PHYSICS_DT * 10.0;
        assert!((frame_loop.state.players[0].position.x - expected).abs() < 1e-4);
        assert_eq!(frame_loop.state.players[1].position.x, 5.0);
    }

    #[test]
    fn movement_never_touches_health() {
        let (mut frame_loop, mut physics, mut input) = setup();
        input.set_key("d", true);
        input.set_key("ArrowLeft", true);
        run_frames(&mut frame_loop, &mut physics, &mut input, 60);
        assert_eq!(frame_loop.state.players[0].health, MAX_HEALTH);
        assert_eq!(frame_loop.state.players[1].health, MAX_HEALTH);
    }
}
