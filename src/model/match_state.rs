use glam::Vec3;

use crate::model::arena::{Arena, HIT_DAMAGE, MAX_HEALTH};

/// One of the two players. Exactly two exist for the lifetime of the
/// process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlayerId {
    One,
    Two,
}

impl PlayerId {
    pub fn other(self) -> Self {
        match self {
            PlayerId::One => PlayerId::Two,
            PlayerId::Two => PlayerId::One,
        }
    }

    pub fn index(self) -> usize {
        match self {
            PlayerId::One => 0,
            PlayerId::Two => 1,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            PlayerId::One => "Player 1",
            PlayerId::Two => "Player 2",
        }
    }
}

/// Per-player state. The position is a mirror of the physics body,
/// refreshed once per frame; health is mutated only by hit detection
/// and match reset.
#[derive(Debug, Clone)]
pub struct PlayerState {
    pub id: PlayerId,
    pub position: Vec3,
    pub health: i32,
    pub fire_direction: Vec3,
}

impl PlayerState {
    pub fn new(id: PlayerId, spawn: Vec3, fire_direction: Vec3) -> Self {
        Self {
            id,
            position: spawn,
            health: MAX_HEALTH,
            fire_direction,
        }
    }

    /// Apply one projectile hit. Health is clamped at zero rather than
    /// allowed to go negative. Returns the new health.
    pub fn apply_hit(&mut self) -> i32 {
        self.health = (self.health - HIT_DAMAGE).max(0);
        self.health
    }

    pub fn is_dead(&self) -> bool {
        self.health <= 0
    }
}

/// A live projectile. The direction is normalized at creation and never
/// mutated afterwards; each frame's delta is computed fresh from it.
#[derive(Debug, Clone)]
pub struct Projectile {
    pub position: Vec3,
    pub direction: Vec3,
    pub owner: PlayerId,
}

/// Events the game loop surfaces to the presentation layer. Non-blocking:
/// the loop keeps running regardless of whether anyone observes them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchEvent {
    HealthChanged { player: PlayerId, health: i32 },
    RoundOver { winner: PlayerId },
}

/// The mutable game-state aggregate, owned exclusively by the game loop.
pub struct MatchState {
    pub players: [PlayerState; 2],
    pub projectiles: Vec<Projectile>,
}

impl MatchState {
    /// Player one fires along +X, player two along -X, each away from
    /// their own side of the arena.
    pub fn new(arena: &Arena) -> Self {
        Self {
            players: [
                PlayerState::new(PlayerId::One, arena.spawn_points[0], Vec3::X),
                PlayerState::new(PlayerId::Two, arena.spawn_points[1], -Vec3::X),
            ],
            projectiles: Vec::new(),
        }
    }

    pub fn player(&self, id: PlayerId) -> &PlayerState {
        &self.players[id.index()]
    }

    /// Append a projectile at the firing player's current position.
    /// No ammo limit and no cooldown.
    pub fn spawn_projectile(&mut self, owner: PlayerId) {
        let player = self.player(owner);
        self.projectiles.push(Projectile {
            position: player.position,
            direction: player.fire_direction.normalize(),
            owner,
        });
    }

    /// Restore both health pools and clear the projectile list. Player and
    /// obstacle positions are left untouched.
    pub fn reset(&mut self) {
        for player in &mut self.players {
            player.health = MAX_HEALTH;
        }
        self.projectiles.clear();
    }

    /// Read-only view of everything the renderer needs this frame.
    pub fn snapshot(&self) -> SceneSnapshot {
        SceneSnapshot {
            players: [self.players[0].position, self.players[1].position],
            projectiles: self.projectiles.iter().map(|p| p.position).collect(),
        }
    }
}

/// Per-frame scene data handed to the render collaborator. Obstacles are
/// static and baked into the arena mesh at startup, so they are not part
/// of the snapshot.
pub struct SceneSnapshot {
    pub players: [Vec3; 2],
    pub projectiles: Vec<Vec3>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state() -> MatchState {
        MatchState::new(&Arena::standard())
    }

    #[test]
    fn hit_clamps_health_at_zero() {
        let mut state = state();
        state.players[1].health = 5;
        assert_eq!(state.players[1].apply_hit(), 0);
        assert!(state.players[1].is_dead());
    }

    #[test]
    fn health_decreases_by_damage_per_hit() {
        let mut state = state();
        state.players[1].apply_hit();
        state.players[1].apply_hit();
        state.players[1].apply_hit();
        assert_eq!(state.players[1].health, 70);
    }

    #[test]
    fn projectile_spawns_at_owner_with_unit_direction() {
        let mut state = state();
        state.spawn_projectile(PlayerId::Two);
        let projectile = &state.projectiles[0];
        assert_eq!(projectile.position, state.player(PlayerId::Two).position);
        assert_eq!(projectile.owner, PlayerId::Two);
        assert!((projectile.direction.length() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn reset_restores_health_and_clears_projectiles() {
        let mut state = state();
        state.players[0].health = 30;
        state.players[1].health = 0;
        state.spawn_projectile(PlayerId::One);
        let positions = [state.players[0].position, state.players[1].position];

        state.reset();

        assert_eq!(state.players[0].health, MAX_HEALTH);
        assert_eq!(state.players[1].health, MAX_HEALTH);
        assert!(state.projectiles.is_empty());
        assert_eq!(state.players[0].position, positions[0]);
        assert_eq!(state.players[1].position, positions[1]);
    }
}
