use glam::Vec3;
use rapier3d::prelude::*;

/// Opaque handle for a body registered with a physics backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BodyHandle(pub(crate) usize);

/// Physics collaborator contract: bodies are registered once at
/// initialization, advanced by a fixed step once per frame, and expose a
/// readable/writable position. Gravity and static/dynamic collision are
/// entirely the backend's concern.
pub trait Physics {
    fn add_dynamic_box(&mut self, position: Vec3, half_extents: Vec3, mass: f32) -> BodyHandle;
    fn add_static_box(&mut self, position: Vec3, half_extents: Vec3) -> BodyHandle;
    fn add_ground_plane(&mut self) -> BodyHandle;
    fn advance(&mut self, dt: f32);
    fn position(&self, body: BodyHandle) -> Vec3;
    fn set_position(&mut self, body: BodyHandle, position: Vec3);
}

/// rapier3d-backed physics world.
pub struct RapierPhysics {
    gravity: Vector<f32>,
    integration_parameters: IntegrationParameters,
    pipeline: PhysicsPipeline,
    islands: IslandManager,
    broad_phase: DefaultBroadPhase,
    narrow_phase: NarrowPhase,
    bodies: RigidBodySet,
    colliders: ColliderSet,
    impulse_joints: ImpulseJointSet,
    multibody_joints: MultibodyJointSet,
    ccd_solver: CCDSolver,
    query_pipeline: QueryPipeline,
    handles: Vec<RigidBodyHandle>,
}

impl RapierPhysics {
    pub fn new() -> Self {
        Self {
            gravity: vector![0.0, -9.81, 0.0],
            integration_parameters: IntegrationParameters::default(),
            pipeline: PhysicsPipeline::new(),
            islands: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            bodies: RigidBodySet::new(),
            colliders: ColliderSet::new(),
            impulse_joints: ImpulseJointSet::new(),
            multibody_joints: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
            query_pipeline: QueryPipeline::new(),
            handles: Vec::new(),
        }
    }

    fn insert(&mut self, body: RigidBody, collider: Collider) -> BodyHandle {
        let handle = self.bodies.insert(body);
        self.colliders
            .insert_with_parent(collider, handle, &mut self.bodies);
        self.handles.push(handle);
        BodyHandle(self.handles.len() - 1)
    }
}

impl Physics for RapierPhysics {
    fn add_dynamic_box(&mut self, position: Vec3, half_extents: Vec3, mass: f32) -> BodyHandle {
        // Rotations are locked so avatars stay upright under contact.
        let body = RigidBodyBuilder::dynamic()
            .translation(vector![position.x, position.y, position.z])
            .lock_rotations()
            .build();
        let collider = ColliderBuilder::cuboid(half_extents.x, half_extents.y, half_extents.z)
            .mass(mass)
            .build();
        self.insert(body, collider)
    }

    fn add_static_box(&mut self, position: Vec3, half_extents: Vec3) -> BodyHandle {
        let body = RigidBodyBuilder::fixed()
            .translation(vector![position.x, position.y, position.z])
            .build();
        let collider =
            ColliderBuilder::cuboid(half_extents.x, half_extents.y, half_extents.z).build();
        self.insert(body, collider)
    }

    fn add_ground_plane(&mut self) -> BodyHandle {
        let body = RigidBodyBuilder::fixed().build();
        let collider = ColliderBuilder::halfspace(Vector::y_axis()).build();
        self.insert(body, collider)
    }

    fn advance(&mut self, dt: f32) {
        self.integration_parameters.dt = dt;
        self.pipeline.step(
            &self.gravity,
            &self.integration_parameters,
            &mut self.islands,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.bodies,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            &mut self.ccd_solver,
            Some(&mut self.query_pipeline),
            &(),
            &(),
        );
    }

    fn position(&self, body: BodyHandle) -> Vec3 {
        let translation = self.bodies[self.handles[body.0]].translation();
        Vec3::new(translation.x, translation.y, translation.z)
    }

    fn set_position(&mut self, body: BodyHandle, position: Vec3) {
        self.bodies[self.handles[body.0]]
            .set_translation(vector![position.x, position.y, position.z], true);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dynamic_box_settles_on_ground_plane() {
        let mut physics = RapierPhysics::new();
        physics.add_ground_plane();
        let body = physics.add_dynamic_box(Vec3::new(0.0, 3.0, 0.0), Vec3::splat(0.5), 1.0);

        for _ in 0..300 {
            physics.advance(1.0 / 60.0);
        }

        let position = physics.position(body);
        // Fell from y=3 and came to rest roughly half-extent above the plane.
        assert!(position.y < 3.0);
        assert!(position.y > 0.0);
        assert!((position.y - 0.5).abs() < 0.2);
    }

    #[test]
    fn set_position_teleports_body() {
        let mut physics = RapierPhysics::new();
        let body = physics.add_dynamic_box(Vec3::ZERO, Vec3::splat(0.5), 1.0);
        physics.set_position(body, Vec3::new(-3.0, 1.0, 2.0));
        assert_eq!(physics.position(body), Vec3::new(-3.0, 1.0, 2.0));
    }
}
