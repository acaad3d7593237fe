//! The physics world: rapier bodies, particle systems, and the step pipeline.
//!
//! Step order:
//! 1. Step the rigid bodies with rapier's pipeline
//! 2. Step every particle system against the moved bodies, pushing the
//!    dynamic ones

use std::num::NonZeroUsize;

use bevy::prelude::*;
use rapier2d::prelude::{
    CCDSolver, ColliderSet, DefaultBroadPhase, ImpulseJointSet, IntegrationParameters, IslandManager,
    MultibodyJointSet, NarrowPhase, PhysicsPipeline, RigidBodySet,
};

use super::body::{Body, BodyDef, BodyHandle, BodyMut, FixtureDef, to_vector};
use crate::fluid::params::ParticleSystemDef;
use crate::fluid::simulation::{ParticleSystem, ParticleSystemHandle};

/// Rigid bodies and particle systems sharing one gravity.
#[derive(Resource)]
pub struct PhysicsWorld {
    gravity: Vec2,
    bodies: RigidBodySet,
    colliders: ColliderSet,
    pipeline: PhysicsPipeline,
    islands: IslandManager,
    broad_phase: DefaultBroadPhase,
    narrow_phase: NarrowPhase,
    impulse_joints: ImpulseJointSet,
    multibody_joints: MultibodyJointSet,
    ccd_solver: CCDSolver,
    particle_systems: Vec<ParticleSystem>,
}

impl PhysicsWorld {
    pub fn new(gravity: Vec2) -> Self {
        Self {
            gravity,
            bodies: RigidBodySet::new(),
            colliders: ColliderSet::new(),
            pipeline: PhysicsPipeline::new(),
            islands: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            impulse_joints: ImpulseJointSet::new(),
            multibody_joints: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
            particle_systems: Vec::new(),
        }
    }

    pub fn gravity(&self) -> Vec2 {
        self.gravity
    }

    pub fn create_body(&mut self, def: &BodyDef) -> BodyHandle {
        BodyHandle(self.bodies.insert(def.build()))
    }

    /// Attach a fixture and recompute the body's mass.
    pub fn create_fixture(&mut self, body: BodyHandle, def: FixtureDef) {
        self.colliders
            .insert_with_parent(def.build(), body.0, &mut self.bodies);
        self.bodies[body.0].recompute_mass_properties_from_colliders(&self.colliders);
    }

    pub fn body(&self, handle: BodyHandle) -> Body<'_> {
        Body {
            body: &self.bodies[handle.0],
            colliders: &self.colliders,
        }
    }

    pub fn body_mut(&mut self, handle: BodyHandle) -> BodyMut<'_> {
        BodyMut {
            body: &mut self.bodies[handle.0],
        }
    }

    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    pub fn create_particle_system(&mut self, def: &ParticleSystemDef) -> ParticleSystemHandle {
        self.particle_systems.push(ParticleSystem::new(def.clone()));
        ParticleSystemHandle(self.particle_systems.len() - 1)
    }

    pub fn particle_system(&self, handle: ParticleSystemHandle) -> &ParticleSystem {
        &self.particle_systems[handle.0]
    }

    pub fn particle_system_mut(&mut self, handle: ParticleSystemHandle) -> &mut ParticleSystem {
        &mut self.particle_systems[handle.0]
    }

    pub fn particle_systems(&self) -> &[ParticleSystem] {
        &self.particle_systems
    }

    /// Advance the world by `dt` seconds.
    ///
    /// `velocity_iterations` sets rapier's solver iterations and
    /// `position_iterations` its stabilization iterations inside each.
    pub fn step(&mut self, dt: f32, velocity_iterations: u32, position_iterations: u32) {
        if dt <= 0.0 {
            return;
        }

        let params = IntegrationParameters {
            dt,
            num_solver_iterations: NonZeroUsize::new(velocity_iterations as usize).unwrap_or(NonZeroUsize::MIN),
            num_internal_stabilization_iterations: position_iterations as usize,
            ..default()
        };

        self.pipeline.step(
            &to_vector(self.gravity),
            &params,
            &mut self.islands,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.bodies,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            &mut self.ccd_solver,
            None,
            &(),
            &(),
        );

        for system in &mut self.particle_systems {
            system.step(dt, self.gravity, &mut self.bodies, &self.colliders);
        }
    }
}

impl Default for PhysicsWorld {
    fn default() -> Self {
        Self::new(Vec2::new(0.0, 5.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::body::BoxShape;

    const DT: f32 = 1.0 / 30.0;

    fn world_with_floor() -> (PhysicsWorld, BodyHandle) {
        let mut world = PhysicsWorld::default();
        let floor = world.create_body(&BodyDef::fixed().with_position(Vec2::new(0.0, 4.5)));
        world.create_fixture(floor, FixtureDef::new(BoxShape::new(5.0, 0.5), 0.0));
        (world, floor)
    }

    fn drop_box(world: &mut PhysicsWorld, position: Vec2) -> BodyHandle {
        let body = world.create_body(&BodyDef::dynamic().with_position(position));
        world.create_fixture(body, FixtureDef::new(BoxShape::new(0.5, 0.5), 1.0));
        body
    }

    #[test]
    fn test_bodies_get_distinct_handles() {
        let mut world = PhysicsWorld::default();
        let a = world.create_body(&BodyDef::fixed());
        let b = world.create_body(&BodyDef::dynamic());

        assert_ne!(a, b);
        assert_eq!(world.body_count(), 2);
    }

    #[test]
    fn test_fixture_sets_mass() {
        let mut world = PhysicsWorld::default();
        let body = drop_box(&mut world, Vec2::ZERO);

        assert!((world.body(body).mass() - 1.0).abs() < 1e-5);
        assert_eq!(world.body(body).fixtures().count(), 1);
    }

    #[test]
    fn test_static_body_does_not_move() {
        let (mut world, floor) = world_with_floor();
        for _ in 0..30 {
            world.step(DT, 8, 3);
        }

        assert_eq!(world.body(floor).position(), Vec2::new(0.0, 4.5));
    }

    #[test]
    fn test_box_comes_to_rest_on_floor() {
        let (mut world, _) = world_with_floor();
        let crate_box = drop_box(&mut world, Vec2::new(0.0, 2.0));

        for _ in 0..150 {
            world.step(DT, 8, 3);
        }

        let body = world.body(crate_box);
        // Floor top at y = 4.0, box half height 0.5.
        assert!((body.position().y - 3.5).abs() < 0.05, "box at {:?}", body.position());
        assert!(body.linear_velocity().length() < 0.1);
        assert!(body.angle().abs() < 0.01);
    }

    #[test]
    fn test_straight_drop_stays_straight() {
        let (mut world, _) = world_with_floor();
        // Bottom face 0.1 m above the floor, falling at 2 m/s.
        let crate_box = drop_box(&mut world, Vec2::new(0.0, 3.4));
        world
            .body_mut(crate_box)
            .set_linear_velocity(Vec2::new(0.0, 2.0));

        for _ in 0..30 {
            world.step(DT, 8, 3);
        }

        let body = world.body(crate_box);
        assert!(body.linear_velocity().y.abs() < 1e-2, "still moving: {:?}", body.linear_velocity());
        assert!(body.linear_velocity().x.abs() < 1e-2);
        assert!(body.position().x.abs() < 1e-2);
        assert!(body.angle().abs() < 1e-2);
    }

    #[test]
    fn test_zero_dt_is_ignored() {
        let mut world = PhysicsWorld::default();
        let body = drop_box(&mut world, Vec2::ZERO);

        world.step(0.0, 8, 3);

        assert_eq!(world.body(body).linear_velocity(), Vec2::ZERO);
    }

    #[test]
    fn test_particle_systems_step_with_world() {
        let mut world = PhysicsWorld::default();
        let handle = world.create_particle_system(&ParticleSystemDef::default());
        world
            .particle_system_mut(handle)
            .create_particle(Vec2::ZERO, Vec2::ZERO);

        world.step(DT, 8, 3);

        assert!(world.particle_system(handle).position(0).y > 0.0);
    }
}
