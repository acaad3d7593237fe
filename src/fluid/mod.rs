//! Position Based Fluids (PBF) particle simulation in two dimensions.
//!
//! A [`ParticleSystem`](simulation::ParticleSystem) is a population of equal
//! water particles. It is owned and stepped by the
//! [`PhysicsWorld`](crate::physics::PhysicsWorld), which passes in its bodies
//! so particles collide with fixtures and push dynamic bodies.
//!
//! # Architecture
//!
//! - [`params`]: Particle system parameters (radius, damping, solver knobs)
//! - [`particle`]: Spawn groups and particle flags
//! - [`spatial`]: Spatial hashing for neighbor search
//! - [`solver`]: PBF kernels and rest-state calibration
//! - [`boundary`]: Particle collisions against body fixtures
//! - [`simulation`]: The particle system and its step
//!
//! # Example
//!
//! ```rust,no_run
//! use bevy::prelude::*;
//! use rainmaker::fluid::prelude::*;
//! use rainmaker::physics::PhysicsWorld;
//!
//! let mut world = PhysicsWorld::new(Vec2::new(0.0, 5.0));
//! let handle = world.create_particle_system(&ParticleSystemDef::water(0.025, 0.4));
//! let group = world
//!     .particle_system_mut(handle)
//!     .create_particle_group(&ParticleGroupDef::water_box(Vec2::new(2.0, 1.0), Vec2::splat(0.5)));
//!
//! world.step(1.0 / 30.0, 8, 3);
//! assert_eq!(world.particle_system(handle).particle_count(), group.count);
//! ```

pub mod boundary;
pub mod params;
pub mod particle;
pub mod simulation;
pub mod solver;
pub mod spatial;

/// Prelude for convenient imports.
pub mod prelude {
    pub use super::params::*;
    pub use super::particle::*;
    pub use super::simulation::{ParticleSystem, ParticleSystemHandle};
}
