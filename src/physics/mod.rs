//! Rigid bodies on top of rapier.
//!
//! Static and dynamic bodies built from oriented box fixtures and stepped by
//! rapier's pipeline. The world also owns the particle systems of
//! [`crate::fluid`] and steps them after the bodies, so liquid and bodies
//! push each other.
//!
//! - [`body`]: body and fixture definitions, read and write access
//! - [`world`]: the [`PhysicsWorld`](world::PhysicsWorld) resource
//! - [`plugin`]: Bevy plugin

pub mod body;
pub mod plugin;
pub mod world;

pub use plugin::PhysicsPlugin;
pub use world::PhysicsWorld;

/// Prelude for convenient imports.
pub mod prelude {
    pub use super::body::{BodyDef, BodyHandle, BodyType, BoxShape, FixtureDef};
    pub use super::plugin::PhysicsPlugin;
    pub use super::world::PhysicsWorld;
}
