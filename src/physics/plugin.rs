//! Bevy plugin that owns the physics world.

use bevy::prelude::*;

use super::world::PhysicsWorld;

/// Inserts a [`PhysicsWorld`] with the given gravity.
///
/// The world is only stepped by whoever owns the scene; this plugin does not
/// schedule any systems.
///
/// # Example
///
/// ```rust,ignore
/// use bevy::prelude::*;
/// use rainmaker::physics::PhysicsPlugin;
///
/// App::new()
///     .add_plugins(MinimalPlugins)
///     .add_plugins(PhysicsPlugin::with_gravity(Vec2::new(0.0, 5.0)))
///     .run();
/// ```
pub struct PhysicsPlugin {
    /// Gravity in m/s², y down.
    pub gravity: Vec2,
}

impl Default for PhysicsPlugin {
    fn default() -> Self {
        Self {
            gravity: Vec2::new(0.0, 5.0),
        }
    }
}

impl PhysicsPlugin {
    pub fn with_gravity(gravity: Vec2) -> Self {
        Self { gravity }
    }
}

impl Plugin for PhysicsPlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(PhysicsWorld::new(self.gravity));
        info!("Physics world created (gravity {:?})", self.gravity);
    }
}
