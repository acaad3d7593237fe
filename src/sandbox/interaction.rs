//! Dragging the bar with the pointer.

use bevy::prelude::*;

use super::units::UnitScale;
use crate::physics::body::BodyHandle;
use crate::physics::world::PhysicsWorld;

/// Multiplier on the vertical part of the drag velocity, so lifting and
/// pushing down dominate how the bar tips.
pub const VERTICAL_DRAG_GAIN: f32 = 2.0;

/// Steer the bar towards the pointer.
///
/// Sets the bar's linear velocity to its displacement from the pointer (in
/// meters, per second), with the vertical part scaled by
/// [`VERTICAL_DRAG_GAIN`]. Only call while the pointer is held; on release
/// the bar keeps whatever velocity it has.
pub fn update_bar_velocity(world: &mut PhysicsWorld, bar: BodyHandle, pointer: Vec2, scale: UnitScale) -> Vec2 {
    let target = scale.vec_to_simulation(pointer);
    let mut body = world.body_mut(bar);
    let d = target - body.position();
    let velocity = Vec2::new(d.x, d.y * VERTICAL_DRAG_GAIN);
    body.set_linear_velocity(velocity);
    velocity
}
