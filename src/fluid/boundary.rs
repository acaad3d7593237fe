//! Particle collisions against rigid body fixtures.
//!
//! Particles are disks of the system radius. Every box collider is an
//! oriented box; a particle closer than its radius to a box is pushed out
//! along the box's distance gradient. Contacts with dynamic bodies also push
//! the body, which is how the liquid can tip the bar.

use bevy::prelude::*;
use rapier2d::math::Isometry;
use rapier2d::prelude::{ColliderSet, RigidBody, RigidBodyHandle, RigidBodySet};

use crate::physics::body::{to_point, to_vec2, to_vector, velocity_at};

/// The deepest fixture contact of a particle during one substep.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoundaryContact {
    /// The touched body.
    pub body: RigidBodyHandle,
    /// Outward surface normal at the contact.
    pub normal: Vec2,
    /// Total distance the particle was pushed out this substep.
    pub push: f32,
    /// Largest single push, which picked this contact.
    pub depth: f32,
    /// Friction mixed from the particle system and the fixture.
    pub friction: f32,
}

/// Signed distance from `point` to an oriented box, and the outward normal
/// of the closest feature. Negative inside.
pub fn box_signed_distance(center: Vec2, angle: f32, half_extents: Vec2, point: Vec2) -> (f32, Vec2) {
    let rot = Vec2::from_angle(angle);
    let local = Vec2::new(rot.x, -rot.y).rotate(point - center);
    let q = local.abs() - half_extents;

    let (distance, local_normal) = if q.x > 0.0 || q.y > 0.0 {
        let closest = local.clamp(-half_extents, half_extents);
        let delta = local - closest;
        let len = delta.length();
        (len, if len > 0.0 { delta / len } else { Vec2::X })
    } else if q.x > q.y {
        (q.x, Vec2::new(local.x.signum(), 0.0))
    } else {
        (q.y, Vec2::new(0.0, local.y.signum()))
    };

    (distance, rot.rotate(local_normal))
}

/// Project a particle out of every box collider it overlaps.
///
/// Returns the contact with the largest push, merged into `contact` when the
/// particle already touched something earlier in the substep.
pub fn resolve_fixture_contacts(
    position: &mut Vec2,
    radius: f32,
    friction: f32,
    bodies: &RigidBodySet,
    colliders: &ColliderSet,
    contact: &mut Option<BoundaryContact>,
) {
    for (handle, body) in bodies.iter() {
        for &collider_handle in body.colliders() {
            let Some(collider) = colliders.get(collider_handle) else {
                continue;
            };
            let Some(cuboid) = collider.shape().as_cuboid() else {
                continue;
            };

            let local = collider
                .position_wrt_parent()
                .copied()
                .unwrap_or_else(Isometry::identity);
            let pose = body.position() * local;
            let center = to_vec2(&pose.translation.vector);
            let half_extents = to_vec2(&cuboid.half_extents);

            // Cheap reject before the exact distance.
            let reach = half_extents.length() + radius;
            if (*position - center).length_squared() > reach * reach {
                continue;
            }

            let (distance, normal) = box_signed_distance(center, pose.rotation.angle(), half_extents, *position);
            if distance >= radius {
                continue;
            }

            let push = radius - distance;
            *position += normal * push;

            let total = contact.map_or(0.0, |c| c.push) + push;
            match contact {
                Some(c) if push < c.depth => c.push = total,
                _ => {
                    *contact = Some(BoundaryContact {
                        body: handle,
                        normal,
                        push: total,
                        depth: push,
                        friction: (friction * collider.friction()).sqrt(),
                    });
                }
            }
        }
    }
}

/// Transfer the approach momentum of a particle to the dynamic body it hit.
///
/// The particle and the body meet as two point masses; the body's spin only
/// enters through the velocity of the contact point.
pub fn push_body(
    body: &mut RigidBody,
    point: Vec2,
    normal: Vec2,
    particle_velocity: Vec2,
    particle_mass: f32,
) {
    if !body.is_dynamic() {
        return;
    }

    let approach = (particle_velocity - velocity_at(body, point)).dot(normal);
    if approach >= 0.0 {
        return;
    }

    let body_mass = body.mass();
    let reduced_mass = if body_mass > 0.0 {
        particle_mass * body_mass / (particle_mass + body_mass)
    } else {
        particle_mass
    };
    let impulse = approach * reduced_mass * normal;

    body.apply_impulse_at_point(to_vector(impulse), to_point(point), true);
}

/// Remove the sliding velocity a contact's friction can absorb.
///
/// `velocity` is relative to the touched surface. The normal push of the
/// substep stands in for the normal impulse, as in Coulomb friction.
pub fn apply_friction(velocity: Vec2, normal: Vec2, push: f32, friction: f32, dt: f32) -> Vec2 {
    let vn = velocity.dot(normal);
    let tangent = velocity - vn * normal;
    let speed = tangent.length();
    if speed < 1e-9 {
        return velocity;
    }

    let reduction = (friction * push / dt).min(speed);
    velocity - tangent * (reduction / speed)
}
