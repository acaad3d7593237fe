//! Bodies and their box fixtures.
//!
//! [`BodyDef`] and [`FixtureDef`] describe what the scene builders want; the
//! world turns them into rapier rigid bodies and cuboid colliders. [`Body`]
//! and [`BodyMut`] read and steer one body in Bevy math types.

use bevy::prelude::*;
use rapier2d::math::{Isometry, Point, Real, Vector};
use rapier2d::prelude::{Collider, ColliderBuilder, ColliderSet, RigidBody, RigidBodyBuilder, RigidBodyHandle};

/// Opaque handle to a body owned by a [`PhysicsWorld`](super::world::PhysicsWorld).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BodyHandle(pub(crate) RigidBodyHandle);

/// How a body takes part in the simulation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Reflect)]
pub enum BodyType {
    /// Immovable, infinite mass.
    #[default]
    Static,
    /// Finite mass, integrated under gravity and contact impulses.
    Dynamic,
}

/// Construction parameters for a body.
#[derive(Clone, Copy, Debug, Default)]
pub struct BodyDef {
    pub body_type: BodyType,
    pub position: Vec2,
    pub angle: f32,
}

impl BodyDef {
    /// A static body at the origin.
    pub fn fixed() -> Self {
        Self::default()
    }

    /// A dynamic body at the origin.
    pub fn dynamic() -> Self {
        Self {
            body_type: BodyType::Dynamic,
            ..default()
        }
    }

    /// Set the initial position.
    pub fn with_position(mut self, position: Vec2) -> Self {
        self.position = position;
        self
    }

    /// Set the initial rotation in radians.
    pub fn with_angle(mut self, angle: f32) -> Self {
        self.angle = angle;
        self
    }

    pub(crate) fn build(&self) -> RigidBody {
        let builder = match self.body_type {
            BodyType::Static => RigidBodyBuilder::fixed(),
            BodyType::Dynamic => RigidBodyBuilder::dynamic(),
        };
        builder
            .translation(to_vector(self.position))
            .rotation(self.angle)
            .build()
    }
}

/// Oriented rectangle in the body's local frame.
#[derive(Clone, Copy, Debug, PartialEq, Reflect)]
pub struct BoxShape {
    /// Half width and half height.
    pub half_extents: Vec2,
    /// Center offset from the body origin.
    pub center: Vec2,
    /// Rotation relative to the body, in radians.
    pub angle: f32,
}

impl BoxShape {
    /// A box centered on the body origin.
    pub fn new(half_width: f32, half_height: f32) -> Self {
        Self {
            half_extents: Vec2::new(half_width, half_height),
            center: Vec2::ZERO,
            angle: 0.0,
        }
    }

    /// A box with a center offset and rotation.
    pub fn with_center_angle(half_width: f32, half_height: f32, center: Vec2, angle: f32) -> Self {
        Self {
            half_extents: Vec2::new(half_width, half_height),
            center,
            angle,
        }
    }
}

/// Construction parameters for a fixture.
#[derive(Clone, Copy, Debug)]
pub struct FixtureDef {
    pub shape: BoxShape,
    pub density: f32,
    pub friction: f32,
    pub restitution: f32,
}

impl FixtureDef {
    /// Fixture with default friction (0.2) and no restitution.
    pub fn new(shape: BoxShape, density: f32) -> Self {
        Self {
            shape,
            density,
            friction: 0.2,
            restitution: 0.0,
        }
    }

    /// A cuboid collider placed relative to its parent body.
    pub(crate) fn build(&self) -> Collider {
        let h = self.shape.half_extents;
        ColliderBuilder::cuboid(h.x, h.y)
            .position(Isometry::new(to_vector(self.shape.center), self.shape.angle))
            .density(self.density)
            .friction(self.friction)
            .restitution(self.restitution)
            .build()
    }
}

/// The box and friction of a collider attached to a body.
#[derive(Clone, Copy, Debug, PartialEq, Reflect)]
pub struct Fixture {
    pub shape: BoxShape,
    pub friction: f32,
}

impl Fixture {
    /// Read a cuboid collider back. Other shapes are not fixtures.
    pub(crate) fn from_collider(collider: &Collider) -> Option<Self> {
        let cuboid = collider.shape().as_cuboid()?;
        let local = collider.position_wrt_parent().unwrap_or(collider.position());

        Some(Self {
            shape: BoxShape {
                half_extents: to_vec2(&cuboid.half_extents),
                center: to_vec2(&local.translation.vector),
                angle: local.rotation.angle(),
            },
            friction: collider.friction(),
        })
    }
}

/// Read access to a body.
#[derive(Clone, Copy)]
pub struct Body<'a> {
    pub(crate) body: &'a RigidBody,
    pub(crate) colliders: &'a ColliderSet,
}

impl<'a> Body<'a> {
    pub fn body_type(&self) -> BodyType {
        if self.body.is_dynamic() {
            BodyType::Dynamic
        } else {
            BodyType::Static
        }
    }

    pub fn is_dynamic(&self) -> bool {
        self.body.is_dynamic()
    }

    /// Position of the body origin.
    pub fn position(&self) -> Vec2 {
        to_vec2(self.body.translation())
    }

    /// Rotation in radians.
    pub fn angle(&self) -> f32 {
        self.body.rotation().angle()
    }

    pub fn linear_velocity(&self) -> Vec2 {
        to_vec2(self.body.linvel())
    }

    pub fn angular_velocity(&self) -> f32 {
        self.body.angvel()
    }

    pub fn mass(&self) -> f32 {
        self.body.mass()
    }

    /// Box fixtures in the order they were attached.
    pub fn fixtures(&self) -> impl Iterator<Item = Fixture> + use<'a> {
        let colliders = self.colliders;
        self.body
            .colliders()
            .iter()
            .filter_map(move |&handle| colliders.get(handle))
            .filter_map(Fixture::from_collider)
    }

    /// Transform a point from the body frame to world space.
    pub fn world_point(&self, local: Vec2) -> Vec2 {
        let point = self.body.position() * to_point(local);
        Vec2::new(point.x, point.y)
    }
}

/// Write access to a body.
pub struct BodyMut<'a> {
    pub(crate) body: &'a mut RigidBody,
}

impl BodyMut<'_> {
    pub fn position(&self) -> Vec2 {
        to_vec2(self.body.translation())
    }

    /// Set the linear velocity. Ignored for static bodies.
    pub fn set_linear_velocity(&mut self, velocity: Vec2) {
        if self.body.is_dynamic() {
            self.body.set_linvel(to_vector(velocity), true);
        }
    }

    /// Teleport the body origin and set its rotation.
    pub fn set_transform(&mut self, position: Vec2, angle: f32) {
        self.body
            .set_position(Isometry::new(to_vector(position), angle), true);
    }
}

#[inline]
pub(crate) fn to_vector(v: Vec2) -> Vector<Real> {
    Vector::new(v.x, v.y)
}

#[inline]
pub(crate) fn to_point(v: Vec2) -> Point<Real> {
    Point::new(v.x, v.y)
}

#[inline]
pub(crate) fn to_vec2(v: &Vector<Real>) -> Vec2 {
    Vec2::new(v.x, v.y)
}

/// Velocity of a world-space point attached to `body`.
pub(crate) fn velocity_at(body: &RigidBody, point: Vec2) -> Vec2 {
    to_vec2(&body.velocity_at_point(&to_point(point)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_body_def_builds_posed_body() {
        let body = BodyDef::dynamic()
            .with_position(Vec2::new(2.0, -1.0))
            .with_angle(0.7)
            .build();

        assert!(body.is_dynamic());
        assert_eq!(to_vec2(body.translation()), Vec2::new(2.0, -1.0));
        assert!((body.rotation().angle() - 0.7).abs() < 1e-6);
        assert!(BodyDef::fixed().build().is_fixed());
    }

    #[test]
    fn test_fixture_reads_back_its_box() {
        let shape = BoxShape::with_center_angle(0.5, 0.25, Vec2::new(1.0, 2.0), 0.3);
        let collider = FixtureDef::new(shape, 5.0).build();

        let fixture = Fixture::from_collider(&collider).unwrap();
        assert!((fixture.shape.half_extents - shape.half_extents).length() < 1e-6);
        assert!((fixture.shape.center - shape.center).length() < 1e-6);
        assert!((fixture.shape.angle - 0.3).abs() < 1e-6);
        assert_eq!(fixture.friction, 0.2);
    }

    #[test]
    fn test_non_box_collider_is_not_a_fixture() {
        let ball = ColliderBuilder::ball(1.0).build();
        assert!(Fixture::from_collider(&ball).is_none());
    }

    #[test]
    fn test_velocity_at_includes_spin() {
        let mut body = BodyDef::dynamic().build();
        body.set_angvel(2.0, true);

        // A point one meter along +x moves along +y when spinning positively.
        let v = velocity_at(&body, Vec2::new(1.0, 0.0));
        assert!((v - Vec2::new(0.0, 2.0)).length() < 1e-5);
    }
}
