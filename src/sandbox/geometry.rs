//! Collision geometry of the scene.
//!
//! Every builder takes presentation-space (pixel) dimensions and converts
//! them before creating shapes; the physics world only ever sees meters.
//! The presentation space is y-down, so the window edge at `y = height` is
//! the one gravity pushes the liquid against.

use bevy::prelude::*;

use super::units::UnitScale;
use crate::physics::body::{BodyDef, BodyHandle, BoxShape, FixtureDef};
use crate::physics::world::PhysicsWorld;

/// Half thickness of the enclosure pieces, in meters at any scale.
pub const WALL_HALF_THICKNESS: f32 = 0.05;

/// Bar half extents in meters.
pub const BAR_HALF_EXTENTS: Vec2 = Vec2::new(0.1, 1.0);

pub const BAR_DENSITY: f32 = 5.0;

/// Scales the nominal vessel width down to the visible bowl outline.
pub const VESSEL_WIDTH_CORRECTION: f32 = 0.9;

/// Full thickness of the vessel pieces, in pixels.
pub const VESSEL_WALL_THICKNESS: f32 = 6.0;

/// Pose of the bar body, in meters and radians.
#[derive(Clone, Copy, Debug, PartialEq, Reflect)]
pub struct BarPose {
    pub position: Vec2,
    pub angle: f32,
}

impl Default for BarPose {
    /// Leaning a bit so it tips over on its own.
    fn default() -> Self {
        Self {
            position: Vec2::new(2.5, 2.0),
            angle: 0.15,
        }
    }
}

/// Placement of the catch vessel, in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Reflect)]
pub struct VesselConfig {
    pub center: Vec2,
    /// Nominal width and height of the bowl.
    pub size: Vec2,
}

impl Default for VesselConfig {
    fn default() -> Self {
        Self {
            center: Vec2::new(560.0, 360.0),
            size: Vec2::new(95.0, 62.0),
        }
    }
}

impl VesselConfig {
    /// Width of the collision outline.
    pub fn corrected_width(&self) -> f32 {
        self.size.x * VESSEL_WIDTH_CORRECTION
    }

    /// Free width between the two side walls.
    pub fn inner_width(&self) -> f32 {
        self.corrected_width() - 2.0 * VESSEL_WALL_THICKNESS
    }

    /// The nominal rim: top edge of the bowl's bounding box.
    pub fn rim_y(&self) -> f32 {
        self.center.y - 0.5 * self.size.y
    }

    /// The three vessel pieces relative to the vessel center, as
    /// `(center, half_extents)` pairs in pixels: left wall, right wall,
    /// bottom.
    pub fn pieces(&self) -> [(Vec2, Vec2); 3] {
        let half_width = 0.5 * self.corrected_width();
        let half_height = 0.5 * self.size.y;
        let half_thickness = 0.5 * VESSEL_WALL_THICKNESS;

        // Walls are 4 half-heights tall with their lower end on the bottom
        // edge, so they reach a full height above the rim.
        let wall_half = Vec2::new(half_thickness, 2.0 * half_height);
        let wall_y = half_height - wall_half.y;
        let wall_x = half_width - half_thickness;

        [
            (Vec2::new(-wall_x, wall_y), wall_half),
            (Vec2::new(wall_x, wall_y), wall_half),
            (
                Vec2::new(0.0, half_height - half_thickness),
                Vec2::new(half_width, half_thickness),
            ),
        ]
    }
}

/// Build the static enclosure: a full-width span along `y = height` and a
/// wall beyond each side edge covering the lower half of the window. The
/// `y = 0` edge stays open, so liquid can pour in and slosh out over the
/// walls.
pub fn build_enclosure(world: &mut PhysicsWorld, size: Vec2, scale: UnitScale) -> BodyHandle {
    let width = scale.to_simulation(size.x);
    let height = scale.to_simulation(size.y);
    let t = WALL_HALF_THICKNESS;

    let pieces = [
        // span
        (
            Vec2::new(width / 2.0, t),
            Vec2::new(width / 2.0, height + t),
        ),
        // left wall
        (Vec2::new(t, height / 2.0), Vec2::new(-t, height)),
        // right wall
        (Vec2::new(t, height / 2.0), Vec2::new(width + t, height)),
    ];

    let body = world.create_body(&BodyDef::fixed());
    for (half_extents, center) in pieces {
        let shape = BoxShape::with_center_angle(half_extents.x, half_extents.y, center, 0.0);
        world.create_fixture(body, FixtureDef::new(shape, 0.0));
    }

    info!(
        "Enclosure built: {}x{} m, {} fixtures",
        width,
        height,
        world.body(body).fixtures().count()
    );
    body
}

/// Build the dynamic bar and move it to `pose`.
pub fn build_interactive_bar(world: &mut PhysicsWorld, pose: BarPose) -> BodyHandle {
    let body = world.create_body(&BodyDef::dynamic());
    let shape = BoxShape::new(BAR_HALF_EXTENTS.x, BAR_HALF_EXTENTS.y);
    world.create_fixture(body, FixtureDef::new(shape, BAR_DENSITY));
    world.body_mut(body).set_transform(pose.position, pose.angle);

    info!(
        "Bar built at {:?}, angle {}, mass {:.2} kg",
        pose.position,
        pose.angle,
        world.body(body).mass()
    );
    body
}

/// Build the static catch vessel: an open-top box of three pieces.
pub fn build_vessel(world: &mut PhysicsWorld, vessel: &VesselConfig, scale: UnitScale) -> BodyHandle {
    let body = world.create_body(&BodyDef::fixed().with_position(scale.vec_to_simulation(vessel.center)));

    for (center, half_extents) in vessel.pieces() {
        let half_extents = scale.vec_to_simulation(half_extents);
        let shape = BoxShape::with_center_angle(
            half_extents.x,
            half_extents.y,
            scale.vec_to_simulation(center),
            0.0,
        );
        world.create_fixture(body, FixtureDef::new(shape, 0.0));
    }

    info!("Vessel built at {:?} px, size {:?} px", vessel.center, vessel.size);
    body
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::body::BodyType;
    use crate::sandbox::units::METER;
    use proptest::prelude::*;

    fn close(a: Vec2, b: Vec2) -> bool {
        (a - b).length() < 1e-5
    }

    #[test]
    fn test_enclosure_pieces() {
        let mut world = PhysicsWorld::default();
        let body = build_enclosure(&mut world, Vec2::new(800.0, 460.0), METER);

        let body = world.body(body);
        assert_eq!(body.body_type(), BodyType::Static);

        let fixtures: Vec<_> = body.fixtures().collect();
        assert_eq!(fixtures.len(), 3);

        let span = &fixtures[0].shape;
        assert!(close(span.half_extents, Vec2::new(4.0, 0.05)));
        assert!(close(span.center, Vec2::new(4.0, 4.65)));

        let left = &fixtures[1].shape;
        assert!(close(left.half_extents, Vec2::new(0.05, 2.3)));
        assert!(close(left.center, Vec2::new(-0.05, 4.6)));

        let right = &fixtures[2].shape;
        assert!(close(right.center, Vec2::new(8.05, 4.6)));
    }

    #[test]
    fn test_wall_thickness_ignores_scale() {
        let mut world = PhysicsWorld::default();
        let body = build_enclosure(&mut world, Vec2::new(800.0, 460.0), UnitScale::new(50.0));

        let fixtures: Vec<_> = world.body(body).fixtures().collect();
        assert!((fixtures[0].shape.half_extents.y - WALL_HALF_THICKNESS).abs() < 1e-6);
        assert!((fixtures[0].shape.half_extents.x - 8.0).abs() < 1e-5);
    }

    #[test]
    fn test_bar_is_dynamic_and_posed() {
        let mut world = PhysicsWorld::default();
        let bar = build_interactive_bar(&mut world, BarPose::default());

        let bar = world.body(bar);
        assert!(bar.is_dynamic());
        assert_eq!(bar.position(), Vec2::new(2.5, 2.0));
        assert!((bar.angle() - 0.15).abs() < 1e-6);
        assert_eq!(bar.linear_velocity(), Vec2::ZERO);
        // 0.2 x 2.0 m at density 5
        assert!((bar.mass() - 2.0).abs() < 1e-5);
    }

    #[test]
    fn test_vessel_is_open_on_top() {
        let vessel = VesselConfig::default();
        let mut world = PhysicsWorld::default();
        let body = build_vessel(&mut world, &vessel, METER);

        let body = world.body(body);
        assert_eq!(body.body_type(), BodyType::Static);
        assert!(close(body.position(), Vec2::new(5.6, 3.6)));
        assert_eq!(body.fixtures().count(), 3);

        let [left, right, bottom] = vessel.pieces();
        // Side walls end flush with the bottom edge and rise a full height
        // above the rim.
        assert!((left.0.y + left.1.y - 31.0).abs() < 1e-4);
        assert!((left.0.y - left.1.y + 93.0).abs() < 1e-4);
        assert_eq!(left.0.x, -right.0.x);
        assert!((bottom.0.y + bottom.1.y - 31.0).abs() < 1e-4);
        assert!((vessel.inner_width() - 73.5).abs() < 1e-4);
    }

    proptest! {
        #[test]
        fn prop_enclosure_has_three_fixtures(width in 1.0f32..4000.0, height in 1.0f32..4000.0) {
            let mut world = PhysicsWorld::default();
            let body = build_enclosure(&mut world, Vec2::new(width, height), METER);
            prop_assert_eq!(world.body(body).fixtures().count(), 3);
        }
    }
}
