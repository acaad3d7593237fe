//! One-shot spawning of the liquid.

use bevy::prelude::*;

use super::geometry::VesselConfig;
use super::units::UnitScale;
use crate::fluid::params::ParticleSystemDef;
use crate::fluid::particle::{ParticleGroup, ParticleGroupDef};
use crate::fluid::simulation::ParticleSystemHandle;
use crate::physics::world::PhysicsWorld;

/// Gap between the vessel rim and the bottom of a block spawned above it,
/// in pixels.
pub const VESSEL_SPAWN_GAP: f32 = 4.0;

/// Axis-aligned spawn rectangle, in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Reflect)]
pub struct SpawnRegion {
    pub center: Vec2,
    pub half_extents: Vec2,
}

impl SpawnRegion {
    pub fn new(center: Vec2, half_extents: Vec2) -> Self {
        Self {
            center,
            half_extents,
        }
    }

    /// A block `half_height` pixels tall sitting just above the vessel rim
    /// and spanning its inner width, one particle radius clear of the walls.
    pub fn above_vessel(vessel: &VesselConfig, half_height: f32, radius_px: f32) -> Self {
        let half_width = (0.5 * vessel.inner_width() - radius_px).max(0.0);
        let bottom = vessel.rim_y() - VESSEL_SPAWN_GAP;

        Self {
            center: Vec2::new(vessel.center.x, bottom - half_height),
            half_extents: Vec2::new(half_width, half_height),
        }
    }
}

/// Register the particle system and fill `region` with water.
///
/// The region is converted to meters; particles sit on a square lattice
/// starting at the region's min corner.
pub fn spawn_fluid_block(
    world: &mut PhysicsWorld,
    region: &SpawnRegion,
    def: &ParticleSystemDef,
    scale: UnitScale,
) -> (ParticleSystemHandle, ParticleGroup) {
    let handle = world.create_particle_system(def);
    let group_def = ParticleGroupDef::water_box(
        scale.vec_to_simulation(region.center),
        scale.vec_to_simulation(region.half_extents),
    );
    let group = world.particle_system_mut(handle).create_particle_group(&group_def);

    info!(
        "Spawned {} particles (radius {} m, damping {})",
        group.count, def.radius, def.damping_strength
    );
    (handle, group)
}
