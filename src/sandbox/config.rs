//! Scene configuration.

use bevy::prelude::*;

use super::geometry::{BarPose, VesselConfig};
use super::source::SpawnRegion;
use super::units::{METER, UnitScale};
use crate::fluid::params::ParticleSystemDef;

/// Window size in pixels; the enclosure matches it.
pub const WINDOW_SIZE: Vec2 = Vec2::new(800.0, 460.0);

/// Where the liquid block starts.
#[derive(Clone, Copy, Debug, PartialEq, Reflect)]
pub enum FluidPlacement {
    /// A fixed region, in pixels.
    Region(SpawnRegion),
    /// Just above the vessel, `half_height` pixels tall.
    AboveVessel { half_height: f32 },
}

/// Configuration of a sandbox session.
///
/// The defaults are the rain scenario.
#[derive(Resource, Clone, Debug, Reflect)]
#[reflect(Resource)]
pub struct SandboxConfig {
    /// Window and enclosure size in pixels.
    pub window_size: Vec2,

    pub scale: UnitScale,

    /// Gravity in m/s², y down.
    pub gravity: Vec2,

    /// Physics step per tick in seconds.
    pub timestep: f32,

    pub velocity_iterations: u32,
    pub position_iterations: u32,

    /// Particle radius in meters.
    pub particle_radius: f32,

    /// Pairwise particle damping.
    pub damping: f32,

    pub fluid: FluidPlacement,

    pub bar: BarPose,

    /// Catch vessel, present only in the bowl scenario.
    pub vessel: Option<VesselConfig>,
}

impl Default for SandboxConfig {
    fn default() -> Self {
        Self::rain()
    }
}

impl SandboxConfig {
    /// Water pours in through the open top onto a leaning bar.
    pub fn rain() -> Self {
        Self {
            window_size: WINDOW_SIZE,
            scale: METER,
            gravity: Vec2::new(0.0, 5.0),
            timestep: 1.0 / 30.0,
            velocity_iterations: 8,
            position_iterations: 3,
            particle_radius: 0.025,
            damping: 0.4,
            // 2.5 x 2.5 m block centered at (2.0, -1.25) m
            fluid: FluidPlacement::Region(SpawnRegion::new(
                Vec2::new(200.0, -125.0),
                Vec2::new(125.0, 125.0),
            )),
            bar: BarPose::default(),
            vessel: None,
        }
    }

    /// A smaller block drops into a bowl.
    pub fn bowl() -> Self {
        Self {
            fluid: FluidPlacement::AboveVessel { half_height: 40.0 },
            ..Self::rain()
        }
        .with_particles(0.03, 0.1)
        .with_vessel(Some(VesselConfig::default()))
    }

    pub fn with_window_size(mut self, size: Vec2) -> Self {
        self.window_size = size;
        self
    }

    pub fn with_gravity(mut self, gravity: Vec2) -> Self {
        self.gravity = gravity;
        self
    }

    pub fn with_particles(mut self, radius: f32, damping: f32) -> Self {
        self.particle_radius = radius;
        self.damping = damping;
        self
    }

    pub fn with_fluid_region(mut self, region: SpawnRegion) -> Self {
        self.fluid = FluidPlacement::Region(region);
        self
    }

    pub fn with_bar(mut self, bar: BarPose) -> Self {
        self.bar = bar;
        self
    }

    pub fn with_vessel(mut self, vessel: Option<VesselConfig>) -> Self {
        self.vessel = vessel;
        self
    }

    /// Particle system parameters for this scene.
    pub fn particle_system_def(&self) -> ParticleSystemDef {
        ParticleSystemDef::water(self.particle_radius, self.damping)
    }

    /// The spawn region in pixels. Falls back to a region at the window
    /// center when placement above a missing vessel is requested.
    pub fn spawn_region(&self) -> SpawnRegion {
        match (self.fluid, self.vessel) {
            (FluidPlacement::Region(region), _) => region,
            (FluidPlacement::AboveVessel { half_height }, Some(vessel)) => {
                let radius_px = self.scale.to_presentation(self.particle_radius);
                SpawnRegion::above_vessel(&vessel, half_height, radius_px)
            }
            (FluidPlacement::AboveVessel { half_height }, None) => {
                SpawnRegion::new(0.5 * self.window_size, Vec2::splat(half_height))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rain_defaults() {
        let config = SandboxConfig::default();

        assert_eq!(config.window_size, Vec2::new(800.0, 460.0));
        assert_eq!(config.gravity, Vec2::new(0.0, 5.0));
        assert_eq!(config.velocity_iterations, 8);
        assert_eq!(config.position_iterations, 3);
        assert!(config.vessel.is_none());

        let region = config.spawn_region();
        assert_eq!(config.scale.vec_to_simulation(region.center), Vec2::new(2.0, -1.25));
    }

    #[test]
    fn test_bowl_spawns_above_vessel() {
        let config = SandboxConfig::bowl();
        let vessel = config.vessel.unwrap();
        let region = config.spawn_region();

        assert_eq!(config.particle_radius, 0.03);
        assert_eq!(config.damping, 0.1);
        assert_eq!(region.center.x, vessel.center.x);
        assert!(region.center.y < vessel.rim_y());
    }

    #[test]
    fn test_builders() {
        let config = SandboxConfig::rain()
            .with_window_size(Vec2::new(300.0, 200.0))
            .with_gravity(Vec2::ZERO)
            .with_particles(0.05, 0.2);

        assert_eq!(config.window_size, Vec2::new(300.0, 200.0));
        assert_eq!(config.gravity, Vec2::ZERO);
        assert_eq!(config.particle_system_def().radius, 0.05);
        assert_eq!(config.particle_system_def().damping_strength, 0.2);
    }
}
