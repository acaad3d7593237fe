//! Particle system parameters.
//!
//! A particle system is configured once, when it is registered with the
//! world. Only the radius and damping strength are scene-level choices; the
//! remaining knobs tune the position-based solver and default to values
//! that keep a water block stable at a 1/30 s step.

use bevy::prelude::*;

/// Lattice stride of a spawn group, as a fraction of the particle diameter.
pub const PARTICLE_STRIDE: f32 = 0.75;

/// Smoothing kernel radius, as a multiple of the particle radius.
pub const SMOOTHING_SCALE: f32 = 4.0;

/// Parameters of a particle system.
#[derive(Clone, Debug, Reflect)]
pub struct ParticleSystemDef {
    /// Particle radius in meters.
    pub radius: f32,

    /// Strength of the pairwise damping that removes approach velocity
    /// between touching particles. 0 = none, 1 = fully inelastic.
    pub damping_strength: f32,

    /// Mass per unit area, used when particles push bodies.
    pub density: f32,

    /// Constraint relaxation relative to the stiffness of a rest lattice.
    /// Larger values make the fluid softer.
    pub relaxation: f32,

    /// XSPH viscosity coefficient.
    pub viscosity: f32,

    /// Artificial pressure strength (tensile instability correction).
    pub surface_tension: f32,

    /// Coulomb friction against fixtures.
    pub boundary_friction: f32,

    /// Density constraint iterations per substep.
    pub solver_iterations: u32,

    /// Substeps per world step.
    pub substeps: u32,

    /// Buckets in the neighbor hash table. Prime.
    pub hash_table_size: u32,
}

impl Default for ParticleSystemDef {
    fn default() -> Self {
        Self {
            radius: 0.025,
            damping_strength: 0.4,
            density: 1.0,
            relaxation: 0.05,
            viscosity: 0.05,
            surface_tension: 0.001,
            boundary_friction: 0.2,
            solver_iterations: 3,
            substeps: 3,
            hash_table_size: 16_381,
        }
    }
}

impl ParticleSystemDef {
    /// Water with the given radius and damping.
    pub fn water(radius: f32, damping_strength: f32) -> Self {
        Self::default().with_radius(radius).with_damping(damping_strength)
    }

    pub fn with_radius(mut self, radius: f32) -> Self {
        self.radius = radius;
        self
    }

    pub fn with_damping(mut self, damping_strength: f32) -> Self {
        self.damping_strength = damping_strength;
        self
    }

    pub fn diameter(&self) -> f32 {
        2.0 * self.radius
    }

    /// Distance between neighbors in a freshly spawned group.
    pub fn spacing(&self) -> f32 {
        PARTICLE_STRIDE * self.diameter()
    }

    /// Smoothing kernel radius (h).
    pub fn smoothing_radius(&self) -> f32 {
        SMOOTHING_SCALE * self.radius
    }

    /// Mass of one particle: the lattice cell it fills times density.
    pub fn particle_mass(&self) -> f32 {
        let spacing = self.spacing();
        self.density * spacing * spacing
    }

    /// 2D poly6 kernel coefficient, 4 / (π h⁸).
    pub fn poly6_coefficient(&self) -> f32 {
        4.0 / (std::f32::consts::PI * self.smoothing_radius().powi(8))
    }

    /// 2D spiky gradient coefficient, -30 / (π h⁵).
    pub fn spiky_gradient_coefficient(&self) -> f32 {
        -30.0 / (std::f32::consts::PI * self.smoothing_radius().powi(5))
    }
}
