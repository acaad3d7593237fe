//! PBF (Position Based Fluids) kernels and constraint calibration.
//!
//! Implements the 2D forms of the kernels from "Position Based Fluids" by
//! Macklin & Müller (2013). Particle mass is normalized to 1 inside the
//! solver, so the rest density is whatever a particle sees sitting in the
//! middle of a freshly spawned lattice. That way a spawn group starts
//! exactly at rest.

use bevy::prelude::*;

use super::params::ParticleSystemDef;

/// SPH kernel functions for PBF, in two dimensions.
pub struct SphKernels;

impl SphKernels {
    /// Poly6 kernel for density estimation.
    /// W(r, h) = (4 / πh⁸) * (h² - r²)³ for r ≤ h
    #[inline]
    pub fn poly6(r_sq: f32, h: f32) -> f32 {
        let coeff = 4.0 / (std::f32::consts::PI * h.powi(8));
        Self::poly6_with_coeff(r_sq, h, coeff)
    }

    /// Poly6 kernel with precomputed coefficient.
    #[inline]
    pub fn poly6_with_coeff(r_sq: f32, h: f32, coeff: f32) -> f32 {
        let h_sq = h * h;
        if r_sq >= h_sq {
            return 0.0;
        }
        let diff = h_sq - r_sq;
        coeff * diff * diff * diff
    }

    /// Gradient of the Spiky kernel.
    /// ∇W(r, h) = -(30 / πh⁵) * (h - |r|)² * (r / |r|) for r ≤ h
    #[inline]
    pub fn spiky_gradient(r: Vec2, h: f32) -> Vec2 {
        let coeff = -30.0 / (std::f32::consts::PI * h.powi(5));
        Self::spiky_gradient_with_coeff(r, h, coeff)
    }

    /// Spiky gradient with precomputed coefficient.
    #[inline]
    pub fn spiky_gradient_with_coeff(r: Vec2, h: f32, coeff: f32) -> Vec2 {
        let r_len = r.length();
        if r_len >= h || r_len < 1e-6 {
            return Vec2::ZERO;
        }
        let diff = h - r_len;
        coeff * diff * diff * (r / r_len)
    }
}

/// Constants derived once per particle system.
#[derive(Clone, Copy, Debug)]
pub struct SolverConstants {
    pub smoothing_radius: f32,
    pub poly6_coeff: f32,
    pub spiky_coeff: f32,
    /// Density of an interior lattice particle.
    pub rest_density: f32,
    /// Denominator regularization for lambda.
    pub epsilon: f32,
    /// Kernel value at the artificial pressure reference distance.
    pub w_delta_q: f32,
}

impl SolverConstants {
    pub fn new(def: &ParticleSystemDef) -> Self {
        let h = def.smoothing_radius();
        let poly6_coeff = def.poly6_coefficient();
        let spiky_coeff = def.spiky_gradient_coefficient();
        let (rest_density, stiffness) = lattice_calibration(def.spacing(), h, poly6_coeff, spiky_coeff);
        let delta_q = 0.1 * h;

        Self {
            smoothing_radius: h,
            poly6_coeff,
            spiky_coeff,
            rest_density,
            epsilon: def.relaxation * stiffness,
            w_delta_q: SphKernels::poly6_with_coeff(delta_q * delta_q, h, poly6_coeff),
        }
    }
}

/// Density and constraint-gradient norm of a particle at the center of a
/// square lattice with the given spacing.
pub fn lattice_calibration(spacing: f32, h: f32, poly6_coeff: f32, spiky_coeff: f32) -> (f32, f32) {
    let reach = (h / spacing).ceil() as i32;
    let mut density = 0.0;
    let mut gradients = Vec::new();

    for y in -reach..=reach {
        for x in -reach..=reach {
            let r = Vec2::new(x as f32, y as f32) * spacing;
            density += SphKernels::poly6_with_coeff(r.length_squared(), h, poly6_coeff);
            if x != 0 || y != 0 {
                gradients.push(SphKernels::spiky_gradient_with_coeff(r, h, spiky_coeff));
            }
        }
    }

    let stiffness = gradients
        .iter()
        .map(|g| (*g / density).length_squared())
        .sum();

    (density, stiffness)
}
