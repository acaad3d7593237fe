//! Fluid simulation core logic.
//!
//! A [`ParticleSystem`] holds one fluid population. Its position buffer is
//! dense and append-only: particles are added in groups and never removed,
//! so an index names the same particle for the whole session.

use bevy::prelude::*;

use super::boundary::{BoundaryContact, apply_friction, push_body, resolve_fixture_contacts};
use super::params::ParticleSystemDef;
use super::particle::{ParticleGroup, ParticleGroupDef};
use super::solver::{SolverConstants, SphKernels};
use super::spatial::{CpuSpatialHash, NeighborList, SpatialHashConfig};
use rapier2d::prelude::{ColliderSet, RigidBodySet};

use crate::physics::body::velocity_at;

/// Opaque handle to a particle system owned by a world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Reflect)]
pub struct ParticleSystemHandle(pub(crate) usize);

/// One fluid population.
pub struct ParticleSystem {
    def: ParticleSystemDef,
    constants: SolverConstants,
    /// Particle positions (x, y), the engine's position buffer.
    positions: Vec<[f32; 2]>,
    velocities: Vec<Vec2>,
    /// Predicted positions for constraint solving.
    predicted: Vec<Vec2>,
    lambdas: Vec<f32>,
    densities: Vec<f32>,
    deltas: Vec<Vec2>,
    contacts: Vec<Option<BoundaryContact>>,
    groups: Vec<ParticleGroup>,
    hash: CpuSpatialHash,
    neighbors: NeighborList,
}

impl ParticleSystem {
    pub fn new(def: ParticleSystemDef) -> Self {
        let constants = SolverConstants::new(&def);
        let hash = CpuSpatialHash::new(SpatialHashConfig::new(
            constants.smoothing_radius,
            def.hash_table_size,
        ));

        Self {
            def,
            constants,
            positions: Vec::new(),
            velocities: Vec::new(),
            predicted: Vec::new(),
            lambdas: Vec::new(),
            densities: Vec::new(),
            deltas: Vec::new(),
            contacts: Vec::new(),
            groups: Vec::new(),
            hash,
            neighbors: NeighborList::default(),
        }
    }

    pub fn def(&self) -> &ParticleSystemDef {
        &self.def
    }

    pub fn radius(&self) -> f32 {
        self.def.radius
    }

    /// Returns the number of particles.
    pub fn particle_count(&self) -> usize {
        self.positions.len()
    }

    /// Positions as a flat, interleaved `x, y, x, y, ...` slice.
    pub fn position_buffer(&self) -> &[f32] {
        bytemuck::cast_slice(&self.positions)
    }

    /// Positions as `[x, y]` pairs.
    pub fn positions(&self) -> &[[f32; 2]] {
        &self.positions
    }

    pub fn position(&self, index: usize) -> Vec2 {
        Vec2::from(self.positions[index])
    }

    pub fn velocity(&self, index: usize) -> Vec2 {
        self.velocities[index]
    }

    pub fn groups(&self) -> &[ParticleGroup] {
        &self.groups
    }

    /// Append one particle and return its index.
    pub fn create_particle(&mut self, position: Vec2, velocity: Vec2) -> usize {
        self.positions.push(position.to_array());
        self.velocities.push(velocity);
        self.predicted.push(position);
        self.lambdas.push(0.0);
        self.densities.push(0.0);
        self.deltas.push(Vec2::ZERO);
        self.contacts.push(None);
        self.positions.len() - 1
    }

    /// Fill a shape with particles.
    pub fn create_particle_group(&mut self, def: &ParticleGroupDef) -> ParticleGroup {
        let first = self.particle_count();
        let positions = def.generate_positions(self.def.spacing());
        for position in positions {
            self.create_particle(position, def.linear_velocity);
        }

        let group = ParticleGroup {
            first,
            count: self.particle_count() - first,
            flags: def.flags,
        };
        self.groups.push(group.clone());
        group
    }

    /// Advance the fluid by `dt`, colliding with the box colliders of
    /// `bodies` and pushing the dynamic ones.
    pub fn step(&mut self, dt: f32, gravity: Vec2, bodies: &mut RigidBodySet, colliders: &ColliderSet) {
        if self.positions.is_empty() || dt <= 0.0 {
            return;
        }

        let substeps = self.def.substeps.max(1);
        let substep_dt = dt / substeps as f32;

        for _ in 0..substeps {
            self.apply_forces_and_predict(gravity, substep_dt);
            self.collide(bodies, colliders, true);

            self.hash.build(&self.predicted);
            self.neighbors
                .build(&self.hash, &self.predicted, self.constants.smoothing_radius);

            for _ in 0..self.def.solver_iterations {
                self.compute_density_and_lambda();
                self.compute_delta_positions();
                for (p, d) in self.predicted.iter_mut().zip(&self.deltas) {
                    *p += *d;
                }
                self.collide(bodies, colliders, false);
            }

            self.update_velocities(bodies, substep_dt);
            self.apply_damping();
            self.apply_viscosity();

            for (x, p) in self.positions.iter_mut().zip(&self.predicted) {
                *x = p.to_array();
            }
        }
    }

    fn apply_forces_and_predict(&mut self, gravity: Vec2, dt: f32) {
        // A particle never moves more than one diameter per substep.
        let max_speed = self.def.diameter() / dt;

        for i in 0..self.positions.len() {
            let v = (self.velocities[i] + gravity * dt).clamp_length_max(max_speed);
            self.velocities[i] = v;
            self.predicted[i] = Vec2::from(self.positions[i]) + v * dt;
            self.contacts[i] = None;
        }
    }

    fn collide(&mut self, bodies: &mut RigidBodySet, colliders: &ColliderSet, transfer_momentum: bool) {
        let radius = self.def.radius;
        let friction = self.def.boundary_friction;
        let mass = self.def.particle_mass();

        for i in 0..self.predicted.len() {
            let had_contact = self.contacts[i].is_some();
            resolve_fixture_contacts(
                &mut self.predicted[i],
                radius,
                friction,
                bodies,
                colliders,
                &mut self.contacts[i],
            );

            if !transfer_momentum || had_contact {
                continue;
            }
            let Some(contact) = self.contacts[i] else {
                continue;
            };
            if !bodies.get(contact.body).is_some_and(|body| body.is_dynamic()) {
                continue;
            }
            if let Some(body) = bodies.get_mut(contact.body) {
                let point = self.predicted[i] - contact.normal * radius;
                push_body(
                    body,
                    point,
                    contact.normal,
                    self.velocities[i],
                    mass,
                );
            }
        }
    }

    fn compute_density_and_lambda(&mut self) {
        let c = self.constants;
        let h = c.smoothing_radius;

        for i in 0..self.predicted.len() {
            let pi = self.predicted[i];
            let mut density = SphKernels::poly6_with_coeff(0.0, h, c.poly6_coeff);
            let mut grad_sum_sq = 0.0;
            let mut grad_i = Vec2::ZERO;

            for &j in self.neighbors.of(i) {
                let r = pi - self.predicted[j];
                density += SphKernels::poly6_with_coeff(r.length_squared(), h, c.poly6_coeff);

                let grad = SphKernels::spiky_gradient_with_coeff(r, h, c.spiky_coeff) / c.rest_density;
                grad_i += grad;
                grad_sum_sq += grad.length_squared();
            }

            self.densities[i] = density;

            // Only compression is corrected; a free surface is not pulled in.
            let constraint = (density / c.rest_density - 1.0).max(0.0);
            let denom = grad_sum_sq + grad_i.length_squared() + c.epsilon;
            self.lambdas[i] = -constraint / denom;
        }
    }

    fn compute_delta_positions(&mut self) {
        let c = self.constants;
        let h = c.smoothing_radius;
        let k = self.def.surface_tension;

        for i in 0..self.predicted.len() {
            let pi = self.predicted[i];
            let lambda_i = self.lambdas[i];
            let mut delta = Vec2::ZERO;

            for &j in self.neighbors.of(i) {
                let r = pi - self.predicted[j];
                let grad = SphKernels::spiky_gradient_with_coeff(r, h, c.spiky_coeff);

                // Artificial pressure (tensile instability correction)
                let w = SphKernels::poly6_with_coeff(r.length_squared(), h, c.poly6_coeff);
                let s_corr = -k * (w / c.w_delta_q).powi(4);

                delta += (lambda_i + self.lambdas[j] + s_corr) * grad;
            }

            self.deltas[i] = delta / c.rest_density;
        }
    }

    fn update_velocities(&mut self, bodies: &RigidBodySet, dt: f32) {
        let inv_dt = 1.0 / dt;

        for i in 0..self.positions.len() {
            let mut v = (self.predicted[i] - Vec2::from(self.positions[i])) * inv_dt;

            if let Some(contact) = self.contacts[i] {
                let surface = bodies
                    .get(contact.body)
                    .map_or(Vec2::ZERO, |body| velocity_at(body, self.predicted[i]));
                let relative = v - surface;
                // Resting on the surface: no velocity into it.
                let relative = relative - relative.dot(contact.normal).min(0.0) * contact.normal;
                v = surface
                    + apply_friction(relative, contact.normal, contact.push, contact.friction, dt);
            }

            self.velocities[i] = v;
        }
    }

    /// Remove part of the approach velocity between touching particles.
    fn apply_damping(&mut self) {
        let strength = self.def.damping_strength;
        if strength <= 0.0 {
            return;
        }
        let diameter = self.def.diameter();

        for i in 0..self.predicted.len() {
            for &j in self.neighbors.of(i) {
                if j <= i {
                    continue;
                }
                let r = self.predicted[j] - self.predicted[i];
                let distance = r.length();
                if distance >= diameter || distance < 1e-9 {
                    continue;
                }

                let n = r / distance;
                let vn = (self.velocities[j] - self.velocities[i]).dot(n);
                if vn >= 0.0 {
                    continue;
                }

                let weight = 1.0 - distance / diameter;
                let f = 0.5 * strength * weight * vn;
                self.velocities[i] += f * n;
                self.velocities[j] -= f * n;
            }
        }
    }

    /// XSPH viscosity.
    fn apply_viscosity(&mut self) {
        let c = self.def.viscosity;
        if c < 1e-6 {
            return;
        }
        let k = self.constants;
        let h = k.smoothing_radius;

        let velocities = self.velocities.clone();
        for i in 0..self.predicted.len() {
            let pi = self.predicted[i];
            let vi = velocities[i];
            let mut correction = Vec2::ZERO;

            for &j in self.neighbors.of(i) {
                let r = pi - self.predicted[j];
                let w = SphKernels::poly6_with_coeff(r.length_squared(), h, k.poly6_coeff);
                correction += (velocities[j] - vi) * (w / k.rest_density);
            }

            self.velocities[i] = vi + c * correction;
        }
    }

    /// Get average density error (for debugging).
    pub fn average_density_error(&self) -> f32 {
        if self.densities.is_empty() {
            return 0.0;
        }
        let rho0 = self.constants.rest_density;
        let sum: f32 = self
            .densities
            .iter()
            .map(|&d| (d - rho0).max(0.0) / rho0)
            .sum();
        sum / self.densities.len() as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::body::to_vector;
    use rapier2d::prelude::{ColliderBuilder, RigidBodyBuilder};

    fn water() -> ParticleSystem {
        ParticleSystem::new(ParticleSystemDef::water(0.025, 0.4))
    }

    fn floor() -> (RigidBodySet, ColliderSet) {
        let mut bodies = RigidBodySet::new();
        let mut colliders = ColliderSet::new();
        let floor = bodies.insert(RigidBodyBuilder::fixed().translation(to_vector(Vec2::new(0.0, 1.05))).build());
        colliders.insert_with_parent(ColliderBuilder::cuboid(5.0, 0.05).friction(0.2).build(), floor, &mut bodies);
        (bodies, colliders)
    }

    fn no_bodies() -> (RigidBodySet, ColliderSet) {
        (RigidBodySet::new(), ColliderSet::new())
    }

    #[test]
    fn test_position_buffer_is_interleaved() {
        let mut system = water();
        system.create_particle(Vec2::new(1.0, 2.0), Vec2::ZERO);
        system.create_particle(Vec2::new(3.0, 4.0), Vec2::ZERO);

        assert_eq!(system.position_buffer(), &[1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn test_group_appends_to_buffer() {
        let mut system = water();
        let a = system.create_particle_group(&ParticleGroupDef::water_box(Vec2::ZERO, Vec2::splat(0.1)));
        let b = system.create_particle_group(&ParticleGroupDef::water_box(Vec2::ONE, Vec2::splat(0.1)));

        assert_eq!(a.first, 0);
        assert_eq!(b.first, a.count);
        assert_eq!(system.particle_count(), a.count + b.count);
        assert_eq!(system.position_buffer().len(), 2 * system.particle_count());
        assert_eq!(system.groups().len(), 2);
    }

    #[test]
    fn test_free_particle_falls() {
        let mut system = water();
        system.create_particle(Vec2::ZERO, Vec2::ZERO);
        let (mut bodies, colliders) = no_bodies();

        system.step(1.0 / 30.0, Vec2::new(0.0, 5.0), &mut bodies, &colliders);

        let p = system.position(0);
        assert_eq!(p.x, 0.0);
        assert!(p.y > 0.0);
    }

    #[test]
    fn test_isolated_particle_keeps_x_without_gravity() {
        let mut system = water();
        system.create_particle(Vec2::new(-0.015, 1.0), Vec2::ZERO);
        let (mut bodies, colliders) = no_bodies();

        for _ in 0..10 {
            system.step(1.0 / 30.0, Vec2::ZERO, &mut bodies, &colliders);
        }

        assert_eq!(system.position(0), Vec2::new(-0.015, 1.0));
    }

    #[test]
    fn test_block_settles_on_floor() {
        let mut system = water();
        system.create_particle_group(&ParticleGroupDef::water_box(
            Vec2::new(0.0, 0.6),
            Vec2::new(0.2, 0.2),
        ));
        let count = system.particle_count();
        let (mut bodies, colliders) = floor();

        for _ in 0..90 {
            system.step(1.0 / 30.0, Vec2::new(0.0, 5.0), &mut bodies, &colliders);
        }

        assert_eq!(system.particle_count(), count);
        for i in 0..count {
            let p = system.position(i);
            assert!(p.is_finite());
            // Nothing leaks through the floor top at y = 1.0.
            assert!(p.y < 1.0, "particle {i} at {p:?}");
        }
    }

    #[test]
    fn test_velocity_is_limited() {
        let mut system = water();
        system.create_particle(Vec2::ZERO, Vec2::new(100.0, 0.0));

        let (mut bodies, colliders) = no_bodies();
        let dt = 1.0 / 30.0;
        system.step(dt, Vec2::ZERO, &mut bodies, &colliders);

        let limit = system.def().diameter() / (dt / system.def().substeps as f32);
        assert!(system.velocity(0).length() <= limit * 1.001);
    }
}
