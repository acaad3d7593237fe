//! Particle groups and spawning.
//!
//! Particles are created in batches. A group fills a shape with a square
//! lattice and appends the result to the end of the particle buffer, so a
//! group is just a contiguous index range.

use std::ops::Range;

use bevy::prelude::*;

/// Behavior flags of a particle. Only water exists.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Reflect)]
pub struct ParticleFlags(pub u32);

impl ParticleFlags {
    /// Plain liquid.
    pub const WATER: Self = Self(0);
}

/// Region filled by a spawn group.
#[derive(Clone, Copy, Debug, PartialEq, Reflect)]
pub enum GroupShape {
    /// Axis-aligned rectangle.
    Box { center: Vec2, half_extents: Vec2 },
}

/// Construction parameters for a spawn group.
#[derive(Clone, Debug)]
pub struct ParticleGroupDef {
    pub shape: GroupShape,
    pub flags: ParticleFlags,
    pub linear_velocity: Vec2,
}

impl ParticleGroupDef {
    /// A rectangle of water at rest.
    pub fn water_box(center: Vec2, half_extents: Vec2) -> Self {
        Self {
            shape: GroupShape::Box {
                center,
                half_extents,
            },
            flags: ParticleFlags::WATER,
            linear_velocity: Vec2::ZERO,
        }
    }

    /// Lattice positions covering the shape.
    pub fn generate_positions(&self, spacing: f32) -> Vec<Vec2> {
        let mut positions = Vec::new();

        match self.shape {
            GroupShape::Box {
                center,
                half_extents,
            } => {
                let min = center - half_extents;
                let max = center + half_extents;
                // Integer steps so rounding never drops the last row.
                let columns = ((max.x - min.x) / spacing + 1e-4).floor() as usize + 1;
                let rows = ((max.y - min.y) / spacing + 1e-4).floor() as usize + 1;

                positions.reserve(columns * rows);
                for row in 0..rows {
                    for column in 0..columns {
                        positions.push(min + Vec2::new(column as f32, row as f32) * spacing);
                    }
                }
            }
        }

        positions
    }
}

/// Index range of the particles created by one group.
#[derive(Clone, Debug, PartialEq, Eq, Reflect)]
pub struct ParticleGroup {
    pub first: usize,
    pub count: usize,
    pub flags: ParticleFlags,
}

impl ParticleGroup {
    pub fn range(&self) -> Range<usize> {
        self.first..self.first + self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_box_group_positions() {
        let def = ParticleGroupDef::water_box(Vec2::ZERO, Vec2::splat(0.5));
        let positions = def.generate_positions(0.5);

        // 3x3 lattice from -0.5 to 0.5
        assert_eq!(positions.len(), 9);
        assert_eq!(positions[0], Vec2::splat(-0.5));
        for pos in &positions {
            assert!(pos.x.abs() <= 0.5 + 1e-4 && pos.y.abs() <= 0.5 + 1e-4);
        }
    }

    #[test]
    fn test_degenerate_box_yields_one_particle() {
        let center = Vec2::new(-0.015, 1.0);
        let def = ParticleGroupDef::water_box(center, Vec2::ZERO);
        let positions = def.generate_positions(0.0375);

        assert_eq!(positions, vec![center]);
    }

    #[test]
    fn test_unit_block_count() {
        let def = ParticleGroupDef::water_box(Vec2::new(2.0, 1.0), Vec2::splat(0.5));
        let positions = def.generate_positions(0.0375);

        // 1 m / 0.0375 m = 26.67 steps -> 27 per axis
        assert_eq!(positions.len(), 27 * 27);
    }

    #[test]
    fn test_group_range() {
        let group = ParticleGroup {
            first: 10,
            count: 5,
            flags: ParticleFlags::WATER,
        };

        assert_eq!(group.range(), 10..15);
        assert!(!group.is_empty());
    }
}
