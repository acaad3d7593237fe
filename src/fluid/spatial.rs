//! Spatial hashing for neighbor search.
//!
//! Cells are hashed into a fixed-size table, so the grid is unbounded:
//! particles that leave the window keep falling and still find their
//! neighbors. Each particle remembers its cell, which lets lookups skip
//! entries that only share a bucket through a hash collision.

use bevy::prelude::*;

/// Configuration for the spatial hash grid.
#[derive(Clone, Debug, Reflect)]
pub struct SpatialHashConfig {
    /// Size of each grid cell (should be >= smoothing radius).
    pub cell_size: f32,

    /// Table size for the hash table (prime for good distribution).
    pub hash_table_size: u32,
}

impl Default for SpatialHashConfig {
    fn default() -> Self {
        Self {
            cell_size: 0.1,
            hash_table_size: 16_381,
        }
    }
}

impl SpatialHashConfig {
    pub fn new(cell_size: f32, hash_table_size: u32) -> Self {
        Self {
            cell_size,
            hash_table_size: hash_table_size.max(1),
        }
    }

    /// Calculate the grid cell for a position.
    pub fn position_to_cell(&self, position: Vec2) -> IVec2 {
        (position / self.cell_size).floor().as_ivec2()
    }

    /// Calculate the hash for a cell coordinate.
    pub fn cell_to_hash(&self, cell: IVec2) -> u32 {
        // Large primes for hash mixing
        const P1: u32 = 73856093;
        const P2: u32 = 19349663;

        let x = cell.x as u32;
        let y = cell.y as u32;

        (x.wrapping_mul(P1) ^ y.wrapping_mul(P2)) % self.hash_table_size
    }

    /// Get neighboring cell offsets for a 3x3 neighborhood.
    pub fn neighbor_offsets() -> &'static [IVec2; 9] {
        static OFFSETS: [IVec2; 9] = [
            IVec2::new(-1, -1),
            IVec2::new(0, -1),
            IVec2::new(1, -1),
            IVec2::new(-1, 0),
            IVec2::new(0, 0),
            IVec2::new(1, 0),
            IVec2::new(-1, 1),
            IVec2::new(0, 1),
            IVec2::new(1, 1),
        ];
        &OFFSETS
    }
}

/// CPU spatial hash over particle positions.
#[derive(Debug, Default)]
pub struct CpuSpatialHash {
    /// Hash table mapping bucket -> particle indices.
    table: Vec<Vec<usize>>,
    /// Cell of every particle at build time.
    cells: Vec<IVec2>,
    config: SpatialHashConfig,
}

impl CpuSpatialHash {
    pub fn new(config: SpatialHashConfig) -> Self {
        let table = vec![Vec::new(); config.hash_table_size as usize];
        Self {
            table,
            cells: Vec::new(),
            config,
        }
    }

    pub fn config(&self) -> &SpatialHashConfig {
        &self.config
    }

    pub fn clear(&mut self) {
        for bucket in &mut self.table {
            bucket.clear();
        }
        self.cells.clear();
    }

    /// Build the hash table from particle positions.
    pub fn build(&mut self, positions: &[Vec2]) {
        self.clear();
        for (i, &pos) in positions.iter().enumerate() {
            let cell = self.config.position_to_cell(pos);
            let hash = self.config.cell_to_hash(cell) as usize;
            self.table[hash].push(i);
            self.cells.push(cell);
        }
    }

    /// Append every particle within `radius` of `position`, except `skip`,
    /// to `out`.
    pub fn query(
        &self,
        position: Vec2,
        positions: &[Vec2],
        radius: f32,
        skip: Option<usize>,
        out: &mut Vec<usize>,
    ) {
        let cell = self.config.position_to_cell(position);
        let radius_sq = radius * radius;

        for offset in SpatialHashConfig::neighbor_offsets() {
            let neighbor_cell = cell + *offset;
            let hash = self.config.cell_to_hash(neighbor_cell) as usize;
            for &j in &self.table[hash] {
                if Some(j) == skip || self.cells[j] != neighbor_cell {
                    continue;
                }
                if (positions[j] - position).length_squared() < radius_sq {
                    out.push(j);
                }
            }
        }
    }
}

/// Neighbor lists of all particles, stored contiguously.
#[derive(Debug, Default)]
pub struct NeighborList {
    offsets: Vec<usize>,
    indices: Vec<usize>,
}

impl NeighborList {
    /// Gather the neighbors of every particle from a built hash.
    pub fn build(&mut self, hash: &CpuSpatialHash, positions: &[Vec2], radius: f32) {
        self.offsets.clear();
        self.indices.clear();
        self.offsets.push(0);
        for (i, &pos) in positions.iter().enumerate() {
            hash.query(pos, positions, radius, Some(i), &mut self.indices);
            self.offsets.push(self.indices.len());
        }
    }

    /// Neighbors of particle `i`, excluding itself.
    pub fn of(&self, i: usize) -> &[usize] {
        &self.indices[self.offsets[i]..self.offsets[i + 1]]
    }

    pub fn len(&self) -> usize {
        self.offsets.len().saturating_sub(1)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
