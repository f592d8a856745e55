//! Spatial hashing using Morton encoding (Z-order curve).
//!
//! Particles are bucketed into a uniform 2-D grid and sorted by the Morton
//! code of their cell, so each cell is one contiguous run of the sorted
//! list. Neighbor queries walk the cells covering the query radius and
//! return candidates; callers still do the exact distance check.
//!
//! Positions outside the grid clamp to the border cells. Clamping keeps
//! neighboring points in neighboring cells, so queries stay exact, just
//! slower when many particles pile into the border.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Configuration for the spatial hashing grid
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SpatialConfig {
    /// Size of each cell in surface units
    pub cell_size: f32,
    /// Number of cells per dimension (grid is grid_resolution^2)
    pub grid_resolution: u32,
}

impl Default for SpatialConfig {
    fn default() -> Self {
        Self {
            cell_size: 100.0,
            grid_resolution: 64, // 64 * 100px covers a 6400px surface
        }
    }
}

impl SpatialConfig {
    pub fn new(cell_size: f32, grid_resolution: u32) -> Self {
        Self {
            cell_size,
            grid_resolution,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.cell_size.is_finite() && self.cell_size > 0.0) {
            return Err(ConfigError::invalid("spatial.cellSize", "must be a positive number"));
        }
        if !self.grid_resolution.is_power_of_two() {
            return Err(ConfigError::invalid("spatial.gridResolution", "must be a power of 2"));
        }
        if self.grid_resolution > 1 << 16 {
            return Err(ConfigError::invalid("spatial.gridResolution", "must be <= 65536 for 32-bit Morton codes"));
        }
        Ok(())
    }

    /// Total number of cells in the grid
    pub fn total_cells(&self) -> u64 {
        self.grid_resolution as u64 * self.grid_resolution as u64
    }
}

// Spread the low 16 bits of `v` over the even bits of a u32
#[inline]
fn expand_bits(v: u32) -> u32 {
    let mut x = v & 0x0000_FFFF;
    x = (x | (x << 8)) & 0x00FF_00FF;
    x = (x | (x << 4)) & 0x0F0F_0F0F;
    x = (x | (x << 2)) & 0x3333_3333;
    x = (x | (x << 1)) & 0x5555_5555;
    x
}

/// 32-bit Morton code for a cell (each coordinate 0..65535).
#[inline]
pub fn morton_encode(x: u32, y: u32) -> u32 {
    expand_bits(x) | (expand_bits(y) << 1)
}

/// Uniform grid over particle positions, rebuilt every frame.
#[derive(Debug, Clone)]
pub struct SpatialGrid {
    config: SpatialConfig,
    usable: bool,
    /// (morton code, particle index), sorted by code.
    entries: Vec<(u32, usize)>,
}

impl SpatialGrid {
    /// An empty grid. An unusable config (validation failure) degrades to a
    /// single cell, which is correct but quadratic.
    pub fn new(config: SpatialConfig) -> Self {
        Self {
            config,
            usable: config.validate().is_ok(),
            entries: Vec::new(),
        }
    }

    pub fn config(&self) -> &SpatialConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: SpatialConfig) {
        self.config = config;
        self.usable = config.validate().is_ok();
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Re-bucket positions; particle indices are the iteration order.
    pub fn rebuild<I>(&mut self, positions: I)
    where
        I: IntoIterator<Item = Vec2>,
    {
        self.entries.clear();
        for (idx, pos) in positions.into_iter().enumerate() {
            let (cx, cy) = self.cell_of(pos);
            self.entries.push((morton_encode(cx, cy), idx));
        }
        self.entries.sort_unstable();
    }

    fn cell_of(&self, pos: Vec2) -> (u32, u32) {
        if !self.usable {
            return (0, 0);
        }
        let max = (self.config.grid_resolution - 1) as f32;
        let cell = |v: f32| {
            let c = (v / self.config.cell_size).floor();
            // NaN positions land in cell 0
            if c.is_nan() { 0 } else { c.clamp(0.0, max) as u32 }
        };
        (cell(pos.x), cell(pos.y))
    }

    fn cell_run(&self, code: u32) -> &[(u32, usize)] {
        let start = self.entries.partition_point(|&(c, _)| c < code);
        let end = start + self.entries[start..].partition_point(|&(c, _)| c == code);
        &self.entries[start..end]
    }

    /// Push every particle index whose cell may hold a point within
    /// `radius` of `center`.
    pub fn query(&self, center: Vec2, radius: f32, out: &mut Vec<usize>) {
        if self.entries.is_empty() {
            return;
        }
        if !self.usable {
            out.extend(self.entries.iter().map(|&(_, idx)| idx));
            return;
        }

        // Beyond grid_resolution cells every cell is covered anyway
        let reach = if radius > 0.0 {
            (radius / self.config.cell_size)
                .ceil()
                .min(self.config.grid_resolution as f32) as i64
        } else {
            0
        };
        let last = (self.config.grid_resolution - 1) as i64;
        let (cx, cy) = self.cell_of(center);
        let (cx, cy) = (cx as i64, cy as i64);

        for y in (cy - reach).max(0)..=(cy + reach).min(last) {
            for x in (cx - reach).max(0)..=(cx + reach).min(last) {
                let run = self.cell_run(morton_encode(x as u32, y as u32));
                out.extend(run.iter().map(|&(_, idx)| idx));
            }
        }
    }

    /// Call `f(i, j)` with `i < j` for every candidate pair within `radius`
    /// cell reach. Each unordered pair is visited at most once.
    pub fn for_each_candidate_pair<F>(&self, positions: &[Vec2], radius: f32, mut f: F)
    where
        F: FnMut(usize, usize),
    {
        let mut scratch = Vec::new();
        for (i, &pos) in positions.iter().enumerate() {
            scratch.clear();
            self.query(pos, radius, &mut scratch);
            scratch.sort_unstable();
            for &j in scratch.iter().filter(|&&j| j > i) {
                f(i, j);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::within;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn compact_bits(v: u32) -> u32 {
        let mut x = v & 0x5555_5555;
        x = (x | (x >> 1)) & 0x3333_3333;
        x = (x | (x >> 2)) & 0x0F0F_0F0F;
        x = (x | (x >> 4)) & 0x00FF_00FF;
        x = (x | (x >> 8)) & 0x0000_FFFF;
        x
    }

    #[test]
    fn test_morton_round_trip() {
        for &(x, y) in &[(0, 0), (1, 0), (0, 1), (513, 77), (65535, 65535)] {
            let code = morton_encode(x, y);
            assert_eq!(compact_bits(code), x);
            assert_eq!(compact_bits(code >> 1), y);
        }
    }

    #[test]
    fn test_config_validation() {
        assert!(SpatialConfig::default().validate().is_ok());
        assert!(SpatialConfig::new(10.0, 48).validate().is_err());
        assert!(SpatialConfig::new(0.0, 64).validate().is_err());
        assert!(SpatialConfig::new(10.0, 1 << 17).validate().is_err());
        assert_eq!(SpatialConfig::new(10.0, 16).total_cells(), 256);
    }

    #[test]
    fn test_candidate_pairs_cover_brute_force() {
        let mut rng = StdRng::seed_from_u64(42);
        let positions: Vec<Vec2> = (0..300)
            .map(|_| Vec2::new(rng.gen_range(-50.0..900.0), rng.gen_range(-50.0..700.0)))
            .collect();
        let radius = 60.0;

        let mut grid = SpatialGrid::new(SpatialConfig::new(25.0, 16));
        grid.rebuild(positions.iter().copied());
        assert_eq!(grid.len(), positions.len());

        let mut found = Vec::new();
        grid.for_each_candidate_pair(&positions, radius, |i, j| {
            assert!(i < j);
            if within(positions[i], positions[j], radius) {
                found.push((i, j));
            }
        });

        let mut expected = Vec::new();
        for i in 0..positions.len() {
            for j in (i + 1)..positions.len() {
                if within(positions[i], positions[j], radius) {
                    expected.push((i, j));
                }
            }
        }

        found.sort_unstable();
        assert_eq!(found, expected);
    }

    #[test]
    fn test_unusable_config_falls_back_to_single_cell() {
        let positions = [Vec2::new(0.0, 0.0), Vec2::new(5000.0, 5000.0)];
        let mut grid = SpatialGrid::new(SpatialConfig::new(0.0, 3));
        grid.rebuild(positions.iter().copied());

        let mut out = Vec::new();
        grid.query(Vec2::ZERO, 1.0, &mut out);
        out.sort_unstable();
        assert_eq!(out, vec![0, 1]);
    }

    #[test]
    fn test_huge_radius_covers_whole_grid() {
        let positions = [
            Vec2::new(5.0, 5.0),
            Vec2::new(55.0, 55.0),
            Vec2::new(155.0, 15.0),
            Vec2::new(900.0, 900.0),
        ];
        let mut grid = SpatialGrid::new(SpatialConfig::new(10.0, 16));
        grid.rebuild(positions.iter().copied());

        for radius in [1e30, f32::MAX, f32::INFINITY] {
            let mut out = Vec::new();
            grid.query(Vec2::new(55.0, 55.0), radius, &mut out);
            out.sort_unstable();
            assert_eq!(out, vec![0, 1, 2, 3]);
        }

        let mut pairs = 0;
        grid.for_each_candidate_pair(&positions, 1e30, |_, _| pairs += 1);
        assert_eq!(pairs, 6);
    }

    #[test]
    fn test_nan_radius_stays_in_own_cell() {
        let positions = [Vec2::new(5.0, 5.0), Vec2::new(55.0, 55.0)];
        let mut grid = SpatialGrid::new(SpatialConfig::new(10.0, 16));
        grid.rebuild(positions.iter().copied());

        let mut out = Vec::new();
        grid.query(Vec2::new(5.0, 5.0), f32::NAN, &mut out);
        assert_eq!(out, vec![0]);
    }
}
