//! Poisson disk point sampling over a rectangle.
use std::f32::consts::{PI, SQRT_2};

use glam::Vec2;
use mint::Vector2;
use rand::RngCore;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};
use crate::rng::{rand_index, rand_range, RandomState};

/// Candidates tried around each active point unless configured otherwise.
pub const DEFAULT_SAMPLING_RESOLUTION: u32 = 30;

/// Seed used by [`PoissonDiskSampling::generate_default`].
pub const DEFAULT_SEED: u32 = 12345;

/// Largest occupancy grid the sampler will allocate.
const MAX_GRID_CELLS: usize = 1 << 26;

/// Poisson disk sampling: points at least `minimum_radius` apart inside
/// `[0, width) x [0, height)`.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct PoissonDiskSampling {
    /// Minimum distance between any two points.
    pub minimum_radius: f32,
    /// Number of candidates tried around every active point.
    pub sampling_resolution: u32,
    /// Sample a region padded by the radius on every side and crop back, so the
    /// rectangle edges are covered as densely as its interior.
    pub pad_edges: bool,
}

impl Default for PoissonDiskSampling {
    fn default() -> Self {
        Self::new(1.0)
    }
}

impl PoissonDiskSampling {
    pub fn new(minimum_radius: f32) -> Self {
        Self {
            minimum_radius,
            sampling_resolution: DEFAULT_SAMPLING_RESOLUTION,
            pad_edges: false,
        }
    }

    pub fn with_sampling_resolution(mut self, sampling_resolution: u32) -> Self {
        self.sampling_resolution = sampling_resolution;
        self
    }

    pub fn with_pad_edges(mut self, pad_edges: bool) -> Self {
        self.pad_edges = pad_edges;
        self
    }

    /// Checks radius and resolution.
    pub fn validate(&self) -> Result<()> {
        if !self.minimum_radius.is_finite() || self.minimum_radius <= 0.0 {
            return Err(Error::InvalidConfig(format!(
                "minimum radius {} must be finite and > 0",
                self.minimum_radius
            )));
        }
        if self.sampling_resolution == 0 {
            return Err(Error::InvalidConfig(
                "sampling resolution must be > 0".into(),
            ));
        }
        Ok(())
    }

    /// Generates points for a `width x height` rectangle from `seed`.
    ///
    /// The same seed and parameters always produce the same points.
    pub fn generate(&self, width: f32, height: f32, seed: u32) -> Result<Vec<Vector2<f32>>> {
        if seed == 0 {
            return Err(Error::InvalidConfig("random seed cannot be 0".into()));
        }
        let mut rng = RandomState::new(seed)?;
        self.generate_with(width, height, &mut rng)
    }

    /// [`generate`](Self::generate) with [`DEFAULT_SEED`].
    pub fn generate_default(&self, width: f32, height: f32) -> Result<Vec<Vector2<f32>>> {
        self.generate(width, height, DEFAULT_SEED)
    }

    /// Generates points drawing randomness from `rng`.
    pub fn generate_with(
        &self,
        width: f32,
        height: f32,
        rng: &mut dyn RngCore,
    ) -> Result<Vec<Vector2<f32>>> {
        self.validate()?;
        for (name, value) in [("width", width), ("height", height)] {
            if !value.is_finite() || value < 0.0 {
                return Err(Error::InvalidConfig(format!(
                    "{name} {value} must be finite and >= 0"
                )));
            }
        }

        let r = self.minimum_radius;
        let points = if self.pad_edges {
            let padded = Vec2::new(width + 2.0 * r, height + 2.0 * r);
            PoissonDiskSampler::new(r, padded, self.sampling_resolution)?
                .generate(rng)
                .into_iter()
                .map(|p| p - Vec2::splat(r))
                .filter(|p| p.x >= 0.0 && p.x < width && p.y >= 0.0 && p.y < height)
                .collect()
        } else {
            PoissonDiskSampler::new(r, Vec2::new(width, height), self.sampling_resolution)?
                .generate(rng)
        };

        debug!(
            count = points.len(),
            width, height, radius = r, "generated poisson disk points"
        );
        Ok(points.into_iter().map(Into::into).collect())
    }
}

struct PoissonDiskSampler {
    radius_squared: f32,
    radius: f32,
    cell_size: f32,
    rows: usize,
    cols: usize,
    resolution: u32,
    bounds: Vec2,
    grid: Vec<Option<usize>>,
    samples: Vec<Vec2>,
    active: Vec<Vec2>,
}

impl PoissonDiskSampler {
    fn new(radius: f32, bounds: Vec2, resolution: u32) -> Result<Self> {
        let cell_size = radius / SQRT_2;
        let rows = (bounds.y / cell_size).floor() as usize;
        let cols = (bounds.x / cell_size).floor() as usize;
        let cells = rows
            .checked_mul(cols)
            .filter(|&cells| cells <= MAX_GRID_CELLS)
            .ok_or_else(|| {
                Error::InvalidConfig(format!(
                    "occupancy grid of {rows}x{cols} cells is too large for radius {radius}"
                ))
            })?;

        Ok(Self {
            radius_squared: radius * radius,
            radius,
            cell_size,
            rows,
            cols,
            resolution,
            bounds,
            grid: vec![None; cells],
            samples: Vec::new(),
            active: Vec::new(),
        })
    }

    /// Grid cell of `point`, or `None` when it falls outside the grid.
    #[inline]
    fn cell_of(&self, point: Vec2) -> Option<(usize, usize)> {
        let col = (point.x / self.cell_size).floor();
        let row = (point.y / self.cell_size).floor();
        if col < 0.0 || row < 0.0 || col >= self.cols as f32 || row >= self.rows as f32 {
            return None;
        }
        Some((col as usize, row as usize))
    }

    fn is_far_enough(&self, point: Vec2, col: usize, row: usize) -> bool {
        let start_col = col.saturating_sub(2);
        let end_col = (col + 3).min(self.cols);
        let start_row = row.saturating_sub(2);
        let end_row = (row + 3).min(self.rows);

        for y in start_row..end_row {
            for x in start_col..end_col {
                if let Some(index) = self.grid[x + y * self.cols] {
                    if self.samples[index].distance_squared(point) < self.radius_squared {
                        return false;
                    }
                }
            }
        }
        true
    }

    fn add_point(&mut self, point: Vec2, col: usize, row: usize) {
        self.grid[col + row * self.cols] = Some(self.samples.len());
        self.samples.push(point);
        self.active.push(point);
    }

    fn generate(mut self, rng: &mut dyn RngCore) -> Vec<Vec2> {
        if self.grid.is_empty() {
            return Vec::new();
        }

        let first = Vec2::new(
            rand_range(rng, 0.4, 0.6) * self.bounds.x,
            rand_range(rng, 0.4, 0.6) * self.bounds.y,
        );
        match self.cell_of(first) {
            Some((col, row)) => self.add_point(first, col, row),
            None => return Vec::new(),
        }

        let arc = 2.0 * PI / self.resolution as f32;
        let half_arc = arc / 2.0;

        while !self.active.is_empty() {
            let index = rand_index(rng, self.active.len());
            let center = self.active[index];

            let mut found = false;
            for i in 0..self.resolution {
                let length = rand_range(rng, self.radius, self.radius * 2.0);
                let angle = arc * i as f32 + rand_range(rng, -half_arc, half_arc);
                let candidate = center + Vec2::new(angle.cos(), angle.sin()) * length;

                let Some((col, row)) = self.cell_of(candidate) else {
                    continue;
                };
                if !self.is_far_enough(candidate, col, row) {
                    continue;
                }
                self.add_point(candidate, col, row);
                found = true;
            }

            if !found {
                self.active.swap_remove(index);
            }
        }

        self.samples
    }
}
