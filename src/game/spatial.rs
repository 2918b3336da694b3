//! Spatial obstacle lookup
//!
//! The environment answers "which obstacles are near this point" through
//! [`ObstacleLookup`]. [`ObstacleGrid`] is the match-long implementation:
//! obstacles never move, so every cell's candidate list is computed once up
//! front and queries are a single hash lookup.

use hashbrown::HashMap;
use rustc_hash::FxBuildHasher;

use crate::game::constants::Constants;
use crate::game::state::Obstacle;
use crate::util::vec2::Vec2;

/// Default cell size for the obstacle grid (world units)
pub const OBSTACLE_GRID_CELL_SIZE: f64 = 4.0;

/// Grid cell key - (x, y) cell coordinates
pub type CellKey = (i32, i32);

/// Source of obstacles plausibly near a point
///
/// Implementations return a superset of every obstacle whose edge lies
/// within their reach of `point`, in a stable order.
pub trait ObstacleLookup {
    fn nearby(&self, point: Vec2) -> &[Obstacle];
}

/// Brute force: every obstacle is near every point
impl ObstacleLookup for [Obstacle] {
    #[inline]
    fn nearby(&self, _point: Vec2) -> &[Obstacle] {
        self
    }
}

impl ObstacleLookup for Vec<Obstacle> {
    #[inline]
    fn nearby(&self, _point: Vec2) -> &[Obstacle] {
        self
    }
}

/// Precomputed per-cell obstacle lists
pub struct ObstacleGrid {
    /// Inverse cell size for fast position-to-cell conversion
    inv_cell_size: f64,
    /// Edge distance covered around any point of a cell
    reach: f64,
    /// Obstacles near each non-empty cell, in input order
    cells: HashMap<CellKey, Vec<Obstacle>, FxBuildHasher>,
}

impl ObstacleGrid {
    /// Build the grid so every obstacle whose edge is within `reach` of a
    /// point is listed in that point's cell
    pub fn build(obstacles: &[Obstacle], cell_size: f64, reach: f64) -> Self {
        let inv_cell_size = 1.0 / cell_size;
        let mut cells: HashMap<CellKey, Vec<Obstacle>, FxBuildHasher> = HashMap::default();

        for obstacle in obstacles {
            let extent = obstacle.radius + reach;
            let min_x = ((obstacle.position.x - extent) * inv_cell_size).floor() as i32;
            let max_x = ((obstacle.position.x + extent) * inv_cell_size).floor() as i32;
            let min_y = ((obstacle.position.y - extent) * inv_cell_size).floor() as i32;
            let max_y = ((obstacle.position.y + extent) * inv_cell_size).floor() as i32;

            for cx in min_x..=max_x {
                for cy in min_y..=max_y {
                    // Nearest point of the cell rectangle to the obstacle center
                    let left = cx as f64 * cell_size;
                    let bottom = cy as f64 * cell_size;
                    let nearest = Vec2::new(
                        obstacle.position.x.clamp(left, left + cell_size),
                        obstacle.position.y.clamp(bottom, bottom + cell_size),
                    );
                    if nearest.sqr_distance_to(obstacle.position) <= extent * extent {
                        cells.entry((cx, cy)).or_default().push(*obstacle);
                    }
                }
            }
        }

        tracing::debug!(
            "Obstacle grid built: {} obstacles, {} cells, reach {:.1}",
            obstacles.len(),
            cells.len(),
            reach
        );

        Self {
            inv_cell_size,
            reach,
            cells,
        }
    }

    pub fn from_constants(obstacles: &[Obstacle], constants: &Constants) -> Self {
        Self::build(obstacles, OBSTACLE_GRID_CELL_SIZE, constants.obstacle_lookup_radius)
    }

    #[inline]
    pub fn reach(&self) -> f64 {
        self.reach
    }

    /// Convert world position to cell key
    #[inline]
    fn position_to_cell(&self, position: Vec2) -> CellKey {
        (
            (position.x * self.inv_cell_size).floor() as i32,
            (position.y * self.inv_cell_size).floor() as i32,
        )
    }
}

impl ObstacleLookup for ObstacleGrid {
    #[inline]
    fn nearby(&self, point: Vec2) -> &[Obstacle] {
        self.cells
            .get(&self.position_to_cell(point))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}
