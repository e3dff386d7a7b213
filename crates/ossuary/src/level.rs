//! # Level Grid
//!
//! Solid/open cell bitmap the simulation collides against. Everything that
//! moves asks the grid through [`CollisionQuery`]; nothing here knows about
//! tiles, layers or rendering.
//!
//! Cells outside the grid are solid, so particles and actors can never leave
//! the arena.

use ossuary_shared::Vec2;

// ============================================================================
// COLLISION QUERY
// ============================================================================

/// Grid-cell occupancy query.
///
/// Called per particle and per actor axis several times a tick, so
/// implementations should be a plain lookup.
pub trait CollisionQuery {
    /// Returns `true` if the cell at `(cx, cy)` blocks movement.
    fn has_collision(&self, cx: i32, cy: i32) -> bool;
}

/// Callback deciding whether a cell is solid.
pub type CellQueryFn = fn(cx: i32, cy: i32) -> bool;

/// Converts a world coordinate to a cell coordinate.
#[inline]
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn cell_of(world: f32, cell_size: f32) -> i32 {
    (world / cell_size).floor() as i32
}

// ============================================================================
// LEVEL GRID
// ============================================================================

/// Rectangular grid of solid and open cells.
#[derive(Clone, Debug)]
pub struct LevelGrid {
    width: i32,
    height: i32,
    cell_size: f32,
    solid: Vec<bool>,
    /// Replaces the bitmap when set.
    custom_query: Option<CellQueryFn>,
}

impl LevelGrid {
    /// Creates an open grid of `width × height` cells.
    ///
    /// # Panics
    ///
    /// Panics if `cell_size` is not positive.
    #[must_use]
    pub fn new(width: u32, height: u32, cell_size: f32) -> Self {
        assert!(cell_size > 0.0, "cell size must be positive");
        let width = i32::try_from(width).unwrap_or(i32::MAX);
        let height = i32::try_from(height).unwrap_or(i32::MAX);
        let len = usize::try_from(width).unwrap_or(0) * usize::try_from(height).unwrap_or(0);
        Self {
            width,
            height,
            cell_size,
            solid: vec![false; len],
            custom_query: None,
        }
    }

    /// Creates a grid whose cells are answered by `query` alone.
    #[must_use]
    pub fn with_query(query: CellQueryFn, cell_size: f32) -> Self {
        let mut grid = Self::new(0, 0, cell_size);
        grid.custom_query = Some(query);
        grid
    }

    /// Builds a grid from text rows: `#` is solid, anything else is open.
    ///
    /// Short rows are padded with solid cells.
    ///
    /// ```rust,ignore
    /// let grid = LevelGrid::from_rows(&[
    ///     "#####",
    ///     "#...#",
    ///     "#####",
    /// ], 16.0);
    /// ```
    #[must_use]
    pub fn from_rows(rows: &[&str], cell_size: f32) -> Self {
        let width = rows.iter().map(|row| row.chars().count()).max().unwrap_or(0);
        let mut grid = Self::new(
            u32::try_from(width).unwrap_or(u32::MAX),
            u32::try_from(rows.len()).unwrap_or(u32::MAX),
            cell_size,
        );
        for (y, row) in rows.iter().enumerate() {
            let mut chars = row.chars();
            for x in 0..width {
                let solid = chars.next().map_or(true, |c| c == '#');
                grid.solid[y * width + x] = solid;
            }
        }
        grid
    }

    /// Width in cells.
    #[inline]
    #[must_use]
    pub fn width(&self) -> i32 {
        self.width
    }

    /// Height in cells.
    #[inline]
    #[must_use]
    pub fn height(&self) -> i32 {
        self.height
    }

    /// Side length of one cell in world units.
    #[inline]
    #[must_use]
    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    /// Returns `true` if `(cx, cy)` lies inside the bitmap.
    #[inline]
    #[must_use]
    pub fn in_bounds(&self, cx: i32, cy: i32) -> bool {
        cx >= 0 && cy >= 0 && cx < self.width && cy < self.height
    }

    /// Marks one cell solid or open. Out-of-bounds cells are ignored.
    pub fn set_solid(&mut self, cx: i32, cy: i32, solid: bool) {
        if let Some(index) = self.index(cx, cy) {
            self.solid[index] = solid;
        }
    }

    /// Cell containing the world position `pos`.
    #[inline]
    #[must_use]
    pub fn cell_at(&self, pos: Vec2) -> (i32, i32) {
        (cell_of(pos.x, self.cell_size), cell_of(pos.y, self.cell_size))
    }

    /// World position of the centre of cell `(cx, cy)`.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn cell_center(&self, cx: i32, cy: i32) -> Vec2 {
        Vec2::new(
            (cx as f32 + 0.5) * self.cell_size,
            (cy as f32 + 0.5) * self.cell_size,
        )
    }

    /// Walks the cells from `from` to `to` (both inclusive) with Bresenham's
    /// line algorithm. Returns `false` as soon as `pass` rejects a cell.
    pub fn cast_ray(
        &self,
        from: (i32, i32),
        to: (i32, i32),
        mut pass: impl FnMut(i32, i32) -> bool,
    ) -> bool {
        let (mut x, mut y) = from;
        let dx = (to.0 - x).abs();
        let dy = -(to.1 - y).abs();
        let step_x = if x < to.0 { 1 } else { -1 };
        let step_y = if y < to.1 { 1 } else { -1 };
        let mut err = dx + dy;

        loop {
            if !pass(x, y) {
                return false;
            }
            if (x, y) == to {
                return true;
            }
            let doubled = 2 * err;
            if doubled >= dy {
                err += dy;
                x += step_x;
            }
            if doubled <= dx {
                err += dx;
                y += step_y;
            }
        }
    }

    /// Returns `true` if no solid cell lies between `from` and `to`.
    #[must_use]
    pub fn has_line_of_sight(&self, from: (i32, i32), to: (i32, i32)) -> bool {
        self.cast_ray(from, to, |cx, cy| !self.has_collision(cx, cy))
    }

    fn index(&self, cx: i32, cy: i32) -> Option<usize> {
        if !self.in_bounds(cx, cy) {
            return None;
        }
        let x = usize::try_from(cx).ok()?;
        let y = usize::try_from(cy).ok()?;
        let width = usize::try_from(self.width).ok()?;
        Some(y * width + x)
    }
}

impl CollisionQuery for LevelGrid {
    #[inline]
    fn has_collision(&self, cx: i32, cy: i32) -> bool {
        if let Some(query) = self.custom_query {
            return query(cx, cy);
        }
        self.index(cx, cy).map_or(true, |index| self.solid[index])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn arena() -> LevelGrid {
        LevelGrid::from_rows(
            &[
                "#######",
                "#.....#",
                "#..#..#",
                "#.....#",
                "#######",
            ],
            16.0,
        )
    }

    #[test]
    fn test_from_rows() {
        let grid = arena();
        assert_eq!(grid.width(), 7);
        assert_eq!(grid.height(), 5);
        assert!(grid.has_collision(0, 0));
        assert!(!grid.has_collision(1, 1));
        assert!(grid.has_collision(3, 2));
    }

    #[test]
    fn test_out_of_bounds_is_solid() {
        let grid = arena();
        assert!(grid.has_collision(-1, 2));
        assert!(grid.has_collision(2, 99));
        assert!(LevelGrid::new(0, 0, 16.0).has_collision(0, 0));
    }

    #[test]
    fn test_short_rows_pad_solid() {
        let grid = LevelGrid::from_rows(&["....", ".."], 8.0);
        assert!(!grid.has_collision(1, 1));
        assert!(grid.has_collision(3, 1));
    }

    #[test]
    fn test_cell_of_floors_negative() {
        assert_eq!(cell_of(15.9, 16.0), 0);
        assert_eq!(cell_of(16.0, 16.0), 1);
        assert_eq!(cell_of(-0.1, 16.0), -1);
    }

    #[test]
    fn test_custom_query() {
        fn floor_only(_cx: i32, cy: i32) -> bool {
            cy >= 10
        }
        let grid = LevelGrid::with_query(floor_only, 16.0);
        assert!(!grid.has_collision(500, 9));
        assert!(grid.has_collision(-500, 10));
    }

    #[test]
    fn test_cast_ray_visits_endpoints() {
        let grid = arena();
        let mut visited = Vec::new();
        assert!(grid.cast_ray((1, 1), (4, 3), |x, y| {
            visited.push((x, y));
            true
        }));
        assert_eq!(visited.first(), Some(&(1, 1)));
        assert_eq!(visited.last(), Some(&(4, 3)));
    }

    #[test]
    fn test_line_of_sight_blocked_by_pillar() {
        let grid = arena();
        assert!(!grid.has_line_of_sight((1, 2), (5, 2)));
        assert!(grid.has_line_of_sight((1, 1), (5, 1)));
        assert!(grid.has_line_of_sight((2, 2), (2, 2)));
    }

    #[test]
    fn test_set_solid() {
        let mut grid = arena();
        grid.set_solid(1, 1, true);
        assert!(grid.has_collision(1, 1));
        grid.set_solid(-4, -4, false);
        assert!(grid.has_collision(-4, -4));
    }
}
