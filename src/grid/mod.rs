//! Flat rectangular grid primitives shared by every generation stage.
//!
//! The world is a non-wrapping W×H grid: edges are out-of-domain. Flow
//! uses the 8-connected Moore neighborhood, diffusion and flood fills the
//! 4-connected one.

/// Cardinal neighbor offsets (west, east, north, south).
pub const NEIGHBORS_4: [(i32, i32); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];

/// Moore neighborhood offsets in row-major scan order.
///
/// This order is the tie-breaking order everywhere a "first lowest
/// neighbor" is needed; changing it changes outputs.
pub const NEIGHBORS_8: [(i32, i32); 8] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (-1, 0),
    (1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];

/// Grid dimensions plus indexing helpers.
///
/// All per-cell fields are dense `Vec`s of length `width * height` in
/// row-major order with the origin at the top-left cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Grid {
    pub width: u32,
    pub height: u32,
}

impl Grid {
    /// Creates a grid. Both dimensions must be positive.
    pub fn new(width: u32, height: u32) -> Self {
        assert!(width > 0 && height > 0, "grid dimensions must be positive");
        Self { width, height }
    }

    /// Total number of cells.
    #[inline]
    pub fn len(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Row-major cell index for (x, y).
    #[inline]
    pub fn index(&self, x: u32, y: u32) -> usize {
        debug_assert!(x < self.width && y < self.height);
        y as usize * self.width as usize + x as usize
    }

    /// Inverse of [`Grid::index`].
    #[inline]
    pub fn coords(&self, idx: usize) -> (u32, u32) {
        debug_assert!(idx < self.len());
        (
            (idx % self.width as usize) as u32,
            (idx / self.width as usize) as u32,
        )
    }

    #[inline]
    pub fn contains(&self, x: i64, y: i64) -> bool {
        x >= 0 && y >= 0 && x < self.width as i64 && y < self.height as i64
    }

    /// Offset neighbor, or `None` when it falls off the grid.
    #[inline]
    pub fn neighbor(&self, x: u32, y: u32, dx: i32, dy: i32) -> Option<(u32, u32)> {
        let nx = x as i64 + dx as i64;
        let ny = y as i64 + dy as i64;
        if self.contains(nx, ny) {
            Some((nx as u32, ny as u32))
        } else {
            None
        }
    }

    /// In-bounds cardinal neighbors of a cell.
    pub fn neighbors_4(&self, x: u32, y: u32) -> impl Iterator<Item = (u32, u32)> + '_ {
        NEIGHBORS_4
            .iter()
            .filter_map(move |&(dx, dy)| self.neighbor(x, y, dx, dy))
    }

    /// In-bounds Moore neighbors of a cell, in tie-breaking order.
    pub fn neighbors_8(&self, x: u32, y: u32) -> impl Iterator<Item = (u32, u32)> + '_ {
        NEIGHBORS_8
            .iter()
            .filter_map(move |&(dx, dy)| self.neighbor(x, y, dx, dy))
    }

    /// True if the cell sits on the grid border.
    #[inline]
    pub fn is_border(&self, x: u32, y: u32) -> bool {
        x == 0 || y == 0 || x == self.width - 1 || y == self.height - 1
    }

    /// Indices of every border cell, top row first, scan order.
    pub fn border_indices(&self) -> Vec<usize> {
        let mut out = Vec::new();
        for y in 0..self.height {
            for x in 0..self.width {
                if self.is_border(x, y) {
                    out.push(self.index(x, y));
                }
            }
        }
        out
    }

    /// Latitude proxy in [-1, +1].
    ///
    /// Row 0 and row H-1 are the polar edges; the central row is the
    /// equator. `latitude(y).abs()` measures distance from the equator.
    #[inline]
    pub fn latitude(&self, y: u32) -> f32 {
        if self.height == 1 {
            return 0.0;
        }
        2.0 * y as f32 / (self.height - 1) as f32 - 1.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_round_trips_through_coords() {
        let grid = Grid::new(7, 5);
        for idx in 0..grid.len() {
            let (x, y) = grid.coords(idx);
            assert_eq!(grid.index(x, y), idx);
        }
    }

    #[test]
    fn corner_cells_have_three_moore_neighbors() {
        let grid = Grid::new(4, 4);
        assert_eq!(grid.neighbors_8(0, 0).count(), 3);
        assert_eq!(grid.neighbors_8(3, 3).count(), 3);
        assert_eq!(grid.neighbors_8(1, 1).count(), 8);
    }

    #[test]
    fn edge_cells_have_no_out_of_domain_neighbors() {
        let grid = Grid::new(3, 3);
        assert!(grid.neighbor(0, 0, -1, 0).is_none());
        assert!(grid.neighbor(2, 2, 1, 0).is_none());
        assert!(grid.neighbor(2, 2, 0, 1).is_none());
        assert_eq!(grid.neighbor(1, 1, -1, -1), Some((0, 0)));
    }

    #[test]
    fn latitude_spans_poles_and_equator() {
        let grid = Grid::new(4, 101);
        assert_eq!(grid.latitude(0), -1.0);
        assert_eq!(grid.latitude(100), 1.0);
        assert!(grid.latitude(50).abs() < 1e-6);
    }

    #[test]
    fn border_indices_cover_perimeter_once() {
        let grid = Grid::new(5, 4);
        let border = grid.border_indices();
        assert_eq!(border.len(), 2 * 5 + 2 * (4 - 2));
        let mut sorted = border.clone();
        sorted.dedup();
        assert_eq!(sorted.len(), border.len());
    }
}
