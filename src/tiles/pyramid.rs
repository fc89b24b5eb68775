use crate::core::bounds::Bounds;
use crate::core::config::MapViewConfiguration;
use crate::core::constants::{LEVEL_SCALE_FACTOR, SCALE_EPSILON};
use crate::core::viewport::Viewport;
use crate::tiles::types::TileAddress;

/// Tile addressing for a pyramid of `level_count` levels.
///
/// Level `0` is the coarsest level and level `level_count - 1` holds the
/// image at full resolution. Each level halves the pixel extent of the next
/// finer one, so `level_scale(L) = 2^-(level_count - 1 - L)`. Tile size is the
/// same on every level.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TilePyramid {
    level_count: u32,
    full_width: u32,
    full_height: u32,
    tile_size: u32,
}

impl TilePyramid {
    pub fn new(level_count: u32, full_width: u32, full_height: u32, tile_size: u32) -> Self {
        debug_assert!(level_count > 0 && tile_size > 0);
        Self {
            level_count,
            full_width,
            full_height,
            tile_size,
        }
    }

    pub fn from_config(config: &MapViewConfiguration) -> Self {
        Self::new(
            config.level_count,
            config.full_width,
            config.full_height,
            config.tile_size,
        )
    }

    pub fn level_count(&self) -> u32 {
        self.level_count
    }

    pub fn tile_size(&self) -> u32 {
        self.tile_size
    }

    pub fn finest_level(&self) -> u32 {
        self.level_count - 1
    }

    /// Scale of `level` relative to full resolution
    pub fn level_scale(&self, level: u32) -> f64 {
        let level = level.min(self.finest_level());
        LEVEL_SCALE_FACTOR.powi(-((self.finest_level() - level) as i32))
    }

    /// Pixel extent of `level`; grows monotonically with the level index
    pub fn level_extent(&self, level: u32) -> (u32, u32) {
        let scale = self.level_scale(level);
        (
            (self.full_width as f64 * scale).ceil() as u32,
            (self.full_height as f64 * scale).ceil() as u32,
        )
    }

    /// Tiles per axis at `level`, as `(cols, rows)`
    pub fn tile_count(&self, level: u32) -> (u32, u32) {
        let (width, height) = self.level_extent(level);
        (
            width.div_ceil(self.tile_size),
            height.div_ceil(self.tile_size),
        )
    }

    /// The coarsest level whose scale is still at least `scale`, so tiles are
    /// only ever downsampled (or upsampled above full resolution)
    pub fn level_for_scale(&self, scale: f64) -> u32 {
        if scale >= 1.0 {
            return self.finest_level();
        }
        let steps = ((1.0 / scale).log2() + SCALE_EPSILON).floor();
        if !steps.is_finite() || steps >= self.finest_level() as f64 {
            return 0;
        }
        self.finest_level() - steps as u32
    }

    /// Addresses of the tiles intersecting `rect`, given in pixels of `level`.
    ///
    /// The rectangle is half-open, so a right edge exactly on a tile boundary
    /// does not pull in the next column. Addresses are clipped to the grid
    /// and returned in row-major order.
    pub fn visible_tiles(&self, level: u32, rect: &Bounds) -> Vec<TileAddress> {
        if !(rect.width() > 0.0 && rect.height() > 0.0) {
            return Vec::new();
        }
        let level = level.min(self.finest_level());
        let (cols, rows) = self.tile_count(level);
        let Some((first_col, last_col)) = self.span(rect.min.x, rect.max.x, cols) else {
            return Vec::new();
        };
        let Some((first_row, last_row)) = self.span(rect.min.y, rect.max.y, rows) else {
            return Vec::new();
        };

        let mut tiles = Vec::with_capacity(grid_len((first_col, last_col), (first_row, last_row)));
        for row in first_row..=last_row {
            for col in first_col..=last_col {
                tiles.push(TileAddress::new(row, col, level));
            }
        }
        tiles
    }

    /// The level to draw for `viewport` and the tiles covering it
    pub fn visible_tiles_for(&self, viewport: &Viewport) -> (u32, Vec<TileAddress>) {
        let level = self.level_for_scale(viewport.scale());
        let rect = viewport.visible_content_rect().scaled(self.level_scale(level));
        (level, self.visible_tiles(level, &rect))
    }

    /// Area covered by a tile, in full-resolution content pixels. Tiles on
    /// the right and bottom edges are cut to the image.
    pub fn tile_content_rect(&self, address: TileAddress) -> Bounds {
        let size = self.tile_size as f64;
        let rect = Bounds::from_coords(
            address.col as f64 * size,
            address.row as f64 * size,
            (address.col + 1) as f64 * size,
            (address.row + 1) as f64 * size,
        )
        .scaled(1.0 / self.level_scale(address.level));
        Bounds::from_coords(
            rect.min.x,
            rect.min.y,
            rect.max.x.min(self.full_width as f64),
            rect.max.y.min(self.full_height as f64),
        )
    }

    fn span(&self, start: f64, end: f64, count: u32) -> Option<(u32, u32)> {
        if count == 0 {
            return None;
        }
        let size = self.tile_size as f64;
        let first = (start / size).floor().max(0.0);
        let last = ((end / size).ceil() - 1.0).min(count as f64 - 1.0);
        if last < first {
            return None;
        }
        Some((first as u32, last as u32))
    }
}

/// Number of tiles in an inclusive column and row span
fn grid_len((first_col, last_col): (u32, u32), (first_row, last_row): (u32, u32)) -> usize {
    let cols = (last_col - first_col) as usize + 1;
    let rows = (last_row - first_row) as usize + 1;
    cols.saturating_mul(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::geo::Point;

    fn pyramid() -> TilePyramid {
        TilePyramid::new(7, 15360, 8640, 256)
    }

    #[test]
    fn test_level_extents_halve() {
        let pyramid = pyramid();
        assert_eq!(pyramid.level_extent(6), (15360, 8640));
        assert_eq!(pyramid.level_extent(5), (7680, 4320));
        assert_eq!(pyramid.level_extent(0), (240, 135));
        for level in 1..7 {
            let (w0, h0) = pyramid.level_extent(level - 1);
            let (w1, h1) = pyramid.level_extent(level);
            assert!(w0 < w1 && h0 < h1);
        }
    }

    #[test]
    fn test_tile_count() {
        let pyramid = pyramid();
        assert_eq!(pyramid.tile_count(6), (60, 34));
        assert_eq!(pyramid.tile_count(0), (1, 1));
    }

    #[test]
    fn test_visible_tiles_example() {
        let pyramid = pyramid();
        let rect = Bounds::from_coords(0.0, 0.0, 512.0, 256.0);
        let tiles = pyramid.visible_tiles(6, &rect);
        assert_eq!(tiles, vec![TileAddress::new(0, 0, 6), TileAddress::new(0, 1, 6)]);
    }

    #[test]
    fn test_visible_tiles_clipped_to_grid() {
        let pyramid = pyramid();
        for level in 0..7 {
            let (cols, rows) = pyramid.tile_count(level);
            let rect = Bounds::from_coords(-1000.0, -1000.0, 1e7, 1e7);
            let tiles = pyramid.visible_tiles(level, &rect);
            assert_eq!(tiles.len(), (cols * rows) as usize);
            assert!(tiles.iter().all(|t| t.col < cols && t.row < rows && t.level == level));
        }

        let outside = Bounds::from_coords(20000.0, 0.0, 21000.0, 100.0);
        assert!(pyramid.visible_tiles(6, &outside).is_empty());
        let empty = Bounds::from_coords(10.0, 10.0, 10.0, 50.0);
        assert!(pyramid.visible_tiles(6, &empty).is_empty());
    }

    #[test]
    fn test_grid_len_does_not_wrap() {
        assert_eq!(grid_len((2, 4), (0, 1)), 6);
        // 65536 x 65536 tiles is past u32::MAX
        assert!(grid_len((0, 65_535), (0, 65_535)) >= u32::MAX as usize);
        assert!(grid_len((0, u32::MAX - 1), (0, u32::MAX - 1)) >= u32::MAX as usize);
    }

    #[test]
    fn test_visible_tiles_deterministic() {
        let pyramid = pyramid();
        let rect = Bounds::from_coords(300.5, 700.25, 1333.0, 1999.9);
        assert_eq!(pyramid.visible_tiles(6, &rect), pyramid.visible_tiles(6, &rect));
    }

    #[test]
    fn test_level_for_scale() {
        let pyramid = pyramid();
        assert_eq!(pyramid.level_for_scale(3.0), 6);
        assert_eq!(pyramid.level_for_scale(1.0), 6);
        assert_eq!(pyramid.level_for_scale(0.7), 6);
        assert_eq!(pyramid.level_for_scale(0.5), 5);
        assert_eq!(pyramid.level_for_scale(0.3), 5);
        assert_eq!(pyramid.level_for_scale(0.25), 4);
        assert_eq!(pyramid.level_for_scale(1.0 / 64.0), 0);
        assert_eq!(pyramid.level_for_scale(1e-6), 0);
    }

    #[test]
    fn test_tile_content_rect() {
        let pyramid = pyramid();
        let rect = pyramid.tile_content_rect(TileAddress::new(1, 2, 5));
        assert_eq!(rect, Bounds::from_coords(1024.0, 512.0, 1536.0, 1024.0));

        // 8640 / 256 leaves a partial last row
        let edge = pyramid.tile_content_rect(TileAddress::new(33, 59, 6));
        assert_eq!(edge, Bounds::from_coords(15104.0, 8448.0, 15360.0, 8640.0));
    }

    #[test]
    fn test_visible_tiles_for_viewport() {
        let pyramid = pyramid();
        let mut viewport = Viewport::new(1.0 / 64.0, 3.0, Point::new(512.0, 256.0));
        viewport.set_scale_at(0.5, Point::new(0.0, 0.0));
        viewport.set_pan(Point::new(0.0, 0.0));

        let (level, tiles) = pyramid.visible_tiles_for(&viewport);
        assert_eq!(level, 5);
        assert_eq!(tiles, vec![TileAddress::new(0, 0, 5), TileAddress::new(0, 1, 5)]);
    }
}
