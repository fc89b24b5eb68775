use crate::core::geo::{NormalizedPoint, Point};
use crate::core::viewport::Viewport;

/// Converts between normalized content positions, absolute content pixels at
/// full resolution, and screen pixels for a given viewport transform.
///
/// All conversions are total: positions off the image extrapolate linearly.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContentSpace {
    full_width: f64,
    full_height: f64,
}

impl ContentSpace {
    /// Extents must be positive; [`crate::MapViewConfiguration::validate`]
    /// guarantees it for configured views.
    pub fn new(full_width: u32, full_height: u32) -> Self {
        debug_assert!(full_width > 0 && full_height > 0);
        Self {
            full_width: full_width as f64,
            full_height: full_height as f64,
        }
    }

    pub fn full_width(&self) -> f64 {
        self.full_width
    }

    pub fn full_height(&self) -> f64 {
        self.full_height
    }

    pub fn to_absolute_pixels(&self, position: NormalizedPoint) -> Point {
        Point::new(position.x * self.full_width, position.y * self.full_height)
    }

    pub fn to_normalized(&self, absolute: Point) -> NormalizedPoint {
        NormalizedPoint::new(absolute.x / self.full_width, absolute.y / self.full_height)
    }

    /// `screen = absolute * scale - pan`
    pub fn to_screen(&self, absolute: Point, viewport: &Viewport) -> Point {
        absolute.multiply(viewport.scale()).subtract(&viewport.pan_offset())
    }

    /// Inverse of [`ContentSpace::to_screen`]
    pub fn to_content(&self, screen: Point, viewport: &Viewport) -> Point {
        screen.add(&viewport.pan_offset()).multiply(1.0 / viewport.scale())
    }

    /// Normalized position straight to the screen
    pub fn normalized_to_screen(&self, position: NormalizedPoint, viewport: &Viewport) -> Point {
        self.to_screen(self.to_absolute_pixels(position), viewport)
    }

    /// Screen point straight back to a normalized position
    pub fn screen_to_normalized(&self, screen: Point, viewport: &Viewport) -> NormalizedPoint {
        self.to_normalized(self.to_content(screen, viewport))
    }
}
