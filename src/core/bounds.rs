use crate::core::config::ConfigurationError;
use crate::core::geo::{NormalizedPoint, Point};
use serde::{Deserialize, Serialize};

/// Represents a bounding box in screen/pixel coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min: Point,
    pub max: Point,
}

impl Bounds {
    /// Creates new bounds from two points
    pub fn new(min: Point, max: Point) -> Self {
        Self { min, max }
    }

    /// Creates bounds from individual coordinates
    pub fn from_coords(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self::new(Point::new(min_x, min_y), Point::new(max_x, max_y))
    }

    /// Creates bounds from a top-left corner and a size
    pub fn from_origin_and_size(origin: Point, width: f64, height: f64) -> Self {
        Self::new(origin, Point::new(origin.x + width, origin.y + height))
    }

    /// Gets the width of the bounds
    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    /// Gets the height of the bounds
    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }

    /// Gets the center point of the bounds
    pub fn center(&self) -> Point {
        Point::new(
            (self.min.x + self.max.x) / 2.0,
            (self.min.y + self.max.y) / 2.0,
        )
    }

    /// Checks if the bounds contain a point (edges inclusive)
    pub fn contains(&self, point: &Point) -> bool {
        point.x >= self.min.x
            && point.x <= self.max.x
            && point.y >= self.min.y
            && point.y <= self.max.y
    }

    /// Checks if the bounds intersect with another bounds
    pub fn intersects(&self, other: &Bounds) -> bool {
        !(other.max.x < self.min.x
            || other.min.x > self.max.x
            || other.max.y < self.min.y
            || other.min.y > self.max.y)
    }

    /// Returns the bounds moved by `offset`
    pub fn translated(&self, offset: Point) -> Bounds {
        Bounds::new(self.min.add(&offset), self.max.add(&offset))
    }

    /// Returns the bounds with every coordinate multiplied by `factor`
    pub fn scaled(&self, factor: f64) -> Bounds {
        Bounds::new(self.min.multiply(factor), self.max.multiply(factor))
    }

    /// Checks if the bounds are valid (min <= max)
    pub fn is_valid(&self) -> bool {
        self.min.x <= self.max.x && self.min.y <= self.max.y
    }
}

/// The pannable region of the content, in normalized coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NormalizedBounds {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl NormalizedBounds {
    /// Creates checked bounds; `min` must be strictly below `max` on both axes.
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Result<Self, ConfigurationError> {
        let finite = [min_x, min_y, max_x, max_y].iter().all(|v| v.is_finite());
        if !finite || min_x >= max_x || min_y >= max_y {
            return Err(ConfigurationError::InvalidBounds {
                min_x,
                min_y,
                max_x,
                max_y,
            });
        }
        Ok(Self {
            min_x,
            min_y,
            max_x,
            max_y,
        })
    }

    /// The whole image, `(0, 0, 1, 1)`
    pub fn full() -> Self {
        Self {
            min_x: 0.0,
            min_y: 0.0,
            max_x: 1.0,
            max_y: 1.0,
        }
    }

    pub fn contains(&self, point: &NormalizedPoint) -> bool {
        point.x >= self.min_x
            && point.x <= self.max_x
            && point.y >= self.min_y
            && point.y <= self.max_y
    }

    /// Converts to absolute pixels of a `width`×`height` image
    pub fn to_pixels(&self, width: f64, height: f64) -> Bounds {
        Bounds::from_coords(
            self.min_x * width,
            self.min_y * height,
            self.max_x * width,
            self.max_y * height,
        )
    }
}

impl Default for NormalizedBounds {
    fn default() -> Self {
        Self::full()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds_geometry() {
        let bounds = Bounds::from_origin_and_size(Point::new(10.0, 20.0), 30.0, 40.0);
        assert_eq!(bounds.width(), 30.0);
        assert_eq!(bounds.height(), 40.0);
        assert_eq!(bounds.center(), Point::new(25.0, 40.0));
        assert!(bounds.contains(&Point::new(10.0, 20.0)));
        assert!(bounds.contains(&Point::new(40.0, 60.0)));
        assert!(!bounds.contains(&Point::new(40.1, 60.0)));

        let moved = bounds.translated(Point::new(-10.0, -20.0));
        assert_eq!(moved.min, Point::new(0.0, 0.0));
        assert!(moved.intersects(&bounds));
        assert!(!moved.intersects(&Bounds::from_coords(100.0, 100.0, 110.0, 110.0)));
    }

    #[test]
    fn test_normalized_bounds_validation() {
        assert!(NormalizedBounds::new(0.0, 0.0, 1.0, 1.0).is_ok());
        assert!(NormalizedBounds::new(0.5, 0.0, 0.5, 1.0).is_err());
        assert!(NormalizedBounds::new(0.0, 0.8, 1.0, 0.2).is_err());
        assert!(NormalizedBounds::new(f64::NAN, 0.0, 1.0, 1.0).is_err());
    }

    #[test]
    fn test_normalized_bounds_to_pixels() {
        let bounds = NormalizedBounds::new(0.25, 0.5, 0.75, 1.0).unwrap();
        let px = bounds.to_pixels(1000.0, 200.0);
        assert_eq!(px, Bounds::from_coords(250.0, 100.0, 750.0, 200.0));
        assert!(bounds.contains(&NormalizedPoint::new(0.5, 0.75)));
        assert!(!bounds.contains(&NormalizedPoint::new(0.1, 0.75)));
    }
}
