//! Easing for presentational transitions (callout entrances)

pub mod interpolation;

pub use interpolation::{lerp, EasingFunction};
