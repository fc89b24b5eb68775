//! Core constants shared by the pyramid, the compositor and the overlays.
//! Keeping them in a single place makes it easier to tweak engine-wide magic numbers.

/// Default square tile size in pixels.
pub const TILE_SIZE: u32 = 256;

/// Each pyramid level halves the pixel extent of the next finer level.
pub const LEVEL_SCALE_FACTOR: f64 = 2.0;

/// Default upper scale limit (1.0 = one screen pixel per full-resolution pixel).
pub const DEFAULT_MAX_SCALE: f64 = 1.0;

/// Transform updates a tile may stay out of view before it is released.
pub const DEFAULT_RETENTION_UPDATES: u32 = 3;

/// Worker threads used by the default fetch executor.
pub const DEFAULT_FETCH_WORKERS: usize = 4;

/// Scale multiplier applied by a double tap.
pub const DOUBLE_TAP_ZOOM_FACTOR: f64 = 2.0;

/// Default callout entrance duration.
pub const CALLOUT_TRANSITION_MS: u64 = 250;

/// Relative anchor used for callouts: centred horizontally, above the point.
pub const CALLOUT_ANCHOR: (f64, f64) = (-0.5, -1.2);

/// Tolerance used when comparing scales to level boundaries.
pub const SCALE_EPSILON: f64 = 1e-9;

/// Default marker size (matches the classic pin icon).
pub const MARKER_ICON_SIZE: (u32, u32) = (25, 41);

/// Default callout size.
pub const CALLOUT_SIZE: (u32, u32) = (200, 80);
