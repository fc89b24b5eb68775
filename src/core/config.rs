//! Configuration for the map view and its tile loading machinery
//!
//! A [`MapViewConfiguration`] describes the tile pyramid (level count, full
//! resolution extent, tile size) and the scale limits. It is validated once,
//! when handed to [`crate::MapView::configure`], and invalid values fail fast
//! with a [`ConfigurationError`].

use crate::core::constants::{
    DEFAULT_FETCH_WORKERS, DEFAULT_MAX_SCALE, DEFAULT_RETENTION_UPDATES, LEVEL_SCALE_FACTOR,
};
use serde::{Deserialize, Serialize};

/// Programming errors detected while configuring the view
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigurationError {
    #[error("level count must be at least 1")]
    ZeroLevelCount,

    #[error("content extent must be positive, got {width}x{height}")]
    NonPositiveExtent { width: u32, height: u32 },

    #[error("tile size must be positive")]
    ZeroTileSize,

    #[error("scale must be finite and positive, got {0}")]
    InvalidScale(f64),

    #[error("min scale {min} exceeds max scale {max}")]
    InvalidScaleRange { min: f64, max: f64 },

    #[error("invalid bounds ({min_x}, {min_y}) - ({max_x}, {max_y})")]
    InvalidBounds {
        min_x: f64,
        min_y: f64,
        max_x: f64,
        max_y: f64,
    },

    #[error("fetch worker count must be at least 1")]
    ZeroWorkers,
}

/// How the lower scale limit reacts to the screen size
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MinimumScaleMode {
    /// The whole image may shrink until it fits inside the screen
    Fit,
    /// The image always covers the whole screen
    Fill,
    /// Only the configured (or derived) minimum applies
    None,
}

impl Default for MinimumScaleMode {
    fn default() -> Self {
        Self::Fit
    }
}

/// Tile acquisition and retention settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TileLoadingConfig {
    /// Transform updates a tile may stay out of the visible set before eviction
    pub retention_updates: u32,
    /// Concurrent fetches for the thread-pool executor
    pub worker_count: usize,
}

impl Default for TileLoadingConfig {
    fn default() -> Self {
        Self {
            retention_updates: DEFAULT_RETENTION_UPDATES,
            worker_count: DEFAULT_FETCH_WORKERS,
        }
    }
}

impl TileLoadingConfig {
    pub fn low_resource() -> Self {
        Self {
            retention_updates: 1,
            worker_count: 2,
        }
    }

    pub fn high_performance() -> Self {
        Self {
            retention_updates: 8,
            worker_count: 16,
        }
    }

    pub fn for_testing() -> Self {
        Self {
            retention_updates: 2,
            worker_count: 1,
        }
    }
}

/// One-shot description of the tile pyramid and the scale limits
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapViewConfiguration {
    pub level_count: u32,
    pub full_width: u32,
    pub full_height: u32,
    pub tile_size: u32,
    #[serde(default = "default_max_scale")]
    pub max_scale: f64,
    /// Explicit lower limit; derived from the coarsest level when absent
    #[serde(default)]
    pub min_scale: Option<f64>,
    #[serde(default)]
    pub minimum_scale_mode: MinimumScaleMode,
    /// Let the visible rectangle leave the configured bounds
    #[serde(default)]
    pub allow_overscroll: bool,
    /// Remove open callouts when a tap lands anywhere but on a callout
    #[serde(default = "default_true")]
    pub dismiss_callouts_on_tap: bool,
    #[serde(default)]
    pub tile_loading: TileLoadingConfig,
}

fn default_max_scale() -> f64 {
    DEFAULT_MAX_SCALE
}

fn default_true() -> bool {
    true
}

impl MapViewConfiguration {
    pub fn new(level_count: u32, full_width: u32, full_height: u32, tile_size: u32) -> Self {
        Self {
            level_count,
            full_width,
            full_height,
            tile_size,
            max_scale: DEFAULT_MAX_SCALE,
            min_scale: None,
            minimum_scale_mode: MinimumScaleMode::default(),
            allow_overscroll: false,
            dismiss_callouts_on_tap: true,
            tile_loading: TileLoadingConfig::default(),
        }
    }

    /// Parses a configuration descriptor, e.g. shipped next to the tile set
    pub fn from_json(json: &str) -> crate::Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn set_max_scale(mut self, max_scale: f64) -> Self {
        self.max_scale = max_scale;
        self
    }

    pub fn set_min_scale(mut self, min_scale: f64) -> Self {
        self.min_scale = Some(min_scale);
        self
    }

    pub fn set_minimum_scale_mode(mut self, mode: MinimumScaleMode) -> Self {
        self.minimum_scale_mode = mode;
        self
    }

    pub fn allow_overscroll(mut self, allow: bool) -> Self {
        self.allow_overscroll = allow;
        self
    }

    pub fn dismiss_callouts_on_tap(mut self, dismiss: bool) -> Self {
        self.dismiss_callouts_on_tap = dismiss;
        self
    }

    pub fn with_tile_loading(mut self, tile_loading: TileLoadingConfig) -> Self {
        self.tile_loading = tile_loading;
        self
    }

    /// Scale of the coarsest pyramid level relative to full resolution
    pub fn coarsest_level_scale(&self) -> f64 {
        LEVEL_SCALE_FACTOR.powi(-(self.level_count.saturating_sub(1) as i32))
    }

    /// The configured minimum, or the coarsest level scale
    pub fn effective_min_scale(&self) -> f64 {
        self.min_scale
            .unwrap_or_else(|| self.coarsest_level_scale().min(self.max_scale))
    }

    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.level_count == 0 {
            return Err(ConfigurationError::ZeroLevelCount);
        }
        if self.full_width == 0 || self.full_height == 0 {
            return Err(ConfigurationError::NonPositiveExtent {
                width: self.full_width,
                height: self.full_height,
            });
        }
        if self.tile_size == 0 {
            return Err(ConfigurationError::ZeroTileSize);
        }
        if !self.max_scale.is_finite() || self.max_scale <= 0.0 {
            return Err(ConfigurationError::InvalidScale(self.max_scale));
        }
        if let Some(min) = self.min_scale {
            if !min.is_finite() || min <= 0.0 {
                return Err(ConfigurationError::InvalidScale(min));
            }
            if min > self.max_scale {
                return Err(ConfigurationError::InvalidScaleRange {
                    min,
                    max: self.max_scale,
                });
            }
        }
        if self.tile_loading.worker_count == 0 {
            return Err(ConfigurationError::ZeroWorkers);
        }
        Ok(())
    }
}
