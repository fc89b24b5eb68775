//! # tileview
//!
//! A headless deep-zoom map viewport.
//!
//! A very large raster image is split into a pyramid of fixed-size tiles.
//! [`MapView`] keeps the current scale and pan offset, decides which tiles
//! cover the screen, fetches them off the owning thread through a
//! [`TileProvider`], and keeps markers and callouts pinned to their content
//! positions while the view moves. The host feeds decoded input events in and
//! replays the [`RenderContext`] draw list out.

pub mod animation;
pub mod core;
pub mod input;
pub mod overlay;
pub mod prelude;
pub mod rendering;
pub mod runtime;
pub mod tiles;
pub mod traits;
pub use crate::core::constants;

// Re-export public API
pub use crate::core::{
    bounds::{Bounds, NormalizedBounds},
    config::{ConfigurationError, MapViewConfiguration, MinimumScaleMode, TileLoadingConfig},
    content::ContentSpace,
    geo::{NormalizedPoint, Point},
    map::{MapView, MarkerTap},
    viewport::{ViewContext, Viewport},
};

pub use tiles::{
    cache::TileCache,
    compositor::TileCompositor,
    loader::TileLoader,
    provider::{TileError, TileProvider},
    pyramid::TilePyramid,
    types::{TileAddress, TileState},
};

#[cfg(feature = "image-provider")]
pub use tiles::source::DirectoryTileProvider;

pub use overlay::{
    callout::{CalloutPhase, CalloutTransition},
    layer::OverlayLayer,
    types::{Anchor, MarkerOptions, Overlay, OverlayHandle, OverlayKind, OverlaySize},
};

pub use input::events::{EventHandled, InputEvent};

pub use rendering::context::{DrawCommand, RenderContext};

pub use runtime::FetchExecutor;

pub use traits::ViewportAware;

/// Result type used throughout the library
pub type Result<T> = std::result::Result<T, MapError>;

/// Common error types
#[derive(Debug, thiserror::Error)]
pub enum MapError {
    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    #[error("map view is not configured")]
    NotConfigured,

    #[error("unknown overlay {0:?}")]
    UnknownOverlay(OverlayHandle),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Error type alias for convenience
pub type Error = MapError;

/// Installs `env_logger` as the `log` backend, honouring `RUST_LOG` and
/// defaulting to `info`. Later calls are ignored.
#[cfg(feature = "debug")]
pub fn init_logging() {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .try_init();
}
