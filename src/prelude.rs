//! Prelude module for common tileview types and traits
//!
//! This module re-exports the most commonly used types, traits, and functions
//! for easy importing with `use tileview::prelude::*;`

pub use crate::core::{
    bounds::{Bounds, NormalizedBounds},
    config::{MapViewConfiguration, MinimumScaleMode, TileLoadingConfig},
    content::ContentSpace,
    geo::{NormalizedPoint, Point},
    map::{MapView, MarkerTap},
    viewport::{ViewContext, Viewport},
};

pub use crate::tiles::{
    provider::{TileError, TileProvider},
    pyramid::TilePyramid,
    types::{TileAddress, TileState},
};

pub use crate::overlay::{
    callout::CalloutTransition,
    types::{Anchor, MarkerOptions, OverlayHandle, OverlayKind, OverlaySize},
};

pub use crate::input::events::{EventHandled, InputEvent};

pub use crate::rendering::context::{DrawCommand, RenderContext};

pub use crate::runtime::FetchExecutor;

pub use crate::traits::ViewportAware;

pub use crate::{Error as MapError, Result};

pub use std::{
    sync::Arc,
    time::Duration,
};

pub use fxhash::{FxHashMap as HashMap, FxHashSet as HashSet};
