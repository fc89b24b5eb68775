//! Markers and callouts that stay pinned to content positions

pub mod callout;
pub mod layer;
pub mod types;

pub use callout::{CalloutPhase, CalloutTransition};
pub use layer::OverlayLayer;
pub use types::{Anchor, MarkerOptions, Overlay, OverlayHandle, OverlayKind, OverlaySize};
