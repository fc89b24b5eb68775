use crate::core::bounds::Bounds;
use crate::core::constants::MARKER_ICON_SIZE;
use crate::core::content::ContentSpace;
use crate::core::geo::{NormalizedPoint, Point};
use crate::core::viewport::Viewport;
use crate::overlay::callout::CalloutTransition;
use serde::{Deserialize, Serialize};

/// Identity of an overlay, returned when it is added
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct OverlayHandle(pub u64);

/// Where an overlay sits relative to its content point.
///
/// `relative_*` are fractions of the overlay's own size (`-0.5` centres it,
/// `-1.0` puts its far edge on the point); `absolute_*` are extra screen pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Anchor {
    pub relative_x: f64,
    pub relative_y: f64,
    #[serde(default)]
    pub absolute_x: f64,
    #[serde(default)]
    pub absolute_y: f64,
}

impl Anchor {
    pub fn new(relative_x: f64, relative_y: f64) -> Self {
        Self {
            relative_x,
            relative_y,
            absolute_x: 0.0,
            absolute_y: 0.0,
        }
    }

    pub fn with_absolute(mut self, absolute_x: f64, absolute_y: f64) -> Self {
        self.absolute_x = absolute_x;
        self.absolute_y = absolute_y;
        self
    }

    /// Overlay centred on its point
    pub fn centered() -> Self {
        Self::new(-0.5, -0.5)
    }

    /// Centred horizontally, floating above the point
    pub fn callout() -> Self {
        let (x, y) = crate::core::constants::CALLOUT_ANCHOR;
        Self::new(x, y)
    }

    /// Top-left offset of an overlay of `size` from its point
    pub fn offset(&self, size: OverlaySize) -> Point {
        Point::new(
            self.relative_x * size.width + self.absolute_x,
            self.relative_y * size.height + self.absolute_y,
        )
    }
}

impl Default for Anchor {
    fn default() -> Self {
        Self::new(0.0, 0.0)
    }
}

/// Rendered size of an overlay, in screen pixels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OverlaySize {
    pub width: f64,
    pub height: f64,
}

impl OverlaySize {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

impl Default for OverlaySize {
    fn default() -> Self {
        Self::new(MARKER_ICON_SIZE.0 as f64, MARKER_ICON_SIZE.1 as f64)
    }
}

#[derive(Debug, Clone)]
pub enum OverlayKind {
    Marker,
    Callout(CalloutTransition),
}

impl OverlayKind {
    pub fn is_callout(&self) -> bool {
        matches!(self, OverlayKind::Callout(_))
    }
}

/// A marker or callout bound to a normalized content position
#[derive(Debug, Clone)]
pub struct Overlay {
    pub handle: OverlayHandle,
    pub position: NormalizedPoint,
    pub anchor: Anchor,
    pub size: OverlaySize,
    pub kind: OverlayKind,
    pub title: Option<String>,
    screen_rect: Bounds,
}

impl Overlay {
    pub fn new(
        handle: OverlayHandle,
        position: NormalizedPoint,
        anchor: Anchor,
        size: OverlaySize,
        kind: OverlayKind,
    ) -> Self {
        Self {
            handle,
            position,
            anchor,
            size,
            kind,
            title: None,
            screen_rect: Bounds::from_origin_and_size(Point::default(), size.width, size.height),
        }
    }

    /// Last published screen rectangle
    pub fn screen_rect(&self) -> Bounds {
        self.screen_rect
    }

    pub fn is_callout(&self) -> bool {
        self.kind.is_callout()
    }

    /// Recomputes the screen rectangle for the current transform
    pub fn place(&mut self, space: &ContentSpace, viewport: &Viewport) {
        let point = space.normalized_to_screen(self.position, viewport);
        let origin = point.add(&self.anchor.offset(self.size));
        self.screen_rect = Bounds::from_origin_and_size(origin, self.size.width, self.size.height);
    }

    /// `point` relative to the overlay's top-left corner
    pub fn local_point(&self, point: Point) -> Point {
        point.subtract(&self.screen_rect.min)
    }
}

/// Builder for markers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkerOptions {
    pub position: NormalizedPoint,
    #[serde(default)]
    pub anchor: Anchor,
    #[serde(default)]
    pub size: OverlaySize,
    #[serde(default)]
    pub title: Option<String>,
}

impl MarkerOptions {
    pub fn new(x: f64, y: f64) -> Self {
        Self {
            position: NormalizedPoint::new(x, y),
            anchor: Anchor::default(),
            size: OverlaySize::default(),
            title: None,
        }
    }

    pub fn anchor(mut self, relative_x: f64, relative_y: f64) -> Self {
        self.anchor = Anchor {
            relative_x,
            relative_y,
            ..self.anchor
        };
        self
    }

    pub fn absolute_anchor(mut self, absolute_x: f64, absolute_y: f64) -> Self {
        self.anchor = self.anchor.with_absolute(absolute_x, absolute_y);
        self
    }

    pub fn size(mut self, width: f64, height: f64) -> Self {
        self.size = OverlaySize::new(width, height);
        self
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }
}
