use crate::core::bounds::Bounds;
use crate::core::config::MinimumScaleMode;
use crate::core::content::ContentSpace;
use crate::core::geo::Point;

/// Current window into the content: scale, pan offset and screen size.
///
/// The pan offset is expressed in scaled content pixels, so a content pixel
/// `p` lands on screen at `p * scale - pan`. Every mutator keeps
/// `min_scale() <= scale <= max_scale` and, unless overscroll is allowed,
/// keeps the visible rectangle inside the pannable bounds.
#[derive(Debug, Clone, PartialEq)]
pub struct Viewport {
    scale: f64,
    pan: Point,
    size: Point,
    min_scale: f64,
    max_scale: f64,
    minimum_scale_mode: MinimumScaleMode,
    /// Pannable region in full-resolution content pixels
    content_bounds: Option<Bounds>,
    allow_overscroll: bool,
}

impl Viewport {
    /// Creates a viewport at `min_scale` with no pan limits
    pub fn new(min_scale: f64, max_scale: f64, size: Point) -> Self {
        Self {
            scale: min_scale,
            pan: Point::default(),
            size,
            min_scale,
            max_scale,
            minimum_scale_mode: MinimumScaleMode::None,
            content_bounds: None,
            allow_overscroll: false,
        }
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn pan_offset(&self) -> Point {
        self.pan
    }

    pub fn size(&self) -> Point {
        self.size
    }

    pub fn max_scale(&self) -> f64 {
        self.max_scale
    }

    /// Lower scale limit, raised by the minimum scale mode once the screen
    /// size and the bounds are known
    pub fn min_scale(&self) -> f64 {
        let mode_min = match (self.minimum_scale_mode, &self.content_bounds) {
            (MinimumScaleMode::None, _) | (_, None) => 0.0,
            (mode, Some(bounds)) => {
                if self.size.x <= 0.0 || self.size.y <= 0.0 {
                    0.0
                } else {
                    let fit_x = self.size.x / bounds.width();
                    let fit_y = self.size.y / bounds.height();
                    match mode {
                        MinimumScaleMode::Fit => fit_x.min(fit_y),
                        _ => fit_x.max(fit_y),
                    }
                }
            }
        };
        self.min_scale.max(mode_min).min(self.max_scale)
    }

    pub fn allows_overscroll(&self) -> bool {
        self.allow_overscroll
    }

    pub fn content_bounds(&self) -> Option<&Bounds> {
        self.content_bounds.as_ref()
    }

    /// Sets the scale limits, then re-clamps the current transform
    pub fn set_scale_limits(&mut self, min_scale: f64, max_scale: f64) {
        self.min_scale = min_scale;
        self.max_scale = max_scale;
        self.reclamp();
    }

    pub fn set_minimum_scale_mode(&mut self, mode: MinimumScaleMode) {
        self.minimum_scale_mode = mode;
        self.reclamp();
    }

    /// Sets the pannable region in full-resolution content pixels
    pub fn set_content_bounds(&mut self, bounds: Option<Bounds>) {
        self.content_bounds = bounds;
        self.reclamp();
    }

    pub fn set_allow_overscroll(&mut self, allow: bool) {
        self.allow_overscroll = allow;
        self.reclamp();
    }

    /// Sets the screen size
    pub fn set_size(&mut self, size: Point) {
        self.size = size;
        self.reclamp();
    }

    pub fn clamp_scale(&self, scale: f64) -> f64 {
        if !scale.is_finite() {
            return self.scale;
        }
        scale.clamp(self.min_scale(), self.max_scale)
    }

    /// Sets the scale keeping the screen centre fixed. Returns whether the
    /// transform changed.
    pub fn set_scale(&mut self, scale: f64) -> bool {
        let centre = Point::new(self.size.x / 2.0, self.size.y / 2.0);
        self.set_scale_at(scale, centre)
    }

    /// Sets the scale keeping the content under `focus` (a screen point) fixed
    pub fn set_scale_at(&mut self, scale: f64, focus: Point) -> bool {
        let before = (self.scale, self.pan);
        let new_scale = self.clamp_scale(scale);
        if new_scale == self.scale {
            return false;
        }
        let focus_content = focus.add(&self.pan).multiply(1.0 / self.scale);
        self.scale = new_scale;
        self.pan = self.clamp_pan(focus_content.multiply(new_scale).subtract(&focus));
        before != (self.scale, self.pan)
    }

    /// Pans by a screen-pixel delta with bounds checking.
    /// Returns the delta that was actually applied.
    pub fn pan(&mut self, dx: f64, dy: f64) -> Point {
        let previous = self.pan;
        self.pan = self.clamp_pan(Point::new(previous.x + dx, previous.y + dy));
        self.pan.subtract(&previous)
    }

    /// Sets the pan offset directly, clamped to the bounds
    pub fn set_pan(&mut self, pan: Point) -> bool {
        let previous = self.pan;
        self.pan = self.clamp_pan(pan);
        previous != self.pan
    }

    /// Centres the view on a full-resolution content pixel
    pub fn center_on(&mut self, absolute: Point) -> bool {
        let half = Point::new(self.size.x / 2.0, self.size.y / 2.0);
        self.set_pan(absolute.multiply(self.scale).subtract(&half))
    }

    /// Visible rectangle in full-resolution content pixels
    pub fn visible_content_rect(&self) -> Bounds {
        Bounds::from_origin_and_size(self.pan, self.size.x, self.size.y).scaled(1.0 / self.scale)
    }

    fn clamp_pan(&self, pan: Point) -> Point {
        match &self.content_bounds {
            Some(bounds) if !self.allow_overscroll => {
                let scaled = bounds.scaled(self.scale);
                Point::new(
                    clamp_axis(pan.x, scaled.min.x, scaled.max.x, self.size.x),
                    clamp_axis(pan.y, scaled.min.y, scaled.max.y, self.size.y),
                )
            }
            _ => pan,
        }
    }

    fn reclamp(&mut self) {
        let scale = self.clamp_scale(self.scale);
        if scale != self.scale {
            self.set_scale(scale);
        } else {
            self.pan = self.clamp_pan(self.pan);
        }
    }

    #[cfg(test)]
    pub(crate) fn set_scale_unchecked(&mut self, scale: f64) {
        self.scale = scale;
    }

    #[cfg(test)]
    pub(crate) fn set_pan_unchecked(&mut self, pan: Point) {
        self.pan = pan;
    }
}

/// Keeps `[pan, pan + extent]` inside `[lo, hi]`, centring when it cannot fit
fn clamp_axis(pan: f64, lo: f64, hi: f64, extent: f64) -> f64 {
    if hi - lo <= extent {
        (lo + hi - extent) / 2.0
    } else {
        pan.clamp(lo, hi - extent)
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(1.0, 1.0, Point::new(800.0, 600.0))
    }
}

/// The transform plus the content space it applies to; what dependents need
/// to place themselves on screen
#[derive(Debug, Clone, PartialEq)]
pub struct ViewContext {
    pub space: ContentSpace,
    pub viewport: Viewport,
}

impl ViewContext {
    pub fn new(space: ContentSpace, viewport: Viewport) -> Self {
        Self { space, viewport }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bounded(width: f64, height: f64) -> Viewport {
        let mut viewport = Viewport::new(1.0 / 64.0, 3.0, Point::new(800.0, 600.0));
        viewport.set_content_bounds(Some(Bounds::from_coords(0.0, 0.0, width, height)));
        viewport.set_scale(1.0);
        viewport
    }

    #[test]
    fn test_scale_limits() {
        let mut viewport = Viewport::new(0.25, 2.0, Point::new(800.0, 600.0));

        viewport.set_scale(0.1);
        assert_eq!(viewport.scale(), 0.25);

        viewport.set_scale(20.0);
        assert_eq!(viewport.scale(), 2.0);

        for s in [-1.0, 0.0, 0.3, 1.7, 1e9, f64::INFINITY] {
            let clamped = viewport.clamp_scale(s);
            assert!(clamped >= viewport.min_scale() && clamped <= viewport.max_scale());
        }
    }

    #[test]
    fn test_pan_clamps_to_bounds() {
        let mut viewport = bounded(15360.0, 8640.0);
        viewport.set_pan(Point::new(0.0, 0.0));

        let applied = viewport.pan(-100.0, -50.0);
        assert_eq!(viewport.pan_offset(), Point::new(0.0, 0.0));
        assert_eq!(applied, Point::new(0.0, 0.0));

        viewport.pan(1e6, 1e6);
        assert_eq!(viewport.pan_offset(), Point::new(15360.0 - 800.0, 8640.0 - 600.0));
    }

    #[test]
    fn test_pan_inside_bounds_is_exact() {
        let mut viewport = bounded(15360.0, 8640.0);
        viewport.set_pan(Point::new(1000.0, 1000.0));
        let applied = viewport.pan(37.5, -12.25);
        assert_eq!(applied, Point::new(37.5, -12.25));
        assert_eq!(viewport.pan_offset(), Point::new(1037.5, 987.75));
    }

    #[test]
    fn test_small_content_is_centred() {
        let mut viewport = bounded(400.0, 300.0);
        viewport.pan(50.0, 50.0);
        assert_eq!(viewport.pan_offset(), Point::new(-200.0, -150.0));
    }

    #[test]
    fn test_overscroll_skips_clamping() {
        let mut viewport = bounded(15360.0, 8640.0);
        viewport.set_allow_overscroll(true);
        viewport.pan(-500.0, -500.0);
        assert_eq!(viewport.pan_offset(), Point::new(-500.0, -500.0));
    }

    #[test]
    fn test_scale_at_keeps_focus_fixed() {
        let mut viewport = bounded(15360.0, 8640.0);
        viewport.set_scale(0.5);
        viewport.set_pan(Point::new(1000.0, 800.0));

        let focus = Point::new(200.0, 150.0);
        let content_before = focus.add(&viewport.pan_offset()).multiply(1.0 / viewport.scale());
        viewport.set_scale_at(1.0, focus);
        let content_after = focus.add(&viewport.pan_offset()).multiply(1.0 / viewport.scale());

        assert!((content_before.x - content_after.x).abs() < 1e-9);
        assert!((content_before.y - content_after.y).abs() < 1e-9);
    }

    #[test]
    fn test_fit_and_fill_modes_raise_min_scale() {
        let mut viewport = Viewport::new(1.0 / 64.0, 3.0, Point::new(800.0, 600.0));
        viewport.set_content_bounds(Some(Bounds::from_coords(0.0, 0.0, 16000.0, 8000.0)));

        viewport.set_minimum_scale_mode(MinimumScaleMode::Fit);
        assert_eq!(viewport.min_scale(), 0.05);

        viewport.set_minimum_scale_mode(MinimumScaleMode::Fill);
        assert_eq!(viewport.min_scale(), 0.075);
        assert!(viewport.scale() >= 0.075);

        viewport.set_minimum_scale_mode(MinimumScaleMode::None);
        assert_eq!(viewport.min_scale(), 1.0 / 64.0);
    }

    #[test]
    fn test_visible_content_rect() {
        let mut viewport = bounded(15360.0, 8640.0);
        viewport.set_scale_at(0.5, Point::new(0.0, 0.0));
        viewport.set_pan(Point::new(100.0, 50.0));
        let rect = viewport.visible_content_rect();
        assert_eq!(rect, Bounds::from_coords(200.0, 100.0, 1800.0, 1300.0));
    }

    #[test]
    fn test_center_on() {
        let mut viewport = bounded(15360.0, 8640.0);
        viewport.center_on(Point::new(5000.0, 4000.0));
        assert_eq!(viewport.pan_offset(), Point::new(4600.0, 3700.0));
    }
}
