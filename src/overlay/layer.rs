use crate::core::bounds::Bounds;
use crate::core::content::ContentSpace;
use crate::core::geo::{NormalizedPoint, Point};
use crate::core::viewport::{ViewContext, Viewport};
use crate::overlay::callout::CalloutTransition;
use crate::overlay::types::{
    Anchor, MarkerOptions, Overlay, OverlayHandle, OverlayKind, OverlaySize,
};
use crate::rendering::context::{DrawCommand, RenderContext};
use crate::traits::ViewportAware;
use instant::Instant;

/// Markers and callouts pinned to content positions.
///
/// Overlays are kept in insertion order; later overlays are drawn on top and
/// win hit tests. Every overlay's screen rectangle is recomputed whenever the
/// transform changes.
#[derive(Debug, Default)]
pub struct OverlayLayer {
    overlays: Vec<Overlay>,
    next_id: u64,
    context: Option<ViewContext>,
}

impl OverlayLayer {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_handle(&mut self) -> OverlayHandle {
        self.next_id += 1;
        OverlayHandle(self.next_id)
    }

    fn insert(&mut self, mut overlay: Overlay) -> OverlayHandle {
        if let Some(context) = &self.context {
            overlay.place(&context.space, &context.viewport);
        }
        let handle = overlay.handle;
        self.overlays.push(overlay);
        handle
    }

    pub fn add_marker(&mut self, options: MarkerOptions) -> OverlayHandle {
        let handle = self.next_handle();
        let mut overlay = Overlay::new(
            handle,
            options.position,
            options.anchor,
            options.size,
            OverlayKind::Marker,
        );
        overlay.title = options.title;
        self.insert(overlay)
    }

    /// Registers a plain overlay; its initial screen rectangle is computed
    /// right away
    pub fn add_overlay(
        &mut self,
        x: f64,
        y: f64,
        anchor: Anchor,
        size: OverlaySize,
    ) -> OverlayHandle {
        let handle = self.next_handle();
        self.insert(Overlay::new(
            handle,
            NormalizedPoint::new(x, y),
            anchor,
            size,
            OverlayKind::Marker,
        ))
    }

    /// Registers a callout. Its entrance is not started until
    /// [`OverlayLayer::transition_in`].
    pub fn add_callout(
        &mut self,
        x: f64,
        y: f64,
        anchor: Anchor,
        size: OverlaySize,
    ) -> OverlayHandle {
        let handle = self.next_handle();
        self.insert(Overlay::new(
            handle,
            NormalizedPoint::new(x, y),
            anchor,
            size,
            OverlayKind::Callout(CalloutTransition::default()),
        ))
    }

    /// No-op for unknown handles
    pub fn remove(&mut self, handle: OverlayHandle) -> Option<Overlay> {
        let index = self.overlays.iter().position(|o| o.handle == handle)?;
        Some(self.overlays.remove(index))
    }

    /// Removes every callout, returning how many were open
    pub fn remove_callouts(&mut self) -> usize {
        let before = self.overlays.len();
        self.overlays.retain(|o| !o.is_callout());
        before - self.overlays.len()
    }

    pub fn move_to(&mut self, handle: OverlayHandle, x: f64, y: f64) -> bool {
        self.update_overlay(handle, |overlay| overlay.position = NormalizedPoint::new(x, y))
    }

    pub fn set_size(&mut self, handle: OverlayHandle, size: OverlaySize) -> bool {
        self.update_overlay(handle, |overlay| overlay.size = size)
    }

    pub fn set_anchor(&mut self, handle: OverlayHandle, anchor: Anchor) -> bool {
        self.update_overlay(handle, |overlay| overlay.anchor = anchor)
    }

    /// Starts a callout's entrance; `false` if the handle is not a callout
    pub fn transition_in(&mut self, handle: OverlayHandle) -> bool {
        match self.get_mut(handle).map(|o| &mut o.kind) {
            Some(OverlayKind::Callout(transition)) => {
                transition.transition_in();
                true
            }
            _ => false,
        }
    }

    fn update_overlay(&mut self, handle: OverlayHandle, change: impl FnOnce(&mut Overlay)) -> bool {
        let context = self.context.clone();
        match self.get_mut(handle) {
            Some(overlay) => {
                change(overlay);
                if let Some(context) = context {
                    overlay.place(&context.space, &context.viewport);
                }
                true
            }
            None => false,
        }
    }

    pub fn get(&self, handle: OverlayHandle) -> Option<&Overlay> {
        self.overlays.iter().find(|o| o.handle == handle)
    }

    pub fn get_mut(&mut self, handle: OverlayHandle) -> Option<&mut Overlay> {
        self.overlays.iter_mut().find(|o| o.handle == handle)
    }

    /// Publishes fresh screen rectangles for the given transform
    pub fn reposition(&mut self, space: &ContentSpace, viewport: &Viewport) {
        for overlay in &mut self.overlays {
            overlay.place(space, viewport);
        }
        self.context = Some(ViewContext::new(*space, viewport.clone()));
    }

    /// The most recently added overlay whose rectangle contains `point`
    pub fn hit_test(&self, point: Point) -> Option<OverlayHandle> {
        self.overlays
            .iter()
            .rev()
            .find(|o| o.screen_rect().contains(&point))
            .map(|o| o.handle)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Overlay> {
        self.overlays.iter()
    }

    pub fn len(&self) -> usize {
        self.overlays.len()
    }

    pub fn is_empty(&self) -> bool {
        self.overlays.is_empty()
    }

    pub fn callout_count(&self) -> usize {
        self.overlays.iter().filter(|o| o.is_callout()).count()
    }

    /// Whether any callout entrance is still running
    pub fn is_animating(&self) -> bool {
        self.is_animating_at(Instant::now())
    }

    pub fn is_animating_at(&self, now: Instant) -> bool {
        self.overlays.iter().any(|o| match &o.kind {
            OverlayKind::Callout(transition) => transition.is_animating_at(now),
            OverlayKind::Marker => false,
        })
    }

    /// Queues every overlay in insertion order, with callout entrance
    /// opacity and scale sampled at `now`
    pub fn paint<B>(&self, ctx: &mut RenderContext<B>, now: Instant) -> usize {
        let mut painted = 0;
        for overlay in &self.overlays {
            let (opacity, scale) = match &overlay.kind {
                OverlayKind::Callout(transition) => {
                    (transition.opacity_at(now), transition.scale_at(now))
                }
                OverlayKind::Marker => (1.0, 1.0),
            };
            let queued = ctx.push(DrawCommand::Overlay {
                handle: overlay.handle,
                is_callout: overlay.is_callout(),
                dest: overlay.screen_rect(),
                opacity,
                scale,
            });
            if queued {
                painted += 1;
            }
        }
        painted
    }

    /// Union of all overlay rectangles, if any
    pub fn screen_extent(&self) -> Option<Bounds> {
        self.overlays.iter().map(Overlay::screen_rect).reduce(|a, b| {
            Bounds::from_coords(
                a.min.x.min(b.min.x),
                a.min.y.min(b.min.y),
                a.max.x.max(b.max.x),
                a.max.y.max(b.max.y),
            )
        })
    }
}

impl ViewportAware for OverlayLayer {
    fn on_viewport_changed(&mut self, context: &ViewContext) {
        self.reposition(&context.space, &context.viewport);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context(pan_x: f64, pan_y: f64) -> ViewContext {
        let mut viewport = Viewport::new(1.0, 1.0, Point::new(800.0, 600.0));
        viewport.set_pan(Point::new(pan_x, pan_y));
        ViewContext::new(ContentSpace::new(1000, 1000), viewport)
    }

    #[test]
    fn test_add_places_immediately() {
        let mut layer = OverlayLayer::new();
        layer.on_viewport_changed(&context(0.0, 0.0));

        let handle = layer.add_overlay(0.1, 0.2, Anchor::default(), OverlaySize::new(10.0, 10.0));
        let rect = layer.get(handle).unwrap().screen_rect();
        assert_eq!(rect, Bounds::from_coords(100.0, 200.0, 110.0, 210.0));
    }

    #[test]
    fn test_pan_invariant_offset() {
        let mut layer = OverlayLayer::new();
        layer.on_viewport_changed(&context(0.0, 0.0));
        let handle = layer.add_marker(MarkerOptions::new(0.595, 0.56));
        let before = layer.get(handle).unwrap().screen_rect().min;

        layer.on_viewport_changed(&context(37.0, -12.5));
        let after = layer.get(handle).unwrap().screen_rect().min;
        assert_eq!(after, Point::new(before.x - 37.0, before.y + 12.5));
    }

    #[test]
    fn test_most_recent_overlay_wins_hit_test() {
        let mut layer = OverlayLayer::new();
        layer.on_viewport_changed(&context(0.0, 0.0));
        let first = layer.add_overlay(0.1, 0.1, Anchor::default(), OverlaySize::new(50.0, 50.0));
        let second = layer.add_overlay(0.12, 0.12, Anchor::default(), OverlaySize::new(50.0, 50.0));

        assert_eq!(layer.hit_test(Point::new(130.0, 130.0)), Some(second));
        assert_eq!(layer.hit_test(Point::new(105.0, 105.0)), Some(first));
        assert_eq!(layer.hit_test(Point::new(500.0, 500.0)), None);

        layer.remove(second);
        assert_eq!(layer.hit_test(Point::new(130.0, 130.0)), Some(first));
    }

    #[test]
    fn test_remove_unknown_is_noop() {
        let mut layer = OverlayLayer::new();
        let handle = layer.add_marker(MarkerOptions::new(0.5, 0.5));
        assert!(layer.remove(OverlayHandle(999)).is_none());
        assert_eq!(layer.len(), 1);
        assert!(layer.remove(handle).is_some());
        assert!(layer.remove(handle).is_none());
        assert!(layer.is_empty());
    }

    #[test]
    fn test_move_and_resize_republish() {
        let mut layer = OverlayLayer::new();
        layer.on_viewport_changed(&context(0.0, 0.0));
        let handle = layer.add_marker(MarkerOptions::new(0.0, 0.0).anchor(-0.5, -1.0));

        assert!(layer.move_to(handle, 0.5, 0.5));
        assert!(layer.set_size(handle, OverlaySize::new(10.0, 20.0)));
        let rect = layer.get(handle).unwrap().screen_rect();
        assert_eq!(rect, Bounds::from_coords(495.0, 480.0, 505.0, 500.0));
        assert!(!layer.move_to(OverlayHandle(42), 0.0, 0.0));
    }

    #[test]
    fn test_callouts() {
        let mut layer = OverlayLayer::new();
        layer.on_viewport_changed(&context(0.0, 0.0));
        let marker = layer.add_marker(MarkerOptions::new(0.3, 0.3));
        let callout = layer.add_callout(0.3, 0.3, Anchor::callout(), OverlaySize::new(100.0, 50.0));

        assert!(!layer.transition_in(marker));
        assert!(layer.transition_in(callout));
        assert!(layer.is_animating());
        assert_eq!(layer.callout_count(), 1);

        // (300 - 50, 300 - 60)
        let rect = layer.get(callout).unwrap().screen_rect();
        assert_eq!(rect.min, Point::new(250.0, 240.0));

        assert_eq!(layer.remove_callouts(), 1);
        assert_eq!(layer.len(), 1);
    }

    #[test]
    fn test_paint_in_insertion_order() {
        let mut layer = OverlayLayer::new();
        layer.on_viewport_changed(&context(0.0, 0.0));
        let a = layer.add_marker(MarkerOptions::new(0.1, 0.1));
        let b = layer.add_callout(0.2, 0.2, Anchor::callout(), OverlaySize::new(80.0, 40.0));
        let _offscreen = layer.add_marker(MarkerOptions::new(0.99, 0.99));

        let mut ctx: RenderContext<()> = RenderContext::new(800.0, 600.0);
        ctx.begin_frame();
        assert_eq!(layer.paint(&mut ctx, Instant::now()), 2);
        let handles: Vec<_> = ctx.overlays().map(|(h, _)| *h).collect();
        assert_eq!(handles, vec![a, b]);
    }
}
