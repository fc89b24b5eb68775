use crate::{
    core::{
        bounds::NormalizedBounds,
        config::MapViewConfiguration,
        constants::DOUBLE_TAP_ZOOM_FACTOR,
        content::ContentSpace,
        geo::{NormalizedPoint, Point},
        viewport::{ViewContext, Viewport},
    },
    input::{EventHandled, InputEvent},
    overlay::{Anchor, MarkerOptions, Overlay, OverlayHandle, OverlayLayer, OverlaySize},
    prelude::Arc,
    rendering::context::RenderContext,
    runtime::FetchExecutor,
    tiles::{TileAddress, TileCompositor, TileProvider, TilePyramid, TileState},
    traits::ViewportAware,
    MapError, Result,
};
use instant::Instant;

/// A tap that landed on a marker
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarkerTap {
    pub handle: OverlayHandle,
    /// Tap position relative to the marker's top-left corner
    pub local_x: f64,
    pub local_y: f64,
    /// The marker's content position
    pub position: NormalizedPoint,
}

type MarkerTapListener<B> = Box<dyn FnMut(&mut MapView<B>, MarkerTap)>;
type TransformListener = Box<dyn FnMut(&ViewContext)>;

/// A pannable, zoomable view over a tile pyramid with markers and callouts.
///
/// The view is owned by a single context: every method takes `&self` or
/// `&mut self`, and tile fetches are the only work done elsewhere. Their
/// results are applied by [`MapView::process_tile_results`], which the host
/// calls once per frame (or whenever it is woken up).
///
/// ```
/// use tileview::{FetchExecutor, MapView, MapViewConfiguration, MarkerOptions};
///
/// let mut view: MapView<u32> = MapView::new(800.0, 600.0).with_executor(FetchExecutor::inline());
/// let config = MapViewConfiguration::new(7, 15360, 8640, 256).set_max_scale(3.0);
/// view.configure(config, |row: u32, col: u32, level: u32| Some(row + col + level))
///     .unwrap();
///
/// let marker = view.add_marker(MarkerOptions::new(0.595, 0.56)).unwrap();
/// assert!(view.overlay(marker).is_some());
/// ```
pub struct MapView<B> {
    config: Option<MapViewConfiguration>,
    space: Option<ContentSpace>,
    viewport: Viewport,
    compositor: Option<TileCompositor<B>>,
    overlays: OverlayLayer,
    bounds: NormalizedBounds,
    executor: Option<FetchExecutor>,
    placeholder: Option<Arc<B>>,
    marker_tap_listener: Option<MarkerTapListener<B>>,
    transform_listeners: Vec<TransformListener>,
    needs_repaint: bool,
}

impl<B: Send + Sync + 'static> MapView<B> {
    /// An unconfigured view of the given screen size
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            config: None,
            space: None,
            viewport: Viewport::new(1.0, 1.0, Point::new(width, height)),
            compositor: None,
            overlays: OverlayLayer::new(),
            bounds: NormalizedBounds::full(),
            executor: None,
            placeholder: None,
            marker_tap_listener: None,
            transform_listeners: Vec::new(),
            needs_repaint: true,
        }
    }

    /// Runs tile fetches on `executor` instead of the one derived from the
    /// configuration. Takes effect on the first [`MapView::configure`].
    pub fn with_executor(mut self, executor: FetchExecutor) -> Self {
        self.executor = Some(executor);
        self
    }

    /// Installs the pyramid description and the tile provider.
    ///
    /// Calling it again resets all tile state: the cache is cleared and
    /// fetches still running for the previous configuration are discarded
    /// when they complete. Overlays are kept and repositioned.
    pub fn configure<P>(&mut self, config: MapViewConfiguration, provider: P) -> Result<()>
    where
        P: TileProvider<B> + 'static,
    {
        config.validate()?;

        let provider: Arc<dyn TileProvider<B>> = Arc::new(provider);
        let pyramid = TilePyramid::from_config(&config);
        let space = ContentSpace::new(config.full_width, config.full_height);
        let retention = config.tile_loading.retention_updates;

        match &mut self.compositor {
            Some(compositor) => {
                log::info!(
                    "reconfiguring map view: {} levels, {}x{}",
                    config.level_count,
                    config.full_width,
                    config.full_height
                );
                compositor.reconfigure(pyramid, space, provider, retention);
                if self.executor.is_none() {
                    compositor.set_executor(FetchExecutor::from_config(&config.tile_loading));
                }
            }
            None => {
                log::info!(
                    "configuring map view: {} levels, {}x{}, tile size {}",
                    config.level_count,
                    config.full_width,
                    config.full_height,
                    config.tile_size
                );
                let executor = self
                    .executor
                    .clone()
                    .unwrap_or_else(|| FetchExecutor::from_config(&config.tile_loading));
                let mut compositor =
                    TileCompositor::new(pyramid, space, provider, executor, retention);
                compositor.set_placeholder(self.placeholder.clone());
                self.compositor = Some(compositor);
            }
        }

        let mut viewport = Viewport::new(
            config.effective_min_scale(),
            config.max_scale,
            self.viewport.size(),
        );
        viewport.set_minimum_scale_mode(config.minimum_scale_mode);
        viewport.set_allow_overscroll(config.allow_overscroll);
        let bounds = self.bounds.to_pixels(space.full_width(), space.full_height());
        viewport.set_content_bounds(Some(bounds));
        viewport.center_on(bounds.center());

        self.viewport = viewport;
        self.space = Some(space);
        self.config = Some(config);
        self.publish_transform();
        Ok(())
    }

    pub fn is_configured(&self) -> bool {
        self.config.is_some()
    }

    /// Limits panning to a normalized rectangle of the content; `(0, 0, 1, 1)`
    /// by default
    pub fn define_bounds(&mut self, min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Result<()> {
        self.bounds = NormalizedBounds::new(min_x, min_y, max_x, max_y)?;
        if let Some(space) = self.space {
            let bounds = self.bounds.to_pixels(space.full_width(), space.full_height());
            self.viewport.set_content_bounds(Some(bounds));
            self.publish_transform();
        }
        Ok(())
    }

    /// Sets the scale around the screen centre. Returns whether the
    /// transform changed.
    pub fn set_scale(&mut self, scale: f64) -> bool {
        let changed = self.viewport.set_scale(scale);
        if changed {
            self.publish_transform();
        }
        changed
    }

    /// Sets the scale keeping the content under `focus` in place
    pub fn set_scale_at(&mut self, scale: f64, focus: Point) -> bool {
        let changed = self.viewport.set_scale_at(scale, focus);
        if changed {
            self.publish_transform();
        }
        changed
    }

    /// Moves the pan offset by a screen-pixel delta; the content moves the
    /// opposite way. Returns the delta actually applied after clamping.
    pub fn pan(&mut self, dx: f64, dy: f64) -> Point {
        let applied = self.viewport.pan(dx, dy);
        if applied != Point::default() {
            self.publish_transform();
        }
        applied
    }

    /// Centres the view on a normalized position (clamped to the bounds)
    pub fn scroll_to(&mut self, x: f64, y: f64) -> bool {
        let Some(space) = self.space else {
            return false;
        };
        let changed = self
            .viewport
            .center_on(space.to_absolute_pixels(NormalizedPoint::new(x, y)));
        if changed {
            self.publish_transform();
        }
        changed
    }

    /// The host laid the view out at a new size
    pub fn set_size(&mut self, width: f64, height: f64) {
        self.viewport.set_size(Point::new(width, height));
        self.publish_transform();
    }

    pub fn add_marker(&mut self, options: MarkerOptions) -> Result<OverlayHandle> {
        self.ensure_configured()?;
        let handle = self.overlays.add_marker(options);
        self.needs_repaint = true;
        Ok(handle)
    }

    pub fn add_overlay(
        &mut self,
        x: f64,
        y: f64,
        anchor: Anchor,
        size: OverlaySize,
    ) -> Result<OverlayHandle> {
        self.ensure_configured()?;
        let handle = self.overlays.add_overlay(x, y, anchor, size);
        self.needs_repaint = true;
        Ok(handle)
    }

    /// Adds a callout at a content position. `anchor` carries both the
    /// size-relative offset (usually [`Anchor::callout`]) and an absolute
    /// pixel offset. Start its entrance with [`MapView::transition_in`].
    pub fn add_callout(
        &mut self,
        x: f64,
        y: f64,
        anchor: Anchor,
        size: OverlaySize,
    ) -> Result<OverlayHandle> {
        self.ensure_configured()?;
        let handle = self.overlays.add_callout(x, y, anchor, size);
        self.needs_repaint = true;
        Ok(handle)
    }

    /// Removes an overlay; unknown handles are ignored
    pub fn remove_overlay(&mut self, handle: OverlayHandle) -> bool {
        let removed = self.overlays.remove(handle).is_some();
        self.needs_repaint |= removed;
        removed
    }

    pub fn move_marker(&mut self, handle: OverlayHandle, x: f64, y: f64) -> Result<()> {
        if !self.overlays.move_to(handle, x, y) {
            return Err(MapError::UnknownOverlay(handle));
        }
        self.needs_repaint = true;
        Ok(())
    }

    pub fn set_overlay_size(&mut self, handle: OverlayHandle, size: OverlaySize) -> Result<()> {
        if !self.overlays.set_size(handle, size) {
            return Err(MapError::UnknownOverlay(handle));
        }
        self.needs_repaint = true;
        Ok(())
    }

    /// Starts the entrance transition of a callout
    pub fn transition_in(&mut self, handle: OverlayHandle) -> Result<()> {
        if !self.overlays.transition_in(handle) {
            return Err(MapError::UnknownOverlay(handle));
        }
        self.needs_repaint = true;
        Ok(())
    }

    /// Called with the view itself whenever a tap lands on a marker, so the
    /// listener can open a callout
    pub fn set_marker_tap_listener<F>(&mut self, listener: F)
    where
        F: FnMut(&mut MapView<B>, MarkerTap) + 'static,
    {
        self.marker_tap_listener = Some(Box::new(listener));
    }

    pub fn clear_marker_tap_listener(&mut self) {
        self.marker_tap_listener = None;
    }

    /// Called after every transform change
    pub fn add_transform_listener<F>(&mut self, listener: F)
    where
        F: FnMut(&ViewContext) + 'static,
    {
        self.transform_listeners.push(Box::new(listener));
    }

    /// Dispatches a confirmed tap at a screen position.
    ///
    /// Open callouts are dismissed unless the tap lands on one (and the
    /// configuration allows it). A tap on a marker goes to the marker tap
    /// listener.
    pub fn on_tap(&mut self, position: Point) -> EventHandled {
        let hit = self
            .overlays
            .hit_test(position)
            .and_then(|handle| self.overlays.get(handle))
            .map(|overlay| (overlay.is_callout(), tap_on(overlay, position)));

        let dismiss = self.config.as_ref().is_some_and(|c| c.dismiss_callouts_on_tap);
        let mut handled = false;
        if dismiss && !matches!(hit, Some((true, _))) {
            let dismissed = self.overlays.remove_callouts();
            if dismissed > 0 {
                log::debug!("dismissed {} callouts", dismissed);
                self.needs_repaint = true;
                handled = true;
            }
        }

        match hit {
            Some((false, tap)) => {
                log::debug!("marker {:?} tapped", tap.handle);
                if let Some(mut listener) = self.marker_tap_listener.take() {
                    listener(self, tap);
                    // The listener may have installed a replacement
                    if self.marker_tap_listener.is_none() {
                        self.marker_tap_listener = Some(listener);
                    }
                }
                EventHandled::Handled
            }
            Some((true, _)) => EventHandled::Handled,
            None => handled.into(),
        }
    }

    /// Applies a decoded input event
    pub fn handle_input(&mut self, event: InputEvent) -> EventHandled {
        match event {
            InputEvent::Tap { position } => self.on_tap(position),
            InputEvent::DoubleTap { position } => {
                let scale = self.viewport.scale() * DOUBLE_TAP_ZOOM_FACTOR;
                self.set_scale_at(scale, position).into()
            }
            InputEvent::Drag { delta } => {
                let applied = self.pan(-delta.x, -delta.y);
                (applied != Point::default()).into()
            }
            InputEvent::Zoom { factor, focus } => {
                if !factor.is_finite() || factor <= 0.0 {
                    return EventHandled::NotHandled;
                }
                let scale = self.viewport.scale() * factor;
                self.set_scale_at(scale, focus).into()
            }
            InputEvent::Resize { size } => {
                self.set_size(size.x, size.y);
                EventHandled::Handled
            }
        }
    }

    /// Applies completed tile fetches. Returns whether a visible tile changed
    /// and the view should be repainted.
    pub fn process_tile_results(&mut self) -> bool {
        let repaint = self
            .compositor
            .as_mut()
            .is_some_and(|compositor| compositor.process_results());
        self.needs_repaint |= repaint;
        repaint
    }

    /// Fills `ctx` with this frame's draw list: tiles, then overlays
    pub fn render(&mut self, ctx: &mut RenderContext<B>) {
        self.render_at(ctx, Instant::now());
    }

    /// [`MapView::render`] with callout transitions sampled at `now`
    pub fn render_at(&mut self, ctx: &mut RenderContext<B>, now: Instant) {
        ctx.begin_frame();
        if let Some(compositor) = &self.compositor {
            compositor.paint(&self.viewport, ctx);
        }
        self.overlays.paint(ctx, now);
        self.needs_repaint = self.overlays.is_animating_at(now);
    }

    /// Bitmap drawn in place of tiles that are not available
    pub fn set_placeholder(&mut self, placeholder: Option<B>) {
        self.placeholder = placeholder.map(Arc::new);
        if let Some(compositor) = &mut self.compositor {
            compositor.set_placeholder(self.placeholder.clone());
        }
        self.needs_repaint = true;
    }

    /// Forgets one tile so it is fetched again when visible
    pub fn invalidate_tile(&mut self, address: TileAddress) {
        if let Some(compositor) = &mut self.compositor {
            if compositor.invalidate(&address) {
                compositor.update(&self.viewport);
            }
        }
    }

    /// Forgets every tile; the visible ones are fetched again right away
    pub fn invalidate_tiles(&mut self) {
        if let Some(compositor) = &mut self.compositor {
            compositor.invalidate_all();
            compositor.update(&self.viewport);
        }
    }

    pub fn needs_repaint(&self) -> bool {
        self.needs_repaint
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn scale(&self) -> f64 {
        self.viewport.scale()
    }

    pub fn pan_offset(&self) -> Point {
        self.viewport.pan_offset()
    }

    pub fn configuration(&self) -> Option<&MapViewConfiguration> {
        self.config.as_ref()
    }

    pub fn content_space(&self) -> Option<&ContentSpace> {
        self.space.as_ref()
    }

    pub fn bounds(&self) -> &NormalizedBounds {
        &self.bounds
    }

    pub fn overlays(&self) -> &OverlayLayer {
        &self.overlays
    }

    pub fn overlay(&self, handle: OverlayHandle) -> Option<&Overlay> {
        self.overlays.get(handle)
    }

    /// Pyramid level currently drawn
    pub fn tile_level(&self) -> Option<u32> {
        self.compositor.as_ref().map(TileCompositor::level)
    }

    pub fn visible_tiles(&self) -> &[TileAddress] {
        self.compositor
            .as_ref()
            .map(TileCompositor::visible_tiles)
            .unwrap_or_default()
    }

    /// `None` when the tile is absent
    pub fn tile_state(&self, address: &TileAddress) -> Option<TileState<B>> {
        self.compositor.as_ref()?.state(address).cloned()
    }

    pub fn pending_fetches(&self) -> usize {
        self.compositor.as_ref().map_or(0, TileCompositor::pending_fetches)
    }

    /// Executor the tile fetches run on, once configured
    pub fn fetch_executor(&self) -> Option<&FetchExecutor> {
        self.compositor.as_ref().map(TileCompositor::executor)
    }

    /// Screen position of a normalized content position
    pub fn to_screen(&self, position: NormalizedPoint) -> Option<Point> {
        Some(self.space?.normalized_to_screen(position, &self.viewport))
    }

    /// Normalized content position under a screen point
    pub fn to_normalized(&self, screen: Point) -> Option<NormalizedPoint> {
        Some(self.space?.screen_to_normalized(screen, &self.viewport))
    }

    fn ensure_configured(&self) -> Result<()> {
        if self.is_configured() {
            Ok(())
        } else {
            Err(MapError::NotConfigured)
        }
    }

    fn publish_transform(&mut self) {
        let Some(space) = self.space else {
            return;
        };
        let context = ViewContext::new(space, self.viewport.clone());
        log::trace!(
            "transform: scale {:.4}, pan ({:.1}, {:.1})",
            self.viewport.scale(),
            self.viewport.pan_offset().x,
            self.viewport.pan_offset().y
        );

        if let Some(compositor) = &mut self.compositor {
            compositor.on_viewport_changed(&context);
        }
        self.overlays.on_viewport_changed(&context);
        for listener in &mut self.transform_listeners {
            listener(&context);
        }
        self.needs_repaint = true;
    }
}

fn tap_on(overlay: &Overlay, position: Point) -> MarkerTap {
    let local = overlay.local_point(position);
    MarkerTap {
        handle: overlay.handle,
        local_x: local.x,
        local_y: local.y,
        position: overlay.position,
    }
}

impl<B> std::fmt::Debug for MapView<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MapView")
            .field("config", &self.config)
            .field("viewport", &self.viewport)
            .field("bounds", &self.bounds)
            .field("overlays", &self.overlays.len())
            .field("needs_repaint", &self.needs_repaint)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::{MinimumScaleMode, TileLoadingConfig};
    use crate::ConfigurationError;
    use std::cell::RefCell;
    use std::rc::Rc;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn demo_config() -> MapViewConfiguration {
        MapViewConfiguration::new(7, 15360, 8640, 256)
            .set_max_scale(3.0)
            .set_minimum_scale_mode(MinimumScaleMode::None)
    }

    fn configured() -> MapView<u32> {
        let mut view = MapView::new(800.0, 600.0).with_executor(FetchExecutor::inline());
        view.configure(demo_config(), |row: u32, col: u32, _: u32| Some(row * 100 + col))
            .unwrap();
        view
    }

    #[test]
    fn test_overlays_require_configuration() {
        let mut view: MapView<u32> = MapView::new(800.0, 600.0);
        assert!(matches!(
            view.add_marker(MarkerOptions::new(0.5, 0.5)),
            Err(MapError::NotConfigured)
        ));
        assert!(!view.is_configured());
    }

    #[test]
    fn test_configure_rejects_invalid() {
        let mut view: MapView<u32> =
            MapView::new(800.0, 600.0).with_executor(FetchExecutor::inline());
        let config = MapViewConfiguration::new(7, 0, 8640, 256);
        let result = view.configure(config, |_: u32, _: u32, _: u32| -> Option<u32> { None });
        assert!(matches!(
            result,
            Err(MapError::Configuration(ConfigurationError::NonPositiveExtent { .. }))
        ));
        assert!(!view.is_configured());
    }

    #[test]
    fn test_configure_starts_at_min_scale() {
        let view = configured();
        assert_eq!(view.scale(), 1.0 / 64.0);
        assert_eq!(view.tile_level(), Some(0));
        assert_eq!(view.visible_tiles(), &[TileAddress::new(0, 0, 0)]);
    }

    #[test]
    fn test_define_bounds_validates() {
        let mut view = configured();
        assert!(view.define_bounds(0.5, 0.0, 0.4, 1.0).is_err());
        assert!(view.define_bounds(0.0, 0.0, 1.0, 1.0).is_ok());
    }

    #[test]
    fn test_pan_moves_markers_opposite() {
        let mut view = configured();
        view.set_scale(1.0);
        view.scroll_to(0.5, 0.5);
        let marker = view.add_marker(MarkerOptions::new(0.595, 0.56)).unwrap();
        let before = view.overlay(marker).unwrap().screen_rect().min;

        let applied = view.pan(40.0, -25.0);
        assert_eq!(applied, Point::new(40.0, -25.0));
        let after = view.overlay(marker).unwrap().screen_rect().min;
        assert!((after.x - (before.x - 40.0)).abs() < 1e-9);
        assert!((after.y - (before.y + 25.0)).abs() < 1e-9);
    }

    #[test]
    fn test_marker_tap_opens_callout() {
        let mut view = configured();
        view.set_scale(1.0);
        view.scroll_to(0.595, 0.56);
        let marker = view
            .add_marker(
                MarkerOptions::new(0.595, 0.56)
                    .anchor(-0.5, -1.0)
                    .title("Residential Building"),
            )
            .unwrap();

        let taps = Rc::new(RefCell::new(Vec::new()));
        let seen = taps.clone();
        view.set_marker_tap_listener(move |view: &mut MapView<u32>, tap: MarkerTap| {
            seen.borrow_mut().push(tap);
            let size = OverlaySize::new(200.0, 80.0);
            let callout = view
                .add_callout(tap.position.x, tap.position.y, Anchor::callout(), size)
                .unwrap();
            view.transition_in(callout).unwrap();
        });

        let rect = view.overlay(marker).unwrap().screen_rect();
        let point = Point::new(rect.min.x + 5.0, rect.min.y + 7.0);
        assert_eq!(view.on_tap(point), EventHandled::Handled);

        let taps = taps.borrow();
        assert_eq!(taps.len(), 1);
        assert_eq!(taps[0].handle, marker);
        assert!((taps[0].local_x - 5.0).abs() < 1e-9);
        assert!((taps[0].local_y - 7.0).abs() < 1e-9);
        assert_eq!(view.overlays().callout_count(), 1);
    }

    #[test]
    fn test_tap_elsewhere_dismisses_callouts() {
        let mut view = configured();
        let callout = view
            .add_callout(0.5, 0.5, Anchor::callout(), OverlaySize::new(100.0, 50.0))
            .unwrap();

        // Tapping the callout keeps it
        let rect = view.overlay(callout).unwrap().screen_rect();
        assert_eq!(view.on_tap(rect.center()), EventHandled::Handled);
        assert_eq!(view.overlays().callout_count(), 1);

        assert_eq!(view.on_tap(Point::new(1.0, 1.0)), EventHandled::Handled);
        assert_eq!(view.overlays().callout_count(), 0);
        assert_eq!(view.on_tap(Point::new(1.0, 1.0)), EventHandled::NotHandled);
    }

    #[test]
    fn test_remove_unknown_overlay_is_noop() {
        let mut view = configured();
        assert!(!view.remove_overlay(OverlayHandle(77)));
        assert!(matches!(
            view.move_marker(OverlayHandle(77), 0.1, 0.1),
            Err(MapError::UnknownOverlay(_))
        ));
    }

    #[test]
    fn test_handle_input() {
        let mut view = configured();
        view.set_scale(0.5);
        let centre = Point::new(400.0, 300.0);

        assert!(view.handle_input(InputEvent::DoubleTap { position: centre }).is_handled());
        assert_eq!(view.scale(), 1.0);

        assert!(view
            .handle_input(InputEvent::Zoom {
                factor: 10.0,
                focus: centre
            })
            .is_handled());
        assert_eq!(view.scale(), 3.0);

        let pan = view.pan_offset();
        view.handle_input(InputEvent::Drag {
            delta: Point::new(10.0, 0.0),
        });
        assert_eq!(view.pan_offset(), Point::new(pan.x - 10.0, pan.y));

        view.handle_input(InputEvent::Resize {
            size: Point::new(1024.0, 768.0),
        });
        assert_eq!(view.viewport().size(), Point::new(1024.0, 768.0));

        assert!(!view
            .handle_input(InputEvent::Zoom {
                factor: f64::NAN,
                focus: centre
            })
            .is_handled());
    }

    #[test]
    fn test_transform_listeners_fire() {
        let mut view = configured();
        let scales = Rc::new(RefCell::new(Vec::new()));
        let seen = scales.clone();
        view.add_transform_listener(move |ctx: &ViewContext| {
            seen.borrow_mut().push(ctx.viewport.scale())
        });

        view.set_scale(0.25);
        view.set_scale(0.25);
        assert_eq!(*scales.borrow(), vec![0.25]);
    }

    #[test]
    fn test_render_draws_tiles_then_overlays() {
        let mut view = configured();
        view.add_marker(MarkerOptions::new(0.5, 0.5)).unwrap();
        assert!(view.process_tile_results());

        let mut ctx = RenderContext::new(800.0, 600.0);
        view.render(&mut ctx);
        let commands = ctx.commands();
        assert_eq!(commands.len(), 2);
        assert!(matches!(commands[0], crate::DrawCommand::Tile { .. }));
        assert!(matches!(commands[1], crate::DrawCommand::Overlay { .. }));
        assert!(!view.needs_repaint());
    }

    #[test]
    fn test_reconfigure_keeps_overlays() {
        let mut view = configured();
        let marker = view.add_marker(MarkerOptions::new(0.5, 0.5)).unwrap();

        let config = MapViewConfiguration::new(3, 1024, 1024, 256)
            .set_minimum_scale_mode(MinimumScaleMode::None);
        view.configure(config, |_: u32, _: u32, _: u32| Some(1)).unwrap();

        assert!(view.overlay(marker).is_some());
        assert_eq!(view.scale(), 0.25);
        assert_eq!(view.tile_level(), Some(0));

        // Results from the first configuration never land
        view.process_tile_results();
        let tile = view.tile_state(&TileAddress::new(0, 0, 0)).unwrap();
        assert_eq!(tile.bitmap().map(|b| **b), Some(1));
    }

    #[test]
    fn test_invalidate_tiles_refetches_pending() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = Arc::clone(&calls);
        let mut view: MapView<u32> =
            MapView::new(800.0, 600.0).with_executor(FetchExecutor::inline());
        let config = MapViewConfiguration::new(3, 1024, 1024, 256)
            .set_minimum_scale_mode(MinimumScaleMode::None);
        view.configure(config, move |_: u32, _: u32, _: u32| {
            Some(counter.fetch_add(1, Ordering::SeqCst) + 100)
        })
        .unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        // (0, 0, 0) is still pending: its first result has not been applied
        view.invalidate_tiles();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        view.process_tile_results();
        let tile = view.tile_state(&TileAddress::new(0, 0, 0)).unwrap();
        assert_eq!(tile.bitmap().map(|b| **b), Some(101));
    }

    fn pool_size(view: &MapView<u32>) -> Option<usize> {
        match view.fetch_executor()? {
            FetchExecutor::ThreadPool(pool) => Some(pool.workers()),
            _ => None,
        }
    }

    fn with_workers(worker_count: usize) -> MapViewConfiguration {
        demo_config().with_tile_loading(TileLoadingConfig {
            worker_count,
            ..TileLoadingConfig::default()
        })
    }

    #[test]
    fn test_reconfigure_rebuilds_derived_executor() {
        let mut view: MapView<u32> = MapView::new(800.0, 600.0);
        view.configure(with_workers(1), |_: u32, _: u32, _: u32| Some(0))
            .unwrap();
        assert_eq!(pool_size(&view), Some(1));

        view.configure(with_workers(3), |_: u32, _: u32, _: u32| Some(0))
            .unwrap();
        assert_eq!(pool_size(&view), Some(3));
    }

    #[test]
    fn test_reconfigure_keeps_injected_executor() {
        let mut view = configured();
        view.configure(with_workers(3), |_: u32, _: u32, _: u32| Some(0))
            .unwrap();
        assert!(matches!(view.fetch_executor(), Some(FetchExecutor::Inline)));
    }
}
