use crate::core::bounds::Bounds;
use crate::core::content::ContentSpace;
use crate::core::viewport::{ViewContext, Viewport};
use crate::prelude::{Arc, HashSet};
use crate::rendering::context::{DrawCommand, RenderContext};
use crate::runtime::FetchExecutor;
use crate::tiles::cache::TileCache;
use crate::tiles::loader::TileLoader;
use crate::tiles::provider::TileProvider;
use crate::tiles::pyramid::TilePyramid;
use crate::tiles::types::{TileAddress, TileState};
use crate::traits::ViewportAware;

/// Keeps the visible tile set in sync with the viewport and paints whatever
/// has arrived.
///
/// A tile that never resolves only leaves its own gap: the others are
/// fetched, stored and painted independently.
pub struct TileCompositor<B> {
    pyramid: TilePyramid,
    space: ContentSpace,
    provider: Arc<dyn TileProvider<B>>,
    cache: TileCache<B>,
    loader: TileLoader<B>,
    level: u32,
    visible: Vec<TileAddress>,
    visible_set: HashSet<TileAddress>,
    retention: u32,
    placeholder: Option<Arc<B>>,
}

impl<B: Send + Sync + 'static> TileCompositor<B> {
    pub fn new(
        pyramid: TilePyramid,
        space: ContentSpace,
        provider: Arc<dyn TileProvider<B>>,
        executor: FetchExecutor,
        retention: u32,
    ) -> Self {
        Self {
            pyramid,
            space,
            provider,
            cache: TileCache::new(),
            loader: TileLoader::new(executor),
            level: 0,
            visible: Vec::new(),
            visible_set: HashSet::default(),
            retention,
            placeholder: None,
        }
    }

    /// Swaps in a new pyramid and provider. All tile state is dropped and
    /// fetches still in flight are disowned.
    pub fn reconfigure(
        &mut self,
        pyramid: TilePyramid,
        space: ContentSpace,
        provider: Arc<dyn TileProvider<B>>,
        retention: u32,
    ) {
        self.pyramid = pyramid;
        self.space = space;
        self.provider = provider;
        self.retention = retention;
        self.cache.clear();
        self.loader.reset();
        self.visible.clear();
        self.visible_set.clear();
        self.level = 0;
    }

    /// Recomputes the visible set for `viewport`, requests tiles entering it
    /// and releases tiles out of view for longer than the retention window.
    /// Returns the number of fetches issued.
    pub fn update(&mut self, viewport: &Viewport) -> usize {
        self.cache.begin_generation();
        let (level, visible) = self.pyramid.visible_tiles_for(viewport);

        let mut issued = 0;
        for address in &visible {
            if self.cache.mark_pending(*address) && self.loader.request(&self.provider, *address) {
                issued += 1;
            }
        }

        let evicted = self.cache.evict(self.retention);
        if evicted > 0 {
            log::trace!("released {} tiles", evicted);
        }

        self.visible_set = visible.iter().copied().collect();
        self.visible = visible;
        self.level = level;
        issued
    }

    /// Applies completed fetches. Returns whether any of them is visible and
    /// the view should be repainted.
    pub fn process_results(&mut self) -> bool {
        let mut repaint = false;
        for result in self.loader.try_recv_results() {
            if let Err(e) = &result.outcome {
                log::warn!("tile {} unavailable: {}", result.address, e);
            }
            let stored = self.cache.resolve(result.address, result.outcome);
            if stored && self.visible_set.contains(&result.address) {
                repaint = true;
            }
        }
        repaint
    }

    /// Screen rectangle of a tile under `viewport`
    pub fn tile_screen_rect(&self, address: TileAddress, viewport: &Viewport) -> Bounds {
        let rect = self.pyramid.tile_content_rect(address);
        Bounds::new(
            self.space.to_screen(rect.min, viewport),
            self.space.to_screen(rect.max, viewport),
        )
    }

    /// Queues the visible tiles in row-major order. Tiles that are not
    /// resolved are skipped, or drawn with the placeholder if one is set.
    pub fn paint(&self, viewport: &Viewport, ctx: &mut RenderContext<B>) -> usize {
        let mut painted = 0;
        for address in &self.visible {
            let dest = self.tile_screen_rect(*address, viewport);
            let command = match (self.cache.state(address), &self.placeholder) {
                (Some(TileState::Resolved(bitmap)), _) => DrawCommand::Tile {
                    address: *address,
                    bitmap: Arc::clone(bitmap),
                    dest,
                },
                (_, Some(placeholder)) => DrawCommand::Placeholder {
                    address: *address,
                    bitmap: Arc::clone(placeholder),
                    dest,
                },
                _ => continue,
            };
            if ctx.push(command) {
                painted += 1;
            }
        }
        painted
    }

    /// Forgets one tile. A fetch still running for it is disowned, so the
    /// next update fetches it again.
    pub fn invalidate(&mut self, address: &TileAddress) -> bool {
        let forgotten = self.loader.forget(address);
        self.cache.invalidate(address) || forgotten
    }

    pub fn invalidate_all(&mut self) {
        self.cache.invalidate_all();
        self.loader.reset();
    }

    pub fn set_executor(&mut self, executor: FetchExecutor) {
        self.loader.set_executor(executor);
    }

    pub fn executor(&self) -> &FetchExecutor {
        self.loader.executor()
    }

    pub fn set_placeholder(&mut self, placeholder: Option<Arc<B>>) {
        self.placeholder = placeholder;
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn visible_tiles(&self) -> &[TileAddress] {
        &self.visible
    }

    pub fn state(&self, address: &TileAddress) -> Option<&TileState<B>> {
        self.cache.state(address)
    }

    pub fn cache(&self) -> &TileCache<B> {
        &self.cache
    }

    pub fn pending_fetches(&self) -> usize {
        self.loader.pending_count()
    }

    pub fn pyramid(&self) -> &TilePyramid {
        &self.pyramid
    }
}

impl<B: Send + Sync + 'static> ViewportAware for TileCompositor<B> {
    fn on_viewport_changed(&mut self, context: &ViewContext) {
        self.space = context.space;
        self.update(&context.viewport);
    }
}
