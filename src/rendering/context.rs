use crate::core::bounds::Bounds;
use crate::core::geo::Point;
use crate::overlay::types::OverlayHandle;
use crate::prelude::Arc;
use crate::tiles::types::TileAddress;

/// Commands that can be issued to the render context
pub enum DrawCommand<B> {
    /// A resolved tile, stretched to `dest` in screen pixels
    Tile {
        address: TileAddress,
        bitmap: Arc<B>,
        dest: Bounds,
    },
    /// Stand-in for a tile that is not resolved yet (or failed)
    Placeholder {
        address: TileAddress,
        bitmap: Arc<B>,
        dest: Bounds,
    },
    /// An overlay's screen rectangle; the host owns the overlay's look
    Overlay {
        handle: OverlayHandle,
        is_callout: bool,
        dest: Bounds,
        opacity: f32,
        scale: f32,
    },
}

impl<B> DrawCommand<B> {
    pub fn dest(&self) -> &Bounds {
        match self {
            DrawCommand::Tile { dest, .. }
            | DrawCommand::Placeholder { dest, .. }
            | DrawCommand::Overlay { dest, .. } => dest,
        }
    }
}

impl<B> Clone for DrawCommand<B> {
    fn clone(&self) -> Self {
        match self {
            DrawCommand::Tile { address, bitmap, dest } => DrawCommand::Tile {
                address: *address,
                bitmap: Arc::clone(bitmap),
                dest: *dest,
            },
            DrawCommand::Placeholder { address, bitmap, dest } => DrawCommand::Placeholder {
                address: *address,
                bitmap: Arc::clone(bitmap),
                dest: *dest,
            },
            DrawCommand::Overlay {
                handle,
                is_callout,
                dest,
                opacity,
                scale,
            } => DrawCommand::Overlay {
                handle: *handle,
                is_callout: *is_callout,
                dest: *dest,
                opacity: *opacity,
                scale: *scale,
            },
        }
    }
}

impl<B> std::fmt::Debug for DrawCommand<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DrawCommand::Tile { address, dest, .. } => {
                f.debug_struct("Tile").field("address", address).field("dest", dest).finish()
            }
            DrawCommand::Placeholder { address, dest, .. } => f
                .debug_struct("Placeholder")
                .field("address", address)
                .field("dest", dest)
                .finish(),
            DrawCommand::Overlay {
                handle,
                is_callout,
                dest,
                opacity,
                scale,
            } => f
                .debug_struct("Overlay")
                .field("handle", handle)
                .field("is_callout", is_callout)
                .field("dest", dest)
                .field("opacity", opacity)
                .field("scale", scale)
                .finish(),
        }
    }
}

/// Draw list for one frame. The view fills it, the host replays it in order
/// (tiles first, then overlays in insertion order).
pub struct RenderContext<B> {
    pub width: f64,
    pub height: f64,
    drawing_queue: Vec<DrawCommand<B>>,
    /// Commands entirely outside these screen bounds are dropped
    clip_bounds: Option<Bounds>,
}

impl<B> RenderContext<B> {
    /// Create a render context for a screen of the given size
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            drawing_queue: Vec::new(),
            clip_bounds: None,
        }
    }

    /// Clears the queue and clips to the screen
    pub fn begin_frame(&mut self) {
        self.drawing_queue.clear();
        self.clip_bounds = Some(Bounds::from_origin_and_size(
            Point::default(),
            self.width,
            self.height,
        ));
    }

    pub fn set_clip_bounds(&mut self, clip: Bounds) {
        self.clip_bounds = Some(clip);
    }

    pub fn clear_clip_bounds(&mut self) {
        self.clip_bounds = None;
    }

    /// Queues a command unless it is completely clipped. Returns whether it
    /// was queued.
    pub fn push(&mut self, command: DrawCommand<B>) -> bool {
        if let Some(clip) = &self.clip_bounds {
            if !clip.intersects(command.dest()) {
                return false;
            }
        }
        self.drawing_queue.push(command);
        true
    }

    pub fn commands(&self) -> &[DrawCommand<B>] {
        &self.drawing_queue
    }

    pub fn len(&self) -> usize {
        self.drawing_queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.drawing_queue.is_empty()
    }

    pub fn clear(&mut self) {
        self.drawing_queue.clear();
    }

    /// Tile commands (resolved tiles only) in paint order
    pub fn tiles(&self) -> impl Iterator<Item = (&TileAddress, &Bounds)> {
        self.drawing_queue.iter().filter_map(|command| match command {
            DrawCommand::Tile { address, dest, .. } => Some((address, dest)),
            _ => None,
        })
    }

    /// Overlay commands in paint order
    pub fn overlays(&self) -> impl Iterator<Item = (&OverlayHandle, &Bounds)> {
        self.drawing_queue.iter().filter_map(|command| match command {
            DrawCommand::Overlay { handle, dest, .. } => Some((handle, dest)),
            _ => None,
        })
    }

    pub fn into_commands(self) -> Vec<DrawCommand<B>> {
        self.drawing_queue
    }
}
