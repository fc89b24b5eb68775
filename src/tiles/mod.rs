//! Tile pyramid addressing and on-demand tile acquisition
//!
//! - [`pyramid`] maps a visible rectangle to tile addresses
//! - [`provider`] is the contract for whatever backs the tiles
//! - [`loader`] runs fetches off the owning context and hands results back
//! - [`cache`] holds the per-address state machine and the retention policy
//! - [`compositor`] ties them together and paints what is available

pub mod cache;
pub mod compositor;
pub mod loader;
pub mod provider;
pub mod pyramid;
#[cfg(feature = "image-provider")]
pub mod source;
pub mod types;

// Re-exports for convenience
pub use cache::TileCache;
pub use compositor::TileCompositor;
pub use loader::{TileLoader, TileResult};
pub use provider::{TileError, TileProvider};
pub use pyramid::TilePyramid;
#[cfg(feature = "image-provider")]
pub use source::DirectoryTileProvider;
pub use types::{TileAddress, TileState};
