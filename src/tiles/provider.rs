use crate::tiles::types::TileAddress;
use std::panic::{catch_unwind, AssertUnwindSafe};

/// Why a tile could not be produced. Never surfaced to callers of the view:
/// every variant leaves a transparent gap where the tile would be.
#[derive(Debug, thiserror::Error)]
pub enum TileError {
    #[error("tile unavailable")]
    Unavailable,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("decode error: {0}")]
    Decode(String),

    #[error("tile provider panicked")]
    Panicked,
}

/// Anything that can produce a decoded tile bitmap for an address.
///
/// Implementations may block on I/O; they run on the fetch executor, never on
/// the thread that owns the view. `Ok(None)` means the tile does not exist.
pub trait TileProvider<B>: Send + Sync {
    fn fetch(&self, address: TileAddress) -> Result<Option<B>, TileError>;
}

/// Plain closures taking `(row, col, level)` are providers
impl<B, F> TileProvider<B> for F
where
    F: Fn(u32, u32, u32) -> Option<B> + Send + Sync,
{
    fn fetch(&self, address: TileAddress) -> Result<Option<B>, TileError> {
        Ok(self(address.row, address.col, address.level))
    }
}

/// Runs the provider, folding absence and panics into [`TileError`]
pub(crate) fn fetch_guarded<B>(
    provider: &dyn TileProvider<B>,
    address: TileAddress,
) -> Result<B, TileError> {
    match catch_unwind(AssertUnwindSafe(|| provider.fetch(address))) {
        Ok(Ok(Some(bitmap))) => Ok(bitmap),
        Ok(Ok(None)) => Err(TileError::Unavailable),
        Ok(Err(e)) => Err(e),
        Err(_) => Err(TileError::Panicked),
    }
}
