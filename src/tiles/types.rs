//! Core data types for tile acquisition

use crate::prelude::Arc;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifies one tile of the pyramid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TileAddress {
    pub row: u32,
    pub col: u32,
    pub level: u32,
}

impl TileAddress {
    pub fn new(row: u32, col: u32, level: u32) -> Self {
        Self { row, col, level }
    }
}

impl fmt::Display for TileAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.level, self.row, self.col)
    }
}

/// State of a cached tile. An address with no cache entry is `Absent`.
pub enum TileState<B> {
    /// A fetch is outstanding
    Pending,
    /// The provider returned a bitmap
    Resolved(Arc<B>),
    /// The provider returned nothing or failed; terminal until invalidated
    Failed,
}

impl<B> TileState<B> {
    pub fn is_pending(&self) -> bool {
        matches!(self, TileState::Pending)
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, TileState::Resolved(_))
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, TileState::Failed)
    }

    pub fn bitmap(&self) -> Option<&Arc<B>> {
        match self {
            TileState::Resolved(bitmap) => Some(bitmap),
            _ => None,
        }
    }
}

impl<B> Clone for TileState<B> {
    fn clone(&self) -> Self {
        match self {
            TileState::Pending => TileState::Pending,
            TileState::Resolved(bitmap) => TileState::Resolved(Arc::clone(bitmap)),
            TileState::Failed => TileState::Failed,
        }
    }
}

impl<B> fmt::Debug for TileState<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TileState::Pending => f.write_str("Pending"),
            TileState::Resolved(_) => f.write_str("Resolved(..)"),
            TileState::Failed => f.write_str("Failed"),
        }
    }
}
