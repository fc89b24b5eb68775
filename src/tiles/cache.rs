use crate::prelude::{Arc, HashMap};
use crate::tiles::provider::TileError;
use crate::tiles::types::{TileAddress, TileState};

#[derive(Debug)]
struct CachedTile<B> {
    state: TileState<B>,
    /// Generation in which the tile was last part of the visible set
    last_visible: u64,
}

/// Per-address tile state with generation based retention.
///
/// Each transform update opens a new generation. Tiles in the visible set are
/// touched; anything untouched for more than the retention window is released
/// on [`TileCache::evict`], except tiles still waiting on their fetch.
#[derive(Debug)]
pub struct TileCache<B> {
    entries: HashMap<TileAddress, CachedTile<B>>,
    generation: u64,
}

impl<B> Default for TileCache<B> {
    fn default() -> Self {
        Self::new()
    }
}

impl<B> TileCache<B> {
    pub fn new() -> Self {
        Self {
            entries: HashMap::default(),
            generation: 0,
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Opens a new generation; call once per transform update
    pub fn begin_generation(&mut self) -> u64 {
        self.generation += 1;
        self.generation
    }

    /// `None` means the address is absent
    pub fn state(&self, address: &TileAddress) -> Option<&TileState<B>> {
        self.entries.get(address).map(|entry| &entry.state)
    }

    pub fn bitmap(&self, address: &TileAddress) -> Option<&Arc<B>> {
        self.state(address).and_then(TileState::bitmap)
    }

    pub fn contains(&self, address: &TileAddress) -> bool {
        self.entries.contains_key(address)
    }

    /// Marks the tile as part of the current visible set
    pub fn touch(&mut self, address: &TileAddress) {
        if let Some(entry) = self.entries.get_mut(address) {
            entry.last_visible = self.generation;
        }
    }

    /// Moves an absent tile to `Pending` and returns `true`; any other state
    /// is left alone (but touched) and `false` is returned.
    pub fn mark_pending(&mut self, address: TileAddress) -> bool {
        let generation = self.generation;
        match self.entries.get_mut(&address) {
            Some(entry) => {
                entry.last_visible = generation;
                false
            }
            None => {
                self.entries.insert(
                    address,
                    CachedTile {
                        state: TileState::Pending,
                        last_visible: generation,
                    },
                );
                true
            }
        }
    }

    /// Applies a fetch outcome to a pending tile. Outcomes for tiles that are
    /// no longer pending (invalidated meanwhile) are ignored. Returns whether
    /// the state changed.
    pub fn resolve(&mut self, address: TileAddress, outcome: Result<B, TileError>) -> bool {
        let Some(entry) = self.entries.get_mut(&address) else {
            return false;
        };
        if !entry.state.is_pending() {
            return false;
        }
        entry.state = match outcome {
            Ok(bitmap) => TileState::Resolved(Arc::new(bitmap)),
            Err(_) => TileState::Failed,
        };
        true
    }

    /// Returns the tile to the absent state so it is fetched again when next
    /// visible
    pub fn invalidate(&mut self, address: &TileAddress) -> bool {
        self.entries.remove(address).is_some()
    }

    pub fn invalidate_all(&mut self) {
        self.entries.clear();
    }

    /// Drops every entry and restarts the generation count
    pub fn clear(&mut self) {
        self.entries.clear();
        self.generation = 0;
    }

    /// Releases resolved and failed tiles that have not been visible for more
    /// than `retention` generations. Returns how many were released.
    pub fn evict(&mut self, retention: u32) -> usize {
        let generation = self.generation;
        let before = self.entries.len();
        self.entries.retain(|_, entry| {
            entry.state.is_pending()
                || generation.saturating_sub(entry.last_visible) <= retention as u64
        });
        before - self.entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// `(pending, resolved, failed)`
    pub fn counts(&self) -> (usize, usize, usize) {
        self.entries
            .values()
            .fold((0, 0, 0), |(p, r, f), entry| match entry.state {
                TileState::Pending => (p + 1, r, f),
                TileState::Resolved(_) => (p, r + 1, f),
                TileState::Failed => (p, r, f + 1),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_creation() {
        let cache: TileCache<u8> = TileCache::new();
        assert_eq!(cache.len(), 0);
        assert!(cache.is_empty());
        assert_eq!(cache.generation(), 0);
    }

    #[test]
    fn test_state_machine() {
        let mut cache = TileCache::new();
        let address = TileAddress::new(0, 0, 0);

        assert!(cache.state(&address).is_none());
        assert!(cache.mark_pending(address));
        assert!(!cache.mark_pending(address));
        assert!(cache.state(&address).unwrap().is_pending());

        assert!(cache.resolve(address, Ok(7u8)));
        assert_eq!(cache.bitmap(&address).map(|b| **b), Some(7));

        // Resolved tiles do not take a second outcome
        assert!(!cache.resolve(address, Err(TileError::Unavailable)));
        assert!(cache.state(&address).unwrap().is_resolved());
    }

    #[test]
    fn test_failed_is_terminal_until_invalidated() {
        let mut cache: TileCache<u8> = TileCache::new();
        let address = TileAddress::new(1, 1, 2);

        cache.mark_pending(address);
        cache.resolve(address, Err(TileError::Unavailable));
        assert!(cache.state(&address).unwrap().is_failed());
        assert!(!cache.mark_pending(address));

        assert!(cache.invalidate(&address));
        assert!(cache.mark_pending(address));
    }

    #[test]
    fn test_outcome_after_invalidate_is_ignored() {
        let mut cache = TileCache::new();
        let address = TileAddress::new(0, 0, 0);
        cache.mark_pending(address);
        cache.invalidate(&address);
        assert!(!cache.resolve(address, Ok(1u8)));
        assert!(cache.is_empty());
    }

    #[test]
    fn test_eviction_respects_retention() {
        let mut cache = TileCache::new();
        let visible = TileAddress::new(0, 0, 0);
        let stale = TileAddress::new(0, 1, 0);
        let waiting = TileAddress::new(0, 2, 0);

        cache.begin_generation();
        for address in [visible, stale, waiting] {
            cache.mark_pending(address);
        }
        cache.resolve(visible, Ok(1u8));
        cache.resolve(stale, Ok(2u8));

        for _ in 0..2 {
            cache.begin_generation();
            cache.touch(&visible);
            assert_eq!(cache.evict(2), 0);
        }

        cache.begin_generation();
        cache.touch(&visible);
        assert_eq!(cache.evict(2), 1);
        assert!(cache.contains(&visible));
        assert!(!cache.contains(&stale));
        // Pending tiles outlive the retention window
        assert!(cache.contains(&waiting));
        assert_eq!(cache.counts(), (1, 1, 0));
    }

    #[test]
    fn test_clear() {
        let mut cache = TileCache::new();
        cache.begin_generation();
        cache.mark_pending(TileAddress::new(0, 0, 0));
        cache.resolve(TileAddress::new(0, 0, 0), Ok(0u8));
        cache.clear();
        assert!(cache.is_empty());
        assert_eq!(cache.generation(), 0);
    }
}
