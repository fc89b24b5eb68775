use crossbeam_channel::{unbounded, Receiver, Sender};

use crate::prelude::{Arc, HashMap};
use crate::runtime::FetchExecutor;
use crate::tiles::provider::{fetch_guarded, TileError, TileProvider};
use crate::tiles::types::TileAddress;

/// Outcome of one fetch, carried back to the owning context
#[derive(Debug)]
pub struct TileResult<B> {
    pub address: TileAddress,
    /// Loader epoch the fetch was issued under
    pub epoch: u64,
    /// Identifies the request; a result whose ticket is no longer the one
    /// outstanding for its address was disowned
    pub ticket: u64,
    pub outcome: Result<B, TileError>,
}

/// Issues fetches on the executor and collects their results.
///
/// At most one fetch per address is owned at a time. Results are only
/// ever observed through [`TileLoader::try_recv_results`], which the owner
/// calls from its own thread, so cache state is never touched concurrently.
pub struct TileLoader<B> {
    executor: FetchExecutor,
    result_tx: Sender<TileResult<B>>,
    result_rx: Receiver<TileResult<B>>,
    in_flight: HashMap<TileAddress, u64>,
    next_ticket: u64,
    epoch: u64,
}

impl<B: Send + 'static> TileLoader<B> {
    pub fn new(executor: FetchExecutor) -> Self {
        let (result_tx, result_rx) = unbounded();
        Self {
            executor,
            result_tx,
            result_rx,
            in_flight: HashMap::default(),
            next_ticket: 0,
            epoch: 0,
        }
    }

    /// Starts a fetch unless one is already outstanding for `address`.
    /// Returns whether a fetch was issued.
    pub fn request(&mut self, provider: &Arc<dyn TileProvider<B>>, address: TileAddress) -> bool {
        if self.in_flight.contains_key(&address) {
            return false;
        }
        self.next_ticket += 1;
        let ticket = self.next_ticket;
        self.in_flight.insert(address, ticket);

        log::debug!("fetching tile {}", address);
        let provider = Arc::clone(provider);
        let result_tx = self.result_tx.clone();
        let epoch = self.epoch;
        self.executor.execute(Box::new(move || {
            let outcome = fetch_guarded(provider.as_ref(), address);
            // The loader may have been dropped in the meantime
            let _ = result_tx.send(TileResult {
                address,
                epoch,
                ticket,
                outcome,
            });
        }));
        true
    }

    /// Drains completed fetches. Results issued before the last
    /// [`TileLoader::reset`], or for requests dropped with
    /// [`TileLoader::forget`], are discarded.
    pub fn try_recv_results(&mut self) -> Vec<TileResult<B>> {
        let mut results = Vec::new();
        while let Ok(result) = self.result_rx.try_recv() {
            let current = self.in_flight.get(&result.address) == Some(&result.ticket);
            if result.epoch != self.epoch || !current {
                log::trace!("dropping stale result for tile {}", result.address);
                continue;
            }
            self.in_flight.remove(&result.address);
            results.push(result);
        }
        results
    }

    /// Forgets every outstanding fetch. Their results will be dropped when
    /// they arrive.
    pub fn reset(&mut self) {
        self.epoch += 1;
        self.in_flight.clear();
    }

    /// Disowns the outstanding fetch for `address`, if any, so the address
    /// can be requested again right away
    pub fn forget(&mut self, address: &TileAddress) -> bool {
        self.in_flight.remove(address).is_some()
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn pending_count(&self) -> usize {
        self.in_flight.len()
    }

    pub fn is_in_flight(&self, address: &TileAddress) -> bool {
        self.in_flight.contains_key(address)
    }

    pub fn executor(&self) -> &FetchExecutor {
        &self.executor
    }

    /// Runs future fetches on `executor`. Fetches already started finish
    /// where they are.
    pub fn set_executor(&mut self, executor: FetchExecutor) {
        self.executor = executor;
    }
}
