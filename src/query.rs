//! Keyed request cache.
//!
//! Each key maps to the latest known [`QueryState`] of one remote
//! resource. Fetches run on worker threads and report back over a channel;
//! the owner drains it with [`QueryCache::poll`] once per frame. Every
//! delivery fires the `notify` observer so the UI knows to repaint.

use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::thread;

use tracing::{debug, warn};

use crate::hn_client::FetchError;

#[derive(Debug, Clone, PartialEq)]
pub enum QueryState<T> {
    Loading,
    Error(String),
    Loaded(T),
}

pub type Fetcher<K, T> = Arc<dyn Fn(&K) -> Result<T, FetchError> + Send + Sync>;
pub type Notify = Arc<dyn Fn() + Send + Sync>;

struct Entry<T> {
    state: QueryState<T>,
    fetching: bool,
}

struct Delivery<K, T> {
    generation: u64,
    key: K,
    result: Result<T, FetchError>,
}

pub struct QueryCache<K, T> {
    name: &'static str,
    entries: HashMap<K, Entry<T>>,
    fetcher: Fetcher<K, T>,
    notify: Notify,
    // Bumped by invalidate_all; deliveries from older generations are dropped.
    generation: u64,
    tx: Sender<Delivery<K, T>>,
    rx: Receiver<Delivery<K, T>>,
}

impl<K, T> QueryCache<K, T>
where
    K: Clone + Eq + Hash + Debug + Send + 'static,
    T: Send + 'static,
{
    pub fn new(name: &'static str, fetcher: Fetcher<K, T>, notify: Notify) -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            name,
            entries: HashMap::new(),
            fetcher,
            notify,
            generation: 0,
            tx,
            rx,
        }
    }

    /// State for `key`, starting a fetch the first time the key is seen.
    pub fn query(&mut self, key: &K) -> &QueryState<T> {
        if !self.entries.contains_key(key) {
            self.start(key.clone());
        }
        &self.entries[key].state
    }

    #[cfg(test)]
    pub fn get(&self, key: &K) -> Option<&QueryState<T>> {
        self.entries.get(key).map(|entry| &entry.state)
    }

    pub fn is_fetching(&self, key: &K) -> bool {
        self.entries.get(key).is_some_and(|entry| entry.fetching)
    }

    /// Request `key` again even if it is cached. Loaded data stays visible
    /// until the new result lands. Returns false when a fetch for the key
    /// is already in flight.
    pub fn refetch(&mut self, key: &K) -> bool {
        if self.is_fetching(key) {
            return false;
        }
        self.start(key.clone());
        true
    }

    /// Data of every entry that has finished loading.
    pub fn loaded(&self) -> impl Iterator<Item = &T> {
        self.entries.values().filter_map(|entry| match &entry.state {
            QueryState::Loaded(data) => Some(data),
            _ => None,
        })
    }

    /// Drop entries whose key fails `keep`. A fetch still running for a
    /// dropped key is ignored when it lands.
    pub fn retain(&mut self, mut keep: impl FnMut(&K) -> bool) -> usize {
        let before = self.entries.len();
        self.entries.retain(|key, _| keep(key));
        let dropped = before - self.entries.len();
        if dropped > 0 {
            debug!(cache = self.name, dropped, "pruned");
        }
        dropped
    }

    /// Forget every entry. Results still in flight are discarded on arrival.
    pub fn invalidate_all(&mut self) {
        self.generation += 1;
        self.entries.clear();
        debug!(cache = self.name, generation = self.generation, "invalidated");
    }

    /// Fold finished fetches into the map. Returns how many were applied.
    pub fn poll(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(delivery) = self.rx.try_recv() {
            if self.apply(delivery) {
                applied += 1;
            }
        }
        applied
    }

    fn apply(&mut self, delivery: Delivery<K, T>) -> bool {
        if delivery.generation != self.generation {
            debug!(cache = self.name, key = ?delivery.key, "dropping result from an older generation");
            return false;
        }
        let Some(entry) = self.entries.get_mut(&delivery.key) else {
            return false;
        };

        entry.fetching = false;
        entry.state = match delivery.result {
            Ok(data) => {
                debug!(cache = self.name, key = ?delivery.key, "loaded");
                QueryState::Loaded(data)
            }
            Err(err) => {
                warn!(cache = self.name, key = ?delivery.key, error = %err, "fetch failed");
                QueryState::Error(err.to_string())
            }
        };
        true
    }

    fn start(&mut self, key: K) {
        let entry = self.entries.entry(key.clone()).or_insert(Entry {
            state: QueryState::Loading,
            fetching: false,
        });
        if matches!(entry.state, QueryState::Error(_)) {
            entry.state = QueryState::Loading;
        }
        entry.fetching = true;

        debug!(cache = self.name, key = ?key, "fetching");

        let fetcher = self.fetcher.clone();
        let notify = self.notify.clone();
        let tx = self.tx.clone();
        let generation = self.generation;
        thread::spawn(move || {
            let result = fetcher(&key);
            // The receiver is gone once the cache is dropped.
            if tx.send(Delivery { generation, key, result }).is_ok() {
                notify();
            }
        });
    }

    #[cfg(test)]
    pub fn is_busy(&self) -> bool {
        self.entries.values().any(|entry| entry.fetching)
    }

    /// Block until nothing is in flight, applying results as they arrive.
    #[cfg(test)]
    pub fn wait_idle(&mut self, timeout: std::time::Duration) {
        self.wait_until(timeout, |cache| cache.entries.values().any(|entry| entry.fetching));
    }

    /// Like [`wait_idle`](Self::wait_idle) but only for one key.
    #[cfg(test)]
    pub fn wait_idle_for(&mut self, key: &K) {
        let key = key.clone();
        self.wait_until(std::time::Duration::from_secs(5), move |cache| cache.is_fetching(&key));
    }

    #[cfg(test)]
    fn wait_until(&mut self, timeout: std::time::Duration, busy: impl Fn(&Self) -> bool) {
        let deadline = std::time::Instant::now() + timeout;
        while busy(self) {
            let remaining = deadline.saturating_duration_since(std::time::Instant::now());
            match self.rx.recv_timeout(remaining) {
                Ok(delivery) => {
                    self.apply(delivery);
                }
                Err(_) => panic!("{} cache still fetching after {:?}", self.name, timeout),
            }
        }
    }
}
