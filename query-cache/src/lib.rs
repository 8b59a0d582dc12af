//! Client side memoization of remote reads.
//!
//! A [`QueryClient`] caches the result of each read under a [`QueryKey`].
//! Mutations do not touch cached data directly; callers invalidate the keys a
//! mutation affects and the next read goes back to the server.

mod key;

use std::{
    any::Any,
    collections::HashMap,
    future::Future,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

pub use key::QueryKey;
use web_time::{Duration, Instant};

struct Entry {
    data: Option<Arc<dyn Any + Send + Sync>>,
    updated_at: Option<Instant>,
    invalidated: bool,
    /// Bumped by every invalidation or direct write, a fetch only commits
    /// its result if the generation it started with is still current
    generation: u64,
}

impl Entry {
    fn empty() -> Self {
        Self {
            data: None,
            updated_at: None,
            invalidated: true,
            generation: 0,
        }
    }

    fn is_fresh(&self, stale_time: Option<Duration>) -> bool {
        if self.invalidated || self.data.is_none() {
            return false;
        }
        match (stale_time, self.updated_at) {
            (Some(stale_time), Some(updated_at)) => updated_at.elapsed() < stale_time,
            (Some(_), None) => false,
            (None, _) => true,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum QueryStatus {
    /// cached and served without a request
    Fresh,
    /// cached data exists but the next read refetches
    Stale,
}

#[derive(Default)]
struct CacheState {
    entries: HashMap<QueryKey, Entry>,
}

/// Shared cache, clones refer to the same entries
#[derive(Clone, Default)]
pub struct QueryClient {
    state: Arc<Mutex<CacheState>>,
    stale_time: Option<Duration>,
}

impl QueryClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Entries older than `stale_time` are refetched on the next read.
    /// Without one, entries stay fresh until invalidated.
    pub fn with_stale_time(stale_time: Duration) -> Self {
        Self {
            state: Arc::default(),
            stale_time: Some(stale_time),
        }
    }

    fn state(&self) -> MutexGuard<'_, CacheState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns the cached value for `key` or runs `fetcher` and caches its result.
    ///
    /// Errors are passed through and never cached.
    pub async fn fetch_query<T, E, F, Fut>(&self, key: &QueryKey, fetcher: F) -> Result<T, E>
    where
        T: Clone + Send + Sync + 'static,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let generation = {
            let mut state = self.state();
            let entry = state.entries.entry(key.clone()).or_insert_with(Entry::empty);
            if entry.is_fresh(self.stale_time) {
                if let Some(data) = entry.data.as_ref().and_then(|d| d.downcast_ref::<T>()) {
                    return Ok(data.clone());
                }
            }
            entry.generation
        };

        log::debug!("fetching query {key}");
        let value = fetcher().await?;

        let mut state = self.state();
        let entry = state.entries.entry(key.clone()).or_insert_with(Entry::empty);
        if entry.generation == generation {
            entry.data = Some(Arc::new(value.clone()));
            entry.updated_at = Some(Instant::now());
            entry.invalidated = false;
        } else {
            log::debug!("query {key} was invalidated while fetching, result not cached");
        }

        Ok(value)
    }

    /// Last cached value for `key`, fresh or not
    pub fn get_query_data<T: Clone + 'static>(&self, key: &QueryKey) -> Option<T> {
        self.state()
            .entries
            .get(key)
            .and_then(|entry| entry.data.as_ref())
            .and_then(|data| data.downcast_ref::<T>())
            .cloned()
    }

    /// Writes `value` as the fresh value of `key`, superseding in-flight fetches
    pub fn set_query_data<T: Send + Sync + 'static>(&self, key: &QueryKey, value: T) {
        let mut state = self.state();
        let entry = state.entries.entry(key.clone()).or_insert_with(Entry::empty);
        entry.data = Some(Arc::new(value));
        entry.updated_at = Some(Instant::now());
        entry.invalidated = false;
        entry.generation += 1;
    }

    pub fn query_status(&self, key: &QueryKey) -> Option<QueryStatus> {
        let state = self.state();
        let entry = state.entries.get(key)?;
        entry.data.as_ref()?;
        if entry.is_fresh(self.stale_time) {
            Some(QueryStatus::Fresh)
        } else {
            Some(QueryStatus::Stale)
        }
    }

    /// Marks matching entries stale. With `exact` only `key` itself matches,
    /// otherwise every key that starts with `key`. Returns how many matched.
    pub fn invalidate_queries(&self, key: &QueryKey, exact: bool) -> usize {
        let mut state = self.state();
        let mut matched = 0;
        for (k, entry) in state.entries.iter_mut() {
            if matches(k, key, exact) {
                entry.invalidated = true;
                entry.generation += 1;
                matched += 1;
            }
        }
        log::debug!("invalidated {matched} queries matching {key}");
        matched
    }

    /// Drops matching entries entirely
    pub fn remove_queries(&self, key: &QueryKey, exact: bool) -> usize {
        let mut state = self.state();
        let before = state.entries.len();
        state.entries.retain(|k, _| !matches(k, key, exact));
        before - state.entries.len()
    }

    /// Runs a mutation and, once it succeeded, invalidates `keys` exactly
    pub async fn mutate<T, E, Fut>(&self, mutation: Fut, keys: &[QueryKey]) -> Result<T, E>
    where
        Fut: Future<Output = Result<T, E>>,
    {
        let res = mutation.await?;
        for key in keys {
            self.invalidate_queries(key, true);
        }
        Ok(res)
    }
}

fn matches(candidate: &QueryKey, filter: &QueryKey, exact: bool) -> bool {
    if exact {
        candidate == filter
    } else {
        candidate.starts_with(filter)
    }
}
