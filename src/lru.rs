use crate::config::CacheConfig;
use crate::core::engine::CacheEngine;
use crate::core::entry::{Entry, Value};
use crate::core::error::{Error, Result};
use crate::core::handler::{HandlerResult, Handlers};
use crate::core::key::Key;
use crate::index::KeyIndex;
use crate::list::RecencyList;
use crate::metrics::{Metrics, MetricsSnapshot};
use parking_lot::{Mutex, MutexGuard};
use std::any::Any;
use std::ops::{Deref, DerefMut};
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering::{Acquire, Relaxed, Release};
use std::time::Instant;
use tracing::{debug, trace, warn};

/// Owner value of an unlocked cache. Thread ids start at 1.
const NO_OWNER: usize = 0;

static NEXT_THREAD_ID: AtomicUsize = AtomicUsize::new(1);

thread_local! {
    /// Each thread is assigned a unique id on its first cache call, used to
    /// detect a handler calling back into the cache that is running it.
    static THREAD_ID: usize = NEXT_THREAD_ID.fetch_add(1, Relaxed);
}

#[inline]
fn current_thread_id() -> usize {
    THREAD_ID.with(|id| *id)
}

/// Everything the exclusive lock protects.
///
/// # Invariants
/// - The index and the list hold exactly the same set of keys.
/// - Every handle in the index refers to the node holding that key.
/// - The list front is the most-recently inserted or accessed entry.
struct State<M> {
    index: KeyIndex,
    list: RecencyList,
    metadata: M,
    metrics: Metrics,
}

impl<M> State<M> {
    fn new(metadata: M, config: CacheConfig) -> Self {
        Self {
            index: KeyIndex::with_capacity(config.capacity),
            list: RecencyList::with_capacity(config.capacity),
            metadata,
            metrics: Metrics::new(config.metrics),
        }
    }

    /// Updates an existing key in place, or evicts as requested and links a
    /// new node at the front. The on-insert handler runs after either commit.
    fn insert(&mut self, handlers: &Handlers<M>, entry: Entry) -> Result<()> {
        let id = match self.index.lookup(entry.key()) {
            Some(id) => {
                // Same position, new content: an update is not an access.
                self.list
                    .entry_mut(id)
                    .replace_value(entry.value().clone());
                self.metrics.record_update();
                trace!(key = entry.key(), "entry updated in place");
                id
            }
            None => {
                while handlers.should_evict(&mut self.metadata, &entry) {
                    self.evict_one(handlers, entry.key())?;
                }

                let key = entry.shared_key().clone();
                trace!(key = %key, "entry inserted");

                let id = self.list.push_front(entry);
                self.index.insert(key, id);
                self.metrics.record_insert();
                id
            }
        };

        handlers.inserted(&mut self.metadata, self.list.entry(id))
    }

    fn access(&mut self, handlers: &Handlers<M>, key: &str) -> Result<Option<Value>> {
        let Some(id) = self.index.lookup(key) else {
            self.metrics.record_miss();
            trace!(key, "cache miss");
            return Ok(None);
        };

        self.list.move_to_front(id);
        self.metrics.record_hit();
        trace!(key, "cache hit");

        let entry = self.list.entry(id);
        handlers.accessed(&mut self.metadata, entry)?;

        Ok(Some(entry.value().clone()))
    }

    /// Runs the on-delete handler for `key`, then unlinks it from both
    /// structures. A failing handler leaves the entry in place.
    fn remove(&mut self, handlers: &Handlers<M>, key: &str) -> Result<Option<Entry>> {
        let Some(id) = self.index.lookup(key) else {
            return Ok(None);
        };

        handlers.deleted(&mut self.metadata, self.list.entry(id))?;

        self.index.remove(key);
        Ok(Some(self.list.remove(id)))
    }

    fn evict_one(&mut self, handlers: &Handlers<M>, candidate: &str) -> Result<()> {
        let Some(id) = self.list.back() else {
            warn!(candidate, "eviction requested but the cache is empty");
            return Err(Error::EvictionExhausted {
                key: candidate.to_owned(),
            });
        };

        let victim = self.list.entry(id).shared_key().clone();
        debug!(victim = %victim, candidate, "evicting least recently used entry");

        self.remove(handlers, &victim)?;
        self.metrics.record_eviction();

        Ok(())
    }

    /// Books the outcome of a public operation before the lock is released.
    fn complete<T>(&mut self, started: Instant, result: Result<T>) -> Result<T> {
        if let Err(Error::Handler { hook, key, source }) = &result {
            self.metrics.record_handler_failure();
            warn!(%hook, key = key.as_str(), error = %source, "handler failed");
        }

        debug_assert_eq!(self.index.len(), self.list.len());

        self.metrics.record_latency(started.elapsed());
        result
    }

    #[cfg(test)]
    fn is_consistent(&self) -> bool {
        self.index.len() == self.list.len()
            && self.list.iter().count() == self.list.len()
            && self
                .list
                .iter()
                .all(|(id, entry)| self.index.lookup(entry.key()) == Some(id))
    }
}

/// The locked state, tagged with the id of the thread holding it.
struct Critical<'a, M> {
    guard: MutexGuard<'a, State<M>>,
    owner: &'a AtomicUsize,
}

impl<M> Deref for Critical<'_, M> {
    type Target = State<M>;

    fn deref(&self) -> &State<M> {
        &self.guard
    }
}

impl<M> DerefMut for Critical<'_, M> {
    fn deref_mut(&mut self) -> &mut State<M> {
        &mut self.guard
    }
}

impl<M> Drop for Critical<'_, M> {
    fn drop(&mut self) {
        // Runs before the guard field is dropped, i.e. before unlocking.
        self.owner.store(NO_OWNER, Release);
    }
}

/// Thread-safe LRU cache whose eviction policy is defined by user handlers.
///
/// The cache owns a caller-defined metadata value `M` (entry counts, byte
/// totals, ...). Handlers receive `&mut M` together with the affected
/// [`Entry`] and are the only code that can mutate it.
///
/// # Handlers
/// - `should_evict`: asked before each new key is inserted, with the entry
///   about to be inserted. While it returns `true` the least-recently-used
///   entry is evicted, and it is asked again after every eviction.
/// - `on_insert`: after a new or updated entry is committed.
/// - `on_delete`: before an entry is removed, by delete or eviction. A failure
///   keeps the entry.
/// - `on_access`: after a hit promoted the entry.
///
/// # Locking
/// A single [`parking_lot::Mutex`] guards the index, the list, the metadata
/// and every handler call. Handlers must not call into the same cache; doing
/// so panics instead of deadlocking.
///
/// # Example
/// ```
/// use hooked_lru::{CacheEngine, LruCache};
///
/// struct Count {
///     max: usize,
///     current: usize,
/// }
///
/// let mut cache = LruCache::new(Count { max: 2, current: 0 });
/// cache
///     .should_evict(|count, _| count.current >= count.max)
///     .on_insert(|count, _| {
///         count.current += 1;
///         Ok(())
///     })
///     .on_delete(|count, _| {
///         count.current -= 1;
///         Ok(())
///     });
///
/// cache.create_element("a", 1).unwrap();
/// cache.create_element("b", 2).unwrap();
/// cache.create_element("c", 3).unwrap();
///
/// assert!(!cache.contains("a"));
/// assert_eq!(cache.keys(), ["c", "b"]);
/// ```
pub struct LruCache<M> {
    state: Mutex<State<M>>,
    /// Id of the thread inside the critical section, or `NO_OWNER`.
    owner: AtomicUsize,
    handlers: Handlers<M>,
}

impl<M> LruCache<M> {
    /// Creates an empty cache that takes ownership of `metadata`.
    pub fn new(metadata: M) -> Self {
        Self::with_config(metadata, CacheConfig::default())
    }

    pub fn with_config(metadata: M, config: CacheConfig) -> Self {
        Self {
            state: Mutex::new(State::new(metadata, config)),
            owner: AtomicUsize::new(NO_OWNER),
            handlers: Handlers::default(),
        }
    }

    /// Sets the handler run after an entry is inserted or updated.
    pub fn on_insert<F>(&mut self, handler: F) -> &mut Self
    where
        F: Fn(&mut M, &Entry) -> HandlerResult + Send + Sync + 'static,
    {
        self.handlers.set_on_insert(handler);
        self
    }

    /// Sets the handler run before an entry is deleted or evicted.
    pub fn on_delete<F>(&mut self, handler: F) -> &mut Self
    where
        F: Fn(&mut M, &Entry) -> HandlerResult + Send + Sync + 'static,
    {
        self.handlers.set_on_delete(handler);
        self
    }

    /// Sets the handler run after a lookup hit.
    pub fn on_access<F>(&mut self, handler: F) -> &mut Self
    where
        F: Fn(&mut M, &Entry) -> HandlerResult + Send + Sync + 'static,
    {
        self.handlers.set_on_access(handler);
        self
    }

    /// Sets the predicate deciding whether the least-recently-used entry must
    /// make room for the candidate entry.
    ///
    /// A predicate that ignores what evictions do to the metadata will drain
    /// the cache and fail the insertion with [`Error::EvictionExhausted`].
    pub fn should_evict<F>(&mut self, handler: F) -> &mut Self
    where
        F: Fn(&mut M, &Entry) -> bool + Send + Sync + 'static,
    {
        self.handlers.set_should_evict(handler);
        self
    }

    /// Returns `true` if `key` is cached. Does not affect recency.
    pub fn contains(&self, key: &str) -> bool {
        self.lock().index.lookup(key).is_some()
    }

    /// Keys ordered from most- to least-recently-used.
    pub fn keys(&self) -> Vec<String> {
        self.lock()
            .list
            .iter()
            .map(|(_, entry)| entry.key().to_owned())
            .collect()
    }

    /// Runs `f` with shared access to the metadata, under the cache lock.
    pub fn with_metadata<R>(&self, f: impl FnOnce(&M) -> R) -> R {
        f(&self.lock().metadata)
    }

    /// Consumes the cache and returns its metadata.
    pub fn into_metadata(self) -> M {
        self.state.into_inner().metadata
    }

    /// Enters the critical section.
    ///
    /// # Panics
    /// If the current thread already holds this cache's lock, which can only
    /// happen when a handler calls back into the cache running it.
    fn lock(&self) -> Critical<'_, M> {
        let thread = current_thread_id();

        if self.owner.load(Acquire) == thread {
            panic!("re-entrant call into the cache from one of its own handlers");
        }

        let guard = self.state.lock();
        self.owner.store(thread, Release);

        Critical {
            guard,
            owner: &self.owner,
        }
    }

    #[cfg(test)]
    fn is_consistent(&self) -> bool {
        self.lock().is_consistent()
    }
}

impl<M> CacheEngine for LruCache<M> {
    fn create_element<K, V>(&self, key: K, value: V) -> Result<()>
    where
        K: Into<Key>,
        V: Any + Send + Sync,
    {
        let started = Instant::now();
        let entry = Entry::new(key.into(), Value::new(value));

        let mut state = self.lock();
        let result = state.insert(&self.handlers, entry);
        state.complete(started, result)
    }

    fn get_element(&self, key: &str) -> Result<Option<Value>> {
        let started = Instant::now();

        let mut state = self.lock();
        let result = state.access(&self.handlers, key);
        state.complete(started, result)
    }

    fn delete_element(&self, key: &str) -> Result<bool> {
        let started = Instant::now();

        let mut state = self.lock();
        let result = match state.remove(&self.handlers, key) {
            Ok(Some(_)) => {
                state.metrics.record_delete();
                trace!(key, "entry deleted");
                Ok(true)
            }
            Ok(None) => Ok(false),
            Err(error) => Err(error),
        };
        state.complete(started, result)
    }

    fn len(&self) -> usize {
        self.lock().list.len()
    }

    fn metrics(&self) -> MetricsSnapshot {
        self.lock().metrics.snapshot()
    }
}
