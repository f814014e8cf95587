use crate::core::entry::Entry;
use crate::core::error::Error;
use std::fmt;

/// The error a handler may return to abort the operation that triggered it.
pub type HandlerError = Box<dyn std::error::Error + Send + Sync>;

/// Outcome of an insert, delete or access handler.
pub type HandlerResult = Result<(), HandlerError>;

type Callback<M> = Box<dyn Fn(&mut M, &Entry) -> HandlerResult + Send + Sync>;

type Predicate<M> = Box<dyn Fn(&mut M, &Entry) -> bool + Send + Sync>;

/// Identifies the handler slot that produced a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Hook {
    /// Runs after a new or updated entry is committed.
    Insert,
    /// Runs before an entry is unlinked, for explicit deletes and evictions.
    Delete,
    /// Runs after a lookup promoted the entry to most-recently-used.
    Access,
}

impl fmt::Display for Hook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Hook::Insert => "on-insert",
            Hook::Delete => "on-delete",
            Hook::Access => "on-access",
        };

        f.write_str(name)
    }
}

/// The four optional, user-supplied handler slots of a cache.
///
/// Every slot receives a mutable reference to the cache metadata together with
/// the affected entry. Handlers are invoked synchronously while the cache lock
/// is held and therefore must never call back into the same cache.
pub(crate) struct Handlers<M> {
    on_insert: Option<Callback<M>>,
    on_delete: Option<Callback<M>>,
    on_access: Option<Callback<M>>,
    should_evict: Option<Predicate<M>>,
}

impl<M> Default for Handlers<M> {
    fn default() -> Self {
        Self {
            on_insert: None,
            on_delete: None,
            on_access: None,
            should_evict: None,
        }
    }
}

impl<M> Handlers<M> {
    pub(crate) fn set_on_insert<F>(&mut self, handler: F)
    where
        F: Fn(&mut M, &Entry) -> HandlerResult + Send + Sync + 'static,
    {
        self.on_insert = Some(Box::new(handler));
    }

    pub(crate) fn set_on_delete<F>(&mut self, handler: F)
    where
        F: Fn(&mut M, &Entry) -> HandlerResult + Send + Sync + 'static,
    {
        self.on_delete = Some(Box::new(handler));
    }

    pub(crate) fn set_on_access<F>(&mut self, handler: F)
    where
        F: Fn(&mut M, &Entry) -> HandlerResult + Send + Sync + 'static,
    {
        self.on_access = Some(Box::new(handler));
    }

    pub(crate) fn set_should_evict<F>(&mut self, handler: F)
    where
        F: Fn(&mut M, &Entry) -> bool + Send + Sync + 'static,
    {
        self.should_evict = Some(Box::new(handler));
    }

    #[inline]
    pub(crate) fn inserted(&self, metadata: &mut M, entry: &Entry) -> Result<(), Error> {
        invoke(Hook::Insert, self.on_insert.as_ref(), metadata, entry)
    }

    #[inline]
    pub(crate) fn deleted(&self, metadata: &mut M, entry: &Entry) -> Result<(), Error> {
        invoke(Hook::Delete, self.on_delete.as_ref(), metadata, entry)
    }

    #[inline]
    pub(crate) fn accessed(&self, metadata: &mut M, entry: &Entry) -> Result<(), Error> {
        invoke(Hook::Access, self.on_access.as_ref(), metadata, entry)
    }

    /// Evaluates the eviction predicate against the entry about to be inserted.
    ///
    /// An empty slot never requests eviction.
    #[inline]
    pub(crate) fn should_evict(&self, metadata: &mut M, candidate: &Entry) -> bool {
        self.should_evict
            .as_ref()
            .is_some_and(|predicate| predicate(metadata, candidate))
    }
}

fn invoke<M>(
    hook: Hook,
    handler: Option<&Callback<M>>,
    metadata: &mut M,
    entry: &Entry,
) -> Result<(), Error> {
    let Some(handler) = handler else {
        return Ok(());
    };

    handler(metadata, entry).map_err(|source| Error::Handler {
        hook,
        key: entry.key().to_owned(),
        source,
    })
}
