use crate::core::key::Key;
use std::any::{Any, type_name};
use std::fmt;
use std::sync::Arc;

/// A type-erased cache value.
///
/// The engine stores and hands back `Value`s without ever looking inside.
/// Handlers and callers recover the concrete type with [`Value::downcast_ref`]
/// or [`Value::downcast`].
#[derive(Clone)]
pub struct Value {
    inner: Arc<dyn Any + Send + Sync>,
    type_name: &'static str,
}

impl Value {
    /// Erases `value` behind a shared pointer.
    pub fn new<T>(value: T) -> Self
    where
        T: Any + Send + Sync,
    {
        Self {
            inner: Arc::new(value),
            type_name: type_name::<T>(),
        }
    }

    /// Returns `true` if the stored value is a `T`.
    #[inline]
    pub fn is<T: Any>(&self) -> bool {
        self.inner.is::<T>()
    }

    /// Borrows the stored value as a `T`, or `None` if it is another type.
    #[inline]
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.inner.downcast_ref::<T>()
    }

    /// Recovers a shared, owned handle to the stored `T`.
    pub fn downcast<T>(self) -> Option<Arc<T>>
    where
        T: Any + Send + Sync,
    {
        self.inner.downcast::<T>().ok()
    }

    /// Name of the type the value was created from.
    #[inline]
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Value")
            .field("type", &self.type_name)
            .finish_non_exhaustive()
    }
}

/// A key-value pair as seen by handlers.
#[derive(Debug, Clone)]
pub struct Entry {
    /// The key of the entry.
    key: Key,
    /// The opaque value stored in the cache.
    value: Value,
}

impl Entry {
    #[inline]
    pub fn new(key: Key, value: Value) -> Self {
        Self { key, value }
    }

    #[inline]
    pub fn key(&self) -> &str {
        self.key.as_str()
    }

    #[inline]
    pub fn value(&self) -> &Value {
        &self.value
    }

    /// Shortcut for `entry.value().downcast_ref::<T>()`.
    #[inline]
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.value.downcast_ref::<T>()
    }

    #[inline]
    pub(crate) fn shared_key(&self) -> &Key {
        &self.key
    }

    #[inline]
    pub(crate) fn replace_value(&mut self, value: Value) {
        self.value = value;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct FileRef {
        path: String,
        size: usize,
    }

    #[test]
    fn test_downcast_recovers_concrete_type() {
        let value = Value::new(FileRef {
            path: "/tmp/sample".to_string(),
            size: 10_000,
        });

        assert!(value.is::<FileRef>());
        assert_eq!(value.downcast_ref::<FileRef>().map(|file| file.size), Some(10_000));
        assert!(value.downcast_ref::<u64>().is_none());

        let owned = value.downcast::<FileRef>().expect("value should be a FileRef");
        assert_eq!(owned.path, "/tmp/sample");
    }

    #[test]
    fn test_entry_exposes_key_and_value() {
        let entry = Entry::new(Key::from("a"), Value::new(1_i32));

        assert_eq!(entry.key(), "a");
        assert_eq!(entry.downcast_ref::<i32>(), Some(&1));
        assert!(entry.value().type_name().ends_with("i32"));
    }

    #[test]
    fn test_replace_value_keeps_key() {
        let mut entry = Entry::new(Key::from("a"), Value::new(1_i32));
        entry.replace_value(Value::new("one"));

        assert_eq!(entry.key(), "a");
        assert_eq!(entry.downcast_ref::<&str>(), Some(&"one"));
    }
}
