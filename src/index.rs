use crate::core::key::Key;
use crate::list::NodeId;
use std::collections::HashMap;
use std::hash::BuildHasherDefault;
use twox_hash::XxHash64;

/// Key → node handle mapping.
///
/// Holds non-owning [`NodeId`]s into the recency list; every mutation here must
/// be paired with the matching list mutation.
#[derive(Debug, Default)]
pub(crate) struct KeyIndex {
    nodes: HashMap<Key, NodeId, BuildHasherDefault<XxHash64>>,
}

impl KeyIndex {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            nodes: HashMap::with_capacity_and_hasher(capacity, Default::default()),
        }
    }

    #[inline]
    pub(crate) fn lookup(&self, key: &str) -> Option<NodeId> {
        self.nodes.get(key).copied()
    }

    #[inline]
    pub(crate) fn insert(&mut self, key: Key, id: NodeId) {
        self.nodes.insert(key, id);
    }

    #[inline]
    pub(crate) fn remove(&mut self, key: &str) -> Option<NodeId> {
        self.nodes.remove(key)
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.nodes.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::entry::{Entry, Value};
    use crate::list::RecencyList;

    #[test]
    fn test_lookup_insert_remove() {
        let mut list = RecencyList::default();
        let mut index = KeyIndex::default();

        let key = Key::from("a");
        let id = list.push_front(Entry::new(key.clone(), Value::new(1_u8)));
        index.insert(key, id);

        assert_eq!(index.lookup("a"), Some(id));
        assert_eq!(index.lookup("b"), None);
        assert_eq!(index.len(), 1);

        assert_eq!(index.remove("a"), Some(id));
        assert_eq!(index.remove("a"), None);
        assert_eq!(index.len(), 0);
    }
}
