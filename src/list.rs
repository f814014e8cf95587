//! Recency-ordered doubly linked list.
//!
//! Nodes live in a `Vec` arena and link to each other by index, so the list
//! needs no `unsafe` and the key index can refer to nodes through plain
//! [`NodeId`] handles. The front is the most-recently-used entry, the back is
//! the eviction candidate. Freed slots are recycled through a free list.

use crate::core::entry::Entry;

/// Null link.
const NIL: usize = usize::MAX;

/// A handle to a node inside a [`RecencyList`].
///
/// Handles stay valid until the node is removed. The list is the sole owner of
/// the entries; a handle is only a way to reach one in O(1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct NodeId(usize);

#[derive(Debug)]
struct Node {
    entry: Entry,
    prev: usize,
    next: usize,
}

#[derive(Debug)]
enum Slot {
    Occupied(Node),
    Vacant { next_free: usize },
}

#[derive(Debug)]
pub(crate) struct RecencyList {
    slots: Vec<Slot>,
    head: usize,
    tail: usize,
    free: usize,
    len: usize,
}

impl Default for RecencyList {
    fn default() -> Self {
        Self::with_capacity(0)
    }
}

impl RecencyList {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            head: NIL,
            tail: NIL,
            free: NIL,
            len: 0,
        }
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.len
    }

    /// Links a new entry at the front and returns its handle.
    pub(crate) fn push_front(&mut self, entry: Entry) -> NodeId {
        let node = Node {
            entry,
            prev: NIL,
            next: NIL,
        };

        let index = if self.free == NIL {
            self.slots.push(Slot::Occupied(node));
            self.slots.len() - 1
        } else {
            let index = self.free;
            self.free = match self.slots[index] {
                Slot::Vacant { next_free } => next_free,
                Slot::Occupied(_) => unreachable!("free list points at an occupied slot"),
            };
            self.slots[index] = Slot::Occupied(node);
            index
        };

        self.attach_front(index);
        self.len += 1;

        NodeId(index)
    }

    /// Moves an existing node to the front.
    pub(crate) fn move_to_front(&mut self, id: NodeId) {
        if self.head == id.0 {
            return;
        }

        self.detach(id.0);
        self.attach_front(id.0);
    }

    /// Unlinks a node and hands its entry back.
    pub(crate) fn remove(&mut self, id: NodeId) -> Entry {
        self.detach(id.0);

        let slot = std::mem::replace(
            &mut self.slots[id.0],
            Slot::Vacant {
                next_free: self.free,
            },
        );
        self.free = id.0;
        self.len -= 1;

        match slot {
            Slot::Occupied(node) => node.entry,
            Slot::Vacant { .. } => unreachable!("node handle refers to a vacant slot"),
        }
    }

    /// The least-recently-used node, or `None` when the list is empty.
    #[inline]
    pub(crate) fn back(&self) -> Option<NodeId> {
        (self.tail != NIL).then_some(NodeId(self.tail))
    }

    #[inline]
    pub(crate) fn entry(&self, id: NodeId) -> &Entry {
        &self.node(id.0).entry
    }

    #[inline]
    pub(crate) fn entry_mut(&mut self, id: NodeId) -> &mut Entry {
        &mut self.node_mut(id.0).entry
    }

    /// Iterates from most- to least-recently-used.
    pub(crate) fn iter(&self) -> Iter<'_> {
        Iter {
            list: self,
            current: self.head,
        }
    }

    fn node(&self, index: usize) -> &Node {
        match &self.slots[index] {
            Slot::Occupied(node) => node,
            Slot::Vacant { .. } => unreachable!("node handle refers to a vacant slot"),
        }
    }

    fn node_mut(&mut self, index: usize) -> &mut Node {
        match &mut self.slots[index] {
            Slot::Occupied(node) => node,
            Slot::Vacant { .. } => unreachable!("node handle refers to a vacant slot"),
        }
    }

    fn attach_front(&mut self, index: usize) {
        let old_head = self.head;

        let node = self.node_mut(index);
        node.prev = NIL;
        node.next = old_head;

        if old_head == NIL {
            self.tail = index;
        } else {
            self.node_mut(old_head).prev = index;
        }

        self.head = index;
    }

    fn detach(&mut self, index: usize) {
        let (prev, next) = {
            let node = self.node(index);
            (node.prev, node.next)
        };

        if prev == NIL {
            self.head = next;
        } else {
            self.node_mut(prev).next = next;
        }

        if next == NIL {
            self.tail = prev;
        } else {
            self.node_mut(next).prev = prev;
        }

        let node = self.node_mut(index);
        node.prev = NIL;
        node.next = NIL;
    }
}

pub(crate) struct Iter<'a> {
    list: &'a RecencyList,
    current: usize,
}

impl<'a> Iterator for Iter<'a> {
    type Item = (NodeId, &'a Entry);

    fn next(&mut self) -> Option<Self::Item> {
        if self.current == NIL {
            return None;
        }

        let index = self.current;
        let node = self.list.node(index);
        self.current = node.next;

        Some((NodeId(index), &node.entry))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::entry::Value;
    use crate::core::key::Key;

    fn entry(key: &str) -> Entry {
        Entry::new(Key::from(key), Value::new(key.len()))
    }

    fn keys(list: &RecencyList) -> Vec<String> {
        list.iter().map(|(_, entry)| entry.key().to_owned()).collect()
    }

    #[test]
    fn test_empty_list_has_no_back() {
        let list = RecencyList::default();

        assert_eq!(list.len(), 0);
        assert_eq!(list.back(), None);
        assert_eq!(list.iter().count(), 0);
    }

    #[test]
    fn test_push_front_orders_by_recency() {
        let mut list = RecencyList::default();
        let a = list.push_front(entry("a"));
        list.push_front(entry("b"));
        list.push_front(entry("c"));

        assert_eq!(keys(&list), ["c", "b", "a"]);
        assert_eq!(list.back(), Some(a));
        assert_eq!(list.len(), 3);
    }

    #[test]
    fn test_move_to_front() {
        let mut list = RecencyList::default();
        let a = list.push_front(entry("a"));
        let b = list.push_front(entry("b"));
        list.push_front(entry("c"));

        list.move_to_front(a);
        assert_eq!(keys(&list), ["a", "c", "b"]);
        assert_eq!(list.back(), Some(b));

        // Already at the front.
        list.move_to_front(a);
        assert_eq!(keys(&list), ["a", "c", "b"]);
    }

    #[test]
    fn test_remove_head_middle_and_tail() {
        let mut list = RecencyList::default();
        let a = list.push_front(entry("a"));
        let b = list.push_front(entry("b"));
        let c = list.push_front(entry("c"));

        assert_eq!(list.remove(b).key(), "b");
        assert_eq!(keys(&list), ["c", "a"]);

        assert_eq!(list.remove(c).key(), "c");
        assert_eq!(keys(&list), ["a"]);
        assert_eq!(list.back(), Some(a));

        assert_eq!(list.remove(a).key(), "a");
        assert_eq!(list.len(), 0);
        assert_eq!(list.back(), None);
    }

    #[test]
    fn test_vacant_slots_are_recycled() {
        let mut list = RecencyList::default();
        let a = list.push_front(entry("a"));
        list.push_front(entry("b"));

        list.remove(a);
        let d = list.push_front(entry("d"));

        assert_eq!(d, a);
        assert_eq!(list.slots.len(), 2);
        assert_eq!(keys(&list), ["d", "b"]);
    }

    #[test]
    fn test_entry_mut_updates_in_place() {
        let mut list = RecencyList::default();
        let a = list.push_front(entry("a"));
        list.push_front(entry("b"));

        list.entry_mut(a).replace_value(Value::new(42_usize));

        assert_eq!(list.entry(a).downcast_ref::<usize>(), Some(&42));
        assert_eq!(keys(&list), ["b", "a"]);
    }
}
