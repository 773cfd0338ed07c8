//! Recency-ordered access history with O(1) insert, move, and removal.
//!
//! A doubly linked list over an index arena (`Vec` of nodes plus a free
//! list), with a side map from record id to node slot. Re-recording an id
//! moves its entry to the most-recent position instead of duplicating it, so
//! the history holds at most one entry per live record.

use crate::model::RecordId;
use std::collections::HashMap;

#[derive(Debug, Clone)]
struct Node<T> {
    id: RecordId,
    value: T,
    prev: Option<usize>,
    next: Option<usize>,
}

#[derive(Debug, Clone)]
pub struct AccessHistory<T> {
    nodes: Vec<Option<Node<T>>>,
    free: Vec<usize>,
    index: HashMap<RecordId, usize>,
    head: Option<usize>,
    tail: Option<usize>,
}

impl<T> Default for AccessHistory<T> {
    fn default() -> Self {
        Self {
            nodes: Vec::new(),
            free: Vec::new(),
            index: HashMap::new(),
            head: None,
            tail: None,
        }
    }
}

impl<T> AccessHistory<T> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of distinct ids currently recorded.
    #[must_use]
    pub fn len(&self) -> usize {
        self.index.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    #[must_use]
    pub fn contains(&self, id: RecordId) -> bool {
        self.index.contains_key(&id)
    }

    /// Record an access to `id`. An existing entry for the same id is
    /// unlinked first, so the id ends up at the most-recent position exactly
    /// once.
    pub fn record(&mut self, id: RecordId, value: T) {
        self.remove(id);

        let node = Node {
            id,
            value,
            prev: self.tail,
            next: None,
        };
        let slot = if let Some(slot) = self.free.pop() {
            self.nodes[slot] = Some(node);
            slot
        } else {
            self.nodes.push(Some(node));
            self.nodes.len() - 1
        };

        if let Some(tail) = self.tail {
            if let Some(prev_tail) = &mut self.nodes[tail] {
                prev_tail.next = Some(slot);
            }
        } else {
            self.head = Some(slot);
        }
        self.tail = Some(slot);
        self.index.insert(id, slot);
    }

    /// Unlink the entry for `id`, patching neighbor pointers. No-op when the
    /// id was never recorded.
    pub fn remove(&mut self, id: RecordId) {
        let Some(slot) = self.index.remove(&id) else {
            return;
        };
        let Some(node) = self.nodes[slot].take() else {
            return;
        };

        match node.prev {
            Some(prev) => {
                if let Some(prev_node) = &mut self.nodes[prev] {
                    prev_node.next = node.next;
                }
            }
            None => self.head = node.next,
        }
        match node.next {
            Some(next) => {
                if let Some(next_node) = &mut self.nodes[next] {
                    next_node.prev = node.prev;
                }
            }
            None => self.tail = node.prev,
        }

        self.free.push(slot);
    }

    /// Drop every entry.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.free.clear();
        self.index.clear();
        self.head = None;
        self.tail = None;
    }
}

impl<T: Clone> AccessHistory<T> {
    /// Walk head to tail and return a fresh list of values, least recent
    /// first. The returned list shares nothing with internal structure.
    #[must_use]
    pub fn snapshot(&self) -> Vec<T> {
        let mut out = Vec::with_capacity(self.index.len());
        let mut cursor = self.head;
        while let Some(slot) = cursor {
            let Some(node) = &self.nodes[slot] else {
                break;
            };
            out.push(node.value.clone());
            cursor = node.next;
        }
        out
    }

    /// Ids in recency order, least recent first. Test and debug aid.
    #[must_use]
    pub fn ids(&self) -> Vec<RecordId> {
        let mut out = Vec::with_capacity(self.index.len());
        let mut cursor = self.head;
        while let Some(slot) = cursor {
            let Some(node) = &self.nodes[slot] else {
                break;
            };
            out.push(node.id);
            cursor = node.next;
        }
        out
    }
}
