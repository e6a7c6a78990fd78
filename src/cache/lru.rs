//! LRU Tracker Module
//!
//! Implements Least Recently Used ordering for cache eviction.

// == Node ==
#[derive(Debug)]
struct Node<K> {
    key: K,
    prev: Option<usize>,
    next: Option<usize>,
}

// == LRU Tracker ==
/// Tracks access order for LRU eviction strategy.
///
/// Nodes live in an arena (`Vec`) and are addressed by stable slot indices, with
/// intrusive `prev`/`next` links:
/// - Head = Most recently used
/// - Tail = Least recently used
///
/// Vacated slots go on a free list and are reused by later pushes, so an index
/// handed out by [`push_front`](Self::push_front) stays valid until that node is
/// removed. Every operation is O(1).
#[derive(Debug)]
pub struct LruTracker<K> {
    nodes: Vec<Option<Node<K>>>,
    free: Vec<usize>,
    head: Option<usize>,
    tail: Option<usize>,
    len: usize,
}

impl<K> Default for LruTracker<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K> LruTracker<K> {
    // == Constructor ==
    /// Creates a new empty LRU tracker.
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            free: Vec::new(),
            head: None,
            tail: None,
            len: 0,
        }
    }

    // == Push Front ==
    /// Inserts a key as most recently used and returns its slot index.
    pub fn push_front(&mut self, key: K) -> usize {
        let node = Node {
            key,
            prev: None,
            next: None,
        };

        let index = match self.free.pop() {
            Some(index) => {
                self.nodes[index] = Some(node);
                index
            }
            None => {
                self.nodes.push(Some(node));
                self.nodes.len() - 1
            }
        };

        self.attach_front(index);
        self.len += 1;
        index
    }

    // == Touch ==
    /// Marks the node at `index` as recently used (moves it to the head).
    ///
    /// No-op for a vacant slot.
    pub fn touch(&mut self, index: usize) {
        if self.head == Some(index) || !self.is_occupied(index) {
            return;
        }
        self.detach(index);
        self.attach_front(index);
    }

    // == Remove ==
    /// Unlinks the node at `index` and returns its key.
    ///
    /// Returns None if the slot is vacant.
    pub fn remove(&mut self, index: usize) -> Option<K> {
        if !self.is_occupied(index) {
            return None;
        }
        self.detach(index);
        let node = self.nodes[index].take()?;
        self.free.push(index);
        self.len -= 1;
        Some(node.key)
    }

    // == Evict Oldest ==
    /// Returns and removes the least recently used key.
    ///
    /// Returns None if tracker is empty.
    pub fn evict_oldest(&mut self) -> Option<K> {
        let tail = self.tail?;
        self.remove(tail)
    }

    // == Peek Oldest ==
    /// Returns the least recently used key without removing it.
    pub fn peek_oldest(&self) -> Option<&K> {
        self.tail
            .and_then(|index| self.nodes[index].as_ref())
            .map(|node| &node.key)
    }

    // == Iter ==
    /// Iterates keys from most to least recently used.
    pub fn iter(&self) -> impl Iterator<Item = &K> + '_ {
        let mut cursor = self.head;
        std::iter::from_fn(move || {
            let node = self.nodes[cursor?].as_ref()?;
            cursor = node.next;
            Some(&node.key)
        })
    }

    // == Length ==
    /// Returns the number of tracked keys.
    pub fn len(&self) -> usize {
        self.len
    }

    // == Is Empty ==
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    fn is_occupied(&self, index: usize) -> bool {
        matches!(self.nodes.get(index), Some(Some(_)))
    }

    /// Links an occupied, currently unlinked slot in at the head.
    fn attach_front(&mut self, index: usize) {
        let old_head = self.head;
        if let Some(node) = self.nodes[index].as_mut() {
            node.prev = None;
            node.next = old_head;
        }
        match old_head.and_then(|head| self.nodes[head].as_mut()) {
            Some(head) => head.prev = Some(index),
            None => self.tail = Some(index),
        }
        self.head = Some(index);
    }

    /// Unlinks an occupied slot from its neighbours, leaving the slot in place.
    fn detach(&mut self, index: usize) {
        let (prev, next) = match self.nodes[index].as_mut() {
            Some(node) => (node.prev.take(), node.next.take()),
            None => return,
        };

        match prev.and_then(|p| self.nodes[p].as_mut()) {
            Some(prev_node) => prev_node.next = next,
            None => self.head = next,
        }
        match next.and_then(|n| self.nodes[n].as_mut()) {
            Some(next_node) => next_node.prev = prev,
            None => self.tail = prev,
        }
    }
}
