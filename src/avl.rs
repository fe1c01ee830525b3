//! Arena backed AVL tree.
//!
//! Nodes live in a `Vec` and are addressed by [`NodeId`]; `parent` links are
//! plain indices used for navigation only. Released slots are recycled, and
//! every release bumps the slot's generation, so a `(NodeId, generation)` pair
//! taken earlier can tell whether the node it named is still the same node.
//!
//! The tree offers two families of operations:
//! * keyed ones (`insert`, `find`, `remove`) when the comparator type
//!   implements [`Comparator`],
//! * structural ones (`replace_leaf`, `collapse_leaf`, navigation) for every
//!   tree. The beach line is driven purely by position, and uses those.

use std::cmp::Ordering;

use crate::order::{Comparator, Unordered};

/// Underlying type for NodeId, the beach line never holds more than `4n` nodes
type NumType = u32;

#[derive(Debug, Hash, Copy, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct NodeId(NumType);

impl NodeId {
    pub const INVALID: NodeId = NodeId(NumType::MAX);

    /// whether id is invalid
    pub fn invalid(&self) -> bool {
        self.0 == Self::INVALID.0
    }

    pub fn as_usize(&self) -> usize {
        self.0 as usize
    }

    pub fn into_option(self) -> Option<Self> {
        if self.invalid() {
            None
        } else {
            Some(self)
        }
    }
}

#[derive(Debug, Clone)]
struct Node<T> {
    /// `None` when the slot sits in the free list
    payload: Option<T>,
    left: NodeId,
    right: NodeId,
    parent: NodeId,
    /// leaf is 0, an absent child counts as -1
    height: i32,
    generation: u32,
}

impl<T> Node<T> {
    fn new(payload: T, generation: u32) -> Self {
        Self {
            payload: Some(payload),
            left: NodeId::INVALID,
            right: NodeId::INVALID,
            parent: NodeId::INVALID,
            height: 0,
            generation,
        }
    }
}

/// Self balancing binary search tree, see module docs.
#[derive(Debug, Clone)]
pub struct AvlTree<T, C = Unordered> {
    nodes: Vec<Node<T>>,
    free: Vec<NodeId>,
    root: NodeId,
    /// nodes reachable from root
    len: usize,
    cmp: C,
}

impl<T> AvlTree<T, Unordered> {
    /// A tree shaped by position only.
    pub fn unordered() -> Self {
        Self::new(Unordered)
    }
}

impl<T> Default for AvlTree<T, Unordered> {
    fn default() -> Self {
        Self::unordered()
    }
}

impl<T, C> AvlTree<T, C> {
    pub fn new(cmp: C) -> Self {
        Self::with_capacity(0, cmp)
    }

    pub fn with_capacity(capacity: usize, cmp: C) -> Self {
        Self {
            nodes: Vec::with_capacity(capacity),
            free: vec![],
            root: NodeId::INVALID,
            len: 0,
            cmp,
        }
    }

    /// Number of nodes in the tree, detached subtrees not included
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.root.invalid()
    }

    pub fn root(&self) -> Option<NodeId> {
        self.root.into_option()
    }

    /// Height of the whole tree, -1 when empty.
    pub fn height(&self) -> i32 {
        self.node_height(self.root)
    }

    /// Height of the subtree rooted at `id`, -1 for an invalid id.
    pub fn node_height(&self, id: NodeId) -> i32 {
        match self.live(id) {
            Some(node) => node.height,
            None => -1,
        }
    }

    pub fn get(&self, id: NodeId) -> Option<&T> {
        self.live(id).and_then(|n| n.payload.as_ref())
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut T> {
        self.nodes
            .get_mut(id.as_usize())
            .and_then(|n| n.payload.as_mut())
    }

    pub fn left(&self, id: NodeId) -> Option<NodeId> {
        self.live(id).and_then(|n| n.left.into_option())
    }

    pub fn right(&self, id: NodeId) -> Option<NodeId> {
        self.live(id).and_then(|n| n.right.into_option())
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.live(id).and_then(|n| n.parent.into_option())
    }

    pub fn is_leaf(&self, id: NodeId) -> bool {
        self.live(id)
            .map(|n| n.left.invalid() && n.right.invalid())
            .unwrap_or(false)
    }

    /// Generation of a live node
    pub fn generation(&self, id: NodeId) -> Option<u32> {
        self.live(id).map(|n| n.generation)
    }

    /// Whether `id` still names the node that had `generation` when it was observed.
    pub fn is_current(&self, id: NodeId, generation: u32) -> bool {
        self.generation(id) == Some(generation)
    }

    /// Left most node
    pub fn first(&self) -> Option<NodeId> {
        self.root().map(|root| self.leftmost(root))
    }

    /// Right most node
    pub fn last(&self) -> Option<NodeId> {
        self.root().map(|root| self.rightmost(root))
    }

    /// In-order successor
    pub fn successor(&self, id: NodeId) -> Option<NodeId> {
        let node = self.live(id)?;
        if !node.right.invalid() {
            return Some(self.leftmost(node.right));
        }

        let mut child = id;
        let mut parent = node.parent;
        while !parent.invalid() && self.nodes[parent.as_usize()].right == child {
            child = parent;
            parent = self.nodes[parent.as_usize()].parent;
        }
        parent.into_option()
    }

    /// In-order predecessor
    pub fn predecessor(&self, id: NodeId) -> Option<NodeId> {
        let node = self.live(id)?;
        if !node.left.invalid() {
            return Some(self.rightmost(node.left));
        }

        let mut child = id;
        let mut parent = node.parent;
        while !parent.invalid() && self.nodes[parent.as_usize()].left == child {
            child = parent;
            parent = self.nodes[parent.as_usize()].parent;
        }
        parent.into_option()
    }

    /// In-order iteration
    pub fn iter(&self) -> Iter<'_, T, C> {
        Iter {
            tree: self,
            next: self.first(),
        }
    }

    /// Put `payload` at the root of an empty tree, hands it back when the tree
    /// is not empty.
    pub fn insert_root(&mut self, payload: T) -> Result<NodeId, T> {
        if !self.root.invalid() {
            return Err(payload);
        }
        let id = self.alloc(payload);
        self.root = id;
        self.len = 1;
        Ok(id)
    }

    /// Build a detached node on top of two detached subtrees. The result is
    /// meant to be spliced in with [`Self::replace_leaf`].
    pub fn make_node(
        &mut self,
        payload: T,
        left: Option<NodeId>,
        right: Option<NodeId>,
    ) -> NodeId {
        debug_assert!(left.map_or(true, |l| self.is_detached(l)));
        debug_assert!(right.map_or(true, |r| self.is_detached(r)));

        let id = self.alloc(payload);
        let left = left.unwrap_or(NodeId::INVALID);
        let right = right.unwrap_or(NodeId::INVALID);
        for child in [left, right] {
            if !child.invalid() {
                self.nodes[child.as_usize()].parent = id;
            }
        }
        let node = &mut self.nodes[id.as_usize()];
        node.left = left;
        node.right = right;
        self.update_height(id);
        id
    }

    /// Splice the detached subtree `replacement` in place of `leaf`, then
    /// rebalance up to the root. Returns the payload of the replaced leaf, or
    /// `None` (and changes nothing) when `leaf` is not an attached leaf or
    /// `replacement` is not a detached subtree.
    ///
    /// Rotations restore balance when the subtree is at most one level
    /// taller than the leaf it replaces; callers growing the tree by more
    /// should splice in several steps.
    pub fn replace_leaf(&mut self, leaf: NodeId, replacement: NodeId) -> Option<T> {
        if !self.is_leaf(leaf) || !self.is_attached(leaf) || !self.is_detached(replacement) {
            return None;
        }
        debug_assert!(self.node_height(replacement) <= 1);

        let parent = self.nodes[leaf.as_usize()].parent;
        self.replace_child(parent, leaf, replacement);
        self.nodes[replacement.as_usize()].parent = parent;

        let added = self.subtree_len(replacement);
        let removed = self.release(leaf);
        self.len = self.len + added - 1;

        self.rebalance_from(replacement);
        removed
    }

    /// Remove `leaf` together with its parent; the leaf's sibling takes the
    /// parent's place. Returns `(leaf payload, parent payload)`.
    pub fn collapse_leaf(&mut self, leaf: NodeId) -> Option<(T, T)> {
        if !self.is_leaf(leaf) || !self.is_attached(leaf) {
            return None;
        }
        let parent = self.nodes[leaf.as_usize()].parent;
        if parent.invalid() {
            return None;
        }

        let parent_node = &self.nodes[parent.as_usize()];
        let sibling = if parent_node.left == leaf {
            parent_node.right
        } else {
            parent_node.left
        };
        let grand_parent = parent_node.parent;

        self.replace_child(grand_parent, parent, sibling);
        if !sibling.invalid() {
            self.nodes[sibling.as_usize()].parent = grand_parent;
        }

        let leaf_payload = self.release(leaf);
        let parent_payload = self.release(parent);
        self.len -= 2;
        self.rebalance_from(grand_parent);

        match (leaf_payload, parent_payload) {
            (Some(l), Some(p)) => Some((l, p)),
            _ => unreachable!("attached nodes always carry a payload"),
        }
    }

    /// Release every node of the subtree under `root`, post-order with an
    /// explicit stack. An attached subtree is unlinked from its parent first,
    /// rotations only restore balance when that lowers the parent's height by
    /// at most two. Returns how many nodes were released.
    pub fn discard_subtree(&mut self, root: NodeId) -> usize {
        if self.live(root).is_none() {
            return 0;
        }
        let attached = self.is_attached(root);
        let parent = self.nodes[root.as_usize()].parent;
        if attached {
            self.replace_child(parent, root, NodeId::INVALID);
        }

        let mut released = 0;
        let mut stack = vec![(root, false)];
        while let Some((id, expanded)) = stack.pop() {
            if id.invalid() {
                continue;
            }
            if expanded {
                self.release(id);
                released += 1;
            } else {
                let node = &self.nodes[id.as_usize()];
                stack.push((id, true));
                stack.push((node.right, false));
                stack.push((node.left, false));
            }
        }

        if attached {
            self.len -= released;
            self.rebalance_from(parent);
        }
        released
    }

    /// Remove all nodes. Ids handed out before stay stale afterwards.
    pub fn clear(&mut self) {
        let root = self.root;
        self.discard_subtree(root);
        self.root = NodeId::INVALID;
        self.len = 0;
    }

    /// Check links, cached heights and balance factors of the whole tree.
    pub fn verify(&self) -> bool {
        let Some(root) = self.root() else {
            return self.len == 0;
        };
        if !self.nodes[root.as_usize()].parent.invalid() {
            return false;
        }

        let mut count = 0;
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            let Some(node) = self.live(id) else {
                return false;
            };
            count += 1;

            for child in [node.left, node.right] {
                if child.invalid() {
                    continue;
                }
                match self.live(child) {
                    Some(c) if c.parent == id => stack.push(child),
                    _ => return false,
                }
            }

            let lh = self.node_height(node.left);
            let rh = self.node_height(node.right);
            if node.height != lh.max(rh) + 1 || (lh - rh).abs() > 1 {
                return false;
            }
        }

        count == self.len
    }

    fn live(&self, id: NodeId) -> Option<&Node<T>> {
        self.nodes
            .get(id.as_usize())
            .filter(|n| n.payload.is_some())
    }

    fn payload_ref(&self, id: NodeId) -> &T {
        match &self.nodes[id.as_usize()].payload {
            Some(payload) => payload,
            None => unreachable!("released node {id:?} is still linked"),
        }
    }

    fn is_attached(&self, id: NodeId) -> bool {
        match self.live(id) {
            Some(node) => !node.parent.invalid() || self.root == id,
            None => false,
        }
    }

    fn is_detached(&self, id: NodeId) -> bool {
        match self.live(id) {
            Some(node) => node.parent.invalid() && self.root != id,
            None => false,
        }
    }

    fn leftmost(&self, mut id: NodeId) -> NodeId {
        loop {
            let left = self.nodes[id.as_usize()].left;
            if left.invalid() {
                return id;
            }
            id = left;
        }
    }

    fn rightmost(&self, mut id: NodeId) -> NodeId {
        loop {
            let right = self.nodes[id.as_usize()].right;
            if right.invalid() {
                return id;
            }
            id = right;
        }
    }

    fn subtree_len(&self, root: NodeId) -> usize {
        let mut count = 0;
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            if id.invalid() {
                continue;
            }
            count += 1;
            let node = &self.nodes[id.as_usize()];
            stack.push(node.left);
            stack.push(node.right);
        }
        count
    }

    fn alloc(&mut self, payload: T) -> NodeId {
        match self.free.pop() {
            Some(id) => {
                let generation = self.nodes[id.as_usize()].generation;
                self.nodes[id.as_usize()] = Node::new(payload, generation);
                id
            }
            None => {
                debug_assert!(self.nodes.len() < NumType::MAX as usize);
                let id = NodeId(self.nodes.len() as NumType);
                self.nodes.push(Node::new(payload, 0));
                id
            }
        }
    }

    fn release(&mut self, id: NodeId) -> Option<T> {
        let node = &mut self.nodes[id.as_usize()];
        let payload = node.payload.take();
        node.left = NodeId::INVALID;
        node.right = NodeId::INVALID;
        node.parent = NodeId::INVALID;
        node.height = 0;
        node.generation = node.generation.wrapping_add(1);
        self.free.push(id);
        payload
    }

    fn swap_payloads(&mut self, a: NodeId, b: NodeId) {
        let pa = self.nodes[a.as_usize()].payload.take();
        let pb = std::mem::replace(&mut self.nodes[b.as_usize()].payload, pa);
        self.nodes[a.as_usize()].payload = pb;
    }

    /// point `parent`'s link from `old` to `new`, or the root when `parent` is invalid
    fn replace_child(&mut self, parent: NodeId, old: NodeId, new: NodeId) {
        if parent.invalid() {
            self.root = new;
            return;
        }
        let parent = &mut self.nodes[parent.as_usize()];
        if parent.left == old {
            parent.left = new;
        } else {
            debug_assert!(parent.right == old, "not a child of its parent");
            parent.right = new;
        }
    }

    fn update_height(&mut self, id: NodeId) {
        let node = &self.nodes[id.as_usize()];
        let height = self.node_height(node.left).max(self.node_height(node.right)) + 1;
        self.nodes[id.as_usize()].height = height;
    }

    ///    x              y
    ///     \            /
    ///      y    =>    x
    ///     /            \
    ///    t              t
    fn rotate_left(&mut self, x: NodeId) -> NodeId {
        let y = self.nodes[x.as_usize()].right;
        let t = self.nodes[y.as_usize()].left;
        let parent = self.nodes[x.as_usize()].parent;

        self.nodes[x.as_usize()].right = t;
        if !t.invalid() {
            self.nodes[t.as_usize()].parent = x;
        }

        self.nodes[y.as_usize()].parent = parent;
        self.replace_child(parent, x, y);

        self.nodes[y.as_usize()].left = x;
        self.nodes[x.as_usize()].parent = y;

        self.update_height(x);
        self.update_height(y);
        y
    }

    ///      x          y
    ///     /            \
    ///    y      =>      x
    ///     \            /
    ///      t          t
    fn rotate_right(&mut self, x: NodeId) -> NodeId {
        let y = self.nodes[x.as_usize()].left;
        let t = self.nodes[y.as_usize()].right;
        let parent = self.nodes[x.as_usize()].parent;

        self.nodes[x.as_usize()].left = t;
        if !t.invalid() {
            self.nodes[t.as_usize()].parent = x;
        }

        self.nodes[y.as_usize()].parent = parent;
        self.replace_child(parent, x, y);

        self.nodes[y.as_usize()].right = x;
        self.nodes[x.as_usize()].parent = y;

        self.update_height(x);
        self.update_height(y);
        y
    }

    /// Balance the subtree rooted at `id`, returns the new subtree root
    fn balance(&mut self, id: NodeId) -> NodeId {
        let node = &self.nodes[id.as_usize()];
        let (left, right) = (node.left, node.right);
        let diff = self.node_height(left) - self.node_height(right);

        if diff > 1 {
            let inner = &self.nodes[left.as_usize()];
            if self.node_height(inner.left) < self.node_height(inner.right) {
                self.rotate_left(left);
            }
            self.rotate_right(id)
        } else if diff < -1 {
            let inner = &self.nodes[right.as_usize()];
            if self.node_height(inner.right) < self.node_height(inner.left) {
                self.rotate_right(right);
            }
            self.rotate_left(id)
        } else {
            self.update_height(id);
            id
        }
    }

    /// Balance every node from `id` up to the root
    fn rebalance_from(&mut self, mut id: NodeId) {
        while !id.invalid() {
            let subtree_root = self.balance(id);
            id = self.nodes[subtree_root.as_usize()].parent;
        }
    }
}

impl<T, C: Comparator<T>> AvlTree<T, C> {
    /// Insert `payload`, equal keys go to the right of existing ones.
    pub fn insert(&mut self, payload: T) -> NodeId {
        if self.root.invalid() {
            let id = self.alloc(payload);
            self.root = id;
            self.len = 1;
            return id;
        }

        let mut current = self.root;
        loop {
            let go_left = self.cmp.compare(&payload, self.payload_ref(current)) == Ordering::Less;
            let node = &self.nodes[current.as_usize()];
            let child = if go_left { node.left } else { node.right };
            if !child.invalid() {
                current = child;
                continue;
            }

            let id = self.alloc(payload);
            self.nodes[id.as_usize()].parent = current;
            let node = &mut self.nodes[current.as_usize()];
            if go_left {
                node.left = id;
            } else {
                node.right = id;
            }
            self.len += 1;
            self.rebalance_from(current);
            return id;
        }
    }

    /// Find a node holding a payload equal to `payload`
    pub fn find(&self, payload: &T) -> Option<NodeId> {
        let mut current = self.root;
        while !current.invalid() {
            let node = &self.nodes[current.as_usize()];
            current = match self.cmp.compare(payload, self.payload_ref(current)) {
                Ordering::Equal => return Some(current),
                Ordering::Less => node.left,
                Ordering::Greater => node.right,
            };
        }
        None
    }

    /// Remove one payload equal to `payload` and return it.
    ///
    /// An internal node hands its payload down to its in-order predecessor
    /// (or successor without a left subtree) until it reaches a leaf, which
    /// is then unlinked.
    pub fn remove(&mut self, payload: &T) -> Option<T> {
        let mut target = self.find(payload)?;
        loop {
            let node = &self.nodes[target.as_usize()];
            let next = if !node.left.invalid() {
                self.rightmost(node.left)
            } else if !node.right.invalid() {
                self.leftmost(node.right)
            } else {
                break;
            };
            self.swap_payloads(target, next);
            target = next;
        }

        let parent = self.nodes[target.as_usize()].parent;
        self.replace_child(parent, target, NodeId::INVALID);
        let removed = self.release(target);
        self.len -= 1;
        self.rebalance_from(parent);
        removed
    }

    /// Whether in-order traversal is sorted by the comparator
    pub fn is_sorted(&self) -> bool {
        let mut prev: Option<&T> = None;
        for (_, payload) in self.iter() {
            if let Some(prev) = prev {
                if self.cmp.compare(prev, payload) == Ordering::Greater {
                    return false;
                }
            }
            prev = Some(payload);
        }
        true
    }
}

/// In-order iterator, see [`AvlTree::iter`]
pub struct Iter<'a, T, C> {
    tree: &'a AvlTree<T, C>,
    next: Option<NodeId>,
}

impl<'a, T, C> Iterator for Iter<'a, T, C> {
    type Item = (NodeId, &'a T);

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.next?;
        self.next = self.tree.successor(id);
        Some((id, self.tree.payload_ref(id)))
    }
}
