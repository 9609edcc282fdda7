//! Context trie stored in a flat node arena.
//!
//! Nodes are addressed by `u32` handles into a single `Vec`, with `0`
//! doubling as the null link: the root lives at slot 0 and is never anyone's
//! child or sibling. Children form a singly linked chain in insertion order,
//! so a node costs the same regardless of how many of the 256 possible
//! successors have actually been seen.
//!
//! A node at depth `d` is the context formed by the `d` bytes on its path
//! (oldest first). Its children are the bytes observed to follow that
//! context, each carrying its own count; the parent caches their sum.

use log::trace;

use super::{ExclusionSet, Frequencies, MAX_TOTAL};

/// Null link.
const NIL: u32 = 0;

/// Handle to a node in a [`ContextTrie`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NodeId(u32);

impl NodeId {
    /// Arena slot of this node.
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// One trie node.
#[derive(Clone, Copy, Debug)]
struct Node {
    /// Byte on the edge into this node.
    byte: u8,
    /// Number of children.
    num_children: u16,
    /// Times `byte` followed the parent context.
    count: u32,
    /// Sum of the children's counts.
    child_total: u32,
    first_child: u32,
    next_sibling: u32,
}

impl Node {
    const fn leaf(byte: u8) -> Self {
        Self {
            byte,
            num_children: 0,
            count: 1,
            child_total: 0,
            first_child: NIL,
            next_sibling: NIL,
        }
    }
}

/// Arena-backed context trie.
#[derive(Clone, Debug)]
pub struct ContextTrie {
    nodes: Vec<Node>,
}

impl ContextTrie {
    /// Root handle (the empty context).
    pub const ROOT: NodeId = NodeId(0);

    /// Trie holding only the root.
    pub fn new() -> Self {
        let mut root = Node::leaf(0);
        root.count = 0;
        Self { nodes: vec![root] }
    }

    /// Drop every node but the root, keeping the allocation.
    pub fn clear(&mut self) {
        self.nodes.truncate(1);
        let root = &mut self.nodes[0];
        root.num_children = 0;
        root.child_total = 0;
        root.first_child = NIL;
    }

    /// Number of nodes, root included.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether only the root exists.
    pub fn is_empty(&self) -> bool {
        self.nodes.len() == 1
    }

    /// Child of `node` reached by `byte`, found by scanning the sibling chain.
    pub fn child_for(&self, node: NodeId, byte: u8) -> Option<NodeId> {
        let mut cur = self.node(node).first_child;
        while cur != NIL {
            let n = &self.nodes[cur as usize];
            if n.byte == byte {
                return Some(NodeId(cur));
            }
            cur = n.next_sibling;
        }
        None
    }

    /// Follow `path` from the root. `None` on the first missing edge.
    pub fn lookup<I>(&self, path: I) -> Option<NodeId>
    where
        I: IntoIterator<Item = u8>,
    {
        path.into_iter()
            .try_fold(Self::ROOT, |node, byte| self.child_for(node, byte))
    }

    /// Count of `byte` under `node`, 0 if never observed there.
    pub fn count(&self, node: NodeId, byte: u8) -> u32 {
        self.child_for(node, byte)
            .map_or(0, |child| self.node(child).count)
    }

    /// Frequency view over the children of `node`.
    #[inline]
    pub fn table(&self, node: NodeId) -> NodeTable<'_> {
        NodeTable { trie: self, node }
    }

    /// Record one observation of the last byte of `path` after the context
    /// formed by the bytes before it.
    ///
    /// Missing nodes along the context are created; the final transition is
    /// inserted with count 1 or bumped by 1, and the parent table is rescaled
    /// if that pushes it over [`MAX_TOTAL`]. Returns the context node.
    pub fn increment<I>(&mut self, path: I) -> NodeId
    where
        I: IntoIterator<Item = u8>,
    {
        let mut path = path.into_iter().peekable();
        let mut parent = Self::ROOT;
        while let Some(byte) = path.next() {
            if path.peek().is_some() {
                parent = match self.child_for(parent, byte) {
                    Some(child) => child,
                    None => self.insert_child(parent, byte),
                };
                continue;
            }

            match self.child_for(parent, byte) {
                Some(child) => {
                    self.nodes[child.index()].count += 1;
                    self.nodes[parent.index()].child_total += 1;
                }
                None => {
                    self.insert_child(parent, byte);
                }
            }

            let p = self.node(parent);
            if p.child_total + u32::from(p.num_children) > MAX_TOTAL {
                self.rescale(parent);
            }
        }
        parent
    }

    /// Append a new child with count 1 at the end of `parent`'s chain.
    fn insert_child(&mut self, parent: NodeId, byte: u8) -> NodeId {
        debug_assert!(
            self.nodes.len() < u32::MAX as usize,
            "context trie exceeds u32 handles"
        );
        let id = self.nodes.len() as u32;
        self.nodes.push(Node::leaf(byte));

        let p = &mut self.nodes[parent.index()];
        p.num_children += 1;
        p.child_total += 1;
        if p.first_child == NIL {
            p.first_child = id;
        } else {
            let mut cur = p.first_child;
            loop {
                let next = self.nodes[cur as usize].next_sibling;
                if next == NIL {
                    break;
                }
                cur = next;
            }
            self.nodes[cur as usize].next_sibling = id;
        }
        NodeId(id)
    }

    /// Halve every child count of `node`, rounding up so nothing observed
    /// drops to zero.
    fn rescale(&mut self, node: NodeId) {
        let before = self.node(node).child_total;
        let mut total = 0u32;
        let mut cur = self.node(node).first_child;
        while cur != NIL {
            let child = &mut self.nodes[cur as usize];
            child.count = child.count.div_ceil(2);
            debug_assert!(child.count > 0, "rescale zeroed an observed count");
            total += child.count;
            cur = child.next_sibling;
        }
        self.nodes[node.index()].child_total = total;
        trace!("rescaled context node {}: {} -> {}", node.0, before, total);
    }

    #[inline]
    fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }
}

impl Default for ContextTrie {
    fn default() -> Self {
        Self::new()
    }
}

/// Frequency view over the children of one trie node.
///
/// The reserved band is the Method-C escape: one count per visible child,
/// never less than one.
#[derive(Clone, Copy)]
pub struct NodeTable<'a> {
    trie: &'a ContextTrie,
    node: NodeId,
}

impl NodeTable<'_> {
    /// Node this table belongs to.
    pub const fn node(&self) -> NodeId {
        self.node
    }

    /// Children bytes in chain order, ignoring exclusions.
    pub fn bytes(&self) -> impl Iterator<Item = u8> + '_ {
        self.entries().map(|(byte, _)| byte)
    }

    /// Number of children, ignoring exclusions.
    pub fn num_children(&self) -> usize {
        self.trie.node(self.node).num_children as usize
    }

    /// Sum of the children's counts, ignoring exclusions.
    pub fn child_total(&self) -> u32 {
        self.trie.node(self.node).child_total
    }

    /// Escape-inclusive total, answered from the cached sum when nothing is
    /// excluded.
    pub fn fast_total(&self, excluded: &ExclusionSet) -> u32 {
        if excluded.is_empty() {
            let n = self.trie.node(self.node);
            n.child_total + u32::from(n.num_children).max(1)
        } else {
            self.total(excluded)
        }
    }
}

impl Frequencies for NodeTable<'_> {
    fn entries(&self) -> impl Iterator<Item = (u8, u32)> + '_ {
        let nodes = &self.trie.nodes;
        let mut cur = nodes[self.node.index()].first_child;
        std::iter::from_fn(move || {
            if cur == NIL {
                return None;
            }
            let n = &nodes[cur as usize];
            cur = n.next_sibling;
            Some((n.byte, n.count))
        })
    }

    fn reserved_weight(&self, distinct: u32) -> u32 {
        distinct.max(1)
    }
}
