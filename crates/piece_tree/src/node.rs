use std::ops::{Index, IndexMut};

use crate::piece::Piece;

pub(crate) type NodeId = usize;

/// Reserved arena slot standing in for every null link and the root's parent.
/// It is black and its fields are never written.
pub(crate) const SENTINEL: NodeId = 0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum NodeColor {
    Red,
    Black,
}

#[derive(Debug, Clone)]
pub(crate) struct TreeNode {
    pub piece: Piece,
    pub color: NodeColor,
    pub parent: NodeId,
    pub left: NodeId,
    pub right: NodeId,
    pub size_left: usize,
    pub lf_left: usize,
}

impl TreeNode {
    fn new(piece: Piece, color: NodeColor) -> Self {
        Self {
            piece,
            color,
            parent: SENTINEL,
            left: SENTINEL,
            right: SENTINEL,
            size_left: 0,
            lf_left: 0,
        }
    }
}

/// Owns every node of one tree. Freed slots are recycled.
#[derive(Debug, Clone)]
pub(crate) struct NodeArena {
    nodes: Vec<TreeNode>,
    free: Vec<NodeId>,
}

impl NodeArena {
    pub fn new() -> Self {
        Self {
            nodes: vec![TreeNode::new(Piece::default(), NodeColor::Black)],
            free: Vec::new(),
        }
    }

    /// New red, unlinked node.
    pub fn alloc(&mut self, piece: Piece) -> NodeId {
        let node = TreeNode::new(piece, NodeColor::Red);
        match self.free.pop() {
            Some(id) => {
                self.nodes[id] = node;
                id
            }
            None => {
                self.nodes.push(node);
                self.nodes.len() - 1
            }
        }
    }

    pub fn release(&mut self, id: NodeId) {
        debug_assert_ne!(id, SENTINEL);
        self.nodes[id] = TreeNode::new(Piece::default(), NodeColor::Black);
        self.free.push(id);
    }

    pub fn color(&self, id: NodeId) -> NodeColor {
        self.nodes[id].color
    }

    pub fn set_color(&mut self, id: NodeId, color: NodeColor) {
        if id != SENTINEL {
            self.nodes[id].color = color;
        }
    }

    pub fn live_count(&self) -> usize {
        self.nodes.len() - 1 - self.free.len()
    }
}

impl Index<NodeId> for NodeArena {
    type Output = TreeNode;

    fn index(&self, id: NodeId) -> &TreeNode {
        &self.nodes[id]
    }
}

impl IndexMut<NodeId> for NodeArena {
    fn index_mut(&mut self, id: NodeId) -> &mut TreeNode {
        debug_assert_ne!(id, SENTINEL, "the sentinel is never written");
        &mut self.nodes[id]
    }
}
