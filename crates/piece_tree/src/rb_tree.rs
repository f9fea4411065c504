//! Red-black maintenance for [`PieceTree`].
//!
//! Every structural change goes through `rb_insert_left`, `rb_insert_right`,
//! `rb_delete` or `set_piece`, which keep `size_left`/`lf_left` and the
//! tree's cached length and line count exact.

use crate::PieceTree;
use crate::node::{NodeColor, NodeId, SENTINEL};
use crate::piece::Piece;

impl PieceTree {
    pub(crate) fn leftmost(&self, mut x: NodeId) -> NodeId {
        while self.nodes[x].left != SENTINEL {
            x = self.nodes[x].left;
        }
        x
    }

    pub(crate) fn rightmost(&self, mut x: NodeId) -> NodeId {
        while self.nodes[x].right != SENTINEL {
            x = self.nodes[x].right;
        }
        x
    }

    /// In-order successor, or `SENTINEL` past the last node.
    pub(crate) fn next(&self, x: NodeId) -> NodeId {
        if self.nodes[x].right != SENTINEL {
            return self.leftmost(self.nodes[x].right);
        }
        let mut node = x;
        let mut parent = self.nodes[x].parent;
        while parent != SENTINEL && self.nodes[parent].right == node {
            node = parent;
            parent = self.nodes[parent].parent;
        }
        parent
    }

    /// In-order predecessor, or `SENTINEL` before the first node.
    pub(crate) fn prev(&self, x: NodeId) -> NodeId {
        if self.nodes[x].left != SENTINEL {
            return self.rightmost(self.nodes[x].left);
        }
        let mut node = x;
        let mut parent = self.nodes[x].parent;
        while parent != SENTINEL && self.nodes[parent].left == node {
            node = parent;
            parent = self.nodes[parent].parent;
        }
        parent
    }

    /// Replaces the piece held by `node`, propagating the size and line-feed
    /// deltas to its ancestors and to the cached totals.
    pub(crate) fn set_piece(&mut self, node: NodeId, piece: Piece) {
        let old = self.nodes[node].piece;
        self.nodes[node].piece = piece;

        let size_delta = delta(old.length, piece.length);
        let lf_delta = delta(old.line_feed_cnt, piece.line_feed_cnt);
        self.update_tree_metadata(node, size_delta, lf_delta);
        self.length = self.length.wrapping_add_signed(size_delta);
        self.line_count = self.line_count.wrapping_add_signed(lf_delta);
    }

    /// Inserts `piece` immediately after `node` in document order. With an
    /// empty tree the piece becomes the root.
    pub(crate) fn rb_insert_right(&mut self, node: NodeId, piece: Piece) -> NodeId {
        let z = self.nodes.alloc(piece);
        if self.root == SENTINEL {
            self.make_root(z);
            return z;
        }

        if self.nodes[node].right == SENTINEL {
            self.nodes[node].right = z;
            self.nodes[z].parent = node;
        } else {
            let next = self.leftmost(self.nodes[node].right);
            self.nodes[next].left = z;
            self.nodes[z].parent = next;
        }
        self.attach(z);
        z
    }

    /// Inserts `piece` immediately before `node` in document order.
    pub(crate) fn rb_insert_left(&mut self, node: NodeId, piece: Piece) -> NodeId {
        let z = self.nodes.alloc(piece);
        if self.root == SENTINEL {
            self.make_root(z);
            return z;
        }

        if self.nodes[node].left == SENTINEL {
            self.nodes[node].left = z;
            self.nodes[z].parent = node;
        } else {
            let prev = self.rightmost(self.nodes[node].left);
            self.nodes[prev].right = z;
            self.nodes[z].parent = prev;
        }
        self.attach(z);
        z
    }

    fn make_root(&mut self, z: NodeId) {
        self.root = z;
        self.nodes.set_color(z, NodeColor::Black);
        let piece = self.nodes[z].piece;
        self.length += piece.length;
        self.line_count += piece.line_feed_cnt;
    }

    fn attach(&mut self, z: NodeId) {
        let piece = self.nodes[z].piece;
        self.update_tree_metadata(z, piece.length as isize, piece.line_feed_cnt as isize);
        self.fix_insert(z);
        self.length += piece.length;
        self.line_count += piece.line_feed_cnt;
    }

    /// Removes `z` from the tree and frees its slot. Other node ids stay valid:
    /// a node with two children is replaced by relinking its successor into
    /// its place rather than by moving pieces between nodes.
    pub(crate) fn rb_delete(&mut self, z: NodeId) {
        let removed = self.nodes[z].piece;
        let (z_left, z_right) = (self.nodes[z].left, self.nodes[z].right);

        let y = if z_left == SENTINEL || z_right == SENTINEL {
            z
        } else {
            self.leftmost(z_right)
        };
        let x = if self.nodes[y].left != SENTINEL {
            self.nodes[y].left
        } else {
            self.nodes[y].right
        };

        let x_parent;
        let removed_color;
        if y == z {
            self.update_tree_metadata(
                z,
                -(removed.length as isize),
                -(removed.line_feed_cnt as isize),
            );
            removed_color = self.nodes.color(z);
            x_parent = self.nodes[z].parent;
            self.transplant(z, x);
        } else {
            let successor = self.nodes[y].piece;
            // Detach the successor: only the nodes between it and `z` lose it.
            self.update_tree_metadata_until(
                y,
                z,
                -(successor.length as isize),
                -(successor.line_feed_cnt as isize),
            );
            // Above `z`, the subtree only loses `z`'s own piece.
            self.update_tree_metadata(
                z,
                -(removed.length as isize),
                -(removed.line_feed_cnt as isize),
            );

            removed_color = self.nodes.color(y);
            let y_parent = self.nodes[y].parent;
            if y_parent == z {
                x_parent = y;
            } else {
                x_parent = y_parent;
                self.transplant(y, x);
                self.nodes[y].right = z_right;
                self.nodes[z_right].parent = y;
            }

            self.transplant(z, y);
            self.nodes[y].left = z_left;
            self.nodes[z_left].parent = y;
            let z_color = self.nodes.color(z);
            self.nodes.set_color(y, z_color);
            self.nodes[y].size_left = self.nodes[z].size_left;
            self.nodes[y].lf_left = self.nodes[z].lf_left;
        }

        self.nodes.release(z);
        self.length -= removed.length;
        self.line_count -= removed.line_feed_cnt;

        if removed_color == NodeColor::Black {
            self.delete_fixup(x, x_parent);
        }
    }

    /// Puts `v` where `u` hangs from its parent.
    fn transplant(&mut self, u: NodeId, v: NodeId) {
        let parent = self.nodes[u].parent;
        if parent == SENTINEL {
            self.root = v;
        } else if self.nodes[parent].left == u {
            self.nodes[parent].left = v;
        } else {
            self.nodes[parent].right = v;
        }
        if v != SENTINEL {
            self.nodes[v].parent = parent;
        }
    }

    /// Adds the deltas to every ancestor holding `x` in its left subtree.
    fn update_tree_metadata(
        &mut self,
        x: NodeId,
        size_delta: isize,
        lf_delta: isize,
    ) {
        self.update_tree_metadata_until(x, SENTINEL, size_delta, lf_delta);
    }

    /// Like [`Self::update_tree_metadata`] but stops once `end` is reached.
    fn update_tree_metadata_until(
        &mut self,
        mut x: NodeId,
        end: NodeId,
        size_delta: isize,
        lf_delta: isize,
    ) {
        if size_delta == 0 && lf_delta == 0 {
            return;
        }
        while x != end && x != self.root && x != SENTINEL {
            let parent = self.nodes[x].parent;
            if self.nodes[parent].left == x {
                let p = &mut self.nodes[parent];
                p.size_left = p.size_left.wrapping_add_signed(size_delta);
                p.lf_left = p.lf_left.wrapping_add_signed(lf_delta);
            }
            x = parent;
        }
    }

    fn left_rotate(&mut self, x: NodeId) {
        let y = self.nodes[x].right;
        let (x_size, x_lf) = self.subtree_prefix(x);
        self.nodes[y].size_left += x_size;
        self.nodes[y].lf_left += x_lf;

        let y_left = self.nodes[y].left;
        self.nodes[x].right = y_left;
        if y_left != SENTINEL {
            self.nodes[y_left].parent = x;
        }
        self.transplant(x, y);
        self.nodes[y].left = x;
        self.nodes[x].parent = y;
    }

    fn right_rotate(&mut self, y: NodeId) {
        let x = self.nodes[y].left;
        let (x_size, x_lf) = self.subtree_prefix(x);
        self.nodes[y].size_left -= x_size;
        self.nodes[y].lf_left -= x_lf;

        let x_right = self.nodes[x].right;
        self.nodes[y].left = x_right;
        if x_right != SENTINEL {
            self.nodes[x_right].parent = y;
        }
        self.transplant(y, x);
        self.nodes[x].right = y;
        self.nodes[y].parent = x;
    }

    /// Size and line feeds of `x`'s left subtree plus `x` itself.
    fn subtree_prefix(&self, x: NodeId) -> (usize, usize) {
        let node = &self.nodes[x];
        (
            node.size_left + node.piece.length,
            node.lf_left + node.piece.line_feed_cnt,
        )
    }

    fn fix_insert(&mut self, mut k: NodeId) {
        while k != self.root && self.nodes.color(self.nodes[k].parent) == NodeColor::Red {
            let parent = self.nodes[k].parent;
            let grand = self.nodes[parent].parent;

            if parent == self.nodes[grand].left {
                let uncle = self.nodes[grand].right;
                if self.nodes.color(uncle) == NodeColor::Red {
                    self.nodes.set_color(parent, NodeColor::Black);
                    self.nodes.set_color(uncle, NodeColor::Black);
                    self.nodes.set_color(grand, NodeColor::Red);
                    k = grand;
                } else {
                    if k == self.nodes[parent].right {
                        k = parent;
                        self.left_rotate(k);
                    }
                    let parent = self.nodes[k].parent;
                    let grand = self.nodes[parent].parent;
                    self.nodes.set_color(parent, NodeColor::Black);
                    self.nodes.set_color(grand, NodeColor::Red);
                    self.right_rotate(grand);
                }
            } else {
                let uncle = self.nodes[grand].left;
                if self.nodes.color(uncle) == NodeColor::Red {
                    self.nodes.set_color(parent, NodeColor::Black);
                    self.nodes.set_color(uncle, NodeColor::Black);
                    self.nodes.set_color(grand, NodeColor::Red);
                    k = grand;
                } else {
                    if k == self.nodes[parent].left {
                        k = parent;
                        self.right_rotate(k);
                    }
                    let parent = self.nodes[k].parent;
                    let grand = self.nodes[parent].parent;
                    self.nodes.set_color(parent, NodeColor::Black);
                    self.nodes.set_color(grand, NodeColor::Red);
                    self.left_rotate(grand);
                }
            }
        }
        self.nodes.set_color(self.root, NodeColor::Black);
    }

    /// `x` may be the sentinel, so its parent is tracked in `parent`.
    fn delete_fixup(&mut self, mut x: NodeId, mut parent: NodeId) {
        while x != self.root && self.nodes.color(x) == NodeColor::Black {
            if x == self.nodes[parent].left {
                let mut w = self.nodes[parent].right;
                if self.nodes.color(w) == NodeColor::Red {
                    self.nodes.set_color(w, NodeColor::Black);
                    self.nodes.set_color(parent, NodeColor::Red);
                    self.left_rotate(parent);
                    w = self.nodes[parent].right;
                }
                if self.nodes.color(self.nodes[w].left) == NodeColor::Black
                    && self.nodes.color(self.nodes[w].right) == NodeColor::Black
                {
                    self.nodes.set_color(w, NodeColor::Red);
                    x = parent;
                    parent = self.nodes[x].parent;
                } else {
                    if self.nodes.color(self.nodes[w].right) == NodeColor::Black {
                        let w_left = self.nodes[w].left;
                        self.nodes.set_color(w_left, NodeColor::Black);
                        self.nodes.set_color(w, NodeColor::Red);
                        self.right_rotate(w);
                        w = self.nodes[parent].right;
                    }
                    let parent_color = self.nodes.color(parent);
                    self.nodes.set_color(w, parent_color);
                    self.nodes.set_color(parent, NodeColor::Black);
                    let w_right = self.nodes[w].right;
                    self.nodes.set_color(w_right, NodeColor::Black);
                    self.left_rotate(parent);
                    x = self.root;
                }
            } else {
                let mut w = self.nodes[parent].left;
                if self.nodes.color(w) == NodeColor::Red {
                    self.nodes.set_color(w, NodeColor::Black);
                    self.nodes.set_color(parent, NodeColor::Red);
                    self.right_rotate(parent);
                    w = self.nodes[parent].left;
                }
                if self.nodes.color(self.nodes[w].right) == NodeColor::Black
                    && self.nodes.color(self.nodes[w].left) == NodeColor::Black
                {
                    self.nodes.set_color(w, NodeColor::Red);
                    x = parent;
                    parent = self.nodes[x].parent;
                } else {
                    if self.nodes.color(self.nodes[w].left) == NodeColor::Black {
                        let w_right = self.nodes[w].right;
                        self.nodes.set_color(w_right, NodeColor::Black);
                        self.nodes.set_color(w, NodeColor::Red);
                        self.left_rotate(w);
                        w = self.nodes[parent].left;
                    }
                    let parent_color = self.nodes.color(parent);
                    self.nodes.set_color(w, parent_color);
                    self.nodes.set_color(parent, NodeColor::Black);
                    let w_left = self.nodes[w].left;
                    self.nodes.set_color(w_left, NodeColor::Black);
                    self.right_rotate(parent);
                    x = self.root;
                }
            }
        }
        self.nodes.set_color(x, NodeColor::Black);
    }
}

fn delta(old: usize, new: usize) -> isize {
    new as isize - old as isize
}
