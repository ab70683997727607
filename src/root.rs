use std::{borrow::Borrow, cmp::Ordering::*, ptr::NonNull};

use log::trace;

use super::{Color, ComingFrom, Node, NodePtr, NodePtrExt, Root};

// Public
impl<K> Root<K> {
    pub const fn new() -> Self {
        Root { root: None }
    }

    #[inline(always)]
    pub fn root(&self) -> NodePtr<K> {
        self.root
    }

    /// Forgets every node; the caller is responsible for freeing them.
    pub fn take(&mut self) -> NodePtr<K> {
        self.root.take()
    }

    pub fn first(&self) -> NodePtr<K> {
        self.root.map(Node::minimum)
    }

    pub fn last(&self) -> NodePtr<K> {
        self.root.map(Node::maximum)
    }

    /// Descends from the root; an equal key stops the walk.
    pub fn find<Q>(&self, key: &Q) -> NodePtr<K>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let mut node = self.root;
        while let Some(candidate) = node {
            // SAFETY: links reachable from the root point to live nodes.
            let candidate = unsafe { candidate.as_ref() };
            match key.cmp(candidate.key().borrow()) {
                Equal => break,
                Less => node = candidate.left,
                Greater => node = candidate.right,
            }
        }
        node
    }

    /// Hangs a detached node under `parent` on the given side, or makes it
    /// the root when `parent` is the sentinel.
    pub fn link(&mut self, node: NonNull<Node<K>>, parent: NodePtr<K>, direction: ComingFrom) {
        let mut node: NodePtr<K> = Some(node);
        node.set_parent(parent);
        node.set_left(None);
        node.set_right(None);
        match (parent, direction) {
            (None, _) => self.root = node,
            (mut parent, ComingFrom::Left) => parent.set_left(node),
            (mut parent, ComingFrom::Right) => parent.set_right(node),
        }
    }

    /// Restores the red-black properties after `node` was linked as a red
    /// leaf.
    pub fn insert(&mut self, node: NonNull<Node<K>>) {
        let mut node: NodePtr<K> = Some(node);

        if node.parent().is_none() {
            // First node of the tree.
            node.set_color(Color::Black);
            return;
        }
        if node.parent().parent().is_none() {
            // Child of a black root.
            return;
        }

        while node.parent().is_red() {
            /*
             * Loop invariant: node is red. Its parent is red too, so the
             * parent is not the root and the grandparent exists.
             */
            let mut parent = node.parent();
            let mut gparent = parent.parent();

            if parent == gparent.left() {
                let mut uncle = gparent.right();
                if uncle.is_red() {
                    /*
                     * Case 1 - node's uncle is red (color flips).
                     *
                     *       G            g
                     *      / \          / \
                     *     p   u  -->   P   U
                     *    /            /
                     *   n            n
                     *
                     * g's parent might be red, carry on from g.
                     */
                    trace!("insert fixup: red uncle on the right, recoloring");
                    uncle.set_color(Color::Black);
                    parent.set_color(Color::Black);
                    gparent.set_color(Color::Red);
                    node = gparent;
                } else {
                    if node == parent.right() {
                        /*
                         * Case 2 - triangle (left rotate at parent).
                         *
                         *      G             G
                         *     / \           / \
                         *    p   U  -->    n   U
                         *     \           /
                         *      n         p
                         *
                         * The old parent is now the bottom of a line.
                         */
                        trace!("insert fixup: left-right triangle");
                        node = parent;
                        self.rotate_left(node);
                        parent = node.parent();
                        gparent = parent.parent();
                    }
                    /*
                     * Case 3 - line (right rotate at gparent).
                     *
                     *        G           P
                     *       / \         / \
                     *      p   U  -->  n   g
                     *     /                 \
                     *    n                   U
                     */
                    trace!("insert fixup: left-left line");
                    parent.set_color(Color::Black);
                    gparent.set_color(Color::Red);
                    self.rotate_right(gparent);
                }
            } else {
                let mut uncle = gparent.left();
                if uncle.is_red() {
                    /* Case 1 - color flips */
                    trace!("insert fixup: red uncle on the left, recoloring");
                    uncle.set_color(Color::Black);
                    parent.set_color(Color::Black);
                    gparent.set_color(Color::Red);
                    node = gparent;
                } else {
                    if node == parent.left() {
                        /* Case 2 - right rotate at parent */
                        trace!("insert fixup: right-left triangle");
                        node = parent;
                        self.rotate_right(node);
                        parent = node.parent();
                        gparent = parent.parent();
                    }
                    /* Case 3 - left rotate at gparent */
                    trace!("insert fixup: right-right line");
                    parent.set_color(Color::Black);
                    gparent.set_color(Color::Red);
                    self.rotate_left(gparent);
                }
            }

            if node == self.root {
                break;
            }
        }

        self.root.set_color(Color::Black);
    }

    /// Splices `node` out of the tree and rebalances. The node itself is
    /// left allocated for the caller to reclaim.
    pub fn erase(&mut self, node: NonNull<Node<K>>) {
        let mut node: NodePtr<K> = Some(node);
        let mut removed_color = node.color();
        // The node that inherits the missing black, and its parent: the
        // former may be the sentinel, which carries no parent link.
        let child;
        let parent;

        if node.left().is_none() {
            /*
             * Case 1: no left child, the right one (maybe the sentinel)
             * takes node's place.
             */
            child = node.right();
            parent = node.parent();
            self.transplant(node, child);
        } else if node.right().is_none() {
            /* Still case 1, but this time the child is node->left */
            child = node.left();
            parent = node.parent();
            self.transplant(node, child);
        } else {
            /*
             * Case 2: two children, the in-order successor s takes node's
             * place and color; c is what moves into s's old slot.
             *
             *    (n)          (s)
             *    / \          / \
             *  (x) (y)  ->  (x) (y)
             *      /            /
             *    (s)          (c)
             *      \
             *      (c)
             */
            let mut successor = node.right().map(Node::minimum);
            removed_color = successor.color();
            child = successor.right();

            if successor.parent() == node {
                parent = successor;
            } else {
                parent = successor.parent();
                self.transplant(successor, child);
                let mut right = node.right();
                successor.set_right(right);
                right.set_parent(successor);
            }

            self.transplant(node, successor);
            let mut left = node.left();
            successor.set_left(left);
            left.set_parent(successor);
            successor.set_color(node.color());
        }

        node.set_left(None);
        node.set_right(None);
        node.set_parent(None);

        if removed_color == Color::Black {
            self.erase_fixup(child, parent);
        }
    }
}

// Private

impl<K> Root<K> {
    /// Pays back the black that left the path through `node`, whose parent
    /// is `parent`.
    fn erase_fixup(&mut self, mut node: NodePtr<K>, mut parent: NodePtr<K>) {
        while node != self.root && node.is_black() {
            /*
             * Loop invariants:
             * - node is black (or the sentinel)
             * - node is not the root, so parent is not the sentinel
             * - paths through node hold one black less than every other path
             *   through parent, so the sibling is never the sentinel.
             */
            if node == parent.left() {
                let mut sibling = parent.right();
                if sibling.is_red() {
                    /*
                     * Case 1 - left rotate at parent
                     *
                     *     P               S
                     *    / \             / \
                     *   N   s    -->    p   Sr
                     *      / \         / \
                     *     Sl  Sr      N   Sl
                     */
                    trace!("erase fixup: red sibling on the right");
                    sibling.set_color(Color::Black);
                    parent.set_color(Color::Red);
                    self.rotate_left(parent);
                    sibling = parent.right();
                }

                if sibling.left().is_black() && sibling.right().is_black() {
                    /*
                     * Case 2 - sibling color flip
                     *
                     *    (p)           (p)
                     *    / \           / \
                     *   N   S    -->  N   s
                     *      / \           / \
                     *     Sl  Sr        Sl  Sr
                     *
                     * The missing black moves up to p.
                     */
                    trace!("erase fixup: black nephews on the right, moving up");
                    sibling.set_color(Color::Red);
                    node = parent;
                    parent = node.parent();
                } else {
                    if sibling.right().is_black() {
                        /*
                         * Case 3 - right rotate at sibling
                         *
                         *   (p)           (p)
                         *   / \           / \
                         *  N   S    -->  N   Sl
                         *     / \             \
                         *    sl  Sr            s
                         *                       \
                         *                        Sr
                         */
                        trace!("erase fixup: red near nephew on the right");
                        let mut near = sibling.left();
                        near.set_color(Color::Black);
                        sibling.set_color(Color::Red);
                        self.rotate_right(sibling);
                        sibling = parent.right();
                    }
                    /*
                     * Case 4 - left rotate at parent + color flips
                     *
                     *      (p)             (s)
                     *      / \             / \
                     *     N   S     -->   P   Sr
                     *        / \         / \
                     *      (sl) sr      N  (sl)
                     */
                    trace!("erase fixup: red far nephew on the right");
                    sibling.set_color(parent.color());
                    parent.set_color(Color::Black);
                    let mut far = sibling.right();
                    far.set_color(Color::Black);
                    self.rotate_left(parent);
                    node = self.root;
                    parent = None;
                }
            } else {
                let mut sibling = parent.left();
                if sibling.is_red() {
                    /* Case 1 - right rotate at parent */
                    trace!("erase fixup: red sibling on the left");
                    sibling.set_color(Color::Black);
                    parent.set_color(Color::Red);
                    self.rotate_right(parent);
                    sibling = parent.left();
                }

                if sibling.left().is_black() && sibling.right().is_black() {
                    /* Case 2 - sibling color flip */
                    trace!("erase fixup: black nephews on the left, moving up");
                    sibling.set_color(Color::Red);
                    node = parent;
                    parent = node.parent();
                } else {
                    if sibling.left().is_black() {
                        /* Case 3 - left rotate at sibling */
                        trace!("erase fixup: red near nephew on the left");
                        let mut near = sibling.right();
                        near.set_color(Color::Black);
                        sibling.set_color(Color::Red);
                        self.rotate_left(sibling);
                        sibling = parent.left();
                    }
                    /* Case 4 - right rotate at parent + color flips */
                    trace!("erase fixup: red far nephew on the left");
                    sibling.set_color(parent.color());
                    parent.set_color(Color::Black);
                    let mut far = sibling.left();
                    far.set_color(Color::Black);
                    self.rotate_right(parent);
                    node = self.root;
                    parent = None;
                }
            }
        }

        node.set_color(Color::Black);
    }

    /// Promotes `node`'s right child into `node`'s place.
    ///
    /// ```text
    ///     n               r
    ///    / \             / \
    ///   a   r    -->    n   c
    ///      / \         / \
    ///     b   c       a   b
    /// ```
    pub(crate) fn rotate_left(&mut self, mut node: NodePtr<K>) {
        let mut pivot = node.right();
        debug_assert!(pivot.is_some(), "left rotation needs a right child");

        let mut inner = pivot.left();
        node.set_right(inner);
        inner.set_parent(node);

        let parent = node.parent();
        pivot.set_parent(parent);
        self.change_child(node, pivot, parent);

        pivot.set_left(node);
        node.set_parent(pivot);
    }

    /// Promotes `node`'s left child into `node`'s place.
    ///
    /// ```text
    ///       n           l
    ///      / \         / \
    ///     l   c  -->  a   n
    ///    / \             / \
    ///   a   b           b   c
    /// ```
    pub(crate) fn rotate_right(&mut self, mut node: NodePtr<K>) {
        let mut pivot = node.left();
        debug_assert!(pivot.is_some(), "right rotation needs a left child");

        let mut inner = pivot.right();
        node.set_left(inner);
        inner.set_parent(node);

        let parent = node.parent();
        pivot.set_parent(parent);
        self.change_child(node, pivot, parent);

        pivot.set_right(node);
        node.set_parent(pivot);
    }

    /// Puts the subtree `new` where `old` hangs.
    fn transplant(&mut self, old: NodePtr<K>, mut new: NodePtr<K>) {
        let parent = old.parent();
        self.change_child(old, new, parent);
        new.set_parent(parent);
    }

    fn change_child(&mut self, old: NodePtr<K>, new: NodePtr<K>, mut parent: NodePtr<K>) {
        if parent.is_none() {
            self.root = new;
        } else if parent.left() == old {
            parent.set_left(new);
        } else {
            parent.set_right(new);
        }
    }
}

#[cfg(test)]
mod test {
    use crate::{Color, NodePtrExt, RBTree, test_utils::init_logging};
    use pretty_assertions::assert_eq;

    fn tree_of(keys: &[i32]) -> RBTree<i32> {
        init_logging();
        keys.iter().copied().collect()
    }

    fn root_key(tree: &RBTree<i32>) -> Option<i32> {
        tree.root
            .root()
            .map(|root| *unsafe { root.as_ref() }.key())
    }

    #[test]
    fn rotations_are_inverse() {
        let mut tree = tree_of(&[2, 1, 3]);
        let before = tree.to_string();

        let root = tree.root.root();
        tree.root.rotate_left(root);
        assert_eq!(Some(3), root_key(&tree));
        assert_eq!(
            "R----3(RED)\n     L----2(BLACK)\n     |    L----1(RED)\n",
            tree.to_string()
        );

        let root = tree.root.root();
        tree.root.rotate_right(root);
        assert_eq!(Some(2), root_key(&tree));
        assert_eq!(before, tree.to_string());
        assert_eq!(Ok(1), tree.validate());
    }

    #[test]
    fn rotation_keeps_parent_links() {
        let mut tree = tree_of(&(1..=7).collect::<Vec<_>>());
        let root = tree.root.root();
        tree.root.rotate_right(root);
        tree.root.rotate_left(tree.root.root());
        // Colors are untouched by rotations, so the tree must be valid again.
        assert!(tree.validate().is_ok());
        assert_eq!(None, tree.root.root().parent());
    }

    #[test]
    fn insert_line_on_the_right() {
        let tree = tree_of(&[1, 2, 3]);
        assert_eq!(
            "R----2(BLACK)\n     L----1(RED)\n     R----3(RED)\n",
            tree.to_string()
        );
    }

    #[test]
    fn insert_line_on_the_left() {
        let tree = tree_of(&[3, 2, 1]);
        assert_eq!(
            "R----2(BLACK)\n     L----1(RED)\n     R----3(RED)\n",
            tree.to_string()
        );
    }

    #[test]
    fn insert_triangle_on_the_left() {
        let tree = tree_of(&[3, 1, 2]);
        assert_eq!(
            "R----2(BLACK)\n     L----1(RED)\n     R----3(RED)\n",
            tree.to_string()
        );
    }

    #[test]
    fn insert_triangle_on_the_right() {
        let tree = tree_of(&[1, 3, 2]);
        assert_eq!(
            "R----2(BLACK)\n     L----1(RED)\n     R----3(RED)\n",
            tree.to_string()
        );
    }

    #[test]
    fn insert_red_uncle_recolors() {
        let tree = tree_of(&[2, 1, 3, 4]);
        assert_eq!(
            concat!(
                "R----2(BLACK)\n",
                "     L----1(BLACK)\n",
                "     R----3(BLACK)\n",
                "          R----4(RED)\n",
            ),
            tree.to_string()
        );
    }

    #[test]
    fn erase_red_leaf_skips_fixup() {
        let mut tree = tree_of(&[2, 1, 3, 4]);
        assert_eq!(Ok(4), tree.remove(&4));
        assert_eq!(
            "R----2(BLACK)\n     L----1(BLACK)\n     R----3(BLACK)\n",
            tree.to_string()
        );
    }

    #[test]
    fn erase_with_red_far_nephew() {
        let mut tree = tree_of(&[2, 1, 3, 4]);
        assert_eq!(Ok(1), tree.remove(&1));
        assert_eq!(
            "R----3(BLACK)\n     L----2(BLACK)\n     R----4(BLACK)\n",
            tree.to_string()
        );
    }

    #[test]
    fn erase_with_red_near_nephew() {
        let mut tree = tree_of(&[2, 1, 4, 3]);
        assert_eq!(Ok(1), tree.remove(&1));
        assert_eq!(
            "R----3(BLACK)\n     L----2(BLACK)\n     R----4(BLACK)\n",
            tree.to_string()
        );
    }

    #[test]
    fn erase_with_red_near_nephew_on_the_left() {
        let mut tree = tree_of(&[3, 4, 1, 2]);
        assert_eq!(Ok(4), tree.remove(&4));
        assert_eq!(
            "R----2(BLACK)\n     L----1(BLACK)\n     R----3(BLACK)\n",
            tree.to_string()
        );
    }

    #[test]
    fn erase_with_red_sibling() {
        let mut tree = tree_of(&[1, 2, 3, 4, 5, 6]);
        assert_eq!(
            concat!(
                "R----2(BLACK)\n",
                "     L----1(BLACK)\n",
                "     R----4(RED)\n",
                "          L----3(BLACK)\n",
                "          R----5(BLACK)\n",
                "               R----6(RED)\n",
            ),
            tree.to_string()
        );

        assert_eq!(Ok(1), tree.remove(&1));
        assert_eq!(
            concat!(
                "R----4(BLACK)\n",
                "     L----2(BLACK)\n",
                "     |    R----3(RED)\n",
                "     R----5(BLACK)\n",
                "          R----6(RED)\n",
            ),
            tree.to_string()
        );
        assert!(tree.validate().is_ok());
    }

    #[test]
    fn erase_black_nephews_push_up_to_root() {
        let mut tree = tree_of(&[2, 1, 3, 4]);
        tree.remove(&4).unwrap();
        // 2B(1B, 3B): removing a black leaf recolors its sibling and the
        // deficit reaches the root.
        assert_eq!(Ok(3), tree.remove(&3));
        assert_eq!("R----2(BLACK)\n     L----1(RED)\n", tree.to_string());
        assert_eq!(Ok(1), tree.validate());
    }

    #[test]
    fn erase_node_with_two_children() {
        let mut tree = tree_of(&[2, 1, 3]);
        assert_eq!(Ok(2), tree.remove(&2));
        assert_eq!("R----3(BLACK)\n     L----1(RED)\n", tree.to_string());

        let mut tree = tree_of(&[1, 2, 3, 4, 5, 6]);
        // 4 has children 3 and 5; 5 is its direct right child.
        assert_eq!(Ok(4), tree.remove(&4));
        assert!(tree.validate().is_ok());

        let mut tree = tree_of(&[2, 1, 4, 3]);
        // The successor of 2 is 3, deeper than 2's right child.
        assert_eq!(Ok(2), tree.remove(&2));
        assert_eq!(
            "R----3(BLACK)\n     L----1(BLACK)\n     R----4(BLACK)\n",
            tree.to_string()
        );
    }

    #[test]
    fn erase_last_node_empties_root() {
        let mut tree = tree_of(&[42]);
        assert_eq!(Ok(42), tree.remove(&42));
        assert_eq!(None, tree.root.root());
        assert_eq!(Color::Black, tree.root.root().color());
    }
}
