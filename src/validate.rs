use std::cmp::max;

use crate::{InvariantViolation, Node, NodePtr, NodePtrExt, RBTree};

impl<K> RBTree<K> {
    /// Number of nodes on the longest path from the root down to the
    /// sentinel; 0 when empty.
    pub fn height(&self) -> usize {
        fn height_of<K>(node: NodePtr<K>) -> usize {
            match node {
                None => 0,
                Some(n) => {
                    // SAFETY: links reachable from the root point to live nodes.
                    let n = unsafe { n.as_ref() };
                    1 + max(height_of(n.left), height_of(n.right))
                }
            }
        }
        height_of(self.root.root())
    }

    /// Black nodes on the leftmost path, root included.
    pub fn black_height(&self) -> usize {
        let mut node = self.root.root();
        let mut blacks = 0;
        while node.is_some() {
            if node.is_black() {
                blacks += 1;
            }
            node = node.left();
        }
        blacks
    }
}

impl<K: Ord> RBTree<K> {
    /// Walks the whole tree and checks the red-black properties, search
    /// order, parent links and the length counter.
    ///
    /// Returns the black-height of the root: black nodes on every path from
    /// the root to the sentinel, root included.
    pub fn validate(&self) -> Result<usize, InvariantViolation> {
        let root = self.root.root();
        if root.is_red() {
            return Err(InvariantViolation::RedRoot);
        }
        if root.parent().is_some() {
            return Err(InvariantViolation::BrokenParentLink);
        }
        let mut found = 0;
        let blacks = Self::validate_subtree(root, None, None, &mut found)?;
        if found != self.len {
            return Err(InvariantViolation::LengthMismatch {
                expected: self.len,
                found,
            });
        }
        Ok(blacks)
    }

    /// `low` and `high` are the keys of the closest ancestors this subtree
    /// hangs right and left of, respectively.
    fn validate_subtree(
        node: NodePtr<K>,
        low: Option<&K>,
        high: Option<&K>,
        found: &mut usize,
    ) -> Result<usize, InvariantViolation> {
        let Some(n) = node else {
            return Ok(0);
        };
        *found += 1;
        // SAFETY: links reachable from the root point to live nodes.
        let n: &Node<K> = unsafe { n.as_ref() };

        if low.is_some_and(|low| n.key() < low) || high.is_some_and(|high| n.key() > high) {
            return Err(InvariantViolation::Unordered);
        }
        if n.is_red() && (n.left.is_red() || n.right.is_red()) {
            return Err(InvariantViolation::ConsecutiveReds);
        }
        if n.left.parent() != n.left.and(node) || n.right.parent() != n.right.and(node) {
            return Err(InvariantViolation::BrokenParentLink);
        }

        let left = Self::validate_subtree(n.left, low, Some(n.key()), found)?;
        let right = Self::validate_subtree(n.right, Some(n.key()), high, found)?;
        if left != right {
            return Err(InvariantViolation::UnbalancedBlacks { left, right });
        }
        Ok(left + usize::from(n.is_black()))
    }
}
