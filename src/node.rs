use std::{
    fmt::Debug,
    ptr::{self, NonNull},
};

use super::{Color, Node, NodePtr};

// Public API.
impl<K> Node<K> {
    #[inline(always)]
    pub fn key(&self) -> &K {
        &self.key
    }

    #[inline(always)]
    pub fn color(&self) -> Color {
        Color::from(self.parent_color.addr() & 1)
    }

    #[inline(always)]
    pub fn is_black(&self) -> bool {
        self.color() == Color::Black
    }

    #[inline(always)]
    pub fn is_red(&self) -> bool {
        self.color() == Color::Red
    }
}

impl<K> Node<K> {
    /// A detached red leaf: no parent, both children are the sentinel.
    pub(crate) fn new(key: K) -> Self {
        Node {
            parent_color: ptr::null_mut(),
            right: None,
            left: None,
            key,
        }
    }

    pub(crate) fn into_key(self) -> K {
        self.key
    }

    #[inline(always)]
    pub(crate) fn parent(&self) -> NodePtr<K> {
        NonNull::new(self.parent_color.map_addr(|p| p & !1))
    }

    #[inline(always)]
    pub(crate) fn set_parent(&mut self, parent: NodePtr<K>) {
        self.set_parent_and_color(parent, self.color());
    }

    #[inline(always)]
    pub(crate) fn set_color(&mut self, color: Color) {
        self.set_parent_and_color(self.parent(), color);
    }

    #[inline(always)]
    pub(crate) fn set_parent_and_color(&mut self, parent: NodePtr<K>, color: Color) {
        let parent = parent.map_or(ptr::null_mut(), NonNull::as_ptr);
        self.parent_color = parent.map_addr(|p| p | usize::from(color));
    }

    /// The leftmost node of the subtree rooted at `node`.
    pub(crate) fn minimum(mut node: NonNull<Node<K>>) -> NonNull<Node<K>> {
        // SAFETY: every link reachable from a live node points to a live node.
        while let Some(left) = unsafe { node.as_ref() }.left {
            node = left;
        }
        node
    }

    /// The rightmost node of the subtree rooted at `node`.
    pub(crate) fn maximum(mut node: NonNull<Node<K>>) -> NonNull<Node<K>> {
        // SAFETY: every link reachable from a live node points to a live node.
        while let Some(right) = unsafe { node.as_ref() }.right {
            node = right;
        }
        node
    }

    /// In-order successor.
    pub(crate) fn next(&self) -> NodePtr<K> {
        // If we have a right-hand child, go down and then left as far as we
        // can.
        if let Some(right) = self.right {
            return Some(Node::minimum(right));
        }
        // No right-hand children. Everything down and left is smaller than us,
        // so any 'next' node must be in the general direction of our parent:
        // go up until we leave a left subtree.
        let mut node_ref = self;
        loop {
            let parent = node_ref.parent()?;
            // SAFETY: parent links of a live node point to live nodes.
            let parent_ref = unsafe { parent.as_ref() };
            if parent_ref.left.map(NonNull::as_ptr) == Some(ptr::from_ref(node_ref).cast_mut()) {
                return Some(parent);
            }
            node_ref = parent_ref;
        }
    }
}

impl<K> Debug for Node<K>
where
    K: Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_fmt(format_args!("{:?}::({:?})", self.color(), self.key))
    }
}
