use std::ptr::NonNull;

use crate::Node;

/// Moves a fresh red leaf onto the heap.
///
/// It leaks; use with [`own_back`].
pub(crate) fn leak_alloc_node<K>(key: K) -> NonNull<Node<K>> {
    NonNull::from(Box::leak(Box::new(Node::new(key))))
}

/// # Safety
///
/// `node` must come from [`leak_alloc_node`], be spliced out of every tree,
/// and not be owned back twice.
pub(crate) unsafe fn own_back<K>(node: NonNull<Node<K>>) -> Box<Node<K>> {
    unsafe { Box::from_raw(node.as_ptr()) }
}
