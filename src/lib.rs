//! A red-black tree over a totally ordered key type.
//!
//! Nodes live on the heap and are linked with `Option<NonNull<_>>`; `None`
//! plays the part of the black sentinel ("nil"). Insertion and removal run
//! the textbook fixup state machines in [`root`].
mod alloc;
mod display;
mod error;
mod node;
mod root;
mod tree;
mod validate;

use std::{marker::PhantomData, ptr::NonNull};

pub use error::{Error, InvariantViolation, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Color {
    Red = 0,
    Black = 1,
}

impl From<Color> for usize {
    fn from(color: Color) -> usize {
        color as usize
    }
}

impl From<usize> for Color {
    fn from(color: usize) -> Color {
        match color {
            0 => Color::Red,
            _ => Color::Black,
        }
    }
}

/// A link to a node; `None` is the sentinel.
pub type NodePtr<K> = Option<NonNull<Node<K>>>;

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum ComingFrom {
    Left,
    Right,
}

/// Color and link accessors that treat `None` as the sentinel: it reads as
/// black with no children and no parent, and writes to it are dropped.
pub(crate) trait NodePtrExt {
    type Key;

    fn color(&self) -> Color;
    fn is_black(&self) -> bool;
    fn is_red(&self) -> bool;
    fn left(&self) -> NodePtr<Self::Key>;
    fn parent(&self) -> NodePtr<Self::Key>;
    fn right(&self) -> NodePtr<Self::Key>;
    fn set_color(&mut self, color: Color);
    fn set_left(&mut self, left: NodePtr<Self::Key>);
    fn set_parent(&mut self, parent: NodePtr<Self::Key>);
    fn set_right(&mut self, right: NodePtr<Self::Key>);
}

impl<K> NodePtrExt for NodePtr<K> {
    type Key = K;

    #[inline(always)]
    fn color(&self) -> Color {
        self.map_or(Color::Black, |v| unsafe { v.as_ref() }.color())
    }

    #[inline(always)]
    fn is_black(&self) -> bool {
        self.map_or(true, |v| unsafe { v.as_ref() }.is_black())
    }

    #[inline(always)]
    fn is_red(&self) -> bool {
        self.map_or(false, |v| unsafe { v.as_ref() }.is_red())
    }

    #[inline(always)]
    fn left(&self) -> NodePtr<Self::Key> {
        self.and_then(|v| unsafe { v.as_ref() }.left)
    }

    #[inline(always)]
    fn parent(&self) -> NodePtr<Self::Key> {
        self.and_then(|v| unsafe { v.as_ref() }.parent())
    }

    #[inline(always)]
    fn right(&self) -> NodePtr<Self::Key> {
        self.and_then(|v| unsafe { v.as_ref() }.right)
    }

    #[inline(always)]
    fn set_color(&mut self, color: Color) {
        if let Some(node) = self {
            unsafe { node.as_mut() }.set_color(color);
        }
    }

    #[inline(always)]
    fn set_left(&mut self, left: NodePtr<Self::Key>) {
        if let Some(node) = self {
            unsafe { node.as_mut() }.left = left;
        }
    }

    #[inline(always)]
    fn set_parent(&mut self, parent: NodePtr<Self::Key>) {
        if let Some(node) = self {
            unsafe { node.as_mut() }.set_parent(parent);
        }
    }

    #[inline(always)]
    fn set_right(&mut self, right: NodePtr<Self::Key>) {
        if let Some(node) = self {
            unsafe { node.as_mut() }.right = right;
        }
    }
}

#[repr(C)]
pub struct Node<K> {
    // The parent pointer with color information in the lowest bit
    parent_color: *mut Node<K>,
    // Child pointers
    pub(crate) right: NodePtr<K>,
    pub(crate) left: NodePtr<K>,
    key: K,
}

/// Owner of the root link; home of the rotations and both fixups.
pub(crate) struct Root<K> {
    root: NodePtr<K>,
}

/// A red-black tree.
///
/// Equal keys are kept: a duplicate is ordered after the keys equal to it
/// that are already stored.
///
/// # Examples
///
/// ```
/// use redblack::{Error, RBTree};
///
/// let mut tree = RBTree::new();
/// tree.insert(18);
/// tree.insert(7);
/// tree.insert(10);
///
/// assert!(tree.contains(&7));
/// assert_eq!(Ok(7), tree.remove(&7));
/// assert_eq!(Err(Error::NotFound), tree.remove(&7));
/// assert_eq!(2, tree.len());
/// ```
pub struct RBTree<K> {
    root: Root<K>,
    len: usize,
    _marker: PhantomData<Box<Node<K>>>,
}
