use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("key not found")]
    NotFound,
    #[error(transparent)]
    Invariant(#[from] InvariantViolation),
}

/// A broken red-black or search-tree property, as reported by
/// [`RBTree::validate`](crate::RBTree::validate).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InvariantViolation {
    #[error("the root is red")]
    RedRoot,
    #[error("a red node has a red child")]
    ConsecutiveReds,
    #[error("unbalanced blacks left: {left} and right: {right}")]
    UnbalancedBlacks { left: usize, right: usize },
    #[error("keys are out of order")]
    Unordered,
    #[error("a child does not point back to its parent")]
    BrokenParentLink,
    #[error("tree holds {found} nodes but counts {expected}")]
    LengthMismatch { expected: usize, found: usize },
}

pub type Result<T> = ::std::result::Result<T, Error>;
