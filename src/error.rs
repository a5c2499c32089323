//! Error type for layout tree operations.

use taffy::TaffyError;
use thiserror::Error;

/// Errors returned by fallible [`LayoutNode`](crate::layout::LayoutNode) operations.
///
/// All of these are checked before the tree is mutated, so an `Err` means the
/// targeted node is unchanged.
#[derive(Debug, Error)]
pub enum LayoutError {
    /// `insert_child` was given an index past the end of the child list.
    #[error("child index {index} out of range (child count {count})")]
    ChildIndexOutOfRange { index: usize, count: usize },

    /// `remove_child` was given a node that is not a child of this node.
    #[error("node is not a child of this node")]
    NotAChild,

    /// A node cannot be inserted into itself or one of its descendants.
    #[error("cannot insert a node into its own subtree")]
    Cycle,

    /// A child cannot be inserted under a node that has a measure function.
    #[error("cannot add children to a node with a measure function")]
    MeasuredNodeChildren,

    /// A measure function cannot be installed on a node that has children.
    #[error("cannot set a measure function on a node with children")]
    HasChildren,

    /// The layout tree is in use by a running layout pass, i.e. the call came
    /// from inside a measure callback.
    #[error("layout tree is busy with a layout pass")]
    TreeBusy,

    /// The layout engine rejected the operation.
    #[error("layout engine error: {0:?}")]
    Engine(TaffyError),
}

impl From<TaffyError> for LayoutError {
    fn from(err: TaffyError) -> Self {
        Self::Engine(err)
    }
}

pub type Result<T> = std::result::Result<T, LayoutError>;
