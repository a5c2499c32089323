//! Layout Tree - The thread-local Taffy tree behind every `LayoutNode`.
//!
//! Each `LayoutNode` owns one node in this tree. The node's context slot holds
//! the wrapper-side state (style intent, callbacks, last pass info), which is
//! how the measure trampoline finds its way back to the owning wrapper.

use std::cell::RefCell;
use std::rc::Rc;

use taffy::{NodeId, TaffyTree};
use tracing::warn;

use super::callbacks::{DirtiedFunc, MeasureFunc};
use super::style::NodeStyle;

// =============================================================================
// Node Context
// =============================================================================

/// How the last layout pass that covered a node was run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct PassInfo {
    /// Edge reads swap left/right.
    pub rtl: bool,
    /// Horizontal offset is mirrored inside the parent box.
    pub mirrored: bool,
}

/// Wrapper-side state stored on each engine node.
///
/// The style is shared with the owning `LayoutNode`, so style reads never
/// need the tree.
#[derive(Default)]
pub(crate) struct NodeContext {
    pub style: Rc<RefCell<NodeStyle>>,
    pub measure: Option<MeasureFunc>,
    pub dirtied: Option<DirtiedFunc>,
    pub pass: Option<PassInfo>,
    /// The engine style was built for a right-to-left pass.
    pub solved_rtl: bool,
}

// =============================================================================
// Tree State
// =============================================================================

thread_local! {
    /// All layout nodes created on this thread.
    static LAYOUT_TREE: RefCell<TaffyTree<NodeContext>> = RefCell::new(TaffyTree::new());
}

/// Run `f` with exclusive access to this thread's layout tree.
///
/// Returns `None` when the tree is already in use, which only happens inside
/// a measure callback while a layout pass is running.
pub(crate) fn with_tree<R>(f: impl FnOnce(&mut TaffyTree<NodeContext>) -> R) -> Option<R> {
    LAYOUT_TREE.with(|tree| match tree.try_borrow_mut() {
        Ok(mut tree) => Some(f(&mut tree)),
        Err(_) => {
            warn!("layout tree is busy with a layout pass; tree access skipped");
            None
        }
    })
}

/// Free an engine node, detaching it from its parent and orphaning its children.
pub(crate) fn release_node(id: NodeId) {
    // Fails only during thread teardown, when the whole tree is going away
    let _ = LAYOUT_TREE.try_with(|tree| {
        let Ok(mut tree) = tree.try_borrow_mut() else {
            warn!(node = ?id, "layout node dropped during a layout pass; engine node leaked");
            return;
        };

        if let Some(parent) = tree.parent(id) {
            let _ = tree.mark_dirty(parent);
        }
        if let Err(err) = tree.remove(id) {
            warn!(node = ?id, error = ?err, "failed to free layout node");
        }
    });
}

/// Number of live layout nodes on this thread.
pub fn node_count() -> usize {
    with_tree(|tree| tree.total_node_count()).unwrap_or(0)
}
