//! Layout Module - Layout nodes over the Taffy flexbox engine.
//!
//! # Architecture
//!
//! The layout module uses [Taffy](https://github.com/DioxusLabs/taffy) for
//! W3C-compliant flexbox computation. The bridge:
//!
//! 1. Keeps each node's style intent (`NodeStyle`) in the engine node's context slot
//! 2. Converts `NodeStyle` → Taffy `Style` on every change
//! 3. Routes measure calls through one trampoline to per-node callbacks
//! 4. Reads computed layout back, mirroring it for right-to-left passes
//!
//! Nodes live in a thread-local tree, so a `LayoutNode` is tied to the
//! thread that created it.

mod callbacks;
mod node;
mod style;
mod taffy_bridge;
mod tree;

pub use callbacks::{DirtiedFunc, MeasureFunc};
pub use node::LayoutNode;
pub use style::NodeStyle;
pub use tree::node_count;

// Engine identity returned by `LayoutNode::id`, `child` and `parent`
pub use taffy::NodeId;
