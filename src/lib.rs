//! # flexbox-container
//!
//! Flexbox layout for widget trees, built on [Taffy](https://github.com/DioxusLabs/taffy).
//!
//! ## Architecture
//!
//! Two layers sit between a host widget toolkit and the flex solver:
//!
//! ```text
//! Widget children → FlexContainer (reconcile) → LayoutNode proxies → Taffy → rects → Widgets
//! ```
//!
//! - [`LayoutNode`] owns one engine node: style in, computed geometry out,
//!   plus measure and dirtied callbacks.
//! - [`FlexContainer`] maps each child widget to a proxy node under its root,
//!   runs the solver and writes the results back through the [`Widget`] trait.
//!
//! Scheduling is reactive: the "sort queued" flag is a
//! [spark-signals](https://github.com/RLabs-Inc/spark-signals) signal.
//!
//! ## Modules
//!
//! - [`types`] - Value types and flexbox enums
//! - [`layout`] - `LayoutNode` over the thread-local Taffy tree
//! - [`container`] - `FlexContainer`, `Widget`, size flags and configuration
//! - [`error`] - `LayoutError`

pub mod container;
pub mod error;
pub mod layout;
pub mod types;

// Re-export commonly used items
pub use types::*;

pub use container::{ContainerConfig, FlexContainer, Notification, SizeFlags, Widget, WidgetId};
pub use error::{LayoutError, Result};
pub use layout::{DirtiedFunc, LayoutNode, MeasureFunc, NodeStyle};
