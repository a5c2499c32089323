//! Container Module - Flexbox layout of a widget's direct children.
//!
//! A [`FlexContainer`] owns one root [`LayoutNode`](crate::layout::LayoutNode)
//! and a proxy node per child widget. Widgets are borrowed for the length of
//! a sort cycle and reached through the [`Widget`] trait only.

mod config;
mod flex_container;
mod widget;

pub use config::ContainerConfig;
pub use flex_container::{FlexContainer, Notification};
pub use widget::{SizeFlags, Widget, WidgetId};
