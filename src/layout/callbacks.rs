//! Callback bridging between the layout engine and per-node host callbacks.
//!
//! Taffy takes a single measure function per pass. `measure_trampoline` is
//! that function for every pass: it receives the node's context slot, finds
//! the callback installed on the owning `LayoutNode` and forwards to it.
//! Dirtied callbacks are fired by `LayoutNode` itself after each mutation.

use std::rc::Rc;

use taffy::{AvailableSpace, NodeId, Size, Style};
use tracing::{trace, warn};

use crate::types::{MeasureMode, Size2};

use super::tree::NodeContext;

/// Intrinsic-size oracle for a leaf node.
///
/// Called as `(width, width_mode, height, height_mode)`. A size paired with
/// [`MeasureMode::Undefined`] is NaN and must be ignored.
pub type MeasureFunc = Box<dyn FnMut(f32, MeasureMode, f32, MeasureMode) -> Size2>;

/// Notification that a node went from laid-out to stale.
pub type DirtiedFunc = Rc<dyn Fn()>;

/// Translate one axis of Taffy's constraints into a (size, mode) pair.
fn constraint(known: Option<f32>, available: AvailableSpace) -> (f32, MeasureMode) {
    match (known, available) {
        (Some(size), _) => (size, MeasureMode::Exactly),
        (None, AvailableSpace::Definite(size)) => (size, MeasureMode::AtMost),
        (None, AvailableSpace::MinContent | AvailableSpace::MaxContent) => {
            (f32::NAN, MeasureMode::Undefined)
        }
    }
}

/// Run the node's measure callback, or log and fall back to a zero size.
pub(crate) fn dispatch_measure(
    context: &mut NodeContext,
    node: NodeId,
    width: f32,
    width_mode: MeasureMode,
    height: f32,
    height_mode: MeasureMode,
) -> Size2 {
    let Some(measure) = context.measure.as_mut() else {
        warn!(node = ?node, "measure called on a node without a measure function");
        return Size2::ZERO;
    };

    let size = measure(width, width_mode, height, height_mode);
    trace!(node = ?node, width = size.width, height = size.height, "measured");

    // f32::max drops NaN, so a broken callback degrades to zero
    Size2::new(size.width.max(0.0), size.height.max(0.0))
}

/// Run a dirtied callback, or log when the node has none.
pub(crate) fn dispatch_dirtied(node: NodeId, callback: Option<DirtiedFunc>) {
    match callback {
        Some(callback) => callback(),
        None => warn!(node = ?node, "dirtied called on a node without a dirtied function"),
    }
}

/// The single measure function handed to Taffy for every layout pass.
pub(crate) fn measure_trampoline(
    known: Size<Option<f32>>,
    available: Size<AvailableSpace>,
    node: NodeId,
    context: Option<&mut NodeContext>,
    _style: &Style,
) -> Size<f32> {
    if let Size { width: Some(width), height: Some(height) } = known {
        return Size { width, height };
    }

    // Leaves without an override are sized by style alone
    let Some(context) = context.filter(|ctx| ctx.measure.is_some()) else {
        return Size::ZERO;
    };

    let (width, width_mode) = constraint(known.width, available.width);
    let (height, height_mode) = constraint(known.height, available.height);
    let measured = dispatch_measure(context, node, width, width_mode, height, height_mode);

    Size {
        width: known.width.unwrap_or(measured.width),
        height: known.height.unwrap_or(measured.height),
    }
}
