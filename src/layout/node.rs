//! LayoutNode - Identity-stable owner of one layout engine node.
//!
//! All layout intent goes in and all layout results come out through a
//! `LayoutNode`. Style setters write a `NodeStyle` kept in the engine node's
//! context slot and push the translated style to Taffy immediately, so the
//! node (and its ancestors) are dirty for the next pass.
//!
//! Tree mutation never transfers ownership: a parent only refers to its
//! children, and whoever created a `LayoutNode` decides how long it lives.
//! Dropping a node detaches it from its parent first.
//!
//! # Example
//!
//! ```
//! use flexbox_container::layout::LayoutNode;
//! use flexbox_container::{Direction, FlexDirection};
//!
//! let root = LayoutNode::new();
//! root.set_flex_direction(FlexDirection::Row);
//! root.set_width(100.0);
//! root.set_height(20.0);
//!
//! let child = LayoutNode::new();
//! child.set_width(30.0);
//! child.set_height(10.0);
//! root.insert_child(&child, 0).unwrap();
//!
//! root.calculate_layout(None, None, Direction::Ltr);
//! assert_eq!(child.computed_width(), 30.0);
//! ```

use std::cell::RefCell;
use std::rc::Rc;

use taffy::{AvailableSpace, Layout, NodeId, Rect, Size, TaffyTree, TraversePartialTree};
use tracing::{debug, warn};

use crate::error::{LayoutError, Result};
use crate::types::{
    Align, ComputedLayout, Direction, Display, Edge, FlexDirection, FlexWrap, Gutter,
    JustifyContent, MeasureMode, Overflow, PositionType, Size2, Value,
};

use super::callbacks::{dispatch_dirtied, dispatch_measure, measure_trampoline, DirtiedFunc};
use super::style::NodeStyle;
use super::taffy_bridge::to_taffy_style;
use super::tree::{release_node, with_tree, NodeContext, PassInfo};

/// Dirtied callbacks collected while the tree is borrowed, fired after.
type PendingDirtied = Vec<(NodeId, DirtiedFunc)>;

fn points(value: f32) -> Value {
    if value.is_nan() { Value::UNDEFINED } else { Value::point(value) }
}

fn percent(value: f32) -> Value {
    if value.is_nan() { Value::UNDEFINED } else { Value::percent(value) }
}

fn defined(value: f32) -> Option<f32> {
    (!value.is_nan()).then_some(value)
}

/// Collect dirtied callbacks on the path from `start` up to the first node
/// that is already dirty. Must run before the mutation that dirties them.
fn collect_dirtied(tree: &TaffyTree<NodeContext>, start: NodeId, pending: &mut PendingDirtied) {
    let mut current = Some(start);
    while let Some(node) = current {
        if tree.dirty(node).unwrap_or(true) {
            break;
        }
        if let Some(callback) = tree.get_node_context(node).and_then(|ctx| ctx.dirtied.clone()) {
            if !pending.iter().any(|(id, _)| *id == node) {
                pending.push((node, callback));
            }
        }
        current = tree.parent(node);
    }
}

fn fire_dirtied(pending: PendingDirtied) {
    for (_, callback) in pending {
        callback();
    }
}

/// Rebuild engine styles in `root`'s subtree for a pass in the given direction.
///
/// Only nodes whose engine style actually changes are touched, so repeated
/// passes in one direction keep the layout cache.
fn restyle_for_flow(tree: &mut TaffyTree<NodeContext>, root: NodeId, rtl: bool) {
    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        let style = match tree.get_node_context_mut(node) {
            Some(ctx) if ctx.solved_rtl != rtl => {
                ctx.solved_rtl = rtl;
                Some(to_taffy_style(&ctx.style.borrow(), rtl))
            }
            _ => None,
        };
        if let Some(style) = style {
            if tree.style(node).map_or(true, |current| *current != style) {
                if let Err(err) = tree.set_style(node, style) {
                    warn!(node = ?node, error = ?err, "failed to restyle node for layout direction");
                }
            }
        }
        if let Ok(children) = tree.children(node) {
            stack.extend(children);
        }
    }
}

/// Walk the solved subtree and record how its results must be read back.
fn stamp_pass(tree: &mut TaffyTree<NodeContext>, root: NodeId, rtl: bool) {
    let mut stack = vec![(root, true)];
    while let Some((node, is_root)) = stack.pop() {
        if let Some(ctx) = tree.get_node_context_mut(node) {
            ctx.pass = Some(PassInfo { rtl, mirrored: rtl && !is_root });
        }
        if let Ok(children) = tree.children(node) {
            stack.extend(children.into_iter().map(|child| (child, false)));
        }
    }
}

fn pass_info(tree: &TaffyTree<NodeContext>, node: NodeId) -> PassInfo {
    tree.get_node_context(node)
        .and_then(|ctx| ctx.pass)
        .unwrap_or(PassInfo { rtl: false, mirrored: false })
}

/// Read one edge of a computed box, honouring RTL mirroring.
fn edge_of(rect: Rect<f32>, edge: Edge, rtl: bool) -> f32 {
    match edge {
        Edge::Top => rect.top,
        Edge::Bottom => rect.bottom,
        Edge::Left if rtl => rect.right,
        Edge::Left => rect.left,
        Edge::Right if rtl => rect.left,
        Edge::Right => rect.right,
        // Start/End were solved as left/right before mirroring
        Edge::Start => rect.left,
        Edge::End => rect.right,
        Edge::Horizontal | Edge::Vertical | Edge::All => 0.0,
    }
}

/// Owner of exactly one node in the thread-local layout tree.
///
/// Not `Clone`: the wrapper and its engine node are created and destroyed
/// together. Other nodes refer to it by [`LayoutNode::id`].
#[derive(Debug)]
pub struct LayoutNode {
    id: NodeId,
    style: Rc<RefCell<NodeStyle>>,
}

impl Default for LayoutNode {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for LayoutNode {
    fn drop(&mut self) {
        release_node(self.id);
    }
}

impl LayoutNode {
    /// Create a detached node with default style.
    ///
    /// # Panics
    ///
    /// Panics where [`try_new`](Self::try_new) fails, i.e. when called from a
    /// measure callback during a layout pass.
    pub fn new() -> Self {
        match Self::try_new() {
            Ok(node) => node,
            Err(err) => panic!("failed to create layout node: {err}"),
        }
    }

    /// Create a detached node with default style.
    pub fn try_new() -> Result<Self> {
        let style = Rc::new(RefCell::new(NodeStyle::default()));
        let taffy_style = to_taffy_style(&style.borrow(), false);
        let context = NodeContext { style: style.clone(), ..Default::default() };

        let id = with_tree(|tree| tree.new_leaf_with_context(taffy_style, context))
            .ok_or(LayoutError::TreeBusy)?
            .map_err(|err| {
                warn!(error = ?err, "layout engine rejected a new leaf");
                LayoutError::from(err)
            })?;

        Ok(Self { id, style })
    }

    /// Engine identity of this node, as returned by `child()` and `parent()`.
    pub fn id(&self) -> NodeId {
        self.id
    }

    // =========================================================================
    // Style plumbing
    // =========================================================================

    fn read_style<R>(&self, f: impl FnOnce(&NodeStyle) -> R) -> R {
        f(&self.style.borrow())
    }

    /// Apply `f` to the stored style. Unchanged styles leave the node clean.
    ///
    /// The write is dropped when the tree is busy, so the stored style always
    /// matches what the engine will lay out.
    fn update_style(&self, f: impl FnOnce(&mut NodeStyle)) {
        let mut style = self.style.borrow().clone();
        f(&mut style);
        if style == *self.style.borrow() {
            return;
        }

        let Some(pending) = with_tree(|tree| {
            let mut pending = PendingDirtied::new();
            collect_dirtied(tree, self.id, &mut pending);
            let rtl = tree.get_node_context(self.id).is_some_and(|ctx| ctx.solved_rtl);
            if let Err(err) = tree.set_style(self.id, to_taffy_style(&style, rtl)) {
                warn!(node = ?self.id, error = ?err, "failed to push style to layout engine");
            }
            pending
        }) else {
            return;
        };

        *self.style.borrow_mut() = style;
        fire_dirtied(pending);
    }

    /// Snapshot of the full style.
    pub fn style(&self) -> NodeStyle {
        self.read_style(NodeStyle::clone)
    }

    /// Copy every style attribute from `other`.
    pub fn copy_style(&self, other: &LayoutNode) {
        let style = other.style();
        self.update_style(|s| *s = style);
    }

    // =========================================================================
    // Container properties
    // =========================================================================

    pub fn set_flex_direction(&self, direction: FlexDirection) {
        self.update_style(|s| s.direction = direction);
    }

    pub fn flex_direction(&self) -> FlexDirection {
        self.read_style(|s| s.direction)
    }

    pub fn set_flex_wrap(&self, wrap: FlexWrap) {
        self.update_style(|s| s.flex_wrap = wrap);
    }

    pub fn flex_wrap(&self) -> FlexWrap {
        self.read_style(|s| s.flex_wrap)
    }

    pub fn set_justify_content(&self, justify: JustifyContent) {
        self.update_style(|s| s.justify_content = justify);
    }

    pub fn justify_content(&self) -> JustifyContent {
        self.read_style(|s| s.justify_content)
    }

    pub fn set_align_items(&self, align: Align) {
        self.update_style(|s| s.align_items = align);
    }

    pub fn align_items(&self) -> Align {
        self.read_style(|s| s.align_items)
    }

    pub fn set_align_content(&self, align: Align) {
        self.update_style(|s| s.align_content = align);
    }

    pub fn align_content(&self) -> Align {
        self.read_style(|s| s.align_content)
    }

    // =========================================================================
    // Item properties
    // =========================================================================

    pub fn set_align_self(&self, align: Align) {
        self.update_style(|s| s.align_self = align);
    }

    pub fn align_self(&self) -> Align {
        self.read_style(|s| s.align_self)
    }

    /// `flex` shorthand: positive values grow, negative values shrink.
    pub fn set_flex(&self, flex: f32) {
        self.update_style(|s| s.flex = defined(flex));
    }

    pub fn flex(&self) -> Option<f32> {
        self.read_style(|s| s.flex)
    }

    pub fn set_flex_grow(&self, grow: f32) {
        self.update_style(|s| s.flex_grow = defined(grow));
    }

    /// Grow factor as set (0 when unset).
    pub fn flex_grow(&self) -> f32 {
        self.read_style(|s| s.flex_grow.unwrap_or(0.0))
    }

    pub fn set_flex_shrink(&self, shrink: f32) {
        self.update_style(|s| s.flex_shrink = defined(shrink));
    }

    /// Shrink factor as set (0 when unset).
    pub fn flex_shrink(&self) -> f32 {
        self.read_style(|s| s.flex_shrink.unwrap_or(0.0))
    }

    pub fn set_flex_basis(&self, basis: f32) {
        self.update_style(|s| s.flex_basis = points(basis));
    }

    pub fn set_flex_basis_percent(&self, basis: f32) {
        self.update_style(|s| s.flex_basis = percent(basis));
    }

    pub fn set_flex_basis_auto(&self) {
        self.update_style(|s| s.flex_basis = Value::AUTO);
    }

    pub fn flex_basis(&self) -> Value {
        self.read_style(|s| s.flex_basis)
    }

    // =========================================================================
    // Dimensions
    // =========================================================================

    pub fn set_width(&self, width: f32) {
        self.update_style(|s| s.width = points(width));
    }

    pub fn set_width_percent(&self, width: f32) {
        self.update_style(|s| s.width = percent(width));
    }

    pub fn set_width_auto(&self) {
        self.update_style(|s| s.width = Value::AUTO);
    }

    pub fn width(&self) -> Value {
        self.read_style(|s| s.width)
    }

    pub fn set_height(&self, height: f32) {
        self.update_style(|s| s.height = points(height));
    }

    pub fn set_height_percent(&self, height: f32) {
        self.update_style(|s| s.height = percent(height));
    }

    pub fn set_height_auto(&self) {
        self.update_style(|s| s.height = Value::AUTO);
    }

    pub fn height(&self) -> Value {
        self.read_style(|s| s.height)
    }

    pub fn set_min_width(&self, width: f32) {
        self.update_style(|s| s.min_width = points(width));
    }

    pub fn set_min_width_percent(&self, width: f32) {
        self.update_style(|s| s.min_width = percent(width));
    }

    pub fn min_width(&self) -> Value {
        self.read_style(|s| s.min_width)
    }

    pub fn set_min_height(&self, height: f32) {
        self.update_style(|s| s.min_height = points(height));
    }

    pub fn set_min_height_percent(&self, height: f32) {
        self.update_style(|s| s.min_height = percent(height));
    }

    pub fn min_height(&self) -> Value {
        self.read_style(|s| s.min_height)
    }

    pub fn set_max_width(&self, width: f32) {
        self.update_style(|s| s.max_width = points(width));
    }

    pub fn set_max_width_percent(&self, width: f32) {
        self.update_style(|s| s.max_width = percent(width));
    }

    pub fn max_width(&self) -> Value {
        self.read_style(|s| s.max_width)
    }

    pub fn set_max_height(&self, height: f32) {
        self.update_style(|s| s.max_height = points(height));
    }

    pub fn set_max_height_percent(&self, height: f32) {
        self.update_style(|s| s.max_height = percent(height));
    }

    pub fn max_height(&self) -> Value {
        self.read_style(|s| s.max_height)
    }

    /// Width / height ratio. NaN clears it.
    pub fn set_aspect_ratio(&self, ratio: f32) {
        self.update_style(|s| s.aspect_ratio = defined(ratio));
    }

    pub fn aspect_ratio(&self) -> Option<f32> {
        self.read_style(|s| s.aspect_ratio)
    }

    // =========================================================================
    // Spacing
    // =========================================================================

    pub fn set_margin(&self, edge: Edge, margin: f32) {
        self.update_style(|s| s.margin[edge as usize] = points(margin));
    }

    pub fn set_margin_percent(&self, edge: Edge, margin: f32) {
        self.update_style(|s| s.margin[edge as usize] = percent(margin));
    }

    pub fn set_margin_auto(&self, edge: Edge) {
        self.update_style(|s| s.margin[edge as usize] = Value::AUTO);
    }

    pub fn margin(&self, edge: Edge) -> Value {
        self.read_style(|s| s.margin[edge as usize])
    }

    pub fn set_padding(&self, edge: Edge, padding: f32) {
        self.update_style(|s| s.padding[edge as usize] = points(padding));
    }

    pub fn set_padding_percent(&self, edge: Edge, padding: f32) {
        self.update_style(|s| s.padding[edge as usize] = percent(padding));
    }

    pub fn padding(&self, edge: Edge) -> Value {
        self.read_style(|s| s.padding[edge as usize])
    }

    pub fn set_border(&self, edge: Edge, border: f32) {
        self.update_style(|s| s.border[edge as usize] = defined(border));
    }

    pub fn border(&self, edge: Edge) -> Option<f32> {
        self.read_style(|s| s.border[edge as usize])
    }

    pub fn set_gap(&self, gutter: Gutter, gap: f32) {
        self.update_style(|s| s.gap[gutter as usize] = defined(gap));
    }

    pub fn gap(&self, gutter: Gutter) -> Option<f32> {
        self.read_style(|s| s.gap[gutter as usize])
    }

    // =========================================================================
    // Positioning and misc
    // =========================================================================

    pub fn set_position_type(&self, position_type: PositionType) {
        self.update_style(|s| s.position_type = position_type);
    }

    pub fn position_type(&self) -> PositionType {
        self.read_style(|s| s.position_type)
    }

    pub fn set_position(&self, edge: Edge, position: f32) {
        self.update_style(|s| s.position[edge as usize] = points(position));
    }

    pub fn set_position_percent(&self, edge: Edge, position: f32) {
        self.update_style(|s| s.position[edge as usize] = percent(position));
    }

    pub fn position(&self, edge: Edge) -> Value {
        self.read_style(|s| s.position[edge as usize])
    }

    pub fn set_display(&self, display: Display) {
        self.update_style(|s| s.display = display);
    }

    pub fn display(&self) -> Display {
        self.read_style(|s| s.display)
    }

    pub fn set_overflow(&self, overflow: Overflow) {
        self.update_style(|s| s.overflow = overflow);
    }

    pub fn overflow(&self) -> Overflow {
        self.read_style(|s| s.overflow)
    }

    pub fn set_is_reference_baseline(&self, is_reference_baseline: bool) {
        self.update_style(|s| s.is_reference_baseline = is_reference_baseline);
    }

    pub fn is_reference_baseline(&self) -> bool {
        self.read_style(|s| s.is_reference_baseline)
    }

    // =========================================================================
    // Tree
    // =========================================================================

    /// Insert `child` at `index`, moving it from its current parent if any.
    ///
    /// Fails without touching either node when the index is past the end,
    /// when this node has a measure function, or when `child` is this node or
    /// one of its ancestors.
    pub fn insert_child(&self, child: &LayoutNode, index: usize) -> Result<()> {
        let pending = with_tree(|tree| -> Result<PendingDirtied> {
            if tree.get_node_context(self.id).is_some_and(|ctx| ctx.measure.is_some()) {
                return Err(LayoutError::MeasuredNodeChildren);
            }

            let mut ancestor = Some(self.id);
            while let Some(node) = ancestor {
                if node == child.id {
                    return Err(LayoutError::Cycle);
                }
                ancestor = tree.parent(node);
            }

            let old_parent = tree.parent(child.id);
            let mut count = tree.child_count(self.id);
            if old_parent == Some(self.id) {
                count -= 1;
            }
            if index > count {
                return Err(LayoutError::ChildIndexOutOfRange { index, count });
            }

            let mut pending = PendingDirtied::new();
            collect_dirtied(tree, self.id, &mut pending);
            if let Some(old_parent) = old_parent {
                collect_dirtied(tree, old_parent, &mut pending);
                tree.remove_child(old_parent, child.id)?;
            }
            tree.insert_child_at_index(self.id, index, child.id)?;
            Ok(pending)
        })
        .unwrap_or(Err(LayoutError::TreeBusy))?;

        fire_dirtied(pending);
        Ok(())
    }

    /// Detach `child` from this node. Its own subtree is left intact.
    pub fn remove_child(&self, child: &LayoutNode) -> Result<()> {
        let pending = with_tree(|tree| -> Result<PendingDirtied> {
            if tree.parent(child.id) != Some(self.id) {
                return Err(LayoutError::NotAChild);
            }

            let mut pending = PendingDirtied::new();
            collect_dirtied(tree, self.id, &mut pending);
            tree.remove_child(self.id, child.id)?;
            Ok(pending)
        })
        .unwrap_or(Err(LayoutError::TreeBusy))?;

        fire_dirtied(pending);
        Ok(())
    }

    pub fn child_count(&self) -> usize {
        with_tree(|tree| tree.child_count(self.id)).unwrap_or(0)
    }

    /// Id of the child at `index`, `None` when out of range.
    pub fn child(&self, index: usize) -> Option<NodeId> {
        with_tree(|tree| tree.child_at_index(self.id, index).ok()).flatten()
    }

    /// Id of the parent, `None` for a detached node.
    pub fn parent(&self) -> Option<NodeId> {
        with_tree(|tree| tree.parent(self.id)).flatten()
    }

    // =========================================================================
    // Layout
    // =========================================================================

    /// Lay out this node and its whole subtree.
    ///
    /// `None` (or NaN) for an available size means undefined: the node's own
    /// style and its content decide. Computed values are valid until the next
    /// style or tree change anywhere in the subtree or above it.
    pub fn calculate_layout(&self, width: Option<f32>, height: Option<f32>, direction: Direction) {
        let to_space = |size: Option<f32>| match size.filter(|v| !v.is_nan()) {
            Some(size) => AvailableSpace::Definite(size),
            None => AvailableSpace::MaxContent,
        };
        let available = Size { width: to_space(width), height: to_space(height) };

        let rtl = direction == Direction::Rtl;

        let solved = with_tree(|tree| {
            restyle_for_flow(tree, self.id, rtl);
            if let Err(err) = tree.compute_layout_with_measure(self.id, available, measure_trampoline) {
                warn!(node = ?self.id, error = ?err, "layout pass failed");
                return false;
            }
            stamp_pass(tree, self.id, rtl);
            true
        });
        if solved == Some(true) {
            debug!(node = ?self.id, ?direction, "layout pass complete");
        }
    }

    /// The last computed box. All zeros before the first pass.
    pub fn computed_layout(&self) -> ComputedLayout {
        with_tree(|tree| {
            let Ok(layout) = tree.layout(self.id) else {
                return ComputedLayout::default();
            };
            let pass = pass_info(tree, self.id);
            let parent_size = tree
                .parent(self.id)
                .and_then(|parent| tree.layout(parent).ok())
                .map(|parent| parent.size);

            let width = layout.size.width;
            let height = layout.size.height;
            let mut left = layout.location.x;
            let top = layout.location.y;

            let (right, bottom) = match parent_size {
                Some(parent) => {
                    if pass.mirrored {
                        left = parent.width - left - width;
                    }
                    (parent.width - left - width, parent.height - top - height)
                }
                None => (0.0, 0.0),
            };

            ComputedLayout { left, top, right, bottom, width, height }
        })
        .unwrap_or_default()
    }

    pub fn computed_left(&self) -> f32 {
        self.computed_layout().left
    }

    pub fn computed_top(&self) -> f32 {
        self.computed_layout().top
    }

    pub fn computed_right(&self) -> f32 {
        self.computed_layout().right
    }

    pub fn computed_bottom(&self) -> f32 {
        self.computed_layout().bottom
    }

    pub fn computed_width(&self) -> f32 {
        with_tree(|tree| tree.layout(self.id).map_or(0.0, |layout| layout.size.width))
            .unwrap_or(0.0)
    }

    pub fn computed_height(&self) -> f32 {
        with_tree(|tree| tree.layout(self.id).map_or(0.0, |layout| layout.size.height))
            .unwrap_or(0.0)
    }

    fn computed_edge(&self, edge: Edge, pick: impl FnOnce(&Layout) -> Rect<f32>) -> f32 {
        if edge.is_shorthand() {
            warn!(node = ?self.id, ?edge, "computed values are only available for single edges");
            return 0.0;
        }
        with_tree(|tree| {
            let rtl = pass_info(tree, self.id).rtl;
            tree.layout(self.id).map_or(0.0, |layout| edge_of(pick(layout), edge, rtl))
        })
        .unwrap_or(0.0)
    }

    pub fn computed_margin(&self, edge: Edge) -> f32 {
        self.computed_edge(edge, |layout| layout.margin)
    }

    pub fn computed_border(&self, edge: Edge) -> f32 {
        self.computed_edge(edge, |layout| layout.border)
    }

    pub fn computed_padding(&self, edge: Edge) -> f32 {
        self.computed_edge(edge, |layout| layout.padding)
    }

    // =========================================================================
    // Callbacks
    // =========================================================================

    /// Install an intrinsic-size oracle. The node must be a leaf.
    ///
    /// Call [`mark_dirty`](Self::mark_dirty) whenever the measured content
    /// changes; the engine cannot see it on its own.
    pub fn set_measure_func(
        &self,
        measure: impl FnMut(f32, MeasureMode, f32, MeasureMode) -> Size2 + 'static,
    ) -> Result<()> {
        let pending = with_tree(|tree| -> Result<PendingDirtied> {
            if tree.child_count(self.id) > 0 {
                return Err(LayoutError::HasChildren);
            }

            let mut pending = PendingDirtied::new();
            collect_dirtied(tree, self.id, &mut pending);
            if let Some(ctx) = tree.get_node_context_mut(self.id) {
                ctx.measure = Some(Box::new(measure));
            }
            tree.mark_dirty(self.id)?;
            Ok(pending)
        })
        .unwrap_or(Err(LayoutError::TreeBusy))?;

        fire_dirtied(pending);
        Ok(())
    }

    /// Remove the measure function; the node falls back to style-only sizing.
    pub fn unset_measure_func(&self) {
        let pending = with_tree(|tree| {
            let mut pending = PendingDirtied::new();
            let had_measure = tree
                .get_node_context_mut(self.id)
                .and_then(|ctx| ctx.measure.take())
                .is_some();
            if had_measure {
                collect_dirtied(tree, self.id, &mut pending);
                let _ = tree.mark_dirty(self.id);
            }
            pending
        });
        fire_dirtied(pending.unwrap_or_default());
    }

    pub fn has_measure_func(&self) -> bool {
        with_tree(|tree| tree.get_node_context(self.id).is_some_and(|ctx| ctx.measure.is_some()))
            .unwrap_or(false)
    }

    /// Invoke the measure function directly. Logs and returns a zero size
    /// when none is installed.
    pub fn call_measure_func(
        &self,
        width: f32,
        width_mode: MeasureMode,
        height: f32,
        height_mode: MeasureMode,
    ) -> Size2 {
        with_tree(|tree| match tree.get_node_context_mut(self.id) {
            Some(ctx) => dispatch_measure(ctx, self.id, width, width_mode, height, height_mode),
            None => Size2::ZERO,
        })
        .unwrap_or(Size2::ZERO)
    }

    /// Install a callback fired each time this node goes from laid-out to dirty.
    pub fn set_dirtied_func(&self, dirtied: impl Fn() + 'static) {
        with_tree(|tree| {
            if let Some(ctx) = tree.get_node_context_mut(self.id) {
                ctx.dirtied = Some(Rc::new(dirtied));
            }
        });
    }

    pub fn unset_dirtied_func(&self) {
        with_tree(|tree| {
            if let Some(ctx) = tree.get_node_context_mut(self.id) {
                ctx.dirtied = None;
            }
        });
    }

    pub fn has_dirtied_func(&self) -> bool {
        with_tree(|tree| tree.get_node_context(self.id).is_some_and(|ctx| ctx.dirtied.is_some()))
            .unwrap_or(false)
    }

    /// Invoke the dirtied callback directly. Logs when none is installed.
    pub fn call_dirtied_func(&self) {
        let callback = with_tree(|tree| {
            tree.get_node_context(self.id).and_then(|ctx| ctx.dirtied.clone())
        })
        .flatten();
        dispatch_dirtied(self.id, callback);
    }

    // =========================================================================
    // Dirty state
    // =========================================================================

    /// Force this node (and its ancestors) to be recomputed on the next pass.
    pub fn mark_dirty(&self) {
        let pending = with_tree(|tree| {
            let mut pending = PendingDirtied::new();
            collect_dirtied(tree, self.id, &mut pending);
            if let Err(err) = tree.mark_dirty(self.id) {
                warn!(node = ?self.id, error = ?err, "failed to mark node dirty");
            }
            pending
        });
        fire_dirtied(pending.unwrap_or_default());
    }

    /// True when the computed layout is stale.
    pub fn is_dirty(&self) -> bool {
        with_tree(|tree| tree.dirty(self.id).unwrap_or(true)).unwrap_or(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    use crate::layout::node_count;
    use crate::types::Unit;

    fn sized(width: f32, height: f32) -> LayoutNode {
        let node = LayoutNode::new();
        node.set_width(width);
        node.set_height(height);
        node
    }

    fn row(width: f32, height: f32) -> LayoutNode {
        let node = sized(width, height);
        node.set_flex_direction(FlexDirection::Row);
        node.set_align_items(Align::FlexStart);
        node
    }

    #[test]
    fn test_getters_return_last_set_values() {
        let node = LayoutNode::new();
        assert_eq!(node.width(), Value::AUTO);
        assert_eq!(node.min_width(), Value::UNDEFINED);

        node.set_width_percent(50.0);
        assert_eq!(node.width(), Value { unit: Unit::Percent, value: 50.0 });

        node.set_margin(Edge::Left, 4.0);
        node.set_margin_auto(Edge::Right);
        assert_eq!(node.margin(Edge::Left), Value::point(4.0));
        assert_eq!(node.margin(Edge::Right), Value::AUTO);
        assert_eq!(node.margin(Edge::Top), Value::UNDEFINED);

        node.set_flex_grow(2.0);
        assert_eq!(node.flex_grow(), 2.0);
        assert_eq!(node.flex_shrink(), 0.0);

        node.set_gap(Gutter::Row, 3.0);
        assert_eq!(node.gap(Gutter::Row), Some(3.0));
        assert_eq!(node.gap(Gutter::Column), None);

        node.set_aspect_ratio(1.5);
        assert_eq!(node.aspect_ratio(), Some(1.5));
        node.set_aspect_ratio(f32::NAN);
        assert_eq!(node.aspect_ratio(), None);

        node.set_is_reference_baseline(true);
        assert!(node.is_reference_baseline());
    }

    #[test]
    fn test_nan_point_value_is_undefined() {
        let node = LayoutNode::new();
        node.set_min_height(f32::NAN);
        assert_eq!(node.min_height(), Value::UNDEFINED);
    }

    #[test]
    fn test_copy_style() {
        let source = sized(12.0, 8.0);
        source.set_justify_content(JustifyContent::SpaceEvenly);

        let target = LayoutNode::new();
        target.copy_style(&source);
        assert_eq!(target.style(), source.style());
        assert_eq!(target.justify_content(), JustifyContent::SpaceEvenly);
    }

    #[test]
    fn test_insert_and_query_children() {
        let parent = LayoutNode::new();
        let a = LayoutNode::new();
        let b = LayoutNode::new();

        parent.insert_child(&a, 0).unwrap();
        parent.insert_child(&b, 0).unwrap();

        assert_eq!(parent.child_count(), 2);
        assert_eq!(parent.child(0), Some(b.id()));
        assert_eq!(parent.child(1), Some(a.id()));
        assert_eq!(parent.child(2), None);
        assert_eq!(a.parent(), Some(parent.id()));
        assert_eq!(parent.parent(), None);
    }

    #[test]
    fn test_insert_out_of_range_is_rejected() {
        let parent = LayoutNode::new();
        let child = LayoutNode::new();

        let err = parent.insert_child(&child, 1).unwrap_err();
        assert!(matches!(err, LayoutError::ChildIndexOutOfRange { index: 1, count: 0 }));
        assert_eq!(parent.child_count(), 0);
        assert_eq!(child.parent(), None);
    }

    #[test]
    fn test_insert_reparents() {
        let first = LayoutNode::new();
        let second = LayoutNode::new();
        let child = LayoutNode::new();

        first.insert_child(&child, 0).unwrap();
        second.insert_child(&child, 0).unwrap();

        assert_eq!(first.child_count(), 0);
        assert_eq!(second.child_count(), 1);
        assert_eq!(child.parent(), Some(second.id()));
    }

    #[test]
    fn test_insert_cycle_is_rejected() {
        let parent = LayoutNode::new();
        let child = LayoutNode::new();
        parent.insert_child(&child, 0).unwrap();

        assert!(matches!(child.insert_child(&parent, 0), Err(LayoutError::Cycle)));
        assert!(matches!(parent.insert_child(&parent, 0), Err(LayoutError::Cycle)));
    }

    #[test]
    fn test_remove_child() {
        let parent = LayoutNode::new();
        let child = LayoutNode::new();
        let grandchild = LayoutNode::new();
        child.insert_child(&grandchild, 0).unwrap();
        parent.insert_child(&child, 0).unwrap();

        parent.remove_child(&child).unwrap();
        assert_eq!(parent.child_count(), 0);
        assert_eq!(child.parent(), None);
        // Subtree survives
        assert_eq!(child.child_count(), 1);

        assert!(matches!(parent.remove_child(&child), Err(LayoutError::NotAChild)));
    }

    #[test]
    fn test_drop_detaches_from_parent() {
        let before = node_count();
        let parent = LayoutNode::new();
        {
            let child = LayoutNode::new();
            parent.insert_child(&child, 0).unwrap();
            assert_eq!(node_count(), before + 2);
        }
        assert_eq!(parent.child_count(), 0);
        assert_eq!(node_count(), before + 1);
    }

    #[test]
    fn test_computed_values_are_zero_before_layout() {
        let node = sized(10.0, 10.0);
        assert_eq!(node.computed_layout(), ComputedLayout::default());
        assert_eq!(node.computed_margin(Edge::Left), 0.0);
    }

    #[test]
    fn test_row_offsets() {
        let root = row(100.0, 20.0);
        let widths = [10.0, 20.0, 30.0];
        let children: Vec<LayoutNode> = widths.iter().map(|w| sized(*w, 5.0)).collect();
        for (i, child) in children.iter().enumerate() {
            root.insert_child(child, i).unwrap();
        }

        root.calculate_layout(None, None, Direction::Ltr);

        let lefts: Vec<f32> = children.iter().map(LayoutNode::computed_left).collect();
        assert_eq!(lefts, vec![0.0, 10.0, 30.0]);
        let sizes: Vec<f32> = children.iter().map(LayoutNode::computed_width).collect();
        assert_eq!(sizes, vec![10.0, 20.0, 30.0]);
        assert_eq!(children[2].computed_right(), 40.0);
        assert_eq!(children[0].computed_bottom(), 15.0);
        assert_eq!(root.computed_width(), 100.0);
    }

    #[test]
    fn test_rtl_mirrors_row() {
        let root = row(100.0, 20.0);
        let a = sized(10.0, 5.0);
        let b = sized(20.0, 5.0);
        root.insert_child(&a, 0).unwrap();
        root.insert_child(&b, 1).unwrap();

        root.calculate_layout(None, None, Direction::Rtl);

        assert_eq!(a.computed_left(), 90.0);
        assert_eq!(b.computed_left(), 70.0);
        assert_eq!(a.computed_right(), 0.0);
    }

    #[test]
    fn test_padding_and_border_offset_children() {
        let root = row(40.0, 10.0);
        root.set_padding(Edge::Left, 2.0);
        root.set_padding(Edge::Top, 1.0);
        root.set_border(Edge::Left, 1.0);

        let child = sized(10.0, 5.0);
        root.insert_child(&child, 0).unwrap();
        root.calculate_layout(None, None, Direction::Ltr);

        assert_eq!(child.computed_left(), 3.0);
        assert_eq!(child.computed_top(), 1.0);
        assert_eq!(root.computed_padding(Edge::Left), 2.0);
        assert_eq!(root.computed_border(Edge::Left), 1.0);
        assert_eq!(root.computed_padding(Edge::All), 0.0);
    }

    #[test]
    fn test_computed_margin_in_rtl() {
        let root = row(100.0, 20.0);
        let child = sized(10.0, 5.0);
        child.set_margin(Edge::Start, 6.0);
        root.insert_child(&child, 0).unwrap();

        root.calculate_layout(None, None, Direction::Ltr);
        assert_eq!(child.computed_margin(Edge::Left), 6.0);
        assert_eq!(child.computed_left(), 6.0);

        root.mark_dirty();
        root.calculate_layout(None, None, Direction::Rtl);
        assert_eq!(child.computed_margin(Edge::Right), 6.0);
        assert_eq!(child.computed_margin(Edge::Start), 6.0);
        assert_eq!(child.computed_left(), 84.0);
    }

    #[test]
    fn test_rtl_keeps_physical_edges_physical() {
        let root = row(100.0, 20.0);
        root.set_padding(Edge::Left, 10.0);
        let child = sized(20.0, 5.0);
        root.insert_child(&child, 0).unwrap();

        root.calculate_layout(None, None, Direction::Rtl);
        assert_eq!(child.computed_left(), 80.0);
        assert_eq!(root.computed_padding(Edge::Left), 10.0);
        assert_eq!(root.computed_padding(Edge::Right), 0.0);
        assert_eq!(root.computed_padding(Edge::Start), 0.0);

        // Back to left-to-right: the padding now leads
        root.calculate_layout(None, None, Direction::Ltr);
        assert_eq!(child.computed_left(), 10.0);
        assert_eq!(root.computed_padding(Edge::Left), 10.0);
        assert_eq!(root.computed_padding(Edge::Start), 10.0);
    }

    #[test]
    fn test_rtl_physical_margin_stays_left() {
        let root = row(100.0, 20.0);
        let child = sized(10.0, 5.0);
        child.set_margin(Edge::Left, 6.0);
        root.insert_child(&child, 0).unwrap();

        root.calculate_layout(None, None, Direction::Rtl);

        // Pushed right-to-left against the right edge; the left margin is free space
        assert_eq!(child.computed_left(), 90.0);
        assert_eq!(child.computed_margin(Edge::Left), 6.0);
        assert_eq!(child.computed_margin(Edge::Right), 0.0);
    }

    #[test]
    fn test_measure_callback_can_read_nodes() {
        let reference = Rc::new(sized(30.0, 4.0));
        let root = row(100.0, 50.0);
        let leaf = LayoutNode::new();

        let seen = reference.clone();
        leaf.set_measure_func(move |_, _, _, _| {
            // Computed values are unavailable mid-pass and read as zero
            assert_eq!(seen.computed_width(), 0.0);
            Size2::new(seen.width().value, 6.0)
        })
        .unwrap();
        root.insert_child(&leaf, 0).unwrap();

        root.calculate_layout(None, None, Direction::Ltr);

        assert_eq!(leaf.computed_width(), 30.0);
        assert_eq!(leaf.computed_height(), 6.0);
    }

    #[test]
    fn test_tree_changes_from_measure_callback_are_rejected() {
        let root = row(100.0, 50.0);
        let parent = Rc::new(LayoutNode::new());
        let orphan = Rc::new(LayoutNode::new());
        let outcome = Rc::new(Cell::new((false, false)));
        let leaf = LayoutNode::new();

        let (target, child, record) = (parent.clone(), orphan.clone(), outcome.clone());
        leaf.set_measure_func(move |_, _, _, _| {
            let insert_busy = matches!(target.insert_child(&child, 0), Err(LayoutError::TreeBusy));
            let create_busy = matches!(LayoutNode::try_new(), Err(LayoutError::TreeBusy));
            record.set((insert_busy, create_busy));
            Size2::ZERO
        })
        .unwrap();
        root.insert_child(&leaf, 0).unwrap();

        root.calculate_layout(None, None, Direction::Ltr);

        assert_eq!(outcome.get(), (true, true));
        assert_eq!(parent.child_count(), 0);
    }

    #[test]
    fn test_measure_func_sizes_leaf() {
        let root = row(100.0, 50.0);
        let leaf = LayoutNode::new();
        leaf.set_measure_func(|_, _, _, _| Size2::new(25.0, 12.0)).unwrap();
        root.insert_child(&leaf, 0).unwrap();

        root.calculate_layout(None, None, Direction::Ltr);

        assert_eq!(leaf.computed_width(), 25.0);
        assert_eq!(leaf.computed_height(), 12.0);
    }

    #[test]
    fn test_measure_and_children_are_exclusive() {
        let measured = LayoutNode::new();
        measured.set_measure_func(|_, _, _, _| Size2::ZERO).unwrap();
        let child = LayoutNode::new();
        assert!(matches!(
            measured.insert_child(&child, 0),
            Err(LayoutError::MeasuredNodeChildren)
        ));

        let parent = LayoutNode::new();
        parent.insert_child(&child, 0).unwrap();
        assert!(matches!(
            parent.set_measure_func(|_, _, _, _| Size2::ZERO),
            Err(LayoutError::HasChildren)
        ));
        assert!(!parent.has_measure_func());
    }

    #[test]
    fn test_unset_measure_falls_back_to_style() {
        let root = row(100.0, 50.0);
        let leaf = LayoutNode::new();
        leaf.set_width(8.0);
        leaf.set_height(4.0);
        leaf.set_measure_func(|_, _, _, _| Size2::new(25.0, 12.0)).unwrap();
        root.insert_child(&leaf, 0).unwrap();

        leaf.unset_measure_func();
        assert!(!leaf.has_measure_func());
        root.calculate_layout(None, None, Direction::Ltr);

        assert_eq!(leaf.computed_width(), 8.0);
        assert_eq!(leaf.computed_height(), 4.0);
    }

    #[test]
    fn test_call_measure_func_without_callback() {
        let node = LayoutNode::new();
        let size = node.call_measure_func(10.0, MeasureMode::AtMost, 10.0, MeasureMode::AtMost);
        assert_eq!(size, Size2::ZERO);
    }

    #[test]
    fn test_dirty_tracking() {
        let root = row(50.0, 10.0);
        let child = sized(10.0, 10.0);
        root.insert_child(&child, 0).unwrap();
        assert!(root.is_dirty());

        root.calculate_layout(None, None, Direction::Ltr);
        assert!(!root.is_dirty());
        assert!(!child.is_dirty());

        // Same value: nothing changes
        child.set_width(10.0);
        assert!(!root.is_dirty());

        child.set_width(12.0);
        assert!(child.is_dirty());
        assert!(root.is_dirty());
    }

    #[test]
    fn test_dirtied_fires_once_per_transition() {
        let root = row(50.0, 10.0);
        let child = sized(10.0, 10.0);
        root.insert_child(&child, 0).unwrap();

        let root_hits = Rc::new(Cell::new(0));
        let child_hits = Rc::new(Cell::new(0));
        let counter = root_hits.clone();
        root.set_dirtied_func(move || counter.set(counter.get() + 1));
        let counter = child_hits.clone();
        child.set_dirtied_func(move || counter.set(counter.get() + 1));

        // Already dirty: no transition
        child.set_width(11.0);
        assert_eq!(child_hits.get(), 0);

        root.calculate_layout(None, None, Direction::Ltr);
        child.set_width(12.0);
        assert_eq!(child_hits.get(), 1);
        assert_eq!(root_hits.get(), 1);

        child.set_width(13.0);
        child.mark_dirty();
        assert_eq!(child_hits.get(), 1);
        assert_eq!(root_hits.get(), 1);

        child.call_dirtied_func();
        assert_eq!(child_hits.get(), 2);

        child.unset_dirtied_func();
        assert!(!child.has_dirtied_func());
        child.call_dirtied_func();
        assert_eq!(child_hits.get(), 2);
    }
}
