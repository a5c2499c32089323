//! NodeStyle - The last-set layout intent of one node.
//!
//! Every `LayoutNode` keeps its `NodeStyle` in the engine's per-node context
//! slot. Getters read from here (never from the engine), so values come back
//! exactly as they were set, units included. The bridge translates it into a
//! Taffy `Style` whenever it changes.

use crate::types::{
    Align, Display, Edge, FlexDirection, FlexWrap, Gutter, JustifyContent, Overflow,
    PositionType, Unit, Value,
};

/// Layout intent for a single node.
///
/// # Property Categories
///
/// - **Container**: direction, flex_wrap, justify_content, align_items, align_content
/// - **Item**: flex, flex_grow, flex_shrink, flex_basis, align_self
/// - **Dimensions**: width, height, min/max width/height, aspect_ratio
/// - **Spacing**: margin, padding, border, gap (per edge / gutter)
/// - **Other**: position_type, position offsets, display, overflow, reference baseline
#[derive(Debug, Clone, PartialEq)]
pub struct NodeStyle {
    // =========================================================================
    // CONTAINER PROPERTIES
    // =========================================================================
    pub direction: FlexDirection,
    pub flex_wrap: FlexWrap,
    pub justify_content: JustifyContent,
    pub align_items: Align,
    pub align_content: Align,

    // =========================================================================
    // ITEM PROPERTIES
    // =========================================================================
    /// `flex` shorthand; only consulted when grow/shrink are unset.
    pub flex: Option<f32>,
    pub flex_grow: Option<f32>,
    pub flex_shrink: Option<f32>,
    pub flex_basis: Value,
    pub align_self: Align,

    // =========================================================================
    // DIMENSIONS
    // =========================================================================
    pub width: Value,
    pub height: Value,
    pub min_width: Value,
    pub min_height: Value,
    pub max_width: Value,
    pub max_height: Value,
    pub aspect_ratio: Option<f32>,

    // =========================================================================
    // SPACING (indexed by `Edge as usize` / `Gutter as usize`)
    // =========================================================================
    pub margin: [Value; Edge::COUNT],
    pub padding: [Value; Edge::COUNT],
    pub border: [Option<f32>; Edge::COUNT],
    pub gap: [Option<f32>; 3],

    // =========================================================================
    // OTHER
    // =========================================================================
    pub position_type: PositionType,
    pub position: [Value; Edge::COUNT],
    pub display: Display,
    pub overflow: Overflow,
    /// Stored for hosts that do their own baseline selection; the engine ignores it.
    pub is_reference_baseline: bool,
}

impl Default for NodeStyle {
    fn default() -> Self {
        Self {
            direction: FlexDirection::Column,
            flex_wrap: FlexWrap::NoWrap,
            justify_content: JustifyContent::FlexStart,
            align_items: Align::Stretch,
            align_content: Align::FlexStart,

            flex: None,
            flex_grow: None,
            flex_shrink: None,
            flex_basis: Value::AUTO,
            align_self: Align::Auto,

            width: Value::AUTO,
            height: Value::AUTO,
            min_width: Value::UNDEFINED,
            min_height: Value::UNDEFINED,
            max_width: Value::UNDEFINED,
            max_height: Value::UNDEFINED,
            aspect_ratio: None,

            margin: [Value::UNDEFINED; Edge::COUNT],
            padding: [Value::UNDEFINED; Edge::COUNT],
            border: [None; Edge::COUNT],
            gap: [None; 3],

            position_type: PositionType::Relative,
            position: [Value::UNDEFINED; Edge::COUNT],
            display: Display::Flex,
            overflow: Overflow::Visible,
            is_reference_baseline: false,
        }
    }
}

impl NodeStyle {
    /// Grow factor after applying the `flex` shorthand.
    pub fn resolved_flex_grow(&self) -> f32 {
        match (self.flex_grow, self.flex) {
            (Some(grow), _) => grow,
            (None, Some(flex)) if flex > 0.0 => flex,
            _ => 0.0,
        }
    }

    /// Shrink factor after applying the `flex` shorthand.
    pub fn resolved_flex_shrink(&self) -> f32 {
        match (self.flex_shrink, self.flex) {
            (Some(shrink), _) => shrink,
            (None, Some(flex)) if flex < 0.0 => -flex,
            _ => 0.0,
        }
    }

    /// Gap for one axis, falling back to the `All` gutter.
    pub fn resolved_gap(&self, gutter: Gutter) -> f32 {
        self.gap[gutter as usize]
            .or(self.gap[Gutter::All as usize])
            .unwrap_or(0.0)
    }
}

/// Resolve one physical edge from a per-edge table.
///
/// Start/End win over Left/Right, which win over Horizontal/Vertical, which
/// win over All. `is_set` decides whether a slot holds a value.
pub fn resolve_edge<T: Copy>(edges: &[T; Edge::COUNT], edge: Edge, is_set: impl Fn(&T) -> bool) -> T {
    let chain: &[Edge] = match edge {
        Edge::Left => &[Edge::Start, Edge::Left, Edge::Horizontal, Edge::All],
        Edge::Right => &[Edge::End, Edge::Right, Edge::Horizontal, Edge::All],
        Edge::Top => &[Edge::Top, Edge::Vertical, Edge::All],
        Edge::Bottom => &[Edge::Bottom, Edge::Vertical, Edge::All],
        Edge::Start => &[Edge::Start, Edge::Horizontal, Edge::All],
        Edge::End => &[Edge::End, Edge::Horizontal, Edge::All],
        Edge::Horizontal => &[Edge::Horizontal, Edge::All],
        Edge::Vertical => &[Edge::Vertical, Edge::All],
        Edge::All => &[Edge::All],
    };

    chain
        .iter()
        .map(|e| edges[*e as usize])
        .find(|value| is_set(value))
        .unwrap_or(edges[edge as usize])
}

/// Resolve a `Value` edge table.
pub fn resolve_value_edge(edges: &[Value; Edge::COUNT], edge: Edge) -> Value {
    resolve_edge(edges, edge, |value| value.unit != Unit::Undefined)
}
