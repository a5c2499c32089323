//! Taffy Bridge - Translates `NodeStyle` into Taffy styles.
//!
//! Taffy only knows physical edges, CSS alignment keywords and
//! fraction-based percentages. The conversions below resolve edge shorthands,
//! map engine-specific alignment values onto their CSS equivalents and scale
//! percentages from 0-100 to 0-1.
//!
//! Right-to-left passes are solved as mirrored left-to-right passes. In that
//! mirrored frame the physical Left and Right entries trade places while
//! Start and End stay on the solver's leading and trailing sides, so once the
//! result is mirrored back every edge lands where it was asked for.

use taffy::{
    AlignContent as TaffyAlignContent, AlignItems as TaffyAlignItems,
    Dimension as TaffyDimension, Display as TaffyDisplay, FlexDirection as TaffyFlexDirection,
    FlexWrap as TaffyFlexWrap, JustifyContent as TaffyJustifyContent, LengthPercentage,
    LengthPercentageAuto, Overflow as TaffyOverflow, Point, Position as TaffyPosition, Rect, Size,
    Style,
};

use crate::types::{
    Align, Display, Edge, FlexDirection, FlexWrap, Gutter, JustifyContent, Overflow,
    PositionType, Unit, Value,
};

use super::style::{resolve_edge, resolve_value_edge, NodeStyle};

// =============================================================================
// VALUE CONVERSION
// =============================================================================

/// Sizes: undefined and auto both mean "let content and flex rules decide".
fn to_taffy_dimension(value: Value) -> TaffyDimension {
    match value.unit {
        Unit::Point => TaffyDimension::Length(value.value),
        Unit::Percent => TaffyDimension::Percent(value.value / 100.0),
        Unit::Auto | Unit::Undefined => TaffyDimension::Auto,
    }
}

/// Margins: undefined is zero, auto absorbs free space.
fn to_taffy_margin(value: Value) -> LengthPercentageAuto {
    match value.unit {
        Unit::Point => LengthPercentageAuto::Length(value.value),
        Unit::Percent => LengthPercentageAuto::Percent(value.value / 100.0),
        Unit::Auto => LengthPercentageAuto::Auto,
        Unit::Undefined => LengthPercentageAuto::Length(0.0),
    }
}

/// Insets: undefined leaves the offset unset.
fn to_taffy_inset(value: Value) -> LengthPercentageAuto {
    match value.unit {
        Unit::Point => LengthPercentageAuto::Length(value.value),
        Unit::Percent => LengthPercentageAuto::Percent(value.value / 100.0),
        Unit::Auto | Unit::Undefined => LengthPercentageAuto::Auto,
    }
}

fn to_taffy_padding(value: Value) -> LengthPercentage {
    match value.unit {
        Unit::Point => LengthPercentage::Length(value.value),
        Unit::Percent => LengthPercentage::Percent(value.value / 100.0),
        Unit::Auto | Unit::Undefined => LengthPercentage::Length(0.0),
    }
}

/// Edge table as seen by the solver for a pass in the given direction.
fn flow_edges<T: Copy>(edges: &[T; Edge::COUNT], rtl: bool) -> [T; Edge::COUNT] {
    let mut flow = *edges;
    if rtl {
        flow.swap(Edge::Left as usize, Edge::Right as usize);
    }
    flow
}

fn physical_rect<T>(mut f: impl FnMut(Edge) -> T) -> Rect<T> {
    Rect {
        left: f(Edge::Left),
        right: f(Edge::Right),
        top: f(Edge::Top),
        bottom: f(Edge::Bottom),
    }
}

// =============================================================================
// ENUM CONVERSIONS
// =============================================================================

fn to_taffy_flex_direction(dir: FlexDirection) -> TaffyFlexDirection {
    match dir {
        FlexDirection::Column => TaffyFlexDirection::Column,
        FlexDirection::ColumnReverse => TaffyFlexDirection::ColumnReverse,
        FlexDirection::Row => TaffyFlexDirection::Row,
        FlexDirection::RowReverse => TaffyFlexDirection::RowReverse,
    }
}

fn to_taffy_flex_wrap(wrap: FlexWrap) -> TaffyFlexWrap {
    match wrap {
        FlexWrap::NoWrap => TaffyFlexWrap::NoWrap,
        FlexWrap::Wrap => TaffyFlexWrap::Wrap,
        FlexWrap::WrapReverse => TaffyFlexWrap::WrapReverse,
    }
}

fn to_taffy_justify_content(justify: JustifyContent) -> Option<TaffyJustifyContent> {
    Some(match justify {
        JustifyContent::FlexStart => TaffyJustifyContent::FlexStart,
        JustifyContent::Center => TaffyJustifyContent::Center,
        JustifyContent::FlexEnd => TaffyJustifyContent::FlexEnd,
        JustifyContent::SpaceBetween => TaffyJustifyContent::SpaceBetween,
        JustifyContent::SpaceAround => TaffyJustifyContent::SpaceAround,
        JustifyContent::SpaceEvenly => TaffyJustifyContent::SpaceEvenly,
    })
}

/// Item alignment. `Auto` defers to the parent (align-self) or the engine
/// default (align-items); distribution keywords have no per-item meaning and
/// fall back to flex-start.
fn to_taffy_align_items(align: Align) -> Option<TaffyAlignItems> {
    match align {
        Align::Auto => None,
        Align::FlexStart | Align::SpaceBetween | Align::SpaceAround => {
            Some(TaffyAlignItems::FlexStart)
        }
        Align::Center => Some(TaffyAlignItems::Center),
        Align::FlexEnd => Some(TaffyAlignItems::FlexEnd),
        Align::Stretch => Some(TaffyAlignItems::Stretch),
        Align::Baseline => Some(TaffyAlignItems::Baseline),
    }
}

/// Line alignment. Lines have no baseline and no "auto", both pack at the start.
fn to_taffy_align_content(align: Align) -> Option<TaffyAlignContent> {
    Some(match align {
        Align::Auto | Align::FlexStart | Align::Baseline => TaffyAlignContent::FlexStart,
        Align::Center => TaffyAlignContent::Center,
        Align::FlexEnd => TaffyAlignContent::FlexEnd,
        Align::Stretch => TaffyAlignContent::Stretch,
        Align::SpaceBetween => TaffyAlignContent::SpaceBetween,
        Align::SpaceAround => TaffyAlignContent::SpaceAround,
    })
}

fn to_taffy_overflow(overflow: Overflow) -> TaffyOverflow {
    match overflow {
        Overflow::Visible => TaffyOverflow::Visible,
        Overflow::Hidden => TaffyOverflow::Hidden,
        Overflow::Scroll => TaffyOverflow::Scroll,
    }
}

fn to_taffy_display(display: Display) -> TaffyDisplay {
    match display {
        Display::Flex => TaffyDisplay::Flex,
        Display::None => TaffyDisplay::None,
    }
}

// =============================================================================
// STYLE BUILDING
// =============================================================================

/// Build a Taffy `Style` from a `NodeStyle`, for a left-to-right or a
/// mirrored right-to-left solve.
pub(crate) fn to_taffy_style(node: &NodeStyle, rtl: bool) -> Style {
    let overflow = to_taffy_overflow(node.overflow);
    let position = flow_edges(&node.position, rtl);
    let margin = flow_edges(&node.margin, rtl);
    let padding = flow_edges(&node.padding, rtl);
    let border = flow_edges(&node.border, rtl);

    Style {
        display: to_taffy_display(node.display),
        // Static is relative positioning with the offsets ignored
        position: match node.position_type {
            PositionType::Absolute => TaffyPosition::Absolute,
            PositionType::Static | PositionType::Relative => TaffyPosition::Relative,
        },
        inset: if node.position_type == PositionType::Static {
            physical_rect(|_| LengthPercentageAuto::Auto)
        } else {
            physical_rect(|edge| to_taffy_inset(resolve_value_edge(&position, edge)))
        },

        // Flex container properties
        flex_direction: to_taffy_flex_direction(node.direction),
        flex_wrap: to_taffy_flex_wrap(node.flex_wrap),
        justify_content: to_taffy_justify_content(node.justify_content),
        align_items: to_taffy_align_items(node.align_items),
        align_content: to_taffy_align_content(node.align_content),

        // Flex item properties
        flex_grow: node.resolved_flex_grow(),
        flex_shrink: node.resolved_flex_shrink(),
        flex_basis: to_taffy_dimension(node.flex_basis),
        align_self: to_taffy_align_items(node.align_self),

        // Dimensions
        size: Size {
            width: to_taffy_dimension(node.width),
            height: to_taffy_dimension(node.height),
        },
        min_size: Size {
            width: to_taffy_dimension(node.min_width),
            height: to_taffy_dimension(node.min_height),
        },
        max_size: Size {
            width: to_taffy_dimension(node.max_width),
            height: to_taffy_dimension(node.max_height),
        },
        aspect_ratio: node.aspect_ratio,

        // Spacing
        margin: physical_rect(|edge| to_taffy_margin(resolve_value_edge(&margin, edge))),
        padding: physical_rect(|edge| to_taffy_padding(resolve_value_edge(&padding, edge))),
        border: physical_rect(|edge| {
            let width = resolve_edge(&border, edge, Option::is_some).unwrap_or(0.0);
            LengthPercentage::Length(width)
        }),
        gap: Size {
            width: LengthPercentage::Length(node.resolved_gap(Gutter::Column)),
            height: LengthPercentage::Length(node.resolved_gap(Gutter::Row)),
        },

        overflow: Point { x: overflow, y: overflow },

        ..Default::default()
    }
}
