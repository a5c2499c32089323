//! Core types for flexbox-container.
//!
//! Layout enums use the engine's ordinal order so integer-typed host
//! properties convert with `From<u8>`. Unknown ordinals fall back to the
//! default variant.

use serde::{Deserialize, Serialize};

// =============================================================================
// Geometry
// =============================================================================

/// A 2D point or offset in host coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vector2 {
    pub x: f32,
    pub y: f32,
}

impl Vector2 {
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };
    pub const ONE: Self = Self { x: 1.0, y: 1.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// A width/height pair.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size2 {
    pub width: f32,
    pub height: f32,
}

impl Size2 {
    pub const ZERO: Self = Self { width: 0.0, height: 0.0 };

    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

/// Axis-aligned rectangle (position + size).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect2 {
    pub position: Vector2,
    pub size: Size2,
}

impl Rect2 {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            position: Vector2::new(x, y),
            size: Size2::new(width, height),
        }
    }
}

/// Computed box of a layout node, relative to its parent.
///
/// `right`/`bottom` are the distances from the parent's right/bottom edges.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ComputedLayout {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
    pub width: f32,
    pub height: f32,
}

impl ComputedLayout {
    /// The layout as a host rectangle.
    pub const fn rect(&self) -> Rect2 {
        Rect2::new(self.left, self.top, self.width, self.height)
    }
}

// =============================================================================
// Style values
// =============================================================================

/// Unit tag of a style value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum Unit {
    #[default]
    Undefined = 0,
    Point = 1,
    Percent = 2,
    Auto = 3,
}

/// A style value tagged with its unit, as returned by dimension getters.
///
/// Percent magnitudes are in the 0-100 range.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Value {
    pub unit: Unit,
    pub value: f32,
}

impl Value {
    pub const UNDEFINED: Self = Self { unit: Unit::Undefined, value: 0.0 };
    pub const AUTO: Self = Self { unit: Unit::Auto, value: 0.0 };

    pub const fn point(value: f32) -> Self {
        Self { unit: Unit::Point, value }
    }

    pub const fn percent(value: f32) -> Self {
        Self { unit: Unit::Percent, value }
    }

    pub const fn is_undefined(&self) -> bool {
        matches!(self.unit, Unit::Undefined)
    }
}

// =============================================================================
// Flex Enums - For layout
// =============================================================================

/// Flex direction for container layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum FlexDirection {
    #[default]
    Column = 0,
    ColumnReverse = 1,
    Row = 2,
    RowReverse = 3,
}

impl From<u8> for FlexDirection {
    fn from(value: u8) -> Self {
        match value {
            0 => Self::Column,
            1 => Self::ColumnReverse,
            2 => Self::Row,
            3 => Self::RowReverse,
            _ => Self::Column,
        }
    }
}

/// Flex wrap behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum FlexWrap {
    #[default]
    NoWrap = 0,
    Wrap = 1,
    WrapReverse = 2,
}

impl From<u8> for FlexWrap {
    fn from(value: u8) -> Self {
        match value {
            1 => Self::Wrap,
            2 => Self::WrapReverse,
            _ => Self::NoWrap,
        }
    }
}

/// Justify content (main axis alignment).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum JustifyContent {
    #[default]
    FlexStart = 0,
    Center = 1,
    FlexEnd = 2,
    SpaceBetween = 3,
    SpaceAround = 4,
    SpaceEvenly = 5,
}

impl From<u8> for JustifyContent {
    fn from(value: u8) -> Self {
        match value {
            1 => Self::Center,
            2 => Self::FlexEnd,
            3 => Self::SpaceBetween,
            4 => Self::SpaceAround,
            5 => Self::SpaceEvenly,
            _ => Self::FlexStart,
        }
    }
}

/// Cross axis alignment, shared by align-items, align-content and align-self.
///
/// `Auto` only has meaning for align-self (inherit the parent's align-items);
/// elsewhere it resolves to the engine default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum Align {
    #[default]
    Auto = 0,
    FlexStart = 1,
    Center = 2,
    FlexEnd = 3,
    Stretch = 4,
    Baseline = 5,
    SpaceBetween = 6,
    SpaceAround = 7,
}

impl From<u8> for Align {
    fn from(value: u8) -> Self {
        match value {
            1 => Self::FlexStart,
            2 => Self::Center,
            3 => Self::FlexEnd,
            4 => Self::Stretch,
            5 => Self::Baseline,
            6 => Self::SpaceBetween,
            7 => Self::SpaceAround,
            _ => Self::Auto,
        }
    }
}

/// Position type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum PositionType {
    Static = 0,
    #[default]
    Relative = 1,
    Absolute = 2,
}

impl From<u8> for PositionType {
    fn from(value: u8) -> Self {
        match value {
            0 => Self::Static,
            2 => Self::Absolute,
            _ => Self::Relative,
        }
    }
}

/// Whether a node takes part in layout at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum Display {
    #[default]
    Flex = 0,
    None = 1,
}

impl From<u8> for Display {
    fn from(value: u8) -> Self {
        match value {
            1 => Self::None,
            _ => Self::Flex,
        }
    }
}

/// Overflow behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum Overflow {
    #[default]
    Visible = 0,
    Hidden = 1,
    Scroll = 2,
}

impl From<u8> for Overflow {
    fn from(value: u8) -> Self {
        match value {
            1 => Self::Hidden,
            2 => Self::Scroll,
            _ => Self::Visible,
        }
    }
}

/// Box edge selector for margin, padding, border and position offsets.
///
/// `Start`/`End` follow the layout direction; `Horizontal`, `Vertical` and
/// `All` are shorthands that only apply where no more specific edge is set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum Edge {
    Left = 0,
    Top = 1,
    Right = 2,
    Bottom = 3,
    Start = 4,
    End = 5,
    Horizontal = 6,
    Vertical = 7,
    All = 8,
}

impl Edge {
    pub const COUNT: usize = 9;

    /// True for the shorthand edges that cannot be read back from a computed layout.
    pub const fn is_shorthand(&self) -> bool {
        matches!(self, Self::Horizontal | Self::Vertical | Self::All)
    }
}

impl From<u8> for Edge {
    fn from(value: u8) -> Self {
        match value {
            0 => Self::Left,
            1 => Self::Top,
            2 => Self::Right,
            3 => Self::Bottom,
            4 => Self::Start,
            5 => Self::End,
            6 => Self::Horizontal,
            7 => Self::Vertical,
            _ => Self::All,
        }
    }
}

/// Gap axis selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum Gutter {
    Column = 0,
    Row = 1,
    All = 2,
}

impl From<u8> for Gutter {
    fn from(value: u8) -> Self {
        match value {
            0 => Self::Column,
            1 => Self::Row,
            _ => Self::All,
        }
    }
}

/// Base text/box direction passed to a layout pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum Direction {
    #[default]
    Inherit = 0,
    Ltr = 1,
    Rtl = 2,
}

impl From<u8> for Direction {
    fn from(value: u8) -> Self {
        match value {
            1 => Self::Ltr,
            2 => Self::Rtl,
            _ => Self::Inherit,
        }
    }
}

/// How a measurement constraint should be interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum MeasureMode {
    /// No constraint; the accompanying size is NaN.
    #[default]
    Undefined = 0,
    /// The result must be exactly the given size.
    Exactly = 1,
    /// The result may be at most the given size.
    AtMost = 2,
}

impl From<u8> for MeasureMode {
    fn from(value: u8) -> Self {
        match value {
            1 => Self::Exactly,
            2 => Self::AtMost,
            _ => Self::Undefined,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enum_ordinals() {
        assert_eq!(FlexDirection::from(2), FlexDirection::Row);
        assert_eq!(FlexDirection::Row as u8, 2);
        assert_eq!(Align::from(4), Align::Stretch);
        assert_eq!(JustifyContent::from(5), JustifyContent::SpaceEvenly);
        assert_eq!(FlexWrap::from(2), FlexWrap::WrapReverse);
    }

    #[test]
    fn test_unknown_ordinal_falls_back() {
        assert_eq!(FlexDirection::from(42), FlexDirection::Column);
        assert_eq!(Align::from(200), Align::Auto);
        assert_eq!(PositionType::from(9), PositionType::Relative);
        assert_eq!(Edge::from(99), Edge::All);
    }

    #[test]
    fn test_value_constructors() {
        assert_eq!(Value::point(12.0).unit, Unit::Point);
        assert_eq!(Value::percent(50.0).value, 50.0);
        assert!(Value::UNDEFINED.is_undefined());
        assert!(!Value::AUTO.is_undefined());
    }

    #[test]
    fn test_computed_layout_rect() {
        let layout = ComputedLayout {
            left: 4.0,
            top: 2.0,
            right: 0.0,
            bottom: 0.0,
            width: 10.0,
            height: 5.0,
        };
        assert_eq!(layout.rect(), Rect2::new(4.0, 2.0, 10.0, 5.0));
    }
}
