//! Widget - What the container needs from a host widget.
//!
//! The container only reads a widget's geometry and flags and writes its
//! transform; it never owns widgets or controls their lifetime.

use bitflags::bitflags;

use crate::types::{Size2, Vector2};

/// Stable per-widget key (e.g. a host instance id).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WidgetId(pub u64);

impl From<u64> for WidgetId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

bitflags! {
    /// Per-axis sizing hints a widget gives its container.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct SizeFlags: u16 {
        /// Fill the space assigned on this axis.
        const FILL = 1 << 0;
        /// Claim extra space on this axis.
        const EXPAND = 1 << 1;
        /// Give up space, keeping the content centered.
        const SHRINK_CENTER = 1 << 2;
        /// Give up space, keeping the content at the end.
        const SHRINK_END = 1 << 3;

        const EXPAND_FILL = Self::FILL.bits() | Self::EXPAND.bits();
    }
}

impl SizeFlags {
    pub const fn expands(&self) -> bool {
        self.contains(Self::EXPAND)
    }

    pub const fn shrinks(&self) -> bool {
        self.intersects(Self::SHRINK_CENTER.union(Self::SHRINK_END))
    }
}

/// A child laid out by a [`FlexContainer`](super::FlexContainer).
pub trait Widget {
    /// Key used to find this widget's layout proxy across cycles.
    fn widget_id(&self) -> WidgetId;

    fn is_visible(&self) -> bool;

    /// Top-level widgets position themselves and are skipped by containers.
    fn is_top_level(&self) -> bool {
        false
    }

    /// Current size, used as the proxy's initial width/height.
    fn size(&self) -> Size2;

    fn h_size_flags(&self) -> SizeFlags {
        SizeFlags::FILL
    }

    fn v_size_flags(&self) -> SizeFlags {
        SizeFlags::FILL
    }

    /// Weight of this widget's share of grow/shrink space.
    fn stretch_ratio(&self) -> f32 {
        1.0
    }

    fn set_position(&mut self, position: Vector2);

    fn set_size(&mut self, size: Size2);

    fn set_rotation(&mut self, radians: f32);

    fn set_scale(&mut self, scale: Vector2);
}

impl<W: Widget + ?Sized> Widget for Box<W> {
    fn widget_id(&self) -> WidgetId {
        (**self).widget_id()
    }

    fn is_visible(&self) -> bool {
        (**self).is_visible()
    }

    fn is_top_level(&self) -> bool {
        (**self).is_top_level()
    }

    fn size(&self) -> Size2 {
        (**self).size()
    }

    fn h_size_flags(&self) -> SizeFlags {
        (**self).h_size_flags()
    }

    fn v_size_flags(&self) -> SizeFlags {
        (**self).v_size_flags()
    }

    fn stretch_ratio(&self) -> f32 {
        (**self).stretch_ratio()
    }

    fn set_position(&mut self, position: Vector2) {
        (**self).set_position(position)
    }

    fn set_size(&mut self, size: Size2) {
        (**self).set_size(size)
    }

    fn set_rotation(&mut self, radians: f32) {
        (**self).set_rotation(radians)
    }

    fn set_scale(&mut self, scale: Vector2) {
        (**self).set_scale(scale)
    }
}

impl<W: Widget + ?Sized> Widget for &mut W {
    fn widget_id(&self) -> WidgetId {
        (**self).widget_id()
    }

    fn is_visible(&self) -> bool {
        (**self).is_visible()
    }

    fn is_top_level(&self) -> bool {
        (**self).is_top_level()
    }

    fn size(&self) -> Size2 {
        (**self).size()
    }

    fn h_size_flags(&self) -> SizeFlags {
        (**self).h_size_flags()
    }

    fn v_size_flags(&self) -> SizeFlags {
        (**self).v_size_flags()
    }

    fn stretch_ratio(&self) -> f32 {
        (**self).stretch_ratio()
    }

    fn set_position(&mut self, position: Vector2) {
        (**self).set_position(position)
    }

    fn set_size(&mut self, size: Size2) {
        (**self).set_size(size)
    }

    fn set_rotation(&mut self, radians: f32) {
        (**self).set_rotation(radians)
    }

    fn set_scale(&mut self, scale: Vector2) {
        (**self).set_scale(scale)
    }
}
