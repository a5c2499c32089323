//! FlexContainer - Lays out a widget's direct children with flexbox.
//!
//! Each visible child widget gets a proxy `LayoutNode` under the container's
//! root node. A sort cycle reconciles widgets into proxies, runs the flex
//! solver on the root and writes the computed rectangles back onto the
//! widgets.
//!
//! Property setters and notifications only queue a cycle. The host drains
//! the queue with [`FlexContainer::flush`] (or watches
//! [`FlexContainer::sort_queued_signal`] in an effect), so any number of
//! changes in one tick cost a single layout pass.

use std::collections::{HashMap, HashSet};
use std::fmt;

use spark_signals::{signal, Signal};
use tracing::{debug, trace, warn};

use crate::layout::LayoutNode;
use crate::types::{
    Align, Direction, FlexDirection, FlexWrap, JustifyContent, Rect2, Size2, Vector2,
};

use super::config::ContainerConfig;
use super::widget::{Widget, WidgetId};

/// Host events a container reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notification {
    /// A child was added, removed, reordered or changed visibility.
    ChildrenChanged,
    /// The container's own rectangle changed.
    Resized,
    ThemeChanged,
    TranslationChanged,
}

pub struct FlexContainer {
    root: LayoutNode,
    proxies: HashMap<WidgetId, LayoutNode>,
    sort_queued: Signal<bool>,
    minimum_size_revision: Signal<u64>,
}

impl FlexContainer {
    pub fn new() -> Self {
        Self::with_config(ContainerConfig::default())
    }

    pub fn with_config(config: ContainerConfig) -> Self {
        let root = LayoutNode::new();
        root.set_flex_direction(config.direction);
        root.set_justify_content(config.justify_content);
        root.set_align_items(config.align_items);
        root.set_align_content(config.align_content);
        root.set_flex_wrap(config.flex_wrap);

        Self {
            root,
            proxies: HashMap::new(),
            sort_queued: signal(false),
            minimum_size_revision: signal(0),
        }
    }

    /// Current container properties, read back from the root node.
    pub fn config(&self) -> ContainerConfig {
        ContainerConfig {
            direction: self.direction(),
            justify_content: self.justify_content(),
            align_items: self.align_items(),
            align_content: self.align_content(),
            flex_wrap: self.flex_wrap(),
        }
    }

    // =========================================================================
    // Properties
    // =========================================================================

    pub fn set_direction(&self, direction: FlexDirection) {
        self.root.set_flex_direction(direction);
        self.queue_sort();
    }

    pub fn direction(&self) -> FlexDirection {
        self.root.flex_direction()
    }

    pub fn set_align_items(&self, align: Align) {
        self.root.set_align_items(align);
        self.queue_sort();
    }

    pub fn align_items(&self) -> Align {
        self.root.align_items()
    }

    pub fn set_justify_content(&self, justify: JustifyContent) {
        self.root.set_justify_content(justify);
        self.queue_sort();
    }

    pub fn justify_content(&self) -> JustifyContent {
        self.root.justify_content()
    }

    pub fn set_align_content(&self, align: Align) {
        self.root.set_align_content(align);
        self.queue_sort();
    }

    pub fn align_content(&self) -> Align {
        self.root.align_content()
    }

    pub fn set_flex_wrap(&self, wrap: FlexWrap) {
        self.root.set_flex_wrap(wrap);
        self.queue_sort();
    }

    pub fn flex_wrap(&self) -> FlexWrap {
        self.root.flex_wrap()
    }

    // =========================================================================
    // Scheduling
    // =========================================================================

    /// Request a sort cycle. Repeated requests collapse into one.
    pub fn queue_sort(&self) {
        if !self.sort_queued.get() {
            self.sort_queued.set(true);
        }
    }

    pub fn is_sort_queued(&self) -> bool {
        self.sort_queued.get()
    }

    /// The queued flag as a signal, for hosts that drive cycles from effects.
    pub fn sort_queued_signal(&self) -> Signal<bool> {
        self.sort_queued.clone()
    }

    pub fn notification(&self, what: Notification) {
        trace!(?what, "container notification");
        match what {
            Notification::ChildrenChanged
            | Notification::Resized
            | Notification::TranslationChanged => self.queue_sort(),
            Notification::ThemeChanged => {
                self.minimum_size_changed();
                self.queue_sort();
            }
        }
    }

    /// Run a sort cycle if one is queued. Returns whether one ran.
    pub fn flush<W: Widget>(&mut self, size: Size2, children: &mut [W]) -> bool {
        if !self.is_sort_queued() {
            return false;
        }
        self.sort_children(size, children);
        true
    }

    // =========================================================================
    // Sort cycle
    // =========================================================================

    /// Reconcile, lay out and position `children` inside a content rectangle
    /// of `size`.
    ///
    /// Invisible and top-level widgets are skipped: they get no geometry and
    /// their siblings are laid out as if they were absent.
    pub fn sort_children<W: Widget>(&mut self, size: Size2, children: &mut [W]) {
        self.reconcile(children);

        self.root.set_width(size.width);
        self.root.set_height(size.height);
        self.root.calculate_layout(None, None, Direction::Ltr);

        let mut applied = 0usize;
        let mut seen = HashSet::with_capacity(children.len());
        for child in children.iter_mut() {
            // Repeats were skipped by reconcile and own no slot
            if !seen.insert(child.widget_id()) || !is_laid_out(&*child) {
                continue;
            }
            let Some(proxy) = self.proxies.get(&child.widget_id()) else {
                continue;
            };
            let rect = proxy.computed_layout().rect();
            trace!(widget = child.widget_id().0, x = rect.position.x, y = rect.position.y,
                width = rect.size.width, height = rect.size.height, "fit child");
            Self::fit_child_in_rect(child, rect);
            applied += 1;
        }

        debug!(children = applied, proxies = self.proxies.len(), width = size.width,
            height = size.height, "sort cycle complete");

        self.sort_queued.set(false);
        self.minimum_size_changed();
    }

    /// Place `child` exactly on `rect`, clearing any rotation or scale.
    pub fn fit_child_in_rect<W: Widget + ?Sized>(child: &mut W, rect: Rect2) {
        child.set_position(rect.position);
        child.set_size(rect.size);
        child.set_rotation(0.0);
        child.set_scale(Vector2::ONE);
    }

    /// Make the root's children exactly the proxies of the laid-out widgets,
    /// in widget order.
    fn reconcile<W: Widget>(&mut self, children: &[W]) {
        let present: HashSet<WidgetId> = children.iter().map(Widget::widget_id).collect();
        let before = self.proxies.len();
        // Dropping a proxy detaches it from the root
        self.proxies.retain(|id, _| present.contains(id));
        if self.proxies.len() != before {
            debug!(pruned = before - self.proxies.len(), "dropped proxies of removed widgets");
        }

        let root_id = self.root.id();
        let mut seen = HashSet::with_capacity(children.len());
        let mut slot = 0usize;

        for child in children {
            let id = child.widget_id();
            if !seen.insert(id) {
                warn!(widget = id.0, "widget listed twice in one container, ignoring repeat");
                continue;
            }

            if !is_laid_out(child) {
                if let Some(proxy) = self.proxies.get(&id) {
                    if proxy.parent() == Some(root_id) {
                        if let Err(err) = self.root.remove_child(proxy) {
                            warn!(widget = id.0, error = %err, "failed to detach proxy");
                        }
                    }
                }
                continue;
            }

            let proxy = self.proxies.entry(id).or_insert_with(|| {
                trace!(widget = id.0, "creating proxy");
                create_proxy(child)
            });

            if self.root.child(slot) != Some(proxy.id()) {
                if let Err(err) = self.root.insert_child(proxy, slot) {
                    warn!(widget = id.0, slot, error = %err, "failed to attach proxy");
                    continue;
                }
            }
            slot += 1;
        }
    }

    // =========================================================================
    // Sizing
    // =========================================================================

    /// The container does not derive a minimum from its content.
    pub fn minimum_size(&self) -> Size2 {
        Size2::ZERO
    }

    /// Bumped every time the host should re-query [`minimum_size`](Self::minimum_size).
    pub fn minimum_size_signal(&self) -> Signal<u64> {
        self.minimum_size_revision.clone()
    }

    fn minimum_size_changed(&self) {
        let revision = self.minimum_size_revision.get();
        self.minimum_size_revision.set(revision.wrapping_add(1));
    }

    // =========================================================================
    // Inspection
    // =========================================================================

    pub fn proxy(&self, id: WidgetId) -> Option<&LayoutNode> {
        self.proxies.get(&id)
    }

    pub fn proxy_count(&self) -> usize {
        self.proxies.len()
    }

    pub fn root(&self) -> &LayoutNode {
        &self.root
    }
}

impl Default for FlexContainer {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for FlexContainer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FlexContainer")
            .field("root", &self.root)
            .field("proxies", &self.proxies.len())
            .field("sort_queued", &self.sort_queued.get())
            .finish()
    }
}

fn is_laid_out<W: Widget + ?Sized>(widget: &W) -> bool {
    widget.is_visible() && !widget.is_top_level()
}

/// Build a proxy from the widget's current size and size flags.
///
/// Horizontal and vertical flags are combined: expanding on either axis
/// grows along the container's main axis.
fn create_proxy<W: Widget + ?Sized>(widget: &W) -> LayoutNode {
    let proxy = LayoutNode::new();
    let size = widget.size();
    proxy.set_width(size.width);
    proxy.set_height(size.height);

    let flags = widget.h_size_flags() | widget.v_size_flags();
    let ratio = widget.stretch_ratio();
    if flags.expands() {
        proxy.set_flex_grow(ratio);
        proxy.set_flex_shrink(1.0);
    } else if flags.shrinks() {
        proxy.set_flex_shrink(ratio);
    }
    proxy
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::SizeFlags;
    use spark_signals::effect;
    use std::cell::Cell;
    use std::rc::Rc;

    struct Stub {
        id: u64,
        size: Size2,
        flags: SizeFlags,
        ratio: f32,
        position: Vector2,
        fits: u32,
    }

    impl Stub {
        fn new(id: u64, width: f32, height: f32) -> Self {
            Self {
                id,
                size: Size2::new(width, height),
                flags: SizeFlags::FILL,
                ratio: 1.0,
                position: Vector2::ZERO,
                fits: 0,
            }
        }
    }

    impl Widget for Stub {
        fn widget_id(&self) -> WidgetId {
            WidgetId(self.id)
        }
        fn is_visible(&self) -> bool {
            true
        }
        fn size(&self) -> Size2 {
            self.size
        }
        fn h_size_flags(&self) -> SizeFlags {
            self.flags
        }
        fn stretch_ratio(&self) -> f32 {
            self.ratio
        }
        fn set_position(&mut self, position: Vector2) {
            self.position = position;
        }
        fn set_size(&mut self, size: Size2) {
            self.size = size;
            self.fits += 1;
        }
        fn set_rotation(&mut self, _radians: f32) {}
        fn set_scale(&mut self, _scale: Vector2) {}
    }

    #[test]
    fn test_root_defaults_to_start_aligned_row() {
        let container = FlexContainer::new();
        assert_eq!(container.direction(), FlexDirection::Row);
        assert_eq!(container.align_items(), Align::FlexStart);
        assert_eq!(container.config(), ContainerConfig::default());
        assert!(!container.is_sort_queued());
    }

    #[test]
    fn test_setters_only_queue() {
        let mut container = FlexContainer::new();
        let mut children = vec![Stub::new(1, 10.0, 10.0)];

        container.set_direction(FlexDirection::Column);
        container.set_justify_content(JustifyContent::Center);
        assert!(container.is_sort_queued());
        assert_eq!(container.proxy_count(), 0);
        assert_eq!(children[0].position, Vector2::ZERO);

        assert!(container.flush(Size2::new(100.0, 100.0), &mut children));
        assert!(!container.is_sort_queued());
        assert_eq!(container.proxy_count(), 1);
        assert_eq!(children[0].position, Vector2::new(0.0, 45.0));

        assert!(!container.flush(Size2::new(100.0, 100.0), &mut children));
    }

    #[test]
    fn test_notifications_queue_sort() {
        for what in [
            Notification::ChildrenChanged,
            Notification::Resized,
            Notification::ThemeChanged,
            Notification::TranslationChanged,
        ] {
            let container = FlexContainer::new();
            container.notification(what);
            assert!(container.is_sort_queued(), "{what:?} should queue a sort");
        }
    }

    #[test]
    fn test_theme_change_requests_minimum_size() {
        let container = FlexContainer::new();
        let revision = container.minimum_size_signal();
        let before = revision.get();

        container.notification(Notification::ThemeChanged);
        assert_eq!(revision.get(), before + 1);

        container.notification(Notification::Resized);
        assert_eq!(revision.get(), before + 1);
        assert_eq!(container.minimum_size(), Size2::ZERO);
    }

    #[test]
    fn test_sort_queued_signal_drives_effect() {
        let container = FlexContainer::new();
        let queued = container.sort_queued_signal();

        let runs = Rc::new(Cell::new(0));
        let counter = runs.clone();
        let _effect = effect(move || {
            if queued.get() {
                counter.set(counter.get() + 1);
            }
        });

        container.queue_sort();
        container.queue_sort();
        container.set_flex_wrap(FlexWrap::Wrap);
        assert_eq!(runs.get(), 1);
    }

    #[test]
    fn test_expand_translates_to_grow() {
        let mut container = FlexContainer::new();
        let mut expanding = Stub::new(1, 10.0, 10.0);
        expanding.flags = SizeFlags::EXPAND_FILL;
        expanding.ratio = 2.5;
        let mut shrinking = Stub::new(2, 10.0, 10.0);
        shrinking.flags = SizeFlags::SHRINK_CENTER;
        shrinking.ratio = 0.5;
        let mut children = vec![expanding, shrinking, Stub::new(3, 10.0, 10.0)];

        container.sort_children(Size2::new(100.0, 20.0), &mut children);

        let grow = container.proxy(WidgetId(1)).unwrap();
        assert_eq!(grow.flex_grow(), 2.5);
        assert_eq!(grow.flex_shrink(), 1.0);

        let shrink = container.proxy(WidgetId(2)).unwrap();
        assert_eq!(shrink.flex_grow(), 0.0);
        assert_eq!(shrink.flex_shrink(), 0.5);

        let plain = container.proxy(WidgetId(3)).unwrap();
        assert_eq!(plain.flex_grow(), 0.0);
        assert_eq!(plain.flex_shrink(), 0.0);
    }

    #[test]
    fn test_fit_child_in_rect_overrides_transform() {
        let mut child = Stub::new(1, 5.0, 5.0);
        FlexContainer::fit_child_in_rect(&mut child, Rect2::new(3.0, 4.0, 30.0, 40.0));
        assert_eq!(child.position, Vector2::new(3.0, 4.0));
        assert_eq!(child.size, Size2::new(30.0, 40.0));
    }

    #[test]
    fn test_duplicate_widget_is_laid_out_once() {
        let mut container = FlexContainer::new();
        let mut repeat = Stub::new(1, 25.0, 10.0);
        repeat.position = Vector2::new(-1.0, -1.0);
        let mut children = vec![Stub::new(1, 10.0, 10.0), repeat];

        container.sort_children(Size2::new(100.0, 20.0), &mut children);

        assert_eq!(container.proxy_count(), 1);
        assert_eq!(container.root().child_count(), 1);
        assert_eq!(children[0].fits, 1);
        assert_eq!(children[1].fits, 0);
        assert_eq!(children[1].position, Vector2::new(-1.0, -1.0));
        assert_eq!(children[1].size, Size2::new(25.0, 10.0));
    }

    #[test]
    fn test_dropping_container_frees_nodes() {
        let before = crate::layout::node_count();
        {
            let mut container = FlexContainer::new();
            let mut children = vec![Stub::new(1, 10.0, 10.0), Stub::new(2, 10.0, 10.0)];
            container.sort_children(Size2::new(100.0, 20.0), &mut children);
            assert_eq!(crate::layout::node_count(), before + 3);
        }
        assert_eq!(crate::layout::node_count(), before);
    }
}
