//! Cross-module scenarios from the window-manager's testable-properties
//! table: the frame tree, window registry, and binding table working
//! together without an open X display (the `Display`/`Context` pair
//! need a live X connection and are exercised manually, not here).

use fensterchef::binding::{Binding, BindingFlags, BindingTable, Trigger};
use fensterchef::frame::FrameTree;
use fensterchef::geometry::{Axis, Direction, EdgeDelta, Rectangle};
use fensterchef::registry::WindowRegistry;
use fensterchef::window::{Window, WindowId, WindowState};

fn monitor() -> FrameTree {
    FrameTree::new(Rectangle::new(0, 0, 1920, 1080))
}

fn tiling_window(id: u64, rect: Rectangle, frame: fensterchef::frame::FrameId) -> Window {
    Window::new(WindowId(id), rect, WindowState::Tiling { frame })
}

#[test]
fn scenario_1_first_map_request_fills_the_monitor() {
    let mut tree = monitor();
    let mut registry = WindowRegistry::new();
    let root = tree.root();

    tree.assign_window(root, WindowId(1)).unwrap();
    registry
        .create(tiling_window(1, tree.rectangle(root), root))
        .unwrap();
    registry.set_focus(Some(WindowId(1)));

    assert_eq!(tree.rectangle(root), Rectangle::new(0, 0, 1920, 1080));
    assert_eq!(registry.focus(), Some(WindowId(1)));
}

#[test]
fn scenario_2_split_vertically_then_second_map_request() {
    let mut tree = monitor();
    let mut registry = WindowRegistry::new();
    let root = tree.root();
    tree.assign_window(root, WindowId(1)).unwrap();
    registry
        .create(tiling_window(1, tree.rectangle(root), root))
        .unwrap();

    let (first, second) = tree.split(root, Axis::Horizontal).unwrap();
    tree.assign_window(second, WindowId(2)).unwrap();
    registry
        .create(tiling_window(2, tree.rectangle(second), second))
        .unwrap();

    assert_eq!(tree.rectangle(first), Rectangle::new(0, 0, 960, 1080));
    assert_eq!(tree.rectangle(second), Rectangle::new(960, 0, 960, 1080));
    assert_eq!(tree.window_in(first), Some(WindowId(1)));
    assert_eq!(tree.window_in(second), Some(WindowId(2)));
}

#[test]
fn scenario_3_resize_by_on_first_leaf_shrinks_it_and_grows_the_second() {
    let mut tree = monitor();
    let root = tree.root();
    let (first, second) = tree.split(root, Axis::Horizontal).unwrap();
    tree.set_focused(first);

    tree.resize_by(EdgeDelta {
        left: 0,
        top: 0,
        right: -100,
        bottom: 0,
    })
    .unwrap();

    assert_eq!(tree.rectangle(first), Rectangle::new(0, 0, 860, 1080));
    assert_eq!(tree.rectangle(second), Rectangle::new(860, 0, 1060, 1080));
}

#[test]
fn scenario_4_exchange_right_swaps_windows_not_frame_geometry() {
    let mut tree = monitor();
    let root = tree.root();
    let (first, second) = tree.split(root, Axis::Horizontal).unwrap();
    tree.assign_window(first, WindowId(1)).unwrap();
    tree.assign_window(second, WindowId(2)).unwrap();
    tree.set_focused(first);

    let first_rect = tree.rectangle(first);
    let second_rect = tree.rectangle(second);
    tree.exchange(Direction::Right).unwrap();

    assert_eq!(tree.window_in(first), Some(WindowId(2)));
    assert_eq!(tree.window_in(second), Some(WindowId(1)));
    assert_eq!(tree.rectangle(first), first_rect);
    assert_eq!(tree.rectangle(second), second_rect);
}

#[test]
fn scenario_5_destroy_w1_with_auto_remove_void_collapses_to_single_leaf() {
    let mut tree = monitor();
    let mut registry = WindowRegistry::new();
    let root = tree.root();
    let (first, second) = tree.split(root, Axis::Horizontal).unwrap();
    tree.assign_window(first, WindowId(1)).unwrap();
    tree.assign_window(second, WindowId(2)).unwrap();
    registry
        .create(tiling_window(1, tree.rectangle(first), first))
        .unwrap();
    registry
        .create(tiling_window(2, tree.rectangle(second), second))
        .unwrap();

    // DestroyNotify for W1: vacate its frame slot, then drop its record.
    tree.vacate(WindowId(1));
    registry.destroy(WindowId(1));
    tree.remove(first, true).unwrap();

    let leaves = tree.preorder_leaves();
    assert_eq!(leaves.len(), 1);
    assert_eq!(tree.rectangle(leaves[0]), Rectangle::new(0, 0, 1920, 1080));
    assert_eq!(tree.window_in(leaves[0]), Some(WindowId(2)));
    assert!(registry.lookup(WindowId(1)).is_none());
    assert_eq!(registry.iterate().count(), 1);
}

#[test]
fn scenario_6_default_reload_binding_fires_exactly_once() {
    use fensterchef::action::ActionCode;

    let table = BindingTable::merge(Vec::new(), &fensterchef::binding::default_bindings());
    let mod4 = fensterchef::binding::modifier_mask("Mod4").unwrap();
    let shift = fensterchef::binding::modifier_mask("Shift").unwrap();
    let r = fensterchef::binding::keysym_from_name("r").unwrap();

    let matches: Vec<&Binding> = table
        .bindings()
        .iter()
        .filter(|b| {
            b.effective_modifiers == mod4 | shift
                && b.trigger == Trigger::Key(r)
                && b.flags == BindingFlags::ON_PRESS
        })
        .collect();

    assert_eq!(matches.len(), 1, "exactly one binding should match Mod4+Shift+r");
    assert_eq!(matches[0].actions.len(), 1);
    assert_eq!(matches[0].actions[0].code, ActionCode::ReloadConfiguration);
}

#[test]
fn invariant_leaf_union_covers_monitor_rectangle_after_mixed_operations() {
    let mut tree = monitor();
    let root = tree.root();
    let (first, second) = tree.split(root, Axis::Vertical).unwrap();
    let (_third, fourth) = tree.split(second, Axis::Horizontal).unwrap();
    tree.assign_window(first, WindowId(1)).unwrap();
    tree.assign_window(fourth, WindowId(2)).unwrap();

    let root_rect = tree.rectangle(tree.root());
    let total: i64 = tree
        .preorder_leaves()
        .iter()
        .map(|&id| {
            let r = tree.rectangle(id);
            r.width as i64 * r.height as i64
        })
        .sum();
    assert_eq!(total, root_rect.width as i64 * root_rect.height as i64);
}

#[test]
fn invariant_destroyed_window_leaves_no_trace_in_registry_or_tree() {
    let mut tree = monitor();
    let mut registry = WindowRegistry::new();
    let root = tree.root();
    tree.assign_window(root, WindowId(9)).unwrap();
    registry
        .create(tiling_window(9, tree.rectangle(root), root))
        .unwrap();
    registry.set_focus(Some(WindowId(9)));

    tree.vacate(WindowId(9));
    registry.destroy(WindowId(9));

    assert!(tree.frame_of(WindowId(9)).is_none());
    assert!(registry.lookup(WindowId(9)).is_none());
    assert_eq!(registry.focus(), None);
}
