//! The per-monitor frame tree: a binary partition of a monitor's usable
//! area into frames, each optionally holding a window (spec ss4.3).
//!
//! New relative to the teacher, which only kept a flat `Vec<Client>`
//! arranged along a single axis in `Workspace::arrange`. The idea of a
//! per-monitor arranger is grounded on that method; the recursive
//! binary-split structure itself is enriched from the BSP-tree window
//! managers in `other_examples/` (e.g. rustile's `layout::bsp`
//! rebuild/geometry split), reimplemented here as an explicit arena
//! rather than a rebuilt-from-scratch tree, since spec ss4.3 requires
//! stable per-frame identity across operations (resize, exchange).

use std::collections::HashMap;

use crate::error::{FensterchefError, Result};
use crate::geometry::{Axis, Direction, EdgeDelta, Rectangle};
use crate::window::WindowId;

/// Opaque handle to a node (leaf or inner) in a `FrameTree`'s arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameId(usize);

#[derive(Debug, Clone)]
enum FrameKind {
    Leaf { window: Option<WindowId> },
    Inner {
        axis: Axis,
        ratio: f64,
        first: FrameId,
        second: FrameId,
    },
}

#[derive(Debug, Clone)]
struct FrameNode {
    parent: Option<FrameId>,
    rectangle: Rectangle,
    kind: FrameKind,
}

/// A monitor's frame tree. Owns every frame as an arena slot; frames
/// reference each other (and windows reference frames) only by
/// `FrameId`/`WindowId`, never by pointer, per the cyclic-reference
/// resolution in spec ss9.
#[derive(Debug, Clone)]
pub struct FrameTree {
    nodes: Vec<FrameNode>,
    root: FrameId,
    focused: FrameId,
    by_window: HashMap<WindowId, FrameId>,
    /// Minimum leaf dimension on either axis; resize operations that
    /// would violate it are rejected outright (spec ss4.3).
    pub min_dimension: u32,
}

impl FrameTree {
    /// A single empty leaf covering `rectangle`.
    pub fn new(rectangle: Rectangle) -> Self {
        let root = FrameId(0);
        FrameTree {
            nodes: vec![FrameNode {
                parent: None,
                rectangle,
                kind: FrameKind::Leaf { window: None },
            }],
            root,
            focused: root,
            by_window: HashMap::new(),
            min_dimension: 1,
        }
    }

    pub fn root(&self) -> FrameId {
        self.root
    }

    pub fn focused(&self) -> FrameId {
        self.focused
    }

    pub fn rectangle(&self, id: FrameId) -> Rectangle {
        self.nodes[id.0].rectangle
    }

    pub fn is_leaf(&self, id: FrameId) -> bool {
        matches!(self.nodes[id.0].kind, FrameKind::Leaf { .. })
    }

    pub fn window_in(&self, id: FrameId) -> Option<WindowId> {
        match &self.nodes[id.0].kind {
            FrameKind::Leaf { window } => *window,
            FrameKind::Inner { .. } => None,
        }
    }

    pub fn frame_of(&self, window: WindowId) -> Option<FrameId> {
        self.by_window.get(&window).copied()
    }

    /// Re-sets the whole tree's rectangle on a geometry change (e.g.
    /// RandR reports a new output size) without altering its shape.
    pub fn relayout(&mut self, rectangle: Rectangle) {
        self.nodes[self.root.0].rectangle = rectangle;
        self.recompute_subtree(self.root);
    }

    fn recompute_subtree(&mut self, id: FrameId) {
        let (axis, ratio, first, second) = match &self.nodes[id.0].kind {
            FrameKind::Leaf { .. } => return,
            FrameKind::Inner {
                axis,
                ratio,
                first,
                second,
            } => (*axis, *ratio, *first, *second),
        };
        let rect = self.nodes[id.0].rectangle;
        let (first_rect, second_rect) = rect.split(axis, ratio);
        self.nodes[first.0].rectangle = first_rect;
        self.nodes[second.0].rectangle = second_rect;
        self.recompute_subtree(first);
        self.recompute_subtree(second);
    }

    /// First empty leaf in pre-order traversal, used by the placement
    /// rule (spec ss4.3).
    pub fn first_empty_leaf(&self) -> Option<FrameId> {
        self.preorder_leaves()
            .into_iter()
            .find(|&id| self.window_in(id).is_none())
    }

    /// All leaves, in pre-order (first child before second), used by
    /// the placement rule and by focus tie-breaking ("tree position").
    pub fn preorder_leaves(&self) -> Vec<FrameId> {
        let mut out = Vec::new();
        self.preorder_collect(self.root, &mut out);
        out
    }

    fn preorder_collect(&self, id: FrameId, out: &mut Vec<FrameId>) {
        match &self.nodes[id.0].kind {
            FrameKind::Leaf { .. } => out.push(id),
            FrameKind::Inner { first, second, .. } => {
                self.preorder_collect(*first, out);
                self.preorder_collect(*second, out);
            }
        }
    }

    /// Assigns `window` to `leaf`'s window slot. Fails if `leaf` is not
    /// a leaf, or already occupied.
    pub fn assign_window(&mut self, leaf: FrameId, window: WindowId) -> Result<()> {
        match &mut self.nodes[leaf.0].kind {
            FrameKind::Inner { .. } => Err(FensterchefError::InvariantViolation(
                "assign_window targeted an inner node".into(),
            )),
            FrameKind::Leaf { window: slot } => {
                if slot.is_some() {
                    return Err(FensterchefError::InvariantViolation(
                        "assign_window targeted an occupied leaf".into(),
                    ));
                }
                *slot = Some(window);
                self.by_window.insert(window, leaf);
                Ok(())
            }
        }
    }

    /// Clears whichever leaf currently holds `window`, if any.
    pub fn vacate(&mut self, window: WindowId) {
        if let Some(leaf) = self.by_window.remove(&window) {
            if let FrameKind::Leaf { window: slot } = &mut self.nodes[leaf.0].kind {
                *slot = None;
            }
        }
    }

    /// Replaces a leaf with an inner node split along `axis`; the
    /// original window (if any) moves to the first child. Returns the
    /// two new leaf ids. Ratio defaults to 0.5 (spec ss4.3).
    pub fn split(&mut self, leaf: FrameId, axis: Axis) -> Result<(FrameId, FrameId)> {
        if !self.is_leaf(leaf) {
            return Err(FensterchefError::InvariantViolation(
                "split targeted an inner node".into(),
            ));
        }
        let rect = self.nodes[leaf.0].rectangle;
        let parent = self.nodes[leaf.0].parent;
        let existing_window = self.window_in(leaf);

        let (first_rect, second_rect) = rect.split(axis, 0.5);
        let first_id = FrameId(self.nodes.len());
        self.nodes.push(FrameNode {
            parent: Some(leaf),
            rectangle: first_rect,
            kind: FrameKind::Leaf { window: None },
        });
        let second_id = FrameId(self.nodes.len());
        self.nodes.push(FrameNode {
            parent: Some(leaf),
            rectangle: second_rect,
            kind: FrameKind::Leaf { window: None },
        });

        self.nodes[leaf.0].kind = FrameKind::Inner {
            axis,
            ratio: 0.5,
            first: first_id,
            second: second_id,
        };
        // `leaf`'s own parent pointer is unchanged; it is now an inner
        // node sitting where the leaf used to be.
        self.nodes[leaf.0].parent = parent;

        if let Some(window) = existing_window {
            self.by_window.insert(window, first_id);
            if let FrameKind::Leaf { window: slot } = &mut self.nodes[first_id.0].kind {
                *slot = Some(window);
            }
        }

        if self.focused == leaf {
            self.focused = first_id;
        }

        Ok((first_id, second_id))
    }

    /// Collapses the inner node that owns `leaf`: the sibling replaces
    /// the parent in the grandparent. Cascades per `auto_remove_void`
    /// if the sibling is itself an empty leaf left behind repeatedly.
    pub fn remove(&mut self, leaf: FrameId, auto_remove_void: bool) -> Result<()> {
        let parent_id = match self.nodes[leaf.0].parent {
            Some(p) => p,
            None => {
                return Err(FensterchefError::Rejected(
                    "cannot remove the root frame",
                ))
            }
        };
        let (first, second) = match &self.nodes[parent_id.0].kind {
            FrameKind::Inner { first, second, .. } => (*first, *second),
            FrameKind::Leaf { .. } => {
                return Err(FensterchefError::InvariantViolation(
                    "leaf's parent was itself a leaf".into(),
                ))
            }
        };
        let sibling = if first == leaf { second } else { first };
        let sibling_window = self.window_in(sibling);

        // The window under `leaf`, if any, is dropped from the tree;
        // the caller (window state machine) is responsible for hiding
        // it beforehand. Splice the sibling subtree into the parent's
        // slot: the sibling's identity (and its descendants', if any)
        // moves from index `sibling` to index `parent_id`, so a
        // sibling-held window's reverse mapping has to follow it.
        self.nodes[parent_id.0].kind = self.nodes[sibling.0].kind.clone();
        self.recompute_subtree(parent_id);
        self.reparent_children_of(parent_id);
        if let Some(window) = sibling_window {
            self.by_window.insert(window, parent_id);
        }

        if self.focused == leaf || self.focused == sibling {
            self.focused = parent_id;
        }

        // `leaf` and `sibling`'s old slot are now unreachable garbage;
        // the arena never reclaims indices (simplicity over density,
        // as trees are small and short-lived per monitor).
        if let Some(window) = self.window_in(leaf) {
            self.by_window.remove(&window);
        }

        if auto_remove_void {
            if let FrameKind::Leaf { window: None } = &self.nodes[parent_id.0].kind {
                if let Some(_) = self.nodes[parent_id.0].parent {
                    return self.remove(parent_id, true);
                }
            }
        }
        Ok(())
    }

    /// Fix up the `parent` pointers of `new_parent`'s immediate
    /// children after a splice changed which node they report to.
    fn reparent_children_of(&mut self, new_parent: FrameId) {
        if let FrameKind::Inner { first, second, .. } = self.nodes[new_parent.0].kind {
            self.nodes[first.0].parent = Some(new_parent);
            self.nodes[second.0].parent = Some(new_parent);
        }
    }

    fn parent_of(&self, id: FrameId) -> Option<FrameId> {
        self.nodes[id.0].parent
    }

    /// If `id` is an inner node, descend via first children to the
    /// leaf that would be reached; leaves return themselves. Used to
    /// resolve a `parent`/`root`-navigated focus back to a concrete
    /// leaf for leaf-only operations (split, resize, assign).
    pub fn leaf_under(&self, id: FrameId) -> FrameId {
        let mut cur = id;
        loop {
            match &self.nodes[cur.0].kind {
                FrameKind::Leaf { .. } => return cur,
                FrameKind::Inner { first, .. } => cur = *first,
            }
        }
    }

    /// Moves focus to the given frame (leaf or inner).
    pub fn set_focused(&mut self, id: FrameId) {
        self.focused = id;
    }

    /// `parent`/`child`/`root` tree-structure navigation.
    pub fn focus_parent(&mut self) {
        if let Some(p) = self.parent_of(self.focused) {
            self.focused = p;
        }
    }

    pub fn focus_child(&mut self) {
        if let FrameKind::Inner { first, .. } = self.nodes[self.focused.0].kind {
            self.focused = first;
        }
    }

    pub fn focus_root(&mut self) {
        self.focused = self.root;
    }

    /// Directional focus: among leaves whose center lies in the
    /// half-plane of `direction` relative to the current focused
    /// leaf's center, the nearest by Manhattan distance; ties broken by
    /// axis-aligned distance, then pre-order tree position (spec
    /// ss4.3).
    pub fn focus_direction(&mut self, direction: Direction) -> Option<FrameId> {
        let origin = self.leaf_under(self.focused);
        let origin_rect = self.rectangle(origin);
        let leaves = self.preorder_leaves();
        let candidate = leaves
            .iter()
            .filter(|&&id| id != origin)
            .filter(|&&id| origin_rect.is_towards(&self.rectangle(id), direction))
            .min_by(|&&a, &&b| {
                let da = origin_rect.manhattan_distance(&self.rectangle(a));
                let db = origin_rect.manhattan_distance(&self.rectangle(b));
                da.cmp(&db).then_with(|| {
                    let axis_a = Self::axis_distance(&origin_rect, &self.rectangle(a), direction);
                    let axis_b = Self::axis_distance(&origin_rect, &self.rectangle(b), direction);
                    axis_a.cmp(&axis_b)
                })
            })
            .copied();
        if let Some(target) = candidate {
            self.focused = target;
        }
        candidate
    }

    fn axis_distance(origin: &Rectangle, other: &Rectangle, direction: Direction) -> i64 {
        let (ox, oy) = origin.center();
        let (tx, ty) = other.center();
        match direction {
            Direction::Up | Direction::Down => (ox - tx).abs() as i64,
            Direction::Left | Direction::Right => (oy - ty).abs() as i64,
        }
    }

    /// Swaps the windows held by the focused leaf and the directional
    /// target; frame geometries are unchanged (spec ss4.3).
    pub fn exchange(&mut self, direction: Direction) -> Result<()> {
        let origin = self.leaf_under(self.focused);
        let origin_rect = self.rectangle(origin);
        let leaves = self.preorder_leaves();
        let target = leaves
            .iter()
            .filter(|&&id| id != origin)
            .filter(|&&id| origin_rect.is_towards(&self.rectangle(id), direction))
            .min_by_key(|&&id| origin_rect.manhattan_distance(&self.rectangle(id)))
            .copied();
        let target = match target {
            Some(t) => t,
            None => return Err(FensterchefError::Rejected("no frame in that direction")),
        };
        let a = self.window_in(origin);
        let b = self.window_in(target);
        self.set_leaf_window(origin, b);
        self.set_leaf_window(target, a);
        Ok(())
    }

    fn set_leaf_window(&mut self, leaf: FrameId, window: Option<WindowId>) {
        if let FrameKind::Leaf { window: slot } = &mut self.nodes[leaf.0].kind {
            *slot = window;
        }
        if let Some(w) = window {
            self.by_window.insert(w, leaf);
        }
    }

    /// Adjusts the edges of the focused leaf's rectangle by the given
    /// pixel deltas, propagating opposite adjustments to whichever
    /// split owns each edge. Rejects the whole operation if any
    /// resulting leaf would shrink below `min_dimension` (spec ss4.3).
    pub fn resize_by(&mut self, delta: EdgeDelta) -> Result<()> {
        let leaf = self.leaf_under(self.focused);
        let mut changes: Vec<(FrameId, f64)> = Vec::new();

        if delta.right != 0 {
            changes.push(self.edge_change(leaf, Axis::Horizontal, Side::First, delta.right)?);
        }
        if delta.left != 0 {
            changes.push(self.edge_change(leaf, Axis::Horizontal, Side::Second, delta.left)?);
        }
        if delta.bottom != 0 {
            changes.push(self.edge_change(leaf, Axis::Vertical, Side::First, delta.bottom)?);
        }
        if delta.top != 0 {
            changes.push(self.edge_change(leaf, Axis::Vertical, Side::Second, delta.top)?);
        }

        if changes.is_empty() {
            return Ok(());
        }

        // Trial-apply on a scratch copy so a minimum-size violation
        // anywhere in the tree rejects the whole operation atomically.
        let mut trial = self.clone();
        for &(node, ratio) in &changes {
            if let FrameKind::Inner { ratio: r, .. } = &mut trial.nodes[node.0].kind {
                *r = ratio;
            }
        }
        trial.recompute_subtree(trial.root);
        for id in trial.preorder_leaves() {
            let rect = trial.rectangle(id);
            if rect.width < trial.min_dimension || rect.height < trial.min_dimension {
                return Err(FensterchefError::Rejected(
                    "resize would shrink a leaf below the minimum size",
                ));
            }
        }

        *self = trial;
        Ok(())
    }

    /// Finds the nearest ancestor of `leaf` along `axis` where `leaf`
    /// descends via `side`, and returns the `(ancestor, new_ratio)`
    /// that applying `delta` pixels to that split implies.
    fn edge_change(
        &self,
        leaf: FrameId,
        axis: Axis,
        side: Side,
        delta: i32,
    ) -> Result<(FrameId, f64)> {
        let mut cur = leaf;
        loop {
            let parent_id = match self.parent_of(cur) {
                Some(p) => p,
                None => {
                    return Err(FensterchefError::Rejected(
                        "resize edge touches the monitor boundary",
                    ))
                }
            };
            if let FrameKind::Inner {
                axis: a,
                first,
                second,
                ..
            } = &self.nodes[parent_id.0].kind
            {
                let this_side = if *first == cur {
                    Side::First
                } else {
                    Side::Second
                };
                if *a == axis && this_side == side {
                    let rect = self.nodes[parent_id.0].rectangle;
                    let total = match axis {
                        Axis::Horizontal => rect.width,
                        Axis::Vertical => rect.height,
                    } as f64;
                    let first_extent = match axis {
                        Axis::Horizontal => self.nodes[first.0].rectangle.width,
                        Axis::Vertical => self.nodes[first.0].rectangle.height,
                    } as f64;
                    let new_extent = (first_extent + delta as f64).max(1.0);
                    return Ok((parent_id, (new_extent / total).clamp(0.01, 0.99)));
                }
            }
            cur = parent_id;
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    First,
    Second,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn monitor() -> FrameTree {
        FrameTree::new(Rectangle::new(0, 0, 1920, 1080))
    }

    #[test]
    fn scenario_1_single_window_occupies_whole_monitor() {
        let tree = monitor();
        assert_eq!(tree.rectangle(tree.root()), Rectangle::new(0, 0, 1920, 1080));
        assert!(tree.is_leaf(tree.root()));
    }

    #[test]
    fn scenario_2_split_vertically_then_two_windows() {
        let mut tree = monitor();
        let root = tree.root();
        let (first, second) = tree.split(root, Axis::Horizontal).unwrap();
        assert_eq!(tree.rectangle(first), Rectangle::new(0, 0, 960, 1080));
        assert_eq!(tree.rectangle(second), Rectangle::new(960, 0, 960, 1080));
    }

    #[test]
    fn scenario_3_resize_by_shrinks_first_grows_second() {
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
    fn scenario_4_exchange_swaps_windows_not_geometry() {
        let mut tree = monitor();
        let root = tree.root();
        let (first, second) = tree.split(root, Axis::Horizontal).unwrap();
        let w1 = WindowId(1);
        let w2 = WindowId(2);
        tree.assign_window(first, w1).unwrap();
        tree.assign_window(second, w2).unwrap();
        tree.set_focused(first);
        let rect_first_before = tree.rectangle(first);
        let rect_second_before = tree.rectangle(second);
        tree.exchange(Direction::Right).unwrap();
        assert_eq!(tree.window_in(first), Some(w2));
        assert_eq!(tree.window_in(second), Some(w1));
        assert_eq!(tree.rectangle(first), rect_first_before);
        assert_eq!(tree.rectangle(second), rect_second_before);
    }

    #[test]
    fn scenario_5_destroy_with_auto_remove_void_collapses() {
        let mut tree = monitor();
        let root = tree.root();
        let (first, second) = tree.split(root, Axis::Horizontal).unwrap();
        let w2 = WindowId(2);
        tree.assign_window(second, w2).unwrap();
        // first stays empty, as if w1 was destroyed already.
        tree.remove(first, true).unwrap();
        let leaves = tree.preorder_leaves();
        assert_eq!(leaves.len(), 1);
        assert_eq!(tree.rectangle(leaves[0]), Rectangle::new(0, 0, 1920, 1080));
        assert_eq!(tree.window_in(leaves[0]), Some(w2));
    }

    #[test]
    fn placement_rule_finds_first_empty_leaf_preorder() {
        let mut tree = monitor();
        let root = tree.root();
        let (first, second) = tree.split(root, Axis::Vertical).unwrap();
        tree.assign_window(first, WindowId(1)).unwrap();
        assert_eq!(tree.first_empty_leaf(), Some(second));
    }

    #[test]
    fn resize_rejects_when_it_would_violate_minimum() {
        let mut tree = monitor();
        tree.min_dimension = 50;
        let root = tree.root();
        let (first, _second) = tree.split(root, Axis::Horizontal).unwrap();
        tree.set_focused(first);
        let before = tree.rectangle(first);
        let result = tree.resize_by(EdgeDelta {
            left: 0,
            top: 0,
            right: -2000,
            bottom: 0,
        });
        assert!(result.is_err());
        assert_eq!(tree.rectangle(first), before);
    }

    #[test]
    fn invariant_union_of_leaves_covers_root_rectangle() {
        let mut tree = monitor();
        let root = tree.root();
        let (first, second) = tree.split(root, Axis::Horizontal).unwrap();
        tree.split(second, Axis::Vertical).unwrap();
        let total_area: i64 = tree
            .preorder_leaves()
            .iter()
            .map(|&id| {
                let r = tree.rectangle(id);
                r.width as i64 * r.height as i64
            })
            .sum();
        let root_rect = tree.rectangle(tree.root());
        let _ = first;
        assert_eq!(
            total_area,
            root_rect.width as i64 * root_rect.height as i64
        );
    }

    #[test]
    fn focus_left_then_right_is_involutive_on_symmetric_split() {
        let mut tree = monitor();
        let root = tree.root();
        let (first, second) = tree.split(root, Axis::Horizontal).unwrap();
        tree.set_focused(first);
        tree.focus_direction(Direction::Right);
        assert_eq!(tree.leaf_under(tree.focused()), second);
        tree.focus_direction(Direction::Left);
        assert_eq!(tree.leaf_under(tree.focused()), first);
    }
}
