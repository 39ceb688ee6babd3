//! The monitor set: tracks RandR outputs and owns one frame tree per
//! monitor, re-tiling when an output's geometry changes (spec ss3,
//! ss4.6).
//!
//! Generalizes the teacher's single implicit `Workspace` per screen
//! (`rdwm.rs`, one created in `Rdwm::init` against `XScreenOfDisplay`)
//! into a RandR-aware set that can gain and lose monitors at runtime.

use crate::config::Quad;
use crate::frame::FrameTree;
use crate::geometry::Rectangle;
use crate::window::WindowId;

/// Shrinks `rectangle` by `outer_gap` (spec ss6 gaps.outer), falling
/// back to the unshrunk rectangle if the gap would leave nothing
/// tileable (a misconfigured gap must never make a monitor unusable).
fn usable_rectangle(rectangle: Rectangle, outer_gap: Quad) -> Rectangle {
    rectangle
        .adjusted(outer_gap.to_edge_delta(), 1)
        .unwrap_or(rectangle)
}

/// Stable identity of a RandR output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OutputId(pub u32);

/// What the RandR probe (an external collaborator, spec ss1) reports
/// for one connected output.
#[derive(Debug, Clone, Copy)]
pub struct RandrOutput {
    pub id: OutputId,
    pub rectangle: Rectangle,
    pub primary: bool,
}

#[derive(Debug)]
pub struct Monitor {
    pub output: OutputId,
    pub rectangle: Rectangle,
    pub tree: FrameTree,
}

impl Monitor {
    fn new(output: OutputId, rectangle: Rectangle, outer_gap: Quad, min_dimension: u32) -> Self {
        let mut tree = FrameTree::new(usable_rectangle(rectangle, outer_gap));
        tree.min_dimension = min_dimension;
        Monitor {
            output,
            rectangle,
            tree,
        }
    }
}

/// Windows displaced from a disconnected monitor, handed back to the
/// caller so the window state machine can reassign their `WindowState`
/// (spec ss3: "migrate to the primary monitor's first empty leaf, or
/// share the first leaf if full").
pub struct Migrated {
    pub window: WindowId,
    pub new_monitor: usize,
    pub new_frame: crate::frame::FrameId,
}

pub struct MonitorSet {
    pub monitors: Vec<Monitor>,
    pub primary: usize,
    pub focused: usize,
    min_dimension: u32,
    outer_gap: Quad,
}

impl MonitorSet {
    /// A single synthetic monitor covering `rectangle`, used before the
    /// first RandR probe (or when the extension is unavailable) so
    /// single-monitor operation never depends on RandR being present.
    pub fn single(rectangle: Rectangle, outer_gap: Quad, min_dimension: u32) -> Self {
        MonitorSet {
            monitors: vec![Monitor::new(OutputId(0), rectangle, outer_gap, min_dimension)],
            primary: 0,
            focused: 0,
            min_dimension,
            outer_gap,
        }
    }

    pub fn focused_monitor(&self) -> &Monitor {
        &self.monitors[self.focused]
    }

    pub fn focused_monitor_mut(&mut self) -> &mut Monitor {
        &mut self.monitors[self.focused]
    }

    pub fn primary_monitor_mut(&mut self) -> &mut Monitor {
        &mut self.monitors[self.primary]
    }

    /// Merges a fresh RandR probe result with the existing set: new
    /// output ids get a fresh empty tree sized to their rectangle;
    /// known ids whose rectangle changed are relaid out in place;
    /// ids no longer present are dropped and their windows migrated
    /// (spec ss3, ss4.6).
    pub fn sync_from_randr(&mut self, outputs: &[RandrOutput]) -> Vec<Migrated> {
        let mut migrated = Vec::new();
        let seen: Vec<OutputId> = outputs.iter().map(|o| o.id).collect();

        // Drop monitors no longer reported, migrating their windows.
        let mut i = 0;
        while i < self.monitors.len() {
            if !seen.contains(&self.monitors[i].output) {
                let gone = self.monitors.remove(i);
                if self.primary >= self.monitors.len() {
                    self.primary = 0;
                }
                if self.focused >= self.monitors.len() {
                    self.focused = 0;
                }
                migrated.extend(self.migrate_windows_from(gone));
            } else {
                i += 1;
            }
        }

        for probe in outputs {
            if probe.primary {
                if let Some(idx) = self.monitors.iter().position(|m| m.output == probe.id) {
                    self.primary = idx;
                }
            }
            match self.monitors.iter().position(|m| m.output == probe.id) {
                Some(idx) => {
                    if self.monitors[idx].rectangle != probe.rectangle {
                        self.monitors[idx].rectangle = probe.rectangle;
                        self.monitors[idx]
                            .tree
                            .relayout(usable_rectangle(probe.rectangle, self.outer_gap));
                    }
                }
                None => {
                    self.monitors.push(Monitor::new(
                        probe.id,
                        probe.rectangle,
                        self.outer_gap,
                        self.min_dimension,
                    ));
                    if probe.primary {
                        self.primary = self.monitors.len() - 1;
                    }
                }
            }
        }
        if self.monitors.is_empty() {
            // Never leave the manager with no monitor at all; fall
            // back to whatever rectangle the last known one had.
            self.monitors.push(Monitor::new(
                OutputId(0),
                Rectangle::from_size(1, 1),
                self.outer_gap,
                self.min_dimension,
            ));
        }
        migrated
    }

    fn migrate_windows_from(&mut self, gone: Monitor) -> Vec<Migrated> {
        let mut out = Vec::new();
        let windows: Vec<WindowId> = gone
            .tree
            .preorder_leaves()
            .into_iter()
            .filter_map(|leaf| gone.tree.window_in(leaf))
            .collect();
        for window in windows {
            let primary = self.primary_monitor_mut();
            let leaf = primary
                .tree
                .first_empty_leaf()
                .unwrap_or_else(|| primary.tree.root());
            // `assign_window` only succeeds against an empty slot; if
            // the primary's first leaf is occupied (no empty leaf
            // anywhere), share it per spec ss3 by displacing whatever
            // was there first.
            if primary.tree.window_in(leaf).is_some() {
                if let Some(displaced) = primary.tree.window_in(leaf) {
                    primary.tree.vacate(displaced);
                }
            }
            let _ = primary.tree.assign_window(leaf, window);
            out.push(Migrated {
                window,
                new_monitor: self.primary,
                new_frame: leaf,
            });
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sync_adds_new_monitor_with_fresh_tree() {
        let mut set = MonitorSet::single(Rectangle::new(0, 0, 1920, 1080), Quad::default(), 1);
        let outputs = vec![
            RandrOutput {
                id: OutputId(0),
                rectangle: Rectangle::new(0, 0, 1920, 1080),
                primary: true,
            },
            RandrOutput {
                id: OutputId(1),
                rectangle: Rectangle::new(1920, 0, 1280, 1024),
                primary: false,
            },
        ];
        let migrated = set.sync_from_randr(&outputs);
        assert!(migrated.is_empty());
        assert_eq!(set.monitors.len(), 2);
        assert_eq!(
            set.monitors[1].tree.rectangle(set.monitors[1].tree.root()),
            Rectangle::new(1920, 0, 1280, 1024)
        );
    }

    #[test]
    fn disconnecting_a_monitor_migrates_its_windows_to_primary() {
        let mut set = MonitorSet::single(Rectangle::new(0, 0, 1920, 1080), Quad::default(), 1);
        set.sync_from_randr(&[
            RandrOutput {
                id: OutputId(0),
                rectangle: Rectangle::new(0, 0, 1920, 1080),
                primary: true,
            },
            RandrOutput {
                id: OutputId(1),
                rectangle: Rectangle::new(1920, 0, 1280, 1024),
                primary: false,
            },
        ]);
        let secondary_idx = set.monitors.iter().position(|m| m.output == OutputId(1)).unwrap();
        let root = set.monitors[secondary_idx].tree.root();
        set.monitors[secondary_idx]
            .tree
            .assign_window(root, WindowId(42))
            .unwrap();

        let migrated = set.sync_from_randr(&[RandrOutput {
            id: OutputId(0),
            rectangle: Rectangle::new(0, 0, 1920, 1080),
            primary: true,
        }]);
        assert_eq!(set.monitors.len(), 1);
        assert_eq!(migrated.len(), 1);
        assert_eq!(migrated[0].window, WindowId(42));
        assert_eq!(
            set.monitors[0].tree.window_in(migrated[0].new_frame),
            Some(WindowId(42))
        );
    }
}
