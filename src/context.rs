//! The single root context record: display, registry, monitors,
//! bindings, configuration, and the in-progress selection, constructed
//! once at startup and passed explicitly everywhere (spec ss9:
//! "re-architect as a single root context record").
//!
//! Replaces the teacher's `Rdwm` struct, which kept the same handful
//! of fields (`display`, `root`, `workspaces`/`clients`, `config`) but
//! at a much smaller scope (one implicit screen, a flat client list,
//! no binding table).

use std::process::Command;

use crate::binding::{Binding, BindingTable};
use crate::config::Configuration;
use crate::display::Display;
use crate::error::{FensterchefError, Result};
use crate::frame::FrameId;
use crate::geometry::{Axis, Direction, EdgeDelta, Rectangle};
use crate::monitor::{MonitorSet, RandrOutput};
use crate::registry::WindowRegistry;
use crate::selection::{DragOperation, Selection};
use crate::window::{InitialClass, SizeHints, Window, WindowId, WindowState, WmHints};

pub struct Context {
    pub display: Display,
    pub registry: WindowRegistry,
    pub monitors: MonitorSet,
    pub bindings: BindingTable,
    pub config: Configuration,
    pub selection: Option<Selection>,
    pub running: bool,
    last_tiling_focus: Option<WindowId>,
    last_popup_focus: Option<WindowId>,
    /// Windows we unmapped ourselves (`hide_window`), so the next
    /// `UnmapNotify` for them is recognized as our own doing rather
    /// than a client withdrawal.
    unmap_pending: std::collections::HashSet<WindowId>,
}

impl Context {
    pub fn new(display: Display, config: Configuration) -> Self {
        // Root substructure-redirect events are already selected by
        // `Display::open`'s other-WM probe.
        let rectangle = display.screen_rectangle();
        let monitors = MonitorSet::single(rectangle, config.gaps.outer, 1);

        let ignore_modifiers = config.keyboard.ignore_modifiers | config.mouse.ignore_modifiers;
        let user_keys: Vec<Binding> = config
            .keyboard
            .keys
            .iter()
            .filter_map(|spec| spec.resolve(config.keyboard.modifiers, false))
            .collect();
        let user_buttons: Vec<Binding> = config
            .mouse
            .buttons
            .iter()
            .filter_map(|spec| spec.resolve(config.mouse.modifiers, true))
            .collect();
        let mut user_bindings = user_keys;
        user_bindings.extend(user_buttons);
        let bindings = BindingTable::merge(user_bindings, &crate::binding::default_bindings());
        bindings.grab_all(&display, ignore_modifiers);

        Context {
            display,
            registry: WindowRegistry::new(),
            monitors,
            bindings,
            config,
            selection: None,
            running: true,
            last_tiling_focus: None,
            last_popup_focus: None,
            unmap_pending: std::collections::HashSet::new(),
        }
    }

    /// Consumes a pending self-inflicted unmap marker, returning
    /// whether `id` had one (spec ss4.6's `UnmapNotify` handler uses
    /// this to tell a WM-driven hide from a client withdrawal).
    pub fn take_unmap_pending(&mut self, id: WindowId) -> bool {
        self.unmap_pending.remove(&id)
    }

    // ---- window lifecycle (spec ss4.1, ss4.2) ----------------------

    /// Manages a newly-mapped top-level window: classifies it,
    /// assigns a frame slot if tiling, and applies initial geometry.
    pub fn manage_window(&mut self, id: WindowId) -> Result<()> {
        if self.registry.lookup(id).is_some() {
            return Err(FensterchefError::InvariantViolation(format!(
                "{:?} is already managed",
                id
            )));
        }
        let geometry = self
            .display
            .get_geometry(id)
            .unwrap_or(Rectangle::new(0, 0, 1, 1));
        // Real size-hint/transient-for/override-redirect queries are
        // the display client's job (spec ss6's `GetProperty`); the
        // registry only needs the classification outcome here, so
        // callers (the dispatcher) pass hints through `Window` state
        // on the generic path below via `manage_window_with`.
        self.manage_window_with(id, geometry, Default::default(), None, false)
    }

    /// Full-information variant used by the dispatcher once it has
    /// actually queried `WM_NORMAL_HINTS`/`WM_TRANSIENT_FOR`.
    pub fn manage_window_with(
        &mut self,
        id: WindowId,
        geometry: Rectangle,
        size_hints: crate::window::SizeHints,
        transient_for: Option<WindowId>,
        override_redirect: bool,
    ) -> Result<()> {
        let monitor_rect = self.monitors.focused_monitor().rectangle;
        let class =
            Window::classify_initial(&size_hints, transient_for, override_redirect, &monitor_rect);

        let state = match class {
            InitialClass::Tiling => {
                let tree = &mut self.monitors.focused_monitor_mut().tree;
                let leaf = match tree.first_empty_leaf() {
                    Some(leaf) => leaf,
                    None if self.config.tiling.auto_fill_void => tree.root(),
                    None => {
                        // All leaves full and auto_fill_void is false:
                        // the focused leaf's current window loses its
                        // slot and becomes hidden (spec ss4.3 open
                        // question, resolved per SPEC_FULL.md ss9).
                        let focused = tree.leaf_under(tree.focused());
                        if let Some(displaced) = tree.window_in(focused) {
                            tree.vacate(displaced);
                            if let Some(w) = self.registry.lookup_mut(displaced) {
                                w.state = WindowState::Hidden {
                                    previous: Box::new(w.state.clone()),
                                };
                            }
                            self.display.unmap_window(displaced);
                        }
                        focused
                    }
                };
                self.monitors
                    .focused_monitor_mut()
                    .tree
                    .assign_window(leaf, id)?;
                WindowState::Tiling { frame: leaf }
            }
            InitialClass::Popup | InitialClass::UnmanagedPopup => WindowState::Popup {
                rectangle: self.associate_popup_rectangle(geometry),
            },
        };

        let mut window = Window::new(id, geometry, state);
        window.size_hints = size_hints;
        window.transient_for = transient_for;
        window.override_redirect = override_redirect;

        let managed_for_input = class != InitialClass::UnmanagedPopup;
        self.registry.create(window)?;
        if managed_for_input {
            self.display.select_window_events(
                id,
                x11::xlib::SubstructureNotifyMask
                    | x11::xlib::StructureNotifyMask
                    | x11::xlib::FocusChangeMask,
            );
            self.set_focus(id);
        }
        self.apply_window_geometry(id)?;
        self.display.map_window(id);
        self.display.flush();
        Ok(())
    }

    /// Unmaps the window but retains its record and frame slot so a
    /// later remap restores it (spec ss4.2: "any -> hidden").
    pub fn hide_window(&mut self, id: WindowId) -> Result<()> {
        let window = self
            .registry
            .lookup_mut(id)
            .ok_or_else(|| FensterchefError::Protocol {
                code: 3,
                window: id,
                request: "hide_window",
            })?;
        if window.state.is_hidden() {
            return Ok(());
        }
        window.state = WindowState::Hidden {
            previous: Box::new(window.state.clone()),
        };
        self.unmap_pending.insert(id);
        self.display.unmap_window(id);
        if self.registry.focus() == Some(id) {
            self.registry.set_focus(None);
        }
        Ok(())
    }

    /// Remaps a hidden window, restoring its previous state and
    /// geometry (spec ss4.2: "hidden -> previous_state").
    pub fn restore_window(&mut self, id: WindowId) -> Result<()> {
        {
            let window = self
                .registry
                .lookup_mut(id)
                .ok_or_else(|| FensterchefError::Protocol {
                    code: 3,
                    window: id,
                    request: "restore_window",
                })?;
            if let WindowState::Hidden { previous } = &window.state {
                window.state = (**previous).clone();
            }
        }
        self.apply_window_geometry(id)?;
        self.display.map_window(id);
        Ok(())
    }

    /// Removes the window from its frame (if any), clears focus if it
    /// was the target, and releases its record (spec ss4.1).
    pub fn unmanage_window(&mut self, id: WindowId) {
        // `vacate` is a no-op on a tree that never held this window, so
        // clearing it from every monitor is simpler than tracking which
        // one owns the frame and just as correct.
        for monitor in &mut self.monitors.monitors {
            monitor.tree.vacate(id);
        }
        self.registry.destroy(id);
        if self.last_tiling_focus == Some(id) {
            self.last_tiling_focus = None;
        }
        if self.last_popup_focus == Some(id) {
            self.last_popup_focus = None;
        }
    }

    /// Computes the target rectangle from `(state, frame-or-stored
    /// rectangle)` and issues a configure request only if it differs
    /// from the last known geometry (spec ss4.2's idempotence rule).
    pub fn apply_window_geometry(&mut self, id: WindowId) -> Result<()> {
        let target = self.target_rectangle(id)?;
        let border = self.config.border.size;
        let window = self
            .registry
            .lookup_mut(id)
            .ok_or_else(|| FensterchefError::Protocol {
                code: 3,
                window: id,
                request: "apply_window_geometry",
            })?;
        if window.needs_configure(&target) {
            self.display.configure_window(id, target, border);
            let window = self.registry.lookup_mut(id).unwrap();
            window.mark_applied(target);
        }
        if matches!(
            self.registry.lookup(id).map(|w| &w.state),
            Some(WindowState::Fullscreen { .. })
        ) {
            self.display.raise_window(id);
        }
        Ok(())
    }

    /// If `requested` overlaps some tiling leaf on the focused monitor
    /// by at least `general.overlap_percentage` of its own area, centers
    /// the popup within that leaf instead of wherever it asked to open
    /// (spec ss6: "threshold for popup-to-frame association").
    fn associate_popup_rectangle(&self, requested: Rectangle) -> Rectangle {
        let tree = &self.monitors.focused_monitor().tree;
        let best = tree
            .preorder_leaves()
            .into_iter()
            .map(|leaf| tree.rectangle(leaf))
            .max_by_key(|frame_rectangle| overlap_area(&requested, frame_rectangle));
        let frame_rectangle = match best {
            Some(frame_rectangle) => frame_rectangle,
            None => return requested,
        };
        let area = requested.width as u64 * requested.height as u64;
        let threshold = self.config.general.overlap_percentage as u64;
        if area == 0 || overlap_area(&requested, &frame_rectangle) * 100 < area * threshold {
            return requested;
        }
        Rectangle::new(
            frame_rectangle.x + (frame_rectangle.width as i32 - requested.width as i32) / 2,
            frame_rectangle.y + (frame_rectangle.height as i32 - requested.height as i32) / 2,
            requested.width,
            requested.height,
        )
    }

    fn target_rectangle(&self, id: WindowId) -> Result<Rectangle> {
        let window = self
            .registry
            .lookup(id)
            .ok_or_else(|| FensterchefError::Protocol {
                code: 3,
                window: id,
                request: "target_rectangle",
            })?;
        Ok(match &window.state {
            WindowState::Tiling { frame } => {
                let leaf_rectangle = self
                    .monitors
                    .monitors
                    .iter()
                    .find(|m| m.tree.frame_of(id).is_some())
                    .map(|m| m.tree.rectangle(*frame));
                match leaf_rectangle {
                    // gaps.inner insets the window from its leaf's edges
                    // (spec ss6); the frame tree itself stays gap-free so
                    // its own tiling invariant (exact partition) holds.
                    Some(leaf_rectangle) => leaf_rectangle
                        .adjusted(self.config.gaps.inner.to_edge_delta(), 1)
                        .unwrap_or(leaf_rectangle),
                    None => window.geometry,
                }
            }
            WindowState::Popup { rectangle } => *rectangle,
            WindowState::Fullscreen { .. } => self.monitors.focused_monitor().rectangle,
            WindowState::Hidden { .. } => window.geometry,
        })
    }

    fn set_focus(&mut self, id: WindowId) {
        self.registry.set_focus(Some(id));
        match self.registry.lookup(id).map(|w| w.state.is_tiling()) {
            Some(true) => self.last_tiling_focus = Some(id),
            Some(false) => self.last_popup_focus = Some(id),
            None => {}
        }
    }

    // ---- navigation (spec ss4.5 "Navigation") ----------------------

    pub fn focus_direction(&mut self, direction: Direction) -> Result<()> {
        let tree = &mut self.monitors.focused_monitor_mut().tree;
        match tree.focus_direction(direction) {
            Some(leaf) => {
                if let Some(window) = tree.window_in(leaf) {
                    self.set_focus(window);
                }
                Ok(())
            }
            None => Err(FensterchefError::Rejected("no frame in that direction")),
        }
    }

    pub fn focus_parent(&mut self) -> Result<()> {
        self.monitors.focused_monitor_mut().tree.focus_parent();
        Ok(())
    }

    pub fn focus_child(&mut self) -> Result<()> {
        self.monitors.focused_monitor_mut().tree.focus_child();
        Ok(())
    }

    pub fn focus_root(&mut self) -> Result<()> {
        self.monitors.focused_monitor_mut().tree.focus_root();
        Ok(())
    }

    /// `next_window`/`previous_window`: cycles focus through the
    /// registry's insertion-order window list (spec ss4.5).
    pub fn cycle_focus(&mut self, step: i32) -> Result<()> {
        let order = self.registry.order();
        if order.is_empty() {
            return Err(FensterchefError::Rejected("no windows to cycle through"));
        }
        let current = self.registry.focus();
        let current_index = current
            .and_then(|id| order.iter().position(|&w| w == id))
            .unwrap_or(0) as i32;
        let len = order.len() as i32;
        let next_index = (((current_index + step) % len) + len) % len;
        let next = order[next_index as usize];
        self.set_focus(next);
        Ok(())
    }

    /// Swaps between the tiling and popup focus classes (spec ss4.5).
    pub fn toggle_focus_class(&mut self) -> Result<()> {
        let currently_tiling = self
            .registry
            .focus()
            .and_then(|id| self.registry.lookup(id))
            .map(|w| w.state.is_tiling())
            .unwrap_or(true);
        let target = if currently_tiling {
            self.last_popup_focus
        } else {
            self.last_tiling_focus
        };
        match target {
            Some(id) if self.registry.lookup(id).is_some() => {
                self.set_focus(id);
                Ok(())
            }
            _ => Err(FensterchefError::Rejected("no window of the other focus class")),
        }
    }

    // ---- mutation (spec ss4.5 "Mutation") --------------------------

    fn focused_leaf(&mut self) -> FrameId {
        let tree = &self.monitors.focused_monitor().tree;
        tree.leaf_under(tree.focused())
    }

    pub fn split_focused(&mut self, axis: Axis) -> Result<()> {
        let leaf = self.focused_leaf();
        self.monitors
            .focused_monitor_mut()
            .tree
            .split(leaf, axis)?;
        Ok(())
    }

    pub fn remove_focused(&mut self) -> Result<()> {
        let leaf = self.focused_leaf();
        let tree = &mut self.monitors.focused_monitor_mut().tree;
        if let Some(window) = tree.window_in(leaf) {
            tree.vacate(window);
            self.registry.destroy(window);
        }
        let auto_remove_void = self.config.tiling.auto_remove_void;
        self.monitors
            .focused_monitor_mut()
            .tree
            .remove(leaf, auto_remove_void)
    }

    pub fn exchange(&mut self, direction: Direction) -> Result<()> {
        self.monitors.focused_monitor_mut().tree.exchange(direction)
    }

    pub fn resize_focused(&mut self, delta: EdgeDelta) -> Result<()> {
        self.monitors.focused_monitor_mut().tree.resize_by(delta)
    }

    pub fn minimize_focused(&mut self) -> Result<()> {
        match self.registry.focus() {
            Some(id) => self.hide_window(id),
            None => Err(FensterchefError::Rejected("no focused window to minimize")),
        }
    }

    /// Sends `WM_DELETE_WINDOW` if the client supports it, else kills
    /// it outright (spec ss4.5).
    pub fn close_focused(&mut self) -> Result<()> {
        let id = self
            .registry
            .focus()
            .ok_or(FensterchefError::Rejected("no focused window to close"))?;
        let supports_delete = self
            .registry
            .lookup(id)
            .map(|w| w.protocols.contains(crate::window::Protocols::SUPPORTS_DELETE))
            .unwrap_or(false);
        if supports_delete {
            self.display.send_delete_window(id);
        } else {
            self.display.kill_client(id);
        }
        Ok(())
    }

    // ---- state toggles (spec ss4.5) --------------------------------

    pub fn toggle_tiling_focused(&mut self) -> Result<()> {
        let id = self
            .registry
            .focus()
            .ok_or(FensterchefError::Rejected("no focused window"))?;
        let is_tiling = self
            .registry
            .lookup(id)
            .map(|w| w.state.is_tiling())
            .unwrap_or(false);
        if is_tiling {
            // Detach from the tree, keep floating at its last geometry.
            let rect = self.registry.lookup(id).unwrap().geometry;
            self.monitors.focused_monitor_mut().tree.vacate(id);
            self.registry.lookup_mut(id).unwrap().state = WindowState::Popup { rectangle: rect };
        } else {
            let tree = &mut self.monitors.focused_monitor_mut().tree;
            let leaf = tree.first_empty_leaf().unwrap_or_else(|| tree.root());
            tree.assign_window(leaf, id)?;
            self.registry.lookup_mut(id).unwrap().state = WindowState::Tiling { frame: leaf };
        }
        self.apply_window_geometry(id)
    }

    pub fn toggle_fullscreen_focused(&mut self) -> Result<()> {
        let id = self
            .registry
            .focus()
            .ok_or(FensterchefError::Rejected("no focused window"))?;
        let window = self.registry.lookup_mut(id).unwrap();
        match &window.state {
            WindowState::Fullscreen { previous, .. } => {
                window.state = (**previous).clone();
            }
            other => {
                let monitor_rect = self.monitors.focused_monitor().rectangle;
                window.state = WindowState::Fullscreen {
                    rectangle: monitor_rect,
                    previous: Box::new(other.clone()),
                };
            }
        }
        self.apply_window_geometry(id)
    }

    // ---- meta (spec ss4.5) -----------------------------------------

    pub fn reload_configuration(&mut self) -> Result<()> {
        match Configuration::load_default_path() {
            Ok(new_config) => {
                self.config = new_config;
                log::info!("configuration reloaded");
                Ok(())
            }
            Err(err) => {
                log::warn!("configuration reload rejected: {err}; keeping prior configuration");
                Err(err)
            }
        }
    }

    pub fn show_window_list(&mut self) -> Result<()> {
        // Rendering the overlay is the notification module's job
        // (spec ss1: out of scope); this just logs the data it would
        // be handed.
        let names: Vec<&str> = self.registry.iterate().map(|w| w.name.as_str()).collect();
        log::info!("window list: {:?}", names);
        Ok(())
    }

    pub fn run_command(&mut self, command: &str) -> Result<()> {
        let terminal = std::env::var("TERMINAL").ok();
        let resolved = if let Some(term) = &terminal {
            command.replace("$TERMINAL", term)
        } else {
            command.to_string()
        };
        log::debug!("running command: {resolved}");
        match Command::new("sh").arg("-c").arg(resolved).spawn() {
            Ok(_) => Ok(()),
            Err(e) => {
                log::warn!("failed to spawn command: {e}");
                Err(FensterchefError::Rejected("failed to spawn command"))
            }
        }
    }

    pub fn quit(&mut self) -> Result<()> {
        self.running = false;
        Ok(())
    }

    pub fn begin_drag(&mut self, operation: DragOperation) -> Result<()> {
        self.begin_drag_at(operation, (0, 0))
    }

    /// Starts a move/resize drag on the focused window, anchored at
    /// `pointer` — the root-relative pointer position the triggering
    /// `ButtonPress` reported (spec ss4.6).
    pub fn begin_drag_at(&mut self, operation: DragOperation, pointer: (i32, i32)) -> Result<()> {
        let id = self
            .registry
            .focus()
            .ok_or(FensterchefError::Rejected("no focused window to drag"))?;
        let rectangle = self
            .registry
            .lookup(id)
            .ok_or(FensterchefError::Rejected("focused window vanished"))?
            .geometry;
        if !self.display.grab_pointer(self.display.root()) {
            return Err(FensterchefError::Rejected("pointer is already grabbed"));
        }
        self.selection = Some(Selection::begin(id, pointer, rectangle, operation));
        Ok(())
    }

    /// Applies a drag in progress to the pointer's new root-relative
    /// position, live-configuring the target window (spec ss4.6).
    /// Motion smaller than `mouse.resize_tolerance` in both axes since
    /// the last applied position is dropped, so the drag hit area
    /// absorbs pointer jitter instead of issuing a `ConfigureWindow` per
    /// sub-pixel-scale `MotionNotify` (spec ss6: "drag hit area").
    pub fn update_drag(&mut self, pointer: (i32, i32)) -> Result<()> {
        let tolerance = self.config.mouse.resize_tolerance as i32;
        let (target, rectangle) = match &mut self.selection {
            Some(selection) => {
                let dx = (pointer.0 - selection.last_pointer.0).abs();
                let dy = (pointer.1 - selection.last_pointer.1).abs();
                if dx < tolerance && dy < tolerance {
                    return Ok(());
                }
                (selection.target_window, selection.apply(pointer))
            }
            None => return Ok(()),
        };
        let border = self.config.border.size;
        self.display.configure_window(target, rectangle, border);
        if let Some(window) = self.registry.lookup_mut(target) {
            window.state = WindowState::Popup { rectangle };
            window.mark_applied(rectangle);
        }
        Ok(())
    }

    /// Ends a drag in progress, keeping the last-applied geometry
    /// (spec ss4.6: `ButtonRelease` commits).
    pub fn end_drag(&mut self) -> Result<()> {
        self.selection = None;
        self.display.ungrab_pointer();
        Ok(())
    }

    /// Cancels a drag in progress, restoring the window's geometry from
    /// before the drag began (spec ss5's Escape cancellation clause).
    pub fn cancel_drag(&mut self) -> Result<()> {
        if let Some(selection) = &self.selection {
            let target = selection.target_window;
            let start = selection.start();
            self.display.configure_window(target, start, self.config.border.size);
            if let Some(window) = self.registry.lookup_mut(target) {
                window.state = WindowState::Popup { rectangle: start };
                window.mark_applied(start);
            }
        }
        self.selection = None;
        self.display.ungrab_pointer();
        Ok(())
    }

    pub fn is_dragging(&self) -> bool {
        self.selection.is_some()
    }

    /// `FocusIn` notification: updates the registry's single
    /// focus-target invariant to match what the X server already
    /// decided, with no further user-visible behavior (spec ss9 open
    /// question, resolved per SPEC_FULL.md ss9). `FocusOut` carries no
    /// equivalent action, since focus usually moves straight to another
    /// managed window's own `FocusIn` and there is nothing useful to
    /// reset it to in between.
    pub fn note_focus_in(&mut self, id: WindowId) {
        if self.registry.lookup(id).is_some() {
            self.set_focus(id);
        }
    }

    // ---- X protocol inbound handling (spec ss4.6) -------------------

    /// Honors or ignores a `ConfigureRequest` per window state: tiling
    /// geometry is owned by the frame tree and such requests are
    /// ignored outright; popup requests are clamped to size hints and
    /// applied (spec ss9 open question, resolved per SPEC_FULL.md).
    pub fn handle_configure_request(&mut self, id: WindowId, requested: Rectangle) -> Result<()> {
        let window = match self.registry.lookup(id) {
            Some(w) => w,
            None => return Ok(()),
        };
        if window.state.is_tiling() {
            return Ok(());
        }
        let (width, height) = window.size_hints.clamp(requested.width, requested.height);
        let clamped = Rectangle::new(requested.x, requested.y, width, height);
        self.registry.lookup_mut(id).unwrap().state = WindowState::Popup { rectangle: clamped };
        self.apply_window_geometry(id)
    }

    pub fn refresh_window_name(&mut self, id: WindowId, name: String) {
        if let Some(window) = self.registry.lookup_mut(id) {
            window.name = name;
        }
    }

    pub fn refresh_size_hints(&mut self, id: WindowId, hints: SizeHints) {
        if let Some(window) = self.registry.lookup_mut(id) {
            window.size_hints = hints;
        }
    }

    pub fn refresh_wm_hints(&mut self, id: WindowId, hints: WmHints) {
        if let Some(window) = self.registry.lookup_mut(id) {
            window.wm_hints = hints;
        }
    }

    /// Merges a fresh RandR probe, migrating any windows whose monitor
    /// disappeared onto the primary monitor's tree (spec ss3, ss4.6).
    pub fn apply_randr_outputs(&mut self, outputs: &[RandrOutput]) -> Result<()> {
        let migrated = self.monitors.sync_from_randr(outputs);
        for relocation in migrated {
            if let Some(window) = self.registry.lookup_mut(relocation.window) {
                window.state = WindowState::Tiling {
                    frame: relocation.new_frame,
                };
            }
            self.apply_window_geometry(relocation.window)?;
        }
        Ok(())
    }
}

/// Area of the intersection of `a` and `b`, `0` if they don't overlap.
fn overlap_area(a: &Rectangle, b: &Rectangle) -> u64 {
    let left = a.x.max(b.x);
    let top = a.y.max(b.y);
    let right = a.right().min(b.right());
    let bottom = a.bottom().min(b.bottom());
    if right <= left || bottom <= top {
        0
    } else {
        (right - left) as u64 * (bottom - top) as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overlap_area_of_disjoint_rectangles_is_zero() {
        let a = Rectangle::new(0, 0, 100, 100);
        let b = Rectangle::new(200, 200, 50, 50);
        assert_eq!(overlap_area(&a, &b), 0);
    }

    #[test]
    fn overlap_area_of_fully_contained_rectangle_is_its_own_area() {
        let outer = Rectangle::new(0, 0, 200, 200);
        let inner = Rectangle::new(50, 50, 40, 40);
        assert_eq!(overlap_area(&outer, &inner), 1600);
    }

    #[test]
    fn overlap_area_of_partial_overlap() {
        let a = Rectangle::new(0, 0, 100, 100);
        let b = Rectangle::new(50, 50, 100, 100);
        assert_eq!(overlap_area(&a, &b), 50 * 50);
    }
}
