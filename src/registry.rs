//! The window registry: owns every managed `Window`'s lifecycle
//! (spec ss4.1).
//!
//! Generalizes the teacher's `clients: HashMap<Window, Window>`
//! (`main.rs`) / `Workspace.clients: Vec<Client>` (`rdwm.rs`) into a
//! single id-keyed map holding the full `Window` record of spec ss3,
//! with the back-reference into the frame tree expressed as an id
//! lookup rather than a pointer (spec ss9's cyclic-reference note).

use std::collections::HashMap;

use crate::error::{FensterchefError, Result};
use crate::window::{Window, WindowId};

#[derive(Debug, Default)]
pub struct WindowRegistry {
    windows: HashMap<WindowId, Window>,
    focus: Option<WindowId>,
    /// Insertion order, used by `next_window`/`previous_window`
    /// cycling (spec ss4.5) — a plain `Vec` mirrors the teacher's
    /// `Workspace.clients: Vec<Client>` ordering.
    order: Vec<WindowId>,
}

impl WindowRegistry {
    pub fn new() -> Self {
        WindowRegistry::default()
    }

    /// Inserts a freshly constructed `Window` record. Fails with
    /// `InvariantViolation` if `id` is already managed (spec ss4.1:
    /// "Fails with AlreadyManaged if the xid is present").
    pub fn create(&mut self, window: Window) -> Result<()> {
        if self.windows.contains_key(&window.id) {
            return Err(FensterchefError::InvariantViolation(format!(
                "window {:?} is already managed",
                window.id
            )));
        }
        self.order.push(window.id);
        self.windows.insert(window.id, window);
        Ok(())
    }

    pub fn lookup(&self, id: WindowId) -> Option<&Window> {
        self.windows.get(&id)
    }

    pub fn lookup_mut(&mut self, id: WindowId) -> Option<&mut Window> {
        self.windows.get_mut(&id)
    }

    /// Removes `id`'s record, clearing focus if it was the target
    /// (spec ss4.1). The caller is responsible for vacating its frame
    /// slot first.
    pub fn destroy(&mut self, id: WindowId) -> Option<Window> {
        self.order.retain(|&w| w != id);
        if self.focus == Some(id) {
            self.focus = None;
        }
        self.windows.remove(&id)
    }

    pub fn iterate(&self) -> impl Iterator<Item = &Window> {
        self.windows.values()
    }

    pub fn order(&self) -> &[WindowId] {
        &self.order
    }

    pub fn focus(&self) -> Option<WindowId> {
        self.focus
    }

    /// Sets the single focus target (spec ss3: "exactly one window is
    /// the focus target (possibly none)"). `None` clears focus.
    pub fn set_focus(&mut self, id: Option<WindowId>) {
        self.focus = id;
    }

    pub fn len(&self) -> usize {
        self.windows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Rectangle;
    use crate::window::WindowState;

    fn win(id: u64) -> Window {
        Window::new(
            WindowId(id),
            Rectangle::new(0, 0, 100, 100),
            WindowState::Popup {
                rectangle: Rectangle::new(0, 0, 100, 100),
            },
        )
    }

    #[test]
    fn create_rejects_duplicate_ids() {
        let mut registry = WindowRegistry::new();
        registry.create(win(1)).unwrap();
        assert!(registry.create(win(1)).is_err());
    }

    #[test]
    fn destroy_clears_focus_when_it_was_the_target() {
        let mut registry = WindowRegistry::new();
        registry.create(win(1)).unwrap();
        registry.set_focus(Some(WindowId(1)));
        registry.destroy(WindowId(1));
        assert_eq!(registry.focus(), None);
        assert!(registry.lookup(WindowId(1)).is_none());
    }

    #[test]
    fn destroyed_window_appears_in_no_structure() {
        let mut registry = WindowRegistry::new();
        registry.create(win(1)).unwrap();
        registry.create(win(2)).unwrap();
        registry.destroy(WindowId(1));
        assert!(!registry.order().contains(&WindowId(1)));
        assert_eq!(registry.iterate().count(), 1);
    }
}
