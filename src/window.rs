//! The managed-window record and its state machine.
//!
//! Generalizes the teacher's `Client`/`Window`/`Attributes` triple
//! (`rdwm.rs`) from a tiling-only model into the full
//! tiling/popup/fullscreen/hidden state machine of spec ss4.2.

use crate::frame::FrameId;
use crate::geometry::Rectangle;

/// Stable identity of an X window. A thin newtype around the raw Xlib
/// `Window` (a `c_ulong`), addressing the teacher's own
/// "TODO NewType pattern to prevent i32 aliasing issues" comment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WindowId(pub x11::xlib::Window);

impl From<x11::xlib::Window> for WindowId {
    fn from(raw: x11::xlib::Window) -> Self {
        WindowId(raw)
    }
}

bitflags::bitflags! {
    /// Which WM protocols (`WM_PROTOCOLS`) a client declared support for.
    pub struct Protocols: u8 {
        const NONE = 0;
        const SUPPORTS_DELETE = 1 << 0;
    }
}

/// `WM_NORMAL_HINTS` fields relevant to placement and popup clamping.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SizeHints {
    pub min: Option<(u32, u32)>,
    pub max: Option<(u32, u32)>,
    pub base: Option<(u32, u32)>,
    pub increment: Option<(u32, u32)>,
    pub aspect: Option<(u32, u32, u32, u32)>,
}

impl SizeHints {
    /// Whether these hints request a fixed size (min == max, both set)
    /// smaller than the given monitor rectangle — one of the
    /// `initial -> popup` triggers in spec ss4.2.
    pub fn requests_fixed_size_within(&self, monitor: &Rectangle) -> bool {
        match (self.min, self.max) {
            (Some(min), Some(max)) if min == max => {
                min.0 < monitor.width || min.1 < monitor.height
            }
            _ => false,
        }
    }

    /// Clamp a requested size to `min`/`max`, used when honoring a
    /// popup's `ConfigureRequest`.
    pub fn clamp(&self, width: u32, height: u32) -> (u32, u32) {
        let mut w = width;
        let mut h = height;
        if let Some((min_w, min_h)) = self.min {
            w = w.max(min_w);
            h = h.max(min_h);
        }
        if let Some((max_w, max_h)) = self.max {
            w = w.min(max_w);
            h = h.min(max_h);
        }
        (w, h)
    }
}

/// `WM_HINTS` fields relevant to focus and urgency handling.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WmHints {
    pub input: bool,
    pub urgent: bool,
}

/// The state a window occupies, each variant carrying the data needed
/// to restore or recompute its geometry (spec ss3/ss4.2).
#[derive(Debug, Clone, PartialEq)]
pub enum WindowState {
    /// Occupies a leaf in the owning monitor's frame tree.
    Tiling { frame: FrameId },
    /// Floating outside the tiling tree at a fixed rectangle.
    Popup { rectangle: Rectangle },
    /// Raised to the full monitor rectangle; remembers the state to
    /// restore when toggled off.
    Fullscreen {
        rectangle: Rectangle,
        previous: Box<WindowState>,
    },
    /// Unmapped but retained: frame slot (if any) and rectangle are
    /// kept so a later remap can restore them.
    Hidden { previous: Box<WindowState> },
}

impl WindowState {
    pub fn is_hidden(&self) -> bool {
        matches!(self, WindowState::Hidden { .. })
    }

    pub fn is_fullscreen(&self) -> bool {
        matches!(self, WindowState::Fullscreen { .. })
    }

    pub fn is_tiling(&self) -> bool {
        matches!(self, WindowState::Tiling { .. })
    }

    pub fn is_popup(&self) -> bool {
        matches!(self, WindowState::Popup { .. })
    }

    /// The frame this window occupies, if it is (or, while hidden, was)
    /// tiling.
    pub fn frame(&self) -> Option<FrameId> {
        match self {
            WindowState::Tiling { frame } => Some(*frame),
            WindowState::Hidden { previous } => previous.frame(),
            WindowState::Fullscreen { previous, .. } => previous.frame(),
            WindowState::Popup { .. } => None,
        }
    }
}

/// The internal record kept for every managed X window (spec ss3).
#[derive(Debug, Clone)]
pub struct Window {
    pub id: WindowId,
    pub geometry: Rectangle,
    /// The geometry last actually sent to the X server; used to make
    /// geometry application idempotent (spec ss4.2).
    pub(crate) last_applied: Option<Rectangle>,
    pub state: WindowState,
    pub name: String,
    pub size_hints: SizeHints,
    pub wm_hints: WmHints,
    pub protocols: Protocols,
    pub transient_for: Option<WindowId>,
    pub override_redirect: bool,
}

impl Window {
    pub fn new(id: WindowId, geometry: Rectangle, state: WindowState) -> Self {
        Window {
            id,
            geometry,
            last_applied: None,
            state,
            name: String::new(),
            size_hints: SizeHints::default(),
            wm_hints: WmHints::default(),
            protocols: Protocols::NONE,
            transient_for: None,
            override_redirect: false,
        }
    }

    /// Classify an about-to-be-managed window per the `initial -> *`
    /// rules of spec ss4.2.
    pub fn classify_initial(
        size_hints: &SizeHints,
        transient_for: Option<WindowId>,
        override_redirect: bool,
        monitor: &Rectangle,
    ) -> InitialClass {
        if override_redirect {
            InitialClass::UnmanagedPopup
        } else if transient_for.is_some() || size_hints.requests_fixed_size_within(monitor) {
            InitialClass::Popup
        } else {
            InitialClass::Tiling
        }
    }

    /// Whether the geometry application for `target` can be skipped
    /// because it matches what was last sent to the server (spec ss4.2
    /// idempotence rule).
    pub fn needs_configure(&self, target: &Rectangle) -> bool {
        self.last_applied.as_ref() != Some(target)
    }

    pub fn mark_applied(&mut self, target: Rectangle) {
        self.geometry = target;
        self.last_applied = Some(target);
    }
}

/// Result of classifying a newly-seen window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitialClass {
    Tiling,
    Popup,
    /// Override-redirect: tracked for stacking purposes only, never
    /// receives input or a frame slot (spec ss4.2).
    UnmanagedPopup,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rect() -> Rectangle {
        Rectangle::new(0, 0, 1920, 1080)
    }

    #[test]
    fn fixed_size_hints_smaller_than_monitor_trigger_popup() {
        let hints = SizeHints {
            min: Some((400, 300)),
            max: Some((400, 300)),
            ..Default::default()
        };
        assert_eq!(
            Window::classify_initial(&hints, None, false, &rect()),
            InitialClass::Popup
        );
    }

    #[test]
    fn plain_toplevel_is_tiling() {
        let hints = SizeHints::default();
        assert_eq!(
            Window::classify_initial(&hints, None, false, &rect()),
            InitialClass::Tiling
        );
    }

    #[test]
    fn override_redirect_is_unmanaged() {
        let hints = SizeHints::default();
        assert_eq!(
            Window::classify_initial(&hints, None, true, &rect()),
            InitialClass::UnmanagedPopup
        );
    }

    #[test]
    fn transient_is_popup_even_without_fixed_hints() {
        let hints = SizeHints::default();
        assert_eq!(
            Window::classify_initial(&hints, Some(WindowId(7)), false, &rect()),
            InitialClass::Popup
        );
    }

    #[test]
    fn needs_configure_is_false_once_applied() {
        let mut w = Window::new(WindowId(1), rect(), WindowState::Popup { rectangle: rect() });
        assert!(w.needs_configure(&rect()));
        w.mark_applied(rect());
        assert!(!w.needs_configure(&rect()));
    }
}
