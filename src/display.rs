//! Thin Xlib transport: open/close the display, intern atoms, issue
//! the request set named in spec ss6, flush batches.
//!
//! Grounded on the teacher's `Rdwm::init`/`register_root`/`Drop`
//! (`rdwm.rs`), which opens the display, grabs the root window for
//! substructure redirection, and closes the display on drop. Request
//! wrappers below are the generalization of the one-off `XGrabKey`/
//! `XSelectInput` calls the teacher makes inline in `register_root`.

use std::collections::HashMap;
use std::ffi::CString;
use std::os::raw::c_int;
use std::sync::atomic::{AtomicBool, Ordering};

use lazy_static::lazy_static;
use x11::xlib;

use crate::error::{FensterchefError, Result};
use crate::geometry::Rectangle;
use crate::window::WindowId;

lazy_static! {
    /// Set by `detect_other_wm` for the duration of the startup
    /// substructure-redirect probe; the teacher's `WM_DETECTED` under
    /// the same name, narrowed from a general "give up" flag to the
    /// one-shot startup check it is actually used for here (spec ss7's
    /// X protocol errors are otherwise handled by `log_error`, never by
    /// aborting the loop).
    static ref WM_DETECTED: AtomicBool = AtomicBool::new(false);
}

/// Installed only while probing for another running window manager:
/// a `BadAccess` here means someone else already holds substructure
/// redirection on the root. Mirrors the teacher's `on_wm_detected`.
unsafe extern "C" fn detect_other_wm(_display: *mut xlib::Display, _event: *mut xlib::XErrorEvent) -> c_int {
    WM_DETECTED.store(true, Ordering::SeqCst);
    0
}

/// The steady-state handler installed once startup succeeds: X
/// protocol errors are logged with the offending request and resource,
/// never fatal (spec ss7).
unsafe extern "C" fn log_error(_display: *mut xlib::Display, event: *mut xlib::XErrorEvent) -> c_int {
    let event = &*event;
    log::warn!(
        "X error {} (request {}.{}) on resource {}",
        event.error_code,
        event.request_code,
        event.minor_code,
        event.resourceid
    );
    0
}

/// The atoms read or written per spec ss6.
pub const ATOM_NAMES: &[&str] = &[
    "WM_PROTOCOLS",
    "WM_DELETE_WINDOW",
    "WM_STATE",
    "WM_NAME",
    "_NET_WM_NAME",
    "_NET_WM_STATE",
    "_NET_WM_STATE_FULLSCREEN",
    "WM_NORMAL_HINTS",
    "WM_HINTS",
    "WM_TRANSIENT_FOR",
];

/// A raw Xlib connection plus an atom cache. Owns the display pointer;
/// `Drop` closes it, mirroring the teacher exactly.
pub struct Display {
    raw: *mut xlib::Display,
    root: WindowId,
    screen: c_int,
    atoms: HashMap<&'static str, xlib::Atom>,
}

impl Display {
    /// `XOpenDisplay(None)`; fails with `NoDisplay` on a null pointer,
    /// exactly as the teacher's `Rdwm::init` does.
    pub fn open() -> Result<Self> {
        let raw = unsafe { xlib::XOpenDisplay(std::ptr::null()) };
        if raw.is_null() {
            return Err(FensterchefError::NoDisplay);
        }
        let screen = unsafe { xlib::XDefaultScreen(raw) };
        let root = unsafe { xlib::XRootWindow(raw, screen) };
        let mut display = Display {
            raw,
            root: WindowId(root),
            screen,
            atoms: HashMap::new(),
        };
        for name in ATOM_NAMES {
            display.intern_atom(name);
        }

        WM_DETECTED.store(false, Ordering::SeqCst);
        unsafe {
            xlib::XSetErrorHandler(Some(detect_other_wm));
        }
        display.select_root_events();
        unsafe {
            xlib::XSync(raw, xlib::False as c_int);
        }
        if WM_DETECTED.load(Ordering::SeqCst) {
            // `display`'s `Drop` closes the connection on the way out.
            return Err(FensterchefError::AlreadyRunning);
        }
        unsafe {
            xlib::XSetErrorHandler(Some(log_error));
        }
        Ok(display)
    }

    pub fn root(&self) -> WindowId {
        self.root
    }

    pub fn screen_rectangle(&self) -> Rectangle {
        unsafe {
            let width = xlib::XDisplayWidth(self.raw, self.screen);
            let height = xlib::XDisplayHeight(self.raw, self.screen);
            Rectangle::from_size(width as u32, height as u32)
        }
    }

    pub fn raw(&self) -> *mut xlib::Display {
        self.raw
    }

    /// Caches a resolved atom on first lookup, as the teacher's
    /// `register_root` resolves `XK_Return` eagerly at startup rather
    /// than on every keypress.
    pub fn intern_atom(&mut self, name: &'static str) -> xlib::Atom {
        if let Some(&atom) = self.atoms.get(name) {
            return atom;
        }
        let c_name = CString::new(name).expect("atom name has no interior NUL");
        let atom = unsafe { xlib::XInternAtom(self.raw, c_name.as_ptr(), xlib::False) };
        self.atoms.insert(name, atom);
        atom
    }

    pub fn atom(&self, name: &str) -> Option<xlib::Atom> {
        self.atoms.get(name).copied()
    }

    /// Registers the root window for substructure redirection and
    /// notification, per spec ss6's `ChangeWindowAttributes`
    /// requirement. Mirrors the teacher's `XSelectInput` call in
    /// `register_root`/`run`.
    pub fn select_root_events(&self) {
        unsafe {
            xlib::XSelectInput(
                self.raw,
                self.root.0,
                xlib::SubstructureRedirectMask | xlib::SubstructureNotifyMask,
            );
        }
    }

    pub fn select_window_events(&self, window: WindowId, mask: i64) {
        unsafe {
            xlib::XSelectInput(self.raw, window.0, mask);
        }
    }

    pub fn map_window(&self, window: WindowId) {
        unsafe {
            xlib::XMapWindow(self.raw, window.0);
        }
    }

    pub fn unmap_window(&self, window: WindowId) {
        unsafe {
            xlib::XUnmapWindow(self.raw, window.0);
        }
    }

    pub fn configure_window(&self, window: WindowId, rectangle: Rectangle, border_width: u32) {
        unsafe {
            let mut changes = xlib::XWindowChanges {
                x: rectangle.x,
                y: rectangle.y,
                width: rectangle.width as i32,
                height: rectangle.height as i32,
                border_width: border_width as i32,
                sibling: 0,
                stack_mode: 0,
            };
            let mask = (xlib::CWX
                | xlib::CWY
                | xlib::CWWidth
                | xlib::CWHeight
                | xlib::CWBorderWidth) as u32;
            xlib::XConfigureWindow(self.raw, window.0, mask, &mut changes);
        }
    }

    pub fn raise_window(&self, window: WindowId) {
        unsafe {
            xlib::XRaiseWindow(self.raw, window.0);
        }
    }

    pub fn get_geometry(&self, window: WindowId) -> Option<Rectangle> {
        unsafe {
            let mut root: xlib::Window = 0;
            let mut x = 0;
            let mut y = 0;
            let mut width = 0u32;
            let mut height = 0u32;
            let mut border_width = 0u32;
            let mut depth = 0u32;
            let ok = xlib::XGetGeometry(
                self.raw,
                window.0,
                &mut root,
                &mut x,
                &mut y,
                &mut width,
                &mut height,
                &mut border_width,
                &mut depth,
            );
            if ok == 0 {
                None
            } else {
                Some(Rectangle::new(x, y, width, height))
            }
        }
    }

    pub fn grab_key(&self, keycode: c_int, modifiers: u32) {
        unsafe {
            xlib::XGrabKey(
                self.raw,
                keycode,
                modifiers,
                self.root.0,
                xlib::False as c_int,
                xlib::GrabModeAsync,
                xlib::GrabModeAsync,
            );
        }
    }

    pub fn ungrab_key(&self, keycode: c_int, modifiers: u32) {
        unsafe {
            xlib::XUngrabKey(self.raw, keycode, modifiers, self.root.0);
        }
    }

    pub fn grab_button(&self, button: u32, modifiers: u32, window: WindowId) {
        unsafe {
            xlib::XGrabButton(
                self.raw,
                button,
                modifiers,
                window.0,
                xlib::False as c_int,
                (xlib::ButtonPressMask | xlib::ButtonReleaseMask | xlib::PointerMotionMask) as u32,
                xlib::GrabModeAsync,
                xlib::GrabModeAsync,
                0,
                0,
            );
        }
    }

    pub fn grab_pointer(&self, window: WindowId) -> bool {
        let status = unsafe {
            xlib::XGrabPointer(
                self.raw,
                window.0,
                xlib::False as c_int,
                (xlib::ButtonPressMask | xlib::ButtonReleaseMask | xlib::PointerMotionMask) as u32,
                xlib::GrabModeAsync,
                xlib::GrabModeAsync,
                0,
                0,
                xlib::CurrentTime,
            )
        };
        status == xlib::GrabSuccess
    }

    pub fn ungrab_pointer(&self) {
        unsafe {
            xlib::XUngrabPointer(self.raw, xlib::CurrentTime);
        }
    }

    pub fn keycode_to_keysym(&self, keycode: u32) -> xlib::KeySym {
        unsafe { xlib::XKeycodeToKeysym(self.raw, keycode as u8, 0) }
    }

    pub fn keysym_to_keycode(&self, keysym: xlib::KeySym) -> c_int {
        unsafe { xlib::XKeysymToKeycode(self.raw, keysym) as c_int }
    }

    pub fn send_delete_window(&self, window: WindowId) {
        let wm_protocols = match self.atom("WM_PROTOCOLS") {
            Some(a) => a,
            None => return,
        };
        let wm_delete = match self.atom("WM_DELETE_WINDOW") {
            Some(a) => a,
            None => return,
        };
        unsafe {
            let mut event: xlib::XClientMessageEvent = std::mem::zeroed();
            event.type_ = xlib::ClientMessage;
            event.window = window.0;
            event.message_type = wm_protocols;
            event.format = 32;
            event.data.set_long(0, wm_delete as i64);
            event.data.set_long(1, xlib::CurrentTime as i64);
            let mut xevent = xlib::XEvent { client_message: event };
            xlib::XSendEvent(self.raw, window.0, xlib::False as c_int, 0, &mut xevent);
        }
    }

    pub fn kill_client(&self, window: WindowId) {
        unsafe {
            xlib::XKillClient(self.raw, window.0);
        }
    }

    /// Flushes the request queue. Per spec ss5's ordering requirement,
    /// every event handler must call this before the loop returns to
    /// its blocking read.
    pub fn flush(&self) {
        unsafe {
            xlib::XFlush(self.raw);
        }
    }

    pub fn sync(&self) {
        unsafe {
            xlib::XSync(self.raw, xlib::False as c_int);
        }
    }
}

impl Drop for Display {
    /// Matches the teacher's `Drop for Rdwm` exactly: closing the
    /// display is the one resource-cleanup action that must always
    /// run, even on panic-driven unwinding.
    fn drop(&mut self) {
        unsafe {
            xlib::XCloseDisplay(self.raw);
        }
        log::info!("closed X display connection");
    }
}
