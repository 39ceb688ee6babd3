use crate::window::WindowId;

/// The error kinds a running window manager can encounter.
///
/// Protocol errors and invariant violations are recoverable in release
/// builds (the offending event is dropped, or the window is detached
/// from every frame but one); resource exhaustion and malformed
/// configuration are not recovered from at the call site and propagate
/// to the caller named in their variant doc.
#[derive(Debug, thiserror::Error)]
pub enum FensterchefError {
    /// `XOpenDisplay` returned a null pointer.
    #[error("could not open a connection to the X display")]
    NoDisplay,

    /// `SubstructureRedirectMask` on the root window drew a `BadAccess`:
    /// another process already holds substructure redirection.
    #[error("another window manager is already running")]
    AlreadyRunning,

    /// An X protocol error (bad window, bad match, ...) reported
    /// through the error handler or a failed request. Never fatal:
    /// handlers log it and drop the triggering event.
    #[error("X protocol error {code} on window {window:?} ({request})")]
    Protocol {
        code: u8,
        window: WindowId,
        request: &'static str,
    },

    /// Allocation failure or an arena that can no longer grow. Fatal:
    /// the top-level loop ungrabs the keyboard/pointer and exits.
    #[error("resource exhaustion: {0}")]
    OutOfMemory(&'static str),

    /// A configuration file failed to parse or contained a value out
    /// of range. The prior configuration stays active.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// An internal invariant was violated (e.g. a window found in two
    /// frames at once). Aborts in debug builds; in release, logged and
    /// recovered from where possible.
    #[error("invariant violation: {0}")]
    InvariantViolation(String),

    /// A frame-tree operation could not be completed without violating
    /// a geometric constraint (e.g. a resize that would shrink a leaf
    /// below the minimum size). Not an error kind from spec ss7, but a
    /// routine "operation was rejected" signal the interpreter surfaces
    /// as a non-fatal, logged failure.
    #[error("frame operation rejected: {0}")]
    Rejected(&'static str),
}

pub type Result<T> = std::result::Result<T, FensterchefError>;
