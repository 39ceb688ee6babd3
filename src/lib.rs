//! fensterchef: a tiling X11 window manager.
//!
//! The crate is split bin+lib so the frame tree, binding engine, and
//! configuration parser can be exercised in `tests/` without an X
//! display — a pattern borrowed from window managers in the wider
//! corpus (e.g. penrose) rather than from the teacher, which was a
//! single binary crate.

pub mod action;
pub mod binding;
pub mod config;
pub mod context;
pub mod dispatcher;
pub mod display;
pub mod error;
pub mod frame;
pub mod geometry;
pub mod monitor;
pub mod registry;
pub mod selection;
pub mod window;
