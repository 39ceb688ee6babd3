//! The action interpreter: `(current state, parameter) -> state' + X
//! requests`, dispatched by `ActionCode` tag, never by dynamic lookup
//! (spec ss4.5, ss9).
//!
//! New relative to the teacher (which has no action system at all —
//! its single hardcoded `XGrabKey` in `register_root` ungrabbed itself
//! on the first press and did nothing else); dispatch style is
//! grounded on `window.rs`'s tagged `WindowState`, matched the same
//! way: a plain `match` over an enum tag, one arm per code.

use crate::binding::{Action, DataValue};
use crate::context::Context;
use crate::error::{FensterchefError, Result};
use crate::geometry::{Axis, Direction, EdgeDelta};

/// Every action the interpreter knows how to run (spec ss4.5).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionCode {
    // Navigation
    FocusUp,
    FocusDown,
    FocusLeft,
    FocusRight,
    ParentFrame,
    ChildFrame,
    RootFrame,
    NextWindow,
    PreviousWindow,
    ToggleFocus,
    // Mutation
    SplitHorizontally,
    SplitVertically,
    RemoveFrame,
    ExchangeUp,
    ExchangeDown,
    ExchangeLeft,
    ExchangeRight,
    ResizeBy,
    MinimizeWindow,
    CloseWindow,
    // State toggles
    ToggleTiling,
    ToggleFullscreen,
    // Meta
    ReloadConfiguration,
    ShowWindowList,
    Run,
    Quit,
    // Pointer-drag initiation (spec ss6 default pointer bindings)
    BeginMove,
    BeginResize,
}

impl ActionCode {
    /// Resolves a config-file action name (`"focus_left"`,
    /// `"split_horizontally"`, `"run"`, ...) to its code.
    pub fn from_name(name: &str) -> Option<Self> {
        use ActionCode::*;
        Some(match name {
            "focus_up" => FocusUp,
            "focus_down" => FocusDown,
            "focus_left" => FocusLeft,
            "focus_right" => FocusRight,
            "parent_frame" => ParentFrame,
            "child_frame" => ChildFrame,
            "root_frame" => RootFrame,
            "next_window" => NextWindow,
            "previous_window" => PreviousWindow,
            "toggle_focus" => ToggleFocus,
            "split_horizontally" => SplitHorizontally,
            "split_vertically" => SplitVertically,
            "remove_frame" => RemoveFrame,
            "exchange_up" => ExchangeUp,
            "exchange_down" => ExchangeDown,
            "exchange_left" => ExchangeLeft,
            "exchange_right" => ExchangeRight,
            "resize_by" => ResizeBy,
            "minimize_window" => MinimizeWindow,
            "close_window" => CloseWindow,
            "toggle_tiling" => ToggleTiling,
            "toggle_fullscreen" => ToggleFullscreen,
            "reload_configuration" => ReloadConfiguration,
            "show_window_list" => ShowWindowList,
            "run" => Run,
            "quit" => Quit,
            "begin_move" => BeginMove,
            "begin_resize" => BeginResize,
            _ => return None,
        })
    }
}

/// Runs a binding's action sequence in order, stopping on the first
/// fatal error; non-fatal errors (`Rejected`, dropped protocol errors)
/// are logged and execution continues (spec ss4.5).
pub fn execute_sequence(ctx: &mut Context, actions: &[Action]) -> Result<()> {
    for action in actions {
        match execute(ctx, action) {
            Ok(()) => {}
            Err(err @ FensterchefError::Rejected(_)) | Err(err @ FensterchefError::Protocol { .. }) => {
                log::warn!("action {:?} did not complete: {}", action.code, err);
            }
            Err(fatal) => return Err(fatal),
        }
    }
    Ok(())
}

fn execute(ctx: &mut Context, action: &Action) -> Result<()> {
    use ActionCode::*;
    match action.code {
        FocusUp => ctx.focus_direction(Direction::Up),
        FocusDown => ctx.focus_direction(Direction::Down),
        FocusLeft => ctx.focus_direction(Direction::Left),
        FocusRight => ctx.focus_direction(Direction::Right),
        ParentFrame => ctx.focus_parent(),
        ChildFrame => ctx.focus_child(),
        RootFrame => ctx.focus_root(),
        NextWindow => ctx.cycle_focus(1),
        PreviousWindow => ctx.cycle_focus(-1),
        ToggleFocus => ctx.toggle_focus_class(),
        SplitHorizontally => ctx.split_focused(Axis::Horizontal),
        SplitVertically => ctx.split_focused(Axis::Vertical),
        RemoveFrame => ctx.remove_focused(),
        ExchangeUp => ctx.exchange(Direction::Up),
        ExchangeDown => ctx.exchange(Direction::Down),
        ExchangeLeft => ctx.exchange(Direction::Left),
        ExchangeRight => ctx.exchange(Direction::Right),
        ResizeBy => ctx.resize_focused(quad_param(&action.parameter)?),
        MinimizeWindow => ctx.minimize_focused(),
        CloseWindow => ctx.close_focused(),
        ToggleTiling => ctx.toggle_tiling_focused(),
        ToggleFullscreen => ctx.toggle_fullscreen_focused(),
        ReloadConfiguration => ctx.reload_configuration(),
        ShowWindowList => ctx.show_window_list(),
        Run => ctx.run_command(string_param(&action.parameter)?),
        Quit => ctx.quit(),
        BeginMove => ctx.begin_drag(crate::selection::DragOperation::Move),
        BeginResize => ctx.begin_drag(crate::selection::DragOperation::Resize),
    }
}

fn quad_param(value: &DataValue) -> Result<EdgeDelta> {
    match value {
        DataValue::Quad(left, top, right, bottom) => Ok(EdgeDelta {
            left: *left,
            top: *top,
            right: *right,
            bottom: *bottom,
        }),
        _ => Err(FensterchefError::InvariantViolation(
            "resize_by action given a non-quad parameter".into(),
        )),
    }
}

fn string_param(value: &DataValue) -> Result<&str> {
    match value {
        DataValue::String(s) => Ok(s.as_str()),
        _ => Err(FensterchefError::InvariantViolation(
            "run action given a non-string parameter".into(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_name_round_trips_every_builtin() {
        let names = [
            "focus_up", "focus_down", "focus_left", "focus_right", "parent_frame",
            "child_frame", "root_frame", "next_window", "previous_window", "toggle_focus",
            "split_horizontally", "split_vertically", "remove_frame", "exchange_up",
            "exchange_down", "exchange_left", "exchange_right", "resize_by", "minimize_window",
            "close_window", "toggle_tiling", "toggle_fullscreen", "reload_configuration",
            "show_window_list", "run", "quit", "begin_move", "begin_resize",
        ];
        for name in names {
            assert!(ActionCode::from_name(name).is_some(), "missing mapping for {name}");
        }
    }

    #[test]
    fn unknown_action_name_is_none() {
        assert!(ActionCode::from_name("not_a_real_action").is_none());
    }

    #[test]
    fn quad_param_rejects_wrong_variant() {
        assert!(quad_param(&DataValue::None).is_err());
        assert!(quad_param(&DataValue::Quad(1, 2, 3, 4)).is_ok());
    }
}
