//! The keyboard/pointer binding table: `(modifiers, symbol/button,
//! flags) -> [Action]`, with a default binding set merged
//! non-destructively over user configuration (spec ss4.4).
//!
//! Grounded on the teacher's `Config`'s `KeySettings`/`CommandSettings`
//! (named operations referenced by keybindings) and the one `XGrabKey`
//! call in `register_root`. Enriched from penrose's `core/bindings.rs`
//! (`KeyCode`, `ignoring_modifier`, per-modifier-key enum) for the
//! ignore-modifiers grab expansion spec ss4.4 requires, reimplemented
//! here against xlib (`XGrabKey`/`XGrabButton`) rather than x11rb.

use std::ffi::CString;

use serde::{Deserialize, Serialize};

use crate::action::ActionCode;
use crate::display::Display;

bitflags::bitflags! {
    /// When a binding fires, relative to press/release.
    pub struct BindingFlags: u8 {
        const ON_PRESS = 1 << 0;
        const ON_RELEASE = 1 << 1;
        const WHILE_HELD = 1 << 2;
    }
}

impl Default for BindingFlags {
    fn default() -> Self {
        BindingFlags::ON_PRESS
    }
}

/// What a binding is triggered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Trigger {
    Key(u64),
    Button(u32),
}

/// The tagged parameter carried by an `Action` (spec ss3/ss9: "the
/// `DataValue` variant encapsulates parameter polymorphism").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value")]
pub enum DataValue {
    None,
    Integer(i32),
    Quad(i32, i32, i32, i32),
    String(String),
}

/// `{code, parameter}` pair. The interpreter dispatches by `code`
/// alone (spec ss9: "a single switch over codes, parameter type
/// determined by code — not by dynamic lookup").
#[derive(Debug, Clone, PartialEq)]
pub struct Action {
    pub code: ActionCode,
    pub parameter: DataValue,
}

impl Action {
    pub fn new(code: ActionCode, parameter: DataValue) -> Self {
        Action { code, parameter }
    }

    pub fn bare(code: ActionCode) -> Self {
        Action::new(code, DataValue::None)
    }
}

/// A resolved binding: `effective_modifiers` already has the context's
/// default modifiers OR'd in (spec ss4.4: "effective_modifiers =
/// binding.modifiers | context.default_modifiers").
#[derive(Debug, Clone, PartialEq)]
pub struct Binding {
    pub effective_modifiers: u32,
    pub trigger: Trigger,
    pub flags: BindingFlags,
    pub actions: Vec<Action>,
}

impl Binding {
    pub fn key(&self) -> (u32, Trigger, BindingFlags) {
        (self.effective_modifiers, self.trigger, self.flags)
    }
}

/// The serde-facing shape of one `[[keyboard.keys]]`/`[[mouse.buttons]]`
/// table entry — human-readable modifier/trigger names, resolved to a
/// `Binding` at load time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BindingSpec {
    #[serde(default)]
    pub modifiers: Vec<String>,
    pub trigger: String,
    #[serde(default)]
    pub on_release: bool,
    #[serde(default)]
    pub while_held: bool,
    pub actions: Vec<ActionSpec>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionSpec {
    pub code: String,
    #[serde(default)]
    pub parameter: DataValue,
}

impl Default for DataValue {
    fn default() -> Self {
        DataValue::None
    }
}

/// Resolves a modifier name (`"Mod4"`, `"Shift"`, `"Ctrl"`, `"Mod1"`,
/// `"Lock"`, `"Mod2"`) to its Xlib mask bit.
pub fn modifier_mask(name: &str) -> Option<u32> {
    use x11::xlib::*;
    Some(match name {
        "Shift" => ShiftMask,
        "Lock" => LockMask,
        "Ctrl" | "Control" => ControlMask,
        "Mod1" | "Alt" => Mod1Mask,
        "Mod2" | "NumLock" => Mod2Mask,
        "Mod3" => Mod3Mask,
        "Mod4" | "Super" => Mod4Mask,
        "Mod5" => Mod5Mask,
        _ => return None,
    })
}

/// Resolves a key name (`"Return"`, `"q"`, `"space"`) to an X keysym
/// via `XStringToKeysym`, a pure lookup that needs no open display.
pub fn keysym_from_name(name: &str) -> Option<u64> {
    let c_name = CString::new(name).ok()?;
    let sym = unsafe { x11::xlib::XStringToKeysym(c_name.as_ptr()) };
    if sym == x11::xlib::NoSymbol as u64 {
        None
    } else {
        Some(sym)
    }
}

impl BindingSpec {
    /// Resolves this spec against `default_modifiers`, producing the
    /// effective-modifiers `Binding` the lookup table stores.
    pub fn resolve(&self, default_modifiers: u32, is_button: bool) -> Option<Binding> {
        let mut modifiers = 0u32;
        for name in &self.modifiers {
            modifiers |= modifier_mask(name)?;
        }
        let effective_modifiers = modifiers | default_modifiers;

        let trigger = if is_button {
            Trigger::Button(self.trigger.parse().ok()?)
        } else {
            Trigger::Key(keysym_from_name(&self.trigger)?)
        };

        let mut flags = BindingFlags::empty();
        if self.while_held {
            flags |= BindingFlags::WHILE_HELD;
        } else if self.on_release {
            flags |= BindingFlags::ON_RELEASE;
        } else {
            flags |= BindingFlags::ON_PRESS;
        }

        let actions = self
            .actions
            .iter()
            .filter_map(|a| ActionCode::from_name(&a.code).map(|code| Action::new(code, a.parameter.clone())))
            .collect();

        Some(Binding {
            effective_modifiers,
            trigger,
            flags,
            actions,
        })
    }
}

/// The resolved lookup table: user bindings (in config order) with the
/// default table appended non-destructively (spec ss4.4).
#[derive(Debug, Default)]
pub struct BindingTable {
    bindings: Vec<Binding>,
}

impl BindingTable {
    pub fn new() -> Self {
        BindingTable { bindings: Vec::new() }
    }

    pub fn bindings(&self) -> &[Binding] {
        &self.bindings
    }

    /// Finds the binding whose `(effective_modifiers, trigger, flags)`
    /// matches `(raw_modifiers & !ignore_modifiers, trigger, flags)`
    /// (spec ss4.4's lookup rule).
    pub fn lookup(&self, raw_modifiers: u32, ignore_modifiers: u32, trigger: Trigger, flags: BindingFlags) -> Option<&Binding> {
        let effective = raw_modifiers & !ignore_modifiers;
        self.bindings
            .iter()
            .find(|b| b.effective_modifiers == effective && b.trigger == trigger && b.flags == flags)
    }

    /// Builds a table from user bindings (already resolved in config
    /// order) with `defaults` appended where no `(effective_modifiers,
    /// trigger, flags)` collision exists. Deterministic,
    /// order-preserving of user bindings, defaults appended in table
    /// order (spec ss4.4). Action parameters are already deep-copied
    /// by `Binding`/`DataValue`'s `Clone` — no shared ownership is
    /// possible, satisfying spec ss9's deep-copy requirement.
    pub fn merge(user: Vec<Binding>, defaults: &[Binding]) -> Self {
        let mut bindings = user;
        for default in defaults {
            let collides = bindings.iter().any(|b| b.key() == default.key());
            if !collides {
                bindings.push(default.clone());
            }
        }
        BindingTable { bindings }
    }

    /// Re-grabs every bound key/button on the root window, once per
    /// combination of `binding_modifiers` with any subset of
    /// `ignore_modifiers`, so lock-state modifiers (CapsLock, NumLock)
    /// don't suppress triggers (spec ss4.4).
    pub fn grab_all(&self, display: &Display, ignore_modifiers: u32) {
        for binding in &self.bindings {
            for extra in subsets_of(ignore_modifiers) {
                let mods = binding.effective_modifiers | extra;
                match binding.trigger {
                    Trigger::Key(keysym) => {
                        let keycode = display.keysym_to_keycode(keysym);
                        display.grab_key(keycode, mods);
                    }
                    Trigger::Button(button) => {
                        display.grab_button(button, mods, display.root());
                    }
                }
            }
        }
    }
}

/// Every subset of the bits set in `mask`, including 0 and `mask`
/// itself. `mask` is expected to be a handful of lock-modifier bits,
/// so the subset count stays tiny (at most 16 for 4 bits).
fn subsets_of(mask: u32) -> Vec<u32> {
    let bits: Vec<u32> = (0..32).map(|i| 1u32 << i).filter(|&b| mask & b != 0).collect();
    let mut out = vec![0u32];
    for bit in bits {
        let existing: Vec<u32> = out.clone();
        out.extend(existing.into_iter().map(|s| s | bit));
    }
    out
}

/// Default binding table (spec ss6): reproduced in semantics from the
/// representative subset listed in the external-interfaces table.
/// `$TERMINAL` is resolved by the `ACTION_RUN` interpreter, not here.
pub fn default_bindings() -> Vec<Binding> {
    use ActionCode::*;
    let mod4 = modifier_mask("Mod4").unwrap();
    let shift = modifier_mask("Shift").unwrap();
    let ctrl = modifier_mask("Ctrl").unwrap();

    let key = |name: &str| Trigger::Key(keysym_from_name(name).expect("builtin default keysym name must resolve"));

    vec![
        Binding {
            effective_modifiers: mod4,
            trigger: key("Return"),
            flags: BindingFlags::ON_PRESS,
            actions: vec![Action::new(Run, DataValue::String("$TERMINAL || xterm".into()))],
        },
        Binding {
            effective_modifiers: mod4,
            trigger: key("q"),
            flags: BindingFlags::ON_PRESS,
            actions: vec![Action::bare(CloseWindow)],
        },
        Binding {
            effective_modifiers: mod4,
            trigger: key("v"),
            flags: BindingFlags::ON_PRESS,
            actions: vec![Action::bare(SplitHorizontally)],
        },
        Binding {
            effective_modifiers: mod4,
            trigger: key("s"),
            flags: BindingFlags::ON_PRESS,
            actions: vec![Action::bare(SplitVertically)],
        },
        Binding {
            effective_modifiers: mod4,
            trigger: key("h"),
            flags: BindingFlags::ON_PRESS,
            actions: vec![Action::bare(FocusLeft)],
        },
        Binding {
            effective_modifiers: mod4,
            trigger: key("j"),
            flags: BindingFlags::ON_PRESS,
            actions: vec![Action::bare(FocusDown)],
        },
        Binding {
            effective_modifiers: mod4,
            trigger: key("k"),
            flags: BindingFlags::ON_PRESS,
            actions: vec![Action::bare(FocusUp)],
        },
        Binding {
            effective_modifiers: mod4,
            trigger: key("l"),
            flags: BindingFlags::ON_PRESS,
            actions: vec![Action::bare(FocusRight)],
        },
        Binding {
            effective_modifiers: mod4 | shift,
            trigger: key("h"),
            flags: BindingFlags::ON_PRESS,
            actions: vec![Action::bare(ExchangeLeft)],
        },
        Binding {
            effective_modifiers: mod4 | shift,
            trigger: key("j"),
            flags: BindingFlags::ON_PRESS,
            actions: vec![Action::bare(ExchangeDown)],
        },
        Binding {
            effective_modifiers: mod4 | shift,
            trigger: key("k"),
            flags: BindingFlags::ON_PRESS,
            actions: vec![Action::bare(ExchangeUp)],
        },
        Binding {
            effective_modifiers: mod4 | shift,
            trigger: key("l"),
            flags: BindingFlags::ON_PRESS,
            actions: vec![Action::bare(ExchangeRight)],
        },
        Binding {
            effective_modifiers: mod4 | ctrl | shift,
            trigger: key("e"),
            flags: BindingFlags::ON_PRESS,
            actions: vec![Action::bare(Quit)],
        },
        Binding {
            effective_modifiers: mod4,
            trigger: key("f"),
            flags: BindingFlags::ON_PRESS,
            actions: vec![Action::bare(ToggleFullscreen)],
        },
        Binding {
            effective_modifiers: mod4,
            trigger: key("space"),
            flags: BindingFlags::ON_PRESS,
            actions: vec![Action::bare(ToggleFocus)],
        },
        Binding {
            effective_modifiers: mod4 | shift,
            trigger: key("space"),
            flags: BindingFlags::ON_PRESS,
            actions: vec![Action::bare(ToggleTiling)],
        },
        Binding {
            effective_modifiers: mod4 | shift,
            trigger: key("r"),
            flags: BindingFlags::ON_PRESS,
            actions: vec![Action::bare(ReloadConfiguration)],
        },
        Binding {
            effective_modifiers: mod4,
            trigger: Trigger::Button(1),
            flags: BindingFlags::ON_PRESS,
            actions: vec![Action::bare(BeginResize)],
        },
        Binding {
            effective_modifiers: mod4,
            trigger: Trigger::Button(2),
            flags: BindingFlags::ON_PRESS,
            actions: vec![Action::bare(MinimizeWindow)],
        },
        Binding {
            effective_modifiers: mod4,
            trigger: Trigger::Button(3),
            flags: BindingFlags::ON_PRESS,
            actions: vec![Action::bare(BeginMove)],
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dummy_binding(mods: u32, trigger: Trigger) -> Binding {
        Binding {
            effective_modifiers: mods,
            trigger,
            flags: BindingFlags::ON_PRESS,
            actions: vec![Action::bare(ActionCode::Quit)],
        }
    }

    #[test]
    fn merge_keeps_user_binding_on_collision() {
        let user = vec![dummy_binding(1, Trigger::Key(1))];
        let mut default = dummy_binding(1, Trigger::Key(1));
        default.actions = vec![Action::bare(ActionCode::CloseWindow)];
        let table = BindingTable::merge(user.clone(), &[default]);
        assert_eq!(table.bindings().len(), 1);
        assert_eq!(table.bindings()[0].actions, user[0].actions);
    }

    #[test]
    fn merge_appends_non_colliding_defaults_in_order() {
        let user = vec![dummy_binding(1, Trigger::Key(1))];
        let defaults = vec![dummy_binding(2, Trigger::Key(2)), dummy_binding(3, Trigger::Key(3))];
        let table = BindingTable::merge(user, &defaults);
        assert_eq!(table.bindings().len(), 3);
        assert_eq!(table.bindings()[1].effective_modifiers, 2);
        assert_eq!(table.bindings()[2].effective_modifiers, 3);
    }

    #[test]
    fn merge_is_idempotent() {
        let user = vec![dummy_binding(1, Trigger::Key(1))];
        let defaults = default_bindings();
        let once = BindingTable::merge(user.clone(), &defaults);
        let twice = BindingTable::merge(once.bindings().to_vec(), &defaults);
        assert_eq!(once.bindings().len(), twice.bindings().len());
    }

    #[test]
    fn lookup_masks_out_ignore_modifiers() {
        let table = BindingTable::merge(vec![dummy_binding(8, Trigger::Key(42))], &[]);
        // raw modifiers include a Lock bit (2) that must be ignored.
        let found = table.lookup(8 | 2, 2, Trigger::Key(42), BindingFlags::ON_PRESS);
        assert!(found.is_some());
    }

    #[test]
    fn subsets_of_enumerates_every_combination() {
        let subsets = subsets_of(0b101);
        assert_eq!(subsets.len(), 4);
        assert!(subsets.contains(&0));
        assert!(subsets.contains(&0b101));
        assert!(subsets.contains(&0b001));
        assert!(subsets.contains(&0b100));
    }

    #[test]
    fn default_table_has_no_duplicate_keys() {
        let defaults = default_bindings();
        for (i, a) in defaults.iter().enumerate() {
            for b in defaults.iter().skip(i + 1) {
                assert_ne!(a.key(), b.key(), "duplicate binding key in default table");
            }
        }
    }
}
