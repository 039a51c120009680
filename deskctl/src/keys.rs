//! Semantic key names mapped onto the cliclick key vocabulary.
//!
//! Models ask for keys by the names they learned from documentation
//! ("enter", "page_down", "cmd+shift+t"); cliclick has its own spelling
//! and splits presses into `kd:`/`kp:`/`ku:`/`t:` commands. `kp:` only
//! accepts the special-key vocabulary, so plain characters are typed with
//! `t:` while any modifiers are held down.

use crate::error::{Error, Result};
use crate::runner;

/// Key names cliclick's `kp:` accepts.
const PRESS_NAMES: &[&str] = &[
    "arrow-down",
    "arrow-left",
    "arrow-right",
    "arrow-up",
    "delete",
    "end",
    "enter",
    "esc",
    "f1",
    "f2",
    "f3",
    "f4",
    "f5",
    "f6",
    "f7",
    "f8",
    "f9",
    "f10",
    "f11",
    "f12",
    "f13",
    "f14",
    "f15",
    "f16",
    "fwd-delete",
    "home",
    "num-enter",
    "page-down",
    "page-up",
    "return",
    "space",
    "tab",
];

/// Modifier names cliclick's `kd:`/`ku:` accept.
const MODIFIER_NAMES: &[&str] = &["alt", "cmd", "ctrl", "fn", "shift"];

/// Maps one semantic key name to cliclick's spelling.
///
/// Unknown names pass through lowercased; cliclick reports anything it
/// does not understand on stderr.
pub fn map_key_name(name: &str) -> String {
    let lowered = name.trim().to_lowercase();
    let mapped = match lowered.as_str() {
        "enter" => "return",
        "escape" => "esc",
        "backspace" => "delete",
        "up" => "arrow-up",
        "down" => "arrow-down",
        "left" => "arrow-left",
        "right" => "arrow-right",
        "pageup" | "page_up" => "page-up",
        "pagedown" | "page_down" => "page-down",
        "command" | "super" | "win" => "cmd",
        "control" => "ctrl",
        "option" | "opt" => "alt",
        other => other,
    };
    mapped.to_string()
}

fn is_modifier(name: &str) -> bool {
    MODIFIER_NAMES.contains(&name)
}

fn is_press_name(name: &str) -> bool {
    PRESS_NAMES.contains(&name)
}

/// One cliclick command for the final (non-modifier) key of a combo.
fn press_arg(name: &str) -> Result<String> {
    if is_press_name(name) {
        Ok(format!("kp:{name}"))
    } else {
        Ok(format!("t:{}", runner::quote(name)?))
    }
}

/// Builds the cliclick argument sequence for a key press or combo.
///
/// `"enter"` becomes `["kp:return"]`; `"cmd+shift+t"` becomes `["kd:cmd",
/// "kd:shift", "t:t", "ku:shift", "ku:cmd"]`. Modifiers release in reverse
/// order.
pub fn key_combo_args(text: &str) -> Result<Vec<String>> {
    let parts: Vec<String> = text
        .split('+')
        .map(map_key_name)
        .filter(|p| !p.is_empty())
        .collect();
    if parts.is_empty() {
        return Err(Error::InvalidArgument("text must name a key".into()));
    }

    if parts.len() == 1 {
        let key = &parts[0];
        // kp: has no modifier vocabulary; a bare modifier is tap-released.
        if is_modifier(key) {
            return Ok(vec![format!("kd:{key}"), format!("ku:{key}")]);
        }
        return Ok(vec![press_arg(key)?]);
    }

    let key = &parts[parts.len() - 1];
    let modifiers = &parts[..parts.len() - 1];
    let mut args = Vec::with_capacity(modifiers.len() * 2 + 1);
    for modifier in modifiers {
        args.push(format!("kd:{modifier}"));
    }
    args.push(press_arg(key)?);
    for modifier in modifiers.iter().rev() {
        args.push(format!("ku:{modifier}"));
    }
    Ok(args)
}
