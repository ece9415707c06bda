use super::{Config, Keybind};
use std::env;
use std::fs;

const WORKSPACES_NUM: usize = 9;

impl Default for Config {
    fn default() -> Self {
        let mut keybind = vec![
            // Mod + Shift + Enter => Open A Shell
            bind("Spawn", default_terminal(), &["modkey", "Shift"], "Return"),
            // Mod + p => Open dmenu
            bind("Spawn", "dmenu_run", &["modkey"], "p"),
            // Mod + Shift + q => kill focused window
            bind("CloseWindow", "", &["modkey", "Shift"], "q"),
            // Mod + Shift + r => reload the configuration
            bind("Reload", "", &["modkey", "Shift"], "r"),
            // Mod + Shift + x => exit tilewm
            bind("Quit", "", &["modkey", "Shift"], "x"),
            bind("FocusNext", "", &["modkey"], "j"),
            bind("FocusPrevious", "", &["modkey"], "k"),
            bind("DecreaseFactor", "", &["modkey"], "h"),
            bind("IncreaseFactor", "", &["modkey"], "l"),
            bind("IncreaseMaster", "", &["modkey"], "i"),
            bind("DecreaseMaster", "", &["modkey"], "d"),
            bind("ToggleFloating", "", &["modkey", "Shift"], "space"),
            bind("ToggleLayoutMode", "", &["modkey"], "space"),
            bind("ToggleFullscreen", "", &["modkey"], "f"),
        ];

        // add "goto workspace" and "move to workspace" for every workspace
        for i in 1..=WORKSPACES_NUM {
            let n = i.to_string();
            keybind.push(bind("SwitchWorkspace", &n, &["modkey"], &n));
            keybind.push(bind("MoveToWorkspace", &n, &["modkey", "Shift"], &n));
        }

        Self {
            modkey: "Mod4".to_owned(),
            mousekey: Some("modkey".into()),
            workspaces: (1..=WORKSPACES_NUM).map(|i| i.to_string()).collect(),
            master_count: 1,
            split_factor: 0.55,
            factor_step: 0.05,
            border_width: 1,
            gap: 0,
            outer_gap: 0,
            bar_height: 0,
            focused_border_color: "#ff0000".to_owned(),
            default_border_color: "#222222".to_owned(),
            floating_border_color: "#005500".to_owned(),
            focus_follows_mouse: true,
            keybind,
            window_rules: vec![],
            path: None,
            rules: vec![],
        }
    }
}

fn bind(command: &str, value: &str, modifier: &[&str], key: &str) -> Keybind {
    Keybind {
        command: command.to_owned(),
        value: value.to_owned(),
        modifier: Some(modifier.to_vec().into()),
        key: key.to_owned(),
    }
}

#[must_use]
pub fn is_program_in_path(program: &str) -> bool {
    if let Ok(path) = env::var("PATH") {
        for p in path.split(':') {
            if fs::metadata(format!("{p}/{program}")).is_ok() {
                return true;
            }
        }
    }
    false
}

/// Returns a terminal to set for the default mod+shift+enter keybind.
fn default_terminal<'s>() -> &'s str {
    // order from least common to most common.
    // the thinking is if a machine has an uncommon terminal installed, it is intentional
    let terms = &[
        "alacritty",
        "kitty",
        "urxvt",
        "st",
        "xfce4-terminal",
        "konsole",
        "gnome-terminal",
        "xterm",
    ];

    // If no terminal found in path, default to a good one
    terms
        .iter()
        .find(|terminal| is_program_in_path(terminal))
        .unwrap_or(&"xterm")
}
