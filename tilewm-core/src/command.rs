use crate::models::WorkspaceId;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Actions a key binding or the command socket can ask for.
#[derive(Serialize, Deserialize, Clone, PartialEq, Debug)]
pub enum Command {
    SwitchWorkspace(WorkspaceId),
    MoveToWorkspace(WorkspaceId),
    IncreaseFactor,
    DecreaseFactor,
    IncreaseMaster,
    DecreaseMaster,
    ToggleFloating,
    ToggleFullscreen,
    ToggleLayoutMode,
    FocusNext,
    FocusPrevious,
    CloseWindow,
    Spawn(String),
    Reload,
    Quit,
}

impl FromStr for Command {
    type Err = String;

    /// Parse `<Name> [argument]`. Workspace arguments count from 1.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (head, rest) = s.split_once(' ').unwrap_or((s, ""));
        let rest = rest.trim();
        match head {
            "SwitchWorkspace" => build_workspace(rest).map(Command::SwitchWorkspace),
            "MoveToWorkspace" => build_workspace(rest).map(Command::MoveToWorkspace),
            "IncreaseFactor" => Ok(Command::IncreaseFactor),
            "DecreaseFactor" => Ok(Command::DecreaseFactor),
            "IncreaseMaster" => Ok(Command::IncreaseMaster),
            "DecreaseMaster" => Ok(Command::DecreaseMaster),
            "ToggleFloating" => Ok(Command::ToggleFloating),
            "ToggleFullscreen" => Ok(Command::ToggleFullscreen),
            "ToggleLayoutMode" => Ok(Command::ToggleLayoutMode),
            "FocusNext" => Ok(Command::FocusNext),
            "FocusPrevious" => Ok(Command::FocusPrevious),
            "CloseWindow" => Ok(Command::CloseWindow),
            "Spawn" => build_spawn(rest),
            "Reload" => Ok(Command::Reload),
            "Quit" => Ok(Command::Quit),
            _ => Err(format!("unknown command `{head}`")),
        }
    }
}

fn build_workspace(raw: &str) -> Result<WorkspaceId, String> {
    if raw.is_empty() {
        return Err("missing argument workspace number".into());
    }
    match raw.parse::<usize>() {
        Ok(n) if n > 0 => Ok(n - 1),
        _ => Err(format!("invalid workspace number `{raw}`")),
    }
}

fn build_spawn(raw: &str) -> Result<Command, String> {
    if raw.is_empty() {
        return Err("missing argument command line".into());
    }
    Ok(Command::Spawn(raw.to_string()))
}
