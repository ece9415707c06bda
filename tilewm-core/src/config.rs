//! The interface between the engine and whatever loads the user's settings.
use crate::Command;
use crate::layouts::LayoutSettings;
use crate::models::{Client, Handle, WorkspaceId};
use crate::utils::modmask_lookup::ModMask;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Upper bounds of the fixed size tables. Additions past these are rejected and logged.
pub const MAX_CLIENTS: usize = 256;
pub const MAX_MONITORS: usize = 16;
pub const MAX_KEYBINDS: usize = 256;
pub const MAX_RULES: usize = 128;

/// A key combination bound to a command. `key` is a keysym name such as `Return` or `q`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Keybind {
    pub command: Command,
    pub modifier: ModMask,
    pub key: String,
}

impl Keybind {
    #[must_use]
    pub fn matches(&self, modifier: ModMask, key: &str) -> bool {
        self.modifier == modifier.without_locks() && self.key == key
    }
}

/// What the first matching window rule asks for.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RuleOutcome {
    pub floating: Option<bool>,
    pub workspace: Option<WorkspaceId>,
    pub monitor: Option<usize>,
    pub size: Option<(i32, i32)>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Warning,
    Fatal,
}

/// One problem found in a configuration source.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub line: Option<usize>,
    pub severity: Severity,
    pub message: String,
}

impl Diagnostic {
    #[must_use]
    pub fn fatal(line: Option<usize>, message: impl Into<String>) -> Self {
        Self {
            line,
            severity: Severity::Fatal,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn warning(line: Option<usize>, message: impl Into<String>) -> Self {
        Self {
            line,
            severity: Severity::Warning,
            message: message.into(),
        }
    }

    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(self.severity, Severity::Fatal)
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let severity = match self.severity {
            Severity::Warning => "warning",
            Severity::Fatal => "fatal",
        };
        match self.line {
            Some(line) => write!(f, "line {line}: {severity}: {}", self.message),
            None => write!(f, "{severity}: {}", self.message),
        }
    }
}

pub trait Config {
    /// Names of the workspaces every monitor offers.
    fn workspaces(&self) -> Vec<String>;

    /// The modifier that turns a click into a move or resize.
    fn mousekey(&self) -> ModMask;

    fn mapped_bindings(&self) -> Vec<Keybind>;

    fn layout_settings(&self) -> LayoutSettings;

    /// Whether focus follows the pointer on enter and on the idle pointer poll.
    fn focus_follows_mouse(&self) -> bool;

    fn default_border_color(&self) -> String;
    fn floating_border_color(&self) -> String;
    fn focused_border_color(&self) -> String;

    /// The first window rule matching the client's class, instance or title.
    fn window_rule<H: Handle>(&self, client: &Client<H>) -> Option<RuleOutcome>;

    /// Read the configuration source again. On failure the caller keeps `self`.
    ///
    /// # Errors
    ///
    /// Returns the diagnostics if the source has a fatal problem.
    fn reload(&self) -> Result<Self, Vec<Diagnostic>>
    where
        Self: Sized;

    /// Check the configuration source without applying it.
    fn validate(&self) -> Vec<Diagnostic>;
}
