//! Tiling layouts and the knobs that tune them.
use serde::{Deserialize, Serialize};

pub mod master_stack;

/// How a monitor places its windows.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LayoutMode {
    /// Master/stack tiling.
    #[default]
    Tiled,
    /// Every window keeps the geometry it was given.
    Floating,
}

impl LayoutMode {
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Tiled => Self::Floating,
            Self::Floating => Self::Tiled,
        }
    }
}

/// Layout parameters shared by every monitor.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct LayoutSettings {
    pub master_count: usize,
    pub split_factor: f32,
    pub factor_step: f32,
    pub border_width: i32,
    /// Space between two windows of the same column.
    pub gap: i32,
    /// Space between the windows and the monitor edges.
    pub outer_gap: i32,
    /// Height of the strip reserved for a bar at the top of every monitor.
    pub bar_height: i32,
}

impl Default for LayoutSettings {
    fn default() -> Self {
        Self {
            master_count: 1,
            split_factor: 0.55,
            factor_step: 0.05,
            border_width: 1,
            gap: 0,
            outer_gap: 0,
            bar_height: 0,
        }
    }
}
