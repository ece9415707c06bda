use super::{Screen, WorkspaceId, Xyhw};
use crate::layouts::{LayoutMode, LayoutSettings};
use serde::{Deserialize, Serialize};

pub const MIN_SPLIT_FACTOR: f32 = 0.1;
pub const MAX_SPLIT_FACTOR: f32 = 0.9;

/// A physical display region with its own active workspace and layout tuning.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Monitor {
    pub index: usize,
    pub output: String,
    pub bbox: Xyhw,
    pub active_workspace: WorkspaceId,
    pub layout_mode: LayoutMode,
    pub master_count: usize,
    split_factors: Vec<f32>,
}

impl Monitor {
    #[must_use]
    pub fn new(index: usize, screen: &Screen, workspaces: usize, settings: &LayoutSettings) -> Self {
        Self {
            index,
            output: screen.output.clone(),
            bbox: screen.bbox,
            active_workspace: 0,
            layout_mode: LayoutMode::default(),
            master_count: settings.master_count,
            split_factors: vec![clamp_factor(settings.split_factor); workspaces],
        }
    }

    /// Carry the per-monitor tuning of a previous monitor at the same position over to this
    /// one.
    pub fn inherit(&mut self, previous: &Self) {
        self.layout_mode = previous.layout_mode;
        self.master_count = previous.master_count;
        if self.split_factors.len() == previous.split_factors.len() {
            self.split_factors.clone_from(&previous.split_factors);
        }
        if previous.active_workspace < self.split_factors.len() {
            self.active_workspace = previous.active_workspace;
        }
    }

    /// Resize the per-workspace tuning for a new workspace count, keeping what still fits.
    pub fn set_workspace_count(&mut self, count: usize, default_factor: f32) {
        self.split_factors.resize(count, clamp_factor(default_factor));
        if self.active_workspace >= count {
            self.active_workspace = 0;
        }
    }

    #[must_use]
    pub fn workspace_count(&self) -> usize {
        self.split_factors.len()
    }

    /// The split factor of the active workspace.
    #[must_use]
    pub fn split_factor(&self) -> f32 {
        self.split_factor_of(self.active_workspace)
    }

    #[must_use]
    pub fn split_factor_of(&self, workspace: WorkspaceId) -> f32 {
        self.split_factors
            .get(workspace)
            .copied()
            .unwrap_or(MIN_SPLIT_FACTOR + (MAX_SPLIT_FACTOR - MIN_SPLIT_FACTOR) / 2.0)
    }

    /// Move the split factor of the active workspace by `delta`. Returns whether it changed.
    pub fn adjust_split_factor(&mut self, delta: f32) -> bool {
        let Some(factor) = self.split_factors.get_mut(self.active_workspace) else {
            return false;
        };
        let adjusted = clamp_factor(*factor + delta);
        let changed = (adjusted - *factor).abs() > f32::EPSILON;
        *factor = adjusted;
        changed
    }

    pub fn reset_split_factor(&mut self, workspace: WorkspaceId, default_factor: f32) {
        if let Some(factor) = self.split_factors.get_mut(workspace) {
            *factor = clamp_factor(default_factor);
        }
    }

    /// The area left for tiling once the reserved top strip and the outer gap are removed.
    #[must_use]
    pub const fn usable_area(&self, settings: &LayoutSettings) -> Xyhw {
        let gap = settings.outer_gap;
        Xyhw::new(
            self.bbox.x + gap,
            self.bbox.y + settings.bar_height + gap,
            self.bbox.w - 2 * gap,
            self.bbox.h - settings.bar_height - 2 * gap,
        )
    }

    #[must_use]
    pub const fn contains_point(&self, x: i32, y: i32) -> bool {
        self.bbox.contains_point(x, y)
    }
}

fn clamp_factor(factor: f32) -> f32 {
    factor.clamp(MIN_SPLIT_FACTOR, MAX_SPLIT_FACTOR)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn monitor() -> Monitor {
        let settings = LayoutSettings::default();
        Monitor::new(0, &Screen::default(), 3, &settings)
    }

    #[test]
    fn split_factor_never_leaves_its_bounds() {
        let mut monitor = monitor();
        for _ in 0..100 {
            monitor.adjust_split_factor(0.05);
        }
        assert!((monitor.split_factor() - MAX_SPLIT_FACTOR).abs() < f32::EPSILON);
        assert!(!monitor.adjust_split_factor(0.05));
        for _ in 0..100 {
            monitor.adjust_split_factor(-0.05);
        }
        assert!((monitor.split_factor() - MIN_SPLIT_FACTOR).abs() < f32::EPSILON);
    }

    #[test]
    fn split_factors_are_tuned_per_workspace() {
        let mut monitor = monitor();
        let initial = monitor.split_factor_of(1);
        monitor.adjust_split_factor(0.1);
        assert!((monitor.split_factor_of(1) - initial).abs() < f32::EPSILON);
        assert!(monitor.split_factor_of(0) > initial);
    }

    #[test]
    fn usable_area_leaves_room_for_the_bar_and_gaps() {
        let monitor = monitor();
        let settings = LayoutSettings {
            outer_gap: 5,
            bar_height: 20,
            ..LayoutSettings::default()
        };
        assert_eq!(monitor.usable_area(&settings), Xyhw::new(5, 25, 790, 570));
    }
}
