//! The snapshot published to bars over the state socket.
use crate::layouts::LayoutMode;
use crate::models::Handle;
use crate::state::State;
use serde::{Deserialize, Serialize};

#[allow(clippy::struct_excessive_bools)]
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct WorkspaceState {
    pub name: String,
    pub index: usize,
    pub active: bool,
    pub occupied: bool,
    pub urgent: bool,
    pub focused: bool,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct MonitorState {
    pub index: usize,
    pub output: String,
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
    pub layout: LayoutMode,
    pub master_count: usize,
    pub split_factor: f32,
    pub workspaces: Vec<WorkspaceState>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ManagerState {
    pub window_title: Option<String>,
    pub active_monitor: usize,
    pub monitors: Vec<MonitorState>,
}

impl<H: Handle> From<&State<H>> for ManagerState {
    fn from(state: &State<H>) -> Self {
        let focused = state.focused_client();
        let monitors = state
            .monitors
            .iter()
            .map(|monitor| {
                let workspaces = state
                    .workspaces
                    .iter()
                    .enumerate()
                    .map(|(index, name)| {
                        let on_workspace = || {
                            state
                                .clients
                                .iter()
                                .filter(move |c| c.is_on(monitor.index, index))
                        };
                        WorkspaceState {
                            name: name.clone(),
                            index,
                            active: monitor.active_workspace == index,
                            occupied: on_workspace().next().is_some(),
                            urgent: on_workspace().any(|c| c.urgent),
                            focused: focused.is_some_and(|c| c.is_on(monitor.index, index)),
                        }
                    })
                    .collect();
                MonitorState {
                    index: monitor.index,
                    output: monitor.output.clone(),
                    x: monitor.bbox.x,
                    y: monitor.bbox.y,
                    w: monitor.bbox.w,
                    h: monitor.bbox.h,
                    layout: monitor.layout_mode,
                    master_count: monitor.master_count,
                    split_factor: monitor.split_factor(),
                    workspaces,
                }
            })
            .collect();
        Self {
            window_title: focused.and_then(|c| c.name.clone()),
            active_monitor: state.active_monitor,
            monitors,
        }
    }
}
