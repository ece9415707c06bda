//! Client information.
#![allow(clippy::module_name_repetitions)]

use std::fmt::Debug;

use super::{SizeHints, WindowState, WindowType, WorkspaceId, Xyhw};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// A trait which backend specific window handles need to implement
pub trait Handle:
    Serialize + DeserializeOwned + Debug + Clone + Copy + PartialEq + Eq + Default + Send + 'static
{
}

/// A Backend-agnostic handle to a window used to identify it. The display server owns the
/// window; this is only its name.
///
/// # Serde
///
/// Using generics here with serde derive macros needs `#[serde(bound = "")]` everywhere the
/// generic is declared, see <https://github.com/serde-rs/serde/issues/1296>.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WindowHandle<H>(#[serde(bound = "")] pub H)
where
    H: Handle;

/// Handle for testing purposes
pub type MockHandle = i32;
impl Handle for MockHandle {}

/// The geometry and floating flag a client had before it went fullscreen.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct SavedGeometry {
    pub geometry: Xyhw,
    pub was_floating: bool,
}

/// A managed top level window.
#[allow(clippy::struct_excessive_bools)]
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Client<H: Handle> {
    #[serde(bound = "")]
    pub handle: WindowHandle<H>,
    #[serde(bound = "")]
    pub transient: Option<WindowHandle<H>>,
    pub name: Option<String>,
    // The two halves of `WM_CLASS`, kept apart for simpler matching.
    pub res_name: Option<String>,
    pub res_class: Option<String>,
    pub r#type: WindowType,
    pub states: Vec<WindowState>,
    /// Position and inner size. The border is drawn outside of `w`/`h`.
    pub geometry: Xyhw,
    pub saved: Option<SavedGeometry>,
    pub hints: SizeHints,
    pub monitor: usize,
    pub workspace: WorkspaceId,
    pub border: i32,
    pub urgent: bool,
    pub never_focus: bool,
    floating: bool,
    fullscreen: bool,
    visible: bool,
}

impl<H: Handle> Client<H> {
    #[must_use]
    pub fn new(handle: WindowHandle<H>, name: Option<String>) -> Self {
        Self {
            handle,
            transient: None,
            name,
            res_name: None,
            res_class: None,
            r#type: WindowType::Normal,
            states: vec![],
            geometry: Xyhw::default(),
            saved: None,
            hints: SizeHints::default(),
            monitor: 0,
            workspace: 0,
            border: 1,
            urgent: false,
            never_focus: false,
            floating: false,
            fullscreen: false,
            visible: false,
        }
    }

    /// Floating clients are left out of tiling. Fullscreen clients always count as floating.
    #[must_use]
    pub const fn floating(&self) -> bool {
        self.floating || self.fullscreen
    }

    pub fn set_floating(&mut self, value: bool) {
        self.floating = value;
    }

    #[must_use]
    pub const fn is_fullscreen(&self) -> bool {
        self.fullscreen
    }

    #[must_use]
    pub const fn is_tiled(&self) -> bool {
        !self.floating()
    }

    #[must_use]
    pub const fn visible(&self) -> bool {
        self.visible
    }

    pub fn set_visible(&mut self, value: bool) {
        self.visible = value;
    }

    /// Enter fullscreen, remembering where the client was. Returns false if it already was.
    pub fn enter_fullscreen(&mut self, monitor: Xyhw) -> bool {
        if self.fullscreen {
            return false;
        }
        self.saved = Some(SavedGeometry {
            geometry: self.geometry,
            was_floating: self.floating,
        });
        self.fullscreen = true;
        self.floating = true;
        self.border = 0;
        self.geometry = monitor;
        if !self.states.contains(&WindowState::Fullscreen) {
            self.states.push(WindowState::Fullscreen);
        }
        true
    }

    /// Leave fullscreen, restoring the snapshot taken on entry. Returns false if the client
    /// was not fullscreen.
    pub fn exit_fullscreen(&mut self, border: i32) -> bool {
        if !self.fullscreen {
            return false;
        }
        self.fullscreen = false;
        if let Some(saved) = self.saved.take() {
            self.geometry = saved.geometry;
            self.floating = saved.was_floating;
        }
        self.border = border;
        self.states.retain(|s| *s != WindowState::Fullscreen);
        true
    }

    /// Utility windows and windows with a fixed size keep the size they asked for.
    #[must_use]
    pub const fn can_resize(&self) -> bool {
        !self.hints.is_fixed() && !matches!(self.r#type, WindowType::Utility)
    }

    /// The rectangle the client covers including its border.
    #[must_use]
    pub const fn outer(&self) -> Xyhw {
        Xyhw::new(
            self.geometry.x,
            self.geometry.y,
            self.geometry.w + 2 * self.border,
            self.geometry.h + 2 * self.border,
        )
    }

    #[must_use]
    pub fn contains_point(&self, x: i32, y: i32) -> bool {
        self.outer().contains_point(x, y)
    }

    /// Whether the client sits on the given monitor and workspace.
    #[must_use]
    pub fn is_on(&self, monitor: usize, workspace: WorkspaceId) -> bool {
        self.monitor == monitor && self.workspace == workspace
    }
}
