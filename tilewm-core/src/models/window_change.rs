use super::{Client, Handle, SizeHints, WindowHandle, WindowState, WindowType, Xyhw};

type MaybeName = Option<String>;

/// A partial update of a client reported by the display server. Only the fields that are
/// `Some` changed.
#[derive(Debug, Clone)]
pub struct WindowChange<H: Handle> {
    pub handle: WindowHandle<H>,
    pub transient: Option<Option<WindowHandle<H>>>,
    pub never_focus: Option<bool>,
    pub urgent: Option<bool>,
    pub name: Option<MaybeName>,
    pub r#type: Option<WindowType>,
    pub hints: Option<SizeHints>,
    /// Geometry asked for with a configure request.
    pub requested: Option<Xyhw>,
    pub states: Option<Vec<WindowState>>,
}

impl<H: Handle> WindowChange<H> {
    #[must_use]
    pub const fn new(h: WindowHandle<H>) -> Self {
        Self {
            handle: h,
            transient: None,
            never_focus: None,
            urgent: None,
            name: None,
            r#type: None,
            hints: None,
            requested: None,
            states: None,
        }
    }

    /// Apply the plain attribute changes. Geometry requests and state changes need the
    /// surrounding state and are left to the caller. Returns whether anything changed.
    pub fn update(&self, client: &mut Client<H>) -> bool {
        let mut changed = false;
        if let Some(trans) = self.transient {
            changed |= client.transient != trans;
            client.transient = trans;
        }
        if let Some(name) = &self.name {
            changed |= &client.name != name;
            client.name.clone_from(name);
        }
        if let Some(nf) = self.never_focus {
            changed |= client.never_focus != nf;
            client.never_focus = nf;
        }
        if let Some(urgent) = self.urgent {
            changed |= client.urgent != urgent;
            client.urgent = urgent;
        }
        if let Some(hints) = self.hints {
            changed |= client.hints != hints;
            client.hints = hints;
        }
        if let Some(r#type) = self.r#type {
            changed |= client.r#type != r#type;
            client.r#type = r#type;
        }
        changed
    }
}
