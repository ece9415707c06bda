use super::WindowHandle;
use crate::models::{Corner, Handle, Xyhw};
use crate::state::State;

/// Nothing gets resized below this many pixels in either direction.
const MIN_RESIZE: i32 = 15;

impl<H: Handle> State<H> {
    /// Move the grabbed corner of `start` by the pointer offset since the drag began, keeping
    /// the opposite corner where it is.
    pub fn window_resize_handler(
        &mut self,
        handle: &WindowHandle<H>,
        corner: Corner,
        start: Xyhw,
        (offset_x, offset_y): (i32, i32),
    ) -> bool {
        let Some(client) = self.client_mut(handle) else {
            return false;
        };
        if !client.can_resize() || !client.floating() || client.is_fullscreen() {
            return false;
        }

        let g = start;
        let (mut left, mut top, mut right, mut bottom) = (g.x, g.y, g.x + g.w, g.y + g.h);
        let grabs_left = matches!(corner, Corner::TopLeft | Corner::BottomLeft);
        let grabs_top = matches!(corner, Corner::TopLeft | Corner::TopRight);
        if grabs_left {
            left += offset_x;
        } else {
            right += offset_x;
        }
        if grabs_top {
            top += offset_y;
        } else {
            bottom += offset_y;
        }

        let (w, h) = client
            .hints
            .apply((right - left).max(MIN_RESIZE), (bottom - top).max(MIN_RESIZE));
        let x = if grabs_left { right - w } else { left };
        let y = if grabs_top { bottom - h } else { top };
        let resized = Xyhw::new(x, y, w, h);
        if resized == client.geometry {
            return false;
        }
        client.geometry = resized;
        true
    }
}
