use serde::{Deserialize, Serialize};

/// Size constraints a client asks for through `WM_NORMAL_HINTS`. A zero means "not set".
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SizeHints {
    pub minw: i32,
    pub minh: i32,
    pub maxw: i32,
    pub maxh: i32,
    pub basew: i32,
    pub baseh: i32,
    pub valid: bool,
}

impl SizeHints {
    /// A window whose minimum and maximum sizes agree cannot be resized, which is a strong
    /// sign of a dialog.
    #[must_use]
    pub const fn is_fixed(&self) -> bool {
        self.valid
            && self.maxw > 0
            && self.maxh > 0
            && self.maxw == self.minw
            && self.maxh == self.minh
    }

    /// Clamp a size to the hinted bounds.
    #[must_use]
    pub fn apply(&self, w: i32, h: i32) -> (i32, i32) {
        if !self.valid {
            return (w, h);
        }
        let mut w = w.max(self.basew);
        let mut h = h.max(self.baseh);
        if self.minw > 0 {
            w = w.max(self.minw);
        }
        if self.minh > 0 {
            h = h.max(self.minh);
        }
        if self.maxw > 0 {
            w = w.min(self.maxw);
        }
        if self.maxh > 0 {
            h = h.min(self.maxh);
        }
        (w, h)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn min_equal_to_max_is_fixed() {
        let hints = SizeHints {
            minw: 300,
            minh: 200,
            maxw: 300,
            maxh: 200,
            valid: true,
            ..SizeHints::default()
        };
        assert!(hints.is_fixed());
        assert_eq!(hints.apply(1000, 10), (300, 200));
    }

    #[test]
    fn invalid_hints_do_not_constrain() {
        let hints = SizeHints {
            minw: 300,
            maxw: 300,
            ..SizeHints::default()
        };
        assert!(!hints.is_fixed());
        assert_eq!(hints.apply(50, 50), (50, 50));
    }
}
