use bitflags::bitflags;
use serde::{Deserialize, Serialize, de::Visitor};

bitflags! {
    /// Represents the state of modifier keys. The bits line up with the X11 key masks.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    pub struct ModMask: u16 {
        const Shift = 1;
        const Lock = 1 << 1;
        const Control = 1 << 2;
        /// Mod1
        const Alt = 1 << 3;
        /// Mod2
        const NumLock = 1 << 4;
        const Mod3 = 1 << 5;
        /// Mod4
        const Super = 1 << 6;
        const Mod5 = 1 << 7;
    }
}

bitflags! {
    /// Represents the mouse buttons a binding can use.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
    pub struct Button: u8 {
        /// Main button (left click for right-handed)
        const Button1 = 1;
        /// Middle button (pressing the scroll wheel)
        const Button2 = 1 << 1;
        /// Secondary button (right click for right-handed)
        const Button3 = 1 << 2;
        /// Scroll wheel up
        const Button4 = 1 << 3;
        /// Scroll wheel down
        const Button5 = 1 << 4;
    }
}

impl ModMask {
    /// Drop Caps Lock and Num Lock so that bindings fire regardless of them.
    #[must_use]
    pub fn without_locks(self) -> Self {
        self.difference(Self::Lock | Self::NumLock)
    }
}

impl Button {
    /// Convert an X11 button number.
    #[must_use]
    pub const fn from_index(index: u32) -> Self {
        match index {
            1 => Self::Button1,
            2 => Self::Button2,
            3 => Self::Button3,
            4 => Self::Button4,
            5 => Self::Button5,
            _ => Self::empty(),
        }
    }

    /// The X11 button number.
    #[must_use]
    pub const fn index(self) -> u32 {
        match self.bits() {
            1 => 1,
            2 => 2,
            4 => 3,
            8 => 4,
            16 => 5,
            _ => 0,
        }
    }
}

#[must_use]
pub fn into_modmask(keys: &[String]) -> ModMask {
    keys.iter()
        .filter_map(|s| into_mod(s))
        .fold(ModMask::empty(), |mask, m| mask | m)
        .without_locks()
}

/// Maps a modifier name. Unknown names are `None`.
#[must_use]
pub fn into_mod(key: &str) -> Option<ModMask> {
    match key {
        "None" => Some(ModMask::empty()),
        "Shift" => Some(ModMask::Shift),
        "Control" => Some(ModMask::Control),
        "Mod1" | "Alt" => Some(ModMask::Alt),
        // Num Lock is ignored by every binding, naming it is harmless.
        "Mod2" | "NumLock" => Some(ModMask::empty()),
        "Mod3" => Some(ModMask::Mod3),
        "Mod4" | "Super" => Some(ModMask::Super),
        "Mod5" => Some(ModMask::Mod5),
        _ => None,
    }
}

// serde impls (derive is not working with the bitflags macro)

impl Serialize for ModMask {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_u16(self.bits())
    }
}

impl<'de> Deserialize<'de> for ModMask {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        struct ModmaskVisitor;

        impl Visitor<'_> for ModmaskVisitor {
            type Value = ModMask;

            fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
                formatter.write_str("a bitfield on 16 bits")
            }

            fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                u16::try_from(v)
                    .map(ModMask::from_bits_retain)
                    .map_err(|_| E::custom("modifier mask out of range"))
            }
        }

        deserializer.deserialize_u16(ModmaskVisitor)
    }
}

impl Serialize for Button {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_u8(self.bits())
    }
}

impl<'de> Deserialize<'de> for Button {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        struct ButtonVisitor;

        impl Visitor<'_> for ButtonVisitor {
            type Value = Button;

            fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
                formatter.write_str("a bitfield on 8 bits")
            }

            fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                u8::try_from(v)
                    .map(Button::from_bits_retain)
                    .map_err(|_| E::custom("button mask out of range"))
            }
        }

        deserializer.deserialize_u8(ButtonVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lock_keys_never_reach_a_binding_mask() {
        let mask = into_modmask(&["Mod4".to_string(), "NumLock".to_string()]);
        assert_eq!(mask, ModMask::Super);
        let pressed = ModMask::Super | ModMask::Lock | ModMask::NumLock;
        assert_eq!(pressed.without_locks(), mask);
    }

    #[test]
    fn unknown_modifiers_are_reported() {
        assert_eq!(into_mod("Hyper"), None);
        assert_eq!(into_mod("Alt"), Some(ModMask::Alt));
    }

    #[test]
    fn button_numbers_round_trip() {
        for index in 1..=5 {
            assert_eq!(Button::from_index(index).index(), index);
        }
        assert!(Button::from_index(9).is_empty());
    }
}
