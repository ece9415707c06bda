use anyhow::{Context, Result, ensure};
use serde::{Deserialize, Serialize};
use tilewm_core::Command;
use tilewm_core::utils::modmask_lookup::{self, ModMask};

/// A key binding as written in `config.toml`.
///
/// ```toml
/// [[keybind]]
/// command = "SwitchWorkspace"
/// value = "2"
/// modifier = ["modkey"]
/// key = "2"
/// ```
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Keybind {
    pub command: String,
    #[serde(default)]
    pub value: String,
    pub modifier: Option<Modifier>,
    pub key: String,
}

impl Keybind {
    /// The command this binding runs, with its value as argument.
    ///
    /// # Errors
    ///
    /// Fails if the command is unknown or its value does not fit it.
    pub fn parse_command(&self) -> Result<Command> {
        let line = if self.value.is_empty() {
            self.command.clone()
        } else {
            format!("{} {}", self.command, self.value)
        };
        line.parse::<Command>()
            .map_err(anyhow::Error::msg)
            .with_context(|| format!("invalid command `{line}`"))
    }

    /// Convert into the engine's binding, `modkey` standing for `modkey_value`.
    ///
    /// # Errors
    ///
    /// Fails on an invalid command, an empty key or an unknown modifier.
    pub fn try_convert_to_core_keybind(&self, modkey_value: &str) -> Result<tilewm_core::Keybind> {
        ensure!(!self.key.is_empty(), "key must not be empty");
        let command = self.parse_command()?;
        let names = self.modifier_names(modkey_value);
        if let Some(unknown) = names.iter().find(|m| modmask_lookup::into_mod(m).is_none()) {
            anyhow::bail!("modifier `{unknown}` is not valid");
        }
        Ok(tilewm_core::Keybind {
            command,
            modifier: modmask_lookup::into_modmask(&names),
            key: self.key.clone(),
        })
    }

    /// The modifier names with `modkey` substituted.
    pub fn modifier_names(&self, modkey_value: &str) -> Vec<String> {
        self.modifier
            .as_ref()
            .map(|m| m.substitute_modkey(modkey_value))
            .unwrap_or_default()
    }

    /// The resolved modifier mask, unknown names dropped.
    pub fn modmask(&self, modkey_value: &str) -> ModMask {
        modmask_lookup::into_modmask(&self.modifier_names(modkey_value))
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Hash, Eq, PartialEq)]
#[serde(untagged)]
pub enum Modifier {
    Single(String),
    List(Vec<String>),
}

impl Modifier {
    pub fn is_empty(&self) -> bool {
        match self {
            Modifier::Single(single) => single.is_empty(),
            Modifier::List(list) => list.is_empty(),
        }
    }

    /// Every name, `modkey` replaced by `modkey_value`.
    pub fn substitute_modkey(&self, modkey_value: &str) -> Vec<String> {
        self.into_iter()
            .map(|m| {
                if m == "modkey" {
                    modkey_value.to_owned()
                } else {
                    m
                }
            })
            .collect()
    }
}

impl std::convert::From<Modifier> for Vec<String> {
    fn from(m: Modifier) -> Self {
        match m {
            Modifier::Single(modifier) => vec![modifier],
            Modifier::List(modifiers) => modifiers,
        }
    }
}

impl IntoIterator for &Modifier {
    type Item = String;
    type IntoIter = std::vec::IntoIter<Self::Item>;

    fn into_iter(self) -> Self::IntoIter {
        let ms = match self {
            Modifier::Single(m) => vec![m.clone()],
            Modifier::List(ms) => ms.clone(),
        };
        ms.into_iter()
    }
}

impl std::convert::From<Vec<&str>> for Modifier {
    fn from(l: Vec<&str>) -> Self {
        Self::List(l.into_iter().map(str::to_owned).collect())
    }
}

impl std::convert::From<&str> for Modifier {
    fn from(m: &str) -> Self {
        Self::Single(m.to_owned())
    }
}

impl std::fmt::Display for Modifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Single(modifier) => write!(f, "{modifier}"),
            Self::List(modifiers) => write!(f, "{}", modifiers.join("+")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bind(command: &str, value: &str, modifier: Vec<&str>, key: &str) -> Keybind {
        Keybind {
            command: command.to_owned(),
            value: value.to_owned(),
            modifier: Some(modifier.into()),
            key: key.to_owned(),
        }
    }

    #[test]
    fn modkey_is_substituted() {
        let keybind = bind("Quit", "", vec!["modkey", "Shift"], "q");
        let core = keybind.try_convert_to_core_keybind("Mod4").unwrap();
        assert_eq!(core.modifier, ModMask::Super | ModMask::Shift);
        assert_eq!(core.command, Command::Quit);
        assert_eq!(core.key, "q");
    }

    #[test]
    fn value_becomes_the_argument() {
        let keybind = bind("SwitchWorkspace", "3", vec!["modkey"], "3");
        assert_eq!(
            keybind.parse_command().unwrap(),
            Command::SwitchWorkspace(2)
        );
    }

    #[test]
    fn bad_bindings_are_rejected() {
        assert!(bind("Dance", "", vec!["modkey"], "d")
            .try_convert_to_core_keybind("Mod4")
            .is_err());
        assert!(bind("SwitchWorkspace", "zero", vec!["modkey"], "0")
            .try_convert_to_core_keybind("Mod4")
            .is_err());
        assert!(bind("Quit", "", vec!["Hyper"], "q")
            .try_convert_to_core_keybind("Mod4")
            .is_err());
        assert!(bind("Quit", "", vec!["modkey"], "")
            .try_convert_to_core_keybind("Mod4")
            .is_err());
    }

    #[test]
    fn single_modifier_deserializes() {
        let keybind: Keybind =
            toml::from_str("command = \"Quit\"\nmodifier = \"modkey\"\nkey = \"q\"").unwrap();
        assert_eq!(keybind.modifier, Some(Modifier::Single("modkey".to_owned())));
        assert_eq!(keybind.modmask("Mod1"), ModMask::Alt);
    }
}
