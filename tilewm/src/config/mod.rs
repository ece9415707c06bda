//! `tilewm` general configuration

mod checks;
mod default;
mod keybind;
mod rules;

pub use self::keybind::{Keybind, Modifier};
pub use self::rules::{CompiledRule, WindowRule};

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tilewm_core::config::MAX_RULES;
use tilewm_core::layouts::LayoutSettings;
use tilewm_core::models::{Client, Handle};
use tilewm_core::utils::modmask_lookup::{self, ModMask};
use tilewm_core::{Diagnostic, RuleOutcome};
use xdg::BaseDirectories;

const CONFIG_FILE: &str = "config.toml";

/// General configuration
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct Config {
    pub modkey: String,
    pub mousekey: Option<Modifier>,
    pub workspaces: Vec<String>,
    pub master_count: usize,
    pub split_factor: f32,
    pub factor_step: f32,
    pub border_width: i32,
    pub gap: i32,
    pub outer_gap: i32,
    pub bar_height: i32,
    pub focused_border_color: String,
    pub default_border_color: String,
    pub floating_border_color: String,
    pub focus_follows_mouse: bool,
    pub keybind: Vec<Keybind>,
    pub window_rules: Vec<WindowRule>,

    /// Where this configuration was read from, reread on reload.
    #[serde(skip)]
    pub path: Option<PathBuf>,
    #[serde(skip)]
    rules: Vec<CompiledRule>,
}

/// Load the configuration from the default location. A missing file is created with the
/// defaults; a broken one is reported and the defaults are used.
#[must_use]
pub fn load() -> Config {
    match load_from_file() {
        Ok(config) => config,
        Err(err) => {
            tracing::error!("Could not load the configuration, using the defaults: {err:#}");
            Config::default()
        }
    }
}

/// The path of the configuration file, its directory created if needed.
///
/// # Errors
///
/// Fails if the XDG directories cannot be resolved or created.
pub fn default_path() -> Result<PathBuf> {
    let path = BaseDirectories::with_prefix("tilewm")?;
    Ok(path.place_config_file(CONFIG_FILE)?)
}

/// Check a configuration file without applying it. The configuration is `None` when the
/// file cannot be read or parsed.
#[must_use]
pub fn check_file(path: &Path) -> (Option<Config>, Vec<Diagnostic>) {
    match fs::read_to_string(path) {
        Ok(contents) => checks::check_source(&contents),
        Err(err) => (
            None,
            vec![Diagnostic::fatal(
                None,
                format!("cannot read {}: {err}", path.display()),
            )],
        ),
    }
}

/// # Errors
///
/// Function will throw an error if `BaseDirectories` doesn't exist, if user doesn't have
/// permissions to place config.toml, or if config.toml cannot be read or parsed.
/// Function can also error from inability to save config.toml (if it is the first time running
/// `tilewm`).
fn load_from_file() -> Result<Config> {
    let config_filename = default_path()?;
    if config_filename.exists() {
        return Config::from_path(&config_filename).map_err(|diagnostics| {
            anyhow::anyhow!(
                "{}: {}",
                config_filename.display(),
                checks::join(&diagnostics)
            )
        });
    }
    tracing::info!(
        "No configuration found, writing the defaults to {}",
        config_filename.display()
    );
    let mut config = Config::default();
    fs::write(&config_filename, toml::to_string(&config)?)?;
    config.path = Some(config_filename);
    Ok(config)
}

impl Config {
    /// Read and check a configuration file. Warnings are logged.
    ///
    /// # Errors
    ///
    /// Returns every diagnostic if the file cannot be read or has a fatal problem.
    pub fn from_path(path: &Path) -> std::result::Result<Self, Vec<Diagnostic>> {
        let (config, diagnostics) = check_file(path);
        match config {
            Some(mut config) if !diagnostics.iter().any(Diagnostic::is_fatal) => {
                for diagnostic in &diagnostics {
                    tracing::warn!("{}: {diagnostic}", path.display());
                }
                config.path = Some(path.to_owned());
                Ok(config)
            }
            _ => Err(diagnostics),
        }
    }

    /// Compile the window rules. Invalid patterns and rules past the limit are skipped.
    pub(crate) fn compile_rules(&mut self) {
        self.rules = self
            .window_rules
            .iter()
            .take(MAX_RULES)
            .filter_map(|rule| match CompiledRule::compile(rule) {
                Ok(compiled) => compiled,
                Err(err) => {
                    tracing::error!("Skipping window rule {rule:?}: {err}");
                    None
                }
            })
            .collect();
    }

    fn source_path(&self) -> std::result::Result<PathBuf, Vec<Diagnostic>> {
        match &self.path {
            Some(path) => Ok(path.clone()),
            None => default_path().map_err(|err| vec![Diagnostic::fatal(None, err.to_string())]),
        }
    }
}

impl tilewm_core::Config for Config {
    fn workspaces(&self) -> Vec<String> {
        if self.workspaces.is_empty() {
            return Self::default().workspaces;
        }
        self.workspaces.clone()
    }

    fn mousekey(&self) -> ModMask {
        let names = self
            .mousekey
            .as_ref()
            .map_or_else(|| vec![self.modkey.clone()], |m| m.substitute_modkey(&self.modkey));
        modmask_lookup::into_modmask(&names)
    }

    fn mapped_bindings(&self) -> Vec<tilewm_core::Keybind> {
        self.keybind
            .iter()
            .filter_map(
                |keybind| match keybind.try_convert_to_core_keybind(&self.modkey) {
                    Ok(internal_keybind) => Some(internal_keybind),
                    Err(err) => {
                        tracing::error!("Invalid key binding: {err:#}\n{keybind:?}");
                        None
                    }
                },
            )
            .collect()
    }

    fn layout_settings(&self) -> LayoutSettings {
        LayoutSettings {
            master_count: self.master_count,
            split_factor: self.split_factor.clamp(0.1, 0.9),
            factor_step: self.factor_step,
            border_width: self.border_width.max(0),
            gap: self.gap.max(0),
            outer_gap: self.outer_gap.max(0),
            bar_height: self.bar_height.max(0),
        }
    }

    fn focus_follows_mouse(&self) -> bool {
        self.focus_follows_mouse
    }

    fn default_border_color(&self) -> String {
        self.default_border_color.clone()
    }

    fn floating_border_color(&self) -> String {
        self.floating_border_color.clone()
    }

    fn focused_border_color(&self) -> String {
        self.focused_border_color.clone()
    }

    /// The first matching rule wins.
    fn window_rule<H: Handle>(&self, client: &Client<H>) -> Option<RuleOutcome> {
        let rule = self.rules.iter().find(|rule| rule.matches(client))?;
        tracing::debug!(
            "Window [[ TITLE={:?}; WM_CLASS={:?}, {:?} ]] matched a rule: {:?}",
            client.name,
            client.res_name,
            client.res_class,
            rule.outcome(),
        );
        Some(rule.outcome())
    }

    fn reload(&self) -> std::result::Result<Self, Vec<Diagnostic>> {
        Self::from_path(&self.source_path()?)
    }

    fn validate(&self) -> Vec<Diagnostic> {
        match self.source_path() {
            Ok(path) => check_file(&path).1,
            Err(diagnostics) => diagnostics,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tilewm_core::Config as _;

    fn write_config(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn defaults_survive_a_toml_round_trip() {
        let config = Config::default();
        let text = toml::to_string(&config).unwrap();
        let (parsed, diagnostics) = checks::check_source(&text);
        assert!(diagnostics.is_empty(), "{diagnostics:?}");
        let parsed = parsed.unwrap();
        assert_eq!(parsed.keybind, config.keybind);
        assert_eq!(parsed.workspaces, config.workspaces);
    }

    #[test]
    fn missing_fields_take_defaults() {
        let file = write_config("modkey = \"Mod1\"\ngap = 6\n");
        let config = Config::from_path(file.path()).unwrap();
        assert_eq!(config.modkey, "Mod1");
        assert_eq!(config.layout_settings().gap, 6);
        assert_eq!(config.workspaces().len(), 9);
        assert_eq!(config.mousekey(), ModMask::Alt);
        assert_eq!(config.path.as_deref(), Some(file.path()));
    }

    #[test]
    fn split_factor_is_clamped() {
        let file = write_config("split_factor = 0.99\n");
        let config = Config::from_path(file.path()).unwrap();
        assert!((config.layout_settings().split_factor - 0.9).abs() < f32::EPSILON);
    }

    #[test]
    fn reload_rereads_the_file_and_keeps_nothing_on_failure() {
        let file = write_config("master_count = 2\n");
        let config = Config::from_path(file.path()).unwrap();
        assert_eq!(config.layout_settings().master_count, 2);

        fs::write(file.path(), "master_count = 3\n").unwrap();
        let reloaded = config.reload().unwrap();
        assert_eq!(reloaded.layout_settings().master_count, 3);

        let broken = write_config("master_count = \"three\"\n");
        let config = Config {
            path: Some(broken.path().to_owned()),
            ..Config::default()
        };
        let diagnostics = config.reload().unwrap_err();
        assert!(diagnostics.iter().any(Diagnostic::is_fatal));
        assert_eq!(diagnostics[0].line, Some(1));
    }

    #[test]
    fn first_matching_rule_wins() {
        let file = write_config(
            r#"
[[window_rules]]
window_class = "^mpv$"
spawn_floating = true

[[window_rules]]
window_class = "^mpv$"
spawn_on_workspace = 4
"#,
        );
        let config = Config::from_path(file.path()).unwrap();
        let mut client: Client<TestHandle> =
            Client::new(tilewm_core::models::WindowHandle(TestHandle(1)), None);
        client.res_class = Some("mpv".to_owned());
        let outcome = config.window_rule(&client).unwrap();
        assert_eq!(outcome.floating, Some(true));
        assert_eq!(outcome.workspace, None);

        client.res_class = Some("feh".to_owned());
        assert!(config.window_rule(&client).is_none());
    }

    #[test]
    fn invalid_bindings_are_left_out() {
        let file = write_config(
            r#"
keybind = [
    { command = "Quit", modifier = ["modkey", "Shift"], key = "q" },
    { command = "Fly", modifier = ["modkey"], key = "f" },
]
"#,
        );
        let config = Config::from_path(file.path()).unwrap();
        let bindings = config.mapped_bindings();
        assert_eq!(bindings.len(), 1);
        assert_eq!(bindings[0].command, tilewm_core::Command::Quit);
    }

    #[derive(serde::Serialize, serde::Deserialize, Debug, Default, Clone, Copy, PartialEq, Eq)]
    struct TestHandle(u32);
    impl Handle for TestHandle {}
}
