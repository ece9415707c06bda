//! Line numbered checks of a configuration source.
use super::{CompiledRule, Config, Modifier, WindowRule};
use serde::Deserialize;
use std::collections::HashMap;
use tilewm_core::Diagnostic;
use tilewm_core::config::{MAX_KEYBINDS, MAX_RULES};
use tilewm_core::utils::modmask_lookup;
use toml::Spanned;

/// The parts of a configuration that get checked, with their location in the source.
#[derive(Deserialize, Default)]
#[serde(default)]
struct Located {
    modkey: Option<Spanned<String>>,
    mousekey: Option<Spanned<Modifier>>,
    workspaces: Option<Spanned<Vec<String>>>,
    split_factor: Option<Spanned<f32>>,
    factor_step: Option<Spanned<f32>>,
    border_width: Option<Spanned<i32>>,
    gap: Option<Spanned<i32>>,
    outer_gap: Option<Spanned<i32>>,
    bar_height: Option<Spanned<i32>>,
    focused_border_color: Option<Spanned<String>>,
    default_border_color: Option<Spanned<String>>,
    floating_border_color: Option<Spanned<String>>,
    keybind: Vec<LocatedKeybind>,
    window_rules: Vec<LocatedRule>,
}

#[derive(Deserialize)]
struct LocatedKeybind {
    key: Spanned<String>,
}

#[derive(Deserialize)]
struct LocatedRule {
    window_class: Option<Spanned<String>>,
    window_instance: Option<Spanned<String>>,
    window_title: Option<Spanned<String>>,
    spawn_on_workspace: Option<Spanned<usize>>,
    spawn_on_monitor: Option<Spanned<usize>>,
    spawn_floating: Option<Spanned<bool>>,
    width: Option<Spanned<i32>>,
    height: Option<Spanned<i32>>,
}

impl LocatedRule {
    /// Offset of the first field the rule sets.
    fn start(&self) -> Option<usize> {
        [
            self.window_class.as_ref().map(|s| s.span().start),
            self.window_instance.as_ref().map(|s| s.span().start),
            self.window_title.as_ref().map(|s| s.span().start),
            self.spawn_on_workspace.as_ref().map(|s| s.span().start),
            self.spawn_on_monitor.as_ref().map(|s| s.span().start),
            self.spawn_floating.as_ref().map(|s| s.span().start),
            self.width.as_ref().map(|s| s.span().start),
            self.height.as_ref().map(|s| s.span().start),
        ]
        .into_iter()
        .flatten()
        .min()
    }
}

/// The 1-based line of a byte offset.
fn line_of(contents: &str, offset: usize) -> usize {
    let end = offset.min(contents.len());
    contents.as_bytes()[..end]
        .iter()
        .filter(|b| **b == b'\n')
        .count()
        + 1
}

fn is_hex_color(color: &str) -> bool {
    color.len() == 7
        && color.starts_with('#')
        && color[1..].chars().all(|c| c.is_ascii_hexdigit())
}

pub fn join(diagnostics: &[Diagnostic]) -> String {
    diagnostics
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Parse a configuration source and report what is wrong with it. The configuration is
/// `None` only when the source cannot be parsed at all.
pub fn check_source(contents: &str) -> (Option<Config>, Vec<Diagnostic>) {
    let mut config = match toml::from_str::<Config>(contents) {
        Ok(config) => config,
        Err(err) => {
            let line = err.span().map(|span| line_of(contents, span.start));
            return (None, vec![Diagnostic::fatal(line, err.message())]);
        }
    };
    let located = toml::from_str::<Located>(contents).unwrap_or_default();
    let at = |offset: usize| Some(line_of(contents, offset));

    let mut diagnostics = vec![];
    check_modifiers(&config, &located, &at, &mut diagnostics);
    check_layout(&config, &located, &at, &mut diagnostics);
    check_colors(&located, &at, &mut diagnostics);
    check_keybinds(&config, &located, &at, &mut diagnostics);
    check_rules(&config, &located, &at, &mut diagnostics);

    config.compile_rules();
    (Some(config), diagnostics)
}

fn check_modifiers(
    config: &Config,
    located: &Located,
    at: &impl Fn(usize) -> Option<usize>,
    diagnostics: &mut Vec<Diagnostic>,
) {
    if modmask_lookup::into_mod(&config.modkey).is_none() {
        let line = located.modkey.as_ref().and_then(|m| at(m.span().start));
        diagnostics.push(Diagnostic::fatal(
            line,
            format!("modkey `{}` is not a modifier", config.modkey),
        ));
    }
    if let Some(mousekey) = &config.mousekey {
        let line = located.mousekey.as_ref().and_then(|m| at(m.span().start));
        if mousekey.is_empty() {
            diagnostics.push(Diagnostic::warning(
                line,
                "mousekey is empty, a plain click will move and resize windows",
            ));
        }
        for name in mousekey.substitute_modkey(&config.modkey) {
            if !name.is_empty() && modmask_lookup::into_mod(&name).is_none() {
                diagnostics.push(Diagnostic::warning(
                    line,
                    format!("mousekey modifier `{name}` is not valid"),
                ));
            }
        }
    }
}

fn check_layout(
    config: &Config,
    located: &Located,
    at: &impl Fn(usize) -> Option<usize>,
    diagnostics: &mut Vec<Diagnostic>,
) {
    if config.workspaces.is_empty() {
        let line = located.workspaces.as_ref().and_then(|w| at(w.span().start));
        diagnostics.push(Diagnostic::warning(
            line,
            "no workspaces given, the defaults are used",
        ));
    }
    if !(0.1..=0.9).contains(&config.split_factor) {
        let line = located.split_factor.as_ref().and_then(|f| at(f.span().start));
        diagnostics.push(Diagnostic::warning(
            line,
            format!(
                "split_factor {} is outside 0.1..=0.9 and will be clamped",
                config.split_factor
            ),
        ));
    }
    if !(config.factor_step > 0.0 && config.factor_step < 0.8) {
        let line = located.factor_step.as_ref().and_then(|f| at(f.span().start));
        diagnostics.push(Diagnostic::warning(
            line,
            format!("factor_step {} has no useful effect", config.factor_step),
        ));
    }
    let sizes = [
        ("border_width", &located.border_width),
        ("gap", &located.gap),
        ("outer_gap", &located.outer_gap),
        ("bar_height", &located.bar_height),
    ];
    for (name, value) in sizes {
        if let Some(value) = value.as_ref().filter(|v| *v.get_ref() < 0) {
            diagnostics.push(Diagnostic::warning(
                at(value.span().start),
                format!("{name} is negative and will be treated as 0"),
            ));
        }
    }
}

fn check_colors(
    located: &Located,
    at: &impl Fn(usize) -> Option<usize>,
    diagnostics: &mut Vec<Diagnostic>,
) {
    let colors = [
        ("focused_border_color", &located.focused_border_color),
        ("default_border_color", &located.default_border_color),
        ("floating_border_color", &located.floating_border_color),
    ];
    for (name, color) in colors {
        if let Some(color) = color.as_ref().filter(|c| !is_hex_color(c.get_ref())) {
            diagnostics.push(Diagnostic::warning(
                at(color.span().start),
                format!("{name} `{}` is not a #rrggbb color", color.get_ref()),
            ));
        }
    }
}

fn check_keybinds(
    config: &Config,
    located: &Located,
    at: &impl Fn(usize) -> Option<usize>,
    diagnostics: &mut Vec<Diagnostic>,
) {
    let mut bindings = HashMap::new();
    for (index, keybind) in config.keybind.iter().enumerate() {
        let line = located
            .keybind
            .get(index)
            .and_then(|located| at(located.key.span().start));
        if index == MAX_KEYBINDS {
            diagnostics.push(Diagnostic::warning(
                line,
                format!("only {MAX_KEYBINDS} key bindings are used, the rest is ignored"),
            ));
        }
        if let Err(err) = keybind.try_convert_to_core_keybind(&config.modkey) {
            diagnostics.push(Diagnostic::warning(
                line,
                format!("key binding ignored: {err:#}"),
            ));
            continue;
        }
        let combination = (keybind.modmask(&config.modkey), keybind.key.clone());
        if let Some(previous) = bindings.insert(combination, line) {
            let previous = previous.map_or_else(String::new, |l| format!(" (line {l})"));
            diagnostics.push(Diagnostic::warning(
                line,
                format!(
                    "{} + {} is bound more than once{previous}",
                    keybind
                        .modifier
                        .as_ref()
                        .map_or_else(|| "None".to_owned(), ToString::to_string),
                    keybind.key
                ),
            ));
        }
    }
}

fn check_rules(
    config: &Config,
    located: &Located,
    at: &impl Fn(usize) -> Option<usize>,
    diagnostics: &mut Vec<Diagnostic>,
) {
    for (index, rule) in config.window_rules.iter().enumerate() {
        let place = located.window_rules.get(index);
        let line = place.and_then(LocatedRule::start).and_then(at);
        if index == MAX_RULES {
            diagnostics.push(Diagnostic::warning(
                line,
                format!("only {MAX_RULES} window rules are used, the rest is ignored"),
            ));
        }
        match CompiledRule::compile(rule) {
            Ok(Some(_)) => {}
            Ok(None) => diagnostics.push(Diagnostic::warning(
                line,
                "window rule has no window_class, window_instance or window_title and never matches",
            )),
            Err(err) => {
                let line = place.and_then(|p| pattern_line(rule, p)).and_then(at).or(line);
                diagnostics.push(Diagnostic::fatal(line, format!("invalid pattern: {err}")));
            }
        }
        if let Some(workspace) = rule.spawn_on_workspace {
            if workspace == 0 || workspace > config.workspaces.len().max(1) {
                let line = place
                    .and_then(|p| p.spawn_on_workspace.as_ref())
                    .and_then(|w| at(w.span().start))
                    .or(line);
                diagnostics.push(Diagnostic::warning(
                    line,
                    format!("spawn_on_workspace {workspace} does not exist, workspaces count from 1"),
                ));
            }
        }
        if rule.width.is_some() != rule.height.is_some() {
            diagnostics.push(Diagnostic::warning(
                line,
                "window rule sets only one of width and height, the size is ignored",
            ));
        }
    }
}

/// Offset of the first pattern of a rule that does not compile.
fn pattern_line(rule: &WindowRule, place: &LocatedRule) -> Option<usize> {
    let patterns = [
        (&rule.window_class, &place.window_class),
        (&rule.window_instance, &place.window_instance),
        (&rule.window_title, &place.window_title),
    ];
    patterns
        .into_iter()
        .find(|(pattern, _)| {
            pattern
                .as_deref()
                .is_some_and(|p| regex::Regex::new(p).is_err())
        })
        .and_then(|(_, located)| located.as_ref().map(|s| s.span().start))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tilewm_core::Severity;

    fn diagnostics(contents: &str) -> Vec<Diagnostic> {
        check_source(contents).1
    }

    #[test]
    fn syntax_errors_are_fatal_with_their_line() {
        let (config, diagnostics) = check_source("gap = 2\nmodkey = \n");
        assert!(config.is_none());
        assert_eq!(diagnostics.len(), 1);
        assert!(diagnostics[0].is_fatal());
        assert_eq!(diagnostics[0].line, Some(2));
    }

    #[test]
    fn wrong_types_are_fatal() {
        let diagnostics = diagnostics("gap = 1\nbar_height = \"tall\"\n");
        assert!(diagnostics[0].is_fatal());
        assert_eq!(diagnostics[0].line, Some(2));
    }

    #[test]
    fn unknown_modkey_is_fatal() {
        let diagnostics = diagnostics("\nmodkey = \"Hyper\"\n");
        assert_eq!(
            diagnostics[0],
            Diagnostic::fatal(Some(2), "modkey `Hyper` is not a modifier")
        );
        assert_eq!(diagnostics.iter().filter(|d| d.is_fatal()).count(), 1);
    }

    #[test]
    fn broken_bindings_are_warnings_on_their_line() {
        let source = r#"
[[keybind]]
command = "Quit"
modifier = ["modkey"]
key = "q"

[[keybind]]
command = "Teleport"
modifier = ["modkey"]
key = "t"
"#;
        let (config, diagnostics) = check_source(source);
        assert!(config.is_some());
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].severity, Severity::Warning);
        assert_eq!(diagnostics[0].line, Some(10));
    }

    #[test]
    fn duplicate_combinations_are_reported() {
        let source = r#"
keybind = [
    { command = "Quit", modifier = ["modkey"], key = "q" },
    { command = "CloseWindow", modifier = ["Mod4"], key = "q" },
]
"#;
        let diagnostics = diagnostics(source);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].line, Some(4));
        assert!(diagnostics[0].message.contains("(line 3)"));
    }

    #[test]
    fn invalid_patterns_are_fatal() {
        let source = r#"
[[window_rules]]
spawn_floating = true
window_title = "(oops"
"#;
        let diagnostics = diagnostics(source);
        assert_eq!(diagnostics.len(), 1);
        assert!(diagnostics[0].is_fatal());
        assert_eq!(diagnostics[0].line, Some(4));
    }

    #[test]
    fn questionable_values_are_warnings() {
        let source = r##"
split_factor = 1.5
gap = -3
focused_border_color = "red"
[[window_rules]]
window_class = "x"
spawn_on_workspace = 12
width = 300
"##;
        let diagnostics = diagnostics(source);
        assert_eq!(diagnostics.len(), 5, "{diagnostics:?}");
        assert!(diagnostics.iter().all(|d| !d.is_fatal()));
        let lines: Vec<_> = diagnostics.iter().map(|d| d.line).collect();
        assert_eq!(lines, vec![Some(2), Some(3), Some(4), Some(7), Some(6)]);
    }

    #[test]
    fn an_empty_source_is_clean() {
        let (config, diagnostics) = check_source("");
        assert!(config.is_some());
        assert!(diagnostics.is_empty(), "{diagnostics:?}");
    }

    #[test]
    fn colors_need_six_hex_digits() {
        assert!(is_hex_color("#a0b1C2"));
        assert!(!is_hex_color("#abc"));
        assert!(!is_hex_color("a0b1c2f"));
        assert!(!is_hex_color("#a0b1cz"));
    }
}
