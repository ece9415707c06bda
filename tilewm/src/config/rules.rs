use regex::Regex;
use serde::{Deserialize, Serialize};
use tilewm_core::RuleOutcome;
use tilewm_core::models::{Client, Handle};

/// Selecting by `WM_CLASS` and/or window title, allow the user to define where a window
/// spawns, whether it floats and how large it is.
///
/// # Example
///
/// In `config.toml`
///
/// ```toml
/// [[window_rules]]
/// window_class = "^krita$"
/// spawn_on_workspace = 3
/// spawn_floating = false
/// ```
///
/// windows whose class is "krita" will spawn on workspace 3 (1-indexed) and not floating.
#[derive(Serialize, Deserialize, Default, Debug, Clone, PartialEq)]
pub struct WindowRule {
    /// Regex over the class half of `WM_CLASS`.
    pub window_class: Option<String>,
    /// Regex over the instance half of `WM_CLASS`.
    pub window_instance: Option<String>,
    /// Regex over `_NET_WM_NAME`, or `WM_NAME`.
    pub window_title: Option<String>,
    pub spawn_on_workspace: Option<usize>,
    /// Monitor index, counted from 0.
    pub spawn_on_monitor: Option<usize>,
    pub spawn_floating: Option<bool>,
    pub width: Option<i32>,
    pub height: Option<i32>,
}

impl WindowRule {
    fn outcome(&self) -> RuleOutcome {
        RuleOutcome {
            floating: self.spawn_floating,
            workspace: self
                .spawn_on_workspace
                .and_then(|workspace| workspace.checked_sub(1)),
            monitor: self.spawn_on_monitor,
            size: self.width.zip(self.height),
        }
    }

    fn has_matcher(&self) -> bool {
        self.window_class.is_some() || self.window_instance.is_some() || self.window_title.is_some()
    }
}

/// A rule with its patterns compiled. Every pattern given has to match.
#[derive(Debug, Clone)]
pub struct CompiledRule {
    class: Option<Regex>,
    instance: Option<Regex>,
    title: Option<Regex>,
    outcome: RuleOutcome,
}

impl CompiledRule {
    /// Compile a rule. Rules without any pattern never match and are dropped.
    ///
    /// # Errors
    ///
    /// Fails on the first pattern that is not a valid regex.
    pub fn compile(rule: &WindowRule) -> Result<Option<Self>, regex::Error> {
        if !rule.has_matcher() {
            return Ok(None);
        }
        let compile = |pattern: &Option<String>| pattern.as_deref().map(Regex::new).transpose();
        Ok(Some(Self {
            class: compile(&rule.window_class)?,
            instance: compile(&rule.window_instance)?,
            title: compile(&rule.window_title)?,
            outcome: rule.outcome(),
        }))
    }

    pub fn matches<H: Handle>(&self, client: &Client<H>) -> bool {
        let hit = |pattern: &Option<Regex>, value: &Option<String>| match pattern {
            None => true,
            Some(re) => value.as_deref().is_some_and(|v| re.is_match(v)),
        };
        hit(&self.class, &client.res_class)
            && hit(&self.instance, &client.res_name)
            && hit(&self.title, &client.name)
    }

    pub const fn outcome(&self) -> RuleOutcome {
        self.outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tilewm_core::models::WindowHandle;

    #[derive(serde::Serialize, serde::Deserialize, Debug, Default, Clone, Copy, PartialEq, Eq)]
    struct TestHandle(u32);
    impl Handle for TestHandle {}

    fn client(class: &str, instance: &str, title: &str) -> Client<TestHandle> {
        let mut client = Client::new(WindowHandle(TestHandle(1)), Some(title.to_owned()));
        client.res_class = Some(class.to_owned());
        client.res_name = Some(instance.to_owned());
        client
    }

    #[test]
    fn every_given_pattern_has_to_match() {
        let rule = WindowRule {
            window_class: Some("^Firefox$".to_owned()),
            window_title: Some("Private".to_owned()),
            ..WindowRule::default()
        };
        let compiled = CompiledRule::compile(&rule).unwrap().unwrap();
        assert!(compiled.matches(&client("Firefox", "Navigator", "Private Browsing")));
        assert!(!compiled.matches(&client("Firefox", "Navigator", "Start page")));
        assert!(!compiled.matches(&client("firefox-esr", "Navigator", "Private")));
    }

    #[test]
    fn workspaces_count_from_one_and_size_needs_both_sides() {
        let rule = WindowRule {
            window_instance: Some("gimp".to_owned()),
            spawn_on_workspace: Some(3),
            spawn_on_monitor: Some(1),
            spawn_floating: Some(true),
            width: Some(640),
            ..WindowRule::default()
        };
        let outcome = CompiledRule::compile(&rule).unwrap().unwrap().outcome();
        assert_eq!(outcome.workspace, Some(2));
        assert_eq!(outcome.monitor, Some(1));
        assert_eq!(outcome.floating, Some(true));
        assert_eq!(outcome.size, None);
    }

    #[test]
    fn rules_without_patterns_are_dropped() {
        let rule = WindowRule {
            spawn_floating: Some(true),
            ..WindowRule::default()
        };
        assert!(CompiledRule::compile(&rule).unwrap().is_none());
    }

    #[test]
    fn invalid_patterns_fail_to_compile() {
        let rule = WindowRule {
            window_class: Some("(unclosed".to_owned()),
            ..WindowRule::default()
        };
        assert!(CompiledRule::compile(&rule).is_err());
    }
}
