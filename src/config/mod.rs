mod parser;
mod theme;

pub use theme::{Theme, ThemeName};

use std::path::PathBuf;

use crate::git::platform::Platform;

/// Runtime options. Loading never fails: a missing file, a parse error or
/// an unrecognized value falls back to the default for that option.
#[derive(Debug, Clone)]
pub struct Config {
    pub platform: Platform,
    pub default_base_branch: String,
    pub protected_branches: Vec<String>,
    pub prevent_browser_for_merged: bool,
    pub theme: ThemeName,
    themes: Themes,
}

#[derive(Debug, Clone)]
struct Themes {
    dark: Theme,
    light: Theme,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            platform: Platform::Auto,
            default_base_branch: "main".to_string(),
            protected_branches: vec!["main".to_string(), "master".to_string()],
            prevent_browser_for_merged: false,
            theme: ThemeName::Dark,
            themes: Themes {
                dark: Theme::dark(),
                light: Theme::light(),
            },
        }
    }
}

impl Config {
    pub fn load() -> Self {
        let path = Self::config_path();
        if !path.exists() {
            return Self::default();
        }
        match std::fs::read_to_string(&path) {
            Ok(content) => Self::parse(&content),
            Err(e) => {
                warn!("could not read {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    pub fn config_path() -> PathBuf {
        #[cfg(windows)]
        {
            let appdata = std::env::var("APPDATA").unwrap_or_else(|_| ".".to_string());
            PathBuf::from(appdata).join("twig").join("config.toml")
        }

        #[cfg(not(windows))]
        {
            let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
            PathBuf::from(home).join(".config").join("twig").join("config.toml")
        }
    }

    pub fn parse(content: &str) -> Self {
        let mut config = Self::default();
        let toml = match parser::parse(content) {
            Ok(t) => t,
            Err(e) => {
                warn!("config ignored: {}", e);
                return config;
            }
        };

        if let Some(parser::Value::String(s)) = toml.get("platform") {
            if let Some(p) = Platform::parse(s) {
                config.platform = p;
            }
        }

        if let Some(parser::Value::String(s)) = toml.get("default_base_branch") {
            if !s.is_empty() {
                config.default_base_branch = s.clone();
            }
        }

        if let Some(parser::Value::Array(items)) = toml.get("protected_branches") {
            config.protected_branches = items.clone();
        }

        if let Some(parser::Value::Boolean(b)) = toml.get("prevent_browser_for_merged") {
            config.prevent_browser_for_merged = *b;
        }

        if let Some(parser::Value::String(s)) = toml.get("theme") {
            config.theme = match s.as_str() {
                "light" => ThemeName::Light,
                _ => ThemeName::Dark,
            };
        }

        config
    }

    pub fn current_theme(&self) -> &Theme {
        match self.theme {
            ThemeName::Dark => &self.themes.dark,
            ThemeName::Light => &self.themes.light,
        }
    }

    pub fn toggle_theme(&mut self) {
        self.theme = match self.theme {
            ThemeName::Dark => ThemeName::Light,
            ThemeName::Light => ThemeName::Dark,
        };
    }

    /// Protected names for delete confirmation and merged-filter
    /// exemption: the configured set plus the base branch, which is
    /// protected even under a custom name.
    pub fn protected_names(&self) -> Vec<String> {
        let mut names = self.protected_branches.clone();
        if !names.contains(&self.default_base_branch) {
            names.push(self.default_base_branch.clone());
        }
        names
    }

    pub fn is_protected(&self, branch: &str) -> bool {
        branch == self.default_base_branch
            || self.protected_branches.iter().any(|p| p == branch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_survive_garbage_config() {
        let config = Config::parse("%%% not toml at all");
        assert_eq!(config.default_base_branch, "main");
        assert_eq!(config.protected_branches, ["main", "master"]);
        assert!(!config.prevent_browser_for_merged);
    }

    #[test]
    fn recognized_options_override_defaults() {
        let config = Config::parse(
            "platform = \"gitlab\"\n\
             default_base_branch = \"develop\"\n\
             protected_branches = [\"develop\", \"release\"]\n\
             prevent_browser_for_merged = true\n\
             theme = \"light\"\n",
        );
        assert_eq!(config.platform, Platform::GitLab);
        assert_eq!(config.default_base_branch, "develop");
        assert_eq!(config.protected_branches, ["develop", "release"]);
        assert!(config.prevent_browser_for_merged);
        assert_eq!(config.theme, ThemeName::Light);
    }

    #[test]
    fn unknown_platform_falls_back_to_auto() {
        let config = Config::parse("platform = \"sourcehut\"");
        assert_eq!(config.platform, Platform::Auto);
    }

    #[test]
    fn custom_base_branch_is_always_protected() {
        let config = Config::parse(
            "default_base_branch = \"trunk\"\n\
             protected_branches = [\"main\"]\n",
        );
        assert!(config.is_protected("trunk"));
        assert!(config.is_protected("main"));
        assert!(!config.is_protected("feature/x"));
        assert!(config.protected_names().contains(&"trunk".to_string()));
    }
}
