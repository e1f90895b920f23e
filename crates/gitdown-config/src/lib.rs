//! Configuration management for GitDown.
//!
//! Parses `gitdown.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories. Relative paths
//! (`theme.assets_dir`, `cache.dir`) resolve against the directory holding
//! the config file.
//!
//! ```toml
//! [api]
//! url = "https://api.github.com/markdown"
//! token = "ghp_..."
//!
//! [render]
//! allowed_tags = ["x-alert", "livewire"]
//!
//! [theme]
//! name = "dark"
//!
//! [cache]
//! enabled = true
//! ttl_minutes = 60
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "gitdown.toml";

/// Default markdown rendering endpoint.
pub const DEFAULT_API_URL: &str = "https://api.github.com/markdown";

/// Default `User-Agent` header sent to the rendering endpoint.
pub const DEFAULT_USER_AGENT: &str = "GitDown Plugin";

/// Application configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Remote rendering API configuration.
    pub api: ApiConfig,
    /// Rendering configuration.
    pub render: RenderConfig,
    /// Theme configuration (paths are relative strings from TOML).
    theme: ThemeConfigRaw,
    /// Cache configuration (paths are relative strings from TOML).
    cache: CacheConfigRaw,

    /// Resolved theme configuration (set after loading).
    #[serde(skip)]
    pub theme_resolved: ThemeConfig,
    /// Resolved cache configuration (set after loading).
    #[serde(skip)]
    pub cache_resolved: CacheConfig,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self::default_with_base(Path::new("."))
    }
}

/// Remote rendering API configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Markdown rendering endpoint.
    pub url: String,
    /// Token sent as `Authorization: token <token>`.
    pub token: Option<String>,
    /// `User-Agent` header value.
    pub user_agent: String,
    /// Transport timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_API_URL.to_owned(),
            token: None,
            user_agent: DEFAULT_USER_AGENT.to_owned(),
            timeout_secs: 30,
        }
    }
}

impl ApiConfig {
    /// Transport timeout as a [`Duration`].
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Rendering configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Tags shielded from the remote renderer, in scan order.
    pub allowed_tags: Vec<String>,
    /// Rendering context. Accepted for compatibility, not sent anywhere.
    pub context: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ThemeConfigRaw {
    name: Option<String>,
    assets_dir: Option<String>,
}

/// Resolved theme configuration.
#[derive(Debug, PartialEq, Eq)]
pub struct ThemeConfig {
    /// Theme name, selects `styles-<name>.css`.
    pub name: String,
    /// Directory with custom stylesheets; `None` uses the bundled ones.
    pub assets_dir: Option<PathBuf>,
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            name: "light".to_owned(),
            assets_dir: None,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct CacheConfigRaw {
    enabled: Option<bool>,
    dir: Option<String>,
    ttl_minutes: Option<u64>,
}

/// Resolved cache configuration with absolute paths.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct CacheConfig {
    /// Whether rendered output is cached on disk.
    pub enabled: bool,
    /// Cache directory.
    pub dir: PathBuf,
    /// Entry lifetime in minutes; `None` caches forever.
    pub ttl_minutes: Option<u64>,
}

impl CacheConfig {
    /// Entry lifetime as a [`Duration`].
    #[must_use]
    pub fn ttl(&self) -> Option<Duration> {
        self.ttl_minutes
            .map(|minutes| Duration::from_secs(minutes.saturating_mul(60)))
    }
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
}

/// Require a string field to be non-empty.
fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

/// Require a URL field to use http:// or https:// scheme.
fn require_http_url(url: &str, field: &str) -> Result<(), ConfigError> {
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(ConfigError::Validation(format!(
            "{field} must start with http:// or https://"
        )));
    }
    Ok(())
}

/// Require a tag name made of `[A-Za-z0-9_:-]`.
fn require_tag_name(tag: &str) -> Result<(), ConfigError> {
    let valid = !tag.is_empty()
        && tag
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | ':' | '-'));
    if !valid {
        return Err(ConfigError::Validation(format!(
            "render.allowed_tags contains invalid tag name '{tag}'"
        )));
    }
    Ok(())
}

impl Config {
    /// Load configuration from an explicit file.
    ///
    /// # Errors
    ///
    /// Returns error if the file doesn't exist, parsing fails, or validation fails.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }
        let content = std::fs::read_to_string(path)?;
        let config_dir = path.parent().unwrap_or(Path::new("."));
        let mut config = Self::from_toml(&content, config_dir)?;
        config.config_path = Some(path.to_path_buf());
        Ok(config)
    }

    /// Search for `gitdown.toml` in `start` and its parents.
    ///
    /// Falls back to defaults (paths relative to `start`) when no file exists.
    ///
    /// # Errors
    ///
    /// Returns error if a discovered file cannot be parsed or validated.
    pub fn discover(start: &Path) -> Result<Self, ConfigError> {
        let mut current = start.to_path_buf();
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                return Self::load(&candidate);
            }
            if !current.pop() {
                return Ok(Self::default_with_base(start));
            }
        }
    }

    /// Parse configuration from TOML, resolving paths against `base_dir`.
    ///
    /// # Errors
    ///
    /// Returns error if parsing or validation fails.
    pub fn from_toml(content: &str, base_dir: &Path) -> Result<Self, ConfigError> {
        let mut config: Self = toml::from_str(content)?;
        config.resolve_paths(base_dir);
        config.validate()?;
        Ok(config)
    }

    /// Create default config with paths relative to given base directory.
    fn default_with_base(base: &Path) -> Self {
        Self {
            api: ApiConfig::default(),
            render: RenderConfig::default(),
            theme: ThemeConfigRaw::default(),
            cache: CacheConfigRaw::default(),
            theme_resolved: ThemeConfig::default(),
            cache_resolved: CacheConfig {
                enabled: false,
                dir: base.join(".gitdown/cache"),
                ttl_minutes: None,
            },
            config_path: None,
        }
    }

    /// Validate configuration values.
    ///
    /// Called automatically after loading from file or string.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        require_non_empty(&self.api.url, "api.url")?;
        require_http_url(&self.api.url, "api.url")?;
        require_non_empty(&self.api.user_agent, "api.user_agent")?;
        if self.api.timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "api.timeout_secs must be greater than 0".to_owned(),
            ));
        }

        for tag in &self.render.allowed_tags {
            require_tag_name(tag)?;
        }

        require_non_empty(&self.theme_resolved.name, "theme.name")?;

        if self.cache_resolved.ttl_minutes == Some(0) {
            return Err(ConfigError::Validation(
                "cache.ttl_minutes must be greater than 0".to_owned(),
            ));
        }

        Ok(())
    }

    /// Resolve relative paths to absolute paths based on config directory.
    fn resolve_paths(&mut self, config_dir: &Path) {
        self.theme_resolved = ThemeConfig {
            name: self.theme.name.clone().unwrap_or_else(|| "light".to_owned()),
            assets_dir: self.theme.assets_dir.as_deref().map(|d| config_dir.join(d)),
        };

        self.cache_resolved = CacheConfig {
            enabled: self.cache.enabled.unwrap_or(false),
            dir: config_dir.join(self.cache.dir.as_deref().unwrap_or(".gitdown/cache")),
            ttl_minutes: self.cache.ttl_minutes,
        };
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default_with_base(Path::new("/test"));
        assert_eq!(config.api.url, "https://api.github.com/markdown");
        assert_eq!(config.api.user_agent, "GitDown Plugin");
        assert_eq!(config.api.token, None);
        assert_eq!(config.api.timeout(), Duration::from_secs(30));
        assert!(config.render.allowed_tags.is_empty());
        assert_eq!(config.theme_resolved.name, "light");
        assert!(!config.cache_resolved.enabled);
        assert_eq!(
            config.cache_resolved.dir,
            PathBuf::from("/test/.gitdown/cache")
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_minimal_config() {
        let config = Config::from_toml("", Path::new("/project")).unwrap();
        assert_eq!(config.api.url, DEFAULT_API_URL);
        assert_eq!(config.theme_resolved, ThemeConfig::default());
        assert_eq!(config.cache_resolved.ttl(), None);
    }

    #[test]
    fn test_parse_full_config() {
        let toml = r#"
[api]
url = "https://github.example.com/api/v3/markdown"
token = "secret"
user_agent = "docs-site"
timeout_secs = 5

[render]
allowed_tags = ["x-alert", "livewire:counter"]
context = "acme/docs"

[theme]
name = "dark"
assets_dir = "assets"

[cache]
enabled = true
dir = "tmp/cache"
ttl_minutes = 15
"#;
        let config = Config::from_toml(toml, Path::new("/project")).unwrap();

        assert_eq!(config.api.url, "https://github.example.com/api/v3/markdown");
        assert_eq!(config.api.token.as_deref(), Some("secret"));
        assert_eq!(config.api.user_agent, "docs-site");
        assert_eq!(config.api.timeout(), Duration::from_secs(5));
        assert_eq!(
            config.render.allowed_tags,
            vec!["x-alert".to_owned(), "livewire:counter".to_owned()]
        );
        assert_eq!(config.render.context.as_deref(), Some("acme/docs"));
        assert_eq!(
            config.theme_resolved,
            ThemeConfig {
                name: "dark".to_owned(),
                assets_dir: Some(PathBuf::from("/project/assets")),
            }
        );
        assert_eq!(
            config.cache_resolved,
            CacheConfig {
                enabled: true,
                dir: PathBuf::from("/project/tmp/cache"),
                ttl_minutes: Some(15),
            }
        );
        assert_eq!(config.cache_resolved.ttl(), Some(Duration::from_secs(900)));
    }

    #[test]
    fn test_invalid_url_scheme() {
        let err = Config::from_toml("[api]\nurl = \"ftp://example.com\"", Path::new("/p"))
            .unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
        assert!(err.to_string().contains("api.url"));
    }

    #[test]
    fn test_invalid_tag_name() {
        let err = Config::from_toml(
            "[render]\nallowed_tags = [\"ok\", \"a(b\"]",
            Path::new("/p"),
        )
        .unwrap_err();
        assert!(err.to_string().contains("a(b"), "unexpected error: {err}");
    }

    #[test]
    fn test_empty_tag_name() {
        let result = Config::from_toml("[render]\nallowed_tags = [\"\"]", Path::new("/p"));
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let result = Config::from_toml("[api]\ntimeout_secs = 0", Path::new("/p"));
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_zero_ttl_rejected() {
        let result = Config::from_toml("[cache]\nttl_minutes = 0", Path::new("/p"));
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_parse_error() {
        let result = Config::from_toml("[api\nurl = ", Path::new("/p"));
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_load_missing_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("gitdown.toml");

        let result = Config::load(&path);

        assert!(matches!(result, Err(ConfigError::NotFound(p)) if p == path));
    }

    #[test]
    fn test_load_sets_config_path_and_resolves_relative_to_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("gitdown.toml");
        std::fs::write(&path, "[cache]\nenabled = true\n").unwrap();

        let config = Config::load(&path).unwrap();

        assert_eq!(config.config_path, Some(path));
        assert_eq!(config.cache_resolved.dir, tmp.path().join(".gitdown/cache"));
    }

    #[test]
    fn test_discover_in_parent_directory() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(
            tmp.path().join("gitdown.toml"),
            "[theme]\nname = \"dark\"\n",
        )
        .unwrap();
        let nested = tmp.path().join("docs/guide");
        std::fs::create_dir_all(&nested).unwrap();

        let config = Config::discover(&nested).unwrap();

        assert_eq!(config.theme_resolved.name, "dark");
        assert_eq!(config.config_path, Some(tmp.path().join("gitdown.toml")));
    }
}
