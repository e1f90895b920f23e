//! Render orchestration.
//!
//! [`GitDown`] ties the pieces together: shield allowed tags, post the
//! markdown through a [`Gateway`], check the status, restore the tags.
//! Results can be memoized in any [`CacheBucket`] keyed by the content
//! fingerprint.

use std::borrow::Cow;
use std::path::PathBuf;
use std::time::Duration;

use gitdown_cache::{Cache, CacheBucket, CacheBucketExt, FileCache, NullCache};
use gitdown_config::Config;
use tracing::warn;

use crate::client::{Gateway, HttpGateway, RenderRequest};
use crate::error::RenderError;
use crate::key::fingerprint;
use crate::shield::TagShield;

/// Bucket name for rendered markdown.
const BUCKET: &str = "markdown";

/// How [`GitDown::render_cached`] stores results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CachePolicy {
    /// Keep the result until the cache is cleared.
    Forever,
    /// Keep the result for the given duration.
    Ttl(Duration),
}

impl CachePolicy {
    /// Keep the result for `minutes` minutes.
    #[must_use]
    pub fn minutes(minutes: u64) -> Self {
        Self::Ttl(Duration::from_secs(minutes.saturating_mul(60)))
    }
}

impl From<Option<Duration>> for CachePolicy {
    fn from(ttl: Option<Duration>) -> Self {
        ttl.map_or(Self::Forever, Self::Ttl)
    }
}

/// Markdown renderer backed by the GitHub markdown API.
///
/// # Configuration
///
/// Create with [`new`](Self::new) or [`with_gateway`](Self::with_gateway),
/// then configure using builder methods. Each setter consumes the renderer
/// and returns the reconfigured value:
/// - [`with_token`](Self::with_token): API token sent as `Authorization: token <t>`
/// - [`with_allowed_tags`](Self::with_allowed_tags): Tags shielded from the renderer
/// - [`with_theme`](Self::with_theme): Stylesheet returned by [`styles`](Self::styles)
/// - [`with_cache`](Self::with_cache): Bucket used by [`render_cached`](Self::render_cached)
/// - [`with_cache_policy`](Self::with_cache_policy): Policy used by
///   [`render_cached_default`](Self::render_cached_default)
///
/// # Example
///
/// ```ignore
/// use gitdown::{CachePolicy, GitDown};
/// use gitdown_cache::{Cache, MemoryCache};
///
/// let gitdown = GitDown::new()
///     .with_token("ghp_...")
///     .with_allowed_tags(["x-alert"])
///     .with_cache(MemoryCache::new().bucket("markdown"));
///
/// let html = gitdown.render_cached("# Hello <x-alert/>", CachePolicy::minutes(60))?;
/// ```
pub struct GitDown {
    gateway: Box<dyn Gateway>,
    token: Option<String>,
    context: Option<String>,
    allowed_tags: Vec<String>,
    theme: String,
    assets_dir: Option<PathBuf>,
    cache: Box<dyn CacheBucket>,
    cache_policy: CachePolicy,
}

impl Default for GitDown {
    fn default() -> Self {
        Self::new()
    }
}

impl GitDown {
    /// Renderer posting to `https://api.github.com/markdown`.
    #[must_use]
    pub fn new() -> Self {
        Self::with_gateway(HttpGateway::new())
    }

    /// Renderer using a custom transport.
    #[must_use]
    pub fn with_gateway(gateway: impl Gateway + 'static) -> Self {
        Self {
            gateway: Box::new(gateway),
            token: None,
            context: None,
            allowed_tags: Vec::new(),
            theme: "light".to_owned(),
            assets_dir: None,
            cache: NullCache.bucket(BUCKET),
            cache_policy: CachePolicy::Forever,
        }
    }

    /// Renderer configured from a loaded [`Config`].
    ///
    /// When `cache.enabled` is set, results are cached on disk under
    /// `cache.dir`. `cache.ttl_minutes` becomes the default cache policy.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        let mut gitdown = Self::with_gateway(HttpGateway::from_config(&config.api))
            .with_allowed_tags(&config.render.allowed_tags)
            .with_theme(&config.theme_resolved.name)
            .with_cache_policy(CachePolicy::from(config.cache_resolved.ttl()));
        gitdown.token.clone_from(&config.api.token);
        gitdown.context.clone_from(&config.render.context);
        gitdown.assets_dir.clone_from(&config.theme_resolved.assets_dir);

        if config.cache_resolved.enabled {
            let cache = FileCache::new(config.cache_resolved.dir.clone(), env!("CARGO_PKG_VERSION"));
            gitdown = gitdown.with_cache(cache.bucket(BUCKET));
        }
        gitdown
    }

    /// Set the API token.
    #[must_use]
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Set the rendering context.
    ///
    /// Stored for compatibility; it is not sent with render requests.
    #[must_use]
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    /// Set the tags shielded from the remote renderer, in scan order.
    #[must_use]
    pub fn with_allowed_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.allowed_tags = tags.into_iter().map(|t| t.as_ref().to_owned()).collect();
        self
    }

    /// Set the stylesheet theme (`light`, `dark`, or a custom name).
    #[must_use]
    pub fn with_theme(mut self, theme: impl Into<String>) -> Self {
        self.theme = theme.into();
        self
    }

    /// Read stylesheets from `dir` instead of the bundled ones.
    #[must_use]
    pub fn with_assets_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.assets_dir = Some(dir.into());
        self
    }

    /// Set the bucket used by [`render_cached`](Self::render_cached).
    ///
    /// Defaults to a no-op bucket, so every call renders.
    #[must_use]
    pub fn with_cache(mut self, cache: Box<dyn CacheBucket>) -> Self {
        self.cache = cache;
        self
    }

    /// Set the policy used by [`render_cached_default`](Self::render_cached_default).
    ///
    /// Defaults to [`CachePolicy::Forever`].
    #[must_use]
    pub fn with_cache_policy(mut self, policy: CachePolicy) -> Self {
        self.cache_policy = policy;
        self
    }

    /// Configured default cache policy.
    pub fn cache_policy(&self) -> CachePolicy {
        self.cache_policy
    }

    /// Configured rendering context.
    pub fn context(&self) -> Option<&str> {
        self.context.as_deref()
    }

    /// Configured tags, in scan order.
    pub fn allowed_tags(&self) -> &[String] {
        &self.allowed_tags
    }

    /// Configured theme name.
    pub fn theme(&self) -> &str {
        &self.theme
    }

    /// Render markdown to HTML through the remote API.
    ///
    /// Performs exactly one request. Statuses outside `[200, 300)` fail with
    /// [`RenderError::Remote`] carrying the status and body.
    pub fn render(&self, content: &str) -> Result<String, RenderError> {
        let shield = TagShield::new(self.allowed_tags.as_slice())?;

        let request = RenderRequest {
            text: shield.shield(content),
            auth_token: self.token.clone(),
        };
        let result = self.gateway.post(&request)?;

        if !result.is_success() {
            warn!("Markdown API returned {}", result.status);
            return Err(RenderError::Remote {
                status: result.status,
                body: result.body,
            });
        }

        Ok(shield.unshield(&result.body)?)
    }

    /// Render through the cache, keyed by the content fingerprint.
    ///
    /// Errors are returned without being cached.
    pub fn render_cached(&self, content: &str, policy: CachePolicy) -> Result<String, RenderError> {
        let key = fingerprint(content);
        let produce = || self.render(content);

        match policy {
            CachePolicy::Forever => self.cache.remember_forever(&key, produce),
            CachePolicy::Ttl(ttl) => self.cache.remember(&key, ttl, produce),
        }
    }

    /// Render through the cache using the configured default policy.
    pub fn render_cached_default(&self, content: &str) -> Result<String, RenderError> {
        self.render_cached(content, self.cache_policy)
    }

    /// Render with a caller-supplied memoize strategy.
    ///
    /// `strategy` receives a producer that renders `content` and decides
    /// itself whether and when to call it.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let html = gitdown.render_with("# Hi", |render| my_cache.get_or_try_insert("hi", render))?;
    /// ```
    pub fn render_with<F>(&self, content: &str, strategy: F) -> Result<String, RenderError>
    where
        F: FnOnce(&dyn Fn() -> Result<String, RenderError>) -> Result<String, RenderError>,
    {
        strategy(&|| self.render(content))
    }

    /// Stylesheet for the configured theme.
    pub fn styles(&self) -> Result<Cow<'static, str>, RenderError> {
        let css = match &self.assets_dir {
            Some(dir) => Cow::Owned(gitdown_assets::stylesheet_in(dir, &self.theme)?),
            None => gitdown_assets::stylesheet(&self.theme)?,
        };
        Ok(css)
    }
}
