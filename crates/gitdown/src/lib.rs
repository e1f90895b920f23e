//! Markdown rendering through the GitHub markdown API.
//!
//! The crate is a thin client around a remote renderer, with two additions:
//! - [`shield`]: selected tags are encoded before the call and restored after,
//!   so custom elements survive the renderer's sanitizer untouched
//! - [`GitDown::render_cached`]: results are memoized in a
//!   [`gitdown_cache::CacheBucket`] keyed by a SHA-1 of the content
//!
//! # Architecture
//!
//! - [`client`]: [`Gateway`] trait and the `ureq`-based [`HttpGateway`]
//! - [`shield`]: [`TagShield`] encoding and decoding of allowed tags
//! - [`renderer`]: [`GitDown`] orchestrating shield, gateway and cache
//!
//! # Example
//!
//! ```ignore
//! use gitdown::GitDown;
//!
//! let html = GitDown::new()
//!     .with_allowed_tags(["x-counter"])
//!     .render("# Counter\n\n<x-counter start=\"3\"/>")?;
//! ```

pub mod client;
mod error;
mod key;
pub mod renderer;
pub mod shield;

pub use client::{Gateway, HttpGateway, RenderRequest, RenderResult};
pub use error::{RenderError, ShieldError};
pub use key::fingerprint;
pub use renderer::{CachePolicy, GitDown};
pub use shield::TagShield;
