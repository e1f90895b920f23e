//! Theme stylesheets for markdown rendered by GitDown.
//!
//! Every theme is a pre-built `styles-<theme>.css` file in this crate's
//! `dist/` directory. Two modes provide access to them:
//!
//! - **`embed` feature on**: Stylesheets are compiled into the binary via `rust-embed`
//! - **`embed` feature off**: Stylesheets are read from `dist/` at runtime
//!
//! [`stylesheet_in`] reads from an arbitrary directory for projects that
//! ship their own themes.

use std::borrow::Cow;
use std::io;
use std::path::Path;

/// Embedded stylesheets (only available with `embed` feature).
#[cfg(feature = "embed")]
#[derive(rust_embed::RustEmbed)]
#[folder = "dist"]
struct Stylesheets;

/// Directory holding the bundled stylesheets.
#[cfg(not(feature = "embed"))]
const DIST_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/dist");

const PREFIX: &str = "styles-";
const SUFFIX: &str = ".css";

/// Stylesheet lookup error.
#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    /// No stylesheet exists for the theme.
    #[error("stylesheet for theme '{theme}' not found")]
    NotFound {
        /// Requested theme name.
        theme: String,
    },

    /// The stylesheet exists but is not valid UTF-8.
    #[error("stylesheet for theme '{theme}' is not valid UTF-8")]
    InvalidUtf8 {
        /// Requested theme name.
        theme: String,
    },

    /// Any other I/O failure while reading the stylesheet.
    #[error("I/O error reading stylesheet")]
    Io(#[from] io::Error),
}

/// File name of the stylesheet for `theme` (`styles-<theme>.css`).
#[must_use]
pub fn file_name(theme: &str) -> String {
    format!("{PREFIX}{theme}{SUFFIX}")
}

/// Theme names must stay inside the assets directory.
fn is_valid_theme(theme: &str) -> bool {
    !theme.is_empty() && !theme.contains(['/', '\\']) && !theme.contains("..")
}

/// Get the bundled stylesheet for `theme`.
///
/// # Example
///
/// ```
/// let css = gitdown_assets::stylesheet("light").unwrap();
/// assert!(css.contains(".markdown-body"));
/// ```
#[cfg(feature = "embed")]
pub fn stylesheet(theme: &str) -> Result<Cow<'static, str>, AssetError> {
    let not_found = || AssetError::NotFound {
        theme: theme.to_owned(),
    };
    if !is_valid_theme(theme) {
        return Err(not_found());
    }

    let file = Stylesheets::get(&file_name(theme)).ok_or_else(not_found)?;
    let invalid = |_| AssetError::InvalidUtf8 {
        theme: theme.to_owned(),
    };
    match file.data {
        Cow::Borrowed(bytes) => std::str::from_utf8(bytes).map(Cow::Borrowed).map_err(invalid),
        Cow::Owned(bytes) => String::from_utf8(bytes)
            .map(Cow::Owned)
            .map_err(|e| invalid(e.utf8_error())),
    }
}

/// Get the bundled stylesheet for `theme`.
///
/// # Example
///
/// ```
/// let css = gitdown_assets::stylesheet("light").unwrap();
/// assert!(css.contains(".markdown-body"));
/// ```
#[cfg(not(feature = "embed"))]
pub fn stylesheet(theme: &str) -> Result<Cow<'static, str>, AssetError> {
    stylesheet_in(Path::new(DIST_DIR), theme).map(Cow::Owned)
}

/// Read `styles-<theme>.css` from `dir`.
pub fn stylesheet_in(dir: &Path, theme: &str) -> Result<String, AssetError> {
    if !is_valid_theme(theme) {
        return Err(AssetError::NotFound {
            theme: theme.to_owned(),
        });
    }

    let path = dir.join(file_name(theme));
    tracing::debug!("loading stylesheet {}", path.display());

    std::fs::read_to_string(&path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => AssetError::NotFound {
            theme: theme.to_owned(),
        },
        io::ErrorKind::InvalidData => AssetError::InvalidUtf8 {
            theme: theme.to_owned(),
        },
        _ => AssetError::Io(e),
    })
}
