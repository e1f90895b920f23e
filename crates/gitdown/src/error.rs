//! Error types for markdown rendering.

use std::string::FromUtf8Error;

use gitdown_assets::AssetError;

/// Error while shielding or restoring protected tags.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ShieldError {
    /// Tag pattern could not be compiled.
    #[error("invalid pattern for tag '{tag}'")]
    Pattern {
        /// Tag name the pattern was built from.
        tag: String,
        /// Underlying regex error.
        #[source]
        source: regex::Error,
    },

    /// Token payload is not valid base64.
    #[error("malformed base64 in [{tag}] token")]
    Base64 {
        /// Tag whose token failed to decode.
        tag: String,
        /// Underlying decode error.
        #[source]
        source: base64::DecodeError,
    },

    /// Token payload decodes to invalid UTF-8.
    #[error("[{tag}] token does not decode to UTF-8")]
    Utf8 {
        /// Tag whose token failed to decode.
        tag: String,
        /// Underlying UTF-8 error.
        #[source]
        source: FromUtf8Error,
    },
}

/// Error from rendering operations.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    /// HTTP request failed (network error, timeout, etc).
    #[error("HTTP request failed")]
    Http(#[from] ureq::Error),

    /// Rendering API returned a non-2xx status.
    #[error("GitHub API error: {status} - {body}")]
    Remote {
        /// HTTP status code.
        status: u16,
        /// Response body (may contain error details).
        body: String,
    },

    /// Shielding or restoring tags failed.
    #[error("tag shield error")]
    Shield(#[from] ShieldError),

    /// Theme stylesheet could not be loaded.
    #[error("stylesheet error")]
    Asset(#[from] AssetError),
}
