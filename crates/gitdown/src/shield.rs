//! Tag shielding around the remote renderer.
//!
//! The remote renderer sanitizes or rewrites markup it does not know. Before
//! content is sent, every element of an allowed tag is swapped for an opaque
//! token:
//!
//! ```text
//! <custom>data</custom>  ->  [custom]PGN1c3RvbT5kYXRhPC9jdXN0b20+[endcustom]
//! ```
//!
//! After rendering, tokens are decoded back to the original markup.
//!
//! Matching is single-level: an element matches either as self-closing
//! (`<tag .../>`) or as an open/close pair whose content holds no `<`.
//! Nested elements of the same tag are left alone. Replacement is textual,
//! so identical fragments always become identical tokens.
//!
//! `unshield(shield(x))` restores `x` as long as no shielded element nests
//! another of its tag and no decoded fragment contains a `[tag]`/`[endtag]`
//! delimiter. This is a precondition and is not checked.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use regex::Regex;

use crate::error::ShieldError;

/// Compiled patterns for one allowed tag.
#[derive(Debug)]
struct TagPattern {
    name: String,
    element: Regex,
    token: Regex,
}

impl TagPattern {
    fn new(name: &str) -> Result<Self, ShieldError> {
        let tag = regex::escape(name);
        let compile = |pattern: String| {
            Regex::new(&pattern).map_err(|source| ShieldError::Pattern {
                tag: name.to_owned(),
                source,
            })
        };

        Ok(Self {
            name: name.to_owned(),
            element: compile(format!(r"<{tag}[^>]*?(?:/>|>[^<]*?</{tag}>)"))?,
            token: compile(format!(r"\[{tag}\](.*?)\[end{tag}\]"))?,
        })
    }

    fn open(&self) -> String {
        format!("[{}]", self.name)
    }

    fn close(&self) -> String {
        format!("[end{}]", self.name)
    }
}

/// Shield for an ordered set of tag names.
///
/// Tags are processed in the order given, both when shielding and when
/// restoring.
#[derive(Debug, Default)]
pub struct TagShield {
    tags: Vec<TagPattern>,
}

impl TagShield {
    /// Compile patterns for `tags`.
    ///
    /// # Errors
    ///
    /// Returns [`ShieldError::Pattern`] if a tag produces an unusable pattern.
    pub fn new<S: AsRef<str>>(tags: &[S]) -> Result<Self, ShieldError> {
        let tags = tags
            .iter()
            .map(|tag| TagPattern::new(tag.as_ref()))
            .collect::<Result<_, _>>()?;
        Ok(Self { tags })
    }

    /// `true` when no tags are shielded.
    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    /// Replace every allowed element in `input` with its token.
    pub fn shield(&self, input: &str) -> String {
        let mut output = input.to_owned();

        for tag in &self.tags {
            let matches: Vec<String> = tag
                .element
                .find_iter(&output)
                .map(|m| m.as_str().to_owned())
                .collect();
            if matches.is_empty() {
                continue;
            }
            tracing::debug!(tag = %tag.name, count = matches.len(), "shielding elements");

            let (open, close) = (tag.open(), tag.close());
            for fragment in matches {
                let token = format!("{open}{}{close}", STANDARD.encode(&fragment));
                output = output.replace(&fragment, &token);
            }
        }

        output
    }

    /// Decode every token in `input` back to the markup it replaced.
    ///
    /// # Errors
    ///
    /// Returns [`ShieldError::Base64`] or [`ShieldError::Utf8`] when a token
    /// payload is malformed.
    pub fn unshield(&self, input: &str) -> Result<String, ShieldError> {
        let mut output = input.to_owned();

        for tag in &self.tags {
            let tokens: Vec<(String, String)> = tag
                .token
                .captures_iter(&output)
                .map(|caps| (caps[0].to_owned(), caps[1].to_owned()))
                .collect();
            if tokens.is_empty() {
                continue;
            }
            tracing::debug!(tag = %tag.name, count = tokens.len(), "restoring elements");

            for (token, payload) in tokens {
                let bytes = STANDARD
                    .decode(payload.as_bytes())
                    .map_err(|source| ShieldError::Base64 {
                        tag: tag.name.clone(),
                        source,
                    })?;
                let fragment = String::from_utf8(bytes).map_err(|source| ShieldError::Utf8 {
                    tag: tag.name.clone(),
                    source,
                })?;
                output = output.replace(&token, &fragment);
            }
        }

        Ok(output)
    }
}

/// Shield `input` for the given tags.
///
/// # Errors
///
/// Returns [`ShieldError::Pattern`] if a tag produces an unusable pattern.
pub fn shield<S: AsRef<str>>(input: &str, tags: &[S]) -> Result<String, ShieldError> {
    Ok(TagShield::new(tags)?.shield(input))
}

/// Restore tokens in `input` for the given tags.
///
/// # Errors
///
/// Returns a [`ShieldError`] if a pattern cannot be built or a token is malformed.
pub fn unshield<S: AsRef<str>>(input: &str, tags: &[S]) -> Result<String, ShieldError> {
    TagShield::new(tags)?.unshield(input)
}
