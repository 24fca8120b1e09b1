//! Maps request targets onto files beneath the document root.
//!
//! An origin-form target is taken as-is up to its query or fragment, so the
//! lookup is the root followed by exactly the path the client sent. Only
//! absolute-form targets go through a URL parse. The path is then
//! percent-decoded and walked segment by segment; a `..` may only undo a
//! segment it follows, so nothing outside the root is ever handed to the
//! filesystem.

use std::borrow::Cow;
use std::path::{Component, Path, PathBuf};

use percent_encoding::percent_decode_str;
use url::Url;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolveError {
    #[error("request target `{0}' is not a valid path")]
    InvalidTarget(String),
    #[error("decoded path is not valid UTF-8")]
    NotUtf8,
    #[error("path contains a NUL byte")]
    NulByte,
    #[error("path `{0}' escapes the document root")]
    Traversal(String),
}

#[derive(Debug, Clone)]
pub struct PathResolver {
    root: PathBuf,
    index: String,
}

impl PathResolver {
    pub fn new(root: impl Into<PathBuf>, index: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            index: index.into(),
        }
    }

    /// Resolves a raw request target to a path under the root.
    ///
    /// A path ending in `/` gets the index document appended.
    pub fn resolve(&self, target: &str) -> Result<PathBuf, ResolveError> {
        let decoded = decoded_path(target)?;

        let mut segments: Vec<&str> = Vec::new();
        for segment in decoded.split('/') {
            match segment {
                "" | "." => {}
                ".." => {
                    if segments.pop().is_none() {
                        return Err(ResolveError::Traversal(decoded.clone()));
                    }
                }
                segment if is_plain_component(segment) => segments.push(segment),
                _ => return Err(ResolveError::Traversal(decoded.clone())),
            }
        }

        let mut resolved = self.root.clone();
        resolved.extend(segments);
        if decoded.ends_with('/') {
            resolved.push(&self.index);
        }

        if !resolved.starts_with(&self.root) {
            return Err(ResolveError::Traversal(decoded));
        }

        Ok(resolved)
    }
}

/// Percent-decoded path component of `target`, query and fragment removed.
///
/// Malformed escapes are kept literally.
pub fn decoded_path(target: &str) -> Result<String, ResolveError> {
    let bytes: Vec<u8> = percent_decode_str(&request_path(target)?).collect();
    if bytes.contains(&0) {
        return Err(ResolveError::NulByte);
    }
    String::from_utf8(bytes).map_err(|_| ResolveError::NotUtf8)
}

fn request_path(target: &str) -> Result<Cow<'_, str>, ResolveError> {
    if target.starts_with('/') {
        let end = target.find(['?', '#']).unwrap_or(target.len());
        return Ok(Cow::Borrowed(&target[..end]));
    }

    // absolute-form, e.g. `GET http://host/x HTTP/1.1`
    let invalid = || ResolveError::InvalidTarget(target.to_string());
    let url = Url::parse(target).map_err(|_| invalid())?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid());
    }
    Ok(Cow::Owned(url.path().to_string()))
}

fn is_plain_component(segment: &str) -> bool {
    let mut components = Path::new(segment).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decoded_path_cases() {
        let cases = &[
            ("/", Some("/")),
            ("/a%20b.txt", Some("/a b.txt")),
            ("/abc/../def", Some("/abc/../def")),
            ("//assets/app.js", Some("//assets/app.js")),
            ("/a\\b.txt", Some("/a\\b.txt")),
            ("/%2e%2e/secret", Some("/../secret")),
            ("/x?q=1#frag", Some("/x")),
            ("http://other.host/y/", Some("/y/")),
            ("/bad%zz", Some("/bad%zz")),
            ("*", None),
            ("/nul%00byte", None),
            ("/%ff%fe", None),
        ];
        for (target, expected) in cases {
            assert_eq!(
                decoded_path(target).ok().as_deref(),
                *expected,
                "target {target}"
            );
        }
    }
}
