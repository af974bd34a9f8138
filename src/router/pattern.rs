use std::collections::HashSet;

use crate::{error::RouteError, router::scope::ParamBindings};

/// Marker that turns the final literal of a pattern into a prefix match.
pub const WILDCARD_MARKER: &str = "...";

/// SegmentSpec
///
/// One compiled piece of a route pattern. Built once at registration and
/// never touched again.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SegmentSpec {
    /// Must equal the request segment exactly.
    Literal(String),
    /// Captures the request segment under this name (`:name`).
    Named(String),
    /// `prefix...`: a request segment starting with `prefix` matches the whole route.
    TrailingWildcard(String),
}

/// split_path
///
/// Trims every leading and trailing `/` and splits the remainder on `/`.
/// The root path yields a single empty segment, exactly like a `/` pattern does.
pub fn split_path(path: &str) -> Vec<&str> {
    path.trim_matches('/').split('/').collect()
}

/// Pattern
///
/// A compiled route pattern: its segments plus the flag deciding whether extra
/// trailing request segments may be left unmatched.
#[derive(Debug, Clone)]
pub struct Pattern {
    raw: String,
    segments: Vec<SegmentSpec>,
    prefix: bool,
}

impl Pattern {
    /// parse
    ///
    /// Compiles `raw` into segments. A pattern starting with `/` or ending with
    /// the wildcard marker is prefix-flagged.
    ///
    /// # Errors
    /// Rejects `:` with no name, a wildcard marker on a parameter, and the same
    /// parameter name used twice.
    pub fn parse(raw: &str) -> Result<Self, RouteError> {
        let invalid = |reason: &'static str| RouteError::InvalidPattern {
            pattern: raw.to_string(),
            reason,
        };

        let mut seen = HashSet::new();
        let mut segments = Vec::new();

        for segment in split_path(raw) {
            let spec = match segment.strip_prefix(':') {
                Some(name) => {
                    if name.is_empty() {
                        return Err(invalid("parameter name is empty"));
                    }
                    if name.ends_with(WILDCARD_MARKER) {
                        return Err(invalid("wildcard marker cannot follow a parameter"));
                    }
                    if !seen.insert(name) {
                        return Err(invalid("parameter name is used twice"));
                    }
                    SegmentSpec::Named(name.to_string())
                }
                None => match segment.strip_suffix(WILDCARD_MARKER) {
                    Some(prefix) => SegmentSpec::TrailingWildcard(prefix.to_string()),
                    None => SegmentSpec::Literal(segment.to_string()),
                },
            };
            segments.push(spec);
        }

        Ok(Self {
            raw: raw.to_string(),
            segments,
            prefix: raw.starts_with('/') || raw.ends_with(WILDCARD_MARKER),
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn segments(&self) -> &[SegmentSpec] {
        &self.segments
    }

    pub fn is_prefix(&self) -> bool {
        self.prefix
    }

    /// matches
    ///
    /// Compares this pattern against already-split request segments and returns
    /// the captured parameters on success.
    ///
    /// A trailing wildcard ends the walk as soon as its prefix matches, so any
    /// segments declared after it are never compared.
    pub fn matches(&self, request: &[&str]) -> Option<ParamBindings> {
        if request.len() > self.segments.len() && !self.prefix {
            return None;
        }

        let mut params = ParamBindings::default();
        for (i, spec) in self.segments.iter().enumerate() {
            let actual = *request.get(i)?;
            match spec {
                SegmentSpec::TrailingWildcard(prefix) => {
                    return actual.starts_with(prefix.as_str()).then_some(params);
                }
                SegmentSpec::Literal(expected) => {
                    if expected.as_str() != actual {
                        return None;
                    }
                }
                SegmentSpec::Named(name) => params.bind(name, actual),
            }
        }
        Some(params)
    }
}
