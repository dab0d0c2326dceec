//! Resource identifiers - parsing and canonical formatting of ARM IDs
//!
//! An ARM resource ID is a hierarchical path of the shape
//! `/subscriptions/{sub}/resourceGroups/{rg}/providers/{Namespace}/{type}/{name}...`
//! with further `{type}/{name}` pairs for nested resources. `ArmId` is the
//! shared segment cursor; each resource kind wraps it in a typed identifier
//! with `parse`, `parse_insensitively` and a canonical-casing `Display`.
//!
//! Parsing is all-or-nothing: every failure is a structured error carrying
//! the full input, and no partial identifier is ever returned.

pub mod event_grid;

use std::fmt;

/// How static segment names and type names are matched during parsing.
///
/// Strict parsing is used for user-supplied IDs; insensitive parsing only
/// when rewriting identifiers persisted by API versions with inconsistent
/// casing, normalizing to canonical case on output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaseMode {
    Strict,
    Insensitive,
}

impl CaseMode {
    fn matches(self, candidate: &str, canonical: &str) -> bool {
        match self {
            CaseMode::Strict => candidate == canonical,
            CaseMode::Insensitive => candidate.eq_ignore_ascii_case(canonical),
        }
    }
}

/// Identifier parse error
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdParseError {
    #[error("ID {input:?} is malformed: expected a leading '/'")]
    MissingLeadingSlash { input: String },

    #[error("ID {input:?} is malformed: missing the {segment:?} segment")]
    MissingSegment { input: String, segment: String },

    #[error("ID {input:?} contains an empty value for segment {segment:?}")]
    EmptySegment { input: String, segment: String },

    #[error("ID {input:?} has a trailing segment {segment:?} with no value")]
    UnbalancedSegments { input: String, segment: String },

    #[error("ID {input:?} has unexpected extra segments: {segments:?}")]
    TrailingSegments { input: String, segments: Vec<String> },

    #[error("ID {input:?} uses provider namespace {got:?}, expected {expected:?}")]
    WrongProvider {
        input: String,
        expected: String,
        got: String,
    },

    #[error("ID {input:?} does not contain the {marker:?} marker")]
    MissingMarker { input: String, marker: String },

    #[error("ID {input:?} has an empty scope prefix")]
    EmptyScope { input: String },
}

/// Segment cursor over a parsed ARM resource ID.
///
/// `parse` consumes the fixed `/subscriptions/{}/resourceGroups/{}/providers/{}`
/// prefix; the remaining `{type}/{name}` pairs are then drained with
/// [`ArmId::pop_segment`] and the cursor closed with [`ArmId::finish`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArmId {
    input: String,
    mode: CaseMode,
    pub subscription_id: String,
    pub resource_group: String,
    pub provider: String,
    segments: Vec<(String, String)>,
}

impl ArmId {
    pub fn parse(input: &str, mode: CaseMode) -> Result<Self, IdParseError> {
        let Some(trimmed) = input.strip_prefix('/') else {
            return Err(IdParseError::MissingLeadingSlash {
                input: input.to_string(),
            });
        };

        let mut parts = trimmed.trim_end_matches('/').split('/');

        let subscription_id = expect_pair(input, &mut parts, "subscriptions", mode)?;
        let resource_group = expect_pair(input, &mut parts, "resourceGroups", mode)?;
        let provider = expect_pair(input, &mut parts, "providers", mode)?;

        let mut segments = Vec::new();
        while let Some(key) = parts.next() {
            if key.is_empty() {
                return Err(IdParseError::EmptySegment {
                    input: input.to_string(),
                    segment: key.to_string(),
                });
            }
            let Some(value) = parts.next() else {
                return Err(IdParseError::UnbalancedSegments {
                    input: input.to_string(),
                    segment: key.to_string(),
                });
            };
            if value.is_empty() {
                return Err(IdParseError::EmptySegment {
                    input: input.to_string(),
                    segment: key.to_string(),
                });
            }
            segments.push((key.to_string(), value.to_string()));
        }

        Ok(Self {
            input: input.to_string(),
            mode,
            subscription_id,
            resource_group,
            provider,
            segments,
        })
    }

    /// Fail unless the provider namespace matches the expected one
    pub fn expect_provider(&self, namespace: &str) -> Result<(), IdParseError> {
        if self.mode.matches(&self.provider, namespace) {
            Ok(())
        } else {
            Err(IdParseError::WrongProvider {
                input: self.input.clone(),
                expected: namespace.to_string(),
                got: self.provider.clone(),
            })
        }
    }

    /// Consume the leftmost `{type}/{name}` pair whose type matches `name`
    /// and return the instance name. Matching honors the parse mode;
    /// a miss distinguishes "wrong resource kind" from a malformed ID.
    pub fn pop_segment(&mut self, name: &str) -> Result<String, IdParseError> {
        let Some(index) = self
            .segments
            .iter()
            .position(|(key, _)| self.mode.matches(key, name))
        else {
            return Err(IdParseError::MissingSegment {
                input: self.input.clone(),
                segment: name.to_string(),
            });
        };
        let (_, value) = self.segments.remove(index);
        Ok(value)
    }

    /// Fail if any `{type}/{name}` pairs remain unconsumed
    pub fn finish(&self) -> Result<(), IdParseError> {
        if self.segments.is_empty() {
            Ok(())
        } else {
            Err(IdParseError::TrailingSegments {
                input: self.input.clone(),
                segments: self.segments.iter().map(|(key, _)| key.clone()).collect(),
            })
        }
    }
}

fn expect_pair<'a>(
    input: &str,
    parts: &mut impl Iterator<Item = &'a str>,
    canonical: &str,
    mode: CaseMode,
) -> Result<String, IdParseError> {
    let Some(key) = parts.next() else {
        return Err(IdParseError::MissingSegment {
            input: input.to_string(),
            segment: canonical.to_string(),
        });
    };
    if !mode.matches(key, canonical) {
        return Err(IdParseError::MissingSegment {
            input: input.to_string(),
            segment: canonical.to_string(),
        });
    }
    let value = parts.next().unwrap_or("");
    if value.is_empty() {
        return Err(IdParseError::EmptySegment {
            input: input.to_string(),
            segment: canonical.to_string(),
        });
    }
    Ok(value.to_string())
}

/// Render the fixed ID prefix with canonical casing
pub(crate) fn format_prefix(
    f: &mut fmt::Formatter<'_>,
    subscription_id: &str,
    resource_group: &str,
    namespace: &str,
) -> fmt::Result {
    write!(
        f,
        "/subscriptions/{}/resourceGroups/{}/providers/{}",
        subscription_id, resource_group, namespace
    )
}
