//! Request classification.
//!
//! # Responsibilities
//! - Store compiled rules in declaration order
//! - Classify a request path into DynamicEntity / DataDocument / NoMatch
//! - Resolve the rule for a page-data request from its `Referer`
//! - Extract the entity identifier from a page path
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - O(n) scan over rules; first match wins
//! - Trailing slash is normalized before matching so `/a/b` and `/a/b/` agree

use std::borrow::Cow;

use percent_encoding::percent_decode_str;
use url::Url;

use crate::config::schema::RuleConfig;
use crate::routing::matcher::{is_data_document, PatternRule, RuleError};

/// What kind of request the proxy is handling.
#[derive(Debug, Clone, Copy)]
pub enum RequestShape<'a> {
    /// An HTML page for an entity bound to a metadata rule.
    DynamicEntity(&'a PatternRule),
    /// A page-data JSON document; the rule comes from the `Referer`.
    DataDocument,
    /// Anything else; rewritten with default metadata.
    NoMatch,
}

impl RequestShape<'_> {
    /// Short label for logs and metrics.
    pub fn label(&self) -> &'static str {
        match self {
            RequestShape::DynamicEntity(_) => "dynamic_entity",
            RequestShape::DataDocument => "data_document",
            RequestShape::NoMatch => "no_match",
        }
    }
}

/// Result of classifying a request path.
#[derive(Debug, Clone, Copy)]
pub struct Classification<'a> {
    pub rule: Option<&'a PatternRule>,
    pub is_data_document: bool,
}

impl<'a> Classification<'a> {
    /// Collapse the classification into the branch the proxy takes.
    /// A data document is never treated as an entity page.
    pub fn shape(&self) -> RequestShape<'a> {
        match (self.is_data_document, self.rule) {
            (true, _) => RequestShape::DataDocument,
            (false, Some(rule)) => RequestShape::DynamicEntity(rule),
            (false, None) => RequestShape::NoMatch,
        }
    }
}

/// Ordered list of compiled rules.
#[derive(Debug, Clone, Default)]
pub struct Classifier {
    rules: Vec<PatternRule>,
}

impl Classifier {
    /// Compile the configured rules, preserving order.
    pub fn from_config(rules: &[RuleConfig]) -> Result<Self, RuleError> {
        let rules = rules
            .iter()
            .map(PatternRule::compile)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { rules })
    }

    /// The compiled rules.
    pub fn rules(&self) -> &[PatternRule] {
        &self.rules
    }

    /// First rule matching the slash-normalized path.
    pub fn match_path(&self, path: &str) -> Option<&PatternRule> {
        let normalized = normalize_path(path);
        self.rules.iter().find(|rule| rule.matches(&normalized))
    }

    /// Classify a request path.
    pub fn classify(&self, path: &str) -> Classification<'_> {
        Classification {
            rule: self.match_path(path),
            is_data_document: is_data_document(path),
        }
    }

    /// Resolve the rule for the page a data document belongs to.
    ///
    /// Returns the matched rule and the referring page path.
    pub fn classify_referer(&self, referer: &str) -> Option<(&PatternRule, String)> {
        let path = referer_path(referer)?;
        let rule = self.match_path(&path)?;
        Some((rule, path))
    }
}

/// Ensure the path ends with a slash.
pub fn normalize_path(path: &str) -> Cow<'_, str> {
    if path.ends_with('/') {
        Cow::Borrowed(path)
    } else {
        Cow::Owned(format!("{path}/"))
    }
}

/// Last non-empty path segment after stripping one trailing slash,
/// percent-decoded. Segments that are not valid UTF-8 once decoded are
/// returned as they appear in the path.
pub fn entity_identifier(path: &str) -> Option<Cow<'_, str>> {
    let trimmed = path.strip_suffix('/').unwrap_or(path);
    let segment = trimmed.rsplit('/').next().filter(|segment| !segment.is_empty())?;
    Some(
        percent_decode_str(segment)
            .decode_utf8()
            .unwrap_or(Cow::Borrowed(segment)),
    )
}

/// Path component of a `Referer` value. Bare paths are accepted as-is.
pub fn referer_path(referer: &str) -> Option<String> {
    let referer = referer.trim();
    if referer.is_empty() {
        return None;
    }
    if referer.starts_with('/') {
        return Some(referer.to_string());
    }
    Url::parse(referer).ok().map(|url| url.path().to_string())
}
