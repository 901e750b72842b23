//! Rule matching logic.
//!
//! # Responsibilities
//! - Compile a `RuleConfig` into a `PatternRule` (regex + endpoint template)
//! - Test a slash-terminated path against a rule
//! - Detect the page-data document path shape
//!
//! # Design Decisions
//! - Patterns are unanchored, like the deployed rule list expects
//! - Endpoint shape (placeholder vs. slug filter) is decided once at compile time

use std::sync::LazyLock;

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use regex::{NoExpand, Regex};
use thiserror::Error;
use url::Url;

use crate::config::schema::{ContentKind, RuleConfig};

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{[^}]+\}").expect("placeholder regex"));

/// Everything but RFC 3986 unreserved characters, so a substituted
/// identifier stays a single path segment or query value.
const IDENTIFIER: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

static DATA_DOCUMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/public/data/[a-f0-9-]{36}\.json").expect("data document regex"));

/// Error compiling a rule from configuration.
#[derive(Debug, Error)]
pub enum RuleError {
    #[error("rule '{name}': {source}")]
    Pattern {
        name: String,
        #[source]
        source: regex::Error,
    },

    #[error("rule '{name}': invalid metadata endpoint '{endpoint}'")]
    Endpoint { name: String, endpoint: String },
}

/// How the entity identifier is placed into a metadata endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EndpointTemplate {
    /// The template contains a `{...}` token replaced by the identifier.
    Placeholder(String),
    /// A `slug=eq.<id>` filter and column selection are appended as query pairs.
    SlugFilter(Url),
}

impl EndpointTemplate {
    /// Parse a template string. Returns `None` when no valid URL can be produced from it.
    pub fn parse(template: &str) -> Option<Self> {
        if PLACEHOLDER.is_match(template) {
            let sample = PLACEHOLDER.replace(template, "sample");
            Url::parse(&sample).ok()?;
            Some(Self::Placeholder(template.to_string()))
        } else {
            Url::parse(template).ok().map(Self::SlugFilter)
        }
    }

    /// Build the concrete endpoint URL for a decoded `identifier`.
    ///
    /// The identifier is percent-encoded exactly once on the way out.
    pub fn resolve(&self, identifier: &str, select: &str) -> Result<Url, url::ParseError> {
        match self {
            Self::Placeholder(template) => {
                let encoded = utf8_percent_encode(identifier, IDENTIFIER).to_string();
                Url::parse(&PLACEHOLDER.replace(template, NoExpand(&encoded)))
            }
            Self::SlugFilter(base) => {
                let mut url = base.clone();
                {
                    let mut pairs = url.query_pairs_mut();
                    pairs.append_pair("slug", &format!("eq.{identifier}"));
                    if !select.is_empty() {
                        pairs.append_pair("select", select);
                    }
                }
                Ok(url)
            }
        }
    }
}

/// A compiled dynamic-entity rule.
#[derive(Debug, Clone)]
pub struct PatternRule {
    /// Rule identifier for logging/metrics.
    pub name: String,
    pattern: Regex,
    /// Metadata endpoint the entity is looked up in.
    pub endpoint: EndpointTemplate,
    /// Kind of entity the rule describes.
    pub kind: ContentKind,
    /// Storage folder for bare image identifiers.
    pub image_folder: String,
    /// Column list override for slug-filter endpoints.
    pub select: Option<String>,
}

impl PatternRule {
    /// Compile a rule from its configuration entry.
    pub fn compile(config: &RuleConfig) -> Result<Self, RuleError> {
        let pattern = Regex::new(&config.pattern).map_err(|source| RuleError::Pattern {
            name: config.name.clone(),
            source,
        })?;

        let endpoint =
            EndpointTemplate::parse(&config.metadata_endpoint).ok_or_else(|| RuleError::Endpoint {
                name: config.name.clone(),
                endpoint: config.metadata_endpoint.clone(),
            })?;

        let image_folder = config
            .image_folder
            .clone()
            .unwrap_or_else(|| config.kind.default_image_folder().to_string());

        Ok(Self {
            name: config.name.clone(),
            pattern,
            endpoint,
            kind: config.kind,
            image_folder,
            select: config.select.clone().filter(|s| !s.trim().is_empty()),
        })
    }

    /// Returns true if the (slash-terminated) path matches this rule.
    pub fn matches(&self, path: &str) -> bool {
        self.pattern.is_match(path)
    }

    /// The source pattern.
    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }
}

/// Returns true if `path` has the page-data document shape
/// (`/public/data/<uuid>.json`).
pub fn is_data_document(path: &str) -> bool {
    DATA_DOCUMENT.is_match(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule_config(pattern: &str, endpoint: &str, kind: ContentKind) -> RuleConfig {
        RuleConfig {
            name: "r".into(),
            pattern: pattern.into(),
            metadata_endpoint: endpoint.into(),
            kind,
            image_folder: None,
            select: None,
        }
    }

    #[test]
    fn test_slug_filter_endpoint() {
        let template =
            EndpointTemplate::parse("https://api.griiingo.com/rest/v1/companies_metadata").unwrap();
        let url = template.resolve("acme-corp", "title,image").unwrap();
        assert_eq!(
            url.as_str(),
            "https://api.griiingo.com/rest/v1/companies_metadata?slug=eq.acme-corp&select=title%2Cimage"
        );
    }

    #[test]
    fn test_slug_filter_without_select() {
        let template = EndpointTemplate::parse("http://localhost/rest/v1/events").unwrap();
        let url = template.resolve("festa", "").unwrap();
        assert_eq!(url.query(), Some("slug=eq.festa"));
    }

    #[test]
    fn test_placeholder_endpoint() {
        let template =
            EndpointTemplate::parse("https://api.example.com/meta/{slug}/source").unwrap();
        assert!(matches!(template, EndpointTemplate::Placeholder(_)));
        let url = template.resolve("acme$1", "ignored").unwrap();
        assert_eq!(url.as_str(), "https://api.example.com/meta/acme%241/source");
    }

    #[test]
    fn test_placeholder_keeps_identifier_in_one_query_value() {
        let template =
            EndpointTemplate::parse("https://api.example.com/rest/v1/jobs_metadata?id=eq.{id}").unwrap();
        let url = template.resolve("a&select=x", "").unwrap();

        assert_eq!(url.query(), Some("id=eq.a%26select%3Dx"));
        let pairs: Vec<_> = url.query_pairs().collect();
        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs[0].1, "eq.a&select=x");
    }

    #[test]
    fn test_non_ascii_identifier_is_encoded_once() {
        let slug = EndpointTemplate::parse("https://api.example.com/rest/v1/companies").unwrap();
        let url = slug.resolve("café-são-paulo", "").unwrap();
        assert_eq!(url.query(), Some("slug=eq.caf%C3%A9-s%C3%A3o-paulo"));
        assert_eq!(url.query_pairs().next().unwrap().1, "eq.café-são-paulo");

        let placeholder = EndpointTemplate::parse("https://api.example.com/meta/{slug}").unwrap();
        let url = placeholder.resolve("café", "").unwrap();
        assert_eq!(url.path(), "/meta/caf%C3%A9");
    }

    #[test]
    fn test_rule_select_override() {
        let mut config = rule_config("/evento/[^/]+", "https://api.example.com/events", ContentKind::Event);
        config.select = Some("title,start_date".into());
        assert_eq!(PatternRule::compile(&config).unwrap().select.as_deref(), Some("title,start_date"));

        config.select = Some("  ".into());
        assert_eq!(PatternRule::compile(&config).unwrap().select, None);
    }

    #[test]
    fn test_invalid_endpoint() {
        assert!(EndpointTemplate::parse("not a url").is_none());
        assert!(EndpointTemplate::parse("{host}/meta").is_none());
    }

    #[test]
    fn test_image_folder_defaults_from_kind() {
        let rule = PatternRule::compile(&rule_config(
            "/evento/[^/]+",
            "https://api.example.com/events",
            ContentKind::Event,
        ))
        .unwrap();
        assert_eq!(rule.image_folder, "events-photos");
        assert!(rule.matches("/evento/festa-junina/"));
        assert!(!rule.matches("/evento/"));
    }

    #[test]
    fn test_data_document_shape() {
        assert!(is_data_document(
            "/public/data/3f2c1a9e-8b7d-4c6e-9f01-a2b3c4d5e6f7.json"
        ));
        assert!(is_data_document(
            "/app/public/data/3f2c1a9e-8b7d-4c6e-9f01-a2b3c4d5e6f7.json"
        ));
        assert!(!is_data_document("/public/data/short.json"));
        assert!(!is_data_document(
            "/public/data/3F2C1A9E-8B7D-4C6E-9F01-A2B3C4D5E6F7.json"
        ));
        assert!(!is_data_document("/empresa/acme-corp/"));
    }
}
