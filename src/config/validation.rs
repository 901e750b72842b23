//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Compile every rule pattern once to surface regex errors at startup
//! - Check URLs (origin base, metadata endpoints, storage base)
//! - Reject empty default metadata fields
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ProxyConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::collections::HashSet;
use std::net::SocketAddr;

use regex::Regex;
use thiserror::Error;
use url::Url;

use crate::config::schema::ProxyConfig;
use crate::routing::matcher::EndpointTemplate;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("invalid bind address '{0}'")]
    BindAddress(String),

    #[error("invalid origin domain_source '{0}'")]
    DomainSource(String),

    #[error("invalid origin public_url '{0}'")]
    PublicUrl(String),

    #[error("bypass_header '{0}' is not a valid header name")]
    BypassHeader(String),

    #[error("invalid storage_base '{0}'")]
    StorageBase(String),

    #[error("default metadata field '{0}' is empty")]
    EmptyDefault(&'static str),

    #[error("rule '{name}': invalid pattern: {reason}")]
    Pattern { name: String, reason: String },

    #[error("rule '{name}': invalid metadata_endpoint '{endpoint}'")]
    Endpoint { name: String, endpoint: String },

    #[error("duplicate rule name '{0}'")]
    DuplicateRule(String),
}

/// Validate the full configuration, collecting every error.
pub fn validate_config(config: &ProxyConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::BindAddress(config.listener.bind_address.clone()));
    }

    match Url::parse(&config.origin.domain_source) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => {}
        _ => errors.push(ValidationError::DomainSource(config.origin.domain_source.clone())),
    }

    if let Some(public_url) = &config.origin.public_url {
        match Url::parse(public_url) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => {}
            _ => errors.push(ValidationError::PublicUrl(public_url.clone())),
        }
    }

    if axum::http::HeaderName::from_bytes(config.origin.bypass_header.as_bytes()).is_err() {
        errors.push(ValidationError::BypassHeader(config.origin.bypass_header.clone()));
    }

    if Url::parse(&config.metadata_api.storage_base).is_err() {
        errors.push(ValidationError::StorageBase(config.metadata_api.storage_base.clone()));
    }

    let defaults = &config.defaults;
    for (field, value) in [
        ("title", &defaults.title),
        ("description", &defaults.description),
        ("keywords", &defaults.keywords),
        ("image", &defaults.image),
        ("site_name", &defaults.site_name),
    ] {
        if value.trim().is_empty() {
            errors.push(ValidationError::EmptyDefault(field));
        }
    }

    let mut seen = HashSet::new();
    for rule in &config.rules {
        if !seen.insert(rule.name.as_str()) {
            errors.push(ValidationError::DuplicateRule(rule.name.clone()));
        }

        if let Err(e) = Regex::new(&rule.pattern) {
            errors.push(ValidationError::Pattern {
                name: rule.name.clone(),
                reason: e.to_string(),
            });
        }

        if EndpointTemplate::parse(&rule.metadata_endpoint).is_none() {
            errors.push(ValidationError::Endpoint {
                name: rule.name.clone(),
                endpoint: rule.metadata_endpoint.clone(),
            });
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::{ContentKind, RuleConfig};

    fn rule(name: &str, pattern: &str, endpoint: &str) -> RuleConfig {
        RuleConfig {
            name: name.into(),
            pattern: pattern.into(),
            metadata_endpoint: endpoint.into(),
            kind: ContentKind::Business,
            image_folder: None,
            select: None,
        }
    }

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&ProxyConfig::default()).is_ok());
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = ProxyConfig::default();
        config.listener.bind_address = "not-an-address".into();
        config.origin.domain_source = "ftp://origin".into();
        config.origin.public_url = Some("www.griiingo.com".into());
        config.defaults.title = "  ".into();
        config.rules = vec![
            rule("a", "/a/[^/]+", "https://api.example.com/a"),
            rule("a", "/b/(", "not a url"),
        ];

        let errors = validate_config(&config).unwrap_err();
        assert!(errors.contains(&ValidationError::BindAddress("not-an-address".into())));
        assert!(errors.contains(&ValidationError::DomainSource("ftp://origin".into())));
        assert!(errors.contains(&ValidationError::PublicUrl("www.griiingo.com".into())));
        assert!(errors.contains(&ValidationError::EmptyDefault("title")));
        assert!(errors.contains(&ValidationError::DuplicateRule("a".into())));
        assert!(errors.iter().any(|e| matches!(e, ValidationError::Pattern { .. })));
        assert!(errors.iter().any(|e| matches!(e, ValidationError::Endpoint { .. })));
    }

    #[test]
    fn test_placeholder_endpoint_is_accepted() {
        let mut config = ProxyConfig::default();
        config.rules = vec![rule(
            "company",
            "/empresa/[^/]+",
            "https://api.example.com/rest/v1/companies/{slug}",
        )];
        assert!(validate_config(&config).is_ok());
    }
}
