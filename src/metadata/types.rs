//! Metadata values and defaulting rules.

use serde::{Deserialize, Serialize};

use crate::config::schema::{ContentKind, DefaultsConfig};

/// Per-request page metadata. Every text field is non-empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Metadata {
    pub title: String,
    pub description: String,
    pub keywords: String,
    pub image: String,
    /// Kind of the entity, taken from the matched rule.
    pub kind: Option<ContentKind>,
    /// Event start date as delivered by the API.
    pub start_date: Option<String>,
}

/// Raw record returned by the metadata API. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct MetadataRecord {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub keywords: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default, alias = "startDate")]
    pub start_date: Option<String>,
}

impl MetadataRecord {
    /// True when no field carries a usable value.
    pub fn is_empty(&self) -> bool {
        [
            &self.title,
            &self.description,
            &self.keywords,
            &self.image,
            &self.start_date,
        ]
        .iter()
        .all(|field| non_blank(field).is_none())
    }
}

/// Site-wide fallback metadata. Immutable after startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefaultMetadata {
    pub title: String,
    pub description: String,
    pub keywords: String,
    pub image: String,
    pub site_name: String,
}

impl From<&DefaultsConfig> for DefaultMetadata {
    fn from(config: &DefaultsConfig) -> Self {
        Self {
            title: config.title.clone(),
            description: config.description.clone(),
            keywords: config.keywords.clone(),
            image: config.image.clone(),
            site_name: config.site_name.clone(),
        }
    }
}

impl Default for DefaultMetadata {
    fn default() -> Self {
        Self::from(&DefaultsConfig::default())
    }
}

impl DefaultMetadata {
    /// The defaults as page metadata, without an entity kind.
    pub fn metadata(&self) -> Metadata {
        self.for_kind(None)
    }

    /// The defaults tagged with the kind of the rule that was matched.
    pub fn for_kind(&self, kind: Option<ContentKind>) -> Metadata {
        Metadata {
            title: self.title.clone(),
            description: self.description.clone(),
            keywords: self.keywords.clone(),
            image: self.image.clone(),
            kind,
            start_date: None,
        }
    }

    /// Overlay a fetched record on the defaults. Blank values count as absent.
    pub fn merge(&self, record: MetadataRecord, kind: Option<ContentKind>) -> Metadata {
        Metadata {
            title: non_blank(&record.title).unwrap_or(&self.title).to_string(),
            description: non_blank(&record.description)
                .unwrap_or(&self.description)
                .to_string(),
            keywords: non_blank(&record.keywords).unwrap_or(&self.keywords).to_string(),
            image: non_blank(&record.image).unwrap_or(&self.image).to_string(),
            kind,
            start_date: non_blank(&record.start_date).map(str::to_string),
        }
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_keeps_defaults_for_missing_fields() {
        let defaults = DefaultMetadata::default();
        let record = MetadataRecord {
            title: Some("Acme".into()),
            description: Some("   ".into()),
            keywords: None,
            image: Some("https://cdn.example.com/acme.png".into()),
            start_date: None,
        };

        let merged = defaults.merge(record, Some(ContentKind::Business));
        assert_eq!(merged.title, "Acme");
        assert_eq!(merged.description, defaults.description);
        assert_eq!(merged.keywords, defaults.keywords);
        assert_eq!(merged.image, "https://cdn.example.com/acme.png");
        assert_eq!(merged.kind, Some(ContentKind::Business));
    }

    #[test]
    fn test_record_accepts_camel_case_start_date() {
        let record: MetadataRecord =
            serde_json::from_str(r#"{"title":"Festa","startDate":"2026-06-24T19:00:00Z"}"#).unwrap();
        assert_eq!(record.start_date.as_deref(), Some("2026-06-24T19:00:00Z"));
        assert!(!record.is_empty());
    }

    #[test]
    fn test_blank_record_is_empty() {
        let record: MetadataRecord = serde_json::from_str(r#"{"title":"","image":null}"#).unwrap();
        assert!(record.is_empty());
    }
}
