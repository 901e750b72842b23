//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the proxy.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the SEO proxy.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ProxyConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Origin site the proxy sits in front of.
    pub origin: OriginConfig,

    /// Metadata REST API settings.
    pub metadata_api: MetadataApiConfig,

    /// Site-wide fallback metadata.
    pub defaults: DefaultsConfig,

    /// Dynamic entity rules, evaluated in declaration order.
    pub rules: Vec<RuleConfig>,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            listener: ListenerConfig::default(),
            origin: OriginConfig::default(),
            metadata_api: MetadataApiConfig::default(),
            defaults: DefaultsConfig::default(),
            rules: default_rules(),
            observability: ObservabilityConfig::default(),
        }
    }
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Origin site configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct OriginConfig {
    /// Base URL every origin fetch is issued against (no trailing slash).
    pub domain_source: String,

    /// Header marking a request as already proxied.
    pub bypass_header: String,

    /// Public base URL of the site, used for page URLs in structured data.
    /// Falls back to `domain_source`. Request headers are never trusted for this.
    pub public_url: Option<String>,

    /// Optional timeout for origin requests in seconds. Unset means the client default.
    pub timeout_secs: Option<u64>,
}

impl Default for OriginConfig {
    fn default() -> Self {
        Self {
            domain_source: "https://e3c412aa-5c74-4d02-b483-1802d4c8adc9.weweb-preview.io".to_string(),
            bypass_header: "X-Bypass-Worker".to_string(),
            public_url: None,
            timeout_secs: None,
        }
    }
}

/// Metadata API configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct MetadataApiConfig {
    /// Environment variable holding the API key.
    pub api_key_env: String,

    /// Inline API key. Takes precedence over `api_key_env` when set.
    pub api_key: Option<String>,

    /// Public storage base used to qualify bare image identifiers.
    pub storage_base: String,

    /// Column list requested from filter-style endpoints unless a rule
    /// names its own. Every column must exist on every table it is sent to.
    pub select: String,

    /// Optional timeout for metadata requests in seconds.
    pub timeout_secs: Option<u64>,
}

impl Default for MetadataApiConfig {
    fn default() -> Self {
        Self {
            api_key_env: "SUPABASE_KEY".to_string(),
            api_key: None,
            storage_base: "https://api.griiingo.com/storage/v1/object/public/public-user-content"
                .to_string(),
            select: "title,description,keywords,image".to_string(),
            timeout_secs: None,
        }
    }
}

impl MetadataApiConfig {
    /// Resolve the API key from config or environment. Empty if neither is set.
    pub fn resolve_api_key(&self) -> String {
        if let Some(key) = self.api_key.as_deref().filter(|k| !k.is_empty()) {
            return key.to_string();
        }
        std::env::var(&self.api_key_env).unwrap_or_default()
    }
}

/// Site-wide default metadata.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DefaultsConfig {
    pub title: String,
    pub description: String,
    pub keywords: String,
    pub image: String,

    /// Value written to `og:site_name`.
    pub site_name: String,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            title: "Griiingo".to_string(),
            description: "Conectamos imigrantes e turistas à comunidade brasileira. Encontre empresas, serviços, eventos e empregos de brasileiros, fora do Brasil.".to_string(),
            keywords: "empresas brasileiras, serviços brasileiros, eventos brasileiros, empregos brasileiros".to_string(),
            image: "https://api.griiingo.com/storage/v1/object/public/public-griiingo-content/general/griiingo-profile.png".to_string(),
            site_name: "Griiingo".to_string(),
        }
    }
}

/// Kind of entity a rule describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentKind {
    Business,
    Event,
    Job,
    Article,
    WebPage,
}

impl ContentKind {
    /// Storage folder for bare image identifiers of this kind.
    pub fn default_image_folder(self) -> &'static str {
        match self {
            ContentKind::Business | ContentKind::Job => "companies-photos",
            ContentKind::Event => "events-photos",
            ContentKind::Article | ContentKind::WebPage => "articles-photos",
        }
    }
}

/// A dynamic entity rule binding a path pattern to a metadata endpoint.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RuleConfig {
    /// Rule identifier for logging/metrics.
    pub name: String,

    /// Regular expression tested against the slash-terminated request path.
    pub pattern: String,

    /// Endpoint URL. A `{...}` token is replaced by the entity identifier,
    /// otherwise a `slug=eq.<id>` filter is appended.
    pub metadata_endpoint: String,

    /// Entity kind used for structured data and image resolution.
    #[serde(default = "default_kind")]
    pub kind: ContentKind,

    /// Storage folder override for bare image identifiers.
    #[serde(default)]
    pub image_folder: Option<String>,

    /// Column list override for slug-filter endpoints.
    #[serde(default)]
    pub select: Option<String>,
}

fn default_kind() -> ContentKind {
    ContentKind::WebPage
}

fn default_rules() -> Vec<RuleConfig> {
    vec![
        RuleConfig {
            name: "company".to_string(),
            pattern: "/empresa/[^/]+".to_string(),
            metadata_endpoint: "https://api.griiingo.com/rest/v1/companies_metadata".to_string(),
            kind: ContentKind::Business,
            image_folder: None,
            select: None,
        },
        RuleConfig {
            name: "event".to_string(),
            pattern: "/evento/[^/]+".to_string(),
            metadata_endpoint: "https://api.griiingo.com/rest/v1/events_metadata".to_string(),
            kind: ContentKind::Event,
            image_folder: None,
            select: Some("title,description,keywords,image,start_date".to_string()),
        },
        RuleConfig {
            name: "article".to_string(),
            pattern: "/artigo/[^/]+".to_string(),
            metadata_endpoint: "https://api.griiingo.com/rest/v1/articles_metadata".to_string(),
            kind: ContentKind::Article,
            image_folder: None,
            select: None,
        },
    ]
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Emit logs as JSON lines instead of the human-readable format.
    pub json_logs: bool,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_logs: false,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
