//! SEO metadata edge proxy.
//!
//! Sits in front of a single origin site. Requests for dynamic entity pages
//! (companies, events, articles) get their `<title>`, SEO/social `<meta>` tags
//! and JSON-LD rewritten from a metadata API; the front-end's page-data JSON
//! documents get the matching fields patched. Everything else is rewritten
//! with site-wide defaults and streamed through.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod metadata;
pub mod observability;
pub mod page_data;
pub mod rewrite;
pub mod routing;

pub use config::schema::ProxyConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
