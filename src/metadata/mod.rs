//! Metadata subsystem.
//!
//! # Data Flow
//! ```text
//! (identifier, PatternRule)
//!     → client.rs (build URL, GET with API key, parse either response shape)
//!     → resolve image into storage URL
//!     → types.rs (merge over DefaultMetadata)
//!     → Metadata (always populated)
//! ```
//!
//! # Design Decisions
//! - No caching; every request fetches fresh metadata
//! - Single attempt, failures degrade to defaults and are only logged

pub mod client;
pub mod types;

pub use client::{FetchError, MetadataClient};
pub use types::{DefaultMetadata, Metadata, MetadataRecord};
