//! Routing subsystem: request classification.
//!
//! # Data Flow
//! ```text
//! Incoming request path (+ Referer for page-data documents)
//!     → router.rs (normalize, classify)
//!     → matcher.rs (evaluate rule regexes, data-document shape)
//!     → Return: DynamicEntity(rule) | DataDocument | NoMatch
//!
//! Rule Compilation (at startup):
//!     RuleConfig[]
//!     → Compile regexes and endpoint templates
//!     → Freeze as immutable Classifier
//! ```
//!
//! # Design Decisions
//! - Rules compiled at startup, immutable at runtime
//! - Deterministic: same input always matches same rule
//! - First match wins (declaration order)

pub mod matcher;
pub mod router;

pub use matcher::{is_data_document, EndpointTemplate, PatternRule, RuleError};
pub use router::{entity_identifier, Classification, Classifier, RequestShape};
