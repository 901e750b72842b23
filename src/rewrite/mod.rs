//! HTML rewriting subsystem.
//!
//! # Data Flow
//! ```text
//! origin HTML body (chunked)
//!     → stream.rs (pump into a blocking lol_html rewriter)
//!     → html.rs (RewriteContext visits <title>, <meta>, <head>)
//!         → element.rs (ElementView: the tokenizer capabilities used)
//!         → structured_data.rs (JSON-LD block for <head>)
//!     → response body (chunked)
//! ```

pub mod element;
pub mod html;
pub mod stream;
pub mod structured_data;

pub use element::ElementView;
pub use html::{html_rewriter, rewrite_document, ItemProp, MetaKey, RewriteContext};
pub use stream::rewrite_body;
