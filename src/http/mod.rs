//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, request ID, tracing)
//!     → request.rs (bypass check, header filtering)
//!     → [routing classifies the path]
//!     → [metadata client resolves page metadata]
//!     → origin.rs (fetch from the origin site)
//!     → [rewrite / page_data transform the body]
//!     → response.rs (strip headers, build response)
//!     → Send to client
//! ```

pub mod error;
pub mod origin;
pub mod request;
pub mod response;
pub mod server;

pub use error::{ProxyError, ServerError};
pub use request::{ProxyRequestId, X_REQUEST_ID};
pub use server::{AppState, HttpServer};
