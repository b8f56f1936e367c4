//! Per-webpage response caches.
//!
//! Each [`crate::Webpage`] owns one cache per data kind. Every selection that
//! targets the webpage reads through the same cache, so templates and fields
//! evaluated against one target share a single fetch:
//!
//! - [`HttpCache`] - page body, headers and DOM source
//! - [`CitoidCache`] - simplified Citoid citation

pub mod citoid;
pub mod http;
pub mod response;

pub use citoid::{CitoidCache, CitoidResponse};
pub use http::{HttpCache, HttpResponse};
pub use response::{CacheState, ResponseCache, SharedFetch};
