//! Google Custom Search JSON API: credentials, request/response types, and the `SearchClient` seam.

pub mod client;
mod results;
pub mod types;

pub use client::{CseClient, CseError, Credentials, SearchClient};
pub use types::SearchResultSet;
