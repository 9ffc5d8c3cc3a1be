//! Trait definitions for remote catalog sources.
//!
//! The coordinator and any UI are written against this trait, so a
//! different backend (or a test fake) can stand in for Jikan.

use std::future::Future;

use shiori_core::models::{MediaSummary, MediaType};

/// A remote media catalog.
pub trait CatalogService: Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Fetch the top-rated list of the given catalog.
    fn top(
        &self,
        media: MediaType,
    ) -> impl Future<Output = Result<Vec<MediaSummary>, Self::Error>> + Send;

    /// Fetch a single catalog item by id.
    fn details(
        &self,
        media: MediaType,
        mal_id: i64,
    ) -> impl Future<Output = Result<MediaSummary, Self::Error>> + Send;
}
