//! Listing repository trait: read access to listings outside a transaction.

use async_trait::async_trait;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::domain::entities::listing::Listing;
use crate::errors::DomainError;

/// Read operations for Listing entities.
///
/// Writes go through [`StoreTransaction`](crate::repositories::StoreTransaction)
/// so statistics are never updated outside an atomic unit.
#[async_trait]
pub trait ListingRepository: Send + Sync {
    /// Find a listing by its identifier
    ///
    /// # Returns
    /// * `Ok(Some(Listing))` - Listing found
    /// * `Ok(None)` - No listing with the given ID
    /// * `Err(DomainError)` - Storage error occurred
    async fn find_listing(&self, id: Uuid) -> Result<Option<Listing>, DomainError>;

    /// Find a listing by its unique slug
    async fn find_listing_by_slug(&self, slug: &str) -> Result<Option<Listing>, DomainError>;

    /// All listings of an owner, newest first
    async fn listings_by_owner(&self, owner_id: Uuid) -> Result<Vec<Listing>, DomainError>;

    /// Active listings, newest first
    async fn active_listings(&self) -> Result<Vec<Listing>, DomainError>;

    /// Active listings of a category (case-insensitive), newest first
    async fn listings_by_category(&self, category: &str) -> Result<Vec<Listing>, DomainError>;

    /// Active listings whose title or description contains `query`,
    /// ignoring case, newest first
    async fn search_listings(&self, query: &str) -> Result<Vec<Listing>, DomainError>;

    /// Active listings of a category priced per day within `[min, max]`,
    /// newest first
    async fn listings_in_price_range(
        &self,
        category: &str,
        min: Decimal,
        max: Decimal,
    ) -> Result<Vec<Listing>, DomainError>;

    /// The `limit` most recently created active listings
    async fn featured_listings(&self, limit: usize) -> Result<Vec<Listing>, DomainError>;
}
