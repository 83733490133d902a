//! Review repository trait: read access to reviews outside a transaction.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::entities::review::Review;
use crate::errors::DomainError;

/// Read operations for Review entities
#[async_trait]
pub trait ReviewRepository: Send + Sync {
    async fn find_review(&self, id: Uuid) -> Result<Option<Review>, DomainError>;

    /// Reviews of a listing, newest first
    async fn reviews_by_listing(&self, listing_id: Uuid) -> Result<Vec<Review>, DomainError>;

    /// Reviews written by a user, newest first
    async fn reviews_by_author(&self, author_id: Uuid) -> Result<Vec<Review>, DomainError>;
}
