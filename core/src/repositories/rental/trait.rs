//! Rental repository trait: read access to rentals outside a transaction.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::entities::rental::Rental;
use crate::errors::DomainError;

/// Read operations for Rental entities
#[async_trait]
pub trait RentalRepository: Send + Sync {
    /// Find a rental by its identifier
    async fn find_rental(&self, id: Uuid) -> Result<Option<Rental>, DomainError>;

    /// Rentals booked by `renter_id`, latest start date first
    async fn rentals_by_renter(&self, renter_id: Uuid) -> Result<Vec<Rental>, DomainError>;

    /// Rentals of every listing owned by `owner_id`, latest start date first
    async fn rentals_by_owner(&self, owner_id: Uuid) -> Result<Vec<Rental>, DomainError>;

    /// Rentals of a listing in a blocking status, earliest start date first
    async fn blocking_rentals(&self, listing_id: Uuid) -> Result<Vec<Rental>, DomainError>;
}
