//! Store traits defining the atomic unit of work used by the services.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::entities::{Listing, Rental, Review, User};
use crate::domain::value_objects::BookingPeriod;
use crate::errors::DomainError;
use crate::repositories::{ListingRepository, RentalRepository, ReviewRepository, UserRepository};

/// Persistent store for listings, rentals, reviews and users.
///
/// Plain reads go through the repository supertraits. Every write happens
/// inside a [`StoreTransaction`] obtained from [`EntityStore::begin`].
#[async_trait]
pub trait EntityStore:
    ListingRepository + RentalRepository + ReviewRepository + UserRepository + 'static
{
    type Tx: StoreTransaction;

    /// Open a transaction
    ///
    /// # Errors
    /// * `DomainError::StorageUnavailable` - The backing store cannot be reached
    async fn begin(&self) -> Result<Self::Tx, DomainError>;
}

/// A single atomic unit of work.
///
/// `lock_*` reads take an exclusive lock on the row for the rest of the
/// transaction. Two transactions locking the same listing are serialized,
/// which is what makes check-then-insert of rentals safe.
///
/// Rows are locked in a fixed order: the listing first, then its rentals
/// or reviews, then users. A caller that starts from a rental or review id
/// resolves the listing id with a plain read before opening the
/// transaction.
///
/// Dropping a transaction without calling [`commit`](Self::commit) discards
/// every write made through it.
#[async_trait]
pub trait StoreTransaction: Send {
    /// Lock and return a listing
    async fn lock_listing(&mut self, id: Uuid) -> Result<Option<Listing>, DomainError>;

    /// Lock and return a user
    async fn lock_user(&mut self, id: Uuid) -> Result<Option<User>, DomainError>;

    /// Lock and return a rental
    async fn lock_rental(&mut self, id: Uuid) -> Result<Option<Rental>, DomainError>;

    /// Lock and return a review
    async fn lock_review(&mut self, id: Uuid) -> Result<Option<Review>, DomainError>;

    /// Whether a user row exists. Takes no lock.
    async fn user_exists(&mut self, id: Uuid) -> Result<bool, DomainError>;

    /// Blocking rentals of a listing whose period shares at least one day
    /// with `period`
    async fn blocking_rentals_overlapping(
        &mut self,
        listing_id: Uuid,
        period: &BookingPeriod,
    ) -> Result<Vec<Rental>, DomainError>;

    /// Number of blocking rentals of a listing
    async fn count_blocking_rentals(&mut self, listing_id: Uuid) -> Result<u64, DomainError>;

    /// Reviews of a listing as seen by this transaction
    async fn listing_reviews(&mut self, listing_id: Uuid) -> Result<Vec<Review>, DomainError>;

    async fn insert_rental(&mut self, rental: &Rental) -> Result<(), DomainError>;

    /// Persist the status and `updated_at` of an existing rental
    async fn update_rental_status(&mut self, rental: &Rental) -> Result<(), DomainError>;

    /// Persist rating, rentals count and total earnings of a listing
    async fn save_listing_statistics(&mut self, listing: &Listing) -> Result<(), DomainError>;

    /// Persist the rating aggregate of a user
    async fn save_user_rating(&mut self, user: &User) -> Result<(), DomainError>;

    /// Persist name and picture of a user. Email and rating are never
    /// written here.
    async fn update_user_profile(&mut self, user: &User) -> Result<(), DomainError>;

    async fn insert_review(&mut self, review: &Review) -> Result<(), DomainError>;

    async fn delete_review(&mut self, id: Uuid) -> Result<(), DomainError>;

    /// Insert a listing
    ///
    /// # Errors
    /// * `ValidationError::DuplicateValue` - The slug is already taken
    async fn insert_listing(&mut self, listing: &Listing) -> Result<(), DomainError>;

    /// Persist client-editable fields and the active flag.
    /// Slug and statistics are never written here.
    async fn update_listing(&mut self, listing: &Listing) -> Result<(), DomainError>;

    /// Delete a listing together with its reviews and rentals
    async fn delete_listing(&mut self, id: Uuid) -> Result<(), DomainError>;

    async fn slug_exists(&mut self, slug: &str) -> Result<bool, DomainError>;

    /// Make every write of this transaction visible at once
    async fn commit(self) -> Result<(), DomainError>;

    /// Discard every write of this transaction
    async fn rollback(self) -> Result<(), DomainError>;
}
