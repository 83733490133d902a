//! In-memory entity store used by tests and embedded deployments.
//!
//! A transaction holds the store-wide lock for its whole lifetime and works
//! on a private copy of the state; commit swaps the copy in. This serializes
//! every transaction, which is a superset of per-listing serialization.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use rust_decimal::Decimal;
use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

use crate::domain::entities::{Listing, Rental, Review, User};
use crate::domain::value_objects::BookingPeriod;
use crate::errors::{DomainError, ValidationError};
use crate::repositories::{ListingRepository, RentalRepository, ReviewRepository, UserRepository};

use super::r#trait::{EntityStore, StoreTransaction};

/// Write step at which an armed failure fires
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailurePoint {
    Begin,
    InsertRental,
    UpdateRentalStatus,
    SaveListingStatistics,
    SaveUserRating,
    UpdateUserProfile,
    InsertReview,
    DeleteReview,
    InsertListing,
    DeleteListing,
    Commit,
}

#[derive(Debug, Clone, Default)]
struct StoreState {
    listings: HashMap<Uuid, Listing>,
    rentals: HashMap<Uuid, Rental>,
    reviews: HashMap<Uuid, Review>,
    users: HashMap<Uuid, User>,
}

impl StoreState {
    fn owner_of(&self, listing_id: Uuid) -> Option<Uuid> {
        self.listings.get(&listing_id).map(|l| l.owner_id)
    }
}

/// Entity store backed by process memory
#[derive(Clone, Default)]
pub struct InMemoryStore {
    state: Arc<Mutex<StoreState>>,
    failures: Arc<Mutex<HashMap<FailurePoint, DomainError>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next write at `point` fail with `StorageUnavailable`
    pub async fn fail_once(&self, point: FailurePoint) {
        let error = DomainError::StorageUnavailable {
            message: format!("injected failure at {:?}", point),
        };
        self.fail_once_with(point, error).await;
    }

    /// Make the next write at `point` fail with `error`
    pub async fn fail_once_with(&self, point: FailurePoint, error: DomainError) {
        self.failures.lock().await.insert(point, error);
    }

    pub async fn seed_user(&self, user: User) {
        self.state.lock().await.users.insert(user.id, user);
    }

    pub async fn seed_listing(&self, listing: Listing) {
        self.state.lock().await.listings.insert(listing.id, listing);
    }

    pub async fn seed_rental(&self, rental: Rental) {
        self.state.lock().await.rentals.insert(rental.id, rental);
    }

    pub async fn seed_review(&self, review: Review) {
        self.state.lock().await.reviews.insert(review.id, review);
    }

    async fn active_where<F>(&self, keep: F) -> Result<Vec<Listing>, DomainError>
    where
        F: Fn(&Listing) -> bool + Send,
    {
        let state = self.state.lock().await;
        let listings = state
            .listings
            .values()
            .filter(|l| l.is_active && keep(l))
            .cloned()
            .collect();
        Ok(newest_listings_first(listings))
    }

    /// Number of stored rentals across all listings
    pub async fn rental_count(&self) -> usize {
        self.state.lock().await.rentals.len()
    }

    /// Number of stored reviews across all listings
    pub async fn review_count(&self) -> usize {
        self.state.lock().await.reviews.len()
    }
}

async fn trip(failures: &Mutex<HashMap<FailurePoint, DomainError>>, point: FailurePoint) -> Result<(), DomainError> {
    match failures.lock().await.remove(&point) {
        Some(error) => Err(error),
        None => Ok(()),
    }
}

fn newest_listings_first(mut listings: Vec<Listing>) -> Vec<Listing> {
    listings.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    listings
}

fn in_category(listing: &Listing, category: &str) -> bool {
    listing
        .category
        .as_deref()
        .is_some_and(|c| c.eq_ignore_ascii_case(category))
}

fn newest_rentals_first(mut rentals: Vec<Rental>) -> Vec<Rental> {
    rentals.sort_by(|a, b| b.period.start().cmp(&a.period.start()).then(b.created_at.cmp(&a.created_at)));
    rentals
}

fn newest_reviews_first(mut reviews: Vec<Review>) -> Vec<Review> {
    reviews.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    reviews
}

#[async_trait]
impl ListingRepository for InMemoryStore {
    async fn find_listing(&self, id: Uuid) -> Result<Option<Listing>, DomainError> {
        Ok(self.state.lock().await.listings.get(&id).cloned())
    }

    async fn find_listing_by_slug(&self, slug: &str) -> Result<Option<Listing>, DomainError> {
        let state = self.state.lock().await;
        Ok(state.listings.values().find(|l| l.slug == slug).cloned())
    }

    async fn listings_by_owner(&self, owner_id: Uuid) -> Result<Vec<Listing>, DomainError> {
        let state = self.state.lock().await;
        let listings: Vec<Listing> = state
            .listings
            .values()
            .filter(|l| l.owner_id == owner_id)
            .cloned()
            .collect();
        Ok(newest_listings_first(listings))
    }

    async fn active_listings(&self) -> Result<Vec<Listing>, DomainError> {
        self.active_where(|_| true).await
    }

    async fn listings_by_category(&self, category: &str) -> Result<Vec<Listing>, DomainError> {
        self.active_where(|l| in_category(l, category)).await
    }

    async fn search_listings(&self, query: &str) -> Result<Vec<Listing>, DomainError> {
        let needle = query.to_lowercase();
        self.active_where(|l| {
            l.title.to_lowercase().contains(&needle)
                || l.description
                    .as_deref()
                    .is_some_and(|d| d.to_lowercase().contains(&needle))
        })
        .await
    }

    async fn listings_in_price_range(
        &self,
        category: &str,
        min: Decimal,
        max: Decimal,
    ) -> Result<Vec<Listing>, DomainError> {
        self.active_where(|l| in_category(l, category) && l.price_per_day >= min && l.price_per_day <= max)
            .await
    }

    async fn featured_listings(&self, limit: usize) -> Result<Vec<Listing>, DomainError> {
        let mut listings = self.active_where(|_| true).await?;
        listings.truncate(limit);
        Ok(listings)
    }
}

#[async_trait]
impl RentalRepository for InMemoryStore {
    async fn find_rental(&self, id: Uuid) -> Result<Option<Rental>, DomainError> {
        Ok(self.state.lock().await.rentals.get(&id).cloned())
    }

    async fn rentals_by_renter(&self, renter_id: Uuid) -> Result<Vec<Rental>, DomainError> {
        let state = self.state.lock().await;
        let rentals = state
            .rentals
            .values()
            .filter(|r| r.renter_id == renter_id)
            .cloned()
            .collect();
        Ok(newest_rentals_first(rentals))
    }

    async fn rentals_by_owner(&self, owner_id: Uuid) -> Result<Vec<Rental>, DomainError> {
        let state = self.state.lock().await;
        let rentals = state
            .rentals
            .values()
            .filter(|r| state.owner_of(r.listing_id) == Some(owner_id))
            .cloned()
            .collect();
        Ok(newest_rentals_first(rentals))
    }

    async fn blocking_rentals(&self, listing_id: Uuid) -> Result<Vec<Rental>, DomainError> {
        let state = self.state.lock().await;
        let mut rentals: Vec<Rental> = state
            .rentals
            .values()
            .filter(|r| r.listing_id == listing_id && r.is_blocking())
            .cloned()
            .collect();
        rentals.sort_by_key(|r| r.period.start());
        Ok(rentals)
    }
}

#[async_trait]
impl ReviewRepository for InMemoryStore {
    async fn find_review(&self, id: Uuid) -> Result<Option<Review>, DomainError> {
        Ok(self.state.lock().await.reviews.get(&id).cloned())
    }

    async fn reviews_by_listing(&self, listing_id: Uuid) -> Result<Vec<Review>, DomainError> {
        let state = self.state.lock().await;
        let reviews = state
            .reviews
            .values()
            .filter(|r| r.listing_id == listing_id)
            .cloned()
            .collect();
        Ok(newest_reviews_first(reviews))
    }

    async fn reviews_by_author(&self, author_id: Uuid) -> Result<Vec<Review>, DomainError> {
        let state = self.state.lock().await;
        let reviews = state
            .reviews
            .values()
            .filter(|r| r.author_id == author_id)
            .cloned()
            .collect();
        Ok(newest_reviews_first(reviews))
    }
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn find_user(&self, id: Uuid) -> Result<Option<User>, DomainError> {
        Ok(self.state.lock().await.users.get(&id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, DomainError> {
        let state = self.state.lock().await;
        Ok(state
            .users
            .values()
            .find(|u| u.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn user_exists_by_email(&self, email: &str) -> Result<bool, DomainError> {
        Ok(self.find_user_by_email(email).await?.is_some())
    }

    async fn create_user(&self, user: User) -> Result<User, DomainError> {
        if !rc_shared::validation::is_valid_email(&user.email) {
            return Err(ValidationError::InvalidFormat {
                field: "email".to_string(),
            }
            .into());
        }
        let mut state = self.state.lock().await;
        if state.users.values().any(|u| u.email.eq_ignore_ascii_case(&user.email)) {
            return Err(ValidationError::DuplicateValue {
                field: "email".to_string(),
            }
            .into());
        }
        state.users.insert(user.id, user.clone());
        Ok(user)
    }
}

#[async_trait]
impl EntityStore for InMemoryStore {
    type Tx = InMemoryTransaction;

    async fn begin(&self) -> Result<Self::Tx, DomainError> {
        trip(&self.failures, FailurePoint::Begin).await?;
        let guard = Arc::clone(&self.state).lock_owned().await;
        let working = (*guard).clone();
        Ok(InMemoryTransaction {
            guard,
            working,
            failures: Arc::clone(&self.failures),
        })
    }
}

/// Transaction over [`InMemoryStore`]
pub struct InMemoryTransaction {
    guard: OwnedMutexGuard<StoreState>,
    working: StoreState,
    failures: Arc<Mutex<HashMap<FailurePoint, DomainError>>>,
}

impl InMemoryTransaction {
    async fn trip(&self, point: FailurePoint) -> Result<(), DomainError> {
        trip(&self.failures, point).await
    }
}

#[async_trait]
impl StoreTransaction for InMemoryTransaction {
    async fn lock_listing(&mut self, id: Uuid) -> Result<Option<Listing>, DomainError> {
        Ok(self.working.listings.get(&id).cloned())
    }

    async fn lock_user(&mut self, id: Uuid) -> Result<Option<User>, DomainError> {
        Ok(self.working.users.get(&id).cloned())
    }

    async fn lock_rental(&mut self, id: Uuid) -> Result<Option<Rental>, DomainError> {
        Ok(self.working.rentals.get(&id).cloned())
    }

    async fn lock_review(&mut self, id: Uuid) -> Result<Option<Review>, DomainError> {
        Ok(self.working.reviews.get(&id).cloned())
    }

    async fn user_exists(&mut self, id: Uuid) -> Result<bool, DomainError> {
        Ok(self.working.users.contains_key(&id))
    }

    async fn blocking_rentals_overlapping(
        &mut self,
        listing_id: Uuid,
        period: &BookingPeriod,
    ) -> Result<Vec<Rental>, DomainError> {
        let mut rentals: Vec<Rental> = self
            .working
            .rentals
            .values()
            .filter(|r| r.listing_id == listing_id && r.is_blocking() && r.period.overlaps(period))
            .cloned()
            .collect();
        rentals.sort_by_key(|r| r.period.start());
        Ok(rentals)
    }

    async fn count_blocking_rentals(&mut self, listing_id: Uuid) -> Result<u64, DomainError> {
        let count = self
            .working
            .rentals
            .values()
            .filter(|r| r.listing_id == listing_id && r.is_blocking())
            .count();
        Ok(count as u64)
    }

    async fn listing_reviews(&mut self, listing_id: Uuid) -> Result<Vec<Review>, DomainError> {
        let reviews = self
            .working
            .reviews
            .values()
            .filter(|r| r.listing_id == listing_id)
            .cloned()
            .collect();
        Ok(newest_reviews_first(reviews))
    }

    async fn insert_rental(&mut self, rental: &Rental) -> Result<(), DomainError> {
        self.trip(FailurePoint::InsertRental).await?;
        self.working.rentals.insert(rental.id, rental.clone());
        Ok(())
    }

    async fn update_rental_status(&mut self, rental: &Rental) -> Result<(), DomainError> {
        self.trip(FailurePoint::UpdateRentalStatus).await?;
        let stored = self
            .working
            .rentals
            .get_mut(&rental.id)
            .ok_or_else(|| DomainError::not_found("Rental", rental.id))?;
        *stored = stored.clone().with_status(rental.status());
        stored.updated_at = rental.updated_at;
        Ok(())
    }

    async fn save_listing_statistics(&mut self, listing: &Listing) -> Result<(), DomainError> {
        self.trip(FailurePoint::SaveListingStatistics).await?;
        let stored = self
            .working
            .listings
            .get_mut(&listing.id)
            .ok_or_else(|| DomainError::not_found("Listing", listing.id))?;
        *stored = stored.clone().with_statistics(*listing.statistics());
        stored.updated_at = listing.updated_at;
        Ok(())
    }

    async fn save_user_rating(&mut self, user: &User) -> Result<(), DomainError> {
        self.trip(FailurePoint::SaveUserRating).await?;
        let stored = self
            .working
            .users
            .get_mut(&user.id)
            .ok_or_else(|| DomainError::not_found("User", user.id))?;
        stored.set_rating(user.rating());
        stored.updated_at = user.updated_at;
        Ok(())
    }

    async fn update_user_profile(&mut self, user: &User) -> Result<(), DomainError> {
        self.trip(FailurePoint::UpdateUserProfile).await?;
        let stored = self
            .working
            .users
            .get_mut(&user.id)
            .ok_or_else(|| DomainError::not_found("User", user.id))?;
        stored.first_name = user.first_name.clone();
        stored.last_name = user.last_name.clone();
        stored.picture = user.picture.clone();
        stored.updated_at = user.updated_at;
        Ok(())
    }

    async fn insert_review(&mut self, review: &Review) -> Result<(), DomainError> {
        self.trip(FailurePoint::InsertReview).await?;
        self.working.reviews.insert(review.id, review.clone());
        Ok(())
    }

    async fn delete_review(&mut self, id: Uuid) -> Result<(), DomainError> {
        self.trip(FailurePoint::DeleteReview).await?;
        self.working
            .reviews
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| DomainError::not_found("Review", id))
    }

    async fn insert_listing(&mut self, listing: &Listing) -> Result<(), DomainError> {
        self.trip(FailurePoint::InsertListing).await?;
        if self.working.listings.values().any(|l| l.slug == listing.slug) {
            return Err(ValidationError::DuplicateValue {
                field: "slug".to_string(),
            }
            .into());
        }
        self.working.listings.insert(listing.id, listing.clone());
        Ok(())
    }

    async fn update_listing(&mut self, listing: &Listing) -> Result<(), DomainError> {
        let stored = self
            .working
            .listings
            .get_mut(&listing.id)
            .ok_or_else(|| DomainError::not_found("Listing", listing.id))?;
        let mut updated = listing.clone().with_statistics(*stored.statistics());
        updated.slug = stored.slug.clone();
        *stored = updated;
        Ok(())
    }

    async fn delete_listing(&mut self, id: Uuid) -> Result<(), DomainError> {
        self.trip(FailurePoint::DeleteListing).await?;
        if self.working.listings.remove(&id).is_none() {
            return Err(DomainError::not_found("Listing", id));
        }
        self.working.reviews.retain(|_, r| r.listing_id != id);
        self.working.rentals.retain(|_, r| r.listing_id != id);
        Ok(())
    }

    async fn slug_exists(&mut self, slug: &str) -> Result<bool, DomainError> {
        Ok(self.working.listings.values().any(|l| l.slug == slug))
    }

    async fn commit(self) -> Result<(), DomainError> {
        trip(&self.failures, FailurePoint::Commit).await?;
        let InMemoryTransaction {
            mut guard, working, ..
        } = self;
        *guard = working;
        Ok(())
    }

    async fn rollback(self) -> Result<(), DomainError> {
        Ok(())
    }
}
