//! Rental lifecycle service.
//!
//! Booking runs availability check, pricing and insert inside one
//! transaction that holds the listing lock, so two concurrent bookings of
//! the same listing are serialized.

use std::sync::Arc;

use chrono::NaiveDate;
use rc_shared::BookingConfig;
use tracing::instrument;
use uuid::Uuid;

use crate::domain::entities::{Rental, RentalStatus};
use crate::domain::value_objects::{BookingPeriod, Principal};
use crate::errors::{BookingError, DomainError, DomainResult, ValidationError};
use crate::repositories::{EntityStore, StoreTransaction};
use crate::services::authorization::{Action, Authorizer};
use crate::services::availability::ensure_available;
use crate::services::pricing::PricingCalculator;

/// Service owning the rental state machine
pub struct RentalService<S>
where
    S: EntityStore,
{
    store: Arc<S>,
    authorizer: Authorizer,
    config: BookingConfig,
}

impl<S> RentalService<S>
where
    S: EntityStore,
{
    /// Create a new rental service
    pub fn new(store: Arc<S>, config: BookingConfig) -> Self {
        Self {
            store,
            authorizer: Authorizer::new(&config),
            config,
        }
    }

    /// Book `[start, end]` on a listing. The rental starts `PENDING`.
    ///
    /// # Errors
    /// * `ValidationError::InvalidDateRange` - `end` is before `start`
    /// * `ValidationError::RentalTooLong` - Period exceeds `max_rental_days`
    /// * `DomainError::NotFound` - Listing or renter does not exist
    /// * `BookingError::SelfBooking` - Renter owns the listing
    /// * `BookingError::ListingInactive` - Listing is deactivated
    /// * `BookingError::DateRangeConflict` - A blocking rental overlaps
    #[instrument(skip(self, principal), fields(renter_id = %principal.user_id))]
    pub async fn create(
        &self,
        principal: &Principal,
        listing_id: Uuid,
        start: NaiveDate,
        end: NaiveDate,
    ) -> DomainResult<Rental> {
        let period = BookingPeriod::new(start, end)?;
        if period.days() > i64::from(self.config.max_rental_days) {
            return Err(ValidationError::RentalTooLong {
                days: period.days(),
                max: self.config.max_rental_days,
            }
            .into());
        }

        let mut tx = self.store.begin().await?;
        let listing = tx
            .lock_listing(listing_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Listing", listing_id))?;

        self.authorizer.authorize(
            principal,
            &Action::BookRental {
                owner_id: listing.owner_id,
            },
        )?;
        if !tx.user_exists(principal.user_id).await? {
            return Err(DomainError::not_found("User", principal.user_id));
        }
        if !listing.is_active {
            return Err(BookingError::ListingInactive { listing_id }.into());
        }

        ensure_available(&mut tx, listing_id, &period).await?;
        let total_price = PricingCalculator::compute_total(listing.price_per_day, &period)?;

        let rental = Rental::new_pending(listing_id, principal.user_id, period, total_price);
        tx.insert_rental(&rental).await?;
        tx.commit().await?;

        tracing::info!(
            rental_id = %rental.id,
            listing_id = %listing_id,
            period = %period,
            total_price = %total_price,
            "rental created"
        );
        Ok(rental)
    }

    /// Move a rental to `next`. Only the listing owner may do this.
    ///
    /// Completing a rental adds one to the listing's rentals count and its
    /// total price to the listing's earnings in the same transaction.
    ///
    /// The listing row is locked before the rental row, the same order a
    /// booking takes them in.
    ///
    /// # Errors
    /// * `DomainError::NotFound` - Rental or its listing does not exist
    /// * `DomainError::Unauthorized` - Caller is not the listing owner
    /// * `BookingError::IllegalTransition` - `next` is not reachable from the
    ///   current status
    #[instrument(skip(self, principal), fields(user_id = %principal.user_id))]
    pub async fn transition_status(
        &self,
        principal: &Principal,
        rental_id: Uuid,
        next: RentalStatus,
    ) -> DomainResult<Rental> {
        let listing_id = self
            .store
            .find_rental(rental_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Rental", rental_id))?
            .listing_id;

        let mut tx = self.store.begin().await?;
        let mut listing = tx
            .lock_listing(listing_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Listing", listing_id))?;
        let mut rental = tx
            .lock_rental(rental_id)
            .await?
            .filter(|r| r.listing_id == listing_id)
            .ok_or_else(|| DomainError::not_found("Rental", rental_id))?;

        self.authorizer.authorize(
            principal,
            &Action::TransitionRental {
                owner_id: listing.owner_id,
            },
        )?;

        let previous = rental.status();
        if let Err(err) = rental.transition_to(next) {
            tracing::warn!(rental_id = %rental_id, from = %previous, to = %next, "illegal transition");
            return Err(err.into());
        }
        tx.update_rental_status(&rental).await?;

        if next == RentalStatus::Completed {
            listing.record_completed_rental(rental.total_price)?;
            tx.save_listing_statistics(&listing).await?;
        }
        tx.commit().await?;

        tracing::info!(
            rental_id = %rental_id,
            listing_id = %listing.id,
            from = %previous,
            to = %next,
            "rental status changed"
        );
        Ok(rental)
    }

    /// [`transition_status`](Self::transition_status) with the status given
    /// as text, e.g. `"CONFIRMED"`
    ///
    /// # Errors
    /// * `BookingError::InvalidStatus` - `status` names no rental status
    pub async fn transition_status_named(
        &self,
        principal: &Principal,
        rental_id: Uuid,
        status: &str,
    ) -> DomainResult<Rental> {
        let next: RentalStatus = status.parse()?;
        self.transition_status(principal, rental_id, next).await
    }

    /// A rental, visible to its renter and to the listing owner
    #[instrument(skip(self, principal), fields(user_id = %principal.user_id))]
    pub async fn get(&self, principal: &Principal, rental_id: Uuid) -> DomainResult<Rental> {
        let rental = self
            .store
            .find_rental(rental_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Rental", rental_id))?;
        let listing = self
            .store
            .find_listing(rental.listing_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Listing", rental.listing_id))?;

        self.authorizer.authorize(
            principal,
            &Action::ViewRental {
                owner_id: listing.owner_id,
                renter_id: rental.renter_id,
            },
        )?;
        Ok(rental)
    }

    /// Rentals booked by the caller, latest start date first
    pub async fn rentals_for_renter(&self, principal: &Principal) -> DomainResult<Vec<Rental>> {
        self.authorizer.require_user(principal)?;
        self.store.rentals_by_renter(principal.user_id).await
    }

    /// Rentals of the caller's listings, latest start date first
    pub async fn rentals_for_owner(&self, principal: &Principal) -> DomainResult<Vec<Rental>> {
        self.authorizer.require_user(principal)?;
        self.store.rentals_by_owner(principal.user_id).await
    }
}
