//! Availability checks for listing date ranges.
//!
//! A rental `[s, e]` conflicts with a request `[s', e']` iff
//! `s <= e' && s' <= e`, and only blocking rentals (PENDING, CONFIRMED)
//! count.

use std::sync::Arc;

use chrono::NaiveDate;
use tracing::instrument;
use uuid::Uuid;

use crate::domain::entities::Rental;
use crate::domain::value_objects::BookingPeriod;
use crate::errors::{BookingError, DomainError, DomainResult};
use crate::repositories::{EntityStore, StoreTransaction};

/// First blocking rental sharing a day with `period`
pub fn find_conflict<'a>(rentals: &'a [Rental], period: &BookingPeriod) -> Option<&'a Rental> {
    rentals
        .iter()
        .find(|rental| rental.is_blocking() && rental.period.overlaps(period))
}

/// Fail with `DateRangeConflict` if a blocking rental overlaps `period`.
///
/// Must run inside the transaction that inserts the rental, after the
/// listing row has been locked.
pub async fn ensure_available<T: StoreTransaction>(
    tx: &mut T,
    listing_id: Uuid,
    period: &BookingPeriod,
) -> DomainResult<()> {
    let overlapping = tx.blocking_rentals_overlapping(listing_id, period).await?;
    if let Some(conflict) = find_conflict(&overlapping, period) {
        tracing::warn!(
            listing_id = %listing_id,
            requested = %period,
            conflicting_rental = %conflict.id,
            "date range conflict"
        );
        return Err(BookingError::DateRangeConflict {
            listing_id,
            start: period.start(),
            end: period.end(),
        }
        .into());
    }
    Ok(())
}

/// Read-side availability queries. The answer is advisory: booking re-checks
/// inside its own transaction.
pub struct AvailabilityChecker<S>
where
    S: EntityStore,
{
    store: Arc<S>,
}

impl<S> AvailabilityChecker<S>
where
    S: EntityStore,
{
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Whether `[start, end]` is free on the listing
    ///
    /// # Errors
    /// * `ValidationError::InvalidDateRange` - `end` is before `start`
    /// * `DomainError::NotFound` - The listing does not exist
    #[instrument(skip(self))]
    pub async fn is_available(&self, listing_id: Uuid, start: NaiveDate, end: NaiveDate) -> DomainResult<bool> {
        let period = BookingPeriod::new(start, end)?;
        self.ensure_listing(listing_id).await?;
        let rentals = self.store.blocking_rentals(listing_id).await?;
        Ok(find_conflict(&rentals, &period).is_none())
    }

    /// Periods currently reserved on the listing, earliest first
    #[instrument(skip(self))]
    pub async fn blocked_periods(&self, listing_id: Uuid) -> DomainResult<Vec<BookingPeriod>> {
        self.ensure_listing(listing_id).await?;
        let rentals = self.store.blocking_rentals(listing_id).await?;
        let mut periods: Vec<BookingPeriod> = rentals.into_iter().map(|r| r.period).collect();
        periods.sort_by_key(|p| p.start());
        Ok(periods)
    }

    async fn ensure_listing(&self, listing_id: Uuid) -> DomainResult<()> {
        match self.store.find_listing(listing_id).await? {
            Some(_) => Ok(()),
            None => Err(DomainError::not_found("Listing", listing_id)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{Listing, ListingDraft, RentalStatus};
    use crate::repositories::InMemoryStore;
    use rust_decimal_macros::dec;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, day).unwrap()
    }

    fn booked(start: u32, end: u32, status: RentalStatus) -> Rental {
        let period = BookingPeriod::new(d(start), d(end)).unwrap();
        Rental::new_pending(Uuid::new_v4(), Uuid::new_v4(), period, dec!(10)).with_status(status)
    }

    fn request(start: u32, end: u32) -> BookingPeriod {
        BookingPeriod::new(d(start), d(end)).unwrap()
    }

    #[test]
    fn test_partial_overlaps_conflict() {
        let existing = [booked(10, 15, RentalStatus::Confirmed)];

        // overlaps the start, the end, sits inside, and swallows the rental
        for (s, e) in [(8, 10), (15, 20), (11, 12), (5, 25), (12, 18)] {
            assert!(find_conflict(&existing, &request(s, e)).is_some(), "{}..={}", s, e);
        }
    }

    #[test]
    fn test_adjacent_ranges_do_not_conflict() {
        let existing = [booked(10, 15, RentalStatus::Pending)];

        assert!(find_conflict(&existing, &request(5, 9)).is_none());
        assert!(find_conflict(&existing, &request(16, 20)).is_none());
    }

    #[test]
    fn test_non_blocking_statuses_are_ignored() {
        let existing = [
            booked(10, 15, RentalStatus::Cancelled),
            booked(10, 15, RentalStatus::Rejected),
            booked(10, 15, RentalStatus::Completed),
        ];

        assert!(find_conflict(&existing, &request(10, 15)).is_none());
    }

    #[tokio::test]
    async fn test_is_available_against_store() {
        let store = Arc::new(InMemoryStore::new());
        let listing = Listing::new(Uuid::new_v4(), "tent".to_string(), ListingDraft::new("Tent", dec!(15)));
        let mut rental = booked(10, 15, RentalStatus::Pending);
        rental.listing_id = listing.id;
        store.seed_listing(listing.clone()).await;
        store.seed_rental(rental).await;
        let checker = AvailabilityChecker::new(Arc::clone(&store));

        assert!(!checker.is_available(listing.id, d(14), d(18)).await.unwrap());
        assert!(checker.is_available(listing.id, d(16), d(18)).await.unwrap());
        assert_eq!(checker.blocked_periods(listing.id).await.unwrap(), vec![request(10, 15)]);
    }

    #[tokio::test]
    async fn test_unknown_listing_is_not_found() {
        let checker = AvailabilityChecker::new(Arc::new(InMemoryStore::new()));

        let err = checker.is_available(Uuid::new_v4(), d(1), d(2)).await.unwrap_err();
        assert_eq!(err.code(), "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_reversed_range_is_invalid() {
        let checker = AvailabilityChecker::new(Arc::new(InMemoryStore::new()));

        let err = checker.is_available(Uuid::new_v4(), d(5), d(1)).await.unwrap_err();
        assert_eq!(err.code(), "INVALID_DATE_RANGE");
    }
}
