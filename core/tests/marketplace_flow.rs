//! End-to-end flows over the in-memory store.

use std::sync::Arc;

use chrono::NaiveDate;
use rc_core::domain::entities::{ListingDraft, RentalStatus, User};
use rc_core::domain::value_objects::{Principal, RatingAggregate};
use rc_core::errors::DomainError;
use rc_core::repositories::{FailurePoint, InMemoryStore, UserRepository};
use rc_core::services::MarketplaceServices;
use rc_shared::BookingConfig;
use rust_decimal_macros::dec;

struct World {
    store: Arc<InMemoryStore>,
    services: MarketplaceServices<InMemoryStore>,
    owner: Principal,
    renter: Principal,
}

async fn world() -> World {
    let store = Arc::new(InMemoryStore::new());
    let owner = store.create_user(User::new("owner@example.com").with_name("Olga", "Owner")).await.unwrap();
    let renter = store.create_user(User::new("renter@example.com")).await.unwrap();

    World {
        services: MarketplaceServices::new(Arc::clone(&store), BookingConfig::default()),
        store,
        owner: Principal::user(owner.id),
        renter: Principal::user(renter.id),
    }
}

fn date(month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, month, day).unwrap()
}

#[tokio::test]
async fn test_booking_lifecycle_updates_listing_statistics() {
    let w = world().await;
    let listing = w
        .services
        .listings
        .create(&w.owner, ListingDraft::new("Projector", dec!(50)))
        .await
        .unwrap();

    let rental = w
        .services
        .rentals
        .create(&w.renter, listing.id, date(1, 1), date(1, 3))
        .await
        .unwrap();
    assert_eq!(rental.total_price, dec!(150));
    assert!(!w
        .services
        .availability
        .is_available(listing.id, date(1, 3), date(1, 4))
        .await
        .unwrap());

    for next in [RentalStatus::Confirmed, RentalStatus::Completed] {
        w.services
            .rentals
            .transition_status(&w.owner, rental.id, next)
            .await
            .unwrap();
    }

    let listing = w.services.listings.find_by_id(listing.id).await.unwrap();
    assert_eq!(listing.rentals_count(), 1);
    assert_eq!(listing.total_earnings(), dec!(150));
    assert!(w
        .services
        .availability
        .is_available(listing.id, date(1, 1), date(1, 3))
        .await
        .unwrap());
}

#[tokio::test]
async fn test_review_round_trip_restores_ratings() {
    let w = world().await;
    let listing = w
        .services
        .listings
        .create(&w.owner, ListingDraft::new("Tripod", dec!(8)))
        .await
        .unwrap();
    w.services
        .reviews
        .create(&w.renter, listing.id, 4, "Sturdy".to_string())
        .await
        .unwrap();
    w.services
        .reviews
        .create(&w.renter, listing.id, 4, "Still sturdy".to_string())
        .await
        .unwrap();

    let added = w
        .services
        .reviews
        .create(&w.renter, listing.id, 5, "Perfect".to_string())
        .await
        .unwrap();
    assert!((added.ratings.listing.mean() - 13.0 / 3.0).abs() < 1e-12);

    let removed = w.services.reviews.delete(&w.renter, added.review.id).await.unwrap();
    assert_eq!(removed.listing, RatingAggregate::restore(2, 4.0));

    let owner = w.store.find_user(w.owner.user_id).await.unwrap().unwrap();
    assert_eq!(owner.rating().count(), 2);
    assert_eq!(owner.rating().mean(), 4.0);
}

#[tokio::test]
async fn test_mid_transaction_failure_leaves_no_partial_state() {
    let w = world().await;
    let listing = w
        .services
        .listings
        .create(&w.owner, ListingDraft::new("Canoe", dec!(35)))
        .await
        .unwrap();
    w.store.fail_once(FailurePoint::SaveUserRating).await;

    let err = w
        .services
        .reviews
        .create(&w.renter, listing.id, 5, "Fast".to_string())
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::StorageUnavailable { .. }));

    let listing = w.services.listings.find_by_id(listing.id).await.unwrap();
    assert_eq!(listing.rating().count(), 0);
    assert!(w.services.reviews.reviews_for_listing(listing.id).await.unwrap().is_empty());

    // the caller may resubmit
    let outcome = w
        .services
        .reviews
        .create(&w.renter, listing.id, 5, "Fast".to_string())
        .await
        .unwrap();
    assert_eq!(outcome.ratings.owner.count(), 1);
}

#[tokio::test]
async fn test_errors_carry_stable_codes() {
    let w = world().await;
    let listing = w
        .services
        .listings
        .create(&w.owner, ListingDraft::new("Sander", dec!(9)))
        .await
        .unwrap();
    let rental = w
        .services
        .rentals
        .create(&w.renter, listing.id, date(2, 1), date(2, 2))
        .await
        .unwrap();

    let conflict = w
        .services
        .rentals
        .create(&w.renter, listing.id, date(2, 2), date(2, 9))
        .await
        .unwrap_err();
    let unauthorized = w
        .services
        .rentals
        .transition_status(&w.renter, rental.id, RentalStatus::Confirmed)
        .await
        .unwrap_err();
    let illegal = w
        .services
        .rentals
        .transition_status(&w.owner, rental.id, RentalStatus::Cancelled)
        .await
        .unwrap_err();

    assert_eq!(conflict.code(), "DATE_RANGE_CONFLICT");
    assert_eq!(unauthorized.code(), "UNAUTHORIZED");
    assert_eq!(illegal.code(), "ILLEGAL_TRANSITION");
    assert!(!conflict.is_retryable());
}
