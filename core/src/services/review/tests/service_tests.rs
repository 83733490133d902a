//! Tests for the ReviewService.

use std::sync::Arc;

use rc_shared::BookingConfig;
use rust_decimal_macros::dec;
use uuid::Uuid;

use crate::domain::entities::{Listing, ListingDraft, ListingStatistics, User};
use crate::domain::value_objects::{Principal, RatingAggregate};
use crate::errors::{DomainError, ValidationError};
use crate::repositories::{FailurePoint, InMemoryStore, ListingRepository, UserRepository};
use crate::services::review::ReviewService;

struct Setup {
    store: Arc<InMemoryStore>,
    service: ReviewService<InMemoryStore>,
    listing: Listing,
    owner: Principal,
    guest: Principal,
}

/// Listing and owner both start at rating 4.0 over 2 reviews
async fn setup() -> Setup {
    let store = Arc::new(InMemoryStore::new());
    let owner = User::new("owner@example.com").with_rating(RatingAggregate::restore(2, 4.0));
    let guest = User::new("guest@example.com");
    let listing = Listing::new(owner.id, "bike".to_string(), ListingDraft::new("Bike", dec!(25)))
        .with_statistics(ListingStatistics {
            rating: RatingAggregate::restore(2, 4.0),
            ..Default::default()
        });

    store.seed_user(owner.clone()).await;
    store.seed_user(guest.clone()).await;
    store.seed_listing(listing.clone()).await;

    Setup {
        service: ReviewService::new(Arc::clone(&store), BookingConfig::default()),
        store,
        listing,
        owner: Principal::user(owner.id),
        guest: Principal::user(guest.id),
    }
}

#[tokio::test]
async fn test_add_then_remove_restores_prior_rating() {
    let s = setup().await;

    let outcome = s
        .service
        .create(&s.guest, s.listing.id, 5, "Smooth ride".to_string())
        .await
        .unwrap();
    assert_eq!(outcome.ratings.listing.count(), 3);
    assert!((outcome.ratings.listing.mean() - 4.333_333_333_333_333).abs() < 1e-9);
    assert_eq!(outcome.ratings.owner, outcome.ratings.listing);

    let ratings = s.service.delete(&s.guest, outcome.review.id).await.unwrap();
    assert_eq!(ratings.listing.count(), 2);
    assert_eq!(ratings.listing.mean(), 4.0);

    let listing = s.store.find_listing(s.listing.id).await.unwrap().unwrap();
    assert_eq!(listing.rating(), RatingAggregate::restore(2, 4.0));
    let owner = s.store.find_user(s.owner.user_id).await.unwrap().unwrap();
    assert_eq!(owner.rating(), RatingAggregate::restore(2, 4.0));
}

#[tokio::test]
async fn test_removing_last_review_resets_to_zero() {
    let store = Arc::new(InMemoryStore::new());
    let owner = User::new("owner@example.com");
    let guest = User::new("guest@example.com");
    let listing = Listing::new(owner.id, "sup".to_string(), ListingDraft::new("SUP", dec!(30)));
    store.seed_user(owner).await;
    store.seed_user(guest.clone()).await;
    let guest = Principal::user(guest.id);
    store.seed_listing(listing.clone()).await;
    let service = ReviewService::new(Arc::clone(&store), BookingConfig::default());

    let outcome = service.create(&guest, listing.id, 2, "Leaky".to_string()).await.unwrap();
    let ratings = service.delete(&guest, outcome.review.id).await.unwrap();

    assert_eq!(ratings.listing.count(), 0);
    assert_eq!(ratings.listing.mean(), 0.0);
    assert_eq!(ratings.owner.mean(), 0.0);
}

#[tokio::test]
async fn test_rating_bounds_are_enforced() {
    let s = setup().await;

    for rating in [0u8, 6] {
        let err = s
            .service
            .create(&s.guest, s.listing.id, rating, "text".to_string())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DomainError::Validation(ValidationError::OutOfRange { .. })
        ));
    }
    assert_eq!(s.store.review_count().await, 0);
}

#[tokio::test]
async fn test_content_is_required_and_bounded() {
    let s = setup().await;

    let err = s
        .service
        .create(&s.guest, s.listing.id, 4, "   ".to_string())
        .await
        .unwrap_err();
    assert_eq!(err.code(), "REQUIRED_FIELD");

    let err = s
        .service
        .create(&s.guest, s.listing.id, 4, "x".repeat(2001))
        .await
        .unwrap_err();
    assert_eq!(err.code(), "OUT_OF_RANGE");
}

#[tokio::test]
async fn test_owner_cannot_review_own_listing() {
    let s = setup().await;

    let err = s
        .service
        .create(&s.owner, s.listing.id, 5, "Best bike".to_string())
        .await
        .unwrap_err();

    assert!(matches!(err, DomainError::Unauthorized { .. }));
}

#[tokio::test]
async fn test_only_author_may_delete() {
    let s = setup().await;
    let outcome = s
        .service
        .create(&s.guest, s.listing.id, 3, "Fine".to_string())
        .await
        .unwrap();

    let err = s.service.delete(&s.owner, outcome.review.id).await.unwrap_err();

    assert_eq!(err.code(), "UNAUTHORIZED");
    assert_eq!(s.store.review_count().await, 1);
}

#[tokio::test]
async fn test_failed_owner_update_rolls_back_review() {
    let s = setup().await;
    s.store.fail_once(FailurePoint::SaveUserRating).await;

    let err = s
        .service
        .create(&s.guest, s.listing.id, 1, "Flat tyre".to_string())
        .await
        .unwrap_err();

    assert!(err.is_retryable());
    assert_eq!(s.store.review_count().await, 0);
    let listing = s.store.find_listing(s.listing.id).await.unwrap().unwrap();
    assert_eq!(listing.rating().count(), 2);
    assert_eq!(listing.rating().mean(), 4.0);
}

#[tokio::test]
async fn test_failed_delete_keeps_review_and_ratings() {
    let s = setup().await;
    let outcome = s
        .service
        .create(&s.guest, s.listing.id, 5, "Great".to_string())
        .await
        .unwrap();
    s.store.fail_once(FailurePoint::Commit).await;

    assert!(s.service.delete(&s.guest, outcome.review.id).await.is_err());

    assert_eq!(s.store.review_count().await, 1);
    let listing = s.store.find_listing(s.listing.id).await.unwrap().unwrap();
    assert_eq!(listing.rating().count(), 3);
}

#[tokio::test]
async fn test_missing_entities_are_not_found() {
    let s = setup().await;

    let err = s
        .service
        .create(&s.guest, Uuid::new_v4(), 4, "?".to_string())
        .await
        .unwrap_err();
    assert_eq!(err.code(), "NOT_FOUND");

    let err = s.service.delete(&s.guest, Uuid::new_v4()).await.unwrap_err();
    assert_eq!(err.code(), "NOT_FOUND");

    assert!(s.service.reviews_for_listing(Uuid::new_v4()).await.is_err());
}

#[tokio::test]
async fn test_reviews_for_listing_newest_first() {
    let s = setup().await;
    let first = s
        .service
        .create(&s.guest, s.listing.id, 4, "First".to_string())
        .await
        .unwrap();
    tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    let second = s
        .service
        .create(&s.guest, s.listing.id, 5, "Second".to_string())
        .await
        .unwrap();

    let reviews = s.service.reviews_for_listing(s.listing.id).await.unwrap();
    let ids: Vec<Uuid> = reviews.iter().map(|r| r.id).collect();
    assert_eq!(ids, vec![second.review.id, first.review.id]);
}

#[tokio::test]
async fn test_unknown_author_cannot_review() {
    let s = setup().await;
    let ghost = Principal::user(Uuid::new_v4());

    let err = s
        .service
        .create(&ghost, s.listing.id, 5, "Great".to_string())
        .await
        .unwrap_err();

    assert!(matches!(err, DomainError::NotFound { ref resource, .. } if resource == "User"));
    assert_eq!(s.store.review_count().await, 0);
    let listing = s.store.find_listing(s.listing.id).await.unwrap().unwrap();
    assert_eq!(listing.rating(), RatingAggregate::restore(2, 4.0));
}
