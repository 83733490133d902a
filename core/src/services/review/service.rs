//! Review service.
//!
//! A review write, the listing aggregate write and the owner aggregate write
//! form one transaction. Rows are locked listing first, then the review,
//! then the owner.

use std::sync::Arc;

use rc_shared::BookingConfig;
use serde::Serialize;
use tracing::instrument;
use uuid::Uuid;

use crate::domain::entities::Review;
use crate::domain::value_objects::Principal;
use crate::errors::{DomainError, DomainResult, ValidationError};
use crate::repositories::{EntityStore, StoreTransaction};
use crate::services::authorization::{Action, Authorizer};
use crate::services::rating::{RatingAggregator, RatingUpdate};

/// Created review together with the aggregates it produced
#[derive(Debug, Clone, Serialize)]
pub struct ReviewOutcome {
    pub review: Review,
    pub ratings: RatingUpdate,
}

pub struct ReviewService<S>
where
    S: EntityStore,
{
    store: Arc<S>,
    authorizer: Authorizer,
    config: BookingConfig,
}

impl<S> ReviewService<S>
where
    S: EntityStore,
{
    pub fn new(store: Arc<S>, config: BookingConfig) -> Self {
        Self {
            store,
            authorizer: Authorizer::new(&config),
            config,
        }
    }

    /// Review a listing and fold the rating into listing and owner
    ///
    /// # Errors
    /// * `ValidationError::OutOfRange` - Rating outside the configured bounds
    /// * `ValidationError::RequiredField` - Blank content
    /// * `DomainError::NotFound` - Listing, its owner or the author does not exist
    /// * `DomainError::Unauthorized` - Caller owns the listing
    #[instrument(skip(self, principal, content), fields(author_id = %principal.user_id))]
    pub async fn create(
        &self,
        principal: &Principal,
        listing_id: Uuid,
        rating: u8,
        content: String,
    ) -> DomainResult<ReviewOutcome> {
        self.check_review(rating, &content)?;

        let mut tx = self.store.begin().await?;
        let mut listing = tx
            .lock_listing(listing_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Listing", listing_id))?;
        self.authorizer.authorize(
            principal,
            &Action::CreateReview {
                owner_id: listing.owner_id,
            },
        )?;
        if !tx.user_exists(principal.user_id).await? {
            return Err(DomainError::not_found("User", principal.user_id));
        }
        let mut owner = tx
            .lock_user(listing.owner_id)
            .await?
            .ok_or_else(|| DomainError::not_found("User", listing.owner_id))?;

        let review = Review::new(listing_id, principal.user_id, rating, content);
        tx.insert_review(&review).await?;
        let ratings = RatingAggregator::add_review(&mut tx, &mut listing, &mut owner, rating).await?;
        tx.commit().await?;

        tracing::info!(
            review_id = %review.id,
            listing_id = %listing_id,
            rating,
            listing_rating = ratings.listing.mean(),
            "review created"
        );
        Ok(ReviewOutcome { review, ratings })
    }

    /// Delete a review and take its rating back out of both aggregates.
    /// Only the author may delete.
    #[instrument(skip(self, principal), fields(user_id = %principal.user_id))]
    pub async fn delete(&self, principal: &Principal, review_id: Uuid) -> DomainResult<RatingUpdate> {
        let listing_id = self
            .store
            .find_review(review_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Review", review_id))?
            .listing_id;

        let mut tx = self.store.begin().await?;
        let mut listing = tx
            .lock_listing(listing_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Listing", listing_id))?;
        let review = tx
            .lock_review(review_id)
            .await?
            .filter(|r| r.listing_id == listing_id)
            .ok_or_else(|| DomainError::not_found("Review", review_id))?;
        self.authorizer.authorize(
            principal,
            &Action::DeleteReview {
                author_id: review.author_id,
            },
        )?;

        let mut owner = tx
            .lock_user(listing.owner_id)
            .await?
            .ok_or_else(|| DomainError::not_found("User", listing.owner_id))?;

        tx.delete_review(review_id).await?;
        let ratings = RatingAggregator::remove_review(&mut tx, &mut listing, &mut owner, review.rating).await?;
        tx.commit().await?;

        tracing::info!(review_id = %review_id, listing_id = %listing.id, "review deleted");
        Ok(ratings)
    }

    /// Reviews of a listing, newest first
    pub async fn reviews_for_listing(&self, listing_id: Uuid) -> DomainResult<Vec<Review>> {
        if self.store.find_listing(listing_id).await?.is_none() {
            return Err(DomainError::not_found("Listing", listing_id));
        }
        self.store.reviews_by_listing(listing_id).await
    }

    fn check_review(&self, rating: u8, content: &str) -> Result<(), ValidationError> {
        if !self.config.rating_in_bounds(rating) {
            return Err(ValidationError::OutOfRange {
                field: "rating".to_string(),
                min: self.config.min_rating.to_string(),
                max: self.config.max_rating.to_string(),
            });
        }
        if !rc_shared::validation::not_blank(content) {
            return Err(ValidationError::RequiredField {
                field: "content".to_string(),
            });
        }
        if !rc_shared::validation::char_len_between(content, 1, self.config.max_review_length) {
            return Err(ValidationError::OutOfRange {
                field: "content".to_string(),
                min: "1".to_string(),
                max: self.config.max_review_length.to_string(),
            });
        }
        Ok(())
    }
}
