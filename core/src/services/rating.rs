//! Incremental rating aggregation for listings and their owners.
//!
//! Every operation here writes through the caller's transaction, so the
//! review write and both aggregate writes commit or roll back together.

use serde::Serialize;

use crate::domain::entities::{Listing, Review, User};
use crate::domain::value_objects::RatingAggregate;
use crate::errors::{DomainError, DomainResult};
use crate::repositories::StoreTransaction;

/// New aggregates after a review was added or removed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RatingUpdate {
    pub listing: RatingAggregate,
    pub owner: RatingAggregate,
}

/// Sole writer of listing and owner ratings
#[derive(Debug, Clone, Copy, Default)]
pub struct RatingAggregator;

impl RatingAggregator {
    /// Fold one more review of `value` into the listing and owner aggregates.
    ///
    /// `listing` and `owner` must already be locked in `tx`.
    pub async fn add_review<T: StoreTransaction>(
        tx: &mut T,
        listing: &mut Listing,
        owner: &mut User,
        value: u8,
    ) -> DomainResult<RatingUpdate> {
        Self::check_owner(listing, owner)?;
        let listing_rating = listing.rating().with_added(value)?;
        let owner_rating = owner.rating().with_added(value)?;
        Self::save(tx, listing, owner, listing_rating, owner_rating).await
    }

    /// Take one review of `value` out of the listing and owner aggregates.
    /// A count reaching zero resets the mean to `0.0`.
    pub async fn remove_review<T: StoreTransaction>(
        tx: &mut T,
        listing: &mut Listing,
        owner: &mut User,
        value: u8,
    ) -> DomainResult<RatingUpdate> {
        Self::check_owner(listing, owner)?;
        let listing_rating = listing.rating().with_removed(value)?;
        let owner_rating = owner.rating().with_removed(value)?;
        Self::save(tx, listing, owner, listing_rating, owner_rating).await
    }

    /// Remove the contribution of every review of a listing that is about to
    /// be deleted from its owner's aggregate
    pub async fn discard_listing_reviews<T: StoreTransaction>(
        tx: &mut T,
        owner: &mut User,
        reviews: &[Review],
    ) -> DomainResult<RatingAggregate> {
        let mut rating = owner.rating();
        for review in reviews {
            rating = rating.with_removed(review.rating)?;
        }
        owner.set_rating(rating);
        tx.save_user_rating(owner).await?;
        Ok(rating)
    }

    fn check_owner(listing: &Listing, owner: &User) -> DomainResult<()> {
        if listing.owner_id != owner.id {
            return Err(DomainError::Internal {
                message: format!("user {} does not own listing {}", owner.id, listing.id),
            });
        }
        Ok(())
    }

    async fn save<T: StoreTransaction>(
        tx: &mut T,
        listing: &mut Listing,
        owner: &mut User,
        listing_rating: RatingAggregate,
        owner_rating: RatingAggregate,
    ) -> DomainResult<RatingUpdate> {
        listing.set_rating(listing_rating);
        owner.set_rating(owner_rating);
        tx.save_listing_statistics(listing).await?;
        tx.save_user_rating(owner).await?;
        tracing::debug!(
            listing_id = %listing.id,
            listing_rating = listing_rating.mean(),
            owner_id = %owner.id,
            owner_rating = owner_rating.mean(),
            "ratings updated"
        );
        Ok(RatingUpdate {
            listing: listing_rating,
            owner: owner_rating,
        })
    }
}
