//! Listing service: create, edit, (de)activate and delete listings, plus
//! the public browse and search queries.
//!
//! Statistics are never written here except when a deleted listing's reviews
//! are taken out of the owner's rating.

use std::sync::Arc;

use rc_shared::slug::{slug_with_suffix, slugify};
use rc_shared::BookingConfig;
use rust_decimal::Decimal;
use tracing::instrument;
use uuid::Uuid;

use crate::domain::entities::{Listing, ListingDraft};
use crate::domain::value_objects::Principal;
use crate::errors::{DomainError, DomainResult, ValidationError};
use crate::repositories::{EntityStore, StoreTransaction};
use crate::services::authorization::{Action, Authorizer};
use crate::services::rating::RatingAggregator;

/// Number of listings returned by [`ListingService::featured`]
pub const FEATURED_LISTINGS: usize = 8;

pub struct ListingService<S>
where
    S: EntityStore,
{
    store: Arc<S>,
    authorizer: Authorizer,
}

impl<S> ListingService<S>
where
    S: EntityStore,
{
    pub fn new(store: Arc<S>, config: BookingConfig) -> Self {
        Self {
            store,
            authorizer: Authorizer::new(&config),
        }
    }

    /// Create an active listing owned by the caller.
    ///
    /// The slug is derived from the title; a taken slug gets `-1`, `-2`, ...
    /// appended until it is free. A slug claimed by a concurrent create
    /// between the check and the insert moves on to the next suffix.
    #[instrument(skip(self, principal, draft), fields(owner_id = %principal.user_id))]
    pub async fn create(&self, principal: &Principal, draft: ListingDraft) -> DomainResult<Listing> {
        self.authorizer.require_user(principal)?;
        draft.check()?;

        let mut tx = self.store.begin().await?;
        if tx.lock_user(principal.user_id).await?.is_none() {
            return Err(DomainError::not_found("User", principal.user_id));
        }

        let base = slugify(&draft.title);
        let mut listing = Listing::new(principal.user_id, base.clone(), draft);
        let mut counter = 0u32;
        loop {
            let candidate = slug_with_suffix(&base, counter);
            if !tx.slug_exists(&candidate).await? {
                listing.slug = candidate;
                match tx.insert_listing(&listing).await {
                    Ok(()) => break,
                    Err(DomainError::Validation(ValidationError::DuplicateValue { ref field })) if field == "slug" => {
                        tracing::debug!(slug = %listing.slug, "slug claimed concurrently");
                    }
                    Err(err) => return Err(err),
                }
            }
            counter = counter.checked_add(1).ok_or_else(|| DomainError::Internal {
                message: format!("no free slug for {}", base),
            })?;
        }
        tx.commit().await?;

        tracing::info!(listing_id = %listing.id, slug = %listing.slug, "listing created");
        Ok(listing)
    }

    /// Replace the client-editable fields of a listing
    #[instrument(skip(self, principal, draft), fields(user_id = %principal.user_id))]
    pub async fn update_details(
        &self,
        principal: &Principal,
        listing_id: Uuid,
        draft: ListingDraft,
    ) -> DomainResult<Listing> {
        draft.check()?;
        let mut tx = self.store.begin().await?;
        let mut listing = self.lock_owned(&mut tx, principal, listing_id).await?;

        listing.apply_draft(draft);
        tx.update_listing(&listing).await?;
        tx.commit().await?;

        tracing::info!(listing_id = %listing_id, "listing updated");
        Ok(listing)
    }

    /// Activate or deactivate a listing. Inactive listings take no bookings.
    #[instrument(skip(self, principal), fields(user_id = %principal.user_id))]
    pub async fn set_active(&self, principal: &Principal, listing_id: Uuid, active: bool) -> DomainResult<Listing> {
        let mut tx = self.store.begin().await?;
        let mut listing = self.lock_owned(&mut tx, principal, listing_id).await?;

        listing.set_active(active);
        tx.update_listing(&listing).await?;
        tx.commit().await?;

        tracing::info!(listing_id = %listing_id, active, "listing activity changed");
        Ok(listing)
    }

    /// Delete a listing with its reviews and rentals.
    ///
    /// # Errors
    /// * `ValidationError::BusinessRuleViolation` - A pending or confirmed
    ///   rental still exists
    #[instrument(skip(self, principal), fields(user_id = %principal.user_id))]
    pub async fn delete(&self, principal: &Principal, listing_id: Uuid) -> DomainResult<()> {
        let mut tx = self.store.begin().await?;
        let listing = self.lock_owned(&mut tx, principal, listing_id).await?;

        let blocking = tx.count_blocking_rentals(listing_id).await?;
        if blocking > 0 {
            tracing::warn!(listing_id = %listing_id, blocking, "listing still has open rentals");
            return Err(ValidationError::BusinessRuleViolation {
                rule: format!("listing has {} pending or confirmed rentals", blocking),
            }
            .into());
        }

        let reviews = tx.listing_reviews(listing_id).await?;
        if !reviews.is_empty() {
            let mut owner = tx
                .lock_user(listing.owner_id)
                .await?
                .ok_or_else(|| DomainError::not_found("User", listing.owner_id))?;
            RatingAggregator::discard_listing_reviews(&mut tx, &mut owner, &reviews).await?;
        }

        tx.delete_listing(listing_id).await?;
        tx.commit().await?;

        tracing::info!(listing_id = %listing_id, reviews = reviews.len(), "listing deleted");
        Ok(())
    }

    pub async fn find_by_id(&self, listing_id: Uuid) -> DomainResult<Listing> {
        self.store
            .find_listing(listing_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Listing", listing_id))
    }

    pub async fn find_by_slug(&self, slug: &str) -> DomainResult<Listing> {
        self.store
            .find_listing_by_slug(slug)
            .await?
            .ok_or_else(|| DomainError::not_found("Listing", slug))
    }

    /// Listings of an owner, newest first
    pub async fn listings_for_owner(&self, owner_id: Uuid) -> DomainResult<Vec<Listing>> {
        self.store.listings_by_owner(owner_id).await
    }

    /// Every active listing, newest first
    pub async fn browse(&self) -> DomainResult<Vec<Listing>> {
        self.store.active_listings().await
    }

    /// Active listings of a category, newest first
    pub async fn by_category(&self, category: &str) -> DomainResult<Vec<Listing>> {
        let category = required("category", category)?;
        self.store.listings_by_category(category).await
    }

    /// Active listings whose title or description contains `query`.
    /// A blank query matches every active listing.
    #[instrument(skip(self))]
    pub async fn search(&self, query: &str) -> DomainResult<Vec<Listing>> {
        let query = query.trim();
        let found = if query.is_empty() {
            self.store.active_listings().await?
        } else {
            self.store.search_listings(query).await?
        };
        tracing::debug!(results = found.len(), "listing search");
        Ok(found)
    }

    /// Active listings of a category priced per day within `[min, max]`
    ///
    /// # Errors
    /// * `ValidationError::RequiredField` - Blank category
    /// * `ValidationError::OutOfRange` - Negative `min` or `min > max`
    pub async fn in_price_range(&self, category: &str, min: Decimal, max: Decimal) -> DomainResult<Vec<Listing>> {
        let category = required("category", category)?;
        if min < Decimal::ZERO || min > max {
            return Err(ValidationError::OutOfRange {
                field: "price_per_day".to_string(),
                min: min.to_string(),
                max: max.to_string(),
            }
            .into());
        }
        self.store.listings_in_price_range(category, min, max).await
    }

    /// The most recently created active listings
    pub async fn featured(&self) -> DomainResult<Vec<Listing>> {
        self.store.featured_listings(FEATURED_LISTINGS).await
    }

    async fn lock_owned(&self, tx: &mut S::Tx, principal: &Principal, listing_id: Uuid) -> DomainResult<Listing> {
        let listing = tx
            .lock_listing(listing_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Listing", listing_id))?;
        self.authorizer.authorize(
            principal,
            &Action::ManageListing {
                owner_id: listing.owner_id,
            },
        )?;
        Ok(listing)
    }
}

fn required<'a>(field: &str, value: &'a str) -> Result<&'a str, ValidationError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ValidationError::RequiredField {
            field: field.to_string(),
        });
    }
    Ok(value)
}
