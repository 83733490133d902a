//! Listing entity: an item offered for rent by its owner.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::domain::value_objects::{check_money_amount, max_money_amount, RatingAggregate};
use crate::errors::{DomainError, DomainResult, ValidationError};

/// Statistics derived from reviews and completed rentals.
///
/// Only the rating aggregator and the rental lifecycle write these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ListingStatistics {
    #[serde(flatten)]
    pub rating: RatingAggregate,
    pub rentals_count: u32,
    pub total_earnings: Decimal,
}

/// Client-supplied listing fields (create and update)
#[derive(Debug, Clone, PartialEq, Deserialize, Validate)]
pub struct ListingDraft {
    #[validate(length(min = 1, max = 255))]
    pub title: String,

    #[validate(length(max = 2000))]
    pub description: Option<String>,

    pub price_per_day: Decimal,

    pub security_deposit: Option<Decimal>,

    #[validate(length(max = 255))]
    pub location: Option<String>,

    #[validate(length(max = 100))]
    pub category: Option<String>,

    #[serde(default)]
    pub features: Vec<String>,

    #[serde(default)]
    pub images: Vec<String>,
}

impl ListingDraft {
    /// Minimal draft with a title and daily price
    pub fn new(title: impl Into<String>, price_per_day: Decimal) -> Self {
        Self {
            title: title.into(),
            description: None,
            price_per_day,
            security_deposit: None,
            location: None,
            category: None,
            features: Vec::new(),
            images: Vec::new(),
        }
    }

    /// Validate field lengths and money amounts.
    ///
    /// Amounts must fit the stored money precision (see
    /// [`check_money_amount`]).
    pub fn check(&self) -> Result<(), ValidationError> {
        if !rc_shared::validation::not_blank(&self.title) {
            return Err(ValidationError::RequiredField {
                field: "title".to_string(),
            });
        }
        self.validate()?;
        if self.price_per_day <= Decimal::ZERO {
            return Err(ValidationError::OutOfRange {
                field: "price_per_day".to_string(),
                min: "0 (exclusive)".to_string(),
                max: "unbounded".to_string(),
            });
        }
        check_money_amount("price_per_day", self.price_per_day)?;
        if let Some(deposit) = self.security_deposit {
            if deposit < Decimal::ZERO {
                return Err(ValidationError::OutOfRange {
                    field: "security_deposit".to_string(),
                    min: "0".to_string(),
                    max: "unbounded".to_string(),
                });
            }
            check_money_amount("security_deposit", deposit)?;
        }
        Ok(())
    }
}

/// Listing entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Listing {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    /// Unique, URL-safe, assigned once at creation
    pub slug: String,
    pub price_per_day: Decimal,
    pub security_deposit: Option<Decimal>,
    pub location: Option<String>,
    pub category: Option<String>,
    pub features: Vec<String>,
    pub images: Vec<String>,
    pub is_active: bool,
    #[serde(flatten)]
    statistics: ListingStatistics,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Listing {
    /// Creates an active listing with zeroed statistics
    pub fn new(owner_id: Uuid, slug: String, draft: ListingDraft) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            owner_id,
            title: draft.title,
            description: draft.description,
            slug,
            price_per_day: draft.price_per_day,
            security_deposit: draft.security_deposit,
            location: draft.location,
            category: draft.category,
            features: draft.features,
            images: draft.images,
            is_active: true,
            statistics: ListingStatistics::default(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Rehydrate stored statistics (row mapping only)
    pub fn with_statistics(mut self, statistics: ListingStatistics) -> Self {
        self.statistics = statistics;
        self
    }

    pub fn statistics(&self) -> &ListingStatistics {
        &self.statistics
    }

    pub fn rating(&self) -> RatingAggregate {
        self.statistics.rating
    }

    pub fn rentals_count(&self) -> u32 {
        self.statistics.rentals_count
    }

    pub fn total_earnings(&self) -> Decimal {
        self.statistics.total_earnings
    }

    /// Replace client-editable fields; slug and statistics are untouched
    pub fn apply_draft(&mut self, draft: ListingDraft) {
        self.title = draft.title;
        self.description = draft.description;
        self.price_per_day = draft.price_per_day;
        self.security_deposit = draft.security_deposit;
        self.location = draft.location;
        self.category = draft.category;
        self.features = draft.features;
        self.images = draft.images;
        self.updated_at = Utc::now();
    }

    pub fn set_active(&mut self, active: bool) {
        self.is_active = active;
        self.updated_at = Utc::now();
    }

    pub(crate) fn set_rating(&mut self, rating: RatingAggregate) {
        self.statistics.rating = rating;
        self.updated_at = Utc::now();
    }

    pub(crate) fn record_completed_rental(&mut self, total_price: Decimal) -> DomainResult<()> {
        let overflow = || DomainError::Internal {
            message: format!("listing {} statistics overflow", self.id),
        };
        let rentals_count = self.statistics.rentals_count.checked_add(1).ok_or_else(overflow)?;
        let total_earnings = self
            .statistics
            .total_earnings
            .checked_add(total_price)
            .filter(|total| *total <= max_money_amount())
            .ok_or_else(overflow)?;
        self.statistics.rentals_count = rentals_count;
        self.statistics.total_earnings = total_earnings;
        self.updated_at = Utc::now();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_new_listing_defaults() {
        let owner = Uuid::new_v4();
        let listing = Listing::new(owner, "road-bike".into(), ListingDraft::new("Road bike", dec!(25)));

        assert_eq!(listing.owner_id, owner);
        assert!(listing.is_active);
        assert_eq!(listing.rating().count(), 0);
        assert_eq!(listing.rating().mean(), 0.0);
        assert_eq!(listing.rentals_count(), 0);
        assert_eq!(listing.total_earnings(), Decimal::ZERO);
    }

    #[test]
    fn test_apply_draft_keeps_slug_and_statistics() {
        let mut listing = Listing::new(Uuid::new_v4(), "tent".into(), ListingDraft::new("Tent", dec!(10)))
            .with_statistics(ListingStatistics {
                rating: RatingAggregate::restore(2, 4.0),
                rentals_count: 3,
                total_earnings: dec!(120),
            });

        listing.apply_draft(ListingDraft::new("Family tent", dec!(12)));

        assert_eq!(listing.title, "Family tent");
        assert_eq!(listing.slug, "tent");
        assert_eq!(listing.rentals_count(), 3);
        assert_eq!(listing.total_earnings(), dec!(120));
        assert_eq!(listing.rating().mean(), 4.0);
    }

    #[test]
    fn test_record_completed_rental() {
        let mut listing = Listing::new(Uuid::new_v4(), "kayak".into(), ListingDraft::new("Kayak", dec!(30)));
        listing.record_completed_rental(dec!(90)).unwrap();
        listing.record_completed_rental(dec!(30.50)).unwrap();
        assert_eq!(listing.rentals_count(), 2);
        assert_eq!(listing.total_earnings(), dec!(120.50));
    }

    #[test]
    fn test_earnings_past_stored_money_are_refused() {
        let mut listing = Listing::new(Uuid::new_v4(), "crane".into(), ListingDraft::new("Crane", dec!(30)))
            .with_statistics(ListingStatistics {
                rating: RatingAggregate::empty(),
                rentals_count: 1,
                total_earnings: dec!(999999999999999),
            });

        assert!(listing.record_completed_rental(dec!(1)).is_err());
        assert_eq!(listing.rentals_count(), 1);
    }

    #[test]
    fn test_draft_check() {
        assert!(ListingDraft::new("Drill", dec!(5)).check().is_ok());
        assert!(matches!(
            ListingDraft::new("   ", dec!(5)).check(),
            Err(ValidationError::RequiredField { .. })
        ));
        assert!(matches!(
            ListingDraft::new("Drill", dec!(0)).check(),
            Err(ValidationError::OutOfRange { .. })
        ));

        let mut long = ListingDraft::new("x".repeat(256), dec!(5));
        assert!(matches!(long.check(), Err(ValidationError::InvalidFormat { ref field }) if field == "title"));

        long.title = "Drill".into();
        long.security_deposit = Some(dec!(-1));
        assert!(long.check().is_err());
    }

    #[test]
    fn test_draft_money_must_fit_stored_precision() {
        assert!(matches!(
            ListingDraft::new("Van", dec!(0.12345)).check(),
            Err(ValidationError::InvalidFormat { ref field }) if field == "price_per_day"
        ));
        assert!(matches!(
            ListingDraft::new("Van", dec!(1000000000000000)).check(),
            Err(ValidationError::OutOfRange { ref field, .. }) if field == "price_per_day"
        ));

        let mut draft = ListingDraft::new("Van", dec!(0.1235));
        assert!(draft.check().is_ok());
        draft.security_deposit = Some(dec!(10.00001));
        assert!(matches!(
            draft.check(),
            Err(ValidationError::InvalidFormat { ref field }) if field == "security_deposit"
        ));
    }

    #[test]
    fn test_serialized_statistics_are_flat() {
        let listing = Listing::new(Uuid::new_v4(), "ladder".into(), ListingDraft::new("Ladder", dec!(8)));
        let json = serde_json::to_value(&listing).unwrap();
        assert_eq!(json["rating"], 0.0);
        assert_eq!(json["reviews_count"], 0);
        assert_eq!(json["rentals_count"], 0);
        assert_eq!(json["slug"], "ladder");
    }
}
