//! Shared setup for rental service tests.

use std::sync::Arc;

use chrono::NaiveDate;
use rc_shared::BookingConfig;
use rust_decimal_macros::dec;

use crate::domain::entities::{Listing, ListingDraft, User};
use crate::domain::value_objects::Principal;
use crate::repositories::InMemoryStore;
use crate::services::rental::RentalService;

pub struct Marketplace {
    pub store: Arc<InMemoryStore>,
    pub service: RentalService<InMemoryStore>,
    pub listing: Listing,
    pub owner: Principal,
    pub renter: Principal,
}

pub fn date(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
}

pub async fn marketplace() -> Marketplace {
    marketplace_with(BookingConfig::default()).await
}

pub async fn marketplace_with(config: BookingConfig) -> Marketplace {
    let store = Arc::new(InMemoryStore::new());
    let owner = User::new("owner@example.com");
    let renter = User::new("renter@example.com");
    let listing = Listing::new(owner.id, "camera".to_string(), ListingDraft::new("Camera", dec!(50)));

    store.seed_user(owner.clone()).await;
    store.seed_user(renter.clone()).await;
    store.seed_listing(listing.clone()).await;

    Marketplace {
        service: RentalService::new(Arc::clone(&store), config),
        store,
        listing,
        owner: Principal::user(owner.id),
        renter: Principal::user(renter.id),
    }
}
