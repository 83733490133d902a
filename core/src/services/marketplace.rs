//! Composition root wiring every service onto one shared store.

use std::sync::Arc;

use rc_shared::BookingConfig;

use crate::repositories::EntityStore;
use crate::services::availability::AvailabilityChecker;
use crate::services::listing::ListingService;
use crate::services::rental::RentalService;
use crate::services::review::ReviewService;
use crate::services::user::UserService;

/// All marketplace services sharing a single entity store
pub struct MarketplaceServices<S>
where
    S: EntityStore,
{
    pub availability: AvailabilityChecker<S>,
    pub listings: ListingService<S>,
    pub rentals: RentalService<S>,
    pub reviews: ReviewService<S>,
    pub users: UserService<S>,
}

impl<S> MarketplaceServices<S>
where
    S: EntityStore,
{
    pub fn new(store: Arc<S>, config: BookingConfig) -> Self {
        Self {
            availability: AvailabilityChecker::new(Arc::clone(&store)),
            listings: ListingService::new(Arc::clone(&store), config.clone()),
            rentals: RentalService::new(Arc::clone(&store), config.clone()),
            reviews: ReviewService::new(Arc::clone(&store), config.clone()),
            users: UserService::new(store, config),
        }
    }
}
