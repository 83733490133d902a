//! Profile reads and self-service profile edits.
//!
//! Identity fields and the owner rating are never written here.

use std::sync::Arc;

use rc_shared::BookingConfig;
use tracing::instrument;
use uuid::Uuid;

use crate::domain::entities::{ProfileUpdate, User};
use crate::domain::value_objects::Principal;
use crate::errors::{DomainError, DomainResult};
use crate::repositories::{EntityStore, StoreTransaction};
use crate::services::authorization::Authorizer;

pub struct UserService<S>
where
    S: EntityStore,
{
    store: Arc<S>,
    authorizer: Authorizer,
}

impl<S> UserService<S>
where
    S: EntityStore,
{
    pub fn new(store: Arc<S>, config: BookingConfig) -> Self {
        Self {
            store,
            authorizer: Authorizer::new(&config),
        }
    }

    /// The caller's own profile
    pub async fn me(&self, principal: &Principal) -> DomainResult<User> {
        self.authorizer.require_user(principal)?;
        self.profile(principal.user_id).await
    }

    /// Public profile of any member
    pub async fn profile(&self, user_id: Uuid) -> DomainResult<User> {
        self.store
            .find_user(user_id)
            .await?
            .ok_or_else(|| DomainError::not_found("User", user_id))
    }

    /// Replace the caller's name and picture.
    ///
    /// # Errors
    /// * `ValidationError::InvalidFormat` - A field exceeds its length limit
    /// * `DomainError::NotFound` - The caller has no user row
    #[instrument(skip(self, principal, update), fields(user_id = %principal.user_id))]
    pub async fn update_me(&self, principal: &Principal, update: ProfileUpdate) -> DomainResult<User> {
        self.authorizer.require_user(principal)?;
        update.check()?;

        let mut tx = self.store.begin().await?;
        let mut user = tx
            .lock_user(principal.user_id)
            .await?
            .ok_or_else(|| DomainError::not_found("User", principal.user_id))?;

        user.apply_profile(update);
        tx.update_user_profile(&user).await?;
        tx.commit().await?;

        tracing::info!(user_id = %user.id, "profile updated");
        Ok(user)
    }
}
