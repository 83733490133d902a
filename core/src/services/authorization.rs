//! Single capability check run before every write.

use rc_shared::BookingConfig;
use uuid::Uuid;

use crate::domain::value_objects::{Principal, ROLE_USER};
use crate::errors::{BookingError, DomainError, DomainResult};

/// Action a principal wants to perform, with the ownership facts needed to
/// decide it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    BookRental { owner_id: Uuid },
    TransitionRental { owner_id: Uuid },
    ViewRental { owner_id: Uuid, renter_id: Uuid },
    ManageListing { owner_id: Uuid },
    CreateReview { owner_id: Uuid },
    DeleteReview { author_id: Uuid },
}

impl Action {
    fn name(&self) -> &'static str {
        match self {
            Action::BookRental { .. } => "book rental",
            Action::TransitionRental { .. } => "change rental status",
            Action::ViewRental { .. } => "view rental",
            Action::ManageListing { .. } => "manage listing",
            Action::CreateReview { .. } => "review listing",
            Action::DeleteReview { .. } => "delete review",
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Authorizer {
    allow_self_booking: bool,
}

impl Authorizer {
    pub fn new(config: &BookingConfig) -> Self {
        Self {
            allow_self_booking: config.allow_self_booking,
        }
    }

    /// Fails with `Unauthorized` unless the principal holds the user role
    pub fn require_user(&self, principal: &Principal) -> DomainResult<()> {
        if principal.has_role(ROLE_USER) {
            Ok(())
        } else {
            Err(DomainError::unauthorized(format!("{} is required", ROLE_USER)))
        }
    }

    /// Decide whether `principal` may perform `action`.
    ///
    /// Self-booking is reported as `BookingError::SelfBooking` so callers can
    /// tell it apart from a missing role.
    pub fn authorize(&self, principal: &Principal, action: &Action) -> DomainResult<()> {
        self.require_user(principal)?;
        let me = principal.user_id;
        let allowed = match *action {
            Action::BookRental { owner_id } => {
                if owner_id == me && !self.allow_self_booking {
                    tracing::warn!(user_id = %me, "self booking refused");
                    return Err(BookingError::SelfBooking.into());
                }
                true
            }
            Action::TransitionRental { owner_id } | Action::ManageListing { owner_id } => owner_id == me,
            Action::ViewRental { owner_id, renter_id } => owner_id == me || renter_id == me,
            Action::CreateReview { owner_id } => owner_id != me,
            Action::DeleteReview { author_id } => author_id == me,
        };
        if allowed {
            Ok(())
        } else {
            tracing::warn!(user_id = %me, action = action.name(), "authorization denied");
            Err(DomainError::unauthorized(action.name()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn owner_and_stranger() -> (Principal, Principal) {
        (Principal::user(Uuid::new_v4()), Principal::user(Uuid::new_v4()))
    }

    #[test]
    fn test_missing_role_is_unauthorized() {
        let principal = Principal::new(Uuid::new_v4(), vec!["ROLE_GUEST".to_string()]);
        let action = Action::DeleteReview {
            author_id: principal.user_id,
        };

        let err = Authorizer::default().authorize(&principal, &action).unwrap_err();
        assert_eq!(err.code(), "UNAUTHORIZED");
    }

    #[test]
    fn test_only_owner_transitions_rentals() {
        let (owner, stranger) = owner_and_stranger();
        let action = Action::TransitionRental {
            owner_id: owner.user_id,
        };
        let authorizer = Authorizer::default();

        assert!(authorizer.authorize(&owner, &action).is_ok());
        assert!(authorizer.authorize(&stranger, &action).is_err());
    }

    #[test]
    fn test_self_booking_follows_config() {
        let (owner, renter) = owner_and_stranger();
        let action = Action::BookRental {
            owner_id: owner.user_id,
        };

        let strict = Authorizer::default();
        let err = strict.authorize(&owner, &action).unwrap_err();
        assert_eq!(err.code(), "SELF_BOOKING");
        assert!(strict.authorize(&renter, &action).is_ok());

        let relaxed = Authorizer::new(&BookingConfig {
            allow_self_booking: true,
            ..Default::default()
        });
        assert!(relaxed.authorize(&owner, &action).is_ok());
    }

    #[test]
    fn test_view_rental_allows_both_parties() {
        let (owner, renter) = owner_and_stranger();
        let action = Action::ViewRental {
            owner_id: owner.user_id,
            renter_id: renter.user_id,
        };
        let authorizer = Authorizer::default();

        assert!(authorizer.authorize(&owner, &action).is_ok());
        assert!(authorizer.authorize(&renter, &action).is_ok());
        assert!(authorizer
            .authorize(&Principal::user(Uuid::new_v4()), &action)
            .is_err());
    }

    #[test]
    fn test_owner_cannot_review_own_listing() {
        let (owner, guest) = owner_and_stranger();
        let action = Action::CreateReview {
            owner_id: owner.user_id,
        };
        let authorizer = Authorizer::default();

        assert!(authorizer.authorize(&owner, &action).is_err());
        assert!(authorizer.authorize(&guest, &action).is_ok());
    }
}
