//! User entity representing a registered marketplace member.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::domain::value_objects::RatingAggregate;
use crate::errors::ValidationError;

/// Self-service profile fields. `None` clears the field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Validate)]
pub struct ProfileUpdate {
    #[validate(length(max = 100))]
    pub first_name: Option<String>,

    #[validate(length(max = 100))]
    pub last_name: Option<String>,

    #[validate(length(max = 512))]
    pub picture: Option<String>,
}

impl ProfileUpdate {
    pub fn check(&self) -> Result<(), ValidationError> {
        self.validate()?;
        Ok(())
    }
}

/// User entity. Identity fields are owned by the identity collaborator;
/// the owner rating is written only by the rating aggregator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Unique identifier for the user
    pub id: Uuid,

    /// Unique email address
    pub email: String,

    pub first_name: Option<String>,

    pub last_name: Option<String>,

    /// Avatar URL
    pub picture: Option<String>,

    /// Identity provider name (e.g. "github"), `None` for local accounts
    pub provider: Option<String>,

    /// Subject identifier at the identity provider
    pub provider_id: Option<String>,

    /// Rating received as a listing owner
    #[serde(flatten)]
    rating: RatingAggregate,

    /// Timestamp when the user was created
    pub created_at: DateTime<Utc>,

    /// Timestamp when the user was last updated
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Creates a new User with an empty owner rating
    pub fn new(email: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            email: email.into(),
            first_name: None,
            last_name: None,
            picture: None,
            provider: None,
            provider_id: None,
            rating: RatingAggregate::empty(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Sets first and last name
    pub fn with_name(mut self, first_name: impl Into<String>, last_name: impl Into<String>) -> Self {
        self.first_name = Some(first_name.into());
        self.last_name = Some(last_name.into());
        self
    }

    /// Rehydrate a stored rating (row mapping only)
    pub fn with_rating(mut self, rating: RatingAggregate) -> Self {
        self.rating = rating;
        self
    }

    pub fn rating(&self) -> RatingAggregate {
        self.rating
    }

    /// Display name, falling back to the email address
    pub fn display_name(&self) -> String {
        match (&self.first_name, &self.last_name) {
            (Some(first), Some(last)) => format!("{} {}", first, last),
            (Some(first), None) => first.clone(),
            _ => self.email.clone(),
        }
    }

    /// Replace name and picture; email and rating are untouched
    pub fn apply_profile(&mut self, update: ProfileUpdate) {
        self.first_name = update.first_name;
        self.last_name = update.last_name;
        self.picture = update.picture;
        self.updated_at = Utc::now();
    }

    pub(crate) fn set_rating(&mut self, rating: RatingAggregate) {
        self.rating = rating;
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_user_creation() {
        let user = User::new("ana@example.com");

        assert_eq!(user.email, "ana@example.com");
        assert_eq!(user.rating().count(), 0);
        assert_eq!(user.rating().mean(), 0.0);
        assert!(user.provider.is_none());
    }

    #[test]
    fn test_display_name() {
        let user = User::new("ana@example.com");
        assert_eq!(user.display_name(), "ana@example.com");

        let named = user.with_name("Ana", "Lima");
        assert_eq!(named.display_name(), "Ana Lima");
    }

    #[test]
    fn test_apply_profile_keeps_email_and_rating() {
        let mut user = User::new("cy@example.com").with_rating(RatingAggregate::restore(2, 4.5));

        user.apply_profile(ProfileUpdate {
            first_name: Some("Cy".to_string()),
            last_name: None,
            picture: Some("https://img.example.com/cy.png".to_string()),
        });

        assert_eq!(user.display_name(), "Cy");
        assert_eq!(user.email, "cy@example.com");
        assert_eq!(user.rating().count(), 2);
        assert_eq!(user.rating().mean(), 4.5);
    }

    #[test]
    fn test_profile_update_length_limits() {
        let update = ProfileUpdate {
            first_name: Some("x".repeat(101)),
            ..ProfileUpdate::default()
        };
        assert!(matches!(update.check(), Err(ValidationError::InvalidFormat { ref field }) if field == "first_name"));
        assert!(ProfileUpdate::default().check().is_ok());
    }

    #[test]
    fn test_serialized_rating_fields() {
        let user = User::new("bo@example.com").with_rating(RatingAggregate::restore(4, 3.5));
        let json = serde_json::to_value(&user).unwrap();
        assert_eq!(json["rating"], 3.5);
        assert_eq!(json["reviews_count"], 4);
    }
}
