//! User repository trait defining the interface for user data persistence.
//!
//! Users are created and maintained by the identity collaborator; the core
//! reads them for authorization and owner ratings.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::entities::user::User;
use crate::errors::DomainError;

/// Repository trait for User entity persistence operations
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Find a user by their unique identifier
    ///
    /// # Returns
    /// * `Ok(Some(User))` - User found
    /// * `Ok(None)` - No user found with given ID
    /// * `Err(DomainError)` - Database or other error occurred
    async fn find_user(&self, id: Uuid) -> Result<Option<User>, DomainError>;

    /// Find a user by email address
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, DomainError>;

    /// Check if a user exists with the given email
    async fn user_exists_by_email(&self, email: &str) -> Result<bool, DomainError>;

    /// Create a new user
    ///
    /// # Returns
    /// * `Ok(User)` - The created user
    /// * `Err(DomainError)` - Creation failed (duplicate email surfaces as
    ///   `ValidationError::DuplicateValue`)
    ///
    /// # Example
    /// ```no_run
    /// # use rc_core::repositories::UserRepository;
    /// # use rc_core::domain::entities::user::User;
    /// # async fn example(repo: &impl UserRepository) -> Result<(), Box<dyn std::error::Error>> {
    /// let created = repo.create_user(User::new("ana@example.com")).await?;
    /// println!("Created user with ID: {}", created.id);
    /// # Ok(())
    /// # }
    /// ```
    async fn create_user(&self, user: User) -> Result<User, DomainError>;
}
