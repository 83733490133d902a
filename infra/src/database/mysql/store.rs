//! MySQL entity store: plain reads on the pool, writes through
//! [`MySqlTransaction`].

use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::mysql::MySqlArguments;
use sqlx::query::Query;
use sqlx::{MySql, MySqlPool};
use uuid::Uuid;

use rc_core::domain::entities::{Listing, Rental, Review, User};
use rc_core::errors::{DomainError, ValidationError};
use rc_core::repositories::{EntityStore, ListingRepository, RentalRepository, ReviewRepository, UserRepository};

use super::rows::{
    listing_from_row, rental_from_row, review_from_row, user_from_row, BLOCKING_STATUSES, LISTING_COLUMNS,
    RENTAL_COLUMNS, REVIEW_COLUMNS, USER_COLUMNS,
};
use super::transaction::MySqlTransaction;
use crate::database::errors::{classify, is_duplicate_key};

/// MySQL implementation of the entity store
#[derive(Clone)]
pub struct MySqlEntityStore {
    /// Database connection pool
    pool: MySqlPool,
}

impl MySqlEntityStore {
    /// Create a new MySQL entity store
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    async fn fetch_listings(&self, query: Query<'_, MySql, MySqlArguments>) -> Result<Vec<Listing>, DomainError> {
        let rows = query
            .fetch_all(&self.pool)
            .await
            .map_err(|e| classify(e, "Failed to load listings"))?;
        rows.iter().map(listing_from_row).collect()
    }

    async fn fetch_rentals(&self, query: &str, id: Uuid) -> Result<Vec<Rental>, DomainError> {
        let rows = sqlx::query(query)
            .bind(id.to_string())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| classify(e, "Failed to load rentals"))?;
        rows.iter().map(rental_from_row).collect()
    }

    async fn fetch_reviews(&self, query: &str, id: Uuid) -> Result<Vec<Review>, DomainError> {
        let rows = sqlx::query(query)
            .bind(id.to_string())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| classify(e, "Failed to load reviews"))?;
        rows.iter().map(review_from_row).collect()
    }
}

#[async_trait]
impl ListingRepository for MySqlEntityStore {
    async fn find_listing(&self, id: Uuid) -> Result<Option<Listing>, DomainError> {
        let query = format!("SELECT {} FROM listings l WHERE l.id = ?", LISTING_COLUMNS);
        let row = sqlx::query(&query)
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| classify(e, "Failed to find listing"))?;
        row.as_ref().map(listing_from_row).transpose()
    }

    async fn find_listing_by_slug(&self, slug: &str) -> Result<Option<Listing>, DomainError> {
        let query = format!("SELECT {} FROM listings l WHERE l.slug = ?", LISTING_COLUMNS);
        let row = sqlx::query(&query)
            .bind(slug)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| classify(e, "Failed to find listing by slug"))?;
        row.as_ref().map(listing_from_row).transpose()
    }

    async fn listings_by_owner(&self, owner_id: Uuid) -> Result<Vec<Listing>, DomainError> {
        let query = format!(
            "SELECT {} FROM listings l WHERE l.owner_id = ? ORDER BY l.created_at DESC",
            LISTING_COLUMNS
        );
        let rows = sqlx::query(&query)
            .bind(owner_id.to_string())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| classify(e, "Failed to load listings"))?;
        rows.iter().map(listing_from_row).collect()
    }

    async fn active_listings(&self) -> Result<Vec<Listing>, DomainError> {
        let query = format!(
            "SELECT {} FROM listings l WHERE l.is_active = TRUE ORDER BY l.created_at DESC",
            LISTING_COLUMNS
        );
        self.fetch_listings(sqlx::query(&query)).await
    }

    async fn listings_by_category(&self, category: &str) -> Result<Vec<Listing>, DomainError> {
        let query = format!(
            "SELECT {} FROM listings l \
             WHERE l.is_active = TRUE AND LOWER(l.category) = LOWER(?) \
             ORDER BY l.created_at DESC",
            LISTING_COLUMNS
        );
        self.fetch_listings(sqlx::query(&query).bind(category)).await
    }

    async fn search_listings(&self, query: &str) -> Result<Vec<Listing>, DomainError> {
        let pattern = like_pattern(query);
        let sql = format!(
            "SELECT {} FROM listings l \
             WHERE l.is_active = TRUE \
             AND (LOWER(l.title) LIKE ? OR LOWER(l.description) LIKE ?) \
             ORDER BY l.created_at DESC",
            LISTING_COLUMNS
        );
        self.fetch_listings(sqlx::query(&sql).bind(&pattern).bind(&pattern))
            .await
    }

    async fn listings_in_price_range(
        &self,
        category: &str,
        min: Decimal,
        max: Decimal,
    ) -> Result<Vec<Listing>, DomainError> {
        let query = format!(
            "SELECT {} FROM listings l \
             WHERE l.is_active = TRUE AND LOWER(l.category) = LOWER(?) \
             AND l.price_per_day BETWEEN ? AND ? \
             ORDER BY l.created_at DESC",
            LISTING_COLUMNS
        );
        self.fetch_listings(sqlx::query(&query).bind(category).bind(min).bind(max))
            .await
    }

    async fn featured_listings(&self, limit: usize) -> Result<Vec<Listing>, DomainError> {
        let query = format!(
            "SELECT {} FROM listings l WHERE l.is_active = TRUE ORDER BY l.created_at DESC LIMIT ?",
            LISTING_COLUMNS
        );
        let limit = u64::try_from(limit).unwrap_or(u64::MAX);
        self.fetch_listings(sqlx::query(&query).bind(limit)).await
    }
}

/// Lowercased `%query%` with LIKE wildcards in `query` matched literally
fn like_pattern(query: &str) -> String {
    let mut pattern = String::with_capacity(query.len() + 2);
    pattern.push('%');
    for c in query.to_lowercase().chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

#[async_trait]
impl RentalRepository for MySqlEntityStore {
    async fn find_rental(&self, id: Uuid) -> Result<Option<Rental>, DomainError> {
        let query = format!("SELECT {} FROM rentals r WHERE r.id = ?", RENTAL_COLUMNS);
        let row = sqlx::query(&query)
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| classify(e, "Failed to find rental"))?;
        row.as_ref().map(rental_from_row).transpose()
    }

    async fn rentals_by_renter(&self, renter_id: Uuid) -> Result<Vec<Rental>, DomainError> {
        let query = format!(
            "SELECT {} FROM rentals r WHERE r.renter_id = ? ORDER BY r.start_date DESC, r.created_at DESC",
            RENTAL_COLUMNS
        );
        self.fetch_rentals(&query, renter_id).await
    }

    async fn rentals_by_owner(&self, owner_id: Uuid) -> Result<Vec<Rental>, DomainError> {
        let query = format!(
            "SELECT {} FROM rentals r JOIN listings l ON l.id = r.listing_id \
             WHERE l.owner_id = ? ORDER BY r.start_date DESC, r.created_at DESC",
            RENTAL_COLUMNS
        );
        self.fetch_rentals(&query, owner_id).await
    }

    async fn blocking_rentals(&self, listing_id: Uuid) -> Result<Vec<Rental>, DomainError> {
        let query = format!(
            "SELECT {} FROM rentals r WHERE r.listing_id = ? AND r.status IN {} ORDER BY r.start_date",
            RENTAL_COLUMNS, BLOCKING_STATUSES
        );
        self.fetch_rentals(&query, listing_id).await
    }
}

#[async_trait]
impl ReviewRepository for MySqlEntityStore {
    async fn find_review(&self, id: Uuid) -> Result<Option<Review>, DomainError> {
        let query = format!("SELECT {} FROM reviews v WHERE v.id = ?", REVIEW_COLUMNS);
        let row = sqlx::query(&query)
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| classify(e, "Failed to find review"))?;
        row.as_ref().map(review_from_row).transpose()
    }

    async fn reviews_by_listing(&self, listing_id: Uuid) -> Result<Vec<Review>, DomainError> {
        let query = format!(
            "SELECT {} FROM reviews v WHERE v.listing_id = ? ORDER BY v.created_at DESC",
            REVIEW_COLUMNS
        );
        self.fetch_reviews(&query, listing_id).await
    }

    async fn reviews_by_author(&self, author_id: Uuid) -> Result<Vec<Review>, DomainError> {
        let query = format!(
            "SELECT {} FROM reviews v WHERE v.author_id = ? ORDER BY v.created_at DESC",
            REVIEW_COLUMNS
        );
        self.fetch_reviews(&query, author_id).await
    }
}

#[async_trait]
impl UserRepository for MySqlEntityStore {
    async fn find_user(&self, id: Uuid) -> Result<Option<User>, DomainError> {
        let query = format!("SELECT {} FROM users u WHERE u.id = ?", USER_COLUMNS);
        let row = sqlx::query(&query)
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| classify(e, "Failed to find user"))?;
        row.as_ref().map(user_from_row).transpose()
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, DomainError> {
        let query = format!("SELECT {} FROM users u WHERE u.email = ?", USER_COLUMNS);
        let row = sqlx::query(&query)
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| classify(e, "Failed to find user by email"))?;
        row.as_ref().map(user_from_row).transpose()
    }

    async fn user_exists_by_email(&self, email: &str) -> Result<bool, DomainError> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE email = ?")
            .bind(email)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| classify(e, "Failed to check user existence"))?;
        Ok(total > 0)
    }

    async fn create_user(&self, user: User) -> Result<User, DomainError> {
        if !rc_shared::validation::is_valid_email(&user.email) {
            return Err(ValidationError::InvalidFormat {
                field: "email".to_string(),
            }
            .into());
        }
        let rating = user.rating();
        let result = sqlx::query(
            r#"
            INSERT INTO users (
                id, email, first_name, last_name, picture, provider, provider_id,
                rating, reviews_count, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(user.id.to_string())
        .bind(&user.email)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.picture)
        .bind(&user.provider)
        .bind(&user.provider_id)
        .bind(rating.mean())
        .bind(rating.count())
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => {
                tracing::info!(user_id = %user.id, "user created");
                Ok(user)
            }
            Err(e) if is_duplicate_key(&e) => Err(ValidationError::DuplicateValue {
                field: "email".to_string(),
            }
            .into()),
            Err(e) => Err(classify(e, "Failed to create user")),
        }
    }
}

#[async_trait]
impl EntityStore for MySqlEntityStore {
    type Tx = MySqlTransaction;

    async fn begin(&self) -> Result<Self::Tx, DomainError> {
        let tx = self
            .pool
            .begin()
            .await
            .map_err(|e| classify(e, "Failed to begin transaction"))?;
        Ok(MySqlTransaction::new(tx))
    }
}
