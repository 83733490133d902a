//! Row-locking transaction over a pooled MySQL connection.
//!
//! `lock_*` use `SELECT ... FOR UPDATE`. Rental and review scans use
//! `LOCK IN SHARE MODE` so they read the latest committed rows rather than
//! the transaction's snapshot.

use async_trait::async_trait;
use sqlx::types::Json;
use sqlx::{MySql, Transaction};
use uuid::Uuid;

use rc_core::domain::entities::{Listing, Rental, Review, User};
use rc_core::domain::value_objects::BookingPeriod;
use rc_core::errors::{DomainError, ValidationError};
use rc_core::repositories::StoreTransaction;

use super::rows::{
    listing_from_row, rental_from_row, review_from_row, user_from_row, BLOCKING_STATUSES, LISTING_COLUMNS,
    RENTAL_COLUMNS, REVIEW_COLUMNS, USER_COLUMNS,
};
use crate::database::errors::{classify, is_duplicate_key};

/// Transaction handed out by [`MySqlEntityStore`](super::MySqlEntityStore).
/// Dropping it without commit rolls back.
pub struct MySqlTransaction {
    tx: Transaction<'static, MySql>,
}

impl MySqlTransaction {
    pub(super) fn new(tx: Transaction<'static, MySql>) -> Self {
        Self { tx }
    }

    fn expect_one(rows_affected: u64, resource: &str, id: Uuid) -> Result<(), DomainError> {
        if rows_affected == 0 {
            return Err(DomainError::not_found(resource, id));
        }
        Ok(())
    }
}

#[async_trait]
impl StoreTransaction for MySqlTransaction {
    async fn lock_listing(&mut self, id: Uuid) -> Result<Option<Listing>, DomainError> {
        let query = format!("SELECT {} FROM listings l WHERE l.id = ? FOR UPDATE", LISTING_COLUMNS);
        let row = sqlx::query(&query)
            .bind(id.to_string())
            .fetch_optional(&mut *self.tx)
            .await
            .map_err(|e| classify(e, "Failed to lock listing"))?;
        row.as_ref().map(listing_from_row).transpose()
    }

    async fn lock_user(&mut self, id: Uuid) -> Result<Option<User>, DomainError> {
        let query = format!("SELECT {} FROM users u WHERE u.id = ? FOR UPDATE", USER_COLUMNS);
        let row = sqlx::query(&query)
            .bind(id.to_string())
            .fetch_optional(&mut *self.tx)
            .await
            .map_err(|e| classify(e, "Failed to lock user"))?;
        row.as_ref().map(user_from_row).transpose()
    }

    async fn lock_rental(&mut self, id: Uuid) -> Result<Option<Rental>, DomainError> {
        let query = format!("SELECT {} FROM rentals r WHERE r.id = ? FOR UPDATE", RENTAL_COLUMNS);
        let row = sqlx::query(&query)
            .bind(id.to_string())
            .fetch_optional(&mut *self.tx)
            .await
            .map_err(|e| classify(e, "Failed to lock rental"))?;
        row.as_ref().map(rental_from_row).transpose()
    }

    async fn lock_review(&mut self, id: Uuid) -> Result<Option<Review>, DomainError> {
        let query = format!("SELECT {} FROM reviews v WHERE v.id = ? FOR UPDATE", REVIEW_COLUMNS);
        let row = sqlx::query(&query)
            .bind(id.to_string())
            .fetch_optional(&mut *self.tx)
            .await
            .map_err(|e| classify(e, "Failed to lock review"))?;
        row.as_ref().map(review_from_row).transpose()
    }

    async fn user_exists(&mut self, id: Uuid) -> Result<bool, DomainError> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE id = ?")
            .bind(id.to_string())
            .fetch_one(&mut *self.tx)
            .await
            .map_err(|e| classify(e, "Failed to check user"))?;
        Ok(total > 0)
    }

    async fn blocking_rentals_overlapping(
        &mut self,
        listing_id: Uuid,
        period: &BookingPeriod,
    ) -> Result<Vec<Rental>, DomainError> {
        // [s, e] overlaps [s', e'] iff s <= e' AND s' <= e
        let query = format!(
            "SELECT {} FROM rentals r \
             WHERE r.listing_id = ? AND r.status IN {} AND r.start_date <= ? AND ? <= r.end_date \
             ORDER BY r.start_date LOCK IN SHARE MODE",
            RENTAL_COLUMNS, BLOCKING_STATUSES
        );
        let rows = sqlx::query(&query)
            .bind(listing_id.to_string())
            .bind(period.end())
            .bind(period.start())
            .fetch_all(&mut *self.tx)
            .await
            .map_err(|e| classify(e, "Failed to check availability"))?;
        rows.iter().map(rental_from_row).collect()
    }

    async fn count_blocking_rentals(&mut self, listing_id: Uuid) -> Result<u64, DomainError> {
        let query = format!(
            "SELECT COUNT(*) FROM rentals WHERE listing_id = ? AND status IN {} LOCK IN SHARE MODE",
            BLOCKING_STATUSES
        );
        let total: i64 = sqlx::query_scalar(&query)
            .bind(listing_id.to_string())
            .fetch_one(&mut *self.tx)
            .await
            .map_err(|e| classify(e, "Failed to count rentals"))?;
        Ok(u64::try_from(total).unwrap_or(0))
    }

    async fn listing_reviews(&mut self, listing_id: Uuid) -> Result<Vec<Review>, DomainError> {
        let query = format!(
            "SELECT {} FROM reviews v WHERE v.listing_id = ? ORDER BY v.created_at DESC LOCK IN SHARE MODE",
            REVIEW_COLUMNS
        );
        let rows = sqlx::query(&query)
            .bind(listing_id.to_string())
            .fetch_all(&mut *self.tx)
            .await
            .map_err(|e| classify(e, "Failed to load reviews"))?;
        rows.iter().map(review_from_row).collect()
    }

    async fn insert_rental(&mut self, rental: &Rental) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO rentals (
                id, listing_id, renter_id, start_date, end_date, total_price,
                status, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(rental.id.to_string())
        .bind(rental.listing_id.to_string())
        .bind(rental.renter_id.to_string())
        .bind(rental.period.start())
        .bind(rental.period.end())
        .bind(rental.total_price)
        .bind(rental.status().as_str())
        .bind(rental.created_at)
        .bind(rental.updated_at)
        .execute(&mut *self.tx)
        .await
        .map_err(|e| classify(e, "Failed to insert rental"))?;
        Ok(())
    }

    async fn update_rental_status(&mut self, rental: &Rental) -> Result<(), DomainError> {
        let result = sqlx::query("UPDATE rentals SET status = ?, updated_at = ? WHERE id = ?")
            .bind(rental.status().as_str())
            .bind(rental.updated_at)
            .bind(rental.id.to_string())
            .execute(&mut *self.tx)
            .await
            .map_err(|e| classify(e, "Failed to update rental status"))?;
        Self::expect_one(result.rows_affected(), "Rental", rental.id)
    }

    async fn save_listing_statistics(&mut self, listing: &Listing) -> Result<(), DomainError> {
        let rating = listing.rating();
        let result = sqlx::query(
            r#"
            UPDATE listings
            SET rating = ?, reviews_count = ?, rentals_count = ?, total_earnings = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(rating.mean())
        .bind(rating.count())
        .bind(listing.rentals_count())
        .bind(listing.total_earnings())
        .bind(listing.updated_at)
        .bind(listing.id.to_string())
        .execute(&mut *self.tx)
        .await
        .map_err(|e| classify(e, "Failed to save listing statistics"))?;
        Self::expect_one(result.rows_affected(), "Listing", listing.id)
    }

    async fn save_user_rating(&mut self, user: &User) -> Result<(), DomainError> {
        let rating = user.rating();
        let result = sqlx::query("UPDATE users SET rating = ?, reviews_count = ?, updated_at = ? WHERE id = ?")
            .bind(rating.mean())
            .bind(rating.count())
            .bind(user.updated_at)
            .bind(user.id.to_string())
            .execute(&mut *self.tx)
            .await
            .map_err(|e| classify(e, "Failed to save user rating"))?;
        Self::expect_one(result.rows_affected(), "User", user.id)
    }

    async fn update_user_profile(&mut self, user: &User) -> Result<(), DomainError> {
        let result =
            sqlx::query("UPDATE users SET first_name = ?, last_name = ?, picture = ?, updated_at = ? WHERE id = ?")
                .bind(&user.first_name)
                .bind(&user.last_name)
                .bind(&user.picture)
                .bind(user.updated_at)
                .bind(user.id.to_string())
                .execute(&mut *self.tx)
                .await
                .map_err(|e| classify(e, "Failed to update user profile"))?;
        Self::expect_one(result.rows_affected(), "User", user.id)
    }

    async fn insert_review(&mut self, review: &Review) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO reviews (id, listing_id, author_id, rating, content, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(review.id.to_string())
        .bind(review.listing_id.to_string())
        .bind(review.author_id.to_string())
        .bind(review.rating)
        .bind(&review.content)
        .bind(review.created_at)
        .execute(&mut *self.tx)
        .await
        .map_err(|e| classify(e, "Failed to insert review"))?;
        Ok(())
    }

    async fn delete_review(&mut self, id: Uuid) -> Result<(), DomainError> {
        let result = sqlx::query("DELETE FROM reviews WHERE id = ?")
            .bind(id.to_string())
            .execute(&mut *self.tx)
            .await
            .map_err(|e| classify(e, "Failed to delete review"))?;
        Self::expect_one(result.rows_affected(), "Review", id)
    }

    async fn insert_listing(&mut self, listing: &Listing) -> Result<(), DomainError> {
        let rating = listing.rating();
        let result = sqlx::query(
            r#"
            INSERT INTO listings (
                id, owner_id, title, description, slug, price_per_day, security_deposit,
                location, category, features, images, is_active, rating, reviews_count,
                rentals_count, total_earnings, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(listing.id.to_string())
        .bind(listing.owner_id.to_string())
        .bind(&listing.title)
        .bind(&listing.description)
        .bind(&listing.slug)
        .bind(listing.price_per_day)
        .bind(listing.security_deposit)
        .bind(&listing.location)
        .bind(&listing.category)
        .bind(Json(&listing.features))
        .bind(Json(&listing.images))
        .bind(listing.is_active)
        .bind(rating.mean())
        .bind(rating.count())
        .bind(listing.rentals_count())
        .bind(listing.total_earnings())
        .bind(listing.created_at)
        .bind(listing.updated_at)
        .execute(&mut *self.tx)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(e) if is_duplicate_key(&e) => Err(ValidationError::DuplicateValue {
                field: "slug".to_string(),
            }
            .into()),
            Err(e) => Err(classify(e, "Failed to insert listing")),
        }
    }

    async fn update_listing(&mut self, listing: &Listing) -> Result<(), DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE listings
            SET title = ?, description = ?, price_per_day = ?, security_deposit = ?,
                location = ?, category = ?, features = ?, images = ?, is_active = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&listing.title)
        .bind(&listing.description)
        .bind(listing.price_per_day)
        .bind(listing.security_deposit)
        .bind(&listing.location)
        .bind(&listing.category)
        .bind(Json(&listing.features))
        .bind(Json(&listing.images))
        .bind(listing.is_active)
        .bind(listing.updated_at)
        .bind(listing.id.to_string())
        .execute(&mut *self.tx)
        .await
        .map_err(|e| classify(e, "Failed to update listing"))?;
        Self::expect_one(result.rows_affected(), "Listing", listing.id)
    }

    async fn delete_listing(&mut self, id: Uuid) -> Result<(), DomainError> {
        let id_param = id.to_string();
        for statement in [
            "DELETE FROM reviews WHERE listing_id = ?",
            "DELETE FROM rentals WHERE listing_id = ?",
        ] {
            sqlx::query(statement)
                .bind(&id_param)
                .execute(&mut *self.tx)
                .await
                .map_err(|e| classify(e, "Failed to delete listing dependents"))?;
        }
        let result = sqlx::query("DELETE FROM listings WHERE id = ?")
            .bind(&id_param)
            .execute(&mut *self.tx)
            .await
            .map_err(|e| classify(e, "Failed to delete listing"))?;
        Self::expect_one(result.rows_affected(), "Listing", id)
    }

    async fn slug_exists(&mut self, slug: &str) -> Result<bool, DomainError> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM listings WHERE slug = ?")
            .bind(slug)
            .fetch_one(&mut *self.tx)
            .await
            .map_err(|e| classify(e, "Failed to check slug"))?;
        Ok(total > 0)
    }

    async fn commit(self) -> Result<(), DomainError> {
        self.tx
            .commit()
            .await
            .map_err(|e| classify(e, "Failed to commit transaction"))
    }

    async fn rollback(self) -> Result<(), DomainError> {
        self.tx
            .rollback()
            .await
            .map_err(|e| classify(e, "Failed to roll back transaction"))
    }
}
