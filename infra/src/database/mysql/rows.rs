//! Column lists and row-to-entity mapping shared by the store and its
//! transactions.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::mysql::MySqlRow;
use sqlx::types::Json;
use sqlx::{MySql, Row};
use uuid::Uuid;

use rc_core::domain::entities::{Listing, ListingDraft, ListingStatistics, Rental, RentalStatus, Review, User};
use rc_core::domain::value_objects::{BookingPeriod, RatingAggregate};
use rc_core::errors::DomainError;

pub const LISTING_COLUMNS: &str = "l.id, l.owner_id, l.title, l.description, l.slug, l.price_per_day, \
     l.security_deposit, l.location, l.category, l.features, l.images, l.is_active, l.rating, \
     l.reviews_count, l.rentals_count, l.total_earnings, l.created_at, l.updated_at";

pub const RENTAL_COLUMNS: &str = "r.id, r.listing_id, r.renter_id, r.start_date, r.end_date, r.total_price, \
     r.status, r.created_at, r.updated_at";

pub const REVIEW_COLUMNS: &str = "v.id, v.listing_id, v.author_id, v.rating, v.content, v.created_at";

pub const USER_COLUMNS: &str = "u.id, u.email, u.first_name, u.last_name, u.picture, u.provider, \
     u.provider_id, u.rating, u.reviews_count, u.created_at, u.updated_at";

/// Statuses that reserve dates, as stored in `rentals.status`
pub const BLOCKING_STATUSES: &str = "('PENDING', 'CONFIRMED')";

fn get<'r, T>(row: &'r MySqlRow, column: &str) -> Result<T, DomainError>
where
    T: sqlx::Decode<'r, MySql> + sqlx::Type<MySql>,
{
    row.try_get(column).map_err(|e| DomainError::Internal {
        message: format!("Failed to get {}: {}", column, e),
    })
}

fn get_uuid(row: &MySqlRow, column: &str) -> Result<Uuid, DomainError> {
    let raw: String = get(row, column)?;
    Uuid::parse_str(&raw).map_err(|e| DomainError::Internal {
        message: format!("Invalid UUID in {}: {}", column, e),
    })
}

pub fn listing_from_row(row: &MySqlRow) -> Result<Listing, DomainError> {
    let draft = ListingDraft {
        title: get(row, "title")?,
        description: get(row, "description")?,
        price_per_day: get(row, "price_per_day")?,
        security_deposit: get(row, "security_deposit")?,
        location: get(row, "location")?,
        category: get(row, "category")?,
        features: get::<Json<Vec<String>>>(row, "features")?.0,
        images: get::<Json<Vec<String>>>(row, "images")?.0,
    };
    let statistics = ListingStatistics {
        rating: RatingAggregate::restore(get(row, "reviews_count")?, get(row, "rating")?),
        rentals_count: get(row, "rentals_count")?,
        total_earnings: get(row, "total_earnings")?,
    };

    let mut listing = Listing::new(get_uuid(row, "owner_id")?, get(row, "slug")?, draft).with_statistics(statistics);
    listing.id = get_uuid(row, "id")?;
    listing.is_active = get(row, "is_active")?;
    listing.created_at = get::<DateTime<Utc>>(row, "created_at")?;
    listing.updated_at = get::<DateTime<Utc>>(row, "updated_at")?;
    Ok(listing)
}

pub fn rental_from_row(row: &MySqlRow) -> Result<Rental, DomainError> {
    let period = BookingPeriod::new(get::<NaiveDate>(row, "start_date")?, get::<NaiveDate>(row, "end_date")?)
        .map_err(|e| DomainError::Internal {
            message: format!("Stored rental has an invalid period: {}", e),
        })?;
    let status: String = get(row, "status")?;
    let status: RentalStatus = status.parse().map_err(|e| DomainError::Internal {
        message: format!("Stored rental has an invalid status: {}", e),
    })?;

    let mut rental = Rental::new_pending(
        get_uuid(row, "listing_id")?,
        get_uuid(row, "renter_id")?,
        period,
        get::<Decimal>(row, "total_price")?,
    )
    .with_status(status);
    rental.id = get_uuid(row, "id")?;
    rental.created_at = get(row, "created_at")?;
    rental.updated_at = get(row, "updated_at")?;
    Ok(rental)
}

pub fn review_from_row(row: &MySqlRow) -> Result<Review, DomainError> {
    Ok(Review {
        id: get_uuid(row, "id")?,
        listing_id: get_uuid(row, "listing_id")?,
        author_id: get_uuid(row, "author_id")?,
        rating: get(row, "rating")?,
        content: get(row, "content")?,
        created_at: get(row, "created_at")?,
    })
}

pub fn user_from_row(row: &MySqlRow) -> Result<User, DomainError> {
    let mut user = User::new(get::<String>(row, "email")?)
        .with_rating(RatingAggregate::restore(get(row, "reviews_count")?, get(row, "rating")?));
    user.id = get_uuid(row, "id")?;
    user.first_name = get(row, "first_name")?;
    user.last_name = get(row, "last_name")?;
    user.picture = get(row, "picture")?;
    user.provider = get(row, "provider")?;
    user.provider_id = get(row, "provider_id")?;
    user.created_at = get(row, "created_at")?;
    user.updated_at = get(row, "updated_at")?;
    Ok(user)
}
