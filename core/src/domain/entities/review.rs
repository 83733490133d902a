//! Review entity. Immutable once created; only deletion is allowed.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Review {
    pub id: Uuid,
    pub listing_id: Uuid,
    pub author_id: Uuid,
    pub rating: u8,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl Review {
    pub fn new(listing_id: Uuid, author_id: Uuid, rating: u8, content: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            listing_id,
            author_id,
            rating,
            content,
            created_at: Utc::now(),
        }
    }
}
