//! Running (count, mean) rating aggregate for listings and owners.
//!
//! The aggregate keeps the integer sum of all contributing ratings, so the
//! running-mean identity `newMean = (oldMean * oldCount ± value) / newCount`
//! is evaluated on exact integers and add-then-remove of the same value
//! restores the previous state bit for bit.

use serde::{Deserialize, Serialize};

use crate::errors::{DomainError, DomainResult};

/// Aggregate of review ratings. `mean() == 0.0` whenever `count() == 0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(into = "RatingSnapshot", from = "RatingSnapshot")]
pub struct RatingAggregate {
    count: u32,
    sum: u64,
}

/// Persisted/serialized shape of a rating aggregate
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RatingSnapshot {
    pub rating: f64,
    pub reviews_count: u32,
}

impl From<RatingAggregate> for RatingSnapshot {
    fn from(aggregate: RatingAggregate) -> Self {
        Self {
            rating: aggregate.mean(),
            reviews_count: aggregate.count,
        }
    }
}

impl From<RatingSnapshot> for RatingAggregate {
    fn from(snapshot: RatingSnapshot) -> Self {
        RatingAggregate::restore(snapshot.reviews_count, snapshot.rating)
    }
}

impl RatingAggregate {
    /// Aggregate with no reviews
    pub fn empty() -> Self {
        Self::default()
    }

    /// Rebuild an aggregate from a stored `(count, mean)` pair.
    ///
    /// Ratings are integers, so `mean * count` is rounded back to the exact
    /// sum; rounding noise left in stored means is discarded here.
    pub fn restore(count: u32, mean: f64) -> Self {
        if count == 0 || !mean.is_finite() || mean <= 0.0 {
            return Self { count, sum: 0 };
        }
        let sum = (mean * f64::from(count)).round();
        Self {
            count,
            sum: sum as u64,
        }
    }

    /// Number of contributing reviews
    pub fn count(&self) -> u32 {
        self.count
    }

    /// Mean rating, `0.0` with no reviews
    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.sum as f64 / f64::from(self.count)
        }
    }

    /// Aggregate after one more review of `value`
    pub fn with_added(&self, value: u8) -> DomainResult<Self> {
        let count = self.count.checked_add(1).ok_or_else(|| DomainError::Internal {
            message: "review count overflow".to_string(),
        })?;
        Ok(Self {
            count,
            sum: self.sum + u64::from(value),
        })
    }

    /// Aggregate after removing one review of `value`; resets to empty at zero
    pub fn with_removed(&self, value: u8) -> DomainResult<Self> {
        let value = u64::from(value);
        if self.count == 0 || self.sum < value {
            return Err(DomainError::Internal {
                message: format!(
                    "cannot remove rating {} from aggregate of {} reviews",
                    value, self.count
                ),
            });
        }
        let count = self.count - 1;
        if count == 0 {
            return Ok(Self::empty());
        }
        Ok(Self {
            count,
            sum: self.sum - value,
        })
    }
}
