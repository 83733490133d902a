//! Rental entity and its status state machine.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::domain::value_objects::BookingPeriod;
use crate::errors::BookingError;

/// Rental status.
///
/// ```text
/// PENDING ──► CONFIRMED ──► COMPLETED
///    │            │
///    ▼            ▼
/// REJECTED    CANCELLED
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RentalStatus {
    Pending,
    Confirmed,
    Rejected,
    Completed,
    Cancelled,
}

impl RentalStatus {
    pub const ALL: [RentalStatus; 5] = [
        RentalStatus::Pending,
        RentalStatus::Confirmed,
        RentalStatus::Rejected,
        RentalStatus::Completed,
        RentalStatus::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RentalStatus::Pending => "PENDING",
            RentalStatus::Confirmed => "CONFIRMED",
            RentalStatus::Rejected => "REJECTED",
            RentalStatus::Completed => "COMPLETED",
            RentalStatus::Cancelled => "CANCELLED",
        }
    }

    /// Statuses that may follow this one
    pub fn allowed_next(&self) -> &'static [RentalStatus] {
        match self {
            RentalStatus::Pending => &[RentalStatus::Confirmed, RentalStatus::Rejected],
            RentalStatus::Confirmed => &[RentalStatus::Completed, RentalStatus::Cancelled],
            RentalStatus::Rejected | RentalStatus::Completed | RentalStatus::Cancelled => &[],
        }
    }

    pub fn can_transition_to(&self, next: RentalStatus) -> bool {
        self.allowed_next().contains(&next)
    }

    pub fn is_terminal(&self) -> bool {
        self.allowed_next().is_empty()
    }

    /// Whether a rental in this status reserves its dates
    pub fn is_blocking(&self) -> bool {
        matches!(self, RentalStatus::Pending | RentalStatus::Confirmed)
    }

    /// Statuses that reserve dates
    pub fn blocking() -> [RentalStatus; 2] {
        [RentalStatus::Pending, RentalStatus::Confirmed]
    }
}

impl fmt::Display for RentalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RentalStatus {
    type Err = BookingError;

    /// Case-insensitive, surrounding whitespace ignored
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_uppercase();
        RentalStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == wanted)
            .ok_or_else(|| BookingError::InvalidStatus {
                value: s.to_string(),
            })
    }
}

/// Rental entity: a booking of a listing for an inclusive date range
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rental {
    pub id: Uuid,
    pub listing_id: Uuid,
    pub renter_id: Uuid,
    #[serde(flatten)]
    pub period: BookingPeriod,
    /// Derived from the listing price at booking time
    pub total_price: Decimal,
    status: RentalStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Rental {
    /// Creates a new rental in `PENDING`
    pub fn new_pending(
        listing_id: Uuid,
        renter_id: Uuid,
        period: BookingPeriod,
        total_price: Decimal,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            listing_id,
            renter_id,
            period,
            total_price,
            status: RentalStatus::Pending,
            created_at: now,
            updated_at: now,
        }
    }

    /// Rehydrate a stored status (row mapping only)
    pub fn with_status(mut self, status: RentalStatus) -> Self {
        self.status = status;
        self
    }

    pub fn status(&self) -> RentalStatus {
        self.status
    }

    pub fn is_blocking(&self) -> bool {
        self.status.is_blocking()
    }

    /// Move to `next` if the transition table allows it
    pub(crate) fn transition_to(&mut self, next: RentalStatus) -> Result<(), BookingError> {
        if !self.status.can_transition_to(next) {
            return Err(BookingError::IllegalTransition {
                from: self.status,
                to: next,
            });
        }
        self.status = next;
        self.updated_at = Utc::now();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn rental() -> Rental {
        let period = BookingPeriod::new(
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 3).unwrap(),
        )
        .unwrap();
        Rental::new_pending(Uuid::new_v4(), Uuid::new_v4(), period, dec!(150))
    }

    #[test]
    fn test_new_rental_is_pending() {
        let rental = rental();
        assert_eq!(rental.status(), RentalStatus::Pending);
        assert!(rental.is_blocking());
    }

    #[test]
    fn test_transition_table() {
        use RentalStatus::*;

        let allowed = [
            (Pending, Confirmed),
            (Pending, Rejected),
            (Confirmed, Completed),
            (Confirmed, Cancelled),
        ];
        for from in RentalStatus::ALL {
            for to in RentalStatus::ALL {
                assert_eq!(
                    from.can_transition_to(to),
                    allowed.contains(&(from, to)),
                    "{} -> {}",
                    from,
                    to
                );
            }
        }
    }

    #[test]
    fn test_terminal_and_blocking_statuses() {
        assert!(RentalStatus::Completed.is_terminal());
        assert!(RentalStatus::Rejected.is_terminal());
        assert!(RentalStatus::Cancelled.is_terminal());
        assert!(!RentalStatus::Confirmed.is_terminal());

        assert!(RentalStatus::Pending.is_blocking());
        assert!(RentalStatus::Confirmed.is_blocking());
        assert!(!RentalStatus::Cancelled.is_blocking());
        assert!(!RentalStatus::Rejected.is_blocking());
        assert!(!RentalStatus::Completed.is_blocking());
    }

    #[test]
    fn test_illegal_transition_leaves_status() {
        let mut rental = rental();
        let err = rental.transition_to(RentalStatus::Completed).unwrap_err();
        assert_eq!(
            err,
            BookingError::IllegalTransition {
                from: RentalStatus::Pending,
                to: RentalStatus::Completed
            }
        );
        assert_eq!(rental.status(), RentalStatus::Pending);

        rental.transition_to(RentalStatus::Confirmed).unwrap();
        rental.transition_to(RentalStatus::Completed).unwrap();
        assert!(rental.transition_to(RentalStatus::Pending).is_err());
    }

    #[test]
    fn test_status_from_str() {
        assert_eq!("confirmed".parse::<RentalStatus>().unwrap(), RentalStatus::Confirmed);
        assert_eq!(" Completed ".parse::<RentalStatus>().unwrap(), RentalStatus::Completed);
        assert_eq!(
            "archived".parse::<RentalStatus>(),
            Err(BookingError::InvalidStatus {
                value: "archived".to_string()
            })
        );
    }

    #[test]
    fn test_status_serialization() {
        let json = serde_json::to_string(&RentalStatus::Cancelled).unwrap();
        assert_eq!(json, "\"CANCELLED\"");
    }
}
