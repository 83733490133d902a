//! Inclusive calendar-date range booked by a rental.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::errors::ValidationError;

/// Inclusive `[start, end]` date range with `start <= end`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawPeriod")]
pub struct BookingPeriod {
    #[serde(rename = "start_date")]
    start: NaiveDate,
    #[serde(rename = "end_date")]
    end: NaiveDate,
}

#[derive(Deserialize)]
struct RawPeriod {
    start_date: NaiveDate,
    end_date: NaiveDate,
}

impl TryFrom<RawPeriod> for BookingPeriod {
    type Error = ValidationError;

    fn try_from(raw: RawPeriod) -> Result<Self, Self::Error> {
        Self::new(raw.start_date, raw.end_date)
    }
}

impl BookingPeriod {
    /// Create a period, rejecting `end < start`
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, ValidationError> {
        if end < start {
            return Err(ValidationError::InvalidDateRange { start, end });
        }
        Ok(Self { start, end })
    }

    /// First booked day
    pub fn start(&self) -> NaiveDate {
        self.start
    }

    /// Last booked day
    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// Number of booked days; a single-day booking counts as 1
    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }

    /// Whether two inclusive ranges share at least one day
    pub fn overlaps(&self, other: &BookingPeriod) -> bool {
        self.start <= other.end && other.start <= self.end
    }

    /// Whether `date` falls inside the range
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

impl std::fmt::Display for BookingPeriod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}..={}", self.start, self.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn period(start: (i32, u32, u32), end: (i32, u32, u32)) -> BookingPeriod {
        BookingPeriod::new(
            NaiveDate::from_ymd_opt(start.0, start.1, start.2).unwrap(),
            NaiveDate::from_ymd_opt(end.0, end.1, end.2).unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn test_rejects_reversed_range() {
        let start = NaiveDate::from_ymd_opt(2024, 1, 3).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        assert_eq!(
            BookingPeriod::new(start, end),
            Err(ValidationError::InvalidDateRange { start, end })
        );
    }

    #[test]
    fn test_days_is_inclusive() {
        assert_eq!(period((2024, 1, 1), (2024, 1, 1)).days(), 1);
        assert_eq!(period((2024, 1, 1), (2024, 1, 3)).days(), 3);
        assert_eq!(period((2024, 2, 28), (2024, 3, 1)).days(), 3);
    }

    #[test]
    fn test_overlap_cases() {
        let booked = period((2024, 1, 10), (2024, 1, 15));

        // identical, contained, containing
        assert!(booked.overlaps(&period((2024, 1, 10), (2024, 1, 15))));
        assert!(booked.overlaps(&period((2024, 1, 11), (2024, 1, 12))));
        assert!(booked.overlaps(&period((2024, 1, 1), (2024, 1, 31))));

        // partial overlaps on either side, including a shared boundary day
        assert!(booked.overlaps(&period((2024, 1, 5), (2024, 1, 10))));
        assert!(booked.overlaps(&period((2024, 1, 14), (2024, 1, 20))));

        // adjacent but disjoint
        assert!(!booked.overlaps(&period((2024, 1, 1), (2024, 1, 9))));
        assert!(!booked.overlaps(&period((2024, 1, 16), (2024, 1, 20))));
    }

    #[test]
    fn test_overlap_is_symmetric() {
        let a = period((2024, 3, 1), (2024, 3, 5));
        let b = period((2024, 3, 5), (2024, 3, 9));
        assert_eq!(a.overlaps(&b), b.overlaps(&a));
    }

    #[test]
    fn test_deserialize_validates_order() {
        let ok: BookingPeriod =
            serde_json::from_str(r#"{"start_date":"2024-01-01","end_date":"2024-01-03"}"#).unwrap();
        assert_eq!(ok.days(), 3);

        let reversed =
            serde_json::from_str::<BookingPeriod>(r#"{"start_date":"2024-01-03","end_date":"2024-01-01"}"#);
        assert!(reversed.is_err());
    }

    #[test]
    fn test_serialize_field_names() {
        let json = serde_json::to_value(period((2024, 1, 1), (2024, 1, 2))).unwrap();
        assert_eq!(json["start_date"], "2024-01-01");
        assert_eq!(json["end_date"], "2024-01-02");
    }
}
