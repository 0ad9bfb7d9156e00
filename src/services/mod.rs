pub mod accounts;
pub mod email;
pub mod orders;
pub mod products;
pub mod reports;
pub mod roles;
pub mod shipping;
pub mod staff;
pub mod uploads;
pub mod warehouses;

use chrono::{DateTime, NaiveDate, TimeZone, Utc};

use crate::errors::ServiceError;

/// Inclusive calendar date range used by order listings and reports.
///
/// Bounds are parsed from `YYYY-MM-DD` query parameters; the upper bound is
/// widened to the start of the following day so the whole end date is
/// included.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateRange {
    pub from: Option<DateTime<Utc>>,
    pub to_exclusive: Option<DateTime<Utc>>,
}

impl DateRange {
    pub fn parse(from: Option<&str>, to: Option<&str>) -> Result<Self, ServiceError> {
        let from = from.map(parse_day_start).transpose()?;
        let to_exclusive = to.map(parse_day_after).transpose()?;

        if let (Some(from), Some(to)) = (from, to_exclusive) {
            if from >= to {
                return Err(ServiceError::ValidationError(
                    "from date must not be after to date".to_string(),
                ));
            }
        }

        Ok(Self { from, to_exclusive })
    }

    pub fn is_unbounded(&self) -> bool {
        self.from.is_none() && self.to_exclusive.is_none()
    }
}

fn parse_date(raw: &str) -> Result<NaiveDate, ServiceError> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|_| ServiceError::ValidationError(format!("Invalid date '{raw}', expected YYYY-MM-DD")))
}

fn parse_day_start(raw: &str) -> Result<DateTime<Utc>, ServiceError> {
    let date = parse_date(raw)?;
    Ok(Utc.from_utc_datetime(&date.and_hms_opt(0, 0, 0).expect("midnight is valid")))
}

fn parse_day_after(raw: &str) -> Result<DateTime<Utc>, ServiceError> {
    let date = parse_date(raw)?
        .succ_opt()
        .ok_or_else(|| ServiceError::ValidationError(format!("Date '{raw}' out of range")))?;
    Ok(Utc.from_utc_datetime(&date.and_hms_opt(0, 0, 0).expect("midnight is valid")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn parses_inclusive_range() {
        let range = DateRange::parse(Some("2024-03-01"), Some("2024-03-31")).unwrap();
        let from = range.from.unwrap();
        let to = range.to_exclusive.unwrap();
        assert_eq!(from.to_rfc3339(), "2024-03-01T00:00:00+00:00");
        // The whole of March 31 falls inside the range.
        assert_eq!(to.to_rfc3339(), "2024-04-01T00:00:00+00:00");
    }

    #[test]
    fn allows_open_ends() {
        let range = DateRange::parse(None, Some("2024-03-31")).unwrap();
        assert!(range.from.is_none());
        assert!(range.to_exclusive.is_some());

        assert!(DateRange::parse(None, None).unwrap().is_unbounded());
    }

    #[test]
    fn rejects_garbage_and_inverted_ranges() {
        assert_matches!(
            DateRange::parse(Some("31-03-2024"), None),
            Err(ServiceError::ValidationError(_))
        );
        assert_matches!(
            DateRange::parse(Some("2024-04-02"), Some("2024-04-01")),
            Err(ServiceError::ValidationError(_))
        );
    }

    #[test]
    fn single_day_range_is_valid() {
        let range = DateRange::parse(Some("2024-04-01"), Some("2024-04-01")).unwrap();
        assert!(range.from.unwrap() < range.to_exclusive.unwrap());
    }

    #[rstest::rstest]
    #[case("2024-02-29", true)]
    #[case("2023-02-29", false)]
    #[case("2024-13-01", false)]
    #[case("2024-04-31", false)]
    fn calendar_validity(#[case] raw: &str, #[case] ok: bool) {
        assert_eq!(parse_date(raw).is_ok(), ok);
    }
}
