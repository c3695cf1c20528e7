//! Time helpers — business timezone conversion
//!
//! All date → instant conversion is done once, at the API boundary;
//! repositories only receive absolute `DateTime<Utc>` bounds. Timezone-naive
//! date truncation is exactly the bug class this module exists to prevent:
//! an order placed 23:30 local time must bucket to the local calendar date,
//! not the UTC one.

use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use chrono_tz::Tz;

use super::{AppError, AppResult};

/// Parse a date string (YYYY-MM-DD)
pub fn parse_date(date: &str) -> AppResult<NaiveDate> {
    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map_err(|_| AppError::validation(format!("Invalid date format: {}", date)))
}

/// Reject dates in the future (business timezone)
pub fn validate_not_future(date: NaiveDate, tz: Tz) -> AppResult<()> {
    let today = today(tz);
    if date > today {
        return Err(AppError::validation(format!(
            "Date {} is in the future (today is {})",
            date, today
        )));
    }
    Ok(())
}

/// Current calendar date in the business timezone
pub fn today(tz: Tz) -> NaiveDate {
    Utc::now().with_timezone(&tz).date_naive()
}

/// Start of `date` (00:00:00 local) as a UTC instant
///
/// DST gap fallback: if local midnight does not exist, fall back to UTC.
pub fn day_start_utc(date: NaiveDate, tz: Tz) -> DateTime<Utc> {
    let naive = date.and_hms_opt(0, 0, 0).unwrap();
    tz.from_local_datetime(&naive)
        .latest()
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|| naive.and_utc())
}

/// Exclusive end of `date`: start of the following local day as a UTC instant
pub fn day_end_utc(date: NaiveDate, tz: Tz) -> DateTime<Utc> {
    let next_day = date.succ_opt().unwrap_or(date);
    day_start_utc(next_day, tz)
}

/// Half-open UTC bounds `[start, end)` covering the inclusive local date
/// range `[start_date, end_date]`
pub fn date_range_utc(
    start_date: NaiveDate,
    end_date: NaiveDate,
    tz: Tz,
) -> AppResult<(DateTime<Utc>, DateTime<Utc>)> {
    if end_date < start_date {
        return Err(AppError::validation(format!(
            "End date {} precedes start date {}",
            end_date, start_date
        )));
    }
    Ok((day_start_utc(start_date, tz), day_end_utc(end_date, tz)))
}

/// Local calendar date an instant buckets to
pub fn bucket_date(instant: DateTime<Utc>, tz: Tz) -> NaiveDate {
    instant.with_timezone(&tz).date_naive()
}

/// Rough range sanity cap for on-demand aggregation queries
pub fn validate_range_span(start: NaiveDate, end: NaiveDate, max_days: i64) -> AppResult<()> {
    if (end - start) > Duration::days(max_days) {
        return Err(AppError::validation(format!(
            "Date range too large (max {} days)",
            max_days
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono_tz::America::Sao_Paulo;

    #[test]
    fn parse_date_accepts_iso_and_rejects_garbage() {
        assert_eq!(
            parse_date("2024-01-31").unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 31).unwrap()
        );
        assert!(parse_date("31/01/2024").is_err());
        assert!(parse_date("2024-13-01").is_err());
    }

    // The invariant this module must get right: 23:30Z on Jan 1 is still
    // Jan 1 at UTC-3, so it buckets to Jan 1, not Jan 2.
    #[test]
    fn utc_evening_buckets_to_local_date() {
        let instant = "2024-01-01T23:30:00Z".parse::<DateTime<Utc>>().unwrap();
        assert_eq!(
            bucket_date(instant, Sao_Paulo),
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
        );
    }

    #[test]
    fn local_early_morning_buckets_back_a_day() {
        // 02:00Z is 23:00 the previous day at UTC-3
        let instant = "2024-01-02T02:00:00Z".parse::<DateTime<Utc>>().unwrap();
        assert_eq!(
            bucket_date(instant, Sao_Paulo),
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
        );
    }

    #[test]
    fn day_bounds_are_half_open_and_tz_shifted() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let start = day_start_utc(date, Sao_Paulo);
        let end = day_end_utc(date, Sao_Paulo);
        // Sao Paulo no longer observes DST: fixed UTC-3
        assert_eq!(start, "2024-01-01T03:00:00Z".parse::<DateTime<Utc>>().unwrap());
        assert_eq!(end, "2024-01-02T03:00:00Z".parse::<DateTime<Utc>>().unwrap());

        let evening = "2024-01-01T23:30:00Z".parse::<DateTime<Utc>>().unwrap();
        assert!(evening >= start && evening < end);
    }

    #[test]
    fn range_bounds_cover_inclusive_dates() {
        let start_date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let end_date = NaiveDate::from_ymd_opt(2024, 1, 3).unwrap();
        let (start, end) = date_range_utc(start_date, end_date, Sao_Paulo).unwrap();
        assert_eq!(end - start, Duration::days(3));
        assert!(date_range_utc(end_date, start_date, Sao_Paulo).is_err());
    }
}
