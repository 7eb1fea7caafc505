use chrono::{DateTime, Datelike, Days, NaiveDate, Utc};

/// Lenient `YYYY-MM-DD` parse: anything else counts as absent
pub fn parse_date_or_none(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()
}

/// Half-open UTC interval `[day 00:00, next day 00:00)`
pub fn day_bounds(day: NaiveDate) -> (DateTime<Utc>, DateTime<Utc>) {
    let start = start_of_day(day);
    let end = day
        .checked_add_days(Days::new(1))
        .map(start_of_day)
        .unwrap_or(DateTime::<Utc>::MAX_UTC);
    (start, end)
}

pub fn start_of_day(day: NaiveDate) -> DateTime<Utc> {
    day.and_time(chrono::NaiveTime::MIN).and_utc()
}

pub fn first_of_month(day: NaiveDate) -> NaiveDate {
    day.with_day(1).unwrap_or(day)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_parse_date_or_none() {
        assert_eq!(parse_date_or_none("2024-02-29"), Some(date("2024-02-29")));
        assert_eq!(parse_date_or_none(" 2024-01-01 "), Some(date("2024-01-01")));
        assert_eq!(parse_date_or_none(""), None);
        assert_eq!(parse_date_or_none("2023-02-29"), None);
        assert_eq!(parse_date_or_none("01/02/2024"), None);
    }

    #[test]
    fn test_day_bounds() {
        let (start, end) = day_bounds(date("2024-01-31"));
        assert_eq!(start, Utc.with_ymd_and_hms(2024, 1, 31, 0, 0, 0).unwrap());
        assert_eq!(end, Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_first_of_month() {
        assert_eq!(first_of_month(date("2024-03-17")), date("2024-03-01"));
    }
}
