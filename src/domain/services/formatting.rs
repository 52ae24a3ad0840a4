use chrono::{DateTime, Datelike, NaiveDate, NaiveTime, TimeZone, Timelike, Utc};
use chrono_tz::Tz;

const MONTHS: [&str; 12] = [
    "ene", "feb", "mar", "abr", "may", "jun", "jul", "ago", "sep", "oct", "nov", "dic",
];

/// "10 feb 2025, 10:10" in the display timezone.
pub fn format_event_datetime(dt: DateTime<Utc>, tz: Tz) -> String {
    let local = dt.with_timezone(&tz);
    format!(
        "{} {} {}, {:02}:{:02}",
        local.day(),
        MONTHS[local.month0() as usize],
        local.year(),
        local.hour(),
        local.minute()
    )
}

/// "dd/mm/YYYY HH:MM" in the display timezone.
pub fn format_short_datetime(dt: DateTime<Utc>, tz: Tz) -> String {
    dt.with_timezone(&tz).format("%d/%m/%Y %H:%M").to_string()
}

/// Two decimals with a decimal comma, e.g. "2,75".
pub fn format_average(avg: f64) -> String {
    format!("{:.2}", avg).replace('.', ",")
}

/// Combines the `YYYY-MM-DD` and `HH:MM` form inputs, read in `tz`, into UTC.
/// Ambiguous or skipped local times (DST transitions) are rejected.
pub fn parse_local_datetime(date: &str, time: &str, tz: Tz) -> Option<DateTime<Utc>> {
    let date = NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d").ok()?;
    let time = NaiveTime::parse_from_str(time.trim(), "%H:%M").ok()?;
    tz.from_local_datetime(&date.and_time(time))
        .single()
        .map(|local| local.with_timezone(&Utc))
}

/// Inverse of `parse_local_datetime`, used to prefill edit forms.
pub fn split_local_datetime(dt: DateTime<Utc>, tz: Tz) -> (String, String) {
    let local = dt.with_timezone(&tz);
    (local.format("%Y-%m-%d").to_string(), local.format("%H:%M").to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_datetime_in_spanish() {
        let dt = Utc.with_ymd_and_hms(2025, 2, 10, 10, 10, 0).unwrap();
        assert_eq!(format_event_datetime(dt, chrono_tz::UTC), "10 feb 2025, 10:10");

        let dt = Utc.with_ymd_and_hms(2025, 3, 15, 17, 30, 0).unwrap();
        let tz: Tz = "America/Argentina/Buenos_Aires".parse().unwrap();
        assert_eq!(format_event_datetime(dt, tz), "15 mar 2025, 14:30");
    }

    #[test]
    fn test_short_datetime() {
        let dt = Utc.with_ymd_and_hms(2025, 7, 4, 9, 5, 0).unwrap();
        assert_eq!(format_short_datetime(dt, chrono_tz::UTC), "04/07/2025 09:05");
    }

    #[test]
    fn test_average_uses_decimal_comma() {
        assert_eq!(format_average(2.75), "2,75");
        assert_eq!(format_average(0.0), "0,00");
        assert_eq!(format_average(11.0 / 3.0), "3,67");
    }

    #[test]
    fn test_local_datetime_roundtrip_through_timezone() {
        let tz: Tz = "America/Argentina/Buenos_Aires".parse().unwrap();
        let utc = parse_local_datetime("2025-05-20", "21:00", tz).unwrap();
        assert_eq!(utc, Utc.with_ymd_and_hms(2025, 5, 21, 0, 0, 0).unwrap());
        assert_eq!(split_local_datetime(utc, tz), ("2025-05-20".to_string(), "21:00".to_string()));
    }

    #[test]
    fn test_rejects_malformed_input() {
        assert!(parse_local_datetime("20/05/2025", "21:00", chrono_tz::UTC).is_none());
        assert!(parse_local_datetime("2025-05-20", "9pm", chrono_tz::UTC).is_none());
        assert!(parse_local_datetime("", "", chrono_tz::UTC).is_none());
    }
}
