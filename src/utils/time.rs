use crate::error::{config_error, invalid_input, BookingResult};
use chrono::{Datelike, NaiveDate, Utc};
use chrono_tz::Tz;

/// Canonical date format used for stored appointments
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Number of minutes in a day
pub const MINUTES_PER_DAY: u32 = 24 * 60;

/// Parse time string in HH:MM format
pub fn parse_time(time_str: &str) -> Option<(u32, u32)> {
    let parts: Vec<&str> = time_str.trim().split(':').collect();
    if parts.len() != 2 {
        return None;
    }
    let hour = parts[0].parse::<u32>().ok()?;
    let minute = parts[1].parse::<u32>().ok()?;
    if hour > 23 || minute > 59 {
        return None;
    }
    Some((hour, minute))
}

/// Convert an HH:MM string to minutes since midnight
pub fn to_minutes(time_str: &str) -> Option<u32> {
    let (hour, minute) = parse_time(time_str)?;
    Some(hour * 60 + minute)
}

/// Format minutes since midnight as zero-padded HH:MM
pub fn format_minutes(minutes: u32) -> String {
    format!("{:02}:{:02}", minutes / 60, minutes % 60)
}

/// Parse a YYYY-MM-DD date string
pub fn parse_date(date_str: &str) -> BookingResult<NaiveDate> {
    NaiveDate::parse_from_str(date_str.trim(), DATE_FORMAT)
        .map_err(|_| invalid_input(&format!("Invalid date '{}', expected YYYY-MM-DD", date_str)))
}

/// Format a date in the canonical YYYY-MM-DD form
pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Day of week index with Sunday = 0
pub fn weekday_index(date: NaiveDate) -> u8 {
    date.weekday().num_days_from_sunday() as u8
}

/// Map an English day name (full or three-letter) to its index, Sunday = 0
pub fn weekday_from_name(name: &str) -> Option<u8> {
    match name.trim().to_ascii_lowercase().as_str() {
        "sunday" | "sun" => Some(0),
        "monday" | "mon" => Some(1),
        "tuesday" | "tue" => Some(2),
        "wednesday" | "wed" => Some(3),
        "thursday" | "thu" => Some(4),
        "friday" | "fri" => Some(5),
        "saturday" | "sat" => Some(6),
        _ => None,
    }
}

/// English name for a day index, Sunday = 0
pub fn weekday_name(day_of_week: u8) -> Option<&'static str> {
    const NAMES: [&str; 7] = [
        "Sunday",
        "Monday",
        "Tuesday",
        "Wednesday",
        "Thursday",
        "Friday",
        "Saturday",
    ];
    NAMES.get(day_of_week as usize).copied()
}

/// Today's date in the given IANA timezone, as YYYY-MM-DD
pub fn today_in(timezone: &str) -> BookingResult<String> {
    let tz: Tz = timezone
        .parse()
        .map_err(|_| config_error(&format!("Unknown timezone: {}", timezone)))?;
    Ok(format_date(Utc::now().with_timezone(&tz).date_naive()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_time() {
        // Valid cases
        assert_eq!(parse_time("00:00"), Some((0, 0)));
        assert_eq!(parse_time("12:30"), Some((12, 30)));
        assert_eq!(parse_time("23:59"), Some((23, 59)));
        assert_eq!(parse_time("9:05"), Some((9, 5)));

        // Invalid cases
        assert_eq!(parse_time("24:00"), None); // Hour out of range
        assert_eq!(parse_time("12:60"), None); // Minute out of range
        assert_eq!(parse_time("12:30:45"), None); // Too many parts
        assert_eq!(parse_time("12"), None); // Too few parts
        assert_eq!(parse_time("12:ab"), None); // Invalid minute
        assert_eq!(parse_time("Invalid Date"), None);
    }

    #[test]
    fn test_minutes_conversion() {
        assert_eq!(to_minutes("09:30"), Some(570));
        assert_eq!(to_minutes("00:00"), Some(0));
        assert_eq!(to_minutes("bad"), None);

        assert_eq!(format_minutes(570), "09:30");
        assert_eq!(format_minutes(0), "00:00");
        assert_eq!(format_minutes(17 * 60), "17:00");
    }

    #[test]
    fn test_parse_date_and_weekday() {
        // 2024-01-01 was a Monday
        let monday = parse_date("2024-01-01").unwrap();
        assert_eq!(weekday_index(monday), 1);
        assert_eq!(format_date(monday), "2024-01-01");

        let sunday = parse_date("2024-01-07").unwrap();
        assert_eq!(weekday_index(sunday), 0);

        assert!(parse_date("2024-13-01").is_err());
        assert!(parse_date("01/01/2024").is_err());
        assert!(parse_date("").is_err());
    }

    #[test]
    fn test_weekday_names() {
        assert_eq!(weekday_from_name("Sunday"), Some(0));
        assert_eq!(weekday_from_name("monday"), Some(1));
        assert_eq!(weekday_from_name(" SAT "), Some(6));
        assert_eq!(weekday_from_name("Funday"), None);

        assert_eq!(weekday_name(3), Some("Wednesday"));
        assert_eq!(weekday_name(7), None);
    }

    #[test]
    fn test_today_in() {
        let today = today_in("Europe/Helsinki").unwrap();
        assert!(parse_date(&today).is_ok());
        assert!(today_in("Mars/Olympus").is_err());
    }
}
