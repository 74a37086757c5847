//! Time-of-day handling for recurring schedules.
//!
//! Schedule entries carry a wall-clock time with no date. Queries carry a
//! [`ReferenceMoment`]: a date (which picks the day label) plus a time of
//! day (which picks the upcoming departures).

use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime, Timelike, Weekday};
use std::fmt;

use super::day::DayLabel;

/// Error returned when parsing an invalid time string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid time: {reason}")]
pub struct TimeError {
    reason: &'static str,
}

impl TimeError {
    fn new(reason: &'static str) -> Self {
        Self { reason }
    }
}

/// The earliest possible time of day (`00:00:00`).
pub fn earliest_time() -> NaiveTime {
    NaiveTime::MIN
}

/// The latest possible time of day (`23:59:59.999999999`).
pub fn latest_time() -> NaiveTime {
    NaiveTime::from_hms_nano_opt(23, 59, 59, 999_999_999).expect("valid time of day")
}

/// Parse a time of day from `HH:MM` or `HH:MM:SS`.
///
/// # Examples
///
/// ```
/// use schedule_server::domain::parse_time_of_day;
///
/// assert!(parse_time_of_day("00:00").is_ok());
/// assert!(parse_time_of_day("23:59").is_ok());
/// assert!(parse_time_of_day("07:10:30").is_ok());
///
/// assert!(parse_time_of_day("0710").is_err());
/// assert!(parse_time_of_day("7:10").is_err());
/// assert!(parse_time_of_day("24:00").is_err());
/// ```
pub fn parse_time_of_day(s: &str) -> Result<NaiveTime, TimeError> {
    let bytes = s.as_bytes();

    if bytes.len() != 5 && bytes.len() != 8 {
        return Err(TimeError::new("expected HH:MM or HH:MM:SS format"));
    }

    if bytes[2] != b':' {
        return Err(TimeError::new("expected colon at position 2"));
    }

    let hour =
        parse_two_digits(&bytes[0..2]).ok_or_else(|| TimeError::new("invalid hour digits"))?;
    if hour > 23 {
        return Err(TimeError::new("hour must be 0-23"));
    }

    let minute =
        parse_two_digits(&bytes[3..5]).ok_or_else(|| TimeError::new("invalid minute digits"))?;
    if minute > 59 {
        return Err(TimeError::new("minute must be 0-59"));
    }

    let second = if bytes.len() == 8 {
        if bytes[5] != b':' {
            return Err(TimeError::new("expected colon at position 5"));
        }
        let second = parse_two_digits(&bytes[6..8])
            .ok_or_else(|| TimeError::new("invalid second digits"))?;
        if second > 59 {
            return Err(TimeError::new("second must be 0-59"));
        }
        second
    } else {
        0
    };

    NaiveTime::from_hms_opt(hour, minute, second).ok_or_else(|| TimeError::new("invalid time"))
}

/// Format a time of day as `HH:MM`, or `HH:MM:SS` when seconds are set.
pub fn format_time_of_day(time: NaiveTime) -> String {
    if time.second() == 0 {
        format!("{:02}:{:02}", time.hour(), time.minute())
    } else {
        format!(
            "{:02}:{:02}:{:02}",
            time.hour(),
            time.minute(),
            time.second()
        )
    }
}

/// Parse two ASCII digit bytes into a u32.
fn parse_two_digits(bytes: &[u8]) -> Option<u32> {
    if bytes.len() != 2 {
        return None;
    }
    let d1 = (bytes[0] as char).to_digit(10)?;
    let d2 = (bytes[1] as char).to_digit(10)?;
    Some(d1 * 10 + d2)
}

/// The moment a "next departures" query is asked about.
///
/// The date picks which day label applies; the time of day is the lower
/// bound for upcoming departures. A whole-day moment uses the earliest
/// time of day, so every departure on the matched day is upcoming.
///
/// # Examples
///
/// ```
/// use schedule_server::domain::ReferenceMoment;
/// use chrono::{NaiveDate, Weekday};
///
/// let date = NaiveDate::from_ymd_opt(2016, 1, 11).unwrap();
/// let moment = ReferenceMoment::whole_day(date);
/// assert_eq!(moment.weekday(), Weekday::Mon);
/// assert_eq!(moment.to_string(), "2016-01-11 00:00");
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ReferenceMoment {
    date: NaiveDate,
    time: NaiveTime,
}

impl ReferenceMoment {
    /// Create a moment from date and time components.
    pub fn new(date: NaiveDate, time: NaiveTime) -> Self {
        Self { date, time }
    }

    /// A moment at the given local date and time.
    pub fn at(datetime: NaiveDateTime) -> Self {
        Self {
            date: datetime.date(),
            time: datetime.time(),
        }
    }

    /// A moment covering the whole of `date`.
    pub fn whole_day(date: NaiveDate) -> Self {
        Self {
            date,
            time: earliest_time(),
        }
    }

    /// Returns the date component.
    pub fn date(&self) -> NaiveDate {
        self.date
    }

    /// Returns the time component as given.
    pub fn time(&self) -> NaiveTime {
        self.time
    }

    /// Returns the day of the week of the date.
    pub fn weekday(&self) -> Weekday {
        self.date.weekday()
    }

    /// The exact day label for this moment's date (e.g. `Mon`).
    pub fn day_label(&self) -> DayLabel {
        DayLabel::for_weekday(self.weekday())
    }

    /// The time of day truncated to whole minutes.
    ///
    /// Departures are compared at minute precision: a query at 17:06:40
    /// still sees a 17:06 departure.
    pub fn minute_floor(&self) -> NaiveTime {
        NaiveTime::from_hms_opt(self.time.hour(), self.time.minute(), 0).unwrap_or(self.time)
    }

    /// Converts to a NaiveDateTime.
    pub fn to_datetime(&self) -> NaiveDateTime {
        self.date.and_time(self.time)
    }
}

impl From<NaiveDateTime> for ReferenceMoment {
    fn from(datetime: NaiveDateTime) -> Self {
        Self::at(datetime)
    }
}

impl From<NaiveDate> for ReferenceMoment {
    fn from(date: NaiveDate) -> Self {
        Self::whole_day(date)
    }
}

impl fmt::Debug for ReferenceMoment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ReferenceMoment({} {:02}:{:02})",
            self.date,
            self.time.hour(),
            self.time.minute()
        )
    }
}

impl fmt::Display for ReferenceMoment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {:02}:{:02}",
            self.date,
            self.time.hour(),
            self.time.minute()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn hms(h: u32, m: u32, s: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, s).unwrap()
    }

    #[test]
    fn parse_valid_times() {
        assert_eq!(parse_time_of_day("00:00").unwrap(), hms(0, 0, 0));
        assert_eq!(parse_time_of_day("23:59").unwrap(), hms(23, 59, 0));
        assert_eq!(parse_time_of_day("17:06").unwrap(), hms(17, 6, 0));
        assert_eq!(parse_time_of_day("07:10:30").unwrap(), hms(7, 10, 30));
    }

    #[test]
    fn parse_invalid_format() {
        assert!(parse_time_of_day("").is_err());
        assert!(parse_time_of_day("1706").is_err());
        assert!(parse_time_of_day("17-06").is_err());
        assert!(parse_time_of_day("17:6").is_err());
        assert!(parse_time_of_day("17:06:3").is_err());
        assert!(parse_time_of_day("17:06-30").is_err());
        assert!(parse_time_of_day("ab:cd").is_err());
    }

    #[test]
    fn parse_out_of_range() {
        assert!(parse_time_of_day("24:00").is_err());
        assert!(parse_time_of_day("12:60").is_err());
        assert!(parse_time_of_day("12:00:60").is_err());
    }

    #[test]
    fn error_display() {
        let err = parse_time_of_day("25:00").unwrap_err();
        assert_eq!(err.to_string(), "invalid time: hour must be 0-23");
    }

    #[test]
    fn format_keeps_seconds_when_present() {
        assert_eq!(format_time_of_day(hms(7, 5, 0)), "07:05");
        assert_eq!(format_time_of_day(hms(7, 5, 9)), "07:05:09");
    }

    #[test]
    fn boundary_times() {
        assert_eq!(earliest_time(), hms(0, 0, 0));
        assert!(latest_time() > hms(23, 59, 59));
        assert!(latest_time() > earliest_time());
    }

    #[test]
    fn whole_day_starts_at_midnight() {
        let moment = ReferenceMoment::whole_day(date(2016, 1, 10));
        assert_eq!(moment.time(), earliest_time());
        assert_eq!(moment.weekday(), Weekday::Sun);
        assert_eq!(moment.day_label(), DayLabel::Day(Weekday::Sun));
    }

    #[test]
    fn from_datetime() {
        let dt = date(2016, 1, 11).and_time(hms(18, 0, 0));
        let moment = ReferenceMoment::from(dt);
        assert_eq!(moment.date(), date(2016, 1, 11));
        assert_eq!(moment.time(), hms(18, 0, 0));
        assert_eq!(moment.to_datetime(), dt);
    }

    #[test]
    fn minute_floor_drops_seconds() {
        let moment = ReferenceMoment::new(date(2016, 1, 11), hms(17, 6, 40));
        assert_eq!(moment.minute_floor(), hms(17, 6, 0));
    }

    #[test]
    fn debug_format() {
        let moment = ReferenceMoment::new(date(2024, 3, 15), hms(9, 5, 0));
        assert_eq!(format!("{:?}", moment), "ReferenceMoment(2024-03-15 09:05)");
    }
}
