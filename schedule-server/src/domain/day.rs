//! Day labels attached to schedule entries.

use std::fmt;
use std::str::FromStr;

use chrono::Weekday;
use serde::{Deserialize, Serialize};

/// Longest label accepted, matching the storage column width.
pub const MAX_LABEL_LEN: usize = 30;

/// Error returned when parsing an invalid day label.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid day label: {reason}")]
pub struct InvalidDayLabel {
    reason: &'static str,
}

/// The day a schedule entry applies to.
///
/// Labels come from an open vocabulary. The seven weekday abbreviations
/// (`Mon` .. `Sun`) and the three buckets (`weekdays`, `weekends`,
/// `daily`) are recognised; anything else is kept verbatim as
/// [`DayLabel::Other`] and only ever matches itself. Matching is
/// case-sensitive, so `mon` is an `Other` label, not Monday.
///
/// # Examples
///
/// ```
/// use schedule_server::domain::DayLabel;
/// use chrono::Weekday;
///
/// assert_eq!(DayLabel::parse("Sat").unwrap(), DayLabel::Day(Weekday::Sat));
/// assert_eq!(DayLabel::parse("weekends").unwrap(), DayLabel::Weekends);
/// assert_eq!(DayLabel::parse("holiday").unwrap().as_str(), "holiday");
/// assert!(DayLabel::parse("").is_err());
/// ```
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum DayLabel {
    /// A single day of the week.
    Day(Weekday),
    /// Monday to Friday.
    Weekdays,
    /// Saturday and Sunday.
    Weekends,
    /// Every day.
    Daily,
    /// Any other label, stored as given.
    Other(String),
}

impl DayLabel {
    pub const WEEKDAYS: &'static str = "weekdays";
    pub const WEEKENDS: &'static str = "weekends";
    pub const DAILY: &'static str = "daily";

    /// Parse a label, recognising weekday abbreviations and buckets.
    pub fn parse(s: &str) -> Result<Self, InvalidDayLabel> {
        if s.is_empty() {
            return Err(InvalidDayLabel {
                reason: "must not be empty",
            });
        }
        if s.len() > MAX_LABEL_LEN {
            return Err(InvalidDayLabel {
                reason: "must be at most 30 bytes",
            });
        }
        if s.chars().any(|c| c.is_whitespace() || c.is_control()) {
            return Err(InvalidDayLabel {
                reason: "must not contain whitespace",
            });
        }

        let label = match s {
            Self::WEEKDAYS => DayLabel::Weekdays,
            Self::WEEKENDS => DayLabel::Weekends,
            Self::DAILY => DayLabel::Daily,
            _ => match weekday_from_abbrev(s) {
                Some(day) => DayLabel::Day(day),
                None => DayLabel::Other(s.to_string()),
            },
        };
        Ok(label)
    }

    /// The label for a single weekday.
    pub fn for_weekday(day: Weekday) -> Self {
        DayLabel::Day(day)
    }

    /// The weekday/weekend bucket a day falls into.
    pub fn bucket_of(day: Weekday) -> Self {
        match day {
            Weekday::Sat | Weekday::Sun => DayLabel::Weekends,
            _ => DayLabel::Weekdays,
        }
    }

    /// Returns the label as stored.
    pub fn as_str(&self) -> &str {
        match self {
            DayLabel::Day(day) => weekday_abbrev(*day),
            DayLabel::Weekdays => Self::WEEKDAYS,
            DayLabel::Weekends => Self::WEEKENDS,
            DayLabel::Daily => Self::DAILY,
            DayLabel::Other(s) => s,
        }
    }

    /// Returns the weekday if this label names exactly one day.
    pub fn weekday(&self) -> Option<Weekday> {
        match self {
            DayLabel::Day(day) => Some(*day),
            _ => None,
        }
    }
}

/// Three-letter English abbreviation, as produced by `%a`.
pub fn weekday_abbrev(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Mon",
        Weekday::Tue => "Tue",
        Weekday::Wed => "Wed",
        Weekday::Thu => "Thu",
        Weekday::Fri => "Fri",
        Weekday::Sat => "Sat",
        Weekday::Sun => "Sun",
    }
}

fn weekday_from_abbrev(s: &str) -> Option<Weekday> {
    let day = match s {
        "Mon" => Weekday::Mon,
        "Tue" => Weekday::Tue,
        "Wed" => Weekday::Wed,
        "Thu" => Weekday::Thu,
        "Fri" => Weekday::Fri,
        "Sat" => Weekday::Sat,
        "Sun" => Weekday::Sun,
        _ => return None,
    };
    Some(day)
}

impl FromStr for DayLabel {
    type Err = InvalidDayLabel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for DayLabel {
    type Error = InvalidDayLabel;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<DayLabel> for String {
    fn from(label: DayLabel) -> Self {
        match label {
            DayLabel::Other(s) => s,
            other => other.as_str().to_string(),
        }
    }
}

impl fmt::Debug for DayLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DayLabel({})", self.as_str())
    }
}

impl fmt::Display for DayLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
