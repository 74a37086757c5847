//! Day classification: which day label applies to a queried day.
//!
//! A station's entries are tried tier by tier, in the order given by
//! [`TIERS`]. The first tier with at least one entry wins and lower tiers
//! are never consulted; entries from different tiers are never merged.

use chrono::{Datelike, NaiveDate, Weekday};
use tracing::debug;

use crate::domain::{DayLabel, ScheduleEntry};

/// One priority level of the day fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tier {
    /// A holiday label supplied by the [`HolidayCalendar`].
    Holiday,
    /// The exact day, e.g. `Sat`.
    Exact,
    /// The `weekdays` or `weekends` bucket containing the day.
    Bucket,
    /// The `daily` bucket.
    Daily,
}

/// Tiers in matching priority order.
pub const TIERS: [Tier; 4] = [Tier::Holiday, Tier::Exact, Tier::Bucket, Tier::Daily];

impl Tier {
    /// The label this tier looks for when `query` is asked about.
    ///
    /// Returns `None` when the tier does not apply to the query.
    pub fn label_for(self, query: &DayQuery, holidays: &dyn HolidayCalendar) -> Option<DayLabel> {
        match self {
            Tier::Holiday => query.date().and_then(|date| holidays.holiday_label(date)),
            Tier::Exact => Some(query.label()),
            Tier::Bucket => query.weekday().map(DayLabel::bucket_of),
            Tier::Daily => Some(DayLabel::Daily),
        }
    }
}

/// Source of holiday overrides.
///
/// Returning a label for a date makes entries carrying that label take
/// priority over every weekly tier on that date.
pub trait HolidayCalendar {
    fn holiday_label(&self, date: NaiveDate) -> Option<DayLabel>;
}

/// Calendar with no holidays. The holiday tier never fires.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoHolidays;

impl HolidayCalendar for NoHolidays {
    fn holiday_label(&self, _date: NaiveDate) -> Option<DayLabel> {
        None
    }
}

/// What a classification is asked about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DayQuery {
    /// A calendar date; its weekday drives the tiers.
    Date(NaiveDate),
    /// A label chosen by the caller, bypassing date math.
    Label(DayLabel),
}

impl DayQuery {
    fn date(&self) -> Option<NaiveDate> {
        match self {
            DayQuery::Date(date) => Some(*date),
            DayQuery::Label(_) => None,
        }
    }

    fn weekday(&self) -> Option<Weekday> {
        match self {
            DayQuery::Date(date) => Some(date.weekday()),
            DayQuery::Label(label) => label.weekday(),
        }
    }

    fn label(&self) -> DayLabel {
        match self {
            DayQuery::Date(date) => DayLabel::for_weekday(date.weekday()),
            DayQuery::Label(label) => label.clone(),
        }
    }
}

impl From<NaiveDate> for DayQuery {
    fn from(date: NaiveDate) -> Self {
        DayQuery::Date(date)
    }
}

impl From<DayLabel> for DayQuery {
    fn from(label: DayLabel) -> Self {
        DayQuery::Label(label)
    }
}

/// Outcome of classifying a station's entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// Entries from the first tier that had any.
    Matched {
        tier: Tier,
        label: DayLabel,
        entries: Vec<ScheduleEntry>,
    },
    /// No tier matched anything.
    NoMatch,
}

/// Picks the applicable day label for a query.
#[derive(Debug, Clone, Default)]
pub struct DayClassifier<H = NoHolidays> {
    holidays: H,
}

impl DayClassifier<NoHolidays> {
    pub fn new() -> Self {
        Self {
            holidays: NoHolidays,
        }
    }
}

impl<H: HolidayCalendar> DayClassifier<H> {
    /// Create a classifier that consults `holidays` first.
    pub fn with_holidays(holidays: H) -> Self {
        Self { holidays }
    }

    /// The candidate labels for `query`, in priority order.
    pub fn candidates(&self, query: &DayQuery) -> Vec<(Tier, DayLabel)> {
        let mut candidates: Vec<(Tier, DayLabel)> = Vec::with_capacity(TIERS.len());
        for tier in TIERS {
            if let Some(label) = tier.label_for(query, &self.holidays)
                && !candidates.iter().any(|(_, l)| *l == label)
            {
                candidates.push((tier, label));
            }
        }
        candidates
    }

    /// The candidate labels alone, for fetching entries.
    pub fn candidate_labels(&self, query: &DayQuery) -> Vec<DayLabel> {
        self.candidates(query)
            .into_iter()
            .map(|(_, label)| label)
            .collect()
    }

    /// Select the entries of the first tier that has any.
    ///
    /// `entries` may hold any mix of labels; those matching no candidate
    /// are ignored. Input order is kept within the selected tier.
    pub fn select(&self, query: &DayQuery, entries: Vec<ScheduleEntry>) -> Selection {
        for (tier, label) in self.candidates(query) {
            let matching: Vec<ScheduleEntry> =
                entries.iter().filter(|e| e.day == label).cloned().collect();
            if !matching.is_empty() {
                debug!(?tier, label = %label, count = matching.len(), "Day tier matched");
                return Selection::Matched {
                    tier,
                    label,
                    entries: matching,
                };
            }
        }
        Selection::NoMatch
    }
}
