//! Upcoming-time filtering.

use chrono::NaiveTime;

/// Return the times greater than or equal to `reference`.
///
/// Relative order of the input is preserved; nothing is sorted.
///
/// # Examples
///
/// ```
/// use schedule_server::schedule::times_gte;
/// use chrono::NaiveTime;
///
/// let t = |h, m| NaiveTime::from_hms_opt(h, m, 0).unwrap();
///
/// let times = [t(1, 1), t(2, 2), t(3, 3)];
/// assert_eq!(times_gte(&times, t(2, 2)), vec![t(2, 2), t(3, 3)]);
/// assert_eq!(times_gte(&times, t(1, 9)), vec![t(2, 2), t(3, 3)]);
/// assert!(times_gte(&[], t(0, 0)).is_empty());
/// ```
pub fn times_gte(times: &[NaiveTime], reference: NaiveTime) -> Vec<NaiveTime> {
    upcoming(times.to_vec(), reference, |t| *t)
}

/// Keep the items whose time is at or after `reference`.
///
/// The generic form of [`times_gte`], used to filter schedule entries by
/// their time of day.
pub fn upcoming<T>(
    mut items: Vec<T>,
    reference: NaiveTime,
    time_of: impl Fn(&T) -> NaiveTime,
) -> Vec<T> {
    items.retain(|item| time_of(item) >= reference);
    items
}
