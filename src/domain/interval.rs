//! Interval item: a time span with optional open ends
//!
//! Both ends are closed when concrete. An unbounded start reaches back to
//! minus infinity and an unbounded end reaches forward to plus infinity,
//! which is what makes every overlap and containment question well defined.
//!
//! Ordering and equality look at the start only: the type answers "what
//! starts first?". Use [`IntervalItem::same`] for identity of the whole span.

use chrono::Duration;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::any::Any;
use std::cmp::Ordering;
use std::fmt;

use super::bound::{Bound, IntoBound, Point};
use super::error::ItemError;
use super::item::{self, FromRecord, Item};

/// How two ends are compared by [`IntervalItem::same_ending_with`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EndingMatch {
    /// Bounds must be identical, so a date never equals a date-time
    #[default]
    Exact,
    /// Only the calendar dates are compared
    DateOnly,
}

/// A span of time between two bounds
#[derive(Debug, Clone, Copy)]
pub struct IntervalItem {
    start: Bound,
    end: Bound,
}

impl IntervalItem {
    /// Creates an interval, parsing string bounds if needed
    ///
    /// Fails with [`ItemError::Format`] for unparseable text and with
    /// [`ItemError::Range`] when both bounds are concrete and the start lies
    /// after the end.
    pub fn new(start: impl IntoBound, end: impl IntoBound) -> Result<Self, ItemError> {
        Self::from_bounds(start.into_bound()?, end.into_bound()?)
    }

    /// Creates an interval from already built bounds
    pub fn from_bounds(start: Bound, end: Bound) -> Result<Self, ItemError> {
        if start.is_bounded() && end.is_bounded() && start.as_start() > end.as_end() {
            log::debug!(
                "event=interval_new module=interval status=rejected start={} end={}",
                start,
                end
            );
            return Err(ItemError::Range(format!(
                "interval ends before it starts: {} - {}",
                start, end
            )));
        }
        Ok(Self { start, end })
    }

    /// Creates an interval open on both sides
    pub fn endless() -> Self {
        Self {
            start: Bound::Unbounded,
            end: Bound::Unbounded,
        }
    }

    pub fn start(&self) -> Bound {
        self.start
    }

    pub fn end(&self) -> Bound {
        self.end
    }

    /// Returns true if both bounds are open
    pub fn is_endless(&self) -> bool {
        self.start.is_unbounded() && self.end.is_unbounded()
    }

    /// Returns true for a degenerate span whose concrete start equals its end
    pub fn is_event(&self) -> bool {
        self.start.is_bounded() && self.start == self.end
    }

    /// Returns true if both start and end are identical
    pub fn same(&self, other: &IntervalItem) -> bool {
        self.start == other.start && self.end == other.end
    }

    /// Returns true if both ends are identical
    pub fn same_ending(&self, other: &IntervalItem) -> bool {
        self.same_ending_with(other, EndingMatch::Exact)
    }

    /// Compares ends using the given matching mode
    pub fn same_ending_with(&self, other: &IntervalItem, mode: EndingMatch) -> bool {
        match mode {
            EndingMatch::Exact => self.end == other.end,
            EndingMatch::DateOnly => self.end.date() == other.end.date(),
        }
    }

    /// Does this start strictly before the point?
    ///
    /// Always true for an unbounded start. A date start reads as midnight,
    /// so it starts before any later time on that same day.
    pub fn before(&self, point: impl Into<Point>) -> bool {
        self.start.as_start() < point.into().extent()
    }

    /// Does this end strictly after the point?
    ///
    /// Always true for an unbounded end.
    pub fn after(&self, point: impl Into<Point>) -> bool {
        self.end.as_end() > point.into().extent()
    }

    /// Returns true if the two closed spans share any instant
    pub fn overlap(&self, other: &IntervalItem) -> bool {
        self.start.as_start() <= other.end.as_end() && other.start.as_start() <= self.end.as_end()
    }

    /// Returns true if the spans share no instant
    pub fn distinct(&self, other: &IntervalItem) -> bool {
        !self.overlap(other)
    }

    /// Returns true if this span fully encloses the other
    ///
    /// An open side on `other` is only enclosed by an open side here.
    pub fn contains(&self, other: &IntervalItem) -> bool {
        self.start.as_start() <= other.start.as_start() && other.end.as_end() <= self.end.as_end()
    }

    /// Returns true if `other` starts on the calendar day after this ends
    pub fn adjacent(&self, other: &IntervalItem) -> bool {
        match (self.end.date(), other.start.date()) {
            (Some(end), Some(start)) => end.succ_opt() == Some(start),
            _ => false,
        }
    }

    /// Length as a duration of whole days
    ///
    /// Times of day are dropped before subtracting.
    pub fn timedelta(&self) -> Result<Duration, ItemError> {
        match (self.start.date(), self.end.date()) {
            (Some(start), Some(end)) => Ok(end.signed_duration_since(start)),
            _ => Err(ItemError::Range(format!(
                "cannot measure an interval with an open side: {}",
                self
            ))),
        }
    }

    /// Length in whole days
    pub fn length(&self) -> Result<i64, ItemError> {
        self.timedelta().map(|delta| delta.num_days())
    }
}

impl fmt::Display for IntervalItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.start, self.end)
    }
}

impl PartialEq for IntervalItem {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for IntervalItem {}

impl PartialOrd for IntervalItem {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for IntervalItem {
    fn cmp(&self, other: &Self) -> Ordering {
        self.start.as_start().cmp(&other.start.as_start())
    }
}

impl Item for IntervalItem {
    fn interval(&self) -> &IntervalItem {
        self
    }

    fn kind(&self) -> &'static str {
        Self::KIND
    }

    fn to_record(&self) -> Value {
        json!({
            "type": Self::KIND,
            "start": Option::<String>::from(self.start),
            "end": Option::<String>::from(self.end),
        })
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl FromRecord for IntervalItem {
    const KIND: &'static str = "interval";

    fn from_record(record: &Value) -> Result<Self, ItemError> {
        item::expect_kind(record, Self::KIND)?;
        let (start, end) = item::bounds(record)?;
        Self::from_bounds(start, end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn item(start: &str, end: &str) -> IntervalItem {
        IntervalItem::new(start, end).unwrap()
    }

    fn open_end(start: &str) -> IntervalItem {
        IntervalItem::new(start, Bound::Unbounded).unwrap()
    }

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    struct Fixture {
        first: IntervalItem,
        second: IntervalItem,
        equal: IntervalItem,
        ending: IntervalItem,
        event: IntervalItem,
        endless: IntervalItem,
    }

    fn fixture() -> Fixture {
        Fixture {
            first: item("2020-01-01", "2020-12-31"),
            second: item("2021-01-01", "2021-12-31"),
            equal: open_end("2020-01-01"),
            ending: item("2020-02-02", "2020-12-31"),
            event: item("2020-12-24", "2020-12-24"),
            endless: IntervalItem::endless(),
        }
    }

    #[test]
    fn new_rejects_backwards_interval() {
        assert!(IntervalItem::new("2020-11-11", "2022-11-11").is_ok());
        assert!(IntervalItem::new("2020-11-11", "2020-11-11").is_ok());
        assert!(matches!(
            IntervalItem::new("2022-11-11", "1980-11-11"),
            Err(ItemError::Range(_))
        ));
    }

    #[test]
    fn new_rejects_unparseable_bound() {
        assert!(matches!(
            IntervalItem::new("soon", "2020-01-01"),
            Err(ItemError::Format(_))
        ));
    }

    #[test]
    fn new_accepts_mixed_bound_kinds() {
        let start = date("2020-01-01");
        let end = date("2020-01-01").and_hms_opt(18, 0, 0).unwrap();
        let mixed = IntervalItem::new(start, end).unwrap();
        assert_eq!(mixed.start(), Bound::OnDate(start));
        assert_eq!(mixed.end(), Bound::OnInstant(end));

        // Noon is after the midnight the date stands for
        let noon = date("2020-01-01").and_hms_opt(12, 0, 0).unwrap();
        assert!(IntervalItem::new(noon, date("2020-01-01")).is_err());
    }

    #[test]
    fn basic_comparisons() {
        let f = fixture();

        assert_eq!(f.first, f.equal);
        assert_ne!(f.first, f.second);

        assert!(f.first < f.second);
        assert!(!(f.second < f.first));
        assert!(!(f.first < f.equal));

        assert!(f.first <= f.second);
        assert!(f.first <= f.equal);
        assert!(!(f.second <= f.first));
        assert!(f.equal <= f.first);

        assert!(f.second > f.first);
        assert!(!(f.first > f.second));
        assert!(!(f.equal > f.first));

        assert!(f.second >= f.first);
        assert!(f.equal >= f.first);
        assert!(!(f.first >= f.second));
        assert!(f.first >= f.equal);
    }

    #[test]
    fn unbounded_start_comparisons() {
        let f = fixture();

        assert_eq!(f.endless, f.endless);
        assert_ne!(f.first, f.endless);
        assert_ne!(f.endless, f.second);

        assert!(f.endless < f.second);
        assert!(!(f.second < f.endless));
        assert!(f.endless <= f.second);
        assert!(f.endless <= f.equal);
        assert!(!(f.second <= f.endless));
        assert!(f.endless <= f.endless);

        assert!(f.second > f.endless);
        assert!(!(f.endless > f.second));
        assert!(!(f.endless > f.endless));

        assert!(f.second >= f.endless);
        assert!(f.endless >= f.endless);
        assert!(!(f.endless >= f.second));
    }

    #[test]
    fn date_and_datetime_starts_compare_at_midnight() {
        let on_date = item("2020-03-03", "2020-03-04");
        let at_midnight = item("2020-03-03T00:00:00", "2020-03-04");
        let at_noon = item("2020-03-03T12:00:00", "2020-03-04");

        assert_eq!(on_date, at_midnight);
        assert!(on_date < at_noon);
        assert!(!on_date.same(&at_midnight));
    }

    #[test]
    fn is_event() {
        let f = fixture();
        assert!(f.event.is_event());
        assert!(!f.first.is_event());
        assert!(!f.endless.is_event());
    }

    #[test]
    fn same() {
        let f = fixture();
        assert!(f.first.same(&f.first));
        assert!(f.endless.same(&f.endless));
        assert!(f.second.same(&f.second));
        assert!(!f.first.same(&f.second));
        assert!(!f.endless.same(&f.first));
        assert!(!f.first.same(&f.equal));
    }

    #[test]
    fn same_ending() {
        let f = fixture();
        assert!(f.first.same_ending(&f.first));
        assert!(f.first.same_ending(&f.ending));
        assert!(!f.first.same_ending(&f.second));
        assert!(f.equal.same_ending(&f.endless));
    }

    #[test]
    fn same_ending_date_only() {
        let on_date = item("2020-01-01", "2020-06-30");
        let at_evening = item("2020-01-01", "2020-06-30T20:00:00");

        assert!(!on_date.same_ending(&at_evening));
        assert!(on_date.same_ending_with(&at_evening, EndingMatch::DateOnly));
        assert!(!on_date.same_ending_with(&open_end("2020-01-01"), EndingMatch::DateOnly));
    }

    #[test]
    fn endless() {
        let f = fixture();
        assert!(f.endless.is_endless());
        assert!(!f.first.is_endless());
        assert!(!f.equal.is_endless());
    }

    #[test]
    fn before_and_after() {
        let f = fixture();
        let mid_2020 = date("2020-06-01");

        assert!(f.first.before(mid_2020));
        assert!(!f.second.before(mid_2020));
        assert!(!f.first.before(date("2020-01-01")));
        assert!(f.endless.before(mid_2020));

        assert!(f.first.after(mid_2020));
        assert!(!f.first.after(date("2020-12-31")));
        assert!(f.equal.after(date("2999-01-01")));
    }

    #[test]
    fn before_coerces_datetime_points() {
        let f = fixture();
        let new_year_noon = date("2020-01-01").and_hms_opt(12, 0, 0).unwrap();
        assert!(f.first.before(new_year_noon));
        assert!(!f.first.after(date("2020-12-31").and_hms_opt(0, 0, 1).unwrap()));
    }

    #[test]
    fn overlap() {
        let f = fixture();
        assert!(f.first.overlap(&f.first));
        assert!(f.first.overlap(&f.endless));
        assert!(f.endless.overlap(&f.first));
        assert!(f.event.overlap(&f.first));
        assert!(!f.first.overlap(&f.second));
        assert!(!f.second.overlap(&f.first));
    }

    #[test]
    fn overlap_with_half_open_intervals() {
        let f = fixture();
        let until_2019 = IntervalItem::new(Bound::Unbounded, "2019-12-31").unwrap();
        let until_2020 = IntervalItem::new(Bound::Unbounded, "2020-01-01").unwrap();
        let from_2021 = open_end("2021-06-01");

        assert!(!until_2019.overlap(&f.first));
        assert!(until_2020.overlap(&f.first));
        assert!(f.equal.overlap(&f.second));
        assert!(from_2021.overlap(&f.second));
        assert!(!from_2021.overlap(&f.first));
        assert!(until_2020.overlap(&until_2019));
        assert!(!until_2019.overlap(&from_2021));
    }

    #[test]
    fn distinct() {
        let f = fixture();
        assert!(!f.first.distinct(&f.first));
        assert!(!f.first.distinct(&f.endless));
        assert!(!f.endless.distinct(&f.first));
        assert!(!f.event.distinct(&f.first));
        assert!(f.first.distinct(&f.second));
        assert!(f.second.distinct(&f.first));
    }

    #[test]
    fn contains() {
        let reference = item("2022-01-01", "2022-12-31");
        let contained = item("2022-01-01", "2022-12-12");
        let outside = item("2021-01-01", "2021-02-02");
        let overlaps = item("2022-12-12", "2023-12-12");
        let no_start = IntervalItem::new(Bound::Unbounded, "2022-02-02").unwrap();

        assert!(reference.contains(&contained));
        assert!(!reference.contains(&outside));
        assert!(!reference.contains(&overlaps));
        assert!(!reference.contains(&no_start));
        assert!(reference.contains(&reference));
    }

    #[test]
    fn contains_with_open_sides() {
        let f = fixture();
        assert!(f.endless.contains(&f.first));
        assert!(f.endless.contains(&f.equal));
        assert!(f.equal.contains(&f.second));
        assert!(!f.first.contains(&f.equal));
        assert!(!f.first.contains(&f.endless));
    }

    #[test]
    fn adjacent() {
        let f = fixture();
        assert!(f.first.adjacent(&f.second));
        assert!(!f.first.adjacent(&f.equal));
        assert!(!f.first.adjacent(&f.endless));
        assert!(!f.second.adjacent(&f.first));
        assert!(!f.endless.adjacent(&f.first));
    }

    #[test]
    fn adjacent_drops_time_of_day() {
        let late = item("2020-01-01", "2020-03-31T23:59:00");
        let early = item("2020-04-01T06:00:00", "2020-05-01");
        assert!(late.adjacent(&early));
    }

    #[test]
    fn length() {
        let start = date("2022-11-11");
        let one_day = IntervalItem::new(start, start.succ_opt().unwrap()).unwrap();
        assert_eq!(one_day.length().unwrap(), 1);
        assert_eq!(one_day.timedelta().unwrap(), Duration::days(1));

        let unbounded = IntervalItem::new(start, Bound::Unbounded).unwrap();
        assert!(matches!(unbounded.length(), Err(ItemError::Range(_))));
        assert!(matches!(unbounded.timedelta(), Err(ItemError::Range(_))));
    }

    #[test]
    fn length_truncates_to_whole_days() {
        let exact = item("2022-11-11T09:00:00", "2022-11-12T09:00:00");
        let longer = item("2022-11-11T09:00:00", "2022-11-12T09:45:00");
        assert_eq!(exact.length().unwrap(), 1);
        assert_eq!(longer.length().unwrap(), 1);
    }

    #[test]
    fn display() {
        let f = fixture();
        assert_eq!(f.first.to_string(), "2020-01-01 - 2020-12-31");
        assert_eq!(f.equal.to_string(), "2020-01-01 - None");
    }

    #[test]
    fn record_roundtrip() {
        let original = open_end("2022-01-01");
        let record = original.to_record();
        assert_eq!(record["type"], "interval");
        assert_eq!(record["start"], "2022-01-01");
        assert!(record["end"].is_null());

        let parsed = IntervalItem::from_record(&record).unwrap();
        assert!(parsed.same(&original));
    }

    #[test]
    fn from_record_rejects_wrong_kind() {
        let record = json!({"type": "tagged", "start": null, "end": null});
        assert!(matches!(
            IntervalItem::from_record(&record),
            Err(ItemError::Format(_))
        ));

        let untyped = json!({"start": null, "end": null});
        assert!(matches!(
            IntervalItem::from_record(&untyped),
            Err(ItemError::Format(_))
        ));
    }

    #[test]
    fn from_record_rejects_missing_fields() {
        let record = json!({"type": "interval", "start": "2020-01-01"});
        assert!(matches!(
            IntervalItem::from_record(&record),
            Err(ItemError::Format(_))
        ));
    }

    #[test]
    fn from_record_rejects_backwards_bounds() {
        let record = json!({"type": "interval", "start": "2021-01-01", "end": "2020-01-01"});
        assert!(matches!(
            IntervalItem::from_record(&record),
            Err(ItemError::Range(_))
        ));
    }
}
