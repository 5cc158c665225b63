//! Interval bounds
//!
//! A bound is a calendar date, a date-time, or unbounded. Unbounded means
//! "since the dawn of time" when used as a start and "indefinitely" when
//! used as an end.
//!
//! Dates and date-times are compared by reading a date as midnight of that
//! day. All orderings go through [`Extent`], so this coercion happens in
//! exactly one place.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::error::ItemError;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Time-of-day layouts with minutes; hour-only text is read separately
const TIME_FORMATS: &[&str] = &["%H:%M:%S%.f", "%H:%M"];

/// Position of a bound on the extended time line
///
/// Unbounded starts map to `Before`, unbounded ends map to `After`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) enum Extent {
    Before,
    At(NaiveDateTime),
    After,
}

fn midnight(date: NaiveDate) -> NaiveDateTime {
    date.and_time(NaiveTime::MIN)
}

fn all_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

/// Splits `YYYY-MM-DD[(T| )HH[:MM[:SS[.f]]]]` into its date and time text
///
/// Returns `None` unless every field is zero-padded to its full width.
fn split_iso(s: &str) -> Option<(&str, Option<&str>)> {
    if !s.is_ascii() || s.len() < 10 {
        return None;
    }
    let (date, rest) = s.split_at(10);
    let fields: Vec<&str> = date.split('-').collect();
    let date_ok = matches!(fields.as_slice(), [y, m, d]
        if y.len() == 4 && m.len() == 2 && d.len() == 2
            && all_digits(y) && all_digits(m) && all_digits(d));
    if !date_ok {
        return None;
    }
    if rest.is_empty() {
        return Some((date, None));
    }

    let time = rest.strip_prefix('T').or_else(|| rest.strip_prefix(' '))?;
    let (clock, fraction) = match time.split_once('.') {
        Some((clock, fraction)) => (clock, Some(fraction)),
        None => (time, None),
    };
    let parts: Vec<&str> = clock.split(':').collect();
    let clock_ok = parts.len() <= 3 && parts.iter().all(|p| p.len() == 2 && all_digits(p));
    let fraction_ok = fraction.map_or(true, |f| parts.len() == 3 && all_digits(f));

    (clock_ok && fraction_ok).then_some((date, Some(time)))
}

fn parse_time(s: &str) -> Option<NaiveTime> {
    if s.len() == 2 {
        return s.parse().ok().and_then(|hour| NaiveTime::from_hms_opt(hour, 0, 0));
    }
    TIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveTime::parse_from_str(s, fmt).ok())
}

/// One end of an interval
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "Option<String>", into = "Option<String>")]
pub enum Bound {
    /// No limit on this side
    #[default]
    Unbounded,
    /// A whole calendar day
    OnDate(NaiveDate),
    /// A date with time of day
    OnInstant(NaiveDateTime),
}

impl Bound {
    /// Parses an ISO-8601 date or date-time
    ///
    /// A blank string yields [`Bound::Unbounded`]. Otherwise the text must be
    /// `YYYY-MM-DD`, optionally followed by `T` or a space and
    /// `HH[:MM[:SS[.fff]]]`, with no surrounding whitespace.
    pub fn parse(s: &str) -> Result<Self, ItemError> {
        if s.trim().is_empty() {
            return Ok(Bound::Unbounded);
        }

        let invalid = || ItemError::Format(format!("'{}' is not an ISO-8601 date or date-time", s));
        let (date_text, time_text) = split_iso(s).ok_or_else(invalid)?;
        let date = NaiveDate::parse_from_str(date_text, DATE_FORMAT).map_err(|_| invalid())?;

        match time_text {
            None => Ok(Bound::OnDate(date)),
            Some(time_text) => parse_time(time_text)
                .map(|time| Bound::OnInstant(date.and_time(time)))
                .ok_or_else(invalid),
        }
    }

    /// Returns true if this bound is a concrete date or date-time
    pub fn is_bounded(&self) -> bool {
        !self.is_unbounded()
    }

    /// Returns true if this bound is open
    pub fn is_unbounded(&self) -> bool {
        matches!(self, Bound::Unbounded)
    }

    /// Returns the calendar date component, dropping any time of day
    pub fn date(&self) -> Option<NaiveDate> {
        match self {
            Bound::Unbounded => None,
            Bound::OnDate(d) => Some(*d),
            Bound::OnInstant(dt) => Some(dt.date()),
        }
    }

    /// Returns the concrete instant, reading a date as midnight
    pub fn instant(&self) -> Option<NaiveDateTime> {
        match self {
            Bound::Unbounded => None,
            Bound::OnDate(d) => Some(midnight(*d)),
            Bound::OnInstant(dt) => Some(*dt),
        }
    }

    /// Position of this bound when it opens an interval
    pub(crate) fn as_start(&self) -> Extent {
        self.instant().map_or(Extent::Before, Extent::At)
    }

    /// Position of this bound when it closes an interval
    pub(crate) fn as_end(&self) -> Extent {
        self.instant().map_or(Extent::After, Extent::At)
    }
}

impl fmt::Display for Bound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Bound::Unbounded => write!(f, "None"),
            Bound::OnDate(d) => write!(f, "{}", d.format(DATE_FORMAT)),
            Bound::OnInstant(dt) => write!(f, "{}", dt.format("%Y-%m-%dT%H:%M:%S%.f")),
        }
    }
}

impl FromStr for Bound {
    type Err = ItemError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Bound::parse(s)
    }
}

impl TryFrom<Option<String>> for Bound {
    type Error = ItemError;

    fn try_from(value: Option<String>) -> Result<Self, Self::Error> {
        match value {
            Some(s) => Bound::parse(&s),
            None => Ok(Bound::Unbounded),
        }
    }
}

impl From<Bound> for Option<String> {
    fn from(bound: Bound) -> Self {
        bound.is_bounded().then(|| bound.to_string())
    }
}

impl From<NaiveDate> for Bound {
    fn from(date: NaiveDate) -> Self {
        Bound::OnDate(date)
    }
}

impl From<NaiveDateTime> for Bound {
    fn from(dt: NaiveDateTime) -> Self {
        Bound::OnInstant(dt)
    }
}

/// A concrete point in time: the argument of `before`/`after` style queries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Point {
    Date(NaiveDate),
    DateTime(NaiveDateTime),
}

impl Point {
    /// The point as an instant, reading a date as midnight
    pub fn instant(&self) -> NaiveDateTime {
        match self {
            Point::Date(d) => midnight(*d),
            Point::DateTime(dt) => *dt,
        }
    }

    /// The calendar date of the point
    pub fn date(&self) -> NaiveDate {
        match self {
            Point::Date(d) => *d,
            Point::DateTime(dt) => dt.date(),
        }
    }

    pub(crate) fn extent(&self) -> Extent {
        Extent::At(self.instant())
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&Bound::from(*self), f)
    }
}

impl From<NaiveDate> for Point {
    fn from(date: NaiveDate) -> Self {
        Point::Date(date)
    }
}

impl From<NaiveDateTime> for Point {
    fn from(dt: NaiveDateTime) -> Self {
        Point::DateTime(dt)
    }
}

impl From<Point> for Bound {
    fn from(point: Point) -> Self {
        match point {
            Point::Date(d) => Bound::OnDate(d),
            Point::DateTime(dt) => Bound::OnInstant(dt),
        }
    }
}

impl TryFrom<Bound> for Point {
    type Error = ItemError;

    fn try_from(bound: Bound) -> Result<Self, Self::Error> {
        match bound {
            Bound::OnDate(d) => Ok(Point::Date(d)),
            Bound::OnInstant(dt) => Ok(Point::DateTime(dt)),
            Bound::Unbounded => Err(ItemError::TypeMismatch(
                "expected a date or date-time, got an unbounded value".to_string(),
            )),
        }
    }
}

impl FromStr for Point {
    type Err = ItemError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Bound::parse(s)?.try_into()
    }
}

/// Conversion into a [`Bound`], possibly by parsing
///
/// Lets constructors take dates, date-times, ISO strings, `Option`s of
/// those, or ready-made bounds.
pub trait IntoBound {
    fn into_bound(self) -> Result<Bound, ItemError>;
}

impl IntoBound for Bound {
    fn into_bound(self) -> Result<Bound, ItemError> {
        Ok(self)
    }
}

impl IntoBound for Point {
    fn into_bound(self) -> Result<Bound, ItemError> {
        Ok(self.into())
    }
}

impl IntoBound for NaiveDate {
    fn into_bound(self) -> Result<Bound, ItemError> {
        Ok(Bound::OnDate(self))
    }
}

impl IntoBound for NaiveDateTime {
    fn into_bound(self) -> Result<Bound, ItemError> {
        Ok(Bound::OnInstant(self))
    }
}

impl IntoBound for &str {
    fn into_bound(self) -> Result<Bound, ItemError> {
        Bound::parse(self)
    }
}

impl IntoBound for String {
    fn into_bound(self) -> Result<Bound, ItemError> {
        Bound::parse(&self)
    }
}

impl IntoBound for &String {
    fn into_bound(self) -> Result<Bound, ItemError> {
        Bound::parse(self)
    }
}

impl<T: IntoBound> IntoBound for Option<T> {
    fn into_bound(self) -> Result<Bound, ItemError> {
        match self {
            Some(value) => value.into_bound(),
            None => Ok(Bound::Unbounded),
        }
    }
}
