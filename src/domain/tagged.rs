//! Tagged item: an interval carrying user data and a set of tags
//!
//! Two tagged items that describe the very same span can be merged. Merging
//! unions the tags and folds the other item's data into this one's, turning
//! it into a list on first merge. The fold is order dependent:
//! merging A into B and B into A yield the same tags but differently shaped
//! data.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::any::Any;
use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::ops::Deref;

use super::bound::IntoBound;
use super::error::ItemError;
use super::interval::IntervalItem;
use super::item::{self, FromRecord, Item};

/// How a collection of tags is matched against an item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TagMatch {
    /// Every requested tag must be present
    #[default]
    All,
    /// At least one requested tag must be present
    Any,
}

/// Set of unique tags
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Tags(BTreeSet<String>);

impl Tags {
    /// Creates an empty tag set
    pub fn new() -> Self {
        Self(BTreeSet::new())
    }

    /// Adds a tag, returning false if it was already present
    pub fn insert(&mut self, tag: impl Into<String>) -> bool {
        self.0.insert(tag.into())
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.0.contains(tag)
    }

    /// Returns true if the sets have a tag in common
    pub fn intersects(&self, other: &Tags) -> bool {
        self.0.intersection(&other.0).next().is_some()
    }

    /// Checks a collection of tags under the given mode
    pub fn matches<I, S>(&self, tags: I, mode: TagMatch) -> bool
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut tags = tags.into_iter();
        match mode {
            TagMatch::All => tags.all(|t| self.contains(t.as_ref())),
            TagMatch::Any => tags.any(|t| self.contains(t.as_ref())),
        }
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates over the tags in sorted order
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl From<&str> for Tags {
    fn from(tag: &str) -> Self {
        Self(BTreeSet::from([tag.to_string()]))
    }
}

impl From<String> for Tags {
    fn from(tag: String) -> Self {
        Self(BTreeSet::from([tag]))
    }
}

impl<S: Into<String>> From<Vec<S>> for Tags {
    fn from(tags: Vec<S>) -> Self {
        tags.into_iter().collect()
    }
}

impl<S: Into<String>, const N: usize> From<[S; N]> for Tags {
    fn from(tags: [S; N]) -> Self {
        tags.into_iter().collect()
    }
}

impl<S: Into<String>> FromIterator<S> for Tags {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

impl<S: Into<String>> Extend<S> for Tags {
    fn extend<I: IntoIterator<Item = S>>(&mut self, iter: I) {
        self.0.extend(iter.into_iter().map(Into::into));
    }
}

/// An interval with user data and tags
#[derive(Debug, Clone)]
pub struct TaggedItem {
    interval: IntervalItem,
    data: Value,
    tags: Tags,
}

impl TaggedItem {
    /// Creates a tagged item
    ///
    /// `tags` takes a single tag, an array or vector of tags, or
    /// [`Tags::new()`] for none.
    pub fn new(
        start: impl IntoBound,
        end: impl IntoBound,
        data: impl Into<Value>,
        tags: impl Into<Tags>,
    ) -> Result<Self, ItemError> {
        Ok(Self::from_interval(IntervalItem::new(start, end)?, data, tags))
    }

    /// Wraps an existing interval
    pub fn from_interval(interval: IntervalItem, data: impl Into<Value>, tags: impl Into<Tags>) -> Self {
        Self {
            interval,
            data: data.into(),
            tags: tags.into(),
        }
    }

    /// Creates an item that starts and ends at the same concrete point
    pub fn event(
        point: impl IntoBound,
        data: impl Into<Value>,
        tags: impl Into<Tags>,
    ) -> Result<Self, ItemError> {
        let point = point.into_bound()?;
        if point.is_unbounded() {
            return Err(ItemError::Range(
                "an event needs a concrete point, not an unbounded one".to_string(),
            ));
        }
        Self::new(point, point, data, tags)
    }

    pub fn interval(&self) -> &IntervalItem {
        &self.interval
    }

    pub fn data(&self) -> &Value {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut Value {
        &mut self.data
    }

    pub fn tags(&self) -> &Tags {
        &self.tags
    }

    /// Adds a tag (no-op if present)
    pub fn add_tag(&mut self, tag: impl Into<String>) {
        self.tags.insert(tag);
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.contains(tag)
    }

    /// Checks several tags at once, requiring all or any of them
    pub fn has_tags<I, S>(&self, tags: I, mode: TagMatch) -> bool
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.tags.matches(tags, mode)
    }

    /// Returns true if the two items have at least one tag in common
    pub fn shares_tag(&self, other: &TaggedItem) -> bool {
        self.tags.intersects(&other.tags)
    }

    /// Folds another item describing the same span into this one
    ///
    /// Fails with [`ItemError::State`] unless both start and end are
    /// identical; nothing is modified in that case.
    pub fn merge(&mut self, other: &TaggedItem) -> Result<&mut Self, ItemError> {
        if !self.interval.same(&other.interval) {
            log::debug!(
                "event=item_merge module=tagged status=rejected ours={} theirs={}",
                self.interval,
                other.interval
            );
            return Err(ItemError::State(format!(
                "cannot merge items with different spans: {} and {}",
                self.interval, other.interval
            )));
        }

        self.tags.extend(other.tags.iter());

        match (&mut self.data, &other.data) {
            (Value::Array(ours), Value::Array(theirs)) => ours.extend(theirs.iter().cloned()),
            (Value::Array(ours), theirs) => ours.push(theirs.clone()),
            (ours, theirs) => {
                let previous = ours.take();
                *ours = Value::Array(vec![previous, theirs.clone()]);
            }
        }

        log::debug!(
            "event=item_merge module=tagged status=ok span={} tags={}",
            self.interval,
            self.tags.len()
        );
        Ok(self)
    }
}

impl Deref for TaggedItem {
    type Target = IntervalItem;

    fn deref(&self) -> &Self::Target {
        &self.interval
    }
}

impl PartialEq for TaggedItem {
    fn eq(&self, other: &Self) -> bool {
        self.interval == other.interval
    }
}

impl Eq for TaggedItem {}

impl PartialOrd for TaggedItem {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TaggedItem {
    fn cmp(&self, other: &Self) -> Ordering {
        self.interval.cmp(&other.interval)
    }
}

impl Item for TaggedItem {
    fn interval(&self) -> &IntervalItem {
        &self.interval
    }

    fn kind(&self) -> &'static str {
        Self::KIND
    }

    fn to_record(&self) -> Value {
        json!({
            "type": Self::KIND,
            "start": Option::<String>::from(self.interval.start()),
            "end": Option::<String>::from(self.interval.end()),
            "data": self.data,
            "tags": self.tags,
        })
    }

    fn tags(&self) -> Option<&Tags> {
        Some(&self.tags)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl FromRecord for TaggedItem {
    const KIND: &'static str = "tagged";

    fn from_record(record: &Value) -> Result<Self, ItemError> {
        item::expect_kind(record, Self::KIND)?;
        let (start, end) = item::bounds(record)?;
        let data = item::field(record, "data")?.clone();
        let tags = match item::field(record, "tags")? {
            Value::Null => Tags::new(),
            value => serde_json::from_value(value.clone())
                .map_err(|e| ItemError::Format(format!("field 'tags' is not a list of strings: {}", e)))?,
        };

        Ok(Self::from_interval(IntervalItem::from_bounds(start, end)?, data, tags))
    }
}
