//! Timeline: an ordered collection of items
//!
//! Items are held behind `Arc` so several timelines can share them
//! read-only; extending one timeline with another copies references, never
//! items. The sequence keeps insertion order until [`Timeline::sort`] is
//! called, and no deduplication takes place.
//!
//! Every filter returns a lazy iterator borrowing the timeline, so the
//! sequence cannot change while a filter is being consumed.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;

use super::bound::Point;
use super::error::ItemError;
use super::interval::{EndingMatch, IntervalItem};
use super::item::{Item, ItemRegistry};
use super::tagged::TagMatch;

#[derive(Debug, Error, PartialEq)]
pub enum TimelineError {
    #[error("Index {index} out of range for timeline of length {len}")]
    Index { index: usize, len: usize },

    #[error("Invalid record at position {index}: {source}")]
    Record {
        index: usize,
        #[source]
        source: ItemError,
    },

    #[error(transparent)]
    Item(#[from] ItemError),
}

/// Direction of a sort by start
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    #[default]
    Ascending,
    Descending,
}

/// Behaviour switches for a timeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TimelineOptions {
    /// Order applied by [`Timeline::to_records`] before exporting
    pub export_order: SortOrder,

    /// Matching mode used by [`Timeline::same_ending`]
    pub ending_match: EndingMatch,
}

/// An ordered sequence of shared items
#[derive(Debug, Clone, Default)]
pub struct Timeline {
    items: Vec<Arc<dyn Item>>,
    options: TimelineOptions,
}

impl Timeline {
    /// Creates an empty timeline with default options
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the options of this timeline
    pub fn with_options(mut self, options: TimelineOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> &TimelineOptions {
        &self.options
    }

    /// Appends an owned item
    pub fn append<T: Item>(&mut self, item: T) {
        self.items.push(Arc::new(item));
    }

    /// Appends an item that may also live on other timelines
    pub fn append_shared(&mut self, item: Arc<dyn Item>) {
        self.items.push(item);
    }

    /// Appends every item of another timeline, sharing rather than copying
    pub fn extend(&mut self, other: &Timeline) {
        self.items.extend(other.items.iter().cloned());
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Returns the item at a zero-based position
    pub fn get(&self, index: usize) -> Result<&Arc<dyn Item>, TimelineError> {
        self.items.get(index).ok_or(TimelineError::Index {
            index,
            len: self.items.len(),
        })
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Arc<dyn Item>> {
        self.items.iter()
    }

    /// Sorts in place by start, keeping items with equal starts in their
    /// current relative order
    pub fn sort(&mut self, order: SortOrder) -> &mut Self {
        match order {
            SortOrder::Ascending => self.items.sort_by(|a, b| a.interval().cmp(b.interval())),
            SortOrder::Descending => self.items.sort_by(|a, b| b.interval().cmp(a.interval())),
        }
        log::debug!(
            "event=timeline_sort module=timeline status=ok order={:?} items={}",
            order,
            self.items.len()
        );
        self
    }

    /// Items whose start is not after `before` and not before `after`
    ///
    /// An unbounded start always satisfies `before` and never satisfies
    /// `after`. Either limit may be omitted.
    pub fn filter(
        &self,
        before: Option<Point>,
        after: Option<Point>,
    ) -> impl Iterator<Item = &Arc<dyn Item>> + '_ {
        self.items.iter().filter(move |item| {
            let start = item.interval().start().as_start();
            before.map_or(true, |point| start <= point.extent())
                && after.map_or(true, |point| start >= point.extent())
        })
    }

    /// Items carrying the given tags, all of them or any of them
    ///
    /// Items of kinds without tags never match.
    pub fn tag_filter<I, S>(&self, tags: I, mode: TagMatch) -> impl Iterator<Item = &Arc<dyn Item>> + '_
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let wanted: Vec<String> = tags.into_iter().map(|t| t.as_ref().to_string()).collect();
        self.tagged_with(wanted, mode)
    }

    fn tagged_with(&self, wanted: Vec<String>, mode: TagMatch) -> impl Iterator<Item = &Arc<dyn Item>> + '_ {
        self.items
            .iter()
            .filter(move |item| item.tags().is_some_and(|tags| tags.matches(&wanted, mode)))
    }

    /// Items accepted by an arbitrary predicate
    pub fn data_filter<'a, F>(&'a self, predicate: F) -> impl Iterator<Item = &'a Arc<dyn Item>> + 'a
    where
        F: Fn(&dyn Item) -> bool + 'a,
    {
        self.items.iter().filter(move |&item| predicate(&**item))
    }

    /// Items of one concrete type, downcast to that type
    pub fn class_filter<T: Item>(&self) -> impl Iterator<Item = &T> + '_ {
        self.items
            .iter()
            .filter_map(|item| item.as_any().downcast_ref::<T>())
    }

    /// Items whose record discriminator equals `kind`
    pub fn kind_filter<'a>(&'a self, kind: &'a str) -> impl Iterator<Item = &'a Arc<dyn Item>> + 'a {
        self.items.iter().filter(move |item| item.kind() == kind)
    }

    /// Items ending like `reference`, under the configured ending match
    pub fn same_ending<'a>(
        &'a self,
        reference: &'a IntervalItem,
    ) -> impl Iterator<Item = &'a Arc<dyn Item>> + 'a {
        let mode = self.options.ending_match;
        self.items
            .iter()
            .filter(move |item| item.interval().same_ending_with(reference, mode))
    }

    /// Sorts by the configured export order, then describes every item
    pub fn to_records(&mut self) -> Vec<Value> {
        self.sort(self.options.export_order);
        let records: Vec<Value> = self.items.iter().map(|item| item.to_record()).collect();
        log::debug!(
            "event=timeline_export module=timeline status=ok records={}",
            records.len()
        );
        records
    }

    /// Exports the timeline as a JSON array of records
    pub fn to_json(&mut self) -> String {
        Value::Array(self.to_records()).to_string()
    }

    /// Rebuilds a timeline from records, in record order
    ///
    /// Stops at the first record the registry cannot rebuild.
    pub fn from_records(records: &[Value], registry: &ItemRegistry) -> Result<Self, TimelineError> {
        let mut timeline = Timeline::new();
        for (index, record) in records.iter().enumerate() {
            let item = registry.reconstruct(record).map_err(|source| {
                log::warn!(
                    "event=timeline_import module=timeline status=rejected index={} error={}",
                    index,
                    source
                );
                TimelineError::Record { index, source }
            })?;
            timeline.append_shared(item);
        }
        log::debug!(
            "event=timeline_import module=timeline status=ok records={}",
            timeline.len()
        );
        Ok(timeline)
    }

    /// Rebuilds a timeline from a JSON array of records
    pub fn from_json(json: &str, registry: &ItemRegistry) -> Result<Self, TimelineError> {
        let records: Vec<Value> = serde_json::from_str(json)
            .map_err(|e| ItemError::Format(format!("not a JSON array of records: {}", e)))?;
        Self::from_records(&records, registry)
    }
}

impl<'a> IntoIterator for &'a Timeline {
    type Item = &'a Arc<dyn Item>;
    type IntoIter = std::slice::Iter<'a, Arc<dyn Item>>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl FromIterator<Arc<dyn Item>> for Timeline {
    fn from_iter<I: IntoIterator<Item = Arc<dyn Item>>>(iter: I) -> Self {
        Self {
            items: iter.into_iter().collect(),
            options: TimelineOptions::default(),
        }
    }
}
