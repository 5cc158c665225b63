//! Timeline - interval algebra for dated items
//!
//! Models periods such as employment history or validity windows as
//! intervals whose start and end may each be a date, a date-time or
//! unbounded. Provides ordering, overlap, containment and adjacency
//! queries, tagged items with mergeable data, and an ordered timeline with
//! lazy filters and structural record export.

pub mod config;
pub mod domain;

pub use config::{Config, ConfigError};
pub use domain::{
    Bound, EndingMatch, IntervalItem, Item, ItemError, ItemRegistry, Point, SortOrder, TagMatch,
    TaggedItem, Tags, Timeline, TimelineError, TimelineOptions,
};
