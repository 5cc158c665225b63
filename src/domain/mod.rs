//! Domain models for timelines
//!
//! Contains the interval algebra, tagged items and the timeline container,
//! without any I/O concerns.

mod bound;
mod error;
mod interval;
mod item;
mod tagged;
mod timeline;

pub use bound::{Bound, IntoBound, Point};
pub use error::ItemError;
pub use interval::{EndingMatch, IntervalItem};
pub use item::{bounds, expect_kind, field, kind_of, FromRecord, Item, ItemRegistry, Reconstruct};
pub use tagged::{TagMatch, TaggedItem, Tags};
pub use timeline::{SortOrder, Timeline, TimelineError, TimelineOptions};
