//! Item trait, structural records and the record registry
//!
//! Every item on a timeline exposes its interval and can describe itself as
//! a structural record: a JSON object with a `type` discriminator, `start`
//! and `end` as ISO-8601 strings (null when unbounded), plus whatever fields
//! the concrete kind adds.
//!
//! Rebuilding items from records goes through an [`ItemRegistry`], which maps
//! discriminators to constructors. Applications with their own item kinds
//! register them next to the built-in ones.

use serde_json::Value;
use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use super::bound::Bound;
use super::error::ItemError;
use super::interval::IntervalItem;
use super::tagged::{TaggedItem, Tags};

/// Anything that can sit on a timeline
pub trait Item: Any + fmt::Debug + Send + Sync {
    /// The span this item covers
    fn interval(&self) -> &IntervalItem;

    /// The record discriminator of the concrete kind
    fn kind(&self) -> &'static str;

    /// Structural representation of the item
    fn to_record(&self) -> Value;

    /// Tags carried by the item, if its kind supports them
    fn tags(&self) -> Option<&Tags> {
        None
    }

    fn as_any(&self) -> &dyn Any;
}

/// Item kinds that can be rebuilt from their record
pub trait FromRecord: Item + Sized {
    /// Discriminator written to the `type` field
    const KIND: &'static str;

    fn from_record(record: &Value) -> Result<Self, ItemError>;
}

/// Constructor stored in the registry
pub type Reconstruct = fn(&Value) -> Result<Arc<dyn Item>, ItemError>;

fn reconstruct<T: FromRecord>(record: &Value) -> Result<Arc<dyn Item>, ItemError> {
    Ok(Arc::new(T::from_record(record)?))
}

/// Maps record discriminators to constructors
#[derive(Clone)]
pub struct ItemRegistry {
    constructors: HashMap<String, Reconstruct>,
}

impl ItemRegistry {
    /// Creates a registry that knows no kinds at all
    pub fn empty() -> Self {
        Self {
            constructors: HashMap::new(),
        }
    }

    /// Registers an item kind under its own discriminator
    pub fn register<T: FromRecord>(&mut self) -> &mut Self {
        self.register_fn(T::KIND, reconstruct::<T>)
    }

    /// Registers a constructor for an arbitrary discriminator
    pub fn register_fn(&mut self, kind: impl Into<String>, build: Reconstruct) -> &mut Self {
        self.constructors.insert(kind.into(), build);
        self
    }

    /// Returns true if the discriminator is known
    pub fn knows(&self, kind: &str) -> bool {
        self.constructors.contains_key(kind)
    }

    /// Iterates over the registered discriminators
    pub fn kinds(&self) -> impl Iterator<Item = &str> {
        self.constructors.keys().map(String::as_str)
    }

    /// Rebuilds an item from its record
    pub fn reconstruct(&self, record: &Value) -> Result<Arc<dyn Item>, ItemError> {
        let kind = kind_of(record)?;
        let build = self
            .constructors
            .get(kind)
            .ok_or_else(|| ItemError::Format(format!("unknown item type '{}'", kind)))?;
        build(record)
    }
}

impl Default for ItemRegistry {
    fn default() -> Self {
        let mut registry = Self::empty();
        registry.register::<IntervalItem>().register::<TaggedItem>();
        registry
    }
}

impl fmt::Debug for ItemRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut kinds: Vec<_> = self.kinds().collect();
        kinds.sort_unstable();
        f.debug_struct("ItemRegistry").field("kinds", &kinds).finish()
    }
}

/// Reads the discriminator of a record
pub fn kind_of(record: &Value) -> Result<&str, ItemError> {
    if !record.is_object() {
        return Err(ItemError::Format("record is not an object".to_string()));
    }
    record
        .get("type")
        .and_then(Value::as_str)
        .ok_or_else(|| ItemError::Format("record has no type discriminator".to_string()))
}

/// Fails unless the record carries the expected discriminator
pub fn expect_kind(record: &Value, expected: &str) -> Result<(), ItemError> {
    let kind = kind_of(record)?;
    if kind != expected {
        return Err(ItemError::Format(format!(
            "expected a '{}' record, got '{}'",
            expected, kind
        )));
    }
    Ok(())
}

/// Looks up a required field
///
/// Older records spelled field names with a leading underscore; both
/// spellings are accepted.
pub fn field<'a>(record: &'a Value, name: &str) -> Result<&'a Value, ItemError> {
    record
        .get(name)
        .or_else(|| record.get(format!("_{}", name)))
        .ok_or_else(|| ItemError::Format(format!("record is missing field '{}'", name)))
}

fn bound(record: &Value, name: &str) -> Result<Bound, ItemError> {
    match field(record, name)? {
        Value::Null => Ok(Bound::Unbounded),
        Value::String(s) => Bound::parse(s),
        other => Err(ItemError::Format(format!(
            "field '{}' must be a string or null, got {}",
            name, other
        ))),
    }
}

/// Reads the `start` and `end` fields of a record
pub fn bounds(record: &Value) -> Result<(Bound, Bound), ItemError> {
    Ok((bound(record, "start")?, bound(record, "end")?))
}
