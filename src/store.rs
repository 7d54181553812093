//! Read-only data-store contract used by the interpreter.
//!
//! The interpreter never owns data. It asks a [`DataStore`] for a bounded page
//! of records and an unbounded count per entity. [`MemoryStore`] is the
//! bundled implementation, filled from a JSON document or record by record.

use std::collections::HashMap;
use std::fmt;

use thiserror::Error;
use tracing::debug;

/// A single stored record, kept as untyped JSON.
pub type Record = serde_json::Value;

/// Record collections a query can name.
///
/// # Examples
///
/// ```text
/// FIND products      -> Entity::Products
/// FIND customers     -> Entity::Customers   (never backed by a store)
/// FIND Products      -> no entity           (names are case-sensitive)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Entity {
    Products,
    Orders,
    Stores,
    Customers,
}

impl Entity {
    pub const ALL: [Entity; 4] = [
        Entity::Products,
        Entity::Orders,
        Entity::Stores,
        Entity::Customers,
    ];

    /// Resolve a name exactly as written in the query.
    pub fn from_name(name: &str) -> Option<Entity> {
        match name {
            "products" => Some(Entity::Products),
            "orders" => Some(Entity::Orders),
            "stores" => Some(Entity::Stores),
            "customers" => Some(Entity::Customers),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Entity::Products => "products",
            Entity::Orders => "orders",
            Entity::Stores => "stores",
            Entity::Customers => "customers",
        }
    }

    /// Entities the interpreter reads from a store. Customers are accepted by
    /// the grammar but have no backing collection.
    pub fn is_backed(&self) -> bool {
        !matches!(self, Entity::Customers)
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("invalid store document: {0}")]
    Json(#[from] serde_json::Error),

    #[error("store document must be a JSON object")]
    NotAnObject,

    #[error("collection '{0}' must be a JSON array")]
    NotAnArray(String),

    /// Failure reported by an external store implementation
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Read-only access to record collections.
///
/// Implementations must treat an empty or missing collection as empty, not
/// as an error.
pub trait DataStore: Send + Sync {
    /// Up to `limit` records of `entity`, in storage order.
    fn fetch(&self, entity: Entity, limit: usize) -> Result<Vec<Record>, StoreError>;

    /// Total number of records of `entity`, ignoring any limit.
    fn count(&self, entity: Entity) -> Result<u64, StoreError>;
}

/// In-memory [`DataStore`].
///
/// # Examples
///
/// ```
/// use storeql::store::{DataStore, Entity, MemoryStore};
///
/// let store = MemoryStore::from_json(r#"{"products": [{"name": "mug"}]}"#).unwrap();
/// assert_eq!(store.count(Entity::Products).unwrap(), 1);
/// assert_eq!(store.count(Entity::Orders).unwrap(), 0);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    collections: HashMap<Entity, Vec<Record>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load collections from `{"products": [...], "orders": [...], ...}`.
    ///
    /// Unknown top-level keys are skipped; known keys must hold arrays.
    pub fn from_json(document: &str) -> Result<Self, StoreError> {
        let parsed: serde_json::Value = serde_json::from_str(document)?;
        Self::from_value(parsed)
    }

    pub fn from_value(document: serde_json::Value) -> Result<Self, StoreError> {
        let serde_json::Value::Object(map) = document else {
            return Err(StoreError::NotAnObject);
        };

        let mut store = MemoryStore::new();
        for (key, value) in map {
            let Some(entity) = Entity::from_name(&key) else {
                debug!(key = %key, "skipping unknown collection");
                continue;
            };
            let serde_json::Value::Array(records) = value else {
                return Err(StoreError::NotAnArray(key));
            };
            store.collections.entry(entity).or_default().extend(records);
        }
        Ok(store)
    }

    pub fn insert(&mut self, entity: Entity, record: Record) {
        self.collections.entry(entity).or_default().push(record);
    }

    pub fn with_records(mut self, entity: Entity, records: impl IntoIterator<Item = Record>) -> Self {
        self.collections.entry(entity).or_default().extend(records);
        self
    }
}

impl DataStore for MemoryStore {
    fn fetch(&self, entity: Entity, limit: usize) -> Result<Vec<Record>, StoreError> {
        let records = self
            .collections
            .get(&entity)
            .map(|records| records.iter().take(limit).cloned().collect())
            .unwrap_or_default();
        Ok(records)
    }

    fn count(&self, entity: Entity) -> Result<u64, StoreError> {
        Ok(self
            .collections
            .get(&entity)
            .map_or(0, |records| records.len() as u64))
    }
}
