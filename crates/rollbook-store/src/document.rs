use chrono::{DateTime, Utc};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use uuid::Uuid;

/// A storable entity.
///
/// Documents round-trip through JSON objects; the store only ever inspects
/// the `id` and `deleted_at` fields directly, everything else is opaque and
/// addressed by serialized field name (see [`Filter`] and [`Patch`]).
pub trait Document: Clone + Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Collection name, used in error and log context.
    const COLLECTION: &'static str;

    fn id(&self) -> Uuid;

    fn deleted_at(&self) -> Option<DateTime<Utc>>;
}

/// Equality filter over serialized document fields.
///
/// Clauses combine with AND. A missing field compares as JSON `null`, so
/// `eq("school_id", Value::Null)` matches documents without an owning school.
#[derive(Debug, Clone, Default)]
pub struct Filter {
    clauses: Vec<Clause>,
}

#[derive(Debug, Clone)]
enum Clause {
    Eq(&'static str, Value),
    Ne(&'static str, Value),
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn eq(mut self, field: &'static str, value: impl Serialize) -> Self {
        self.clauses.push(Clause::Eq(field, to_json(value)));
        self
    }

    /// Excludes documents whose `field` equals `value`. Used to leave the
    /// current document out of uniqueness checks and occupancy counts.
    pub fn ne(mut self, field: &'static str, value: impl Serialize) -> Self {
        self.clauses.push(Clause::Ne(field, to_json(value)));
        self
    }

    pub(crate) fn matches(&self, doc: &Map<String, Value>) -> bool {
        self.clauses.iter().all(|clause| match clause {
            Clause::Eq(field, value) => field_of(doc, field) == *value,
            Clause::Ne(field, value) => field_of(doc, field) != *value,
        })
    }
}

fn field_of(doc: &Map<String, Value>, field: &str) -> Value {
    doc.get(field).cloned().unwrap_or(Value::Null)
}

fn to_json(value: impl Serialize) -> Value {
    serde_json::to_value(value).unwrap_or(Value::Null)
}

/// A `$set`-style partial update: only the named fields are touched, the
/// rest of the document is left as stored.
#[derive(Debug, Clone, Default)]
pub struct Patch {
    fields: Map<String, Value>,
}

impl Patch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(mut self, field: &str, value: impl Serialize) -> Self {
        self.fields.insert(field.to_string(), to_json(value));
        self
    }

    /// Builds a patch from the fields a partial-update payload actually
    /// supplied, restricted to `allowed` field names. Payload fields that
    /// serialize as absent (`Option::None` with `skip_serializing_if`) are
    /// not part of the patch.
    pub fn from_partial<T: Serialize>(payload: &T, allowed: &[&str]) -> crate::StoreResult<Self> {
        let value = serde_json::to_value(payload).map_err(crate::StoreError::Serialize)?;
        let Value::Object(supplied) = value else {
            return Err(crate::StoreError::NotAnObject);
        };
        let fields = supplied
            .into_iter()
            .filter(|(key, value)| allowed.contains(&key.as_str()) && !value.is_null())
            .collect();
        Ok(Self { fields })
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub(crate) fn apply(&self, doc: &mut Map<String, Value>) {
        for (field, value) in &self.fields {
            doc.insert(field.clone(), value.clone());
        }
    }
}
