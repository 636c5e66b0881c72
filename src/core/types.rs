use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Internal document id, equal to the document's append position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DocId(pub usize);

impl DocId {
    pub fn new(id: usize) -> Self {
        DocId(id)
    }

    pub fn value(&self) -> usize {
        self.0
    }
}

/// Interned (key, value) fact id. Id 0 is the reserved sentinel term and is
/// never produced by real input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TermId(pub usize);

impl TermId {
    pub const SENTINEL: TermId = TermId(0);

    pub fn value(&self) -> usize {
        self.0
    }
}

/// Interned assignment id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AssignmentId(pub usize);

impl AssignmentId {
    pub fn value(&self) -> usize {
        self.0
    }
}

/// Interned conjunction id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ConjId(pub usize);

impl ConjId {
    pub fn value(&self) -> usize {
        self.0
    }
}

/// Whether an assignment requires membership or non-membership.
///
/// `In` orders before `NotIn` so that (conjunction, polarity) pairs in the
/// secondary reverse index tie-break in favor of the membership entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Polarity {
    In,
    NotIn,
}

impl Polarity {
    pub fn is_in(self) -> bool {
        matches!(self, Polarity::In)
    }
}

/// A retrieval condition: one key=value fact about the query context.
///
/// A dnf like `(country in {CN, RU, US})` is retrieved by any one of
/// `Cond::new("country", "CN")`, `Cond::new("country", "RU")` or
/// `Cond::new("country", "US")`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cond {
    pub key: String,
    pub val: String,
}

impl Cond {
    pub fn new(key: &str, val: &str) -> Self {
        Cond {
            key: key.to_string(),
            val: val.to_string(),
        }
    }
}

impl fmt::Display for Cond {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "({}: {})", self.key, self.val)
    }
}

/// Capability contract for document attribute payloads. The index never
/// inspects the payload beyond these two projections.
pub trait DocAttr {
    /// Human-readable one-line rendering, used by listings and diagnostics.
    fn to_text(&self) -> String;

    /// Map projection, used by the JSON export views.
    fn to_map(&self) -> Map<String, Value>;
}
