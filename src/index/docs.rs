use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::core::error::{Error, ErrorKind, Result};
use crate::core::types::{ConjId, DocId};

/// A stored document: an OR-list of conjunction ids plus management fields.
/// Documents are never physically removed; deletion flips `active` and
/// records a comment.
#[derive(Debug, Clone)]
pub struct Document<A> {
    pub id: DocId,
    pub external_id: String,
    pub name: String,
    pub dnf: String,
    pub conjunctions: Vec<ConjId>,
    pub attr: A,
    pub active: bool,
    pub comment: String,
    pub created_at: DateTime<Utc>,
}

/// Append-only document table paired with the external-id uniqueness index.
///
/// The uniqueness map lives behind the same lock as the table so the
/// existence check and the append happen in one critical section.
#[derive(Debug)]
pub struct DocStore<A> {
    docs: Vec<Document<A>>,
    by_external_id: HashMap<String, DocId>,
}

impl<A> DocStore<A> {
    pub fn new() -> Self {
        DocStore {
            docs: Vec::with_capacity(16),
            by_external_id: HashMap::new(),
        }
    }

    pub fn contains_external(&self, external_id: &str) -> bool {
        self.by_external_id.contains_key(external_id)
    }

    /// Appends a document, assigning the next dense internal id. Rejects an
    /// external id that was ever added before, active or not.
    pub fn add(
        &mut self,
        name: &str,
        external_id: &str,
        dnf: &str,
        mut conjunctions: Vec<ConjId>,
        attr: A,
    ) -> Result<DocId> {
        if self.by_external_id.contains_key(external_id) {
            return Err(Error::new(
                ErrorKind::DuplicateDoc,
                format!("doc {} has been added before", external_id),
            ));
        }
        conjunctions.sort_unstable();
        let id = DocId(self.docs.len());
        self.by_external_id.insert(external_id.to_string(), id);
        self.docs.push(Document {
            id,
            external_id: external_id.to_string(),
            name: name.to_string(),
            dnf: dnf.to_string(),
            conjunctions,
            attr,
            active: true,
            comment: String::new(),
            created_at: Utc::now(),
        });
        Ok(id)
    }

    /// Soft delete: returns whether the document was previously active,
    /// false for an unknown external id. Index entries are untouched.
    pub fn delete(&mut self, external_id: &str, comment: &str) -> bool {
        match self.by_external_id.get(external_id) {
            Some(&id) => {
                let doc = &mut self.docs[id.value()];
                let was_active = doc.active;
                doc.active = false;
                doc.comment = comment.to_string();
                was_active
            }
            None => false,
        }
    }

    pub fn get(&self, id: DocId) -> Option<&Document<A>> {
        self.docs.get(id.value())
    }

    pub fn get_by_external_id(&self, external_id: &str) -> Option<&Document<A>> {
        self.by_external_id
            .get(external_id)
            .map(|id| &self.docs[id.value()])
    }

    pub fn iter(&self) -> impl Iterator<Item = &Document<A>> {
        self.docs.iter()
    }

    pub fn len(&self) -> usize {
        self.docs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }
}

impl<A> Default for DocStore<A> {
    fn default() -> Self {
        DocStore::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_dense_append_positions() {
        let mut store: DocStore<()> = DocStore::new();
        let a = store
            .add("ad0", "x0", "(age in {3})", vec![ConjId(0)], ())
            .unwrap();
        let b = store
            .add("ad1", "x1", "(age in {4})", vec![ConjId(1)], ())
            .unwrap();
        assert_eq!(a, DocId(0));
        assert_eq!(b, DocId(1));
        assert_eq!(store.get(a).unwrap().external_id, "x0");
    }

    #[test]
    fn external_id_unique_even_after_delete() {
        let mut store: DocStore<()> = DocStore::new();
        store.add("ad0", "x0", "(age in {3})", vec![], ()).unwrap();
        let err = store
            .add("other", "x0", "(age in {4})", vec![], ())
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::DuplicateDoc);

        assert!(store.delete("x0", "retired"));
        let err = store
            .add("again", "x0", "(age in {4})", vec![], ())
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::DuplicateDoc);
    }

    #[test]
    fn delete_reports_prior_activity() {
        let mut store: DocStore<()> = DocStore::new();
        store.add("ad0", "x0", "(age in {3})", vec![], ()).unwrap();
        assert!(store.delete("x0", "first"));
        assert!(!store.delete("x0", "second"));
        assert!(!store.delete("unknown", ""));
        let doc = store.get_by_external_id("x0").unwrap();
        assert!(!doc.active);
        assert_eq!(doc.comment, "second");
    }

    #[test]
    fn conjunction_list_is_sorted_on_add() {
        let mut store: DocStore<()> = DocStore::new();
        let id = store
            .add(
                "ad0",
                "x0",
                "(a in {1}) or (b in {2})",
                vec![ConjId(7), ConjId(2), ConjId(5)],
                (),
            )
            .unwrap();
        assert_eq!(
            store.get(id).unwrap().conjunctions,
            vec![ConjId(2), ConjId(5), ConjId(7)]
        );
    }
}
