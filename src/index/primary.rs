use crate::core::types::{ConjId, DocId};

/*
             | <--  conjunction count  --> |
   slots:    +----+----+----+----+----+----+
             | 0  | 1  | 2  | ...     ...  |
             +----+----+----+----+----+----+
                |
                +--> doc1.id, doc3.id, ... docN.id (sorted)
*/

/// First reverse layer: conjunction id → sorted list of document ids.
///
/// A slot is reserved the moment its conjunction id is interned, before the
/// id can appear anywhere else, so lookups here are never out of bounds.
#[derive(Debug, Default)]
pub struct PrimaryIndex {
    slots: Vec<Vec<DocId>>,
}

impl PrimaryIndex {
    pub fn new() -> Self {
        PrimaryIndex::default()
    }

    /// Reserves the doc-list slot for a freshly interned conjunction id.
    pub fn push_slot(&mut self) {
        self.slots.push(Vec::new());
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn docs(&self, conj: ConjId) -> &[DocId] {
        assert!(
            conj.value() < self.slots.len(),
            "conjunction {} has no primary slot",
            conj.value()
        );
        &self.slots[conj.value()]
    }

    /// Inserts `doc` into every referenced conjunction's slot, skipping
    /// duplicates. Appends optimistically and falls back to a full sort only
    /// when the new id arrives out of order.
    pub fn insert_doc(&mut self, doc: DocId, conjunctions: &[ConjId]) {
        for &conj in conjunctions {
            assert!(
                conj.value() < self.slots.len(),
                "conjunction {} has no primary slot",
                conj.value()
            );
            let slot = &mut self.slots[conj.value()];
            if slot.binary_search(&doc).is_ok() {
                continue;
            }
            slot.push(doc);
            let n = slot.len();
            if n > 1 && slot[n - 1] < slot[n - 2] {
                slot.sort_unstable();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slots_stay_sorted_and_deduplicated() {
        let mut idx = PrimaryIndex::new();
        idx.push_slot();
        idx.push_slot();

        idx.insert_doc(DocId(5), &[ConjId(0)]);
        idx.insert_doc(DocId(2), &[ConjId(0), ConjId(1)]);
        idx.insert_doc(DocId(9), &[ConjId(0)]);
        idx.insert_doc(DocId(2), &[ConjId(0)]);

        assert_eq!(idx.docs(ConjId(0)), &[DocId(2), DocId(5), DocId(9)]);
        assert_eq!(idx.docs(ConjId(1)), &[DocId(2)]);
    }

    #[test]
    fn duplicate_conjunction_in_one_doc_is_skipped_not_fatal() {
        let mut idx = PrimaryIndex::new();
        idx.push_slot();
        idx.push_slot();
        // A document whose DNF repeats one conjunction lists its id twice.
        idx.insert_doc(DocId(0), &[ConjId(0), ConjId(0), ConjId(1)]);
        assert_eq!(idx.docs(ConjId(0)), &[DocId(0)]);
        assert_eq!(idx.docs(ConjId(1)), &[DocId(0)]);
    }

    #[test]
    #[should_panic(expected = "no primary slot")]
    fn missing_slot_is_fatal() {
        let mut idx = PrimaryIndex::new();
        idx.insert_doc(DocId(0), &[ConjId(0)]);
    }
}
