use std::collections::HashSet;

use crate::core::error::{Error, ErrorKind, Result};
use crate::core::types::{Cond, ConjId, DocId, TermId};
use crate::index::docs::DocStore;
use crate::index::primary::PrimaryIndex;
use crate::index::secondary::SecondaryIndex;
use crate::sparse::count_set::CountSet;
use crate::sparse::int_set::IntSet;

/// Search input validation: at least one condition, keys pairwise distinct.
pub(crate) fn check_conditions(conds: &[Cond]) -> Result<()> {
    if conds.is_empty() {
        return Err(Error::new(
            ErrorKind::InvalidInput,
            "no conditions to search".to_string(),
        ));
    }
    let mut seen = HashSet::new();
    for cond in conds {
        if !seen.insert(cond.key.as_str()) {
            return Err(Error::new(
                ErrorKind::InvalidInput,
                format!("duplicate keys: {}", cond.key),
            ));
        }
    }
    Ok(())
}

/// Conjunction matching: walks every size bucket a query of `terms.len()`
/// resolved facts can satisfy and collects the conjunctions that reach
/// exactly their size in distinct membership hits without a single
/// non-membership hit.
///
/// `conj_count` sizes the per-bucket counting contexts and must be read
/// while the secondary index is frozen, so every id found here fits.
pub(crate) fn matching_conjunctions(
    secondary: &SecondaryIndex,
    conj_count: usize,
    terms: &[TermId],
) -> Vec<ConjId> {
    assert!(secondary.bucket_count() > 0);
    let max_size = terms.len().min(secondary.bucket_count() - 1);
    assert!(max_size <= 255);

    let mut matched = IntSet::new();

    for size in 0..=max_size {
        let bucket = secondary.bucket(size);
        if bucket.is_empty() {
            continue;
        }

        let mut counts = CountSet::new(size as u8, conj_count);

        for &tid in terms {
            if let Ok(pos) = bucket.binary_search_by_key(&tid, |e| e.term) {
                for pair in &bucket[pos].pairs {
                    counts.add(pair.conj.value(), pair.polarity.is_in());
                }
            }
        }

        if size == 0 {
            // Replay the sentinel entries so every size-0 conjunction is
            // vacuously satisfied unless a non-membership hit vetoed it.
            for pair in &bucket[0].pairs {
                debug_assert!(pair.polarity.is_in());
                counts.add(pair.conj.value(), pair.polarity.is_in());
            }
        }

        matched.add_slice(&counts.into_vec());
    }

    matched.into_vec().into_iter().map(ConjId).collect()
}

/// Document resolution: every document referencing a matching conjunction,
/// admitted only while active and accepted by the attribute filter. Sorted
/// and deduplicated.
pub(crate) fn matching_documents<A>(
    primary: &PrimaryIndex,
    docs: &DocStore<A>,
    conjunctions: &[ConjId],
    filter: impl Fn(&A) -> bool,
) -> Vec<DocId> {
    let mut found = IntSet::new();
    for &conj in conjunctions {
        for &doc_id in primary.docs(conj) {
            let doc = docs
                .get(doc_id)
                .expect("primary index references an unknown document id");
            if doc.active && filter(&doc.attr) {
                found.add(doc_id.value());
            }
        }
    }
    found.into_vec().into_iter().map(DocId).collect()
}
