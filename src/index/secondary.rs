use crate::core::types::{ConjId, Polarity, TermId};

/*
                +----- conjunction size
                |
   buckets:  +--+--+--+--+--+--+
             |0 |1 | ...  ...  |
             +--+--+--+--+--+--+
                |
                +--> +--------+--------+--------+
                     | termId | termId | termId |   (sorted by term)
                     +--------+--------+--------+
                     | pairs  | pairs  | pairs  |
                     +--------+--------+--------+
                        |
                        +--> (conj 1, ∈) (conj 4, ∈) (conj 4, ∉) (conj 8, ∉)
                             (sorted by conjunction id, ∈ before ∉)
*/

/// One (conjunction, polarity) candidate entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct ConjRef {
    pub conj: ConjId,
    pub polarity: Polarity,
}

/// Per-term candidate list within one size bucket.
#[derive(Debug, Clone)]
pub struct TermEntry {
    pub term: TermId,
    pub pairs: Vec<ConjRef>,
}

/// Second reverse layer: conjunction size → term → (conjunction, polarity)
/// candidates. This is the structure that makes retrieval sub-linear: a
/// search only visits the buckets whose size it can possibly satisfy.
///
/// Size-0 conjunctions additionally register a membership entry under the
/// sentinel term in bucket 0, which makes them vacuously satisfiable.
#[derive(Debug)]
pub struct SecondaryIndex {
    buckets: Vec<Vec<TermEntry>>,
}

/// Initial bucket-array capacity; grows by doubling, never below 4.
const INITIAL_BUCKETS: usize = 16;

fn upper_power_of_two(size: usize) -> usize {
    let mut a = 4;
    while a < size {
        a <<= 1;
    }
    a
}

impl SecondaryIndex {
    pub fn new() -> Self {
        let mut buckets = vec![Vec::new(); INITIAL_BUCKETS];
        buckets[0] = vec![TermEntry {
            term: TermId::SENTINEL,
            pairs: Vec::new(),
        }];
        SecondaryIndex { buckets }
    }

    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    pub fn bucket(&self, size: usize) -> &[TermEntry] {
        &self.buckets[size]
    }

    /// Registers a freshly interned conjunction: every (term, polarity) of
    /// its assignments lands in bucket `size`, plus the sentinel entry for
    /// size-0 conjunctions.
    pub fn register(&mut self, conj: ConjId, size: u8, term_pairs: &[(TermId, Polarity)]) {
        let size = size as usize;
        if size >= self.buckets.len() {
            let grown = upper_power_of_two(size + 1);
            self.buckets.resize_with(grown, Vec::new);
        }

        let bucket = &mut self.buckets[size];
        for &(term, polarity) in term_pairs {
            insert_term_pair(bucket, term, ConjRef { conj, polarity });
        }

        if size == 0 {
            assert!(
                bucket[0].term == TermId::SENTINEL,
                "bucket 0 lost its sentinel entry"
            );
            insert_pair(
                &mut bucket[0].pairs,
                ConjRef {
                    conj,
                    polarity: Polarity::In,
                },
            );
        }
    }
}

impl Default for SecondaryIndex {
    fn default() -> Self {
        SecondaryIndex::new()
    }
}

/// Find-or-insert the term's entry (binary search by term id), then insert
/// the pair into its candidate list.
fn insert_term_pair(bucket: &mut Vec<TermEntry>, term: TermId, pair: ConjRef) {
    match bucket.binary_search_by_key(&term, |e| e.term) {
        Ok(pos) => insert_pair(&mut bucket[pos].pairs, pair),
        Err(_) => {
            bucket.push(TermEntry {
                term,
                pairs: vec![pair],
            });
            let n = bucket.len();
            if n > 1 && bucket[n - 1].term < bucket[n - 2].term {
                bucket.sort_unstable_by_key(|e| e.term);
            }
        }
    }
}

/// Insert keeping the list sorted by (conjunction id, ∈ before ∉); an exact
/// duplicate appears at most once. Appends optimistically, full re-sort
/// only on out-of-order arrival.
fn insert_pair(pairs: &mut Vec<ConjRef>, pair: ConjRef) {
    if pairs.binary_search(&pair).is_ok() {
        return;
    }
    pairs.push(pair);
    let n = pairs.len();
    if n > 1 && pairs[n - 1] < pairs[n - 2] {
        pairs.sort_unstable();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair(conj: usize, polarity: Polarity) -> ConjRef {
        ConjRef {
            conj: ConjId(conj),
            polarity,
        }
    }

    #[test]
    fn starts_with_sentinel_bucket() {
        let idx = SecondaryIndex::new();
        assert_eq!(idx.bucket_count(), 16);
        assert_eq!(idx.bucket(0).len(), 1);
        assert_eq!(idx.bucket(0)[0].term, TermId::SENTINEL);
        assert!(idx.bucket(1).is_empty());
    }

    #[test]
    fn grows_by_doubling() {
        assert_eq!(upper_power_of_two(1), 4);
        assert_eq!(upper_power_of_two(4), 4);
        assert_eq!(upper_power_of_two(5), 8);
        assert_eq!(upper_power_of_two(17), 32);

        let mut idx = SecondaryIndex::new();
        idx.register(ConjId(0), 40, &[(TermId(1), Polarity::In)]);
        assert_eq!(idx.bucket_count(), 64);
        assert_eq!(idx.bucket(40).len(), 1);
        // Existing buckets survive the growth.
        assert_eq!(idx.bucket(0)[0].term, TermId::SENTINEL);
    }

    #[test]
    fn entries_sorted_with_membership_first() {
        let mut idx = SecondaryIndex::new();
        idx.register(ConjId(4), 1, &[(TermId(3), Polarity::NotIn)]);
        idx.register(ConjId(4), 1, &[(TermId(3), Polarity::In)]);
        idx.register(ConjId(1), 1, &[(TermId(3), Polarity::In)]);
        idx.register(ConjId(1), 1, &[(TermId(2), Polarity::In)]);

        let bucket = idx.bucket(1);
        assert_eq!(bucket.len(), 2);
        assert_eq!(bucket[0].term, TermId(2));
        assert_eq!(bucket[1].term, TermId(3));
        assert_eq!(
            bucket[1].pairs,
            vec![
                pair(1, Polarity::In),
                pair(4, Polarity::In),
                pair(4, Polarity::NotIn),
            ]
        );
    }

    #[test]
    fn duplicate_pairs_collapse() {
        let mut idx = SecondaryIndex::new();
        idx.register(ConjId(2), 1, &[(TermId(5), Polarity::In)]);
        idx.register(ConjId(2), 1, &[(TermId(5), Polarity::In)]);
        assert_eq!(idx.bucket(1)[0].pairs.len(), 1);
    }

    #[test]
    fn size_zero_registers_sentinel_entry() {
        let mut idx = SecondaryIndex::new();
        // (age not in {3}) — size 0, one negative term.
        idx.register(ConjId(0), 0, &[(TermId(7), Polarity::NotIn)]);
        let bucket = idx.bucket(0);
        assert_eq!(bucket[0].term, TermId::SENTINEL);
        assert_eq!(bucket[0].pairs, vec![pair(0, Polarity::In)]);
        assert_eq!(bucket[1].term, TermId(7));
        assert_eq!(bucket[1].pairs, vec![pair(0, Polarity::NotIn)]);
    }
}
