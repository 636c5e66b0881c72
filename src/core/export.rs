use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::core::types::{Cond, ConjId, DocAttr, TermId};
use crate::index::docs::{DocStore, Document};
use crate::index::intern::{Assignment, AssignmentStore, Conjunction, ConjunctionStore, TermStore};

/// Serializable listing projection of one document.
#[derive(Debug, Clone, Serialize)]
pub struct DocEntry {
    pub id: usize,
    pub name: String,
    pub external_id: String,
    pub active: bool,
    pub comment: String,
    pub dnf: String,
    pub created_at: DateTime<Utc>,
    pub attr: Map<String, Value>,
}

impl DocEntry {
    fn from_doc<A: DocAttr>(doc: &Document<A>) -> Self {
        DocEntry {
            id: doc.id.value(),
            name: doc.name.clone(),
            external_id: doc.external_id.clone(),
            active: doc.active,
            comment: doc.comment.clone(),
            dnf: doc.dnf.clone(),
            created_at: doc.created_at,
            attr: doc.attr.to_map(),
        }
    }
}

/// One page of the document listing.
#[derive(Debug, Clone, Serialize)]
pub struct DumpPage {
    pub total_records: usize,
    pub data: Vec<DocEntry>,
}

/// Pages are 1-based; `(0, 0)` dumps everything. A page beyond the end
/// yields an empty listing with `total_records` 0.
pub(crate) fn dump_page<A: DocAttr>(
    docs: &DocStore<A>,
    page_num: usize,
    page_size: usize,
) -> DumpPage {
    let total = docs.len();
    let start = page_num.saturating_sub(1) * page_size;
    if total == 0 || start >= total {
        return DumpPage {
            total_records: 0,
            data: Vec::new(),
        };
    }
    let end = if page_size == 0 {
        total
    } else {
        (start + page_size).min(total)
    };
    let data = docs
        .iter()
        .skip(start)
        .take(end - start)
        .map(DocEntry::from_doc)
        .collect();
    DumpPage {
        total_records: total,
        data,
    }
}

pub(crate) fn dump_filtered<A: DocAttr>(
    docs: &DocStore<A>,
    filter: impl Fn(&A) -> bool,
) -> DumpPage {
    let data: Vec<DocEntry> = docs
        .iter()
        .filter(|d| filter(&d.attr))
        .map(DocEntry::from_doc)
        .collect();
    DumpPage {
        total_records: data.len(),
        data,
    }
}

pub(crate) fn dump_all<A: DocAttr>(docs: &DocStore<A>) -> Vec<DocEntry> {
    docs.iter().map(DocEntry::from_doc).collect()
}

pub(crate) fn dump_by_external_id<A: DocAttr>(docs: &DocStore<A>) -> BTreeMap<String, DocEntry> {
    docs.iter()
        .map(|d| (d.external_id.clone(), DocEntry::from_doc(d)))
        .collect()
}

pub(crate) fn dump_by_name<A: DocAttr>(docs: &DocStore<A>) -> BTreeMap<String, DocEntry> {
    docs.iter()
        .map(|d| (d.name.clone(), DocEntry::from_doc(d)))
        .collect()
}

/// `{ (platform: iOS), (city: ShangHai) }` rendering of a condition list.
pub fn conditions_to_string(conds: &[Cond]) -> String {
    let parts: Vec<String> = conds.iter().map(|c| c.to_string()).collect();
    format!("{{ {} }}", parts.join(", "))
}

pub fn render_term(terms: &TermStore, id: TermId) -> String {
    if id == TermId::SENTINEL {
        return " ∅ ".to_string();
    }
    let term = terms.get(id);
    format!("( {} {} )", term.key, term.val)
}

pub fn render_assignment(assignment: &Assignment, terms: &TermStore) -> String {
    if assignment.terms.is_empty() {
        return String::new();
    }
    let op = if assignment.polarity.is_in() {
        "∈"
    } else {
        "∉"
    };
    let key = &terms.get(assignment.terms[0]).key;
    let vals: Vec<&str> = assignment
        .terms
        .iter()
        .map(|&t| terms.get(t).val.as_str())
        .collect();
    format!("{} {} {{ {} }}", key, op, vals.join(", "))
}

pub fn render_conjunction(
    conjunction: &Conjunction,
    assignments: &AssignmentStore,
    terms: &TermStore,
) -> String {
    if conjunction.assignments.is_empty() {
        return String::new();
    }
    let parts: Vec<String> = conjunction
        .assignments
        .iter()
        .map(|&a| render_assignment(assignments.get(a), terms))
        .collect();
    format!("( {} )", parts.join(" ∩ "))
}

/// Renders a document's normalized OR-of-ANDs from its interned structure.
pub fn render_expression(
    conjunction_ids: &[ConjId],
    conjunctions: &ConjunctionStore,
    assignments: &AssignmentStore,
    terms: &TermStore,
) -> String {
    let parts: Vec<String> = conjunction_ids
        .iter()
        .map(|&c| render_conjunction(conjunctions.get(c), assignments, terms))
        .collect();
    parts.join(" ∪ ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::Polarity;

    struct NoAttr;

    impl DocAttr for NoAttr {
        fn to_text(&self) -> String {
            String::new()
        }

        fn to_map(&self) -> Map<String, Value> {
            Map::new()
        }
    }

    #[test]
    fn renders_interned_structure() {
        let mut terms = TermStore::new();
        let t3 = terms.intern("age", "3");
        let t4 = terms.intern("age", "4");
        let mut assignments = AssignmentStore::new();
        let a = assignments.intern(Polarity::NotIn, vec![t3, t4]);
        let mut conjunctions = ConjunctionStore::new();
        let (c, _) = conjunctions.intern(0, vec![a]);

        assert_eq!(render_term(&terms, TermId::SENTINEL), " ∅ ");
        assert_eq!(render_term(&terms, t3), "( age 3 )");
        assert_eq!(
            render_expression(&[c], &conjunctions, &assignments, &terms),
            "( age ∉ { 3, 4 } )"
        );
    }

    #[test]
    fn conditions_render_in_order() {
        let conds = vec![Cond::new("platform", "iOS"), Cond::new("city", "ShangHai")];
        assert_eq!(
            conditions_to_string(&conds),
            "{ (platform: iOS), (city: ShangHai) }"
        );
    }

    #[test]
    fn paging_matches_listing_contract() {
        let mut docs: DocStore<NoAttr> = DocStore::new();
        for i in 0..5 {
            docs.add(
                &format!("doc-{}", i),
                &format!("{}", i),
                "(age in {3})",
                vec![],
                NoAttr,
            )
            .unwrap();
        }

        let page = dump_page(&docs, 1, 2);
        assert_eq!(page.total_records, 5);
        assert_eq!(page.data.len(), 2);
        assert_eq!(page.data[0].id, 0);

        let page = dump_page(&docs, 3, 2);
        assert_eq!(page.data.len(), 1);
        assert_eq!(page.data[0].id, 4);

        let beyond = dump_page(&docs, 9, 2);
        assert_eq!(beyond.total_records, 0);
        assert!(beyond.data.is_empty());

        let all = dump_page(&docs, 0, 0);
        assert_eq!(all.total_records, 5);
        assert_eq!(all.data.len(), 5);
    }
}
