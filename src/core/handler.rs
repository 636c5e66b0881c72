use std::collections::BTreeMap;

use parking_lot::RwLock;
use serde_json::{Map, Value};
use tracing::{debug, trace};

use crate::core::config::Syntax;
use crate::core::error::{Error, ErrorKind, Result};
use crate::core::export::{self, DocEntry, DumpPage};
use crate::core::local::LocalHandler;
use crate::core::types::{Cond, ConjId, DocAttr, DocId, Polarity, TermId};
use crate::dnf::check::check;
use crate::dnf::parse::{self, ParsedConjunction};
use crate::index::docs::DocStore;
use crate::index::intern::{AssignmentStore, ConjunctionStore, TermStore};
use crate::index::primary::PrimaryIndex;
use crate::index::secondary::SecondaryIndex;
use crate::search;

/// Concurrent boolean-targeting index over documents described by DNF
/// expressions. Safe for use from multiple threads: every structure is
/// guarded by its own reader/writer lock, there is no global lock.
///
/// Cross-structure consistency is deliberately weak: a search running
/// concurrently with an add may observe a new conjunction before its
/// document arrives (or vice versa), but ids are reserved before they are
/// dereferenced, so no structure is ever read out of bounds and a document
/// never appears half added.
///
/// For single-threaded bulk builds or a pre-built read-only index, convert
/// to [`LocalHandler`] and back.
pub struct Handler<A> {
    syntax: Syntax,
    terms: RwLock<TermStore>,
    assignments: RwLock<AssignmentStore>,
    conjunctions: RwLock<ConjunctionStore>,
    docs: RwLock<DocStore<A>>,
    primary: RwLock<PrimaryIndex>,
    secondary: RwLock<SecondaryIndex>,
}

impl<A> Handler<A> {
    pub fn new() -> Self {
        Handler::with_syntax(Syntax::default())
    }

    pub fn with_syntax(syntax: Syntax) -> Self {
        Handler {
            syntax,
            terms: RwLock::new(TermStore::new()),
            assignments: RwLock::new(AssignmentStore::new()),
            conjunctions: RwLock::new(ConjunctionStore::new()),
            docs: RwLock::new(DocStore::new()),
            primary: RwLock::new(PrimaryIndex::new()),
            secondary: RwLock::new(SecondaryIndex::new()),
        }
    }

    pub fn syntax(&self) -> Syntax {
        self.syntax
    }

    /// Replacing the syntax takes `&mut self` so it cannot race with a
    /// parse in progress.
    pub fn set_syntax(&mut self, syntax: Syntax) {
        self.syntax = syntax;
    }

    /// Validates DNF text against this handler's syntax without touching
    /// the index.
    pub fn check(&self, dnf: &str) -> Result<()> {
        check(&self.syntax, dnf)
    }

    /// Adds a document under a globally unique external id.
    ///
    /// Validation runs before any mutation, so a rejected document leaves
    /// the index untouched. The uniqueness check is repeated inside the
    /// document store's write section; see `DocStore::add`.
    pub fn add_document(&self, name: &str, external_id: &str, dnf: &str, attr: A) -> Result<DocId> {
        if self.docs.read().contains_external(external_id) {
            return Err(Error::new(
                ErrorKind::DuplicateDoc,
                format!("doc {} has been added before", external_id),
            ));
        }
        check(&self.syntax, dnf)?;
        let parsed = parse::parse(&self.syntax, dnf)?;

        let mut conj_ids = Vec::with_capacity(parsed.len());
        for pc in &parsed {
            conj_ids.push(self.intern_conjunction(pc));
        }

        let doc_id = self
            .docs
            .write()
            .add(name, external_id, dnf, conj_ids.clone(), attr)?;
        self.primary.write().insert_doc(doc_id, &conj_ids);
        debug!(
            external_id,
            internal_id = doc_id.value(),
            conjunctions = conj_ids.len(),
            "document added"
        );
        Ok(doc_id)
    }

    /// Interns one parsed conjunction bottom-up (terms, then assignments,
    /// then the conjunction) and wires a brand-new conjunction into both
    /// reverse indexes. The primary slot is reserved while the conjunction
    /// store is still locked, so a concurrent add deduplicating onto the
    /// new id always finds the slot present.
    fn intern_conjunction(&self, pc: &ParsedConjunction<'_>) -> ConjId {
        let mut assignment_ids = Vec::with_capacity(pc.assignments.len());
        let mut term_pairs: Vec<(TermId, Polarity)> = Vec::new();

        for pa in &pc.assignments {
            let mut term_ids = Vec::with_capacity(pa.vals.len());
            {
                let mut terms = self.terms.write();
                for val in &pa.vals {
                    term_ids.push(terms.intern(pa.key, val));
                }
            }
            term_ids.sort_unstable();
            term_ids.dedup();
            let assignment_id = self
                .assignments
                .write()
                .intern(pa.polarity, term_ids.clone());
            assignment_ids.push(assignment_id);
            term_pairs.extend(term_ids.into_iter().map(|t| (t, pa.polarity)));
        }

        let (conj_id, is_new) = {
            let mut conjunctions = self.conjunctions.write();
            let (id, is_new) = conjunctions.intern(pc.size, assignment_ids);
            if is_new {
                self.primary.write().push_slot();
            }
            (id, is_new)
        };
        if is_new {
            self.secondary.write().register(conj_id, pc.size, &term_pairs);
        }
        conj_id
    }

    /// Soft-deletes by external id, recording a comment. Returns whether
    /// the document was previously active; false for an unknown id.
    pub fn delete_document(&self, external_id: &str, comment: &str) -> bool {
        let was_active = self.docs.write().delete(external_id, comment);
        debug!(external_id, was_active, "document soft-deleted");
        was_active
    }

    /// Retrieves the sorted internal ids of every active document whose DNF
    /// is satisfied by `conds` and whose attribute passes `attr_filter`.
    ///
    /// Facts that resolve to no known term are silently dropped; they
    /// cannot contribute matches. Errors are limited to input validation.
    pub fn search<F>(&self, conds: &[Cond], attr_filter: F) -> Result<Vec<DocId>>
    where
        F: Fn(&A) -> bool,
    {
        search::check_conditions(conds)?;

        let term_ids: Vec<TermId> = {
            let terms = self.terms.read();
            conds
                .iter()
                .filter_map(|c| terms.resolve(&c.key, &c.val))
                .collect()
        };

        let conjunctions = {
            let secondary = self.secondary.read();
            // Read the count while the secondary index is frozen so every
            // id visible in it fits the counting contexts.
            let conj_count = self.conjunctions.read().len();
            search::matching_conjunctions(&secondary, conj_count, &term_ids)
        };
        if conjunctions.is_empty() {
            return Ok(Vec::new());
        }

        let found = {
            let primary = self.primary.read();
            let docs = self.docs.read();
            search::matching_documents(&primary, &docs, &conjunctions, attr_filter)
        };
        trace!(
            conditions = conds.len(),
            resolved = term_ids.len(),
            matched = found.len(),
            "search finished"
        );
        Ok(found)
    }

    /// `search` with an accept-all attribute filter.
    pub fn search_all(&self, conds: &[Cond]) -> Result<Vec<DocId>> {
        self.search(conds, |_| true)
    }

    pub fn doc_count(&self) -> usize {
        self.docs.read().len()
    }

    pub fn conjunction_count(&self) -> usize {
        self.conjunctions.read().len()
    }

    pub fn term_count(&self) -> usize {
        self.terms.read().len()
    }

    /// Renders a document's normalized DNF from the interned structure.
    pub fn doc_expression(&self, id: DocId) -> Result<String> {
        let conj_ids = {
            let docs = self.docs.read();
            docs.get(id)
                .ok_or_else(|| doc_not_found(id))?
                .conjunctions
                .clone()
        };
        let conjunctions = self.conjunctions.read();
        let assignments = self.assignments.read();
        let terms = self.terms.read();
        Ok(export::render_expression(
            &conj_ids,
            &conjunctions,
            &assignments,
            &terms,
        ))
    }

    /// Unwraps the locks for single-threaded use.
    pub fn into_local(self) -> LocalHandler<A> {
        LocalHandler {
            syntax: self.syntax,
            terms: self.terms.into_inner(),
            assignments: self.assignments.into_inner(),
            conjunctions: self.conjunctions.into_inner(),
            docs: self.docs.into_inner(),
            primary: self.primary.into_inner(),
            secondary: self.secondary.into_inner(),
        }
    }

    pub(crate) fn from_parts(local: LocalHandler<A>) -> Self {
        Handler {
            syntax: local.syntax,
            terms: RwLock::new(local.terms),
            assignments: RwLock::new(local.assignments),
            conjunctions: RwLock::new(local.conjunctions),
            docs: RwLock::new(local.docs),
            primary: RwLock::new(local.primary),
            secondary: RwLock::new(local.secondary),
        }
    }
}

impl<A> Default for Handler<A> {
    fn default() -> Self {
        Handler::new()
    }
}

impl<A: Clone> Handler<A> {
    pub fn doc_attr(&self, id: DocId) -> Result<A> {
        self.docs
            .read()
            .get(id)
            .map(|d| d.attr.clone())
            .ok_or_else(|| doc_not_found(id))
    }
}

impl<A: DocAttr> Handler<A> {
    /// The document's attribute as a JSON map projection.
    pub fn doc_map(&self, id: DocId) -> Result<Map<String, Value>> {
        self.docs
            .read()
            .get(id)
            .map(|d| d.attr.to_map())
            .ok_or_else(|| doc_not_found(id))
    }

    pub fn dump_by_page(&self, page_num: usize, page_size: usize) -> DumpPage {
        export::dump_page(&self.docs.read(), page_num, page_size)
    }

    pub fn dump_by_filter(&self, filter: impl Fn(&A) -> bool) -> DumpPage {
        export::dump_filtered(&self.docs.read(), filter)
    }

    pub fn dump_all(&self) -> Vec<DocEntry> {
        export::dump_all(&self.docs.read())
    }

    pub fn dump_by_external_id(&self) -> BTreeMap<String, DocEntry> {
        export::dump_by_external_id(&self.docs.read())
    }

    pub fn dump_by_name(&self) -> BTreeMap<String, DocEntry> {
        export::dump_by_name(&self.docs.read())
    }
}

pub(crate) fn doc_not_found(id: DocId) -> Error {
    Error::new(
        ErrorKind::NotFound,
        format!("doc {} out of range", id.value()),
    )
}
