use std::collections::BTreeMap;

use serde_json::{Map, Value};
use tracing::debug;

use crate::core::config::Syntax;
use crate::core::error::{Error, ErrorKind, Result};
use crate::core::export::{self, DocEntry, DumpPage};
use crate::core::handler::{doc_not_found, Handler};
use crate::core::types::{Cond, ConjId, DocAttr, DocId, Polarity, TermId};
use crate::dnf::check::check;
use crate::dnf::parse::{self, ParsedConjunction};
use crate::index::docs::DocStore;
use crate::index::intern::{AssignmentStore, ConjunctionStore, TermStore};
use crate::index::primary::PrimaryIndex;
use crate::index::secondary::SecondaryIndex;
use crate::search;

/// Single-threaded variant of [`Handler`]: the same structures with no lock
/// wrappers. Mutation takes `&mut self`, so exclusive access is enforced by
/// the borrow checker rather than promised by the caller — the type-checked
/// rendition of running with locks disabled.
///
/// Typical uses: bulk-building an index before sharing it
/// (`into_shared`), or serving a pre-built index from one thread with zero
/// synchronization cost.
pub struct LocalHandler<A> {
    pub(crate) syntax: Syntax,
    pub(crate) terms: TermStore,
    pub(crate) assignments: AssignmentStore,
    pub(crate) conjunctions: ConjunctionStore,
    pub(crate) docs: DocStore<A>,
    pub(crate) primary: PrimaryIndex,
    pub(crate) secondary: SecondaryIndex,
}

impl<A> LocalHandler<A> {
    pub fn new() -> Self {
        LocalHandler::with_syntax(Syntax::default())
    }

    pub fn with_syntax(syntax: Syntax) -> Self {
        LocalHandler {
            syntax,
            terms: TermStore::new(),
            assignments: AssignmentStore::new(),
            conjunctions: ConjunctionStore::new(),
            docs: DocStore::new(),
            primary: PrimaryIndex::new(),
            secondary: SecondaryIndex::new(),
        }
    }

    pub fn syntax(&self) -> Syntax {
        self.syntax
    }

    pub fn set_syntax(&mut self, syntax: Syntax) {
        self.syntax = syntax;
    }

    pub fn check(&self, dnf: &str) -> Result<()> {
        check(&self.syntax, dnf)
    }

    /// See [`Handler::add_document`]; identical semantics without locks.
    pub fn add_document(
        &mut self,
        name: &str,
        external_id: &str,
        dnf: &str,
        attr: A,
    ) -> Result<DocId> {
        if self.docs.contains_external(external_id) {
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
            .add(name, external_id, dnf, conj_ids.clone(), attr)?;
        self.primary.insert_doc(doc_id, &conj_ids);
        debug!(
            external_id,
            internal_id = doc_id.value(),
            conjunctions = conj_ids.len(),
            "document added"
        );
        Ok(doc_id)
    }

    fn intern_conjunction(&mut self, pc: &ParsedConjunction<'_>) -> ConjId {
        let mut assignment_ids = Vec::with_capacity(pc.assignments.len());
        let mut term_pairs: Vec<(TermId, Polarity)> = Vec::new();

        for pa in &pc.assignments {
            let mut term_ids: Vec<TermId> = pa
                .vals
                .iter()
                .map(|val| self.terms.intern(pa.key, val))
                .collect();
            term_ids.sort_unstable();
            term_ids.dedup();
            let assignment_id = self.assignments.intern(pa.polarity, term_ids.clone());
            assignment_ids.push(assignment_id);
            term_pairs.extend(term_ids.into_iter().map(|t| (t, pa.polarity)));
        }

        let (conj_id, is_new) = self.conjunctions.intern(pc.size, assignment_ids);
        if is_new {
            self.primary.push_slot();
            self.secondary.register(conj_id, pc.size, &term_pairs);
        }
        conj_id
    }

    pub fn delete_document(&mut self, external_id: &str, comment: &str) -> bool {
        self.docs.delete(external_id, comment)
    }

    /// See [`Handler::search`]; identical semantics without locks.
    pub fn search<F>(&self, conds: &[Cond], attr_filter: F) -> Result<Vec<DocId>>
    where
        F: Fn(&A) -> bool,
    {
        search::check_conditions(conds)?;
        let term_ids: Vec<TermId> = conds
            .iter()
            .filter_map(|c| self.terms.resolve(&c.key, &c.val))
            .collect();

        let conjunctions =
            search::matching_conjunctions(&self.secondary, self.conjunctions.len(), &term_ids);
        if conjunctions.is_empty() {
            return Ok(Vec::new());
        }
        Ok(search::matching_documents(
            &self.primary,
            &self.docs,
            &conjunctions,
            attr_filter,
        ))
    }

    pub fn search_all(&self, conds: &[Cond]) -> Result<Vec<DocId>> {
        self.search(conds, |_| true)
    }

    pub fn doc_count(&self) -> usize {
        self.docs.len()
    }

    pub fn conjunction_count(&self) -> usize {
        self.conjunctions.len()
    }

    pub fn term_count(&self) -> usize {
        self.terms.len()
    }

    pub fn doc_expression(&self, id: DocId) -> Result<String> {
        let doc = self.docs.get(id).ok_or_else(|| doc_not_found(id))?;
        Ok(export::render_expression(
            &doc.conjunctions,
            &self.conjunctions,
            &self.assignments,
            &self.terms,
        ))
    }

    /// Wraps every structure in its own lock for shared use.
    pub fn into_shared(self) -> Handler<A> {
        Handler::from_parts(self)
    }
}

impl<A> Default for LocalHandler<A> {
    fn default() -> Self {
        LocalHandler::new()
    }
}

impl<A: Clone> LocalHandler<A> {
    pub fn doc_attr(&self, id: DocId) -> Result<A> {
        self.docs
            .get(id)
            .map(|d| d.attr.clone())
            .ok_or_else(|| doc_not_found(id))
    }
}

impl<A: DocAttr> LocalHandler<A> {
    pub fn doc_map(&self, id: DocId) -> Result<Map<String, Value>> {
        self.docs
            .get(id)
            .map(|d| d.attr.to_map())
            .ok_or_else(|| doc_not_found(id))
    }

    pub fn dump_by_page(&self, page_num: usize, page_size: usize) -> DumpPage {
        export::dump_page(&self.docs, page_num, page_size)
    }

    pub fn dump_by_filter(&self, filter: impl Fn(&A) -> bool) -> DumpPage {
        export::dump_filtered(&self.docs, filter)
    }

    pub fn dump_all(&self) -> Vec<DocEntry> {
        export::dump_all(&self.docs)
    }

    pub fn dump_by_external_id(&self) -> BTreeMap<String, DocEntry> {
        export::dump_by_external_id(&self.docs)
    }

    pub fn dump_by_name(&self) -> BTreeMap<String, DocEntry> {
        export::dump_by_name(&self.docs)
    }
}
