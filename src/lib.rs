pub mod core;
pub mod dnf;
pub mod index;
pub mod search;
pub mod sparse;

/*
┌──────────────────────────────────────────────────────────────────────────┐
│                         DNFIDX STRUCT ARCHITECTURE                        │
└──────────────────────────────────────────────────────────────────────────┘

┌────────────────────────────────── CORE ──────────────────────────────────┐
│                                                                           │
│  ┌──────────────────────────────────┐  ┌──────────────────────────────┐  │
│  │ struct Handler<A>   (locked)     │  │ struct LocalHandler<A>       │  │
│  │ • syntax: Syntax                 │  │ same fields, no locks,       │  │
│  │ • terms: RwLock<TermStore>       │  │ &mut self writes             │  │
│  │ • assignments: RwLock<..Store>   │  │                              │  │
│  │ • conjunctions: RwLock<..Store>  │  │ into_shared() ⇄ into_local() │  │
│  │ • docs: RwLock<DocStore<A>>      │  └──────────────────────────────┘  │
│  │ • primary: RwLock<PrimaryIndex>  │                                    │
│  │ • secondary: RwLock<SecondaryIdx>│  ┌──────────────────────────────┐  │
│  └──────────────────────────────────┘  │ trait DocAttr                │  │
│                                        │ • to_text() / to_map()       │  │
│                                        └──────────────────────────────┘  │
└──────────────────────────────────────────────────────────────────────────┘

┌──────────────────────────────── PARSING ─────────────────────────────────┐
│                                                                           │
│  dnf := conj ("or" conj)*                                                 │
│  conj := "(" assign ("and" assign)* ")"                                   │
│  assign := key ("in" | "not" "in") "{" val ("," val)* "}"                 │
│                                                                           │
│  dnf::check  — pure state machine, duplicate-key rejection                │
│  dnf::parse  — pure re-scan into ParsedConjunction (size ≤ 255)           │
└──────────────────────────────────────────────────────────────────────────┘

┌──────────────────────────────── INDEXING ────────────────────────────────┐
│                                                                           │
│  TermStore ──interns──> Term (sentinel id 0)                              │
│  AssignmentStore ──interns──> Assignment (polarity + sorted term set)     │
│  ConjunctionStore ──interns──> Conjunction (size + sorted assignment set) │
│                                                                           │
│  PrimaryIndex:   conjunction id → sorted doc ids                          │
│  SecondaryIndex: size bucket → term → (conjunction, polarity) pairs       │
└──────────────────────────────────────────────────────────────────────────┘

┌──────────────────────────────── RETRIEVAL ───────────────────────────────┐
│                                                                           │
│  Cond facts → TermStore.resolve → SecondaryIndex buckets                  │
│       → CountSet (BlockCounter + BlockBitset) per bucket                  │
│       → matching conjunctions → PrimaryIndex → active docs + attr filter  │
└──────────────────────────────────────────────────────────────────────────┘
*/
