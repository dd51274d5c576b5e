use crate::document::{DocumentSource, SourceKind};
use crate::index::{InvertedIndex, TfIdfIndex, TokenizedDocument};
use crate::query::{self, SearchOptions};
use crate::stats::{idf, IdfTable};
use crate::DocId;
use parking_lot::{Mutex, RwLock};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;
use std::sync::Arc;
use std::time::Instant;
use time::OffsetDateTime;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexState {
    /// No documents ingested and nothing built.
    Empty,
    /// Documents ingested, never built.
    Populated,
    /// The served index covers every ingested document.
    Ready,
    /// Documents were ingested after the last build; the old index is still served.
    Stale,
}

impl IndexState {
    pub fn as_str(&self) -> &'static str {
        match self {
            IndexState::Empty => "empty",
            IndexState::Populated => "populated",
            IndexState::Ready => "ready",
            IndexState::Stale => "stale",
        }
    }
}

impl fmt::Display for IndexState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchHit {
    pub doc_id: DocId,
    /// Accumulated TF-IDF score; 0 for matches found only by the substring pass.
    pub score: f64,
    pub text: String,
}

#[derive(Debug, Clone)]
pub struct IndexStats {
    pub state: IndexState,
    pub num_docs: usize,
    pub num_terms: usize,
    pub built_at: Option<OffsetDateTime>,
    pub sources: BTreeMap<SourceKind, usize>,
}

/// Everything derived from one full pass over the collection. Never mutated after construction.
#[derive(Debug)]
pub struct IndexSnapshot {
    pub inverted: InvertedIndex,
    pub idf: IdfTable,
    pub tfidf: TfIdfIndex,
    texts: HashMap<DocId, String>,
    pub num_docs: usize,
    pub built_at: OffsetDateTime,
}

impl IndexSnapshot {
    /// Read every source once and derive the inverted, IDF and TF-IDF tables.
    pub fn build(sources: &[Arc<dyn DocumentSource>]) -> Self {
        let started = Instant::now();
        let mut texts = HashMap::with_capacity(sources.len());
        let mut docs = Vec::with_capacity(sources.len());
        for source in sources {
            let text = source.text();
            if text.is_empty() {
                tracing::debug!(
                    doc_id = source.id(),
                    kind = %source.kind(),
                    "document contributed no text"
                );
            }
            docs.push(TokenizedDocument::new(source.id(), &text));
            texts.insert(source.id(), text);
        }

        let inverted = InvertedIndex::build(&docs);
        let idf = idf(&inverted, docs.len());
        let tfidf = TfIdfIndex::build(&docs, &idf);

        tracing::info!(
            num_docs = docs.len(),
            num_terms = inverted.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "index built"
        );
        Self {
            inverted,
            idf,
            tfidf,
            texts,
            num_docs: docs.len(),
            built_at: OffsetDateTime::now_utc(),
        }
    }

    pub fn text(&self, doc_id: DocId) -> Option<&str> {
        self.texts.get(&doc_id).map(String::as_str)
    }

    pub fn search(&self, query: &str, options: &SearchOptions) -> Vec<SearchHit> {
        let scores = query::score(query, &self.tfidf);
        let mut ranked = query::rank(&scores);
        if options.did_you_mean {
            let texts = self.texts.iter().map(|(id, text)| (*id, text.as_str()));
            let substring = query::substring_matches(query, texts);
            ranked = query::merge_substring_matches(ranked, substring);
        }
        ranked
            .into_iter()
            .filter_map(|doc_id| {
                let text = self.texts.get(&doc_id)?;
                let score = scores.get(&doc_id).copied().unwrap_or(0.0);
                Some(SearchHit { doc_id, score, text: text.clone() })
            })
            .collect()
    }

    /// Terms with the highest IDF, ties by term.
    pub fn most_discriminative(&self, n: usize) -> Vec<(&str, f64)> {
        let mut terms: Vec<(&str, f64)> = self.idf.iter().map(|(t, v)| (t.as_str(), *v)).collect();
        terms.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(b.0)));
        terms.truncate(n);
        terms
    }
}

#[derive(Default)]
struct Collection {
    documents: Vec<Arc<dyn DocumentSource>>,
    ids: HashSet<DocId>,
    generation: u64,
}

#[derive(Default)]
struct Served {
    snapshot: Option<Arc<IndexSnapshot>>,
    generation: u64,
}

/// Owns the document collection and the index built from it.
///
/// `build` computes a fresh [`IndexSnapshot`] without blocking readers and then
/// swaps it in, so a concurrent `search` sees either the previous index or the
/// new one. Ingesting after a build marks the index [`IndexState::Stale`]; it
/// keeps being served until the next explicit `build`.
#[derive(Default)]
pub struct IndexController {
    collection: RwLock<Collection>,
    served: RwLock<Served>,
    build_lock: Mutex<()>,
}

impl IndexController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ingest<D>(&self, document: D)
    where
        D: DocumentSource + 'static,
    {
        self.ingest_shared(Arc::new(document));
    }

    pub fn ingest_shared(&self, document: Arc<dyn DocumentSource>) {
        let mut collection = self.collection.write();
        let id = document.id();
        if !collection.ids.insert(id) {
            tracing::warn!(
                doc_id = id,
                "duplicate document id ingested, lookups keep the latest text"
            );
        }
        tracing::debug!(doc_id = id, kind = %document.kind(), "document ingested");
        collection.documents.push(document);
        collection.generation += 1;
    }

    /// Rebuild every derived table from the current collection and swap it in.
    ///
    /// Reads sources that may block on I/O; keep it off async executors.
    pub fn build(&self) {
        let _guard = self.build_lock.lock();
        let (documents, generation) = {
            let collection = self.collection.read();
            (collection.documents.clone(), collection.generation)
        };
        let snapshot = Arc::new(IndexSnapshot::build(&documents));
        let mut served = self.served.write();
        served.snapshot = Some(snapshot);
        served.generation = generation;
    }

    pub fn state(&self) -> IndexState {
        let collection = self.collection.read();
        let served = self.served.read();
        match &served.snapshot {
            None if collection.documents.is_empty() => IndexState::Empty,
            None => IndexState::Populated,
            Some(_) if served.generation == collection.generation => IndexState::Ready,
            Some(_) => IndexState::Stale,
        }
    }

    /// The index currently served, if any build has completed.
    pub fn snapshot(&self) -> Option<Arc<IndexSnapshot>> {
        self.served.read().snapshot.clone()
    }

    pub fn len(&self) -> usize {
        self.collection.read().documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn search_hits(&self, query: &str, options: &SearchOptions) -> Vec<SearchHit> {
        let Some(snapshot) = self.snapshot() else {
            tracing::warn!(state = %self.state(), "search before the index was built");
            return Vec::new();
        };
        if self.state() == IndexState::Stale {
            tracing::warn!("serving a stale index, documents were ingested after the last build");
        }
        snapshot.search(query, options)
    }

    /// Ranked document texts for `query`.
    pub fn search(&self, query: &str) -> Vec<String> {
        self.search_hits(query, &SearchOptions::default()).into_iter().map(|hit| hit.text).collect()
    }

    pub fn stats(&self) -> IndexStats {
        let mut sources = BTreeMap::new();
        let num_docs = {
            let collection = self.collection.read();
            for doc in &collection.documents {
                *sources.entry(doc.kind()).or_insert(0) += 1;
            }
            collection.documents.len()
        };
        let snapshot = self.snapshot();
        IndexStats {
            state: self.state(),
            num_docs,
            num_terms: snapshot.as_ref().map(|s| s.inverted.len()).unwrap_or(0),
            built_at: snapshot.as_ref().map(|s| s.built_at),
            sources,
        }
    }
}
