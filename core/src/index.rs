use crate::stats::{term_frequency, IdfTable};
use crate::tokenizer::tokenize;
use crate::DocId;
use std::collections::{HashMap, HashSet};

/// A document's id with its text already run through the tokenizer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenizedDocument {
    pub id: DocId,
    pub tokens: Vec<String>,
}

impl TokenizedDocument {
    pub fn new(id: DocId, text: &str) -> Self {
        Self { id, tokens: tokenize(text) }
    }
}

/// Term → ids of the documents containing it.
///
/// Postings keep ingestion order and get one entry per occurrence, so a term
/// repeated inside a document lists that document more than once.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct InvertedIndex {
    postings: HashMap<String, Vec<DocId>>,
}

impl InvertedIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn build(docs: &[TokenizedDocument]) -> Self {
        let mut postings: HashMap<String, Vec<DocId>> = HashMap::new();
        for doc in docs {
            for token in &doc.tokens {
                postings.entry(token.clone()).or_default().push(doc.id);
            }
        }
        Self { postings }
    }

    pub fn postings(&self, term: &str) -> Option<&[DocId]> {
        self.postings.get(term).map(Vec::as_slice)
    }

    /// Number of distinct documents listing `term`.
    pub fn document_frequency(&self, term: &str) -> usize {
        self.postings
            .get(term)
            .map(|ids| ids.iter().collect::<HashSet<_>>().len())
            .unwrap_or(0)
    }

    pub fn terms(&self) -> impl Iterator<Item = &str> {
        self.postings.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.postings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.postings.is_empty()
    }
}

/// Term → document → TF × IDF.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct TfIdfIndex {
    weights: HashMap<String, HashMap<DocId, f64>>,
}

impl TfIdfIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Weigh every document's term frequencies by the corpus IDF. A term
    /// missing from `idf` counts as IDF 0.
    pub fn build(docs: &[TokenizedDocument], idf: &IdfTable) -> Self {
        let mut weights: HashMap<String, HashMap<DocId, f64>> = HashMap::new();
        for doc in docs {
            for (term, tf) in term_frequency(&doc.tokens) {
                let idf_value = idf.get(&term).copied().unwrap_or(0.0);
                weights.entry(term).or_default().insert(doc.id, tf * idf_value);
            }
        }
        Self { weights }
    }

    pub fn weights(&self, term: &str) -> Option<&HashMap<DocId, f64>> {
        self.weights.get(term)
    }

    pub fn weight(&self, term: &str, doc_id: DocId) -> Option<f64> {
        self.weights.get(term).and_then(|docs| docs.get(&doc_id)).copied()
    }

    pub fn len(&self) -> usize {
        self.weights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }
}
