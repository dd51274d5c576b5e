use crate::index::InvertedIndex;
use std::collections::HashMap;

/// Term → occurrences in one document divided by that document's token count.
pub type TermFrequency = HashMap<String, f64>;

/// Term → `ln(total documents / documents containing the term)`.
pub type IdfTable = HashMap<String, f64>;

/// Normalized term frequencies for one token stream. Empty input gives an empty map.
pub fn term_frequency(tokens: &[String]) -> TermFrequency {
    let mut tf = TermFrequency::new();
    if tokens.is_empty() {
        return tf;
    }
    for token in tokens {
        *tf.entry(token.clone()).or_insert(0.0) += 1.0;
    }
    let total = tokens.len() as f64;
    for freq in tf.values_mut() {
        *freq /= total;
    }
    tf
}

/// Inverse document frequency of every term in `index`.
///
/// Document frequency counts distinct ids, so a term repeated inside one
/// document does not push its IDF below zero. `total_docs == 0` gives an empty table.
pub fn idf(index: &InvertedIndex, total_docs: usize) -> IdfTable {
    let mut table = IdfTable::new();
    if total_docs == 0 {
        return table;
    }
    for term in index.terms() {
        let df = index.document_frequency(term);
        if df == 0 {
            continue;
        }
        table.insert(term.to_string(), (total_docs as f64 / df as f64).ln());
    }
    table
}
