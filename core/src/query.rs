use crate::index::TfIdfIndex;
use crate::stats::term_frequency;
use crate::tokenizer::tokenize;
use crate::DocId;
use std::collections::{BTreeSet, HashMap};

#[derive(Debug, Clone, Default)]
pub struct SearchOptions {
    /// Also return documents whose text contains the raw query verbatim
    /// (case-insensitive), after the TF-IDF ranked ones.
    pub did_you_mean: bool,
}

/// Accumulate `query_tf[term] * tfidf[term][doc]` for every query term the index knows.
///
/// Every document posted under a known query term is a candidate, including
/// ones whose accumulated score is zero because the term occurs in every document.
pub fn score(query: &str, index: &TfIdfIndex) -> HashMap<DocId, f64> {
    let query_tf = term_frequency(&tokenize(query));
    let mut scores: HashMap<DocId, f64> = HashMap::new();
    for (term, tf) in query_tf.iter() {
        if let Some(docs) = index.weights(term) {
            for (doc_id, weight) in docs {
                *scores.entry(*doc_id).or_insert(0.0) += tf * weight;
            }
        }
    }
    scores
}

/// Document ids by descending score; equal scores fall back to ascending id.
pub fn rank(scores: &HashMap<DocId, f64>) -> Vec<DocId> {
    let mut scored: Vec<(DocId, f64)> = scores.iter().map(|(id, s)| (*id, *s)).collect();
    scored.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
    scored.into_iter().map(|(id, _)| id).collect()
}

/// Ids of documents whose lowercased text contains the lowercased raw query.
pub fn substring_matches<'a, I>(query: &str, texts: I) -> BTreeSet<DocId>
where
    I: IntoIterator<Item = (DocId, &'a str)>,
{
    if query.trim().is_empty() {
        return BTreeSet::new();
    }
    let needle = query.to_lowercase();
    texts
        .into_iter()
        .filter(|(_, text)| text.to_lowercase().contains(&needle))
        .map(|(id, _)| id)
        .collect()
}

/// Ranked ids first, then substring-only matches by ascending id. Each id appears once.
pub fn merge_substring_matches(ranked: Vec<DocId>, mut substring: BTreeSet<DocId>) -> Vec<DocId> {
    let mut merged = Vec::with_capacity(ranked.len() + substring.len());
    for id in ranked {
        substring.remove(&id);
        merged.push(id);
    }
    merged.extend(substring);
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::{InvertedIndex, TokenizedDocument};
    use crate::stats::idf;

    fn build(docs: &[(DocId, &str)]) -> TfIdfIndex {
        let docs: Vec<TokenizedDocument> =
            docs.iter().map(|(id, text)| TokenizedDocument::new(*id, text)).collect();
        let inverted = InvertedIndex::build(&docs);
        TfIdfIndex::build(&docs, &idf(&inverted, docs.len()))
    }

    #[test]
    fn rank_orders_by_descending_score() {
        let scores = HashMap::from([(1, 0.5), (2, 0.8), (3, 0.2)]);
        assert_eq!(rank(&scores), vec![2, 1, 3]);
    }

    #[test]
    fn rank_breaks_ties_by_id() {
        let scores = HashMap::from([(9, 0.3), (4, 0.3), (6, 0.9), (1, 0.3)]);
        assert_eq!(rank(&scores), vec![6, 1, 4, 9]);
    }

    #[test]
    fn rank_of_nothing_is_empty() {
        assert!(rank(&HashMap::new()).is_empty());
    }

    #[test]
    fn discriminative_term_wins() {
        let index = build(&[(1, "This is a test document"), (2, "This is another document")]);
        let scores = score("test document", &index);
        assert_eq!(scores.len(), 2);
        assert!(scores[&1] > scores[&2]);
        assert_eq!(rank(&scores), vec![1, 2]);
    }

    #[test]
    fn unknown_terms_contribute_nothing() {
        let index = build(&[(1, "go programming"), (2, "rust programming")]);
        assert!(score("xyzzy", &index).is_empty());
        let scores = score("rust xyzzy", &index);
        assert_eq!(rank(&scores), vec![2]);
    }

    #[test]
    fn empty_query_scores_nothing() {
        let index = build(&[(1, "anything at all")]);
        assert!(score("", &index).is_empty());
        assert!(score("   ", &index).is_empty());
    }

    #[test]
    fn query_is_case_insensitive() {
        let index = build(&[(1, "Go is compiled"), (2, "Python is interpreted")]);
        assert_eq!(rank(&score("COMPILED", &index)), vec![1]);
    }

    #[test]
    fn substring_pass_finds_partial_words() {
        let texts = [(1, "Statically typed"), (2, "dynamic languages"), (3, "TYPED holes")];
        let hits = substring_matches("Typed", texts.iter().map(|(id, t)| (*id, *t)));
        assert_eq!(hits.into_iter().collect::<Vec<_>>(), vec![1, 3]);
        assert!(substring_matches("  ", texts.iter().map(|(id, t)| (*id, *t))).is_empty());
    }

    #[test]
    fn substring_pass_keeps_surrounding_whitespace() {
        let texts = [(1, "going places"), (2, "let go now")];
        let hits = substring_matches(" go", texts.iter().map(|(id, t)| (*id, *t)));
        assert_eq!(hits.into_iter().collect::<Vec<_>>(), vec![2]);
    }

    #[test]
    fn merge_keeps_rank_then_appends_substring_only() {
        let merged = merge_substring_matches(vec![5, 2], BTreeSet::from([2, 9, 3]));
        assert_eq!(merged, vec![5, 2, 3, 9]);
    }
}
