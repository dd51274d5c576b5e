/// Split text on whitespace runs and lowercase each token.
///
/// No stemming, stop-word removal or punctuation stripping: `"language."` stays
/// `"language."`. Documents and queries must go through this same function or
/// their scores are not comparable.
pub fn tokenize(text: &str) -> Vec<String> {
    text.split_whitespace().map(str::to_lowercase).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lowercases_and_splits() {
        assert_eq!(tokenize("This is a TEST"), vec!["this", "is", "a", "test"]);
    }

    #[test]
    fn keeps_punctuation() {
        assert_eq!(
            tokenize("compiled programming language."),
            vec!["compiled", "programming", "language."]
        );
    }

    #[test]
    fn collapses_whitespace_runs() {
        assert_eq!(tokenize("  go\t\tis\n\nfast  "), vec!["go", "is", "fast"]);
    }

    #[test]
    fn empty_and_blank_yield_nothing() {
        assert!(tokenize("").is_empty());
        assert!(tokenize(" \n\t ").is_empty());
    }
}
