//! Query tokenisation shared by scoring and profile term matching.

use std::collections::BTreeSet;

/// Splits text into lowercase words on whitespace and punctuation.
///
/// No stemming is applied: `ticket` and `tickets` are different words.
pub fn tokenise(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|word| !word.is_empty())
        .map(str::to_lowercase)
}

/// Word set extracted from a user query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryTerms {
    words: BTreeSet<String>,
}

impl QueryTerms {
    /// Tokenises a query.
    #[must_use]
    pub fn parse(query: &str) -> Self {
        Self {
            words: tokenise(query).collect(),
        }
    }

    /// Returns `true` when the query produced no words.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Returns the number of distinct words.
    #[must_use]
    pub fn len(&self) -> usize {
        self.words.len()
    }

    /// Returns `true` when every word of `term` occurs in the query.
    ///
    /// Terms that tokenise to nothing never match.
    #[must_use]
    pub fn matches_term(&self, term: &str) -> bool {
        let mut words = tokenise(term).peekable();
        words.peek().is_some() && words.all(|word| self.words.contains(&word))
    }

    /// Returns `true` when every query word appears in `vocabulary`.
    ///
    /// An empty query is never within a vocabulary.
    #[must_use]
    pub fn all_within(&self, vocabulary: &[String]) -> bool {
        !self.words.is_empty()
            && self
                .words
                .iter()
                .all(|word| vocabulary.iter().any(|term| term.eq_ignore_ascii_case(word)))
    }

    /// Counts the terms that match the query.
    #[must_use]
    pub fn count_matches<'a>(&self, terms: impl IntoIterator<Item = &'a String>) -> usize {
        terms
            .into_iter()
            .filter(|term| self.matches_term(term))
            .count()
    }
}
