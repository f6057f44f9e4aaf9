//! Label vocabulary and multi-hot encoding.
//!
//! The vocabulary is built once from the training split and immutable
//! afterward; validation, test, and inference labels are encoded against
//! it without ever extending it.

use crate::config::OovPolicy;
use crate::error::TagError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Bijective mapping between category strings and indices in `0..V`.
///
/// Indices are assigned in first-seen order over the training label
/// sequences, which makes the mapping deterministic for a fixed input
/// order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LabelVocab {
    terms: Vec<String>,
    index: HashMap<String, usize>,
}

impl LabelVocab {
    /// Build the vocabulary from training label sequences only.
    pub fn build<'a, I>(sequences: I) -> Self
    where
        I: IntoIterator<Item = &'a Vec<String>>,
    {
        let mut terms: Vec<String> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();
        for sequence in sequences {
            for term in sequence {
                if !index.contains_key(term) {
                    index.insert(term.clone(), terms.len());
                    terms.push(term.clone());
                }
            }
        }
        LabelVocab { terms, index }
    }

    /// Number of distinct categories, V.
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Category string at a vocabulary index.
    pub fn term(&self, idx: usize) -> Option<&str> {
        self.terms.get(idx).map(String::as_str)
    }

    /// All categories in vocabulary-index order.
    pub fn terms(&self) -> &[String] {
        &self.terms
    }

    pub fn index_of(&self, term: &str) -> Option<usize> {
        self.index.get(term).copied()
    }

    /// Encode a label sequence as a multi-hot vector of length V.
    ///
    /// Returns the bit vector and the number of out-of-vocabulary
    /// categories that were dropped under [`OovPolicy::Ignore`]; under
    /// [`OovPolicy::Error`] an unknown category fails the encode instead.
    pub fn encode(
        &self,
        terms: &[String],
        policy: OovPolicy,
    ) -> Result<(Vec<f64>, usize), TagError> {
        let mut bits = vec![0.0; self.terms.len()];
        let mut ignored = 0;
        for term in terms {
            match self.index.get(term) {
                Some(&idx) => bits[idx] = 1.0,
                None => match policy {
                    OovPolicy::Ignore => ignored += 1,
                    OovPolicy::Error => {
                        return Err(TagError::UnknownCategory(term.clone()))
                    }
                },
            }
        }
        Ok((bits, ignored))
    }

    /// Decode a multi-hot vector back into category strings.
    ///
    /// Categories come back in vocabulary-index order, not in the order the
    /// original sequence listed them: encode/decode round-trips preserve
    /// the *set* of in-vocabulary categories, not the sequence.
    pub fn decode(&self, bits: &[f64]) -> Vec<String> {
        bits.iter()
            .enumerate()
            .filter(|&(_, &bit)| bit > 0.5)
            .filter_map(|(idx, _)| self.terms.get(idx).cloned())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn seqs(raw: &[&[&str]]) -> Vec<Vec<String>> {
        raw.iter()
            .map(|s| s.iter().map(|t| t.to_string()).collect())
            .collect()
    }

    #[test]
    fn assigns_indices_in_first_seen_order() {
        let sequences = seqs(&[
            &["cs.CV", "cs.LG"],
            &["cs.CV"],
            &["cs.LG"],
            &["cs.LG"],
        ]);
        let vocab = LabelVocab::build(&sequences);
        assert_eq!(vocab.len(), 2);
        assert_eq!(vocab.index_of("cs.CV"), Some(0));
        assert_eq!(vocab.index_of("cs.LG"), Some(1));

        let (both, _) = vocab
            .encode(&sequences[0], OovPolicy::Error)
            .unwrap();
        assert_eq!(both, vec![1.0, 1.0]);
        let (lg_only, _) = vocab
            .encode(&sequences[2], OovPolicy::Error)
            .unwrap();
        assert_eq!(lg_only, vec![0.0, 1.0]);
    }

    #[test]
    fn round_trip_is_set_equality() {
        let sequences = seqs(&[&["b", "a", "c"], &["a", "c"]]);
        let vocab = LabelVocab::build(&sequences);

        let input = vec!["c".to_string(), "b".to_string()];
        let (bits, _) = vocab.encode(&input, OovPolicy::Error).unwrap();
        let decoded = vocab.decode(&bits);

        let expected: HashSet<&str> = ["b", "c"].into_iter().collect();
        let got: HashSet<&str> = decoded.iter().map(String::as_str).collect();
        assert_eq!(got, expected);
        // decode order is vocabulary-index order, b was seen first
        assert_eq!(decoded, vec!["b".to_string(), "c".to_string()]);
    }

    #[test]
    fn hamming_weight_counts_unique_in_vocab_terms() {
        let sequences = seqs(&[&["a", "b"], &["b"]]);
        let vocab = LabelVocab::build(&sequences);
        let input = vec![
            "a".to_string(),
            "a".to_string(),
            "b".to_string(),
            "zz.XX".to_string(),
        ];
        let (bits, ignored) = vocab.encode(&input, OovPolicy::Ignore).unwrap();
        let weight = bits.iter().filter(|&&b| b > 0.5).count();
        assert_eq!(weight, 2);
        assert_eq!(ignored, 1);
    }

    #[test]
    fn oov_error_policy_fails_encode() {
        let sequences = seqs(&[&["a"], &["a"]]);
        let vocab = LabelVocab::build(&sequences);
        let input = vec!["b".to_string()];
        assert!(vocab.encode(&input, OovPolicy::Error).is_err());
    }
}
