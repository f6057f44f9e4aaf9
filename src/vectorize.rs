//! TF-IDF n-gram text vectorizer.
//!
//! Converts raw text into fixed-width numeric feature vectors. The token
//! vocabulary is fit exactly once, on the training partition, and applied
//! unchanged to validation, test, and inference text so no held-out
//! statistics leak into the IDF weights.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// TF-IDF vectorizer over unigrams up to n-grams.
///
/// Fitting lower-cases, strips punctuation, whitespace-tokenizes, forms
/// all n-grams from order 1 to `ngrams`, and keeps the `max_tokens` most
/// frequent distinct tokens, ties broken by first-seen order so the
/// vocabulary is deterministic for a fixed corpus order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextVectorizer {
    vocabulary: Vec<String>,
    index: HashMap<String, usize>,
    idf: Vec<f64>,
    ngrams: usize,
}

/// Lowercase, strip everything but letters/digits/whitespace, and expand
/// into unigrams..n-grams. Higher-order grams join words with `_`.
fn ngram_tokens(text: &str, ngrams: usize) -> Vec<String> {
    let strip = Regex::new(r"[^a-z0-9\s]").unwrap();
    let lowered = text.to_lowercase();
    let cleaned = strip.replace_all(&lowered, " ");
    let words: Vec<&str> = cleaned.split_whitespace().collect();

    let mut tokens: Vec<String> = words.iter().map(|w| w.to_string()).collect();
    for n in 2..=ngrams {
        for window in words.windows(n) {
            tokens.push(window.join("_"));
        }
    }
    tokens
}

impl TextVectorizer {
    /// Fit the vectorizer on training documents.
    ///
    /// IDF uses the smoothed form `ln((1 + n_docs) / (1 + df)) + 1.0`, so a
    /// token appearing in every document gets the minimum weight of 1.0 and
    /// no retained token can divide by zero.
    pub fn fit(documents: &[String], max_tokens: usize, ngrams: usize) -> Self {
        let ngrams = ngrams.max(1);
        let mut total_count: HashMap<String, usize> = HashMap::new();
        let mut doc_count: HashMap<String, usize> = HashMap::new();
        let mut first_seen: HashMap<String, usize> = HashMap::new();

        for document in documents {
            let tokens = ngram_tokens(document, ngrams);
            for token in &tokens {
                let order = first_seen.len();
                first_seen.entry(token.clone()).or_insert(order);
                *total_count.entry(token.clone()).or_insert(0) += 1;
            }
            let unique: HashSet<&String> = tokens.iter().collect();
            for token in unique {
                *doc_count.entry(token.clone()).or_insert(0) += 1;
            }
        }

        // Rank by total frequency, first-seen order on ties
        let mut ranked: Vec<(&String, usize)> =
            total_count.iter().map(|(t, &c)| (t, c)).collect();
        ranked.sort_by(|a, b| {
            b.1.cmp(&a.1)
                .then_with(|| first_seen[a.0].cmp(&first_seen[b.0]))
        });

        let vocabulary: Vec<String> = ranked
            .into_iter()
            .take(max_tokens)
            .map(|(token, _)| token.clone())
            .collect();
        let index: HashMap<String, usize> = vocabulary
            .iter()
            .enumerate()
            .map(|(idx, token)| (token.clone(), idx))
            .collect();

        let n_docs = documents.len() as f64;
        let idf: Vec<f64> = vocabulary
            .iter()
            .map(|token| {
                let df = doc_count[token] as f64;
                ((1.0 + n_docs) / (1.0 + df)).ln() + 1.0
            })
            .collect();

        TextVectorizer {
            vocabulary,
            index,
            idf,
            ngrams,
        }
    }

    /// Transform a document into a TF-IDF feature vector.
    ///
    /// Each retained token contributes its raw term count in this document
    /// times its training-corpus IDF weight; tokens not in the vocabulary
    /// contribute zero.
    pub fn transform(&self, document: &str) -> Vec<f64> {
        let mut weights = vec![0.0; self.vocabulary.len()];
        for token in ngram_tokens(document, self.ngrams) {
            if let Some(&idx) = self.index.get(&token) {
                weights[idx] += self.idf[idx];
            }
        }
        weights
    }

    /// Number of retained tokens (the feature-vector width).
    pub fn len(&self) -> usize {
        self.vocabulary.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vocabulary.is_empty()
    }

    /// Retained tokens in index order.
    pub fn vocabulary(&self) -> &[String] {
        &self.vocabulary
    }

    /// IDF weight for a retained token.
    pub fn idf_of(&self, token: &str) -> Option<f64> {
        self.index.get(token).map(|&idx| self.idf[idx])
    }
}
