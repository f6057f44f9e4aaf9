//! Inference wrapper: vectorizer + label vocabulary + trained network.

use crate::config::OutputConfig;
use crate::error::TagError;
use crate::labels::LabelVocab;
use crate::model::MultiLabelNet;
use crate::vectorize::TextVectorizer;
use serde::Serialize;
use std::fs;
use std::path::Path;

/// Composes the fitted vectorizer, label vocabulary, and trained network
/// so raw text can be scored directly. All components are read-only here;
/// inference never mutates them.
pub struct Tagger {
    pub vectorizer: TextVectorizer,
    pub labels: LabelVocab,
    pub net: MultiLabelNet,
}

/// Vocabulary indices sorted by descending probability. The sort is
/// stable, so equal probabilities keep ascending index order.
fn ranked_indices(probs: &[f64]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..probs.len()).collect();
    order.sort_by(|&a, &b| {
        probs[b]
            .partial_cmp(&probs[a])
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    order
}

/// Rank vocabulary categories by descending probability and return the
/// first k (fewer when the vocabulary is smaller than k). Ties break by
/// vocabulary index ascending, so the result is deterministic.
pub fn rank_top_k(probs: &[f64], labels: &LabelVocab, k: usize) -> Vec<String> {
    ranked_indices(probs)
        .into_iter()
        .take(k)
        .filter_map(|idx| labels.term(idx).map(str::to_string))
        .collect()
}

impl Tagger {
    /// Per-label probabilities for raw text.
    pub fn score(&self, text: &str) -> Vec<f64> {
        self.net.predict_one(&self.vectorizer.transform(text))
    }

    /// Top-k predicted categories for raw text, paired with their
    /// probabilities, in rank order.
    pub fn top_k(&self, text: &str, k: usize) -> Vec<(String, f64)> {
        let probs = self.score(text);
        ranked_indices(&probs)
            .into_iter()
            .take(k)
            .filter_map(|idx| {
                self.labels
                    .term(idx)
                    .map(|term| (term.to_string(), probs[idx]))
            })
            .collect()
    }

    /// Save all fitted components as JSON files under the model directory.
    pub fn save(&self, output: &OutputConfig) -> Result<(), TagError> {
        fs::create_dir_all(&output.model_dir)?;
        let dir = Path::new(&output.model_dir);
        write_json(&dir.join(&output.vectorizer_file), &self.vectorizer)?;
        write_json(&dir.join(&output.labels_file), &self.labels)?;
        write_json(&dir.join(&output.net_file), &self.net)?;
        Ok(())
    }

    /// Load a previously saved tagger.
    pub fn load(output: &OutputConfig) -> Result<Self, TagError> {
        let dir = Path::new(&output.model_dir);
        let vectorizer =
            serde_json::from_str(&fs::read_to_string(dir.join(&output.vectorizer_file))?)?;
        let labels = serde_json::from_str(&fs::read_to_string(dir.join(&output.labels_file))?)?;
        let net = serde_json::from_str(&fs::read_to_string(dir.join(&output.net_file))?)?;
        Ok(Tagger {
            vectorizer,
            labels,
            net,
        })
    }
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), TagError> {
    let json = serde_json::to_string(value)?;
    fs::write(path, json)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vocab(terms: &[&str]) -> LabelVocab {
        let sequences: Vec<Vec<String>> =
            terms.iter().map(|t| vec![t.to_string()]).collect();
        LabelVocab::build(&sequences)
    }

    #[test]
    fn returns_exactly_k_categories() {
        let labels = vocab(&["cs.CV", "cs.LG", "cs.AI", "stat.ML"]);
        let probs = [0.1, 0.9, 0.4, 0.2];
        let top = rank_top_k(&probs, &labels, 3);
        assert_eq!(top, vec!["cs.LG", "cs.AI", "stat.ML"]);
    }

    #[test]
    fn returns_fewer_when_vocabulary_is_smaller_than_k() {
        let labels = vocab(&["cs.CV", "cs.LG"]);
        let probs = [0.3, 0.6];
        let top = rank_top_k(&probs, &labels, 5);
        assert_eq!(top, vec!["cs.LG", "cs.CV"]);
    }

    #[test]
    fn ties_break_by_vocabulary_index_ascending() {
        let labels = vocab(&["cs.CV", "cs.LG", "cs.AI"]);
        let probs = [0.5, 0.5, 0.5];
        let top = rank_top_k(&probs, &labels, 3);
        assert_eq!(top, vec!["cs.CV", "cs.LG", "cs.AI"]);
    }

    #[test]
    fn ranking_is_strictly_descending_outside_ties() {
        let labels = vocab(&["a", "b", "c", "d"]);
        let probs = [0.2, 0.8, 0.8, 0.9];
        let top = rank_top_k(&probs, &labels, 4);
        assert_eq!(top, vec!["d", "b", "c", "a"]);
    }
}
