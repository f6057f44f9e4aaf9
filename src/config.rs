//! Configuration structures for the abstract tagger.
//!
//! This module provides strongly-typed configuration management using TOML
//! files. The configuration covers data loading and splitting, vectorizer
//! settings, model architecture, training hyperparameters, inference
//! display, and output paths.

use crate::error::TagError;
use serde::Deserialize;

/// What to do with a record whose `terms` column cannot be parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParsePolicy {
    /// Abort the whole load with a parse error.
    Error,
    /// Skip the record and count it in the cleaning report.
    Skip,
}

/// What to do with a category seen at encode time that is absent from the
/// training-built label vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OovPolicy {
    /// Drop the category and count it, so it is never silently lost.
    Ignore,
    /// Fail encoding with an error.
    Error,
}

/// Main configuration structure loaded from `config.toml`.
#[derive(Debug, Deserialize)]
pub struct Config {
    /// Data loading and splitting configuration
    pub data: DataConfig,
    /// Text vectorizer and label encoding configuration
    pub features: FeaturesConfig,
    /// Model architecture configuration
    pub model: ModelConfig,
    /// Training hyperparameters
    pub training: TrainingConfig,
    /// Inference display configuration
    pub inference: InferenceConfig,
    /// Output paths configuration
    pub output: OutputConfig,
}

/// Data loading and splitting configuration.
#[derive(Debug, Deserialize)]
pub struct DataConfig {
    /// Path to the CSV dataset file (columns: titles, summaries, terms)
    pub csv_path: String,
    /// Fraction of records held out for validation + test combined
    pub test_split: f64,
    /// Policy for rows with a malformed `terms` column
    pub parse_policy: ParsePolicy,
    /// Optional RNG seed for reproducible shuffles, splits, and init
    pub seed: Option<u64>,
}

/// Text vectorizer and label encoding configuration.
#[derive(Debug, Deserialize)]
pub struct FeaturesConfig {
    /// Maximum number of tokens retained in the TF-IDF vocabulary
    pub max_tokens: usize,
    /// N-gram order: 1 = unigrams only, 2 = unigrams + bigrams, ...
    pub ngrams: usize,
    /// Policy for out-of-vocabulary categories at encode time
    pub oov_policy: OovPolicy,
}

/// Model architecture configuration.
#[derive(Debug, Deserialize)]
pub struct ModelConfig {
    /// Hidden layer sizes (e.g., [512, 256])
    pub hidden_layers: Vec<usize>,
    /// Learning rate for the Adam optimizer
    pub learning_rate: f64,
}

/// Training hyperparameters.
#[derive(Debug, Deserialize)]
pub struct TrainingConfig {
    /// Number of training epochs
    pub epochs: usize,
    /// Mini-batch size
    pub batch_size: usize,
}

/// Inference display configuration.
#[derive(Debug, Deserialize)]
pub struct InferenceConfig {
    /// How many top-ranked categories to report per example
    pub top_k: usize,
    /// Abstract display truncation budget, in characters
    pub display_chars: usize,
}

/// Output paths configuration.
#[derive(Debug, Deserialize)]
pub struct OutputConfig {
    /// Directory to save fitted components to
    pub model_dir: String,
    /// Text vectorizer filename
    pub vectorizer_file: String,
    /// Label vocabulary filename
    pub labels_file: String,
    /// Network weights filename
    pub net_file: String,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: &str) -> Result<Self, TagError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }
}

impl Default for Config {
    /// Default configuration used when `config.toml` is not available.
    fn default() -> Self {
        Config {
            data: DataConfig {
                csv_path: "data/arxiv_abstracts.csv".to_string(),
                test_split: 0.1,
                parse_policy: ParsePolicy::Skip,
                seed: None,
            },
            features: FeaturesConfig {
                max_tokens: 20_000,
                ngrams: 2,
                oov_policy: OovPolicy::Ignore,
            },
            model: ModelConfig {
                hidden_layers: vec![512, 256],
                learning_rate: 0.001,
            },
            training: TrainingConfig {
                epochs: 20,
                batch_size: 128,
            },
            inference: InferenceConfig {
                top_k: 3,
                display_chars: 150,
            },
            output: OutputConfig {
                model_dir: "models".to_string(),
                vectorizer_file: "text_vectorizer.json".to_string(),
                labels_file: "label_vocab.json".to_string(),
                net_file: "net_weights.json".to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_config() {
        let toml = r#"
            [data]
            csv_path = "data/x.csv"
            test_split = 0.2
            parse_policy = "error"
            seed = 7

            [features]
            max_tokens = 100
            ngrams = 1
            oov_policy = "error"

            [model]
            hidden_layers = [32, 16]
            learning_rate = 0.01

            [training]
            epochs = 5
            batch_size = 8

            [inference]
            top_k = 2
            display_chars = 80

            [output]
            model_dir = "out"
            vectorizer_file = "v.json"
            labels_file = "l.json"
            net_file = "n.json"
        "#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.data.test_split, 0.2);
        assert_eq!(config.data.parse_policy, ParsePolicy::Error);
        assert_eq!(config.data.seed, Some(7));
        assert_eq!(config.features.oov_policy, OovPolicy::Error);
        assert_eq!(config.model.hidden_layers, vec![32, 16]);
        assert_eq!(config.inference.top_k, 2);
    }

    #[test]
    fn defaults_match_documented_knobs() {
        let config = Config::default();
        assert_eq!(config.data.test_split, 0.1);
        assert_eq!(config.training.batch_size, 128);
        assert_eq!(config.training.epochs, 20);
        assert_eq!(config.features.ngrams, 2);
        assert_eq!(config.inference.top_k, 3);
        assert_eq!(config.inference.display_chars, 150);
    }
}
