//! # arxtag - multi-label subject tagger for paper abstracts
//!
//! An end-to-end batch workflow for multi-label text classification: load a
//! CSV of paper abstracts carrying multiple subject-area labels, clean and
//! stratify-split it, binarize the labels, TF-IDF-vectorize the text with
//! unigrams and bigrams, train a small feed-forward network with
//! independent sigmoid outputs, and run top-k inference on raw text.
//!
//! ## Pipeline
//!
//! Data flows strictly left to right:
//!
//! ```text
//! loader -> dedup/filter -> label parser -> stratified splitter
//!        -> (label vocabulary, token vocabulary: fit on train only)
//!        -> multi-hot encoder / TF-IDF vectorizer
//!        -> classifier -> inference wrapper
//! ```
//!
//! Both vocabularies and the network parameters are constructed once from
//! training data and are read-only afterward; inference never mutates them.
//!
//! ## Usage
//!
//! ```no_run
//! use arxtag::config::Config;
//! use arxtag::pipeline::run_training;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::default();
//!     run_training(&config)?;
//!     Ok(())
//! }
//! ```
//!
//! Scoring raw text with a trained tagger:
//!
//! ```no_run
//! # use arxtag::config::Config;
//! use arxtag::predict::Tagger;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::default();
//! let tagger = Tagger::load(&config.output)?;
//! for (category, prob) in tagger.top_k("deep learning for image segmentation", 3) {
//!     println!("{} ({:.2})", category, prob);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Configuration
//!
//! Create a `config.toml` to adjust the pipeline:
//!
//! ```toml
//! [data]
//! csv_path = "data/arxiv_abstracts.csv"
//! test_split = 0.1
//! parse_policy = "skip"   # or "error"
//! seed = 42
//!
//! [features]
//! max_tokens = 20000
//! ngrams = 2
//! oov_policy = "ignore"   # or "error"
//!
//! [model]
//! hidden_layers = [512, 256]
//! learning_rate = 0.001
//!
//! [training]
//! epochs = 20
//! batch_size = 128
//!
//! [inference]
//! top_k = 3
//! display_chars = 150
//!
//! [output]
//! model_dir = "models"
//! vectorizer_file = "text_vectorizer.json"
//! labels_file = "label_vocab.json"
//! net_file = "net_weights.json"
//! ```
//!
//! ## Module structure
//!
//! - [`config`] - TOML configuration
//! - [`data`] - records, label-list parsing, and corpus cleaning
//! - [`split`] - stratified train/validation/test splitting
//! - [`labels`] - label vocabulary and multi-hot encoding
//! - [`vectorize`] - TF-IDF n-gram vectorizer
//! - [`batch`] - restartable mini-batch stream
//! - [`model`] - feed-forward multi-label classifier
//! - [`predict`] - inference wrapper and top-k ranking
//! - [`pipeline`] - end-to-end training and prediction jobs

pub mod batch;
pub mod config;
pub mod data;
pub mod error;
pub mod labels;
pub mod model;
pub mod pipeline;
pub mod predict;
pub mod split;
pub mod vectorize;

pub use config::Config;
pub use error::TagError;
pub use labels::LabelVocab;
pub use model::MultiLabelNet;
pub use predict::{rank_top_k, Tagger};
pub use vectorize::TextVectorizer;
