//! End-to-end training and prediction jobs.
//!
//! The training job is a strict left-to-right pipeline: load -> clean ->
//! stratified split -> fit label vocabulary and text vectorizer on the
//! training partition only -> encode every partition -> train -> evaluate
//! on test -> show sample predictions -> save the fitted components.

use crate::batch::Batcher;
use crate::config::{Config, OovPolicy};
use crate::data::{dedup_by_title, drop_singleton_combos, load_records, CleanReport, Record};
use crate::error::TagError;
use crate::labels::LabelVocab;
use crate::model::MultiLabelNet;
use crate::predict::Tagger;
use crate::split::stratified_split;
use crate::vectorize::TextVectorizer;
use ndarray::Array2;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::error::Error;
use std::time::Instant;

fn make_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

/// Encode one partition into dense feature and target matrices.
///
/// Returns the matrices plus the number of out-of-vocabulary categories
/// dropped from the labels, so the caller can report them instead of
/// losing them silently.
fn encode_partition(
    records: &[Record],
    vectorizer: &TextVectorizer,
    labels: &LabelVocab,
    policy: OovPolicy,
) -> Result<(Array2<f64>, Array2<f64>, usize), TagError> {
    let width = vectorizer.len();
    let v = labels.len();
    let mut features = Vec::with_capacity(records.len() * width);
    let mut targets = Vec::with_capacity(records.len() * v);
    let mut ignored = 0;
    for record in records {
        features.extend(vectorizer.transform(&record.summary));
        let (bits, skipped) = labels.encode(&record.terms, policy)?;
        ignored += skipped;
        targets.extend(bits);
    }
    let features = Array2::from_shape_vec((records.len(), width), features)?;
    let targets = Array2::from_shape_vec((records.len(), v), targets)?;
    Ok((features, targets, ignored))
}

fn truncate_chars(text: &str, budget: usize) -> String {
    if text.chars().count() <= budget {
        return text.to_string();
    }
    let cut: String = text.chars().take(budget).collect();
    format!("{}...", cut)
}

fn print_clean_report(report: &CleanReport) {
    println!("Cleaning:");
    println!("  {} rows loaded", report.loaded);
    println!("  {} malformed label rows skipped", report.malformed_skipped);
    println!("  {} unlabeled rows dropped", report.unlabeled);
    println!("  {} duplicate titles removed", report.duplicate_titles);
    println!(
        "  {} single-exemplar label combinations removed",
        report.singleton_combos
    );
    println!("  {} records kept\n", report.kept);
}

/// Load the CSV and run every cleaning stage, reporting counts per stage.
pub fn load_and_clean(config: &Config) -> Result<(Vec<Record>, CleanReport), TagError> {
    let (records, mut report) = load_records(&config.data.csv_path, config.data.parse_policy)?;
    let (records, duplicates) = dedup_by_title(records);
    report.duplicate_titles = duplicates;
    let (records, singletons) = drop_singleton_combos(records);
    report.singleton_combos = singletons;
    report.kept = records.len();
    if records.is_empty() {
        return Err(TagError::EmptyDataset);
    }
    Ok((records, report))
}

/// Train the tagger end to end and save the fitted components.
pub fn run_training(config: &Config) -> Result<(), Box<dyn Error>> {
    println!("\n===================================================================");
    println!("  arxtag: multi-label abstract tagger");
    println!("  TF-IDF n-grams + feed-forward MLP");
    println!("===================================================================\n");

    println!("Loading dataset from {}...", config.data.csv_path);
    let start = Instant::now();
    let (records, report) = load_and_clean(config)?;
    println!("  Loaded in {:.2}s\n", start.elapsed().as_secs_f64());
    print_clean_report(&report);

    let mut rng = make_rng(config.data.seed);
    let split = stratified_split(&records, config.data.test_split, &mut rng);
    println!(
        "Train: {} | Validation: {} | Test: {}\n",
        split.train.len(),
        split.validation.len(),
        split.test.len()
    );

    // Fit both vocabularies on the training partition only
    println!(
        "Fitting label vocabulary and text vectorizer (max {} tokens, {}-grams)...",
        config.features.max_tokens, config.features.ngrams
    );
    let labels = LabelVocab::build(split.train.iter().map(|r| &r.terms));
    let train_texts: Vec<String> = split.train.iter().map(|r| r.summary.clone()).collect();
    let vectorizer = TextVectorizer::fit(
        &train_texts,
        config.features.max_tokens,
        config.features.ngrams,
    );
    println!(
        "  {} categories, {} tokens\n",
        labels.len(),
        vectorizer.len()
    );

    println!("Encoding partitions...");
    let policy = config.features.oov_policy;
    let (train_x, train_y, _) = encode_partition(&split.train, &vectorizer, &labels, policy)?;
    let (val_x, val_y, val_ignored) =
        encode_partition(&split.validation, &vectorizer, &labels, policy)?;
    let (test_x, test_y, test_ignored) =
        encode_partition(&split.test, &vectorizer, &labels, policy)?;
    if val_ignored > 0 {
        println!(
            "  {} out-of-vocabulary categories ignored in validation labels",
            val_ignored
        );
    }
    if test_ignored > 0 {
        println!(
            "  {} out-of-vocabulary categories ignored in test labels",
            test_ignored
        );
    }
    println!();

    let mut net = MultiLabelNet::new(
        vectorizer.len(),
        &config.model.hidden_layers,
        labels.len(),
        config.model.learning_rate,
        &mut rng,
    );
    let batcher = Batcher::new(train_x, train_y, config.training.batch_size);
    let validation = if split.validation.is_empty() {
        None
    } else {
        Some((&val_x, &val_y))
    };
    let train_start = Instant::now();
    net.train(&batcher, validation, config.training.epochs, &mut rng);
    println!(
        "\nTotal training time: {:.2}s\n",
        train_start.elapsed().as_secs_f64()
    );

    if !split.test.is_empty() {
        let (test_loss, test_acc) = net.evaluate(&test_x, &test_y);
        println!("Test set:");
        println!(
            "  loss={:.4} bin_acc={:.2}%\n",
            test_loss,
            test_acc * 100.0
        );
    }

    let tagger = Tagger {
        vectorizer,
        labels,
        net,
    };

    println!("Sample predictions:");
    for record in split.test.iter().take(5) {
        let predicted = tagger.top_k(&record.summary, config.inference.top_k);
        let formatted: Vec<String> = predicted
            .iter()
            .map(|(term, prob)| format!("{} ({:.2})", term, prob))
            .collect();
        println!(
            "  Abstract:  {}",
            truncate_chars(&record.summary, config.inference.display_chars)
        );
        println!("    Actual:    {}", record.terms.join(", "));
        println!("    Predicted: {}", formatted.join(", "));
    }

    tagger.save(&config.output)?;
    println!("\nSaved fitted components to {}/", config.output.model_dir);
    Ok(())
}

/// Score a single text with a previously trained tagger.
pub fn run_predict(config: &Config, text: &str) -> Result<(), Box<dyn Error>> {
    println!("Loading tagger from {}/...", config.output.model_dir);
    let tagger = Tagger::load(&config.output)?;

    println!(
        "\nInput text:\n  {}\n",
        truncate_chars(text, config.inference.display_chars)
    );
    let predicted = tagger.top_k(text, config.inference.top_k);
    println!("Top {} categories:", config.inference.top_k);
    for (term, prob) in predicted {
        println!("  {} ({:.2})", term, prob);
    }
    Ok(())
}
