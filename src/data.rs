//! Dataset records, label-list parsing, and corpus cleaning.
//!
//! The raw CSV carries one row per paper: a title (unique key after
//! deduplication), an abstract, and the subject-area labels as a quoted
//! list literal such as `['cs.CV', 'cs.LG']`. Cleaning happens in three
//! stages, each of which reports how many rows it removed:
//!
//! 1. parse the label column (malformed rows skipped or fatal, per policy)
//! 2. drop rows whose title duplicates an earlier one (first wins)
//! 3. drop rows whose label combination occurs exactly once in the corpus,
//!    since a single-exemplar stratum cannot be split

use crate::config::ParsePolicy;
use crate::error::TagError;
use csv::ReaderBuilder;
use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use std::fs::File;

/// A CSV row as it appears on disk.
#[derive(Debug, Deserialize, Clone)]
pub struct RawRecord {
    /// Paper title
    pub titles: String,
    /// Paper abstract
    pub summaries: String,
    /// Subject-area labels as a list literal, e.g. `['cs.CV', 'cs.LG']`
    pub terms: String,
}

/// A parsed dataset record.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub title: String,
    pub summary: String,
    /// Categories in source order; duplicates are not expected within one record
    pub terms: Vec<String>,
}

/// Per-stage counts from loading and cleaning, for observability.
#[derive(Debug, Default, Clone)]
pub struct CleanReport {
    /// Rows read from the CSV
    pub loaded: usize,
    /// Rows skipped because the label column did not parse
    pub malformed_skipped: usize,
    /// Rows dropped because they carried no labels at all
    pub unlabeled: usize,
    /// Rows dropped as duplicate titles
    pub duplicate_titles: usize,
    /// Rows dropped because their label combination occurred exactly once
    pub singleton_combos: usize,
    /// Rows surviving all stages
    pub kept: usize,
}

/// Parse a Python-style list literal of quoted strings into category terms.
///
/// Accepts single- or double-quoted terms. Returns the failure reason on
/// malformed input so the caller can attach the record's title.
pub fn parse_terms(raw: &str) -> Result<Vec<String>, String> {
    let trimmed = raw.trim();
    let inner = trimmed
        .strip_prefix('[')
        .and_then(|rest| rest.strip_suffix(']'))
        .ok_or_else(|| "expected a bracketed list".to_string())?;

    let mut terms = Vec::new();
    let mut chars = inner.chars();
    loop {
        let quote = loop {
            match chars.next() {
                None => return Ok(terms),
                Some(c) if c.is_whitespace() || c == ',' => continue,
                Some(q @ ('\'' | '"')) => break q,
                Some(c) => return Err(format!("unexpected character {:?}", c)),
            }
        };
        let mut term = String::new();
        let mut closed = false;
        for c in chars.by_ref() {
            if c == quote {
                closed = true;
                break;
            }
            term.push(c);
        }
        if !closed {
            return Err("unterminated quoted term".to_string());
        }
        terms.push(term);
    }
}

/// Load and parse records from a CSV file.
///
/// Fills in the `loaded`, `malformed_skipped`, and `unlabeled` fields of
/// the returned report; deduplication and combination filtering are
/// separate passes.
pub fn load_records(
    path: &str,
    policy: ParsePolicy,
) -> Result<(Vec<Record>, CleanReport), TagError> {
    let file = File::open(path)?;
    let mut reader = ReaderBuilder::new().has_headers(true).from_reader(file);

    let mut report = CleanReport::default();
    let mut records = Vec::new();
    for row in reader.deserialize() {
        let raw: RawRecord = row?;
        report.loaded += 1;
        match parse_terms(&raw.terms) {
            Ok(terms) if terms.is_empty() => report.unlabeled += 1,
            Ok(terms) => records.push(Record {
                title: raw.titles,
                summary: raw.summaries,
                terms,
            }),
            Err(reason) => match policy {
                ParsePolicy::Error => {
                    return Err(TagError::Parse {
                        title: raw.titles,
                        reason,
                    })
                }
                ParsePolicy::Skip => report.malformed_skipped += 1,
            },
        }
    }
    Ok((records, report))
}

/// Remove records whose title duplicates an earlier one; first occurrence
/// wins. Returns the survivors and the number removed. Idempotent.
pub fn dedup_by_title(records: Vec<Record>) -> (Vec<Record>, usize) {
    let before = records.len();
    let mut seen = HashSet::new();
    let kept: Vec<Record> = records
        .into_iter()
        .filter(|r| seen.insert(r.title.clone()))
        .collect();
    let removed = before - kept.len();
    (kept, removed)
}

/// Order-insensitive key for a record's exact label combination.
pub fn combo_key(terms: &[String]) -> String {
    let mut unique: Vec<&str> = terms.iter().map(String::as_str).collect();
    unique.sort_unstable();
    unique.dedup();
    unique.join("|")
}

/// Remove records whose exact label combination (as an unordered set)
/// occurs exactly once in the corpus. Stratified splitting needs at least
/// two examples per stratum.
pub fn drop_singleton_combos(records: Vec<Record>) -> (Vec<Record>, usize) {
    let mut counts: HashMap<String, usize> = HashMap::new();
    for record in &records {
        *counts.entry(combo_key(&record.terms)).or_insert(0) += 1;
    }
    let before = records.len();
    let kept: Vec<Record> = records
        .into_iter()
        .filter(|r| counts[&combo_key(&r.terms)] > 1)
        .collect();
    let removed = before - kept.len();
    (kept, removed)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(title: &str, terms: &[&str]) -> Record {
        Record {
            title: title.to_string(),
            summary: format!("abstract of {}", title),
            terms: terms.iter().map(|t| t.to_string()).collect(),
        }
    }

    #[test]
    fn parses_single_quoted_list() {
        let terms = parse_terms("['cs.CV', 'cs.LG']").unwrap();
        assert_eq!(terms, vec!["cs.CV", "cs.LG"]);
    }

    #[test]
    fn parses_double_quoted_and_empty_lists() {
        assert_eq!(parse_terms(r#"["stat.ML"]"#).unwrap(), vec!["stat.ML"]);
        assert!(parse_terms("[]").unwrap().is_empty());
        assert!(parse_terms("  [ ]  ").unwrap().is_empty());
    }

    #[test]
    fn rejects_malformed_lists() {
        assert!(parse_terms("cs.CV").is_err());
        assert!(parse_terms("[cs.CV]").is_err());
        assert!(parse_terms("['cs.CV'").is_err());
        assert!(parse_terms("['cs.CV]").is_err());
    }

    #[test]
    fn dedup_keeps_first_occurrence() {
        let records = vec![
            record("a", &["cs.CV"]),
            record("b", &["cs.LG"]),
            record("a", &["cs.AI"]),
        ];
        let (kept, removed) = dedup_by_title(records);
        assert_eq!(removed, 1);
        assert_eq!(kept.len(), 2);
        assert_eq!(kept[0].terms, vec!["cs.CV"]);
    }

    #[test]
    fn dedup_is_idempotent() {
        let records = vec![
            record("a", &["cs.CV"]),
            record("a", &["cs.CV"]),
            record("b", &["cs.LG"]),
        ];
        let (once, _) = dedup_by_title(records);
        let (twice, removed) = dedup_by_title(once.clone());
        assert_eq!(removed, 0);
        assert_eq!(once, twice);
    }

    #[test]
    fn combo_key_is_order_insensitive() {
        let a = combo_key(&["cs.LG".to_string(), "cs.CV".to_string()]);
        let b = combo_key(&["cs.CV".to_string(), "cs.LG".to_string()]);
        assert_eq!(a, b);
    }

    #[test]
    fn drops_combinations_with_one_exemplar() {
        let records = vec![
            record("a", &["cs.CV", "cs.LG"]),
            record("b", &["cs.LG", "cs.CV"]),
            record("c", &["cs.AI"]),
        ];
        let (kept, removed) = drop_singleton_combos(records);
        assert_eq!(removed, 1);
        assert_eq!(kept.len(), 2);
        assert!(kept.iter().all(|r| r.title != "c"));
    }
}
