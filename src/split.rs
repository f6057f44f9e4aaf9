//! Stratified train/validation/test splitting.
//!
//! Records are partitioned so that the relative frequency of each unique
//! label combination is preserved (within rounding) across partitions.
//! The holdout fraction is carved off per stratum, then split 50/50 by
//! index into validation and test.

use crate::data::{combo_key, Record};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use std::collections::HashMap;

/// Disjoint partitions of the cleaned record set.
#[derive(Debug)]
pub struct Split {
    pub train: Vec<Record>,
    pub validation: Vec<Record>,
    pub test: Vec<Record>,
}

/// Split records by exact label combination at `(1 - test_split) : test_split`,
/// then divide the holdout 50/50 by index into validation and test.
///
/// Allocation is deterministic for a fixed record order and RNG state:
/// each stratum is shuffled, given `floor(n * test_split)` holdout slots
/// (capped at `n - 1` so every stratum keeps a training member), and the
/// remaining slots up to the global target of `round(N * test_split)` are
/// distributed by largest fractional remainder, ties resolved in stratum
/// first-seen order.
///
/// A stratum with fewer members than the number of partitions cannot be
/// perfectly stratified; with the default 0.1 holdout fraction a
/// two-member combination usually stays entirely in train. Such strata are
/// reported with a warning rather than rebalanced.
pub fn stratified_split(records: &[Record], test_split: f64, rng: &mut StdRng) -> Split {
    let test_split = test_split.clamp(0.0, 1.0);

    // Strata in first-seen order so allocation order is deterministic
    let mut order: Vec<String> = Vec::new();
    let mut strata: HashMap<String, Vec<usize>> = HashMap::new();
    for (idx, record) in records.iter().enumerate() {
        let key = combo_key(&record.terms);
        if !strata.contains_key(&key) {
            order.push(key.clone());
        }
        strata.entry(key).or_default().push(idx);
    }
    for key in &order {
        strata.get_mut(key).unwrap().shuffle(rng);
    }

    let target = (records.len() as f64 * test_split).round() as usize;
    let mut take: Vec<usize> = vec![0; order.len()];
    let mut remainders: Vec<(usize, f64)> = Vec::new();
    let mut assigned = 0;
    for (pos, key) in order.iter().enumerate() {
        let n = strata[key].len();
        let exact = n as f64 * test_split;
        let cap = n.saturating_sub(1);
        let base = (exact.floor() as usize).min(cap);
        take[pos] = base;
        assigned += base;
        remainders.push((pos, exact - exact.floor()));
    }

    // Largest remainder first; the sort is stable, so equal remainders keep
    // stratum first-seen order
    remainders.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    let mut deficit = target.saturating_sub(assigned);
    while deficit > 0 {
        let mut progressed = false;
        for &(pos, _) in &remainders {
            if deficit == 0 {
                break;
            }
            let cap = strata[&order[pos]].len().saturating_sub(1);
            if take[pos] < cap {
                take[pos] += 1;
                deficit -= 1;
                progressed = true;
            }
        }
        if !progressed {
            break;
        }
    }

    if test_split > 0.0 {
        for (pos, key) in order.iter().enumerate() {
            if take[pos] == 0 {
                eprintln!(
                    "Warning: label combination \"{}\" ({} records) is too small \
                     to be represented in the holdout split",
                    key,
                    strata[key].len()
                );
            }
        }
    }

    let mut train = Vec::new();
    let mut holdout = Vec::new();
    for (pos, key) in order.iter().enumerate() {
        let members = &strata[key];
        for &idx in &members[..take[pos]] {
            holdout.push(records[idx].clone());
        }
        for &idx in &members[take[pos]..] {
            train.push(records[idx].clone());
        }
    }

    let mid = holdout.len() / 2;
    let test = holdout.split_off(mid);
    Split {
        train,
        validation: holdout,
        test,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use std::collections::HashSet;

    fn record(title: &str, terms: &[&str]) -> Record {
        Record {
            title: title.to_string(),
            summary: String::new(),
            terms: terms.iter().map(|t| t.to_string()).collect(),
        }
    }

    fn corpus() -> Vec<Record> {
        let mut records = Vec::new();
        for i in 0..20 {
            records.push(record(&format!("cv{}", i), &["cs.CV"]));
        }
        for i in 0..10 {
            records.push(record(&format!("lg{}", i), &["cs.LG"]));
        }
        for i in 0..10 {
            records.push(record(&format!("both{}", i), &["cs.CV", "cs.LG"]));
        }
        records
    }

    fn titles(records: &[Record]) -> HashSet<String> {
        records.iter().map(|r| r.title.clone()).collect()
    }

    #[test]
    fn partitions_are_disjoint_and_cover_input() {
        let records = corpus();
        let mut rng = StdRng::seed_from_u64(7);
        let split = stratified_split(&records, 0.2, &mut rng);

        let train = titles(&split.train);
        let validation = titles(&split.validation);
        let test = titles(&split.test);

        assert!(train.is_disjoint(&validation));
        assert!(train.is_disjoint(&test));
        assert!(validation.is_disjoint(&test));

        let mut union = train;
        union.extend(validation);
        union.extend(test);
        assert_eq!(union, titles(&records));
    }

    #[test]
    fn holdout_size_matches_requested_fraction() {
        let records = corpus();
        let mut rng = StdRng::seed_from_u64(7);
        let split = stratified_split(&records, 0.2, &mut rng);
        assert_eq!(split.validation.len() + split.test.len(), 8);
        assert_eq!(split.train.len(), 32);
    }

    #[test]
    fn combination_frequencies_are_preserved() {
        let records = corpus();
        let mut rng = StdRng::seed_from_u64(7);
        let split = stratified_split(&records, 0.2, &mut rng);
        // 20/10/10 strata at a 0.2 holdout should yield 4/2/2
        let holdout: Vec<&Record> = split
            .validation
            .iter()
            .chain(split.test.iter())
            .collect();
        let cv = holdout
            .iter()
            .filter(|r| combo_key(&r.terms) == "cs.CV")
            .count();
        let lg = holdout
            .iter()
            .filter(|r| combo_key(&r.terms) == "cs.LG")
            .count();
        let both = holdout
            .iter()
            .filter(|r| combo_key(&r.terms) == "cs.CV|cs.LG")
            .count();
        assert_eq!((cv, lg, both), (4, 2, 2));
    }

    #[test]
    fn two_member_stratum_lands_on_both_sides_at_even_split() {
        let records = vec![
            record("a1", &["cs.AI"]),
            record("a2", &["cs.AI"]),
            record("b1", &["cs.CV"]),
            record("b2", &["cs.CV"]),
        ];
        let mut rng = StdRng::seed_from_u64(1);
        let split = stratified_split(&records, 0.5, &mut rng);
        assert_eq!(split.train.len(), 2);
        let train_keys: HashSet<String> =
            split.train.iter().map(|r| combo_key(&r.terms)).collect();
        assert_eq!(train_keys.len(), 2);
    }

    #[test]
    fn same_seed_gives_same_split() {
        let records = corpus();
        let mut rng_a = StdRng::seed_from_u64(99);
        let mut rng_b = StdRng::seed_from_u64(99);
        let split_a = stratified_split(&records, 0.2, &mut rng_a);
        let split_b = stratified_split(&records, 0.2, &mut rng_b);
        assert_eq!(titles(&split_a.test), titles(&split_b.test));
        assert_eq!(titles(&split_a.validation), titles(&split_b.validation));
    }

    #[test]
    fn zero_fraction_keeps_everything_in_train() {
        let records = corpus();
        let mut rng = StdRng::seed_from_u64(3);
        let split = stratified_split(&records, 0.0, &mut rng);
        assert_eq!(split.train.len(), records.len());
        assert!(split.validation.is_empty());
        assert!(split.test.is_empty());
    }
}
