//! Probability ranking for classification output.
//!
//! Converts the classifier's raw probability vector into a short, ranked,
//! deduplicated list of labels: threshold filter, confidence-to-uncertainty
//! conversion, deterministic sort, then merge of near-duplicate candidates.

use crate::types::Label;

use super::table::{LabelEntry, LabelTable};

/// Options controlling the ranking pass.
#[derive(Debug, Clone, Copy)]
pub struct RankOptions {
    /// Minimum probability for a class to become a candidate
    pub threshold: f32,
    /// Maximum number of distinct results after deduplication
    pub max_results: usize,
}

impl Default for RankOptions {
    fn default() -> Self {
        Self {
            threshold: 0.08,
            max_results: 1,
        }
    }
}

/// A thresholded candidate before deduplication.
struct Candidate<'a> {
    entry: &'a LabelEntry,
    uncertainty: u8,
}

/// A surviving result accumulating merged categories.
struct Ranked<'a> {
    entry: &'a LabelEntry,
    uncertainty: u8,
    categories: Vec<String>,
}

/// Rank a probability vector against a label table.
///
/// Returns labels ordered most confident first; empty when no class clears
/// the threshold or the table is empty. Probabilities past the table's
/// length have no label and are ignored.
pub fn rank(probabilities: &[f32], table: &LabelTable, options: &RankOptions) -> Vec<Label> {
    if table.is_empty() || options.max_results == 0 {
        return Vec::new();
    }

    let mut candidates: Vec<Candidate> = Vec::new();
    for (index, &probability) in probabilities.iter().take(table.len()).enumerate() {
        if probability < options.threshold {
            continue;
        }
        // Every index below len() has an entry; get() keeps the bound explicit.
        if let Some(entry) = table.get(index) {
            candidates.push(Candidate {
                entry,
                uncertainty: uncertainty(probability),
            });
        }
    }

    // Most confident first; priority then name break ties deterministically.
    candidates.sort_by(|a, b| {
        a.uncertainty
            .cmp(&b.uncertainty)
            .then(b.entry.priority.cmp(&a.entry.priority))
            .then(a.entry.name.cmp(&b.entry.name))
    });

    tracing::trace!(
        "{} candidates above threshold {}",
        candidates.len(),
        options.threshold
    );

    // Merge candidates describing the same subject (shared name, alias, or
    // overlapping categories), keeping the lower uncertainty and the union
    // of categories. New subjects only join while there is room.
    let mut merged: Vec<Ranked> = Vec::new();
    for candidate in &candidates {
        if let Some(existing) = merged
            .iter_mut()
            .find(|r| same_subject(r.entry, &r.categories, candidate.entry))
        {
            existing.uncertainty = existing.uncertainty.min(candidate.uncertainty);
            for category in &candidate.entry.categories {
                if !existing.categories.contains(category) {
                    existing.categories.push(category.clone());
                }
            }
        } else if merged.len() < options.max_results {
            merged.push(Ranked {
                entry: candidate.entry,
                uncertainty: candidate.uncertainty,
                categories: candidate.entry.categories.clone(),
            });
        }
    }

    merged
        .into_iter()
        .map(|r| Label::with_categories(r.entry.name.clone(), r.uncertainty, r.categories))
        .collect()
}

/// Convert a probability to an uncertainty score in [0, 100].
///
/// 0 means maximal confidence. Rounding is half-away-from-zero, so
/// p = 0.925 maps to 93 and an uncertainty of 7.
fn uncertainty(probability: f32) -> u8 {
    (100 - (probability * 100.0).round() as i32).clamp(0, 100) as u8
}

/// Whether a candidate describes the same subject as an already-ranked
/// result: same name, alias of one another, or any category in common
/// with the result's accumulated category set.
fn same_subject(
    existing: &LabelEntry,
    merged_categories: &[String],
    candidate: &LabelEntry,
) -> bool {
    if existing.name == candidate.name {
        return true;
    }
    if candidate.aliases.iter().any(|a| *a == existing.name)
        || existing.aliases.iter().any(|a| *a == candidate.name)
    {
        return true;
    }
    candidate
        .categories
        .iter()
        .any(|c| merged_categories.contains(c))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(name: &str, priority: i32, categories: &[&str], aliases: &[&str]) -> LabelEntry {
        LabelEntry {
            name: name.to_string(),
            priority,
            categories: categories.iter().map(|s| s.to_string()).collect(),
            aliases: aliases.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn bird_table() -> LabelTable {
        LabelTable::from_entries(vec![
            entry("background", 0, &[], &[]),
            entry("dog", 2, &["animal"], &["puppy"]),
            entry("cat", 2, &["animal"], &[]),
            entry("car", 1, &["vehicle"], &[]),
            entry("sparrow", 0, &["bird"], &[]),
            entry("tree", 0, &["plant"], &[]),
            entry("house", 0, &["building"], &[]),
            entry("boat", 0, &["vehicle"], &[]),
            entry("chicken", 0, &["bird"], &["hen"]),
        ])
    }

    // ── uncertainty conversion ──

    #[test]
    fn test_uncertainty_reference_values() {
        assert_eq!(uncertainty(0.93), 7);
        assert_eq!(uncertainty(0.7), 30);
        assert_eq!(uncertainty(0.66), 34);
        assert_eq!(uncertainty(1.0), 0);
        assert_eq!(uncertainty(0.08), 92);
    }

    #[test]
    fn test_uncertainty_rounds_half_away_from_zero() {
        // 0.925 * 100 sits on the .5 boundary and rounds up to 93.
        assert_eq!(uncertainty(0.925), 7);
        assert_eq!(uncertainty(0.924), 8);
    }

    #[test]
    fn test_uncertainty_clamped() {
        assert_eq!(uncertainty(1.2), 0);
        assert_eq!(uncertainty(-0.5), 100);
    }

    #[test]
    fn test_uncertainty_strictly_decreasing() {
        let mut last = uncertainty(0.1);
        for step in 2..=10 {
            let next = uncertainty(step as f32 / 10.0);
            assert!(next < last, "uncertainty must fall as confidence rises");
            last = next;
        }
    }

    // ── threshold and basic ranking ──

    #[test]
    fn test_single_dominant_class() {
        let mut probs = vec![0.01_f32; 9];
        probs[8] = 0.7;

        let result = rank(&probs, &bird_table(), &RankOptions::default());
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].name, "chicken");
        assert_eq!(result[0].uncertainty, 30);
        assert_eq!(result[0].categories, vec!["bird"]);
        assert_eq!(result[0].source, "image");
    }

    #[test]
    fn test_nothing_above_threshold() {
        let probs = vec![0.05_f32; 9];
        let result = rank(&probs, &bird_table(), &RankOptions::default());
        assert!(result.is_empty());
    }

    #[test]
    fn test_empty_table_yields_empty() {
        let result = rank(&[0.9, 0.8], &LabelTable::empty(), &RankOptions::default());
        assert!(result.is_empty());
    }

    #[test]
    fn test_probabilities_past_table_ignored() {
        let table = LabelTable::from_entries(vec![entry("dog", 0, &["animal"], &[])]);
        // Index 1 has no label; its high probability must not surface.
        let result = rank(&[0.2, 0.99], &table, &RankOptions::default());
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].name, "dog");
        assert_eq!(result[0].uncertainty, 80);
    }

    #[test]
    fn test_deterministic_ordering() {
        let mut probs = vec![0.0_f32; 9];
        probs[1] = 0.4;
        probs[3] = 0.4;
        probs[8] = 0.3;

        let options = RankOptions {
            threshold: 0.08,
            max_results: 3,
        };
        let first = rank(&probs, &bird_table(), &options);
        for _ in 0..10 {
            assert_eq!(rank(&probs, &bird_table(), &options), first);
        }
        // dog (priority 2) beats car (priority 1) at equal uncertainty.
        assert_eq!(first[0].name, "dog");
        assert_eq!(first[1].name, "car");
    }

    #[test]
    fn test_name_breaks_priority_tie() {
        let table = LabelTable::from_entries(vec![
            entry("zebra", 1, &["animal"], &[]),
            entry("ant", 1, &["insect"], &[]),
        ]);
        let options = RankOptions {
            threshold: 0.08,
            max_results: 2,
        };
        let result = rank(&[0.5, 0.5], &table, &options);
        assert_eq!(result[0].name, "ant");
        assert_eq!(result[1].name, "zebra");
    }

    // ── deduplication ──

    #[test]
    fn test_category_overlap_merges() {
        let mut probs = vec![0.0_f32; 9];
        probs[8] = 0.7; // chicken, bird
        probs[4] = 0.3; // sparrow, bird

        let result = rank(&probs, &bird_table(), &RankOptions::default());
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].name, "chicken");
        assert_eq!(result[0].uncertainty, 30);
    }

    #[test]
    fn test_merge_keeps_lower_uncertainty_and_unions_categories() {
        let table = LabelTable::from_entries(vec![
            entry("dog", 0, &["animal", "pet"], &[]),
            entry("wolf", 0, &["animal", "wild"], &[]),
        ]);
        let result = rank(&[0.8, 0.4], &table, &RankOptions::default());
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].name, "dog");
        assert_eq!(result[0].uncertainty, 20);
        assert_eq!(result[0].categories, vec!["animal", "pet", "wild"]);
    }

    #[test]
    fn test_alias_merges_without_shared_category() {
        let table = LabelTable::from_entries(vec![
            entry("dog", 0, &["animal"], &["puppy"]),
            entry("puppy", 0, &[], &[]),
        ]);
        let result = rank(&[0.6, 0.5], &table, &RankOptions::default());
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].name, "dog");
    }

    #[test]
    fn test_distinct_subjects_capped_by_max_results() {
        let mut probs = vec![0.0_f32; 9];
        probs[1] = 0.6; // dog, animal
        probs[3] = 0.5; // car, vehicle
        probs[5] = 0.4; // tree, plant

        let capped = rank(&probs, &bird_table(), &RankOptions::default());
        assert_eq!(capped.len(), 1);
        assert_eq!(capped[0].name, "dog");

        let options = RankOptions {
            threshold: 0.08,
            max_results: 2,
        };
        let two = rank(&probs, &bird_table(), &options);
        assert_eq!(two.len(), 2);
        assert_eq!(two[0].name, "dog");
        assert_eq!(two[1].name, "car");
    }

    #[test]
    fn test_overflow_candidates_still_merge_into_survivors() {
        let mut probs = vec![0.0_f32; 9];
        probs[1] = 0.6; // dog, animal
        probs[3] = 0.5; // car, vehicle
        probs[7] = 0.4; // boat, vehicle: no room for a new subject, merges into car

        let options = RankOptions {
            threshold: 0.08,
            max_results: 2,
        };
        let result = rank(&probs, &bird_table(), &options);
        assert_eq!(result.len(), 2);
        assert_eq!(result[1].name, "car");
        assert_eq!(result[1].uncertainty, 50);
    }

    #[test]
    fn test_labels_without_categories_stay_distinct() {
        let table = LabelTable::from_entries(vec![
            entry("alpha", 0, &[], &[]),
            entry("beta", 0, &[], &[]),
        ]);
        let options = RankOptions {
            threshold: 0.08,
            max_results: 2,
        };
        let result = rank(&[0.5, 0.4], &table, &options);
        assert_eq!(result.len(), 2);
    }
}
