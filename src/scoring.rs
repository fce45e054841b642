//! Pattern scoring and functional-category assignment. Both are pure
//! functions of a pattern and lookup tables.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::alphabet::{Alphabet, Symbol};
use crate::config::ScoreWeights;
use crate::pattern::Pattern;

/// Functional annotation of one ortholog family.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FunctionalCategory {
    /// One letter per category, e.g. `"KL"`.
    pub letters: String,
    pub description: String,
}

/// Family label -> functional annotation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FunctionalTable {
    entries: BTreeMap<String, FunctionalCategory>,
}

impl FunctionalTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Later entries for the same label replace earlier ones.
    pub fn insert(&mut self, label: impl Into<String>, letters: impl Into<String>, description: impl Into<String>) {
        self.entries.insert(
            label.into(),
            FunctionalCategory {
                letters: letters.into(),
                description: description.into(),
            },
        );
    }

    pub fn get(&self, label: &str) -> Option<&FunctionalCategory> {
        self.entries.get(label)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Conservation score: longer, more widely supported patterns score
/// higher; weighted edits and wildcard positions lower it.
///
/// `core_len * genomes / (1 + mean weighted edit cost per occurrence +
/// wildcard weight * wildcard positions)`
pub fn calculate_score(pattern: &Pattern, weights: &ScoreWeights) -> f64 {
    let core_len = pattern.core().len() as f64;
    let genomes = pattern.genome_count() as f64;

    let edits = pattern.edit_summary();
    let mean_cost = if edits.occurrences == 0 {
        0.0
    } else {
        let total = weights.substitution * edits.substitutions as f64
            + weights.insertion * edits.insertions as f64
            + weights.deletion * edits.deletions as f64;
        total / edits.occurrences as f64
    };
    let wildcard_cost = weights.wildcard * pattern.wildcard_count() as f64;

    core_len * genomes / (1.0 + mean_cost + wildcard_cost)
}

/// Majority category letter over every symbol of every resolved instance.
///
/// Falls back to the pattern's own symbols when `instance_symbols` is empty.
/// Ties go to the letter seen first. `None` when no symbol is annotated.
pub fn calculate_main_functional_category(
    pattern: &Pattern,
    instance_symbols: &[Vec<Symbol>],
    alphabet: &Alphabet,
    table: &FunctionalTable,
) -> Option<String> {
    let fallback = [pattern.symbols().to_vec()];
    let sequences: &[Vec<Symbol>] = if instance_symbols.is_empty() {
        &fallback
    } else {
        instance_symbols
    };

    // (letter, votes) in first-seen order
    let mut votes: Vec<(char, usize)> = Vec::new();
    for &symbol in sequences.iter().flatten() {
        if symbol.is_placeholder() {
            continue;
        }
        let Some(category) = table.get(alphabet.label(symbol)) else {
            continue;
        };
        for letter in category.letters.chars().filter(|c| !c.is_whitespace()) {
            match votes.iter_mut().find(|(seen, _)| *seen == letter) {
                Some((_, count)) => *count += 1,
                None => votes.push((letter, 1)),
            }
        }
    }

    let mut best: Option<(char, usize)> = None;
    for &(letter, count) in &votes {
        if best.map_or(true, |(_, top)| count > top) {
            best = Some((letter, count));
        }
    }
    best.map(|(letter, _)| letter.to_string())
}
