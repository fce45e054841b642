//! Results of one run and their rendering-side views.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::alphabet::{Alphabet, Symbol};
use crate::error::{WarningKind, WarningLog};
use crate::family::Family;
use crate::genome::GenomeStore;
use crate::pattern::{EditSummary, Pattern};
use crate::scoring::FunctionalTable;
use crate::suffix_tree::GeneralizedSuffixTree;

/// Everything a run produced, plus the inputs needed to resolve instances.
#[derive(Debug)]
pub struct CsbRun {
    pub(crate) store: GenomeStore,
    pub(crate) tree: GeneralizedSuffixTree,
    pub(crate) families: Vec<Family>,
    pub(crate) warnings: WarningLog,
    pub(crate) categories: Option<FunctionalTable>,
}

impl CsbRun {
    pub fn families(&self) -> &[Family] {
        &self.families
    }

    /// Patterns in family order.
    pub fn patterns(&self) -> impl Iterator<Item = &Pattern> {
        self.families.iter().flat_map(|f| f.patterns.iter())
    }

    pub fn pattern(&self, id: usize) -> Option<&Pattern> {
        self.patterns().find(|p| p.id == id)
    }

    pub fn pattern_count(&self) -> usize {
        self.families.iter().map(Family::len).sum()
    }

    pub fn warnings(&self) -> &WarningLog {
        &self.warnings
    }

    pub fn store(&self) -> &GenomeStore {
        &self.store
    }

    pub fn alphabet(&self) -> &Alphabet {
        self.store.alphabet()
    }

    pub fn tree(&self) -> &GeneralizedSuffixTree {
        &self.tree
    }

    pub fn categories(&self) -> Option<&FunctionalTable> {
        self.categories.as_ref()
    }

    /// Genome name -> symbol runs of every resolved instance of `pattern`,
    /// plus a warning for each occurrence left out.
    pub fn instances_by_genome(&self, pattern: &Pattern) -> (BTreeMap<String, Vec<Vec<Symbol>>>, WarningLog) {
        let mut warnings = WarningLog::new();
        let resolved = resolve_instances(&self.store, &self.tree, pattern, &mut warnings);
        (resolved, warnings)
    }

    /// Label -> description for each annotated symbol; empty without a table.
    pub fn category_descriptions(&self, symbols: &[Symbol]) -> BTreeMap<String, String> {
        let Some(table) = &self.categories else {
            return BTreeMap::new();
        };
        symbols
            .iter()
            .filter(|s| !s.is_placeholder())
            .filter_map(|&s| {
                let label = self.store.alphabet().label(s);
                table
                    .get(label)
                    .map(|category| (label.to_string(), category.description.clone()))
            })
            .collect()
    }
}

/// Map every occurrence of `pattern` back onto the genome store.
///
/// Occurrences naming an unknown genome or replicon, or reaching past the
/// end of their replicon, are recorded in `warnings` and skipped.
pub fn resolve_instances(
    store: &GenomeStore,
    tree: &GeneralizedSuffixTree,
    pattern: &Pattern,
    warnings: &mut WarningLog,
) -> BTreeMap<String, Vec<Vec<Symbol>>> {
    let mut resolved: BTreeMap<String, Vec<Vec<Symbol>>> = BTreeMap::new();
    if pattern.instances_discarded() {
        warnings.push(
            WarningKind::InstancesDiscarded,
            format!("pattern {} kept no instance detail", pattern.id),
        );
        return resolved;
    }

    let occurrences: BTreeSet<_> = pattern
        .instances()
        .iter()
        .flat_map(|instance| tree.occurrences(instance.locus))
        .collect();
    let mut seen = BTreeSet::new();

    for occurrence in occurrences {
        if !seen.insert((occurrence.genome, occurrence.replicon, occurrence.start)) {
            continue;
        }
        let Some(genome) = store.genome(occurrence.genome) else {
            warnings.push(
                WarningKind::MissingGenome,
                format!("pattern {}: genome #{} is not loaded", pattern.id, occurrence.genome.0),
            );
            continue;
        };
        if genome.replicon(occurrence.replicon).is_none() {
            warnings.push(
                WarningKind::MissingReplicon,
                format!(
                    "pattern {}: genome {} has no replicon #{}",
                    pattern.id, genome.name, occurrence.replicon.0
                ),
            );
            continue;
        }
        match store.subsequence(occurrence.genome, occurrence.replicon, occurrence.start, occurrence.length) {
            Some(symbols) => resolved
                .entry(genome.name.clone())
                .or_default()
                .push(symbols.to_vec()),
            None => warnings.push(
                WarningKind::OffsetOutOfRange,
                format!(
                    "pattern {}: {}..{} exceeds replicon #{} of genome {}",
                    pattern.id,
                    occurrence.start,
                    occurrence.start.saturating_add(occurrence.length),
                    occurrence.replicon.0,
                    genome.name
                ),
            ),
        }
    }

    resolved
}

/// Serializable view of one pattern.
#[derive(Debug, Clone, Serialize)]
pub struct PatternReport {
    pub id: usize,
    pub family_id: Option<usize>,
    pub pattern: String,
    pub length: usize,
    pub score: f64,
    pub instance_count: usize,
    pub exact_instance_count: usize,
    pub genome_count: usize,
    pub exact_confirmed: bool,
    pub main_category: Option<String>,
    pub edits: EditSummary,
}

impl PatternReport {
    pub fn new(pattern: &Pattern, alphabet: &Alphabet) -> Self {
        Self {
            id: pattern.id,
            family_id: pattern.family_id(),
            pattern: alphabet.render(pattern.symbols()),
            length: pattern.len(),
            score: pattern.score(),
            instance_count: pattern.instance_count(),
            exact_instance_count: pattern.exact_instance_count(),
            genome_count: pattern.genome_count(),
            exact_confirmed: pattern.exact_confirmed(),
            main_category: pattern.main_category().map(str::to_string),
            edits: *pattern.edit_summary(),
        }
    }
}
