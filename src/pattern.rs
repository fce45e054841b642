//! Patterns, their instances and the summaries kept once a pattern is final.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::alphabet::{core_symbols, Symbol};
use crate::genome::{GenomeId, RepliconKey};
use crate::suffix_tree::{GeneralizedSuffixTree, Locus, Occurrence};

/// Edit operations accumulated while matching one instance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct EditCounts {
    pub substitutions: usize,
    pub insertions: usize,
    pub deletions: usize,
    pub wildcards: usize,
}

impl EditCounts {
    /// No substitution, insertion or deletion. Wildcards are part of the
    /// pattern itself and do not make an instance inexact.
    pub fn is_exact(&self) -> bool {
        self.substitutions == 0 && self.insertions == 0 && self.deletions == 0
    }

    pub fn total(&self) -> usize {
        self.substitutions + self.insertions + self.deletions
    }

    /// Ordering used when two paths reach the same locus.
    fn preference_key(&self) -> (usize, usize, usize, usize) {
        (self.total(), self.insertions, self.deletions, self.substitutions)
    }

    pub fn is_cheaper_than(&self, other: &EditCounts) -> bool {
        self.preference_key() < other.preference_key()
    }
}

/// One occurrence class of a pattern: a tree locus plus the edits used to
/// reach it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Instance {
    pub locus: Locus,
    pub edits: EditCounts,
}

/// Deduplicated support of a pattern.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SupportSummary {
    /// Distinct `(replicon, start)` occurrences per supporting genome.
    pub per_genome: BTreeMap<GenomeId, usize>,
    /// Genomes with at least one exact instance.
    pub exact_genomes: usize,
    /// Distinct exact occurrences.
    pub exact_occurrences: usize,
    /// Genome span of every distinct occurrence. Kept when instance detail
    /// is discarded.
    #[serde(skip)]
    pub spans: BTreeSet<Occurrence>,
}

impl SupportSummary {
    pub fn genome_count(&self) -> usize {
        self.per_genome.len()
    }

    pub fn occurrence_count(&self) -> usize {
        self.per_genome.values().sum()
    }

    /// Every genome of `self` supports `other` at least as often, and every
    /// occurrence of `self` lies inside an occurrence of `other`.
    pub fn is_dominated_by(&self, other: &SupportSummary) -> bool {
        let counts_covered = self.per_genome.iter().all(|(genome, &count)| {
            other
                .per_genome
                .get(genome)
                .map_or(false, |&theirs| count <= theirs)
        });
        counts_covered && self.spans.iter().all(|span| other.covers(span))
    }

    /// Some occurrence of `self` spans `span` on the same replicon.
    fn covers(&self, span: &Occurrence) -> bool {
        let from = Occurrence {
            start: 0,
            length: 0,
            ..*span
        };
        let to = Occurrence {
            length: usize::MAX,
            ..*span
        };
        let end = span.start + span.length;
        self.spans.range(from..=to).any(|o| o.start + o.length >= end)
    }
}

/// Edit operations summed over every instance occurrence.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct EditSummary {
    pub occurrences: usize,
    pub substitutions: usize,
    pub insertions: usize,
    pub deletions: usize,
}

/// Support computed for a candidate instance set.
#[derive(Debug, Clone, Default)]
pub(crate) struct Support {
    pub summary: SupportSummary,
    pub edits: EditSummary,
}

impl Support {
    /// Deduplicate occurrences of `instances` by `(genome, replicon, start)`,
    /// keeping the cheapest edit vector (and its span) per start.
    pub fn collect(tree: &GeneralizedSuffixTree, instances: &[Instance]) -> Self {
        let mut best: BTreeMap<(GenomeId, RepliconKey, usize), (EditCounts, Occurrence)> = BTreeMap::new();
        for instance in instances {
            for occurrence in tree.occurrences(instance.locus) {
                let key = (occurrence.genome, occurrence.replicon, occurrence.start);
                best.entry(key)
                    .and_modify(|(edits, span)| {
                        if instance.edits.is_cheaper_than(edits) {
                            *edits = instance.edits;
                            *span = occurrence;
                        }
                    })
                    .or_insert((instance.edits, occurrence));
            }
        }

        let mut support = Support::default();
        let mut exact_genomes: BTreeSet<GenomeId> = BTreeSet::new();
        for ((genome, _, _), (edits, span)) in best {
            support.summary.spans.insert(span);
            *support.summary.per_genome.entry(genome).or_insert(0) += 1;
            if edits.is_exact() {
                exact_genomes.insert(genome);
                support.summary.exact_occurrences += 1;
            }
            support.edits.occurrences += 1;
            support.edits.substitutions += edits.substitutions;
            support.edits.insertions += edits.insertions;
            support.edits.deletions += edits.deletions;
        }
        support.summary.exact_genomes = exact_genomes.len();
        support
    }

    /// Support toward quorum2.
    pub fn count(&self, one_per_genome: bool) -> usize {
        if one_per_genome {
            self.summary.genome_count()
        } else {
            self.summary.occurrence_count()
        }
    }

    /// Support toward quorum1.
    pub fn exact_count(&self, one_per_genome: bool) -> usize {
        if one_per_genome {
            self.summary.exact_genomes
        } else {
            self.summary.exact_occurrences
        }
    }
}

/// A discovered (or user supplied) conserved syntenic block.
#[derive(Debug, Clone)]
pub struct Pattern {
    pub id: usize,
    symbols: Vec<Symbol>,
    instances: Vec<Instance>,
    instances_discarded: bool,
    support: SupportSummary,
    edits: EditSummary,
    exact_confirmed: bool,
    pub(crate) score: f64,
    pub(crate) main_category: Option<String>,
    pub(crate) family_id: Option<usize>,
}

impl Pattern {
    pub(crate) fn new(
        id: usize,
        symbols: Vec<Symbol>,
        instances: Vec<Instance>,
        support: Support,
        exact_confirmed: bool,
    ) -> Self {
        Self {
            id,
            symbols,
            instances,
            instances_discarded: false,
            support: support.summary,
            edits: support.edits,
            exact_confirmed,
            score: 0.0,
            main_category: None,
            family_id: None,
        }
    }

    /// Drop per-instance detail, keeping the summaries.
    pub(crate) fn discard_instances(&mut self) {
        self.instances = Vec::new();
        self.instances_discarded = true;
    }

    pub fn symbols(&self) -> &[Symbol] {
        &self.symbols
    }

    /// Symbols without Gap/Wildcard positions.
    pub fn core(&self) -> Vec<Symbol> {
        core_symbols(&self.symbols)
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn wildcard_count(&self) -> usize {
        self.symbols.iter().filter(|s| s.is_wildcard()).count()
    }

    pub fn instances(&self) -> &[Instance] {
        &self.instances
    }

    pub fn instances_discarded(&self) -> bool {
        self.instances_discarded
    }

    pub fn support(&self) -> &SupportSummary {
        &self.support
    }

    pub fn edit_summary(&self) -> &EditSummary {
        &self.edits
    }

    /// Distinct occurrences across all genomes.
    pub fn instance_count(&self) -> usize {
        self.support.occurrence_count()
    }

    pub fn genome_count(&self) -> usize {
        self.support.genome_count()
    }

    pub fn exact_instance_count(&self) -> usize {
        self.support.exact_occurrences
    }

    /// Exact support alone met quorum1.
    pub fn exact_confirmed(&self) -> bool {
        self.exact_confirmed
    }

    pub fn score(&self) -> f64 {
        self.score
    }

    pub fn main_category(&self) -> Option<&str> {
        self.main_category.as_deref()
    }

    pub fn family_id(&self) -> Option<usize> {
        self.family_id
    }
}
