//! CSB search: spell candidate patterns over the suffix tree, extend their
//! instances approximately, filter by quorum and drop redundant patterns.

use std::cmp::Reverse;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::alphabet::Symbol;
use crate::config::DiscoveryConfig;
use crate::error::{CsbError, Result};
use crate::pattern::{EditCounts, Instance, Pattern, Support};
use crate::pattern_trie::{PatternTrie, TrieNodeId, TRIE_ROOT};
use crate::suffix_tree::{GeneralizedSuffixTree, Locus};

/// A spelled pattern waiting to be reported and extended.
struct Frame {
    symbols: Vec<Symbol>,
    instances: Vec<Instance>,
    support: Support,
    wildcards: usize,
    trie_node: TrieNodeId,
}

/// Discovery over one built tree with one configuration.
pub struct CsbFinder<'a> {
    tree: &'a GeneralizedSuffixTree,
    config: &'a DiscoveryConfig,
    input_patterns: Option<&'a PatternTrie>,
    cancel: Option<Arc<AtomicBool>>,
}

impl<'a> CsbFinder<'a> {
    pub fn new(tree: &'a GeneralizedSuffixTree, config: &'a DiscoveryConfig) -> Self {
        Self {
            tree,
            config,
            input_patterns: None,
            cancel: None,
        }
    }

    /// Search for exactly these patterns instead of free discovery.
    pub fn with_input_patterns(mut self, trie: &'a PatternTrie) -> Self {
        self.input_patterns = Some(trie);
        self
    }

    /// Abort with [`CsbError::Cancelled`] once `flag` is raised; checked
    /// once per spelled node.
    pub fn with_cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    /// Spell, filter and, in free mode, remove redundant patterns.
    pub fn find_patterns(&self) -> Result<Vec<Pattern>> {
        self.config.validate()?;
        let spelled = self.spell_patterns()?;
        if self.input_patterns.is_some() {
            return Ok(spelled);
        }
        let before = spelled.len();
        let patterns = remove_redundant_patterns(spelled);
        log::info!(
            "Removed {} redundant patterns, {} remain.",
            before - patterns.len(),
            patterns.len()
        );
        Ok(patterns)
    }

    /// Every pattern meeting the quorum and length policy, in depth-first
    /// spelling order, before redundancy removal.
    pub fn spell_patterns(&self) -> Result<Vec<Pattern>> {
        let trie_mode = self.input_patterns.is_some();
        let mut patterns = Vec::new();
        let mut stack = vec![Frame {
            symbols: Vec::new(),
            instances: vec![Instance {
                locus: Locus::ROOT,
                edits: EditCounts::default(),
            }],
            support: Support::default(),
            wildcards: 0,
            trie_node: TRIE_ROOT,
        }];
        let mut visited = 0usize;

        while let Some(frame) = stack.pop() {
            if let Some(flag) = &self.cancel {
                if flag.load(Ordering::Relaxed) {
                    log::info!("Discovery cancelled after {visited} spelled nodes.");
                    return Err(CsbError::Cancelled);
                }
            }
            visited += 1;

            let mut children: Vec<Frame> = self
                .extension_symbols(&frame)
                .into_iter()
                .filter_map(|(symbol, trie_node)| self.extend_frame(&frame, symbol, trie_node))
                .collect();
            children.reverse();

            if !frame.symbols.is_empty() && self.is_reportable(&frame) {
                patterns.push(self.finalize(patterns.len(), frame));
            }
            stack.extend(children);
        }

        log::info!(
            "Spelled {} candidate nodes, {} patterns pass quorum{}.",
            visited,
            patterns.len(),
            if trie_mode { " (input pattern mode)" } else { "" }
        );
        Ok(patterns)
    }

    fn is_reportable(&self, frame: &Frame) -> bool {
        match self.input_patterns {
            Some(trie) => trie.terminal(frame.trie_node).is_some(),
            None => {
                self.config.accepts_length(frame.symbols.len())
                    && frame.symbols.last().map_or(false, |s| !s.is_placeholder())
            }
        }
    }

    fn finalize(&self, id: usize, frame: Frame) -> Pattern {
        let exact_confirmed =
            frame.support.exact_count(self.config.one_instance_per_genome) >= self.config.quorum1;
        let mut pattern = Pattern::new(id, frame.symbols, frame.instances, frame.support, exact_confirmed);
        if self.config.memory_saving_mode {
            pattern.discard_instances();
        }
        pattern
    }

    /// Next symbols to try, paired with the trie node they lead to.
    fn extension_symbols(&self, frame: &Frame) -> Vec<(Symbol, TrieNodeId)> {
        if let Some(trie) = self.input_patterns {
            return trie.children(frame.trie_node).collect();
        }
        if !self.config.can_extend(frame.symbols.len()) {
            return Vec::new();
        }

        let first = frame.symbols.is_empty();
        let skips = if first { 0 } else { self.config.max_deletion };
        let mut symbols: BTreeSet<Symbol> = BTreeSet::new();
        for instance in &frame.instances {
            let budget = skips.saturating_sub(instance.edits.deletions);
            let mut frontier = vec![instance.locus];
            for round in 0..=budget {
                let mut next_frontier = Vec::new();
                for locus in frontier {
                    for (symbol, next) in self.tree.continuations(locus) {
                        symbols.insert(symbol);
                        if round < budget {
                            next_frontier.push(next);
                        }
                    }
                }
                frontier = next_frontier;
            }
        }
        if !first && frame.wildcards < self.config.max_wildcards {
            symbols.insert(Symbol::WILDCARD);
        }
        symbols.into_iter().map(|s| (s, TRIE_ROOT)).collect()
    }

    fn extend_frame(&self, frame: &Frame, symbol: Symbol, trie_node: TrieNodeId) -> Option<Frame> {
        let wildcards = frame.wildcards + usize::from(symbol.is_wildcard());
        if self.input_patterns.is_none() && wildcards > self.config.max_wildcards {
            return None;
        }

        let instances = self.extend_instances(&frame.instances, symbol, frame.symbols.is_empty());
        if instances.is_empty() {
            return None;
        }
        let support = Support::collect(self.tree, &instances);
        let per_genome = self.config.one_instance_per_genome;
        // quorum1 only admits seeds; deeper frames are kept on total support
        let seed = frame.symbols.is_empty();
        if seed && support.exact_count(per_genome) < self.config.quorum1 {
            return None;
        }
        if support.count(per_genome) < self.config.quorum2 {
            return None;
        }

        let mut symbols = frame.symbols.clone();
        symbols.push(symbol);
        Some(Frame {
            symbols,
            instances,
            support,
            wildcards,
            trie_node,
        })
    }

    /// Extend every instance by one pattern symbol within the edit budgets.
    /// Skipping genome symbols before the match spends the deletion budget;
    /// leaving the locus in place (a pattern symbol the genome lacks) spends
    /// the insertion budget. Instances reaching the same locus are merged,
    /// keeping the cheapest.
    fn extend_instances(&self, instances: &[Instance], symbol: Symbol, first: bool) -> Vec<Instance> {
        if symbol.is_gap() {
            return instances.to_vec();
        }
        let config = self.config;
        let mut reached: BTreeMap<Locus, EditCounts> = BTreeMap::new();

        for instance in instances {
            let mut frontier = vec![(instance.locus, instance.edits)];
            while !frontier.is_empty() {
                let mut skipped = Vec::new();
                for (locus, edits) in frontier {
                    for (next_symbol, next) in self.tree.continuations(locus) {
                        if symbol.is_wildcard() {
                            let edits = EditCounts {
                                wildcards: edits.wildcards + 1,
                                ..edits
                            };
                            record(&mut reached, next, edits);
                        } else if next_symbol == symbol {
                            record(&mut reached, next, edits);
                        } else if edits.substitutions < config.max_error {
                            let edits = EditCounts {
                                substitutions: edits.substitutions + 1,
                                ..edits
                            };
                            record(&mut reached, next, edits);
                        }

                        if !first && !symbol.is_wildcard() && edits.deletions < config.max_deletion {
                            let edits = EditCounts {
                                deletions: edits.deletions + 1,
                                ..edits
                            };
                            skipped.push((next, edits));
                        }
                    }
                }
                frontier = skipped;
            }

            if !first && !symbol.is_wildcard() && instance.edits.insertions < config.max_insertion {
                let edits = EditCounts {
                    insertions: instance.edits.insertions + 1,
                    ..instance.edits
                };
                record(&mut reached, instance.locus, edits);
            }
        }

        reached
            .into_iter()
            .map(|(locus, edits)| Instance { locus, edits })
            .collect()
    }
}

fn record(reached: &mut BTreeMap<Locus, EditCounts>, locus: Locus, edits: EditCounts) {
    reached
        .entry(locus)
        .and_modify(|current| {
            if edits.is_cheaper_than(current) {
                *current = edits;
            }
        })
        .or_insert(edits);
}

/// True when `needle` occurs as a contiguous run inside `haystack`.
fn is_contiguous_run(needle: &[Symbol], haystack: &[Symbol]) -> bool {
    needle.is_empty()
        || (needle.len() <= haystack.len() && haystack.windows(needle.len()).any(|w| w == needle))
}

/// `dominant` makes `other` redundant: the core of `other` is a contiguous
/// run of the core of `dominant`, and every occurrence of `other` lies
/// inside one of `dominant`.
fn dominates(dominant: &Pattern, dominant_core: &[Symbol], other: &Pattern, other_core: &[Symbol]) -> bool {
    is_contiguous_run(other_core, dominant_core) && other.support().is_dominated_by(dominant.support())
}

/// Drop every pattern dominated by a higher-ranked one. Rank prefers longer
/// patterns, then more instances, then earlier position. Survivors keep
/// their input order. Applying this twice equals applying it once.
pub fn remove_redundant_patterns(patterns: Vec<Pattern>) -> Vec<Pattern> {
    let cores: Vec<Vec<Symbol>> = patterns.iter().map(Pattern::core).collect();
    let mut order: Vec<usize> = (0..patterns.len()).collect();
    order.sort_by_key(|&i| Reverse((patterns[i].len(), patterns[i].instance_count(), Reverse(i))));

    let mut keep = vec![true; patterns.len()];
    for (pos, &candidate) in order.iter().enumerate() {
        keep[candidate] = !order[..pos].iter().any(|&better| {
            dominates(
                &patterns[better],
                &cores[better],
                &patterns[candidate],
                &cores[candidate],
            )
        });
    }

    patterns
        .into_iter()
        .zip(keep)
        .filter_map(|(pattern, kept)| kept.then_some(pattern))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alphabet::{Alphabet, Strand};
    use crate::genome::{GenomeId, RepliconKey};

    fn setup(texts: &[&str]) -> (Alphabet, GeneralizedSuffixTree) {
        let mut alphabet = Alphabet::new();
        let mut tree = GeneralizedSuffixTree::new();
        for (idx, text) in texts.iter().enumerate() {
            let seq: Vec<Symbol> = text
                .chars()
                .map(|c| alphabet.intern(&c.to_string(), Strand::Unknown))
                .collect();
            tree.insert(GenomeId(idx as u32), RepliconKey(0), &seq);
        }
        (alphabet, tree)
    }

    fn rendered(alphabet: &Alphabet, patterns: &[Pattern]) -> Vec<String> {
        patterns
            .iter()
            .map(|p| p.symbols().iter().map(|&s| alphabet.label(s)).collect::<String>())
            .collect()
    }

    fn three_genomes() -> (Alphabet, GeneralizedSuffixTree) {
        setup(&["ABCDE", "XBCDY", "ABCDZ"])
    }

    #[test]
    fn exact_quorum_finds_shared_block_only() {
        let (alphabet, tree) = three_genomes();
        let config = DiscoveryConfig {
            quorum1: 3,
            quorum2: 3,
            min_pattern_length: 2,
            max_pattern_length: Some(5),
            ..DiscoveryConfig::default()
        };
        let spelled = rendered(&alphabet, &CsbFinder::new(&tree, &config).spell_patterns().unwrap());
        assert_eq!(spelled, vec!["BC", "BCD", "CD"]);

        let found = CsbFinder::new(&tree, &config).find_patterns().unwrap();
        assert_eq!(rendered(&alphabet, &found), vec!["BCD"]);
        assert_eq!(found[0].genome_count(), 3);
        assert!(found[0].exact_confirmed());
    }

    #[test]
    fn substitutions_are_budgeted_per_instance() {
        let (alphabet, tree) = three_genomes();
        let one = DiscoveryConfig {
            max_error: 1,
            quorum1: 1,
            quorum2: 3,
            min_pattern_length: 4,
            max_pattern_length: Some(5),
            ..DiscoveryConfig::default()
        };
        let found = rendered(&alphabet, &CsbFinder::new(&tree, &one).spell_patterns().unwrap());
        assert!(found.contains(&"ABCD".to_string()));
        assert!(found.contains(&"BCDE".to_string()));
        // XBCDY needs two substitutions to read as ABCDE
        assert!(!found.contains(&"ABCDE".to_string()));

        let two = DiscoveryConfig { max_error: 2, ..one };
        let found = rendered(&alphabet, &CsbFinder::new(&tree, &two).spell_patterns().unwrap());
        assert!(found.contains(&"ABCDE".to_string()));
    }

    #[test]
    fn deletions_skip_extra_genome_symbols() {
        let (alphabet, tree) = setup(&["ABC", "AXBC", "ABYC"]);
        let strict = DiscoveryConfig {
            quorum1: 1,
            quorum2: 3,
            min_pattern_length: 3,
            ..DiscoveryConfig::default()
        };
        let found = rendered(&alphabet, &CsbFinder::new(&tree, &strict).spell_patterns().unwrap());
        assert!(found.is_empty());

        let relaxed = DiscoveryConfig {
            max_deletion: 1,
            ..strict
        };
        let patterns = CsbFinder::new(&tree, &relaxed).spell_patterns().unwrap();
        let abc = patterns
            .iter()
            .find(|p| rendered(&alphabet, std::slice::from_ref(*p))[0] == "ABC")
            .expect("ABC with one skipped genome symbol");
        assert_eq!(abc.genome_count(), 3);
        assert_eq!(abc.exact_instance_count(), 1);
        assert_eq!(abc.edit_summary().deletions, 2);
    }

    fn find_rendered<'p>(alphabet: &Alphabet, patterns: &'p [Pattern], text: &str) -> Option<&'p Pattern> {
        patterns
            .iter()
            .find(|p| rendered(alphabet, std::slice::from_ref(*p))[0] == text)
    }

    #[test]
    fn insertions_allow_pattern_symbols_missing_from_genome() {
        let (alphabet, tree) = setup(&["ABCD", "ABCD", "ABD"]);
        let config = DiscoveryConfig {
            max_insertion: 1,
            quorum1: 2,
            quorum2: 3,
            min_pattern_length: 4,
            ..DiscoveryConfig::default()
        };
        let patterns = CsbFinder::new(&tree, &config).spell_patterns().unwrap();
        let abcd = find_rendered(&alphabet, &patterns, "ABCD").expect("ABCD with C missing from one genome");
        assert_eq!(abcd.genome_count(), 3);
        assert_eq!(abcd.exact_instance_count(), 2);
        let edits = abcd.edit_summary();
        assert_eq!(edits.occurrences, 3);
        assert_eq!(edits.insertions, 1);
        assert_eq!(edits.deletions, 0);
        assert_eq!(edits.substitutions, 0);
    }

    #[test]
    fn insertion_never_covers_the_first_symbol() {
        let (alphabet, tree) = setup(&["BCD", "ABCD", "ABCD"]);
        let config = DiscoveryConfig {
            max_insertion: 1,
            quorum1: 1,
            quorum2: 3,
            min_pattern_length: 4,
            ..DiscoveryConfig::default()
        };
        let patterns = CsbFinder::new(&tree, &config).spell_patterns().unwrap();
        assert!(find_rendered(&alphabet, &patterns, "ABCD").is_none());

        let two = DiscoveryConfig { quorum2: 2, ..config };
        let patterns = CsbFinder::new(&tree, &two).spell_patterns().unwrap();
        let abcd = find_rendered(&alphabet, &patterns, "ABCD").expect("ABCD in the two genomes holding A");
        assert_eq!(abcd.genome_count(), 2);
        assert_eq!(abcd.edit_summary().insertions, 0);
    }

    #[test]
    fn insertion_budget_is_exhausted() {
        let (alphabet, tree) = setup(&["ABCDE", "ABCDE", "ADE"]);
        let one = DiscoveryConfig {
            max_insertion: 1,
            max_deletion: 1,
            quorum1: 1,
            quorum2: 3,
            min_pattern_length: 5,
            ..DiscoveryConfig::default()
        };
        let patterns = CsbFinder::new(&tree, &one).spell_patterns().unwrap();
        assert!(find_rendered(&alphabet, &patterns, "ABCDE").is_none());

        let two = DiscoveryConfig { max_insertion: 2, ..one };
        let patterns = CsbFinder::new(&tree, &two).spell_patterns().unwrap();
        let abcde = find_rendered(&alphabet, &patterns, "ABCDE").expect("ABCDE with B and C missing");
        assert_eq!(abcde.edit_summary().insertions, 2);
        assert_eq!(abcde.exact_instance_count(), 2);
    }

    #[test]
    fn insertion_and_deletion_budgets_are_independent() {
        let (alphabet, tree) = setup(&["ABCD", "ABCD", "AXBD"]);
        let base = DiscoveryConfig {
            quorum1: 1,
            quorum2: 3,
            min_pattern_length: 4,
            ..DiscoveryConfig::default()
        };
        for config in [
            DiscoveryConfig { max_insertion: 1, ..base },
            DiscoveryConfig { max_deletion: 1, ..base },
            DiscoveryConfig { max_insertion: 2, ..base },
        ] {
            let patterns = CsbFinder::new(&tree, &config).spell_patterns().unwrap();
            assert!(find_rendered(&alphabet, &patterns, "ABCD").is_none());
        }

        let both = DiscoveryConfig {
            max_insertion: 1,
            max_deletion: 1,
            ..base
        };
        let patterns = CsbFinder::new(&tree, &both).spell_patterns().unwrap();
        let abcd = find_rendered(&alphabet, &patterns, "ABCD").expect("ABCD with one extra and one missing symbol");
        assert_eq!(abcd.genome_count(), 3);
        let edits = abcd.edit_summary();
        assert_eq!(edits.insertions, 1);
        assert_eq!(edits.deletions, 1);
        assert_eq!(abcd.exact_instance_count(), 2);
    }

    #[test]
    fn quorum1_admits_seeds_and_marks_exact_confirmation() {
        let (alphabet, tree) = setup(&["ABC", "AXC", "AYC"]);
        let config = DiscoveryConfig {
            max_error: 1,
            quorum1: 2,
            quorum2: 3,
            min_pattern_length: 3,
            max_pattern_length: Some(3),
            ..DiscoveryConfig::default()
        };
        let patterns = CsbFinder::new(&tree, &config).spell_patterns().unwrap();
        let abc = find_rendered(&alphabet, &patterns, "ABC").expect("ABC with substitutions in two genomes");
        assert_eq!(abc.genome_count(), 3);
        assert_eq!(abc.exact_instance_count(), 1);
        assert!(!abc.exact_confirmed());
        // B is exact in one genome only, so no pattern may start with it
        assert!(patterns.iter().all(|p| alphabet.label(p.symbols()[0]) != "B"));
    }

    #[test]
    fn wildcards_bridge_differing_symbols() {
        let (alphabet, tree) = setup(&["AXB", "AYB", "AZB"]);
        let config = DiscoveryConfig {
            max_wildcards: 1,
            quorum1: 3,
            quorum2: 3,
            min_pattern_length: 3,
            ..DiscoveryConfig::default()
        };
        let patterns = CsbFinder::new(&tree, &config).find_patterns().unwrap();
        assert_eq!(rendered(&alphabet, &patterns), vec!["A*B"]);
        assert_eq!(patterns[0].wildcard_count(), 1);
    }

    #[test]
    fn occurrence_counting_when_not_one_per_genome() {
        let (alphabet, tree) = setup(&["ABAB", "CDEF"]);
        let per_genome = DiscoveryConfig {
            quorum1: 2,
            quorum2: 2,
            ..DiscoveryConfig::default()
        };
        assert!(CsbFinder::new(&tree, &per_genome).spell_patterns().unwrap().is_empty());

        let per_occurrence = DiscoveryConfig {
            one_instance_per_genome: false,
            ..per_genome
        };
        let found = rendered(&alphabet, &CsbFinder::new(&tree, &per_occurrence).spell_patterns().unwrap());
        assert_eq!(found, vec!["AB"]);
    }

    #[test]
    fn input_patterns_restrict_search_and_ignore_length_bounds() {
        let (mut alphabet, tree) = three_genomes();
        let wanted: Vec<Vec<Symbol>> = ["B C D", "A B C", "Q"]
            .iter()
            .map(|p| p.split_whitespace().map(|t| alphabet.parse_token(t)).collect())
            .collect();
        let trie = PatternTrie::build(&wanted);
        let config = DiscoveryConfig {
            quorum1: 2,
            quorum2: 2,
            min_pattern_length: 5,
            max_pattern_length: Some(5),
            ..DiscoveryConfig::default()
        };
        let patterns = CsbFinder::new(&tree, &config)
            .with_input_patterns(&trie)
            .find_patterns()
            .unwrap();
        assert_eq!(rendered(&alphabet, &patterns), vec!["ABC", "BCD"]);
    }

    #[test]
    fn input_patterns_skip_leading_gaps() {
        let (mut alphabet, tree) = three_genomes();
        let wanted: Vec<Vec<Symbol>> = vec!["- B C".split_whitespace().map(|t| alphabet.parse_token(t)).collect()];
        let trie = PatternTrie::build(&wanted);
        let config = DiscoveryConfig {
            quorum1: 3,
            quorum2: 3,
            ..DiscoveryConfig::default()
        };
        let patterns = CsbFinder::new(&tree, &config)
            .with_input_patterns(&trie)
            .find_patterns()
            .unwrap();
        assert_eq!(rendered(&alphabet, &patterns), vec!["BC"]);
        assert_eq!(patterns[0].genome_count(), 3);
    }

    #[test]
    fn memory_saving_mode_keeps_the_same_patterns() {
        let (alphabet, tree) = setup(&["ABCAB", "ABCXX", "XABCX"]);
        let config = DiscoveryConfig {
            quorum1: 2,
            quorum2: 2,
            ..DiscoveryConfig::default()
        };
        let full = CsbFinder::new(&tree, &config).find_patterns().unwrap();
        let lean_config = DiscoveryConfig {
            memory_saving_mode: true,
            ..config
        };
        let lean = CsbFinder::new(&tree, &lean_config).find_patterns().unwrap();

        assert_eq!(rendered(&alphabet, &full), rendered(&alphabet, &lean));
        assert!(lean.iter().all(|p| p.instances().is_empty() && p.instances_discarded()));
        assert!(full.iter().all(|p| !p.instances().is_empty()));
    }

    #[test]
    fn cancel_flag_stops_discovery() {
        let (_, tree) = three_genomes();
        let config = DiscoveryConfig::default();
        let flag = Arc::new(AtomicBool::new(true));
        let result = CsbFinder::new(&tree, &config).with_cancel_flag(flag).spell_patterns();
        assert!(matches!(result, Err(CsbError::Cancelled)));
    }

    #[test]
    fn invalid_config_fails_fast() {
        let (_, tree) = three_genomes();
        let config = DiscoveryConfig {
            min_pattern_length: 4,
            max_pattern_length: Some(2),
            ..DiscoveryConfig::default()
        };
        assert!(matches!(
            CsbFinder::new(&tree, &config).find_patterns(),
            Err(CsbError::Config(_))
        ));
    }

    #[test]
    fn redundancy_removal_is_idempotent() {
        let (_, tree) = setup(&["ABCDAB", "ABCDXY", "YABCD", "ABXCD"]);
        let config = DiscoveryConfig {
            max_deletion: 1,
            quorum1: 1,
            quorum2: 2,
            ..DiscoveryConfig::default()
        };
        let spelled = CsbFinder::new(&tree, &config).spell_patterns().unwrap();
        let once = remove_redundant_patterns(spelled);
        let once_ids: Vec<usize> = once.iter().map(|p| p.id).collect();
        let twice_ids: Vec<usize> = remove_redundant_patterns(once).iter().map(|p| p.id).collect();
        assert_eq!(once_ids, twice_ids);
    }

    #[test]
    fn redundancy_keeps_patterns_with_disjoint_occurrences() {
        let (alphabet, tree) = setup(&["AXBCDAB", "AYBEFAB"]);
        let config = DiscoveryConfig {
            max_wildcards: 1,
            quorum1: 2,
            quorum2: 2,
            min_pattern_length: 2,
            max_pattern_length: Some(3),
            ..DiscoveryConfig::default()
        };
        let mut spelled = rendered(&alphabet, &CsbFinder::new(&tree, &config).spell_patterns().unwrap());
        spelled.sort();
        assert_eq!(spelled, vec!["A*B", "AB"]);

        // AB sits at offset 5 in both genomes, outside every A*B occurrence
        let lean = DiscoveryConfig {
            memory_saving_mode: true,
            ..config
        };
        for config in [config, lean] {
            let mut found = rendered(&alphabet, &CsbFinder::new(&tree, &config).find_patterns().unwrap());
            found.sort();
            assert_eq!(found, vec!["A*B", "AB"]);
        }
    }

    #[test]
    fn contiguous_run_detection() {
        let mut alphabet = Alphabet::new();
        let abc: Vec<Symbol> = ["A", "B", "C"].iter().map(|t| alphabet.parse_token(t)).collect();
        assert!(is_contiguous_run(&abc[1..], &abc));
        assert!(!is_contiguous_run(&[abc[0], abc[2]], &abc));
        assert!(is_contiguous_run(&[], &abc));
        assert!(!is_contiguous_run(&abc, &abc[..2]));
    }
}
