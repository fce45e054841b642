//! One complete run: validate, index, discover, score, categorize, cluster.

use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use crate::alphabet::Symbol;
use crate::config::RunConfig;
use crate::discovery::CsbFinder;
use crate::error::{Result, WarningKind, WarningLog};
use crate::family::cluster;
use crate::genome::GenomeStore;
use crate::pattern_trie::PatternTrie;
use crate::report::{resolve_instances, CsbRun};
use crate::scoring::{calculate_main_functional_category, calculate_score, FunctionalTable};
use crate::suffix_tree::GeneralizedSuffixTree;

/// Run discovery over `store`.
///
/// With `input_patterns`, only those patterns are searched for. With
/// `categories`, every pattern gets a main functional category.
pub fn run(
    store: GenomeStore,
    categories: Option<FunctionalTable>,
    input_patterns: Option<Vec<Vec<Symbol>>>,
    config: &RunConfig,
) -> Result<CsbRun> {
    run_with_cancel(store, categories, input_patterns, config, None)
}

/// [`run`] that stops with [`crate::CsbError::Cancelled`] once `cancel` is set.
pub fn run_with_cancel(
    store: GenomeStore,
    categories: Option<FunctionalTable>,
    input_patterns: Option<Vec<Vec<Symbol>>>,
    config: &RunConfig,
    cancel: Option<Arc<AtomicBool>>,
) -> Result<CsbRun> {
    config.validate()?;
    let mut warnings = WarningLog::new();

    if store.is_empty() {
        warnings.push(WarningKind::SkippedInput, "no genomes loaded; nothing to search");
    }

    let tree = GeneralizedSuffixTree::build(&store);
    let trie = input_patterns.as_deref().map(PatternTrie::build);
    if let Some(trie) = &trie {
        log::info!("Searching for {} input patterns.", trie.len());
    }

    let mut finder = CsbFinder::new(&tree, &config.discovery);
    if let Some(trie) = &trie {
        finder = finder.with_input_patterns(trie);
    }
    if let Some(flag) = cancel {
        finder = finder.with_cancel_flag(flag);
    }
    let mut patterns = finder.find_patterns()?;

    let discarded = patterns.iter().filter(|p| p.instances_discarded()).count();
    if discarded > 0 {
        warnings.push(
            WarningKind::InstancesDiscarded,
            format!("{discarded} patterns kept summaries only (memory saving mode)"),
        );
    }

    for pattern in &mut patterns {
        pattern.score = calculate_score(pattern, &config.weights);
        if let Some(table) = &categories {
            let instance_symbols: Vec<Vec<Symbol>> = if pattern.instances_discarded() {
                Vec::new()
            } else {
                resolve_instances(&store, &tree, pattern, &mut warnings)
                    .into_values()
                    .flatten()
                    .collect()
            };
            pattern.main_category =
                calculate_main_functional_category(pattern, &instance_symbols, store.alphabet(), table);
        }
    }
    log::debug!("Scored {} patterns.", patterns.len());

    let families = cluster(patterns, &config.clustering);

    Ok(CsbRun {
        store,
        tree,
        families,
        warnings,
        categories,
    })
}
