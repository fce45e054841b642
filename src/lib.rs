//! csbfinder: discovery of conserved syntenic blocks (CSBs).
//!
//! Genomes are sequences of gene-family symbols. A generalized suffix tree
//! indexes every replicon of every genome; discovery spells candidate
//! patterns over the tree, tolerating bounded substitutions, wildcards,
//! insertions and deletions, and keeps those present in enough genomes.
//! Surviving patterns are scored and clustered into families.
//!
//! [`pipeline::run`] drives a whole run; the modules below can also be used
//! on their own.

pub mod alphabet;
pub mod catalog;
pub mod config;
pub mod discovery;
pub mod error;
pub mod family;
pub mod genome;
pub mod io;
pub mod pattern;
pub mod pattern_trie;
pub mod pipeline;
pub mod report;
pub mod scoring;
pub mod suffix_tree;

pub use alphabet::{core_symbols, Alphabet, Strand, Symbol};
pub use catalog::{catalog_stem, write_catalog, CatalogOutput};
pub use config::{ClusterBy, ClusterConfig, DiscoveryConfig, OutputFormat, RunConfig, ScoreWeights};
pub use discovery::{remove_redundant_patterns, CsbFinder};
pub use error::{ConfigError, CsbError, Result, Warning, WarningKind, WarningLog};
pub use family::{cluster, similarity, Family};
pub use genome::{Genome, GenomeId, GenomeStore, OrientationMode, Replicon, RepliconKey};
pub use io::{load_functional_category_table, load_genomes, load_pattern_list};
pub use pattern::{EditCounts, EditSummary, Instance, Pattern, SupportSummary};
pub use pattern_trie::PatternTrie;
pub use pipeline::{run, run_with_cancel};
pub use report::{CsbRun, PatternReport};
pub use scoring::{calculate_main_functional_category, calculate_score, FunctionalCategory, FunctionalTable};
pub use suffix_tree::{GeneralizedSuffixTree, Locus, Occurrence};
