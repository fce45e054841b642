//! In-memory genome store: genomes, their replicons, and the shared alphabet.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::alphabet::{Alphabet, Strand, Symbol};
use crate::error::{CsbError, Result};

/// Stable integer key of a genome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct GenomeId(pub u32);

/// Key of a replicon within its genome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct RepliconKey(pub u32);

/// How gene orientation is treated while loading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OrientationMode {
    /// Strand is discarded.
    #[default]
    Unstranded,
    /// Strand is kept as part of each symbol.
    Stranded,
    /// Replicons are split into same-strand runs; reverse runs are reversed
    /// and every symbol is normalised to the forward strand.
    Directons,
}

impl OrientationMode {
    /// Bring a pattern symbol into the strand convention genomes use under
    /// this mode. Placeholders are returned unchanged.
    pub fn normalize(self, symbol: Symbol) -> Symbol {
        if symbol.is_placeholder() {
            return symbol;
        }
        match self {
            Self::Unstranded => symbol.with_strand(Strand::Unknown),
            Self::Stranded => symbol,
            Self::Directons => symbol.with_strand(Strand::Forward),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Replicon {
    pub key: RepliconKey,
    pub name: String,
    pub symbols: Vec<Symbol>,
}

impl Replicon {
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct Genome {
    pub id: GenomeId,
    pub name: String,
    pub replicons: Vec<Replicon>,
}

impl Genome {
    pub fn replicon(&self, key: RepliconKey) -> Option<&Replicon> {
        self.replicons.iter().find(|r| r.key == key)
    }

    /// Total number of symbols across replicons.
    pub fn len(&self) -> usize {
        self.replicons.iter().map(Replicon::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Genomes keyed by id plus the alphabet their symbols were interned in.
#[derive(Debug, Clone, Default)]
pub struct GenomeStore {
    alphabet: Alphabet,
    genomes: Vec<Genome>,
    by_name: BTreeMap<String, GenomeId>,
}

impl GenomeStore {
    pub fn new(alphabet: Alphabet) -> Self {
        Self {
            alphabet,
            genomes: Vec::new(),
            by_name: BTreeMap::new(),
        }
    }

    pub fn alphabet(&self) -> &Alphabet {
        &self.alphabet
    }

    pub fn alphabet_mut(&mut self) -> &mut Alphabet {
        &mut self.alphabet
    }

    /// Add a genome made of oriented replicons, applying `mode`.
    ///
    /// Each replicon is given as `(name, symbols)`; symbols carry their
    /// strand as read from input. Returns the new genome id, or
    /// [`CsbError::DuplicateGenome`] when `name` is already loaded.
    pub fn add_genome(
        &mut self,
        name: &str,
        replicons: Vec<(String, Vec<Symbol>)>,
        mode: OrientationMode,
    ) -> Result<GenomeId> {
        if self.by_name.contains_key(name) {
            return Err(CsbError::DuplicateGenome(name.to_string()));
        }
        let id = GenomeId(self.genomes.len() as u32);
        let mut normalised = Vec::new();
        for (replicon_name, symbols) in replicons {
            match mode {
                OrientationMode::Unstranded => normalised.push((
                    replicon_name,
                    symbols
                        .into_iter()
                        .map(|s| s.with_strand(Strand::Unknown))
                        .collect(),
                )),
                OrientationMode::Stranded => normalised.push((replicon_name, symbols)),
                OrientationMode::Directons => {
                    for (index, run) in split_directons(&symbols).into_iter().enumerate() {
                        normalised.push((format!("{replicon_name}/d{index}"), run));
                    }
                }
            }
        }

        let replicons = normalised
            .into_iter()
            .enumerate()
            .map(|(index, (name, symbols))| Replicon {
                key: RepliconKey(index as u32),
                name,
                symbols,
            })
            .collect();

        self.genomes.push(Genome {
            id,
            name: name.to_string(),
            replicons,
        });
        self.by_name.insert(name.to_string(), id);
        Ok(id)
    }

    pub fn genome(&self, id: GenomeId) -> Option<&Genome> {
        self.genomes.get(id.0 as usize)
    }

    pub fn resolve_name(&self, name: &str) -> Option<GenomeId> {
        self.by_name.get(name).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Genome> {
        self.genomes.iter()
    }

    pub fn len(&self) -> usize {
        self.genomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.genomes.is_empty()
    }

    /// Slice `length` symbols of a replicon starting at `start`, if in range.
    pub fn subsequence(
        &self,
        genome: GenomeId,
        replicon: RepliconKey,
        start: usize,
        length: usize,
    ) -> Option<&[Symbol]> {
        let replicon = self.genome(genome)?.replicon(replicon)?;
        let end = start.checked_add(length)?;
        replicon.symbols.get(start..end)
    }
}

/// Split into maximal same-strand runs; reverse runs are reversed so every
/// directon reads 5'->3' on its own strand.
fn split_directons(symbols: &[Symbol]) -> Vec<Vec<Symbol>> {
    let mut runs: Vec<Vec<Symbol>> = Vec::new();
    let mut current: Vec<Symbol> = Vec::new();
    let mut current_strand: Option<Strand> = None;

    let mut flush = |run: &mut Vec<Symbol>, strand: Option<Strand>| {
        if run.is_empty() {
            return;
        }
        if strand == Some(Strand::Reverse) {
            run.reverse();
        }
        runs.push(run.drain(..).map(|s| s.with_strand(Strand::Forward)).collect());
    };

    for &symbol in symbols {
        if current_strand.is_some() && current_strand != Some(symbol.strand()) {
            flush(&mut current, current_strand);
        }
        current_strand = Some(symbol.strand());
        current.push(symbol);
    }
    flush(&mut current, current_strand);

    runs
}

#[cfg(test)]
mod tests {
    use super::*;

    fn oriented(alphabet: &mut Alphabet, tokens: &[&str]) -> Vec<Symbol> {
        tokens.iter().map(|t| alphabet.parse_token(t)).collect()
    }

    #[test]
    fn pattern_symbols_follow_the_mode() {
        let mut alphabet = Alphabet::new();
        let a = alphabet.parse_token("A-");
        assert_eq!(OrientationMode::Unstranded.normalize(a).strand(), Strand::Unknown);
        assert_eq!(OrientationMode::Stranded.normalize(a).strand(), Strand::Reverse);
        assert_eq!(OrientationMode::Directons.normalize(a).strand(), Strand::Forward);
        assert_eq!(OrientationMode::Directons.normalize(Symbol::WILDCARD), Symbol::WILDCARD);
    }

    #[test]
    fn unstranded_mode_drops_orientation() {
        let mut store = GenomeStore::default();
        let symbols = oriented(store.alphabet_mut(), &["A+", "B-"]);
        let id = store.add_genome("g1", vec![("chr".into(), symbols)], OrientationMode::Unstranded).unwrap();

        let genome = store.genome(id).unwrap();
        assert!(genome.replicons[0]
            .symbols
            .iter()
            .all(|s| s.strand() == Strand::Unknown));
        assert_eq!(store.resolve_name("g1"), Some(id));
    }

    #[test]
    fn directon_mode_splits_and_reverses() {
        let mut store = GenomeStore::default();
        let symbols = oriented(store.alphabet_mut(), &["A+", "B+", "C-", "D-", "E+"]);
        let id = store.add_genome("g1", vec![("chr".into(), symbols)], OrientationMode::Directons).unwrap();

        let genome = store.genome(id).unwrap();
        assert_eq!(genome.replicons.len(), 3);
        let alphabet = store.alphabet();
        let labels: Vec<String> = genome.replicons[1]
            .symbols
            .iter()
            .map(|&s| alphabet.label(s).to_string())
            .collect();
        assert_eq!(labels, vec!["D", "C"]);
        assert!(genome.replicons[1]
            .symbols
            .iter()
            .all(|s| s.strand() == Strand::Forward));
        assert_eq!(genome.replicons[2].name, "chr/d2");
    }

    #[test]
    fn subsequence_respects_bounds() {
        let mut store = GenomeStore::default();
        let symbols = oriented(store.alphabet_mut(), &["A", "B", "C"]);
        let id = store.add_genome("g1", vec![("chr".into(), symbols)], OrientationMode::Stranded).unwrap();

        assert_eq!(store.subsequence(id, RepliconKey(0), 1, 2).map(|s| s.len()), Some(2));
        assert!(store.subsequence(id, RepliconKey(0), 2, 2).is_none());
        assert!(store.subsequence(id, RepliconKey(3), 0, 1).is_none());
        assert!(store.subsequence(GenomeId(9), RepliconKey(0), 0, 1).is_none());
        assert!(store.subsequence(id, RepliconKey(0), usize::MAX, 2).is_none());
    }

    #[test]
    fn repeated_genome_name_is_rejected() {
        let mut store = GenomeStore::default();
        let first = oriented(store.alphabet_mut(), &["A", "B"]);
        let second = oriented(store.alphabet_mut(), &["C", "D"]);
        let id = store.add_genome("g1", vec![("chr".into(), first)], OrientationMode::Unstranded).unwrap();

        let result = store.add_genome("g1", vec![("chr".into(), second)], OrientationMode::Unstranded);
        assert!(matches!(result, Err(CsbError::DuplicateGenome(ref name)) if name == "g1"));
        assert_eq!(store.len(), 1);
        assert_eq!(store.resolve_name("g1"), Some(id));
    }
}
