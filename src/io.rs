//! Loaders for genome, functional-category and pattern-list files.
//!
//! Every loader has a `parse_*` form over any [`BufRead`] and a `load_*`
//! form that opens a path, transparently decompressing `.gz` input.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use flate2::read::MultiGzDecoder;

use crate::alphabet::{Alphabet, Strand, Symbol, GAP_LABEL, WILDCARD_LABEL};
use crate::error::{CsbError, Result};
use crate::genome::{GenomeStore, OrientationMode};
use crate::scoring::FunctionalTable;

/// Replicon name used when a genome lists symbols before any `#` header.
pub const DEFAULT_REPLICON: &str = "main";

pub fn is_gzip(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.eq_ignore_ascii_case("gz") || ext.eq_ignore_ascii_case("bgz"))
        .unwrap_or(false)
}

pub fn open_reader(path: &Path) -> Result<Box<dyn BufRead>> {
    let file = File::open(path)?;
    if is_gzip(path) {
        Ok(Box::new(BufReader::new(MultiGzDecoder::new(file))))
    } else {
        Ok(Box::new(BufReader::new(file)))
    }
}

fn parse_error(source: &Path, line: usize, message: impl Into<String>) -> CsbError {
    CsbError::Parse {
        path: source.to_path_buf(),
        line,
        message: message.into(),
    }
}

/// Genome being assembled while parsing.
struct PendingGenome {
    name: String,
    replicons: Vec<(String, Vec<Symbol>)>,
}

impl PendingGenome {
    fn current_replicon(&mut self) -> &mut Vec<Symbol> {
        if self.replicons.is_empty() {
            self.replicons.push((DEFAULT_REPLICON.to_string(), Vec::new()));
        }
        let last = self.replicons.len() - 1;
        &mut self.replicons[last].1
    }

    fn finish(mut self, store: &mut GenomeStore, mode: OrientationMode) -> Result<()> {
        self.replicons.retain(|(_, symbols)| !symbols.is_empty());
        let symbols: usize = self.replicons.iter().map(|(_, s)| s.len()).sum();
        log::debug!(
            "Loaded genome {} ({} replicons, {} genes)",
            self.name,
            self.replicons.len(),
            symbols
        );
        store.add_genome(&self.name, self.replicons, mode)?;
        Ok(())
    }
}

/// Parse a genome file:
///
/// ```text
/// >genome name
/// #replicon name
/// COG0001	+
/// COG0002	-
/// ```
///
/// One gene per line with an optional strand column; blank lines are
/// ignored. A `#` line starts a new replicon of the current genome.
pub fn parse_genomes<R: BufRead>(reader: R, source: &Path, mode: OrientationMode) -> Result<GenomeStore> {
    let mut store = GenomeStore::default();
    let mut pending: Option<PendingGenome> = None;

    for (index, line) in reader.lines().enumerate() {
        let line_no = index + 1;
        let line = line?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        if let Some(name) = line.strip_prefix('>') {
            let name = name.trim();
            if name.is_empty() {
                return Err(parse_error(source, line_no, "genome header without a name"));
            }
            if store.resolve_name(name).is_some() || pending.as_ref().map_or(false, |g| g.name == name) {
                return Err(parse_error(source, line_no, format!("duplicate genome `{name}`")));
            }
            if let Some(genome) = pending.take() {
                genome.finish(&mut store, mode)?;
            }
            pending = Some(PendingGenome {
                name: name.to_string(),
                replicons: Vec::new(),
            });
            continue;
        }

        let Some(genome) = pending.as_mut() else {
            return Err(parse_error(source, line_no, "gene listed before any `>genome` header"));
        };

        if let Some(name) = line.strip_prefix('#') {
            let name = name.trim();
            let name = if name.is_empty() {
                format!("replicon{}", genome.replicons.len())
            } else {
                name.to_string()
            };
            genome.replicons.push((name, Vec::new()));
            continue;
        }

        let mut fields = line.split_whitespace();
        let label = fields.next().unwrap_or_default();
        if label == GAP_LABEL || label == WILDCARD_LABEL {
            return Err(parse_error(source, line_no, format!("`{label}` is reserved for patterns")));
        }
        let strand = match fields.next() {
            None => Strand::Unknown,
            Some(token) => Strand::parse(token)
                .ok_or_else(|| parse_error(source, line_no, format!("invalid strand `{token}` (expected + or -)")))?,
        };
        let symbol = store.alphabet_mut().intern(label, strand);
        genome.current_replicon().push(symbol);
    }

    if let Some(genome) = pending.take() {
        genome.finish(&mut store, mode)?;
    }
    log::info!(
        "Loaded {} genomes over {} gene families from {}",
        store.len(),
        store.alphabet().len().saturating_sub(2),
        source.display()
    );
    Ok(store)
}

pub fn load_genomes(path: &Path, mode: OrientationMode) -> Result<GenomeStore> {
    parse_genomes(open_reader(path)?, path, mode)
}

/// Parse a tab-separated `id, category letters, description` table. Lines
/// starting with `#` are comments.
pub fn parse_functional_category_table<R: BufRead>(reader: R, source: &Path) -> Result<FunctionalTable> {
    let mut table = FunctionalTable::new();
    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() || line.starts_with('#') {
            continue;
        }
        let mut fields = line.split('\t').map(str::trim);
        let label = fields.next().unwrap_or_default();
        let Some(letters) = fields.next() else {
            return Err(parse_error(source, index + 1, "expected `id<TAB>letters[<TAB>description]`"));
        };
        if label.is_empty() {
            return Err(parse_error(source, index + 1, "empty family id"));
        }
        let description = fields.next().unwrap_or_default();
        table.insert(label, letters, description);
    }
    log::info!("Loaded {} functional annotations from {}", table.len(), source.display());
    Ok(table)
}

pub fn load_functional_category_table(path: &Path) -> Result<FunctionalTable> {
    parse_functional_category_table(open_reader(path)?, path)
}

/// Parse one pattern per line; tokens are separated by whitespace or commas.
/// `*` is a wildcard, `-` a gap. Lines starting with `>` or `#` are skipped.
pub fn parse_pattern_list<R: BufRead>(reader: R, source: &Path, alphabet: &mut Alphabet) -> Result<Vec<Vec<Symbol>>> {
    let mut patterns = Vec::new();
    for line in reader.lines() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('>') || line.starts_with('#') {
            continue;
        }
        let pattern: Vec<Symbol> = line
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|token| !token.is_empty())
            .map(|token| alphabet.parse_token(token))
            .collect();
        patterns.push(pattern);
    }
    log::info!("Loaded {} input patterns from {}", patterns.len(), source.display());
    Ok(patterns)
}

pub fn load_pattern_list(path: &Path, alphabet: &mut Alphabet) -> Result<Vec<Vec<Symbol>>> {
    parse_pattern_list(open_reader(path)?, path, alphabet)
}
