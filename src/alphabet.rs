use std::collections::HashMap;
use std::fmt;

use serde::Serialize;

/// Label reserved for the gap placeholder.
pub const GAP_LABEL: &str = "-";
/// Label reserved for the wildcard placeholder.
pub const WILDCARD_LABEL: &str = "*";

/// Orientation of a gene on its replicon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Strand {
    /// Orientation is not part of the symbol identity.
    Unknown,
    Forward,
    Reverse,
}

impl Strand {
    #[inline]
    fn marker(self) -> Option<char> {
        match self {
            Self::Unknown => None,
            Self::Forward => Some('+'),
            Self::Reverse => Some('-'),
        }
    }

    pub fn parse(token: &str) -> Option<Self> {
        match token {
            "+" => Some(Self::Forward),
            "-" => Some(Self::Reverse),
            _ => None,
        }
    }
}

/// A gene-family token with its orientation.
///
/// Family ids are interned by an [`Alphabet`]; ids 0 and 1 are reserved for
/// [`Symbol::GAP`] and [`Symbol::WILDCARD`], which never occur in genomes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Symbol {
    family: u32,
    strand: Strand,
}

impl Symbol {
    pub const GAP: Symbol = Symbol {
        family: 0,
        strand: Strand::Unknown,
    };
    pub const WILDCARD: Symbol = Symbol {
        family: 1,
        strand: Strand::Unknown,
    };

    pub fn new(family: u32, strand: Strand) -> Self {
        Self { family, strand }
    }

    pub fn family(self) -> u32 {
        self.family
    }

    pub fn strand(self) -> Strand {
        self.strand
    }

    /// Same family with a different orientation.
    pub fn with_strand(self, strand: Strand) -> Self {
        Self {
            family: self.family,
            strand,
        }
    }

    pub fn is_gap(self) -> bool {
        self.family == Self::GAP.family
    }

    pub fn is_wildcard(self) -> bool {
        self.family == Self::WILDCARD.family
    }

    /// True for Gap and Wildcard.
    pub fn is_placeholder(self) -> bool {
        self.is_gap() || self.is_wildcard()
    }
}

/// Bidirectional label <-> family id table.
#[derive(Debug, Clone)]
pub struct Alphabet {
    labels: Vec<String>,
    lookup: HashMap<String, u32>,
}

impl Alphabet {
    pub fn new() -> Self {
        let mut alphabet = Self {
            labels: Vec::new(),
            lookup: HashMap::new(),
        };
        alphabet.intern_label(GAP_LABEL);
        alphabet.intern_label(WILDCARD_LABEL);
        alphabet
    }

    fn intern_label(&mut self, label: &str) -> u32 {
        if let Some(&id) = self.lookup.get(label) {
            return id;
        }
        let id = self.labels.len() as u32;
        self.labels.push(label.to_string());
        self.lookup.insert(label.to_string(), id);
        id
    }

    /// Intern `label` with the given orientation.
    pub fn intern(&mut self, label: &str, strand: Strand) -> Symbol {
        Symbol::new(self.intern_label(label), strand)
    }

    /// Parse a pattern token: `*` wildcard, `-` gap, otherwise a family label
    /// with an optional trailing `+`/`-` strand marker.
    pub fn parse_token(&mut self, token: &str) -> Symbol {
        match token {
            WILDCARD_LABEL => Symbol::WILDCARD,
            GAP_LABEL => Symbol::GAP,
            _ => {
                let (label, strand) = split_strand(token);
                self.intern(label, strand)
            }
        }
    }

    pub fn get(&self, label: &str, strand: Strand) -> Option<Symbol> {
        self.lookup
            .get(label)
            .map(|&family| Symbol::new(family, strand))
    }

    /// Family label without strand decoration.
    pub fn label(&self, symbol: Symbol) -> &str {
        self.labels
            .get(symbol.family as usize)
            .map(String::as_str)
            .unwrap_or("?")
    }

    /// Display form: label followed by the strand marker when known.
    pub fn display(&self, symbol: Symbol) -> String {
        let mut out = self.label(symbol).to_string();
        if !symbol.is_placeholder() {
            if let Some(marker) = symbol.strand.marker() {
                out.push(marker);
            }
        }
        out
    }

    /// Render a symbol sequence the way catalogs print patterns.
    pub fn render(&self, symbols: &[Symbol]) -> String {
        symbols
            .iter()
            .map(|&s| self.display(s))
            .collect::<Vec<_>>()
            .join("-")
    }

    /// Number of interned families, reserved ids included.
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.len() <= 2
    }
}

impl Default for Alphabet {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_gap() {
            return f.write_str(GAP_LABEL);
        }
        if self.is_wildcard() {
            return f.write_str(WILDCARD_LABEL);
        }
        write!(f, "#{}", self.family)?;
        if let Some(marker) = self.strand.marker() {
            write!(f, "{marker}")?;
        }
        Ok(())
    }
}

fn split_strand(token: &str) -> (&str, Strand) {
    if token.len() > 1 {
        if let Some(label) = token.strip_suffix('+') {
            return (label, Strand::Forward);
        }
        if let Some(label) = token.strip_suffix('-') {
            return (label, Strand::Reverse);
        }
    }
    (token, Strand::Unknown)
}

/// Drop Gap and Wildcard positions.
pub fn core_symbols(symbols: &[Symbol]) -> Vec<Symbol> {
    symbols
        .iter()
        .copied()
        .filter(|s| !s.is_placeholder())
        .collect()
}
