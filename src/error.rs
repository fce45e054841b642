//! Error and warning types shared by every stage.

use std::fmt;
use std::path::PathBuf;

use serde::Serialize;

/// Structurally invalid run parameters, reported before any tree is built.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("min_pattern_length must be at least 1")]
    ZeroMinLength,
    #[error("min_pattern_length ({min}) exceeds max_pattern_length ({max})")]
    LengthBounds { min: usize, max: usize },
    #[error("quorum2 must be at least 1")]
    ZeroQuorum,
    #[error("quorum1 ({quorum1}) exceeds quorum2 ({quorum2})")]
    QuorumOrder { quorum1: usize, quorum2: usize },
    #[error("clustering threshold {0} is outside [0, 1]")]
    Threshold(f64),
    #[error("score weight `{name}` must be finite and non-negative, got {value}")]
    Weight { name: &'static str, value: f64 },
}

/// Errors returned by the library.
#[derive(thiserror::Error, Debug)]
pub enum CsbError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("{path}:{line}: {message}")]
    Parse {
        path: PathBuf,
        line: usize,
        message: String,
    },
    #[error("genome `{0}` is already loaded")]
    DuplicateGenome(String),
    #[error("serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("discovery cancelled")]
    Cancelled,
}

pub type Result<T> = std::result::Result<T, CsbError>;

/// Category of a recovered data inconsistency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum WarningKind {
    /// Occurrence offsets fall outside the replicon they point into.
    OffsetOutOfRange,
    /// Occurrence references a genome the store does not know.
    MissingGenome,
    /// Occurrence references a replicon the genome does not have.
    MissingReplicon,
    /// Pattern no longer carries per-instance detail (memory saving mode).
    InstancesDiscarded,
    /// Input line that was skipped while loading.
    SkippedInput,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Warning {
    pub kind: WarningKind,
    pub message: String,
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "WARNING ({:?}): {}", self.kind, self.message)
    }
}

/// Append-only warning collection; every entry is also forwarded to `log`.
#[derive(Debug, Clone, Default)]
pub struct WarningLog {
    entries: Vec<Warning>,
}

impl WarningLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, kind: WarningKind, message: impl Into<String>) {
        let warning = Warning {
            kind,
            message: message.into(),
        };
        log::warn!("{}", warning.message);
        self.entries.push(warning);
    }

    pub fn extend(&mut self, other: WarningLog) {
        self.entries.extend(other.entries);
    }

    pub fn entries(&self) -> &[Warning] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn count(&self, kind: WarningKind) -> usize {
        self.entries.iter().filter(|w| w.kind == kind).count()
    }
}
