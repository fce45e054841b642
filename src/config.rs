//! Run parameters. Every stage receives these by reference; nothing reads
//! ambient settings.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::error::ConfigError;

/// Parameters that govern pattern discovery.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DiscoveryConfig {
    /// Substitutions allowed per instance.
    pub max_error: usize,
    /// Wildcard positions allowed per pattern.
    pub max_wildcards: usize,
    /// Pattern symbols allowed to be missing from an instance.
    pub max_insertion: usize,
    /// Extra genome symbols allowed inside an instance.
    pub max_deletion: usize,
    /// Minimum support counting exact instances only.
    pub quorum1: usize,
    /// Minimum support counting every instance.
    pub quorum2: usize,
    pub min_pattern_length: usize,
    /// `None` means no upper bound.
    pub max_pattern_length: Option<usize>,
    /// Count genomes rather than occurrences toward quorum.
    pub one_instance_per_genome: bool,
    /// Drop per-instance detail from finalized patterns.
    pub memory_saving_mode: bool,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            max_error: 0,
            max_wildcards: 0,
            max_insertion: 0,
            max_deletion: 0,
            quorum1: 1,
            quorum2: 1,
            min_pattern_length: 2,
            max_pattern_length: None,
            one_instance_per_genome: true,
            memory_saving_mode: false,
        }
    }
}

impl DiscoveryConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min_pattern_length == 0 {
            return Err(ConfigError::ZeroMinLength);
        }
        if let Some(max) = self.max_pattern_length {
            if self.min_pattern_length > max {
                return Err(ConfigError::LengthBounds {
                    min: self.min_pattern_length,
                    max,
                });
            }
        }
        if self.quorum2 == 0 {
            return Err(ConfigError::ZeroQuorum);
        }
        if self.quorum1 > self.quorum2 {
            return Err(ConfigError::QuorumOrder {
                quorum1: self.quorum1,
                quorum2: self.quorum2,
            });
        }
        Ok(())
    }

    pub fn accepts_length(&self, length: usize) -> bool {
        length >= self.min_pattern_length && self.max_pattern_length.map_or(true, |max| length <= max)
    }

    pub fn can_extend(&self, length: usize) -> bool {
        self.max_pattern_length.map_or(true, |max| length < max)
    }
}

/// Which member represents a family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClusterBy {
    Length,
    #[default]
    Score,
}

impl FromStr for ClusterBy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "length" => Ok(Self::Length),
            "score" => Ok(Self::Score),
            other => Err(format!("unknown clustering criterion `{other}` (expected length|score)")),
        }
    }
}

impl fmt::Display for ClusterBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Length => f.write_str("length"),
            Self::Score => f.write_str("score"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClusterConfig {
    /// Minimum similarity in `[0, 1]` for two patterns to share a family.
    pub threshold: f64,
    pub cluster_by: ClusterBy,
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            threshold: 0.8,
            cluster_by: ClusterBy::default(),
        }
    }
}

/// Per-edit-type penalties used by the scorer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreWeights {
    pub substitution: f64,
    pub insertion: f64,
    pub deletion: f64,
    pub wildcard: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            substitution: 1.0,
            insertion: 1.0,
            deletion: 1.0,
            wildcard: 1.0,
        }
    }
}

impl ScoreWeights {
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [
            ("substitution", self.substitution),
            ("insertion", self.insertion),
            ("deletion", self.deletion),
            ("wildcard", self.wildcard),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::Weight { name, value });
            }
        }
        Ok(())
    }
}

/// Catalog file format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Txt,
    Json,
}

impl OutputFormat {
    pub fn extension(self) -> &'static str {
        match self {
            Self::Txt => "txt",
            Self::Json => "json",
        }
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "txt" => Ok(Self::Txt),
            "json" => Ok(Self::Json),
            other => Err(format!("unknown output format `{other}` (expected txt|json)")),
        }
    }
}

/// Everything one run needs besides its inputs.
#[derive(Debug, Clone, PartialEq)]
pub struct RunConfig {
    pub discovery: DiscoveryConfig,
    pub clustering: ClusterConfig,
    pub weights: ScoreWeights,
    pub dataset_name: String,
    pub output_format: OutputFormat,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            discovery: DiscoveryConfig::default(),
            clustering: ClusterConfig::default(),
            weights: ScoreWeights::default(),
            dataset_name: "dataset".to_string(),
            output_format: OutputFormat::default(),
        }
    }
}

impl RunConfig {
    /// Reject structurally invalid combinations before any work starts.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.discovery.validate()?;
        let threshold = self.clustering.threshold;
        if !(0.0..=1.0).contains(&threshold) {
            return Err(ConfigError::Threshold(threshold));
        }
        self.weights.validate()
    }
}
