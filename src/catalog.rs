//! Catalog files written at the end of a run.

use std::fs::{create_dir_all, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::config::{DiscoveryConfig, OutputFormat, RunConfig};
use crate::error::{Result, Warning, WarningLog};
use crate::family::Family;
use crate::report::{CsbRun, PatternReport};

/// `Catalog_<dataset>_ins<k>_q<q2>`, without extension.
pub fn catalog_stem(config: &RunConfig) -> String {
    format!(
        "Catalog_{}_ins{}_q{}",
        config.dataset_name, config.discovery.max_insertion, config.discovery.quorum2
    )
}

#[derive(Debug, Serialize)]
struct FamilyRecord {
    id: usize,
    patterns: Vec<PatternReport>,
}

impl FamilyRecord {
    fn new(family: &Family, run: &CsbRun) -> Self {
        Self {
            id: family.id,
            patterns: family
                .patterns
                .iter()
                .map(|p| PatternReport::new(p, run.alphabet()))
                .collect(),
        }
    }
}

#[derive(Debug, Serialize)]
struct CatalogDocument<'a> {
    dataset: &'a str,
    genomes: usize,
    parameters: &'a DiscoveryConfig,
    families: Vec<FamilyRecord>,
    warnings: &'a [Warning],
}

/// Paths written for one catalog, and the warnings raised while resolving
/// instances for it.
#[derive(Debug, Default)]
pub struct CatalogOutput {
    pub paths: Vec<PathBuf>,
    pub warnings: WarningLog,
}

/// Write the catalog of `run` into `dir`, creating it if needed.
pub fn write_catalog(run: &CsbRun, dir: &Path, config: &RunConfig) -> Result<CatalogOutput> {
    create_dir_all(dir)?;
    let stem = catalog_stem(config);
    let path = dir.join(format!("{stem}.{}", config.output_format.extension()));

    let mut output = CatalogOutput {
        paths: vec![path.clone()],
        warnings: WarningLog::new(),
    };
    match config.output_format {
        OutputFormat::Txt => {
            write_txt(run, &path)?;
            let instances = dir.join(format!("{stem}_instances.txt"));
            output.warnings = write_instances(run, &instances)?;
            output.paths.push(instances);
        }
        OutputFormat::Json => {
            let document = CatalogDocument {
                dataset: &config.dataset_name,
                genomes: run.store().len(),
                parameters: &config.discovery,
                families: run.families().iter().map(|f| FamilyRecord::new(f, run)).collect(),
                warnings: run.warnings().entries(),
            };
            let mut writer = BufWriter::new(File::create(&path)?);
            serde_json::to_writer_pretty(&mut writer, &document)?;
            writer.flush()?;
        }
    }

    for path in &output.paths {
        log::info!("Wrote {}", path.display());
    }
    Ok(output)
}

fn write_txt(run: &CsbRun, path: &Path) -> Result<()> {
    let mut out = BufWriter::new(File::create(path)?);
    writeln!(
        out,
        "Family_ID\tCSB_ID\tLength\tScore\tInstance_Count\tExact_Instance_Count\tMain_Category\tCSB"
    )?;
    for family in run.families() {
        for pattern in &family.patterns {
            let report = PatternReport::new(pattern, run.alphabet());
            writeln!(
                out,
                "{}\t{}\t{}\t{:.3}\t{}\t{}\t{}\t{}",
                family.id,
                report.id,
                report.length,
                report.score,
                report.instance_count,
                report.exact_instance_count,
                report.main_category.as_deref().unwrap_or("-"),
                report.pattern
            )?;
        }
    }
    out.flush()?;
    Ok(())
}

/// One block per pattern: a `>` header then `genome<TAB>instance;instance`.
/// Returns the warnings of every pattern whose instances were not all
/// resolved.
fn write_instances(run: &CsbRun, path: &Path) -> Result<WarningLog> {
    let mut out = BufWriter::new(File::create(path)?);
    let alphabet = run.alphabet();
    let mut warnings = WarningLog::new();
    for pattern in run.patterns() {
        writeln!(out, ">{}\t{}", pattern.id, alphabet.render(pattern.symbols()))?;
        let (by_genome, unresolved) = run.instances_by_genome(pattern);
        for (genome, instances) in by_genome {
            let rendered: Vec<String> = instances.iter().map(|i| alphabet.render(i)).collect();
            writeln!(out, "{genome}\t{}", rendered.join(";"))?;
        }
        warnings.extend(unresolved);
    }
    out.flush()?;
    Ok(warnings)
}
