pub mod container;
pub mod fasta;
pub mod memory;
pub mod samtools;

use crate::error::Unavailable;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

pub use container::ContainerSource;
pub use fasta::FastaSource;
pub use memory::MemorySource;
pub use samtools::SamtoolsSource;

/// Anything that can answer "which bases are at this region".
///
/// Coordinates are 1-based and inclusive. Callers pass the contig name
/// already normalized with [`lookup_contig`].
pub trait NucleotideSource: Send + Sync {
    /// Return the uppercased sequence of `contig:start-end`.
    fn fetch(&self, contig: &str, start: u64, end: u64) -> Result<String, Unavailable>;

    /// Short human readable description for logs.
    fn describe(&self) -> String;
}

#[derive(clap::ValueEnum, Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// Run `samtools faidx` as a local process
    #[value(name = "samtools")]
    #[default]
    Samtools,
    /// Run `samtools faidx` inside a docker container
    #[value(name = "container")]
    Container,
    /// Read the indexed FASTA in-process
    #[value(name = "fasta")]
    Fasta,
}

/// Everything needed to open a [`NucleotideSource`].
#[derive(Debug, Clone)]
pub struct LookupSettings {
    pub backend: Backend,
    pub reference: PathBuf,
    pub samtools: String,
    pub docker: String,
    pub image: String,
    pub container: Option<String>,
    pub timeout: Duration,
}

/// Open and probe the configured backend. Failing here is a setup error,
/// unlike [`Unavailable`] which is per query.
pub fn open_source(settings: &LookupSettings) -> Result<Arc<dyn NucleotideSource>> {
    let source: Arc<dyn NucleotideSource> = match settings.backend {
        Backend::Samtools => Arc::new(SamtoolsSource::open(
            &settings.samtools,
            &settings.reference,
            settings.timeout,
        )?),
        Backend::Container => {
            let source = match &settings.container {
                Some(name) => ContainerSource::attach(
                    &settings.docker,
                    name,
                    &settings.samtools,
                    &settings.reference,
                    settings.timeout,
                )?,
                None => ContainerSource::start(
                    &settings.docker,
                    &settings.image,
                    &settings.samtools,
                    &settings.reference,
                    settings.timeout,
                )?,
            };
            Arc::new(source)
        }
        Backend::Fasta => Arc::new(FastaSource::open(&settings.reference)?),
    };
    log::info!("Reference lookups via {}", source.describe());
    Ok(source)
}

/// Source for runs that never look anything up (collapsing to dash
/// notation). Every query is unavailable.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoLookup;

impl NucleotideSource for NoLookup {
    fn fetch(&self, contig: &str, start: u64, end: u64) -> Result<String, Unavailable> {
        Err(Unavailable::Backend(format!(
            "no reference configured for {}",
            region_string(contig, start, end)
        )))
    }

    fn describe(&self) -> String {
        "no reference".to_string()
    }
}

/// Contig name as presented to the reference: always `chr`-prefixed, and
/// the mitochondrial contig is `chrM`.
pub fn lookup_contig(chromosome: &str) -> String {
    let contig = if chromosome.starts_with("chr") {
        chromosome.to_string()
    } else {
        format!("chr{}", chromosome)
    };
    if contig == "chrMT" {
        "chrM".to_string()
    } else {
        contig
    }
}

pub(crate) fn check_region(contig: &str, start: u64, end: u64) -> Result<(), Unavailable> {
    if start == 0 || start > end {
        return Err(Unavailable::OutOfRange {
            contig: contig.to_string(),
            start,
            end,
        });
    }
    Ok(())
}

/// `samtools faidx` style region string.
pub(crate) fn region_string(contig: &str, start: u64, end: u64) -> String {
    format!("{}:{}-{}", contig, start, end)
}

/// A faidx answer is `>header` followed by a single sequence line.
/// Anything else, including wrapped multi-line output, is unavailable.
pub(crate) fn parse_faidx_response(stdout: &[u8], stderr: &[u8]) -> Result<String, Unavailable> {
    let text = String::from_utf8_lossy(stdout);
    let tokens: Vec<&str> = text.split_whitespace().collect();
    if tokens.len() == 2 {
        return Ok(tokens[1].to_uppercase());
    }
    let stderr = String::from_utf8_lossy(stderr);
    Err(Unavailable::Unparseable(format!(
        "expected 2 tokens, got {}{}",
        tokens.len(),
        if stderr.trim().is_empty() {
            String::new()
        } else {
            format!(" ({})", stderr.trim())
        }
    )))
}
