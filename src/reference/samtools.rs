use super::{check_region, parse_faidx_response, region_string, NucleotideSource};
use crate::error::Unavailable;
use crate::utils::external_tools::{check_samtools, run_with_timeout};
use anyhow::Result;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Duration;

/// `samtools faidx <reference> <region>` as a local process, one per query.
#[derive(Debug, Clone)]
pub struct SamtoolsSource {
    samtools: String,
    reference: PathBuf,
    timeout: Duration,
}

impl SamtoolsSource {
    pub fn new(samtools: impl Into<String>, reference: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            samtools: samtools.into(),
            reference: reference.into(),
            timeout,
        }
    }

    /// Build the source after checking that samtools runs and the
    /// reference is indexed.
    pub fn open(samtools: &str, reference: &Path, timeout: Duration) -> Result<Self> {
        check_samtools(samtools)?;
        check_indexed_reference(reference)?;
        Ok(Self::new(samtools, reference, timeout))
    }
}

impl NucleotideSource for SamtoolsSource {
    fn fetch(&self, contig: &str, start: u64, end: u64) -> Result<String, Unavailable> {
        check_region(contig, start, end)?;
        let mut cmd = Command::new(&self.samtools);
        cmd.arg("faidx")
            .arg(&self.reference)
            .arg(region_string(contig, start, end));
        let output = run_with_timeout(&mut cmd, self.timeout)?;
        parse_faidx_response(&output.stdout, &output.stderr)
    }

    fn describe(&self) -> String {
        format!("{} faidx {}", self.samtools, self.reference.display())
    }
}

pub(crate) fn check_indexed_reference(reference: &Path) -> Result<()> {
    if !reference.exists() {
        anyhow::bail!("Reference FASTA not found at {}", reference.display());
    }
    let fai_path = format!("{}.fai", reference.display());
    if !Path::new(&fai_path).exists() {
        anyhow::bail!(
            "Reference FASTA index not found at {}. \
            Please run 'samtools faidx {}' first",
            fai_path,
            reference.display()
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn missing_index_is_a_setup_error() {
        let dir = tempdir().unwrap();
        let fasta = dir.path().join("ref.fa");
        fs::write(&fasta, ">chr1\nACGT\n").unwrap();
        let err = check_indexed_reference(&fasta).unwrap_err();
        assert!(err.to_string().contains("samtools faidx"));

        fs::write(dir.path().join("ref.fa.fai"), "chr1\t4\t6\t4\t5\n").unwrap();
        assert!(check_indexed_reference(&fasta).is_ok());
    }

    #[test]
    fn missing_binary_is_unavailable_not_a_panic() {
        let source = SamtoolsSource::new(
            "/nonexistent/samtools-binary",
            "/nonexistent/ref.fa",
            Duration::from_secs(1),
        );
        let err = source.fetch("chr1", 1, 1).unwrap_err();
        assert!(matches!(err, Unavailable::SpawnFailed(_)));
    }

    #[test]
    fn invalid_region_skips_the_query() {
        let source = SamtoolsSource::new(
            "/nonexistent/samtools-binary",
            "/nonexistent/ref.fa",
            Duration::from_secs(1),
        );
        let err = source.fetch("chr1", 0, 0).unwrap_err();
        assert!(matches!(err, Unavailable::OutOfRange { .. }));
    }

    // Needs samtools on PATH. Run with:
    //   cargo test samtools_fetches_single_base -- --ignored
    #[test]
    #[ignore]
    fn samtools_fetches_single_base() {
        let dir = tempdir().unwrap();
        let fasta = dir.path().join("ref.fa");
        fs::write(&fasta, ">chr1\nacgtACGT\n").unwrap();
        std::process::Command::new("samtools")
            .arg("faidx")
            .arg(&fasta)
            .status()
            .expect("samtools faidx");

        let source = SamtoolsSource::open("samtools", &fasta, Duration::from_secs(10)).unwrap();
        assert_eq!(source.fetch("chr1", 2, 2).unwrap(), "C");
        assert_eq!(source.fetch("chr1", 4, 6).unwrap(), "TAC");
        assert!(source.fetch("chr2", 1, 1).is_err());
    }
}
