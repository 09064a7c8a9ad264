use super::samtools::check_indexed_reference;
use super::{check_region, NucleotideSource};
use crate::error::Unavailable;
use anyhow::{anyhow, Result};
use bio::io::fasta::IndexedReader;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// In-process lookups against a `.fai` indexed FASTA.
pub struct FastaSource {
    path: PathBuf,
    reader: Mutex<IndexedReader<File>>,
}

impl FastaSource {
    pub fn open(path: &Path) -> Result<Self> {
        check_indexed_reference(path)?;
        let reader = IndexedReader::from_file(&path)
            .map_err(|e| anyhow!("Failed to open indexed FASTA {}: {}", path.display(), e))?;
        Ok(FastaSource {
            path: path.to_path_buf(),
            reader: Mutex::new(reader),
        })
    }
}

impl NucleotideSource for FastaSource {
    fn fetch(&self, contig: &str, start: u64, end: u64) -> Result<String, Unavailable> {
        check_region(contig, start, end)?;
        let out_of_range = || Unavailable::OutOfRange {
            contig: contig.to_string(),
            start,
            end,
        };

        let mut reader = self
            .reader
            .lock()
            .map_err(|_| Unavailable::Backend("FASTA reader lock poisoned".to_string()))?;
        // bio takes 0-based half-open intervals
        reader
            .fetch(contig, start - 1, end)
            .map_err(|e| Unavailable::Backend(e.to_string()))?;
        let mut seq = Vec::new();
        reader.read(&mut seq).map_err(|_| out_of_range())?;

        if seq.len() as u64 != end - start + 1 {
            return Err(out_of_range());
        }
        Ok(String::from_utf8_lossy(&seq).to_uppercase())
    }

    fn describe(&self) -> String {
        format!("indexed FASTA {}", self.path.display())
    }
}
