use super::{check_region, NucleotideSource};
use crate::error::Unavailable;
use std::collections::HashMap;
use std::sync::Mutex;

/// Contigs held in memory. Records every query it receives, which makes
/// it the source of choice in tests.
#[derive(Debug, Default)]
pub struct MemorySource {
    contigs: HashMap<String, String>,
    queries: Mutex<Vec<(String, u64, u64)>>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_contig(mut self, name: impl Into<String>, sequence: impl Into<String>) -> Self {
        self.contigs.insert(name.into(), sequence.into());
        self
    }

    /// Every `(contig, start, end)` asked for so far, in call order.
    pub fn queries(&self) -> Vec<(String, u64, u64)> {
        self.queries
            .lock()
            .map(|q| q.clone())
            .unwrap_or_default()
    }

    pub fn query_count(&self) -> usize {
        self.queries.lock().map(|q| q.len()).unwrap_or(0)
    }
}

impl NucleotideSource for MemorySource {
    fn fetch(&self, contig: &str, start: u64, end: u64) -> Result<String, Unavailable> {
        if let Ok(mut queries) = self.queries.lock() {
            queries.push((contig.to_string(), start, end));
        }
        check_region(contig, start, end)?;
        let out_of_range = || Unavailable::OutOfRange {
            contig: contig.to_string(),
            start,
            end,
        };
        let sequence = self.contigs.get(contig).ok_or_else(out_of_range)?;
        sequence
            .get((start - 1) as usize..end as usize)
            .map(|s| s.to_uppercase())
            .ok_or_else(out_of_range)
    }

    fn describe(&self) -> String {
        format!("in-memory reference ({} contigs)", self.contigs.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serves_one_based_inclusive_regions() {
        let source = MemorySource::new().with_contig("chr1", "acgtn");
        assert_eq!(source.fetch("chr1", 1, 1).unwrap(), "A");
        assert_eq!(source.fetch("chr1", 2, 4).unwrap(), "CGT");
        assert_eq!(source.fetch("chr1", 5, 5).unwrap(), "N");
        assert!(source.fetch("chr1", 6, 6).is_err());
        assert!(source.fetch("chr2", 1, 1).is_err());
        assert_eq!(source.query_count(), 5);
    }
}
