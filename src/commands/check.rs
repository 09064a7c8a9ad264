use crate::cli::LookupArgs;
use crate::error::Unavailable;
use crate::reference::{lookup_contig, open_source, NucleotideSource};
use anyhow::{bail, Result};

/// Open the configured backend and ask it for the first base of chr1.
pub fn run(lookup: LookupArgs) -> Result<()> {
    let config = lookup.load_config()?;
    let source = open_source(&lookup.settings(&config))?;
    println!("Backend: {}", source.describe());
    println!("{}", probe(source.as_ref())?);
    Ok(())
}

/// An out-of-range answer still proves the backend responds; any other
/// failure means it does not.
fn probe(source: &dyn NucleotideSource) -> Result<String> {
    let contig = lookup_contig("1");
    match source.fetch(&contig, 1, 1) {
        Ok(base) => Ok(format!("{}:1 = {}", contig, base)),
        Err(e @ Unavailable::OutOfRange { .. }) => {
            Ok(format!("{}:1 not available ({}); backend is reachable", contig, e))
        }
        Err(e) => bail!("Backend did not answer: {}", e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reference::{MemorySource, NoLookup};

    #[test]
    fn base_or_missing_contig_counts_as_reachable() {
        let source = MemorySource::new().with_contig("chr1", "n");
        assert_eq!(probe(&source).unwrap(), "chr1:1 = N");

        let empty = MemorySource::new();
        assert!(probe(&empty).unwrap().contains("backend is reachable"));
    }

    #[test]
    fn backend_failures_are_errors() {
        let err = probe(&NoLookup).unwrap_err();
        assert!(err.to_string().contains("Backend did not answer"));
    }
}
