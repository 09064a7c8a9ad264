use crate::cli::LookupArgs;
use crate::reference::{lookup_contig, open_source};
use anyhow::{anyhow, Result};

#[derive(Debug, PartialEq, Eq)]
struct Region {
    contig: String,
    start: u64,
    end: u64,
}

/// `chr1:100-200`, or `chr1:100` for a single base.
fn parse_region(region: &str) -> Result<Region> {
    let (contig, span) = region
        .rsplit_once(':')
        .ok_or_else(|| anyhow!("Region '{}' is not contig:start[-end]", region))?;
    let span = span.replace(',', "");
    let (start, end) = match span.split_once('-') {
        Some((s, e)) => (s.parse::<u64>()?, e.parse::<u64>()?),
        None => {
            let pos = span.parse::<u64>()?;
            (pos, pos)
        }
    };
    if contig.is_empty() || start == 0 || start > end {
        anyhow::bail!("Region '{}' is empty or not 1-based", region);
    }
    Ok(Region {
        contig: lookup_contig(contig),
        start,
        end,
    })
}

pub fn run(regions: Vec<String>, lookup: LookupArgs) -> Result<()> {
    let config = lookup.load_config()?;
    let source = open_source(&lookup.settings(&config))?;

    let mut missing = 0;
    for raw in &regions {
        let region = parse_region(raw)?;
        match source.fetch(&region.contig, region.start, region.end) {
            Ok(seq) => println!(">{}:{}-{}\n{}", region.contig, region.start, region.end, seq),
            Err(e) => {
                log::warn!("{}: {}", raw, e);
                missing += 1;
            }
        }
    }
    if missing > 0 {
        anyhow::bail!("{} of {} regions were not available", missing, regions.len());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_ranges_and_single_positions() {
        assert_eq!(
            parse_region("1:10,144-10,145").unwrap(),
            Region { contig: "chr1".into(), start: 10144, end: 10145 }
        );
        assert_eq!(
            parse_region("MT:16").unwrap(),
            Region { contig: "chrM".into(), start: 16, end: 16 }
        );
    }

    #[test]
    fn rejects_malformed_regions() {
        assert!(parse_region("chr1").is_err());
        assert!(parse_region("chr1:0").is_err());
        assert!(parse_region("chr1:20-10").is_err());
        assert!(parse_region("chr1:a-b").is_err());
        assert!(parse_region(":5").is_err());
    }
}
