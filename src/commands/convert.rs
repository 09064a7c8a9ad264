use crate::cli::LookupArgs;
use crate::indel::IndelConverter;
use crate::processor::{open_input, open_output, LineProcessor, ProcessingStats};
use crate::reference::{open_source, NoLookup, NucleotideSource};
use crate::types::{Notation, RecordFormat};
use crate::utils::progress_bar_builder::ProgressBarBuilder;
use anyhow::{Context, Result};
use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;
use std::sync::Arc;

#[allow(clippy::too_many_arguments)]
pub fn run(
    in_file: PathBuf,
    out_file: PathBuf,
    format: RecordFormat,
    to_dash: bool,
    threads: Option<usize>,
    summary: Option<PathBuf>,
    quiet: bool,
    lookup: LookupArgs,
) -> Result<ProcessingStats> {
    let config = lookup.load_config()?;
    let target = Notation::from_to_dash(to_dash);

    // Collapsing to dash notation never reads the reference, so the
    // backend is only opened when anchors are needed.
    let source: Arc<dyn NucleotideSource> = match target {
        Notation::NoDash => open_source(&lookup.settings(&config))?,
        Notation::Dash => Arc::new(NoLookup),
    };

    let input = open_input(&in_file)?;
    let mut output = open_output(&out_file)?;

    let progress = ProgressBarBuilder::new(format!("Converting {}", in_file.display()))
        .with_template("{spinner:.green} [{elapsed_precise}] {msg}")
        .with_tick()
        .hidden(quiet)
        .build()?;

    let processor = LineProcessor::new(IndelConverter::new(source, target), format)
        .with_threads(threads.unwrap_or(config.threads))
        .with_progress(progress);
    let stats = processor.run(input, &mut output)?;
    drop(output);

    println!("processed {} variants", stats.processed);
    log::info!(
        "{} converted, {} unchanged, {} without anchor base, {} passed through after errors",
        stats.converted,
        stats.unchanged,
        stats.fallbacks,
        stats.errors
    );

    if let Some(path) = summary {
        let file = File::create(&path)
            .with_context(|| format!("Failed to create summary file {}", path.display()))?;
        serde_json::to_writer_pretty(BufWriter::new(file), &stats)
            .with_context(|| format!("Failed to write summary file {}", path.display()))?;
    }

    Ok(stats)
}
