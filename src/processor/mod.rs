pub mod threading;

use crate::indel::{IndelConverter, Outcome};
use crate::types::{RecordFormat, VariantRecord};
use anyhow::{Context, Result};
use indicatif::ProgressBar;
use serde::Serialize;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;
use threading::WorkerPool;

const PROGRESS_EVERY: u64 = 10_000;
const LINES_PER_WORKER: usize = 1024;

/// Counters for one run. `processed` counts every non-header line,
/// including the ones that failed and were written back unchanged.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct ProcessingStats {
    pub processed: u64,
    pub converted: u64,
    pub unchanged: u64,
    pub fallbacks: u64,
    pub errors: u64,
    pub headers: u64,
}

impl ProcessingStats {
    fn record(&mut self, kind: LineKind) {
        match kind {
            LineKind::Header => {
                self.headers += 1;
                return;
            }
            LineKind::Converted => self.converted += 1,
            LineKind::Unchanged => self.unchanged += 1,
            LineKind::Fallback => self.fallbacks += 1,
            LineKind::Failed => self.errors += 1,
        }
        self.processed += 1;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    Header,
    Converted,
    Unchanged,
    Fallback,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessedLine {
    /// Line content without its terminator.
    pub bytes: Vec<u8>,
    pub kind: LineKind,
}

impl ProcessedLine {
    fn verbatim(line: &[u8], kind: LineKind) -> Self {
        ProcessedLine {
            bytes: line.to_vec(),
            kind,
        }
    }
}

/// Convert a single input line (without its terminator). Never fails:
/// header lines and records that cannot be decoded, parsed or converted
/// come back verbatim.
pub fn process_line(
    converter: &IndelConverter,
    format: RecordFormat,
    line_no: u64,
    line: &[u8],
) -> ProcessedLine {
    if line.starts_with(b"#") {
        return ProcessedLine::verbatim(line, LineKind::Header);
    }

    let text = match std::str::from_utf8(line) {
        Ok(text) => text,
        Err(e) => {
            log::warn!("line {}: not valid UTF-8 ({}); written unchanged", line_no, e);
            return ProcessedLine::verbatim(line, LineKind::Failed);
        }
    };

    // A panic while converting one record must not take a worker thread
    // (and with it the whole run) down.
    let converted = panic::catch_unwind(AssertUnwindSafe(|| {
        VariantRecord::parse(text, format).and_then(|record| converter.convert(record))
    }));
    match converted {
        Ok(Ok(conversion)) => {
            let kind = match conversion.outcome {
                Outcome::Rewritten => LineKind::Converted,
                Outcome::Unchanged => LineKind::Unchanged,
                Outcome::Fallback(_) => LineKind::Fallback,
            };
            ProcessedLine {
                bytes: conversion.record.to_string().into_bytes(),
                kind,
            }
        }
        Ok(Err(e)) => {
            log::warn!("line {}: {}; written unchanged", line_no, e);
            ProcessedLine::verbatim(line, LineKind::Failed)
        }
        Err(_) => {
            log::error!("line {}: conversion panicked; written unchanged", line_no);
            ProcessedLine::verbatim(line, LineKind::Failed)
        }
    }
}

/// One raw input line split from its terminator (`\n`, `\r\n`, or
/// nothing on an unterminated last line).
struct RawLine {
    content: Vec<u8>,
    ending: &'static [u8],
}

fn read_raw_line<R: BufRead>(input: &mut R, line_no: u64) -> Result<Option<RawLine>> {
    let mut buf = Vec::new();
    let read = input
        .read_until(b'\n', &mut buf)
        .with_context(|| format!("Failed to read input line {}", line_no))?;
    if read == 0 {
        return Ok(None);
    }
    let ending: &'static [u8] = if buf.ends_with(b"\r\n") {
        b"\r\n"
    } else if buf.ends_with(b"\n") {
        b"\n"
    } else {
        b""
    };
    buf.truncate(buf.len() - ending.len());
    Ok(Some(RawLine {
        content: buf,
        ending,
    }))
}

/// Drives a whole file through an [`IndelConverter`], preserving line order
/// and line endings.
pub struct LineProcessor {
    converter: IndelConverter,
    format: RecordFormat,
    threads: usize,
    progress: ProgressBar,
}

impl LineProcessor {
    pub fn new(converter: IndelConverter, format: RecordFormat) -> Self {
        Self {
            converter,
            format,
            threads: 1,
            progress: ProgressBar::hidden(),
        }
    }

    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = threads.max(1);
        self
    }

    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = progress;
        self
    }

    pub fn run<R: BufRead, W: Write>(&self, input: R, output: &mut W) -> Result<ProcessingStats> {
        let stats = if self.threads > 1 {
            self.run_parallel(input, output)?
        } else {
            self.run_sequential(input, output)?
        };
        output.flush().context("Failed to flush output")?;
        self.progress
            .finish_with_message(format!("Processed {} records", stats.processed));
        Ok(stats)
    }

    fn run_sequential<R: BufRead, W: Write>(&self, mut input: R, output: &mut W) -> Result<ProcessingStats> {
        let mut stats = ProcessingStats::default();
        let mut line_no = 0u64;
        while let Some(line) = read_raw_line(&mut input, line_no + 1)? {
            line_no += 1;
            let processed = process_line(&self.converter, self.format, line_no, &line.content);
            self.emit(output, &processed, line.ending, &mut stats)?;
        }
        Ok(stats)
    }

    fn run_parallel<R: BufRead, W: Write>(&self, mut input: R, output: &mut W) -> Result<ProcessingStats> {
        let batch_size = self.threads * LINES_PER_WORKER;
        let pool = WorkerPool::new(&self.converter, self.format, self.threads, batch_size);
        let mut stats = ProcessingStats::default();
        let mut batch = Vec::with_capacity(batch_size);
        let mut endings = Vec::with_capacity(batch_size);
        let mut line_no = 0u64;

        while let Some(line) = read_raw_line(&mut input, line_no + 1)? {
            line_no += 1;
            batch.push((line_no, line.content));
            endings.push(line.ending);
            if batch.len() == batch_size {
                let processed = pool.process_batch(std::mem::take(&mut batch))?;
                for (line, ending) in processed.iter().zip(endings.drain(..)) {
                    self.emit(output, line, ending, &mut stats)?;
                }
            }
        }
        let processed = pool.process_batch(batch)?;
        for (line, ending) in processed.iter().zip(endings.drain(..)) {
            self.emit(output, line, ending, &mut stats)?;
        }
        pool.finish()?;
        Ok(stats)
    }

    fn emit<W: Write>(
        &self,
        output: &mut W,
        processed: &ProcessedLine,
        ending: &[u8],
        stats: &mut ProcessingStats,
    ) -> Result<()> {
        output
            .write_all(&processed.bytes)
            .and_then(|_| output.write_all(ending))
            .context("Failed to write output")?;
        stats.record(processed.kind);
        if processed.kind != LineKind::Header && stats.processed % PROGRESS_EVERY == 0 {
            self.progress
                .set_message(format!("Processed {} records", stats.processed));
        }
        Ok(())
    }
}

/// Open an input file, transparently decompressing gzip, bzip2, xz or zstd.
pub fn open_input(path: &Path) -> Result<Box<dyn BufRead>> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open input file {}", path.display()))?;
    let (reader, _compression) = niffler::get_reader(Box::new(file))
        .with_context(|| format!("Failed to create decompressor for {}", path.display()))?;
    Ok(Box::new(BufReader::new(reader)))
}

/// Create the output file; a `.gz` suffix selects gzip compression.
pub fn open_output(path: &Path) -> Result<Box<dyn Write>> {
    let file = File::create(path)
        .with_context(|| format!("Failed to create output file {}", path.display()))?;
    let gzipped = path.extension().map_or(false, |ext| ext == "gz");
    if gzipped {
        let writer = niffler::get_writer(
            Box::new(file),
            niffler::compression::Format::Gzip,
            niffler::Level::Six,
        )
        .with_context(|| format!("Failed to create compressor for {}", path.display()))?;
        Ok(Box::new(BufWriter::new(writer)))
    } else {
        Ok(Box::new(BufWriter::new(file)))
    }
}
