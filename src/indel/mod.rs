pub mod classify;

pub use classify::{classify, VariantClass};

use crate::error::{RecordError, Unavailable};
use crate::reference::{lookup_contig, NucleotideSource};
use crate::types::{Notation, VariantRecord, PLACEHOLDER};
use std::sync::Arc;

/// What happened to a record during conversion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// SNV or pass-through, returned as read.
    Unchanged,
    /// Coordinates and alleles were rewritten.
    Rewritten,
    /// An expand rule could not get its anchor base; record returned as read.
    Fallback(Unavailable),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conversion {
    pub record: VariantRecord,
    pub class: VariantClass,
    pub outcome: Outcome,
}

/// Rewrites records between dash and anchored (no-dash) notation.
///
/// Holds a shared handle to the reference; cloning is cheap, so each
/// worker thread gets its own converter.
#[derive(Clone)]
pub struct IndelConverter {
    source: Arc<dyn NucleotideSource>,
    target: Notation,
}

impl IndelConverter {
    pub fn new(source: Arc<dyn NucleotideSource>, target: Notation) -> Self {
        Self { source, target }
    }

    /// Convert one record. Only the expand rules (dash to no-dash indels)
    /// query the reference, once each.
    pub fn convert(&self, mut record: VariantRecord) -> Result<Conversion, RecordError> {
        record.normalize_placeholders();
        let class = classify(&record.reference, &record.alternate, self.target)?;

        let conversion = match (class, self.target) {
            (VariantClass::Snv, _) | (VariantClass::PassThrough, _) => Conversion {
                record,
                class,
                outcome: Outcome::Unchanged,
            },
            (VariantClass::Insertion, Notation::NoDash) => self.expand_insertion(record),
            (VariantClass::Deletion, Notation::NoDash) => self.expand_deletion(record),
            (VariantClass::Insertion, Notation::Dash) => collapse_insertion(record),
            (VariantClass::Deletion, Notation::Dash) => collapse_deletion(record)?,
        };
        Ok(conversion)
    }

    /// `chr1 13417 13417 - GAGA` -> `chr1 13417 13417 C CGAGA`
    fn expand_insertion(&self, mut record: VariantRecord) -> Conversion {
        let class = VariantClass::Insertion;
        let contig = lookup_contig(&record.chromosome);
        match self.source.fetch(&contig, record.start, record.start) {
            Ok(base) => {
                record.alternate = format!("{}{}", base, record.alternate);
                record.reference = base;
                Conversion {
                    record,
                    class,
                    outcome: Outcome::Rewritten,
                }
            }
            Err(e) => fallback(record, class, e),
        }
    }

    /// `chr1 10145 10145 A -` -> `chr1 10144 10145 TA T`
    fn expand_deletion(&self, mut record: VariantRecord) -> Conversion {
        let class = VariantClass::Deletion;
        let contig = lookup_contig(&record.chromosome);
        if record.start < 2 {
            // No base precedes position 1.
            let e = Unavailable::OutOfRange {
                contig,
                start: record.start.saturating_sub(1),
                end: record.start.saturating_sub(1),
            };
            return fallback(record, class, e);
        }

        let anchor = record.start - 1;
        match self.source.fetch(&contig, anchor, anchor) {
            Ok(base) => {
                record.start = anchor;
                record.reference = format!("{}{}", base, record.reference);
                record.alternate = base;
                Conversion {
                    record,
                    class,
                    outcome: Outcome::Rewritten,
                }
            }
            Err(e) => fallback(record, class, e),
        }
    }
}

/// `chr1 13417 13417 C CGAGA` -> `chr1 13417 13417 - GAGA`
fn collapse_insertion(mut record: VariantRecord) -> Conversion {
    record.reference = PLACEHOLDER.to_string();
    record.alternate = drop_first(&record.alternate);
    Conversion {
        record,
        class: VariantClass::Insertion,
        outcome: Outcome::Rewritten,
    }
}

/// `chr1 10144 10145 TA T` -> `chr1 10145 10145 A -`
fn collapse_deletion(mut record: VariantRecord) -> Result<Conversion, RecordError> {
    record.start = record
        .start
        .checked_add(1)
        .ok_or_else(|| RecordError::InvalidCoordinate {
            column: "start",
            value: record.start.to_string(),
        })?;
    record.reference = drop_first(&record.reference);
    record.alternate = PLACEHOLDER.to_string();
    Ok(Conversion {
        record,
        class: VariantClass::Deletion,
        outcome: Outcome::Rewritten,
    })
}

fn fallback(record: VariantRecord, class: VariantClass, reason: Unavailable) -> Conversion {
    log::debug!(
        "No anchor base for {} at {}:{}, keeping record: {}",
        class.name(),
        record.chromosome,
        record.start,
        reason
    );
    Conversion {
        record,
        class,
        outcome: Outcome::Fallback(reason),
    }
}

fn drop_first(allele: &str) -> String {
    let mut chars = allele.chars();
    chars.next();
    chars.as_str().to_string()
}
