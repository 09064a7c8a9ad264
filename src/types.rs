use crate::error::RecordError;
use std::fmt;

pub const PLACEHOLDER: &str = "-";
const LEGACY_PLACEHOLDER: &str = "*";

#[derive(clap::ValueEnum, Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum RecordFormat {
    /// chrom, start, end, ref, alt, ...
    #[value(name = "txt")]
    #[default]
    Txt,
    /// chrom, pos, id, ref, alt, ... (end derived from the ref length)
    #[value(name = "vcf")]
    Vcf,
}

/// Target notation of a run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Notation {
    /// Absent alleles written as `-`.
    Dash,
    /// Indels anchored on the preceding reference base, VCF style.
    NoDash,
}

impl Notation {
    pub fn from_to_dash(to_dash: bool) -> Self {
        if to_dash {
            Notation::Dash
        } else {
            Notation::NoDash
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Notation::Dash => "dash",
            Notation::NoDash => "no-dash",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariantRecord {
    pub chromosome: String,
    pub start: u64,
    pub end: u64,
    pub reference: String,
    pub alternate: String,
    pub trailing: Vec<String>,
}

impl VariantRecord {
    pub fn new(
        chromosome: impl Into<String>,
        start: u64,
        end: u64,
        reference: impl Into<String>,
        alternate: impl Into<String>,
    ) -> Self {
        Self {
            chromosome: chromosome.into(),
            start,
            end,
            reference: reference.into(),
            alternate: alternate.into(),
            trailing: Vec::new(),
        }
    }

    pub fn with_trailing(mut self, trailing: Vec<String>) -> Self {
        self.trailing = trailing;
        self
    }

    /// Parse one tab-separated data line. Header lines must be filtered
    /// out by the caller.
    pub fn parse(line: &str, format: RecordFormat) -> Result<Self, RecordError> {
        let cols: Vec<&str> = line.split('\t').collect();
        if cols.len() < 5 {
            return Err(RecordError::MissingColumns { found: cols.len() });
        }

        let reference = cols[3];
        let start = parse_coordinate("start", cols[1])?;
        let end = match format {
            RecordFormat::Txt => parse_coordinate("end", cols[2])?,
            RecordFormat::Vcf => vcf_end(start, reference)?,
        };

        Ok(VariantRecord {
            chromosome: cols[0].to_string(),
            start,
            end,
            reference: reference.to_string(),
            alternate: cols[4].to_string(),
            trailing: cols[5..].iter().map(|c| c.to_string()).collect(),
        })
    }

    /// Replace the legacy `*` placeholder with `-` in both alleles.
    pub fn normalize_placeholders(&mut self) {
        if self.reference == LEGACY_PLACEHOLDER {
            self.reference = PLACEHOLDER.to_string();
        }
        if self.alternate == LEGACY_PLACEHOLDER {
            self.alternate = PLACEHOLDER.to_string();
        }
    }
}

impl fmt::Display for VariantRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}\t{}\t{}\t{}\t{}",
            self.chromosome, self.start, self.end, self.reference, self.alternate
        )?;
        for field in &self.trailing {
            write!(f, "\t{}", field)?;
        }
        Ok(())
    }
}

/// Last base covered by `reference` when it starts at `start`.
fn vcf_end(start: u64, reference: &str) -> Result<u64, RecordError> {
    start
        .checked_add(reference.len() as u64)
        .map(|end| end.saturating_sub(1))
        .ok_or_else(|| RecordError::InvalidCoordinate {
            column: "end",
            value: format!("{}+{}", start, reference.len()),
        })
}

fn parse_coordinate(column: &'static str, value: &str) -> Result<u64, RecordError> {
    value
        .trim()
        .parse::<u64>()
        .map_err(|_| RecordError::InvalidCoordinate {
            column,
            value: value.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_txt_line_with_trailing_columns() {
        let rec = VariantRecord::parse("chr1\t13417\t13417\t-\tGAGA\tPASS\tx=1", RecordFormat::Txt)
            .unwrap();
        assert_eq!(rec.chromosome, "chr1");
        assert_eq!((rec.start, rec.end), (13417, 13417));
        assert_eq!(rec.reference, "-");
        assert_eq!(rec.alternate, "GAGA");
        assert_eq!(rec.trailing, vec!["PASS", "x=1"]);
    }

    #[test]
    fn vcf_end_is_derived_from_ref_length() {
        let rec = VariantRecord::parse("1\t10144\trs123\tTA\tT\t50", RecordFormat::Vcf).unwrap();
        assert_eq!((rec.start, rec.end), (10144, 10145));
        assert_eq!(rec.trailing, vec!["50"]);
    }

    #[test]
    fn vcf_mode_ignores_id_column() {
        let rec = VariantRecord::parse("1\t100\t.\tA\tG", RecordFormat::Vcf).unwrap();
        assert_eq!(rec.end, 100);
    }

    #[test]
    fn rejects_short_lines() {
        let err = VariantRecord::parse("chr1\t100\t100\tA", RecordFormat::Txt).unwrap_err();
        assert_eq!(err, RecordError::MissingColumns { found: 4 });
    }

    #[test]
    fn rejects_non_integer_coordinates() {
        let err = VariantRecord::parse("chr1\tabc\t100\tA\tG", RecordFormat::Txt).unwrap_err();
        assert!(matches!(err, RecordError::InvalidCoordinate { column: "start", .. }));

        let err = VariantRecord::parse("chr1\t100\t-5\tA\tG", RecordFormat::Txt).unwrap_err();
        assert!(matches!(err, RecordError::InvalidCoordinate { column: "end", .. }));
    }

    #[test]
    fn vcf_end_past_u64_is_an_error() {
        let err = VariantRecord::parse("chr1\t18446744073709551615\t.\tAA\tG", RecordFormat::Vcf)
            .unwrap_err();
        assert!(matches!(err, RecordError::InvalidCoordinate { column: "end", .. }));

        // A single base at the last representable position still fits.
        let rec = VariantRecord::parse("chr1\t18446744073709551614\t.\tA\tG", RecordFormat::Vcf)
            .unwrap();
        assert_eq!(rec.end, 18446744073709551614);
    }

    #[test]
    fn display_omits_tab_without_trailing_fields() {
        let rec = VariantRecord::new("chr1", 10144, 10145, "TA", "T");
        assert_eq!(rec.to_string(), "chr1\t10144\t10145\tTA\tT");

        let rec = rec.with_trailing(vec!["a".into(), "b".into()]);
        assert_eq!(rec.to_string(), "chr1\t10144\t10145\tTA\tT\ta\tb");
    }

    #[test]
    fn star_is_normalized_to_dash() {
        let mut rec = VariantRecord::new("chr1", 5, 5, "*", "*");
        rec.normalize_placeholders();
        assert_eq!(rec.reference, "-");
        assert_eq!(rec.alternate, "-");
    }
}
