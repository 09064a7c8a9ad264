use crate::error::RecordError;
use crate::types::{Notation, PLACEHOLDER};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VariantClass {
    Snv,
    /// Unequal-length substitution with no placeholder; left as is.
    PassThrough,
    Insertion,
    Deletion,
}

impl VariantClass {
    pub fn name(&self) -> &'static str {
        match self {
            VariantClass::Snv => "SNV",
            VariantClass::PassThrough => "pass-through",
            VariantClass::Insertion => "insertion",
            VariantClass::Deletion => "deletion",
        }
    }
}

/// Decide which rewrite applies. Alleles must already have `*` replaced
/// by `-`. The first matching row wins, in the order below.
pub fn classify(reference: &str, alternate: &str, target: Notation) -> Result<VariantClass, RecordError> {
    let ref_dash = reference == PLACEHOLDER;
    let alt_dash = alternate == PLACEHOLDER;
    let (ref_len, alt_len) = (reference.len(), alternate.len());

    let class = match target {
        // Input may carry '-'
        Notation::NoDash => {
            if ref_len != alt_len && !ref_dash && !alt_dash {
                Some(VariantClass::PassThrough)
            } else if !ref_dash && !alt_dash && ref_len == 1 && alt_len == 1 {
                Some(VariantClass::Snv)
            } else if ref_dash {
                Some(VariantClass::Insertion)
            } else if alt_dash {
                Some(VariantClass::Deletion)
            } else {
                None
            }
        }
        // Input is anchored, no '-'
        Notation::Dash => {
            if ref_len == 1 && alt_len == 1 {
                Some(VariantClass::Snv)
            } else if ref_len < alt_len {
                Some(VariantClass::Insertion)
            } else if ref_len > alt_len {
                Some(VariantClass::Deletion)
            } else {
                None
            }
        }
    };

    class.ok_or_else(|| RecordError::Unclassifiable {
        reference: reference.to_string(),
        alternate: alternate.to_string(),
        target: target.name(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dash_input_classes() {
        let c = |r, a| classify(r, a, Notation::NoDash);
        assert_eq!(c("A", "G"), Ok(VariantClass::Snv));
        assert_eq!(c("-", "GAGA"), Ok(VariantClass::Insertion));
        assert_eq!(c("A", "-"), Ok(VariantClass::Deletion));
        assert_eq!(c("AC", "-"), Ok(VariantClass::Deletion));
        assert_eq!(c("ACG", "T"), Ok(VariantClass::PassThrough));
        assert_eq!(c("T", "TA"), Ok(VariantClass::PassThrough));
    }

    #[test]
    fn equal_length_multibase_without_dash_is_unclassifiable() {
        let err = classify("AC", "GT", Notation::NoDash).unwrap_err();
        assert!(matches!(err, RecordError::Unclassifiable { target: "no-dash", .. }));
    }

    #[test]
    fn anchored_input_classes() {
        let c = |r, a| classify(r, a, Notation::Dash);
        assert_eq!(c("A", "G"), Ok(VariantClass::Snv));
        assert_eq!(c("C", "CGAGA"), Ok(VariantClass::Insertion));
        assert_eq!(c("TA", "T"), Ok(VariantClass::Deletion));
    }

    #[test]
    fn equal_length_multibase_to_dash_is_unclassifiable() {
        let err = classify("AC", "GT", Notation::Dash).unwrap_err();
        assert_eq!(
            err,
            RecordError::Unclassifiable {
                reference: "AC".to_string(),
                alternate: "GT".to_string(),
                target: "dash",
            }
        );
    }
}
