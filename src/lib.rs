pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod indel;
pub mod processor;
pub mod reference;
pub mod types;
pub mod utils;

pub use error::{RecordError, Unavailable};
pub use indel::{Conversion, IndelConverter, Outcome, VariantClass};
pub use reference::{lookup_contig, NucleotideSource};
pub use types::{Notation, RecordFormat, VariantRecord};
