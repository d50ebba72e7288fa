//! Certificate-of-incorporation (COI) extraction pipeline.
//!
//! A COI names a company's preferred stock series and the economic terms
//! attached to each one. The pipeline runs two LLM passes per field category
//! (a raw extract quoting the document, then a precise extract normalizing it
//! to JSON), aligns the differently-formatted series labels those passes
//! produce, and assembles one row per series.
//!
//! # The alignment problem
//!
//! Each category's JSON keys spell series names its own way: one pass says
//! "Series B Preferred Stock", another "Series B". The [`series`] module
//! reduces every label to a canonical token ("B", "A-1", "Seed") and joins
//! rows on token equality. This is the only non-trivial logic in the crate;
//! everything else is prompting and bookkeeping.
//!
//! # Modules
//!
//! - [`series`] - canonical tokens and reference/mapping alignment
//! - [`templates`] - per-category extraction prompts
//! - [`fields`] - registry mapping table columns to category JSON keys
//! - [`extract`] - the two-pass extraction pipeline
//! - [`transform`] - alignment-driven table assembly and CSV output
//! - [`store`] - document storage trait with memory and filesystem backends

pub mod error;
pub mod extract;
pub mod fields;
pub mod series;
pub mod store;
pub mod templates;
pub mod transform;

pub use error::{CoiError, Result};
pub use extract::{CategoryOutput, CoiExtractor, ExtractionManifest};
pub use fields::{Category, OtherField, PreciseField, SupportField};
pub use series::{align_series, canonical_token};
pub use store::{DocumentStore, FsStore, MemoryStore};
pub use transform::{
    build_tables, write_main_csv, write_other_csv, write_support_csv, CellValue, CoiTables,
    OtherValue, SeriesRow, SupportRow, MAIN_COLUMNS, NOT_FOUND,
};
