//! Country-report normalization: raw field text in, ordered documents out.
//!
//! Primitives (`text`, `numbers`, `map`, `lists`, `series`) turn one field's
//! text into a typed value. `fields` runs a table of them against a page,
//! `catalog` holds the tables, and `sections` assembles the page document.

pub mod catalog;
pub mod document;
pub mod error;
pub mod fields;
pub mod lists;
pub mod map;
pub mod metrics;
pub mod numbers;
pub mod sections;
pub mod series;
pub mod text;

pub use document::{Document, Value};
pub use error::{ExtractError, Extracted};
pub use fields::FieldSource;
pub use metrics::ExtractionReport;
pub use sections::{parse_page, ParsedPage};
