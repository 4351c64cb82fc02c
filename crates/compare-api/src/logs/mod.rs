//! Traffic log ingestion.
//!
//! - `reader` - tolerant JSON / JSONL parsing into raw records
//! - `scanner` - brace-balanced recovery for concatenated objects
//! - `fields` - dotted-path field extraction into request parts

mod fields;
mod reader;
mod scanner;

pub use fields::{extract, first_present, resolve, ExtractedRequest};
pub use reader::{load_logs, read_logs, LogFormat, LogRecord};
pub use scanner::{object_spans, scan_objects};
