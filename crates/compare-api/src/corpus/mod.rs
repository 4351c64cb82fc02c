//! Deduplicated testcase corpus: signatures, strategies and persistence.

mod builder;
mod signature;
mod store;
mod types;

pub use builder::CorpusBuilder;
pub use signature::{compute_signature, Signature};
pub use store::{load_testcases, read_json, save_testcases, write_json};
pub use types::{CaseId, CaseKind, TestCase};
