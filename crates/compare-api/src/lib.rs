//! Differential testing of two HTTP API endpoints.
//!
//! Traffic logs are read ([`logs`]), canonicalized ([`canonical`]) and
//! collapsed into a deduplicated testcase corpus ([`corpus`]). Each
//! testcase is replayed against both targets ([`executor`]), the response
//! pairs are compared ([`diff`]) and the outcomes aggregated into an ordered
//! report ([`report`]).

pub mod canonical;
pub mod config;
pub mod corpus;
pub mod diff;
pub mod error;
pub mod executor;
pub mod logs;
pub mod report;

pub use config::Config;
pub use corpus::{CaseId, CorpusBuilder, TestCase};
pub use diff::{Comparator, ComparisonResult};
pub use executor::{Executor, ResponseCapture, RunResult};
pub use report::{Report, Summary};
