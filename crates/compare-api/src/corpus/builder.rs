//! Testcase corpus construction from log records.

use super::signature::{compute_signature, Signature};
use super::types::{CaseId, CaseKind, TestCase};
use crate::canonical::{filter_query, normalize_headers, NormalizedRequest, Query};
use crate::config::{Config, DedupConfig, DedupStrategy, FieldMapping, RequestIgnores};
use crate::diff::{parse_paths, JsonPath};
use crate::logs::{extract, LogRecord};
use std::collections::{BTreeMap, HashSet};
use tracing::{debug, info};

/// Turns log records into a deduplicated, deterministically ordered corpus.
#[derive(Debug, Clone)]
pub struct CorpusBuilder {
    mapping: FieldMapping,
    ignores: RequestIgnores,
    dedup: DedupConfig,
    body_ignores: Vec<JsonPath>,
}

impl CorpusBuilder {
    pub fn new(config: &Config) -> Self {
        Self {
            mapping: config.log_input.mapping.clone(),
            ignores: config.request_ignores.clone(),
            dedup: config.deduplication.clone(),
            body_ignores: parse_paths(&config.request_ignores.body_json_paths),
        }
    }

    /// Extract and canonicalize one record. `None` when the record has no
    /// usable request target.
    pub fn normalize(&self, record: &LogRecord) -> Option<NormalizedRequest> {
        let extracted = extract(record, &self.mapping)?;
        Some(NormalizedRequest {
            method: extracted.method,
            path: extracted.path,
            query: filter_query(&extracted.query, &self.ignores.query_params),
            headers: normalize_headers(&extracted.headers, &self.ignores.headers),
            body: extracted.body,
        })
    }

    pub fn signature(&self, request: &NormalizedRequest) -> Signature {
        compute_signature(request, &self.dedup, &self.body_ignores)
    }

    /// Build the corpus with the configured strategy.
    pub fn build(&self, records: &[LogRecord]) -> Vec<TestCase> {
        let requests: Vec<NormalizedRequest> =
            records.iter().filter_map(|r| self.normalize(r)).collect();
        let dropped = records.len() - requests.len();
        if dropped > 0 {
            debug!("Dropped {} records without a request target", dropped);
        }

        let cases = match self.dedup.strategy {
            DedupStrategy::PathGrouped => self.build_grouped(requests),
            DedupStrategy::MethodPathQuery | DedupStrategy::MethodPathOnly => {
                self.build_flat(requests)
            }
        };
        info!(
            "Built {} testcases from {} records ({:?})",
            cases.len(),
            records.len(),
            self.dedup.strategy
        );
        cases
    }

    /// First occurrence of each signature, in input order.
    fn unique(&self, requests: Vec<NormalizedRequest>) -> Vec<NormalizedRequest> {
        let mut seen: HashSet<Signature> = HashSet::new();
        requests
            .into_iter()
            .filter(|request| {
                let signature = self.signature(request);
                let fresh = seen.insert(signature.clone());
                if !fresh {
                    debug!("Skipping duplicate request {}", signature);
                }
                fresh
            })
            .collect()
    }

    fn build_flat(&self, requests: Vec<NormalizedRequest>) -> Vec<TestCase> {
        let mut unique = self.unique(requests);
        unique.sort_by(|a, b| (&a.method, &a.path).cmp(&(&b.method, &b.path)));
        unique
            .into_iter()
            .zip(1u64..)
            .map(|(request, id)| TestCase::from_request(CaseId::top(id), request))
            .collect()
    }

    fn build_grouped(&self, requests: Vec<NormalizedRequest>) -> Vec<TestCase> {
        let mut groups: BTreeMap<String, Vec<NormalizedRequest>> = BTreeMap::new();
        for request in requests {
            groups.entry(request.path.clone()).or_default().push(request);
        }

        groups
            .into_iter()
            .zip(1u64..)
            .filter_map(|((path, members), id)| {
                let members = self.unique(members);
                let first = members.first()?;
                let parent_id = CaseId::top(id);

                let mut parent = TestCase {
                    id: parent_id.clone(),
                    kind: Some(CaseKind::PathGroup),
                    method: first.method.clone(),
                    path,
                    query: Query::new(),
                    headers: first.headers.clone(),
                    body: None,
                    parent_id: None,
                    sub_cases: Vec::new(),
                };
                parent.sub_cases = members
                    .into_iter()
                    .zip(1u64..)
                    .map(|(request, k)| TestCase {
                        kind: Some(CaseKind::ParameterCombination),
                        parent_id: Some(id),
                        ..TestCase::from_request(parent_id.child(k), request)
                    })
                    .collect();
                Some(parent)
            })
            .collect()
    }
}
