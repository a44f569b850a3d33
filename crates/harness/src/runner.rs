use std::{collections::HashSet, sync::Arc};

use ethprobe_types::{RpcMethod, RpcResult, Status};
use serde::Serialize;
use tracing::{info, warn};

use crate::{
    context::TestContext,
    probe::{Probe, resolve},
    probes,
};

/// Walks a fixed list of probes against one context.
///
/// A failing probe never stops the run: its Error verdict is reported and the next probe
/// starts. Verdicts proven implicitly along the way (as a prerequisite of another probe) are
/// reported as well.
pub struct Runner {
    probes: Vec<Box<dyn Probe>>,
}

impl Default for Runner {
    fn default() -> Self {
        Self::new()
    }
}

impl Runner {
    /// The full catalogue, in its canonical order.
    pub fn new() -> Self {
        Self::with_probes(probes::sequence())
    }

    pub fn with_probes(probes: Vec<Box<dyn Probe>>) -> Self {
        Self { probes }
    }

    pub async fn run(&self, ctx: &mut TestContext) -> Report {
        let mut results = Vec::with_capacity(self.probes.len());
        let mut reported = HashSet::new();

        for probe in &self.probes {
            let method = probe.method();
            if reported.contains(&method) {
                continue;
            }

            let result = match resolve(probe.as_ref(), ctx).await {
                Ok(result) => result,
                // resolve() records every failure before returning it.
                Err(err) => ctx.already_tested(method).unwrap_or_else(|| {
                    Arc::new(RpcResult::error(method, err.to_string()))
                }),
            };

            log_verdict(&result);
            reported.insert(method);
            results.push(result);
        }

        for result in ctx.completed() {
            if reported.insert(result.method) {
                log_verdict(result);
                results.push(Arc::clone(result));
            }
        }

        Report { results }
    }
}

fn log_verdict(result: &RpcResult) {
    match result.status {
        Status::Ok => info!(method = %result.method, "OK"),
        Status::Warning => {
            warn!(method = %result.method, warnings = ?result.warnings, "Passed with warnings")
        }
        Status::Error => warn!(
            method = %result.method,
            error = result.error.as_deref().unwrap_or_default(),
            "Failed"
        ),
    }
}

/// Every verdict of a run, explicit probes first, one per method.
#[derive(Clone, Debug, Default, Serialize)]
#[serde(transparent)]
pub struct Report {
    results: Vec<Arc<RpcResult>>,
}

impl Report {
    pub fn results(&self) -> &[Arc<RpcResult>] {
        &self.results
    }

    pub fn get(&self, method: RpcMethod) -> Option<&RpcResult> {
        self.results.iter().find(|result| result.method == method).map(Arc::as_ref)
    }

    pub fn worst_status(&self) -> Option<Status> {
        self.results.iter().map(|result| result.status).max()
    }

    /// (ok, warning, error)
    pub fn counts(&self) -> (usize, usize, usize) {
        self.results.iter().fold((0, 0, 0), |(ok, warning, error), result| match result.status {
            Status::Ok => (ok + 1, warning, error),
            Status::Warning => (ok, warning + 1, error),
            Status::Error => (ok, warning, error + 1),
        })
    }

    pub fn has_errors(&self) -> bool {
        self.results.iter().any(|result| result.is_error())
    }
}

impl FromIterator<RpcResult> for Report {
    fn from_iter<I: IntoIterator<Item = RpcResult>>(iter: I) -> Self {
        Self { results: iter.into_iter().map(Arc::new).collect() }
    }
}
