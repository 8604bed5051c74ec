//! Parallel Report Aggregation
//!
//! Combines the reports of a parallel fan-out into one status, one error
//! and one merged context.

use serde::{Deserialize, Serialize};

use crate::error::WorkError;
use crate::work::{Context, Report, Status};

/// How child statuses combine into the status of a parallel flow.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ParallelPolicy {
    /// Every unit must complete; the first failing or waiting unit wins.
    #[default]
    And,
    /// One completed unit is enough; otherwise waiting beats failed.
    Or,
}

/// Reports of units executed in parallel, in submission order.
#[derive(Debug, Clone, Default)]
pub struct ParallelReport {
    policy: ParallelPolicy,
    reports: Vec<Report>,
}

impl ParallelReport {
    pub fn new(policy: ParallelPolicy) -> Self {
        Self {
            policy,
            reports: Vec::new(),
        }
    }

    pub fn with_reports(policy: ParallelPolicy, reports: Vec<Report>) -> Self {
        Self { policy, reports }
    }

    pub fn add(&mut self, report: Report) {
        self.reports.push(report);
    }

    pub fn add_all(&mut self, reports: impl IntoIterator<Item = Report>) {
        self.reports.extend(reports);
    }

    pub fn policy(&self) -> ParallelPolicy {
        self.policy
    }

    /// Partial reports.
    pub fn reports(&self) -> &[Report] {
        &self.reports
    }

    pub fn status(&self) -> Status {
        match self.policy {
            ParallelPolicy::And => self
                .reports
                .iter()
                .map(Report::status)
                .find(|status| status.is_blocking())
                .unwrap_or(Status::Completed),
            ParallelPolicy::Or => {
                let statuses: Vec<Status> = self.reports.iter().map(Report::status).collect();
                if statuses.contains(&Status::Completed) {
                    Status::Completed
                } else if statuses.contains(&Status::Waiting) {
                    Status::Waiting
                } else if statuses.contains(&Status::Failed) {
                    Status::Failed
                } else {
                    Status::Completed
                }
            }
        }
    }

    /// First error among the partial reports, whatever the policy.
    pub fn error(&self) -> Option<WorkError> {
        self.reports.iter().find_map(Report::error)
    }

    /// Union of all partial contexts.
    ///
    /// Later reports overwrite earlier ones on key collision, so units run
    /// in parallel should write disjoint keys.
    pub fn context(&self) -> Context {
        let merged = Context::new();
        for report in &self.reports {
            merged.merge_from(&report.context());
        }
        merged
    }
}
