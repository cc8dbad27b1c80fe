// src/scoring/runner.rs

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::models::exercise::Exercise;

/// Result of one test case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestCaseResult {
    pub name: String,
    pub passed: bool,
    pub message: Option<String>,
}

/// What a test runner reports for one submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestReport {
    pub passed: bool,
    pub results: Vec<TestCaseResult>,
}

/// Runs an exercise's test cases against submitted code.
#[async_trait]
pub trait TestRunner: Send + Sync {
    async fn run(&self, code: &str, exercise: &Exercise) -> TestReport;
}

/// Placeholder until code can be executed in a sandbox.
/// Executes nothing and reports success.
#[derive(Debug, Clone, Copy, Default)]
pub struct StubRunner;

#[async_trait]
impl TestRunner for StubRunner {
    async fn run(&self, _code: &str, exercise: &Exercise) -> TestReport {
        tracing::debug!("Stub runner accepting submission for exercise {}", exercise.id);
        TestReport {
            passed: true,
            results: Vec::new(),
        }
    }
}
