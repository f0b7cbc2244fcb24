//! Core types for normcheck.
//!
//! These types describe fixture cases, their evaluated outcomes and the
//! aggregate summary a run returns.

use serde::Serialize;

use crate::error::MalformedFixture;

/// One `input|||category[|||expected]` line of a fixture file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FixtureCase {
    pub input: String,
    pub category: String,
    /// Expected normalized form, when the fixture carries one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected: Option<String>,
    /// 1-based line number in the fixture file.
    pub line: usize,
}

/// Why a case failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FailureKind {
    /// Normalizer output differs from the expected field.
    Mismatch { expected: String },
    /// Normalizer raised an error for this input.
    NormalizerError { message: String },
    /// Strict mode: the case has no expected field to compare against.
    MissingExpected,
}

/// Outcome of evaluating one case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "failure", rename_all = "snake_case")]
pub enum Outcome {
    Passed,
    Failed(FailureKind),
}

/// Per-case result, in evaluation order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TestResult {
    pub case: FixtureCase,
    /// Normalizer output; `None` when the normalizer failed.
    pub actual: Option<String>,
    pub outcome: Outcome,
}

impl TestResult {
    #[must_use]
    pub fn passed(&self) -> bool {
        self.outcome == Outcome::Passed
    }

    /// The failure kind, if the case failed.
    #[must_use]
    pub fn failure(&self) -> Option<&FailureKind> {
        match &self.outcome {
            Outcome::Passed => None,
            Outcome::Failed(kind) => Some(kind),
        }
    }
}

/// Pass/fail counts for one category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryCounts {
    pub category: String,
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
}

impl CategoryCounts {
    fn new(category: String) -> Self {
        Self {
            category,
            total: 0,
            passed: 0,
            failed: 0,
        }
    }

    fn add(&mut self, passed: bool) {
        self.total += 1;
        if passed {
            self.passed += 1;
        } else {
            self.failed += 1;
        }
    }
}

/// Overall verdict of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    /// At least one case was selected and every case passed.
    Passed,
    /// At least one case failed or a fixture line was malformed.
    Failed,
    /// Nothing matched the requested language/category.
    NoCases,
}

impl RunStatus {
    /// Process exit code for this verdict.
    #[must_use]
    pub fn exit_code(self) -> i32 {
        match self {
            Self::Passed => 0,
            Self::Failed | Self::NoCases => 1,
        }
    }
}

/// Aggregate of one run, owned by the caller once returned.
///
/// `total == passed + failed` always holds. Malformed lines count as
/// failures but belong to no category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub lang: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_filter: Option<String>,
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    /// Per-category counts, in first-seen order.
    pub categories: Vec<CategoryCounts>,
    pub malformed: Vec<MalformedFixture>,
    pub results: Vec<TestResult>,
}

impl RunSummary {
    #[must_use]
    pub fn new(lang: impl Into<String>, category_filter: Option<String>) -> Self {
        Self {
            lang: lang.into(),
            category_filter,
            total: 0,
            passed: 0,
            failed: 0,
            categories: Vec::new(),
            malformed: Vec::new(),
            results: Vec::new(),
        }
    }

    /// Add an evaluated case.
    pub fn record(&mut self, result: TestResult) {
        let passed = result.passed();
        let idx = match self
            .categories
            .iter()
            .position(|c| c.category == result.case.category)
        {
            Some(idx) => idx,
            None => {
                self.categories
                    .push(CategoryCounts::new(result.case.category.clone()));
                self.categories.len() - 1
            }
        };
        self.categories[idx].add(passed);

        self.total += 1;
        if passed {
            self.passed += 1;
        } else {
            self.failed += 1;
        }
        self.results.push(result);
    }

    /// Add a malformed fixture line. Counts as a failure.
    pub fn record_malformed(&mut self, malformed: MalformedFixture) {
        self.total += 1;
        self.failed += 1;
        self.malformed.push(malformed);
    }

    /// Number of cases that were selected and evaluated.
    #[must_use]
    pub fn selected(&self) -> usize {
        self.results.len()
    }

    /// Failed cases, excluding malformed lines.
    pub fn failures(&self) -> impl Iterator<Item = &TestResult> {
        self.results.iter().filter(|r| !r.passed())
    }

    #[must_use]
    pub fn category(&self, name: &str) -> Option<&CategoryCounts> {
        self.categories.iter().find(|c| c.category == name)
    }

    #[must_use]
    pub fn status(&self) -> RunStatus {
        if self.selected() == 0 {
            RunStatus::NoCases
        } else if self.failed > 0 {
            RunStatus::Failed
        } else {
            RunStatus::Passed
        }
    }
}
