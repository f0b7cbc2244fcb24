//! Sequential evaluation of fixture cases.

use std::time::Instant;

use crate::error::{HarnessError, LineError};
use crate::filter::CategoryFilter;
use crate::fixture::FixtureFile;
use crate::normalizer::Normalizer;
use crate::types::{FailureKind, FixtureCase, Outcome, RunSummary, TestResult};

/// Knobs that change how a case is judged.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunOptions {
    /// Fail cases that carry no expected output instead of passing them
    /// whenever the normalizer succeeds.
    pub strict: bool,
}

/// Evaluates fixture cases against a normalizer, one at a time in file order.
pub struct Runner<'a> {
    normalizer: &'a dyn Normalizer,
    options: RunOptions,
}

impl<'a> Runner<'a> {
    pub fn new(normalizer: &'a dyn Normalizer) -> Self {
        Self {
            normalizer,
            options: RunOptions::default(),
        }
    }

    #[must_use]
    pub fn options(mut self, options: RunOptions) -> Self {
        self.options = options;
        self
    }

    /// Run every selected case of `file` and return the summary.
    pub fn run(
        &self,
        file: &FixtureFile,
        filter: &CategoryFilter,
    ) -> Result<RunSummary, HarnessError> {
        self.run_with(file, filter, |_| {})
    }

    /// Like [`Runner::run`], calling `observer` after each case is evaluated.
    ///
    /// The observer sees cases in evaluation order and cannot change their
    /// outcome.
    pub fn run_with<F>(
        &self,
        file: &FixtureFile,
        filter: &CategoryFilter,
        mut observer: F,
    ) -> Result<RunSummary, HarnessError>
    where
        F: FnMut(&TestResult),
    {
        let mut summary = RunSummary::new(file.lang(), filter.category().map(str::to_string));

        for item in file.cases()? {
            match item {
                Ok(case) => {
                    if !filter.matches(&case) {
                        continue;
                    }
                    let result = self.evaluate(case);
                    observer(&result);
                    summary.record(result);
                }
                Err(LineError::Malformed(malformed)) => {
                    tracing::warn!(
                        path = %malformed.path.display(),
                        line = malformed.line,
                        reason = %malformed.reason,
                        "Malformed fixture line"
                    );
                    summary.record_malformed(malformed);
                }
                Err(LineError::Harness(e)) => return Err(e),
            }
        }

        tracing::debug!(
            lang = %summary.lang,
            total = summary.total,
            passed = summary.passed,
            failed = summary.failed,
            "Fixture run finished"
        );
        Ok(summary)
    }

    /// Normalize one case and judge the output.
    pub fn evaluate(&self, case: FixtureCase) -> TestResult {
        let started = Instant::now();
        let normalized = self.normalizer.normalize(&case.input, &case.category);
        tracing::trace!(
            line = case.line,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Normalized case"
        );

        let actual = match normalized {
            Ok(actual) => actual,
            Err(e) => {
                tracing::warn!(
                    normalizer = self.normalizer.name(),
                    line = case.line,
                    error = %e,
                    "Normalizer failed"
                );
                return TestResult {
                    case,
                    actual: None,
                    outcome: Outcome::Failed(FailureKind::NormalizerError {
                        message: e.to_string(),
                    }),
                };
            }
        };

        let outcome = match &case.expected {
            Some(expected) if *expected == actual => Outcome::Passed,
            Some(expected) => Outcome::Failed(FailureKind::Mismatch {
                expected: expected.clone(),
            }),
            None if self.options.strict => Outcome::Failed(FailureKind::MissingExpected),
            None => Outcome::Passed,
        };

        TestResult {
            case,
            actual: Some(actual),
            outcome,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{MalformedReason, NormalizerError};
    use crate::normalizer::FnNormalizer;
    use crate::types::RunStatus;
    use pretty_assertions::assert_eq;
    use std::fs;

    /// Spells out a few numbers; everything else passes through unchanged.
    fn spelling() -> impl Normalizer {
        FnNormalizer::new("spelling", |input: &str, _category: &str| {
            Ok(match input {
                "1" => "one".to_string(),
                "2" => "two".to_string(),
                "123" => "one hundred twenty-three".to_string(),
                "boom" => return Err(NormalizerError::Failed("cannot normalize".to_string())),
                other => other.to_string(),
            })
        })
    }

    fn fixture(contents: &str) -> (tempfile::TempDir, FixtureFile) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("en.txt");
        fs::write(&path, contents).unwrap();
        (dir, FixtureFile::new("en", path))
    }

    #[test]
    fn test_hyphen_mismatch_is_recorded_and_run_continues() {
        let (_dir, file) = fixture(
            "123|||cardinal|||one hundred twenty three\n2|||cardinal|||two\n",
        );
        let normalizer = spelling();
        let summary = Runner::new(&normalizer)
            .run(&file, &CategoryFilter::all())
            .unwrap();

        assert_eq!(summary.total, 2);
        assert_eq!(summary.passed, 1);
        assert_eq!(summary.failed, 1);
        assert_eq!(
            summary.results[0].actual.as_deref(),
            Some("one hundred twenty-three")
        );
        assert_eq!(
            summary.results[0].failure(),
            Some(&FailureKind::Mismatch {
                expected: "one hundred twenty three".to_string()
            })
        );
        assert!(summary.results[1].passed());
        assert_eq!(summary.status(), RunStatus::Failed);
        assert_eq!(summary.status().exit_code(), 1);
    }

    #[test]
    fn test_empty_file_is_no_cases() {
        let (_dir, file) = fixture("");
        let normalizer = spelling();
        let summary = Runner::new(&normalizer)
            .run(&file, &CategoryFilter::all())
            .unwrap();
        assert_eq!(summary.total, 0);
        assert_eq!(summary.status(), RunStatus::NoCases);
        assert_eq!(summary.status().exit_code(), 1);
    }

    #[test]
    fn test_malformed_line_recorded_and_later_lines_evaluated() {
        let (_dir, file) = fixture("1|||cardinal|||one\nbadline-no-delimiter\n2|||cardinal|||two\n");
        let normalizer = spelling();
        let summary = Runner::new(&normalizer)
            .run(&file, &CategoryFilter::all())
            .unwrap();

        assert_eq!(summary.malformed.len(), 1);
        assert_eq!(summary.malformed[0].line, 2);
        assert_eq!(summary.malformed[0].reason, MalformedReason::MissingDelimiter);
        assert_eq!(summary.selected(), 2);
        assert!(summary.results.iter().all(TestResult::passed));
        assert_eq!(summary.total, 3);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.status(), RunStatus::Failed);
    }

    #[test]
    fn test_normalizer_error_does_not_abort() {
        let (_dir, file) = fixture("boom|||cardinal\n1|||cardinal|||one\n");
        let normalizer = spelling();
        let summary = Runner::new(&normalizer)
            .run(&file, &CategoryFilter::all())
            .unwrap();

        assert_eq!(summary.selected(), 2);
        assert_eq!(summary.results[0].actual, None);
        assert_eq!(
            summary.results[0].failure(),
            Some(&FailureKind::NormalizerError {
                message: "cannot normalize".to_string()
            })
        );
        assert!(summary.results[1].passed());
    }

    #[test]
    fn test_unknown_category_selects_nothing() {
        let (_dir, file) = fixture("1|||cardinal|||one\n12:30|||time\n");
        let normalizer = spelling();
        let summary = Runner::new(&normalizer)
            .run(&file, &CategoryFilter::only("date"))
            .unwrap();
        assert_eq!(summary.selected(), 0);
        assert_eq!(summary.category_filter.as_deref(), Some("date"));
        assert_eq!(summary.status(), RunStatus::NoCases);
    }

    #[test]
    fn test_category_filter_and_first_seen_order() {
        let (_dir, file) = fixture(
            "12:30|||time\n1|||cardinal|||one\n$5|||money\n2|||cardinal|||two\n",
        );
        let normalizer = spelling();

        let all = Runner::new(&normalizer)
            .run(&file, &CategoryFilter::all())
            .unwrap();
        let order: Vec<_> = all.categories.iter().map(|c| c.category.as_str()).collect();
        assert_eq!(order, vec!["time", "cardinal", "money"]);

        let cardinal = Runner::new(&normalizer)
            .run(&file, &CategoryFilter::only("cardinal"))
            .unwrap();
        let lines: Vec<_> = cardinal.results.iter().map(|r| r.case.line).collect();
        assert_eq!(lines, vec![2, 4]);
        assert_eq!(cardinal.categories.len(), 1);
    }

    #[test]
    fn test_missing_expected_passes_unless_strict() {
        let (_dir, file) = fixture("12:30|||time\n");
        let normalizer = spelling();

        let lenient = Runner::new(&normalizer)
            .run(&file, &CategoryFilter::all())
            .unwrap();
        assert_eq!(lenient.status(), RunStatus::Passed);

        let strict = Runner::new(&normalizer)
            .options(RunOptions { strict: true })
            .run(&file, &CategoryFilter::all())
            .unwrap();
        assert_eq!(
            strict.results[0].failure(),
            Some(&FailureKind::MissingExpected)
        );
        assert_eq!(strict.status(), RunStatus::Failed);
    }

    #[test]
    fn test_observer_sees_cases_in_order_without_changing_counts() {
        let (_dir, file) = fixture(
            "2|||cardinal|||two\nbad\n123|||cardinal|||one hundred twenty three\n1|||cardinal|||one\n",
        );
        let normalizer = spelling();
        let runner = Runner::new(&normalizer);

        let mut seen = Vec::new();
        let observed = runner
            .run_with(&file, &CategoryFilter::all(), |r| {
                seen.push((r.case.line, r.passed()))
            })
            .unwrap();
        let quiet = runner.run(&file, &CategoryFilter::all()).unwrap();

        assert_eq!(seen, vec![(1, true), (3, false), (4, true)]);
        assert_eq!(observed, quiet);
    }

    #[test]
    fn test_totals_always_balance() {
        let (_dir, file) = fixture(
            "1|||cardinal|||one\n|||cardinal\nboom|||cardinal\n123|||cardinal|||x\n2|||cardinal\n\n# done\n",
        );
        let normalizer = spelling();
        let summary = Runner::new(&normalizer)
            .run(&file, &CategoryFilter::all())
            .unwrap();

        assert_eq!(summary.total, summary.passed + summary.failed);
        assert_eq!(
            summary.failed,
            summary.failures().count() + summary.malformed.len()
        );
        assert_eq!(summary.total, 5);
    }

    #[test]
    fn test_multibyte_comparison_is_exact() {
        let (_dir, file) = fixture("₹100|||money|||₹100\n௧௦௦|||cardinal|||௧௦௦ \n");
        let normalizer = spelling();
        let summary = Runner::new(&normalizer)
            .run(&file, &CategoryFilter::all())
            .unwrap();
        // Trailing padding around the expected field is trimmed by the loader.
        assert_eq!(summary.passed, 2);
    }

    #[test]
    fn test_missing_file_aborts() {
        let dir = tempfile::tempdir().unwrap();
        let file = FixtureFile::new("xx", dir.path().join("xx.txt"));
        let normalizer = spelling();
        assert!(matches!(
            Runner::new(&normalizer).run(&file, &CategoryFilter::all()),
            Err(HarnessError::FixtureFileNotFound { .. })
        ));
    }
}
