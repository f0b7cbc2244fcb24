//! Human and JSON rendering of run results.
//!
//! Every function returns a `String`; printing is left to `main`.

use colored::Colorize;
use normcheck_core::{FailureKind, HarnessError, RunStatus, RunSummary, TestResult};

const RULE_WIDTH: usize = 30;

/// One verbose line (plus a detail line on failure) for an evaluated case.
pub fn format_case(result: &TestResult) -> String {
    let case = &result.case;
    let marker = if result.passed() {
        "✓".green().bold()
    } else {
        "✗".red().bold()
    };
    let head = format!(
        "{} line {} [{}] '{}'",
        marker,
        case.line,
        case.category.blue(),
        case.input
    );

    match (&result.actual, result.failure()) {
        (_, Some(FailureKind::NormalizerError { message })) => {
            format!("{} -> {} {}", head, "normalizer error:".red(), message)
        }
        (Some(actual), Some(FailureKind::Mismatch { expected })) => format!(
            "{} -> '{}'\n    {} '{}'",
            head,
            actual,
            "expected:".dimmed(),
            expected
        ),
        (Some(actual), Some(FailureKind::MissingExpected)) => format!(
            "{} -> '{}'\n    {}",
            head,
            actual,
            "no expected output (strict mode)".dimmed()
        ),
        (Some(actual), None) => format!("{} -> '{}'", head, actual),
        (None, _) => head,
    }
}

/// Aggregate report: per-category counts, malformed lines and totals.
pub fn format_summary(summary: &RunSummary) -> String {
    let mut out = String::new();

    if summary.status() == RunStatus::NoCases {
        out.push_str(&format!(
            "{} for lang='{}'",
            "No test cases found".yellow().bold(),
            summary.lang
        ));
        if let Some(category) = &summary.category_filter {
            out.push_str(&format!(" category='{}'", category));
        }
        out.push('\n');
    } else {
        out.push_str(&format!("{}\n", "Categories".bold().underline()));
        let width = summary
            .categories
            .iter()
            .map(|c| c.category.chars().count())
            .max()
            .unwrap_or(0);
        for counts in &summary.categories {
            let ratio = format!("{}/{}", counts.passed, counts.total);
            let ratio = if counts.failed == 0 {
                ratio.green()
            } else {
                ratio.red()
            };
            let pad = width - counts.category.chars().count();
            out.push_str(&format!(
                "  {}{}  {} passed\n",
                counts.category,
                " ".repeat(pad),
                ratio
            ));
        }
    }

    if !summary.malformed.is_empty() {
        out.push_str(&format!("{}\n", "Malformed fixture lines".red().bold()));
        for malformed in &summary.malformed {
            out.push_str(&format!("  {}\n", malformed));
        }
    }

    out.push_str(&"-".repeat(RULE_WIDTH));
    out.push('\n');

    let failed = if summary.failed == 0 {
        summary.failed.to_string().normal()
    } else {
        summary.failed.to_string().red().bold()
    };
    out.push_str(&format!(
        "Finished: {} passed, {} failed",
        summary.passed.to_string().green(),
        failed
    ));
    if !summary.malformed.is_empty() {
        out.push_str(&format!(" ({} malformed)", summary.malformed.len()));
    }
    out.push('.');
    out
}

/// Full summary as JSON, with the overall status and exit code added.
pub fn summary_json(summary: &RunSummary) -> serde_json::Result<serde_json::Value> {
    let mut value = serde_json::to_value(summary)?;
    if let Some(obj) = value.as_object_mut() {
        let status = summary.status();
        obj.insert("status".to_string(), serde_json::to_value(status)?);
        obj.insert("exit_code".to_string(), serde_json::json!(status.exit_code()));
    }
    Ok(value)
}

/// Extra hint printed under a fatal error, if there is something useful to say.
pub fn fatal_hint(err: &HarnessError) -> Option<String> {
    match err {
        HarnessError::FixtureFileNotFound { available, .. } if available.is_empty() => {
            Some("No fixture files found. Use --data-dir to point at them.".to_string())
        }
        HarnessError::FixtureFileNotFound { available, .. } => {
            Some(format!("Available languages: {}", available.join(", ")))
        }
        HarnessError::LanguageExcluded(_) => {
            Some("Remove it from exclude_langs in the config file to run it.".to_string())
        }
        _ => None,
    }
}
