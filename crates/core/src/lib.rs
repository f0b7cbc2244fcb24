//! normcheck Core
//!
//! Fixture-driven checks for text normalizers. Each language has a fixture
//! file of `input|||category[|||expected]` lines; every selected case is fed
//! to a [`Normalizer`] and the outputs are tallied into a [`RunSummary`].
//!
//! # Quick Start
//!
//! ```
//! use normcheck_core::{CategoryFilter, FixtureRegistry, FnNormalizer, Harness, RunStatus};
//!
//! let dir = tempfile::tempdir().unwrap();
//! std::fs::write(
//!     dir.path().join("en.txt"),
//!     "1|||cardinal|||one\n2|||cardinal|||two\n12:30|||time\n",
//! )
//! .unwrap();
//!
//! let normalizer = FnNormalizer::new("toy", |input: &str, _category: &str| {
//!     Ok(match input {
//!         "1" => "one".to_string(),
//!         "2" => "two".to_string(),
//!         other => other.to_string(),
//!     })
//! });
//!
//! let harness = Harness::new(FixtureRegistry::new(dir.path()), Box::new(normalizer));
//! let summary = harness.run("en", &CategoryFilter::only("cardinal")).unwrap();
//!
//! assert_eq!(summary.passed, 2);
//! assert_eq!(summary.status(), RunStatus::Passed);
//! ```

pub mod error;
pub mod filter;
pub mod fixture;
pub mod normalizer;
pub mod registry;
pub mod runner;
pub mod types;

pub use error::{HarnessError, LineError, MalformedFixture, MalformedReason, NormalizerError};
pub use filter::CategoryFilter;
pub use fixture::{FixtureFile, DELIMITER};
pub use normalizer::{CommandNormalizer, FnNormalizer, Normalizer};
pub use registry::FixtureRegistry;
pub use runner::{RunOptions, Runner};
pub use types::*;

/// Main entry point: a registry of fixture files plus the normalizer they
/// are checked against.
pub struct Harness {
    registry: FixtureRegistry,
    normalizer: Box<dyn Normalizer>,
    options: RunOptions,
}

impl Harness {
    #[must_use]
    pub fn new(registry: FixtureRegistry, normalizer: Box<dyn Normalizer>) -> Self {
        Self {
            registry,
            normalizer,
            options: RunOptions::default(),
        }
    }

    #[must_use]
    pub fn with_options(mut self, options: RunOptions) -> Self {
        self.options = options;
        self
    }

    #[must_use]
    pub fn registry(&self) -> &FixtureRegistry {
        &self.registry
    }

    #[must_use]
    pub fn normalizer(&self) -> &dyn Normalizer {
        self.normalizer.as_ref()
    }

    /// Run the fixtures of `lang`.
    ///
    /// Fails only when the language can't be resolved to a readable fixture
    /// file; every per-case problem is recorded in the summary instead.
    pub fn run(&self, lang: &str, filter: &CategoryFilter) -> Result<RunSummary, HarnessError> {
        self.run_with(lang, filter, |_| {})
    }

    /// Like [`Harness::run`], calling `observer` after each evaluated case.
    pub fn run_with<F>(
        &self,
        lang: &str,
        filter: &CategoryFilter,
        observer: F,
    ) -> Result<RunSummary, HarnessError>
    where
        F: FnMut(&TestResult),
    {
        let file = self.registry.resolve(lang)?;
        tracing::debug!(
            lang,
            normalizer = self.normalizer.name(),
            category = filter.category(),
            strict = self.options.strict,
            "Starting fixture run"
        );
        Runner::new(self.normalizer.as_ref())
            .options(self.options)
            .run_with(&file, filter, observer)
    }
}
