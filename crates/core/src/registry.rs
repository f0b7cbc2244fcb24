//! Mapping from language codes to fixture files.
//!
//! A language `ta` maps to `<dir>/ta.txt`. The code is validated before it
//! is ever joined onto a path.

use std::path::{Path, PathBuf};

use crate::error::HarnessError;
use crate::fixture::FixtureFile;

/// Default fixture directory, relative to the working directory.
pub const DEFAULT_DATA_DIR: &str = "data/test_cases";

/// Fixture file extension.
pub const FIXTURE_EXTENSION: &str = "txt";

/// Languages skipped unless the exclusion list is overridden.
pub const DEFAULT_EXCLUDED: &[&str] = &["en_kaggle"];

#[derive(Debug, Clone)]
pub struct FixtureRegistry {
    dir: PathBuf,
    excluded: Vec<String>,
}

impl FixtureRegistry {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            excluded: DEFAULT_EXCLUDED.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Replace the exclusion list.
    #[must_use]
    pub fn with_excluded<I, S>(mut self, langs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.excluded = langs.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    #[must_use]
    pub fn is_excluded(&self, lang: &str) -> bool {
        self.excluded.iter().any(|l| l == lang)
    }

    /// Path a language's fixture file would have. Does not check existence.
    pub fn path_for(&self, lang: &str) -> Result<PathBuf, HarnessError> {
        validate_lang(lang)?;
        Ok(self.dir.join(format!("{lang}.{FIXTURE_EXTENSION}")))
    }

    /// Resolve a language code to its fixture file.
    pub fn resolve(&self, lang: &str) -> Result<FixtureFile, HarnessError> {
        let path = self.path_for(lang)?;
        if self.is_excluded(lang) {
            return Err(HarnessError::LanguageExcluded(lang.to_string()));
        }
        if !path.is_file() {
            return Err(HarnessError::FixtureFileNotFound {
                lang: lang.to_string(),
                path,
                available: self.languages().unwrap_or_default(),
            });
        }
        tracing::debug!(lang, path = %path.display(), "Resolved fixture file");
        Ok(FixtureFile::new(lang, path))
    }

    /// Languages that have a fixture file, sorted. Excluded languages and
    /// files whose stem isn't a valid code are left out.
    ///
    /// A missing directory has no languages.
    pub fn languages(&self) -> Result<Vec<String>, HarnessError> {
        let entries = match std::fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(dir = %self.dir.display(), "Fixture directory does not exist");
                return Ok(Vec::new());
            }
            Err(source) => {
                return Err(HarnessError::Io {
                    path: self.dir.clone(),
                    source,
                })
            }
        };

        let mut langs: Vec<String> = entries
            .flatten()
            .map(|entry| entry.path())
            .filter(|path| path.is_file())
            .filter(|path| path.extension().and_then(|e| e.to_str()) == Some(FIXTURE_EXTENSION))
            .filter_map(|path| path.file_stem()?.to_str().map(str::to_string))
            .filter(|lang| validate_lang(lang).is_ok() && !self.is_excluded(lang))
            .collect();
        langs.sort();
        Ok(langs)
    }
}

impl Default for FixtureRegistry {
    fn default() -> Self {
        Self::new(DEFAULT_DATA_DIR)
    }
}

/// A language code is non-empty ASCII letters, digits, `-` or `_`.
pub fn validate_lang(lang: &str) -> Result<(), HarnessError> {
    let valid = !lang.is_empty()
        && lang
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid {
        Ok(())
    } else {
        Err(HarnessError::InvalidLanguage(lang.to_string()))
    }
}
