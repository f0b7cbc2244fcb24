//! Category selection.

use crate::types::FixtureCase;

/// Restricts a run to one category.
///
/// Matching is exact and case-sensitive; the filter value is not
/// normalized in any way.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryFilter {
    category: Option<String>,
}

impl CategoryFilter {
    pub fn new(category: Option<String>) -> Self {
        Self { category }
    }

    /// Select every case.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Select only cases whose category equals `category`.
    pub fn only(category: impl Into<String>) -> Self {
        Self {
            category: Some(category.into()),
        }
    }

    #[must_use]
    pub fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }

    #[must_use]
    pub fn matches(&self, case: &FixtureCase) -> bool {
        match &self.category {
            Some(category) => case.category == *category,
            None => true,
        }
    }

    /// Keep the matching subsequence, preserving order.
    pub fn apply<'a, I>(&'a self, cases: I) -> impl Iterator<Item = FixtureCase> + 'a
    where
        I: IntoIterator<Item = FixtureCase>,
        I::IntoIter: 'a,
    {
        cases.into_iter().filter(move |case| self.matches(case))
    }
}
