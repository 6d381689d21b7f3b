//! Explicit test-case registry.
//!
//! Cases are added by registration at startup, not discovered by reflection;
//! the registry is the single source of truth for what a batch run covers.

use crate::{Error, Result};
use plotink_figure::Figure;
use std::collections::BTreeMap;
use std::sync::Arc;

/// A visual-regression test case.
///
/// `render` returns the drawing surface as an explicit value; the expected
/// fingerprint is immutable input maintained by the test author and is never
/// regenerated automatically on mismatch.
pub trait TestCase: Send + Sync {
    /// Case identifier, unique within a registry.
    fn name(&self) -> &str;
    /// The accepted fingerprint, 16 lowercase hex characters.
    fn expected_fingerprint(&self) -> &str;
    /// Produce the figure under test.
    fn render(&self) -> Figure;
}

impl std::fmt::Debug for dyn TestCase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TestCase")
            .field("name", &self.name())
            .field("expected_fingerprint", &self.expected_fingerprint())
            .finish()
    }
}

/// A [`TestCase`] built from a plain render function.
pub struct FnCase {
    name: String,
    expected: String,
    render: fn() -> Figure,
}

impl FnCase {
    pub fn new(name: impl Into<String>, expected: impl Into<String>, render: fn() -> Figure) -> Self {
        Self {
            name: name.into(),
            expected: expected.into(),
            render,
        }
    }
}

impl TestCase for FnCase {
    fn name(&self) -> &str {
        &self.name
    }

    fn expected_fingerprint(&self) -> &str {
        &self.expected
    }

    fn render(&self) -> Figure {
        (self.render)()
    }
}

/// Ordered collection of registered cases.
///
/// Iteration order is the lexicographic order of case names, so batch runs
/// are deterministic regardless of registration order.
#[derive(Default)]
pub struct CaseRegistry {
    cases: BTreeMap<String, Arc<dyn TestCase>>,
}

impl CaseRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a case. A case with the same name replaces the previous
    /// registration (last wins), which lets a local case shadow a built-in.
    pub fn register(&mut self, case: impl TestCase + 'static) -> &mut Self {
        self.register_arc(Arc::new(case))
    }

    pub fn register_arc(&mut self, case: Arc<dyn TestCase>) -> &mut Self {
        tracing::debug!(case = case.name(), "registering test case");
        self.cases.insert(case.name().to_string(), case);
        self
    }

    /// Case names in deterministic order. Restartable: each call yields a
    /// fresh iterator over the full set.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.cases.keys().map(String::as_str)
    }

    /// Cases with their names, in the same order as [`names`](Self::names).
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Arc<dyn TestCase>)> {
        self.cases.iter().map(|(name, case)| (name.as_str(), case))
    }

    pub fn get(&self, name: &str) -> Result<Arc<dyn TestCase>> {
        self.cases
            .get(name)
            .cloned()
            .ok_or_else(|| Error::CaseNotFound {
                name: name.to_string(),
            })
    }

    pub fn len(&self) -> usize {
        self.cases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cases.is_empty()
    }
}
