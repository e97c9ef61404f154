//! Scope tree and hook registration
//!
//! Scopes are built eagerly: `describe` runs its builder closure immediately,
//! so everything declared inside lands on the new child scope. Helpers that
//! register hooks (such as the shared-setup coordinator) take `&mut Scope`
//! and attach to whichever scope they are handed.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use futures::future::BoxFuture;
use futures::FutureExt;

use crate::context::{HookContext, TestContext};

/// Boxed hook callback
pub type HookFn = Arc<dyn Fn(HookContext) -> BoxFuture<'static, anyhow::Result<()>> + Send + Sync>;

/// Boxed test body
pub type TestFn = Arc<dyn Fn(TestContext) -> BoxFuture<'static, anyhow::Result<()>> + Send + Sync>;

/// When a hook runs relative to the scope's tests
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HookKind {
    /// Once on scope entry, before any test in the scope
    BeforeAll,
    /// Before every leaf test nested in the scope
    BeforeEach,
    /// After every leaf test nested in the scope
    AfterEach,
    /// Once on scope exit, after all nested tests and scopes
    AfterAll,
}

impl fmt::Display for HookKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            HookKind::BeforeAll => "before all",
            HookKind::BeforeEach => "before each",
            HookKind::AfterEach => "after each",
            HookKind::AfterAll => "after all",
        };
        f.write_str(name)
    }
}

pub(crate) struct Hook {
    pub(crate) kind: HookKind,
    pub(crate) name: String,
    pub(crate) run: HookFn,
}

pub(crate) struct TestCase {
    pub(crate) title: String,
    pub(crate) body: TestFn,
}

/// A node of the test tree
pub struct Scope {
    title: String,
    pub(crate) hooks: Vec<Hook>,
    pub(crate) tests: Vec<TestCase>,
    pub(crate) scopes: Vec<Scope>,
}

impl Scope {
    /// Empty scope titled `title`
    pub fn new(title: impl Into<String>) -> Self {
        Scope {
            title: title.into(),
            hooks: Vec::new(),
            tests: Vec::new(),
            scopes: Vec::new(),
        }
    }

    /// The scope's title
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Declare a nested scope, populated by `build`
    pub fn describe<F>(&mut self, title: impl Into<String>, build: F) -> &mut Self
    where
        F: FnOnce(&mut Scope),
    {
        let mut child = Scope::new(title);
        build(&mut child);
        self.scopes.push(child);
        self
    }

    /// Declare a leaf test
    pub fn it<F, Fut>(&mut self, title: impl Into<String>, body: F) -> &mut Self
    where
        F: Fn(TestContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        self.tests.push(TestCase {
            title: title.into(),
            body: Arc::new(move |ctx| body(ctx).boxed()),
        });
        self
    }

    /// Register a hook run once on scope entry
    pub fn before_all<F, Fut>(&mut self, name: impl Into<String>, hook: F) -> &mut Self
    where
        F: Fn(HookContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        self.add_hook(HookKind::BeforeAll, name, hook)
    }

    /// Register a hook run before every nested leaf test
    pub fn before_each<F, Fut>(&mut self, name: impl Into<String>, hook: F) -> &mut Self
    where
        F: Fn(HookContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        self.add_hook(HookKind::BeforeEach, name, hook)
    }

    /// Register a hook run after every nested leaf test
    pub fn after_each<F, Fut>(&mut self, name: impl Into<String>, hook: F) -> &mut Self
    where
        F: Fn(HookContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        self.add_hook(HookKind::AfterEach, name, hook)
    }

    /// Register a hook run once on scope exit
    pub fn after_all<F, Fut>(&mut self, name: impl Into<String>, hook: F) -> &mut Self
    where
        F: Fn(HookContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        self.add_hook(HookKind::AfterAll, name, hook)
    }

    fn add_hook<F, Fut>(&mut self, kind: HookKind, name: impl Into<String>, hook: F) -> &mut Self
    where
        F: Fn(HookContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        self.hooks.push(Hook {
            kind,
            name: name.into(),
            run: Arc::new(move |ctx| hook(ctx).boxed()),
        });
        self
    }

    /// Registered hooks in registration order
    pub fn hooks(&self) -> Vec<(HookKind, &str)> {
        self.hooks
            .iter()
            .map(|h| (h.kind, h.name.as_str()))
            .collect()
    }

    /// Titles of this scope's own leaf tests
    pub fn test_titles(&self) -> Vec<&str> {
        self.tests.iter().map(|t| t.title.as_str()).collect()
    }

    /// Directly nested scopes
    pub fn scopes(&self) -> &[Scope] {
        &self.scopes
    }

    /// Number of leaf tests in this scope and all nested scopes
    pub fn test_count(&self) -> usize {
        self.tests.len() + self.scopes.iter().map(Scope::test_count).sum::<usize>()
    }

    pub(crate) fn hooks_of(&self, kind: HookKind) -> impl DoubleEndedIterator<Item = &Hook> {
        self.hooks.iter().filter(move |h| h.kind == kind)
    }
}

impl fmt::Debug for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scope")
            .field("title", &self.title)
            .field("hooks", &self.hooks())
            .field("tests", &self.test_titles())
            .field("scopes", &self.scopes)
            .finish()
    }
}
