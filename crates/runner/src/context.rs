//! Execution contexts handed to hooks and test bodies
//!
//! A [`TestHandle`] is created for every leaf test execution and dropped when
//! the test's `after_each` hooks have finished, so anything attached to it
//! lives exactly as long as that one execution. Hooks registered at
//! different depths see the same handle, which is how they coordinate.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;

type MarkerMap = HashMap<TypeId, Box<dyn Any + Send + Sync>>;

struct TestRecord {
    title: String,
    path: Vec<String>,
    markers: Mutex<MarkerMap>,
}

/// Handle to the leaf test currently executing
///
/// Cloning is cheap; all clones share the same marker storage.
#[derive(Clone)]
pub struct TestHandle(Arc<TestRecord>);

impl TestHandle {
    /// Handle for a test titled `title` inside the scopes named by `path`
    pub fn new(path: Vec<String>, title: impl Into<String>) -> Self {
        TestHandle(Arc::new(TestRecord {
            title: title.into(),
            path,
            markers: Mutex::new(HashMap::new()),
        }))
    }

    /// The test's own title
    pub fn title(&self) -> &str {
        &self.0.title
    }

    /// Titles of the enclosing scopes, outermost first
    pub fn path(&self) -> &[String] {
        &self.0.path
    }

    /// Enclosing scope titles and the test title joined by spaces
    pub fn full_title(&self) -> String {
        full_title(&self.0.path, &self.0.title)
    }

    /// Attach `marker`, replacing any marker of the same type
    ///
    /// Returns `true` if a marker of that type was already present.
    pub fn insert_marker<T: Any + Send + Sync>(&self, marker: T) -> bool {
        self.0
            .markers
            .lock()
            .insert(TypeId::of::<T>(), Box::new(marker))
            .is_some()
    }

    /// Copy of the marker of type `T`, if attached
    pub fn marker<T: Any + Clone + Send + Sync>(&self) -> Option<T> {
        self.0
            .markers
            .lock()
            .get(&TypeId::of::<T>())
            .and_then(|boxed| boxed.downcast_ref::<T>())
            .cloned()
    }

    /// Whether a marker of type `T` is attached
    pub fn has_marker<T: Any>(&self) -> bool {
        self.0.markers.lock().contains_key(&TypeId::of::<T>())
    }

    /// Whether two handles refer to the same execution
    pub fn same_execution(&self, other: &TestHandle) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for TestHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestHandle")
            .field("title", &self.0.title)
            .field("path", &self.0.path)
            .field("markers", &self.0.markers.lock().len())
            .finish()
    }
}

pub(crate) fn full_title(path: &[String], title: &str) -> String {
    let mut parts: Vec<&str> = path.iter().map(String::as_str).collect();
    parts.push(title);
    parts.join(" ")
}

/// Context passed to every hook
#[derive(Debug, Clone)]
pub struct HookContext {
    scope_path: Vec<String>,
    hook: String,
    current_test: Option<TestHandle>,
}

impl HookContext {
    /// Context for hook `hook` registered on the scope at `scope_path`
    pub fn new(scope_path: Vec<String>, hook: impl Into<String>, current_test: Option<TestHandle>) -> Self {
        HookContext {
            scope_path,
            hook: hook.into(),
            current_test,
        }
    }

    /// Titles of the scope the hook is registered on, outermost first
    pub fn scope_path(&self) -> &[String] {
        &self.scope_path
    }

    /// Name the hook was registered with
    pub fn hook_name(&self) -> &str {
        &self.hook
    }

    /// The test being set up or torn down
    ///
    /// `Some` for `before_each`/`after_each`, `None` for scope hooks.
    pub fn current_test(&self) -> Option<&TestHandle> {
        self.current_test.as_ref()
    }
}

/// Context passed to a test body
#[derive(Debug, Clone)]
pub struct TestContext {
    test: TestHandle,
}

impl TestContext {
    pub(crate) fn new(test: TestHandle) -> Self {
        TestContext { test }
    }

    /// Handle of the running test
    pub fn test(&self) -> &TestHandle {
        &self.test
    }
}
