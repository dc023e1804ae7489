//! Where assignment specs come from.
//!
//! The builder never touches the filesystem itself; it asks an injected
//! [`AssignmentSpecProvider`] once the header has named the assignment.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};

use super::AssignmentSpec;
use crate::error::SpecLoadError;

pub trait AssignmentSpecProvider: Send + Sync {
    /// Load the spec for an assignment number such as `"1"`.
    fn load(&self, assignment_number: &str) -> Result<Arc<AssignmentSpec>, SpecLoadError>;
}

impl<P: AssignmentSpecProvider + ?Sized> AssignmentSpecProvider for Arc<P> {
    fn load(&self, assignment_number: &str) -> Result<Arc<AssignmentSpec>, SpecLoadError> {
        (**self).load(assignment_number)
    }
}

/// Reads `<dir>/assignment<N>.json`, falling back to `<dir>/<N>.json`.
#[derive(Debug, Clone)]
pub struct DirectorySpecProvider {
    dir: PathBuf,
}

impl DirectorySpecProvider {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        DirectorySpecProvider { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn candidates(&self, number: &str) -> [PathBuf; 2] {
        [
            self.dir.join(format!("assignment{}.json", number)),
            self.dir.join(format!("{}.json", number)),
        ]
    }
}

impl AssignmentSpecProvider for DirectorySpecProvider {
    fn load(&self, assignment_number: &str) -> Result<Arc<AssignmentSpec>, SpecLoadError> {
        // Numbers come from document text; anything else must not reach a path.
        if assignment_number.is_empty() || !assignment_number.chars().all(|c| c.is_ascii_digit()) {
            return Err(SpecLoadError::NotFound(assignment_number.to_string()));
        }
        for path in self.candidates(assignment_number) {
            match std::fs::read_to_string(&path) {
                Ok(text) => {
                    tracing::debug!(path = %path.display(), "loaded assignment spec");
                    return AssignmentSpec::from_json_str(assignment_number, &text).map(Arc::new);
                }
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
                Err(source) => return Err(SpecLoadError::Io { path, source }),
            }
        }
        Err(SpecLoadError::NotFound(assignment_number.to_string()))
    }
}

/// Specs held in memory, for tests and editors.
#[derive(Debug, Clone, Default)]
pub struct InMemorySpecProvider {
    specs: HashMap<String, Arc<AssignmentSpec>>,
}

impl InMemorySpecProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a spec under its own assignment number.
    pub fn with_spec(mut self, spec: AssignmentSpec) -> Self {
        self.insert(spec);
        self
    }

    pub fn insert(&mut self, spec: AssignmentSpec) {
        self.specs.insert(spec.assignment.clone(), Arc::new(spec));
    }
}

impl AssignmentSpecProvider for InMemorySpecProvider {
    fn load(&self, assignment_number: &str) -> Result<Arc<AssignmentSpec>, SpecLoadError> {
        self.specs
            .get(assignment_number)
            .cloned()
            .ok_or_else(|| SpecLoadError::NotFound(assignment_number.to_string()))
    }
}

/// Caches successful loads of another provider. Failures are not cached so a
/// spec added later is picked up.
#[derive(Debug)]
pub struct CachedSpecProvider<P> {
    inner: P,
    cache: RwLock<HashMap<String, Arc<AssignmentSpec>>>,
}

impl<P> CachedSpecProvider<P> {
    pub fn new(inner: P) -> Self {
        CachedSpecProvider {
            inner,
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// Drop every cached spec.
    pub fn invalidate(&self) {
        self.cache
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

impl<P: AssignmentSpecProvider> AssignmentSpecProvider for CachedSpecProvider<P> {
    fn load(&self, assignment_number: &str) -> Result<Arc<AssignmentSpec>, SpecLoadError> {
        if let Some(spec) = self
            .cache
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(assignment_number)
        {
            return Ok(Arc::clone(spec));
        }
        let spec = self.inner.load(assignment_number)?;
        self.cache
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(assignment_number.to_string(), Arc::clone(&spec));
        Ok(spec)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn directory_provider_prefers_assignment_prefix() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("assignment1.json"), r#"[{"Number": "1", "Proof": null}]"#)
            .unwrap();
        std::fs::write(dir.path().join("2.json"), r#"[{"Number": "1"}]"#).unwrap();

        let provider = DirectorySpecProvider::new(dir.path());
        let one = provider.load("1").unwrap();
        assert!(one.problem("1").unwrap().proof);
        let two = provider.load("2").unwrap();
        assert_eq!(two.assignment, "2");
        assert!(matches!(provider.load("3"), Err(SpecLoadError::NotFound(_))));
    }

    #[test]
    fn directory_provider_rejects_non_numeric_names() {
        let dir = tempfile::tempdir().unwrap();
        let provider = DirectorySpecProvider::new(dir.path());
        assert!(matches!(provider.load("../1"), Err(SpecLoadError::NotFound(_))));
    }

    #[test]
    fn malformed_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("assignment4.json"), "{ not json").unwrap();
        let provider = DirectorySpecProvider::new(dir.path());
        assert!(matches!(provider.load("4"), Err(SpecLoadError::Malformed { .. })));
    }

    struct Counting(AtomicUsize);

    impl AssignmentSpecProvider for Counting {
        fn load(&self, n: &str) -> Result<Arc<AssignmentSpec>, SpecLoadError> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Ok(Arc::new(AssignmentSpec::new(n)))
        }
    }

    #[test]
    fn cached_provider_loads_once() {
        let cached = CachedSpecProvider::new(Counting(AtomicUsize::new(0)));
        let a = cached.load("1").unwrap();
        let b = cached.load("1").unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(cached.inner.0.load(Ordering::SeqCst), 1);
        cached.invalidate();
        cached.load("1").unwrap();
        assert_eq!(cached.inner.0.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn in_memory_provider() {
        let provider = InMemorySpecProvider::new().with_spec(AssignmentSpec::new("5"));
        assert!(provider.load("5").is_ok());
        assert!(provider.load("6").is_err());
    }
}
