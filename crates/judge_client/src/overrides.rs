use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use judge_core::{BreadcrumbItem, BreadcrumbResolver, OverrideRegistry};
use judge_logging::judge_debug;
use tokio::sync::watch;

/// Root-scoped handle to the breadcrumb override registry.
///
/// Clones share one registry. Subscribers are woken only when a stored title
/// actually changes.
#[derive(Debug, Clone)]
pub struct SharedOverrides {
    registry: Arc<Mutex<OverrideRegistry>>,
    revision: Arc<watch::Sender<u64>>,
}

impl Default for SharedOverrides {
    fn default() -> Self {
        Self::new()
    }
}

impl SharedOverrides {
    pub fn new() -> Self {
        let (revision, _) = watch::channel(0);
        Self {
            registry: Arc::new(Mutex::new(OverrideRegistry::new())),
            revision: Arc::new(revision),
        }
    }

    pub fn get(&self, path: &str) -> Option<String> {
        self.lock().get(path).map(ToOwned::to_owned)
    }

    pub fn set(&self, path: &str, title: &str) -> bool {
        self.mutate(|registry| registry.set(path, title))
    }

    pub fn clear(&self, path: &str) -> bool {
        self.mutate(|registry| registry.clear(path))
    }

    pub fn snapshot(&self) -> OverrideRegistry {
        self.lock().clone()
    }

    pub fn resolve(&self, resolver: &BreadcrumbResolver, path: &str) -> Vec<BreadcrumbItem> {
        resolver.resolve(path, &self.lock())
    }

    /// Receiver whose value is the registry revision.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.revision.subscribe()
    }

    /// Announces `title` as the breadcrumb for `path` until the returned guard
    /// is dropped. Missing or empty titles register nothing.
    pub fn register_title(&self, path: &str, title: Option<&str>) -> Option<TitleRegistration> {
        let title = title.filter(|title| !title.is_empty())?;
        self.set(path, title);
        Some(TitleRegistration {
            overrides: self.clone(),
            path: path.to_string(),
            title: title.to_string(),
        })
    }

    fn lock(&self) -> MutexGuard<'_, OverrideRegistry> {
        self.registry.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn mutate(&self, f: impl FnOnce(&mut OverrideRegistry) -> bool) -> bool {
        let mut registry = self.lock();
        let changed = f(&mut registry);
        if changed {
            self.revision.send_replace(registry.revision());
        }
        changed
    }
}

/// A view's claim on the breadcrumb title of one path.
///
/// Dropping it removes the title, unless another view has replaced it since.
#[derive(Debug)]
pub struct TitleRegistration {
    overrides: SharedOverrides,
    path: String,
    title: String,
}

impl TitleRegistration {
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// Re-announces with a new title; unchanged titles cause no write.
    pub fn update(&mut self, title: &str) {
        if title.is_empty() || title == self.title {
            return;
        }
        self.overrides.set(&self.path, title);
        self.title = title.to_string();
    }
}

impl Drop for TitleRegistration {
    fn drop(&mut self) {
        let cleared = self
            .overrides
            .mutate(|registry| registry.clear_if(&self.path, &self.title));
        if cleared {
            judge_debug!("cleared breadcrumb title for {}", self.path);
        }
    }
}
