//! Registered sources, priority order, and availability flags.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

use aniroute_core::{AnimeSource, AnirouteError, SourceCapabilities};

/// A source as seen by the orchestrator: the adapter, its capability flags
/// (resolved once), and the routing availability flag.
pub struct RegisteredSource {
    source: Arc<dyn AnimeSource>,
    capabilities: SourceCapabilities,
    available: AtomicBool,
}

impl RegisteredSource {
    fn new(source: Arc<dyn AnimeSource>) -> Self {
        let capabilities = SourceCapabilities::probe(source.as_ref());
        Self {
            source,
            capabilities,
            available: AtomicBool::new(true),
        }
    }

    /// Registered name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.source.name()
    }

    /// The adapter.
    #[must_use]
    pub fn source(&self) -> &Arc<dyn AnimeSource> {
        &self.source
    }

    /// Capability flags resolved at registration.
    #[must_use]
    pub const fn capabilities(&self) -> SourceCapabilities {
        self.capabilities
    }

    /// Whether the source can serve every flag in `required`.
    #[must_use]
    pub const fn supports(&self, required: SourceCapabilities) -> bool {
        self.capabilities.contains(required)
    }

    /// Whether the orchestrator currently routes to this source.
    #[must_use]
    pub fn is_available(&self) -> bool {
        self.available.load(Ordering::Relaxed)
    }

    /// Set the availability flag, returning the previous value.
    pub fn set_available(&self, available: bool) -> bool {
        self.available.swap(available, Ordering::Relaxed)
    }
}

impl std::fmt::Debug for RegisteredSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegisteredSource")
            .field("name", &self.name())
            .field("capabilities", &self.capabilities)
            .field("available", &self.is_available())
            .finish()
    }
}

/// Ordered set of sources with a mutable priority permutation.
///
/// Registration order never changes. The priority order is a duplicate-free
/// permutation of every registered name and changes only through
/// [`SourceRegistry::promote`].
#[derive(Debug)]
pub struct SourceRegistry {
    sources: Vec<Arc<RegisteredSource>>,
    priority: RwLock<Vec<&'static str>>,
}

impl SourceRegistry {
    /// Register `sources` (names must be unique) and derive the priority order:
    /// names listed in `preferred` first, then the rest in registration order.
    /// Unknown or repeated preferred names are ignored.
    #[must_use]
    pub fn new(sources: Vec<Arc<dyn AnimeSource>>, preferred: &[&'static str]) -> Self {
        let sources: Vec<Arc<RegisteredSource>> = sources
            .into_iter()
            .map(|s| Arc::new(RegisteredSource::new(s)))
            .collect();

        let mut priority: Vec<&'static str> = Vec::with_capacity(sources.len());
        let known: HashSet<&'static str> = sources.iter().map(|s| s.name()).collect();
        for &name in preferred {
            if known.contains(name) && !priority.contains(&name) {
                priority.push(name);
            }
        }
        for s in &sources {
            if !priority.contains(&s.name()) {
                priority.push(s.name());
            }
        }

        Self {
            sources,
            priority: RwLock::new(priority),
        }
    }

    /// Look up a source by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Arc<RegisteredSource>> {
        self.sources.iter().find(|s| s.name() == name)
    }

    /// Sources in registration order.
    #[must_use]
    pub fn sources(&self) -> &[Arc<RegisteredSource>] {
        &self.sources
    }

    /// Current priority order.
    ///
    /// # Panics
    /// Panics if the priority lock was poisoned.
    #[must_use]
    pub fn priority(&self) -> Vec<&'static str> {
        self.priority.read().expect("priority lock poisoned").clone()
    }

    /// Sources in priority order, available or not.
    #[must_use]
    pub fn ordered(&self) -> Vec<Arc<RegisteredSource>> {
        self.priority()
            .into_iter()
            .filter_map(|name| self.get(name).cloned())
            .collect()
    }

    /// Pick a source: `preferred` when it is registered and available;
    /// otherwise the first available source in priority order; otherwise the
    /// first available source in registration order.
    #[must_use]
    pub fn select(&self, preferred: Option<&str>) -> Option<Arc<RegisteredSource>> {
        self.select_excluding(preferred, &HashSet::new(), SourceCapabilities::empty())
    }

    /// [`select`](Self::select) restricted to sources outside `visited` that
    /// advertise every flag in `required`.
    #[must_use]
    pub fn select_excluding(
        &self,
        preferred: Option<&str>,
        visited: &HashSet<&'static str>,
        required: SourceCapabilities,
    ) -> Option<Arc<RegisteredSource>> {
        let eligible = |s: &RegisteredSource| {
            s.is_available() && s.supports(required) && !visited.contains(s.name())
        };

        if let Some(name) = preferred
            && let Some(s) = self.get(name)
            && eligible(s.as_ref())
        {
            return Some(Arc::clone(s));
        }
        if let Some(s) = self.ordered().into_iter().find(|s| eligible(s.as_ref())) {
            return Some(s);
        }
        self.sources.iter().find(|s| eligible(s.as_ref())).cloned()
    }

    /// Move `name` to the front of the priority order, keeping the relative
    /// order of the rest.
    ///
    /// # Errors
    /// Returns `InvalidArg` when `name` is not registered.
    ///
    /// # Panics
    /// Panics if the priority lock was poisoned.
    pub fn promote(&self, name: &str) -> Result<(), AnirouteError> {
        let Some(source) = self.get(name) else {
            return Err(AnirouteError::InvalidArg(format!("unknown source: {name}")));
        };
        let key = source.name();
        let mut order = self.priority.write().expect("priority lock poisoned");
        order.retain(|n| *n != key);
        order.insert(0, key);
        Ok(())
    }

    /// Clear the availability flag of `name`. Returns `true` when the flag
    /// was previously set.
    pub fn mark_unavailable(&self, name: &str) -> bool {
        self.get(name).is_some_and(|s| s.set_available(false))
    }
}
