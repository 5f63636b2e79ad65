// SPDX-License-Identifier: AGPL-3.0-or-later
//! Provider registry
//!
//! Maps backend ids to the providers that open handles for them. Archive and
//! remote backends plug in here; the application resolves every location
//! string through [`ProviderRegistry::open`].

use std::collections::HashMap;
use std::sync::Arc;

use crate::{
    error::{FhError, FhResult},
    handle::FileRef,
};

/// Backend id of the local filesystem, also the fallback for bare paths
pub const LOCAL_BACKEND: &str = "local";

/// Opens handles for one backend family
pub trait HandleProvider: Send + Sync {
    /// Family id, matches [`crate::FileHandle::backend`] of opened handles
    fn id(&self) -> &str;

    fn display_name(&self) -> &str;

    /// Open a handle for `path`, which is backend specific
    fn open(&self, path: &str) -> FhResult<FileRef>;
}

/// Registry of handle providers
pub struct ProviderRegistry {
    providers: HashMap<String, Arc<dyn HandleProvider>>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self { providers: HashMap::new() }
    }

    pub fn register(&mut self, provider: Arc<dyn HandleProvider>) {
        tracing::debug!(id = provider.id(), "registering provider");
        self.providers.insert(provider.id().to_string(), provider);
    }

    pub fn get(&self, id: &str) -> Option<Arc<dyn HandleProvider>> {
        self.providers.get(id).cloned()
    }

    pub fn get_or_err(&self, id: &str) -> FhResult<Arc<dyn HandleProvider>> {
        self.get(id).ok_or_else(|| FhError::BackendNotFound(id.to_string()))
    }

    /// Registered ids in sorted order
    pub fn list(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.providers.keys().map(|s| s.as_str()).collect();
        ids.sort_unstable();
        ids
    }

    pub fn remove(&mut self, id: &str) -> Option<Arc<dyn HandleProvider>> {
        self.providers.remove(id)
    }

    /// Open a location.
    ///
    /// `<id>://<path>` goes to provider `<id>`; anything else is a local path.
    pub fn open(&self, location: &str) -> FhResult<FileRef> {
        let (id, path) = split_location(location);
        if path.is_empty() {
            return Err(FhError::InvalidPath(location.to_string()));
        }
        self.get_or_err(id)?.open(path)
    }
}

impl Default for ProviderRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Split `scheme://path` into `(scheme, path)`; bare paths are local
pub fn split_location(location: &str) -> (&str, &str) {
    match location.split_once("://") {
        Some((scheme, path)) if is_scheme(scheme) => (scheme, path),
        _ => (LOCAL_BACKEND, location),
    }
}

// Excludes Windows drive letters and anything with separators
fn is_scheme(s: &str) -> bool {
    s.len() > 1
        && s.chars().next().is_some_and(|c| c.is_ascii_alphabetic())
        && s.chars().all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}
