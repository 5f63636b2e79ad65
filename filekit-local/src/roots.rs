// SPDX-License-Identifier: AGPL-3.0-or-later
//! Filesystem roots
//!
//! Roots are enumerated once per process. Probing drives can have visible
//! side effects on some systems (removable media prompts), so the list is
//! never refreshed.

use filekit_core::FileHandle;
use once_cell::sync::OnceCell;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::LocalFile;

static REGISTRY: OnceCell<RootRegistry> = OnceCell::new();

/// Process-wide list of local filesystem roots
#[derive(Debug)]
pub struct RootRegistry {
    roots: Vec<Arc<LocalFile>>,
}

impl RootRegistry {
    /// Enumerate roots on first call; later calls return the same registry.
    ///
    /// Concurrent first calls block until a single enumeration finishes.
    pub fn init() -> &'static RootRegistry {
        Self::init_in(&REGISTRY, enumerate_roots)
    }

    fn init_in(
        cell: &OnceCell<RootRegistry>,
        enumerate: impl FnOnce() -> Vec<PathBuf>,
    ) -> &RootRegistry {
        cell.get_or_init(|| {
            let roots: Vec<Arc<LocalFile>> = enumerate()
                .into_iter()
                .map(|path| Arc::new(LocalFile::new(path)))
                .collect();
            tracing::debug!(count = roots.len(), "enumerated filesystem roots");
            Self { roots }
        })
    }

    /// The registry, if [`RootRegistry::init`] already ran
    pub fn get() -> Option<&'static RootRegistry> {
        REGISTRY.get()
    }

    pub fn roots(&self) -> &[Arc<LocalFile>] {
        &self.roots
    }

    pub fn len(&self) -> usize {
        self.roots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// Root that contains `handle`, compared on absolute paths
    pub fn root_of(&self, handle: &dyn FileHandle) -> Option<&Arc<LocalFile>> {
        let path = Path::new(handle.absolute_path());
        self.roots.iter().find(|root| path.starts_with(root.path()))
    }
}

#[cfg(windows)]
fn enumerate_roots() -> Vec<PathBuf> {
    (b'A'..=b'Z')
        .map(|drive| PathBuf::from(format!("{}:\\", drive as char)))
        .filter(|path| path.exists())
        .collect()
}

#[cfg(not(windows))]
fn enumerate_roots() -> Vec<PathBuf> {
    vec![PathBuf::from("/")]
}
