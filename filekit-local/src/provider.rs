// SPDX-License-Identifier: AGPL-3.0-or-later
//! Local handle provider

use filekit_core::{
    FhError, FhResult, FileRef, HandleProvider, OsResolver, PathResolver, LOCAL_BACKEND,
};
use std::sync::Arc;

use crate::LocalFile;

/// Opens [`LocalFile`] handles for the `local` backend
#[derive(Debug, Clone)]
pub struct LocalProvider {
    resolver: Arc<dyn PathResolver>,
}

impl LocalProvider {
    pub fn new() -> Self {
        Self::with_resolver(Arc::new(OsResolver))
    }

    pub fn with_resolver(resolver: Arc<dyn PathResolver>) -> Self {
        Self { resolver }
    }
}

impl Default for LocalProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl HandleProvider for LocalProvider {
    fn id(&self) -> &str {
        LOCAL_BACKEND
    }

    fn display_name(&self) -> &str {
        "Local Filesystem"
    }

    fn open(&self, path: &str) -> FhResult<FileRef> {
        if path.contains('\0') {
            return Err(FhError::InvalidPath(path.to_string()));
        }
        Ok(Arc::new(LocalFile::with_resolver(path, Arc::clone(&self.resolver))))
    }
}
