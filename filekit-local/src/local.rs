// SPDX-License-Identifier: AGPL-3.0-or-later
//! Local filesystem file handles

use chrono::{DateTime, Utc};
use filekit_core::{
    handle::{handles_equal, is_symlink_under, FileHandle, FileRef, InputStream, OutputStream},
    path::{path_string, OsResolver, PathResolver, ResolvedPath},
    FhError, FhResult, LOCAL_BACKEND,
};
use once_cell::sync::OnceCell;
use std::ffi::OsStr;
use std::fmt;
use std::fs::{self, OpenOptions};
use std::hash::{Hash, Hasher};
use std::path::Path;
use std::sync::Arc;

/// A file or directory on local disk.
///
/// Paths are resolved once at construction. The parent handle and the
/// symlink flag are derived lazily and cached; every other attribute is read
/// from the OS on each call.
#[derive(Debug, Clone)]
pub struct LocalFile {
    resolved: ResolvedPath,
    resolver: Arc<dyn PathResolver>,
    parent: OnceCell<Option<Arc<LocalFile>>>,
    symlink: OnceCell<bool>,
}

impl LocalFile {
    /// Wrap `path`, resolving it against the working directory if relative.
    ///
    /// The path does not have to exist.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self::with_resolver(path, Arc::new(OsResolver))
    }

    /// Like [`LocalFile::new`] with a custom resolver, inherited by every
    /// handle navigated to from this one
    pub fn with_resolver(path: impl AsRef<Path>, resolver: Arc<dyn PathResolver>) -> Self {
        let resolved = resolver.resolve(path.as_ref());
        Self {
            resolved,
            resolver,
            parent: OnceCell::new(),
            symlink: OnceCell::new(),
        }
    }

    /// Entry found while listing `parent`, which becomes its cached parent
    fn child_of(parent: &Arc<LocalFile>, path: &Path) -> Self {
        Self {
            resolved: parent.resolver.resolve(path),
            resolver: Arc::clone(&parent.resolver),
            parent: OnceCell::with_value(Some(Arc::clone(parent))),
            symlink: OnceCell::new(),
        }
    }

    /// Normalized absolute path
    pub fn path(&self) -> &Path {
        self.resolved.path()
    }

    pub fn canonical(&self) -> &str {
        self.resolved.canonical()
    }

    pub fn is_root(&self) -> bool {
        self.resolved.is_root()
    }

    /// Typed counterpart of [`FileHandle::parent`]; shares its cache
    pub fn local_parent(&self) -> Option<&Arc<LocalFile>> {
        self.parent
            .get_or_init(|| {
                self.path().parent().map(|parent| {
                    tracing::trace!(path = %self.absolute_path(), "resolving parent");
                    Arc::new(Self::with_resolver(parent, Arc::clone(&self.resolver)))
                })
            })
            .as_ref()
    }

    fn metadata_fs(&self) -> Option<fs::Metadata> {
        fs::metadata(self.path()).ok()
    }
}

impl FileHandle for LocalFile {
    fn backend(&self) -> &str {
        LOCAL_BACKEND
    }

    fn name(&self) -> String {
        if self.is_root() {
            return self.resolved.absolute().to_string();
        }
        self.path()
            .components()
            .next_back()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    fn absolute_path(&self) -> &str {
        self.resolved.absolute()
    }

    fn canonical_path(&self) -> Option<&str> {
        Some(self.resolved.canonical())
    }

    fn canonical_os(&self) -> Option<&OsStr> {
        Some(self.resolved.canonical_path().as_os_str())
    }

    fn parent(&self) -> Option<FileRef> {
        self.local_parent().map(|parent| Arc::clone(parent) as FileRef)
    }

    fn is_symlink(&self) -> bool {
        *self.symlink.get_or_init(|| {
            let parent = self.local_parent().map(|p| &**p as &dyn FileHandle);
            let name = match self.path().components().next_back() {
                Some(last) if !self.is_root() => last.as_os_str(),
                _ => self.path().as_os_str(),
            };
            is_symlink_under(self.canonical_os(), parent, name)
        })
    }

    fn date(&self) -> Option<DateTime<Utc>> {
        self.metadata_fs()
            .and_then(|m| m.modified().ok())
            .map(DateTime::<Utc>::from)
    }

    fn size(&self) -> Option<u64> {
        self.metadata_fs().map(|m| m.len())
    }

    fn exists(&self) -> bool {
        self.path().exists()
    }

    fn can_read(&self) -> bool {
        access::readable(self.path())
    }

    fn can_write(&self) -> bool {
        access::writable(self.path())
    }

    fn is_hidden(&self) -> bool {
        access::hidden(self)
    }

    fn is_directory(&self) -> bool {
        self.path().is_dir()
    }

    fn ls(&self) -> FhResult<Vec<FileRef>> {
        let entries =
            fs::read_dir(self.path()).map_err(|e| FhError::listing(self.absolute_path(), e))?;

        // One shared copy of this handle becomes every child's parent
        let parent = Arc::new(self.clone());
        let mut children: Vec<FileRef> = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| FhError::listing(self.absolute_path(), e))?;
            children.push(Arc::new(Self::child_of(&parent, &entry.path())));
        }

        tracing::trace!(path = %self.absolute_path(), count = children.len(), "listed directory");
        Ok(children)
    }

    fn mkdir(&self, name: &str) -> FhResult<()> {
        let target = self.path().join(name);
        fs::create_dir(&target).map_err(|e| FhError::creation(path_string(&target), e))?;
        tracing::debug!(path = %target.display(), "created directory");
        Ok(())
    }

    fn delete(&self) -> FhResult<()> {
        let path = self.path();
        let deletion = |e| FhError::deletion(self.absolute_path(), e);

        // symlink_metadata so a link is removed rather than its target
        let meta = fs::symlink_metadata(path).map_err(deletion)?;
        if meta.is_dir() {
            fs::remove_dir(path).map_err(deletion)?;
        } else {
            fs::remove_file(path).map_err(deletion)?;
        }
        tracing::debug!(path = %self.absolute_path(), "deleted");
        Ok(())
    }

    fn move_to(&self, dest: &dyn FileHandle) -> FhResult<bool> {
        if dest.backend() != LOCAL_BACKEND {
            tracing::debug!(
                from = %self.absolute_path(),
                backend = dest.backend(),
                "cannot rename across backends"
            );
            return Ok(false);
        }

        fs::rename(self.path(), dest.absolute_path()).map_err(|source| FhError::Move {
            from: self.absolute_path().to_string(),
            to: dest.absolute_path().to_string(),
            source,
        })?;
        Ok(true)
    }

    fn input_stream(&self) -> FhResult<InputStream> {
        let file = fs::File::open(self.path()).map_err(|e| FhError::io(self.absolute_path(), e))?;
        Ok(Box::new(file))
    }

    fn output_stream(&self, append: bool) -> FhResult<OutputStream> {
        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .append(append)
            .truncate(!append)
            .open(self.path())
            .map_err(|e| FhError::io(self.absolute_path(), e))?;
        Ok(Box::new(file))
    }
}

impl PartialEq for LocalFile {
    fn eq(&self, other: &Self) -> bool {
        handles_equal(self, other)
    }
}

impl Eq for LocalFile {}

impl Hash for LocalFile {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.resolved.canonical_path().hash(state);
    }
}

impl fmt::Display for LocalFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

/// Platform specific attribute checks
mod access {
    use super::LocalFile;
    use filekit_core::FileHandle;
    use std::path::Path;

    #[cfg(unix)]
    fn check(path: &Path, mode: libc::c_int) -> bool {
        use std::ffi::CString;
        use std::os::unix::ffi::OsStrExt;

        let Ok(c_path) = CString::new(path.as_os_str().as_bytes()) else {
            return false;
        };
        // SAFETY: c_path is a valid NUL-terminated string that outlives the call
        unsafe { libc::access(c_path.as_ptr(), mode) == 0 }
    }

    #[cfg(unix)]
    pub(super) fn readable(path: &Path) -> bool {
        check(path, libc::R_OK)
    }

    #[cfg(unix)]
    pub(super) fn writable(path: &Path) -> bool {
        check(path, libc::W_OK)
    }

    #[cfg(unix)]
    pub(super) fn hidden(file: &LocalFile) -> bool {
        !file.is_root() && file.name().starts_with('.')
    }

    #[cfg(not(unix))]
    pub(super) fn readable(path: &Path) -> bool {
        path.exists()
    }

    #[cfg(not(unix))]
    pub(super) fn writable(path: &Path) -> bool {
        std::fs::metadata(path)
            .map(|m| !m.permissions().readonly())
            .unwrap_or(false)
    }

    #[cfg(windows)]
    pub(super) fn hidden(file: &LocalFile) -> bool {
        use std::os::windows::fs::MetadataExt;
        const FILE_ATTRIBUTE_HIDDEN: u32 = 0x2;

        std::fs::metadata(file.path())
            .map(|m| m.file_attributes() & FILE_ATTRIBUTE_HIDDEN != 0)
            .unwrap_or(false)
    }

    #[cfg(not(any(unix, windows)))]
    pub(super) fn hidden(file: &LocalFile) -> bool {
        file.name().starts_with('.')
    }
}
