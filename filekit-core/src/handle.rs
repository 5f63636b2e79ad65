// SPDX-License-Identifier: AGPL-3.0-or-later
//! File handle contract
//!
//! Every storage backend (local disk, archive contents, remote protocols)
//! exposes its files through [`FileHandle`]. The application only ever sees
//! `Arc<dyn FileHandle>`, so the semantics below must hold identically for
//! every implementation.

use chrono::{DateTime, Utc};
use std::ffi::OsStr;
use std::fmt;
use std::io::{Read, Write};
use std::sync::Arc;

use crate::{
    error::FhResult,
    metadata::{Metadata, Permissions},
    path::{join_name, SEPARATOR},
};

/// Shared handle to a file in any backend
pub type FileRef = Arc<dyn FileHandle>;

/// Byte source returned by [`FileHandle::input_stream`]
pub type InputStream = Box<dyn Read + Send>;

/// Byte sink returned by [`FileHandle::output_stream`]
pub type OutputStream = Box<dyn Write + Send>;

/// A reference to one file or directory in some backend.
///
/// Identity accessors and `parent`/`is_symlink` are cheap after the first
/// call. Attribute queries (`date`, `size`, `exists`, ...) go to the backend
/// on every call.
pub trait FileHandle: Send + Sync + fmt::Debug {
    /// Backend family id, e.g. `"local"`
    fn backend(&self) -> &str;

    /// Last path component; roots return their full path with separator
    fn name(&self) -> String;

    /// Absolute path used to target I/O
    fn absolute_path(&self) -> &str;

    /// Symlink-free path for display, if the backend has one
    fn canonical_path(&self) -> Option<&str>;

    /// Exact form of [`FileHandle::canonical_path`] used for equality.
    ///
    /// Backends whose paths may not be valid UTF-8 must override this so
    /// distinct names never collapse into one lossy string.
    fn canonical_os(&self) -> Option<&OsStr> {
        self.canonical_path().map(OsStr::new)
    }

    fn separator(&self) -> &str {
        SEPARATOR
    }

    /// Containing directory, `None` for roots. Computed once.
    fn parent(&self) -> Option<FileRef>;

    /// Whether this entry is reached through a symbolic link. Computed once.
    fn is_symlink(&self) -> bool;

    fn date(&self) -> Option<DateTime<Utc>>;
    fn size(&self) -> Option<u64>;
    fn exists(&self) -> bool;
    fn can_read(&self) -> bool;
    fn can_write(&self) -> bool;
    fn is_hidden(&self) -> bool;
    fn is_directory(&self) -> bool;

    /// Snapshot of the live attribute queries
    fn metadata(&self) -> Metadata {
        Metadata {
            exists: self.exists(),
            size: self.size(),
            modified: self.date(),
            is_directory: self.is_directory(),
            is_hidden: self.is_hidden(),
            is_symlink: self.is_symlink(),
            permissions: Permissions::new(self.can_read(), self.can_write()),
        }
    }

    /// Immediate children, freshly constructed.
    ///
    /// A directory that cannot be enumerated is an error, never an empty list.
    fn ls(&self) -> FhResult<Vec<FileRef>>;

    /// Create a child directory called `name`
    fn mkdir(&self, name: &str) -> FhResult<()>;

    /// Remove this entry
    fn delete(&self) -> FhResult<()>;

    /// Rename this entry onto `dest`.
    ///
    /// Returns `Ok(false)` when `dest` belongs to a backend this one cannot
    /// move into; the caller should copy then delete instead.
    fn move_to(&self, dest: &dyn FileHandle) -> FhResult<bool>;

    fn input_stream(&self) -> FhResult<InputStream>;

    /// Open for writing, truncating unless `append`
    fn output_stream(&self, append: bool) -> FhResult<OutputStream>;

    /// Cross-backend equivalence rule.
    ///
    /// Only consulted when `other` is from a different family. `None` means
    /// this backend has no rule for `other`, which counts as "not equal".
    fn equivalent_to(&self, _other: &dyn FileHandle) -> Option<bool> {
        None
    }
}

/// Equality between handles of any backend.
///
/// Same family: canonical paths must both exist and match. Different
/// families: either side's [`FileHandle::equivalent_to`] rule decides.
pub fn handles_equal(a: &dyn FileHandle, b: &dyn FileHandle) -> bool {
    if a.backend() == b.backend() {
        return match (a.canonical_os(), b.canonical_os()) {
            (Some(left), Some(right)) => left == right,
            _ => false,
        };
    }
    a.equivalent_to(b)
        .or_else(|| b.equivalent_to(a))
        .unwrap_or(false)
}

/// Shared symlink policy.
///
/// An entry is a symlink when its canonical path differs from its parent's
/// canonical path joined with its name. Without a parent or a canonical path
/// it is never a symlink.
pub fn is_symlink_under(
    canonical: Option<&OsStr>,
    parent: Option<&dyn FileHandle>,
    name: &OsStr,
) -> bool {
    let (Some(canonical), Some(parent)) = (canonical, parent) else {
        return false;
    };
    match parent.canonical_os() {
        Some(parent_canonical) => {
            canonical != join_name(parent_canonical, parent.separator(), name).as_os_str()
        }
        None => false,
    }
}

impl<'a> PartialEq for dyn FileHandle + 'a {
    fn eq(&self, other: &Self) -> bool {
        handles_equal(self, other)
    }
}

impl<'a> fmt::Display for dyn FileHandle + 'a {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}
