// SPDX-License-Identifier: AGPL-3.0-or-later
//! filekit core
//!
//! The file handle contract shared by every storage backend, plus path
//! resolution, equality rules and the provider registry.

pub mod error;
pub mod handle;
pub mod metadata;
pub mod path;
pub mod registry;

pub use error::{FhError, FhResult};
pub use handle::{handles_equal, is_symlink_under, FileHandle, FileRef, InputStream, OutputStream};
pub use metadata::{Metadata, Permissions};
pub use path::{OsResolver, PathResolver, ResolvedPath, SEPARATOR};
pub use registry::{HandleProvider, ProviderRegistry, LOCAL_BACKEND};
