// SPDX-License-Identifier: AGPL-3.0-or-later
//! Path resolution
//!
//! Turns a raw path into the `(absolute, canonical)` pair a handle is built
//! from. Resolution never fails: when the OS cannot canonicalize a path the
//! canonical form falls back to the absolute one.

use std::ffi::{OsStr, OsString};
use std::fmt;
use std::io;
use std::path::{Component, Path, PathBuf, MAIN_SEPARATOR, MAIN_SEPARATOR_STR};

/// Native path separator ("/" on Unix, "\" on Windows)
pub const SEPARATOR: &str = MAIN_SEPARATOR_STR;

/// Absolute and canonical forms of one path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPath {
    path: PathBuf,
    absolute: String,
    canonical_path: PathBuf,
    canonical: String,
}

impl ResolvedPath {
    /// Build from an already absolute path and its canonical form
    pub fn new(absolute: PathBuf, canonical: PathBuf) -> Self {
        let path = normalize(&absolute);
        let canonical_path = normalize(&canonical);
        Self {
            absolute: path_string(&path),
            canonical: path_string(&canonical_path),
            path,
            canonical_path,
        }
    }

    /// Normalized absolute path, suitable for I/O
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Absolute path string; only roots end with a separator
    pub fn absolute(&self) -> &str {
        &self.absolute
    }

    /// Symlink-free path string, or the absolute path if resolution failed.
    ///
    /// Lossy for names that are not valid UTF-8; compare
    /// [`ResolvedPath::canonical_path`] instead.
    pub fn canonical(&self) -> &str {
        &self.canonical
    }

    /// Symlink-free path with the exact OS bytes
    pub fn canonical_path(&self) -> &Path {
        &self.canonical_path
    }

    pub fn is_root(&self) -> bool {
        is_root(&self.path)
    }
}

/// Strategy for turning raw paths into [`ResolvedPath`]s
///
/// [`OsResolver`] is what local handles use; the trait exists so callers can
/// observe or replace the resolution step.
pub trait PathResolver: Send + Sync + fmt::Debug {
    /// Make `raw` absolute without touching symlinks
    fn absolute(&self, raw: &Path) -> PathBuf;

    /// OS-level canonicalization of an absolute path
    fn canonicalize(&self, absolute: &Path) -> io::Result<PathBuf>;

    fn resolve(&self, raw: &Path) -> ResolvedPath {
        let absolute = normalize(&self.absolute(raw));
        let canonical = match self.canonicalize(&absolute) {
            Ok(canonical) => canonical,
            Err(e) => {
                tracing::debug!(
                    path = %absolute.display(),
                    error = %e,
                    "canonicalization failed, using absolute path"
                );
                absolute.clone()
            }
        };
        ResolvedPath::new(absolute, canonical)
    }
}

/// Resolver backed by the host OS
#[derive(Debug, Clone, Copy, Default)]
pub struct OsResolver;

impl PathResolver for OsResolver {
    fn absolute(&self, raw: &Path) -> PathBuf {
        if raw.is_absolute() {
            return raw.to_path_buf();
        }
        match std::env::current_dir() {
            Ok(cwd) => resolve_from(raw, &cwd),
            Err(e) => {
                tracing::warn!(path = %raw.display(), error = %e, "cannot read working directory");
                raw.to_path_buf()
            }
        }
    }

    fn canonicalize(&self, absolute: &Path) -> io::Result<PathBuf> {
        std::fs::canonicalize(absolute).map(simplify)
    }
}

/// Resolve `raw` with the OS resolver
pub fn resolve(raw: impl AsRef<Path>) -> ResolvedPath {
    OsResolver.resolve(raw.as_ref())
}

/// Join a relative path onto `base`; absolute paths are returned as-is
pub fn resolve_from(raw: &Path, base: &Path) -> PathBuf {
    if raw.is_absolute() {
        raw.to_path_buf()
    } else {
        base.join(raw)
    }
}

/// Drop redundant separators and interior `.` components.
///
/// `..` is left alone; only canonicalization may resolve it.
pub fn normalize(path: &Path) -> PathBuf {
    path.components().collect()
}

/// True for filesystem roots (`/`, `C:\`)
pub fn is_root(path: &Path) -> bool {
    path.parent().is_none()
        && path
            .components()
            .any(|c| matches!(c, Component::RootDir | Component::Prefix(_)))
}

/// Render a path, stripping one trailing separator unless it is a root
pub fn path_string(path: &Path) -> String {
    let s = path.to_string_lossy().into_owned();
    if is_root(path) {
        return s;
    }
    match s.strip_suffix(MAIN_SEPARATOR) {
        Some(stripped) if !stripped.is_empty() => stripped.to_string(),
        _ => s,
    }
}

/// Join a child name onto a parent path with one separator
pub fn join_name(parent: &OsStr, separator: &str, name: &OsStr) -> OsString {
    let mut joined = OsString::with_capacity(parent.len() + separator.len() + name.len());
    joined.push(parent);
    if !parent.as_encoded_bytes().ends_with(separator.as_bytes()) {
        joined.push(separator);
    }
    joined.push(name);
    joined
}

// Windows canonicalization yields verbatim `\\?\C:\...` and
// `\\?\UNC\server\share\...` paths
#[cfg(windows)]
fn simplify(path: PathBuf) -> PathBuf {
    match path.to_str().and_then(strip_verbatim) {
        Some(plain) => PathBuf::from(plain),
        None => path,
    }
}

#[cfg(not(windows))]
fn simplify(path: PathBuf) -> PathBuf {
    path
}

/// Plain form of a verbatim drive or UNC path, `None` for anything else
#[cfg_attr(not(windows), allow(dead_code))]
fn strip_verbatim(path: &str) -> Option<String> {
    if let Some(share) = path.strip_prefix(r"\\?\UNC\") {
        return Some(format!(r"\\{share}"));
    }
    path.strip_prefix(r"\\?\")
        .filter(|rest| rest.as_bytes().get(1) == Some(&b':'))
        .map(String::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(unix)]
    #[test]
    fn test_resolve_from_relative() {
        let base = Path::new("/home/user");
        assert_eq!(resolve_from(Path::new("docs"), base), PathBuf::from("/home/user/docs"));
    }

    #[cfg(unix)]
    #[test]
    fn test_resolve_from_absolute_ignores_base() {
        let base = Path::new("/home/user");
        assert_eq!(resolve_from(Path::new("/etc"), base), PathBuf::from("/etc"));
    }

    #[cfg(unix)]
    #[test]
    fn test_normalize() {
        assert_eq!(normalize(Path::new("/a//b/./c/")), PathBuf::from("/a/b/c"));
        assert_eq!(normalize(Path::new("/a/../b")), PathBuf::from("/a/../b"));
        assert_eq!(normalize(Path::new("/")), PathBuf::from("/"));
    }

    #[cfg(unix)]
    #[test]
    fn test_is_root() {
        assert!(is_root(Path::new("/")));
        assert!(!is_root(Path::new("/tmp")));
        assert!(!is_root(Path::new("relative")));
    }

    #[cfg(unix)]
    #[test]
    fn test_path_string_strips_trailing_separator() {
        assert_eq!(path_string(Path::new("/tmp/foo/")), "/tmp/foo");
        assert_eq!(path_string(Path::new("/tmp/foo")), "/tmp/foo");
        assert_eq!(path_string(Path::new("/")), "/");
    }

    #[test]
    fn test_join_name() {
        let join = |parent: &str, sep: &str, name: &str| {
            join_name(OsStr::new(parent), sep, OsStr::new(name))
        };
        assert_eq!(join("/", "/", "etc"), "/etc");
        assert_eq!(join("/home", "/", "user"), "/home/user");
        assert_eq!(join(r"C:\", r"\", "Users"), r"C:\Users");
    }

    #[test]
    fn test_strip_verbatim() {
        assert_eq!(strip_verbatim(r"\\?\C:\Users").as_deref(), Some(r"C:\Users"));
        assert_eq!(
            strip_verbatim(r"\\?\UNC\server\share\dir").as_deref(),
            Some(r"\\server\share\dir")
        );
        assert_eq!(strip_verbatim(r"\\?\Volume{1234}\dir"), None);
        assert_eq!(strip_verbatim(r"C:\Users"), None);
    }

    // macOS file systems reject names that are not valid UTF-8
    #[cfg(target_os = "linux")]
    #[test]
    fn test_canonical_path_keeps_non_utf8_bytes() {
        use std::os::unix::ffi::OsStrExt;

        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join(OsStr::from_bytes(b"n\xff"));
        let b = dir.path().join(OsStr::from_bytes(b"n\xfe"));
        std::fs::write(&a, b"a").unwrap();
        std::fs::write(&b, b"b").unwrap();

        let (ra, rb) = (resolve(&a), resolve(&b));
        assert_eq!(ra.canonical(), rb.canonical());
        assert_ne!(ra.canonical_path(), rb.canonical_path());
        assert!(ra.canonical_path().ends_with(OsStr::from_bytes(b"n\xff")));
    }

    #[cfg(unix)]
    #[test]
    fn test_resolve_missing_path_falls_back_to_absolute() {
        let resolved = resolve("/definitely/not/here/");
        assert_eq!(resolved.absolute(), "/definitely/not/here");
        assert_eq!(resolved.canonical(), "/definitely/not/here");
    }

    #[test]
    fn test_resolve_relative_is_absolute() {
        let resolved = resolve("some-relative-name");
        assert!(resolved.path().is_absolute());
        assert!(resolved.absolute().ends_with("some-relative-name"));
    }

    #[test]
    fn test_resolve_dotdot_canonicalizes_existing_path() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("a")).unwrap();
        let raw = dir.path().join("a").join("..").join("a");

        let resolved = resolve(&raw);
        let expected = path_string(&simplify(std::fs::canonicalize(dir.path().join("a")).unwrap()));
        assert_eq!(resolved.canonical(), expected);
        assert!(resolved.absolute().contains(".."));
    }

    #[cfg(unix)]
    #[test]
    fn test_root_keeps_separator() {
        let resolved = resolve("/");
        assert!(resolved.is_root());
        assert_eq!(resolved.absolute(), "/");
        assert_eq!(resolved.canonical(), "/");
    }
}
