// SPDX-License-Identifier: AGPL-3.0-or-later
//! CLI command implementations

use chrono::{DateTime, Utc};
use console::style;
use filekit_core::{FhError, FhResult, FileHandle, FileRef, ProviderRegistry};
use filekit_local::{LocalProvider, RootRegistry};
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, Write};
use std::sync::Arc;
use tabled::{Table, Tabled};

/// Initialize the provider registry with available backends
fn init_registry() -> ProviderRegistry {
    let mut registry = ProviderRegistry::new();
    registry.register(Arc::new(LocalProvider::new()));
    registry
}

fn open(registry: &ProviderRegistry, location: &str) -> FhResult<FileRef> {
    let handle = registry.open(location)?;
    tracing::debug!(location, path = handle.absolute_path(), backend = handle.backend(), "opened");
    Ok(handle)
}

/// Format a timestamp for display
fn format_time(dt: Option<DateTime<Utc>>) -> String {
    dt.map(|t| t.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "-".to_string())
}

/// Format file size
fn format_size(size: Option<u64>, human: bool) -> String {
    match size {
        Some(s) if human => bytesize::ByteSize(s).to_string(),
        Some(s) => s.to_string(),
        None => "-".to_string(),
    }
}

/// Format entry kind
fn format_kind(handle: &dyn FileHandle) -> String {
    if handle.is_symlink() {
        style("l").magenta().to_string()
    } else if handle.is_directory() {
        style("d").cyan().to_string()
    } else if handle.exists() {
        "-".to_string()
    } else {
        "?".to_string()
    }
}

#[derive(Tabled)]
struct LsEntry {
    #[tabled(rename = "Type")]
    kind: String,
    #[tabled(rename = "Access")]
    access: String,
    #[tabled(rename = "Size")]
    size: String,
    #[tabled(rename = "Modified")]
    modified: String,
    #[tabled(rename = "Name")]
    name: String,
}

/// List directory contents
pub fn ls(path: &str, long: bool, all: bool, human: bool) -> FhResult<()> {
    let registry = init_registry();
    let dir = open(&registry, path)?;

    let mut children: Vec<FileRef> = dir
        .ls()?
        .into_iter()
        .filter(|child| all || !child.is_hidden())
        .collect();
    children.sort_by_key(|child| child.name());

    if children.is_empty() {
        println!("(empty directory)");
        return Ok(());
    }

    if long {
        let entries: Vec<LsEntry> = children
            .iter()
            .map(|child| {
                let meta = child.metadata();
                LsEntry {
                    kind: format_kind(child.as_ref()),
                    access: meta.permissions.flags(),
                    size: format_size(meta.size, human),
                    modified: format_time(meta.modified),
                    name: child.name(),
                }
            })
            .collect();
        println!("{}", Table::new(entries));
    } else {
        for child in &children {
            println!("{}", child);
        }
    }

    Ok(())
}

/// Display file contents
pub fn cat(path: &str) -> FhResult<()> {
    let registry = init_registry();
    let file = open(&registry, path)?;

    let mut input = file.input_stream()?;
    let stdout = io::stdout();
    let mut out = stdout.lock();
    io::copy(&mut input, &mut out).map_err(|e| FhError::io(file.absolute_path(), e))?;
    out.flush().map_err(|e| FhError::io("stdout", e))?;
    Ok(())
}

/// Move/rename files
pub fn mv(source: &str, dest: &str) -> FhResult<()> {
    let registry = init_registry();
    let src = open(&registry, source)?;
    let dst = open(&registry, dest)?;

    if src.move_to(dst.as_ref())? {
        println!("Moved {} -> {}", source, dest);
        return Ok(());
    }

    // Backend cannot rename into dest: copy then delete
    tracing::debug!(from = src.backend(), to = dst.backend(), "falling back to copy and delete");
    let copied = transfer(src.as_ref(), dst.as_ref(), true)?;
    src.delete()?;
    println!("Moved {} -> {} ({})", source, dest, bytesize::ByteSize(copied));
    Ok(())
}

/// Stream `src` into `dst`, returning the number of bytes copied
pub fn transfer(src: &dyn FileHandle, dst: &dyn FileHandle, progress: bool) -> FhResult<u64> {
    if src.is_directory() {
        return Err(FhError::Unsupported(format!(
            "copying directory {} across backends",
            src.absolute_path()
        )));
    }

    let bar = if progress {
        let bar = ProgressBar::new(src.size().unwrap_or(0));
        if let Ok(template) = ProgressStyle::with_template("{bar:40} {bytes}/{total_bytes} {msg}") {
            bar.set_style(template);
        }
        bar.set_message(src.name());
        bar
    } else {
        ProgressBar::hidden()
    };

    let mut input = bar.wrap_read(src.input_stream()?);
    let mut output = dst.output_stream(false)?;
    let copied = io::copy(&mut input, &mut output).map_err(|e| FhError::io(dst.absolute_path(), e))?;
    output.flush().map_err(|e| FhError::io(dst.absolute_path(), e))?;
    bar.finish_and_clear();

    Ok(copied)
}

/// Remove files or directories
pub fn rm(paths: &[String]) -> FhResult<()> {
    let registry = init_registry();

    for path in paths {
        let handle = open(&registry, path)?;
        handle.delete()?;
        println!("Removed {}", path);
    }

    Ok(())
}

/// Create directories
pub fn mkdir(parent: &str, names: &[String]) -> FhResult<()> {
    let registry = init_registry();
    let dir = open(&registry, parent)?;

    for name in names {
        dir.mkdir(name)?;
        println!("Created {}", name);
    }

    Ok(())
}

/// Show file/directory information
pub fn stat(path: &str, json: bool) -> FhResult<()> {
    let registry = init_registry();
    let handle = open(&registry, path)?;
    let meta = handle.metadata();

    if json {
        let rendered = serde_json::to_string_pretty(&meta)
            .map_err(|e| FhError::io(handle.absolute_path(), e.into()))?;
        println!("{rendered}");
        return Ok(());
    }

    println!("  Path: {}", handle.absolute_path());
    if let Some(canonical) = handle.canonical_path() {
        if canonical != handle.absolute_path() {
            println!("  Canonical: {}", canonical);
        }
    }
    println!("  Backend: {}", handle.backend());
    println!("  Type: {}", format_kind(handle.as_ref()));

    if !meta.exists {
        println!("  {}", style("does not exist").red());
        return Ok(());
    }

    if let Some(size) = meta.size {
        println!("  Size: {} ({})", size, bytesize::ByteSize(size));
    }
    println!("  Access: {}", meta.permissions.flags());
    println!("  Hidden: {}", meta.is_hidden);
    if let Some(modified) = meta.modified {
        println!("  Modified: {}", modified);
    }

    Ok(())
}

/// List filesystem roots
pub fn roots() -> FhResult<()> {
    let registry = RootRegistry::init();

    for root in registry.roots() {
        let state = if root.exists() {
            style("available").green()
        } else {
            style("unavailable").red()
        };
        println!("  {} - {}", root, state);
    }

    Ok(())
}

/// List registered backends
pub fn backends() -> FhResult<()> {
    let registry = init_registry();

    println!("Registered backends:");
    for id in registry.list() {
        if let Some(provider) = registry.get(id) {
            println!("  {} ({})", id, provider.display_name());
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use filekit_local::LocalFile;
    use std::fs;

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(None, true), "-");
        assert_eq!(format_size(Some(2048), false), "2048");
        assert_ne!(format_size(Some(2048), true), "2048");
    }

    #[test]
    fn test_format_time() {
        assert_eq!(format_time(None), "-");
        let dt = DateTime::parse_from_rfc3339("2024-01-02T03:04:05Z")
            .unwrap()
            .with_timezone(&Utc);
        assert_eq!(format_time(Some(dt)), "2024-01-02 03:04");
    }

    #[test]
    fn test_format_kind() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("f"), b"x").unwrap();

        assert!(format_kind(&LocalFile::new(dir.path())).contains('d'));
        assert_eq!(format_kind(&LocalFile::new(dir.path().join("f"))), "-");
        assert_eq!(format_kind(&LocalFile::new(dir.path().join("missing"))), "?");
    }

    #[test]
    fn test_transfer() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("src"), b"some bytes").unwrap();
        let src = LocalFile::new(dir.path().join("src"));
        let dst = LocalFile::new(dir.path().join("dst"));

        assert_eq!(transfer(&src, &dst, false).unwrap(), 10);
        assert_eq!(fs::read(dir.path().join("dst")).unwrap(), b"some bytes");
        assert!(src.exists());
    }

    #[test]
    fn test_transfer_directory_unsupported() {
        let dir = tempfile::tempdir().unwrap();
        let src = LocalFile::new(dir.path());
        let dst = LocalFile::new(dir.path().join("copy"));
        assert!(matches!(transfer(&src, &dst, false), Err(FhError::Unsupported(_))));
    }

    #[test]
    fn test_mkdir_and_rm() {
        let dir = tempfile::tempdir().unwrap();
        let parent = dir.path().display().to_string();

        mkdir(&parent, &["a".to_string(), "b".to_string()]).unwrap();
        assert!(dir.path().join("a").is_dir());
        assert!(dir.path().join("b").is_dir());

        rm(&[dir.path().join("a").display().to_string()]).unwrap();
        assert!(!dir.path().join("a").exists());
        assert!(rm(&[dir.path().join("a").display().to_string()]).is_err());
    }

    #[test]
    fn test_mv_local() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a"), b"x").unwrap();

        mv(
            &dir.path().join("a").display().to_string(),
            &dir.path().join("b").display().to_string(),
        )
        .unwrap();
        assert!(!dir.path().join("a").exists());
        assert!(dir.path().join("b").exists());
    }
}
