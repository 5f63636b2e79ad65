// SPDX-License-Identifier: AGPL-3.0-or-later
//! File and directory metadata snapshots

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Point-in-time view of a handle's attributes.
///
/// Handles never cache these values; a snapshot is built from live queries
/// and goes stale as soon as the file changes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    pub exists: bool,
    pub size: Option<u64>,
    pub modified: Option<DateTime<Utc>>,
    pub is_directory: bool,
    pub is_hidden: bool,
    pub is_symlink: bool,
    pub permissions: Permissions,
}

/// Access rights of the current process
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Permissions {
    pub readable: bool,
    pub writable: bool,
}

impl Permissions {
    pub fn new(readable: bool, writable: bool) -> Self {
        Self { readable, writable }
    }

    /// `ls`-style two character rendering, e.g. `rw` or `r-`
    pub fn flags(&self) -> String {
        let r = if self.readable { 'r' } else { '-' };
        let w = if self.writable { 'w' } else { '-' };
        format!("{r}{w}")
    }
}

impl Metadata {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_size(mut self, size: u64) -> Self {
        self.size = Some(size);
        self
    }

    pub fn with_modified(mut self, modified: DateTime<Utc>) -> Self {
        self.modified = Some(modified);
        self
    }

    pub fn is_file(&self) -> bool {
        self.exists && !self.is_directory
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_permission_flags() {
        assert_eq!(Permissions::new(true, true).flags(), "rw");
        assert_eq!(Permissions::new(true, false).flags(), "r-");
        assert_eq!(Permissions::default().flags(), "--");
    }

    #[test]
    fn test_is_file() {
        let mut meta = Metadata::new().with_size(10);
        assert!(!meta.is_file());
        meta.exists = true;
        assert!(meta.is_file());
        meta.is_directory = true;
        assert!(!meta.is_file());
    }

    #[test]
    fn test_serialize() {
        let modified = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let meta = Metadata {
            exists: true,
            ..Metadata::new().with_size(42).with_modified(modified)
        };
        let json = serde_json::to_value(&meta).unwrap();
        assert_eq!(json["size"], 42);
        assert_eq!(json["exists"], true);
        assert_eq!(json["permissions"]["readable"], false);
        assert!(json["modified"].as_str().unwrap().starts_with("2024-05-01T12:00:00"));
    }
}
