use std::fs::Metadata;

/// What makes "the file at this path" the same file across two polls.
///
/// Device and inode on Unix. Elsewhere the creation time is the best
/// available signal; truncation is still caught by the size check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FileIdentity {
    #[cfg(unix)]
    dev: u64,
    #[cfg(unix)]
    ino: u64,
    #[cfg(not(unix))]
    created: Option<std::time::SystemTime>,
}

impl FileIdentity {
    #[cfg(unix)]
    pub(crate) fn of(meta: &Metadata) -> Self {
        use std::os::unix::fs::MetadataExt;

        Self {
            dev: meta.dev(),
            ino: meta.ino(),
        }
    }

    #[cfg(not(unix))]
    pub(crate) fn of(meta: &Metadata) -> Self {
        Self {
            created: meta.created().ok(),
        }
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_same_file_same_identity() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("app.log");
        std::fs::write(&path, "a\n").unwrap();

        let before = FileIdentity::of(&std::fs::metadata(&path).unwrap());
        std::fs::write(&path, "a\nb\n").unwrap();
        let after = FileIdentity::of(&std::fs::metadata(&path).unwrap());

        assert_eq!(before, after);
    }

    #[test]
    fn test_replaced_file_new_identity() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("app.log");
        std::fs::write(&path, "a\n").unwrap();
        let before = FileIdentity::of(&std::fs::metadata(&path).unwrap());

        // Keep the old inode alive so the new file cannot reuse it.
        std::fs::rename(&path, dir.path().join("app.log.1")).unwrap();
        std::fs::write(&path, "b\n").unwrap();
        let after = FileIdentity::of(&std::fs::metadata(&path).unwrap());

        assert_ne!(before, after);
    }
}
