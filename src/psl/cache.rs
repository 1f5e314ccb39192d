//! On-disk snapshot of the rule index.
//!
//! File layout: the lowercase hex SHA-256 of the body on the first line,
//! followed by the JSON-serialized [`RuleIndex`]. A file whose digest does not
//! match is treated as if it did not exist.

use std::fs;
use std::io::Write;
use std::path::Path;
use std::time::{Duration, SystemTime};

use sha2::{Digest, Sha256};
use tempfile::NamedTempFile;
use tracing::warn;

use crate::error::UrlError;
use crate::psl::rules::RuleIndex;

fn digest_hex(body: &[u8]) -> String {
    hex::encode(Sha256::digest(body))
}

/// Modification time of a non-empty cache file.
pub(crate) fn modified(path: &Path) -> Option<SystemTime> {
    let meta = fs::metadata(path).ok()?;
    if !meta.is_file() || meta.len() == 0 {
        return None;
    }
    meta.modified().ok()
}

/// True when the file exists, is non-empty and younger than `max_age`.
pub(crate) fn is_fresh(path: &Path, max_age: Duration) -> bool {
    match modified(path) {
        Some(mtime) => match SystemTime::now().duration_since(mtime) {
            Ok(age) => age < max_age,
            // mtime in the future
            Err(_) => true,
        },
        None => false,
    }
}

/// Read a snapshot, returning `None` for a missing, empty or corrupt file.
pub(crate) fn read(path: &Path) -> Option<RuleIndex> {
    modified(path)?;

    let contents = match fs::read(path) {
        Ok(contents) => contents,
        Err(err) => {
            warn!(path = %path.display(), error = %err, "Failed to read suffix list cache");
            return None;
        }
    };

    let Some(newline) = contents.iter().position(|b| *b == b'\n') else {
        warn!(path = %path.display(), "Suffix list cache has no digest line, ignoring it");
        return None;
    };
    let (header, body) = (&contents[..newline], &contents[newline + 1..]);

    if header != digest_hex(body).as_bytes() {
        warn!(path = %path.display(), "Suffix list cache digest mismatch, ignoring it");
        return None;
    }

    match serde_json::from_slice::<RuleIndex>(body) {
        Ok(index) if !index.is_empty() => Some(index),
        Ok(_) => None,
        Err(err) => {
            warn!(path = %path.display(), error = %err, "Suffix list cache is unreadable");
            None
        }
    }
}

/// Write a snapshot through a temporary file renamed into place, so readers
/// never observe a partial file.
pub(crate) fn write(path: &Path, index: &RuleIndex) -> Result<(), UrlError> {
    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir)?;

    let body = serde_json::to_vec(index)?;
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(digest_hex(&body).as_bytes())?;
    tmp.write_all(b"\n")?;
    tmp.write_all(&body)?;
    tmp.flush()?;
    tmp.persist(path).map_err(|err| UrlError::from(err.error))?;

    Ok(())
}

/// Remove the cache file; a missing file is not an error.
pub(crate) fn remove(path: &Path) -> Result<(), UrlError> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(err) => Err(err.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> RuleIndex {
        RuleIndex::parse("com\nco.uk\nuk\n!www.ck\n*.ck\n")
    }

    #[test]
    fn test_write_then_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("psl.cache");

        write(&path, &sample()).unwrap();
        assert_eq!(read(&path), Some(sample()));
        assert!(is_fresh(&path, Duration::from_secs(3600)));
        assert!(!is_fresh(&path, Duration::ZERO));
    }

    #[test]
    fn test_creates_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("psl.cache");

        write(&path, &sample()).unwrap();
        assert!(read(&path).is_some());
    }

    #[test]
    fn test_missing_and_empty_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("psl.cache");
        assert_eq!(read(&path), None);

        fs::write(&path, b"").unwrap();
        assert_eq!(read(&path), None);
        assert!(!is_fresh(&path, Duration::from_secs(3600)));
    }

    #[test]
    fn test_tampered_body_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("psl.cache");
        write(&path, &sample()).unwrap();

        let mut contents = fs::read(&path).unwrap();
        contents.truncate(contents.len() - 3);
        fs::write(&path, contents).unwrap();

        assert_eq!(read(&path), None);
    }

    #[test]
    fn test_remove_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("psl.cache");
        write(&path, &sample()).unwrap();

        remove(&path).unwrap();
        assert!(!path.exists());
        remove(&path).unwrap();
    }
}
