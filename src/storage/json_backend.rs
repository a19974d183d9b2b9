use std::{
    fs::{self, File},
    io::{self, Write},
    path::{Path, PathBuf},
};

use super::{Result, SnapshotStore};

const SNAPSHOT_EXTENSION: &str = "json";
const TMP_SUFFIX: &str = "tmp";

/// Filesystem-backed slots: each key maps to `<root>/<key>.json`.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    root: PathBuf,
}

impl JsonFileStore {
    pub fn new(root: PathBuf) -> Result<Self> {
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn slot_path(&self, key: &str) -> PathBuf {
        self.root
            .join(format!("{}.{}", canonical_key(key), SNAPSHOT_EXTENSION))
    }
}

impl SnapshotStore for JsonFileStore {
    fn read(&self, key: &str) -> Result<Option<String>> {
        let path = self.slot_path(key);
        if !path.exists() {
            return Ok(None);
        }
        Ok(Some(fs::read_to_string(path)?))
    }

    fn write(&self, key: &str, payload: &str) -> Result<()> {
        write_atomic(&self.slot_path(key), payload)?;
        Ok(())
    }
}

fn canonical_key(key: &str) -> String {
    let sanitized: String = key
        .trim()
        .to_lowercase()
        .chars()
        .map(|c| match c {
            'a'..='z' | '0'..='9' | '-' => c,
            _ => '_',
        })
        .collect();
    if sanitized.trim_matches('_').is_empty() {
        "expenses".into()
    } else {
        sanitized
    }
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.to_path_buf();
    let ext = match path.extension().and_then(|ext| ext.to_str()) {
        Some(existing) => format!("{}.{}", existing, TMP_SUFFIX),
        None => TMP_SUFFIX.to_string(),
    };
    tmp.set_extension(ext);
    tmp
}

/// Replaces `path` with `data` by staging a synced `<file>.tmp` sibling and
/// renaming it over the target.
pub(crate) fn write_atomic(path: &Path, data: &str) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let tmp = tmp_path(path);
    let mut file = File::create(&tmp)?;
    file.write_all(data.as_bytes())?;
    file.flush()?;
    file.sync_all()?;
    fs::rename(&tmp, path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store_with_temp_dir() -> (JsonFileStore, TempDir) {
        let temp = TempDir::new().expect("temp dir");
        let store = JsonFileStore::new(temp.path().join("slots")).expect("json store");
        (store, temp)
    }

    #[test]
    fn missing_slot_reads_as_none() {
        let (store, _guard) = store_with_temp_dir();
        assert_eq!(store.read("expenses").expect("read"), None);
    }

    #[test]
    fn write_then_read_roundtrip() {
        let (store, _guard) = store_with_temp_dir();
        store.write("expenses", "[]").expect("write");
        assert_eq!(store.read("expenses").expect("read").as_deref(), Some("[]"));
        assert!(!tmp_path(&store.slot_path("expenses")).exists());
    }

    #[test]
    fn write_overwrites_previous_payload() {
        let (store, _guard) = store_with_temp_dir();
        store.write("expenses", "[1]").expect("first write");
        store.write("expenses", "[2]").expect("second write");
        assert_eq!(store.read("expenses").unwrap().as_deref(), Some("[2]"));
    }

    #[test]
    fn write_atomic_creates_missing_parents() {
        let temp = TempDir::new().expect("temp dir");
        let target = temp.path().join("nested").join("config.json");
        write_atomic(&target, "{}").expect("write");
        assert_eq!(fs::read_to_string(&target).unwrap(), "{}");
        assert!(!tmp_path(&target).exists());
    }

    #[test]
    fn keys_are_sanitized_into_file_names() {
        let (store, _guard) = store_with_temp_dir();
        let path = store.slot_path("My Expenses/2024");
        assert_eq!(
            path.file_name().and_then(|name| name.to_str()),
            Some("my_expenses_2024.json")
        );
        assert_eq!(
            store.slot_path("///").file_name().and_then(|n| n.to_str()),
            Some("expenses.json")
        );
    }
}
