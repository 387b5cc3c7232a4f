//! Plaintext key-value config backend.
//!
//! Responsibilities:
//! - Persist a hierarchical mapping from dotted field paths to string
//!   values in a file on disk (TOML or JSON, chosen by extension).
//! - Resolve legacy field names through a mutable alias table.
//! - Atomic writes (temp file + rename) and merge-from-disk.
//!
//! Does NOT handle:
//! - Field namespacing, redaction, or the live/test split (see `profile`).
//! - Secret-grade storage (see `secure`).
//!
//! Invariants:
//! - `get` consults the alias table for keys holding no value of their
//!   own; `contains` never does, so callers can distinguish canonical
//!   from legacy fields.
//! - Alias registration is idempotent and never creates a cycle.
//! - `merge_from_disk` never overwrites a value already set in memory.
//! - Writes never leave a partially written config file behind.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::constants::CONFIG_PATH_ENV;
use crate::env::env_var_or_none;
use crate::error::StoreError;

/// On-disk serialization format, determined by the file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ConfigFormat {
    Toml,
    Json,
}

impl ConfigFormat {
    fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::Json,
            _ => Self::Toml,
        }
    }
}

/// File-backed mapping from dotted field paths to string values.
#[derive(Debug)]
pub struct ConfigStore {
    path: PathBuf,
    format: ConfigFormat,
    values: BTreeMap<String, String>,
    aliases: BTreeMap<String, String>,
}

impl ConfigStore {
    /// Opens the store at its default location.
    ///
    /// The path is `<platform config dir>/stripe/config.toml`, overridable
    /// with the `STRIPE_CONFIG_PATH` environment variable.
    pub fn new() -> Result<Self, StoreError> {
        let path = match env_var_or_none(CONFIG_PATH_ENV) {
            Some(path) => PathBuf::from(path),
            None => default_config_path()?,
        };
        Self::load(path)
    }

    /// Opens the store at a specific path, reading the file if it exists.
    ///
    /// A missing file yields an empty store; an unreadable or unparsable
    /// file is an error.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let format = ConfigFormat::from_path(&path);
        let values = if path.exists() {
            read_values(&path, format)?
        } else {
            BTreeMap::new()
        };

        Ok(Self {
            path,
            format,
            values,
            aliases: BTreeMap::new(),
        })
    }

    /// Returns the path of the backing config file.
    pub fn config_path(&self) -> &Path {
        &self.path
    }

    /// Returns the value for `key`, resolving the alias table first.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(self.resolve(key)).map(String::as_str)
    }

    /// Returns true when `key` literally holds a value (no alias resolution).
    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Sets `key` to `value` in memory. Call [`ConfigStore::write`] to persist.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }

    /// Removes `key` (after alias resolution) from the in-memory map.
    pub fn delete(&mut self, key: &str) -> Result<(), StoreError> {
        let resolved = self.resolve(key).to_string();
        self.values
            .remove(&resolved)
            .map(|_| ())
            .ok_or(StoreError::KeyNotFound(resolved))
    }

    /// Registers `alias` so that reads of it resolve to `canonical`.
    ///
    /// Safe to call repeatedly; registering the same pair again changes
    /// nothing. Self-aliases and registrations that would close a cycle
    /// are ignored.
    pub fn register_alias(&mut self, alias: &str, canonical: &str) {
        if alias == canonical || self.resolve(canonical) == alias {
            return;
        }
        self.aliases
            .insert(alias.to_string(), canonical.to_string());
    }

    /// Fills keys absent in memory with the values currently on disk.
    ///
    /// In-memory values always win; a missing file is a no-op.
    pub fn merge_from_disk(&mut self) -> Result<(), StoreError> {
        if !self.path.exists() {
            return Ok(());
        }
        for (key, value) in read_values(&self.path, self.format)? {
            self.values.entry(key).or_insert(value);
        }
        Ok(())
    }

    /// Atomically persists the store to its config file.
    ///
    /// Writes to a temporary file first, then renames it to the target
    /// path, so the config file is never left partially written.
    pub fn write(&self) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|source| StoreError::Write {
                path: self.path.clone(),
                source,
            })?;
        }

        let content = match self.format {
            ConfigFormat::Toml => toml::to_string_pretty(&nest_toml(&self.values))
                .map_err(|e| StoreError::Serialize(e.to_string()))?,
            ConfigFormat::Json => serde_json::to_string_pretty(&nest_json(&self.values))
                .map_err(|e| StoreError::Serialize(e.to_string()))?,
        };

        let temp_path = self.path.with_extension("tmp");
        std::fs::write(&temp_path, content).map_err(|source| StoreError::Write {
            path: temp_path.clone(),
            source,
        })?;
        std::fs::rename(&temp_path, &self.path).map_err(|source| StoreError::Write {
            path: self.path.clone(),
            source,
        })?;

        tracing::debug!(path = %self.path.display(), "config saved atomically");
        Ok(())
    }

    /// Iterates over all stored `(key, value)` pairs in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Follows the alias table to the key that actually holds the value.
    ///
    /// A key that holds a value resolves to itself; aliases only redirect
    /// reads of keys with no value of their own. This keeps a canonical
    /// field authoritative once it is written, even when an alias to a
    /// legacy field was registered earlier in the same process.
    fn resolve<'a>(&'a self, key: &'a str) -> &'a str {
        let mut current = key;
        // Bounded by table size; cycles cannot be registered.
        for _ in 0..=self.aliases.len() {
            if self.values.contains_key(current) {
                break;
            }
            match self.aliases.get(current) {
                Some(next) => current = next,
                None => break,
            }
        }
        current
    }
}

fn default_config_path() -> Result<PathBuf, StoreError> {
    let proj_dirs = directories::ProjectDirs::from("", "", "stripe").ok_or_else(|| {
        StoreError::ConfigDirUnavailable("no home directory available".to_string())
    })?;
    Ok(proj_dirs.config_dir().join("config.toml"))
}

fn read_values(path: &Path, format: ConfigFormat) -> Result<BTreeMap<String, String>, StoreError> {
    let content = std::fs::read_to_string(path).map_err(|source| StoreError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let mut values = BTreeMap::new();
    match format {
        ConfigFormat::Toml => {
            let table: toml::Table = toml::from_str(&content).map_err(|e| StoreError::Parse {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;
            flatten_toml(&table, "", &mut values);
        }
        ConfigFormat::Json => {
            let value: serde_json::Value =
                serde_json::from_str(&content).map_err(|e| StoreError::Parse {
                    path: path.to_path_buf(),
                    message: e.to_string(),
                })?;
            match value {
                serde_json::Value::Object(map) => flatten_json(&map, "", &mut values),
                _ => {
                    return Err(StoreError::Parse {
                        path: path.to_path_buf(),
                        message: "expected a top-level object".to_string(),
                    });
                }
            }
        }
    }
    Ok(values)
}

fn flatten_toml(table: &toml::Table, prefix: &str, out: &mut BTreeMap<String, String>) {
    for (key, value) in table {
        let full_key = join_key(prefix, key);
        match value {
            toml::Value::Table(nested) => flatten_toml(nested, &full_key, out),
            toml::Value::String(s) => {
                out.insert(full_key, s.clone());
            }
            toml::Value::Integer(i) => {
                out.insert(full_key, i.to_string());
            }
            toml::Value::Float(f) => {
                out.insert(full_key, f.to_string());
            }
            toml::Value::Boolean(b) => {
                out.insert(full_key, b.to_string());
            }
            toml::Value::Datetime(dt) => {
                out.insert(full_key, dt.to_string());
            }
            toml::Value::Array(_) => {
                tracing::warn!(key = %full_key, "ignoring non-scalar config value");
            }
        }
    }
}

fn flatten_json(
    map: &serde_json::Map<String, serde_json::Value>,
    prefix: &str,
    out: &mut BTreeMap<String, String>,
) {
    for (key, value) in map {
        let full_key = join_key(prefix, key);
        match value {
            serde_json::Value::Object(nested) => flatten_json(nested, &full_key, out),
            serde_json::Value::String(s) => {
                out.insert(full_key, s.clone());
            }
            serde_json::Value::Number(n) => {
                out.insert(full_key, n.to_string());
            }
            serde_json::Value::Bool(b) => {
                out.insert(full_key, b.to_string());
            }
            serde_json::Value::Null => {}
            serde_json::Value::Array(_) => {
                tracing::warn!(key = %full_key, "ignoring non-scalar config value");
            }
        }
    }
}

fn join_key(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{}.{}", prefix, key)
    }
}

fn nest_toml(values: &BTreeMap<String, String>) -> toml::Table {
    let mut root = toml::Table::new();
    for (key, value) in values {
        let mut segments = key.split('.').peekable();
        let mut current = &mut root;
        while let Some(segment) = segments.next() {
            if segments.peek().is_none() {
                current.insert(segment.to_string(), toml::Value::String(value.clone()));
            } else {
                let entry = current
                    .entry(segment.to_string())
                    .or_insert_with(|| toml::Value::Table(toml::Table::new()));
                if !entry.is_table() {
                    // A scalar and a deeper path collide; the deeper path wins.
                    *entry = toml::Value::Table(toml::Table::new());
                }
                let Some(table) = entry.as_table_mut() else {
                    break;
                };
                current = table;
            }
        }
    }
    root
}

fn nest_json(values: &BTreeMap<String, String>) -> serde_json::Value {
    let mut root = serde_json::Map::new();
    for (key, value) in values {
        let mut segments = key.split('.').peekable();
        let mut current = &mut root;
        while let Some(segment) = segments.next() {
            if segments.peek().is_none() {
                current.insert(
                    segment.to_string(),
                    serde_json::Value::String(value.clone()),
                );
            } else {
                let entry = current
                    .entry(segment.to_string())
                    .or_insert_with(|| serde_json::Value::Object(serde_json::Map::new()));
                if !entry.is_object() {
                    *entry = serde_json::Value::Object(serde_json::Map::new());
                }
                let Some(object) = entry.as_object_mut() else {
                    break;
                };
                current = object;
            }
        }
    }
    serde_json::Value::Object(root)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use tempfile::tempdir;

    fn store_at(dir: &tempfile::TempDir, name: &str) -> ConfigStore {
        ConfigStore::load(dir.path().join(name)).unwrap()
    }

    #[test]
    fn test_set_get_round_trip() {
        let dir = tempdir().unwrap();
        let mut store = store_at(&dir, "config.toml");

        store.set("default.device_name", "my-device");
        assert_eq!(store.get("default.device_name"), Some("my-device"));
        assert_eq!(store.get("default.missing"), None);
    }

    #[test]
    fn test_write_and_reload_toml() {
        let dir = tempdir().unwrap();
        let mut store = store_at(&dir, "config.toml");

        store.set("default.device_name", "my-device");
        store.set("default.test_mode_api_key", "sk_test_abcdef123456");
        store.write().unwrap();

        let reloaded = store_at(&dir, "config.toml");
        assert_eq!(reloaded.get("default.device_name"), Some("my-device"));
        assert_eq!(
            reloaded.get("default.test_mode_api_key"),
            Some("sk_test_abcdef123456")
        );

        // Dotted keys become nested tables on disk.
        let content = std::fs::read_to_string(dir.path().join("config.toml")).unwrap();
        assert!(content.contains("[default]"));
    }

    #[test]
    fn test_write_and_reload_json_by_extension() {
        let dir = tempdir().unwrap();
        let mut store = store_at(&dir, "config.json");

        store.set("default.account_id", "acct_123");
        store.write().unwrap();

        let content = std::fs::read_to_string(dir.path().join("config.json")).unwrap();
        serde_json::from_str::<serde_json::Value>(&content).expect("valid JSON on disk");

        let reloaded = store_at(&dir, "config.json");
        assert_eq!(reloaded.get("default.account_id"), Some("acct_123"));
    }

    #[test]
    fn test_load_missing_file_is_empty() {
        let dir = tempdir().unwrap();
        let store = store_at(&dir, "config.toml");
        assert_eq!(store.iter().count(), 0);
    }

    #[test]
    fn test_load_corrupt_file_errors() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "not [ valid toml").unwrap();

        let err = ConfigStore::load(&path).unwrap_err();
        assert!(matches!(err, StoreError::Parse { .. }));
    }

    #[test]
    fn test_scalar_values_flatten_to_strings() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[default]\nis_terms_acceptance_valid = true\nretries = 3\n",
        )
        .unwrap();

        let store = ConfigStore::load(&path).unwrap();
        assert_eq!(store.get("default.is_terms_acceptance_valid"), Some("true"));
        assert_eq!(store.get("default.retries"), Some("3"));
    }

    #[test]
    fn test_delete_removes_key() {
        let dir = tempdir().unwrap();
        let mut store = store_at(&dir, "config.toml");

        store.set("default.device_name", "my-device");
        store.delete("default.device_name").unwrap();
        assert_eq!(store.get("default.device_name"), None);
    }

    #[test]
    fn test_delete_missing_key_errors() {
        let dir = tempdir().unwrap();
        let mut store = store_at(&dir, "config.toml");

        let err = store.delete("default.missing").unwrap_err();
        assert!(matches!(err, StoreError::KeyNotFound(_)));
    }

    #[test]
    fn test_alias_resolves_on_get() {
        let dir = tempdir().unwrap();
        let mut store = store_at(&dir, "config.toml");

        store.set("default.secret_key", "sk_test_legacy123456");
        store.register_alias("default.test_mode_api_key", "default.secret_key");

        assert_eq!(
            store.get("default.test_mode_api_key"),
            Some("sk_test_legacy123456")
        );
        // contains is literal: the canonical field holds nothing itself.
        assert!(!store.contains("default.test_mode_api_key"));
    }

    #[test]
    fn test_alias_chain_resolves_transitively() {
        let dir = tempdir().unwrap();
        let mut store = store_at(&dir, "config.toml");

        store.set("default.secret_key", "sk_test_legacy123456");
        store.register_alias("default.api_key", "default.secret_key");
        store.register_alias("default.test_mode_api_key", "default.api_key");

        assert_eq!(
            store.get("default.test_mode_api_key"),
            Some("sk_test_legacy123456")
        );
    }

    #[test]
    fn test_written_value_wins_over_registered_alias() {
        let dir = tempdir().unwrap();
        let mut store = store_at(&dir, "config.toml");

        store.set("default.secret_key", "sk_test_legacy123456");
        store.register_alias("default.test_mode_api_key", "default.secret_key");

        // Once the canonical field holds its own value, the alias no
        // longer redirects reads away from it.
        store.set("default.test_mode_api_key", "sk_test_fresh1234567");
        assert_eq!(
            store.get("default.test_mode_api_key"),
            Some("sk_test_fresh1234567")
        );
    }

    #[test]
    fn test_register_alias_is_idempotent() {
        let dir = tempdir().unwrap();
        let mut store = store_at(&dir, "config.toml");

        store.set("default.secret_key", "sk_test_legacy123456");
        store.register_alias("default.api_key", "default.secret_key");
        store.register_alias("default.api_key", "default.secret_key");

        assert_eq!(store.get("default.api_key"), Some("sk_test_legacy123456"));
    }

    #[test]
    fn test_register_alias_refuses_cycles() {
        let dir = tempdir().unwrap();
        let mut store = store_at(&dir, "config.toml");

        store.set("default.secret_key", "sk_test_legacy123456");
        store.register_alias("default.api_key", "default.secret_key");
        // Would close a cycle back to api_key; must be ignored.
        store.register_alias("default.secret_key", "default.api_key");

        assert_eq!(store.get("default.api_key"), Some("sk_test_legacy123456"));
        assert_eq!(
            store.get("default.secret_key"),
            Some("sk_test_legacy123456")
        );
    }

    #[test]
    fn test_alias_delete_removes_resolved_key() {
        let dir = tempdir().unwrap();
        let mut store = store_at(&dir, "config.toml");

        store.set("default.secret_key", "sk_test_legacy123456");
        store.register_alias("default.api_key", "default.secret_key");

        store.delete("default.api_key").unwrap();
        assert!(!store.contains("default.secret_key"));
    }

    #[test]
    fn test_merge_from_disk_prefers_memory() {
        let dir = tempdir().unwrap();
        let mut on_disk = store_at(&dir, "config.toml");
        on_disk.set("default.device_name", "old-device");
        on_disk.set("default.display_name", "Old Display");
        on_disk.write().unwrap();

        let mut store = store_at(&dir, "config.toml");
        store.set("default.device_name", "new-device");
        // Simulate another writer having added a field since load.
        let mut other = store_at(&dir, "config.toml");
        other.set("default.account_id", "acct_123");
        other.write().unwrap();

        store.merge_from_disk().unwrap();
        assert_eq!(store.get("default.device_name"), Some("new-device"));
        assert_eq!(store.get("default.display_name"), Some("Old Display"));
        assert_eq!(store.get("default.account_id"), Some("acct_123"));
    }

    #[test]
    fn test_write_creates_parent_directories() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("dir").join("config.toml");
        let mut store = ConfigStore::load(&path).unwrap();
        store.set("default.device_name", "my-device");
        store.write().unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_write_leaves_no_temp_file() {
        let dir = tempdir().unwrap();
        let mut store = store_at(&dir, "config.toml");
        store.set("default.device_name", "my-device");
        store.write().unwrap();
        assert!(!dir.path().join("config.tmp").exists());
    }

    #[test]
    #[serial]
    fn test_new_honors_config_path_env() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("custom.toml");
        temp_env::with_var("STRIPE_CONFIG_PATH", Some(path.to_str().unwrap()), || {
            let store = ConfigStore::new().unwrap();
            assert_eq!(store.config_path(), path.as_path());
        });
    }
}
