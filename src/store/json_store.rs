use std::fs;
use std::io::Write;
use std::path::PathBuf;

use anyhow::Result;
use serde::{Serialize, de::DeserializeOwned};

/// Durable key-value storage: one pretty-printed JSON document per key.
pub struct JsonStore {
    base_dir: PathBuf,
}

impl JsonStore {
    pub fn new() -> Result<Self> {
        let base_dir = dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("timestable");
        fs::create_dir_all(&base_dir)?;
        Ok(Self { base_dir })
    }

    pub fn with_base_dir(base_dir: PathBuf) -> Result<Self> {
        fs::create_dir_all(&base_dir)?;
        Ok(Self { base_dir })
    }

    fn file_path(&self, key: &str) -> PathBuf {
        self.base_dir.join(format!("{key}.json"))
    }

    /// Raw stored text for `key`, if any.
    pub fn get(&self, key: &str) -> Option<String> {
        fs::read_to_string(self.file_path(key)).ok()
    }

    /// Deserialize the value under `key`. Returns None if the key is absent
    /// or the stored document cannot be parsed as `T`.
    pub fn load<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let content = self.get(key)?;
        match serde_json::from_str(&content) {
            Ok(value) => Some(value),
            Err(e) => {
                log::debug!("ignoring unreadable {key}: {e}");
                None
            }
        }
    }

    pub fn save<T: Serialize>(&self, key: &str, data: &T) -> Result<()> {
        let path = self.file_path(key);
        let tmp_path = path.with_extension("tmp");

        let json = serde_json::to_string_pretty(data)?;
        let mut file = fs::File::create(&tmp_path)?;
        file.write_all(json.as_bytes())?;
        file.sync_all()?;

        fs::rename(&tmp_path, &path)?;
        Ok(())
    }
}
