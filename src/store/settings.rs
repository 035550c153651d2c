use std::fmt;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::store::json_store::JsonStore;

pub const SETTINGS_KEY: &str = "tableSettings";

pub const MIN_DIMENSION: u16 = 6;
pub const MAX_DIMENSION: u16 = 24;
pub const DEFAULT_DIMENSION: u16 = 12;

/// Grid dimensions as persisted under [`SETTINGS_KEY`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSettings {
    pub width: u16,
    pub height: u16,
}

impl Default for TableSettings {
    fn default() -> Self {
        Self {
            width: DEFAULT_DIMENSION,
            height: DEFAULT_DIMENSION,
        }
    }
}

impl TableSettings {
    pub fn clamped(width: i64, height: i64) -> Self {
        Self {
            width: clamp_dimension(width),
            height: clamp_dimension(height),
        }
    }

    pub fn clamp(self) -> Self {
        Self::clamped(i64::from(self.width), i64::from(self.height))
    }
}

pub fn clamp_dimension(value: i64) -> u16 {
    value.clamp(i64::from(MIN_DIMENSION), i64::from(MAX_DIMENSION)) as u16
}

/// Stored record before clamping. Both fields are required; anything that
/// fails to deserialize into this shape is treated as "no stored settings".
#[derive(Deserialize)]
struct StoredSettings {
    width: i64,
    height: i64,
}

/// Query-string style parameters, e.g. `?width=8&height=10`. Keys and values
/// are percent-decoded on parse and re-encoded on display.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ShareParams {
    pairs: Vec<(String, String)>,
}

impl ShareParams {
    pub fn parse(query: &str) -> Self {
        let query = query.trim().trim_start_matches('?');
        let pairs = query
            .split('&')
            .filter(|part| !part.is_empty())
            .map(|part| match part.split_once('=') {
                Some((k, v)) => (decode_component(k), decode_component(v)),
                None => (decode_component(part), String::new()),
            })
            .collect();
        Self { pairs }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn set(&mut self, key: &str, value: impl ToString) {
        let value = value.to_string();
        match self.pairs.iter_mut().find(|(k, _)| k == key) {
            Some(pair) => pair.1 = value,
            None => self.pairs.push((key.to_string(), value)),
        }
    }

    /// Width and height if both are present, numeric and non-zero.
    pub fn dimensions(&self) -> Option<(i64, i64)> {
        let parse = |key: &str| -> Option<i64> {
            let value: i64 = self.get(key)?.trim().parse().ok()?;
            (value != 0).then_some(value)
        };
        Some((parse("width")?, parse("height")?))
    }
}

impl fmt::Display for ShareParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (k, v)) in self.pairs.iter().enumerate() {
            if i > 0 {
                f.write_str("&")?;
            }
            write!(f, "{}={}", encode_component(k), encode_component(v))?;
        }
        Ok(())
    }
}

/// `%XX` escapes become bytes and `+` becomes a space. Malformed escapes are
/// kept as literal text.
fn decode_component(raw: &str) -> String {
    let bytes = raw.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%'
            && let Some(hex) = raw.get(i + 1..i + 3)
            && hex.bytes().all(|b| b.is_ascii_hexdigit())
            && let Ok(byte) = u8::from_str_radix(hex, 16)
        {
            out.push(byte);
            i += 3;
            continue;
        }
        out.push(if bytes[i] == b'+' { b' ' } else { bytes[i] });
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}

fn encode_component(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for b in text.bytes() {
        if b.is_ascii_alphanumeric() || matches!(b, b'-' | b'.' | b'_' | b'~') {
            out.push(char::from(b));
        } else {
            out.push_str(&format!("%{b:02X}"));
        }
    }
    out
}

/// Settings service: resolves dimensions from share parameters or the
/// durable store and keeps both in sync on save.
pub struct SettingsStore {
    store: JsonStore,
    share: ShareParams,
    settings: TableSettings,
}

impl SettingsStore {
    pub fn new(store: JsonStore, share: ShareParams) -> Self {
        let mut this = Self {
            store,
            share,
            settings: TableSettings::default(),
        };
        this.load();
        this
    }

    /// Current in-memory settings, as last loaded or saved.
    pub fn settings(&self) -> TableSettings {
        self.settings
    }

    pub fn load(&mut self) -> TableSettings {
        let settings = if let Some((width, height)) = self.share.dimensions() {
            let settings = TableSettings::clamped(width, height);
            if let Err(e) = self.store.save(SETTINGS_KEY, &settings) {
                log::warn!("could not persist shared settings: {e:#}");
            }
            log::info!(
                "using shared settings {}x{}",
                settings.width,
                settings.height
            );
            settings
        } else {
            match self.store.load::<StoredSettings>(SETTINGS_KEY) {
                Some(stored) => TableSettings::clamped(stored.width, stored.height),
                None => {
                    log::debug!("no usable stored settings, using defaults");
                    TableSettings::default()
                }
            }
        };
        self.settings = settings;
        settings
    }

    pub fn save(&mut self, settings: TableSettings) -> Result<TableSettings> {
        let settings = settings.clamp();
        self.share.set("width", settings.width);
        self.share.set("height", settings.height);
        self.settings = settings;
        self.store.save(SETTINGS_KEY, &settings)?;
        Ok(settings)
    }

    /// Shareable encoding of the current settings, keeping any unrelated
    /// parameters that came in with the original query.
    pub fn share_query(&self) -> String {
        let mut share = self.share.clone();
        share.set("width", self.settings.width);
        share.set("height", self.settings.height);
        share.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn make_store(dir: &TempDir) -> JsonStore {
        JsonStore::with_base_dir(dir.path().to_path_buf()).unwrap()
    }

    fn write_raw(dir: &TempDir, content: &str) {
        fs::write(dir.path().join(format!("{SETTINGS_KEY}.json")), content).unwrap();
    }

    #[test]
    fn test_defaults_when_nothing_stored() {
        let dir = TempDir::new().unwrap();
        let settings = SettingsStore::new(make_store(&dir), ShareParams::default());
        assert_eq!(settings.settings(), TableSettings { width: 12, height: 12 });
    }

    #[test]
    fn test_stored_values_are_clamped() {
        let dir = TempDir::new().unwrap();
        write_raw(&dir, r#"{"width":30,"height":3}"#);
        let settings = SettingsStore::new(make_store(&dir), ShareParams::default());
        assert_eq!(settings.settings(), TableSettings { width: 24, height: 6 });
    }

    #[test]
    fn test_corrupt_or_partial_record_falls_back_to_defaults() {
        for raw in ["not json", r#"{"width":8}"#, r#"{"width":"8","height":9}"#, "[]"] {
            let dir = TempDir::new().unwrap();
            write_raw(&dir, raw);
            let settings = SettingsStore::new(make_store(&dir), ShareParams::default());
            assert_eq!(settings.settings(), TableSettings::default(), "{raw}");
        }
    }

    #[test]
    fn test_save_then_load_round_trip() {
        let dir = TempDir::new().unwrap();
        let mut settings = SettingsStore::new(make_store(&dir), ShareParams::default());
        let saved = settings
            .save(TableSettings { width: 9, height: 15 })
            .unwrap();
        assert_eq!(saved, TableSettings { width: 9, height: 15 });

        // A fresh session without share parameters reads the durable copy.
        let reloaded = SettingsStore::new(make_store(&dir), ShareParams::default());
        assert_eq!(reloaded.settings(), saved);
    }

    #[test]
    fn test_save_clamps_and_updates_share_query() {
        let dir = TempDir::new().unwrap();
        let mut settings = SettingsStore::new(make_store(&dir), ShareParams::default());
        let saved = settings.save(TableSettings { width: 2, height: 99 }).unwrap();
        assert_eq!(saved, TableSettings { width: 6, height: 24 });
        assert_eq!(settings.settings(), saved);
        assert_eq!(settings.share_query(), "width=6&height=24");
    }

    #[test]
    fn test_share_params_override_and_persist() {
        let dir = TempDir::new().unwrap();
        write_raw(&dir, r#"{"width":10,"height":10}"#);
        let share = ShareParams::parse("?width=7&height=40");
        let settings = SettingsStore::new(make_store(&dir), share);
        assert_eq!(settings.settings(), TableSettings { width: 7, height: 24 });

        let reloaded = SettingsStore::new(make_store(&dir), ShareParams::default());
        assert_eq!(reloaded.settings(), TableSettings { width: 7, height: 24 });
    }

    #[test]
    fn test_incomplete_share_params_are_ignored() {
        for query in ["width=8", "width=8&height=0", "width=abc&height=8", ""] {
            let dir = TempDir::new().unwrap();
            write_raw(&dir, r#"{"width":10,"height":11}"#);
            let settings = SettingsStore::new(make_store(&dir), ShareParams::parse(query));
            assert_eq!(
                settings.settings(),
                TableSettings { width: 10, height: 11 },
                "{query}"
            );
        }
    }

    #[test]
    fn test_share_params_parse_and_encode() {
        let mut share = ShareParams::parse("?lang=en&width=8&height=10&flag");
        assert_eq!(share.get("lang"), Some("en"));
        assert_eq!(share.get("flag"), Some(""));
        assert_eq!(share.dimensions(), Some((8, 10)));
        share.set("width", 12);
        assert_eq!(share.to_string(), "lang=en&width=12&height=10&flag=");
        assert_eq!(ShareParams::parse("?"), ShareParams::default());
    }

    #[test]
    fn test_share_params_are_percent_decoded() {
        let share = ShareParams::parse("?width=%31%30&height=8&note=two+words%21");
        assert_eq!(share.dimensions(), Some((10, 8)));
        assert_eq!(share.get("note"), Some("two words!"));
        assert_eq!(share.to_string(), "width=10&height=8&note=two%20words%21");

        let broken = ShareParams::parse("width=%3&height=%zz");
        assert_eq!(broken.get("width"), Some("%3"));
        assert_eq!(broken.get("height"), Some("%zz"));
        assert_eq!(broken.dimensions(), None);
    }

    #[test]
    fn test_negative_share_dimensions_clamp_to_minimum() {
        let dir = TempDir::new().unwrap();
        let settings = SettingsStore::new(
            make_store(&dir),
            ShareParams::parse("width=-3&height=8"),
        );
        assert_eq!(settings.settings(), TableSettings { width: 6, height: 8 });
    }

    #[test]
    fn test_clamp_dimension_bounds() {
        assert_eq!(clamp_dimension(i64::MIN), MIN_DIMENSION);
        assert_eq!(clamp_dimension(6), 6);
        assert_eq!(clamp_dimension(17), 17);
        assert_eq!(clamp_dimension(24), 24);
        assert_eq!(clamp_dimension(25), MAX_DIMENSION);
    }
}
