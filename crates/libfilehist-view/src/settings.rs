//! Diff viewer settings persisted across sessions

use serde::{Deserialize, Serialize};

use crate::error::ViewError;
use crate::store::StateStore;

/// Store key the settings live under
pub const SETTINGS_KEY: &str = "diffSettings";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiffLayout {
    #[default]
    Unified,
    Split,
}

impl std::str::FromStr for DiffLayout {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "unified" => Ok(DiffLayout::Unified),
            "split" => Ok(DiffLayout::Split),
            other => Err(format!("unknown layout '{}', expected unified or split", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DiffSettings {
    pub layout: DiffLayout,
    /// Theme name handed to the highlighter
    pub theme: String,
    pub line_numbers: bool,
    /// Tint changed lines
    pub background: bool,
    /// Show the whole file instead of hunks with context
    pub expand_unchanged: bool,
}

impl Default for DiffSettings {
    fn default() -> Self {
        Self {
            layout: DiffLayout::Unified,
            theme: "github-dark".to_string(),
            line_numbers: true,
            background: true,
            expand_unchanged: false,
        }
    }
}

impl DiffSettings {
    /// Load from the store, falling back to defaults if absent
    pub fn load(store: &dyn StateStore) -> Result<Self, ViewError> {
        match store.get(SETTINGS_KEY)? {
            Some(value) => Ok(serde_json::from_value(value)?),
            None => Ok(Self::default()),
        }
    }

    pub fn save(&self, store: &mut dyn StateStore) -> Result<(), ViewError> {
        store.set(SETTINGS_KEY, serde_json::to_value(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::JsonFileStore;
    use tempfile::tempdir;

    #[test]
    fn test_wire_names() {
        let json = serde_json::to_value(DiffSettings::default()).unwrap();
        assert_eq!(json["layout"], "unified");
        assert_eq!(json["lineNumbers"], true);
        assert_eq!(json["expandUnchanged"], false);
    }

    #[test]
    fn test_partial_settings_fill_defaults() {
        let settings: DiffSettings = serde_json::from_str(r#"{"layout":"split"}"#).unwrap();
        assert_eq!(settings.layout, DiffLayout::Split);
        assert_eq!(settings.theme, "github-dark");
    }

    #[test]
    fn test_persist_through_store() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("state.json");

        let mut store = JsonFileStore::open(&path).unwrap();
        assert_eq!(DiffSettings::load(&store).unwrap(), DiffSettings::default());

        let settings = DiffSettings {
            layout: DiffLayout::Split,
            expand_unchanged: true,
            ..DiffSettings::default()
        };
        settings.save(&mut store).unwrap();

        let reopened = JsonFileStore::open(&path).unwrap();
        assert_eq!(DiffSettings::load(&reopened).unwrap(), settings);
    }

    #[test]
    fn test_layout_from_str() {
        assert_eq!("Split".parse::<DiffLayout>().unwrap(), DiffLayout::Split);
        assert!("columns".parse::<DiffLayout>().is_err());
    }
}
