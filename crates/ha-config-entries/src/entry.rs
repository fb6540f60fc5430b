//! Config Entry types
//!
//! A ConfigEntry represents a single instance of an integration's configuration.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Source of the config entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ConfigEntrySource {
    /// Configured via UI/API
    #[default]
    User,
    /// Imported from YAML config
    Import,
}

impl ConfigEntrySource {
    /// Step a config flow started from this source begins at
    pub fn step_id(&self) -> &'static str {
        match self {
            ConfigEntrySource::User => "user",
            ConfigEntrySource::Import => "import",
        }
    }
}

/// A configuration entry for an integration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigEntry {
    /// Unique identifier (ULID)
    pub entry_id: String,

    /// Integration domain (e.g., "mosoblgaz")
    pub domain: String,

    /// Human-readable display name
    pub title: String,

    /// Configuration data collected by the config flow
    #[serde(default)]
    pub data: HashMap<String, serde_json::Value>,

    /// User-configurable options
    #[serde(default)]
    pub options: HashMap<String, serde_json::Value>,

    /// Major schema version
    #[serde(default = "default_version")]
    pub version: u32,

    /// Minor schema version
    #[serde(default = "default_minor_version")]
    pub minor_version: u32,

    /// Optional unique identifier for duplicate prevention
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unique_id: Option<String>,

    /// Origin type
    #[serde(default)]
    pub source: ConfigEntrySource,

    /// Creation timestamp
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,

    /// Last modification timestamp
    #[serde(default = "Utc::now")]
    pub modified_at: DateTime<Utc>,
}

fn default_version() -> u32 {
    1
}

fn default_minor_version() -> u32 {
    1
}

impl ConfigEntry {
    /// Create a new config entry
    pub fn new(domain: impl Into<String>, title: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            entry_id: ulid::Ulid::new().to_string(),
            domain: domain.into(),
            title: title.into(),
            data: HashMap::new(),
            options: HashMap::new(),
            version: 1,
            minor_version: 1,
            unique_id: None,
            source: ConfigEntrySource::User,
            created_at: now,
            modified_at: now,
        }
    }

    /// Set entry data
    pub fn with_data(mut self, data: HashMap<String, serde_json::Value>) -> Self {
        self.data = data;
        self
    }

    /// Set entry options
    pub fn with_options(mut self, options: HashMap<String, serde_json::Value>) -> Self {
        self.options = options;
        self
    }

    /// Set unique_id
    pub fn with_unique_id(mut self, unique_id: impl Into<String>) -> Self {
        self.unique_id = Some(unique_id.into());
        self
    }

    /// Set source
    pub fn with_source(mut self, source: ConfigEntrySource) -> Self {
        self.source = source;
        self
    }

    /// Set version
    pub fn with_version(mut self, version: u32, minor_version: u32) -> Self {
        self.version = version;
        self.minor_version = minor_version;
        self
    }
}

/// Update data for a config entry
#[derive(Debug, Default)]
pub struct ConfigEntryUpdate {
    pub title: Option<String>,
    pub data: Option<HashMap<String, serde_json::Value>>,
    pub options: Option<HashMap<String, serde_json::Value>>,
    pub unique_id: Option<Option<String>>,
    pub version: Option<u32>,
    pub minor_version: Option<u32>,
}

impl ConfigEntryUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn data(mut self, data: HashMap<String, serde_json::Value>) -> Self {
        self.data = Some(data);
        self
    }

    pub fn options(mut self, options: HashMap<String, serde_json::Value>) -> Self {
        self.options = Some(options);
        self
    }

    pub fn version(mut self, version: u32, minor_version: u32) -> Self {
        self.version = Some(version);
        self.minor_version = Some(minor_version);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_entry_new() {
        let entry = ConfigEntry::new("mosoblgaz", "User: alice");
        assert_eq!(entry.domain, "mosoblgaz");
        assert_eq!(entry.title, "User: alice");
        assert_eq!(entry.source, ConfigEntrySource::User);
        assert_eq!(entry.version, 1);
        assert!(!entry.entry_id.is_empty());
    }

    #[test]
    fn test_config_entry_builder() {
        let mut data = HashMap::new();
        data.insert("username".to_string(), serde_json::json!("alice"));

        let entry = ConfigEntry::new("mosoblgaz", "User: alice")
            .with_data(data)
            .with_source(ConfigEntrySource::Import)
            .with_version(2, 1);

        assert_eq!(entry.source, ConfigEntrySource::Import);
        assert_eq!(entry.version, 2);
        assert!(entry.data.contains_key("username"));
    }

    #[test]
    fn test_source_step_ids() {
        assert_eq!(ConfigEntrySource::User.step_id(), "user");
        assert_eq!(ConfigEntrySource::Import.step_id(), "import");
    }

    #[test]
    fn test_legacy_entry_defaults() {
        // Entries written before options existed carry only data
        let parsed: ConfigEntry = serde_json::from_value(serde_json::json!({
            "entry_id": "01HX0000000000000000000000",
            "domain": "mosoblgaz",
            "title": "User: alice",
            "data": {"username": "alice", "scan_interval": 600}
        }))
        .unwrap();

        assert_eq!(parsed.version, 1);
        assert!(parsed.options.is_empty());
        assert_eq!(parsed.source, ConfigEntrySource::User);
    }

    #[test]
    fn test_serde_roundtrip() {
        let entry = ConfigEntry::new("test", "Test Entry")
            .with_unique_id("test-123")
            .with_source(ConfigEntrySource::Import);

        let json = serde_json::to_string(&entry).unwrap();
        let parsed: ConfigEntry = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed.domain, "test");
        assert_eq!(parsed.title, "Test Entry");
        assert_eq!(parsed.unique_id, Some("test-123".to_string()));
        assert_eq!(parsed.source, ConfigEntrySource::Import);
    }
}
