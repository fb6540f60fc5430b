//! Config Entries
//!
//! This crate provides the configuration entry system for Home Assistant.
//! Config entries represent individual integration instances; they are
//! created by config flows and adjusted by options flows.
//!
//! # Key Types
//!
//! - [`ConfigEntry`] - A single integration configuration
//! - [`ConfigEntries`] - Manager for all config entries
//! - [`ConfigEntriesFlowManager`] - Turns finished config flows into entries
//! - [`OptionsFlowManager`] - Stores finished options flows on their entry
//!
//! # Storage
//!
//! Config entries are persisted in `.storage/core.config_entries` with
//! version tracking for migrations.

pub mod entry;
pub mod flow;
pub mod manager;
pub mod storage;

// Re-export main types
pub use entry::{ConfigEntry, ConfigEntrySource, ConfigEntryUpdate};

pub use flow::{
    ConfigEntriesFlowManager, ConfigFlowError, ConfigFlowFactory, ConfigFlowRegistry,
    ConfigFlowResult, OptionsFlowManager, ABORT_ALREADY_EXISTS, OPTIONS_FLOW_INIT_STEP,
};

pub use manager::{
    ConfigEntries, ConfigEntriesData, ConfigEntriesError, ConfigEntriesResult, STORAGE_KEY,
    STORAGE_MINOR_VERSION, STORAGE_VERSION,
};

pub use storage::{Storage, StorageError, StorageFile, StorageResult};
