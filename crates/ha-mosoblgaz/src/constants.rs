//! Constants for the Mosoblgaz integration

use std::time::Duration;

pub const DOMAIN: &str = "mosoblgaz";

/// Version of entries created by the config flow
pub const CONFIG_FLOW_VERSION: u32 = 2;
/// Entries of this version keep their settings in `data` only
pub const LEGACY_ENTRY_VERSION: u32 = 1;

// Configuration keys
pub const CONF_USERNAME: &str = "username";
pub const CONF_PASSWORD: &str = "password";
pub const CONF_CONTRACTS: &str = "contracts";
pub const CONF_METERS: &str = "meters";
pub const CONF_INVOICES: &str = "invoices";
pub const CONF_INVERT_INVOICES: &str = "invert_invoices";
pub const CONF_TIMEOUT: &str = "timeout";
pub const CONF_SCAN_INTERVAL: &str = "scan_interval";
pub const CONF_ENABLE_CONTRACT: &str = "enable_contract";
pub const CONF_ADD_ALL_CONTRACTS: &str = "add_all_contracts";
/// Placeholder option shown for imported entries
pub const CONF_NOT_IN_USE: &str = "not_in_use";

// Defaults
pub const DEFAULT_INVERT_INVOICES: bool = false;
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);
pub const DEFAULT_SCAN_INTERVAL: Duration = Duration::from_secs(60 * 60);

// Steps
pub const STEP_INIT: &str = "init";
pub const STEP_USER: &str = "user";
pub const STEP_CONTRACT: &str = "contract";
pub const STEP_IMPORT: &str = "import";

/// Form error shown when the account rejects the credentials
pub const ERROR_INVALID_CREDENTIALS: &str = "invalid_credentials";

/// Description placeholder holding the presented contract ID
pub const PLACEHOLDER_CODE: &str = "code";

/// Why a flow ended without an entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AbortReason {
    AlreadyExists,
    ContractsMissing,
    PartialOffline,
    ApiError,
    NothingEnabled,
    UnknownError,
}

impl AbortReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            AbortReason::AlreadyExists => "already_exists",
            AbortReason::ContractsMissing => "contracts_missing",
            AbortReason::PartialOffline => "partial_offline",
            AbortReason::ApiError => "api_error",
            AbortReason::NothingEnabled => "nothing_enabled",
            AbortReason::UnknownError => "unknown_error",
        }
    }
}

/// Title of an entry registered for `username`
pub fn entry_title(username: &str) -> String {
    format!("User: {}", username)
}
