//! Form schemas used by the Mosoblgaz flows

use ha_data_entry_flow::{DataSchema, FieldType};

use crate::constants::*;
use crate::options_flow::OptionDefaults;

/// Credentials form
pub fn authentication_schema() -> DataSchema {
    DataSchema::new()
        .required(CONF_USERNAME, FieldType::String)
        .required(CONF_PASSWORD, FieldType::String)
        .optional_with_default(CONF_ADD_ALL_CONTRACTS, FieldType::Boolean, false)
}

/// Which data of a contract to track
pub fn filter_schema() -> DataSchema {
    DataSchema::new()
        .optional_with_default(CONF_METERS, FieldType::Boolean, true)
        .optional_with_default(CONF_INVOICES, FieldType::Boolean, true)
}

/// Per-contract form: filter plus the enable toggle
pub fn contract_schema() -> DataSchema {
    filter_schema().extend(DataSchema::new().optional_with_default(
        CONF_ENABLE_CONTRACT,
        FieldType::Boolean,
        true,
    ))
}

/// Polling options form, prefilled with `defaults`
pub fn options_schema(defaults: &OptionDefaults) -> DataSchema {
    DataSchema::new()
        .optional_with_default(
            CONF_INVERT_INVOICES,
            FieldType::Boolean,
            defaults.invert_invoices,
        )
        .optional_with_default(CONF_TIMEOUT, FieldType::PositiveInt, defaults.timeout)
        .optional_with_default(
            CONF_SCAN_INTERVAL,
            FieldType::PositiveInt,
            defaults.scan_interval,
        )
}

/// Options form of imported entries; the field does nothing
pub fn import_options_schema() -> DataSchema {
    DataSchema::new().optional_with_default(CONF_NOT_IN_USE, FieldType::Boolean, false)
}
