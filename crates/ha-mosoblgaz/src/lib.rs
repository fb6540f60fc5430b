//! Mosoblgaz integration
//!
//! Config and options flows for Mosoblgaz gas utility accounts. The config
//! flow registers an account and lets the user pick which contracts to
//! track; the options flow adjusts polling behaviour afterwards.
//!
//! The account API client is supplied by the caller through an
//! [`ApiFactory`].

pub mod api;
pub mod config_flow;
pub mod constants;
mod integration;
pub mod options_flow;
pub mod schema;
pub mod yaml_config;

pub use api::{ApiFactory, Contract, Contracts, MosoblgazApi, MosoblgazError, MosoblgazResult};
pub use config_flow::{ContractDecision, ContractFilter, MosoblgazFlowHandler};
pub use constants::{AbortReason, CONFIG_FLOW_VERSION, DOMAIN};
pub use integration::MosoblgazIntegration;
pub use options_flow::{MosoblgazOptionsFlowHandler, OptionDefaults};
pub use yaml_config::{async_setup, parse_config, AccountConfig, ContractSetting, SetupError};
