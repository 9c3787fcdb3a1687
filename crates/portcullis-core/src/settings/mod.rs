//! Runtime settings subsystem
//!
//! - **Types** (`types.rs`): definitions, values and the registry
//! - **Service** (`service.rs`): `SettingsService` with caching and validation
//!
//! Settings are registered once at startup, then the registry is frozen and
//! shared. Values are read through the service, which falls back to the
//! registered default and reports `ConfigKeyMissing` when there is none.

pub mod service;
pub mod types;

pub use service::SettingsService;
pub use types::{
	FrozenSettingsRegistry, Setting, SettingDefinition, SettingDefinitionBuilder, SettingScope,
	SettingValue, SettingsRegistry,
};

// vim: ts=4
