//! Portcullis is a capability-gating and settings-aggregation layer for
//! self-hosted automation servers.
//!
//! # Features
//!
//! - Capability gate
//!     - feature flags and quotas behind one query interface
//!     - policy-driven (pluggable entitlement source, fails closed) or permissive
//! - Runtime settings
//!     - registered definitions with defaults and validators
//!     - cached reads over a pluggable configuration store
//! - Frontend settings snapshot
//!     - built once, dynamic part refreshed on demand
//!     - failed reads degrade to documented defaults
//! - Type catalog cache
//!     - credential override annotation along inheritance chains
//!     - node and credential types pre-rendered as JSON files

// Re-export shared types and adapter traits from portcullis-types
pub use portcullis_types::capability;
pub use portcullis_types::catalog_adapter;
pub use portcullis_types::config_adapter;
pub use portcullis_types::entitlement_adapter;
pub use portcullis_types::error;
pub use portcullis_types::url_adapter;

// Core re-exports
pub use portcullis_core::frontend;
pub use portcullis_core::instance_config;
pub use portcullis_core::overrides;
pub use portcullis_core::prelude;
pub use portcullis_core::settings;
pub use portcullis_core::{CapabilityGate, InstanceConfig, InstanceUrls, OverridesByType};

pub mod app;

pub use crate::app::{App, AppBuilder, AppState};

// vim: ts=4
