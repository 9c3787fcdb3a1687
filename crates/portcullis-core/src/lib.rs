//! Core services of Portcullis.
//!
//! This crate contains the capability gate, the runtime settings service, the
//! credential override resolver, the type catalog publisher and the frontend
//! settings aggregator built on top of them. Collaborators are reached through
//! the traits in `portcullis-types`.

#![deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![forbid(unsafe_code)]

pub mod capability;
pub mod core_settings;
pub mod frontend;
pub mod instance_config;
pub mod overrides;
pub mod prelude;
pub mod publisher;
pub mod settings;
pub mod url;

// Re-export commonly used types
pub use capability::CapabilityGate;
pub use core_settings::register_settings;
pub use frontend::{FrontendService, FrontendSettings};
pub use instance_config::InstanceConfig;
pub use overrides::OverridesByType;
pub use publisher::TypeCatalogPublisher;
pub use url::InstanceUrls;

// vim: ts=4
