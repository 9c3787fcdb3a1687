//! Settings snapshot served to web clients
//!
//! - **Types** (`types.rs`): the snapshot and its nested groups
//! - **Service** (`service.rs`): `FrontendService`, which builds the snapshot,
//!   refreshes its dynamic part and generates the type catalog cache

pub mod service;
pub mod types;

pub use service::FrontendService;
pub use types::FrontendSettings;

// vim: ts=4
