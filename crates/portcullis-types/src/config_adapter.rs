//! Configuration store boundary
//!
//! Persistent key-value storage of runtime settings as JSON values. Keys are
//! dot-separated (e.g. `ui.banners.dismissed`).

use async_trait::async_trait;
use std::collections::HashMap;
use std::fmt::Debug;

use crate::prelude::*;

#[async_trait]
pub trait ConfigAdapter: Debug + Send + Sync {
	/// Reads a single setting. `Ok(None)` means the key was never persisted.
	async fn read_setting(&self, key: &str) -> ClResult<Option<serde_json::Value>>;

	/// Creates, updates or (with `None`) deletes a setting
	async fn update_setting(&self, key: &str, value: Option<serde_json::Value>) -> ClResult<()>;

	/// Lists all settings, or those matching any of the given prefixes
	async fn list_settings(
		&self,
		prefix: Option<&[String]>,
	) -> ClResult<HashMap<String, serde_json::Value>>;
}

// vim: ts=4
