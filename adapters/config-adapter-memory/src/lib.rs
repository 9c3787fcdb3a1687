//! In-memory configuration store
//!
//! Keeps runtime settings in a map for the lifetime of the process. It can be
//! seeded from a YAML document where nested mappings are flattened into
//! dot-separated keys:
//!
//! ```yaml
//! executions:
//!   mode: queue
//! ui.banners.dismissed: [V1]
//! ```

use std::{
	collections::HashMap,
	fmt::Debug,
	path::Path,
	sync::atomic::{AtomicBool, Ordering},
};

use async_trait::async_trait;
use parking_lot::RwLock;

use portcullis::{config_adapter::ConfigAdapter, prelude::*};

#[derive(Debug, Default)]
pub struct ConfigAdapterMemory {
	values: RwLock<HashMap<String, serde_json::Value>>,
	unreachable: AtomicBool,
}

fn flatten(
	prefix: Option<&str>,
	value: serde_yaml::Value,
	out: &mut HashMap<String, serde_json::Value>,
) -> ClResult<()> {
	match value {
		serde_yaml::Value::Mapping(map) => {
			for (key, value) in map {
				let key = key.as_str().ok_or_else(|| {
					Error::ConfigError(format!("setting keys must be strings, got {:?}", key))
				})?;
				let full_key = match prefix {
					Some(prefix) => format!("{}.{}", prefix, key),
					None => key.to_string(),
				};
				flatten(Some(&full_key), value, out)?;
			}
		}
		serde_yaml::Value::Null if prefix.is_none() => {}
		leaf => {
			let Some(key) = prefix else {
				return Err(Error::ConfigError("settings document must be a mapping".into()));
			};
			out.insert(key.to_string(), serde_json::to_value(leaf)?);
		}
	}
	Ok(())
}

impl ConfigAdapterMemory {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn from_values(values: impl IntoIterator<Item = (String, serde_json::Value)>) -> Self {
		Self {
			values: RwLock::new(values.into_iter().collect()),
			unreachable: AtomicBool::new(false),
		}
	}

	pub fn from_yaml_str(yaml: &str) -> ClResult<Self> {
		let doc: serde_yaml::Value = serde_yaml::from_str(yaml)?;
		let mut values = HashMap::new();
		flatten(None, doc, &mut values)?;
		debug!("Seeded configuration store with {} settings", values.len());
		Ok(Self::from_values(values))
	}

	pub fn from_yaml_file(path: impl AsRef<Path>) -> ClResult<Self> {
		let path = path.as_ref();
		let yaml = std::fs::read_to_string(path).map_err(|err| {
			Error::ConfigError(format!("cannot read {}: {}", path.display(), err))
		})?;
		Self::from_yaml_str(&yaml)
	}

	/// Simulates an outage: every call fails with `ServiceUnavailable` until
	/// switched back
	pub fn set_unreachable(&self, unreachable: bool) {
		if unreachable {
			warn!("Configuration store marked unreachable");
		}
		self.unreachable.store(unreachable, Ordering::SeqCst);
	}

	fn check_reachable(&self) -> ClResult<()> {
		if self.unreachable.load(Ordering::SeqCst) {
			Err(Error::ServiceUnavailable("configuration store is unreachable".into()))
		} else {
			Ok(())
		}
	}
}

#[async_trait]
impl ConfigAdapter for ConfigAdapterMemory {
	async fn read_setting(&self, key: &str) -> ClResult<Option<serde_json::Value>> {
		self.check_reachable()?;
		Ok(self.values.read().get(key).cloned())
	}

	async fn update_setting(&self, key: &str, value: Option<serde_json::Value>) -> ClResult<()> {
		self.check_reachable()?;
		let mut values = self.values.write();
		match value {
			Some(value) => {
				values.insert(key.to_string(), value);
			}
			None => {
				values.remove(key);
			}
		}
		Ok(())
	}

	async fn list_settings(
		&self,
		prefix: Option<&[String]>,
	) -> ClResult<HashMap<String, serde_json::Value>> {
		self.check_reachable()?;
		let values = self.values.read();
		Ok(values
			.iter()
			.filter(|(key, _)| {
				prefix.is_none_or(|prefixes| prefixes.iter().any(|p| key.starts_with(p.as_str())))
			})
			.map(|(key, value)| (key.clone(), value.clone()))
			.collect())
	}
}


// vim: ts=4
