//! Settings service with caching and validation

use chrono::Utc;
use lru::LruCache;
use parking_lot::Mutex;
use std::num::NonZeroUsize;
use std::sync::Arc;

use portcullis_types::config_adapter::ConfigAdapter;

use super::types::{FrozenSettingsRegistry, Setting, SettingScope, SettingValue};
use crate::prelude::*;

const DEFAULT_CACHE_SIZE: NonZeroUsize = match NonZeroUsize::new(100) {
	Some(n) => n,
	None => NonZeroUsize::MIN,
};

/// LRU cache for settings values
pub struct SettingsCache {
	cache: Mutex<LruCache<String, SettingValue>>,
}

impl SettingsCache {
	pub fn new(capacity: usize) -> Self {
		let capacity = NonZeroUsize::new(capacity).unwrap_or(DEFAULT_CACHE_SIZE);
		Self { cache: Mutex::new(LruCache::new(capacity)) }
	}

	pub fn get(&self, key: &str) -> Option<SettingValue> {
		self.cache.lock().get(key).cloned()
	}

	pub fn put(&self, key: String, value: SettingValue) {
		self.cache.lock().put(key, value);
	}

	pub fn invalidate(&self, key: &str) {
		self.cache.lock().pop(key);
	}

	pub fn clear(&self) {
		self.cache.lock().clear();
	}
}

/// Settings service - main interface for reading and changing runtime settings
pub struct SettingsService {
	registry: Arc<FrozenSettingsRegistry>,
	cache: SettingsCache,
	config: Arc<dyn ConfigAdapter>,
}

fn unknown_setting(key: &str) -> Error {
	Error::ConfigError(format!("Unknown setting: {}", key))
}

impl SettingsService {
	pub fn new(
		registry: Arc<FrozenSettingsRegistry>,
		config: Arc<dyn ConfigAdapter>,
		cache_size: usize,
	) -> Self {
		Self { registry, cache: SettingsCache::new(cache_size), config }
	}

	/// Get setting value: persisted value, then default.
	/// Fails with `ConfigKeyMissing` if neither exists.
	pub async fn get(&self, key: &str) -> ClResult<SettingValue> {
		if let Some(value) = self.cache.get(key) {
			debug!("Setting cache hit: {}", key);
			return Ok(value);
		}
		self.load(key).await
	}

	/// Like `get`, but always asks the configuration store, which may have
	/// been changed behind the service's back
	pub async fn get_fresh(&self, key: &str) -> ClResult<SettingValue> {
		self.load(key).await
	}

	/// Only persisted values are cached; a default is served uncached so a
	/// value written to the store later is picked up.
	async fn load(&self, key: &str) -> ClResult<SettingValue> {
		let def = self.registry.get(key).ok_or_else(|| unknown_setting(key))?;

		if def.scope != SettingScope::System {
			if let Some(json_value) = self.config.read_setting(key).await? {
				let value = serde_json::from_value::<SettingValue>(json_value)
					.map_err(|e| Error::ValidationError(format!("Invalid setting value: {}", e)))?;
				self.cache.put(key.to_string(), value.clone());
				return Ok(value);
			}
			self.cache.invalidate(key);
		}

		match &def.default {
			Some(default) => Ok(default.clone()),
			None => Err(Error::ConfigKeyMissing(key.to_string())),
		}
	}

	/// Set setting value with type and validator checks
	pub async fn set(&self, key: &str, value: SettingValue) -> ClResult<Setting> {
		let def = self.registry.get(key).ok_or_else(|| unknown_setting(key))?;

		if def.scope == SettingScope::System {
			warn!("Refusing to change read-only setting '{}'", key);
			return Err(Error::ValidationError(format!("Setting '{}' is read-only", key)));
		}

		if let Some(default) = &def.default {
			if !value.matches_type(default) {
				return Err(Error::ValidationError(format!(
					"Type mismatch for setting '{}': expected {}, got {}",
					key,
					default.type_name(),
					value.type_name()
				)));
			}
		}

		if let Some(validator) = &def.validator {
			validator(&value)?;
		}

		let json_value = serde_json::to_value(&value)?;
		self.config.update_setting(key, Some(json_value)).await?;
		self.cache.invalidate(key);

		info!("Setting '{}' updated", key);
		Ok(Setting { key: key.to_string(), value, updated_at: Utc::now() })
	}

	/// Delete a persisted value (falls back to the default)
	pub async fn delete(&self, key: &str) -> ClResult<()> {
		self.registry.get(key).ok_or_else(|| unknown_setting(key))?;
		self.config.update_setting(key, None).await?;
		self.cache.invalidate(key);

		info!("Setting '{}' deleted", key);
		Ok(())
	}

	/// Drops every cached value, e.g. after the store was changed externally
	pub fn invalidate_cache(&self) {
		self.cache.clear();
	}

	/// Validate that all required settings (no default and not optional) are configured
	pub async fn validate_required_settings(&self) -> ClResult<()> {
		for def in self.registry.list() {
			if def.optional || def.default.is_some() {
				continue;
			}

			if self.config.read_setting(&def.key).await?.is_none() {
				return Err(Error::ValidationError(format!(
					"Required setting '{}' is not configured",
					def.key
				)));
			}
		}
		Ok(())
	}

	/// Type-safe getters (required - returns error if not found)
	pub async fn get_string(&self, key: &str) -> ClResult<String> {
		self.get(key).await?.into_string(key)
	}

	pub async fn get_int(&self, key: &str) -> ClResult<i64> {
		self.get(key).await?.into_int(key)
	}

	pub async fn get_bool(&self, key: &str) -> ClResult<bool> {
		self.get(key).await?.into_bool(key)
	}

	pub async fn get_json(&self, key: &str) -> ClResult<serde_json::Value> {
		self.get(key).await?.into_json(key)
	}

	/// Type-safe optional getters (returns None if the key has no value)
	/// Still returns error if setting exists but has wrong type
	pub async fn get_string_opt(&self, key: &str) -> ClResult<Option<String>> {
		match self.get_string(key).await {
			Ok(s) => Ok(Some(s)),
			Err(Error::ConfigKeyMissing(_)) => Ok(None),
			Err(e) => Err(e),
		}
	}

	pub async fn get_int_opt(&self, key: &str) -> ClResult<Option<i64>> {
		match self.get_int(key).await {
			Ok(i) => Ok(Some(i)),
			Err(Error::ConfigKeyMissing(_)) => Ok(None),
			Err(e) => Err(e),
		}
	}

	pub async fn get_bool_opt(&self, key: &str) -> ClResult<Option<bool>> {
		match self.get_bool(key).await {
			Ok(b) => Ok(Some(b)),
			Err(Error::ConfigKeyMissing(_)) => Ok(None),
			Err(e) => Err(e),
		}
	}

	pub async fn get_json_opt(&self, key: &str) -> ClResult<Option<serde_json::Value>> {
		match self.get_json(key).await {
			Ok(j) => Ok(Some(j)),
			Err(Error::ConfigKeyMissing(_)) => Ok(None),
			Err(e) => Err(e),
		}
	}

	pub fn registry(&self) -> &Arc<FrozenSettingsRegistry> {
		&self.registry
	}
}


// vim: ts=4
