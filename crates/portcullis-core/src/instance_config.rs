//! Static instance configuration
//!
//! Read once at startup, either from a YAML file or built in code. Every
//! field has a default, so a partial file (or an empty one) is valid.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::prelude::*;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EndpointsConfig {
	pub rest: String,
	pub form: String,
	pub form_test: String,
	pub form_waiting: String,
	pub webhook: String,
	pub webhook_test: String,
	pub webhook_waiting: String,
}

impl Default for EndpointsConfig {
	fn default() -> Self {
		Self {
			rest: "rest".into(),
			form: "form".into(),
			form_test: "form-test".into(),
			form_waiting: "form-waiting".into(),
			webhook: "webhook".into(),
			webhook_test: "webhook-test".into(),
			webhook_waiting: "webhook-waiting".into(),
		}
	}
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExecutionsConfig {
	/// "all" or "none"
	pub save_data_on_error: String,
	pub save_data_on_success: String,
	pub save_data_manual_executions: bool,
	pub save_execution_progress: bool,
	/// Seconds, -1 disables the timeout
	pub timeout: i64,
	pub max_timeout: i64,
	/// Concurrent production executions, -1 is unlimited
	pub concurrency_production_limit: i64,
	pub prune_data: bool,
	/// Hours
	pub prune_data_max_age: i64,
	pub prune_data_max_count: i64,
}

impl Default for ExecutionsConfig {
	fn default() -> Self {
		Self {
			save_data_on_error: "all".into(),
			save_data_on_success: "all".into(),
			save_data_manual_executions: true,
			save_execution_progress: false,
			timeout: -1,
			max_timeout: 3600,
			concurrency_production_limit: -1,
			prune_data: true,
			prune_data_max_age: 336,
			prune_data_max_count: 10_000,
		}
	}
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PosthogConfig {
	pub api_host: String,
	pub api_key: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DiagnosticsConfig {
	pub enabled: bool,
	/// "<key>;<url>"
	pub frontend_config: String,
	pub posthog: PosthogConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PublicApiConfig {
	pub disabled: bool,
	pub path: String,
	pub swagger_ui_disabled: bool,
}

impl Default for PublicApiConfig {
	fn default() -> Self {
		Self { disabled: false, path: "api".into(), swagger_ui_disabled: false }
	}
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TemplatesConfig {
	pub enabled: bool,
	pub host: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VersionNotificationsConfig {
	pub enabled: bool,
	pub endpoint: String,
	pub info_url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GenericConfig {
	pub timezone: String,
	pub release_channel: String,
	pub default_locale: String,
}

impl Default for GenericConfig {
	fn default() -> Self {
		Self {
			timezone: "America/New_York".into(),
			release_channel: "dev".into(),
			default_locale: "en".into(),
		}
	}
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LoggingConfig {
	pub level: String,
}

impl Default for LoggingConfig {
	fn default() -> Self {
		Self { level: "info".into() }
	}
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DatabaseConfig {
	#[serde(rename = "type")]
	pub db_type: String,
}

impl Default for DatabaseConfig {
	fn default() -> Self {
		Self { db_type: "sqlite".into() }
	}
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NodesConfig {
	pub community_packages_enabled: bool,
	/// Built-in modules code nodes may require, `None` allows none
	pub allow_builtin: Option<Vec<String>>,
	pub allow_external: Option<Vec<String>>,
}

impl Default for NodesConfig {
	fn default() -> Self {
		Self { community_packages_enabled: true, allow_builtin: None, allow_external: None }
	}
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SecurityConfig {
	pub block_file_access_to_data_dir: bool,
	pub secure_cookie: bool,
}

impl Default for SecurityConfig {
	fn default() -> Self {
		Self { block_file_access_to_data_dir: true, secure_cookie: true }
	}
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DeploymentConfig {
	#[serde(rename = "type")]
	pub deployment_type: String,
}

impl Default for DeploymentConfig {
	fn default() -> Self {
		Self { deployment_type: "default".into() }
	}
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserManagementConfig {
	pub personalization_enabled: bool,
	pub hide_usage_page: bool,
}

impl Default for UserManagementConfig {
	fn default() -> Self {
		Self { personalization_enabled: true, hide_usage_page: false }
	}
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UrlConfig {
	pub protocol: String,
	pub host: String,
	pub port: u16,
	pub path: String,
	/// Overrides the webhook base URL
	pub webhook_url: Option<String>,
	/// Overrides the editor base URL
	pub editor_base_url: Option<String>,
}

impl Default for UrlConfig {
	fn default() -> Self {
		Self {
			protocol: "http".into(),
			host: "localhost".into(),
			port: 5678,
			path: "/".into(),
			webhook_url: None,
			editor_base_url: None,
		}
	}
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InstanceConfig {
	pub instance_id: String,
	pub is_docker: bool,
	#[serde(rename = "inE2ETests")]
	pub in_e2e_tests: bool,
	pub preview_mode: bool,
	pub hiring_banner_enabled: bool,
	pub workflow_tags_disabled: bool,
	pub workflow_caller_policy_default_option: String,
	pub push_backend: String,
	pub expression_evaluator: String,
	pub beta_features: Vec<String>,

	pub endpoints: EndpointsConfig,
	pub executions: ExecutionsConfig,
	pub diagnostics: DiagnosticsConfig,
	pub public_api: PublicApiConfig,
	pub templates: TemplatesConfig,
	pub version_notifications: VersionNotificationsConfig,
	pub generic: GenericConfig,
	pub logging: LoggingConfig,
	pub database: DatabaseConfig,
	pub nodes: NodesConfig,
	pub security: SecurityConfig,
	pub deployment: DeploymentConfig,
	pub user_management: UserManagementConfig,
	pub url: UrlConfig,
}

impl Default for InstanceConfig {
	fn default() -> Self {
		Self {
			instance_id: String::new(),
			is_docker: false,
			in_e2e_tests: false,
			preview_mode: false,
			hiring_banner_enabled: false,
			workflow_tags_disabled: false,
			workflow_caller_policy_default_option: "workflowsFromSameOwner".into(),
			push_backend: "websocket".into(),
			expression_evaluator: "tournament".into(),
			beta_features: Vec::new(),
			endpoints: EndpointsConfig::default(),
			executions: ExecutionsConfig::default(),
			diagnostics: DiagnosticsConfig::default(),
			public_api: PublicApiConfig::default(),
			templates: TemplatesConfig::default(),
			version_notifications: VersionNotificationsConfig::default(),
			generic: GenericConfig::default(),
			logging: LoggingConfig::default(),
			database: DatabaseConfig::default(),
			nodes: NodesConfig::default(),
			security: SecurityConfig::default(),
			deployment: DeploymentConfig::default(),
			user_management: UserManagementConfig::default(),
			url: UrlConfig::default(),
		}
	}
}

impl InstanceConfig {
	pub fn from_yaml_str(yaml: &str) -> ClResult<Self> {
		// An empty document parses as unit, not as an empty map
		if yaml.trim().is_empty() {
			return Ok(Self::default());
		}
		Ok(serde_yaml::from_str(yaml)?)
	}

	pub fn from_yaml_file(path: impl AsRef<Path>) -> ClResult<Self> {
		let path = path.as_ref();
		let yaml = std::fs::read_to_string(path).map_err(|err| {
			Error::ConfigError(format!("cannot read {}: {}", path.display(), err))
		})?;
		let config = Self::from_yaml_str(&yaml)?;
		info!("Loaded instance configuration from {}", path.display());
		Ok(config)
	}

	/// Ensures an instance id is set, generating a random one if needed
	pub fn with_instance_id(mut self) -> Self {
		if self.instance_id.is_empty() {
			self.instance_id = uuid::Uuid::new_v4().simple().to_string();
		}
		self
	}
}


// vim: ts=4
