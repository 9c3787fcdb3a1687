//! Frontend settings aggregation
//!
//! The snapshot is built once when the service is created. Fields that depend
//! on the configuration store, the capability gate or the URL resolver are
//! recomputed by [`FrontendService::refresh`]; the rest never changes.

use parking_lot::RwLock;
use std::sync::Arc;

use portcullis_types::capability::PlanMetadata;
use portcullis_types::catalog_adapter::{CatalogAdapter, LoadedTypes, PostProcessorFn};
use portcullis_types::url_adapter::UrlResolver;

use super::types::{
	AiCreditsSettings, AllowedModules, AuthCookie, BannersSettings, DeploymentSettings,
	EnterpriseSettings, ExpressionsSettings, FrontendSettings, LoginSettings, OauthCallbackUrls,
	PosthogSettings, ProjectsSettings, PruningSettings, PublicApiSettings, SecuritySettings,
	SsoSettings, TeamProjects, TelemetryConfig, TelemetrySettings, TemplatesSettings, Toggle,
	UserManagementSettings, VariablesSettings, VersionNotificationSettings,
	WorkflowHistorySettings,
};
use crate::capability::CapabilityGate;
use crate::instance_config::{DiagnosticsConfig, InstanceConfig};
use crate::overrides::{self, OverridesByType};
use crate::prelude::*;
use crate::publisher::TypeCatalogPublisher;
use crate::settings::{SettingValue, SettingsService};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const RUST_VERSION: &str = env!("CARGO_PKG_RUST_VERSION");

const PUBLIC_API_LATEST_VERSION: u32 = 1;
const SAML_LOGIN_LABEL: &str = "SAML 2.0";
const PRODUCTION: &str = "production";

/// Configuration store values, each falling back to its default on failure
#[derive(Debug, Clone, PartialEq)]
struct StoredSettings {
	owner_set_up: bool,
	authentication_method: String,
	smtp_setup: bool,
	ldap_login_label: String,
	dismissed_banners: Vec<String>,
	easy_ai_workflow_onboarded: bool,
	mfa_enabled: bool,
	execution_mode: String,
	binary_data_mode: String,
	prune_time: QuotaLimit,
}

impl Default for StoredSettings {
	fn default() -> Self {
		Self {
			owner_set_up: false,
			authentication_method: "email".into(),
			smtp_setup: false,
			ldap_login_label: String::new(),
			dismissed_banners: Vec::new(),
			easy_ai_workflow_onboarded: false,
			mfa_enabled: false,
			execution_mode: "regular".into(),
			binary_data_mode: "default".into(),
			prune_time: QuotaLimit::UNLIMITED,
		}
	}
}

/// Reads `key` past the settings cache, falling back to `default`. A missing
/// value is expected; any other failure is logged.
async fn read_or<T>(
	settings: &SettingsService,
	key: &str,
	convert: impl FnOnce(SettingValue, &str) -> ClResult<T>,
	default: T,
) -> T {
	match settings.get_fresh(key).await.and_then(|value| convert(value, key)) {
		Ok(value) => value,
		Err(err) if err.is_missing_value() => default,
		Err(err) => {
			warn!("Cannot read setting '{}', using default: {}", key, err);
			default
		}
	}
}

fn string_list(value: SettingValue, key: &str) -> ClResult<Vec<String>> {
	Ok(serde_json::from_value(value.into_json(key)?)?)
}

fn non_empty(value: SettingValue, key: &str) -> ClResult<bool> {
	Ok(!value.into_string(key)?.trim().is_empty())
}

fn quota(value: SettingValue, key: &str) -> ClResult<QuotaLimit> {
	value.into_int(key).map(QuotaLimit)
}

impl StoredSettings {
	/// The store may change externally, so every key is read fresh
	async fn read(settings: &SettingsService) -> Self {
		let d = Self::default();
		Self {
			owner_set_up: read_or(
				settings,
				"userManagement.isInstanceOwnerSetUp",
				SettingValue::into_bool,
				d.owner_set_up,
			)
			.await,
			authentication_method: read_or(
				settings,
				"userManagement.authenticationMethod",
				SettingValue::into_string,
				d.authentication_method,
			)
			.await,
			smtp_setup: read_or(settings, "email.smtp.host", non_empty, d.smtp_setup).await,
			ldap_login_label: read_or(
				settings,
				"ldap.loginLabel",
				SettingValue::into_string,
				d.ldap_login_label,
			)
			.await,
			dismissed_banners: read_or(
				settings,
				"ui.banners.dismissed",
				string_list,
				d.dismissed_banners,
			)
			.await,
			easy_ai_workflow_onboarded: read_or(
				settings,
				"easyAIWorkflowOnboarded",
				SettingValue::into_bool,
				d.easy_ai_workflow_onboarded,
			)
			.await,
			mfa_enabled: read_or(settings, "mfa.enabled", SettingValue::into_bool, d.mfa_enabled)
				.await,
			execution_mode: read_or(
				settings,
				"executions.mode",
				SettingValue::into_string,
				d.execution_mode,
			)
			.await,
			binary_data_mode: read_or(
				settings,
				"binaryDataManager.mode",
				SettingValue::into_string,
				d.binary_data_mode,
			)
			.await,
			prune_time: read_or(settings, "workflowHistory.pruneTime", quota, d.prune_time).await,
		}
	}
}

/// The part of the snapshot that `refresh` replaces
#[derive(Debug, Clone)]
struct DynamicSettings {
	url_base_webhook: String,
	url_base_editor: String,
	oauth_callback_urls: OauthCallbackUrls,
	user_management: UserManagementSettings,
	sso: SsoSettings,
	public_api_enabled: bool,
	enterprise: EnterpriseSettings,
	license: PlanMetadata,
	variables: VariablesSettings,
	workflow_history: WorkflowHistorySettings,
	ai_assistant: Toggle,
	ask_ai: Toggle,
	ai_credits: AiCreditsSettings,
	mfa: Toggle,
	execution_mode: String,
	binary_data_mode: String,
	banners: BannersSettings,
	easy_ai_workflow_onboarded: bool,
}

impl DynamicSettings {
	fn derive(
		config: &InstanceConfig,
		gate: &CapabilityGate,
		urls: &dyn UrlResolver,
		stored: StoredSettings,
	) -> Self {
		let instance_base_url = urls.instance_base_url();
		let rest = &config.endpoints.rest;
		let oauth_callback_urls = OauthCallbackUrls {
			oauth1: format!("{}/{}/oauth1-credential/callback", instance_base_url, rest),
			oauth2: format!("{}/{}/oauth2-credential/callback", instance_base_url, rest),
		};

		let license = gate.plan_metadata();
		let enterprise = EnterpriseSettings {
			sharing: gate.is_feature_enabled(Feature::Sharing),
			ldap: gate.is_feature_enabled(Feature::Ldap),
			saml: gate.is_feature_enabled(Feature::Saml),
			log_streaming: gate.is_feature_enabled(Feature::LogStreaming),
			advanced_execution_filters: gate.is_feature_enabled(Feature::AdvancedExecutionFilters),
			variables: gate.is_feature_enabled(Feature::Variables),
			source_control: gate.is_feature_enabled(Feature::SourceControl),
			audit_logs: gate.is_feature_enabled(Feature::AuditLogs),
			external_secrets: gate.is_feature_enabled(Feature::ExternalSecrets),
			show_non_prod_banner: license.environment != PRODUCTION,
			debug_in_editor: gate.is_feature_enabled(Feature::DebugInEditor),
			binary_data_s3: gate.is_feature_enabled(Feature::BinaryDataS3),
			workflow_history: gate.is_feature_enabled(Feature::WorkflowHistory),
			worker_view: gate.is_feature_enabled(Feature::WorkerView),
			advanced_permissions: gate.is_feature_enabled(Feature::AdvancedPermissions),
			projects: ProjectsSettings {
				team: TeamProjects { limit: gate.get_quota(Quota::TeamProjects) },
			},
		};

		let sso = SsoSettings {
			saml: LoginSettings {
				login_enabled: enterprise.saml,
				login_label: SAML_LOGIN_LABEL.into(),
			},
			ldap: LoginSettings {
				login_enabled: enterprise.ldap,
				login_label: stored.ldap_login_label,
			},
		};

		let binary_data_mode = if stored.binary_data_mode == "s3" && !enterprise.binary_data_s3 {
			warn!("Binary data mode 's3' is not licensed, reporting 'default'");
			"default".to_string()
		} else {
			stored.binary_data_mode
		};

		let license_prune_time = gate.get_quota(Quota::WorkflowHistoryPrune);

		Self {
			url_base_webhook: urls.webhook_base_url(),
			url_base_editor: instance_base_url,
			oauth_callback_urls,
			user_management: UserManagementSettings {
				quota: gate.get_quota(Quota::Users),
				show_setup_on_first_load: !stored.owner_set_up,
				smtp_setup: stored.smtp_setup,
				authentication_method: stored.authentication_method,
			},
			sso,
			public_api_enabled: !config.public_api.disabled && gate.is_api_enabled(),
			enterprise,
			license,
			variables: VariablesSettings { limit: gate.get_quota(Quota::Variables) },
			workflow_history: WorkflowHistorySettings {
				prune_time: stored.prune_time.min(license_prune_time),
				license_prune_time,
			},
			ai_assistant: Toggle::new(gate.is_feature_enabled(Feature::AiAssistant)),
			ask_ai: Toggle::new(gate.is_feature_enabled(Feature::AskAi)),
			ai_credits: AiCreditsSettings {
				enabled: gate.is_feature_enabled(Feature::AiCredits),
				credits: gate.get_quota(Quota::AiCredits),
			},
			mfa: Toggle::new(stored.mfa_enabled),
			execution_mode: stored.execution_mode,
			binary_data_mode,
			banners: BannersSettings { dismissed: stored.dismissed_banners },
			easy_ai_workflow_onboarded: stored.easy_ai_workflow_onboarded,
		}
	}

	fn apply(self, settings: &mut FrontendSettings) {
		settings.url_base_webhook = self.url_base_webhook;
		settings.url_base_editor = self.url_base_editor;
		settings.oauth_callback_urls = self.oauth_callback_urls;
		settings.user_management = self.user_management;
		settings.sso = self.sso;
		settings.public_api.enabled = self.public_api_enabled;
		settings.enterprise = self.enterprise;
		settings.license = self.license;
		settings.variables = self.variables;
		settings.workflow_history = self.workflow_history;
		settings.ai_assistant = self.ai_assistant;
		settings.ask_ai = self.ask_ai;
		settings.ai_credits = self.ai_credits;
		settings.mfa = self.mfa;
		settings.execution_mode = self.execution_mode;
		settings.binary_data_mode = self.binary_data_mode;
		settings.banners = self.banners;
		settings.easy_ai_workflow_onboarded = self.easy_ai_workflow_onboarded;
	}
}

fn telemetry_settings(diagnostics: &DiagnosticsConfig) -> TelemetrySettings {
	if !diagnostics.enabled {
		return TelemetrySettings::default();
	}

	match diagnostics.frontend_config.split_once(';') {
		Some((key, url)) if !key.is_empty() && !url.is_empty() => TelemetrySettings {
			enabled: true,
			config: Some(TelemetryConfig { key: key.into(), url: url.into() }),
		},
		_ => {
			warn!("Diagnostics frontend config is invalid");
			TelemetrySettings::default()
		}
	}
}

fn initial_settings(config: &InstanceConfig, dynamic: DynamicSettings) -> FrontendSettings {
	let DynamicSettings {
		url_base_webhook,
		url_base_editor,
		oauth_callback_urls,
		user_management,
		sso,
		public_api_enabled,
		enterprise,
		license,
		variables,
		workflow_history,
		ai_assistant,
		ask_ai,
		ai_credits,
		mfa,
		execution_mode,
		binary_data_mode,
		banners,
		easy_ai_workflow_onboarded,
	} = dynamic;

	let diagnostics = &config.diagnostics;
	let executions = &config.executions;

	FrontendSettings {
		in_e2e_tests: config.in_e2e_tests,
		is_docker: config.is_docker,
		database_type: config.database.db_type.clone(),
		preview_mode: config.preview_mode,
		endpoint_form: config.endpoints.form.clone(),
		endpoint_form_test: config.endpoints.form_test.clone(),
		endpoint_form_waiting: config.endpoints.form_waiting.clone(),
		endpoint_webhook: config.endpoints.webhook.clone(),
		endpoint_webhook_test: config.endpoints.webhook_test.clone(),
		endpoint_webhook_waiting: config.endpoints.webhook_waiting.clone(),
		save_data_error_execution: executions.save_data_on_error.clone(),
		save_data_success_execution: executions.save_data_on_success.clone(),
		save_manual_executions: executions.save_data_manual_executions,
		save_execution_progress: executions.save_execution_progress,
		execution_timeout: executions.timeout,
		max_execution_timeout: executions.max_timeout,
		workflow_caller_policy_default_option: config.workflow_caller_policy_default_option.clone(),
		timezone: config.generic.timezone.clone(),
		url_base_webhook,
		url_base_editor,
		binary_data_mode,
		version_cli: VERSION.into(),
		rust_version: RUST_VERSION.into(),
		concurrency: executions.concurrency_production_limit,
		auth_cookie: AuthCookie { secure: config.security.secure_cookie },
		release_channel: config.generic.release_channel.clone(),
		oauth_callback_urls,
		version_notifications: VersionNotificationSettings {
			enabled: config.version_notifications.enabled,
			endpoint: config.version_notifications.endpoint.clone(),
			info_url: config.version_notifications.info_url.clone(),
		},
		instance_id: config.instance_id.clone(),
		telemetry: telemetry_settings(diagnostics),
		posthog: PosthogSettings {
			enabled: diagnostics.enabled,
			api_host: diagnostics.posthog.api_host.clone(),
			api_key: diagnostics.posthog.api_key.clone(),
			autocapture: false,
			disable_session_recording: config.deployment.deployment_type != "cloud",
			debug: config.logging.level == "debug",
		},
		personalization_survey_enabled: config.user_management.personalization_enabled
			&& diagnostics.enabled,
		default_locale: config.generic.default_locale.clone(),
		user_management,
		sso,
		public_api: PublicApiSettings {
			enabled: public_api_enabled,
			latest_version: PUBLIC_API_LATEST_VERSION,
			path: config.public_api.path.clone(),
			swagger_ui: Toggle::new(!config.public_api.swagger_ui_disabled),
		},
		workflow_tags_disabled: config.workflow_tags_disabled,
		log_level: config.logging.level.clone(),
		hiring_banner_enabled: config.hiring_banner_enabled,
		ai_assistant,
		templates: TemplatesSettings {
			enabled: config.templates.enabled,
			host: config.templates.host.clone(),
		},
		execution_mode,
		push_backend: config.push_backend.clone(),
		community_nodes_enabled: config.nodes.community_packages_enabled,
		deployment: DeploymentSettings {
			deployment_type: config.deployment.deployment_type.clone(),
		},
		allowed_modules: AllowedModules {
			built_in: config.nodes.allow_builtin.clone(),
			external: config.nodes.allow_external.clone(),
		},
		enterprise,
		mfa,
		hide_usage_page: config.user_management.hide_usage_page,
		license,
		variables,
		expressions: ExpressionsSettings { evaluator: config.expression_evaluator.clone() },
		banners,
		ask_ai,
		ai_credits,
		workflow_history,
		pruning: PruningSettings {
			is_enabled: executions.prune_data,
			max_age: executions.prune_data_max_age,
			max_count: executions.prune_data_max_count,
		},
		security: SecuritySettings {
			block_file_access_to_data_dir: config.security.block_file_access_to_data_dir,
		},
		beta_features: config.beta_features.clone(),
		easy_ai_workflow_onboarded,
	}
}

/// Builds and maintains the settings snapshot served to web clients, and
/// pre-renders the type catalog for them.
pub struct FrontendService {
	config: Arc<InstanceConfig>,
	gate: Arc<CapabilityGate>,
	settings_service: Arc<SettingsService>,
	urls: Arc<dyn UrlResolver>,
	catalog: Arc<dyn CatalogAdapter>,
	publisher: TypeCatalogPublisher,
	overrides: RwLock<OverridesByType>,
	snapshot: RwLock<FrontendSettings>,
}

impl FrontendService {
	/// Builds the initial snapshot and hooks type generation into catalog
	/// reloads. Configuration store values start at their defaults until the
	/// first `refresh`.
	///
	/// When called inside a tokio runtime the first type generation is started
	/// in the background.
	pub fn new(
		config: Arc<InstanceConfig>,
		gate: Arc<CapabilityGate>,
		settings_service: Arc<SettingsService>,
		urls: Arc<dyn UrlResolver>,
		catalog: Arc<dyn CatalogAdapter>,
		publisher: TypeCatalogPublisher,
		overrides: OverridesByType,
	) -> Arc<Self> {
		let dynamic =
			DynamicSettings::derive(&config, &gate, urls.as_ref(), StoredSettings::default());
		let snapshot = initial_settings(&config, dynamic);

		let service = Arc::new(Self {
			config,
			gate,
			settings_service,
			urls,
			catalog,
			publisher,
			overrides: RwLock::new(overrides),
			snapshot: RwLock::new(snapshot),
		});

		let weak = Arc::downgrade(&service);
		let regenerate: PostProcessorFn = Box::new(move || {
			let weak = weak.clone();
			Box::pin(async move {
				match weak.upgrade() {
					Some(service) => service.generate_types().await,
					None => Ok(()),
				}
			})
		});
		service.catalog.add_post_processor(regenerate);

		match tokio::runtime::Handle::try_current() {
			Ok(handle) => {
				let service = service.clone();
				handle.spawn(async move {
					if let Err(err) = service.generate_types().await {
						warn!("Initial type generation failed: {}", err);
					}
				});
			}
			Err(_) => debug!("No async runtime, types are generated on the next catalog reload"),
		}

		info!("Frontend settings initialized ({})", service.gate.info());
		service
	}

	/// Current snapshot
	pub fn settings(&self) -> FrontendSettings {
		self.snapshot.read().clone()
	}

	/// Re-reads every dynamic source and returns the updated snapshot.
	/// Sources that cannot be read contribute their defaults.
	pub async fn refresh(&self) -> FrontendSettings {
		let stored = StoredSettings::read(&self.settings_service).await;
		let dynamic = DynamicSettings::derive(&self.config, &self.gate, self.urls.as_ref(), stored);

		let mut snapshot = self.snapshot.write();
		dynamic.apply(&mut snapshot);
		snapshot.clone()
	}

	/// Annotates credential overrides and writes the node and credential type
	/// caches.
	pub async fn generate_types(&self) -> ClResult<()> {
		let LoadedTypes { nodes, mut credentials } = self.catalog.types();
		{
			let overrides = self.overrides.read();
			overrides::resolve_with(&mut credentials, &overrides, |name| {
				self.catalog.parent_types(name)
			});
		}

		self.publisher.publish("nodes", &nodes).await?;
		self.publisher.publish("credentials", &credentials).await?;
		info!("Generated types: {} nodes, {} credentials", nodes.len(), credentials.len());
		Ok(())
	}

	/// Replaces the credential overrides; takes effect on the next type generation
	pub fn set_credential_overrides(&self, overrides: OverridesByType) {
		*self.overrides.write() = overrides;
	}

	pub fn publisher(&self) -> &TypeCatalogPublisher {
		&self.publisher
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use async_trait::async_trait;
	use chrono::{Duration, Utc};
	use parking_lot::Mutex;
	use serde_json::json;
	use std::collections::HashMap;
	use std::sync::atomic::{AtomicBool, Ordering};
	use tempfile::TempDir;

	use portcullis_types::capability::{Entitlement, EntitlementSet};
	use portcullis_types::catalog_adapter::CredentialTypeDescriptor;
	use portcullis_types::config_adapter::ConfigAdapter;
	use portcullis_types::entitlement_adapter::EntitlementSource;

	use crate::core_settings::register_settings;
	use crate::instance_config::UrlConfig;
	use crate::settings::SettingsRegistry;
	use crate::url::InstanceUrls;

	#[derive(Debug, Default)]
	struct TestStore {
		values: Mutex<HashMap<String, serde_json::Value>>,
		unreachable: AtomicBool,
	}

	impl TestStore {
		fn check(&self) -> ClResult<()> {
			if self.unreachable.load(Ordering::SeqCst) {
				Err(Error::ServiceUnavailable("configuration store is down".into()))
			} else {
				Ok(())
			}
		}
	}

	#[async_trait]
	impl ConfigAdapter for TestStore {
		async fn read_setting(&self, key: &str) -> ClResult<Option<serde_json::Value>> {
			self.check()?;
			Ok(self.values.lock().get(key).cloned())
		}

		async fn update_setting(
			&self,
			key: &str,
			value: Option<serde_json::Value>,
		) -> ClResult<()> {
			self.check()?;
			let mut values = self.values.lock();
			match value {
				Some(value) => values.insert(key.to_string(), value),
				None => values.remove(key),
			};
			Ok(())
		}

		async fn list_settings(
			&self,
			_prefix: Option<&[String]>,
		) -> ClResult<HashMap<String, serde_json::Value>> {
			self.check()?;
			Ok(self.values.lock().clone())
		}
	}

	#[derive(Default)]
	struct TestCatalog {
		types: Mutex<LoadedTypes>,
		hooks: Mutex<Vec<PostProcessorFn>>,
	}

	impl std::fmt::Debug for TestCatalog {
		fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
			f.debug_struct("TestCatalog").finish_non_exhaustive()
		}
	}

	impl TestCatalog {
		async fn reload(&self, types: LoadedTypes) {
			*self.types.lock() = types;
			let runs: Vec<_> = self.hooks.lock().iter().map(|hook| hook()).collect();
			for run in runs {
				run.await.unwrap();
			}
		}
	}

	impl CatalogAdapter for TestCatalog {
		fn types(&self) -> LoadedTypes {
			self.types.lock().clone()
		}

		fn add_post_processor(&self, hook: PostProcessorFn) {
			self.hooks.lock().push(hook);
		}
	}

	#[derive(Debug)]
	struct FixedSource(EntitlementSet);

	#[async_trait]
	impl EntitlementSource for FixedSource {
		async fn fetch(&self) -> ClResult<EntitlementSet> {
			Ok(self.0.clone())
		}

		async fn activate(&self, _activation_key: &str) -> ClResult<()> {
			Ok(())
		}
	}

	fn staging_set(features: serde_json::Value) -> EntitlementSet {
		let now = Utc::now();
		let features = match features {
			serde_json::Value::Object(map) => map.into_iter().collect(),
			_ => HashMap::new(),
		};
		EntitlementSet {
			plan: PlanMetadata {
				plan_name: "Business".into(),
				consumer_id: "acme".into(),
				environment: "staging".into(),
			},
			entitlements: vec![Entitlement {
				id: "ent-1".into(),
				product_id: "business".into(),
				features,
				valid_from: now - Duration::hours(1),
				valid_to: now + Duration::days(30),
			}],
		}
	}

	struct Fixture {
		service: Arc<FrontendService>,
		settings: Arc<SettingsService>,
		store: Arc<TestStore>,
		catalog: Arc<TestCatalog>,
		temp: TempDir,
	}

	impl Fixture {
		fn new(gate: CapabilityGate) -> Self {
			Self::with_config(gate, InstanceConfig::default())
		}

		fn with_config(gate: CapabilityGate, config: InstanceConfig) -> Self {
			let mut registry = SettingsRegistry::new();
			register_settings(&mut registry).unwrap();
			let store = Arc::new(TestStore::default());
			let settings =
				Arc::new(SettingsService::new(Arc::new(registry.freeze()), store.clone(), 100));
			let catalog = Arc::new(TestCatalog::default());
			let temp = TempDir::new().unwrap();
			let urls = Arc::new(InstanceUrls::new(&config.url));

			let service = FrontendService::new(
				Arc::new(config),
				Arc::new(gate),
				settings.clone(),
				urls,
				catalog.clone(),
				TypeCatalogPublisher::new(temp.path()),
				OverridesByType::new(),
			);
			Self { service, settings, store, catalog, temp }
		}
	}

	#[test]
	fn test_initial_snapshot_permissive() {
		let fixture = Fixture::new(CapabilityGate::permissive());
		let settings = fixture.service.settings();

		assert_eq!(settings.url_base_editor, "http://localhost:5678");
		assert_eq!(settings.url_base_webhook, "http://localhost:5678/");
		assert_eq!(
			settings.oauth_callback_urls.oauth2,
			"http://localhost:5678/rest/oauth2-credential/callback"
		);
		assert!(settings.enterprise.sharing && settings.enterprise.advanced_permissions);
		assert!(!settings.enterprise.show_non_prod_banner);
		assert_eq!(settings.enterprise.projects.team.limit, QuotaLimit::UNLIMITED);
		assert_eq!(settings.user_management.quota, QuotaLimit::UNLIMITED);
		assert_eq!(settings.license.plan_name, "Enterprise");
		assert!(settings.public_api.enabled);
		assert_eq!(settings.user_management.authentication_method, "email");
		assert!(settings.sso.saml.login_enabled && settings.sso.ldap.login_enabled);
		assert!(settings.user_management.show_setup_on_first_load);
		assert_eq!(settings.execution_mode, "regular");
		assert!(settings.banners.dismissed.is_empty());
		assert_eq!(settings.version_cli, VERSION);
		assert_eq!(settings.rust_version, "1.89");
		// outside a runtime nothing is generated yet
		assert!(!fixture.temp.path().join("types").exists());
	}

	#[test]
	fn test_snapshot_wire_format() {
		let fixture = Fixture::new(CapabilityGate::permissive());
		let value = serde_json::to_value(fixture.service.settings()).unwrap();

		assert_eq!(value["inE2ETests"], json!(false));
		assert_eq!(value["easyAIWorkflowOnboarded"], json!(false));
		assert_eq!(value["userManagement"]["quota"], json!(-1));
		assert_eq!(value["enterprise"]["binaryDataS3"], json!(true));
		assert_eq!(value["license"]["consumerId"], json!("enterprise"));
		assert_eq!(value["publicApi"]["swaggerUi"]["enabled"], json!(true));
		assert_eq!(value["deployment"]["type"], json!("default"));
		assert!(value["allowedModules"].as_object().is_some_and(|m| m.is_empty()));
	}

	#[tokio::test]
	async fn test_refresh_with_unreachable_store() {
		let fixture = Fixture::new(CapabilityGate::permissive());
		fixture.store.unreachable.store(true, Ordering::SeqCst);

		for _ in 0..2 {
			let settings = fixture.service.refresh().await;
			assert!(settings.banners.dismissed.is_empty());
			assert!(!settings.easy_ai_workflow_onboarded);
			assert!(settings.user_management.show_setup_on_first_load);
			assert_eq!(settings.user_management.authentication_method, "email");
			assert!(!settings.user_management.smtp_setup);
			assert!(!settings.mfa.enabled);
			assert_eq!(settings.execution_mode, "regular");
			assert_eq!(settings.binary_data_mode, "default");
		}
	}

	#[tokio::test]
	async fn test_refresh_sees_values_written_to_store_directly() {
		let fixture = Fixture::new(CapabilityGate::permissive());

		let before = fixture.service.refresh().await;
		assert!(before.user_management.show_setup_on_first_load);
		assert_eq!(before.execution_mode, "regular");

		fixture
			.store
			.update_setting("userManagement.isInstanceOwnerSetUp", Some(json!(true)))
			.await
			.unwrap();
		fixture.store.update_setting("executions.mode", Some(json!("queue"))).await.unwrap();
		let after = fixture.service.refresh().await;
		assert!(!after.user_management.show_setup_on_first_load);
		assert_eq!(after.execution_mode, "queue");

		// A cached persisted value does not outlive its removal from the store
		fixture.store.update_setting("executions.mode", None).await.unwrap();
		assert_eq!(fixture.service.refresh().await.execution_mode, "regular");
	}

	#[tokio::test]
	async fn test_refresh_reads_configuration_store() {
		let fixture = Fixture::new(CapabilityGate::permissive());
		let settings = &fixture.settings;
		settings.set("userManagement.isInstanceOwnerSetUp", SettingValue::Bool(true)).await.unwrap();
		settings
			.set("userManagement.authenticationMethod", SettingValue::String("saml".into()))
			.await
			.unwrap();
		settings.set("email.smtp.host", SettingValue::String("smtp.example.com".into())).await.unwrap();
		settings
			.set("ui.banners.dismissed", SettingValue::Json(json!(["V1", "TRIAL"])))
			.await
			.unwrap();
		settings.set("easyAIWorkflowOnboarded", SettingValue::Bool(true)).await.unwrap();
		settings.set("mfa.enabled", SettingValue::Bool(true)).await.unwrap();
		settings.set("executions.mode", SettingValue::String("queue".into())).await.unwrap();
		settings.set("binaryDataManager.mode", SettingValue::String("s3".into())).await.unwrap();

		let snapshot = fixture.service.refresh().await;
		assert!(!snapshot.user_management.show_setup_on_first_load);
		assert_eq!(snapshot.user_management.authentication_method, "saml");
		assert!(snapshot.user_management.smtp_setup);
		// Login follows the license, whichever method is configured
		assert!(snapshot.sso.saml.login_enabled);
		assert!(snapshot.sso.ldap.login_enabled);
		assert_eq!(snapshot.banners.dismissed, vec!["V1", "TRIAL"]);
		assert!(snapshot.easy_ai_workflow_onboarded);
		assert!(snapshot.mfa.enabled);
		assert_eq!(snapshot.execution_mode, "queue");
		assert_eq!(snapshot.binary_data_mode, "s3");
		assert_eq!(fixture.service.settings(), snapshot);
	}

	#[tokio::test]
	async fn test_malformed_banner_list_falls_back() {
		let fixture = Fixture::new(CapabilityGate::permissive());
		fixture
			.store
			.update_setting("ui.banners.dismissed", Some(json!({ "V1": true })))
			.await
			.unwrap();
		fixture.store.update_setting("email.smtp.host", Some(json!("  "))).await.unwrap();

		let snapshot = fixture.service.refresh().await;
		assert!(snapshot.banners.dismissed.is_empty());
		assert!(!snapshot.user_management.smtp_setup);
	}

	#[tokio::test]
	async fn test_fail_closed_gate() {
		let source = Arc::new(FixedSource(staging_set(json!({}))));
		let fixture = Fixture::new(CapabilityGate::policy(source));
		fixture
			.settings
			.set("binaryDataManager.mode", SettingValue::String("s3".into()))
			.await
			.unwrap();

		// gate never initialized
		let snapshot = fixture.service.refresh().await;
		assert!(!snapshot.enterprise.sharing);
		assert!(!snapshot.enterprise.binary_data_s3);
		assert_eq!(snapshot.enterprise.projects.team.limit, QuotaLimit::ZERO);
		assert_eq!(snapshot.user_management.quota, QuotaLimit::ZERO);
		assert_eq!(snapshot.license.plan_name, "Community");
		assert_eq!(snapshot.binary_data_mode, "default");
		assert!(snapshot.public_api.enabled);
	}

	#[tokio::test]
	async fn test_policy_gate_drives_enterprise_fields() {
		let source = Arc::new(FixedSource(staging_set(json!({
			"feat:ldap": true,
			"feat:apiDisabled": true,
			"feat:aiCredits": true,
			"quota:users": 25,
			"quota:maxVariables": -1,
			"quota:aiCredits": 100,
			"quota:workflowHistoryPrune": 24,
		}))));
		let fixture = Fixture::new(CapabilityGate::policy(source));
		fixture.service.gate.init().await.unwrap();
		fixture
			.settings
			.set("userManagement.authenticationMethod", SettingValue::String("ldap".into()))
			.await
			.unwrap();
		fixture.settings.set("ldap.loginLabel", SettingValue::String("Corp ID".into())).await.unwrap();
		fixture.settings.set("workflowHistory.pruneTime", SettingValue::Int(48)).await.unwrap();

		let snapshot = fixture.service.refresh().await;
		assert!(snapshot.enterprise.ldap);
		assert!(!snapshot.enterprise.saml);
		assert!(snapshot.enterprise.show_non_prod_banner);
		assert!(snapshot.sso.ldap.login_enabled);
		assert!(!snapshot.sso.saml.login_enabled);
		assert_eq!(snapshot.sso.ldap.login_label, "Corp ID");
		assert_eq!(snapshot.user_management.quota, QuotaLimit(25));
		assert_eq!(snapshot.variables.limit, QuotaLimit::UNLIMITED);
		assert!(snapshot.ai_credits.enabled);
		assert_eq!(snapshot.ai_credits.credits, QuotaLimit(100));
		assert_eq!(snapshot.workflow_history.license_prune_time, QuotaLimit(24));
		assert_eq!(snapshot.workflow_history.prune_time, QuotaLimit(24));
		assert_eq!(snapshot.license.environment, "staging");
		assert!(!snapshot.public_api.enabled);
	}

	#[tokio::test]
	async fn test_public_api_disabled_by_config() {
		let mut config = InstanceConfig::default();
		config.public_api.disabled = true;
		let fixture = Fixture::with_config(CapabilityGate::permissive(), config);

		assert!(!fixture.service.settings().public_api.enabled);
		assert!(!fixture.service.refresh().await.public_api.enabled);
	}

	#[tokio::test]
	async fn test_refresh_picks_up_new_webhook_url() {
		let config = InstanceConfig::default();
		let urls = Arc::new(InstanceUrls::new(&UrlConfig::default()));
		let mut registry = SettingsRegistry::new();
		register_settings(&mut registry).unwrap();
		let settings = Arc::new(SettingsService::new(
			Arc::new(registry.freeze()),
			Arc::new(TestStore::default()),
			100,
		));
		let temp = TempDir::new().unwrap();
		let service = FrontendService::new(
			Arc::new(config),
			Arc::new(CapabilityGate::permissive()),
			settings,
			urls.clone(),
			Arc::new(TestCatalog::default()),
			TypeCatalogPublisher::new(temp.path()),
			OverridesByType::new(),
		);

		urls.set_webhook_url("https://tunnel.example.com");
		assert_eq!(service.settings().url_base_webhook, "http://localhost:5678/");
		assert_eq!(service.refresh().await.url_base_webhook, "https://tunnel.example.com/");
	}

	#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
	async fn test_concurrent_refreshes_never_mix_values() {
		let fixture = Fixture::new(CapabilityGate::permissive());
		let modes = ["regular", "queue"];

		let writer = {
			let settings = fixture.settings.clone();
			tokio::spawn(async move {
				for i in 0..50 {
					settings
						.set("executions.mode", SettingValue::String(modes[i % 2].into()))
						.await
						.unwrap();
					settings
						.set(
							"ui.banners.dismissed",
							SettingValue::Json(json!([format!("B{}", i % 2)])),
						)
						.await
						.unwrap();
					tokio::task::yield_now().await;
				}
			})
		};

		let refreshes: Vec<_> = (0..20)
			.map(|_| {
				let service = fixture.service.clone();
				tokio::spawn(async move { service.refresh().await })
			})
			.collect();

		for refresh in refreshes {
			let snapshot = refresh.await.unwrap();
			assert!(modes.contains(&snapshot.execution_mode.as_str()));
			let dismissed = &snapshot.banners.dismissed;
			assert!(dismissed.is_empty() || *dismissed == ["B0"] || *dismissed == ["B1"]);
		}
		writer.await.unwrap();

		let last = fixture.service.refresh().await;
		assert_eq!(last.execution_mode, "queue");
		assert_eq!(last.banners.dismissed, vec!["B1"]);
		assert_eq!(fixture.service.settings(), last);
	}

	#[tokio::test]
	async fn test_generate_types_publishes_annotated_catalog() {
		let fixture = Fixture::new(CapabilityGate::permissive());
		fixture.service.set_credential_overrides(
			[
				("oAuth2Api", vec!["authUrl".to_string()]),
				("githubOAuth2Api", vec!["scope".to_string(), "authUrl".to_string()]),
			]
			.into_iter()
			.collect(),
		);
		*fixture.catalog.types.lock() = LoadedTypes {
			nodes: vec![json!({ "name": "httpRequest" })],
			credentials: vec![
				CredentialTypeDescriptor::new("githubOAuth2Api", "GitHub OAuth2")
					.extends("oAuth2Api"),
				CredentialTypeDescriptor::new("oAuth2Api", "OAuth2"),
				CredentialTypeDescriptor::new("httpBasicAuth", "Basic Auth"),
			],
		};

		fixture.service.generate_types().await.unwrap();

		let publisher = fixture.service.publisher();
		let nodes: Vec<serde_json::Value> = publisher.read("nodes").await.unwrap().unwrap();
		assert_eq!(nodes, vec![json!({ "name": "httpRequest" })]);

		let raw: Vec<serde_json::Value> = publisher.read("credentials").await.unwrap().unwrap();
		assert_eq!(raw[0]["__overwrittenProperties"], json!(["authUrl", "scope"]));
		assert_eq!(raw[1]["__overwrittenProperties"], json!(["authUrl"]));
		assert!(raw[2].get("__overwrittenProperties").is_none());
	}

	#[tokio::test]
	async fn test_catalog_reload_regenerates_types() {
		let fixture = Fixture::new(CapabilityGate::permissive());

		fixture
			.catalog
			.reload(LoadedTypes {
				nodes: vec![json!({ "name": "a" }), json!({ "name": "b" })],
				credentials: Vec::new(),
			})
			.await;

		let nodes: Vec<serde_json::Value> =
			fixture.service.publisher().read("nodes").await.unwrap().unwrap();
		assert_eq!(nodes.len(), 2);
	}

	#[tokio::test]
	async fn test_initial_generation_runs_in_background() {
		let fixture = Fixture::new(CapabilityGate::permissive());
		let path = fixture.temp.path().join("types").join("credentials.json");

		for _ in 0..100 {
			if path.exists() {
				break;
			}
			tokio::time::sleep(std::time::Duration::from_millis(10)).await;
		}
		assert_eq!(std::fs::read_to_string(&path).unwrap(), "[\n]\n");
	}
}

// vim: ts=4
