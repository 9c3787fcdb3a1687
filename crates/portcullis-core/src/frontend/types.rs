//! Frontend settings snapshot
//!
//! The field names are the wire format consumed by the web clients and must
//! stay stable.

use serde::{Deserialize, Serialize};

use portcullis_types::capability::{PlanMetadata, QuotaLimit};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Toggle {
	pub enabled: bool,
}

impl Toggle {
	pub fn new(enabled: bool) -> Self {
		Self { enabled }
	}
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthCookie {
	pub secure: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OauthCallbackUrls {
	pub oauth1: String,
	pub oauth2: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionNotificationSettings {
	pub enabled: bool,
	pub endpoint: String,
	pub info_url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TelemetryConfig {
	pub key: String,
	pub url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TelemetrySettings {
	pub enabled: bool,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub config: Option<TelemetryConfig>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PosthogSettings {
	pub enabled: bool,
	pub api_host: String,
	pub api_key: String,
	pub autocapture: bool,
	pub disable_session_recording: bool,
	pub debug: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserManagementSettings {
	pub quota: QuotaLimit,
	pub show_setup_on_first_load: bool,
	pub smtp_setup: bool,
	pub authentication_method: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginSettings {
	pub login_enabled: bool,
	pub login_label: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SsoSettings {
	pub saml: LoginSettings,
	pub ldap: LoginSettings,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicApiSettings {
	pub enabled: bool,
	pub latest_version: u32,
	pub path: String,
	pub swagger_ui: Toggle,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplatesSettings {
	pub enabled: bool,
	pub host: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentSettings {
	#[serde(rename = "type")]
	pub deployment_type: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AllowedModules {
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub built_in: Option<Vec<String>>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub external: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamProjects {
	pub limit: QuotaLimit,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectsSettings {
	pub team: TeamProjects,
}

/// Which licensed features the clients may offer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnterpriseSettings {
	pub sharing: bool,
	pub ldap: bool,
	pub saml: bool,
	pub log_streaming: bool,
	pub advanced_execution_filters: bool,
	pub variables: bool,
	pub source_control: bool,
	pub audit_logs: bool,
	pub external_secrets: bool,
	pub show_non_prod_banner: bool,
	pub debug_in_editor: bool,
	pub binary_data_s3: bool,
	pub workflow_history: bool,
	pub worker_view: bool,
	pub advanced_permissions: bool,
	pub projects: ProjectsSettings,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariablesSettings {
	pub limit: QuotaLimit,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpressionsSettings {
	pub evaluator: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BannersSettings {
	pub dismissed: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AiCreditsSettings {
	pub enabled: bool,
	pub credits: QuotaLimit,
}

/// Prune times in hours, -1 is forever
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowHistorySettings {
	pub prune_time: QuotaLimit,
	pub license_prune_time: QuotaLimit,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PruningSettings {
	pub is_enabled: bool,
	pub max_age: i64,
	pub max_count: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecuritySettings {
	pub block_file_access_to_data_dir: bool,
}

/// Everything the web clients need to know about the instance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FrontendSettings {
	#[serde(rename = "inE2ETests")]
	pub in_e2e_tests: bool,
	pub is_docker: bool,
	pub database_type: String,
	pub preview_mode: bool,
	pub endpoint_form: String,
	pub endpoint_form_test: String,
	pub endpoint_form_waiting: String,
	pub endpoint_webhook: String,
	pub endpoint_webhook_test: String,
	pub endpoint_webhook_waiting: String,
	pub save_data_error_execution: String,
	pub save_data_success_execution: String,
	pub save_manual_executions: bool,
	pub save_execution_progress: bool,
	pub execution_timeout: i64,
	pub max_execution_timeout: i64,
	pub workflow_caller_policy_default_option: String,
	pub timezone: String,
	pub url_base_webhook: String,
	pub url_base_editor: String,
	pub binary_data_mode: String,
	pub version_cli: String,
	/// Minimum Rust toolchain the server was built for
	pub rust_version: String,
	pub concurrency: i64,
	pub auth_cookie: AuthCookie,
	pub release_channel: String,
	pub oauth_callback_urls: OauthCallbackUrls,
	pub version_notifications: VersionNotificationSettings,
	pub instance_id: String,
	pub telemetry: TelemetrySettings,
	pub posthog: PosthogSettings,
	pub personalization_survey_enabled: bool,
	pub default_locale: String,
	pub user_management: UserManagementSettings,
	pub sso: SsoSettings,
	pub public_api: PublicApiSettings,
	pub workflow_tags_disabled: bool,
	pub log_level: String,
	pub hiring_banner_enabled: bool,
	pub ai_assistant: Toggle,
	pub templates: TemplatesSettings,
	pub execution_mode: String,
	pub push_backend: String,
	pub community_nodes_enabled: bool,
	pub deployment: DeploymentSettings,
	pub allowed_modules: AllowedModules,
	pub enterprise: EnterpriseSettings,
	pub mfa: Toggle,
	pub hide_usage_page: bool,
	pub license: PlanMetadata,
	pub variables: VariablesSettings,
	pub expressions: ExpressionsSettings,
	pub banners: BannersSettings,
	pub ask_ai: Toggle,
	pub ai_credits: AiCreditsSettings,
	pub workflow_history: WorkflowHistorySettings,
	pub pruning: PruningSettings,
	pub security: SecuritySettings,
	pub beta_features: Vec<String>,
	#[serde(rename = "easyAIWorkflowOnboarded")]
	pub easy_ai_workflow_onboarded: bool,
}

// vim: ts=4
