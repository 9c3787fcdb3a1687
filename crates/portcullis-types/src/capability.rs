//! Capability identifiers and entitlement records
//!
//! Features and quotas are closed sets. Their wire keys match the keys an
//! entitlement carries in its `features` map, so a policy-driven gate can look
//! them up directly.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Boolean capability flags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Feature {
	#[serde(rename = "feat:sharing")]
	Sharing,
	#[serde(rename = "feat:logStreaming")]
	LogStreaming,
	#[serde(rename = "feat:auditLogs")]
	AuditLogs,
	#[serde(rename = "feat:ldap")]
	Ldap,
	#[serde(rename = "feat:saml")]
	Saml,
	#[serde(rename = "feat:aiAssistant")]
	AiAssistant,
	#[serde(rename = "feat:askAi")]
	AskAi,
	#[serde(rename = "feat:aiCredits")]
	AiCredits,
	#[serde(rename = "feat:advancedExecutionFilters")]
	AdvancedExecutionFilters,
	#[serde(rename = "feat:advancedPermissions")]
	AdvancedPermissions,
	#[serde(rename = "feat:debugInEditor")]
	DebugInEditor,
	#[serde(rename = "feat:binaryDataS3")]
	BinaryDataS3,
	#[serde(rename = "feat:multipleMainInstances")]
	MultipleMainInstances,
	#[serde(rename = "feat:variables")]
	Variables,
	#[serde(rename = "feat:sourceControl")]
	SourceControl,
	#[serde(rename = "feat:externalSecrets")]
	ExternalSecrets,
	#[serde(rename = "feat:workflowHistory")]
	WorkflowHistory,
	/// Inverted flag: when enabled, the public API is switched off
	#[serde(rename = "feat:apiDisabled")]
	ApiDisabled,
	#[serde(rename = "feat:workerView")]
	WorkerView,
	#[serde(rename = "feat:projectRole:admin")]
	ProjectRoleAdmin,
	#[serde(rename = "feat:projectRole:editor")]
	ProjectRoleEditor,
	#[serde(rename = "feat:projectRole:viewer")]
	ProjectRoleViewer,
	#[serde(rename = "feat:communityNodes:customRegistry")]
	CustomNpmRegistry,
}

impl Feature {
	pub const ALL: [Feature; 23] = [
		Feature::Sharing,
		Feature::LogStreaming,
		Feature::AuditLogs,
		Feature::Ldap,
		Feature::Saml,
		Feature::AiAssistant,
		Feature::AskAi,
		Feature::AiCredits,
		Feature::AdvancedExecutionFilters,
		Feature::AdvancedPermissions,
		Feature::DebugInEditor,
		Feature::BinaryDataS3,
		Feature::MultipleMainInstances,
		Feature::Variables,
		Feature::SourceControl,
		Feature::ExternalSecrets,
		Feature::WorkflowHistory,
		Feature::ApiDisabled,
		Feature::WorkerView,
		Feature::ProjectRoleAdmin,
		Feature::ProjectRoleEditor,
		Feature::ProjectRoleViewer,
		Feature::CustomNpmRegistry,
	];

	/// Key used in entitlement feature maps
	pub fn key(self) -> &'static str {
		match self {
			Feature::Sharing => "feat:sharing",
			Feature::LogStreaming => "feat:logStreaming",
			Feature::AuditLogs => "feat:auditLogs",
			Feature::Ldap => "feat:ldap",
			Feature::Saml => "feat:saml",
			Feature::AiAssistant => "feat:aiAssistant",
			Feature::AskAi => "feat:askAi",
			Feature::AiCredits => "feat:aiCredits",
			Feature::AdvancedExecutionFilters => "feat:advancedExecutionFilters",
			Feature::AdvancedPermissions => "feat:advancedPermissions",
			Feature::DebugInEditor => "feat:debugInEditor",
			Feature::BinaryDataS3 => "feat:binaryDataS3",
			Feature::MultipleMainInstances => "feat:multipleMainInstances",
			Feature::Variables => "feat:variables",
			Feature::SourceControl => "feat:sourceControl",
			Feature::ExternalSecrets => "feat:externalSecrets",
			Feature::WorkflowHistory => "feat:workflowHistory",
			Feature::ApiDisabled => "feat:apiDisabled",
			Feature::WorkerView => "feat:workerView",
			Feature::ProjectRoleAdmin => "feat:projectRole:admin",
			Feature::ProjectRoleEditor => "feat:projectRole:editor",
			Feature::ProjectRoleViewer => "feat:projectRole:viewer",
			Feature::CustomNpmRegistry => "feat:communityNodes:customRegistry",
		}
	}
}

impl fmt::Display for Feature {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.key())
	}
}

/// Numeric capability limits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Quota {
	#[serde(rename = "quota:users")]
	Users,
	#[serde(rename = "quota:apiKeysPerUserLimit")]
	ApiKeysPerUser,
	#[serde(rename = "quota:activeWorkflows")]
	ActiveWorkflows,
	#[serde(rename = "quota:maxVariables")]
	Variables,
	#[serde(rename = "quota:aiCredits")]
	AiCredits,
	#[serde(rename = "quota:workflowHistoryPrune")]
	WorkflowHistoryPrune,
	#[serde(rename = "quota:maxTeamProjects")]
	TeamProjects,
}

impl Quota {
	pub const ALL: [Quota; 7] = [
		Quota::Users,
		Quota::ApiKeysPerUser,
		Quota::ActiveWorkflows,
		Quota::Variables,
		Quota::AiCredits,
		Quota::WorkflowHistoryPrune,
		Quota::TeamProjects,
	];

	pub fn key(self) -> &'static str {
		match self {
			Quota::Users => "quota:users",
			Quota::ApiKeysPerUser => "quota:apiKeysPerUserLimit",
			Quota::ActiveWorkflows => "quota:activeWorkflows",
			Quota::Variables => "quota:maxVariables",
			Quota::AiCredits => "quota:aiCredits",
			Quota::WorkflowHistoryPrune => "quota:workflowHistoryPrune",
			Quota::TeamProjects => "quota:maxTeamProjects",
		}
	}
}

impl fmt::Display for Quota {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.key())
	}
}

/// Quota value. `-1` is the unlimited sentinel, kept numeric so it survives
/// JSON round trips.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QuotaLimit(pub i64);

impl QuotaLimit {
	pub const UNLIMITED: QuotaLimit = QuotaLimit(-1);
	pub const ZERO: QuotaLimit = QuotaLimit(0);

	pub fn is_unlimited(self) -> bool {
		self.0 < 0
	}

	/// Whether `count` items fit under this limit
	pub fn allows(self, count: i64) -> bool {
		self.is_unlimited() || count <= self.0
	}

	/// The more generous of two limits
	pub fn max(self, other: QuotaLimit) -> QuotaLimit {
		if self.is_unlimited() || other.is_unlimited() {
			QuotaLimit::UNLIMITED
		} else {
			QuotaLimit(self.0.max(other.0))
		}
	}

	/// The stricter of two limits
	pub fn min(self, other: QuotaLimit) -> QuotaLimit {
		match (self.is_unlimited(), other.is_unlimited()) {
			(true, true) => QuotaLimit::UNLIMITED,
			(true, false) => other,
			(false, true) => self,
			(false, false) => QuotaLimit(self.0.min(other.0)),
		}
	}
}

impl fmt::Display for QuotaLimit {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		if self.is_unlimited() {
			write!(f, "unlimited")
		} else {
			write!(f, "{}", self.0)
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanMetadata {
	pub plan_name: String,
	pub consumer_id: String,
	pub environment: String,
}

/// One entitlement granted by the entitlement source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entitlement {
	pub id: String,
	pub product_id: String,
	#[serde(default)]
	pub features: HashMap<String, serde_json::Value>,
	pub valid_from: DateTime<Utc>,
	pub valid_to: DateTime<Utc>,
}

impl Entitlement {
	pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
		self.valid_from <= now && now < self.valid_to
	}

	/// Boolean feature value, `None` when the entitlement does not mention it
	pub fn feature(&self, feature: Feature) -> Option<bool> {
		self.features.get(feature.key()).and_then(serde_json::Value::as_bool)
	}

	/// Quota value, `None` when the entitlement does not mention it
	pub fn quota(&self, quota: Quota) -> Option<QuotaLimit> {
		self.features.get(quota.key()).and_then(serde_json::Value::as_i64).map(QuotaLimit)
	}

	pub fn plan_name(&self) -> Option<&str> {
		self.features.get("planName").and_then(serde_json::Value::as_str)
	}
}

/// Everything an entitlement source reports in one fetch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntitlementSet {
	pub plan: PlanMetadata,
	#[serde(default)]
	pub entitlements: Vec<Entitlement>,
}

#[cfg(test)]
mod tests {
	use super::*;
	use chrono::Duration;

	#[test]
	fn test_feature_keys_match_serde() {
		for feature in Feature::ALL {
			let json = serde_json::to_value(feature).unwrap();
			assert_eq!(json, serde_json::Value::String(feature.key().into()));
		}
		for quota in Quota::ALL {
			let json = serde_json::to_value(quota).unwrap();
			assert_eq!(json, serde_json::Value::String(quota.key().into()));
		}
	}

	#[test]
	fn test_unlimited_survives_serialization() {
		let json = serde_json::to_string(&QuotaLimit::UNLIMITED).unwrap();
		assert_eq!(json, "-1");
		let back: QuotaLimit = serde_json::from_str(&json).unwrap();
		assert!(back.is_unlimited());
	}

	#[test]
	fn test_quota_limit_ordering() {
		assert_eq!(QuotaLimit(5).max(QuotaLimit(10)), QuotaLimit(10));
		assert_eq!(QuotaLimit(5).max(QuotaLimit::UNLIMITED), QuotaLimit::UNLIMITED);
		assert_eq!(QuotaLimit(5).min(QuotaLimit::UNLIMITED), QuotaLimit(5));
		assert_eq!(QuotaLimit::UNLIMITED.min(QuotaLimit::UNLIMITED), QuotaLimit::UNLIMITED);
		assert!(QuotaLimit::UNLIMITED.allows(i64::MAX));
		assert!(QuotaLimit(3).allows(3));
		assert!(!QuotaLimit(3).allows(4));
	}

	#[test]
	fn test_entitlement_lookup() {
		let now = Utc::now();
		let entitlement = Entitlement {
			id: "ent-1".into(),
			product_id: "prod-1".into(),
			features: HashMap::from([
				("feat:sharing".to_string(), serde_json::json!(true)),
				("quota:users".to_string(), serde_json::json!(25)),
				("planName".to_string(), serde_json::json!("Business")),
			]),
			valid_from: now - Duration::days(1),
			valid_to: now + Duration::days(1),
		};

		assert!(entitlement.is_active_at(now));
		assert!(!entitlement.is_active_at(now + Duration::days(2)));
		assert_eq!(entitlement.feature(Feature::Sharing), Some(true));
		assert_eq!(entitlement.feature(Feature::Ldap), None);
		assert_eq!(entitlement.quota(Quota::Users), Some(QuotaLimit(25)));
		assert_eq!(entitlement.plan_name(), Some("Business"));
	}
}

// vim: ts=4
