//! Capability gate
//!
//! Answers "is feature X enabled" and "what is the quota for Y" for the
//! running instance. Two policies share one interface:
//!
//! - **Policy**: defers to a pluggable [`EntitlementSource`] and fails closed
//!   when it cannot be reached.
//! - **Permissive**: grants every feature and an unlimited quota.
//!
//! The policy is picked once when the application is wired. Consumers hold a
//! `CapabilityGate` and call its methods; they never match on the variant.

pub mod permissive;
pub mod policy;

use std::sync::Arc;

use portcullis_types::capability::{Entitlement, PlanMetadata};
use portcullis_types::entitlement_adapter::EntitlementSource;

use crate::prelude::*;

pub use permissive::PermissiveGate;
pub use policy::PolicyGate;

#[derive(Debug)]
pub enum CapabilityGate {
	Policy(PolicyGate),
	Permissive(PermissiveGate),
}

impl CapabilityGate {
	pub fn policy(source: Arc<dyn EntitlementSource>) -> Self {
		CapabilityGate::Policy(PolicyGate::new(source))
	}

	pub fn permissive() -> Self {
		CapabilityGate::Permissive(PermissiveGate)
	}

	pub fn is_feature_enabled(&self, feature: Feature) -> bool {
		match self {
			CapabilityGate::Policy(gate) => gate.is_feature_enabled(feature),
			CapabilityGate::Permissive(gate) => gate.is_feature_enabled(feature),
		}
	}

	pub fn get_quota(&self, quota: Quota) -> QuotaLimit {
		match self {
			CapabilityGate::Policy(gate) => gate.get_quota(quota),
			CapabilityGate::Permissive(gate) => gate.get_quota(quota),
		}
	}

	pub fn plan_metadata(&self) -> PlanMetadata {
		match self {
			CapabilityGate::Policy(gate) => gate.plan_metadata(),
			CapabilityGate::Permissive(gate) => gate.plan_metadata(),
		}
	}

	pub fn current_entitlements(&self) -> Vec<Entitlement> {
		match self {
			CapabilityGate::Policy(gate) => gate.current_entitlements(),
			CapabilityGate::Permissive(gate) => gate.current_entitlements(),
		}
	}

	pub fn is_api_enabled(&self) -> bool {
		!self.is_feature_enabled(Feature::ApiDisabled)
	}

	pub fn is_within_users_limit(&self, user_count: i64) -> bool {
		self.get_quota(Quota::Users).allows(user_count)
	}

	/// Short human-readable plan description for logs
	pub fn info(&self) -> String {
		let plan = self.plan_metadata();
		format!("{} ({}, {})", plan.plan_name, plan.consumer_id, plan.environment)
	}

	// Lifecycle. The permissive gate has nothing to manage.

	pub async fn init(&self) -> ClResult<()> {
		match self {
			CapabilityGate::Policy(gate) => gate.reload().await,
			CapabilityGate::Permissive(_) => Ok(()),
		}
	}

	pub async fn activate(&self, activation_key: &str) -> ClResult<()> {
		match self {
			CapabilityGate::Policy(gate) => gate.activate(activation_key).await,
			CapabilityGate::Permissive(_) => Ok(()),
		}
	}

	pub async fn reload(&self) -> ClResult<()> {
		match self {
			CapabilityGate::Policy(gate) => gate.reload().await,
			CapabilityGate::Permissive(_) => Ok(()),
		}
	}

	pub async fn renew(&self) -> ClResult<()> {
		match self {
			CapabilityGate::Policy(gate) => gate.reload().await,
			CapabilityGate::Permissive(_) => Ok(()),
		}
	}

	pub async fn shutdown(&self) -> ClResult<()> {
		match self {
			CapabilityGate::Policy(gate) => gate.shutdown().await,
			CapabilityGate::Permissive(_) => Ok(()),
		}
	}

	pub async fn reinit(&self) -> ClResult<()> {
		match self {
			CapabilityGate::Policy(gate) => gate.reinit().await,
			CapabilityGate::Permissive(_) => Ok(()),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use async_trait::async_trait;
	use portcullis_types::capability::EntitlementSet;

	#[derive(Debug)]
	struct UnreachableSource;

	#[async_trait]
	impl EntitlementSource for UnreachableSource {
		async fn fetch(&self) -> ClResult<EntitlementSet> {
			Err(Error::EntitlementUnavailable("connection refused".into()))
		}

		async fn activate(&self, _activation_key: &str) -> ClResult<()> {
			Err(Error::EntitlementUnavailable("connection refused".into()))
		}
	}

	#[test]
	fn test_permissive_grants_everything_but_api_disable() {
		let gate = CapabilityGate::permissive();

		for feature in Feature::ALL {
			let expected = feature != Feature::ApiDisabled;
			assert_eq!(gate.is_feature_enabled(feature), expected, "{}", feature);
		}
		assert!(gate.is_api_enabled());
	}

	#[test]
	fn test_permissive_quotas_are_unlimited() {
		let gate = CapabilityGate::permissive();

		for quota in Quota::ALL {
			let limit = gate.get_quota(quota);
			assert_eq!(limit, QuotaLimit::UNLIMITED, "{}", quota);
			assert_eq!(limit.0, -1);
		}
		assert!(gate.is_within_users_limit(1_000_000));
	}

	#[test]
	fn test_permissive_plan() {
		let gate = CapabilityGate::permissive();
		let plan = gate.plan_metadata();

		assert_eq!(plan.plan_name, "Enterprise");
		assert_eq!(plan.consumer_id, "enterprise");
		assert_eq!(plan.environment, "production");
		assert!(gate.current_entitlements().is_empty());
		assert_eq!(gate.info(), "Enterprise (enterprise, production)");
	}

	#[tokio::test]
	async fn test_permissive_lifecycle_is_noop() {
		let gate = CapabilityGate::permissive();

		gate.init().await.unwrap();
		gate.activate("anything").await.unwrap();
		gate.reload().await.unwrap();
		gate.renew().await.unwrap();
		gate.reinit().await.unwrap();
		gate.shutdown().await.unwrap();
		assert!(gate.is_feature_enabled(Feature::Sharing));
	}

	#[tokio::test]
	async fn test_policy_unreachable_fails_closed() {
		let gate = CapabilityGate::policy(Arc::new(UnreachableSource));

		assert!(matches!(gate.init().await, Err(Error::EntitlementUnavailable(_))));
		for feature in Feature::ALL {
			assert!(!gate.is_feature_enabled(feature));
		}
		for quota in Quota::ALL {
			assert_eq!(gate.get_quota(quota), QuotaLimit::ZERO);
		}
		// the inverted flag is off too, so the API stays reachable
		assert!(gate.is_api_enabled());
		assert!(!gate.is_within_users_limit(1));
	}
}

// vim: ts=4
