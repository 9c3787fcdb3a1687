//! Permissive gate: grants everything.
//!
//! Installed where gating is administratively disabled. The one exception is
//! the inverted `ApiDisabled` flag, which stays off so the public API remains
//! reachable.

use portcullis_types::capability::{Entitlement, PlanMetadata};

use crate::prelude::*;

pub const PLAN_NAME: &str = "Enterprise";
pub const CONSUMER_ID: &str = "enterprise";
pub const ENVIRONMENT: &str = "production";

#[derive(Debug, Clone, Copy, Default)]
pub struct PermissiveGate;

impl PermissiveGate {
	pub fn is_feature_enabled(&self, feature: Feature) -> bool {
		!matches!(feature, Feature::ApiDisabled)
	}

	pub fn get_quota(&self, _quota: Quota) -> QuotaLimit {
		QuotaLimit::UNLIMITED
	}

	pub fn plan_metadata(&self) -> PlanMetadata {
		PlanMetadata {
			plan_name: PLAN_NAME.into(),
			consumer_id: CONSUMER_ID.into(),
			environment: ENVIRONMENT.into(),
		}
	}

	pub fn current_entitlements(&self) -> Vec<Entitlement> {
		Vec::new()
	}
}

// vim: ts=4
