//! Policy-driven gate backed by an entitlement source
//!
//! The gate caches the last entitlement set it fetched. Queries read the cache
//! and never touch the source, so they stay synchronous. Until a fetch has
//! succeeded every query fails closed: features off, quotas zero.

use chrono::Utc;
use parking_lot::RwLock;
use std::sync::Arc;

use portcullis_types::capability::{Entitlement, EntitlementSet, PlanMetadata};
use portcullis_types::entitlement_adapter::EntitlementSource;

use crate::prelude::*;

/// Plan reported before any entitlements have been fetched
pub const UNLICENSED_PLAN_NAME: &str = "Community";

#[derive(Debug)]
pub struct PolicyGate {
	source: Arc<dyn EntitlementSource>,
	state: RwLock<Option<EntitlementSet>>,
}

fn not_loaded() -> Error {
	Error::EntitlementUnavailable("entitlements not loaded".into())
}

impl PolicyGate {
	pub fn new(source: Arc<dyn EntitlementSource>) -> Self {
		Self { source, state: RwLock::new(None) }
	}

	/// Whether an entitlement set has been fetched
	pub fn is_loaded(&self) -> bool {
		self.state.read().is_some()
	}

	/// Feature check that reports an unreachable source instead of hiding it
	pub fn try_feature(&self, feature: Feature) -> ClResult<bool> {
		let state = self.state.read();
		let set = state.as_ref().ok_or_else(not_loaded)?;
		let now = Utc::now();

		Ok(set
			.entitlements
			.iter()
			.filter(|e| e.is_active_at(now))
			.any(|e| e.feature(feature) == Some(true)))
	}

	/// Quota check; the most generous active entitlement wins
	pub fn try_quota(&self, quota: Quota) -> ClResult<QuotaLimit> {
		let state = self.state.read();
		let set = state.as_ref().ok_or_else(not_loaded)?;
		let now = Utc::now();

		Ok(set
			.entitlements
			.iter()
			.filter(|e| e.is_active_at(now))
			.filter_map(|e| e.quota(quota))
			.reduce(QuotaLimit::max)
			.unwrap_or(QuotaLimit::ZERO))
	}

	pub fn is_feature_enabled(&self, feature: Feature) -> bool {
		self.try_feature(feature).unwrap_or_else(|err| {
			debug!("Feature {} treated as disabled: {}", feature, err);
			false
		})
	}

	pub fn get_quota(&self, quota: Quota) -> QuotaLimit {
		self.try_quota(quota).unwrap_or_else(|err| {
			debug!("Quota {} treated as zero: {}", quota, err);
			QuotaLimit::ZERO
		})
	}

	pub fn plan_metadata(&self) -> PlanMetadata {
		match self.state.read().as_ref() {
			Some(set) => set.plan.clone(),
			None => PlanMetadata {
				plan_name: UNLICENSED_PLAN_NAME.into(),
				consumer_id: String::new(),
				environment: "production".into(),
			},
		}
	}

	/// Entitlements active right now
	pub fn current_entitlements(&self) -> Vec<Entitlement> {
		let now = Utc::now();
		self.state
			.read()
			.as_ref()
			.map(|set| set.entitlements.iter().filter(|e| e.is_active_at(now)).cloned().collect())
			.unwrap_or_default()
	}

	/// Fetches a fresh entitlement set. On failure the previous set is kept.
	pub async fn reload(&self) -> ClResult<()> {
		match self.source.fetch().await {
			Ok(set) => {
				info!(
					"Loaded {} entitlements for plan '{}'",
					set.entitlements.len(),
					set.plan.plan_name
				);
				*self.state.write() = Some(set);
				Ok(())
			}
			Err(err) => {
				warn!("Failed to fetch entitlements, keeping previous state: {}", err);
				Err(unavailable(err))
			}
		}
	}

	pub async fn activate(&self, activation_key: &str) -> ClResult<()> {
		self.source.activate(activation_key).await.map_err(unavailable)?;
		self.reload().await
	}

	/// Drops the cached set and fetches again; a failure leaves the gate closed
	pub async fn reinit(&self) -> ClResult<()> {
		*self.state.write() = None;
		self.reload().await
	}

	pub async fn shutdown(&self) -> ClResult<()> {
		*self.state.write() = None;
		self.source.shutdown().await
	}
}

fn unavailable(err: Error) -> Error {
	match err {
		Error::EntitlementUnavailable(_) => err,
		other => Error::EntitlementUnavailable(other.to_string()),
	}
}


// vim: ts=4
