//! Entitlement source boundary
//!
//! A policy-driven capability gate defers to an implementation of this trait.
//! How entitlements are obtained (remote license server, signed file, ...) is
//! not the gate's concern.

use async_trait::async_trait;
use std::fmt::Debug;

use crate::capability::EntitlementSet;
use crate::prelude::*;

#[async_trait]
pub trait EntitlementSource: Debug + Send + Sync {
	/// Fetches the current entitlement set.
	/// Returns `Error::EntitlementUnavailable` if the source cannot be reached.
	async fn fetch(&self) -> ClResult<EntitlementSet>;

	/// Activates the given activation key with the source
	async fn activate(&self, activation_key: &str) -> ClResult<()>;

	/// Releases any resources held by the source
	async fn shutdown(&self) -> ClResult<()> {
		Ok(())
	}
}

// vim: ts=4
