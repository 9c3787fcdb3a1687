//! Common test utilities
//!
//! Builds apps from the in-memory adapters, each with its own cache directory.

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{Duration, Utc};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tempfile::TempDir;

use portcullis::capability::{Entitlement, EntitlementSet, PlanMetadata};
use portcullis::catalog_adapter::LoadedTypes;
use portcullis::entitlement_adapter::EntitlementSource;
use portcullis::prelude::*;
use portcullis::{App, AppBuilder, InstanceConfig, OverridesByType};
use portcullis_catalog_adapter_memory::CatalogAdapterMemory;
use portcullis_config_adapter_memory::ConfigAdapterMemory;

/// Entitlement source serving a fixed set, switchable to unreachable
#[derive(Debug)]
pub struct TestEntitlementSource {
	pub reachable: AtomicBool,
	pub set: EntitlementSet,
	pub activations: AtomicUsize,
	pub shutdowns: AtomicUsize,
}

impl TestEntitlementSource {
	pub fn new(environment: &str, features: serde_json::Value) -> Self {
		let now = Utc::now();
		let features = match features {
			serde_json::Value::Object(map) => map.into_iter().collect(),
			_ => Default::default(),
		};
		Self {
			reachable: AtomicBool::new(true),
			set: EntitlementSet {
				plan: PlanMetadata {
					plan_name: "Business".into(),
					consumer_id: "acme".into(),
					environment: environment.into(),
				},
				entitlements: vec![Entitlement {
					id: "ent-1".into(),
					product_id: "business".into(),
					features,
					valid_from: now - Duration::hours(1),
					valid_to: now + Duration::days(30),
				}],
			},
			activations: AtomicUsize::new(0),
			shutdowns: AtomicUsize::new(0),
		}
	}

	pub fn unreachable() -> Self {
		let source = Self::new("production", serde_json::json!({}));
		source.reachable.store(false, Ordering::SeqCst);
		source
	}

	fn check(&self) -> ClResult<()> {
		if self.reachable.load(Ordering::SeqCst) {
			Ok(())
		} else {
			Err(Error::EntitlementUnavailable("license server down".into()))
		}
	}
}

#[async_trait]
impl EntitlementSource for TestEntitlementSource {
	async fn fetch(&self) -> ClResult<EntitlementSet> {
		self.check()?;
		Ok(self.set.clone())
	}

	async fn activate(&self, _activation_key: &str) -> ClResult<()> {
		self.check()?;
		self.activations.fetch_add(1, Ordering::SeqCst);
		Ok(())
	}

	async fn shutdown(&self) -> ClResult<()> {
		self.shutdowns.fetch_add(1, Ordering::SeqCst);
		Ok(())
	}
}

pub struct TestApp {
	pub app: App,
	pub store: Arc<ConfigAdapterMemory>,
	pub catalog: Arc<CatalogAdapterMemory>,
	pub cache_dir: TempDir,
}

pub enum TestGate {
	Permissive,
	Policy(Arc<TestEntitlementSource>),
}

pub async fn build_app(gate: TestGate) -> TestApp {
	build_app_with(gate, InstanceConfig::default(), OverridesByType::new()).await
}

pub async fn build_app_with(
	gate: TestGate,
	config: InstanceConfig,
	overrides: OverridesByType,
) -> TestApp {
	let store = Arc::new(ConfigAdapterMemory::new());
	let catalog = Arc::new(CatalogAdapterMemory::new(LoadedTypes::default()));
	let cache_dir = TempDir::new().unwrap();

	let mut builder = AppBuilder::new();
	builder
		.instance_config(config)
		.static_cache_dir(cache_dir.path())
		.config_adapter(store.clone())
		.catalog_adapter(catalog.clone())
		.credential_overrides(overrides);
	match gate {
		TestGate::Permissive => builder.permissive_gate(),
		TestGate::Policy(source) => builder.entitlement_source(source),
	};

	let app = builder.build().await.unwrap();
	TestApp { app, store, catalog, cache_dir }
}

// vim: ts=4
