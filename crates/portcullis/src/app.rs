//! App builder - wires the gate, settings and frontend services together

use std::{
	path::{Path, PathBuf},
	sync::Arc,
};

use portcullis_core::frontend::{FrontendService, FrontendSettings};
use portcullis_core::prelude::*;
use portcullis_core::settings::{FrozenSettingsRegistry, SettingsRegistry, SettingsService};
use portcullis_core::{
	CapabilityGate, InstanceConfig, InstanceUrls, OverridesByType, TypeCatalogPublisher,
};
use portcullis_types::catalog_adapter::CatalogAdapter;
use portcullis_types::config_adapter::ConfigAdapter;
use portcullis_types::entitlement_adapter::EntitlementSource;
use portcullis_types::url_adapter::UrlResolver;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub struct AppBuilderOpts {
	pub static_cache_dir: Box<Path>,
	pub settings_cache_size: usize,
}

pub struct Adapters {
	pub config_adapter: Option<Arc<dyn ConfigAdapter>>,
	pub catalog_adapter: Option<Arc<dyn CatalogAdapter>>,
	pub url_resolver: Option<Arc<dyn UrlResolver>>,
}

enum GateChoice {
	Unset,
	Permissive,
	Policy(Arc<dyn EntitlementSource>),
}

pub struct AppState {
	pub opts: AppBuilderOpts,
	pub config: Arc<InstanceConfig>,
	pub gate: Arc<CapabilityGate>,

	pub config_adapter: Arc<dyn ConfigAdapter>,
	pub catalog_adapter: Arc<dyn CatalogAdapter>,
	pub url_resolver: Arc<dyn UrlResolver>,

	// Settings subsystem
	pub settings: Arc<SettingsService>,
	pub settings_registry: Arc<FrozenSettingsRegistry>,

	pub frontend: Arc<FrontendService>,
}

impl AppState {
	/// Current frontend settings snapshot
	pub fn frontend_settings(&self) -> FrontendSettings {
		self.frontend.settings()
	}

	/// Refreshes and returns the frontend settings snapshot
	pub async fn refresh_frontend_settings(&self) -> FrontendSettings {
		self.frontend.refresh().await
	}

	pub async fn shutdown(&self) -> ClResult<()> {
		info!("Shutting down");
		self.gate.shutdown().await
	}
}

pub type App = Arc<AppState>;

pub struct AppBuilder {
	opts: AppBuilderOpts,
	instance_config: InstanceConfig,
	adapters: Adapters,
	gate: GateChoice,
	credential_overrides: OverridesByType,
}

impl AppBuilder {
	pub fn new() -> Self {
		// A subscriber may already be installed (tests, embedding servers)
		let _ = tracing_subscriber::fmt()
			.with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
			.with_target(false)
			.try_init();
		AppBuilder {
			opts: AppBuilderOpts {
				static_cache_dir: PathBuf::from("./data/cache").into(),
				settings_cache_size: 1000,
			},
			instance_config: InstanceConfig::default(),
			adapters: Adapters { config_adapter: None, catalog_adapter: None, url_resolver: None },
			gate: GateChoice::Unset,
			credential_overrides: OverridesByType::new(),
		}
	}

	// Opts
	pub fn instance_config(&mut self, instance_config: InstanceConfig) -> &mut Self {
		self.instance_config = instance_config;
		self
	}
	pub fn static_cache_dir(&mut self, static_cache_dir: impl Into<Box<Path>>) -> &mut Self {
		self.opts.static_cache_dir = static_cache_dir.into();
		self
	}
	pub fn settings_cache_size(&mut self, settings_cache_size: usize) -> &mut Self {
		self.opts.settings_cache_size = settings_cache_size;
		self
	}
	pub fn credential_overrides(&mut self, overrides: OverridesByType) -> &mut Self {
		self.credential_overrides = overrides;
		self
	}

	// Capability gate
	pub fn permissive_gate(&mut self) -> &mut Self {
		self.gate = GateChoice::Permissive;
		self
	}
	pub fn entitlement_source(&mut self, source: Arc<dyn EntitlementSource>) -> &mut Self {
		self.gate = GateChoice::Policy(source);
		self
	}

	// Adapters
	pub fn config_adapter(&mut self, config_adapter: Arc<dyn ConfigAdapter>) -> &mut Self {
		self.adapters.config_adapter = Some(config_adapter);
		self
	}
	pub fn catalog_adapter(&mut self, catalog_adapter: Arc<dyn CatalogAdapter>) -> &mut Self {
		self.adapters.catalog_adapter = Some(catalog_adapter);
		self
	}
	pub fn url_resolver(&mut self, url_resolver: Arc<dyn UrlResolver>) -> &mut Self {
		self.adapters.url_resolver = Some(url_resolver);
		self
	}

	pub async fn build(self) -> ClResult<App> {
		info!("Portcullis V{}", VERSION);

		let Some(config_adapter) = self.adapters.config_adapter else {
			error!("FATAL: No config adapter configured");
			return Err(Error::Internal("No config adapter configured".to_string()));
		};
		let Some(catalog_adapter) = self.adapters.catalog_adapter else {
			error!("FATAL: No catalog adapter configured");
			return Err(Error::Internal("No catalog adapter configured".to_string()));
		};
		let gate = match self.gate {
			GateChoice::Permissive => CapabilityGate::permissive(),
			GateChoice::Policy(source) => CapabilityGate::policy(source),
			GateChoice::Unset => {
				error!("FATAL: No capability gate configured");
				return Err(Error::Internal("No capability gate configured".to_string()));
			}
		};

		let config = Arc::new(self.instance_config.with_instance_id());
		let url_resolver: Arc<dyn UrlResolver> = match self.adapters.url_resolver {
			Some(url_resolver) => url_resolver,
			None => Arc::new(InstanceUrls::new(&config.url)),
		};

		// Initialize settings registry and service
		let mut settings_registry = SettingsRegistry::new();
		portcullis_core::register_settings(&mut settings_registry)?;
		info!("Registered {} settings", settings_registry.len());

		let frozen_registry = Arc::new(settings_registry.freeze());
		let settings_service = Arc::new(SettingsService::new(
			frozen_registry.clone(),
			config_adapter.clone(),
			self.opts.settings_cache_size,
		));
		settings_service.validate_required_settings().await?;
		info!("Settings subsystem initialized and validated");

		// The gate answers queries even if the first fetch fails
		let gate = Arc::new(gate);
		if let Err(err) = gate.init().await {
			warn!("Capability gate initialization failed, failing closed: {}", err);
		}
		info!("Capability gate: {}", gate.info());

		let frontend = FrontendService::new(
			config.clone(),
			gate.clone(),
			settings_service.clone(),
			url_resolver.clone(),
			catalog_adapter.clone(),
			TypeCatalogPublisher::new(self.opts.static_cache_dir.to_path_buf()),
			self.credential_overrides,
		);
		// The first snapshot must already reflect the configuration store
		frontend.refresh().await;

		let app: App = Arc::new(AppState {
			opts: self.opts,
			config,
			gate,
			config_adapter,
			catalog_adapter,
			url_resolver,
			settings: settings_service,
			settings_registry: frozen_registry,
			frontend,
		});

		Ok(app)
	}
}

impl Default for AppBuilder {
	fn default() -> Self {
		Self::new()
	}
}

// vim: ts=4
