//! Minimal host for Portcullis
//!
//! Wires the in-memory adapters from environment variables, generates the type
//! caches and prints the frontend settings snapshot.
//!
//! - `CONFIG_FILE`: instance configuration (YAML)
//! - `SETTINGS_FILE`: runtime settings to seed the configuration store (YAML)
//! - `CACHE_DIR`: static cache directory (default `./data/cache`)
//! - `NODES_FILE`, `CREDENTIALS_FILE`: type catalog (JSON arrays)
//! - `OVERRIDES_FILE`: credential overrides (JSON object)
//!
//! No entitlement source ships with this host, so the gate is permissive.

use std::{
	env,
	path::{Path, PathBuf},
	process::ExitCode,
	sync::Arc,
};

use portcullis::catalog_adapter::LoadedTypes;
use portcullis::prelude::*;
use portcullis::{AppBuilder, InstanceConfig, OverridesByType};
use portcullis_catalog_adapter_memory::CatalogAdapterMemory;
use portcullis_config_adapter_memory::ConfigAdapterMemory;

pub struct Config {
	pub config_file: Option<PathBuf>,
	pub settings_file: Option<PathBuf>,
	pub cache_dir: PathBuf,
	pub nodes_file: Option<PathBuf>,
	pub credentials_file: Option<PathBuf>,
	pub overrides_file: Option<PathBuf>,
}

impl Config {
	fn from_env() -> Self {
		let path = |name: &str| env::var(name).ok().map(PathBuf::from);
		Config {
			config_file: path("CONFIG_FILE"),
			settings_file: path("SETTINGS_FILE"),
			cache_dir: path("CACHE_DIR").unwrap_or_else(|| PathBuf::from("./data/cache")),
			nodes_file: path("NODES_FILE"),
			credentials_file: path("CREDENTIALS_FILE"),
			overrides_file: path("OVERRIDES_FILE"),
		}
	}
}

fn read_overrides(path: &Path) -> ClResult<OverridesByType> {
	let data = std::fs::read_to_string(path)
		.map_err(|err| Error::ConfigError(format!("cannot read {}: {}", path.display(), err)))?;
	OverridesByType::from_json(&serde_json::from_str(&data)?)
}

async fn run(config: Config) -> ClResult<()> {
	let instance_config = match &config.config_file {
		Some(path) => InstanceConfig::from_yaml_file(path)?,
		None => InstanceConfig::default(),
	};
	let store = match &config.settings_file {
		Some(path) => ConfigAdapterMemory::from_yaml_file(path)?,
		None => ConfigAdapterMemory::new(),
	};
	let catalog = match (&config.nodes_file, &config.credentials_file) {
		(Some(nodes), Some(credentials)) => {
			CatalogAdapterMemory::from_json_files(nodes, credentials)?
		}
		_ => CatalogAdapterMemory::new(LoadedTypes::default()),
	};
	let overrides = match &config.overrides_file {
		Some(path) => read_overrides(path)?,
		None => OverridesByType::new(),
	};

	let mut builder = AppBuilder::new();
	builder
		.instance_config(instance_config)
		.static_cache_dir(config.cache_dir.clone())
		.config_adapter(Arc::new(store))
		.catalog_adapter(Arc::new(catalog))
		.credential_overrides(overrides)
		.permissive_gate();
	let app = builder.build().await?;

	app.frontend.generate_types().await?;
	info!("Type caches written to {}", app.frontend.publisher().types_dir().display());

	let settings = app.refresh_frontend_settings().await;
	println!("{}", serde_json::to_string_pretty(&settings)?);

	app.shutdown().await
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
	match run(Config::from_env()).await {
		Ok(()) => ExitCode::SUCCESS,
		Err(err) => {
			error!("{}", err);
			eprintln!("portcullis: {}", err);
			ExitCode::FAILURE
		}
	}
}

// vim: ts=4
