//! In-memory type catalog
//!
//! Holds a fixed set of node and credential types. Replacing the set with
//! [`CatalogAdapterMemory::reload`] runs every registered post-processor, the
//! way a real catalog does after discovering new packages.

use std::{fmt::Debug, path::Path};

use futures::future::join_all;
use parking_lot::{Mutex, RwLock};

use portcullis::{
	catalog_adapter::{CatalogAdapter, CredentialTypeDescriptor, LoadedTypes, PostProcessorFn},
	prelude::*,
};

#[derive(Default)]
pub struct CatalogAdapterMemory {
	types: RwLock<LoadedTypes>,
	post_processors: Mutex<Vec<PostProcessorFn>>,
}

impl Debug for CatalogAdapterMemory {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		let types = self.types.read();
		f.debug_struct("CatalogAdapterMemory")
			.field("nodes", &types.nodes.len())
			.field("credentials", &types.credentials.len())
			.field("post_processors", &self.post_processors.lock().len())
			.finish()
	}
}

impl CatalogAdapterMemory {
	pub fn new(types: LoadedTypes) -> Self {
		Self { types: RwLock::new(types), post_processors: Mutex::new(Vec::new()) }
	}

	/// Parses JSON arrays of node descriptions and credential types
	pub fn from_json(nodes: &str, credentials: &str) -> ClResult<Self> {
		let nodes: Vec<serde_json::Value> = serde_json::from_str(nodes)?;
		let credentials: Vec<CredentialTypeDescriptor> = serde_json::from_str(credentials)?;
		info!("Loaded {} node types and {} credential types", nodes.len(), credentials.len());
		Ok(Self::new(LoadedTypes { nodes, credentials }))
	}

	pub fn from_json_files(nodes: &Path, credentials: &Path) -> ClResult<Self> {
		let read = |path: &Path| {
			std::fs::read_to_string(path).map_err(|err| {
				Error::ConfigError(format!("cannot read {}: {}", path.display(), err))
			})
		};
		Self::from_json(&read(nodes)?, &read(credentials)?)
	}

	/// Replaces the loaded types, then runs the post-processors.
	/// All of them run even if one fails; the first error is returned.
	pub async fn reload(&self, types: LoadedTypes) -> ClResult<()> {
		*self.types.write() = types;

		let runs: Vec<_> = self.post_processors.lock().iter().map(|hook| hook()).collect();
		debug!("Catalog reloaded, running {} post-processors", runs.len());

		let mut first_err = None;
		for res in join_all(runs).await {
			if let Err(err) = res {
				warn!("Catalog post-processor failed: {}", err);
				first_err.get_or_insert(err);
			}
		}
		first_err.map_or(Ok(()), Err)
	}
}

impl CatalogAdapter for CatalogAdapterMemory {
	fn types(&self) -> LoadedTypes {
		self.types.read().clone()
	}

	fn add_post_processor(&self, hook: PostProcessorFn) {
		self.post_processors.lock().push(hook);
	}
}


// vim: ts=4
