//! Credential override resolution
//!
//! Operators can override property values of credential types (e.g. a
//! pre-configured OAuth client id). Clients need to know which properties are
//! overridden so they can hide them. A credential inherits the overrides of
//! every ancestor type, so the list is flattened along the parent chain:
//! most distant ancestor first, the type itself last, duplicates collapsed to
//! their first occurrence.

use itertools::Itertools;
use std::collections::{HashMap, HashSet};

use portcullis_types::catalog_adapter::{parent_types, CredentialTypeDescriptor};

use crate::prelude::*;

/// Overridden property names per credential type name
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OverridesByType(HashMap<String, Vec<String>>);

impl OverridesByType {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn insert(&mut self, type_name: impl Into<String>, properties: Vec<String>) {
		self.0.insert(type_name.into(), properties);
	}

	pub fn get(&self, type_name: &str) -> Option<&[String]> {
		self.0.get(type_name).map(Vec::as_slice)
	}

	pub fn type_names(&self) -> impl Iterator<Item = &str> {
		self.0.keys().map(String::as_str)
	}

	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	/// Builds the mapping from an overwrite document of the form
	/// `{ "<typeName>": { "<property>": <value>, ... }, ... }`.
	/// Only property names are kept; the values are applied elsewhere.
	pub fn from_json(doc: &serde_json::Value) -> ClResult<Self> {
		let types = doc.as_object().ok_or_else(|| {
			Error::ValidationError("Credential overrides must be a JSON object".into())
		})?;

		let mut overrides = Self::new();
		for (type_name, properties) in types {
			let properties = properties.as_object().ok_or_else(|| {
				Error::ValidationError(format!(
					"Overrides for credential type '{}' must be a JSON object",
					type_name
				))
			})?;
			overrides.insert(type_name.clone(), properties.keys().cloned().collect());
		}
		Ok(overrides)
	}
}

impl<K: Into<String>> FromIterator<(K, Vec<String>)> for OverridesByType {
	fn from_iter<I: IntoIterator<Item = (K, Vec<String>)>>(iter: I) -> Self {
		Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
	}
}

/// Flattens the overrides along one chain, given in ancestor-to-self order.
/// Returns `None` when no level of the chain has an override.
pub fn resolve_chain<S: AsRef<str>>(
	chain: &[S],
	overrides: &OverridesByType,
) -> Option<Vec<String>> {
	let resolved: Vec<String> = chain
		.iter()
		.filter_map(|type_name| overrides.get(type_name.as_ref()))
		.flatten()
		.unique()
		.cloned()
		.collect();

	if resolved.is_empty() {
		None
	} else {
		Some(resolved)
	}
}

/// Annotates every credential type with its overridden properties.
///
/// Override entries naming a type that is not in the catalog are skipped.
pub fn resolve(credentials: &mut [CredentialTypeDescriptor], overrides: &OverridesByType) {
	let catalog = credentials.to_vec();
	resolve_with(credentials, overrides, |name| parent_types(&catalog, name));
}

/// Like [`resolve`], with ancestors looked up through `parents_of`
/// (child-to-parent order), e.g. a catalog's own inheritance index.
pub fn resolve_with<F>(
	credentials: &mut [CredentialTypeDescriptor],
	overrides: &OverridesByType,
	mut parents_of: F,
) where
	F: FnMut(&str) -> Vec<String>,
{
	let known: HashSet<&str> = credentials.iter().map(|c| c.name.as_str()).collect();
	let skipped: Vec<&str> = overrides.type_names().filter(|name| !known.contains(name)).collect();
	if !skipped.is_empty() {
		debug!("Skipping overrides for unknown credential types: {}", skipped.join(", "));
	}

	let annotations: Vec<Option<Vec<String>>> = credentials
		.iter()
		.map(|credential| {
			let mut chain = parents_of(&credential.name);
			chain.reverse();
			chain.push(credential.name.clone());
			resolve_chain(&chain, overrides)
		})
		.collect();

	for (credential, annotation) in credentials.iter_mut().zip(annotations) {
		credential.overwritten_properties = annotation;
	}
}


// vim: ts=4
