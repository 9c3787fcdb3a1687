//! Node and credential type catalog boundary
//!
//! The catalog itself (discovery, loading, hot reload) lives outside
//! Portcullis. The core reads the loaded types, annotates credential types
//! with their overridden properties and publishes them to the static cache.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt::Debug;
use std::future::Future;
use std::pin::Pin;

use crate::prelude::*;

/// Hook run by the catalog after every (re)load
pub type PostProcessorFn =
	Box<dyn Fn() -> Pin<Box<dyn Future<Output = ClResult<()>> + Send>> + Send + Sync>;

/// One configurable property of a credential type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyDescriptor {
	pub display_name: String,
	pub name: String,
	#[serde(rename = "type")]
	pub prop_type: String,
	#[serde(default)]
	pub default: serde_json::Value,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub description: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub type_options: Option<serde_json::Value>,
}

/// Credential type descriptor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialTypeDescriptor {
	pub name: String,
	pub display_name: String,
	/// Declared parent types, nearest first
	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	pub extends: Vec<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub documentation_url: Option<String>,
	#[serde(default)]
	pub properties: Vec<PropertyDescriptor>,
	/// Derived: names of properties overridden for this type or any ancestor.
	/// `None` when nothing is overridden.
	#[serde(
		rename = "__overwrittenProperties",
		default,
		skip_serializing_if = "Option::is_none"
	)]
	pub overwritten_properties: Option<Vec<String>>,
}

impl CredentialTypeDescriptor {
	pub fn new(name: impl Into<String>, display_name: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			display_name: display_name.into(),
			extends: Vec::new(),
			documentation_url: None,
			properties: Vec::new(),
			overwritten_properties: None,
		}
	}

	pub fn extends(mut self, parent: impl Into<String>) -> Self {
		self.extends.push(parent.into());
		self
	}

	pub fn property(mut self, property: PropertyDescriptor) -> Self {
		self.properties.push(property);
		self
	}
}

/// Everything the catalog has loaded
#[derive(Debug, Clone, Default)]
pub struct LoadedTypes {
	/// Node type descriptions, opaque to Portcullis
	pub nodes: Vec<serde_json::Value>,
	pub credentials: Vec<CredentialTypeDescriptor>,
}

impl LoadedTypes {
	pub fn credential(&self, name: &str) -> Option<&CredentialTypeDescriptor> {
		self.credentials.iter().find(|c| c.name == name)
	}

	pub fn parent_types(&self, name: &str) -> Vec<String> {
		parent_types(&self.credentials, name)
	}
}

/// Collects every ancestor of `name`: declared parents first, then their
/// ancestors, in child-to-parent order. Unknown parents are kept in the chain
/// but contribute no ancestors of their own. Cycles are cut.
pub fn parent_types(credentials: &[CredentialTypeDescriptor], name: &str) -> Vec<String> {
	let mut seen = HashSet::from([name.to_string()]);
	let mut result = Vec::new();
	collect_parents(credentials, name, &mut seen, &mut result);
	result
}

fn collect_parents(
	credentials: &[CredentialTypeDescriptor],
	name: &str,
	seen: &mut HashSet<String>,
	result: &mut Vec<String>,
) {
	let Some(credential) = credentials.iter().find(|c| c.name == name) else {
		return;
	};

	let direct: Vec<&String> =
		credential.extends.iter().filter(|parent| seen.insert((*parent).clone())).collect();
	result.extend(direct.iter().map(|parent| (*parent).clone()));
	for parent in direct {
		collect_parents(credentials, parent, seen, result);
	}
}

pub trait CatalogAdapter: Debug + Send + Sync {
	/// Snapshot of the currently loaded types
	fn types(&self) -> LoadedTypes;

	/// Ancestors of a credential type in child-to-parent order
	fn parent_types(&self, name: &str) -> Vec<String> {
		self.types().parent_types(name)
	}

	/// Registers a hook that runs after every catalog (re)load
	fn add_post_processor(&self, hook: PostProcessorFn);
}


// vim: ts=4
