//! Error type shared by all Portcullis crates

use std::fmt;

pub type ClResult<T> = std::result::Result<T, Error>;

#[derive(Debug)]
pub enum Error {
	NotFound,
	Parse,

	/// The entitlement source could not be reached or has not answered yet.
	/// Capability queries treat this as "feature off, quota zero".
	EntitlementUnavailable(String),
	/// The configuration store holds no value for the key and the setting
	/// has no default.
	ConfigKeyMissing(String),
	/// Writing a type catalog cache file failed.
	CatalogWriteFailed(String),

	ConfigError(String),
	ValidationError(String),
	ServiceUnavailable(String),
	Internal(String),
	Serialization(String),

	// externals
	Io(std::io::Error),
}

impl Error {
	/// True for errors a settings consumer degrades to a default value
	pub fn is_missing_value(&self) -> bool {
		matches!(self, Error::ConfigKeyMissing(_) | Error::NotFound)
	}
}

impl fmt::Display for Error {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Error::NotFound => write!(f, "not found"),
			Error::Parse => write!(f, "parse error"),
			Error::EntitlementUnavailable(msg) => write!(f, "Entitlements unavailable: {}", msg),
			Error::ConfigKeyMissing(key) => write!(f, "Configuration key not found: {}", key),
			Error::CatalogWriteFailed(msg) => write!(f, "Type catalog write failed: {}", msg),
			Error::ConfigError(msg) => write!(f, "Configuration error: {}", msg),
			Error::ValidationError(msg) => write!(f, "Validation error: {}", msg),
			Error::ServiceUnavailable(msg) => write!(f, "Service unavailable: {}", msg),
			Error::Internal(msg) => write!(f, "Internal error: {}", msg),
			Error::Serialization(msg) => write!(f, "Serialization error: {}", msg),
			Error::Io(err) => write!(f, "I/O error: {}", err),
		}
	}
}

impl std::error::Error for Error {
	fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
		match self {
			Error::Io(err) => Some(err),
			_ => None,
		}
	}
}

impl From<std::io::Error> for Error {
	fn from(err: std::io::Error) -> Self {
		Self::Io(err)
	}
}

impl From<serde_json::Error> for Error {
	fn from(err: serde_json::Error) -> Self {
		Self::Serialization(err.to_string())
	}
}

impl From<serde_yaml::Error> for Error {
	fn from(err: serde_yaml::Error) -> Self {
		Self::ConfigError(err.to_string())
	}
}


// vim: ts=4
