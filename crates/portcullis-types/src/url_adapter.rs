//! URL resolution boundary

use std::fmt::Debug;

/// Resolves the externally visible base URLs of the instance.
///
/// Implementations must be cheap: the settings aggregator calls them on every
/// refresh, since the webhook URL can change at runtime (e.g. when a tunnel is
/// opened).
pub trait UrlResolver: Debug + Send + Sync {
	/// Base URL of the editor UI, without a trailing slash
	fn instance_base_url(&self) -> String;

	/// Base URL for incoming webhooks, with a trailing slash
	fn webhook_base_url(&self) -> String;
}

// vim: ts=4
