//! Instance URL resolution

use parking_lot::RwLock;

use portcullis_types::url_adapter::UrlResolver;

use crate::instance_config::UrlConfig;
use crate::prelude::*;

/// Derives the public URLs from the `url` configuration group.
///
/// The webhook URL can be replaced at runtime, e.g. when a tunnel is opened
/// after startup.
#[derive(Debug)]
pub struct InstanceUrls {
	instance_base: String,
	webhook_base: RwLock<String>,
}

fn with_trailing_slash(url: &str) -> String {
	if url.ends_with('/') {
		url.to_string()
	} else {
		format!("{}/", url)
	}
}

fn is_default_port(protocol: &str, port: u16) -> bool {
	matches!((protocol, port), ("http", 80) | ("https", 443))
}

impl InstanceUrls {
	pub fn new(config: &UrlConfig) -> Self {
		let instance_base = match config.editor_base_url.as_deref() {
			Some(url) if !url.is_empty() => url.trim_end_matches('/').to_string(),
			_ => {
				let port = if is_default_port(&config.protocol, config.port) {
					String::new()
				} else {
					format!(":{}", config.port)
				};
				let path = config.path.trim_end_matches('/');
				format!("{}://{}{}{}", config.protocol, config.host, port, path)
			}
		};

		let webhook_base = match config.webhook_url.as_deref() {
			Some(url) if !url.is_empty() => with_trailing_slash(url),
			_ => with_trailing_slash(&instance_base),
		};

		debug!("Instance URL: {}, webhook URL: {}", instance_base, webhook_base);
		Self { instance_base, webhook_base: RwLock::new(webhook_base) }
	}

	/// Replaces the webhook base URL
	pub fn set_webhook_url(&self, url: &str) {
		let url = with_trailing_slash(url);
		info!("Webhook URL changed to {}", url);
		*self.webhook_base.write() = url;
	}
}

impl UrlResolver for InstanceUrls {
	fn instance_base_url(&self) -> String {
		self.instance_base.clone()
	}

	fn webhook_base_url(&self) -> String {
		self.webhook_base.read().clone()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_default_urls() {
		let urls = InstanceUrls::new(&UrlConfig::default());
		assert_eq!(urls.instance_base_url(), "http://localhost:5678");
		assert_eq!(urls.webhook_base_url(), "http://localhost:5678/");
	}

	#[test]
	fn test_default_port_is_omitted() {
		let config = UrlConfig {
			protocol: "https".into(),
			host: "automate.example.com".into(),
			port: 443,
			path: "/portcullis/".into(),
			..UrlConfig::default()
		};
		let urls = InstanceUrls::new(&config);
		assert_eq!(urls.instance_base_url(), "https://automate.example.com/portcullis");
		assert_eq!(urls.webhook_base_url(), "https://automate.example.com/portcullis/");

		let config = UrlConfig { protocol: "http".into(), port: 443, ..config };
		assert_eq!(
			InstanceUrls::new(&config).instance_base_url(),
			"http://automate.example.com:443/portcullis"
		);
	}

	#[test]
	fn test_configured_overrides() {
		let config = UrlConfig {
			editor_base_url: Some("https://editor.example.com/".into()),
			webhook_url: Some("https://hooks.example.com".into()),
			..UrlConfig::default()
		};
		let urls = InstanceUrls::new(&config);
		assert_eq!(urls.instance_base_url(), "https://editor.example.com");
		assert_eq!(urls.webhook_base_url(), "https://hooks.example.com/");
	}

	#[test]
	fn test_set_webhook_url() {
		let urls = InstanceUrls::new(&UrlConfig::default());
		urls.set_webhook_url("https://tunnel.example.com");
		assert_eq!(urls.webhook_base_url(), "https://tunnel.example.com/");
		assert_eq!(urls.instance_base_url(), "http://localhost:5678");
	}
}

// vim: ts=4
