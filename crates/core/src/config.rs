//! Discovery configuration threaded explicitly through the pipeline.

use std::path::PathBuf;
use std::time::Duration;

use crate::error::{DiscoveryError, Result};

pub const DEFAULT_HOSTNAME: &str = "localhost";
pub const DEFAULT_PORT: u16 = 9222;
pub const DEFAULT_LIST_PATH: &str = "/json/list";
pub const DEFAULT_SENTINEL: &str = ".gitkeep";

/// Budget for a single favicon attempt.
pub const DEFAULT_ICON_TIMEOUT: Duration = Duration::from_secs(1);
pub const DEFAULT_LIST_TIMEOUT: Duration = Duration::from_secs(5);

/// Remote endpoint, filtering and icon cache settings for one explorer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveryConfig {
	pub hostname: String,
	pub port: u16,
	pub use_https: bool,
	pub show_workers: bool,
	pub icon_cache_dir: PathBuf,
	pub list_path: String,
	pub icon_timeout: Duration,
	pub list_timeout: Duration,
	/// File kept in the icon cache directory across clears.
	pub sentinel: String,
}

impl DiscoveryConfig {
	pub fn new(icon_cache_dir: impl Into<PathBuf>) -> Self {
		Self {
			hostname: DEFAULT_HOSTNAME.to_string(),
			port: DEFAULT_PORT,
			use_https: false,
			show_workers: false,
			icon_cache_dir: icon_cache_dir.into(),
			list_path: DEFAULT_LIST_PATH.to_string(),
			icon_timeout: DEFAULT_ICON_TIMEOUT,
			list_timeout: DEFAULT_LIST_TIMEOUT,
			sentinel: DEFAULT_SENTINEL.to_string(),
		}
	}

	pub fn hostname(mut self, hostname: impl Into<String>) -> Self {
		self.hostname = hostname.into();
		self
	}

	pub fn port(mut self, port: u16) -> Self {
		self.port = port;
		self
	}

	pub fn use_https(mut self, use_https: bool) -> Self {
		self.use_https = use_https;
		self
	}

	pub fn show_workers(mut self, show_workers: bool) -> Self {
		self.show_workers = show_workers;
		self
	}

	pub fn list_path(mut self, path: impl Into<String>) -> Self {
		self.list_path = path.into();
		self
	}

	pub fn icon_timeout(mut self, timeout: Duration) -> Self {
		self.icon_timeout = timeout;
		self
	}

	pub fn list_timeout(mut self, timeout: Duration) -> Self {
		self.list_timeout = timeout;
		self
	}

	pub fn sentinel(mut self, name: impl Into<String>) -> Self {
		self.sentinel = name.into();
		self
	}

	pub fn scheme(&self) -> &'static str {
		if self.use_https { "https" } else { "http" }
	}

	/// Hostname as it should appear in URLs, bracketing IPv6 literals.
	pub fn url_host(&self) -> String {
		if self.hostname.contains(':') && !self.hostname.starts_with('[') {
			format!("[{}]", self.hostname)
		} else {
			self.hostname.clone()
		}
	}

	pub fn authority(&self) -> String {
		format!("{}:{}", self.url_host(), self.port)
	}

	/// Full address of the target listing endpoint.
	pub fn list_url(&self) -> String {
		let path = if self.list_path.starts_with('/') {
			self.list_path.clone()
		} else {
			format!("/{}", self.list_path)
		};
		format!("{}://{}{}", self.scheme(), self.authority(), path)
	}

	pub fn validate(&self) -> Result<()> {
		if self.hostname.trim().is_empty() {
			return Err(DiscoveryError::Config("hostname must not be empty".to_string()));
		}
		if self.port == 0 {
			return Err(DiscoveryError::Config("port must be non-zero".to_string()));
		}
		if self.sentinel.is_empty() || self.sentinel.contains(['/', '\\']) {
			return Err(DiscoveryError::Config(format!("invalid sentinel file name {:?}", self.sentinel)));
		}
		Ok(())
	}
}
