//! Persistent explorer settings across invocations.
//!
//! Settings live in a single JSON file (`~/.config/cdpt/config.json` unless
//! `--config` points elsewhere). Every field is optional so that defaults and
//! command-line flags can fill the gaps; a missing or unreadable file behaves
//! like an empty one.

use std::fs;
use std::path::{Path, PathBuf};

use cdpt::DiscoveryConfig;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{CliError, Result};
use crate::output::{EffectiveConfig, SettingSource};


const SETTINGS_SCHEMA_VERSION: u32 = 1;
const APP_DIR: &str = "cdpt";

/// On-disk settings file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
	#[serde(default = "schema_version")]
	pub schema: u32,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub hostname: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub port: Option<u16>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub use_https: Option<bool>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub show_workers: Option<bool>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub icon_cache_dir: Option<PathBuf>,
}

fn schema_version() -> u32 {
	SETTINGS_SCHEMA_VERSION
}

impl Default for Settings {
	fn default() -> Self {
		Self {
			schema: SETTINGS_SCHEMA_VERSION,
			hostname: None,
			port: None,
			use_https: None,
			show_workers: None,
			icon_cache_dir: None,
		}
	}
}

/// Values supplied on the command line; `Some` wins over stored settings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Overrides {
	pub hostname: Option<String>,
	pub port: Option<u16>,
	pub use_https: Option<bool>,
	pub show_workers: Option<bool>,
	pub icon_cache_dir: Option<PathBuf>,
}

impl Overrides {
	fn touches_endpoint(&self) -> bool {
		self.hostname.is_some() || self.port.is_some() || self.use_https.is_some()
	}
}

/// Settings file together with where it was loaded from.
#[derive(Debug)]
pub struct SettingsStore {
	path: PathBuf,
	pub settings: Settings,
}

impl SettingsStore {
	pub fn load(path: PathBuf) -> Self {
		let settings = match fs::read_to_string(&path) {
			Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
				warn!(target = "cdpt", path = %path.display(), error = %e, "ignoring unreadable settings file");
				Settings::default()
			}),
			Err(_) => Settings::default(),
		};
		Self { path, settings }
	}

	/// Loads from `explicit` or the default per-user location.
	pub fn open(explicit: Option<&Path>) -> Self {
		Self::load(explicit.map(Path::to_path_buf).unwrap_or_else(default_settings_path))
	}

	pub fn path(&self) -> &Path {
		&self.path
	}

	pub fn save(&mut self) -> Result<()> {
		self.settings.schema = SETTINGS_SCHEMA_VERSION;
		if let Some(parent) = self.path.parent() {
			fs::create_dir_all(parent).map_err(|source| CliError::SettingsWrite {
				path: self.path.clone(),
				source,
			})?;
		}
		let content = serde_json::to_string_pretty(&self.settings)?;
		fs::write(&self.path, content).map_err(|source| CliError::SettingsWrite {
			path: self.path.clone(),
			source,
		})
	}

	/// Applies non-empty overrides to the stored settings.
	pub fn update(&mut self, changes: Overrides) {
		let s = &mut self.settings;
		if changes.hostname.is_some() {
			s.hostname = changes.hostname;
		}
		if changes.port.is_some() {
			s.port = changes.port;
		}
		if changes.use_https.is_some() {
			s.use_https = changes.use_https;
		}
		if changes.show_workers.is_some() {
			s.show_workers = changes.show_workers;
		}
		if changes.icon_cache_dir.is_some() {
			s.icon_cache_dir = changes.icon_cache_dir;
		}
	}

	/// Builds the discovery configuration: flags, then stored settings, then defaults.
	pub fn resolve(&self, overrides: &Overrides) -> (DiscoveryConfig, EffectiveConfig) {
		let s = &self.settings;
		let icon_cache_dir = overrides
			.icon_cache_dir
			.clone()
			.or_else(|| s.icon_cache_dir.clone())
			.unwrap_or_else(default_icon_cache_dir);

		let mut config = DiscoveryConfig::new(icon_cache_dir);
		if let Some(hostname) = overrides.hostname.clone().or_else(|| s.hostname.clone()) {
			config = config.hostname(hostname);
		}
		if let Some(port) = overrides.port.or(s.port) {
			config = config.port(port);
		}
		config = config
			.use_https(overrides.use_https.or(s.use_https).unwrap_or(false))
			.show_workers(overrides.show_workers.or(s.show_workers).unwrap_or(false));

		let endpoint_source = if overrides.touches_endpoint() {
			SettingSource::CliFlag
		} else if s.hostname.is_some() || s.port.is_some() || s.use_https.is_some() {
			SettingSource::Settings
		} else {
			SettingSource::Default
		};

		let effective = EffectiveConfig {
			endpoint: config.list_url(),
			endpoint_source,
			show_workers: config.show_workers,
			icon_cache_dir: config.icon_cache_dir.clone(),
		};
		(config, effective)
	}
}

pub fn default_settings_path() -> PathBuf {
	dirs::config_dir()
		.unwrap_or_else(std::env::temp_dir)
		.join(APP_DIR)
		.join("config.json")
}

pub fn default_icon_cache_dir() -> PathBuf {
	dirs::cache_dir()
		.unwrap_or_else(std::env::temp_dir)
		.join(APP_DIR)
		.join("favicons")
}
