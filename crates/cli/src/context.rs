//! Per-invocation state shared by command handlers.

use std::sync::Arc;

use cdpt::{DiscoveryEvent, RecordingReporter, TargetDiscoveryService, TargetExplorer};

use crate::error::Result;
use crate::output::{EffectiveConfig, OutputFormat, ResultBuilder};
use crate::settings::{Overrides, SettingsStore};

pub struct CommandContext {
	pub format: OutputFormat,
	pub settings: SettingsStore,
	pub overrides: Overrides,
}

impl CommandContext {
	pub fn new(format: OutputFormat, settings: SettingsStore, overrides: Overrides) -> Self {
		Self {
			format,
			settings,
			overrides,
		}
	}

	/// Builds an explorer whose degraded conditions are collected for output.
	pub fn explorer(&self) -> Result<Session> {
		let (config, effective) = self.settings.resolve(&self.overrides);
		let reporter = RecordingReporter::new();
		let service = TargetDiscoveryService::new(config)?.with_reporter(Arc::new(reporter.clone()));
		Ok(Session {
			explorer: TargetExplorer::new(service),
			reporter,
			effective,
		})
	}
}

/// A ready explorer plus the bookkeeping needed to report on it.
pub struct Session {
	pub explorer: TargetExplorer,
	pub reporter: RecordingReporter,
	pub effective: EffectiveConfig,
}

impl Session {
	pub fn endpoint(&self) -> String {
		self.effective.endpoint.clone()
	}

	/// Moves reported events into `builder` as warnings.
	pub fn attach_diagnostics<T: serde::Serialize>(&self, mut builder: ResultBuilder<T>) -> ResultBuilder<T> {
		for event in self.reporter.drain() {
			let source = match event {
				DiscoveryEvent::InvalidResponse { .. } => "discovery",
				DiscoveryEvent::CacheClearFailure { .. } => "icons",
			};
			builder = builder.warning(source, event.message());
		}
		builder.config(self.effective.clone())
	}
}
