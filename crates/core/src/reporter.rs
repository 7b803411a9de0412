//! Observability hook for failures that degrade instead of propagating.

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::warn;

/// A degraded-but-survivable condition noticed during a refresh.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiscoveryEvent {
	/// The listing could not be used; the pass produced no targets.
	InvalidResponse { endpoint: String, reason: String },
	/// Some cached icons could not be deleted before discovery.
	CacheClearFailure { failed: usize, message: String },
}

impl DiscoveryEvent {
	pub fn name(&self) -> &'static str {
		match self {
			DiscoveryEvent::InvalidResponse { .. } => "invalid_response",
			DiscoveryEvent::CacheClearFailure { .. } => "cache_clear_failure",
		}
	}

	pub fn message(&self) -> String {
		match self {
			DiscoveryEvent::InvalidResponse { endpoint, reason } => format!("invalid response from {endpoint}: {reason}"),
			DiscoveryEvent::CacheClearFailure { message, .. } => message.clone(),
		}
	}
}

pub trait DiscoveryReporter: Send + Sync {
	fn report(&self, event: DiscoveryEvent);
}

/// Logs every event as a warning.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingReporter;

impl DiscoveryReporter for TracingReporter {
	fn report(&self, event: DiscoveryEvent) {
		warn!(target = "cdpt", event = event.name(), "{}", event.message());
	}
}

/// Keeps reported events in memory, logging them as they arrive.
#[derive(Debug, Default, Clone)]
pub struct RecordingReporter {
	events: Arc<Mutex<Vec<DiscoveryEvent>>>,
}

impl RecordingReporter {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn events(&self) -> Vec<DiscoveryEvent> {
		self.events.lock().clone()
	}

	/// Returns and forgets everything recorded so far.
	pub fn drain(&self) -> Vec<DiscoveryEvent> {
		std::mem::take(&mut *self.events.lock())
	}
}

impl DiscoveryReporter for RecordingReporter {
	fn report(&self, event: DiscoveryEvent) {
		TracingReporter.report(event.clone());
		self.events.lock().push(event);
	}
}
