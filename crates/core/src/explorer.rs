//! Presentation-facing target tree.
//!
//! Hosts pull the current snapshot with [`TargetExplorer::targets`] or walk it
//! as [`TargetNode`]s, call [`TargetExplorer::refresh`] to rebuild it, and
//! subscribe to [`TargetsChanged`] notifications instead of being called back.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;
use tokio::sync::{Mutex, broadcast};
use tracing::{info, warn};

use crate::cache::{ClearSummary, IconCache};
use crate::config::DiscoveryConfig;
use crate::discovery::TargetDiscoveryService;
use crate::error::Result;
use crate::reporter::DiscoveryEvent;
use crate::target::{DiscoveredTarget, TargetNode};

const CHANGE_CHANNEL_CAPACITY: usize = 16;

/// Sent after every refresh, and returned by [`TargetExplorer::refresh`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetsChanged {
	/// Monotonic refresh counter, starting at 1.
	pub generation: u64,
	/// The snapshot this refresh produced.
	pub targets: Arc<Vec<DiscoveredTarget>>,
	/// Whether the new snapshot differs from the previous one.
	pub content_changed: bool,
	/// Outcome of the cache clear that preceded discovery; `None` when it
	/// failed and was reported.
	pub icons_cleared: Option<ClearSummary>,
}

impl TargetsChanged {
	pub fn count(&self) -> usize {
		self.targets.len()
	}
}

pub struct TargetExplorer {
	service: TargetDiscoveryService,
	cache: IconCache,
	snapshot: RwLock<Arc<Vec<DiscoveredTarget>>>,
	generation: AtomicU64,
	changes: broadcast::Sender<TargetsChanged>,
	/// Serializes cache clears with discovery passes.
	refresh_lock: Mutex<()>,
}

impl TargetExplorer {
	pub fn new(service: TargetDiscoveryService) -> Self {
		let config = service.config();
		let cache = IconCache::new(&config.icon_cache_dir, config.sentinel.clone());
		let (changes, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
		Self {
			service,
			cache,
			snapshot: RwLock::new(Arc::new(Vec::new())),
			generation: AtomicU64::new(0),
			changes,
			refresh_lock: Mutex::new(()),
		}
	}

	pub fn from_config(config: DiscoveryConfig) -> Result<Self> {
		Ok(Self::new(TargetDiscoveryService::new(config)?))
	}

	pub fn service(&self) -> &TargetDiscoveryService {
		&self.service
	}

	pub fn cache(&self) -> &IconCache {
		&self.cache
	}

	pub fn subscribe(&self) -> broadcast::Receiver<TargetsChanged> {
		self.changes.subscribe()
	}

	/// Latest ordered snapshot; empty until the first refresh.
	pub fn targets(&self) -> Arc<Vec<DiscoveredTarget>> {
		self.snapshot.read().clone()
	}

	pub fn generation(&self) -> u64 {
		self.generation.load(Ordering::Acquire)
	}

	/// Top-level tree rows in presentation order.
	pub fn roots(&self) -> Vec<TargetNode> {
		self.targets().iter().cloned().map(TargetNode::Target).collect()
	}

	pub fn children(&self, node: &TargetNode) -> Vec<TargetNode> {
		node.children()
	}

	/// Clears the icon cache, then rebuilds the snapshot and notifies
	/// subscribers. Never fails: listing problems yield an empty snapshot and
	/// cache problems are reported as warnings.
	pub async fn refresh(&self) -> TargetsChanged {
		let _guard = self.refresh_lock.lock().await;

		let icons_cleared = self.clear_cache().await;
		if let Err(e) = self.cache.ensure().await {
			warn!(target = "cdpt", dir = %self.cache.dir().display(), error = %e, "failed to provision icon cache");
		}

		let targets = Arc::new(self.service.targets().await);
		let content_changed = {
			let mut snapshot = self.snapshot.write();
			let changed = **snapshot != *targets;
			*snapshot = targets.clone();
			changed
		};
		let generation = self.generation.fetch_add(1, Ordering::AcqRel) + 1;

		info!(target = "cdpt", generation, count = targets.len(), content_changed, "targets refreshed");
		let change = TargetsChanged {
			generation,
			targets,
			content_changed,
			icons_cleared,
		};
		// No subscribers is fine.
		let _ = self.changes.send(change.clone());
		change
	}

	/// Clears the icon cache outside of a refresh.
	pub async fn clear_icons(&self) -> Option<ClearSummary> {
		let _guard = self.refresh_lock.lock().await;
		self.clear_cache().await
	}

	async fn clear_cache(&self) -> Option<ClearSummary> {
		match self.cache.clear().await {
			Ok(summary) => Some(summary),
			Err(e) => {
				self.service.reporter().report(DiscoveryEvent::CacheClearFailure {
					failed: e.failed_count(),
					message: e.to_string(),
				});
				None
			}
		}
	}
}
