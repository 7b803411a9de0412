//! Error types for discovery, icon enrichment and cache maintenance.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Failure of a whole discovery pass.
///
/// Per-target problems (icons) never surface here; only a listing that cannot
/// be used at all does.
#[derive(Debug, Error)]
pub enum DiscoveryError {
	/// The listing endpoint was unreachable, answered with a non-success status,
	/// or returned something other than a JSON array.
	#[error("invalid response from {endpoint}: {reason}")]
	InvalidResponse { endpoint: String, reason: String },

	#[error("failed to build HTTP client: {0}")]
	Client(String),

	#[error("invalid configuration: {0}")]
	Config(String),
}

impl DiscoveryError {
	pub(crate) fn invalid_response(endpoint: &str, reason: impl Into<String>) -> Self {
		DiscoveryError::InvalidResponse {
			endpoint: endpoint.to_string(),
			reason: reason.into(),
		}
	}
}

pub type Result<T> = std::result::Result<T, DiscoveryError>;

/// Reasons a favicon attempt produced no icon.
///
/// These are logged and then discarded; callers of the fetcher only ever
/// see `Option<PathBuf>`.
#[derive(Debug, Error)]
pub enum IconFetchError {
	#[error("request failed: {0}")]
	Request(#[from] reqwest::Error),

	#[error("unexpected status {0}")]
	Status(reqwest::StatusCode),

	#[error("content type {0:?} is not an icon")]
	NotAnIcon(Option<String>),

	#[error("response body was empty")]
	Empty,

	#[error("write failed: {0}")]
	Io(#[from] std::io::Error),

	#[error("timed out after {0}ms")]
	Timeout(u128),

	#[error("download task aborted: {0}")]
	Join(#[from] tokio::task::JoinError),
}

/// One file that could not be removed from the icon cache.
#[derive(Debug)]
pub struct CacheEntryFailure {
	pub path: PathBuf,
	pub error: std::io::Error,
}

impl fmt::Display for CacheEntryFailure {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}: {}", self.path.display(), self.error)
	}
}

/// Cumulative result of a best-effort cache clear that hit at least one error.
#[derive(Debug, Error)]
pub enum CacheClearError {
	#[error("failed to read icon cache directory {}: {source}", dir.display())]
	ReadDir {
		dir: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("failed to remove {} of {attempted} cached icon file(s): {}", failures.len(), join_failures(failures))]
	Partial {
		attempted: usize,
		removed: usize,
		failures: Vec<CacheEntryFailure>,
	},
}

impl CacheClearError {
	/// Number of files that were left behind.
	pub fn failed_count(&self) -> usize {
		match self {
			CacheClearError::ReadDir { .. } => 0,
			CacheClearError::Partial { failures, .. } => failures.len(),
		}
	}
}

fn join_failures(failures: &[CacheEntryFailure]) -> String {
	failures.iter().map(ToString::to_string).collect::<Vec<_>>().join("; ")
}
