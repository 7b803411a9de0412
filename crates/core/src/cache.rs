//! Icon cache directory maintenance.
//!
//! Downloaded favicons are transient: every refresh wipes the directory
//! before discovery runs again. A sentinel file (by default `.gitkeep`) is
//! never touched so the directory survives in source control and on first run.

use std::future::Future;
use std::io;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{CacheClearError, CacheEntryFailure};

/// Outcome of a successful clear.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClearSummary {
	pub removed: usize,
}

/// Handle on the directory that holds downloaded icons.
#[derive(Debug, Clone)]
pub struct IconCache {
	dir: PathBuf,
	sentinel: String,
}

impl IconCache {
	pub fn new(dir: impl Into<PathBuf>, sentinel: impl Into<String>) -> Self {
		Self {
			dir: dir.into(),
			sentinel: sentinel.into(),
		}
	}

	pub fn dir(&self) -> &Path {
		&self.dir
	}

	pub fn sentinel_path(&self) -> PathBuf {
		self.dir.join(&self.sentinel)
	}

	/// Creates the directory and its sentinel if either is missing.
	pub async fn ensure(&self) -> io::Result<()> {
		tokio::fs::create_dir_all(&self.dir).await?;
		let sentinel = self.sentinel_path();
		if !tokio::fs::try_exists(&sentinel).await? {
			tokio::fs::write(&sentinel, b"").await?;
		}
		Ok(())
	}

	/// Deletes every regular file except the sentinel.
	///
	/// Deletion is best-effort: a failure on one file does not stop the others,
	/// and all failures are returned together. A missing directory counts as
	/// already clear.
	pub async fn clear(&self) -> Result<ClearSummary, CacheClearError> {
		self.clear_with(|path| async move { tokio::fs::remove_file(path).await }).await
	}

	/// [`clear`](Self::clear) with the per-entry removal supplied by the caller.
	async fn clear_with<F, Fut>(&self, remove: F) -> Result<ClearSummary, CacheClearError>
	where
		F: Fn(PathBuf) -> Fut,
		Fut: Future<Output = io::Result<()>>,
	{
		let mut entries = match tokio::fs::read_dir(&self.dir).await {
			Ok(entries) => entries,
			Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(ClearSummary::default()),
			Err(source) => {
				return Err(CacheClearError::ReadDir {
					dir: self.dir.clone(),
					source,
				});
			}
		};

		let mut attempted = 0;
		let mut removed = 0;
		let mut failures = Vec::new();

		loop {
			let entry = match entries.next_entry().await {
				Ok(Some(entry)) => entry,
				Ok(None) => break,
				Err(source) => {
					return Err(CacheClearError::ReadDir {
						dir: self.dir.clone(),
						source,
					});
				}
			};

			if entry.file_name().to_str() == Some(self.sentinel.as_str()) {
				continue;
			}
			match entry.file_type().await {
				Ok(kind) if kind.is_dir() => continue,
				_ => {}
			}

			attempted += 1;
			let path = entry.path();
			match remove(path.clone()).await {
				Ok(()) => removed += 1,
				// Raced with another remover; the file is gone either way.
				Err(e) if e.kind() == io::ErrorKind::NotFound => removed += 1,
				Err(error) => failures.push(CacheEntryFailure { path, error }),
			}
		}

		debug!(target = "cdpt", dir = %self.dir.display(), removed, failed = failures.len(), "cleared icon cache");

		if failures.is_empty() {
			Ok(ClearSummary { removed })
		} else {
			Err(CacheClearError::Partial {
				attempted,
				removed,
				failures,
			})
		}
	}
}
