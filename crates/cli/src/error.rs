use std::path::PathBuf;

use thiserror::Error;

use crate::output::ErrorCode;

#[derive(Debug, Error)]
pub enum CliError {
	#[error(transparent)]
	Discovery(#[from] cdpt::DiscoveryError),

	#[error(transparent)]
	CacheClear(#[from] cdpt::CacheClearError),

	#[error("failed to write settings to {}: {source}", path.display())]
	SettingsWrite {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("invalid input: {0}")]
	InvalidInput(String),

	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),

	#[error("JSON error: {0}")]
	Json(#[from] serde_json::Error),
}

impl CliError {
	pub fn code(&self) -> ErrorCode {
		match self {
			CliError::Discovery(cdpt::DiscoveryError::InvalidResponse { .. }) => ErrorCode::InvalidResponse,
			CliError::Discovery(cdpt::DiscoveryError::Config(_)) | CliError::InvalidInput(_) => ErrorCode::InvalidInput,
			CliError::Discovery(_) | CliError::Json(_) => ErrorCode::InternalError,
			CliError::CacheClear(_) => ErrorCode::CacheError,
			CliError::SettingsWrite { .. } | CliError::Io(_) => ErrorCode::IoError,
		}
	}
}

pub type Result<T> = std::result::Result<T, CliError>;
