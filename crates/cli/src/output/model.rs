use std::fmt;
use std::path::PathBuf;

use serde::Serialize;

/// Bumped whenever a field of the envelope or a payload changes meaning.
pub const SCHEMA_VERSION: u32 = 1;

/// Envelope printed for every command, successful or not.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandResult<T: Serialize> {
	pub schema_version: u32,
	pub ok: bool,
	pub command: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub data: Option<T>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub error: Option<CommandError>,
	pub duration_ms: u64,
	#[serde(skip_serializing_if = "Vec::is_empty")]
	pub diagnostics: Vec<Diagnostic>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub config: Option<EffectiveConfig>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CommandError {
	pub code: ErrorCode,
	pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
	/// The listing endpoint was unreachable or did not return a target array.
	InvalidResponse,
	/// Cached icons could not be removed.
	CacheError,
	IoError,
	InvalidInput,
	InternalError,
}

impl ErrorCode {
	pub fn as_str(self) -> &'static str {
		match self {
			ErrorCode::InvalidResponse => "INVALID_RESPONSE",
			ErrorCode::CacheError => "CACHE_ERROR",
			ErrorCode::IoError => "IO_ERROR",
			ErrorCode::InvalidInput => "INVALID_INPUT",
			ErrorCode::InternalError => "INTERNAL_ERROR",
		}
	}
}

impl fmt::Display for ErrorCode {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// A degraded condition that did not fail the command.
#[derive(Debug, Serialize)]
pub struct Diagnostic {
	pub level: DiagnosticLevel,
	pub message: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub source: Option<&'static str>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticLevel {
	Info,
	Warning,
}

/// Where the endpoint in [`EffectiveConfig`] came from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SettingSource {
	CliFlag,
	Settings,
	#[default]
	Default,
}

/// The resolved discovery settings a command ran with.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EffectiveConfig {
	pub endpoint: String,
	pub endpoint_source: SettingSource,
	pub show_workers: bool,
	pub icon_cache_dir: PathBuf,
}
