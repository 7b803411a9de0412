use std::io::{self, Write};
use std::time::Instant;

use colored::Colorize;
use serde::Serialize;

use crate::output::format::OutputFormat;
use crate::output::model::{CommandError, CommandResult, Diagnostic, DiagnosticLevel, EffectiveConfig, ErrorCode, SCHEMA_VERSION};

/// Human-readable rendering of a result payload.
pub trait RenderText {
	fn render_text(&self, out: &mut dyn Write) -> io::Result<()>;
}

impl RenderText for () {
	fn render_text(&self, _out: &mut dyn Write) -> io::Result<()> {
		Ok(())
	}
}

/// Accumulates the parts of a [`CommandResult`] while a command runs.
pub struct ResultBuilder<T: Serialize> {
	command: String,
	started: Instant,
	data: Option<T>,
	error: Option<CommandError>,
	diagnostics: Vec<Diagnostic>,
	config: Option<EffectiveConfig>,
}

impl<T: Serialize> ResultBuilder<T> {
	pub fn new(command: impl Into<String>) -> Self {
		Self {
			command: command.into(),
			started: Instant::now(),
			data: None,
			error: None,
			diagnostics: Vec::new(),
			config: None,
		}
	}

	/// Measures `durationMs` from `start` rather than from construction.
	pub fn started_at(self, started: Instant) -> Self {
		Self { started, ..self }
	}

	pub fn data(self, data: T) -> Self {
		Self { data: Some(data), ..self }
	}

	pub fn error(self, code: ErrorCode, message: impl Into<String>) -> Self {
		let error = CommandError {
			code,
			message: message.into(),
		};
		Self { error: Some(error), ..self }
	}

	pub fn config(self, config: EffectiveConfig) -> Self {
		Self { config: Some(config), ..self }
	}

	pub fn note(mut self, level: DiagnosticLevel, source: Option<&'static str>, message: impl Into<String>) -> Self {
		self.diagnostics.push(Diagnostic {
			level,
			message: message.into(),
			source,
		});
		self
	}

	pub fn warning(self, source: &'static str, message: impl Into<String>) -> Self {
		self.note(DiagnosticLevel::Warning, Some(source), message)
	}

	/// A result is `ok` only when it carries data and no error.
	pub fn build(self) -> CommandResult<T> {
		CommandResult {
			schema_version: SCHEMA_VERSION,
			ok: self.error.is_none() && self.data.is_some(),
			command: self.command,
			data: self.data,
			error: self.error,
			duration_ms: u64::try_from(self.started.elapsed().as_millis()).unwrap_or(u64::MAX),
			diagnostics: self.diagnostics,
			config: self.config,
		}
	}
}

/// Writes `result` to stdout. Output failures (a closed pipe) are ignored.
pub fn print_result<T: Serialize + RenderText>(result: &CommandResult<T>, format: OutputFormat) {
	let mut stdout = io::stdout().lock();
	let written = match format {
		OutputFormat::Text => write_result_text(result, &mut stdout),
		OutputFormat::Json => serde_json::to_string_pretty(result).map_err(io::Error::from).and_then(|s| writeln!(stdout, "{s}")),
		OutputFormat::Ndjson => serde_json::to_string(result).map_err(io::Error::from).and_then(|s| writeln!(stdout, "{s}")),
		OutputFormat::Toon => serde_json::to_value(result)
			.map_err(io::Error::from)
			.and_then(|value| writeln!(stdout, "{}", toon::encode(&value, None))),
	};
	let _ = written.and_then(|()| stdout.flush());
}

pub(crate) fn write_result_text<T: Serialize + RenderText>(result: &CommandResult<T>, out: &mut dyn Write) -> io::Result<()> {
	if let Some(data) = &result.data {
		data.render_text(out)?;
	}
	if let Some(error) = &result.error {
		writeln!(out, "{} [{}]: {}", "Error".red().bold(), error.code, error.message)?;
	}
	for diag in &result.diagnostics {
		let level = match diag.level {
			DiagnosticLevel::Info => "info".normal(),
			DiagnosticLevel::Warning => "warning".yellow(),
		};
		match diag.source {
			Some(source) => writeln!(out, "[{level}:{source}] {}", diag.message)?,
			None => writeln!(out, "[{level}] {}", diag.message)?,
		}
	}
	Ok(())
}
