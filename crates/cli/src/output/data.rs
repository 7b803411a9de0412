use std::io::{self, Write};
use std::path::PathBuf;

use cdpt::{DiscoveredTarget, TargetNode};
use colored::Colorize;
use serde::Serialize;

use crate::output::RenderText;
use crate::settings::Settings;

/// Result data for `list`, `refresh` and each `watch` update.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetsData {
	pub endpoint: String,
	pub count: usize,
	pub targets: Vec<DiscoveredTarget>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub generation: Option<u64>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub icons_cleared: Option<usize>,
	/// Print the detail rows under every target in text mode.
	#[serde(skip)]
	pub expand: bool,
}

impl TargetsData {
	pub fn new(endpoint: String, targets: Vec<DiscoveredTarget>) -> Self {
		Self {
			endpoint,
			count: targets.len(),
			targets,
			generation: None,
			icons_cleared: None,
			expand: false,
		}
	}
}

impl RenderText for TargetsData {
	fn render_text(&self, out: &mut dyn Write) -> io::Result<()> {
		if self.targets.is_empty() {
			return writeln!(out, "No targets at {}", self.endpoint.dimmed());
		}

		writeln!(out, "{} target(s) at {}", self.count, self.endpoint.dimmed())?;
		for target in &self.targets {
			let kind = target.kind().as_str();
			let kind = if target.kind().is_page() { kind.green().bold() } else { kind.cyan() };
			write!(out, "{kind:<14} {}", target.label())?;
			if let Some(icon) = target.icon_path() {
				write!(out, "  {}", format!("[icon {}]", icon.display()).dimmed())?;
			}
			writeln!(out)?;

			if self.expand {
				for child in TargetNode::Target(target.clone()).children() {
					if let TargetNode::Detail(detail) = child {
						writeln!(out, "    {}: {}", detail.label.dimmed(), detail.value)?;
					}
				}
			}
		}
		Ok(())
	}
}

/// Result data for `icons clear`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClearData {
	pub dir: PathBuf,
	pub removed: usize,
}

impl RenderText for ClearData {
	fn render_text(&self, out: &mut dyn Write) -> io::Result<()> {
		writeln!(out, "Removed {} cached icon(s) from {}", self.removed, self.dir.display())
	}
}

/// Result data for `config show` and `config set`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsData {
	pub path: PathBuf,
	pub settings: Settings,
	#[serde(skip_serializing_if = "std::ops::Not::not")]
	pub saved: bool,
}

impl RenderText for SettingsData {
	fn render_text(&self, out: &mut dyn Write) -> io::Result<()> {
		let s = &self.settings;
		let unset = || "(default)".dimmed().to_string();
		writeln!(out, "{}", self.path.display().to_string().dimmed())?;
		writeln!(out, "hostname      {}", s.hostname.clone().unwrap_or_else(unset))?;
		writeln!(out, "port          {}", s.port.map(|p| p.to_string()).unwrap_or_else(unset))?;
		writeln!(out, "useHttps      {}", s.use_https.map(|b| b.to_string()).unwrap_or_else(unset))?;
		writeln!(out, "showWorkers   {}", s.show_workers.map(|b| b.to_string()).unwrap_or_else(unset))?;
		writeln!(
			out,
			"iconCacheDir  {}",
			s.icon_cache_dir.as_ref().map(|p| p.display().to_string()).unwrap_or_else(unset)
		)?;
		if self.saved {
			writeln!(out, "{}", "saved".green())?;
		}
		Ok(())
	}
}
