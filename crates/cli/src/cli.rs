use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::output::OutputFormat;
use crate::settings::Overrides;

#[derive(Parser, Debug)]
#[command(name = "cdpt")]
#[command(about = "Explore debuggable targets behind a Chrome DevTools endpoint")]
#[command(version)]
pub struct Cli {
	/// Increase verbosity (-v info, -vv debug)
	#[arg(short, long, global = true, action = clap::ArgAction::Count)]
	pub verbose: u8,

	/// Output format
	#[arg(short, long, global = true, value_enum, default_value_t = OutputFormat::Text)]
	pub format: OutputFormat,

	/// Settings file (defaults to the per-user config directory)
	#[arg(long, global = true, value_name = "FILE")]
	pub config: Option<PathBuf>,

	/// Remote debugging host
	#[arg(long, global = true, value_name = "HOST")]
	pub host: Option<String>,

	/// Remote debugging port
	#[arg(long, global = true)]
	pub port: Option<u16>,

	/// Use https for the listing endpoint and wss for debugger addresses
	#[arg(long, global = true, num_args = 0..=1, default_missing_value = "true", value_name = "BOOL")]
	pub https: Option<bool>,

	/// Include service and shared workers
	#[arg(long, global = true, num_args = 0..=1, default_missing_value = "true", value_name = "BOOL")]
	pub show_workers: Option<bool>,

	/// Directory for downloaded site icons
	#[arg(long, global = true, value_name = "DIR")]
	pub icon_dir: Option<PathBuf>,

	#[command(subcommand)]
	pub command: Commands,
}

impl Cli {
	pub fn overrides(&self) -> Overrides {
		Overrides {
			hostname: self.host.clone(),
			port: self.port,
			use_https: self.https,
			show_workers: self.show_workers,
			icon_cache_dir: self.icon_dir.clone(),
		}
	}
}

#[derive(Subcommand, Debug)]
pub enum Commands {
	/// Discover targets without touching the icon cache
	#[command(alias = "ls")]
	List {
		/// Print id, type, url and websocket address under each target
		#[arg(long, short = 'x')]
		expand: bool,
		/// Fail instead of printing an empty list when the endpoint misbehaves
		#[arg(long)]
		strict: bool,
	},

	/// Clear cached icons, then discover targets
	Refresh {
		#[arg(long, short = 'x')]
		expand: bool,
	},

	/// Refresh periodically and print whenever the target set changes
	Watch {
		/// Delay between refreshes (ms)
		#[arg(long, default_value = "2000")]
		interval_ms: u64,
		/// Stop after this many refreshes
		#[arg(long)]
		count: Option<u64>,
		#[arg(long, short = 'x')]
		expand: bool,
	},

	/// Icon cache maintenance
	Icons {
		#[command(subcommand)]
		action: IconsAction,
	},

	/// Persisted settings
	Config {
		#[command(subcommand)]
		action: ConfigAction,
	},
}

impl Commands {
	pub fn name(&self) -> &'static str {
		match self {
			Commands::List { .. } => "list",
			Commands::Refresh { .. } => "refresh",
			Commands::Watch { .. } => "watch",
			Commands::Icons { action: IconsAction::Clear } => "icons clear",
			Commands::Config { action } => match action {
				ConfigAction::Show => "config show",
				ConfigAction::Set { .. } => "config set",
				ConfigAction::Unset { .. } => "config unset",
			},
		}
	}
}

#[derive(Subcommand, Debug)]
pub enum IconsAction {
	/// Delete cached icons (the sentinel file is kept)
	Clear,
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
	/// Show stored settings
	Show,
	/// Store a setting: hostname, port, useHttps, showWorkers or iconCacheDir
	Set { key: String, value: String },
	/// Remove a stored setting
	Unset { key: String },
}

#[cfg(test)]
mod tests {
	use clap::CommandFactory;

	use super::*;

	#[test]
	fn cli_definition_is_valid() {
		Cli::command().debug_assert();
	}

	#[test]
	fn bare_boolean_flags_mean_true() {
		let cli = Cli::try_parse_from(["cdpt", "--https", "--show-workers", "list"]).expect("flags should parse");
		assert_eq!(cli.https, Some(true));
		assert_eq!(cli.show_workers, Some(true));

		let cli = Cli::try_parse_from(["cdpt", "list", "--show-workers", "false"]).expect("flags should parse");
		assert_eq!(cli.show_workers, Some(false));
		assert_eq!(cli.https, None);
	}

	#[test]
	fn global_flags_become_overrides() {
		let cli = Cli::try_parse_from(["cdpt", "-f", "json", "refresh", "--host", "devbox", "--port", "9333"]).expect("flags should parse");
		assert_eq!(cli.format, OutputFormat::Json);
		let overrides = cli.overrides();
		assert_eq!(overrides.hostname.as_deref(), Some("devbox"));
		assert_eq!(overrides.port, Some(9333));
		assert_eq!(cli.command.name(), "refresh");
	}
}
