use tracing_subscriber::EnvFilter;

/// Installs the stderr subscriber. `RUST_LOG` takes precedence over `-v`.
pub fn init_logging(verbosity: u8) {
	let level = match verbosity {
		0 => "warn",
		1 => "info",
		2 => "debug",
		_ => "trace",
	};
	let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(format!("warn,cdpt={level},cdpt_cli={level}")));

	let _ = tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_writer(std::io::stderr)
		.with_target(verbosity > 1)
		.try_init();
}
