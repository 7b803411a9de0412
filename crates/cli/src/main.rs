use cdpt_cli::cli::Cli;
use cdpt_cli::context::CommandContext;
use cdpt_cli::output::{ResultBuilder, print_result};
use cdpt_cli::settings::SettingsStore;
use cdpt_cli::{commands, logging};
use clap::Parser;
use tracing::error;

#[tokio::main]
async fn main() {
	let cli = Cli::parse();
	logging::init_logging(cli.verbose);

	let name = cli.command.name();
	let format = cli.format;
	let ctx = CommandContext::new(format, SettingsStore::open(cli.config.as_deref()), cli.overrides());

	if let Err(err) = commands::dispatch(cli.command, ctx).await {
		error!(target = "cdpt", command = name, error = %err, "command failed");
		let result = ResultBuilder::<()>::new(name).error(err.code(), err.to_string()).build();
		print_result(&result, format);
		std::process::exit(1);
	}
}
