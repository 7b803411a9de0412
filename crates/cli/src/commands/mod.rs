mod config;
mod icons;
mod targets;

use crate::cli::{Commands, ConfigAction, IconsAction};
use crate::context::CommandContext;
use crate::error::Result;

pub async fn dispatch(command: Commands, mut ctx: CommandContext) -> Result<()> {
	match command {
		Commands::List { expand, strict } => targets::list(&ctx, expand, strict).await?,
		Commands::Refresh { expand } => targets::refresh(&ctx, expand).await?,
		Commands::Watch { interval_ms, count, expand } => targets::watch(&ctx, interval_ms, count, expand).await?,
		Commands::Icons { action: IconsAction::Clear } => icons::clear(&ctx).await?,
		Commands::Config { action } => match action {
			ConfigAction::Show => config::show(&ctx)?,
			ConfigAction::Set { key, value } => config::set(&mut ctx, &key, &value)?,
			ConfigAction::Unset { key } => config::unset(&mut ctx, &key)?,
		},
	}

	Ok(())
}
