use std::time::Instant;

use tracing::info;

use crate::context::CommandContext;
use crate::error::Result;
use crate::output::{ClearData, ResultBuilder, print_result};

/// Deletes cached icons; unlike `refresh`, any entry left behind is an error.
pub async fn clear(ctx: &CommandContext) -> Result<()> {
	let started = Instant::now();
	let session = ctx.explorer()?;
	let cache = session.explorer.cache();
	let summary = cache.clear().await?;
	info!(target = "cdpt", dir = %cache.dir().display(), removed = summary.removed, "icon cache cleared");

	let data = ClearData {
		dir: cache.dir().to_path_buf(),
		removed: summary.removed,
	};
	let builder = ResultBuilder::new("icons clear").started_at(started).data(data);
	print_result(&session.attach_diagnostics(builder).build(), ctx.format);
	Ok(())
}
