//! `list`, `refresh` and `watch`.

use std::sync::Arc;
use std::time::{Duration, Instant};

use cdpt::TargetsChanged;
use tokio::sync::broadcast::error::{RecvError, TryRecvError};
use tracing::{debug, warn};

use crate::context::{CommandContext, Session};
use crate::error::Result;
use crate::output::{ResultBuilder, TargetsData, print_result};

pub async fn list(ctx: &CommandContext, expand: bool, strict: bool) -> Result<()> {
	let started = Instant::now();
	let session = ctx.explorer()?;
	let cache = session.explorer.cache();
	if let Err(e) = cache.ensure().await {
		warn!(target = "cdpt", dir = %cache.dir().display(), error = %e, "failed to provision icon cache");
	}

	let service = session.explorer.service();
	let targets = if strict { service.discover().await? } else { service.targets().await };

	let mut data = TargetsData::new(session.endpoint(), targets);
	data.expand = expand;
	let builder = ResultBuilder::new("list").started_at(started).data(data);
	print_result(&session.attach_diagnostics(builder).build(), ctx.format);
	Ok(())
}

pub async fn refresh(ctx: &CommandContext, expand: bool) -> Result<()> {
	let started = Instant::now();
	let session = ctx.explorer()?;
	let refreshed = session.explorer.refresh().await;

	let mut data = TargetsData::new(session.endpoint(), refreshed.targets.to_vec());
	data.generation = Some(refreshed.generation);
	data.icons_cleared = refreshed.icons_cleared.map(|summary| summary.removed);
	data.expand = expand;
	let builder = ResultBuilder::new("refresh").started_at(started).data(data);
	print_result(&session.attach_diagnostics(builder).build(), ctx.format);
	Ok(())
}

/// Refreshes every `interval_ms` and prints the first snapshot plus every
/// snapshot whose content differs from the previous one. Stops after `count`
/// refreshes or on Ctrl-C.
pub async fn watch(ctx: &CommandContext, interval_ms: u64, count: Option<u64>, expand: bool) -> Result<()> {
	let session = Arc::new(ctx.explorer()?);
	let mut changes = session.explorer.subscribe();

	let mut refresher = {
		let session = Arc::clone(&session);
		tokio::spawn(async move {
			let mut ticker = tokio::time::interval(Duration::from_millis(interval_ms.max(1)));
			let mut done = 0u64;
			loop {
				ticker.tick().await;
				session.explorer.refresh().await;
				done += 1;
				if count.is_some_and(|limit| done >= limit) {
					break;
				}
			}
		})
	};

	let mut printed_any = false;
	loop {
		tokio::select! {
			biased;

			_ = tokio::signal::ctrl_c() => {
				debug!(target = "cdpt", "interrupted");
				refresher.abort();
				break;
			}
			change = changes.recv() => match change {
				Ok(change) => {
					if wants_print(&change, printed_any) {
						emit(ctx, &session, &change, expand);
						printed_any = true;
					}
				}
				Err(RecvError::Lagged(skipped)) => {
					// Skipped notifications may have carried changes; resync from the next one.
					warn!(target = "cdpt", skipped, "watch fell behind");
					printed_any = false;
				}
				Err(RecvError::Closed) => break,
			},
			finished = &mut refresher => {
				if let Err(e) = finished {
					warn!(target = "cdpt", error = %e, "refresh task ended abnormally");
				}
				// Notifications sent by the last refresh may still be queued.
				loop {
					match changes.try_recv() {
						Ok(change) => {
							if wants_print(&change, printed_any) {
								emit(ctx, &session, &change, expand);
								printed_any = true;
							}
						}
						Err(TryRecvError::Lagged(_)) => printed_any = false,
						Err(TryRecvError::Empty | TryRecvError::Closed) => break,
					}
				}
				break;
			}
		}
	}
	Ok(())
}

fn wants_print(change: &TargetsChanged, printed_any: bool) -> bool {
	!printed_any || change.content_changed
}

/// Prints the snapshot carried by `change`, which may be older than the
/// explorer's current one.
fn emit(ctx: &CommandContext, session: &Session, change: &TargetsChanged, expand: bool) {
	let mut data = TargetsData::new(session.endpoint(), change.targets.to_vec());
	data.generation = Some(change.generation);
	data.expand = expand;
	let builder = ResultBuilder::new("watch").data(data);
	print_result(&session.attach_diagnostics(builder).build(), ctx.format);
}

#[cfg(test)]
mod tests {
	use super::*;

	fn change(generation: u64, content_changed: bool) -> TargetsChanged {
		TargetsChanged {
			generation,
			targets: Arc::new(Vec::new()),
			content_changed,
			icons_cleared: None,
		}
	}

	#[test]
	fn first_snapshot_always_prints_then_only_changes() {
		assert!(wants_print(&change(1, false), false));
		assert!(!wants_print(&change(2, false), true));
		assert!(wants_print(&change(3, true), true));
	}
}
