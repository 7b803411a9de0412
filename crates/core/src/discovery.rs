//! Target discovery: listing, normalization, filtering and icon enrichment.
//!
//! A pass fetches `/json/list` once, keeps the entries the configuration
//! allows, rewrites their debugger addresses to point at the configured
//! remote, enriches page-like targets with icons concurrently and joins on all
//! of them before sorting. Nothing is emitted before every target settles.

use std::sync::Arc;

use cdpt_protocol::{RemoteTarget, TargetType};
use futures_util::future::join_all;
use serde_json::Value;
use tracing::{debug, warn};
use url::Url;

use crate::config::DiscoveryConfig;
use crate::error::{DiscoveryError, Result};
use crate::icons::{IconFetcher, IconSource};
use crate::reporter::{DiscoveryEvent, DiscoveryReporter, TracingReporter};
use crate::sort::sort_targets;
use crate::target::DiscoveredTarget;

/// Host names the remote reports for itself when bound to loopback.
const LOOPBACK_HOSTS: [&str; 4] = ["localhost", "127.0.0.1", "[::1]", "0.0.0.0"];

/// Inclusion rule: workers only when asked for, everything else always.
pub fn is_included(kind: &TargetType, show_workers: bool) -> bool {
	show_workers || !kind.is_worker()
}

/// Points a loopback `webSocketDebuggerUrl` at the configured remote.
///
/// Addresses naming a non-loopback host, or that do not parse, are returned
/// unchanged. With TLS enabled `ws` is upgraded to `wss`.
pub fn rewrite_debugger_address(address: &str, config: &DiscoveryConfig) -> String {
	let Ok(mut url) = Url::parse(address) else {
		return address.to_string();
	};
	if !url.host_str().is_some_and(|host| LOOPBACK_HOSTS.contains(&host)) {
		return address.to_string();
	}
	if url.set_host(Some(&config.url_host())).is_err() || url.set_port(Some(config.port)).is_err() {
		debug!(target = "cdpt", address, host = %config.hostname, "cannot rewrite debugger address");
		return address.to_string();
	}
	if config.use_https && url.scheme() == "ws" {
		let _ = url.set_scheme("wss");
	}
	url.to_string()
}

/// Rewrites the `ws=<loopback>:<port>` parameter of a DevTools frontend URL.
pub fn rewrite_frontend_address(address: &str, config: &DiscoveryConfig) -> String {
	for host in LOOPBACK_HOSTS {
		let needle = format!("ws={host}:");
		let Some(start) = address.find(&needle) else {
			continue;
		};
		let port_start = start + needle.len();
		let port_len = address[port_start..].bytes().take_while(u8::is_ascii_digit).count();
		let param = if config.use_https { "wss" } else { "ws" };
		return format!(
			"{}{}={}{}",
			&address[..start],
			param,
			config.authority(),
			&address[port_start + port_len..]
		);
	}
	address.to_string()
}

/// Parses a listing body into targets.
///
/// Anything but a JSON array is an invalid response. Array members that are
/// not target objects are skipped.
pub fn parse_listing(body: &str, endpoint: &str) -> Result<Vec<RemoteTarget>> {
	let value: Value =
		serde_json::from_str(body).map_err(|e| DiscoveryError::invalid_response(endpoint, format!("unparsable body: {e}")))?;

	let entries = match value {
		Value::Array(entries) => entries,
		other => {
			return Err(DiscoveryError::invalid_response(
				endpoint,
				format!("expected a JSON array, got {}", json_kind(&other)),
			));
		}
	};

	let mut targets = Vec::with_capacity(entries.len());
	for (index, entry) in entries.into_iter().enumerate() {
		match serde_json::from_value::<RemoteTarget>(entry) {
			Ok(target) => targets.push(target),
			Err(e) => warn!(target = "cdpt", index, error = %e, "skipping malformed target entry"),
		}
	}
	Ok(targets)
}

fn json_kind(value: &Value) -> &'static str {
	match value {
		Value::Null => "null",
		Value::Bool(_) => "a boolean",
		Value::Number(_) => "a number",
		Value::String(_) => "a string",
		Value::Array(_) => "an array",
		Value::Object(_) => "an object",
	}
}

/// Runs discovery passes against one remote endpoint.
pub struct TargetDiscoveryService {
	config: DiscoveryConfig,
	client: reqwest::Client,
	icons: Arc<dyn IconSource>,
	reporter: Arc<dyn DiscoveryReporter>,
}

impl TargetDiscoveryService {
	pub fn new(config: DiscoveryConfig) -> Result<Self> {
		config.validate()?;
		let client = reqwest::Client::builder()
			.timeout(config.list_timeout)
			.build()
			.map_err(|e| DiscoveryError::Client(e.to_string()))?;
		let icons = IconFetcher::new(&config.icon_cache_dir, config.icon_timeout)?;

		Ok(Self {
			config,
			client,
			icons: Arc::new(icons),
			reporter: Arc::new(TracingReporter),
		})
	}

	pub fn with_icon_source(mut self, icons: Arc<dyn IconSource>) -> Self {
		self.icons = icons;
		self
	}

	pub fn with_reporter(mut self, reporter: Arc<dyn DiscoveryReporter>) -> Self {
		self.reporter = reporter;
		self
	}

	pub fn config(&self) -> &DiscoveryConfig {
		&self.config
	}

	pub fn reporter(&self) -> &Arc<dyn DiscoveryReporter> {
		&self.reporter
	}

	/// Fetches and parses the raw listing without filtering or enrichment.
	pub async fn list_remote(&self) -> Result<Vec<RemoteTarget>> {
		let endpoint = self.config.list_url();
		let response = self
			.client
			.get(&endpoint)
			.send()
			.await
			.map_err(|e| DiscoveryError::invalid_response(&endpoint, format!("endpoint unreachable: {e}")))?;

		if !response.status().is_success() {
			return Err(DiscoveryError::invalid_response(
				&endpoint,
				format!("unexpected status {}", response.status()),
			));
		}

		let body = response
			.text()
			.await
			.map_err(|e| DiscoveryError::invalid_response(&endpoint, format!("failed to read body: {e}")))?;
		parse_listing(&body, &endpoint)
	}

	/// One full pass: list, filter, normalize, enrich, sort.
	pub async fn discover(&self) -> Result<Vec<DiscoveredTarget>> {
		let listed = self.list_remote().await?;
		let listed_count = listed.len();

		let included: Vec<RemoteTarget> = listed
			.into_iter()
			.filter(|target| is_included(&target.kind, self.config.show_workers))
			.map(|target| self.normalize(target))
			.collect();

		let mut discovered = join_all(included.into_iter().map(|target| self.enrich(target))).await;
		sort_targets(&mut discovered);

		debug!(
			target = "cdpt",
			endpoint = %self.config.list_url(),
			listed = listed_count,
			discovered = discovered.len(),
			icons = discovered.iter().filter(|t| t.icon_path().is_some()).count(),
			"discovery pass complete"
		);
		Ok(discovered)
	}

	/// Like [`discover`](Self::discover), but reports failures and degrades
	/// to an empty sequence.
	pub async fn targets(&self) -> Vec<DiscoveredTarget> {
		match self.discover().await {
			Ok(targets) => targets,
			Err(DiscoveryError::InvalidResponse { endpoint, reason }) => {
				self.reporter.report(DiscoveryEvent::InvalidResponse { endpoint, reason });
				Vec::new()
			}
			Err(other) => {
				self.reporter.report(DiscoveryEvent::InvalidResponse {
					endpoint: self.config.list_url(),
					reason: other.to_string(),
				});
				Vec::new()
			}
		}
	}

	fn normalize(&self, mut target: RemoteTarget) -> RemoteTarget {
		target.web_socket_debugger_url = target
			.web_socket_debugger_url
			.map(|address| rewrite_debugger_address(&address, &self.config));
		target.devtools_frontend_url = target
			.devtools_frontend_url
			.map(|address| rewrite_frontend_address(&address, &self.config));
		target
	}

	async fn enrich(&self, target: RemoteTarget) -> DiscoveredTarget {
		let icon = if target.kind.wants_icon() {
			self.icons.icon_for(&target.url).await.filter(|path| path.is_file())
		} else {
			None
		};
		DiscoveredTarget::new(target, icon)
	}
}
