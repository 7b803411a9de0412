//! Discovery passes against a local `/json/list` fixture.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use axum::Router;
use axum::http::StatusCode;
use axum::routing::get;
use cdpt::{DiscoveryConfig, DiscoveryError, DiscoveryEvent, IconSource, RecordingReporter, TargetDiscoveryService, TargetType};
use serde_json::{Value, json};
use tempfile::TempDir;
use tokio::net::TcpListener;

async fn serve(app: Router) -> SocketAddr {
	let listener = TcpListener::bind("127.0.0.1:0").await.expect("listener should bind");
	let addr = listener.local_addr().expect("listener should have an address");
	tokio::spawn(async move {
		axum::serve(listener, app).await.expect("fixture server should run");
	});
	addr
}

/// Serves `listing` at `/json/list` and counts favicon requests.
async fn serve_listing(listing: Value) -> (SocketAddr, Arc<AtomicUsize>) {
	let favicon_hits = Arc::new(AtomicUsize::new(0));
	let hits = favicon_hits.clone();
	let app = Router::new()
		.route(
			"/json/list",
			get(move || {
				let listing = listing.clone();
				async move { axum::Json(listing) }
			}),
		)
		.route(
			"/favicon.ico",
			get(move || {
				hits.fetch_add(1, Ordering::SeqCst);
				async { StatusCode::NOT_FOUND }
			}),
		);
	(serve(app).await, favicon_hits)
}

fn entry(id: &str, kind: &str, title: &str, url: &str) -> Value {
	json!({
		"id": id,
		"type": kind,
		"title": title,
		"url": url,
		"webSocketDebuggerUrl": format!("ws://127.0.0.1:9222/devtools/{kind}/{id}"),
	})
}

fn mixed_listing(base: &str) -> Value {
	json!([
		entry("w1", "service_worker", "sw.js", &format!("{base}/sw.js")),
		entry("p2", "page", "Zeta", &format!("{base}/zeta")),
		entry("o1", "browser", "Chrome", ""),
		entry("f1", "iframe", "Ad frame", &format!("{base}/ad")),
		entry("w2", "shared_worker", "shared.js", &format!("{base}/shared.js")),
		entry("p1", "page", "Alpha", &format!("{base}/alpha")),
	])
}

fn config_for(addr: SocketAddr, icons: &TempDir) -> DiscoveryConfig {
	DiscoveryConfig::new(icons.path()).hostname("127.0.0.1").port(addr.port())
}

#[tokio::test]
async fn workers_are_hidden_unless_enabled() {
	let icons = TempDir::new().expect("temp dir should be created");
	let (addr, _) = serve_listing(mixed_listing("http://example.test")).await;

	let hidden = TargetDiscoveryService::new(config_for(addr, &icons)).expect("service should build");
	let targets = hidden.discover().await.expect("discovery should succeed");
	assert_eq!(targets.len(), 4);
	assert!(targets.iter().all(|t| !t.kind().is_worker()));

	let shown = TargetDiscoveryService::new(config_for(addr, &icons).show_workers(true)).expect("service should build");
	let targets = shown.discover().await.expect("discovery should succeed");
	assert_eq!(targets.len(), 6);
	assert_eq!(targets.iter().filter(|t| t.kind().is_worker()).count(), 2);
}

#[tokio::test]
async fn results_are_sorted_and_addresses_rewritten() {
	let icons = TempDir::new().expect("temp dir should be created");
	let (addr, _) = serve_listing(mixed_listing("http://example.test")).await;
	let service = TargetDiscoveryService::new(config_for(addr, &icons).show_workers(true)).expect("service should build");

	let targets = service.discover().await.expect("discovery should succeed");
	let order: Vec<_> = targets.iter().map(|t| (t.kind().as_str(), t.title())).collect();
	assert_eq!(
		order,
		[
			("page", "Alpha"),
			("page", "Zeta"),
			("browser", "Chrome"),
			("iframe", "Ad frame"),
			("service_worker", "sw.js"),
			("shared_worker", "shared.js"),
		]
	);

	let alpha = &targets[0];
	assert_eq!(
		alpha.web_socket_debugger_url(),
		Some(format!("ws://127.0.0.1:{}/devtools/page/p1", addr.port()).as_str())
	);
}

#[tokio::test]
async fn plain_http_pages_never_request_icons() {
	let icons = TempDir::new().expect("temp dir should be created");
	let (addr, favicon_hits) = serve_listing(Value::Null).await;
	let base = format!("http://{addr}");
	let (addr, _) = serve_listing(mixed_listing(&base)).await;
	let service = TargetDiscoveryService::new(config_for(addr, &icons)).expect("service should build");

	let targets = service.discover().await.expect("discovery should succeed");
	assert!(targets.iter().all(|t| t.icon_path().is_none()));
	assert_eq!(favicon_hits.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn object_listing_degrades_to_empty_with_one_report() {
	let icons = TempDir::new().expect("temp dir should be created");
	let (addr, _) = serve_listing(entry("p1", "page", "Alpha", "https://example.com")).await;
	let reporter = RecordingReporter::new();
	let service = TargetDiscoveryService::new(config_for(addr, &icons))
		.expect("service should build")
		.with_reporter(Arc::new(reporter.clone()));

	let err = service.discover().await.expect_err("object listing should be rejected");
	assert!(matches!(err, DiscoveryError::InvalidResponse { .. }));
	assert!(reporter.events().is_empty(), "discover itself should not report");

	let targets = service.targets().await;
	assert!(targets.is_empty());
	let events = reporter.events();
	assert_eq!(events.len(), 1);
	assert!(matches!(&events[0], DiscoveryEvent::InvalidResponse { .. }));
}

#[tokio::test]
async fn error_status_is_an_invalid_response() {
	let icons = TempDir::new().expect("temp dir should be created");
	let app = Router::new().route("/json/list", get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }));
	let addr = serve(app).await;
	let service = TargetDiscoveryService::new(config_for(addr, &icons)).expect("service should build");

	match service.discover().await {
		Err(DiscoveryError::InvalidResponse { reason, .. }) => assert!(reason.contains("500"), "reason was {reason}"),
		other => panic!("expected invalid response, got {other:?}"),
	}
}

#[tokio::test]
async fn unreachable_endpoint_is_an_invalid_response() {
	let icons = TempDir::new().expect("temp dir should be created");
	let listener = TcpListener::bind("127.0.0.1:0").await.expect("listener should bind");
	let addr = listener.local_addr().expect("listener should have an address");
	drop(listener);

	let reporter = RecordingReporter::new();
	let service = TargetDiscoveryService::new(config_for(addr, &icons))
		.expect("service should build")
		.with_reporter(Arc::new(reporter.clone()));
	assert!(service.targets().await.is_empty());
	assert_eq!(reporter.events().len(), 1);
}

/// Writes a small file per page after a fixed delay and records what it was asked for.
struct DelayedIcons {
	dir: PathBuf,
	delay: Duration,
	asked: parking_lot::Mutex<Vec<String>>,
}

#[async_trait]
impl IconSource for DelayedIcons {
	async fn icon_for(&self, page_url: &str) -> Option<PathBuf> {
		self.asked.lock().push(page_url.to_string());
		tokio::time::sleep(self.delay).await;
		let name = page_url.rsplit('/').next().unwrap_or("root");
		if name == "missing" {
			return Some(self.dir.join("does-not-exist.ico"));
		}
		let path = self.dir.join(format!("{name}.ico"));
		tokio::fs::write(&path, b"\x00\x00\x01\x00").await.ok()?;
		Some(path)
	}
}

#[tokio::test]
async fn enrichment_runs_concurrently_and_only_for_page_like_targets() {
	let icons = TempDir::new().expect("temp dir should be created");
	let listing = json!([
		entry("p1", "page", "one", "https://a.test/one"),
		entry("p2", "page", "two", "https://a.test/two"),
		entry("p3", "page", "three", "https://a.test/three"),
		entry("p4", "page", "four", "https://a.test/four"),
		entry("f1", "iframe", "frame", "https://a.test/frame"),
		entry("m1", "page", "gone", "https://a.test/missing"),
		entry("w1", "service_worker", "sw", "https://a.test/sw"),
		entry("o1", "other", "misc", "https://a.test/misc"),
	]);
	let (addr, _) = serve_listing(listing).await;

	let source = Arc::new(DelayedIcons {
		dir: icons.path().to_path_buf(),
		delay: Duration::from_millis(400),
		asked: parking_lot::Mutex::new(Vec::new()),
	});
	let service = TargetDiscoveryService::new(config_for(addr, &icons).show_workers(true))
		.expect("service should build")
		.with_icon_source(source.clone());

	let started = Instant::now();
	let targets = service.discover().await.expect("discovery should succeed");
	let elapsed = started.elapsed();

	// Six enrichments at 400ms each would take 2.4s if run one after another.
	assert!(elapsed < Duration::from_millis(1500), "discovery took {elapsed:?}");
	assert_eq!(targets.len(), 8);
	assert_eq!(source.asked.lock().len(), 6);

	for target in &targets {
		let expect_icon = target.kind().wants_icon() && target.id() != "m1";
		assert_eq!(target.icon_path().is_some(), expect_icon, "target {}", target.id());
		if let Some(path) = target.icon_path() {
			assert!(path.is_file());
		}
	}
	assert_eq!(targets.iter().filter(|t| *t.kind() == TargetType::Page).count(), 5);
}

#[tokio::test]
async fn repeated_passes_are_identical() {
	let icons = TempDir::new().expect("temp dir should be created");
	let (addr, _) = serve_listing(mixed_listing("http://example.test")).await;
	let service = TargetDiscoveryService::new(config_for(addr, &icons).show_workers(true)).expect("service should build");

	let first = service.discover().await.expect("first pass should succeed");
	let second = service.discover().await.expect("second pass should succeed");
	assert_eq!(first, second);
}
