//! Best-effort favicon enrichment for page-like targets.
//!
//! Every attempt is raced against a short timer so a single slow site cannot
//! stall a discovery pass. The losing download is detached rather than
//! cancelled: it may still finish and leave its file in the cache directory
//! after its result has been discarded.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use tokio::io::AsyncWriteExt;
use tokio::task::JoinHandle;
use tracing::{debug, trace};
use url::{Host, Url};

use crate::error::{DiscoveryError, IconFetchError, Result};

/// Upper bound for detached downloads that lost the race.
const DETACHED_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

static PARTIAL_SEQ: AtomicU64 = AtomicU64::new(0);

/// Anything that can resolve a page URL to a local icon file.
#[async_trait]
pub trait IconSource: Send + Sync {
	async fn icon_for(&self, page_url: &str) -> Option<PathBuf>;
}

/// Icon address and cache file name derived from a page URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FaviconRequest {
	pub icon_url: String,
	/// Site discriminator, also used as the cache file stem.
	pub label: String,
}

impl FaviconRequest {
	pub fn new(icon_url: impl Into<String>, label: impl Into<String>) -> Self {
		Self {
			icon_url: icon_url.into(),
			label: sanitize_label(&label.into()),
		}
	}

	/// Derives `https://{host}/favicon.ico` for an `https` page.
	///
	/// Returns `None` for any other scheme or a URL without a host.
	pub fn from_page_url(page_url: &str) -> Option<Self> {
		let url = Url::parse(page_url).ok()?;
		if url.scheme() != "https" {
			return None;
		}
		let label = site_label(&url)?;

		let mut icon_url = url;
		icon_url.set_path("/favicon.ico");
		icon_url.set_query(None);
		icon_url.set_fragment(None);
		// Credentials never belong on a third-party asset fetch.
		let _ = icon_url.set_username("");
		let _ = icon_url.set_password(None);

		Some(Self::new(icon_url.to_string(), label))
	}

	pub fn file_name(&self) -> String {
		format!("{}.ico", self.label)
	}
}

/// Second-level domain label (`docs.github.com` -> `github`), or the whole
/// host for single-label names and IP literals.
fn site_label(url: &Url) -> Option<String> {
	match url.host()? {
		Host::Domain(domain) => {
			let labels: Vec<&str> = domain.split('.').filter(|label| !label.is_empty()).collect();
			match labels.len() {
				0 => None,
				1 => Some(labels[0].to_string()),
				n => Some(labels[n - 2].to_string()),
			}
		}
		Host::Ipv4(addr) => Some(addr.to_string()),
		Host::Ipv6(addr) => Some(addr.to_string()),
	}
}

fn sanitize_label(label: &str) -> String {
	let cleaned: String = label
		.chars()
		.map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c.to_ascii_lowercase() } else { '_' })
		.collect();
	if cleaned.is_empty() { "site".to_string() } else { cleaned }
}

/// Whether a `Content-Type` header value denotes an icon or other image.
pub fn is_icon_content_type(value: &str) -> bool {
	let mime = value.split(';').next().unwrap_or_default().trim().to_ascii_lowercase();
	mime.contains("icon") || mime.starts_with("image/")
}

/// Downloads favicons into the icon cache directory.
#[derive(Debug, Clone)]
pub struct IconFetcher {
	client: reqwest::Client,
	dir: PathBuf,
	timeout: Duration,
}

impl IconFetcher {
	pub fn new(dir: impl Into<PathBuf>, timeout: Duration) -> Result<Self> {
		let client = reqwest::Client::builder()
			.timeout(DETACHED_REQUEST_TIMEOUT)
			.build()
			.map_err(|e| DiscoveryError::Client(e.to_string()))?;
		Ok(Self::with_client(client, dir, timeout))
	}

	pub fn with_client(client: reqwest::Client, dir: impl Into<PathBuf>, timeout: Duration) -> Self {
		let dir = dir.into();
		let dir = std::path::absolute(&dir).unwrap_or(dir);
		Self { client, dir, timeout }
	}

	pub fn dir(&self) -> &Path {
		&self.dir
	}

	/// Resolves a page URL to a cached icon, or `None` on any failure.
	///
	/// Non-`https` pages return immediately without touching the network.
	pub async fn fetch(&self, page_url: &str) -> Option<PathBuf> {
		let Some(request) = FaviconRequest::from_page_url(page_url) else {
			trace!(target = "cdpt", page_url, "skipping icon for non-https page");
			return None;
		};
		self.fetch_request(request).await
	}

	/// Runs one download for an already derived request under the time budget.
	pub async fn fetch_request(&self, request: FaviconRequest) -> Option<PathBuf> {
		let icon_url = request.icon_url.clone();
		let client = self.client.clone();
		let dir = self.dir.clone();
		let download = tokio::spawn(async move { download(&client, &request, &dir).await });

		match race(download, self.timeout).await {
			Ok(path) => {
				debug!(target = "cdpt", icon_url = %icon_url, path = %path.display(), "icon cached");
				Some(path)
			}
			Err(e) => {
				debug!(target = "cdpt", icon_url = %icon_url, error = %e, "no icon");
				None
			}
		}
	}
}

#[async_trait]
impl IconSource for IconFetcher {
	async fn icon_for(&self, page_url: &str) -> Option<PathBuf> {
		self.fetch(page_url).await
	}
}

/// First of the download task and the timer wins. Dropping the losing
/// `JoinHandle` detaches the task instead of aborting it.
async fn race(download: JoinHandle<std::result::Result<PathBuf, IconFetchError>>, budget: Duration) -> std::result::Result<PathBuf, IconFetchError> {
	tokio::select! {
		joined = download => joined?,
		_ = tokio::time::sleep(budget) => Err(IconFetchError::Timeout(budget.as_millis())),
	}
}

async fn download(client: &reqwest::Client, request: &FaviconRequest, dir: &Path) -> std::result::Result<PathBuf, IconFetchError> {
	let mut response = client.get(&request.icon_url).send().await?;
	if !response.status().is_success() {
		return Err(IconFetchError::Status(response.status()));
	}

	let content_type = response
		.headers()
		.get(CONTENT_TYPE)
		.and_then(|value| value.to_str().ok())
		.map(str::to_string);
	if !content_type.as_deref().is_some_and(is_icon_content_type) {
		return Err(IconFetchError::NotAnIcon(content_type));
	}

	let file_name = request.file_name();
	let destination = dir.join(&file_name);
	let partial = dir.join(format!(
		"{}.{}-{}.part",
		file_name,
		std::process::id(),
		PARTIAL_SEQ.fetch_add(1, Ordering::Relaxed)
	));

	let written = match write_body(&mut response, &partial).await {
		Ok(0) => {
			let _ = tokio::fs::remove_file(&partial).await;
			return Err(IconFetchError::Empty);
		}
		Ok(written) => written,
		Err(e) => {
			let _ = tokio::fs::remove_file(&partial).await;
			return Err(e);
		}
	};

	// Concurrent fetches for the same site each publish a complete file.
	if let Err(e) = tokio::fs::rename(&partial, &destination).await {
		let _ = tokio::fs::remove_file(&partial).await;
		return Err(e.into());
	}
	trace!(target = "cdpt", path = %destination.display(), bytes = written, "icon written");
	Ok(destination)
}

async fn write_body(response: &mut reqwest::Response, path: &Path) -> std::result::Result<u64, IconFetchError> {
	let mut file = tokio::fs::File::create(path).await?;
	let mut written = 0u64;
	while let Some(chunk) = response.chunk().await? {
		file.write_all(&chunk).await?;
		written += chunk.len() as u64;
	}
	file.flush().await?;
	Ok(written)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn derives_favicon_from_second_level_label() {
		let request = FaviconRequest::from_page_url("https://docs.github.com/en/get-started?x=1#top").expect("https page should derive");
		assert_eq!(request.icon_url, "https://docs.github.com/favicon.ico");
		assert_eq!(request.label, "github");
		assert_eq!(request.file_name(), "github.ico");
	}

	#[test]
	fn keeps_explicit_port_and_drops_credentials() {
		let request = FaviconRequest::from_page_url("https://user:pw@intranet:8443/app").expect("https page should derive");
		assert_eq!(request.icon_url, "https://intranet:8443/favicon.ico");
		assert_eq!(request.label, "intranet");
	}

	#[test]
	fn ip_hosts_use_whole_address() {
		let request = FaviconRequest::from_page_url("https://10.1.2.3/").expect("ip page should derive");
		assert_eq!(request.label, "10_1_2_3");
	}

	#[test]
	fn only_https_pages_are_eligible() {
		assert!(FaviconRequest::from_page_url("http://example.com/").is_none());
		assert!(FaviconRequest::from_page_url("chrome://newtab/").is_none());
		assert!(FaviconRequest::from_page_url("about:blank").is_none());
		assert!(FaviconRequest::from_page_url("not a url").is_none());
	}

	#[test]
	fn content_type_detection() {
		assert!(is_icon_content_type("image/x-icon"));
		assert!(is_icon_content_type("image/vnd.microsoft.icon"));
		assert!(is_icon_content_type("Image/PNG; charset=binary"));
		assert!(!is_icon_content_type("text/html; charset=utf-8"));
		assert!(!is_icon_content_type("application/json"));
	}

	#[tokio::test]
	async fn non_https_fetch_resolves_to_none_without_io() {
		let tmp = tempfile::TempDir::new().expect("temp dir should be created");
		let fetcher = IconFetcher::new(tmp.path(), Duration::from_millis(50)).expect("fetcher should build");
		assert!(fetcher.fetch("http://127.0.0.1:1/").await.is_none());
		assert_eq!(std::fs::read_dir(tmp.path()).expect("dir should be readable").count(), 0);
	}
}
