//! Target entries as reported by `GET /json/list`.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Kind of debuggable context exposed by the remote runtime.
///
/// Unknown kinds (`browser`, `worker`, `webview`, `other`, ...) are kept
/// verbatim in [`TargetType::Other`] so they can still be listed and sorted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TargetType {
	Page,
	Iframe,
	ServiceWorker,
	SharedWorker,
	Other(String),
}

impl TargetType {
	pub fn as_str(&self) -> &str {
		match self {
			TargetType::Page => "page",
			TargetType::Iframe => "iframe",
			TargetType::ServiceWorker => "service_worker",
			TargetType::SharedWorker => "shared_worker",
			TargetType::Other(kind) => kind,
		}
	}

	pub fn is_page(&self) -> bool {
		matches!(self, TargetType::Page)
	}

	/// Service and shared workers, which are hidden unless explicitly requested.
	pub fn is_worker(&self) -> bool {
		matches!(self, TargetType::ServiceWorker | TargetType::SharedWorker)
	}

	/// Whether targets of this kind get a site icon attached.
	pub fn wants_icon(&self) -> bool {
		matches!(self, TargetType::Page | TargetType::Iframe)
	}
}

impl From<String> for TargetType {
	fn from(value: String) -> Self {
		match value.as_str() {
			"page" => TargetType::Page,
			"iframe" => TargetType::Iframe,
			"service_worker" => TargetType::ServiceWorker,
			"shared_worker" => TargetType::SharedWorker,
			_ => TargetType::Other(value),
		}
	}
}

impl From<&str> for TargetType {
	fn from(value: &str) -> Self {
		TargetType::from(value.to_string())
	}
}

impl From<TargetType> for String {
	fn from(value: TargetType) -> Self {
		match value {
			TargetType::Other(kind) => kind,
			known => known.as_str().to_string(),
		}
	}
}

impl fmt::Display for TargetType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// One entry of the `/json/list` array.
///
/// Only `id` is required; Chrome omits `webSocketDebuggerUrl` while another
/// client is attached to the target, and embedders frequently leave out
/// `title` or `description`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteTarget {
	pub id: String,
	#[serde(rename = "type", default = "default_target_type")]
	pub kind: TargetType,
	#[serde(default)]
	pub title: String,
	#[serde(default)]
	pub url: String,
	#[serde(rename = "webSocketDebuggerUrl", default, skip_serializing_if = "Option::is_none")]
	pub web_socket_debugger_url: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub devtools_frontend_url: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub description: Option<String>,
}

fn default_target_type() -> TargetType {
	TargetType::Other("other".to_string())
}
