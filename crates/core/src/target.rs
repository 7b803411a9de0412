//! Normalized targets and the rows a presentation host renders for them.

use std::path::{Path, PathBuf};

use cdpt_protocol::{RemoteTarget, TargetType};
use serde::Serialize;

/// A normalized remote target plus its optional local icon.
///
/// Built once per discovery pass and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscoveredTarget {
	#[serde(flatten)]
	target: RemoteTarget,
	#[serde(skip_serializing_if = "Option::is_none")]
	icon_path: Option<PathBuf>,
}

impl DiscoveredTarget {
	pub fn new(target: RemoteTarget, icon_path: Option<PathBuf>) -> Self {
		Self { target, icon_path }
	}

	pub fn id(&self) -> &str {
		&self.target.id
	}

	pub fn kind(&self) -> &TargetType {
		&self.target.kind
	}

	pub fn title(&self) -> &str {
		&self.target.title
	}

	pub fn url(&self) -> &str {
		&self.target.url
	}

	/// Websocket address, already rewritten to the configured remote host.
	pub fn web_socket_debugger_url(&self) -> Option<&str> {
		self.target.web_socket_debugger_url.as_deref()
	}

	pub fn icon_path(&self) -> Option<&Path> {
		self.icon_path.as_deref()
	}

	pub fn remote(&self) -> &RemoteTarget {
		&self.target
	}

	/// Label shown for the target row; falls back to the URL for untitled targets.
	pub fn label(&self) -> &str {
		if self.target.title.is_empty() { &self.target.url } else { &self.target.title }
	}

	/// Synthetic child rows exposing the target's detail fields.
	pub fn details(&self) -> Vec<TargetDetail> {
		let mut rows = vec![
			TargetDetail::new("id", &self.target.id),
			TargetDetail::new("type", self.target.kind.as_str()),
			TargetDetail::new("url", &self.target.url),
		];
		if let Some(ws) = &self.target.web_socket_debugger_url {
			rows.push(TargetDetail::new("webSocketDebuggerUrl", ws));
		}
		rows
	}
}

/// A `label: value` row nested under a target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TargetDetail {
	pub label: &'static str,
	pub value: String,
}

impl TargetDetail {
	fn new(label: &'static str, value: &str) -> Self {
		Self {
			label,
			value: value.to_string(),
		}
	}
}

/// Node of the two-level tree handed to a presentation host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetNode {
	Target(DiscoveredTarget),
	Detail(TargetDetail),
}

impl TargetNode {
	pub fn label(&self) -> &str {
		match self {
			TargetNode::Target(target) => target.label(),
			TargetNode::Detail(detail) => &detail.value,
		}
	}

	/// Detail rows are leaves; targets always expand to their details.
	pub fn children(&self) -> Vec<TargetNode> {
		match self {
			TargetNode::Target(target) => target.details().into_iter().map(TargetNode::Detail).collect(),
			TargetNode::Detail(_) => Vec::new(),
		}
	}

	pub fn is_expandable(&self) -> bool {
		matches!(self, TargetNode::Target(_))
	}
}
