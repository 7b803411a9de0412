use std::path::PathBuf;

use cdpt::{DiscoveredTarget, RemoteTarget, TargetType};

use super::result_builder::write_result_text;
use super::*;

fn page(id: &str, title: &str, icon: Option<&str>) -> DiscoveredTarget {
	DiscoveredTarget::new(
		RemoteTarget {
			id: id.to_string(),
			kind: TargetType::Page,
			title: title.to_string(),
			url: format!("https://{id}.test/"),
			web_socket_debugger_url: Some(format!("ws://remote:9222/devtools/page/{id}")),
			devtools_frontend_url: None,
			description: None,
		},
		icon.map(PathBuf::from),
	)
}

fn render<T: serde::Serialize + RenderText>(result: &CommandResult<T>) -> String {
	colored::control::set_override(false);
	let mut buf = Vec::new();
	write_result_text(result, &mut buf).expect("text should render");
	String::from_utf8(buf).expect("output should be utf-8")
}

#[test]
fn envelope_is_ok_only_with_data_and_no_error() {
	let ok = ResultBuilder::new("list").data(()).build();
	assert!(ok.ok);
	assert_eq!(ok.schema_version, SCHEMA_VERSION);

	let failed = ResultBuilder::<()>::new("list").error(ErrorCode::InvalidResponse, "bad").build();
	assert!(!failed.ok);

	let empty = ResultBuilder::<()>::new("list").build();
	assert!(!empty.ok);
}

#[test]
fn targets_serialize_with_camel_case_fields() {
	let data = TargetsData::new("http://h:9222/json/list".into(), vec![page("a", "Alpha", Some("/icons/a.ico"))]);
	let result = ResultBuilder::new("list")
		.data(data)
		.warning("icons", "slow")
		.build();
	let value = serde_json::to_value(&result).expect("result should serialize");

	assert_eq!(value["ok"], true);
	assert_eq!(value["data"]["count"], 1);
	assert_eq!(value["data"]["targets"][0]["iconPath"], "/icons/a.ico");
	assert_eq!(value["data"]["targets"][0]["webSocketDebuggerUrl"], "ws://remote:9222/devtools/page/a");
	assert!(value["data"].get("expand").is_none());
	assert_eq!(value["diagnostics"][0]["level"], "warning");
	assert_eq!(value["diagnostics"][0]["source"], "icons");
}

#[test]
fn text_lists_targets_and_details_when_expanded() {
	let mut data = TargetsData::new("http://h:9222/json/list".into(), vec![page("a", "Alpha", None), page("b", "", None)]);
	data.expand = true;
	let text = render(&ResultBuilder::new("list").data(data).build());

	assert!(text.starts_with("2 target(s) at http://h:9222/json/list"));
	assert!(text.contains("Alpha"));
	assert!(text.contains("https://b.test/"), "untitled target should show its url: {text}");
	assert!(text.contains("    webSocketDebuggerUrl: ws://remote:9222/devtools/page/a"));
}

#[test]
fn text_reports_empty_listing_and_diagnostics() {
	let data = TargetsData::new("http://h:1/json/list".into(), Vec::new());
	let result = ResultBuilder::new("list")
		.data(data)
		.note(DiagnosticLevel::Warning, None, "invalid response from http://h:1/json/list: expected a JSON array")
		.build();
	let text = render(&result);

	assert!(text.contains("No targets at http://h:1/json/list"));
	assert!(text.contains("[warning] invalid response"));
}

#[test]
fn output_format_parses_case_insensitively() {
	use clap::ValueEnum;

	assert_eq!(OutputFormat::from_str("JSON", true), Ok(OutputFormat::Json));
	assert_eq!(OutputFormat::from_str("ndjson", false), Ok(OutputFormat::Ndjson));
	assert!(OutputFormat::from_str("yaml", true).is_err());
}

#[test]
fn error_codes_display_like_their_wire_names() {
	let failed = ResultBuilder::<()>::new("icons clear").error(ErrorCode::CacheError, "2 entries left").build();
	let value = serde_json::to_value(&failed).expect("result should serialize");
	assert_eq!(value["error"]["code"], ErrorCode::CacheError.to_string());
	assert!(value.get("data").is_none());
	assert!(value.get("diagnostics").is_none());
}
