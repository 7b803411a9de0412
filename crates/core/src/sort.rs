//! Deterministic ordering of discovered targets.

use std::cmp::Ordering;

use crate::target::DiscoveredTarget;

/// Total order used for presentation: pages first, then by type name, then
/// by title (code point order). `id` and `url` break remaining ties so the
/// result never depends on listing or enrichment completion order.
pub fn compare_targets(a: &DiscoveredTarget, b: &DiscoveredTarget) -> Ordering {
	b.kind()
		.is_page()
		.cmp(&a.kind().is_page())
		.then_with(|| a.kind().as_str().cmp(b.kind().as_str()))
		.then_with(|| a.title().cmp(b.title()))
		.then_with(|| a.id().cmp(b.id()))
		.then_with(|| a.url().cmp(b.url()))
}

pub fn sort_targets(targets: &mut [DiscoveredTarget]) {
	targets.sort_by(compare_targets);
}

#[cfg(test)]
mod tests {
	use cdpt_protocol::{RemoteTarget, TargetType};

	use super::*;

	fn target(kind: &str, title: &str) -> DiscoveredTarget {
		target_with_id(kind, title, title)
	}

	fn target_with_id(kind: &str, title: &str, id: &str) -> DiscoveredTarget {
		DiscoveredTarget::new(
			RemoteTarget {
				id: id.to_string(),
				kind: TargetType::from(kind),
				title: title.to_string(),
				url: String::new(),
				web_socket_debugger_url: None,
				devtools_frontend_url: None,
				description: None,
			},
			None,
		)
	}

	fn keys(targets: &[DiscoveredTarget]) -> Vec<(String, String)> {
		targets.iter().map(|t| (t.kind().to_string(), t.title().to_string())).collect()
	}

	fn pairs(items: &[(&str, &str)]) -> Vec<(String, String)> {
		items.iter().map(|(k, t)| (k.to_string(), t.to_string())).collect()
	}

	#[test]
	fn pages_sort_before_other_types() {
		let mut targets = vec![target("other", "B"), target("page", "Z"), target("page", "A")];
		sort_targets(&mut targets);
		assert_eq!(keys(&targets), pairs(&[("page", "A"), ("page", "Z"), ("other", "B")]));
	}

	#[test]
	fn non_page_types_order_by_type_then_title() {
		let mut targets = vec![
			target("service_worker", "a"),
			target("iframe", "z"),
			target("other", "m"),
			target("iframe", "b"),
			target("page", "zz"),
		];
		sort_targets(&mut targets);
		assert_eq!(
			keys(&targets),
			pairs(&[("page", "zz"), ("iframe", "b"), ("iframe", "z"), ("other", "m"), ("service_worker", "a")])
		);
	}

	#[test]
	fn titles_compare_by_code_point() {
		let mut targets = vec![target("page", "b"), target("page", "B"), target("page", "a")];
		sort_targets(&mut targets);
		assert_eq!(keys(&targets), pairs(&[("page", "B"), ("page", "a"), ("page", "b")]));
	}

	#[test]
	fn order_is_independent_of_input_order() {
		let forward = vec![
			target_with_id("page", "same", "2"),
			target_with_id("page", "same", "1"),
			target("iframe", "x"),
		];
		let mut reversed: Vec<_> = forward.iter().rev().cloned().collect();
		let mut forward = forward;
		sort_targets(&mut forward);
		sort_targets(&mut reversed);
		assert_eq!(forward, reversed);
		assert_eq!(forward[0].id(), "1");
	}
}
