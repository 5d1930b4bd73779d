//! Property-based tests for the ssh window tool.
//!
//! Uses proptest to check that the rendered window does not depend on the
//! session argument and that re-delimiting is reversible.

use proptest::prelude::*;
use serde_json::json;

use walker_mcp::transcript::{redelimit, render_window, LINE_SEPARATOR};
use walker_mcp::{build_registry, Dispatcher};
use walker_mcp_core::Arguments;

/// Invoke watch_ssh_window through the dispatcher on a fresh runtime.
fn watch(session: &str) -> String {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap();
    let dispatcher = Dispatcher::new(build_registry().unwrap().into_shared());
    let arguments = Arguments::try_from(json!({ "session": session })).unwrap();

    runtime
        .block_on(dispatcher.invoke("watch_ssh_window", arguments))
        .unwrap()
}

/// Generate a non-empty line without newlines.
fn line() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9 /\\\\_.~-]{1,24}"
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Any session value, including empty and non-ASCII, yields the same window.
    #[test]
    fn window_ignores_session(session in any::<String>()) {
        prop_assert_eq!(watch(&session), render_window());
    }

    /// Two different sessions render byte-identical output.
    #[test]
    fn window_is_idempotent(a in "[a-z0-9]{6}", b in "[a-z0-9]{0,12}") {
        prop_assert_eq!(watch(&a), watch(&b));
    }

    /// Splitting on the separator and rejoining with newlines restores text
    /// that has no blank lines.
    #[test]
    fn redelimit_roundtrip(lines in prop::collection::vec(line(), 1..40)) {
        let text = lines.join("\n");
        let restored = redelimit(&text)
            .split(LINE_SEPARATOR)
            .collect::<Vec<_>>()
            .join("\n");
        prop_assert_eq!(restored, text);
    }

    /// Blank lines never produce empty segments.
    #[test]
    fn redelimit_drops_blank_lines(text in "[ab\n]{0,60}") {
        let rendered = redelimit(&text);
        if text.split('\n').all(str::is_empty) {
            prop_assert!(rendered.is_empty());
        } else {
            prop_assert!(rendered.split(LINE_SEPARATOR).all(|segment| !segment.is_empty()));
        }
    }
}
