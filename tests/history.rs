//! Tests for one-shot history reconstruction

mod test_utils;

use panebridge::data::{HistoryItem, Provider};
use panebridge::error::BridgeError;
use panebridge::history;
use panebridge::logs::LogLocator;
use serde_json::json;
use test_utils::{codex_legacy_line, codex_noise_line, codex_reply_line, gemini_session, TestHome};

fn rendered(items: &[HistoryItem]) -> Vec<String> {
    items.iter().map(|i| i.to_string()).collect()
}

mod append_only_history {
    use super::*;
    use pretty_assertions::assert_eq;

    fn codex_home() -> TestHome {
        let home = TestHome::new();
        let log = [
            codex_noise_line(),
            codex_reply_line("one"),
            "broken line\n".to_string(),
            codex_legacy_line("  two  "),
            codex_reply_line("   "),
            codex_noise_line(),
            codex_reply_line("three"),
        ]
        .concat();
        home.write(".codex/sessions/rollout.jsonl", &log);
        home
    }

    #[test]
    fn every_reply_is_an_answer_item() {
        let home = codex_home();
        let items = history::recent(Provider::Codex, &LogLocator::new(home.path()), 10).unwrap();
        assert_eq!(rendered(&items), vec!["A: one", "A: two", "A: three"]);
    }

    #[test]
    fn returns_tail_in_chronological_order() {
        let home = codex_home();
        let items = history::recent(Provider::Codex, &LogLocator::new(home.path()), 2).unwrap();
        assert_eq!(rendered(&items), vec!["A: two", "A: three"]);
    }

    #[test]
    fn count_is_min_of_requested_and_available() {
        let home = codex_home();
        let locator = LogLocator::new(home.path());
        for n in 0..6 {
            let items = history::recent(Provider::Codex, &locator, n).unwrap();
            assert_eq!(items.len(), n.min(3), "requested {}", n);
        }
    }

    #[test]
    fn last_line_without_newline_is_read() {
        let home = TestHome::new();
        let line = codex_reply_line("unterminated");
        home.write(".codex/sessions/rollout.jsonl", line.trim_end());

        let items = history::recent(Provider::Codex, &LogLocator::new(home.path()), 1).unwrap();
        assert_eq!(items, vec![HistoryItem::answer("unterminated")]);
    }

    #[test]
    fn empty_log_yields_empty_history() {
        let home = TestHome::new();
        home.write(".codex/sessions/rollout.jsonl", "");
        let items = history::recent(Provider::Codex, &LogLocator::new(home.path()), 5).unwrap();
        assert!(items.is_empty());
    }
}

mod full_rewrite_history {
    use super::*;
    use pretty_assertions::assert_eq;

    const LOG: &str = ".gemini/tmp/hash/chats/session.json";

    #[test]
    fn pairs_questions_with_answers() {
        let home = TestHome::new();
        home.write(
            LOG,
            &gemini_session(&[
                ("user", json!("a")),
                ("gemini", json!("b")),
                ("gemini", json!("c")),
            ]),
        );

        let items = history::recent(Provider::Gemini, &LogLocator::new(home.path()), 10).unwrap();
        assert_eq!(rendered(&items), vec!["Q: a\nA: b", "A: c"]);
    }

    #[test]
    fn tail_keeps_pairs_intact() {
        let home = TestHome::new();
        home.write(
            LOG,
            &gemini_session(&[
                ("user", json!("q1")),
                ("gemini", json!("a1")),
                ("info", json!("tool call")),
                ("user", json!("q2")),
                ("model", json!("a2")),
            ]),
        );

        let items = history::recent(Provider::Gemini, &LogLocator::new(home.path()), 1).unwrap();
        assert_eq!(items, vec![HistoryItem::pair("q2", "a2")]);
    }

    #[test]
    fn zero_requested_is_empty_not_error() {
        let home = TestHome::new();
        home.write(LOG, &gemini_session(&[("user", json!("q")), ("gemini", json!("a"))]));

        let items = history::recent(Provider::Gemini, &LogLocator::new(home.path()), 0).unwrap();
        assert!(items.is_empty());
    }

    #[test]
    fn unanswered_question_produces_nothing() {
        let home = TestHome::new();
        home.write(LOG, &gemini_session(&[("user", json!("still thinking?"))]));

        let items = history::recent(Provider::Gemini, &LogLocator::new(home.path()), 3).unwrap();
        assert!(items.is_empty());
    }

    #[test]
    fn malformed_session_file_is_parse_error() {
        let home = TestHome::new();
        home.write(LOG, "{\"messages\": [");

        let err = history::recent(Provider::Gemini, &LogLocator::new(home.path()), 3).unwrap_err();
        assert!(matches!(err, BridgeError::Parse { .. }));
    }
}

mod unavailable {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn missing_logs_are_not_found() {
        let home = TestHome::new();
        let err = history::recent(Provider::Gemini, &LogLocator::new(home.path()), 1).unwrap_err();
        assert!(matches!(err, BridgeError::LogNotFound(_)));
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn claude_has_no_history() {
        let home = TestHome::new();
        let err = history::recent(Provider::Claude, &LogLocator::new(home.path()), 1).unwrap_err();
        assert!(matches!(err, BridgeError::Unsupported { .. }));
    }
}
