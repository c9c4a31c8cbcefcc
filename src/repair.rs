//! JSON decoding with a single repair pass.
//!
//! The generator sometimes double-escapes its quotes or pads the space before a
//! closing brace. We decode as-is first and only rewrite the text when that fails.

use lazy_static::lazy_static;
use regex::Regex;
use serde_json::Value;
use tracing::debug;

use crate::error::DecodeError;
use crate::util::trunc_for_log;

lazy_static! {
  static ref PADDED_OBJECT_CLOSE: Regex = Regex::new(r#""\s+\}"#).expect("padded object close regex");
  static ref PADDED_ARRAY_CLOSE: Regex = Regex::new(r#""\s+\]"#).expect("padded array close regex");
}

/// Rewrite known generator artifacts: a lone `\"` becomes `"`, whitespace between
/// a closing quote and `}` / `]` is removed, surrounding whitespace is trimmed.
///
/// Text that already decodes is returned unchanged, and the rewrite is idempotent.
pub fn clean_payload(text: &str) -> String {
  if serde_json::from_str::<Value>(text).is_ok() {
    return text.to_string();
  }
  let unescaped = unescape_lone_quotes(text);
  let objects = PADDED_OBJECT_CLOSE.replace_all(&unescaped, "\"}");
  let arrays = PADDED_ARRAY_CLOSE.replace_all(&objects, "\"]");
  arrays.trim().to_string()
}

/// Drop the backslash of `\"` only when it is a single backslash; longer runs
/// (`\\"`, `\\\"`) are real escapes and stay as they are.
fn unescape_lone_quotes(text: &str) -> String {
  let mut out = String::with_capacity(text.len());
  let mut backslashes = 0usize;
  for ch in text.chars() {
    if ch == '"' && backslashes == 1 {
      out.pop();
    }
    backslashes = if ch == '\\' { backslashes + 1 } else { 0 };
    out.push(ch);
  }
  out
}

/// Clean the text and decode it once more.
pub fn attempt_repair_and_reparse(text: &str) -> Result<Value, DecodeError> {
  let cleaned = clean_payload(text);
  serde_json::from_str::<Value>(&cleaned).map_err(|source| DecodeError {
    raw: text.to_string(),
    source,
  })
}

/// Direct decode, falling back to [`attempt_repair_and_reparse`].
pub fn decode_with_repair(text: &str) -> Result<Value, DecodeError> {
  match serde_json::from_str::<Value>(text) {
    Ok(v) => Ok(v),
    Err(e) => {
      debug!(target: "generation", error = %e, text = %trunc_for_log(text, 160), "Direct decode failed; repairing");
      attempt_repair_and_reparse(text)
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  #[test]
  fn clean_is_identity_on_compact_json() {
    let clean = r#"{"result":[{"id":"a","term":"T","definition":"D"}],"title":"x"}"#;
    assert_eq!(clean_payload(clean), clean);
  }

  #[test]
  fn clean_is_idempotent() {
    let samples = [
      r#"{\"a\": \"b\"   }"#,
      "[\"x\" \n ]",
      r#"  {"k": "v" }  "#,
      r#"{"nested": "[{\"id\": \"1\" }]"}"#,
    ];
    for s in samples {
      let once = clean_payload(s);
      assert_eq!(clean_payload(&once), once, "not idempotent for {s}");
    }
  }

  #[test]
  fn clean_leaves_valid_escaped_content_alone() {
    let samples = [
      r#"{"d":"He said \"hi\""}"#,
      r#"{"p":"C:\\"}"#,
      r#"{"p": "C:\\", "q": "a\\\"b" }"#,
    ];
    for s in samples {
      assert_eq!(clean_payload(s), s, "valid JSON rewritten: {s}");
      assert_eq!(clean_payload(&clean_payload(s)), clean_payload(s));
    }
  }

  #[test]
  fn clean_keeps_escaped_backslashes_in_broken_text() {
    let bad = r#"{\"k\": \"a\\\"b\" }"#;
    let once = clean_payload(bad);
    assert_eq!(once, r#"{"k": "a\\\"b"}"#);
    assert_eq!(clean_payload(&once), once);
    let v = decode_with_repair(bad).expect("repaired");
    assert_eq!(v["k"], "a\\\"b");
  }

  #[test]
  fn repairs_escaped_quotes() {
    let bad = r#"[{\"id\": \"flashcard-001\", \"term\": \"Osmosis\"}]"#;
    assert!(serde_json::from_str::<Value>(bad).is_err());
    let v = decode_with_repair(bad).expect("repaired");
    assert_eq!(v, json!([{"id": "flashcard-001", "term": "Osmosis"}]));
  }

  #[test]
  fn repairs_stray_escape_before_closer() {
    // Shape the flashcard system prompt example produces once decoded:
    // the definition ends in `\"}` instead of `"}`.
    let bad = r#"[{"id": "flashcard-001", "term": "Calvin Cycle", "definition": "Second stage of photosynthesis.\"},{"id": "flashcard-002", "term": "DNA", "definition": "Genetic material.\"}]"#;
    let v = decode_with_repair(bad).expect("repaired");
    let items = v.as_array().expect("array");
    assert_eq!(items.len(), 2);
    assert_eq!(items[1]["definition"], "Genetic material.");
  }

  #[test]
  fn repairs_padded_closers() {
    let bad = "{\\\"title\\\": \\\"Bio\\\"\n   }";
    let v = decode_with_repair(bad).expect("repaired");
    assert_eq!(v, json!({"title": "Bio"}));
  }

  #[test]
  fn valid_json_is_not_rewritten() {
    // Escaped quotes inside a valid string must survive the first attempt.
    let good = r#"{"definition": "He said \"hi\""}"#;
    let v = decode_with_repair(good).expect("decoded");
    assert_eq!(v["definition"], "He said \"hi\"");
  }

  #[test]
  fn unrecoverable_text_reports_raw_input() {
    let err = decode_with_repair("not json").unwrap_err();
    assert_eq!(err.raw, "not json");
  }
}
