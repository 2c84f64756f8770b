//! Parser for the structured JSON dump format.
//!
//! ```json
//! {
//!   "timestamp": "2024-01-15T10:30:00Z",
//!   "threads": [
//!     { "id": 1, "name": "main", "state": "RUNNABLE",
//!       "stack": [{ "className": "example.Main", "methodName": "main",
//!                   "fileName": "Main.java", "lineNumber": 12 }],
//!       "lockedMonitors": [{ "className": "java.lang.Object", "identity": "0x1" }],
//!       "waitingOn": null }
//!   ]
//! }
//! ```
//!
//! The document must be valid JSON with an object root. Beyond that every field is optional
//! and falls back to a default, so the document is walked as a [`Value`] rather than
//! deserialized into fixed types.

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use tdump_core::{Error, LockInfo, Result, StackFrame, ThreadDump, ThreadInfo, ThreadState};
use tracing::{debug, warn};

const UNKNOWN_FIELD: &str = "?";

pub fn parse(text: &str) -> Result<ThreadDump> {
    // Exports written by Windows tools often start with a UTF-8 byte order mark.
    let root: Value = serde_json::from_str(text.trim_start_matches('\u{feff}'))?;
    let Value::Object(root) = root else {
        return Err(Error::malformed("JSON", "document root is not an object"));
    };

    let threads: Vec<ThreadInfo> = root
        .get("threads")
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_object)
                .map(parse_thread)
                .collect()
        })
        .unwrap_or_default();
    debug!("JSON parser produced {} threads", threads.len());

    let mut dump = ThreadDump::new(parse_timestamp(root.get("timestamp")), threads);
    dump.label = string_field(&root, "label");
    dump.jvm_version = string_field(&root, "jvmVersion");
    dump.uptime_millis = root.get("uptimeMillis").and_then(Value::as_i64);
    Ok(dump)
}

fn parse_timestamp(value: Option<&Value>) -> DateTime<Utc> {
    let Some(Value::String(text)) = value else {
        return Utc::now();
    };
    match DateTime::parse_from_rfc3339(text) {
        Ok(ts) => ts.with_timezone(&Utc),
        Err(e) => {
            warn!("Unparsable dump timestamp {:?}: {}", text, e);
            Utc::now()
        }
    }
}

fn parse_thread(obj: &Map<String, Value>) -> ThreadInfo {
    let state = obj
        .get("state")
        .map(value_text)
        .map(|s| ThreadState::from_canonical_or_runnable(&s))
        .unwrap_or(ThreadState::Runnable);

    let mut thread = ThreadInfo::new(
        obj.get("id").and_then(Value::as_i64).unwrap_or(-1),
        obj.get("name")
            .map(value_text)
            .unwrap_or_else(|| "unknown".to_string()),
        state,
    );

    thread.stack = objects(obj.get("stack")).map(parse_frame).collect();
    thread.locked_monitors = objects(obj.get("lockedMonitors")).map(parse_lock).collect();
    thread.waiting_on = obj
        .get("waitingOn")
        .and_then(Value::as_object)
        .map(parse_lock);
    thread.priority = obj
        .get("priority")
        .and_then(Value::as_i64)
        .and_then(|p| i32::try_from(p).ok());
    thread.daemon = obj.get("daemon").and_then(Value::as_bool);
    thread
}

fn parse_frame(obj: &Map<String, Value>) -> StackFrame {
    StackFrame::new(
        text_or_unknown(obj, "className"),
        text_or_unknown(obj, "methodName"),
        text_or_unknown(obj, "fileName"),
        obj.get("lineNumber")
            .and_then(Value::as_i64)
            .and_then(|n| i32::try_from(n).ok())
            .unwrap_or(-1),
    )
}

fn parse_lock(obj: &Map<String, Value>) -> LockInfo {
    LockInfo::new(
        text_or_unknown(obj, "className"),
        text_or_unknown(obj, "identity"),
    )
}

/// Object elements of an optional array; anything else is skipped.
fn objects(value: Option<&Value>) -> impl Iterator<Item = &Map<String, Value>> {
    value
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(Value::as_object)
}

/// Strings verbatim, other scalars in their JSON spelling.
fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn text_or_unknown(obj: &Map<String, Value>, key: &str) -> String {
    obj.get(key)
        .map(value_text)
        .unwrap_or_else(|| UNKNOWN_FIELD.to_string())
}

fn string_field(obj: &Map<String, Value>, key: &str) -> Option<String> {
    obj.get(key).and_then(Value::as_str).map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
  "timestamp": "2024-01-15T10:30:00Z",
  "label": "prod-1",
  "jvmVersion": "17.0.9",
  "uptimeMillis": 86400000,
  "threads": [
    {
      "id": 1,
      "name": "main",
      "state": "RUNNABLE",
      "priority": 5,
      "daemon": false,
      "stack": [
        { "className": "example.Main", "methodName": "main", "fileName": "Main.java", "lineNumber": 12 }
      ],
      "lockedMonitors": [ { "className": "java.lang.Object", "identity": "0x1" } ]
    },
    {
      "id": 2,
      "name": "worker-1",
      "state": "BLOCKED",
      "stack": [],
      "waitingOn": { "className": "java.lang.Object", "identity": "0x1" }
    }
  ]
}"#;

    #[test]
    fn test_parses_sample() {
        let dump = parse(SAMPLE).unwrap();
        assert_eq!(dump.threads.len(), 2);
        assert_eq!(dump.threads[0].name, "main");
        assert_eq!(dump.threads[0].state, ThreadState::Runnable);
        assert_eq!(dump.threads[0].priority, Some(5));
        assert_eq!(dump.threads[0].daemon, Some(false));
        assert_eq!(
            dump.threads[0].stack[0].to_string(),
            "example.Main.main(Main.java:12)"
        );
        assert_eq!(
            dump.threads[1].waiting_on,
            Some(LockInfo::new("java.lang.Object", "0x1"))
        );
    }

    #[test]
    fn test_root_metadata() {
        let dump = parse(SAMPLE).unwrap();
        assert_eq!(dump.timestamp.to_rfc3339(), "2024-01-15T10:30:00+00:00");
        assert_eq!(dump.label.as_deref(), Some("prod-1"));
        assert_eq!(dump.jvm_version.as_deref(), Some("17.0.9"));
        assert_eq!(dump.uptime_millis, Some(86_400_000));
    }

    #[test]
    fn test_missing_fields_default() {
        let dump = parse(r#"{"threads":[{"stack":[{}],"lockedMonitors":[{}]}]}"#).unwrap();
        let thread = &dump.threads[0];
        assert_eq!(thread.id, -1);
        assert_eq!(thread.name, "unknown");
        assert_eq!(thread.state, ThreadState::Runnable);
        assert_eq!(thread.stack[0], StackFrame::new("?", "?", "?", -1));
        assert_eq!(thread.locked_monitors[0], LockInfo::new("?", "?"));
        assert!(thread.waiting_on.is_none());
    }

    #[test]
    fn test_unknown_state_and_bad_types_default() {
        let dump = parse(
            r#"{"timestamp":"yesterday","threads":[{"id":"seven","state":"SPINNING","stack":"nope"},42]}"#,
        )
        .unwrap();
        assert_eq!(dump.threads.len(), 1);
        assert_eq!(dump.threads[0].id, -1);
        assert_eq!(dump.threads[0].state, ThreadState::Runnable);
        assert!(dump.threads[0].stack.is_empty());
    }

    #[test]
    fn test_missing_threads_is_empty_dump() {
        let dump = parse("{}").unwrap();
        assert!(dump.threads.is_empty());
    }

    #[test]
    fn test_leading_bom_is_ignored() {
        let dump = parse("\u{feff}{\"threads\":[{\"id\":1,\"name\":\"main\"}]}").unwrap();
        assert_eq!(dump.threads.len(), 1);
        assert_eq!(dump.threads[0].name, "main");
    }

    #[test]
    fn test_malformed_json_is_error() {
        let err = parse("{\"threads\": [").unwrap_err();
        assert!(matches!(err, Error::Json(_)));
    }

    #[test]
    fn test_non_object_root_is_error() {
        let err = parse("[1, 2, 3]").unwrap_err();
        assert!(matches!(err, Error::MalformedDump { .. }));
    }
}
