// Tests for output formatting
//
// Output is captured through a shared buffer handed to
// `OutputWriter::with_writer`.

use super::*;
use serde_json::json;
use std::cell::RefCell;
use std::rc::Rc;

#[derive(Clone, Default)]
struct SharedBuffer(Rc<RefCell<Vec<u8>>>);

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl SharedBuffer {
    fn contents(&self) -> String {
        String::from_utf8(self.0.borrow().clone()).unwrap()
    }
}

fn writer(format: OutputFormat, quiet: bool) -> (OutputWriter, SharedBuffer) {
    let buffer = SharedBuffer::default();
    let writer = OutputWriter::with_writer(format, false, quiet, 0, Box::new(buffer.clone()));
    (writer, buffer)
}

fn sample_errors() -> ValidationErrors {
    let mut errors = ValidationErrors::new();
    errors.add(ValidationError::new("$.age", "value is not an integer"));
    errors.add(ValidationError::rule(
        "$.name",
        "string is too short",
        "min_length",
        "at least 2 characters",
        "1 character",
    ));
    errors
}

#[test]
fn test_validation_errors_human() {
    let formatted = OutputFormat::Human.format_validation_errors(&sample_errors()).unwrap();
    assert!(formatted.contains("❌ Validation Failed - 2 Error(s)"));
    assert!(formatted.contains("1. 📍 Path: $.age"));
    assert!(formatted.contains("💬 Message: string is too short"));
    assert!(formatted.contains("• Rule: min_length"));
    assert!(formatted.contains("Expected: at least 2 characters"));
    assert!(formatted.contains("Actual: 1 character"));
}

#[test]
fn test_validation_errors_json() {
    let formatted = OutputFormat::Json.format_validation_errors(&sample_errors()).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&formatted).unwrap();
    assert_eq!(parsed["errors"][0]["path"], "$.age");
    assert!(parsed["errors"][0].get("violations").is_none());
    assert_eq!(parsed["errors"][1]["violations"][0]["rule"], "min_length");
}

#[test]
fn test_validation_error_yaml() {
    let error = ValidationError::new("$", "expected an object");
    let formatted = OutputFormat::Yaml.format_validation_error(&error).unwrap();
    assert!(formatted.contains("path:"));
    assert!(formatted.contains("message: expected an object"));
}

#[test]
fn test_status_lines_only_in_human_format() {
    let (mut out, buffer) = writer(OutputFormat::Json, false);
    out.info("loading").unwrap();
    out.success("ok").unwrap();
    out.warning("careful").unwrap();
    out.data(&json!({"valid": true})).unwrap();
    assert_eq!(buffer.contents(), "{\"valid\":true}\n");

    let (mut out, buffer) = writer(OutputFormat::Human, false);
    out.info("loading").unwrap();
    out.warning("careful").unwrap();
    out.section("Result").unwrap();
    assert_eq!(buffer.contents(), "INFO: loading\nWARNING: careful\n\n=== Result ===\n");
}

#[test]
fn test_quiet_suppresses_chatter_but_not_data() {
    let (mut out, buffer) = writer(OutputFormat::Human, true);
    out.info("loading").unwrap();
    out.success("ok").unwrap();
    out.table(&["a"], vec![vec!["1".into()]]).unwrap();
    out.data(&json!([1])).unwrap();
    out.error("bad").unwrap();
    assert_eq!(buffer.contents(), "[\n  1\n]\nERROR: bad\n");
}

#[test]
fn test_table_alignment() {
    let (mut out, buffer) = writer(OutputFormat::Human, false);
    out.table(
        &["Field", "Type"],
        vec![
            vec!["name".into(), "StrField".into()],
            vec!["birthday".into(), "DateField".into()],
        ],
    )
    .unwrap();

    let contents = buffer.contents();
    let lines: Vec<_> = contents.lines().collect();
    assert_eq!(lines[0], "Field    │ Type     ");
    assert_eq!(lines[1], "─────────┼──────────");
    assert_eq!(lines[2], "name     │ StrField");
    assert_eq!(lines[3], "birthday │ DateField");
}

#[test]
fn test_text_is_wrapped_for_machine_formats() {
    let (mut out, buffer) = writer(OutputFormat::Json, false);
    out.text("type Query {\n}\n").unwrap();
    assert_eq!(buffer.contents(), "\"type Query {\\n}\\n\"\n");

    let (mut out, buffer) = writer(OutputFormat::Human, false);
    out.text("type Query {\n}\n").unwrap();
    assert_eq!(buffer.contents(), "type Query {\n}\n");
}
