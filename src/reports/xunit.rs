//! Xunit report reader
//!
//! Understands the subset of the xunit schema nose and pytest emit:
//!
//! ```xml
//! <testsuite name="nosetests" tests="3" errors="1" failures="1" skip="1">
//!   <testcase classname="testset_story245.Story245" name="test_01_p_create" time="1.2"/>
//!   <testcase classname="..." name="..."><failure type="AssertionError" message="...">traceback</failure></testcase>
//!   <testcase classname="..." name="..."><skipped type="unittest.case.SkipTest" message="..."/></testcase>
//! </testsuite>
//! ```
//!
//! `testsuites` wrappers and nested suites are accepted; only `testcase` elements produce records.

use std::borrow::Cow;
use std::fs;
use std::path::Path;

use acceptance_core::{ConditionEntry, ReportRecord, SkipEntry};
use miette::NamedSource;
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use super::ReportError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EntryKind {
    Failure,
    Error,
}

/// Read and parse one report file.
pub fn read_file(path: &Path) -> Result<Vec<ReportRecord>, ReportError> {
    let source = fs::read_to_string(path).map_err(|source| ReportError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse(&path.display().to_string(), &source)
}

/// Parse xunit XML into records, in document order.
///
/// `name` is only used to label diagnostics.
pub fn parse(name: &str, source: &str) -> Result<Vec<ReportRecord>, ReportError> {
    // Text is not trimmed per event: a failure body split across text and CDATA must join unchanged.
    let mut reader = Reader::from_str(source);

    let parse_error = |message: String, offset: usize| ReportError::Parse {
        message,
        src: NamedSource::new(name, source.to_string()),
        at: (offset.min(source.len()), 0).into(),
    };

    let mut records = Vec::new();
    let mut record: Option<ReportRecord> = None;
    let mut entry: Option<(EntryKind, ConditionEntry)> = None;

    loop {
        let event = match reader.read_event() {
            Ok(event) => event,
            Err(e) => return Err(parse_error(e.to_string(), reader.error_position() as usize)),
        };
        let offset = reader.buffer_position() as usize;

        match event {
            Event::Start(e) => match e.name().as_ref() {
                b"testcase" => {
                    record = Some(testcase(&e).map_err(|m| parse_error(m, offset))?);
                }
                b"failure" | b"error" if record.is_some() => {
                    entry = Some(condition(&e).map_err(|m| parse_error(m, offset))?);
                }
                b"skipped" => {
                    if let Some(record) = record.as_mut() {
                        record.skipped.push(skip(&e).map_err(|m| parse_error(m, offset))?);
                    }
                }
                _ => {}
            },
            Event::Empty(e) => match e.name().as_ref() {
                b"testcase" => {
                    records.push(testcase(&e).map_err(|m| parse_error(m, offset))?);
                }
                b"failure" | b"error" => {
                    if let Some(record) = record.as_mut() {
                        let (kind, condition) = condition(&e).map_err(|m| parse_error(m, offset))?;
                        push_entry(record, kind, condition);
                    }
                }
                b"skipped" => {
                    if let Some(record) = record.as_mut() {
                        record.skipped.push(skip(&e).map_err(|m| parse_error(m, offset))?);
                    }
                }
                _ => {}
            },
            Event::Text(e) => {
                if let Some((_, condition)) = entry.as_mut() {
                    let text = e.unescape().map_err(|err| parse_error(err.to_string(), offset))?;
                    condition.text.push_str(&text);
                }
            }
            Event::CData(e) => {
                if let Some((_, condition)) = entry.as_mut() {
                    condition.text.push_str(&String::from_utf8_lossy(&e));
                }
            }
            Event::End(e) => match e.name().as_ref() {
                b"failure" | b"error" => {
                    if let (Some(record), Some((kind, mut condition))) = (record.as_mut(), entry.take()) {
                        condition.text = condition.text.trim().to_string();
                        push_entry(record, kind, condition);
                    }
                }
                b"testcase" => {
                    if let Some(done) = record.take() {
                        records.push(done);
                    }
                }
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }

    if let Some(open) = record {
        return Err(parse_error(
            format!("unterminated testcase '{}'", open.identity()),
            source.len(),
        ));
    }

    Ok(records)
}

fn push_entry(record: &mut ReportRecord, kind: EntryKind, condition: ConditionEntry) {
    match kind {
        EntryKind::Failure => record.failures.push(condition),
        EntryKind::Error => record.errors.push(condition),
    }
}

fn testcase(e: &BytesStart<'_>) -> Result<ReportRecord, String> {
    let class_name = attribute(e, b"classname")?.unwrap_or_default();
    let Some(name) = attribute(e, b"name")? else {
        return Err("testcase without a name attribute".to_string());
    };
    Ok(ReportRecord::new(class_name, name))
}

fn condition(e: &BytesStart<'_>) -> Result<(EntryKind, ConditionEntry), String> {
    let kind = if e.name().as_ref() == b"failure" {
        EntryKind::Failure
    } else {
        EntryKind::Error
    };
    let entry = ConditionEntry::new(
        attribute(e, b"type")?.unwrap_or_default(),
        attribute(e, b"message")?.unwrap_or_default(),
        String::new(),
    );
    Ok((kind, entry))
}

/// A numeric `type` is the skip count; anything else means this one case was skipped.
fn skip(e: &BytesStart<'_>) -> Result<SkipEntry, String> {
    let count = attribute(e, b"type")?
        .and_then(|value| value.trim().parse::<i64>().ok())
        .unwrap_or(1);
    Ok(SkipEntry::new(count))
}

fn attribute(e: &BytesStart<'_>, key: &[u8]) -> Result<Option<String>, String> {
    for attr in e.attributes() {
        let attr = attr.map_err(|err| err.to_string())?;
        if attr.key.as_ref() == key {
            let value: Cow<'_, str> = attr.unescape_value().map_err(|err| err.to_string())?;
            return Ok(Some(value.into_owned()));
        }
    }
    Ok(None)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_passing_testcase() {
        let records = parse(
            "r.xml",
            r#"<testsuite><testcase classname="T" name="a" time="0.1"/></testsuite>"#,
        )
        .unwrap();
        assert_eq!(records, vec![ReportRecord::new("T", "a")]);
    }

    #[test]
    fn test_failure_with_text() {
        let xml = r#"<testsuite>
  <testcase classname="T" name="b">
    <failure type="Assert" message="x">y</failure>
  </testcase>
</testsuite>"#;
        let records = parse("r.xml", xml).unwrap();
        assert_eq!(records[0].failures, vec![ConditionEntry::new("Assert", "x", "y")]);
        assert!(records[0].errors.is_empty());
    }

    #[test]
    fn test_error_with_cdata_and_entities() {
        let xml = r#"<testsuite><testcase classname="T" name="c">
<error type="RuntimeError" message="boom &amp; bust"><![CDATA[Traceback <most recent call last>]]></error>
</testcase></testsuite>"#;
        let records = parse("r.xml", xml).unwrap();
        assert_eq!(
            records[0].errors,
            vec![ConditionEntry::new(
                "RuntimeError",
                "boom & bust",
                "Traceback <most recent call last>"
            )]
        );
    }

    #[test]
    fn test_text_and_cdata_join_without_separator() {
        let xml = r#"<testsuite><testcase classname="T" name="m">
  <failure type="A" message="m">abc<![CDATA[def]]></failure>
  <error type="E" message="n">
    line one<![CDATA[
  indented <two>]]>
  </error>
</testcase></testsuite>"#;
        let records = parse("r.xml", xml).unwrap();
        assert_eq!(records[0].failures, vec![ConditionEntry::new("A", "m", "abcdef")]);
        assert_eq!(records[0].failures[0].summary(), "Amabcdef");
        assert_eq!(records[0].errors[0].text, "line one\n  indented <two>");
    }

    #[test]
    fn test_skip_counts() {
        let xml = r#"<testsuite>
<testcase classname="T" name="d"><skipped type="3"/></testcase>
<testcase classname="T" name="e"><skipped type="unittest.case.SkipTest" message="not ready"/></testcase>
<testcase classname="T" name="f"><skipped/></testcase>
<testcase classname="T" name="g"><skipped type="0"></skipped></testcase>
</testsuite>"#;
        let records = parse("r.xml", xml).unwrap();
        let counts: Vec<i64> = records.iter().map(|r| r.skipped[0].count).collect();
        assert_eq!(counts, vec![3, 1, 1, 0]);
    }

    #[test]
    fn test_nested_suites_and_system_out() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
<testsuites>
  <testsuite name="one"><testcase classname="A" name="x"><system-out>noise</system-out></testcase></testsuite>
  <testsuite name="two"><testcase classname="B" name="y"/></testsuite>
</testsuites>"#;
        let records = parse("r.xml", xml).unwrap();
        assert_eq!(records.len(), 2);
        assert!(records[0].failures.is_empty());
        assert_eq!(records[1].identity(), "B:y");
    }

    #[test]
    fn test_missing_name_is_a_parse_error() {
        let err = parse("r.xml", r#"<testsuite><testcase classname="T"/></testsuite>"#).unwrap_err();
        assert!(matches!(err, ReportError::Parse { .. }));
    }

    #[test]
    fn test_mismatched_tags_is_a_parse_error() {
        let err = parse("r.xml", r#"<testsuite><testcase classname="T" name="a"></testsuite>"#).unwrap_err();
        assert!(matches!(err, ReportError::Parse { .. }));
    }
}
