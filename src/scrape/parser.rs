//! Prometheus text exposition parsing
//!
//! Turns one scrape payload into a [`SeriesMap`] keyed by canonical series key.
//!
//! Every non-empty line must be a comment or a well-formed sample, otherwise
//! the whole payload is rejected. Label values are unescaped (`\\`, `\"`,
//! `\n`) before keying, so a value may contain commas, braces or quotes.
//! Sample types come from `# TYPE` lines and are mapped onto
//! [`prometheus_parse::Value`]; histogram, summary and untyped samples end up
//! [`SampleValue::Unsupported`].

use prometheus_parse::Value;
use std::collections::HashMap;
use std::io;

use crate::diff::labels::series_key;
use crate::diff::sample::{extract_value, insert_series, SampleValue, SeriesMap};

/// Suffixes of the per-sample series of a histogram or summary family
const FAMILY_SUFFIXES: [&str; 3] = ["_bucket", "_sum", "_count"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MetricKind {
    Counter,
    Gauge,
    Histogram,
    Summary,
    Untyped,
}

impl MetricKind {
    fn from_declared(kind: &str) -> Option<Self> {
        match kind {
            "counter" => Some(Self::Counter),
            "gauge" => Some(Self::Gauge),
            "histogram" => Some(Self::Histogram),
            "summary" => Some(Self::Summary),
            "untyped" => Some(Self::Untyped),
            _ => None,
        }
    }

    fn value(self, v: f64) -> Value {
        match self {
            Self::Counter => Value::Counter(v),
            Self::Gauge => Value::Gauge(v),
            Self::Histogram => Value::Histogram(Vec::new()),
            Self::Summary => Value::Summary(Vec::new()),
            Self::Untyped => Value::Untyped(v),
        }
    }
}

/// One sample line, label values already unescaped
#[derive(Debug, PartialEq)]
struct SampleLine<'a> {
    name: &'a str,
    labels: Vec<(&'a str, String)>,
    value: f64,
}

/// Parse Prometheus text format into canonical series
pub fn parse_series(prometheus_text: &str) -> io::Result<SeriesMap> {
    let mut types: HashMap<&str, MetricKind> = HashMap::new();
    let mut series = SeriesMap::new();
    let mut duplicates = 0usize;
    let mut unsupported = 0usize;

    for (index, raw) in prometheus_text.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }

        let number = index + 1;
        if line.starts_with('#') {
            if let Some((name, kind)) = type_declaration(line).map_err(|reason| invalid_line(number, reason))? {
                types.insert(name, kind);
            }
            continue;
        }

        let sample = sample_line(line).map_err(|reason| invalid_line(number, reason))?;
        let value = extract_value(&resolve_kind(&types, sample.name).value(sample.value));
        if value == SampleValue::Unsupported {
            unsupported += 1;
        }

        let key = series_key(
            sample.name,
            sample.labels.iter().map(|(k, v)| (*k, v.as_str())),
        );
        if insert_series(&mut series, key, value).is_some() {
            duplicates += 1;
        }
    }

    if duplicates > 0 {
        tracing::warn!(duplicates, "Scrape contained duplicate series, kept the last value of each");
    }
    if unsupported > 0 {
        tracing::debug!(
            unsupported,
            "Histogram, summary and untyped series are left out of the diff"
        );
    }

    Ok(series)
}

fn invalid_line(number: usize, reason: String) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, format!("line {}: {}", number, reason))
}

/// Type of a sample, looked up by its own name first, then by its family
fn resolve_kind(types: &HashMap<&str, MetricKind>, name: &str) -> MetricKind {
    if let Some(kind) = types.get(name) {
        return *kind;
    }

    FAMILY_SUFFIXES
        .iter()
        .filter_map(|suffix| name.strip_suffix(*suffix))
        .filter_map(|family| types.get(family).copied())
        .find(|kind| matches!(kind, MetricKind::Histogram | MetricKind::Summary))
        .unwrap_or(MetricKind::Untyped)
}

/// `# TYPE name kind`; other comments, `# HELP` included, yield `None`
fn type_declaration(line: &str) -> Result<Option<(&str, MetricKind)>, String> {
    let mut tokens = line[1..].split_whitespace();
    if tokens.next() != Some("TYPE") {
        return Ok(None);
    }

    let name = tokens.next().ok_or("TYPE comment without a metric name")?;
    let declared = tokens.next().ok_or("TYPE comment without a type")?;
    let kind = MetricKind::from_declared(declared)
        .ok_or_else(|| format!("unknown metric type '{}'", declared))?;

    Ok(Some((name, kind)))
}

/// `name[{label="value",...}] value [timestamp]`
fn sample_line(line: &str) -> Result<SampleLine<'_>, String> {
    let mut cursor = Cursor::new(line);

    let name = cursor
        .identifier(is_metric_name_char)
        .ok_or("expected a metric name")?;

    cursor.skip_blanks();
    let mut labels = Vec::new();
    if cursor.eat('{') {
        loop {
            cursor.skip_blanks();
            if cursor.eat('}') {
                break;
            }

            let label = cursor
                .identifier(|c, first| c == '_' || c.is_ascii_alphabetic() || (!first && c.is_ascii_digit()))
                .ok_or("expected a label name")?;
            cursor.skip_blanks();
            if !cursor.eat('=') {
                return Err(format!("expected '=' after label '{}'", label));
            }
            cursor.skip_blanks();
            labels.push((label, cursor.quoted()?));

            cursor.skip_blanks();
            if cursor.eat(',') {
                continue;
            }
            if cursor.eat('}') {
                break;
            }
            return Err("expected ',' or '}' in label set".to_string());
        }
        cursor.skip_blanks();
    }

    let raw_value = cursor.token();
    if raw_value.is_empty() {
        return Err(format!("missing value for '{}'", name));
    }
    let value = raw_value
        .parse::<f64>()
        .map_err(|_| format!("invalid sample value '{}'", raw_value))?;

    cursor.skip_blanks();
    let timestamp = cursor.token();
    if !timestamp.is_empty() && timestamp.parse::<i64>().is_err() {
        return Err(format!("invalid timestamp '{}'", timestamp));
    }

    cursor.skip_blanks();
    if !cursor.rest().is_empty() {
        return Err(format!("unexpected trailing text '{}'", cursor.rest()));
    }

    Ok(SampleLine { name, labels, value })
}

fn is_metric_name_char(c: char, first: bool) -> bool {
    c == '_' || c == ':' || c.is_ascii_alphabetic() || (!first && c.is_ascii_digit())
}

struct Cursor<'a> {
    line: &'a str,
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(line: &'a str) -> Self {
        Self { line, pos: 0 }
    }

    fn rest(&self) -> &'a str {
        &self.line[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn eat(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.pos += expected.len_utf8();
            true
        } else {
            false
        }
    }

    fn skip_blanks(&mut self) {
        while matches!(self.peek(), Some(' ' | '\t')) {
            self.pos += 1;
        }
    }

    /// Run of `allowed` characters, `None` when empty
    fn identifier(&mut self, allowed: impl Fn(char, bool) -> bool) -> Option<&'a str> {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if !allowed(c, self.pos == start) {
                break;
            }
            self.pos += c.len_utf8();
        }
        let line = self.line;
        (self.pos > start).then(|| &line[start..self.pos])
    }

    /// Everything up to the next blank
    fn token(&mut self) -> &'a str {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if c == ' ' || c == '\t' {
                break;
            }
            self.pos += c.len_utf8();
        }
        &self.line[start..self.pos]
    }

    /// Double-quoted label value with `\\`, `\"` and `\n` escapes
    fn quoted(&mut self) -> Result<String, String> {
        if !self.eat('"') {
            return Err("expected '\"' to open a label value".to_string());
        }

        let mut value = String::new();
        loop {
            match self.bump() {
                None => return Err("unterminated label value".to_string()),
                Some('"') => return Ok(value),
                Some('\\') => match self.bump() {
                    Some('\\') => value.push('\\'),
                    Some('"') => value.push('"'),
                    Some('n') => value.push('\n'),
                    Some(other) => return Err(format!("invalid escape '\\{}' in label value", other)),
                    None => return Err("unterminated label value".to_string()),
                },
                Some(c) => value.push(c),
            }
        }
    }
}
