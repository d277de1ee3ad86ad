//! Label canonicalization
//!
//! Series from the two endpoints are matched by exact string comparison,
//! so both sides must encode a name and its label set the same way.

/// Collapse label pairs into a sorted `name="value"` list joined by commas.
///
/// Fragments are sorted by their full text, not by label name alone.
/// Values are emitted verbatim: an embedded `"` is not escaped.
pub fn canonical_labels<'a, I>(labels: I) -> String
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    let mut fragments: Vec<String> = labels
        .into_iter()
        .map(|(name, value)| format!("{}=\"{}\"", name, value))
        .collect();
    fragments.sort_unstable();
    fragments.join(",")
}

/// Build the canonical key for a series
///
/// Returns the bare metric name when there are no labels, otherwise
/// `name{a="1",b="2"}`.
pub fn series_key<'a, I>(name: &str, labels: I) -> String
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    let collapsed = canonical_labels(labels);
    if collapsed.is_empty() {
        name.to_string()
    } else {
        format!("{}{{{}}}", name, collapsed)
    }
}
