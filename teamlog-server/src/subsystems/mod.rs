pub mod annotate;
pub mod ingest;
pub mod notify;
pub mod retrieve;

/// A request value that is set and not only whitespace.
pub(crate) fn present(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}
