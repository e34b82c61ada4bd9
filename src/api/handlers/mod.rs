//! HTTP request handlers.

pub mod artifacts;
pub mod auth;
pub mod garden;
pub mod projects;

/// Split a comma-separated query value into tags, dropping empty segments.
pub(crate) fn parse_tags(raw: &Option<String>) -> Option<Vec<String>> {
    raw.as_ref().map(|s| {
        s.split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_owned)
            .collect()
    })
}
